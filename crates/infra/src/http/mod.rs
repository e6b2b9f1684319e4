//! reqwest-backed HTTP transport

pub mod client;

pub use client::{ReqwestTransport, ReqwestTransportBuilder};
