//! HTTP transport boundary
//!
//! Core never talks to the network directly; it builds [`ApiRequest`]s and
//! hands them to an [`HttpTransport`] supplied by the infra layer.

pub mod errors;
pub mod ports;

pub use errors::TransportError;
pub use ports::{ApiRequest, ApiResponse, HttpMethod, HttpTransport};
