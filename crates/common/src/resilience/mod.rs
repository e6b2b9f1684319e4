//! Resilience patterns for fault tolerance
//!
//! Currently a single pattern: retry with exponential backoff, proportional
//! jitter and cooperative cancellation. The engine is generic over the
//! operation's error type; callers plug in a [`RetryPolicy`] to decide what is
//! worth retrying.

pub mod retry;

pub use retry::{
    policies, BackoffStrategy, Jitter, RetryConfig, RetryConfigBuilder, RetryContext,
    RetryDecision, RetryError, RetryExecutor, RetryOutcome, RetryPolicy, RetryResult,
};
