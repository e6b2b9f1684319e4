//! Generic retry engine with exponential backoff, proportional jitter and
//! cooperative cancellation
//!
//! The executor knows nothing about HTTP or authentication: a
//! [`RetryPolicy`] decides whether a failure is worth another attempt, and the
//! executor owns the attempt budget, the delays between attempts and the
//! reaction to cancellation.
//!
//! Every call to [`RetryExecutor::execute`] builds its own [`RetryContext`], so
//! one executor can be shared by any number of concurrent callers.

use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

use rand::Rng;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::error::ErrorClassification;

/// Errors that can occur during retry operations
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// Every attempt failed with a retryable error; carries the last one.
    #[error("All {attempts} retry attempts exhausted, last error: {last:?}")]
    AttemptsExhausted { attempts: u32, last: E },

    /// The policy refused to retry this error.
    #[error("Operation failed with non-retryable error after {attempts} attempt(s): {error:?}")]
    NonRetryable { attempts: u32, error: E },

    /// The cancellation token fired before the operation settled.
    #[error("Operation cancelled after {attempts} attempt(s)")]
    Cancelled { attempts: u32 },

    /// The retry configuration is invalid
    #[error("Invalid retry configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl<E> RetryError<E> {
    /// The operation error that ended the sequence, if any.
    pub fn into_last_error(self) -> Option<E> {
        match self {
            Self::AttemptsExhausted { last, .. } => Some(last),
            Self::NonRetryable { error, .. } => Some(error),
            Self::Cancelled { .. } | Self::InvalidConfiguration { .. } => None,
        }
    }

    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Result type for retry operations
pub type RetryResult<T, E> = Result<T, RetryError<E>>;

/// Outcome of a retry execution including result and summary statistics.
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    pub result: RetryResult<T, E>,
    /// Number of times the operation was started.
    pub attempts: u32,
    /// Every backoff delay that was fully slept, in order.
    pub delays: Vec<Duration>,
    pub first_attempt_time: Instant,
}

impl<T, E> RetryOutcome<T, E> {
    /// Consume the outcome and return only the result.
    pub fn into_result(self) -> RetryResult<T, E> {
        self.result
    }

    /// Sum of all backoff delays.
    pub fn total_delay(&self) -> Duration {
        self.delays.iter().sum()
    }

    /// Get the total elapsed time from first attempt to completion.
    pub fn total_elapsed(&self) -> Duration {
        self.first_attempt_time.elapsed()
    }
}

/// Trait for determining whether an error should be retried
pub trait RetryPolicy<E> {
    /// Determine if the error should be retried and optionally provide a custom
    /// delay
    fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision;
}

/// Decision for whether to retry an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the operation with the default backoff delay
    Retry,
    /// Retry after at least this delay (e.g. from a `Retry-After` header)
    RetryAfter(Duration),
    /// Don't retry the operation
    Stop,
}

/// Backoff strategy for calculating the un-jittered delay of a retry
#[derive(Debug, Clone, PartialEq)]
pub enum BackoffStrategy {
    /// Fixed delay between retries
    Fixed(Duration),
    /// `base_delay * 2^attempt`, capped at `max_delay`
    Exponential { base_delay: Duration, max_delay: Duration },
}

impl BackoffStrategy {
    /// Delay before retrying after the 0-based `attempt` failed.
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        match self {
            Self::Fixed(delay) => *delay,
            Self::Exponential { base_delay, max_delay } => {
                let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
                base_delay.checked_mul(factor).map_or(*max_delay, |delay| delay.min(*max_delay))
            }
        }
    }

    /// The base delay jitter is scaled against.
    pub const fn base_delay(&self) -> Duration {
        match self {
            Self::Fixed(delay) => *delay,
            Self::Exponential { base_delay, .. } => *base_delay,
        }
    }

    /// Upper bound for any delay produced by this strategy.
    pub fn max_delay(&self) -> Duration {
        match self {
            Self::Fixed(delay) => *delay,
            Self::Exponential { max_delay, .. } => *max_delay,
        }
    }
}

/// Jitter added on top of the backoff delay
#[derive(Debug, Clone, PartialEq)]
pub enum Jitter {
    /// No jitter
    None,
    /// Adds `base_delay * U(-factor, factor)`
    Proportional { factor: f64 },
}

impl Jitter {
    /// Apply jitter to `delay`, scaling the random term by `base`.
    pub fn apply(&self, delay: Duration, base: Duration) -> Duration {
        match self {
            Self::None => delay,
            Self::Proportional { factor } if *factor <= 0.0 => delay,
            Self::Proportional { factor } => {
                let offset = rand::thread_rng().gen_range(-*factor..=*factor);
                let jittered = base.as_secs_f64().mul_add(offset, delay.as_secs_f64());
                Duration::try_from_secs_f64(jittered.max(0.0)).unwrap_or(delay)
            }
        }
    }

    pub const fn factor(&self) -> f64 {
        match self {
            Self::None => 0.0,
            Self::Proportional { factor } => *factor,
        }
    }
}

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Backoff strategy for calculating delays
    pub backoff: BackoffStrategy,
    /// Jitter type for randomizing delays
    pub jitter: Jitter,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: BackoffStrategy::Exponential {
                base_delay: Duration::from_millis(1000),
                max_delay: Duration::from_secs(30),
            },
            jitter: Jitter::Proportional { factor: 0.25 },
        }
    }
}

impl RetryConfig {
    /// Create a configuration builder
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::new()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), RetryError<()>> {
        if self.max_attempts == 0 {
            return Err(RetryError::InvalidConfiguration {
                message: "max_attempts must be greater than 0".to_string(),
            });
        }

        if let Jitter::Proportional { factor } = self.jitter {
            if !(0.0..1.0).contains(&factor) {
                return Err(RetryError::InvalidConfiguration {
                    message: format!("jitter factor must be within [0, 1), got {factor}"),
                });
            }
        }

        Ok(())
    }

    /// Jittered delay before retrying after the 0-based `attempt` failed.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let delay = self.backoff.calculate_delay(attempt);
        self.jitter.apply(delay, self.backoff.base_delay()).min(self.backoff.max_delay())
    }

    /// Inclusive range every delay for `attempt` falls into.
    pub fn delay_bounds(&self, attempt: u32) -> (Duration, Duration) {
        let delay = self.backoff.calculate_delay(attempt);
        let spread = self.backoff.base_delay().mul_f64(self.jitter.factor());
        (delay.saturating_sub(spread), (delay + spread).min(self.backoff.max_delay()))
    }
}

/// Builder for RetryConfig with fluent API
#[derive(Debug)]
pub struct RetryConfigBuilder {
    config: RetryConfig,
}

impl Default for RetryConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryConfigBuilder {
    pub fn new() -> Self {
        Self { config: RetryConfig::default() }
    }

    #[must_use]
    pub const fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts;
        self
    }

    #[must_use]
    pub fn fixed_backoff(mut self, delay: Duration) -> Self {
        self.config.backoff = BackoffStrategy::Fixed(delay);
        self
    }

    #[must_use]
    pub fn exponential_backoff(mut self, base_delay: Duration, max_delay: Duration) -> Self {
        self.config.backoff = BackoffStrategy::Exponential { base_delay, max_delay };
        self
    }

    #[must_use]
    pub fn no_jitter(mut self) -> Self {
        self.config.jitter = Jitter::None;
        self
    }

    #[must_use]
    pub fn proportional_jitter(mut self, factor: f64) -> Self {
        self.config.jitter = Jitter::Proportional { factor };
        self
    }

    pub fn build(self) -> Result<RetryConfig, RetryError<()>> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Per-call retry state. Created for each execution and dropped with it.
#[derive(Debug, Clone)]
pub struct RetryContext {
    /// Current attempt number (0-based)
    pub attempt: u32,
    pub max_attempts: u32,
    started: u32,
    delays: Vec<Duration>,
    start_time: Instant,
}

impl RetryContext {
    fn new(config: &RetryConfig) -> Self {
        Self {
            attempt: 0,
            max_attempts: config.max_attempts.max(1),
            started: 0,
            delays: Vec::new(),
            start_time: Instant::now(),
        }
    }

    const fn is_last_attempt(&self) -> bool {
        self.attempt + 1 >= self.max_attempts
    }

    fn finish<T, E>(self, result: RetryResult<T, E>) -> RetryOutcome<T, E> {
        RetryOutcome {
            result,
            attempts: self.started,
            delays: self.delays,
            first_attempt_time: self.start_time,
        }
    }
}

/// The main retry executor
#[derive(Debug, Clone)]
pub struct RetryExecutor<P> {
    config: RetryConfig,
    policy: P,
}

impl<P> RetryExecutor<P> {
    /// Create a new retry executor with the given configuration and policy
    pub const fn new(config: RetryConfig, policy: P) -> Self {
        Self { config, policy }
    }

    /// Create with default configuration
    pub fn with_policy(policy: P) -> Self {
        Self::new(RetryConfig::default(), policy)
    }

    pub const fn config(&self) -> &RetryConfig {
        &self.config
    }
}

impl<P> RetryExecutor<P> {
    /// Execute an operation with retry logic
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> RetryResult<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Debug,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let never = CancellationToken::new();
        self.execute_with_outcome(&never, operation).await.into_result()
    }

    /// Execute an operation with retry logic, stopping as soon as `cancel`
    /// fires.
    ///
    /// Cancellation drops the in-flight attempt or the pending backoff sleep
    /// and resolves to [`RetryError::Cancelled`]; no further attempt starts.
    #[instrument(skip_all, fields(max_attempts = self.config.max_attempts))]
    pub async fn execute_with_outcome<F, Fut, T, E>(
        &self,
        cancel: &CancellationToken,
        mut operation: F,
    ) -> RetryOutcome<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Debug,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut context = RetryContext::new(&self.config);

        loop {
            if cancel.is_cancelled() {
                let attempts = context.attempt;
                return context.finish(Err(RetryError::Cancelled { attempts }));
            }

            debug!(attempt = context.attempt + 1, max_attempts = context.max_attempts, "Executing operation");
            context.started += 1;

            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => None,
                result = operation() => Some(result),
            };

            let error = match result {
                None => {
                    debug!(attempt = context.attempt + 1, "Operation cancelled mid-attempt");
                    let attempts = context.attempt + 1;
                    return context.finish(Err(RetryError::Cancelled { attempts }));
                }
                Some(Ok(value)) => {
                    if context.attempt > 0 {
                        debug!(retries = context.attempt, "Operation succeeded after retries");
                    }
                    return context.finish(Ok(value));
                }
                Some(Err(error)) => error,
            };

            let delay = match self.policy.should_retry(&error, context.attempt) {
                RetryDecision::Stop => {
                    debug!(error = ?error, "Retry policy determined not to retry");
                    let attempts = context.attempt + 1;
                    return context.finish(Err(RetryError::NonRetryable { attempts, error }));
                }
                _ if context.is_last_attempt() => {
                    warn!(attempts = context.max_attempts, last_error = ?error, "All retry attempts exhausted");
                    let attempts = context.attempt + 1;
                    return context.finish(Err(RetryError::AttemptsExhausted { attempts, last: error }));
                }
                RetryDecision::Retry => self.config.delay_for(context.attempt),
                RetryDecision::RetryAfter(requested) => requested
                    .max(self.config.delay_for(context.attempt))
                    .min(self.config.backoff.max_delay()),
            };

            warn!(
                attempt = context.attempt + 1,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = ?error,
                "Operation failed, retrying after backoff"
            );

            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!(attempt = context.attempt + 1, "Cancelled during backoff");
                    let attempts = context.attempt + 1;
                    return context.finish(Err(RetryError::Cancelled { attempts }));
                }
                () = tokio::time::sleep(delay) => {}
            }

            context.delays.push(delay);
            context.attempt += 1;
        }
    }
}

/// Pre-defined retry policies for common scenarios
pub mod policies {
    use super::{ErrorClassification, RetryDecision, RetryPolicy};

    /// Retries errors that classify themselves as retryable, honouring their
    /// suggested delay.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct ClassifiedRetry;

    impl<E: ErrorClassification> RetryPolicy<E> for ClassifiedRetry {
        fn should_retry(&self, error: &E, _attempt: u32) -> RetryDecision {
            if !error.is_retryable() {
                return RetryDecision::Stop;
            }
            error.retry_after().map_or(RetryDecision::Retry, RetryDecision::RetryAfter)
        }
    }
}
