//! API-aware retry executor
//!
//! Wraps the generic engine from `campus_common::resilience` with the
//! [`ErrorClassifier`]: each failed attempt is classified to decide retry vs.
//! abort, and the terminal failure is converted into a [`DomainResult`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use campus_common::error::{ErrorClassification, ErrorSeverity};
use campus_common::resilience::{RetryConfig, RetryError, RetryExecutor};
use campus_domain::{ConfigError, DomainError, DomainResult, RetrySettings};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::classifier::{ApiFailure, Classification, ClassifierPolicy, ErrorClassifier};

/// Result of one executed call plus the attempts it took.
#[derive(Debug)]
pub struct ApiOutcome<T> {
    pub result: DomainResult<T>,
    pub attempts: u32,
    /// Backoff delays slept between attempts, in order.
    pub delays: Vec<Duration>,
}

/// Bounded retry with exponential backoff for API calls.
///
/// Holds no per-call state; one instance serves any number of concurrent
/// calls.
#[derive(Debug, Clone)]
pub struct ApiRetryExecutor {
    engine: RetryExecutor<ClassifierPolicy>,
    classifier: Arc<ErrorClassifier>,
}

impl ApiRetryExecutor {
    /// Build an executor from configured retry settings.
    ///
    /// # Errors
    /// `ConfigError::Invalid` when the settings are rejected by the engine.
    pub fn from_settings(
        settings: &RetrySettings,
        classifier: Arc<ErrorClassifier>,
    ) -> Result<Self, ConfigError> {
        let config = RetryConfig::builder()
            .max_attempts(settings.max_attempts)
            .exponential_backoff(settings.base_delay, settings.max_delay)
            .proportional_jitter(settings.jitter_factor)
            .build()
            .map_err(|e| ConfigError::invalid("retry", e.to_string()))?;
        Ok(Self::new(config, classifier))
    }

    pub fn new(config: RetryConfig, classifier: Arc<ErrorClassifier>) -> Self {
        let policy = ClassifierPolicy::new(Arc::clone(&classifier));
        Self { engine: RetryExecutor::new(config, policy), classifier }
    }

    pub const fn config(&self) -> &RetryConfig {
        self.engine.config()
    }

    pub fn classifier(&self) -> &ErrorClassifier {
        &self.classifier
    }

    /// Run `operation` until it succeeds, fails terminally, exhausts the
    /// attempt budget or `cancel` fires.
    ///
    /// Never yields `DomainResult::Loading`.
    pub async fn execute<T, F, Fut>(&self, cancel: &CancellationToken, operation: F) -> DomainResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiFailure>>,
    {
        self.execute_with_outcome(cancel, operation).await.result
    }

    pub async fn execute_with_outcome<T, F, Fut>(
        &self,
        cancel: &CancellationToken,
        operation: F,
    ) -> ApiOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiFailure>>,
    {
        let outcome = self.engine.execute_with_outcome(cancel, operation).await;
        let result = match outcome.result {
            Ok(data) => DomainResult::success(data),
            Err(error) => DomainResult::error(self.terminal_error(error)),
        };
        ApiOutcome { result, attempts: outcome.attempts, delays: outcome.delays }
    }

    fn terminal_error(&self, error: RetryError<ApiFailure>) -> DomainError {
        let (classification, attempts) = match error {
            RetryError::AttemptsExhausted { attempts, last } => (self.classifier.classify(&last), attempts),
            RetryError::NonRetryable { attempts, error } => (self.classifier.classify(&error), attempts),
            RetryError::Cancelled { .. } => return DomainError::cancelled(),
            RetryError::InvalidConfiguration { message } => {
                return DomainError::unknown("Invalid retry configuration").with_details(message);
            }
        };
        log_terminal(&classification, attempts);
        classification.error
    }
}

fn log_terminal(classification: &Classification, attempts: u32) {
    let kind = classification.error.kind;
    let severity = classification.severity();
    match severity {
        ErrorSeverity::Critical | ErrorSeverity::Error => {
            error!(attempts, %kind, %severity, "Request failed");
        }
        ErrorSeverity::Warning => warn!(attempts, %kind, %severity, "Request failed"),
        ErrorSeverity::Info => debug!(attempts, %kind, %severity, "Request failed"),
    }
}
