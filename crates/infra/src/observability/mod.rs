//! Tracing subscriber initialisation
//!
//! Library crates only emit `tracing` events; the host application calls
//! [`init_tracing`] once at start-up to install a subscriber.
//!
//! ```rust,no_run
//! use campus_domain::LoggingConfig;
//!
//! campus_infra::observability::init_tracing(&LoggingConfig::default());
//! tracing::info!("client ready");
//! ```

use campus_domain::LoggingConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install a global `fmt` subscriber.
///
/// `RUST_LOG` wins over `config.filter`; an unparsable directive falls back
/// to `info`. Returns `false` when a global subscriber was already set, in
/// which case nothing changes.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter = build_filter(config);
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if config.json {
        registry.with(fmt::layer().json().with_current_span(true)).try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    installed.is_ok()
}

fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
