//! Logging and tracing utilities

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable single-line output
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Build the filter from `RUST_LOG`, falling back to `default_directive`.
pub fn env_filter(default_directive: &str) -> EnvFilter {
    filter_from(
        std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(),
        default_directive,
    )
}

/// An unset or unparsable `directives` falls back to `default_directive`
fn filter_from(directives: Option<&str>, default_directive: &str) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(default_directive))
}

/// Initialize the tracing subscriber with human-readable output on stderr.
pub fn init_tracing(default_directive: &str) {
    tracing_subscriber::registry()
        .with(env_filter(default_directive))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Initialize the tracing subscriber with JSON output on stderr.
pub fn init_tracing_json(default_directive: &str) {
    tracing_subscriber::registry()
        .with(env_filter(default_directive))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .init();
}

impl LogFormat {
    /// Install the subscriber matching this format
    pub fn init(self, default_directive: &str) {
        match self {
            LogFormat::Pretty => init_tracing(default_directive),
            LogFormat::Json => init_tracing_json(default_directive),
        }
    }
}
