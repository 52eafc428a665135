//! Structured logging.
//!
//! `RUST_LOG` wins when set; otherwise the configured level applies to this
//! crate and to `tower_http`'s request traces.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. Safe to call once per process.
pub fn init(log_level: &str) {
    tracing_subscriber::registry()
        .with(filter_for(log_level))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn filter_for(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("registration_watch={log_level},tower_http={log_level}"))
    })
}
