//! Structured logging setup for Envault services
//!
//! Log output must never contain key material or decrypted field values;
//! callers log identities, usernames, and operation outcomes only.

use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Initialize structured JSON logging (for production)
pub fn init_logging(service_name: &str, default_level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    tracing::info!(
        service = service_name,
        "Logging initialized"
    );
}

/// Initialize human-readable console logging (for development)
pub fn init_console_logging(service_name: &str, default_level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();

    tracing::info!(
        service = service_name,
        "Console logging initialized"
    );
}
