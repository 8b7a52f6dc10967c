//! Tracing setup.
//!
//! The output format follows configuration: "json" for log shipping in
//! production, pretty output for local runs. `RUST_LOG` overrides the
//! configured level entirely.

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::LoggingConfig;

// sqlx logs every executed statement at INFO; keep those at WARN unless a
// RUST_LOG override asks for them.
fn default_directives(level: &str) -> String {
    format!("{level},sqlx::query=warn")
}

/// Initializes the tracing subscriber from [`LoggingConfig`].
pub fn init_logging(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.level)));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => {
            let json_layer = fmt::layer()
                .json()
                .with_span_events(FmtSpan::CLOSE)
                .with_current_span(true)
                .with_target(true);
            subscriber.with(json_layer).init();
        }
        _ => {
            let pretty_layer = fmt::layer()
                .pretty()
                .with_span_events(FmtSpan::CLOSE)
                .with_target(true);
            subscriber.with(pretty_layer).init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_quiet_statement_logging() {
        assert_eq!(default_directives("info"), "info,sqlx::query=warn");
        assert_eq!(default_directives("debug"), "debug,sqlx::query=warn");
    }
}
