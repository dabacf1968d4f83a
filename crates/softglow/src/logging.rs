//! Logging initialization.
//!
//! Uses the `tracing` ecosystem with either human-readable or JSON output.
//! Everything goes to stderr; stdout carries the enhancement reports.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber.
///
/// `level` is the fallback filter when `RUST_LOG` is unset.
pub fn init(level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Initialize logging from the `[logging]` section, with CLI overrides.
pub fn init_from_config(
    config: &softglow_core::Config,
    verbose_override: bool,
    json_logs_override: bool,
) {
    let json_format = json_logs_override || config.logging.format == "json";
    init(&effective_level(&config.logging.level, verbose_override), json_format);
}

/// `--verbose` raises the level to debug but never lowers a trace setting.
fn effective_level(configured: &str, verbose: bool) -> String {
    match (verbose, configured) {
        (true, "trace") => "trace".to_string(),
        (true, _) => "debug".to_string(),
        (false, level) => level.to_string(),
    }
}
