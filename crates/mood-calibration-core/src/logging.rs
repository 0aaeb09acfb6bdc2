//! Tracing subscriber setup for hosts embedding the calibration engine.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::{CalibrationError, CalibrationResult};

/// Install a global `fmt` subscriber configured from `config`.
///
/// `RUST_LOG`, when set, takes precedence over `config.level`.
///
/// # Errors
/// Returns `CalibrationError::ConfigError` if the level is not a valid filter
/// directive or a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> CalibrationResult<()> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) => EnvFilter::try_new(directives),
        Err(_) => EnvFilter::try_new(&config.level),
    }
    .map_err(|e| CalibrationError::ConfigError(format!("Invalid log level: {}", e)))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    let installed = match config.format.as_str() {
        "pretty" => builder.pretty().try_init(),
        "compact" => builder.compact().try_init(),
        _ => builder.try_init(),
    };

    installed.map_err(|e| {
        CalibrationError::ConfigError(format!("Failed to install tracing subscriber: {}", e))
    })
}
