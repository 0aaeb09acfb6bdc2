//! Configuration management for the calibration engine.

use serde::{Deserialize, Serialize};

use crate::error::{CalibrationError, CalibrationResult};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub calibration: CalibrationConfig,
    #[serde(default)]
    pub parameters: ParameterDefaultsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from files and environment.
    ///
    /// Configuration is loaded in order:
    /// 1. config/default.toml (base settings)
    /// 2. config/{MOOD_CALIBRATION_ENV}.toml (environment-specific)
    /// 3. Environment variables with MOOD_CALIBRATION_ prefix
    pub fn load() -> CalibrationResult<Self> {
        let env =
            std::env::var("MOOD_CALIBRATION_ENV").unwrap_or_else(|_| "development".to_string());

        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                config::Environment::with_prefix("MOOD_CALIBRATION")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &std::path::Path) -> CalibrationResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CalibrationError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            CalibrationError::ConfigError(format!("Failed to parse config file: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> CalibrationResult<()> {
        self.calibration.validate()?;
        self.parameters.validate()?;
        Ok(())
    }
}

/// Calibration loop settings, fixed at manager construction.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Maximum adjustments generated per session (default: 3)
    pub max_calibrations_per_session: usize,
    /// Minimum study sample size required to calibrate at all (default: 5)
    pub min_validation_sample_size: usize,
    /// Advisory confidence bar for calibration decisions (default: 0.7)
    pub confidence_threshold: f32,
    /// Apply generated adjustments without a human gate (default: false)
    pub auto_apply_adjustments: bool,
    /// Minimum delta treated as a real effect (default: 0.05)
    pub min_improvement_threshold: f32,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            max_calibrations_per_session: 3,
            min_validation_sample_size: 5,
            confidence_threshold: 0.7,
            auto_apply_adjustments: false,
            min_improvement_threshold: 0.05,
        }
    }
}

impl CalibrationConfig {
    /// Validate configuration values
    pub fn validate(&self) -> CalibrationResult<()> {
        if self.max_calibrations_per_session == 0 {
            return Err(CalibrationError::ConfigError(
                "calibration.max_calibrations_per_session must be greater than 0".into(),
            ));
        }
        if self.min_validation_sample_size == 0 {
            return Err(CalibrationError::ConfigError(
                "calibration.min_validation_sample_size must be greater than 0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(CalibrationError::ConfigError(
                "calibration.confidence_threshold must be in [0.0, 1.0]".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_improvement_threshold) {
            return Err(CalibrationError::ConfigError(
                "calibration.min_improvement_threshold must be in [0.0, 1.0]".into(),
            ));
        }
        Ok(())
    }
}

/// Parameter values the generator assumes until it observes the live store.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ParameterDefaultsConfig {
    pub sentiment_weight: f32,
    pub min_sentiment_weight: f32,
    pub max_sentiment_weight: f32,
    pub high_confidence_threshold: f32,
    pub correction_factor: f32,
}

impl Default for ParameterDefaultsConfig {
    fn default() -> Self {
        Self {
            sentiment_weight: 1.0,
            min_sentiment_weight: 0.1,
            max_sentiment_weight: 2.0,
            high_confidence_threshold: 0.8,
            correction_factor: 1.0,
        }
    }
}

impl ParameterDefaultsConfig {
    pub fn validate(&self) -> CalibrationResult<()> {
        if self.min_sentiment_weight < 0.0 || self.min_sentiment_weight >= self.max_sentiment_weight
        {
            return Err(CalibrationError::ConfigError(
                "parameters.min_sentiment_weight must be non-negative and below max_sentiment_weight"
                    .into(),
            ));
        }
        if !(self.min_sentiment_weight..=self.max_sentiment_weight).contains(&self.sentiment_weight)
        {
            return Err(CalibrationError::ConfigError(
                "parameters.sentiment_weight must lie within the weight bounds".into(),
            ));
        }
        if !(0.0..1.0).contains(&self.high_confidence_threshold) {
            return Err(CalibrationError::ConfigError(
                "parameters.high_confidence_threshold must be in [0.0, 1.0)".into(),
            ));
        }
        if self.correction_factor <= 0.0 {
            return Err(CalibrationError::ConfigError(
                "parameters.correction_factor must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            include_location: false,
        }
    }
}
