//! TOML configuration loading
//!
//! Installation files look like:
//!
//! ```toml
//! confidence_threshold = 62.5
//!
//! [[sensor]]
//! name = "Front Door"
//! type = "door"
//!
//! [[sensor]]
//! name = "Hall"
//! type = "motion"
//! ```
//!
//! Missing keys fall back to their defaults.

use super::types::{ConfigError, ControllerConfig};

impl ControllerConfig {
    /// Parse and validate a TOML configuration
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input).map_err(|_| ConfigError::Parse)?;
        config.validate()?;
        debug!(
            "Loaded config: threshold {}, {} sensors",
            config.confidence_threshold,
            config.sensors.len()
        );
        Ok(config)
    }
}
