//! Configuration type definitions
//!
//! These types describe one installation: how sure the camera must be before
//! a detection counts, and which sensors are wired in.

use heapless::{String, Vec};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::InvalidArgument;
use crate::sensor::{Sensor, SensorSet, SensorType, MAX_SENSORS, MAX_SENSOR_NAME_LEN};

/// Confidence (percent) the classifier needs before reporting a cat
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 50.0;

/// Maximum serialized config size (binary)
pub const MAX_CONFIG_SIZE: usize = 512;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// TOML text could not be parsed into a configuration
    Parse,
    /// Confidence threshold outside 0..=100
    ThresholdOutOfRange,
    /// A sensor entry is not a valid sensor
    InvalidSensor(InvalidArgument),
    /// Two sensor entries share a name and type
    DuplicateSensor,
    /// Binary encoding failed (buffer too small)
    Encode,
    /// Binary data could not be decoded
    Decode,
}

impl From<InvalidArgument> for ConfigError {
    fn from(e: InvalidArgument) -> Self {
        ConfigError::InvalidSensor(e)
    }
}

/// One wired sensor
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorConfig {
    /// Display name, unique per type
    pub name: String<MAX_SENSOR_NAME_LEN>,
    /// Sensor category
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub sensor_type: SensorType,
}

impl SensorConfig {
    /// Build the (inactive) sensor this entry describes
    pub fn to_sensor(&self) -> Result<Sensor, InvalidArgument> {
        Sensor::new(&self.name, self.sensor_type)
    }
}

/// Controller configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ControllerConfig {
    /// Classifier confidence threshold in percent
    pub confidence_threshold: f32,
    /// Sensors provisioned at startup
    #[cfg_attr(feature = "serde", serde(rename = "sensor"))]
    pub sensors: Vec<SensorConfig, MAX_SENSORS>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            sensors: Vec::new(),
        }
    }
}

/// Check a classifier confidence threshold
pub fn threshold_in_range(threshold: f32) -> bool {
    (0.0..=100.0).contains(&threshold)
}

impl ControllerConfig {
    /// Check the configuration for values the controller cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !threshold_in_range(self.confidence_threshold) {
            return Err(ConfigError::ThresholdOutOfRange);
        }
        self.sensor_set().map(|_| ())
    }

    /// Configured sensors as a sensor set, all inactive
    pub fn sensor_set(&self) -> Result<SensorSet, ConfigError> {
        let mut set = SensorSet::new();
        for entry in &self.sensors {
            let sensor = entry.to_sensor()?;
            if set.contains(&sensor) {
                return Err(ConfigError::DuplicateSensor);
            }
            // `sensors` and the set share the same capacity
            let _ = set.upsert(sensor);
        }
        Ok(set)
    }

    /// Serialize into `buffer` as postcard binary
    ///
    /// Returns the number of bytes written.
    #[cfg(feature = "serde")]
    pub fn to_postcard(&self, buffer: &mut [u8]) -> Result<usize, ConfigError> {
        postcard::to_slice(self, buffer)
            .map(|used| used.len())
            .map_err(|_| ConfigError::Encode)
    }

    /// Deserialize and validate postcard binary data
    #[cfg(feature = "serde")]
    pub fn from_postcard(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::Decode)?;
        config.validate()?;
        Ok(config)
    }
}
