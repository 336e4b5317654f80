//! Sensors and the keyed sensor set
//!
//! A sensor is identified by its name and category. The `active` flag is
//! state, not identity: two values describing the same door compare equal
//! whether or not the door is open.

use core::cmp::Ordering;
use core::hash::{Hash, Hasher};

use heapless::{String, Vec};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::InvalidArgument;

/// Maximum sensor name length
pub const MAX_SENSOR_NAME_LEN: usize = 24;

/// Maximum sensors known to one controller
pub const MAX_SENSORS: usize = 16;

/// Sensor category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SensorType {
    Door,
    Window,
    Motion,
}

impl SensorType {
    /// Short label for panels and logs
    pub fn label(&self) -> &'static str {
        match self {
            SensorType::Door => "door",
            SensorType::Window => "window",
            SensorType::Motion => "motion",
        }
    }
}

/// A binary security sensor
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sensor {
    name: String<MAX_SENSOR_NAME_LEN>,
    sensor_type: SensorType,
    active: bool,
}

impl Sensor {
    /// Create an inactive sensor
    pub fn new(name: &str, sensor_type: SensorType) -> Result<Self, InvalidArgument> {
        if name.trim().is_empty() {
            return Err(InvalidArgument::EmptySensorName);
        }
        let mut label = String::new();
        label
            .push_str(name)
            .map_err(|_| InvalidArgument::SensorNameTooLong)?;

        Ok(Self {
            name: label,
            sensor_type,
            active: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sensor_type(&self) -> SensorType {
        self.sensor_type
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Copy of this sensor with a different activation
    pub fn with_active(&self, active: bool) -> Self {
        let mut sensor = self.clone();
        sensor.active = active;
        sensor
    }
}

impl PartialEq for Sensor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.sensor_type == other.sensor_type
    }
}

impl Eq for Sensor {}

impl Hash for Sensor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.as_str().hash(state);
        self.sensor_type.hash(state);
    }
}

impl PartialOrd for Sensor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Sensor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .as_str()
            .cmp(other.name.as_str())
            .then(self.sensor_type.cmp(&other.sensor_type))
    }
}

/// Sensors keyed by identity, kept in name order
///
/// Panels address sensors by their position in this order, so it must be
/// deterministic across restarts.
#[derive(Debug, Clone, Default)]
pub struct SensorSet {
    sensors: Vec<Sensor, MAX_SENSORS>,
}

impl SensorSet {
    pub fn new() -> Self {
        Self { sensors: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.sensors.is_full()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Sensor> {
        self.sensors.iter()
    }

    pub fn as_slice(&self) -> &[Sensor] {
        &self.sensors
    }

    /// Position of the sensor with the same identity
    pub fn position(&self, sensor: &Sensor) -> Option<usize> {
        self.sensors.binary_search(sensor).ok()
    }

    /// Stored copy of the sensor with the same identity
    pub fn get(&self, sensor: &Sensor) -> Option<&Sensor> {
        self.position(sensor).map(|i| &self.sensors[i])
    }

    /// Sensor at a position in name order
    pub fn get_index(&self, index: usize) -> Option<&Sensor> {
        self.sensors.get(index)
    }

    pub fn contains(&self, sensor: &Sensor) -> bool {
        self.position(sensor).is_some()
    }

    /// Insert or replace a sensor
    ///
    /// Returns the replaced value, or gives the sensor back if the set is full.
    pub fn upsert(&mut self, sensor: Sensor) -> Result<Option<Sensor>, Sensor> {
        match self.sensors.binary_search(&sensor) {
            Ok(i) => Ok(Some(core::mem::replace(&mut self.sensors[i], sensor))),
            Err(i) => self.sensors.insert(i, sensor).map(|()| None),
        }
    }

    /// Remove the sensor with the same identity
    pub fn remove(&mut self, sensor: &Sensor) -> Option<Sensor> {
        self.position(sensor).map(|i| self.sensors.remove(i))
    }

    /// True if any sensor in the set is active
    pub fn any_active(&self) -> bool {
        self.sensors.iter().any(Sensor::is_active)
    }

    /// True if any sensor would be active once `changed` is applied
    pub fn any_active_with(&self, changed: &Sensor) -> bool {
        changed.is_active()
            || self
                .sensors
                .iter()
                .any(|s| s.is_active() && s != changed)
    }

    pub fn active(&self) -> impl Iterator<Item = &Sensor> {
        self.sensors.iter().filter(|s| s.is_active())
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }
}

impl<'a> IntoIterator for &'a SensorSet {
    type Item = &'a Sensor;
    type IntoIter = core::slice::Iter<'a, Sensor>;

    fn into_iter(self) -> Self::IntoIter {
        self.sensors.iter()
    }
}
