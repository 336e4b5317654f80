//! Status and sensor storage trait

use crate::sensor::{Sensor, SensorSet};
use crate::status::{AlarmStatus, ArmingStatus};

/// Errors reported by a status repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// No room for another sensor
    CapacityExceeded,
    /// Sensor is not stored
    UnknownSensor,
    /// A sensor with the same identity is already stored
    DuplicateSensor,
    /// Stored data could not be decoded or encoded
    Corrupt,
    /// Backing storage did not respond
    Unavailable,
}

/// Current alarm status, arming status and sensor set
///
/// Implementations own the shared state. The controller is the only writer,
/// and it serializes its own calls by taking `&mut self`.
pub trait SecurityRepository {
    fn alarm_status(&self) -> Result<AlarmStatus, StoreError>;

    fn set_alarm_status(&mut self, status: AlarmStatus) -> Result<(), StoreError>;

    fn arming_status(&self) -> Result<ArmingStatus, StoreError>;

    fn set_arming_status(&mut self, status: ArmingStatus) -> Result<(), StoreError>;

    /// All known sensors, as a value copy
    fn sensors(&self) -> Result<SensorSet, StoreError>;

    /// Store a sensor's state, inserting it if it is not known yet
    fn update_sensor(&mut self, sensor: &Sensor) -> Result<(), StoreError>;

    /// Register a new sensor
    ///
    /// Fails with `DuplicateSensor` if the identity is already stored.
    fn add_sensor(&mut self, sensor: Sensor) -> Result<(), StoreError>;

    /// Forget a sensor
    fn remove_sensor(&mut self, sensor: &Sensor) -> Result<(), StoreError>;
}

impl<T: SecurityRepository + ?Sized> SecurityRepository for &mut T {
    fn alarm_status(&self) -> Result<AlarmStatus, StoreError> {
        (**self).alarm_status()
    }

    fn set_alarm_status(&mut self, status: AlarmStatus) -> Result<(), StoreError> {
        (**self).set_alarm_status(status)
    }

    fn arming_status(&self) -> Result<ArmingStatus, StoreError> {
        (**self).arming_status()
    }

    fn set_arming_status(&mut self, status: ArmingStatus) -> Result<(), StoreError> {
        (**self).set_arming_status(status)
    }

    fn sensors(&self) -> Result<SensorSet, StoreError> {
        (**self).sensors()
    }

    fn update_sensor(&mut self, sensor: &Sensor) -> Result<(), StoreError> {
        (**self).update_sensor(sensor)
    }

    fn add_sensor(&mut self, sensor: Sensor) -> Result<(), StoreError> {
        (**self).add_sensor(sensor)
    }

    fn remove_sensor(&mut self, sensor: &Sensor) -> Result<(), StoreError> {
        (**self).remove_sensor(sensor)
    }
}
