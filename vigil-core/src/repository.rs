//! In-memory status repository
//!
//! Holds alarm status, arming status and the sensor set in RAM. An embedding
//! application persists it by taking a postcard [`Snapshot`] and writing the
//! bytes wherever it keeps state (flash sector, file, EEPROM).

use crate::sensor::{Sensor, SensorSet};
use crate::status::{AlarmStatus, ArmingStatus};
use crate::traits::{SecurityRepository, StoreError};

#[cfg(feature = "serde")]
use crate::sensor::MAX_SENSORS;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum serialized snapshot size (binary)
pub const MAX_SNAPSHOT_SIZE: usize = 8 + crate::sensor::MAX_SENSORS * 32;

/// RAM-backed [`SecurityRepository`]
///
/// Starts disarmed, with no alarm and no sensors.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    alarm: AlarmStatus,
    arming: ArmingStatus,
    sensors: SensorSet,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-populated with a sensor set
    pub fn with_sensors(sensors: SensorSet) -> Self {
        Self {
            sensors,
            ..Self::default()
        }
    }

    /// Borrow the stored sensors without copying them
    pub fn sensor_set(&self) -> &SensorSet {
        &self.sensors
    }

    /// Capture the current state
    #[cfg(feature = "serde")]
    pub fn snapshot(&self) -> Snapshot {
        let mut sensors = heapless::Vec::new();
        for sensor in &self.sensors {
            // Same capacity as the set
            let _ = sensors.push(sensor.clone());
        }
        Snapshot {
            alarm: self.alarm,
            arming: self.arming,
            sensors,
        }
    }

    /// Rebuild a repository from a snapshot
    ///
    /// Duplicate sensor entries collapse to the last one.
    #[cfg(feature = "serde")]
    pub fn restore(snapshot: Snapshot) -> Self {
        let mut sensors = SensorSet::new();
        for sensor in snapshot.sensors {
            let _ = sensors.upsert(sensor);
        }
        Self {
            alarm: snapshot.alarm,
            arming: snapshot.arming,
            sensors,
        }
    }
}

impl SecurityRepository for MemoryRepository {
    fn alarm_status(&self) -> Result<AlarmStatus, StoreError> {
        Ok(self.alarm)
    }

    fn set_alarm_status(&mut self, status: AlarmStatus) -> Result<(), StoreError> {
        self.alarm = status;
        Ok(())
    }

    fn arming_status(&self) -> Result<ArmingStatus, StoreError> {
        Ok(self.arming)
    }

    fn set_arming_status(&mut self, status: ArmingStatus) -> Result<(), StoreError> {
        self.arming = status;
        Ok(())
    }

    fn sensors(&self) -> Result<SensorSet, StoreError> {
        Ok(self.sensors.clone())
    }

    fn update_sensor(&mut self, sensor: &Sensor) -> Result<(), StoreError> {
        self.sensors
            .upsert(sensor.clone())
            .map(|_| ())
            .map_err(|_| StoreError::CapacityExceeded)
    }

    fn add_sensor(&mut self, sensor: Sensor) -> Result<(), StoreError> {
        if self.sensors.contains(&sensor) {
            return Err(StoreError::DuplicateSensor);
        }
        self.sensors
            .upsert(sensor)
            .map(|_| ())
            .map_err(|_| StoreError::CapacityExceeded)
    }

    fn remove_sensor(&mut self, sensor: &Sensor) -> Result<(), StoreError> {
        self.sensors
            .remove(sensor)
            .map(|_| ())
            .ok_or(StoreError::UnknownSensor)
    }
}

/// Serializable repository state
#[cfg(feature = "serde")]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Snapshot {
    pub alarm: AlarmStatus,
    pub arming: ArmingStatus,
    pub sensors: heapless::Vec<Sensor, MAX_SENSORS>,
}

#[cfg(feature = "serde")]
impl Snapshot {
    /// Serialize into `buffer` as postcard binary
    ///
    /// Returns the number of bytes written.
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, StoreError> {
        postcard::to_slice(self, buffer)
            .map(|used| used.len())
            .map_err(|_| StoreError::Corrupt)
    }

    /// Deserialize postcard binary data
    pub fn decode(bytes: &[u8]) -> Result<Self, StoreError> {
        postcard::from_bytes(bytes).map_err(|_| StoreError::Corrupt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::SensorType;

    fn door(name: &str) -> Sensor {
        Sensor::new(name, SensorType::Door).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let repo = MemoryRepository::new();
        assert_eq!(repo.alarm_status(), Ok(AlarmStatus::NoAlarm));
        assert_eq!(repo.arming_status(), Ok(ArmingStatus::Disarmed));
        assert!(repo.sensors().unwrap().is_empty());
    }

    #[test]
    fn test_update_sensor_upserts() {
        let mut repo = MemoryRepository::new();
        let front = door("Front");

        repo.update_sensor(&front.with_active(true)).unwrap();
        assert!(repo.sensor_set().get(&front).unwrap().is_active());

        repo.update_sensor(&front).unwrap();
        assert_eq!(repo.sensor_set().len(), 1);
        assert!(!repo.sensor_set().get(&front).unwrap().is_active());
    }

    #[test]
    fn test_add_and_remove() {
        let mut repo = MemoryRepository::new();
        let front = door("Front");

        repo.add_sensor(front.clone()).unwrap();
        assert_eq!(
            repo.add_sensor(front.clone()),
            Err(StoreError::DuplicateSensor)
        );

        repo.remove_sensor(&front).unwrap();
        assert_eq!(repo.remove_sensor(&front), Err(StoreError::UnknownSensor));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_snapshot_restore() {
        let mut repo = MemoryRepository::new();
        repo.add_sensor(door("Front").with_active(true)).unwrap();
        repo.add_sensor(door("Back")).unwrap();
        repo.set_alarm_status(AlarmStatus::PendingAlarm).unwrap();
        repo.set_arming_status(ArmingStatus::ArmedAway).unwrap();

        let mut buffer = [0u8; MAX_SNAPSHOT_SIZE];
        let len = repo.snapshot().encode(&mut buffer).unwrap();
        let restored = MemoryRepository::restore(Snapshot::decode(&buffer[..len]).unwrap());

        assert_eq!(restored.alarm_status(), Ok(AlarmStatus::PendingAlarm));
        assert_eq!(restored.arming_status(), Ok(ArmingStatus::ArmedAway));
        let sensors = restored.sensors().unwrap();
        assert_eq!(sensors.len(), 2);
        assert_eq!(sensors.get_index(0).unwrap().name(), "Back");
        assert!(sensors.get(&door("Front")).unwrap().is_active());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_corrupt_snapshot() {
        assert_eq!(Snapshot::decode(&[0x07]).unwrap_err(), StoreError::Corrupt);
    }
}
