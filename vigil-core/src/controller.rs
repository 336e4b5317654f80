//! Alarm controller
//!
//! The controller is the only writer of alarm status. For every stimulus it:
//! - reads the facts the transition rules need from the repository
//! - decides the next alarm status before touching anything
//! - writes sensor changes, then the alarm status, then (for arming) the
//!   arming status
//! - queues notifications once the whole change is committed
//!
//! If a write fails part way, the writes already made for that stimulus are
//! undone on a best-effort basis and the error is returned.

use heapless::Vec;

use crate::config::{threshold_in_range, ControllerConfig};
use crate::error::{Error, InvalidArgument};
use crate::notify::{Notification, Outbox};
use crate::sensor::{Sensor, SensorSet, MAX_SENSORS};
use crate::status::{AlarmStatus, ArmingStatus, Stimulus};
use crate::traits::{ImageClassifier, SecurityRepository};

/// Alarm decision controller
///
/// Generic over the status repository `R` and the camera classifier `C`, both
/// injected at construction.
pub struct AlarmController<R, C> {
    repository: R,
    classifier: C,
    /// Classifier confidence threshold (percent)
    confidence_threshold: f32,
    /// Verdict of the most recently classified frame
    cat_detected: bool,
    outbox: Outbox,
}

impl<R: SecurityRepository, C: ImageClassifier> AlarmController<R, C> {
    /// Create a controller
    ///
    /// Only the confidence threshold is taken from `config`; use
    /// [`provision`](Self::provision) to register configured sensors.
    pub fn new(repository: R, classifier: C, config: &ControllerConfig) -> Result<Self, Error> {
        if !threshold_in_range(config.confidence_threshold) {
            return Err(InvalidArgument::ThresholdOutOfRange.into());
        }

        Ok(Self {
            repository,
            classifier,
            confidence_threshold: config.confidence_threshold,
            cat_detected: false,
            outbox: Outbox::new(),
        })
    }

    /// Register configured sensors the repository does not know yet
    ///
    /// Returns the number of sensors added.
    pub fn provision(&mut self, config: &ControllerConfig) -> Result<usize, Error> {
        let known = self.repository.sensors()?;
        let mut added = 0;

        for entry in &config.sensors {
            let sensor = entry.to_sensor()?;
            if known.contains(&sensor) {
                continue;
            }
            debug!("Provisioning sensor {}", sensor.name());
            self.repository.add_sensor(sensor)?;
            added += 1;
        }

        if added > 0 {
            self.outbox.push(Notification::SensorsChanged);
        }
        Ok(added)
    }

    /// Get the repository
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Take the collaborators back
    pub fn into_parts(self) -> (R, C) {
        (self.repository, self.classifier)
    }

    pub fn alarm_status(&self) -> Result<AlarmStatus, Error> {
        Ok(self.repository.alarm_status()?)
    }

    pub fn arming_status(&self) -> Result<ArmingStatus, Error> {
        Ok(self.repository.arming_status()?)
    }

    pub fn sensors(&self) -> Result<SensorSet, Error> {
        Ok(self.repository.sensors()?)
    }

    /// Verdict of the most recently classified frame
    pub fn cat_detected(&self) -> bool {
        self.cat_detected
    }

    pub fn confidence_threshold(&self) -> f32 {
        self.confidence_threshold
    }

    /// Take the oldest pending notification
    pub fn next_notification(&mut self) -> Option<Notification> {
        self.outbox.pop()
    }

    /// Drain all pending notifications
    pub fn notifications(&mut self) -> impl Iterator<Item = Notification> + '_ {
        core::iter::from_fn(move || self.outbox.pop())
    }

    pub fn add_sensor(&mut self, sensor: Sensor) -> Result<(), Error> {
        info!("Adding {} sensor {}", sensor.sensor_type().label(), sensor.name());
        self.repository.add_sensor(sensor)?;
        self.outbox.push(Notification::SensorsChanged);
        Ok(())
    }

    pub fn remove_sensor(&mut self, sensor: &Sensor) -> Result<(), Error> {
        info!("Removing sensor {}", sensor.name());
        self.repository.remove_sensor(sensor)?;
        self.outbox.push(Notification::SensorsChanged);
        Ok(())
    }

    /// Apply a sensor contact change
    ///
    /// `sensor` is the caller's view of the sensor. If it already reports
    /// `active`, nothing is read or written. Otherwise the new state is
    /// persisted, the alarm rules are applied against the status as it was
    /// before the call, and `sensor` is updated once everything is committed.
    pub fn change_sensor_activation(
        &mut self,
        sensor: &mut Sensor,
        active: bool,
    ) -> Result<(), Error> {
        if sensor.is_active() == active {
            trace!("Sensor {} unchanged", sensor.name());
            return Ok(());
        }

        let changed = sensor.with_active(active);
        let alarm = self.repository.alarm_status()?;
        let sensors = self.repository.sensors()?;
        // What the store held before this call, which may differ from the
        // caller's view
        let stored = sensors.get(&changed).cloned();
        let stimulus = if active {
            Stimulus::SensorActivated {
                arming: self.repository.arming_status()?,
            }
        } else {
            Stimulus::SensorDeactivated {
                any_active: sensors.any_active_with(&changed),
            }
        };
        let next = alarm.next(stimulus);

        self.repository.update_sensor(&changed)?;
        if let Some(status) = next {
            if let Err(e) = self.repository.set_alarm_status(status) {
                match &stored {
                    Some(previous) => self.restore_sensors(core::slice::from_ref(previous)),
                    None => {
                        if self.repository.remove_sensor(&changed).is_err() {
                            warn!("Could not withdraw sensor {}", changed.name());
                        }
                    }
                }
                return Err(e.into());
            }
        }

        sensor.set_active(active);
        info!("Sensor {} active={}", sensor.name(), active);
        if let Some(status) = next {
            self.alarm_written(alarm, status);
        }
        self.outbox.push(Notification::SensorsChanged);
        Ok(())
    }

    /// Select an arming mode
    ///
    /// Disarming always clears the alarm. Arming releases every active
    /// sensor first, and arming home raises the alarm at once if the last
    /// camera frame showed a cat. The arming status is written last.
    pub fn set_arming_status(&mut self, arming: ArmingStatus) -> Result<(), Error> {
        let alarm = self.repository.alarm_status()?;
        let next = alarm.next(Stimulus::ArmingChanged {
            arming,
            cat_detected: self.cat_detected,
        });

        let to_release = if arming.is_armed() {
            self.repository.sensors()?
        } else {
            SensorSet::new()
        };

        let mut released: Vec<Sensor, MAX_SENSORS> = Vec::new();
        for sensor in to_release.active() {
            if let Err(e) = self.repository.update_sensor(&sensor.with_active(false)) {
                self.restore_sensors(&released);
                return Err(e.into());
            }
            // Bounded by the set's capacity
            let _ = released.push(sensor.clone());
        }

        if let Some(status) = next {
            if let Err(e) = self.repository.set_alarm_status(status) {
                self.restore_sensors(&released);
                return Err(e.into());
            }
        }

        if let Err(e) = self.repository.set_arming_status(arming) {
            if next.is_some() && self.repository.set_alarm_status(alarm).is_err() {
                warn!("Could not restore alarm status {}", alarm);
            }
            self.restore_sensors(&released);
            return Err(e.into());
        }

        info!("Arming status {}", arming);
        if !released.is_empty() {
            debug!("Released {} sensors on arming", released.len());
            self.outbox.push(Notification::SensorsChanged);
        }
        if let Some(status) = next {
            self.alarm_written(alarm, status);
        }
        Ok(())
    }

    /// Classify a camera frame and apply the verdict
    ///
    /// The verdict is remembered even if a later repository read fails, so a
    /// subsequent arming change still sees it.
    pub fn process_image(&mut self, image: &C::Image) -> Result<(), Error> {
        let cat = self
            .classifier
            .image_contains_cat(image, self.confidence_threshold)?;
        self.cat_detected = cat;
        self.outbox.push(Notification::CatDetected(cat));
        debug!("Camera verdict: cat={}", cat);

        let alarm = self.repository.alarm_status()?;
        let stimulus = Stimulus::ImageClassified {
            cat,
            arming: self.repository.arming_status()?,
            any_active: self.repository.sensors()?.any_active(),
        };

        if let Some(status) = alarm.next(stimulus) {
            self.repository.set_alarm_status(status)?;
            self.alarm_written(alarm, status);
        }
        Ok(())
    }

    fn alarm_written(&mut self, previous: AlarmStatus, status: AlarmStatus) {
        if previous != status {
            info!("Alarm status {} -> {}", previous, status);
        }
        self.outbox.push(Notification::AlarmStatus(status));
    }

    /// Put sensors back to the given states after a failed stimulus
    fn restore_sensors(&mut self, sensors: &[Sensor]) {
        for sensor in sensors {
            if self.repository.update_sensor(sensor).is_err() {
                warn!("Could not restore sensor {}", sensor.name());
            }
        }
    }
}
