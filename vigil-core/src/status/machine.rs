//! Alarm status transition rules
//!
//! Alarm status is a pure function of the current status and a stimulus.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::events::Stimulus;

/// Operator-selected protection mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ArmingStatus {
    #[default]
    Disarmed,
    /// Armed while the household is at home
    ArmedHome,
    /// Armed while the house is empty
    ArmedAway,
}

impl ArmingStatus {
    /// Check if any armed mode is selected
    pub fn is_armed(&self) -> bool {
        !matches!(self, ArmingStatus::Disarmed)
    }
}

/// Derived alarm output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AlarmStatus {
    #[default]
    NoAlarm,
    /// Escalation window; disarming now avoids a full alarm
    PendingAlarm,
    Alarm,
}

impl AlarmStatus {
    /// Check if a full alarm is raised
    pub fn is_alarm(&self) -> bool {
        matches!(self, AlarmStatus::Alarm)
    }

    /// Apply a stimulus
    ///
    /// Returns the status to write, or `None` when the stimulus must not
    /// touch the alarm status at all. A returned status may equal the current
    /// one: disarming and a clear camera frame always write NO_ALARM.
    pub fn next(self, stimulus: Stimulus) -> Option<Self> {
        use AlarmStatus::*;
        use ArmingStatus::*;
        use Stimulus::*;

        match (self, stimulus) {
            // Operator: disarming is the single all-clear
            (_, ArmingChanged { arming: Disarmed, .. }) => Some(NoAlarm),
            // Arming home with a cat already in view
            (_, ArmingChanged {
                arming: ArmedHome,
                cat_detected: true,
            }) => Some(Alarm),
            (_, ArmingChanged { .. }) => None,

            // Camera
            (_, ImageClassified {
                cat: true,
                arming: ArmedHome,
                ..
            }) => Some(Alarm),
            (_, ImageClassified { cat: true, .. }) => None,
            (_, ImageClassified {
                cat: false,
                any_active: false,
                ..
            }) => Some(NoAlarm),
            (_, ImageClassified { .. }) => None,

            // Sensors: a raised alarm absorbs further contact churn
            (Alarm, _) => None,
            (_, SensorActivated { arming: Disarmed }) => None,
            (NoAlarm, SensorActivated { .. }) => Some(PendingAlarm),
            (PendingAlarm, SensorActivated { .. }) => Some(Alarm),
            (PendingAlarm, SensorDeactivated { any_active: false }) => Some(NoAlarm),

            // Default: leave the status alone
            _ => None,
        }
    }

    /// Status after a stimulus, whether or not a write happens
    pub fn after(self, stimulus: Stimulus) -> Self {
        self.next(stimulus).unwrap_or(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ALL_ALARM: [AlarmStatus; 3] = [
        AlarmStatus::NoAlarm,
        AlarmStatus::PendingAlarm,
        AlarmStatus::Alarm,
    ];

    fn activated(arming: ArmingStatus) -> Stimulus {
        Stimulus::SensorActivated { arming }
    }

    #[test]
    fn test_activation_escalates() {
        let armed = activated(ArmingStatus::ArmedAway);
        assert_eq!(
            AlarmStatus::NoAlarm.next(armed),
            Some(AlarmStatus::PendingAlarm)
        );
        assert_eq!(
            AlarmStatus::PendingAlarm.next(armed),
            Some(AlarmStatus::Alarm)
        );
    }

    #[test]
    fn test_activation_while_disarmed_is_ignored() {
        let disarmed = activated(ArmingStatus::Disarmed);
        assert_eq!(AlarmStatus::NoAlarm.next(disarmed), None);
        assert_eq!(AlarmStatus::PendingAlarm.next(disarmed), None);
    }

    #[test]
    fn test_alarm_absorbs_sensor_changes() {
        let stimuli = [
            activated(ArmingStatus::ArmedHome),
            Stimulus::SensorDeactivated { any_active: false },
            Stimulus::SensorDeactivated { any_active: true },
        ];
        for stimulus in stimuli {
            assert_eq!(AlarmStatus::Alarm.next(stimulus), None);
        }
    }

    #[test]
    fn test_pending_clears_only_when_all_inactive() {
        assert_eq!(
            AlarmStatus::PendingAlarm.next(Stimulus::SensorDeactivated { any_active: false }),
            Some(AlarmStatus::NoAlarm)
        );
        assert_eq!(
            AlarmStatus::PendingAlarm.next(Stimulus::SensorDeactivated { any_active: true }),
            None
        );
        assert_eq!(
            AlarmStatus::NoAlarm.next(Stimulus::SensorDeactivated { any_active: false }),
            None
        );
    }

    #[test]
    fn test_disarm_clears_everything() {
        let disarm = Stimulus::ArmingChanged {
            arming: ArmingStatus::Disarmed,
            cat_detected: true,
        };
        for status in ALL_ALARM {
            assert_eq!(status.next(disarm), Some(AlarmStatus::NoAlarm));
        }
    }

    #[test]
    fn test_arming_with_cat() {
        let home = Stimulus::ArmingChanged {
            arming: ArmingStatus::ArmedHome,
            cat_detected: true,
        };
        let away = Stimulus::ArmingChanged {
            arming: ArmingStatus::ArmedAway,
            cat_detected: true,
        };
        let home_clear = Stimulus::ArmingChanged {
            arming: ArmingStatus::ArmedHome,
            cat_detected: false,
        };
        assert_eq!(AlarmStatus::NoAlarm.next(home), Some(AlarmStatus::Alarm));
        assert_eq!(AlarmStatus::NoAlarm.next(away), None);
        assert_eq!(AlarmStatus::PendingAlarm.next(home_clear), None);
    }

    #[test]
    fn test_image_rules() {
        let cat_home = Stimulus::ImageClassified {
            cat: true,
            arming: ArmingStatus::ArmedHome,
            any_active: true,
        };
        let cat_away = Stimulus::ImageClassified {
            cat: true,
            arming: ArmingStatus::ArmedAway,
            any_active: false,
        };
        let clear_quiet = Stimulus::ImageClassified {
            cat: false,
            arming: ArmingStatus::ArmedHome,
            any_active: false,
        };
        let clear_busy = Stimulus::ImageClassified {
            cat: false,
            arming: ArmingStatus::ArmedHome,
            any_active: true,
        };

        for status in ALL_ALARM {
            assert_eq!(status.next(cat_home), Some(AlarmStatus::Alarm));
            assert_eq!(status.next(cat_away), None);
            assert_eq!(status.next(clear_quiet), Some(AlarmStatus::NoAlarm));
            assert_eq!(status.next(clear_busy), None);
        }
    }

    #[test]
    fn test_after_keeps_status_without_write() {
        assert_eq!(
            AlarmStatus::Alarm.after(activated(ArmingStatus::ArmedHome)),
            AlarmStatus::Alarm
        );
        assert_eq!(
            AlarmStatus::NoAlarm.after(activated(ArmingStatus::ArmedHome)),
            AlarmStatus::PendingAlarm
        );
    }

    fn arb_arming() -> impl Strategy<Value = ArmingStatus> {
        prop_oneof![
            Just(ArmingStatus::Disarmed),
            Just(ArmingStatus::ArmedHome),
            Just(ArmingStatus::ArmedAway),
        ]
    }

    fn arb_alarm() -> impl Strategy<Value = AlarmStatus> {
        prop_oneof![
            Just(AlarmStatus::NoAlarm),
            Just(AlarmStatus::PendingAlarm),
            Just(AlarmStatus::Alarm),
        ]
    }

    fn arb_sensor_stimulus() -> impl Strategy<Value = Stimulus> {
        prop_oneof![
            arb_arming().prop_map(|arming| Stimulus::SensorActivated { arming }),
            any::<bool>().prop_map(|any_active| Stimulus::SensorDeactivated { any_active }),
        ]
    }

    fn arb_stimulus() -> impl Strategy<Value = Stimulus> {
        prop_oneof![
            arb_sensor_stimulus(),
            (any::<bool>(), arb_arming(), any::<bool>()).prop_map(|(cat, arming, any_active)| {
                Stimulus::ImageClassified {
                    cat,
                    arming,
                    any_active,
                }
            }),
            (arb_arming(), any::<bool>()).prop_map(|(arming, cat_detected)| {
                Stimulus::ArmingChanged {
                    arming,
                    cat_detected,
                }
            }),
        ]
    }

    proptest! {
        // Only disarming or camera evidence can lower a raised alarm.
        #[test]
        fn test_alarm_only_cleared_by_disarm_or_clear_image(
            stimuli in proptest::collection::vec(arb_stimulus(), 1..32),
        ) {
            let mut status = AlarmStatus::Alarm;
            for stimulus in stimuli {
                let next = status.after(stimulus);
                if status.is_alarm() && !next.is_alarm() {
                    let lowered_by_operator = matches!(
                        stimulus,
                        Stimulus::ArmingChanged { arming: ArmingStatus::Disarmed, .. }
                    );
                    let lowered_by_camera = matches!(
                        stimulus,
                        Stimulus::ImageClassified { cat: false, any_active: false, .. }
                    );
                    prop_assert!(lowered_by_operator || lowered_by_camera);
                }
                status = next;
            }
        }

        // Sensor stimuli move the status at most one step at a time.
        #[test]
        fn test_sensor_steps_are_single(status in arb_alarm(), stimulus in arb_sensor_stimulus()) {
            let rank = |s: AlarmStatus| match s {
                AlarmStatus::NoAlarm => 0i8,
                AlarmStatus::PendingAlarm => 1,
                AlarmStatus::Alarm => 2,
            };
            let delta = rank(status.after(stimulus)) - rank(status);
            prop_assert!(delta.abs() <= 1);
        }

        #[test]
        fn test_disarm_always_writes_no_alarm(status in arb_alarm(), cat in any::<bool>()) {
            let disarm = Stimulus::ArmingChanged { arming: ArmingStatus::Disarmed, cat_detected: cat };
            prop_assert_eq!(status.next(disarm), Some(AlarmStatus::NoAlarm));
        }
    }
}
