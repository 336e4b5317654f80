//! Stimuli that can change the alarm status

use super::machine::ArmingStatus;

/// A stimulus together with the facts the transition rules need
///
/// The controller reads these facts from the repository before anything is
/// written, so a rule never sees a half-applied change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Stimulus {
    /// A sensor went from inactive to active
    SensorActivated {
        /// Arming status at the moment of the change
        arming: ArmingStatus,
    },
    /// A sensor went from active to inactive
    SensorDeactivated {
        /// Whether any sensor is still active once this one is released
        any_active: bool,
    },
    /// The camera classifier returned a verdict
    ImageClassified {
        cat: bool,
        arming: ArmingStatus,
        any_active: bool,
    },
    /// The operator selected an arming mode
    ArmingChanged {
        arming: ArmingStatus,
        /// Last-known camera verdict
        cat_detected: bool,
    },
}
