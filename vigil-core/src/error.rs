//! Controller error types

use core::fmt;

use crate::traits::{ClassifierError, StoreError};

/// Contract violations by the caller
///
/// Reported immediately and never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InvalidArgument {
    /// Sensor name is empty
    EmptySensorName,
    /// Sensor name does not fit the name buffer
    SensorNameTooLong,
    /// Sensor is not known to the controller
    UnknownSensor,
    /// Confidence threshold outside 0..=100
    ThresholdOutOfRange,
}

/// Errors returned by controller operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Caller passed an invalid argument
    InvalidArgument(InvalidArgument),
    /// Status repository failed
    Store(StoreError),
    /// Image classifier failed
    Classifier(ClassifierError),
}

impl From<InvalidArgument> for Error {
    fn from(e: InvalidArgument) -> Self {
        Error::InvalidArgument(e)
    }
}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        Error::Store(e)
    }
}

impl From<ClassifierError> for Error {
    fn from(e: ClassifierError) -> Self {
        Error::Classifier(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(e) => write!(f, "invalid argument: {:?}", e),
            Error::Store(e) => write!(f, "status repository failed: {:?}", e),
            Error::Classifier(e) => write!(f, "image classifier failed: {:?}", e),
        }
    }
}
