//! Board-agnostic alarm decision logic for the Vigil home alarm controller
//!
//! This crate contains everything that decides *whether the house is in
//! alarm*, independent of where sensor contacts, camera frames and keypad
//! presses come from:
//!
//! - Sensor model and the keyed sensor set
//! - Alarm/arming status and the transition rules between them
//! - Collaborator traits (status repository, image classifier)
//! - The alarm controller that applies stimuli through those traits
//! - Status notifications for panels and loggers
//! - The keypad panel link dispatcher
//! - Configuration type definitions and loaders

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod config;
pub mod controller;
pub mod error;
pub mod link;
pub mod notify;
pub mod repository;
pub mod sensor;
pub mod status;
pub mod traits;

pub use controller::AlarmController;
pub use error::{Error, InvalidArgument};
pub use sensor::{Sensor, SensorSet, SensorType};
pub use status::{AlarmStatus, ArmingStatus};
