//! Keypad Panel Link Protocol
//!
//! This crate defines the serial protocol between the alarm controller and
//! the keypad panel mounted by the front door. The panel reports key presses
//! and wired sensor contacts; the controller answers with status updates the
//! panel shows on its LEDs and buzzer.
//!
//! # Protocol Overview
//!
//! All messages use a simple binary frame format:
//! ```text
//! ┌───────┬────────┬──────┬─────────────┬──────────┐
//! │ START │ LENGTH │ TYPE │ PAYLOAD     │ CHECKSUM │
//! │ 1B    │ 1B     │ 1B   │ 0–32B       │ 1B       │
//! └───────┴────────┴──────┴─────────────┴──────────┘
//! ```
//!
//! The panel holds no alarm logic of its own. Every decision is made by the
//! controller.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod events;
pub mod frame;
pub mod messages;

pub use events::KeypadKey;
pub use frame::{Frame, FrameError, FrameParser, FRAME_START, MAX_PAYLOAD_SIZE};
pub use messages::{
    ControllerMessage, PanelCommand, ALARM_CODE_ALARM, ALARM_CODE_NONE, ALARM_CODE_PENDING,
    ARMING_CODE_AWAY, ARMING_CODE_DISARMED, ARMING_CODE_HOME,
};
