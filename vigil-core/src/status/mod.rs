//! Alarm and arming status
//!
//! Defines the authoritative alarm decision rules. The transition function
//! is explicit, finite and deterministic; the controller only gathers the
//! facts a stimulus needs and writes back what the rules decide.

pub mod events;
pub mod machine;

pub use events::Stimulus;
pub use machine::{AlarmStatus, ArmingStatus};
