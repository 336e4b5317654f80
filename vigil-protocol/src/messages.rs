//! Message types for the panel link
//!
//! Message types are divided into two categories:
//! - Panel → Controller: key presses, wired sensor contacts, heartbeat requests
//! - Controller → Panel: status updates, heartbeat responses

use crate::events::KeypadKey;
use crate::frame::{Frame, FrameError};

// Message type IDs: Panel → Controller
pub const MSG_KEY: u8 = 0x01;
pub const MSG_PING: u8 = 0x02;
pub const MSG_ACK: u8 = 0x03;
pub const MSG_SENSOR_INPUT: u8 = 0x10;

// Message type IDs: Controller → Panel
pub const MSG_STATUS: u8 = 0x20;
pub const MSG_SENSOR_STATE: u8 = 0x21;
pub const MSG_CAT: u8 = 0x22;
pub const MSG_PONG: u8 = 0x24;

// Alarm status codes carried in MSG_STATUS
pub const ALARM_CODE_NONE: u8 = 0x00;
pub const ALARM_CODE_PENDING: u8 = 0x01;
pub const ALARM_CODE_ALARM: u8 = 0x02;

// Arming status codes carried in MSG_STATUS
pub const ARMING_CODE_DISARMED: u8 = 0x00;
pub const ARMING_CODE_HOME: u8 = 0x01;
pub const ARMING_CODE_AWAY: u8 = 0x02;

fn flag(byte: u8) -> Result<bool, FrameError> {
    match byte {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(FrameError::InvalidFrame),
    }
}

/// Commands parsed from panel-originated frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelCommand {
    /// Arming key pressed
    Key(KeypadKey),
    /// Wired sensor contact changed
    ///
    /// `index` is the sensor's position in the controller's sensor list.
    Sensor { index: u8, active: bool },
    /// Heartbeat request
    Ping,
    /// Acknowledgement of a received status update
    Ack { seq: u8 },
}

impl PanelCommand {
    /// Parse a command from a frame
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        let payload = frame.payload.as_slice();
        match (frame.msg_type, payload) {
            (MSG_KEY, [key, ..]) => KeypadKey::from_byte(*key)
                .map(PanelCommand::Key)
                .ok_or(FrameError::InvalidFrame),
            (MSG_SENSOR_INPUT, [index, active, ..]) => Ok(PanelCommand::Sensor {
                index: *index,
                active: flag(*active)?,
            }),
            (MSG_PING, _) => Ok(PanelCommand::Ping),
            (MSG_ACK, [seq, ..]) => Ok(PanelCommand::Ack { seq: *seq }),
            _ => Err(FrameError::InvalidFrame),
        }
    }

    /// Encode this command into a frame (panel side, or simulation)
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match self {
            PanelCommand::Key(key) => Frame::new(MSG_KEY, &[key.to_byte()]),
            PanelCommand::Sensor { index, active } => {
                Frame::new(MSG_SENSOR_INPUT, &[*index, *active as u8])
            }
            PanelCommand::Ping => Ok(Frame::empty(MSG_PING)),
            PanelCommand::Ack { seq } => Frame::new(MSG_ACK, &[*seq]),
        }
    }
}

/// Messages from the controller to the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerMessage {
    /// Current alarm and arming status (`ALARM_CODE_*`, `ARMING_CODE_*`)
    Status { seq: u8, alarm: u8, arming: u8 },
    /// A sensor's committed state
    Sensor { index: u8, active: bool },
    /// Latest camera verdict
    CatDetected(bool),
    /// Heartbeat response
    Pong,
}

impl ControllerMessage {
    /// Encode this message into a frame
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match self {
            ControllerMessage::Status { seq, alarm, arming } => {
                Frame::new(MSG_STATUS, &[*seq, *alarm, *arming])
            }
            ControllerMessage::Sensor { index, active } => {
                Frame::new(MSG_SENSOR_STATE, &[*index, *active as u8])
            }
            ControllerMessage::CatDetected(cat) => Frame::new(MSG_CAT, &[*cat as u8]),
            ControllerMessage::Pong => Ok(Frame::empty(MSG_PONG)),
        }
    }

    /// Parse a message from a frame (panel side, or tests)
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        match (frame.msg_type, frame.payload.as_slice()) {
            (MSG_STATUS, [seq, alarm, arming, ..]) => Ok(ControllerMessage::Status {
                seq: *seq,
                alarm: *alarm,
                arming: *arming,
            }),
            (MSG_SENSOR_STATE, [index, active, ..]) => Ok(ControllerMessage::Sensor {
                index: *index,
                active: flag(*active)?,
            }),
            (MSG_CAT, [cat, ..]) => Ok(ControllerMessage::CatDetected(flag(*cat)?)),
            (MSG_PONG, _) => Ok(ControllerMessage::Pong),
            _ => Err(FrameError::InvalidFrame),
        }
    }
}
