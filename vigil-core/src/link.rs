//! Keypad panel link
//!
//! Connects a panel speaking the `vigil-protocol` frame format to the alarm
//! controller. Incoming bytes are reassembled into frames, decoded into
//! [`PanelCommand`]s and applied to the controller; replies are handed back
//! as encoded frames for the caller to write to its transport.

use vigil_protocol::{
    ControllerMessage, Frame, FrameError, FrameParser, KeypadKey, PanelCommand, ALARM_CODE_ALARM,
    ALARM_CODE_NONE, ALARM_CODE_PENDING, ARMING_CODE_AWAY, ARMING_CODE_DISARMED, ARMING_CODE_HOME,
};

use crate::controller::AlarmController;
use crate::error::{Error, InvalidArgument};
use crate::notify::Notification;
use crate::status::{AlarmStatus, ArmingStatus};
use crate::traits::{ImageClassifier, SecurityRepository};

/// Panel link errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// A reply could not be encoded
    Frame(FrameError),
    /// The controller rejected a command
    Controller(Error),
}

impl From<FrameError> for LinkError {
    fn from(e: FrameError) -> Self {
        LinkError::Frame(e)
    }
}

impl From<Error> for LinkError {
    fn from(e: Error) -> Self {
        LinkError::Controller(e)
    }
}

impl From<KeypadKey> for ArmingStatus {
    fn from(key: KeypadKey) -> Self {
        match key {
            KeypadKey::Disarm => ArmingStatus::Disarmed,
            KeypadKey::ArmHome => ArmingStatus::ArmedHome,
            KeypadKey::ArmAway => ArmingStatus::ArmedAway,
        }
    }
}

/// Wire code for an alarm status
pub fn alarm_code(status: AlarmStatus) -> u8 {
    match status {
        AlarmStatus::NoAlarm => ALARM_CODE_NONE,
        AlarmStatus::PendingAlarm => ALARM_CODE_PENDING,
        AlarmStatus::Alarm => ALARM_CODE_ALARM,
    }
}

/// Wire code for an arming status
pub fn arming_code(status: ArmingStatus) -> u8 {
    match status {
        ArmingStatus::Disarmed => ARMING_CODE_DISARMED,
        ArmingStatus::ArmedHome => ARMING_CODE_HOME,
        ArmingStatus::ArmedAway => ARMING_CODE_AWAY,
    }
}

/// Panel link state
pub struct PanelLink {
    parser: FrameParser,
    /// Sequence number of the last status update sent
    seq: u8,
    last_acked: Option<u8>,
    rx_errors: u32,
}

impl Default for PanelLink {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelLink {
    pub fn new() -> Self {
        Self {
            parser: FrameParser::new(),
            seq: 0,
            last_acked: None,
            rx_errors: 0,
        }
    }

    /// Frames dropped for bad checksums, lengths or contents
    pub fn rx_errors(&self) -> u32 {
        self.rx_errors
    }

    /// Sequence number of the most recent status the panel acknowledged
    pub fn last_acked(&self) -> Option<u8> {
        self.last_acked
    }

    /// True when the panel has acknowledged the latest status update
    pub fn in_sync(&self) -> bool {
        self.last_acked == Some(self.seq)
    }

    /// Feed received bytes and apply every complete command
    ///
    /// Malformed frames are counted and skipped. A command the controller
    /// rejects does not stop the remaining bytes from being processed; the
    /// first such error is returned once the buffer is consumed.
    pub fn receive<R, C, F>(
        &mut self,
        controller: &mut AlarmController<R, C>,
        bytes: &[u8],
        mut emit: F,
    ) -> Result<(), LinkError>
    where
        R: SecurityRepository,
        C: ImageClassifier,
        F: FnMut(Frame),
    {
        let mut first_error = None;

        for &byte in bytes {
            let frame = match self.parser.feed(byte) {
                Ok(Some(frame)) => frame,
                Ok(None) => continue,
                Err(e) => {
                    self.frame_dropped(e);
                    continue;
                }
            };

            let command = match PanelCommand::from_frame(&frame) {
                Ok(command) => command,
                Err(e) => {
                    self.frame_dropped(e);
                    continue;
                }
            };

            let mut encode_error = None;
            let result = self.handle(controller, command, &mut |message: ControllerMessage| {
                match message.to_frame() {
                    Ok(frame) => emit(frame),
                    Err(e) => {
                        encode_error.get_or_insert(e);
                    }
                }
            });

            if let Err(e) = result {
                warn!("Panel command rejected: {}", e);
                first_error.get_or_insert(LinkError::Controller(e));
            }
            if let Some(e) = encode_error {
                first_error.get_or_insert(LinkError::Frame(e));
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Apply one panel command and emit the direct replies
    ///
    /// Sensor commands address sensors by their position in the controller's
    /// ordered sensor set.
    pub fn handle<R, C>(
        &mut self,
        controller: &mut AlarmController<R, C>,
        command: PanelCommand,
        emit: &mut impl FnMut(ControllerMessage),
    ) -> Result<(), Error>
    where
        R: SecurityRepository,
        C: ImageClassifier,
    {
        match command {
            PanelCommand::Key(key) => {
                debug!("Panel key {}", key);
                controller.set_arming_status(key.into())?;
                emit(self.status(controller)?);
                self.emit_sensors(controller, emit)?;
            }
            PanelCommand::Sensor { index, active } => {
                let mut sensor = controller
                    .sensors()?
                    .get_index(usize::from(index))
                    .cloned()
                    .ok_or(InvalidArgument::UnknownSensor)?;
                controller.change_sensor_activation(&mut sensor, active)?;
                emit(ControllerMessage::Sensor {
                    index,
                    active: sensor.is_active(),
                });
                emit(self.status(controller)?);
            }
            PanelCommand::Ping => emit(ControllerMessage::Pong),
            PanelCommand::Ack { seq } => {
                if seq != self.seq {
                    debug!("Stale ack {} (latest {})", seq, self.seq);
                }
                self.last_acked = Some(seq);
            }
        }
        Ok(())
    }

    /// Drain the controller's notifications into panel messages
    pub fn publish<R, C>(
        &mut self,
        controller: &mut AlarmController<R, C>,
        emit: &mut impl FnMut(ControllerMessage),
    ) -> Result<(), Error>
    where
        R: SecurityRepository,
        C: ImageClassifier,
    {
        let mut status_due = false;
        let mut sensors_due = false;

        while let Some(notification) = controller.next_notification() {
            match notification {
                Notification::AlarmStatus(_) => status_due = true,
                Notification::SensorsChanged => sensors_due = true,
                Notification::CatDetected(cat) => emit(ControllerMessage::CatDetected(cat)),
            }
        }

        if status_due {
            emit(self.status(controller)?);
        }
        if sensors_due {
            self.emit_sensors(controller, emit)?;
        }
        Ok(())
    }

    /// Build the next status update
    fn status<R, C>(&mut self, controller: &AlarmController<R, C>) -> Result<ControllerMessage, Error>
    where
        R: SecurityRepository,
        C: ImageClassifier,
    {
        let alarm = controller.alarm_status()?;
        let arming = controller.arming_status()?;
        self.seq = self.seq.wrapping_add(1);
        Ok(ControllerMessage::Status {
            seq: self.seq,
            alarm: alarm_code(alarm),
            arming: arming_code(arming),
        })
    }

    fn emit_sensors<R, C>(
        &self,
        controller: &AlarmController<R, C>,
        emit: &mut impl FnMut(ControllerMessage),
    ) -> Result<(), Error>
    where
        R: SecurityRepository,
        C: ImageClassifier,
    {
        for (index, sensor) in controller.sensors()?.iter().enumerate() {
            // Set capacity is below u8::MAX
            emit(ControllerMessage::Sensor {
                index: index as u8,
                active: sensor.is_active(),
            });
        }
        Ok(())
    }

    fn frame_dropped(&mut self, error: FrameError) {
        self.rx_errors = self.rx_errors.saturating_add(1);
        warn!("Dropped panel frame: {}", error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControllerConfig;
    use crate::repository::MemoryRepository;
    use crate::sensor::{Sensor, SensorSet, SensorType};
    use crate::traits::ClassifierError;
    use vigil_protocol::FRAME_START;

    struct CatCamera;

    impl ImageClassifier for CatCamera {
        type Image = [u8];

        fn image_contains_cat(&mut self, image: &[u8], _: f32) -> Result<bool, ClassifierError> {
            Ok(image.first() == Some(&1))
        }
    }

    fn controller() -> AlarmController<MemoryRepository, CatCamera> {
        let mut sensors = SensorSet::new();
        sensors
            .upsert(Sensor::new("Front", SensorType::Door).unwrap())
            .unwrap();
        sensors
            .upsert(Sensor::new("Hall", SensorType::Motion).unwrap())
            .unwrap();
        AlarmController::new(
            MemoryRepository::with_sensors(sensors),
            CatCamera,
            &ControllerConfig::default(),
        )
        .unwrap()
    }

    fn wire(commands: &[PanelCommand]) -> std::vec::Vec<u8> {
        let mut bytes = std::vec::Vec::new();
        for command in commands {
            let encoded = command.to_frame().unwrap().encode_to_vec().unwrap();
            bytes.extend_from_slice(&encoded);
        }
        bytes
    }

    fn replies(frames: &[Frame]) -> std::vec::Vec<ControllerMessage> {
        frames
            .iter()
            .map(|frame| ControllerMessage::from_frame(frame).unwrap())
            .collect()
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(ArmingStatus::from(KeypadKey::Disarm), ArmingStatus::Disarmed);
        assert_eq!(ArmingStatus::from(KeypadKey::ArmHome), ArmingStatus::ArmedHome);
        assert_eq!(ArmingStatus::from(KeypadKey::ArmAway), ArmingStatus::ArmedAway);
    }

    #[test]
    fn test_arm_key_reports_status_and_sensors() {
        let mut ctl = controller();
        let mut link = PanelLink::new();
        let mut frames = std::vec::Vec::new();

        link.receive(
            &mut ctl,
            &wire(&[PanelCommand::Key(KeypadKey::ArmAway)]),
            |frame| frames.push(frame),
        )
        .unwrap();

        assert_eq!(ctl.arming_status(), Ok(ArmingStatus::ArmedAway));
        assert_eq!(
            replies(&frames),
            [
                ControllerMessage::Status {
                    seq: 1,
                    alarm: ALARM_CODE_NONE,
                    arming: ARMING_CODE_AWAY,
                },
                ControllerMessage::Sensor {
                    index: 0,
                    active: false
                },
                ControllerMessage::Sensor {
                    index: 1,
                    active: false
                },
            ]
        );
    }

    #[test]
    fn test_sensor_contacts_escalate() {
        let mut ctl = controller();
        let mut link = PanelLink::new();
        let mut frames = std::vec::Vec::new();

        let bytes = wire(&[
            PanelCommand::Key(KeypadKey::ArmHome),
            PanelCommand::Sensor {
                index: 0,
                active: true,
            },
            PanelCommand::Sensor {
                index: 1,
                active: true,
            },
        ]);
        link.receive(&mut ctl, &bytes, |frame| frames.push(frame))
            .unwrap();

        assert_eq!(ctl.alarm_status(), Ok(AlarmStatus::Alarm));
        let messages = replies(&frames);
        assert_eq!(
            messages.last(),
            Some(&ControllerMessage::Status {
                seq: 3,
                alarm: ALARM_CODE_ALARM,
                arming: ARMING_CODE_HOME,
            })
        );
    }

    #[test]
    fn test_unknown_sensor_index() {
        let mut ctl = controller();
        let mut link = PanelLink::new();
        let mut frames = std::vec::Vec::new();

        let bytes = wire(&[
            PanelCommand::Sensor {
                index: 9,
                active: true,
            },
            PanelCommand::Ping,
        ]);
        let result = link.receive(&mut ctl, &bytes, |frame| frames.push(frame));

        assert_eq!(
            result,
            Err(LinkError::Controller(Error::InvalidArgument(
                InvalidArgument::UnknownSensor
            )))
        );
        // Processing continued past the rejected command
        assert_eq!(replies(&frames), [ControllerMessage::Pong]);
    }

    #[test]
    fn test_garbage_and_bad_checksum_are_skipped() {
        let mut ctl = controller();
        let mut link = PanelLink::new();
        let mut frames = std::vec::Vec::new();

        let mut bytes = std::vec::Vec::from([0x00, 0x13, FRAME_START, 0x00, 0x02, 0xFF]);
        bytes.extend(wire(&[PanelCommand::Ping]));
        link.receive(&mut ctl, &bytes, |frame| frames.push(frame))
            .unwrap();

        assert_eq!(link.rx_errors(), 1);
        assert_eq!(replies(&frames), [ControllerMessage::Pong]);
    }

    #[test]
    fn test_frames_split_across_reads() {
        let mut ctl = controller();
        let mut link = PanelLink::new();
        let mut frames = std::vec::Vec::new();

        let bytes = wire(&[PanelCommand::Key(KeypadKey::ArmHome)]);
        let (head, tail) = bytes.split_at(2);
        link.receive(&mut ctl, head, |frame| frames.push(frame))
            .unwrap();
        assert!(frames.is_empty());
        link.receive(&mut ctl, tail, |frame| frames.push(frame))
            .unwrap();

        assert_eq!(ctl.arming_status(), Ok(ArmingStatus::ArmedHome));
        assert_eq!(frames.len(), 3);
    }

    #[test]
    fn test_ack_tracking() {
        let mut ctl = controller();
        let mut link = PanelLink::new();
        let mut sink = |_: ControllerMessage| {};

        link.handle(&mut ctl, PanelCommand::Key(KeypadKey::Disarm), &mut sink)
            .unwrap();
        assert!(!link.in_sync());

        link.handle(&mut ctl, PanelCommand::Ack { seq: 1 }, &mut sink)
            .unwrap();
        assert_eq!(link.last_acked(), Some(1));
        assert!(link.in_sync());
    }

    #[test]
    fn test_publish_camera_verdict() {
        let mut ctl = controller();
        let mut link = PanelLink::new();
        let mut sink = |_: ControllerMessage| {};
        link.handle(&mut ctl, PanelCommand::Key(KeypadKey::ArmHome), &mut sink)
            .unwrap();
        ctl.notifications().for_each(drop);

        ctl.process_image(&[1u8][..]).unwrap();

        let mut messages = std::vec::Vec::new();
        link.publish(&mut ctl, &mut |message| messages.push(message))
            .unwrap();
        assert_eq!(
            messages,
            [
                ControllerMessage::CatDetected(true),
                ControllerMessage::Status {
                    seq: 2,
                    alarm: ALARM_CODE_ALARM,
                    arming: ARMING_CODE_HOME,
                },
            ]
        );
    }
}
