//! Key presses from the keypad panel

/// Arming keys on the keypad panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeypadKey {
    /// "OFF" key, disarm the system
    Disarm,
    /// "STAY" key, arm while the household is at home
    ArmHome,
    /// "AWAY" key, arm while the house is empty
    ArmAway,
}

// Wire format values
const KEY_DISARM: u8 = 0x01;
const KEY_ARM_HOME: u8 = 0x02;
const KEY_ARM_AWAY: u8 = 0x03;

impl KeypadKey {
    /// Parse a key from its wire format byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            KEY_DISARM => Some(KeypadKey::Disarm),
            KEY_ARM_HOME => Some(KeypadKey::ArmHome),
            KEY_ARM_AWAY => Some(KeypadKey::ArmAway),
            _ => None,
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            KeypadKey::Disarm => KEY_DISARM,
            KeypadKey::ArmHome => KEY_ARM_HOME,
            KeypadKey::ArmAway => KEY_ARM_AWAY,
        }
    }

    /// Returns true if this key arms the system
    pub fn is_arming(&self) -> bool {
        matches!(self, KeypadKey::ArmHome | KeypadKey::ArmAway)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bytes() {
        assert_eq!(KeypadKey::from_byte(0x01), Some(KeypadKey::Disarm));
        assert_eq!(KeypadKey::from_byte(0x02), Some(KeypadKey::ArmHome));
        assert_eq!(KeypadKey::ArmAway.to_byte(), 0x03);
    }

    #[test]
    fn test_is_arming() {
        assert!(KeypadKey::ArmHome.is_arming());
        assert!(KeypadKey::ArmAway.is_arming());
        assert!(!KeypadKey::Disarm.is_arming());
    }

    #[test]
    fn test_unknown_key() {
        assert!(KeypadKey::from_byte(0xFF).is_none());
        assert!(KeypadKey::from_byte(0x00).is_none());
    }
}
