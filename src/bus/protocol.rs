//! Actuator bus wire constants and control table
//!
//! Frame layout (instruction and status alike):
//!
//! ```text
//! FF FF | id | length | instruction/error | params... | checksum
//! ```
//!
//! `length` counts the bytes after itself (parameters + 2). The checksum is
//! the one's complement of the byte sum from `id` through the last parameter.

/// Frame header
pub const HEADER: [u8; 2] = [0xFF, 0xFF];

/// Reserved "every actuator" id; frames to it elicit no response
pub const BROADCAST_ID: u8 = 0xFE;
/// Highest individually addressable id
pub const MAX_ID: u8 = 0xFC;

/// Largest frame the bus driver builds or accepts
pub const MAX_PACKET_LEN: usize = 150;
/// Header, id, length, instruction and checksum
pub const FRAME_OVERHEAD: usize = 6;
/// Largest parameter block that fits a frame
pub const MAX_PARAMS: usize = MAX_PACKET_LEN - FRAME_OVERHEAD;

/// Byte offsets within a frame
pub mod idx {
    pub const ID: usize = 2;
    pub const LENGTH: usize = 3;
    /// Instruction byte of an instruction frame
    pub const INSTRUCTION: usize = 4;
    /// Error byte of a status frame
    pub const ERROR: usize = 4;
    pub const PARAM_0: usize = 5;
}

/// Instruction codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Instruction {
    Ping = 0x01,
    Read = 0x02,
    Write = 0x03,
    RegWrite = 0x04,
    Action = 0x05,
    Reset = 0x06,
    SyncWrite = 0x83,
}

impl TryFrom<u8> for Instruction {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Ok(match code {
            0x01 => Self::Ping,
            0x02 => Self::Read,
            0x03 => Self::Write,
            0x04 => Self::RegWrite,
            0x05 => Self::Action,
            0x06 => Self::Reset,
            0x83 => Self::SyncWrite,
            other => return Err(other),
        })
    }
}

/// Actuator address: an individual id `0..=MAX_ID` or the broadcast id
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ActuatorId(u8);

impl ActuatorId {
    pub const BROADCAST: Self = Self(BROADCAST_ID);

    /// Individually addressable id, `None` above [`MAX_ID`]
    pub const fn new(id: u8) -> Option<Self> {
        if id <= MAX_ID {
            Some(Self(id))
        } else {
            None
        }
    }

    pub const fn raw(self) -> u8 {
        self.0
    }

    pub const fn is_broadcast(self) -> bool {
        self.0 == BROADCAST_ID
    }
}

impl TryFrom<u8> for ActuatorId {
    type Error = u8;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        match id {
            BROADCAST_ID => Ok(Self::BROADCAST),
            _ => Self::new(id).ok_or(id),
        }
    }
}

/// Number of data bytes behind a control table address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterWidth {
    Byte,
    /// Little-endian 16-bit pair
    Word,
}

impl RegisterWidth {
    pub const fn len(self) -> u8 {
        match self {
            Self::Byte => 1,
            Self::Word => 2,
        }
    }

    pub const fn max_value(self) -> u16 {
        match self {
            Self::Byte => 0xFF,
            Self::Word => 0xFFFF,
        }
    }
}

/// Control table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Register {
    pub address: u8,
    pub width: RegisterWidth,
}

impl Register {
    pub const fn byte(address: u8) -> Self {
        Self {
            address,
            width: RegisterWidth::Byte,
        }
    }

    pub const fn word(address: u8) -> Self {
        Self {
            address,
            width: RegisterWidth::Word,
        }
    }

    // AX-series control table (RAM area unless noted)
    /// EEPROM. Zero together with `CCW_ANGLE_LIMIT` selects wheel mode.
    pub const CW_ANGLE_LIMIT: Self = Self::word(6);
    /// EEPROM
    pub const CCW_ANGLE_LIMIT: Self = Self::word(8);
    pub const TORQUE_ENABLE: Self = Self::byte(24);
    pub const LED: Self = Self::byte(25);
    pub const GOAL_POSITION: Self = Self::word(30);
    pub const MOVING_SPEED: Self = Self::word(32);
    pub const PRESENT_POSITION: Self = Self::word(36);
    pub const PRESENT_SPEED: Self = Self::word(38);
    pub const PRESENT_LOAD: Self = Self::word(40);
    pub const PRESENT_VOLTAGE: Self = Self::byte(42);
    pub const PRESENT_TEMPERATURE: Self = Self::byte(43);
    pub const MOVING: Self = Self::byte(46);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actuator_id_range() {
        assert_eq!(ActuatorId::new(0).map(ActuatorId::raw), Some(0));
        assert_eq!(ActuatorId::new(MAX_ID).map(ActuatorId::raw), Some(0xFC));
        assert_eq!(ActuatorId::new(0xFD), None);
        assert_eq!(ActuatorId::new(BROADCAST_ID), None);
        assert_eq!(ActuatorId::try_from(0xFE), Ok(ActuatorId::BROADCAST));
        assert_eq!(ActuatorId::try_from(0xFF), Err(0xFF));
        assert_eq!(ActuatorId::try_from(0xFD), Err(0xFD));
        assert!(ActuatorId::BROADCAST.is_broadcast());
    }

    #[test]
    fn test_instruction_codes() {
        assert_eq!(Instruction::SyncWrite as u8, 0x83);
        assert_eq!(Instruction::try_from(0x03), Ok(Instruction::Write));
        assert_eq!(Instruction::try_from(0x42), Err(0x42));
    }

    #[test]
    fn test_register_widths() {
        assert_eq!(Register::GOAL_POSITION.address, 30);
        assert_eq!(Register::GOAL_POSITION.width.len(), 2);
        assert_eq!(Register::TORQUE_ENABLE.width.max_value(), 0xFF);
        assert_eq!(Register::PRESENT_POSITION.address, 36);
    }
}
