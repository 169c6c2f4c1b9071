//! Transaction outcome and device fault reporting
//!
//! A bus transaction yields two independent pieces of information: whether
//! the frame made it across the wire ([`CommResult`]) and which conditions
//! the actuator itself reported in its status frame ([`ActuatorFault`]).

use bitflags::bitflags;
use core::fmt;

/// Transport/framing level outcome of one transaction
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommResult {
    Success,
    /// The transport refused the instruction frame
    TxFailure,
    /// The instruction could not be encoded (too many parameters, bad id)
    TxProtocolError,
    /// The transport failed while receiving
    RxFailure,
    /// A status frame is still being received
    RxInProgress,
    /// Nothing arrived within the receive window
    RxTimeout,
    /// Bytes arrived but did not form a valid status frame
    RxCorrupted,
}

impl CommResult {
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    /// `Ok(())` for `Success`, the failure otherwise
    pub fn into_result(self) -> Result<(), CommResult> {
        match self {
            Self::Success => Ok(()),
            failure => Err(failure),
        }
    }
}

impl fmt::Display for CommResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Success => "success",
            Self::TxFailure => "transmit failed",
            Self::TxProtocolError => "instruction not encodable",
            Self::RxFailure => "receive failed",
            Self::RxInProgress => "reception in progress",
            Self::RxTimeout => "no response",
            Self::RxCorrupted => "corrupted response",
        };
        f.write_str(text)
    }
}

bitflags! {
    /// Conditions reported in the error byte of a status frame
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ActuatorFault: u8 {
        const VOLTAGE_OUT_OF_RANGE = 1 << 0;
        const ANGLE_LIMIT_EXCEEDED = 1 << 1;
        const OVERHEAT = 1 << 2;
        const VALUE_OUT_OF_RANGE = 1 << 3;
        /// The actuator rejected our checksum
        const CHECKSUM_ERROR = 1 << 4;
        const OVERLOAD = 1 << 5;
        const INVALID_INSTRUCTION = 1 << 6;
    }
}

impl ActuatorFault {
    /// Decode a status error byte; the unused top bit is dropped.
    pub const fn from_status_byte(byte: u8) -> Self {
        Self::from_bits_truncate(byte)
    }
}

/// Successful read: the register value and the fault bits that came with it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusReading {
    pub value: u16,
    pub fault: ActuatorFault,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_result() {
        assert_eq!(CommResult::Success.into_result(), Ok(()));
        assert_eq!(
            CommResult::RxTimeout.into_result(),
            Err(CommResult::RxTimeout)
        );
        assert!(CommResult::Success.is_success());
        assert!(!CommResult::RxInProgress.is_success());
    }

    #[test]
    fn test_fault_bits() {
        let fault = ActuatorFault::from_status_byte(0b1010_0100);
        assert!(fault.contains(ActuatorFault::OVERHEAT));
        assert!(fault.contains(ActuatorFault::OVERLOAD));
        assert!(!fault.contains(ActuatorFault::VOLTAGE_OUT_OF_RANGE));
        assert_eq!(fault.bits(), 0b0010_0100);
        assert!(ActuatorFault::from_status_byte(0).is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(CommResult::RxCorrupted.to_string(), "corrupted response");
    }
}
