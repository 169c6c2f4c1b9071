//! Instruction and status frame codec

use heapless::Vec;

use super::protocol::{
    idx, ActuatorId, Instruction, Register, RegisterWidth, FRAME_OVERHEAD, HEADER, MAX_PACKET_LEN,
    MAX_PARAMS,
};
use super::result::{ActuatorFault, CommResult};

/// Parameter block of one frame
pub type Params = Vec<u8, MAX_PARAMS>;
/// Encoded frame
pub type Frame = Vec<u8, MAX_PACKET_LEN>;

/// One's complement of the byte sum
pub fn checksum(bytes: &[u8]) -> u8 {
    !bytes.iter().fold(0u8, |sum, b| sum.wrapping_add(*b))
}

fn encode_frame(id: u8, code: u8, params: &[u8]) -> Frame {
    let mut frame = Frame::new();
    // params never exceed MAX_PARAMS, so the frame always fits
    let _ = frame.extend_from_slice(&HEADER);
    let _ = frame.push(id);
    let _ = frame.push(params.len() as u8 + 2);
    let _ = frame.push(code);
    let _ = frame.extend_from_slice(params);
    let sum = checksum(&frame[idx::ID..]);
    let _ = frame.push(sum);
    frame
}

/// Validate framing and checksum; returns `(id, code, params)`.
fn split_frame(frame: &[u8]) -> Result<(u8, u8, &[u8]), CommResult> {
    if frame.len() < FRAME_OVERHEAD || frame.len() > MAX_PACKET_LEN || frame[..2] != HEADER {
        return Err(CommResult::RxCorrupted);
    }
    if usize::from(frame[idx::LENGTH]) + 4 != frame.len() {
        return Err(CommResult::RxCorrupted);
    }
    let (body, sum) = frame.split_at(frame.len() - 1);
    if checksum(&body[idx::ID..]) != sum[0] {
        return Err(CommResult::RxCorrupted);
    }
    Ok((
        frame[idx::ID],
        frame[idx::INSTRUCTION],
        &body[idx::PARAM_0..],
    ))
}

fn push_value(params: &mut Params, width: RegisterWidth, value: u16) -> Result<(), CommResult> {
    if value > width.max_value() {
        return Err(CommResult::TxProtocolError);
    }
    let [lo, hi] = value.to_le_bytes();
    params.push(lo).map_err(|_| CommResult::TxProtocolError)?;
    if width == RegisterWidth::Word {
        params.push(hi).map_err(|_| CommResult::TxProtocolError)?;
    }
    Ok(())
}

/// Instruction frame sent by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionPacket {
    pub id: u8,
    pub instruction: Instruction,
    pub params: Params,
}

impl InstructionPacket {
    pub fn ping(id: ActuatorId) -> Self {
        Self {
            id: id.raw(),
            instruction: Instruction::Ping,
            params: Params::new(),
        }
    }

    /// Read `register.width` bytes starting at `register.address`
    pub fn read(id: ActuatorId, register: Register) -> Self {
        let mut params = Params::new();
        let _ = params.extend_from_slice(&[register.address, register.width.len()]);
        Self {
            id: id.raw(),
            instruction: Instruction::Read,
            params,
        }
    }

    /// Write `value` to `register`; `TxProtocolError` if it exceeds the width.
    pub fn write(id: ActuatorId, register: Register, value: u16) -> Result<Self, CommResult> {
        let mut params = Params::new();
        let _ = params.push(register.address);
        push_value(&mut params, register.width, value)?;
        Ok(Self {
            id: id.raw(),
            instruction: Instruction::Write,
            params,
        })
    }

    /// One broadcast frame writing a per-target value to `register`.
    ///
    /// Parameters are `[address, data length, (id, value bytes)...]` with the
    /// targets in the given order.
    ///
    /// # Errors
    ///
    /// `TxProtocolError` if `targets` is empty, names the broadcast id, holds
    /// a value wider than the register, or does not fit one frame.
    pub fn sync_write(register: Register, targets: &[(ActuatorId, u16)]) -> Result<Self, CommResult> {
        if targets.is_empty() {
            return Err(CommResult::TxProtocolError);
        }
        let mut params = Params::new();
        let _ = params.extend_from_slice(&[register.address, register.width.len()]);
        for &(id, value) in targets {
            if id.is_broadcast() {
                return Err(CommResult::TxProtocolError);
            }
            params
                .push(id.raw())
                .map_err(|_| CommResult::TxProtocolError)?;
            push_value(&mut params, register.width, value)?;
        }
        Ok(Self {
            id: ActuatorId::BROADCAST.raw(),
            instruction: Instruction::SyncWrite,
            params,
        })
    }

    pub fn encode(&self) -> Frame {
        encode_frame(self.id, self.instruction as u8, &self.params)
    }

    /// Parse a received instruction frame; `RxCorrupted` on any defect.
    pub fn decode(frame: &[u8]) -> Result<Self, CommResult> {
        let (id, code, params) = split_frame(frame)?;
        let instruction = Instruction::try_from(code).map_err(|_| CommResult::RxCorrupted)?;
        Ok(Self {
            id,
            instruction,
            params: Params::from_slice(params).map_err(|_| CommResult::RxCorrupted)?,
        })
    }

    /// `(register address, value)` of a single write instruction
    pub fn as_write(&self) -> Option<(u8, u16)> {
        if self.instruction != Instruction::Write {
            return None;
        }
        match self.params.as_slice() {
            [address, lo] => Some((*address, u16::from(*lo))),
            [address, lo, hi] => Some((*address, u16::from_le_bytes([*lo, *hi]))),
            _ => None,
        }
    }
}

/// Status frame returned by an actuator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPacket {
    pub id: u8,
    /// Raw error byte
    pub error: u8,
    pub params: Params,
}

impl StatusPacket {
    pub fn new(id: u8, fault: ActuatorFault, data: &[u8]) -> Result<Self, CommResult> {
        Ok(Self {
            id,
            error: fault.bits(),
            params: Params::from_slice(data).map_err(|_| CommResult::TxProtocolError)?,
        })
    }

    pub fn fault(&self) -> ActuatorFault {
        ActuatorFault::from_status_byte(self.error)
    }

    /// Register value carried by a read response
    pub fn value(&self) -> Option<u16> {
        match self.params.as_slice() {
            [lo] => Some(u16::from(*lo)),
            [lo, hi] => Some(u16::from_le_bytes([*lo, *hi])),
            _ => None,
        }
    }

    pub fn encode(&self) -> Frame {
        encode_frame(self.id, self.error, &self.params)
    }

    pub fn decode(frame: &[u8]) -> Result<Self, CommResult> {
        let (id, error, params) = split_frame(frame)?;
        Ok(Self {
            id,
            error,
            params: Params::from_slice(params).map_err(|_| CommResult::RxCorrupted)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u8) -> ActuatorId {
        ActuatorId::new(raw).unwrap()
    }

    #[test]
    fn test_write_frame_bytes() {
        let packet = InstructionPacket::write(id(7), Register::GOAL_POSITION, 600).unwrap();
        assert_eq!(
            packet.encode().as_slice(),
            &[0xFF, 0xFF, 0x07, 0x05, 0x03, 0x1E, 0x58, 0x02, 0x78]
        );
    }

    #[test]
    fn test_write_decodes_on_peer() {
        let frame = InstructionPacket::write(id(7), Register::GOAL_POSITION, 600)
            .unwrap()
            .encode();
        let decoded = InstructionPacket::decode(&frame).unwrap();
        assert_eq!(decoded.id, 7);
        assert_eq!(decoded.as_write(), Some((30, 600)));
    }

    #[test]
    fn test_corrupted_payload_rejected() {
        let frame = InstructionPacket::write(id(7), Register::GOAL_POSITION, 600)
            .unwrap()
            .encode();
        for i in idx::ID..frame.len() - 1 {
            let mut corrupted = frame.clone();
            corrupted[i] ^= 0x01;
            assert_eq!(
                InstructionPacket::decode(&corrupted),
                Err(CommResult::RxCorrupted),
                "byte {} flipped",
                i
            );
        }
    }

    #[test]
    fn test_truncated_frame_rejected() {
        let frame = InstructionPacket::ping(id(1)).encode();
        assert_eq!(
            StatusPacket::decode(&frame[..frame.len() - 1]),
            Err(CommResult::RxCorrupted)
        );
        assert_eq!(StatusPacket::decode(&[]), Err(CommResult::RxCorrupted));
    }

    #[test]
    fn test_sync_write_frame() {
        let targets = [(id(1), 0x0100), (id(2), 0x03FF), (id(9), 0x0010)];
        let frame = InstructionPacket::sync_write(Register::GOAL_POSITION, &targets)
            .unwrap()
            .encode();

        assert_eq!(&frame[..5], &[0xFF, 0xFF, 0xFE, 4 + 3 * 3, 0x83]);
        assert_eq!(&frame[5..7], &[30, 2]);
        assert_eq!(
            &frame[7..16],
            &[0x01, 0x00, 0x01, 0x02, 0xFF, 0x03, 0x09, 0x10, 0x00]
        );
        let sum = frame[2..frame.len() - 1]
            .iter()
            .fold(0u32, |acc, b| acc + u32::from(*b));
        assert_eq!(frame[frame.len() - 1], !(sum as u8));
        assert_eq!(frame.len(), 17);
    }

    #[test]
    fn test_sync_write_rejects_bad_targets() {
        assert_eq!(
            InstructionPacket::sync_write(Register::GOAL_POSITION, &[]),
            Err(CommResult::TxProtocolError)
        );
        assert_eq!(
            InstructionPacket::sync_write(Register::GOAL_POSITION, &[(ActuatorId::BROADCAST, 1)]),
            Err(CommResult::TxProtocolError)
        );
        assert_eq!(
            InstructionPacket::sync_write(Register::LED, &[(id(1), 0x100)]),
            Err(CommResult::TxProtocolError)
        );

        // 2 + 48 * 3 = 146 parameter bytes do not fit
        let mut targets = std::vec::Vec::new();
        for raw in 0..48 {
            targets.push((id(raw), 512));
        }
        assert_eq!(
            InstructionPacket::sync_write(Register::GOAL_POSITION, &targets),
            Err(CommResult::TxProtocolError)
        );
        targets.truncate(47);
        assert!(InstructionPacket::sync_write(Register::GOAL_POSITION, &targets).is_ok());
    }

    #[test]
    fn test_byte_write_value_range() {
        let packet = InstructionPacket::write(id(3), Register::TORQUE_ENABLE, 1).unwrap();
        assert_eq!(packet.as_write(), Some((24, 1)));
        assert_eq!(
            InstructionPacket::write(id(3), Register::TORQUE_ENABLE, 256),
            Err(CommResult::TxProtocolError)
        );
    }

    #[test]
    fn test_status_round_trip() {
        let status =
            StatusPacket::new(4, ActuatorFault::OVERHEAT, &600u16.to_le_bytes()).unwrap();
        let frame = status.encode();
        let decoded = StatusPacket::decode(&frame).unwrap();
        assert_eq!(decoded.id, 4);
        assert_eq!(decoded.value(), Some(600));
        assert_eq!(decoded.fault(), ActuatorFault::OVERHEAT);
    }

    #[test]
    fn test_read_params() {
        let packet = InstructionPacket::read(id(4), Register::PRESENT_POSITION);
        assert_eq!(packet.params.as_slice(), &[36, 2]);
        assert_eq!(packet.as_write(), None);
    }
}
