//! Mock actuator bus for testing
//!
//! A [`UartInterface`] whose far end is a set of simulated actuators. Every
//! transmitted frame is decoded and answered the way an AX-series actuator
//! would answer it, with knobs for silence, corruption and scripted motion.

use std::collections::{BTreeMap, VecDeque};
use std::vec::Vec;

use crate::bus::{ActuatorFault, InstructionPacket, Instruction, Register, StatusPacket, BROADCAST_ID};
use crate::platform::traits::UartInterface;
use crate::platform::{PlatformError, Result, UartError};

/// Size of the simulated control table
pub const CONTROL_TABLE_LEN: usize = 50;

#[derive(Debug, Clone)]
struct MockActuator {
    registers: [u8; CONTROL_TABLE_LEN],
    positions: VecDeque<u16>,
    fault: ActuatorFault,
    silent: bool,
    corrupt: bool,
    truncated: bool,
}

impl MockActuator {
    fn new() -> Self {
        let mut registers = [0u8; CONTROL_TABLE_LEN];
        let ccw = Register::CCW_ANGLE_LIMIT.address as usize;
        registers[ccw..ccw + 2].copy_from_slice(&1023u16.to_le_bytes());
        Self {
            registers,
            positions: VecDeque::new(),
            fault: ActuatorFault::empty(),
            silent: false,
            corrupt: false,
            truncated: false,
        }
    }

    fn word(&self, address: u8) -> u16 {
        let a = address as usize;
        u16::from_le_bytes([self.registers[a], self.registers[a + 1]])
    }

    fn store(&mut self, address: u8, data: &[u8]) -> bool {
        let start = address as usize;
        match self.registers.get_mut(start..start + data.len()) {
            Some(target) => {
                target.copy_from_slice(data);
                true
            }
            None => false,
        }
    }

    /// Present position follows the script, or the goal when unscripted.
    /// The last scripted value sticks.
    fn advance_position(&mut self) {
        let position = if self.positions.len() > 1 {
            self.positions.pop_front()
        } else {
            self.positions.front().copied()
        }
        .unwrap_or_else(|| self.word(Register::GOAL_POSITION.address));
        let _ = self.store(Register::PRESENT_POSITION.address, &position.to_le_bytes());
    }
}

/// Mock actuator bus
#[derive(Debug)]
pub struct MockActuatorBus {
    actuators: BTreeMap<u8, MockActuator>,
    rx: VecDeque<u8>,
    frames: Vec<Vec<u8>>,
    reads: Vec<(u8, u8)>,
    baud_rate: u32,
    fail_writes: bool,
}

impl MockActuatorBus {
    pub fn new() -> Self {
        Self {
            actuators: BTreeMap::new(),
            rx: VecDeque::new(),
            frames: Vec::new(),
            reads: Vec::new(),
            baud_rate: 0,
            fail_writes: false,
        }
    }

    /// Connect an actuator with factory defaults (joint mode, everything
    /// else zero)
    pub fn add_actuator(&mut self, id: u8) {
        self.actuators.insert(id, MockActuator::new());
    }

    /// Present positions reported by successive position reads
    pub fn script_positions(&mut self, id: u8, positions: &[u16]) {
        if let Some(actuator) = self.actuators.get_mut(&id) {
            actuator.positions = positions.iter().copied().collect();
        }
    }

    pub fn set_register(&mut self, id: u8, register: Register, value: u16) {
        if let Some(actuator) = self.actuators.get_mut(&id) {
            let bytes = value.to_le_bytes();
            let _ = actuator.store(register.address, &bytes[..register.width.len() as usize]);
        }
    }

    /// Current register content of `id`
    pub fn register(&self, id: u8, register: Register) -> Option<u16> {
        let actuator = self.actuators.get(&id)?;
        let a = register.address as usize;
        Some(match register.width.len() {
            1 => u16::from(actuator.registers[a]),
            _ => actuator.word(register.address),
        })
    }

    /// Fault bits reported in every status frame of `id`
    pub fn set_fault(&mut self, id: u8, fault: ActuatorFault) {
        if let Some(actuator) = self.actuators.get_mut(&id) {
            actuator.fault = fault;
        }
    }

    /// Stop answering
    pub fn set_silent(&mut self, id: u8, silent: bool) {
        if let Some(actuator) = self.actuators.get_mut(&id) {
            actuator.silent = silent;
        }
    }

    /// Answer with a broken checksum
    pub fn set_corrupt(&mut self, id: u8, corrupt: bool) {
        if let Some(actuator) = self.actuators.get_mut(&id) {
            actuator.corrupt = corrupt;
        }
    }

    /// Answer with the last two bytes missing
    pub fn set_truncated(&mut self, id: u8, truncated: bool) {
        if let Some(actuator) = self.actuators.get_mut(&id) {
            actuator.truncated = truncated;
        }
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Every frame transmitted by the controller, in order
    pub fn frames(&self) -> &[Vec<u8>] {
        &self.frames
    }

    /// `(id, address)` of every read instruction, in order
    pub fn reads(&self) -> &[(u8, u8)] {
        &self.reads
    }

    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    fn handle(&mut self, packet: &InstructionPacket) {
        if packet.id == BROADCAST_ID {
            match (packet.instruction, packet.params.as_slice()) {
                (Instruction::SyncWrite, params) => self.apply_sync_write(params),
                (Instruction::Write, &[address, ref value @ ..]) if !value.is_empty() => {
                    for actuator in self.actuators.values_mut() {
                        actuator.store(address, value);
                    }
                }
                _ => {}
            }
            return;
        }
        let Some(actuator) = self.actuators.get_mut(&packet.id) else {
            return;
        };

        let mut fault = actuator.fault;
        let mut data: &[u8] = &[];
        let mut read_buf = [0u8; 2];
        match (packet.instruction, packet.params.as_slice()) {
            (Instruction::Ping, _) => {}
            (Instruction::Read, &[address, len]) => {
                self.reads.push((packet.id, address));
                if address == Register::PRESENT_POSITION.address {
                    actuator.advance_position();
                }
                let start = address as usize;
                match actuator.registers.get(start..start + len as usize) {
                    Some(bytes) if bytes.len() <= read_buf.len() => {
                        read_buf[..bytes.len()].copy_from_slice(bytes);
                        data = &read_buf[..bytes.len()];
                    }
                    _ => fault |= ActuatorFault::VALUE_OUT_OF_RANGE,
                }
            }
            (Instruction::Write, &[address, ref value @ ..]) if !value.is_empty() => {
                if !actuator.store(address, value) {
                    fault |= ActuatorFault::VALUE_OUT_OF_RANGE;
                }
            }
            _ => fault |= ActuatorFault::INVALID_INSTRUCTION,
        }

        if actuator.silent {
            return;
        }
        let (corrupt, truncated) = (actuator.corrupt, actuator.truncated);
        let Ok(status) = StatusPacket::new(packet.id, fault, data) else {
            return;
        };
        let mut frame: Vec<u8> = status.encode().iter().copied().collect();
        if corrupt {
            if let Some(last) = frame.last_mut() {
                *last = last.wrapping_add(1);
            }
        }
        if truncated {
            frame.truncate(frame.len().saturating_sub(2));
        }
        self.rx.extend(frame);
    }

    fn apply_sync_write(&mut self, params: &[u8]) {
        let [address, len, ref blocks @ ..] = *params else {
            return;
        };
        let stride = len as usize + 1;
        if len == 0 {
            return;
        }
        for block in blocks.chunks_exact(stride) {
            if let Some(actuator) = self.actuators.get_mut(&block[0]) {
                let _ = actuator.store(address, &block[1..]);
            }
        }
    }
}

impl Default for MockActuatorBus {
    fn default() -> Self {
        Self::new()
    }
}

impl UartInterface for MockActuatorBus {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        if self.fail_writes {
            return Err(PlatformError::Uart(UartError::WriteFailed));
        }
        self.frames.push(data.to_vec());
        // a frame the actuators cannot parse is dropped silently
        if let Ok(packet) = InstructionPacket::decode(data) {
            self.handle(&packet);
        }
        Ok(data.len())
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let mut count = 0;
        for slot in buffer.iter_mut() {
            match self.rx.pop_front() {
                Some(byte) => {
                    *slot = byte;
                    count += 1;
                }
                None => break,
            }
        }
        Ok(count)
    }

    fn set_baud_rate(&mut self, baud: u32) -> Result<()> {
        if baud == 0 {
            return Err(PlatformError::Uart(UartError::InvalidBaudRate));
        }
        self.baud_rate = baud;
        Ok(())
    }

    fn available(&self) -> bool {
        !self.rx.is_empty()
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
