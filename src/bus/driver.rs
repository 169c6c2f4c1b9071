//! Half-duplex actuator bus driver
//!
//! Request/response transactions over a [`UartInterface`]. Each call runs to
//! completion: transmit, then (for reads and pings) busy-wait for the status
//! frame until the receive window closes. The driver never retries; retry
//! policy belongs to the caller.

use super::packet::{InstructionPacket, StatusPacket};
use super::protocol::{ActuatorId, Register};
use super::receiver::StatusReceiver;
use super::result::{ActuatorFault, CommResult, StatusReading};
use crate::core::traits::TimeSource;
use crate::platform::UartInterface;

/// Bus configuration, fixed at initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusConfig {
    pub baud_rate: u32,
    /// Receive window for one status frame
    pub rx_timeout_ms: u32,
    /// Pause between two receive polls, at least 1 ms
    pub rx_poll_interval_ms: u32,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            baud_rate: 1_000_000,
            rx_timeout_ms: 20,
            rx_poll_interval_ms: 1,
        }
    }
}

/// Actuator bus driver
///
/// Owns the transport and the clock used for receive timeouts.
pub struct ActuatorBus<U: UartInterface, C: TimeSource> {
    uart: U,
    clock: C,
    config: BusConfig,
    receiver: StatusReceiver,
    last: (CommResult, ActuatorFault),
}

impl<U: UartInterface, C: TimeSource> ActuatorBus<U, C> {
    /// Bring up the bus at `config.baud_rate`.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the baud rate cannot be set.
    pub fn new(mut uart: U, clock: C, config: BusConfig) -> crate::platform::Result<Self> {
        uart.set_baud_rate(config.baud_rate)?;
        crate::log_info!("bus: {} baud", config.baud_rate);
        Ok(Self {
            uart,
            clock,
            config,
            receiver: StatusReceiver::new(),
            last: (CommResult::Success, ActuatorFault::empty()),
        })
    }

    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Write `value` to `register` of `id` without waiting for the
    /// acknowledgement.
    ///
    /// `Success` means the frame was transmitted.
    pub fn write(&mut self, id: ActuatorId, register: Register, value: u16) -> CommResult {
        let result = match InstructionPacket::write(id, register, value) {
            Ok(packet) => self.transmit(&packet.encode()),
            Err(e) => e,
        };
        if !result.is_success() {
            crate::log_warn!("bus: write {}@{} failed: {}", id.raw(), register.address, result);
        }
        self.record(result, ActuatorFault::empty());
        result
    }

    /// Read `register` of `id`.
    ///
    /// # Errors
    ///
    /// The transport level failure. A failed read never yields a value. When
    /// a status frame arrived but was malformed (`RxCorrupted`), the fault
    /// bits it carried are kept in [`Self::last_status`].
    pub fn read(&mut self, id: ActuatorId, register: Register) -> Result<StatusReading, CommResult> {
        if id.is_broadcast() {
            self.record(CommResult::TxProtocolError, ActuatorFault::empty());
            return Err(CommResult::TxProtocolError);
        }
        let status = self.transact(&InstructionPacket::read(id, register))?;
        match status.value() {
            Some(value) if status.params.len() == usize::from(register.width.len()) => {
                let fault = status.fault();
                self.record(CommResult::Success, fault);
                Ok(StatusReading { value, fault })
            }
            _ => {
                let fault = status.fault();
                self.record(CommResult::RxCorrupted, fault);
                Err(CommResult::RxCorrupted)
            }
        }
    }

    /// Check that `id` answers; returns the fault bits it reports.
    pub fn ping(&mut self, id: ActuatorId) -> Result<ActuatorFault, CommResult> {
        if id.is_broadcast() {
            self.record(CommResult::TxProtocolError, ActuatorFault::empty());
            return Err(CommResult::TxProtocolError);
        }
        let status = self.transact(&InstructionPacket::ping(id))?;
        let fault = status.fault();
        self.record(CommResult::Success, fault);
        Ok(fault)
    }

    /// One broadcast frame writing a value per target to `register`.
    ///
    /// Broadcast frames are never acknowledged: `Success` means the frame
    /// went out, not that every actuator applied it.
    pub fn sync_write(&mut self, register: Register, targets: &[(ActuatorId, u16)]) -> CommResult {
        let result = match InstructionPacket::sync_write(register, targets) {
            Ok(packet) => self.transmit(&packet.encode()),
            Err(e) => e,
        };
        if !result.is_success() {
            crate::log_warn!(
                "bus: sync write @{} to {} targets failed: {}",
                register.address,
                targets.len(),
                result
            );
        }
        self.record(result, ActuatorFault::empty());
        result
    }

    /// Outcome and fault bits of the most recent transaction
    pub fn last_status(&self) -> (CommResult, ActuatorFault) {
        self.last
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn transport(&self) -> &U {
        &self.uart
    }

    pub fn transport_mut(&mut self) -> &mut U {
        &mut self.uart
    }

    fn record(&mut self, result: CommResult, fault: ActuatorFault) {
        if !fault.is_empty() {
            crate::log_warn!("bus: actuator fault {:#x}", fault.bits());
        }
        self.last = (result, fault);
    }

    fn transact(&mut self, packet: &InstructionPacket) -> Result<StatusPacket, CommResult> {
        let sent = self.transmit(&packet.encode());
        if !sent.is_success() {
            self.record(sent, ActuatorFault::empty());
            return Err(sent);
        }
        match self.receive(packet.id) {
            Ok(status) => Ok(status),
            Err(e) => {
                crate::log_warn!("bus: no valid status from {}: {}", packet.id, e);
                self.record(e, ActuatorFault::empty());
                Err(e)
            }
        }
    }

    fn transmit(&mut self, frame: &[u8]) -> CommResult {
        // stale bytes (late acknowledgements, noise) would desync the next read
        let mut scratch = [0u8; 16];
        while self.uart.available() {
            match self.uart.read(&mut scratch) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
        }

        match self.uart.write(frame) {
            Ok(n) if n == frame.len() => {}
            _ => return CommResult::TxFailure,
        }
        match self.uart.flush() {
            Ok(()) => CommResult::Success,
            Err(_) => CommResult::TxFailure,
        }
    }

    fn receive(&mut self, id: u8) -> Result<StatusPacket, CommResult> {
        self.receiver.reset();
        let start = self.clock.now_ms();
        loop {
            match self.receiver.poll(&mut self.uart) {
                Ok(status) if status.id == id => return Ok(status),
                Ok(_) => return Err(CommResult::RxCorrupted),
                Err(CommResult::RxInProgress) => {}
                Err(e) => return Err(e),
            }
            if self.clock.elapsed_since(start) >= self.config.rx_timeout_ms {
                return Err(if self.receiver.bytes_seen() == 0 {
                    CommResult::RxTimeout
                } else {
                    CommResult::RxCorrupted
                });
            }
            self.clock.delay_ms(self.config.rx_poll_interval_ms.max(1));
        }
    }
}
