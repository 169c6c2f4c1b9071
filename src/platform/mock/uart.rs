//! Mock UART implementation for testing

use crate::platform::{
    traits::{UartConfig, UartInterface},
    PlatformError, Result, UartError,
};
use core::cell::RefCell;
use std::vec::Vec;

/// Mock UART implementation
///
/// Provides in-memory buffers for transmit and receive data,
/// allowing unit tests to verify UART operations without hardware.
/// Nothing answers on the other side; use
/// [`MockActuatorBus`](super::MockActuatorBus) for a responding peer.
///
/// # Example
///
/// ```ignore
/// use bioloid_fw::platform::mock::MockUart;
/// use bioloid_fw::platform::UartInterface;
///
/// let mut uart = MockUart::new(Default::default());
///
/// uart.write(&[0xFF, 0xFF]).unwrap();
/// assert_eq!(uart.tx_buffer(), [0xFF, 0xFF]);
///
/// uart.inject_rx_data(&[0x01]);
/// let mut buf = [0u8; 1];
/// uart.read(&mut buf).unwrap();
/// assert_eq!(buf, [0x01]);
/// ```
#[derive(Debug)]
pub struct MockUart {
    config: UartConfig,
    tx_buffer: RefCell<Vec<u8>>,
    rx_buffer: RefCell<Vec<u8>>,
    fail_writes: bool,
}

impl MockUart {
    /// Create a new mock UART
    pub fn new(config: UartConfig) -> Self {
        Self {
            config,
            tx_buffer: RefCell::new(Vec::new()),
            rx_buffer: RefCell::new(Vec::new()),
            fail_writes: false,
        }
    }

    /// Get transmitted data (for test verification)
    pub fn tx_buffer(&self) -> Vec<u8> {
        self.tx_buffer.borrow().clone()
    }

    /// Clear transmit buffer
    pub fn clear_tx_buffer(&mut self) {
        self.tx_buffer.borrow_mut().clear();
    }

    /// Inject receive data (for test setup)
    pub fn inject_rx_data(&mut self, data: &[u8]) {
        self.rx_buffer.borrow_mut().extend_from_slice(data);
    }

    /// Make every following write fail
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Get current baud rate
    pub fn baud_rate(&self) -> u32 {
        self.config.baud_rate
    }
}

impl UartInterface for MockUart {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        if self.fail_writes {
            return Err(PlatformError::Uart(UartError::WriteFailed));
        }
        self.tx_buffer.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let mut rx = self.rx_buffer.borrow_mut();
        let to_read = core::cmp::min(buffer.len(), rx.len());

        buffer[..to_read].copy_from_slice(&rx[..to_read]);
        rx.drain(..to_read);

        Ok(to_read)
    }

    fn set_baud_rate(&mut self, baud: u32) -> Result<()> {
        if baud == 0 {
            return Err(PlatformError::Uart(UartError::InvalidBaudRate));
        }
        self.config.baud_rate = baud;
        Ok(())
    }

    fn available(&self) -> bool {
        !self.rx_buffer.borrow().is_empty()
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
