//! UART interface trait
//!
//! This module defines the serial transport underneath the actuator bus.
//! The bus is half-duplex: implementations are expected to handle the
//! direction switch and to suppress the local echo of transmitted bytes.

use crate::platform::Result;

/// UART configuration
#[derive(Debug, Clone, Copy)]
pub struct UartConfig {
    /// Baud rate in bits per second
    ///
    /// Frames are always 8N1.
    pub baud_rate: u32,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baud_rate: 1_000_000,
        }
    }
}

/// UART interface trait
///
/// Platform implementations must provide this interface for UART communication.
///
/// # Safety Invariants
///
/// - UART peripheral must be initialized before use
/// - Only one owner per UART peripheral instance
/// - Received bytes are buffered (RX interrupt into a queue), so `read` never
///   loses data between two polls
pub trait UartInterface {
    /// Write data to UART
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Uart` if the write operation fails.
    fn write(&mut self, data: &[u8]) -> Result<usize>;

    /// Read data from UART
    ///
    /// Reads up to `buffer.len()` bytes into the provided buffer without
    /// blocking. Returns the number of bytes actually read.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Uart` if the read operation fails.
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize>;

    /// Set UART baud rate
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Uart(UartError::InvalidBaudRate)` if the baud rate
    /// cannot be achieved with the current clock configuration.
    fn set_baud_rate(&mut self, baud: u32) -> Result<()>;

    /// Check if data is available to read
    fn available(&self) -> bool;

    /// Flush transmit buffer
    ///
    /// Blocks until all pending transmit data has been sent.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Uart` if the flush operation fails.
    fn flush(&mut self) -> Result<()>;
}
