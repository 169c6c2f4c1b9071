//! Platform error types
//!
//! This module defines the closed error enums returned by the peripheral
//! layers. None of them are fatal: every variant is recoverable by the caller
//! choosing a different parameter.

use core::fmt;

/// Result type for platform operations
pub type Result<T> = core::result::Result<T, PlatformError>;

/// Platform-level errors
///
/// All platform implementations map their HAL-specific errors to these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlatformError {
    /// UART operation failed
    Uart(UartError),
    /// Timer/counter configuration failed
    Timer(TimerError),
    /// External interrupt line configuration failed
    Io(IoError),
    /// Invalid configuration provided
    InvalidConfig,
}

/// UART-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartError {
    /// Write operation failed
    WriteFailed,
    /// Invalid baud rate
    InvalidBaudRate,
}

/// Timer/counter configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerError {
    /// Timer id is outside the configured layout
    InvalidTimer,
    /// Mode, prescaler, channel or value is not supported by the timer's capability class
    UnsupportedOperation,
}

/// Interrupt router errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoError {
    /// The line mask selects no monitorable line
    InvalidPort,
}

impl From<UartError> for PlatformError {
    fn from(e: UartError) -> Self {
        PlatformError::Uart(e)
    }
}

impl From<TimerError> for PlatformError {
    fn from(e: TimerError) -> Self {
        PlatformError::Timer(e)
    }
}

impl From<IoError> for PlatformError {
    fn from(e: IoError) -> Self {
        PlatformError::Io(e)
    }
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerError::InvalidTimer => write!(f, "invalid timer"),
            TimerError::UnsupportedOperation => write!(f, "operation not supported by timer"),
        }
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoError::InvalidPort => write!(f, "no monitorable line in mask"),
        }
    }
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::Uart(e) => write!(f, "UART error: {:?}", e),
            PlatformError::Timer(e) => write!(f, "Timer error: {}", e),
            PlatformError::Io(e) => write!(f, "I/O error: {}", e),
            PlatformError::InvalidConfig => write!(f, "Invalid configuration"),
        }
    }
}
