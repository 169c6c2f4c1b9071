//! External interrupt line interface trait
//!
//! This module defines the digital input lines that can raise an interrupt
//! (buttons, microphone). Lines are addressed by their bit index in the
//! controller's external interrupt mask register.

use crate::io::EdgeSense;
use crate::platform::Result;

/// Input line mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioMode {
    /// High impedance
    Input,
    /// Internal pull-up enabled
    InputPullUp,
}

/// External interrupt interface trait
///
/// # Safety Invariants
///
/// - `line` is a bit index in `0..8`
/// - `set_interrupt_mask` may be called from inside a critical section and
///   must not block
pub trait ExtiInterface {
    /// Configure the direction and pull of a line
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::InvalidConfig` if the line cannot take `mode`.
    fn set_line_mode(&mut self, line: usize, mode: GpioMode) -> Result<()>;

    /// Configure which signal change on a line raises its interrupt
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::InvalidConfig` if the line has no sense control.
    fn set_sense(&mut self, line: usize, sense: EdgeSense) -> Result<()>;

    /// Set (`enabled`) or clear the interrupt-enable bits selected by `mask`
    fn set_interrupt_mask(&mut self, mask: u8, enabled: bool);

    /// Read the electrical level of a line (`true` = high)
    fn read_line(&self, line: usize) -> bool;
}
