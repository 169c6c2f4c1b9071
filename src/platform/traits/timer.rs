//! Timer/counter bank interface trait
//!
//! This module defines the register-level surface of the physical timer
//! peripherals. It is deliberately dumb: every method maps to one register
//! write or read and performs no validation. Capability checks belong to
//! [`TimerManager`](crate::timer::TimerManager), which is the only caller.

use crate::timer::{Prescaler, TimerEvent, TimerMode, ValueType};

/// Timer bank interface trait
///
/// `timer` is the physical timer index. Implementations may assume that it is
/// in range and that the requested mode, prescaler, channel and value are
/// supported by that timer.
///
/// # Safety Invariants
///
/// - Every write takes effect on live hardware immediately (no staging)
/// - Only one owner of the timer bank
/// - `set_interrupt_enable` may be called from inside a critical section and
///   must not block
pub trait TimerInterface {
    /// Write the clock-select bits. `Prescaler::Disabled` stops the counter.
    fn write_prescaler(&mut self, timer: usize, prescaler: Prescaler);

    /// Write the waveform generation mode bits
    fn write_mode(&mut self, timer: usize, mode: TimerMode);

    /// Write the counter or one of the output compare registers
    fn write_value(&mut self, timer: usize, value_type: ValueType, value: u16);

    /// Read the counter or one of the output compare registers
    fn read_value(&self, timer: usize, value_type: ValueType) -> u16;

    /// Set or clear the interrupt-enable bit for `event`
    fn set_interrupt_enable(&mut self, timer: usize, event: TimerEvent, enabled: bool);
}
