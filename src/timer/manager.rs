//! Timer/counter manager
//!
//! Validates every request against the timer's capability class before any
//! register is touched, then drives the [`TimerInterface`]. A rejected
//! request leaves the hardware exactly as it was.

use super::callbacks::TimerCallbacks;
use super::config::{CapabilityClass, Prescaler, TimerEvent, TimerLayout, TimerMode, ValueType};
use crate::core::callback::Callback;
use crate::platform::{TimerError, TimerInterface};

/// Timer/counter manager for `N` physical timers
///
/// Owns the timer bank and borrows the (usually `static`) callback table
/// shared with the interrupt vectors. All setters change live hardware
/// timing immediately.
pub struct TimerManager<'a, T: TimerInterface, const N: usize> {
    hw: T,
    layout: TimerLayout<N>,
    callbacks: &'a TimerCallbacks<N>,
}

impl<'a, T: TimerInterface, const N: usize> TimerManager<'a, T, N> {
    pub fn new(hw: T, layout: TimerLayout<N>, callbacks: &'a TimerCallbacks<N>) -> Self {
        Self {
            hw,
            layout,
            callbacks,
        }
    }

    /// Capability class of `timer`
    pub fn class(&self, timer: usize) -> Result<CapabilityClass, TimerError> {
        self.layout.class(timer)
    }

    /// Start-of-day configuration.
    ///
    /// Stops the counter, applies `mode`, loads `preset` into the counter and
    /// finally applies `prescaler`, which starts counting again.
    ///
    /// # Errors
    ///
    /// - `InvalidTimer` if `timer` is out of range
    /// - `UnsupportedOperation` if `mode`, `prescaler` or `preset` does not
    ///   fit the timer's class; nothing is written in that case
    pub fn configure(
        &mut self,
        timer: usize,
        mode: TimerMode,
        prescaler: Prescaler,
        preset: u16,
    ) -> Result<(), TimerError> {
        let class = self.class(timer)?;
        if !class.supports_mode(mode) || !class.supports_prescaler(prescaler) {
            crate::log_warn!("timer{}: mode/prescaler not supported", timer);
            return Err(TimerError::UnsupportedOperation);
        }
        class.check_value(ValueType::Counter, preset)?;

        self.hw.write_prescaler(timer, Prescaler::Disabled);
        self.hw.write_mode(timer, mode);
        self.hw.write_value(timer, ValueType::Counter, preset);
        self.hw.write_prescaler(timer, prescaler);
        crate::log_debug!("timer{}: configured", timer);
        Ok(())
    }

    /// Change the clock prescaler; `Prescaler::Disabled` stops the counter.
    pub fn set_prescaler(&mut self, timer: usize, prescaler: Prescaler) -> Result<(), TimerError> {
        if !self.class(timer)?.supports_prescaler(prescaler) {
            return Err(TimerError::UnsupportedOperation);
        }
        self.hw.write_prescaler(timer, prescaler);
        Ok(())
    }

    pub fn set_mode(&mut self, timer: usize, mode: TimerMode) -> Result<(), TimerError> {
        if !self.class(timer)?.supports_mode(mode) {
            return Err(TimerError::UnsupportedOperation);
        }
        self.hw.write_mode(timer, mode);
        Ok(())
    }

    /// Write the counter or a compare register.
    ///
    /// Values wider than the timer's registers are rejected, never truncated.
    pub fn set_value(
        &mut self,
        timer: usize,
        value_type: ValueType,
        value: u16,
    ) -> Result<(), TimerError> {
        self.class(timer)?.check_value(value_type, value)?;
        self.hw.write_value(timer, value_type, value);
        Ok(())
    }

    pub fn get_value(&self, timer: usize, value_type: ValueType) -> Result<u16, TimerError> {
        if !self.class(timer)?.supports_value(value_type) {
            return Err(TimerError::UnsupportedOperation);
        }
        Ok(self.hw.read_value(timer, value_type))
    }

    pub fn set_counter(&mut self, timer: usize, value: u16) -> Result<(), TimerError> {
        self.set_value(timer, ValueType::Counter, value)
    }

    pub fn get_counter(&self, timer: usize) -> Result<u16, TimerError> {
        self.get_value(timer, ValueType::Counter)
    }

    /// Set the counter to zero.
    pub fn reset(&mut self, timer: usize) -> Result<(), TimerError> {
        self.set_counter(timer, 0)
    }

    /// Stop the counter by removing its clock.
    pub fn disable(&mut self, timer: usize) -> Result<(), TimerError> {
        self.set_prescaler(timer, Prescaler::Disabled)
    }

    /// Install or remove the interrupt callback for `(timer, event)`.
    ///
    /// `Some(callback)` installs it and sets the interrupt-enable bit;
    /// `None` clears the bit and empties the slot. Both steps happen in one
    /// critical section, so the vector never sees the enable bit and the
    /// slot disagree.
    ///
    /// # Errors
    ///
    /// - `InvalidTimer` if `timer` is out of range
    /// - `UnsupportedOperation` if `event` does not exist on this timer
    pub fn set_interrupt(
        &mut self,
        timer: usize,
        event: TimerEvent,
        callback: Option<Callback>,
    ) -> Result<(), TimerError> {
        if !self.class(timer)?.supports_event(event) {
            return Err(TimerError::UnsupportedOperation);
        }
        let slot = self
            .callbacks
            .slot(timer, event)
            .ok_or(TimerError::InvalidTimer)?;
        let hw = &mut self.hw;
        critical_section::with(|cs| {
            slot.install_in(cs, callback);
            hw.set_interrupt_enable(timer, event, callback.is_some());
        });
        Ok(())
    }

    /// Callback table shared with the interrupt vectors
    pub fn callbacks(&self) -> &'a TimerCallbacks<N> {
        self.callbacks
    }

    pub fn hardware(&self) -> &T {
        &self.hw
    }

    pub fn hardware_mut(&mut self) -> &mut T {
        &mut self.hw
    }
}
