//! Mock timer/counter bank for testing

use heapless::Vec;

use crate::core::bits::BitField;
use crate::platform::traits::TimerInterface;
use crate::timer::{Prescaler, TimerEvent, TimerLayout, TimerMode, ValueType, EVENT_COUNT};

/// Register state of one simulated timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockTimerState {
    pub prescaler: Prescaler,
    pub mode: TimerMode,
    pub counter: u16,
    /// Compare registers A, B, C
    pub compare: [u16; 3],
    /// Interrupt-enable bits indexed by [`TimerEvent::index`]
    pub interrupt_mask: u8,
}

impl MockTimerState {
    const RESET: Self = Self {
        prescaler: Prescaler::Disabled,
        mode: TimerMode::FreeRunning,
        counter: 0,
        compare: [0; 3],
        interrupt_mask: 0,
    };
}

/// Mock timer bank
///
/// Stores every register write and can simulate counting with
/// [`step`](Self::step), which returns the interrupts the hardware would
/// raise.
///
/// # Example
///
/// ```ignore
/// use bioloid_fw::platform::mock::MockTimerBank;
/// use bioloid_fw::platform::TimerInterface;
/// use bioloid_fw::timer::{Prescaler, TimerEvent, TimerMode, ValueType, CM510_LAYOUT};
///
/// let mut bank = MockTimerBank::new(CM510_LAYOUT);
/// bank.write_mode(0, TimerMode::ClearOnCompareA);
/// bank.write_value(0, ValueType::CompareA, 1);
/// bank.set_interrupt_enable(0, TimerEvent::CompareMatchA, true);
/// bank.write_prescaler(0, Prescaler::Div8);
///
/// assert_eq!(bank.step(0).as_slice(), &[TimerEvent::CompareMatchA]);
/// assert!(bank.step(0).is_empty());
/// ```
#[derive(Debug)]
pub struct MockTimerBank<const N: usize> {
    layout: TimerLayout<N>,
    timers: [MockTimerState; N],
    writes: usize,
}

impl<const N: usize> MockTimerBank<N> {
    pub fn new(layout: TimerLayout<N>) -> Self {
        Self {
            layout,
            timers: [MockTimerState::RESET; N],
            writes: 0,
        }
    }

    /// Register state of `timer` (for test verification)
    pub fn state(&self, timer: usize) -> &MockTimerState {
        &self.timers[timer]
    }

    /// Number of register writes performed so far
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn interrupt_enabled(&self, timer: usize, event: TimerEvent) -> bool {
        self.timers[timer].interrupt_mask.get_bit(event.index() as u8)
    }

    /// Advance `timer` by one counter clock.
    ///
    /// Returns the enabled interrupt events raised by this clock. A stopped
    /// timer does not move.
    pub fn step(&mut self, timer: usize) -> Vec<TimerEvent, EVENT_COUNT> {
        let mut events = Vec::new();
        let Ok(class) = self.layout.class(timer) else {
            return events;
        };
        let state = &mut self.timers[timer];
        if state.prescaler == Prescaler::Disabled {
            return events;
        }

        let top = match state.mode {
            TimerMode::FreeRunning => class.counter_max(),
            TimerMode::ClearOnCompareA => state.compare[0],
        };
        if state.counter >= top {
            state.counter = 0;
            if state.mode == TimerMode::FreeRunning {
                let _ = events.push(TimerEvent::Overflow);
            }
        } else {
            state.counter += 1;
        }

        let channels = [
            TimerEvent::CompareMatchA,
            TimerEvent::CompareMatchB,
            TimerEvent::CompareMatchC,
        ];
        for (channel, event) in channels.into_iter().enumerate().take(class.compare_channels()) {
            if state.counter == state.compare[channel] {
                let _ = events.push(event);
            }
        }

        let mask = state.interrupt_mask;
        events.retain(|event| mask.get_bit(event.index() as u8));
        events
    }
}

impl<const N: usize> TimerInterface for MockTimerBank<N> {
    fn write_prescaler(&mut self, timer: usize, prescaler: Prescaler) {
        self.writes += 1;
        self.timers[timer].prescaler = prescaler;
    }

    fn write_mode(&mut self, timer: usize, mode: TimerMode) {
        self.writes += 1;
        self.timers[timer].mode = mode;
    }

    fn write_value(&mut self, timer: usize, value_type: ValueType, value: u16) {
        self.writes += 1;
        let state = &mut self.timers[timer];
        match value_type.compare_index() {
            Some(channel) => state.compare[channel] = value,
            None => state.counter = value,
        }
    }

    fn read_value(&self, timer: usize, value_type: ValueType) -> u16 {
        let state = &self.timers[timer];
        match value_type.compare_index() {
            Some(channel) => state.compare[channel],
            None => state.counter,
        }
    }

    fn set_interrupt_enable(&mut self, timer: usize, event: TimerEvent, enabled: bool) {
        self.writes += 1;
        self.timers[timer]
            .interrupt_mask
            .write_bit(event.index() as u8, enabled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::CM510_LAYOUT;

    #[test]
    fn test_mock_timer_stopped_does_not_count() {
        let mut bank = MockTimerBank::new(CM510_LAYOUT);
        assert!(bank.step(0).is_empty());
        assert_eq!(bank.state(0).counter, 0);
    }

    #[test]
    fn test_mock_timer_narrow_overflow() {
        let mut bank = MockTimerBank::new(CM510_LAYOUT);
        bank.set_interrupt_enable(2, TimerEvent::Overflow, true);
        bank.write_prescaler(2, Prescaler::Div1);

        let mut overflows = 0;
        for _ in 0..512 {
            overflows += bank.step(2).len();
        }
        assert_eq!(overflows, 2);
    }

    #[test]
    fn test_mock_timer_disabled_events_filtered() {
        let mut bank = MockTimerBank::new(CM510_LAYOUT);
        bank.write_mode(1, TimerMode::ClearOnCompareA);
        bank.write_value(1, ValueType::CompareA, 3);
        bank.write_prescaler(1, Prescaler::Div1);

        for _ in 0..10 {
            assert!(bank.step(1).is_empty());
        }
    }

    #[test]
    fn test_mock_timer_read_back() {
        let mut bank = MockTimerBank::new(CM510_LAYOUT);
        bank.write_value(3, ValueType::CompareC, 0xBEEF);
        bank.write_value(3, ValueType::Counter, 12);
        assert_eq!(bank.read_value(3, ValueType::CompareC), 0xBEEF);
        assert_eq!(bank.read_value(3, ValueType::Counter), 12);
        assert_eq!(bank.writes(), 2);
    }
}
