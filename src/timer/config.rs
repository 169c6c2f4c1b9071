//! Timer capability classes and configuration enums
//!
//! Each physical timer belongs to one [`CapabilityClass`]. The class decides
//! which prescalers, compare channels, interrupt events and value widths the
//! timer accepts. The tables here are the single source of truth for those
//! checks; nothing is clamped or re-encoded behind the caller's back.

use crate::platform::TimerError;

/// Number of interrupt event kinds per timer
pub const EVENT_COUNT: usize = 4;

/// Timer feature subset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CapabilityClass {
    /// 8-bit counter, compare channels A and B
    Narrow,
    /// 16-bit counter, compare channels A, B and C
    Wide,
}

/// Counter operation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerMode {
    /// Count up to the maximum and overflow
    FreeRunning,
    /// Count up to compare register A, then restart from zero
    ClearOnCompareA,
}

/// Counter clock prescaler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Prescaler {
    /// No clock, counter stopped
    Disabled,
    Div1,
    Div8,
    /// Narrow class only
    Div32,
    Div64,
    /// Narrow class only
    Div128,
    Div256,
    Div1024,
}

/// Timer interrupt source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerEvent {
    Overflow,
    CompareMatchA,
    CompareMatchB,
    /// Wide class only
    CompareMatchC,
}

/// Readable/writable timer register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValueType {
    Counter,
    CompareA,
    CompareB,
    /// Wide class only
    CompareC,
}

// (prescaler, narrow, wide)
const PRESCALER_SUPPORT: [(Prescaler, bool, bool); 8] = [
    (Prescaler::Disabled, true, true),
    (Prescaler::Div1, true, true),
    (Prescaler::Div8, true, true),
    (Prescaler::Div32, true, false),
    (Prescaler::Div64, true, true),
    (Prescaler::Div128, true, false),
    (Prescaler::Div256, true, true),
    (Prescaler::Div1024, true, true),
];

impl CapabilityClass {
    /// Number of output compare channels
    pub const fn compare_channels(self) -> usize {
        match self {
            CapabilityClass::Narrow => 2,
            CapabilityClass::Wide => 3,
        }
    }

    /// Largest value the counter and compare registers can hold
    pub const fn counter_max(self) -> u16 {
        match self {
            CapabilityClass::Narrow => 0xFF,
            CapabilityClass::Wide => 0xFFFF,
        }
    }

    pub fn supports_prescaler(self, prescaler: Prescaler) -> bool {
        PRESCALER_SUPPORT
            .iter()
            .find(|(p, _, _)| *p == prescaler)
            .map(|&(_, narrow, wide)| match self {
                CapabilityClass::Narrow => narrow,
                CapabilityClass::Wide => wide,
            })
            .unwrap_or(false)
    }

    /// Both classes implement both modes.
    pub fn supports_mode(self, _mode: TimerMode) -> bool {
        true
    }

    pub fn supports_event(self, event: TimerEvent) -> bool {
        match event {
            TimerEvent::Overflow | TimerEvent::CompareMatchA | TimerEvent::CompareMatchB => true,
            TimerEvent::CompareMatchC => self.compare_channels() > 2,
        }
    }

    pub fn supports_value(self, value_type: ValueType) -> bool {
        match value_type {
            ValueType::Counter | ValueType::CompareA | ValueType::CompareB => true,
            ValueType::CompareC => self.compare_channels() > 2,
        }
    }

    /// Validates a value written to one of the timer registers.
    pub fn check_value(self, value_type: ValueType, value: u16) -> Result<(), TimerError> {
        if !self.supports_value(value_type) || value > self.counter_max() {
            return Err(TimerError::UnsupportedOperation);
        }
        Ok(())
    }
}

impl Prescaler {
    /// Clock divisor, `None` when the counter is stopped
    pub const fn divisor(self) -> Option<u32> {
        match self {
            Prescaler::Disabled => None,
            Prescaler::Div1 => Some(1),
            Prescaler::Div8 => Some(8),
            Prescaler::Div32 => Some(32),
            Prescaler::Div64 => Some(64),
            Prescaler::Div128 => Some(128),
            Prescaler::Div256 => Some(256),
            Prescaler::Div1024 => Some(1024),
        }
    }
}

impl TimerEvent {
    /// Slot index in the callback table and bit index in the interrupt mask
    pub const fn index(self) -> usize {
        match self {
            TimerEvent::Overflow => 0,
            TimerEvent::CompareMatchA => 1,
            TimerEvent::CompareMatchB => 2,
            TimerEvent::CompareMatchC => 3,
        }
    }
}

impl ValueType {
    /// Compare channel index (A = 0), `None` for the counter
    pub const fn compare_index(self) -> Option<usize> {
        match self {
            ValueType::Counter => None,
            ValueType::CompareA => Some(0),
            ValueType::CompareB => Some(1),
            ValueType::CompareC => Some(2),
        }
    }
}

/// Capability class of every physical timer, fixed at build time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerLayout<const N: usize> {
    classes: [CapabilityClass; N],
}

impl<const N: usize> TimerLayout<N> {
    pub const fn new(classes: [CapabilityClass; N]) -> Self {
        Self { classes }
    }

    /// Class of `timer`, or `InvalidTimer` if out of range
    pub fn class(&self, timer: usize) -> Result<CapabilityClass, TimerError> {
        self.classes
            .get(timer)
            .copied()
            .ok_or(TimerError::InvalidTimer)
    }

    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }
}

/// CM-510 (ATmega2561) layout: timers 0 and 2 are 8-bit, 1 and 3..5 are 16-bit
pub const CM510_LAYOUT: TimerLayout<6> = TimerLayout::new([
    CapabilityClass::Narrow,
    CapabilityClass::Wide,
    CapabilityClass::Narrow,
    CapabilityClass::Wide,
    CapabilityClass::Wide,
    CapabilityClass::Wide,
]);

/// Compare register value that makes a `ClearOnCompareA` timer fire at `tick_hz`.
///
/// The timer period is `compare + 1` counter clocks. Returns `None` when the
/// prescaler is disabled or the requested rate is not reachable with it.
pub fn compare_value_for(tick_hz: u32, source_clock_hz: u32, prescaler: Prescaler) -> Option<u16> {
    let divisor = prescaler.divisor()?;
    if tick_hz == 0 {
        return None;
    }
    let counts = source_clock_hz / divisor / tick_hz;
    if counts == 0 || counts > 0x1_0000 {
        return None;
    }
    u16::try_from(counts - 1).ok()
}
