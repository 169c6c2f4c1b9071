//! Millisecond system tick
//!
//! A `ClearOnCompareA` timer raises compare-match A once per millisecond and
//! its callback bumps a [`MillisTick`]. [`TickClock`] turns that counter into
//! a [`TimeSource`] for the actuator bus.
//!
//! # Example
//!
//! ```ignore
//! static TIMER_CALLBACKS: TimerCallbacks<6> = TimerCallbacks::new();
//! static MILLIS: MillisTick = MillisTick::new();
//!
//! fn on_tick() {
//!     MILLIS.increment();
//! }
//!
//! let mut timers = TimerManager::new(bank, CM510_LAYOUT, &TIMER_CALLBACKS);
//! start_millis_tick(&mut timers, 0, 16_000_000, Prescaler::Div64, on_tick)?;
//! let clock = TickClock::new(&MILLIS);
//! ```

use core::cell::Cell;
use critical_section::Mutex;

use super::config::{Prescaler, TimerEvent, TimerMode, ValueType};
use super::manager::TimerManager;
use crate::core::callback::Callback;
use crate::core::traits::TimeSource;
use crate::platform::{TimerError, TimerInterface};

/// Rate of the system tick
pub const TICK_HZ: u32 = 1_000;

/// Interrupt-driven millisecond counter
pub struct MillisTick {
    millis: Mutex<Cell<u32>>,
}

impl MillisTick {
    pub const fn new() -> Self {
        Self {
            millis: Mutex::new(Cell::new(0)),
        }
    }

    /// Advance by one millisecond. Call from the tick interrupt.
    #[inline]
    pub fn increment(&self) {
        critical_section::with(|cs| {
            let cell = self.millis.borrow(cs);
            cell.set(cell.get().wrapping_add(1));
        });
    }

    pub fn now_ms(&self) -> u32 {
        critical_section::with(|cs| self.millis.borrow(cs).get())
    }

    pub fn reset(&self) {
        critical_section::with(|cs| self.millis.borrow(cs).set(0));
    }
}

impl Default for MillisTick {
    fn default() -> Self {
        Self::new()
    }
}

/// [`TimeSource`] backed by a [`MillisTick`]
///
/// `delay_ms` busy-waits until the tick interrupt has advanced the counter,
/// so it must never be called with interrupts disabled.
#[derive(Clone, Copy)]
pub struct TickClock<'a> {
    tick: &'a MillisTick,
}

impl<'a> TickClock<'a> {
    pub fn new(tick: &'a MillisTick) -> Self {
        Self { tick }
    }
}

impl TimeSource for TickClock<'_> {
    fn now_ms(&self) -> u32 {
        self.tick.now_ms()
    }

    fn delay_ms(&mut self, ms: u32) {
        let start = self.now_ms();
        while self.elapsed_since(start) < ms {
            ::core::hint::spin_loop();
        }
    }
}

/// Start a 1 kHz tick on `timer` and route its compare-match A to `on_tick`.
///
/// Returns the compare value that was programmed.
///
/// # Errors
///
/// - `InvalidTimer` if `timer` is out of range
/// - `UnsupportedOperation` if the prescaler is not available on the timer or
///   the tick rate cannot be reached with it
pub fn start_millis_tick<T: TimerInterface, const N: usize>(
    timers: &mut TimerManager<'_, T, N>,
    timer: usize,
    source_clock_hz: u32,
    prescaler: Prescaler,
    on_tick: Callback,
) -> Result<u16, TimerError> {
    let class = timers.class(timer)?;
    if !class.supports_prescaler(prescaler) {
        return Err(TimerError::UnsupportedOperation);
    }
    let compare = compare_value_for_tick(source_clock_hz, prescaler)?;
    class.check_value(ValueType::CompareA, compare)?;

    timers.configure(timer, TimerMode::ClearOnCompareA, Prescaler::Disabled, 0)?;
    timers.set_value(timer, ValueType::CompareA, compare)?;
    timers.set_interrupt(timer, TimerEvent::CompareMatchA, Some(on_tick))?;
    timers.set_prescaler(timer, prescaler)?;
    crate::log_info!("timer{}: 1 kHz tick, compare {}", timer, compare);
    Ok(compare)
}

fn compare_value_for_tick(source_clock_hz: u32, prescaler: Prescaler) -> Result<u16, TimerError> {
    super::config::compare_value_for(TICK_HZ, source_clock_hz, prescaler)
        .ok_or(TimerError::UnsupportedOperation)
}
