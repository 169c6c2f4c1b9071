//! Timer interrupt callback table
//!
//! One [`CallbackSlot`] per `(timer, event)` pair. The table is meant to live
//! in a `static` so the interrupt vectors can reach it; it is only mutated
//! through [`TimerManager::set_interrupt`](super::TimerManager::set_interrupt).
//!
//! # Example
//!
//! ```ignore
//! static TIMER_CALLBACKS: TimerCallbacks<6> = TimerCallbacks::new();
//!
//! #[interrupt]
//! fn TIMER1_COMPA() {
//!     TIMER_CALLBACKS.dispatch(1, TimerEvent::CompareMatchA);
//! }
//! ```

use super::config::{TimerEvent, EVENT_COUNT};
use crate::core::callback::CallbackSlot;

#[allow(clippy::declare_interior_mutable_const)]
const EMPTY_SLOT: CallbackSlot = CallbackSlot::new();
#[allow(clippy::declare_interior_mutable_const)]
const EMPTY_ROW: [CallbackSlot; EVENT_COUNT] = [EMPTY_SLOT; EVENT_COUNT];

/// Callback dispatch table for `N` timers
pub struct TimerCallbacks<const N: usize> {
    slots: [[CallbackSlot; EVENT_COUNT]; N],
}

impl<const N: usize> TimerCallbacks<N> {
    pub const fn new() -> Self {
        Self {
            slots: [EMPTY_ROW; N],
        }
    }

    /// Slot for `(timer, event)`, `None` if `timer` is out of range
    pub(crate) fn slot(&self, timer: usize, event: TimerEvent) -> Option<&CallbackSlot> {
        self.slots.get(timer).map(|row| &row[event.index()])
    }

    /// Returns `true` if a callback is installed for `(timer, event)`.
    pub fn is_installed(&self, timer: usize, event: TimerEvent) -> bool {
        self.slot(timer, event)
            .map(CallbackSlot::is_installed)
            .unwrap_or(false)
    }

    /// Runs the callback for one hardware interrupt.
    ///
    /// Called from the interrupt vector of `(timer, event)`. A missing
    /// callback is a silent no-op.
    #[inline]
    pub fn dispatch(&self, timer: usize, event: TimerEvent) {
        if let Some(slot) = self.slot(timer, event) {
            slot.invoke();
        }
    }
}

impl<const N: usize> Default for TimerCallbacks<N> {
    fn default() -> Self {
        Self::new()
    }
}
