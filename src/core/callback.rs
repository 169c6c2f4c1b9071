//! Interrupt callback slots
//!
//! A [`CallbackSlot`] holds an optional zero-argument function pointer that an
//! interrupt vector invokes. Installing a callback happens in main-loop
//! context inside a critical section, together with the matching hardware
//! enable bit. Dispatch is a single atomic load with no locking.

use core::sync::atomic::{AtomicPtr, Ordering};
use critical_section::CriticalSection;

/// Interrupt callback
///
/// Runs in interrupt context: it must be short, must not block and must never
/// call into the actuator bus.
pub type Callback = fn();

/// Interrupt-safe storage for one optional callback
///
/// Null means empty.
pub struct CallbackSlot {
    inner: AtomicPtr<()>,
}

impl CallbackSlot {
    /// Creates an empty slot.
    pub const fn new() -> Self {
        Self {
            inner: AtomicPtr::new(::core::ptr::null_mut()),
        }
    }

    /// Installs (or removes, with `None`) the callback.
    pub fn install(&self, callback: Option<Callback>) {
        critical_section::with(|cs| self.install_in(cs, callback));
    }

    /// Installs the callback inside a critical section the caller already holds.
    #[inline]
    pub fn install_in(&self, _cs: CriticalSection<'_>, callback: Option<Callback>) {
        let raw = callback.map_or(::core::ptr::null_mut(), |f| f as *mut ());
        self.inner.store(raw, Ordering::Release);
    }

    /// Returns the installed callback.
    #[inline]
    pub fn get(&self) -> Option<Callback> {
        let raw = self.inner.load(Ordering::Acquire);
        if raw.is_null() {
            None
        } else {
            // SAFETY: the only non-null values ever stored are `Callback`
            // pointers cast in `install_in`.
            Some(unsafe { ::core::mem::transmute::<*mut (), Callback>(raw) })
        }
    }

    /// Returns `true` if a callback is installed.
    pub fn is_installed(&self) -> bool {
        !self.inner.load(Ordering::Acquire).is_null()
    }

    /// Invokes the callback if one is installed.
    ///
    /// Returns `true` if a callback ran. An empty slot is a silent no-op.
    #[inline]
    pub fn invoke(&self) -> bool {
        match self.get() {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }
}

impl Default for CallbackSlot {
    fn default() -> Self {
        Self::new()
    }
}
