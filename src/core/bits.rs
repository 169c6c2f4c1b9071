//! Register bit-field helpers
//!
//! Single-bit get/set/clear/toggle on register-sized integers. The operation
//! is a plain read-modify-write; callers touching a register that an
//! interrupt handler also writes must do so inside `critical_section::with`.

use core::cell::Cell;
use core::fmt;
use critical_section::Mutex;

/// Single-bit access on an unsigned register value
pub trait BitField: Copy {
    /// Returns `true` if bit `bit` is set
    fn get_bit(self, bit: u8) -> bool;

    /// Set bit `bit`
    fn set_bit(&mut self, bit: u8);

    /// Clear bit `bit`
    fn clear_bit(&mut self, bit: u8);

    /// Invert bit `bit`
    fn toggle_bit(&mut self, bit: u8);

    /// Set or clear bit `bit` depending on `value`
    fn write_bit(&mut self, bit: u8, value: bool) {
        if value {
            self.set_bit(bit);
        } else {
            self.clear_bit(bit);
        }
    }
}

macro_rules! impl_bit_field {
    ($($t:ty),*) => {
        $(
            impl BitField for $t {
                #[inline]
                fn get_bit(self, bit: u8) -> bool {
                    self & (1 << bit) != 0
                }

                #[inline]
                fn set_bit(&mut self, bit: u8) {
                    *self |= 1 << bit;
                }

                #[inline]
                fn clear_bit(&mut self, bit: u8) {
                    *self &= !(1 << bit);
                }

                #[inline]
                fn toggle_bit(&mut self, bit: u8) {
                    *self ^= 1 << bit;
                }
            }
        )*
    };
}

impl_bit_field!(u8, u16, u32);

/// Register shared between main-loop and interrupt context
///
/// Every access runs inside a critical section, which makes each single-bit
/// read-modify-write atomic with respect to interrupt handlers.
pub struct RegisterCell<T: BitField> {
    value: Mutex<Cell<T>>,
}

impl<T: BitField> RegisterCell<T> {
    pub const fn new(value: T) -> Self {
        Self {
            value: Mutex::new(Cell::new(value)),
        }
    }

    pub fn get(&self) -> T {
        critical_section::with(|cs| self.value.borrow(cs).get())
    }

    pub fn set(&self, value: T) {
        critical_section::with(|cs| self.value.borrow(cs).set(value));
    }

    pub fn get_bit(&self, bit: u8) -> bool {
        self.get().get_bit(bit)
    }

    pub fn set_bit(&self, bit: u8) {
        self.modify(|v| v.set_bit(bit));
    }

    pub fn clear_bit(&self, bit: u8) {
        self.modify(|v| v.clear_bit(bit));
    }

    pub fn toggle_bit(&self, bit: u8) {
        self.modify(|v| v.toggle_bit(bit));
    }

    pub fn write_bit(&self, bit: u8, value: bool) {
        self.modify(|v| v.write_bit(bit, value));
    }

    /// Read-modify-write of the whole register in one critical section
    pub fn modify(&self, f: impl FnOnce(&mut T)) {
        critical_section::with(|cs| {
            let cell = self.value.borrow(cs);
            let mut value = cell.get();
            f(&mut value);
            cell.set(value);
        });
    }
}

impl<T: BitField + fmt::Debug> fmt::Debug for RegisterCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RegisterCell").field(&self.get()).finish()
    }
}
