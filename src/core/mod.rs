//! Core infrastructure
//!
//! Building blocks shared by the timer manager, the interrupt router and the
//! actuator bus: logging macros, register bit helpers, interrupt-safe
//! callback slots and the time source abstraction.

pub mod bits;
pub mod callback;
pub mod logging;
pub mod traits;
