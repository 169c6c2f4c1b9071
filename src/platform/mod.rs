//! Platform abstraction layer
//!
//! Hardware access for the controller core is funnelled through the traits in
//! [`traits`]: a timer/counter bank, the external interrupt lines and the
//! serial transport of the actuator bus. Register-level implementations live
//! with the board support code; host builds use the [`mock`] peripherals.

pub mod error;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use error::{IoError, PlatformError, Result, TimerError, UartError};
pub use traits::{ExtiInterface, GpioMode, TimerInterface, UartConfig, UartInterface};
