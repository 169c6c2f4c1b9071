//! Platform abstraction traits
//!
//! This module defines the traits that platform implementations must provide.

pub mod exti;
pub mod timer;
pub mod uart;

// Re-export trait interfaces
pub use exti::{ExtiInterface, GpioMode};
pub use timer::TimerInterface;
pub use uart::{UartConfig, UartInterface};
