//! Mock platform implementation for testing
//!
//! This module provides mock implementations of platform traits that can be used
//! for unit testing without requiring actual hardware.
//!
//! # Feature Gate
//!
//! This module is available in two contexts:
//! - During test builds (`#[cfg(test)]`)
//! - When the `mock` feature is enabled
//!
//! # Example
//!
//! ```ignore
//! use bioloid_fw::bus::{ActuatorBus, ActuatorId, BusConfig, Register};
//! use bioloid_fw::core::traits::MockTime;
//! use bioloid_fw::platform::mock::MockActuatorBus;
//!
//! let mut peer = MockActuatorBus::new();
//! peer.add_actuator(1);
//! let mut bus = ActuatorBus::new(peer, MockTime::new(), BusConfig::default())?;
//! let reading = bus.read(ActuatorId::new(1).unwrap(), Register::PRESENT_POSITION)?;
//! ```

mod bus;
mod exti;
mod timer;
mod uart;

pub use bus::{MockActuatorBus, CONTROL_TABLE_LEN};
pub use exti::MockExti;
pub use timer::{MockTimerBank, MockTimerState};
pub use uart::MockUart;
