#![cfg_attr(not(any(test, feature = "mock")), no_std)]

//! bioloid_fw - Controller core for CM-510 class robot controllers
//!
//! This library provides the shared infrastructure underneath the robot
//! control loops: a timer/counter manager with interrupt callback dispatch,
//! an interrupt-to-callback router for buttons and sensor lines, and the
//! actuator bus protocol layer with motion completion tracking.

// Platform abstraction layer (timer bank, interrupt lines, serial transport)
pub mod platform;

// Logging, bit helpers, callback slots, time source
pub mod core;

// Timer/counter manager and millisecond tick
pub mod timer;

// Interrupt-to-callback router
pub mod io;

// Actuator bus protocol layer
pub mod bus;
