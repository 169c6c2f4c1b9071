//! Interrupt-to-callback router for digital input lines
//!
//! Buttons and the microphone line raise external interrupts; the router
//! maps each line to a user callback.

pub mod lines;
pub mod router;

pub use lines::{EdgeSense, IoLine, LineCallbacks, LineConfig, CM510_LINES, LINE_COUNT};
pub use router::IoRouter;
