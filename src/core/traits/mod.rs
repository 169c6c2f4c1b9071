//! Core traits for platform-agnostic timing.
//!
//! The actuator bus measures its receive and motion timeouts through
//! [`TimeSource`], which decouples it from the concrete tick:
//!
//! ```text
//!   ActuatorBus ──► TimeSource ──┬── TickClock   (timer compare-match tick)
//!                                ├── EmbassyTime (embassy feature)
//!                                └── MockTime    (host tests)
//! ```

pub mod time;

pub use time::{MockTime, TimeSource};

#[cfg(feature = "embassy")]
pub use time::EmbassyTime;
