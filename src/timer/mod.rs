//! Timer/counter manager
//!
//! Uniform configuration of heterogeneous hardware timers plus
//! interrupt-to-callback dispatch.
//!
//! - [`config`]: capability classes, modes, prescalers, layouts
//! - [`callbacks`]: the callback table shared with interrupt vectors
//! - [`manager`]: validated configuration API
//! - [`tick`]: millisecond system tick built on top of the manager

pub mod callbacks;
pub mod config;
pub mod manager;
pub mod tick;

pub use callbacks::TimerCallbacks;
pub use config::{
    compare_value_for, CapabilityClass, Prescaler, TimerEvent, TimerLayout, TimerMode, ValueType,
    CM510_LAYOUT, EVENT_COUNT,
};
pub use manager::TimerManager;
pub use tick::{start_millis_tick, MillisTick, TickClock, TICK_HZ};
