//! Time abstraction traits for platform-agnostic timing operations.
//!
//! This module provides the `TimeSource` trait that abstracts over different
//! millisecond time providers so that bus timeouts and motion polling can be
//! tested with simulated time.

/// Platform-agnostic millisecond time source with busy-wait delay.
///
/// Timestamps are 32-bit and wrap after about 49 days; always compare them
/// through [`elapsed_since`](TimeSource::elapsed_since).
///
/// # Example
///
/// ```ignore
/// fn wait_ready<T: TimeSource>(time: &mut T, timeout_ms: u32) -> bool {
///     let start = time.now_ms();
///     while time.elapsed_since(start) < timeout_ms {
///         if ready() {
///             return true;
///         }
///         time.delay_ms(1);
///     }
///     false
/// }
/// ```
pub trait TimeSource {
    /// Returns current time in milliseconds since the tick was started.
    fn now_ms(&self) -> u32;

    /// Blocks for at least `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);

    /// Returns elapsed milliseconds since a reference point.
    ///
    /// Uses wrapping subtraction so a counter rollover between the two
    /// readings still yields the right duration.
    fn elapsed_since(&self, reference_ms: u32) -> u32 {
        self.now_ms().wrapping_sub(reference_ms)
    }
}

// ============================================================================
// Embassy Implementation
// ============================================================================

/// Embassy-based time source using the Embassy time driver.
#[cfg(feature = "embassy")]
#[derive(Clone, Copy, Default)]
pub struct EmbassyTime;

#[cfg(feature = "embassy")]
impl TimeSource for EmbassyTime {
    fn now_ms(&self) -> u32 {
        embassy_time::Instant::now().as_millis() as u32
    }

    fn delay_ms(&mut self, ms: u32) {
        embassy_time::block_for(embassy_time::Duration::from_millis(ms as u64));
    }
}

// ============================================================================
// Mock Implementation (always available for testing)
// ============================================================================

/// Mock time source for testing with controllable time advancement.
///
/// `delay_ms` costs nothing: it only moves the simulated clock forward.
///
/// # Example
///
/// ```
/// use bioloid_fw::core::traits::time::{MockTime, TimeSource};
///
/// let mut time = MockTime::new();
/// assert_eq!(time.now_ms(), 0);
///
/// time.delay_ms(5);
/// assert_eq!(time.now_ms(), 5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockTime {
    current_ms: core::cell::Cell<u32>,
    delay_calls: core::cell::Cell<u32>,
}

impl MockTime {
    /// Creates a new `MockTime` starting at time 0.
    pub fn new() -> Self {
        Self::with_initial(0)
    }

    /// Creates a new `MockTime` starting at the specified time.
    pub fn with_initial(ms: u32) -> Self {
        Self {
            current_ms: core::cell::Cell::new(ms),
            delay_calls: core::cell::Cell::new(0),
        }
    }

    /// Sets the current time to an absolute value.
    pub fn set(&self, ms: u32) {
        self.current_ms.set(ms);
    }

    /// Advances the current time by the specified amount.
    pub fn advance(&self, ms: u32) {
        self.current_ms.set(self.current_ms.get().wrapping_add(ms));
    }

    /// Number of `delay_ms` calls made so far.
    pub fn delay_calls(&self) -> u32 {
        self.delay_calls.get()
    }
}

impl TimeSource for MockTime {
    fn now_ms(&self) -> u32 {
        self.current_ms.get()
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay_calls.set(self.delay_calls.get() + 1);
        self.advance(ms);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_time_initial_value() {
        let time = MockTime::new();
        assert_eq!(time.now_ms(), 0);
    }

    #[test]
    fn mock_time_with_initial() {
        let time = MockTime::with_initial(5_000);
        assert_eq!(time.now_ms(), 5_000);
    }

    #[test]
    fn mock_time_delay_advances() {
        let mut time = MockTime::new();
        time.delay_ms(3);
        time.delay_ms(4);
        assert_eq!(time.now_ms(), 7);
        assert_eq!(time.delay_calls(), 2);
    }

    #[test]
    fn mock_time_elapsed_since() {
        let time = MockTime::new();
        time.set(10_000);
        assert_eq!(time.elapsed_since(3_000), 7_000);
    }

    #[test]
    fn mock_time_elapsed_across_wrap() {
        let time = MockTime::with_initial(u32::MAX - 4);
        let reference = time.now_ms();
        time.advance(10);
        assert_eq!(time.now_ms(), 5);
        assert_eq!(time.elapsed_since(reference), 10);
    }
}
