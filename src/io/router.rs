//! Interrupt-to-callback router
//!
//! Maps the external interrupt lines to user callbacks. The router performs
//! no debouncing.
//!
//! # Example
//!
//! ```ignore
//! static LINE_CALLBACKS: LineCallbacks = LineCallbacks::new();
//!
//! #[interrupt]
//! fn INT4() {
//!     LINE_CALLBACKS.dispatch(4);
//! }
//!
//! let mut io = IoRouter::new(exti, &CM510_LINES, &LINE_CALLBACKS);
//! io.init()?;
//! io.set_interrupt(IoLine::BTN_UP | IoLine::BTN_DOWN, Some(on_button))?;
//! ```

use super::lines::{IoLine, LineCallbacks, LineConfig};
use crate::core::callback::Callback;
use crate::platform::{ExtiInterface, GpioMode, IoError};

/// Interrupt-to-callback router
pub struct IoRouter<'a, E: ExtiInterface> {
    exti: E,
    lines: &'a [LineConfig],
    callbacks: &'a LineCallbacks,
}

impl<'a, E: ExtiInterface> IoRouter<'a, E> {
    pub fn new(exti: E, lines: &'a [LineConfig], callbacks: &'a LineCallbacks) -> Self {
        Self {
            exti,
            lines,
            callbacks,
        }
    }

    /// Lines this router can route
    pub fn monitorable(&self) -> IoLine {
        self.lines
            .iter()
            .fold(IoLine::empty(), |acc, cfg| acc | cfg.line)
    }

    /// Configure every monitored line as a pulled-up input with its edge sense.
    ///
    /// All line interrupts are left disabled.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPort` if the platform cannot configure a listed line.
    pub fn init(&mut self) -> Result<(), IoError> {
        let monitorable = self.monitorable();
        self.exti.set_interrupt_mask(monitorable.bits(), false);
        for cfg in self.lines {
            let index = cfg.line.index();
            self.exti
                .set_line_mode(index, GpioMode::InputPullUp)
                .map_err(|_| IoError::InvalidPort)?;
            self.exti
                .set_sense(index, cfg.sense)
                .map_err(|_| IoError::InvalidPort)?;
        }
        crate::log_debug!("io: {} lines configured", self.lines.len());
        Ok(())
    }

    /// Install or remove one callback for every line in `lines`.
    ///
    /// Bits that are not monitorable are ignored. The slots and the hardware
    /// enable bits change together inside one critical section.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPort` if `lines` selects no monitorable line.
    pub fn set_interrupt(&mut self, lines: IoLine, callback: Option<Callback>) -> Result<(), IoError> {
        let selected = lines & self.monitorable();
        if selected.is_empty() {
            crate::log_warn!("io: mask {:#x} selects no line", lines.bits());
            return Err(IoError::InvalidPort);
        }
        let callbacks = self.callbacks;
        let exti = &mut self.exti;
        critical_section::with(|cs| {
            for line in selected.iter() {
                if let Some(slot) = callbacks.slot(line.index()) {
                    slot.install_in(cs, callback);
                }
            }
            exti.set_interrupt_mask(selected.bits(), callback.is_some());
        });
        Ok(())
    }

    /// Returns `true` while a monitored line is active (pulled low).
    ///
    /// # Errors
    ///
    /// Returns `InvalidPort` unless `line` is exactly one monitorable line.
    pub fn line_state(&self, line: IoLine) -> Result<bool, IoError> {
        if line.bits().count_ones() != 1 || !self.monitorable().contains(line) {
            return Err(IoError::InvalidPort);
        }
        Ok(!self.exti.read_line(line.index()))
    }

    pub fn callbacks(&self) -> &'a LineCallbacks {
        self.callbacks
    }

    pub fn hardware(&self) -> &E {
        &self.exti
    }

    pub fn hardware_mut(&mut self) -> &mut E {
        &mut self.exti
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::lines::{EdgeSense, CM510_LINES};
    use crate::platform::mock::MockExti;
    use core::sync::atomic::{AtomicU32, Ordering};

    fn router(callbacks: &LineCallbacks) -> IoRouter<'_, MockExti> {
        let mut io = IoRouter::new(MockExti::new(), &CM510_LINES, callbacks);
        io.init().unwrap();
        io
    }

    #[test]
    fn test_init_configures_pull_ups_and_edges() {
        let callbacks = LineCallbacks::new();
        let io = router(&callbacks);

        for cfg in CM510_LINES.iter() {
            let index = cfg.line.index();
            assert_eq!(io.hardware().mode(index), Some(GpioMode::InputPullUp));
            assert_eq!(io.hardware().sense(index), Some(EdgeSense::AnyEdge));
        }
        // bits 2 and 3 are not routed
        assert_eq!(io.hardware().mode(2), None);
        assert_eq!(io.hardware().mode(3), None);
        assert_eq!(io.hardware().mask(), 0);
    }

    static BUTTON_HITS: AtomicU32 = AtomicU32::new(0);

    fn on_button() {
        BUTTON_HITS.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn test_shared_callback_for_combined_mask() {
        let callbacks = LineCallbacks::new();
        let mut io = router(&callbacks);

        io.set_interrupt(IoLine::BTN_UP | IoLine::BTN_DOWN, Some(on_button))
            .unwrap();
        assert_eq!(io.hardware().mask(), 0x30);
        assert!(callbacks.is_installed(IoLine::BTN_UP));
        assert!(callbacks.is_installed(IoLine::BTN_DOWN));
        assert!(!callbacks.is_installed(IoLine::BTN_LEFT));

        // press and release of UP, then a DOWN press
        callbacks.dispatch(IoLine::BTN_UP.index());
        callbacks.dispatch(IoLine::BTN_UP.index());
        callbacks.dispatch(IoLine::BTN_DOWN.index());
        callbacks.dispatch(IoLine::BTN_LEFT.index());
        assert_eq!(BUTTON_HITS.load(Ordering::SeqCst), 3);

        io.set_interrupt(IoLine::BTN_UP, None).unwrap();
        assert_eq!(io.hardware().mask(), 0x20);
        callbacks.dispatch(IoLine::BTN_UP.index());
        assert_eq!(BUTTON_HITS.load(Ordering::SeqCst), 3);
    }

    static MIC_HITS: AtomicU32 = AtomicU32::new(0);

    fn on_mic() {
        MIC_HITS.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn test_unmonitorable_bits_ignored() {
        let callbacks = LineCallbacks::new();
        let mut io = router(&callbacks);

        // bit 2 is not a monitored line, bit 1 is
        let mask = IoLine::from_bits_retain(0x06);
        io.set_interrupt(mask, Some(on_mic)).unwrap();
        assert_eq!(io.hardware().mask(), 0x02);
        assert!(callbacks.slot(2).map(|s| !s.is_installed()).unwrap_or(false));

        callbacks.dispatch(1);
        assert_eq!(MIC_HITS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_mask_is_invalid_port() {
        let callbacks = LineCallbacks::new();
        let mut io = router(&callbacks);

        assert_eq!(
            io.set_interrupt(IoLine::empty(), Some(on_mic)),
            Err(IoError::InvalidPort)
        );
        assert_eq!(
            io.set_interrupt(IoLine::from_bits_retain(0x0C), Some(on_mic)),
            Err(IoError::InvalidPort)
        );
        assert_eq!(io.hardware().mask(), 0);
    }

    #[test]
    fn test_line_state_active_low() {
        let callbacks = LineCallbacks::new();
        let mut io = router(&callbacks);

        assert_eq!(io.line_state(IoLine::BTN_START), Ok(false));
        io.hardware_mut().press(IoLine::BTN_START.index());
        assert_eq!(io.line_state(IoLine::BTN_START), Ok(true));
        io.hardware_mut().release(IoLine::BTN_START.index());
        assert_eq!(io.line_state(IoLine::BTN_START), Ok(false));

        assert_eq!(
            io.line_state(IoLine::BTN_UP | IoLine::BTN_DOWN),
            Err(IoError::InvalidPort)
        );
    }

    #[test]
    fn test_partial_line_table() {
        let lines = [LineConfig::new(IoLine::BTN_START, EdgeSense::FallingEdge)];
        let callbacks = LineCallbacks::new();
        let mut io = IoRouter::new(MockExti::new(), &lines, &callbacks);
        io.init().unwrap();

        assert_eq!(io.monitorable(), IoLine::BTN_START);
        assert_eq!(io.hardware().sense(0), Some(EdgeSense::FallingEdge));
        assert_eq!(
            io.set_interrupt(IoLine::BTN_UP, Some(on_mic)),
            Err(IoError::InvalidPort)
        );
    }
}
