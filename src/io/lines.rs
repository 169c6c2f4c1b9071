//! Monitored interrupt lines
//!
//! Bit positions match the controller's external interrupt mask register:
//! a line's flag value is `1 << index`.

use bitflags::bitflags;

use crate::core::callback::CallbackSlot;

/// Width of the external interrupt mask register
pub const LINE_COUNT: usize = 8;

bitflags! {
    /// External interrupt lines of the CM-510 controller
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IoLine: u8 {
        /// START button
        const BTN_START = 0x01;
        /// Microphone / digital sound sensor
        const MIC_SIGNAL = 0x02;
        const BTN_UP = 0x10;
        const BTN_DOWN = 0x20;
        const BTN_LEFT = 0x40;
        const BTN_RIGHT = 0x80;
    }
}

impl IoLine {
    /// Mask register bit of a single line
    ///
    /// For a combined mask this is the lowest selected line.
    pub fn index(self) -> usize {
        self.bits().trailing_zeros() as usize
    }
}

/// Which signal change raises a line's interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgeSense {
    LowLevel,
    /// Press and release both fire
    AnyEdge,
    FallingEdge,
    RisingEdge,
}

/// Sense configuration of one monitored line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineConfig {
    pub line: IoLine,
    pub sense: EdgeSense,
}

impl LineConfig {
    pub const fn new(line: IoLine, sense: EdgeSense) -> Self {
        Self { line, sense }
    }
}

/// CM-510 wiring: every button and the microphone line fire on both edges
pub const CM510_LINES: [LineConfig; 6] = [
    LineConfig::new(IoLine::BTN_START, EdgeSense::AnyEdge),
    LineConfig::new(IoLine::MIC_SIGNAL, EdgeSense::AnyEdge),
    LineConfig::new(IoLine::BTN_UP, EdgeSense::AnyEdge),
    LineConfig::new(IoLine::BTN_DOWN, EdgeSense::AnyEdge),
    LineConfig::new(IoLine::BTN_LEFT, EdgeSense::AnyEdge),
    LineConfig::new(IoLine::BTN_RIGHT, EdgeSense::AnyEdge),
];

#[allow(clippy::declare_interior_mutable_const)]
const EMPTY_SLOT: CallbackSlot = CallbackSlot::new();

/// Callback table indexed by line bit position
///
/// Lives in a `static` next to the interrupt vectors; only
/// [`IoRouter::set_interrupt`](super::IoRouter::set_interrupt) writes it.
pub struct LineCallbacks {
    slots: [CallbackSlot; LINE_COUNT],
}

impl LineCallbacks {
    pub const fn new() -> Self {
        Self {
            slots: [EMPTY_SLOT; LINE_COUNT],
        }
    }

    pub(crate) fn slot(&self, index: usize) -> Option<&CallbackSlot> {
        self.slots.get(index)
    }

    pub fn is_installed(&self, line: IoLine) -> bool {
        self.slot(line.index())
            .map(CallbackSlot::is_installed)
            .unwrap_or(false)
    }

    /// Body of the interrupt vector for line `index`
    #[inline]
    pub fn dispatch(&self, index: usize) {
        if let Some(slot) = self.slot(index) {
            slot.invoke();
        }
    }
}

impl Default for LineCallbacks {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_indices() {
        assert_eq!(IoLine::BTN_START.index(), 0);
        assert_eq!(IoLine::MIC_SIGNAL.index(), 1);
        assert_eq!(IoLine::BTN_UP.index(), 4);
        assert_eq!(IoLine::BTN_RIGHT.index(), 7);
    }

    #[test]
    fn test_monitorable_mask() {
        let all = CM510_LINES
            .iter()
            .fold(IoLine::empty(), |acc, cfg| acc | cfg.line);
        assert_eq!(all.bits(), 0xF3);
        assert_eq!(all, IoLine::all());
    }

    #[test]
    fn test_dispatch_empty_is_noop() {
        let callbacks = LineCallbacks::new();
        callbacks.dispatch(0);
        callbacks.dispatch(LINE_COUNT + 1);
        assert!(!callbacks.is_installed(IoLine::BTN_UP));
    }
}
