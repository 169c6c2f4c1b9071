//! Mock external interrupt lines for testing

use crate::core::bits::RegisterCell;
use crate::io::{EdgeSense, LINE_COUNT};
use crate::platform::traits::{ExtiInterface, GpioMode};
use crate::platform::{PlatformError, Result};

/// Mock external interrupt controller
///
/// Lines idle high (pulled up); [`press`](Self::press) pulls one low.
#[derive(Debug)]
pub struct MockExti {
    modes: [Option<GpioMode>; LINE_COUNT],
    senses: [Option<EdgeSense>; LINE_COUNT],
    mask: u8,
    levels: RegisterCell<u8>,
}

impl MockExti {
    pub fn new() -> Self {
        Self {
            modes: [None; LINE_COUNT],
            senses: [None; LINE_COUNT],
            mask: 0,
            levels: RegisterCell::new(0xFF),
        }
    }

    pub fn mode(&self, line: usize) -> Option<GpioMode> {
        self.modes.get(line).copied().flatten()
    }

    pub fn sense(&self, line: usize) -> Option<EdgeSense> {
        self.senses.get(line).copied().flatten()
    }

    /// Interrupt-enable bits
    pub fn mask(&self) -> u8 {
        self.mask
    }

    /// Pull `line` low
    pub fn press(&mut self, line: usize) {
        self.levels.clear_bit(line as u8);
    }

    /// Let `line` float back high
    pub fn release(&mut self, line: usize) {
        self.levels.set_bit(line as u8);
    }
}

impl Default for MockExti {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtiInterface for MockExti {
    fn set_line_mode(&mut self, line: usize, mode: GpioMode) -> Result<()> {
        let slot = self.modes.get_mut(line).ok_or(PlatformError::InvalidConfig)?;
        *slot = Some(mode);
        Ok(())
    }

    fn set_sense(&mut self, line: usize, sense: EdgeSense) -> Result<()> {
        let slot = self
            .senses
            .get_mut(line)
            .ok_or(PlatformError::InvalidConfig)?;
        *slot = Some(sense);
        Ok(())
    }

    fn set_interrupt_mask(&mut self, mask: u8, enabled: bool) {
        if enabled {
            self.mask |= mask;
        } else {
            self.mask &= !mask;
        }
    }

    fn read_line(&self, line: usize) -> bool {
        self.levels.get_bit(line as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_exti_levels() {
        let mut exti = MockExti::new();
        assert!(exti.read_line(4));
        exti.press(4);
        assert!(!exti.read_line(4));
        assert!(exti.read_line(5));
        exti.release(4);
        assert!(exti.read_line(4));
    }

    #[test]
    fn test_mock_exti_mask() {
        let mut exti = MockExti::new();
        exti.set_interrupt_mask(0x30, true);
        exti.set_interrupt_mask(0x01, true);
        exti.set_interrupt_mask(0x10, false);
        assert_eq!(exti.mask(), 0x21);
    }

    #[test]
    fn test_mock_exti_out_of_range_line() {
        let mut exti = MockExti::new();
        assert_eq!(
            exti.set_line_mode(LINE_COUNT, GpioMode::InputPullUp),
            Err(PlatformError::InvalidConfig)
        );
        assert_eq!(exti.mode(LINE_COUNT), None);
    }
}
