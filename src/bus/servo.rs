//! Single-actuator convenience handle
//!
//! [`Servo`] names one actuator and borrows the bus for each call, so several
//! handles can share one [`ActuatorBus`].
//!
//! ```ignore
//! let left = Servo::new(ActuatorId::new(1).unwrap());
//! left.set_operating_mode(&mut bus, OperatingMode::Wheel).into_result()?;
//! left.set_speed_percent(&mut bus, 60, Direction::Clockwise).into_result()?;
//! ```

use super::driver::ActuatorBus;
use super::motion::{ExecutionMode, MotionCriterion};
use super::protocol::{ActuatorId, Register};
use super::result::{CommResult, StatusReading};
use crate::core::bits::BitField;
use crate::core::traits::TimeSource;
use crate::platform::UartInterface;

/// Full-scale moving speed
pub const SPEED_MAX: u16 = 1023;
/// Direction bit of a wheel-mode moving speed
pub const DIRECTION_BIT: u8 = 10;
/// CCW angle limit that selects joint mode
const JOINT_CCW_LIMIT: u16 = 1023;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperatingMode {
    /// Endless rotation, speed controlled
    Wheel,
    /// Position controlled
    Joint,
}

/// Wheel-mode rotation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    CounterClockwise,
    Clockwise,
}

/// Wheel-mode moving speed for `percent` of full scale in `direction`
///
/// Returns `None` above 100 %.
pub fn wheel_speed(percent: u8, direction: Direction) -> Option<u16> {
    if percent > 100 {
        return None;
    }
    let mut value = (u32::from(percent) * u32::from(SPEED_MAX) / 100) as u16;
    if direction == Direction::Clockwise {
        value.set_bit(DIRECTION_BIT);
    }
    Some(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Servo {
    id: ActuatorId,
}

impl Servo {
    pub const fn new(id: ActuatorId) -> Self {
        Self { id }
    }

    pub const fn id(&self) -> ActuatorId {
        self.id
    }

    /// Switch between wheel and joint mode through the CCW angle limit
    pub fn set_operating_mode<U: UartInterface, C: TimeSource>(
        &self,
        bus: &mut ActuatorBus<U, C>,
        mode: OperatingMode,
    ) -> CommResult {
        let limit = match mode {
            OperatingMode::Wheel => 0,
            OperatingMode::Joint => JOINT_CCW_LIMIT,
        };
        bus.write(self.id, Register::CCW_ANGLE_LIMIT, limit)
    }

    pub fn operating_mode<U: UartInterface, C: TimeSource>(
        &self,
        bus: &mut ActuatorBus<U, C>,
    ) -> Result<OperatingMode, CommResult> {
        let reading = bus.read(self.id, Register::CCW_ANGLE_LIMIT)?;
        Ok(if reading.value == 0 {
            OperatingMode::Wheel
        } else {
            OperatingMode::Joint
        })
    }

    /// Raw moving speed (joint mode: `0..=1023`, wheel mode: bit 10 is
    /// the direction)
    pub fn set_speed<U: UartInterface, C: TimeSource>(
        &self,
        bus: &mut ActuatorBus<U, C>,
        speed: u16,
    ) -> CommResult {
        if speed > (SPEED_MAX | (1 << DIRECTION_BIT)) {
            return CommResult::TxProtocolError;
        }
        bus.write(self.id, Register::MOVING_SPEED, speed)
    }

    /// Wheel-mode speed as a percentage of full scale
    pub fn set_speed_percent<U: UartInterface, C: TimeSource>(
        &self,
        bus: &mut ActuatorBus<U, C>,
        percent: u8,
        direction: Direction,
    ) -> CommResult {
        match wheel_speed(percent, direction) {
            Some(value) => bus.write(self.id, Register::MOVING_SPEED, value),
            None => CommResult::TxProtocolError,
        }
    }

    pub fn speed<U: UartInterface, C: TimeSource>(
        &self,
        bus: &mut ActuatorBus<U, C>,
    ) -> Result<StatusReading, CommResult> {
        bus.read(self.id, Register::PRESENT_SPEED)
    }

    pub fn position<U: UartInterface, C: TimeSource>(
        &self,
        bus: &mut ActuatorBus<U, C>,
    ) -> Result<StatusReading, CommResult> {
        bus.read(self.id, Register::PRESENT_POSITION)
    }

    pub fn is_moving<U: UartInterface, C: TimeSource>(
        &self,
        bus: &mut ActuatorBus<U, C>,
    ) -> Result<bool, CommResult> {
        bus.read(self.id, Register::MOVING).map(|r| r.value != 0)
    }

    pub fn set_torque<U: UartInterface, C: TimeSource>(
        &self,
        bus: &mut ActuatorBus<U, C>,
        enabled: bool,
    ) -> CommResult {
        bus.write(self.id, Register::TORQUE_ENABLE, u16::from(enabled))
    }

    pub fn set_led<U: UartInterface, C: TimeSource>(
        &self,
        bus: &mut ActuatorBus<U, C>,
        on: bool,
    ) -> CommResult {
        bus.write(self.id, Register::LED, u16::from(on))
    }

    pub fn move_to<U: UartInterface, C: TimeSource>(
        &self,
        bus: &mut ActuatorBus<U, C>,
        position: u16,
        mode: ExecutionMode,
        criterion: &MotionCriterion,
    ) -> CommResult {
        bus.move_to(self.id, position, mode, criterion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::driver::BusConfig;
    use crate::core::traits::MockTime;
    use crate::platform::mock::MockActuatorBus;

    fn setup(raw: u8) -> (Servo, ActuatorBus<MockActuatorBus, MockTime>) {
        let mut peer = MockActuatorBus::new();
        peer.add_actuator(raw);
        let bus = ActuatorBus::new(peer, MockTime::new(), BusConfig::default()).unwrap();
        (Servo::new(ActuatorId::new(raw).unwrap()), bus)
    }

    #[test]
    fn test_wheel_speed_encoding() {
        assert_eq!(wheel_speed(0, Direction::CounterClockwise), Some(0));
        assert_eq!(wheel_speed(100, Direction::CounterClockwise), Some(1023));
        assert_eq!(wheel_speed(50, Direction::CounterClockwise), Some(511));
        assert_eq!(wheel_speed(50, Direction::Clockwise), Some(511 | 0x400));
        assert_eq!(wheel_speed(101, Direction::Clockwise), None);
    }

    #[test]
    fn test_operating_mode_round_trip() {
        let (servo, mut bus) = setup(3);

        assert!(servo.set_operating_mode(&mut bus, OperatingMode::Wheel).is_success());
        assert_eq!(bus.transport().register(3, Register::CCW_ANGLE_LIMIT), Some(0));
        assert_eq!(servo.operating_mode(&mut bus), Ok(OperatingMode::Wheel));

        assert!(servo.set_operating_mode(&mut bus, OperatingMode::Joint).is_success());
        assert_eq!(bus.transport().register(3, Register::CCW_ANGLE_LIMIT), Some(1023));
        assert_eq!(servo.operating_mode(&mut bus), Ok(OperatingMode::Joint));
    }

    #[test]
    fn test_speed_percent_sets_direction_bit() {
        let (servo, mut bus) = setup(1);

        assert!(servo
            .set_speed_percent(&mut bus, 60, Direction::Clockwise)
            .is_success());
        let raw = bus.transport().register(1, Register::MOVING_SPEED).unwrap();
        assert!(raw.get_bit(DIRECTION_BIT));
        assert_eq!(raw & SPEED_MAX, 613);

        assert_eq!(
            servo.set_speed_percent(&mut bus, 120, Direction::Clockwise),
            CommResult::TxProtocolError
        );
    }

    #[test]
    fn test_set_speed_range() {
        let (servo, mut bus) = setup(1);
        assert!(servo.set_speed(&mut bus, 2047).is_success());
        assert_eq!(servo.set_speed(&mut bus, 2048), CommResult::TxProtocolError);
    }

    #[test]
    fn test_torque_led_and_position() {
        let (servo, mut bus) = setup(2);

        assert!(servo.set_torque(&mut bus, true).is_success());
        assert!(servo.set_led(&mut bus, true).is_success());
        assert_eq!(bus.transport().register(2, Register::TORQUE_ENABLE), Some(1));
        assert_eq!(bus.transport().register(2, Register::LED), Some(1));

        assert!(servo
            .move_to(&mut bus, 700, ExecutionMode::Blocking, &MotionCriterion::default())
            .is_success());
        assert_eq!(servo.position(&mut bus).map(|r| r.value), Ok(700));
        assert_eq!(servo.is_moving(&mut bus), Ok(false));
        assert_eq!(servo.speed(&mut bus).map(|r| r.value), Ok(0));
    }
}
