//! Motion commands and completion tracking
//!
//! A move writes the goal position and, in [`ExecutionMode::Blocking`],
//! polls the present position until the actuator settles or the criterion's
//! timeout expires. Both endings are normal returns.

use super::driver::ActuatorBus;
use super::protocol::{ActuatorId, Register};
use super::result::CommResult;
use crate::core::traits::TimeSource;
use crate::platform::UartInterface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExecutionMode {
    /// Wait for every target to settle
    Blocking,
    /// Return as soon as the command is transmitted
    NonBlocking,
}

/// When a polled actuator counts as arrived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionCriterion {
    /// Largest accepted `|present - goal|`
    pub max_deviation: u16,
    /// Consecutive in-tolerance polls required
    pub stability_window: u32,
    /// Safety bound against a stalled or disconnected actuator
    pub timeout_ms: u32,
    pub poll_interval_ms: u32,
}

impl Default for MotionCriterion {
    fn default() -> Self {
        Self {
            max_deviation: 5,
            stability_window: 3,
            timeout_ms: 3_000,
            poll_interval_ms: 1,
        }
    }
}

/// How `await_motion` ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionOutcome {
    Settled { polls: u32 },
    TimedOut { polls: u32 },
}

impl MotionOutcome {
    pub const fn polls(self) -> u32 {
        match self {
            Self::Settled { polls } | Self::TimedOut { polls } => polls,
        }
    }

    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Settled { .. })
    }
}

/// Addressing of an [`ActuatorCommand`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Targets<'a> {
    /// Unicast write
    Single((ActuatorId, u16)),
    /// One broadcast sync write
    Many(&'a [(ActuatorId, u16)]),
}

impl Targets<'_> {
    pub fn as_slice(&self) -> &[(ActuatorId, u16)] {
        match self {
            Self::Single(target) => ::core::slice::from_ref(target),
            Self::Many(targets) => targets,
        }
    }
}

/// A register write to one or many actuators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorCommand<'a> {
    pub targets: Targets<'a>,
    pub register: Register,
    pub mode: ExecutionMode,
}

impl<'a> ActuatorCommand<'a> {
    /// Goal-position command
    pub fn goal_position(targets: Targets<'a>, mode: ExecutionMode) -> Self {
        Self {
            targets,
            register: Register::GOAL_POSITION,
            mode,
        }
    }
}

impl<U: UartInterface, C: TimeSource> ActuatorBus<U, C> {
    /// Issue `command`, then wait per target if it is a blocking goal move.
    ///
    /// Targets are awaited one after the other, so a blocking multi-target
    /// move takes the sum of the individual settle times. Nothing is awaited
    /// if the write itself failed, nor for a broadcast target. Returns the outcome of the write.
    pub fn execute(&mut self, command: &ActuatorCommand<'_>, criterion: &MotionCriterion) -> CommResult {
        let result = match command.targets {
            Targets::Single((id, value)) => self.write(id, command.register, value),
            Targets::Many(targets) => self.sync_write(command.register, targets),
        };
        if result.is_success()
            && command.mode == ExecutionMode::Blocking
            && command.register == Register::GOAL_POSITION
        {
            // broadcast targets never answer a position read
            for &(id, goal) in command.targets.as_slice().iter().filter(|(id, _)| !id.is_broadcast()) {
                let _ = self.await_motion(id, goal, criterion);
            }
        }
        result
    }

    pub fn move_to(
        &mut self,
        id: ActuatorId,
        position: u16,
        mode: ExecutionMode,
        criterion: &MotionCriterion,
    ) -> CommResult {
        let command = ActuatorCommand::goal_position(Targets::Single((id, position)), mode);
        self.execute(&command, criterion)
    }

    /// Move several actuators with one sync write.
    ///
    /// In `Blocking` mode each target is awaited in turn.
    pub fn sync_move_to(
        &mut self,
        targets: &[(ActuatorId, u16)],
        mode: ExecutionMode,
        criterion: &MotionCriterion,
    ) -> CommResult {
        let command = ActuatorCommand::goal_position(Targets::Many(targets), mode);
        self.execute(&command, criterion)
    }

    /// Poll the present position of `id` until it settles around `goal`.
    ///
    /// Settled means `stability_window` consecutive successful polls within
    /// `max_deviation`. A failed poll breaks the streak. The timeout is
    /// checked after every poll, so the wait ends at most one poll interval
    /// (plus one transaction) after `timeout_ms`.
    ///
    /// The broadcast id cannot be polled and yields `TimedOut { polls: 0 }`
    /// without touching the bus.
    pub fn await_motion(&mut self, id: ActuatorId, goal: u16, criterion: &MotionCriterion) -> MotionOutcome {
        if id.is_broadcast() {
            return MotionOutcome::TimedOut { polls: 0 };
        }
        let window = criterion.stability_window.max(1);
        let start = self.clock().now_ms();
        let mut polls = 0u32;
        let mut stable = 0u32;

        loop {
            polls += 1;
            match self.read(id, Register::PRESENT_POSITION) {
                Ok(reading) if reading.value.abs_diff(goal) <= criterion.max_deviation => {
                    stable += 1;
                    if stable >= window {
                        crate::log_debug!("bus: {} settled at {} after {} polls", id.raw(), goal, polls);
                        return MotionOutcome::Settled { polls };
                    }
                }
                _ => stable = 0,
            }
            if self.clock().elapsed_since(start) >= criterion.timeout_ms {
                crate::log_warn!("bus: {} did not reach {} within {} ms", id.raw(), goal, criterion.timeout_ms);
                return MotionOutcome::TimedOut { polls };
            }
            self.clock_mut().delay_ms(criterion.poll_interval_ms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::driver::BusConfig;
    use crate::core::traits::MockTime;
    use crate::platform::mock::MockActuatorBus;

    fn id(raw: u8) -> ActuatorId {
        ActuatorId::new(raw).unwrap()
    }

    fn bus_with(peer: MockActuatorBus) -> ActuatorBus<MockActuatorBus, MockTime> {
        ActuatorBus::new(peer, MockTime::new(), BusConfig::default()).unwrap()
    }

    fn position_reads(bus: &ActuatorBus<MockActuatorBus, MockTime>, raw: u8) -> usize {
        bus.transport()
            .reads()
            .iter()
            .filter(|&&(target, address)| target == raw && address == Register::PRESENT_POSITION.address)
            .count()
    }

    #[test]
    fn test_blocking_move_settles_after_window() {
        let mut peer = MockActuatorBus::new();
        peer.add_actuator(4);
        peer.script_positions(4, &[500, 650, 760, 812]);
        let mut bus = bus_with(peer);
        let criterion = MotionCriterion::default();

        assert_eq!(
            bus.move_to(id(4), 812, ExecutionMode::Blocking, &criterion),
            CommResult::Success
        );
        // three converging polls, then three steady ones
        assert_eq!(position_reads(&bus, 4), 3 + 3);
        assert_eq!(bus.transport().register(4, Register::GOAL_POSITION), Some(812));
    }

    #[test]
    fn test_blocking_broadcast_move_returns_without_waiting() {
        let mut peer = MockActuatorBus::new();
        peer.add_actuator(1);
        peer.add_actuator(2);
        let mut bus = bus_with(peer);

        assert_eq!(
            bus.move_to(ActuatorId::BROADCAST, 300, ExecutionMode::Blocking, &MotionCriterion::default()),
            CommResult::Success
        );
        assert_eq!(bus.transport().frames().len(), 1);
        assert!(bus.transport().reads().is_empty());
        assert_eq!(bus.clock().now_ms(), 0);
        assert_eq!(bus.transport().register(1, Register::GOAL_POSITION), Some(300));
    }

    #[test]
    fn test_await_motion_on_broadcast_is_immediate() {
        let mut bus = bus_with(MockActuatorBus::new());

        let outcome = bus.await_motion(ActuatorId::BROADCAST, 300, &MotionCriterion::default());
        assert_eq!(outcome, MotionOutcome::TimedOut { polls: 0 });
        assert!(bus.transport().frames().is_empty());
        assert_eq!(bus.clock().now_ms(), 0);
    }

    #[test]
    fn test_await_motion_tolerates_deadband() {
        let mut peer = MockActuatorBus::new();
        peer.add_actuator(4);
        peer.script_positions(4, &[700, 808, 815, 811]);
        let mut bus = bus_with(peer);

        let outcome = bus.await_motion(id(4), 812, &MotionCriterion::default());
        assert_eq!(outcome, MotionOutcome::Settled { polls: 4 });
    }

    #[test]
    fn test_await_motion_times_out() {
        let mut peer = MockActuatorBus::new();
        peer.add_actuator(4);
        peer.script_positions(4, &[100]);
        let mut bus = bus_with(peer);
        let criterion = MotionCriterion {
            timeout_ms: 50,
            poll_interval_ms: 2,
            ..MotionCriterion::default()
        };

        let outcome = bus.await_motion(id(4), 812, &criterion);
        assert!(!outcome.is_settled());
        assert!(bus.clock().now_ms() <= criterion.timeout_ms + criterion.poll_interval_ms);
        assert!(bus.clock().now_ms() >= criterion.timeout_ms);
        assert_eq!(outcome.polls(), 26);
    }

    #[test]
    fn test_await_motion_silent_actuator_times_out() {
        let mut bus = bus_with(MockActuatorBus::new());
        let criterion = MotionCriterion {
            timeout_ms: 100,
            ..MotionCriterion::default()
        };

        let outcome = bus.await_motion(id(6), 300, &criterion);
        assert!(matches!(outcome, MotionOutcome::TimedOut { .. }));
        let bound = criterion.timeout_ms + criterion.poll_interval_ms + BusConfig::default().rx_timeout_ms;
        assert!(bus.clock().now_ms() <= bound);
        assert_eq!(bus.last_status().0, CommResult::RxTimeout);
    }

    #[test]
    fn test_out_of_tolerance_poll_resets_stability() {
        let mut peer = MockActuatorBus::new();
        peer.add_actuator(4);
        peer.script_positions(4, &[812, 812, 0, 812]);
        let mut bus = bus_with(peer);

        let outcome = bus.await_motion(id(4), 812, &MotionCriterion::default());
        assert_eq!(outcome, MotionOutcome::Settled { polls: 6 });
    }

    #[test]
    fn test_non_blocking_move_does_not_poll() {
        let mut peer = MockActuatorBus::new();
        peer.add_actuator(4);
        let mut bus = bus_with(peer);

        assert!(bus
            .move_to(id(4), 300, ExecutionMode::NonBlocking, &MotionCriterion::default())
            .is_success());
        assert_eq!(position_reads(&bus, 4), 0);
    }

    #[test]
    fn test_failed_blocking_write_does_not_wait() {
        let mut bus = bus_with(MockActuatorBus::new());
        bus.transport_mut().set_fail_writes(true);

        assert_eq!(
            bus.move_to(id(4), 300, ExecutionMode::Blocking, &MotionCriterion::default()),
            CommResult::TxFailure
        );
        assert_eq!(bus.clock().now_ms(), 0);
    }

    #[test]
    fn test_blocking_sync_move_waits_sequentially() {
        let mut peer = MockActuatorBus::new();
        peer.add_actuator(1);
        peer.add_actuator(2);
        peer.script_positions(1, &[0, 100, 200]);
        peer.script_positions(2, &[0, 400]);
        let mut bus = bus_with(peer);

        let targets = [(id(1), 200), (id(2), 400)];
        assert!(bus
            .sync_move_to(&targets, ExecutionMode::Blocking, &MotionCriterion::default())
            .is_success());

        // every poll of actuator 1 happens before the first poll of actuator 2
        let order: std::vec::Vec<u8> = bus.transport().reads().iter().map(|&(target, _)| target).collect();
        assert_eq!(order, [1, 1, 1, 1, 1, 2, 2, 2, 2]);
        assert_eq!(bus.transport().frames().len(), 1 + order.len());
    }

    #[test]
    fn test_execute_other_register_never_waits() {
        let mut peer = MockActuatorBus::new();
        peer.add_actuator(2);
        let mut bus = bus_with(peer);

        let command = ActuatorCommand {
            targets: Targets::Single((id(2), 1)),
            register: Register::TORQUE_ENABLE,
            mode: ExecutionMode::Blocking,
        };
        assert!(bus.execute(&command, &MotionCriterion::default()).is_success());
        assert_eq!(bus.transport().register(2, Register::TORQUE_ENABLE), Some(1));
        assert!(bus.transport().reads().is_empty());
    }
}
