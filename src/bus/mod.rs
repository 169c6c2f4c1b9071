//! Actuator bus protocol layer
//!
//! Dynamixel 1.0 style request/response protocol over a half-duplex serial
//! bus:
//!
//! - [`protocol`]: wire constants, ids and the control table
//! - [`packet`]: instruction/status frame codec
//! - [`receiver`]: incremental status frame reception
//! - [`result`]: transport outcome and device fault reporting
//! - [`driver`]: read, write, ping and sync write transactions
//! - [`motion`]: goal moves and motion completion
//! - [`servo`]: per-actuator convenience handle

pub mod driver;
pub mod motion;
pub mod packet;
pub mod protocol;
pub mod receiver;
pub mod result;
pub mod servo;

pub use driver::{ActuatorBus, BusConfig};
pub use motion::{ActuatorCommand, ExecutionMode, MotionCriterion, MotionOutcome, Targets};
pub use packet::{checksum, InstructionPacket, StatusPacket};
pub use protocol::{ActuatorId, Instruction, Register, RegisterWidth, BROADCAST_ID, MAX_ID};
pub use receiver::StatusReceiver;
pub use result::{ActuatorFault, CommResult, StatusReading};
pub use servo::{Direction, OperatingMode, Servo};
