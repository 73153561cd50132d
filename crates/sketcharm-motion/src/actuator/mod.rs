//! Actuator collaborator
//!
//! The arm controller behind a synchronous, exclusively owned handle. At
//! most one positional command is in flight: every call takes `&mut self`.

mod simulated;

pub use simulated::{SimCall, SimulatedArm, FAULTED_STATUS};

use std::fmt;

use crate::error::ActuatorError;

/// One positional command
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveCommand {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub speed: f64,
    pub acceleration: f64,
    /// Wait for the motion to finish before returning
    pub blocking: bool,
}

impl fmt::Display for MoveCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1}, {:.1})", self.x, self.y, self.z)
    }
}

/// Arm controller interface
pub trait Actuator {
    /// Open a connection to the controller at `address`
    fn connect(address: &str) -> Result<Self, ActuatorError>
    where
        Self: Sized;

    /// Clear fault and warning flags
    fn clear_faults(&mut self) -> Result<(), ActuatorError>;

    /// Enable the joint motors
    fn enable_motion(&mut self) -> Result<(), ActuatorError>;

    /// Set the controller motion mode
    fn set_mode(&mut self, mode: i32) -> Result<(), ActuatorError>;

    /// Dispatch a positional command.
    ///
    /// Returns the controller status: 0 on success, nonzero when the
    /// controller reported a failure.
    fn set_position(&mut self, command: &MoveCommand) -> Result<i32, ActuatorError>;

    /// Current fault register (0 = no fault)
    fn error_code(&self) -> u32;

    /// Current warning register
    fn warn_code(&self) -> u32;
}
