//! In-process simulated arm
//!
//! Records every command it receives and can be scripted to raise faults or
//! reject dispatches. Clones share the same state, so a test can keep a
//! handle while the executor owns another.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{Actuator, MoveCommand};
use crate::error::ActuatorError;

/// Status returned by `set_position` while the fault register is set
pub const FAULTED_STATUS: i32 = 1;

/// Controller call observed by the simulator
#[derive(Debug, Clone, PartialEq)]
pub enum SimCall {
    ClearFaults,
    EnableMotion,
    SetMode(i32),
    SetPosition(MoveCommand),
}

#[derive(Debug, Default)]
struct SimState {
    address: String,
    connected: bool,
    error_code: u32,
    warn_code: u32,
    sticky_faults: bool,
    motion_enabled: bool,
    mode: i32,
    calls: Vec<SimCall>,
    moves: Vec<MoveCommand>,
    scripted_dispatches: VecDeque<(i32, u32)>,
    fault_after: Option<(usize, u32)>,
}

/// Simulated arm controller
#[derive(Debug, Clone)]
pub struct SimulatedArm {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedArm {
    /// A connected, fault-free simulator
    pub fn new() -> Self {
        Self::with_address("simulated")
    }

    fn with_address(address: &str) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                address: address.to_string(),
                connected: true,
                ..SimState::default()
            })),
        }
    }

    /// Set the fault and warning registers now
    pub fn inject_fault(&self, code: u32, warn_code: u32) {
        let mut state = self.state.lock();
        state.error_code = code;
        state.warn_code = warn_code;
    }

    /// When sticky, clearing faults leaves the fault register set
    pub fn set_sticky_faults(&self, sticky: bool) {
        self.state.lock().sticky_faults = sticky;
    }

    /// Make the next dispatch return `status` and raise `code` without moving
    pub fn fail_next_dispatch(&self, status: i32, code: u32) {
        self.state
            .lock()
            .scripted_dispatches
            .push_back((status, code));
    }

    /// Raise `code` once `moves` more dispatches have completed
    pub fn fault_after_moves(&self, moves: usize, code: u32) {
        self.state.lock().fault_after = Some((moves, code));
    }

    /// Drop the connection; later calls fail
    pub fn disconnect(&self) {
        self.state.lock().connected = false;
    }

    pub fn address(&self) -> String {
        self.state.lock().address.clone()
    }

    /// Completed moves, oldest first
    pub fn moves(&self) -> Vec<MoveCommand> {
        self.state.lock().moves.clone()
    }

    /// Every controller call, oldest first
    pub fn calls(&self) -> Vec<SimCall> {
        self.state.lock().calls.clone()
    }

    pub fn motion_enabled(&self) -> bool {
        self.state.lock().motion_enabled
    }

    pub fn mode(&self) -> i32 {
        self.state.lock().mode
    }

    fn connected(state: &SimState) -> Result<(), ActuatorError> {
        if state.connected {
            Ok(())
        } else {
            Err(ActuatorError::Disconnected)
        }
    }
}

impl Default for SimulatedArm {
    fn default() -> Self {
        Self::new()
    }
}

impl Actuator for SimulatedArm {
    fn connect(address: &str) -> Result<Self, ActuatorError> {
        if address.trim().is_empty() {
            return Err(ActuatorError::ConnectionFailed {
                address: address.to_string(),
                reason: "empty address".to_string(),
            });
        }
        tracing::debug!("Simulated arm connected at {}", address);
        Ok(Self::with_address(address))
    }

    fn clear_faults(&mut self) -> Result<(), ActuatorError> {
        let mut state = self.state.lock();
        Self::connected(&state)?;
        state.calls.push(SimCall::ClearFaults);
        if !state.sticky_faults {
            state.error_code = 0;
        }
        state.warn_code = 0;
        Ok(())
    }

    fn enable_motion(&mut self) -> Result<(), ActuatorError> {
        let mut state = self.state.lock();
        Self::connected(&state)?;
        state.calls.push(SimCall::EnableMotion);
        state.motion_enabled = true;
        Ok(())
    }

    fn set_mode(&mut self, mode: i32) -> Result<(), ActuatorError> {
        let mut state = self.state.lock();
        Self::connected(&state)?;
        state.calls.push(SimCall::SetMode(mode));
        state.mode = mode;
        Ok(())
    }

    fn set_position(&mut self, command: &MoveCommand) -> Result<i32, ActuatorError> {
        let mut state = self.state.lock();
        Self::connected(&state)?;
        state.calls.push(SimCall::SetPosition(*command));

        if state.error_code != 0 {
            return Ok(FAULTED_STATUS);
        }
        if let Some((status, code)) = state.scripted_dispatches.pop_front() {
            state.error_code = code;
            return Ok(status);
        }

        state.moves.push(*command);
        if let Some((remaining, code)) = state.fault_after {
            if remaining <= 1 {
                state.error_code = code;
                state.fault_after = None;
            } else {
                state.fault_after = Some((remaining - 1, code));
            }
        }
        Ok(0)
    }

    fn error_code(&self) -> u32 {
        self.state.lock().error_code
    }

    fn warn_code(&self) -> u32 {
        self.state.lock().warn_code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(x: f64) -> MoveCommand {
        MoveCommand {
            x,
            y: 0.0,
            z: 100.0,
            roll: 180.0,
            pitch: 0.0,
            yaw: 0.0,
            speed: 100.0,
            acceleration: 100.0,
            blocking: false,
        }
    }

    #[test]
    fn test_connect_rejects_empty_address() {
        assert!(matches!(
            SimulatedArm::connect(" "),
            Err(ActuatorError::ConnectionFailed { .. })
        ));
        let arm = SimulatedArm::connect("192.168.1.239").unwrap();
        assert_eq!(arm.address(), "192.168.1.239");
    }

    #[test]
    fn test_records_moves_through_clones() {
        let observer = SimulatedArm::new();
        let mut arm = observer.clone();
        assert_eq!(arm.set_position(&command(1.0)).unwrap(), 0);
        assert_eq!(observer.moves(), vec![command(1.0)]);
    }

    #[test]
    fn test_faulted_arm_refuses_motion() {
        let mut arm = SimulatedArm::new();
        arm.inject_fault(24, 3);
        assert_eq!(arm.set_position(&command(1.0)).unwrap(), FAULTED_STATUS);
        assert!(arm.moves().is_empty());

        arm.clear_faults().unwrap();
        assert_eq!((arm.error_code(), arm.warn_code()), (0, 0));
    }

    #[test]
    fn test_sticky_faults_survive_clear() {
        let mut arm = SimulatedArm::new();
        arm.inject_fault(27, 0);
        arm.set_sticky_faults(true);
        arm.clear_faults().unwrap();
        assert_eq!(arm.error_code(), 27);
    }

    #[test]
    fn test_scripted_dispatch_failure() {
        let mut arm = SimulatedArm::new();
        arm.fail_next_dispatch(9, 27);
        assert_eq!(arm.set_position(&command(1.0)).unwrap(), 9);
        assert_eq!(arm.error_code(), 27);
        assert!(arm.moves().is_empty());
    }

    #[test]
    fn test_fault_after_moves() {
        let mut arm = SimulatedArm::new();
        arm.fault_after_moves(2, 38);
        arm.set_position(&command(1.0)).unwrap();
        assert_eq!(arm.error_code(), 0);
        arm.set_position(&command(2.0)).unwrap();
        assert_eq!(arm.error_code(), 38);
    }

    #[test]
    fn test_disconnected_calls_fail() {
        let mut arm = SimulatedArm::new();
        arm.disconnect();
        assert_eq!(arm.enable_motion(), Err(ActuatorError::Disconnected));
        assert!(arm.set_position(&command(1.0)).is_err());
    }
}
