//! Arm state machine
//!
//! Tracks the logical pose/activity of the arm and rejects transitions
//! outside [`RobotState::can_transition_to`]. It also remembers which state
//! the current move started from, so docking can insist on a move that
//! began at the centred pose.

use sketcharm_core::{RobotState, StateError};

/// Single-writer arm state tracker
#[derive(Debug, Clone)]
pub struct RobotStateMachine {
    current: RobotState,
    move_origin: Option<RobotState>,
    trail: Vec<RobotState>,
}

impl RobotStateMachine {
    /// Start in [`RobotState::Unknown`]
    pub fn new() -> Self {
        Self {
            current: RobotState::Unknown,
            move_origin: None,
            trail: vec![RobotState::Unknown],
        }
    }

    pub fn current(&self) -> RobotState {
        self.current
    }

    /// State the latest positional command was accepted from
    pub fn move_origin(&self) -> Option<RobotState> {
        self.move_origin
    }

    /// Every state entered, starting with the initial one
    pub fn trail(&self) -> &[RobotState] {
        &self.trail
    }

    /// Enter [`RobotState::Calculating`] before a forced re-centre
    pub fn begin_recentre(&mut self) -> Result<(), StateError> {
        self.move_origin = None;
        self.transition(RobotState::Calculating)
    }

    /// Enter [`RobotState::Moving`] for a new positional command
    pub fn begin_move(&mut self) -> Result<(), StateError> {
        let origin = self.current;
        self.transition(RobotState::Moving)?;
        self.move_origin = Some(origin);
        Ok(())
    }

    /// Re-enter [`RobotState::Moving`] to retry the interrupted command.
    ///
    /// The interrupted move keeps its origin unless a re-centre replaced it.
    pub fn begin_retry(&mut self) -> Result<(), StateError> {
        let origin = self.move_origin.unwrap_or(self.current);
        self.transition(RobotState::Moving)?;
        self.move_origin = Some(origin);
        Ok(())
    }

    /// Record the end of a dispatch, successful or not
    pub fn complete_move(&mut self) -> Result<(), StateError> {
        self.transition(RobotState::Paused)
    }

    /// Settle into a named pose after an explicit move
    pub fn arrive(&mut self, pose: RobotState) -> Result<(), StateError> {
        if pose == RobotState::Docked {
            let origin = self.move_origin.unwrap_or(self.current);
            if origin != RobotState::Centred {
                return Err(StateError::DockWithoutCentre { origin });
            }
        }
        self.transition(pose)
    }

    /// Forget the current pose, e.g. after a controller restart
    pub fn mark_unknown(&mut self) {
        self.move_origin = None;
        if self.current != RobotState::Unknown {
            self.current = RobotState::Unknown;
            self.trail.push(RobotState::Unknown);
        }
    }

    fn transition(&mut self, target: RobotState) -> Result<(), StateError> {
        if !self.current.can_transition_to(target) {
            return Err(StateError::InvalidTransition {
                current: self.current,
                requested: target,
            });
        }
        tracing::debug!("Arm state {} -> {}", self.current, target);
        self.current = target;
        self.trail.push(target);
        Ok(())
    }
}

impl Default for RobotStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
