//! Motion executor
//!
//! Top-level driver for the arm. Every positional command goes through the
//! same sequence:
//! 1. re-centre first if the arm is in an unknown or docked pose
//! 2. check the fault registers and recover if policy allows
//! 3. dispatch while the state machine reads MOVING, then settle to PAUSED
//! 4. on a nonzero status, run the fault check again and retry once
//!
//! Jobs trace each vector with a raised approach, a lowered pass over every
//! point and a settle repeat of the last point, then dock.

use std::sync::Arc;

use serde::Serialize;
use sketcharm_core::{
    AttachmentType, PhysicalPoint, PhysicalVector, Pose, RobotState, SketchConfig, SpeedType,
    ZHeights,
};
use uuid::Uuid;

use crate::actuator::{Actuator, MoveCommand};
use crate::cancel::CancelToken;
use crate::error::{MotionError, MotionResult};
use crate::fault::{RecoveryAction, RecoveryEngine, RecoveryOutcome};
use crate::state_machine::RobotStateMachine;

/// Asks the operator to swap the mounted tool
pub trait OperatorPrompt {
    /// Return `true` once `requested` is mounted, `false` to abort the change
    fn confirm_tool_change(&mut self, current: AttachmentType, requested: AttachmentType) -> bool;
}

/// Prompt that confirms every tool change, for unattended rigs
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl OperatorPrompt for AlwaysConfirm {
    fn confirm_tool_change(&mut self, _current: AttachmentType, _requested: AttachmentType) -> bool {
        true
    }
}

/// A move in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasMove {
    pub x: f64,
    pub y: f64,
    /// Explicit height; `None` uses the active attachment's heights
    pub z: Option<f64>,
    pub raised: bool,
    pub speed: SpeedType,
    pub blocking: bool,
}

impl CanvasMove {
    /// Non-contact move at normal speed
    pub fn raised(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            raised: true,
            speed: SpeedType::Normal,
            blocking: false,
        }
    }

    /// Contact move at normal speed
    pub fn lowered(x: f64, y: f64) -> Self {
        Self {
            raised: false,
            ..Self::raised(x, y)
        }
    }

    /// Raised move to a named pose, honouring its fixed height
    pub fn to_pose(pose: Pose) -> Self {
        Self {
            z: pose.z,
            ..Self::raised(pose.x, pose.y)
        }
    }

    pub fn with_speed(mut self, speed: SpeedType) -> Self {
        self.speed = speed;
        self
    }

    pub fn blocking(mut self) -> Self {
        self.blocking = true;
        self
    }
}

/// How a job ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobOutcome {
    Completed,
    Cancelled,
}

/// Summary of one executed job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobReport {
    pub job_id: Uuid,
    /// Vectors fully traced
    pub completed: usize,
    /// Non-empty vectors in the job
    pub total: usize,
    pub outcome: JobOutcome,
}

/// Drives one exclusively owned actuator
#[derive(Debug)]
pub struct MotionExecutor<A: Actuator> {
    config: Arc<SketchConfig>,
    actuator: A,
    attachment: AttachmentType,
    state: RobotStateMachine,
    recovery: RecoveryEngine,
}

impl<A: Actuator> MotionExecutor<A> {
    /// Wrap an already connected actuator. The arm starts in an unknown pose.
    pub fn new(actuator: A, config: Arc<SketchConfig>) -> Self {
        Self {
            attachment: config.robot.initial_attachment,
            recovery: RecoveryEngine::new(&config.recovery),
            state: RobotStateMachine::new(),
            actuator,
            config,
        }
    }

    /// Connect to the controller address from the configuration
    pub fn connect(config: Arc<SketchConfig>) -> MotionResult<Self> {
        let actuator = A::connect(&config.robot.address)?;
        tracing::info!("Connected to arm controller at {}", config.robot.address);
        Ok(Self::new(actuator, config))
    }

    pub fn config(&self) -> &SketchConfig {
        &self.config
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn state(&self) -> RobotState {
        self.state.current()
    }

    pub fn state_machine(&self) -> &RobotStateMachine {
        &self.state
    }

    pub fn attachment(&self) -> AttachmentType {
        self.attachment
    }

    pub fn recovery(&self) -> &RecoveryEngine {
        &self.recovery
    }

    /// Operator summary of the most recent faults
    pub fn fault_summary(&self) -> String {
        self.recovery
            .history()
            .summary(self.config.recovery.history_depth)
    }

    /// Clear the whole retry budget
    pub fn reset_retry_budget(&mut self) {
        self.recovery.reset_budget();
    }

    /// Clear faults, enable motion, select the motion mode, then centre slowly
    pub fn initialize(&mut self) -> MotionResult<()> {
        tracing::info!("Initializing arm");
        self.actuator.clear_faults()?;
        self.actuator.enable_motion()?;
        self.actuator.set_mode(self.config.robot.motion_mode)?;
        self.move_to_centre(SpeedType::Slow)
    }

    /// Operator-invoked controller restart.
    ///
    /// Does not spend retry budget. The pose is considered unknown afterwards,
    /// so the next positional command re-centres first.
    pub fn restart_controller(&mut self) -> MotionResult<bool> {
        let clear = self.recovery.restart_controller(&mut self.actuator)?;
        if self.config.robot.motion_mode != 0 {
            self.actuator.set_mode(self.config.robot.motion_mode)?;
        }
        self.state.mark_unknown();
        if clear {
            tracing::info!("Controller restarted");
        } else {
            tracing::error!(
                "Controller restarted but fault {} is still present",
                self.actuator.error_code()
            );
        }
        Ok(clear)
    }

    /// Move the tool to a canvas position
    pub fn move_canvas_position(&mut self, target: CanvasMove) -> MotionResult<()> {
        if self.state.current().requires_recentre() {
            let speed = self.recentre_speed(SpeedType::Normal);
            self.recentre(speed)?;
        }
        let command = self.command_for(&target);
        self.dispatch(command, true)
    }

    /// Move to the centred pose
    pub fn move_to_centre(&mut self, speed: SpeedType) -> MotionResult<()> {
        if self.state.current().requires_recentre() {
            let speed = self.recentre_speed(speed);
            return self.recentre(speed);
        }
        let pose = self.config.robot.centred_pose;
        self.move_canvas_position(CanvasMove::to_pose(pose).with_speed(speed))?;
        self.state.arrive(RobotState::Centred)?;
        tracing::info!("Arm centred");
        Ok(())
    }

    /// Move to the tool-change pose
    pub fn move_to_tool_change(&mut self, speed: SpeedType) -> MotionResult<()> {
        let pose = self.config.robot.tool_change_pose;
        self.move_canvas_position(CanvasMove::to_pose(pose).with_speed(speed))?;
        self.state.arrive(RobotState::ToolChange)?;
        tracing::info!("Arm at tool-change pose");
        Ok(())
    }

    /// Park the arm out of the camera's view, passing through the centred pose
    pub fn move_to_dock(&mut self) -> MotionResult<()> {
        match self.state.current() {
            RobotState::Docked => return Ok(()),
            RobotState::Centred => {}
            _ => self.move_to_centre(SpeedType::Normal)?,
        }
        let pose = self.config.robot.docked_pose;
        self.move_canvas_position(
            CanvasMove::to_pose(pose)
                .with_speed(SpeedType::Slow)
                .blocking(),
        )?;
        self.state.arrive(RobotState::Docked)?;
        tracing::info!("Arm docked");
        Ok(())
    }

    /// Swap the mounted tool with the operator's help.
    ///
    /// The attachment changes only after the operator confirms; a declined
    /// prompt returns the arm to centre and leaves the attachment as it was.
    pub fn change_tool(
        &mut self,
        attachment: AttachmentType,
        prompt: &mut dyn OperatorPrompt,
    ) -> MotionResult<()> {
        tracing::info!("Changing tool from {} to {}", self.attachment, attachment);
        self.move_to_tool_change(SpeedType::Normal)?;

        if !prompt.confirm_tool_change(self.attachment, attachment) {
            tracing::warn!("Tool change to {} declined", attachment);
            self.move_to_centre(SpeedType::Normal)?;
            return Err(MotionError::ToolChangeAborted);
        }

        self.attachment = attachment;
        self.move_to_centre(SpeedType::Normal)
    }

    /// Change tool only if `attachment` is not already mounted
    pub fn ensure_attachment(
        &mut self,
        attachment: AttachmentType,
        prompt: &mut dyn OperatorPrompt,
    ) -> MotionResult<()> {
        if self.attachment == attachment {
            return Ok(());
        }
        self.change_tool(attachment, prompt)
    }

    /// Touch each canvas corner, then return to centre
    pub fn calibrate_corners(&mut self) -> MotionResult<()> {
        tracing::info!("Calibrating canvas corners");
        for corner in self.config.canvas.corners() {
            self.move_canvas_position(CanvasMove::raised(corner.x, corner.y))?;
            self.move_canvas_position(CanvasMove::lowered(corner.x, corner.y))?;
            self.move_canvas_position(CanvasMove::raised(corner.x, corner.y))?;
        }
        self.move_to_centre(SpeedType::Normal)
    }

    /// Trace every vector of a job, then dock.
    ///
    /// Empty vectors are skipped. Cancellation is checked before each vector;
    /// a cancelled job lifts the tool and docks. Any unrecovered failure
    /// aborts the remaining vectors and is returned as
    /// [`MotionError::JobAborted`].
    pub fn execute_job(
        &mut self,
        vectors: &[PhysicalVector],
        cancel: &CancelToken,
    ) -> MotionResult<JobReport> {
        let job_id = Uuid::new_v4();
        let vectors: Vec<&PhysicalVector> = vectors.iter().filter(|v| !v.is_empty()).collect();
        let total = vectors.len();

        let span = tracing::info_span!("job", %job_id, attachment = %self.attachment, total);
        let _guard = span.enter();
        tracing::info!("Starting job with {} vectors", total);

        let mut completed = 0;
        let mut last_point: Option<PhysicalPoint> = None;

        for vector in vectors {
            if cancel.is_cancelled() {
                tracing::warn!("Job cancelled after {} of {} vectors", completed, total);
                self.finish_cancelled(last_point)
                    .map_err(|source| abort(completed, total, source))?;
                return Ok(JobReport {
                    job_id,
                    completed,
                    total,
                    outcome: JobOutcome::Cancelled,
                });
            }

            self.trace_vector(vector)
                .map_err(|source| abort(completed, total, source))?;
            completed += 1;
            last_point = vector.last().copied();
        }

        self.move_to_dock()
            .map_err(|source| abort(completed, total, source))?;
        tracing::info!("Job completed");
        Ok(JobReport {
            job_id,
            completed,
            total,
            outcome: JobOutcome::Completed,
        })
    }

    fn trace_vector(&mut self, vector: &PhysicalVector) -> MotionResult<()> {
        let (Some(first), Some(last)) = (vector.first().copied(), vector.last().copied()) else {
            return Ok(());
        };

        self.move_canvas_position(CanvasMove::raised(first.x, first.y))?;
        for point in vector.points() {
            self.move_canvas_position(CanvasMove::lowered(point.x, point.y))?;
        }
        // Settle on the final point
        self.move_canvas_position(CanvasMove::lowered(last.x, last.y))
    }

    fn finish_cancelled(&mut self, last_point: Option<PhysicalPoint>) -> MotionResult<()> {
        if let Some(point) = last_point {
            self.move_canvas_position(CanvasMove::raised(point.x, point.y))?;
        }
        self.move_to_dock()
    }

    fn recentre_speed(&self, requested: SpeedType) -> SpeedType {
        if self.state.current() == RobotState::Docked {
            SpeedType::Slow
        } else {
            requested
        }
    }

    /// Forced re-centre, dispatched while CALCULATING.
    ///
    /// A failed re-centre leaves the pose UNKNOWN so the next command
    /// re-centres again.
    fn recentre(&mut self, speed: SpeedType) -> MotionResult<()> {
        tracing::info!("Re-centring from {} pose", self.state.current());
        self.state.begin_recentre()?;
        let pose = self.config.robot.centred_pose;
        let command = self.command_for(&CanvasMove::to_pose(pose).with_speed(speed));
        if let Err(err) = self.dispatch(command, false) {
            tracing::error!("Re-centring failed, arm pose unknown: {}", err);
            self.state.mark_unknown();
            return Err(err);
        }
        self.state.arrive(RobotState::Centred)?;
        Ok(())
    }

    /// Dispatch with a fault check before, and one retry after a recovered failure.
    ///
    /// `tracked` moves run through MOVING/PAUSED; re-centring moves stay in
    /// CALCULATING.
    fn dispatch(&mut self, command: MoveCommand, tracked: bool) -> MotionResult<()> {
        let context = format!("move to {}", command);
        let outcome = self.check_faults(&context)?;
        let command = self.adjust_for(outcome, command);

        if tracked {
            self.state.begin_move()?;
        }
        let status = self.actuator.set_position(&command);
        if tracked {
            self.state.complete_move()?;
        }
        let status = status?;
        if status == 0 {
            tracing::debug!("Moved to {} at speed {}", command, command.speed);
            return Ok(());
        }

        tracing::warn!(
            "set_position failed with status {} (error {}, warning {})",
            status,
            self.actuator.error_code(),
            self.actuator.warn_code()
        );
        let outcome = self.check_faults(&format!("set_position failed with code {}", status))?;
        let retry = self.adjust_for(outcome, command);

        tracing::info!("Retrying movement after error recovery");
        if tracked {
            self.state.begin_retry()?;
        }
        let status = self.actuator.set_position(&retry);
        if tracked {
            self.state.complete_move()?;
        }
        match status? {
            0 => Ok(()),
            status => {
                tracing::error!("Retry of {} failed with status {}", retry, status);
                Err(MotionError::DispatchFailed { status, context })
            }
        }
    }

    fn check_faults(&mut self, context: &str) -> MotionResult<RecoveryOutcome> {
        let rehome = self.command_for(
            &CanvasMove::to_pose(self.config.robot.centred_pose).with_speed(SpeedType::Slow),
        );
        let outcome = self.recovery.check(&mut self.actuator, context, move |arm| {
            tracing::info!("Re-planning path, moving to centred pose");
            match arm.set_position(&rehome)? {
                0 => Ok(()),
                status => Err(MotionError::DispatchFailed {
                    status,
                    context: "re-home to centred pose".to_string(),
                }),
            }
        })?;

        if outcome.action() == Some(RecoveryAction::RePlanPath)
            && self.state.current() != RobotState::Calculating
        {
            self.state.begin_recentre()?;
            self.state.arrive(RobotState::Centred)?;
        }
        Ok(outcome)
    }

    /// Slow the command down after a speed-limit recovery
    fn adjust_for(&self, outcome: RecoveryOutcome, command: MoveCommand) -> MoveCommand {
        if outcome.action() == Some(RecoveryAction::ReduceSpeed) {
            MoveCommand {
                speed: self.config.robot.speeds.get(SpeedType::Slow),
                ..command
            }
        } else {
            command
        }
    }

    fn heights(&self) -> ZHeights {
        self.config.robot.attachments.get(self.attachment)
    }

    fn command_for(&self, target: &CanvasMove) -> MoveCommand {
        let robot = &self.config.robot;
        MoveCommand {
            x: target.x,
            y: target.y,
            z: target.z.unwrap_or_else(|| self.heights().height(target.raised)),
            roll: robot.orientation.roll,
            pitch: robot.orientation.pitch,
            yaw: robot.orientation.yaw,
            speed: robot.speeds.get(target.speed),
            acceleration: robot.acceleration,
            blocking: target.blocking,
        }
    }
}

fn abort(completed: usize, total: usize, source: MotionError) -> MotionError {
    tracing::error!(
        "Job aborted after {} of {} vectors: {}",
        completed,
        total,
        source
    );
    MotionError::JobAborted {
        completed,
        total,
        source: Box::new(source),
    }
}
