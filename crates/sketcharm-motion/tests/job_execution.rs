use std::sync::Arc;

use sketcharm_core::{
    AttachmentType, PhysicalPoint, PhysicalVector, RecoveryConfig, RobotState, SketchConfig,
};
use sketcharm_motion::{
    Actuator, ActuatorError, AlwaysConfirm, CancelToken, JobOutcome, MotionError, MotionExecutor,
    MoveCommand, OperatorPrompt, RecoveryAction, SimulatedArm,
};

fn config() -> Arc<SketchConfig> {
    Arc::new(SketchConfig {
        recovery: RecoveryConfig {
            settle_pause_ms: 0,
            restart_pause_ms: 0,
            ..RecoveryConfig::default()
        },
        ..SketchConfig::default()
    })
}

fn ready_executor() -> (MotionExecutor<SimulatedArm>, SimulatedArm) {
    let arm = SimulatedArm::new();
    let mut exec = MotionExecutor::new(arm.clone(), config());
    exec.initialize().unwrap();
    (exec, arm)
}

fn vector(points: &[(f64, f64)]) -> PhysicalVector {
    points
        .iter()
        .map(|&(x, y)| PhysicalPoint::new(x, y))
        .collect()
}

fn xyz(command: &MoveCommand) -> (f64, f64, f64) {
    (command.x, command.y, command.z)
}

#[test]
fn test_vector_trace_pattern_and_dock() {
    let (mut exec, arm) = ready_executor();
    let job = vec![vector(&[(250.0, 0.0), (260.0, 5.0), (270.0, 10.0)])];

    let report = exec.execute_job(&job, &CancelToken::new()).unwrap();
    assert_eq!(report.outcome, JobOutcome::Completed);
    assert_eq!((report.completed, report.total), (1, 1));

    let moves = arm.moves();
    assert_eq!(moves.len(), 8);
    // Raised approach
    assert_eq!(xyz(&moves[1]), (250.0, 0.0, 125.0));
    // Lowered trace over every point, first included
    assert_eq!(xyz(&moves[2]), (250.0, 0.0, 118.0));
    assert_eq!(xyz(&moves[3]), (260.0, 5.0, 118.0));
    assert_eq!(xyz(&moves[4]), (270.0, 10.0, 118.0));
    // Settle repeat
    assert_eq!(xyz(&moves[5]), (270.0, 10.0, 118.0));
    // Centre, then dock slowly
    assert_eq!(xyz(&moves[6]), (200.0, 0.0, 125.0));
    assert_eq!(xyz(&moves[7]), (100.0, 250.0, 125.0));
    assert_eq!(moves[7].speed, 50.0);
    assert!(moves[7].blocking);

    assert_eq!(exec.state(), RobotState::Docked);
}

#[test]
fn test_empty_vectors_skipped() {
    let (mut exec, _) = ready_executor();
    let job = vec![PhysicalVector::default(), vector(&[(300.0, 0.0), (301.0, 0.0)])];
    let report = exec.execute_job(&job, &CancelToken::new()).unwrap();
    assert_eq!((report.completed, report.total), (1, 1));
}

#[test]
fn test_docked_arm_recentres_before_moving() {
    let (mut exec, arm) = ready_executor();
    exec.move_to_dock().unwrap();
    assert_eq!(exec.state(), RobotState::Docked);
    let before = arm.moves().len();

    exec.move_canvas_position(sketcharm_motion::CanvasMove::raised(300.0, 20.0))
        .unwrap();

    let trail = exec.state_machine().trail();
    assert_eq!(
        &trail[trail.len() - 5..],
        &[
            RobotState::Docked,
            RobotState::Calculating,
            RobotState::Centred,
            RobotState::Moving,
            RobotState::Paused
        ]
    );

    let moves = arm.moves();
    assert_eq!(moves.len(), before + 2);
    assert_eq!(xyz(&moves[before]), (200.0, 0.0, 125.0));
    assert_eq!(moves[before].speed, 50.0);
}

#[test]
fn test_critical_fault_aborts_remaining_vectors() {
    let (mut exec, arm) = ready_executor();
    arm.fault_after_moves(3, 38);
    let job = vec![
        vector(&[(250.0, 0.0), (260.0, 0.0), (270.0, 0.0)]),
        vector(&[(300.0, 0.0), (310.0, 0.0)]),
    ];

    let err = exec.execute_job(&job, &CancelToken::new()).unwrap_err();
    match &err {
        MotionError::JobAborted {
            completed,
            total,
            source,
        } => {
            assert_eq!((*completed, *total), (0, 2));
            assert!(matches!(
                **source,
                MotionError::Unrecoverable {
                    code: 38,
                    action: RecoveryAction::EmergencyStop,
                    ..
                }
            ));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.needs_operator());

    // No further motion after the fault
    assert_eq!(arm.moves().len(), 1 + 3);
    assert_eq!(exec.recovery().history().len(), 1);
    assert!(exec
        .fault_summary()
        .contains("Abnormal Joint Angle (Code: 38)"));
}

#[test]
fn test_dispatch_failure_recovers_and_retries_once() {
    let (mut exec, arm) = ready_executor();
    arm.fail_next_dispatch(9, 27);
    let job = vec![vector(&[(250.0, 0.0), (260.0, 0.0)])];

    let report = exec.execute_job(&job, &CancelToken::new()).unwrap();
    assert_eq!(report.outcome, JobOutcome::Completed);
    assert_eq!(
        exec.recovery().budget().attempts(27, RecoveryAction::AutoRetry),
        1
    );
    assert_eq!(exec.recovery().history().len(), 1);
    assert_eq!(xyz(&arm.moves()[1]), (250.0, 0.0, 125.0));
}

#[test]
fn test_dispatch_failure_without_fault_retries() {
    let (mut exec, arm) = ready_executor();
    arm.fail_next_dispatch(9, 0);
    exec.move_canvas_position(sketcharm_motion::CanvasMove::raised(300.0, 0.0))
        .unwrap();
    assert_eq!(arm.moves().len(), 2);
    assert!(exec.recovery().history().is_empty());
}

#[test]
fn test_repeated_dispatch_failure_aborts() {
    let (mut exec, arm) = ready_executor();
    arm.fail_next_dispatch(9, 0);
    arm.fail_next_dispatch(11, 0);
    let job = vec![vector(&[(250.0, 0.0), (260.0, 0.0)])];

    let err = exec.execute_job(&job, &CancelToken::new()).unwrap_err();
    let MotionError::JobAborted { source, .. } = err else {
        panic!("expected job abort");
    };
    assert!(matches!(
        *source,
        MotionError::DispatchFailed { status: 11, .. }
    ));
    assert_eq!(exec.state(), RobotState::Paused);
}

#[test]
fn test_replan_rehomes_before_retry() {
    let (mut exec, arm) = ready_executor();
    exec.move_canvas_position(sketcharm_motion::CanvasMove::raised(300.0, 0.0))
        .unwrap();
    arm.fail_next_dispatch(9, 21);

    exec.move_canvas_position(sketcharm_motion::CanvasMove::raised(320.0, 40.0))
        .unwrap();
    let moves = arm.moves();
    let n = moves.len();
    assert_eq!(xyz(&moves[n - 2]), (200.0, 0.0, 125.0));
    assert_eq!(moves[n - 2].speed, 50.0);
    assert_eq!(xyz(&moves[n - 1]), (320.0, 40.0, 125.0));
    assert_eq!(exec.state(), RobotState::Paused);
}

#[test]
fn test_retry_budget_exhausts_across_moves() {
    let (mut exec, arm) = ready_executor();
    for _ in 0..3 {
        arm.inject_fault(27, 0);
        exec.move_canvas_position(sketcharm_motion::CanvasMove::raised(300.0, 0.0))
            .unwrap();
    }
    arm.inject_fault(27, 0);
    let err = exec
        .move_canvas_position(sketcharm_motion::CanvasMove::raised(300.0, 0.0))
        .unwrap_err();
    assert!(matches!(err, MotionError::Unrecoverable { code: 27, .. }));
    assert_eq!(exec.recovery().history().len(), 4);

    exec.reset_retry_budget();
    exec.move_canvas_position(sketcharm_motion::CanvasMove::raised(300.0, 0.0))
        .unwrap();
}

#[test]
fn test_cancel_before_start_docks() {
    let (mut exec, arm) = ready_executor();
    let token = CancelToken::new();
    token.cancel();
    let job = vec![vector(&[(250.0, 0.0), (260.0, 0.0)])];

    let report = exec.execute_job(&job, &token).unwrap();
    assert_eq!(report.outcome, JobOutcome::Cancelled);
    assert_eq!(report.completed, 0);
    assert_eq!(exec.state(), RobotState::Docked);
    // Centred already, so only the dock move
    assert_eq!(arm.moves().len(), 2);
}

/// Cancels a token once a number of moves have completed
struct CancellingArm {
    inner: SimulatedArm,
    token: CancelToken,
    remaining: usize,
}

impl Actuator for CancellingArm {
    fn connect(address: &str) -> Result<Self, ActuatorError> {
        Ok(Self {
            inner: SimulatedArm::connect(address)?,
            token: CancelToken::new(),
            remaining: usize::MAX,
        })
    }

    fn clear_faults(&mut self) -> Result<(), ActuatorError> {
        self.inner.clear_faults()
    }

    fn enable_motion(&mut self) -> Result<(), ActuatorError> {
        self.inner.enable_motion()
    }

    fn set_mode(&mut self, mode: i32) -> Result<(), ActuatorError> {
        self.inner.set_mode(mode)
    }

    fn set_position(&mut self, command: &MoveCommand) -> Result<i32, ActuatorError> {
        let status = self.inner.set_position(command)?;
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.token.cancel();
        }
        Ok(status)
    }

    fn error_code(&self) -> u32 {
        self.inner.error_code()
    }

    fn warn_code(&self) -> u32 {
        self.inner.warn_code()
    }
}

#[test]
fn test_cancel_between_vectors_lifts_and_docks() {
    let observer = SimulatedArm::new();
    let token = CancelToken::new();
    let arm = CancellingArm {
        inner: observer.clone(),
        token: token.clone(),
        // Initial centring plus one full vector
        remaining: 1 + 5,
    };
    let mut exec = MotionExecutor::new(arm, config());
    exec.initialize().unwrap();

    let job = vec![
        vector(&[(250.0, 0.0), (260.0, 0.0), (270.0, 0.0)]),
        vector(&[(300.0, 0.0), (310.0, 0.0)]),
    ];
    let report = exec.execute_job(&job, &token).unwrap();
    assert_eq!(report.outcome, JobOutcome::Cancelled);
    assert_eq!((report.completed, report.total), (1, 2));

    let moves = observer.moves();
    assert_eq!(moves.len(), 1 + 5 + 3);
    // Lift at the last traced point
    assert_eq!(xyz(&moves[6]), (270.0, 0.0, 125.0));
    assert_eq!(exec.state(), RobotState::Docked);
    // Nothing from the second vector was drawn
    assert!(moves.iter().all(|m| m.x != 300.0 && m.x != 310.0));
}

#[derive(Default)]
struct RecordingPrompt {
    asked: Vec<(AttachmentType, AttachmentType)>,
}

impl OperatorPrompt for RecordingPrompt {
    fn confirm_tool_change(&mut self, current: AttachmentType, requested: AttachmentType) -> bool {
        self.asked.push((current, requested));
        true
    }
}

#[test]
fn test_tool_change_switches_heights() {
    let (mut exec, arm) = ready_executor();
    let mut prompt = RecordingPrompt::default();

    exec.ensure_attachment(AttachmentType::Eraser, &mut prompt)
        .unwrap();
    assert_eq!(
        prompt.asked,
        vec![(AttachmentType::Marker, AttachmentType::Eraser)]
    );
    assert_eq!(exec.attachment(), AttachmentType::Eraser);
    assert_eq!(exec.state(), RobotState::Centred);

    let moves = arm.moves();
    assert_eq!(xyz(&moves[1]), (350.0, 0.0, 300.0));
    assert_eq!(xyz(&moves[2]), (200.0, 0.0, 80.0));

    // Already mounted: no prompt, no motion
    exec.ensure_attachment(AttachmentType::Eraser, &mut prompt)
        .unwrap();
    assert_eq!(prompt.asked.len(), 1);
    assert_eq!(arm.moves().len(), 3);

    exec.change_tool(AttachmentType::Marker, &mut AlwaysConfirm)
        .unwrap();
    assert_eq!(exec.attachment(), AttachmentType::Marker);
}

#[test]
fn test_calibrate_corners_order() {
    let (mut exec, arm) = ready_executor();
    exec.calibrate_corners().unwrap();

    let moves = arm.moves();
    assert_eq!(moves.len(), 1 + 12 + 1);
    let touches: Vec<(f64, f64)> = moves[1..13]
        .iter()
        .filter(|m| m.z == 118.0)
        .map(|m| (m.x, m.y))
        .collect();
    assert_eq!(
        touches,
        vec![(235.0, 190.0), (235.0, -190.0), (415.0, -190.0), (415.0, 190.0)]
    );
    assert_eq!(exec.state(), RobotState::Centred);
}

#[test]
fn test_connect_uses_configured_address() {
    let exec = MotionExecutor::<SimulatedArm>::connect(config()).unwrap();
    assert_eq!(exec.actuator().address(), "192.168.1.239");
    assert_eq!(exec.state(), RobotState::Unknown);
}

#[test]
fn test_disconnected_actuator_surfaces_transport_error() {
    let (mut exec, arm) = ready_executor();
    arm.disconnect();
    let err = exec
        .move_canvas_position(sketcharm_motion::CanvasMove::raised(300.0, 0.0))
        .unwrap_err();
    assert!(matches!(
        err,
        MotionError::Actuator(ActuatorError::Disconnected)
    ));
}
