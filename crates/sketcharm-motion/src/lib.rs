//! # SketchArm Motion
//!
//! Safe execution of toolpaths on the arm.
//!
//! ## Components
//!
//! - **Actuator**: Synchronous controller interface plus an in-process simulated arm
//! - **Robot State Machine**: Pose/activity tracking with a legal transition table
//! - **Fault Classifier**: Static fault code table and auto-recovery policy
//! - **Recovery Engine**: Bounded-retry remediation, retry budget and fault history
//! - **Motion Executor**: Re-centring, fault checks, dispatch, jobs, tool changes and docking

pub mod actuator;
pub mod cancel;
pub mod error;
pub mod executor;
pub mod fault;
pub mod state_machine;

pub use actuator::{Actuator, MoveCommand, SimCall, SimulatedArm};
pub use cancel::CancelToken;
pub use error::{ActuatorError, MotionError, MotionResult};
pub use executor::{
    AlwaysConfirm, CanvasMove, JobOutcome, JobReport, MotionExecutor, OperatorPrompt,
};
pub use fault::{
    FaultClassifier, FaultHistory, FaultInfo, FaultRecord, FaultVerdict, RecoveryAction,
    RecoveryEngine, RecoveryOutcome, RetryBudget, Severity,
};
pub use state_machine::RobotStateMachine;
