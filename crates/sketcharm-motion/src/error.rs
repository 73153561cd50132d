//! Error types for arm control
//!
//! Every failure that reaches a caller carries an explicit verdict:
//! classified faults keep their severity, recovery action and operator
//! message; dispatch failures keep the controller status.

use sketcharm_core::StateError;
use thiserror::Error;

use crate::fault::{FaultVerdict, RecoveryAction, Severity};

/// Transport-level actuator errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActuatorError {
    /// The controller could not be reached
    #[error("Failed to connect to controller at {address}: {reason}")]
    ConnectionFailed {
        /// Controller address
        address: String,
        /// Why the connection failed
        reason: String,
    },

    /// The connection was lost
    #[error("Controller disconnected")]
    Disconnected,

    /// The controller rejected a non-motion command
    #[error("Controller rejected {operation} with code {code}")]
    CommandRejected {
        /// Operation name
        operation: String,
        /// Status code returned by the controller
        code: i32,
    },
}

/// Errors raised while executing motion
#[derive(Error, Debug)]
pub enum MotionError {
    /// A classified fault that must not be recovered automatically
    #[error("Unrecoverable fault {code} ({severity}, {action}): {message}")]
    Unrecoverable {
        code: u32,
        warn_code: u32,
        severity: Severity,
        action: RecoveryAction,
        message: String,
        context: String,
    },

    /// A fault code missing from the fault table
    #[error("Unknown fault code {code} (warning {warn_code}) during {context}")]
    UnknownFault {
        code: u32,
        warn_code: u32,
        context: String,
    },

    /// Remediation ran but the fault register was still set afterwards
    #[error("Recovery ({action}) failed for fault {code} during {context}")]
    RecoveryFailed {
        code: u32,
        action: RecoveryAction,
        context: String,
    },

    /// A positional command kept failing after its single retry
    #[error("Command dispatch failed with status {status} during {context}")]
    DispatchFailed { status: i32, context: String },

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Actuator(#[from] ActuatorError),

    /// The operator did not confirm the tool swap
    #[error("Tool change aborted by operator")]
    ToolChangeAborted,

    /// A job stopped before all of its vectors were drawn
    #[error("Job aborted after {completed} of {total} vectors: {source}")]
    JobAborted {
        completed: usize,
        total: usize,
        #[source]
        source: Box<MotionError>,
    },
}

impl MotionError {
    /// Escalation error for a verdict that cannot be auto-recovered
    pub fn from_verdict(verdict: &FaultVerdict, context: &str) -> Self {
        match verdict.severity() {
            Some(severity) => MotionError::Unrecoverable {
                code: verdict.code,
                warn_code: verdict.warn_code,
                severity,
                action: verdict.action,
                message: verdict.message.clone(),
                context: context.to_string(),
            },
            None => MotionError::UnknownFault {
                code: verdict.code,
                warn_code: verdict.warn_code,
                context: context.to_string(),
            },
        }
    }

    /// Fault code behind this error, looking through job aborts
    pub fn fault_code(&self) -> Option<u32> {
        match self {
            MotionError::Unrecoverable { code, .. }
            | MotionError::UnknownFault { code, .. }
            | MotionError::RecoveryFailed { code, .. } => Some(*code),
            MotionError::JobAborted { source, .. } => source.fault_code(),
            _ => None,
        }
    }

    /// Check if the arm needs an operator before it can continue
    pub fn needs_operator(&self) -> bool {
        match self {
            MotionError::Unrecoverable { .. }
            | MotionError::UnknownFault { .. }
            | MotionError::RecoveryFailed { .. } => true,
            MotionError::JobAborted { source, .. } => source.needs_operator(),
            _ => false,
        }
    }
}

/// Result type alias for motion operations
pub type MotionResult<T> = Result<T, MotionError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::{FaultClassifier, RetryBudget};

    #[test]
    fn test_from_verdict_known_and_unknown() {
        let budget = RetryBudget::default();
        let classifier = FaultClassifier::new();

        let critical = classifier.classify(38, 0, "job", &budget).unwrap();
        let err = MotionError::from_verdict(&critical, "job");
        assert!(matches!(
            err,
            MotionError::Unrecoverable {
                code: 38,
                severity: Severity::Critical,
                action: RecoveryAction::EmergencyStop,
                ..
            }
        ));

        let unknown = classifier.classify(4242, 1, "job", &budget).unwrap();
        let err = MotionError::from_verdict(&unknown, "job");
        assert_eq!(
            err.to_string(),
            "Unknown fault code 4242 (warning 1) during job"
        );
    }

    #[test]
    fn test_job_abort_exposes_cause() {
        let err = MotionError::JobAborted {
            completed: 2,
            total: 5,
            source: Box::new(MotionError::RecoveryFailed {
                code: 27,
                action: RecoveryAction::AutoRetry,
                context: "draw".to_string(),
            }),
        };
        assert_eq!(err.fault_code(), Some(27));
        assert!(err.needs_operator());
        assert!(err
            .to_string()
            .starts_with("Job aborted after 2 of 5 vectors"));
    }

    #[test]
    fn test_dispatch_failure_display() {
        let err = MotionError::DispatchFailed {
            status: 9,
            context: "move to (1.0, 2.0, 3.0)".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Command dispatch failed with status 9 during move to (1.0, 2.0, 3.0)"
        );
        assert!(!err.needs_operator());
    }
}
