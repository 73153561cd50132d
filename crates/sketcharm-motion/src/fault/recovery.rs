//! Bounded-retry fault recovery
//!
//! The engine owns the retry budget and the fault history. A fault check
//! reads the controller registers, records what it sees, and either runs
//! the remediation sequence for an auto-recoverable fault or escalates.
//! A remediation is attempted once per check; there is no retry loop.

use std::thread;
use std::time::Duration;

use sketcharm_core::RecoveryConfig;

use super::classifier::{FaultClassifier, FaultVerdict, RetryBudget};
use super::codes::RecoveryAction;
use super::history::FaultHistory;
use crate::actuator::Actuator;
use crate::error::{MotionError, MotionResult};

/// Result of a fault check that did not escalate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryOutcome {
    /// The fault register was clear
    Clear,
    /// A fault was remediated with the given action
    Recovered(RecoveryAction),
}

impl RecoveryOutcome {
    pub fn action(&self) -> Option<RecoveryAction> {
        match self {
            RecoveryOutcome::Clear => None,
            RecoveryOutcome::Recovered(action) => Some(*action),
        }
    }
}

/// Runs remediation for classified faults
#[derive(Debug, Clone)]
pub struct RecoveryEngine {
    classifier: FaultClassifier,
    budget: RetryBudget,
    history: FaultHistory,
    settle_pause: Duration,
    restart_pause: Duration,
}

impl RecoveryEngine {
    pub fn new(config: &RecoveryConfig) -> Self {
        Self {
            classifier: FaultClassifier::new(),
            budget: RetryBudget::new(config.max_retries),
            history: FaultHistory::new(),
            settle_pause: config.settle_pause(),
            restart_pause: config.restart_pause(),
        }
    }

    pub fn budget(&self) -> &RetryBudget {
        &self.budget
    }

    pub fn history(&self) -> &FaultHistory {
        &self.history
    }

    /// Clear every retry budget entry
    pub fn reset_budget(&mut self) {
        self.budget.reset_all();
    }

    /// Clear the retry budget entry for one (code, action) pair
    pub fn reset_budget_for(&mut self, code: u32, action: RecoveryAction) {
        self.budget.reset(code, action);
    }

    /// Check the fault registers and recover if policy allows.
    ///
    /// `rehome` moves the arm back to the centred pose and is only called
    /// for [`RecoveryAction::RePlanPath`].
    pub fn check<A, F>(&mut self, actuator: &mut A, context: &str, rehome: F) -> MotionResult<RecoveryOutcome>
    where
        A: Actuator,
        F: FnOnce(&mut A) -> MotionResult<()>,
    {
        let code = actuator.error_code();
        if code == 0 {
            return Ok(RecoveryOutcome::Clear);
        }
        let warn_code = actuator.warn_code();
        self.history.record(code, warn_code, context);

        let Some(verdict) = self.classifier.classify(code, warn_code, context, &self.budget) else {
            return Ok(RecoveryOutcome::Clear);
        };

        if !verdict.auto_recoverable {
            tracing::error!("{}", verdict.message);
            tracing::error!("Manual intervention required");
            return Err(MotionError::from_verdict(&verdict, context));
        }

        tracing::warn!("{}", verdict.message);
        if self.attempt_recovery(actuator, &verdict, rehome)? {
            Ok(RecoveryOutcome::Recovered(verdict.action))
        } else {
            Err(MotionError::RecoveryFailed {
                code,
                action: verdict.action,
                context: context.to_string(),
            })
        }
    }

    /// Run the remediation sequence for an auto-recoverable verdict.
    ///
    /// Spends one unit of the pair's budget and returns whether the fault
    /// register reads clear afterwards.
    pub fn attempt_recovery<A, F>(
        &mut self,
        actuator: &mut A,
        verdict: &FaultVerdict,
        rehome: F,
    ) -> MotionResult<bool>
    where
        A: Actuator,
        F: FnOnce(&mut A) -> MotionResult<()>,
    {
        let action = verdict.action;
        tracing::info!("Attempting automatic recovery: {}", action);

        match action {
            RecoveryAction::AutoRetry | RecoveryAction::ReduceSpeed => {
                actuator.clear_faults()?;
                pause(self.settle_pause);
            }
            RecoveryAction::RePlanPath => {
                actuator.clear_faults()?;
                pause(self.settle_pause);
                rehome(actuator)?;
            }
            RecoveryAction::RestartRobot => {
                self.restart_sequence(actuator)?;
            }
            RecoveryAction::ManualIntervention
            | RecoveryAction::ContactSupport
            | RecoveryAction::EmergencyStop => {
                tracing::error!("Cannot auto-recover from {}", action);
                return Ok(false);
            }
        }

        let attempts = self.budget.increment(verdict.code, action);
        tracing::debug!(
            "Recovery attempt {}/{} for fault {} ({})",
            attempts,
            self.budget.max_retries(),
            verdict.code,
            action
        );

        if actuator.error_code() == 0 {
            tracing::info!("Recovery successful");
            Ok(true)
        } else {
            tracing::error!("Recovery failed, fault {} still present", actuator.error_code());
            Ok(false)
        }
    }

    /// Operator-invoked controller restart; does not spend retry budget
    pub fn restart_controller<A: Actuator>(&mut self, actuator: &mut A) -> MotionResult<bool> {
        tracing::info!("Restarting controller");
        self.restart_sequence(actuator)?;
        Ok(actuator.error_code() == 0)
    }

    fn restart_sequence<A: Actuator>(&self, actuator: &mut A) -> MotionResult<()> {
        actuator.clear_faults()?;
        actuator.enable_motion()?;
        actuator.set_mode(0)?;
        pause(self.restart_pause);
        Ok(())
    }
}

fn pause(duration: Duration) {
    if !duration.is_zero() {
        thread::sleep(duration);
    }
}
