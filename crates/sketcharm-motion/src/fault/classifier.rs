//! Fault classification and retry budgeting
//!
//! A verdict combines the static code table with the retry budget spent so
//! far on the same (code, action) pair:
//! - CRITICAL faults are never auto-recoverable
//! - automatic actions are allowed while the pair's attempts stay below the ceiling
//! - every other action, and every unknown code, needs an operator

use std::collections::HashMap;

use super::codes::{self, FaultInfo, RecoveryAction, Severity};

/// Default number of automatic attempts per (code, action) pair
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Attempts spent per (fault code, recovery action) pair
///
/// Entries only grow; they are cleared explicitly and never across jobs on
/// their own.
#[derive(Debug, Clone)]
pub struct RetryBudget {
    max_retries: u32,
    attempts: HashMap<(u32, RecoveryAction), u32>,
}

impl RetryBudget {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            attempts: HashMap::new(),
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Attempts recorded for a pair
    pub fn attempts(&self, code: u32, action: RecoveryAction) -> u32 {
        self.attempts.get(&(code, action)).copied().unwrap_or(0)
    }

    /// Whether another automatic attempt is allowed for a pair
    pub fn allows(&self, code: u32, action: RecoveryAction) -> bool {
        self.attempts(code, action) < self.max_retries
    }

    /// Record one attempt and return the new count
    pub fn increment(&mut self, code: u32, action: RecoveryAction) -> u32 {
        let count = self.attempts.entry((code, action)).or_insert(0);
        *count += 1;
        *count
    }

    /// Clear a single pair
    pub fn reset(&mut self, code: u32, action: RecoveryAction) {
        self.attempts.remove(&(code, action));
    }

    /// Clear every pair
    pub fn reset_all(&mut self) {
        self.attempts.clear();
    }
}

impl Default for RetryBudget {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES)
    }
}

/// Classification of one observed fault
#[derive(Debug, Clone, PartialEq)]
pub struct FaultVerdict {
    pub code: u32,
    pub warn_code: u32,
    /// Table entry, `None` for unknown codes
    pub info: Option<FaultInfo>,
    pub action: RecoveryAction,
    pub auto_recoverable: bool,
    /// Operator-facing message
    pub message: String,
}

impl FaultVerdict {
    /// Whether the code is in the fault table
    pub fn is_known(&self) -> bool {
        self.info.is_some()
    }

    /// Severity, unspecified for unknown codes
    pub fn severity(&self) -> Option<Severity> {
        self.info.map(|info| info.severity)
    }

    pub fn title(&self) -> String {
        codes::title(self.code)
    }
}

/// Maps controller fault registers to recovery verdicts
#[derive(Debug, Clone, Copy, Default)]
pub struct FaultClassifier;

impl FaultClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify a fault register reading.
    ///
    /// Code 0 is not a fault and yields `None`.
    pub fn classify(
        &self,
        code: u32,
        warn_code: u32,
        context: &str,
        budget: &RetryBudget,
    ) -> Option<FaultVerdict> {
        if code == 0 {
            return None;
        }

        let verdict = match codes::lookup(code) {
            Some(info) => FaultVerdict {
                code,
                warn_code,
                info: Some(info),
                action: info.recovery,
                auto_recoverable: self.can_auto_recover(code, info.severity, info.recovery, budget),
                message: known_message(&info, context),
            },
            None => {
                let mut message = format!("Unknown error code: {}", code);
                if !context.is_empty() {
                    message.push_str(&format!("\n   Context: {}", context));
                }
                FaultVerdict {
                    code,
                    warn_code,
                    info: None,
                    action: RecoveryAction::ContactSupport,
                    auto_recoverable: false,
                    message,
                }
            }
        };
        Some(verdict)
    }

    /// Auto-recoverability policy for a known fault
    pub fn can_auto_recover(
        &self,
        code: u32,
        severity: Severity,
        action: RecoveryAction,
        budget: &RetryBudget,
    ) -> bool {
        if severity == Severity::Critical {
            return false;
        }
        action.is_automatic() && budget.allows(code, action)
    }
}

fn known_message(info: &FaultInfo, context: &str) -> String {
    let mut message = info.title.to_string();
    if let Some(description) = info.description {
        message.push_str(&format!("\n   Description: {}", description));
    }
    if let Some(action) = info.action {
        message.push_str(&format!("\n   Action: {}", action));
    }
    if !context.is_empty() {
        message.push_str(&format!("\n   Context: {}", context));
    }
    message
}
