//! Controller fault handling
//!
//! Static fault table, classification policy, history and recovery.

pub mod classifier;
pub mod codes;
pub mod history;
pub mod recovery;

pub use classifier::{FaultClassifier, FaultVerdict, RetryBudget, DEFAULT_MAX_RETRIES};
pub use codes::{lookup, FaultInfo, RecoveryAction, Severity};
pub use history::{FaultHistory, FaultRecord, DEFAULT_SUMMARY_DEPTH};
pub use recovery::{RecoveryEngine, RecoveryOutcome};
