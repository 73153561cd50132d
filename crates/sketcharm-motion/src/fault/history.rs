//! Append-only fault history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::codes;

/// Default number of records shown in a summary
pub const DEFAULT_SUMMARY_DEPTH: usize = 5;

/// One observed fault
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultRecord {
    pub code: u32,
    pub warn_code: u32,
    /// What the arm was doing when the fault was seen
    pub context: String,
    pub timestamp: DateTime<Utc>,
}

/// Every fault seen during the session, oldest first
#[derive(Debug, Clone, Default)]
pub struct FaultHistory {
    records: Vec<FaultRecord>,
}

impl FaultHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record stamped with the current time
    pub fn record(&mut self, code: u32, warn_code: u32, context: impl Into<String>) -> &FaultRecord {
        let index = self.records.len();
        self.records.push(FaultRecord {
            code,
            warn_code,
            context: context.into(),
            timestamp: Utc::now(),
        });
        &self.records[index]
    }

    pub fn records(&self) -> &[FaultRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The most recent `depth` records, oldest first
    pub fn recent(&self, depth: usize) -> &[FaultRecord] {
        let start = self.records.len().saturating_sub(depth);
        &self.records[start..]
    }

    /// Operator summary of the most recent `depth` records
    pub fn summary(&self, depth: usize) -> String {
        if self.records.is_empty() {
            return "No errors recorded".to_string();
        }

        let mut summary = String::from("Recent Errors:\n");
        for record in self.recent(depth) {
            summary.push_str(&format!(
                "  - {} (Code: {})\n",
                codes::title(record.code),
                record.code
            ));
        }
        summary
    }

    /// Export the full history as JSON for diagnostics
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.records)
    }
}
