//! Run summary
//!
//! Aggregates the terminal outcomes of one suite run. Overall success means
//! every executed case passed.

use crate::orchestrator::TestOutcome;
use crate::types::Timestamp;

/// Outcomes of one suite run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
    pub outcomes: Vec<TestOutcome>,
}

impl RunSummary {
    pub fn new(started_at: Timestamp, finished_at: Timestamp, outcomes: Vec<TestOutcome>) -> Self {
        Self {
            started_at,
            finished_at,
            outcomes,
        }
    }

    /// Number of cases that passed
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed()).count()
    }

    /// Number of cases executed
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn all_passed(&self) -> bool {
        !self.outcomes.is_empty() && self.passed() == self.total()
    }

    /// Pass rate in percent
    pub fn pass_rate(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        self.passed() as f64 * 100.0 / self.total() as f64
    }

    /// Log one line per case plus the totals
    pub fn log_report(&self) {
        log::info!("TEST EXECUTION COMPLETE");
        log::info!("Test Results Summary:");
        for outcome in &self.outcomes {
            log::info!("- {}: {}", outcome.case, outcome.verdict);
        }
        log::info!("Total Passed: {}/{}", self.passed(), self.total());
        log::info!("Overall Result: {}", self.overall());
    }

    /// Overall result line
    pub fn overall(&self) -> &'static str {
        if self.all_passed() {
            "ALL TESTS PASSED"
        } else {
            "SOME TESTS FAILED"
        }
    }
}
