use std::time::Duration;

use crate::inputs::{AggregatedResults, SuiteResult};

pub mod tap;

/// Receives the lifecycle events of a test run, in order: start, one call per finished suite,
/// then completion.
pub trait TestResultReporter {
    /// Create the start of a report, usually indicating how many suites are about to be ran.
    fn handle_start(&self, suite_count: usize) -> anyhow::Result<()>;

    /// Called once a suite (test file) has finished.
    fn handle_suite_result(&self, suite: &SuiteResult) -> anyhow::Result<()>;

    /// Handle the final totals.
    ///
    /// # Arguments
    /// * `results` - Suite, test and snapshot counts for the whole run
    /// * `time_taken` - The time it took for the *entire* run from a user perspective.
    fn handle_complete(&self, results: &AggregatedResults, time_taken: Duration) -> anyhow::Result<()>;
}
