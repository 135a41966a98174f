use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Separator between a test's ancestor titles and its own title.
pub const TITLE_SEPARATOR: &str = " \u{203a} ";

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    #[serde(alias = "skipped", alias = "todo", alias = "disabled")]
    Pending,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseResult {
    #[serde(default)]
    pub ancestor_titles: Vec<String>,
    pub title: String,
    pub status: TestStatus,
    #[serde(default)]
    pub failure_messages: Vec<String>,
}

impl TestCaseResult {
    pub fn new(title: impl Into<String>, status: TestStatus) -> Self {
        Self {
            ancestor_titles: Vec::new(),
            title: title.into(),
            status,
            failure_messages: Vec::new(),
        }
    }

    pub fn with_ancestors(mut self, ancestors: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.ancestor_titles = ancestors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure_messages.push(message.into());
        self
    }

    /// Ancestor titles and the test title, e.g. `math › add › handles zero`.
    pub fn full_title(&self) -> Cow<'_, str> {
        if self.ancestor_titles.is_empty() {
            return Cow::Borrowed(&self.title);
        }

        let mut parts: Vec<&str> = self.ancestor_titles.iter().map(String::as_str).collect();
        parts.push(&self.title);
        Cow::Owned(parts.join(TITLE_SEPARATOR))
    }
}

/// All results of one test file.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SuiteResult {
    pub test_file_path: PathBuf,
    #[serde(default)]
    pub test_results: Vec<TestCaseResult>,
    /// Set when the file itself could not be run.
    #[serde(default)]
    pub exec_error: Option<String>,
}

impl SuiteResult {
    pub fn new(test_file_path: impl Into<PathBuf>, test_results: Vec<TestCaseResult>) -> Self {
        Self {
            test_file_path: test_file_path.into(),
            test_results,
            exec_error: None,
        }
    }

    pub fn is_failing(&self) -> bool {
        self.exec_error.is_some() || self.test_results.iter().any(|t| t.status == TestStatus::Failed)
    }

    pub fn directory(&self) -> &Path {
        self.test_file_path.parent().unwrap_or_else(|| Path::new(""))
    }

    pub fn base_name(&self) -> Cow<'_, str> {
        self.test_file_path
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default()
    }

    /// Failure messages of every failed test, in test order.
    pub fn failure_messages(&self) -> Vec<&str> {
        self.test_results
            .iter()
            .filter(|t| t.status == TestStatus::Failed)
            .flat_map(|t| t.failure_messages.iter().map(String::as_str))
            .collect()
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SnapshotSummary {
    pub unmatched: usize,
    pub updated: usize,
    pub added: usize,
    pub matched: usize,
    pub total: usize,
}

/// Totals for the whole run.
#[derive(serde::Serialize, serde::Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct AggregatedResults {
    pub num_failed_test_suites: usize,
    pub num_pending_test_suites: usize,
    pub num_passed_test_suites: usize,
    pub num_total_test_suites: usize,
    pub num_failed_tests: usize,
    pub num_pending_tests: usize,
    pub num_passed_tests: usize,
    pub num_total_tests: usize,
    pub snapshot: SnapshotSummary,
}

impl AggregatedResults {
    /// Tally suites and tests from finished suite results. Snapshot counts are left empty.
    pub fn from_suites<'a>(suites: impl IntoIterator<Item = &'a SuiteResult>) -> Self {
        let mut results = Self::default();

        for suite in suites {
            results.num_total_test_suites += 1;

            let mut pending = 0;
            for test in &suite.test_results {
                results.num_total_tests += 1;
                match test.status {
                    TestStatus::Passed => results.num_passed_tests += 1,
                    TestStatus::Failed => results.num_failed_tests += 1,
                    TestStatus::Pending => {
                        results.num_pending_tests += 1;
                        pending += 1;
                    }
                }
            }

            if suite.is_failing() {
                results.num_failed_test_suites += 1;
            } else if !suite.test_results.is_empty() && pending == suite.test_results.len() {
                results.num_pending_test_suites += 1;
            } else {
                results.num_passed_test_suites += 1;
            }
        }

        results
    }
}
