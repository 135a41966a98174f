use std::time::Duration;

use anyhow::Context;

use crate::failure::InternalFrames;
use crate::formatters::TestResultReporter;
use crate::inputs::{AggregatedResults, SuiteResult, TestStatus};
use crate::options::TapReporterOptions;
use crate::sink::{LogSink, StreamSink};
use crate::writer::LineWriter;

/// Reports a test run as a TAP stream.
pub struct TapReporter {
    writer: LineWriter,
}

impl TapReporter {
    /// Build a reporter writing to stdout/stderr, or to `file_path` when configured.
    pub fn new(options: &TapReporterOptions) -> anyhow::Result<Self> {
        let sink: Box<dyn LogSink> = match &options.file_path {
            Some(path) => Box::new(
                StreamSink::file(path, options.log_level)
                    .with_context(|| format!("Couldn't open report file {path:?}"))?,
            ),
            None => Box::new(StreamSink::stdio(options.log_level)),
        };

        Self::with_sink(options, sink)
    }

    pub fn with_sink(options: &TapReporterOptions, sink: Box<dyn LogSink>) -> anyhow::Result<Self> {
        let writer = LineWriter::new(sink, options.effective_color().styler(), options.absolute_root()?)
            .with_internals(InternalFrames::new(options.internal_segments.iter().cloned()));

        Ok(Self::with_writer(writer))
    }

    pub fn with_writer(writer: LineWriter) -> Self {
        Self { writer }
    }

    pub fn writer(&self) -> &LineWriter {
        &self.writer
    }
}

impl TestResultReporter for TapReporter {
    fn handle_start(&self, suite_count: usize) -> anyhow::Result<()> {
        Ok(self.writer.start(suite_count)?)
    }

    fn handle_suite_result(&self, suite: &SuiteResult) -> anyhow::Result<()> {
        let writer = &self.writer;

        writer.blank()?;
        writer.suite(suite.is_failing(), suite.directory(), &suite.base_name())?;
        writer.blank()?;

        for test in &suite.test_results {
            let title = test.full_title();
            match test.status {
                TestStatus::Passed => writer.passed(&title)?,
                TestStatus::Failed => writer.failed(&title)?,
                TestStatus::Pending => writer.pending(&title)?,
            }
        }

        writer.errors(&suite.failure_messages())?;

        if let Some(exec_error) = &suite.exec_error {
            writer.errors(&[exec_error.as_str()])?;
        }

        Ok(())
    }

    fn handle_complete(&self, results: &AggregatedResults, time_taken: Duration) -> anyhow::Result<()> {
        self.writer
            .aggregated(results, time_taken)
            .context("Couldn't write run summary")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::TestCaseResult;
    use crate::sink::{Channel, MemorySink};
    use crate::styling::ColorChoice;

    fn reporter() -> (TapReporter, MemorySink) {
        let sink = MemorySink::new();
        let options = TapReporterOptions {
            root_path: "/repo".into(),
            color: ColorChoice::Never,
            ..Default::default()
        };

        (TapReporter::with_sink(&options, Box::new(sink.clone())).unwrap(), sink)
    }

    #[cfg(unix)]
    #[test]
    fn suite_banner_then_results_then_errors() {
        let (reporter, sink) = reporter();
        let suite = SuiteResult::new(
            "/repo/src/add.test.js",
            vec![
                TestCaseResult::new("works", TestStatus::Passed).with_ancestors(["add"]),
                TestCaseResult::new("breaks", TestStatus::Failed).with_failure("Error: boom"),
                TestCaseResult::new("later", TestStatus::Pending),
            ],
        );

        reporter.handle_suite_result(&suite).unwrap();

        assert_eq!(
            sink.records(),
            vec![
                (Channel::Info, "".to_string()),
                (Channel::Info, "#  FAIL  src/add.test.js".to_string()),
                (Channel::Info, "".to_string()),
                (Channel::Log, "ok 1 \u{2014} add \u{203a} works".to_string()),
                (Channel::Log, "not ok 2 \u{25cf} breaks".to_string()),
                (Channel::Log, "ok 3 # SKIP later".to_string()),
                (Channel::Error, "#   \n#   boom\n#   \n#   ".to_string()),
            ]
        );
    }

    #[test]
    fn exec_error_is_reported_separately() {
        let (reporter, sink) = reporter();
        let mut suite = SuiteResult::new("/repo/broken.test.js", vec![]);
        suite.exec_error = Some("SyntaxError: unexpected token".to_string());

        reporter.handle_suite_result(&suite).unwrap();

        assert!(sink.channel(Channel::Info)[1].contains(" FAIL "));
        assert_eq!(
            sink.channel(Channel::Error),
            vec!["#   \n#   SyntaxError: unexpected token\n#   \n#   "]
        );
    }

    #[test]
    fn completion_closes_with_plan_once() {
        let (reporter, sink) = reporter();
        reporter.writer().passed("a").unwrap();

        let results = AggregatedResults {
            num_passed_test_suites: 1,
            num_total_test_suites: 1,
            num_passed_tests: 1,
            num_total_tests: 1,
            ..Default::default()
        };
        reporter.handle_complete(&results, Duration::from_millis(1500)).unwrap();

        assert_eq!(
            sink.primary(),
            vec![
                "ok 1 \u{2014} a",
                "",
                "# Test Suites: 1 passed, 1 total",
                "# Tests:       1 passed, 1 total",
                "# Time:        1.500s",
                "",
                "1..1",
                "",
            ]
        );
        assert!(reporter.handle_complete(&results, Duration::ZERO).is_err());
    }
}
