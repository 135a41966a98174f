use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::error::ReporterError;
use crate::failure::{FailureFormatter, InternalFrames};
use crate::inputs::AggregatedResults;
use crate::paths::display_relative;
use crate::sink::LogSink;
use crate::styling::{styles, Style, Styler};

const KEY_WIDTH: usize = 12;
const MDASH: &str = "\u{2014}";
const BULLET: &str = "\u{25cf}";
const OK: &str = "ok";
const NOT_OK: &str = "not ok";

/// `#` marker followed by the text. The marker is hidden on styled output but always present.
pub(crate) fn as_comment(styler: &dyn Styler, text: &str) -> String {
    format!("{} {}", styler.paint(styles::hidden(), "#"), text)
}

/// One entry of a summary line, e.g. `3 failed`.
#[derive(Debug, Clone, Copy)]
pub struct StatEntry<'a> {
    pub label: &'a str,
    pub style: Style,
    pub count: usize,
}

impl<'a> StatEntry<'a> {
    pub fn new(label: &'a str, style: Style, count: usize) -> Self {
        Self { label, style, count }
    }
}

/// Writes a TAP stream one line at a time.
///
/// Result lines are numbered from 1 in call order. The plan line closing the stream can be
/// written once per writer.
pub struct LineWriter {
    sink: Box<dyn LogSink>,
    styler: Box<dyn Styler>,
    root: PathBuf,
    internals: InternalFrames,
    counter: Mutex<usize>,
    plan_written: AtomicBool,
}

impl LineWriter {
    pub fn new(sink: Box<dyn LogSink>, styler: Box<dyn Styler>, root: impl Into<PathBuf>) -> Self {
        Self {
            sink,
            styler,
            root: root.into(),
            internals: InternalFrames::default(),
            counter: Mutex::new(0),
            plan_written: AtomicBool::new(false),
        }
    }

    pub fn with_internals(mut self, internals: InternalFrames) -> Self {
        self.internals = internals;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of result lines written so far.
    pub fn count(&self) -> usize {
        *self.lock_counter()
    }

    pub fn next_number(&self) -> usize {
        let mut counter = self.lock_counter();
        *counter += 1;
        *counter
    }

    fn lock_counter(&self) -> MutexGuard<'_, usize> {
        self.counter.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn paint(&self, style: Style, text: &str) -> String {
        self.styler.paint(style, text)
    }

    pub fn blank(&self) -> Result<(), ReporterError> {
        Ok(self.sink.info("")?)
    }

    pub fn comment(&self, text: &str) -> Result<(), ReporterError> {
        Ok(self.sink.info(&as_comment(&*self.styler, text))?)
    }

    pub fn comment_light(&self, text: &str) -> Result<(), ReporterError> {
        self.comment(&self.paint(styles::dim(), text))
    }

    pub fn key_value(&self, key: &str, value: &str) -> Result<(), ReporterError> {
        let key = format!("{:<width$}", format!("{key}:"), width = KEY_WIDTH);
        self.comment(&format!("{} {}", self.paint(styles::bold(), &key), value))
    }

    /// Entries are rendered in the given order, joined by `, `.
    pub fn key_value_list(&self, key: &str, entries: &[StatEntry<'_>]) -> Result<(), ReporterError> {
        let value = entries
            .iter()
            .map(|entry| self.paint(entry.style, &format!("{} {}", entry.count, entry.label)))
            .collect::<Vec<_>>()
            .join(", ");

        self.key_value(key, &value)
    }

    /// Summary line where empty categories are left out and `total` always closes the list.
    pub fn stats(
        &self,
        name: &str,
        failed: usize,
        skipped: usize,
        passed: usize,
        total: usize,
    ) -> Result<(), ReporterError> {
        let mut entries = Vec::with_capacity(4);

        if total > 0 {
            push_nonzero(&mut entries, "failed", styles::red_bold(), failed);
            push_nonzero(&mut entries, "skipped", styles::yellow_bold(), skipped);
            push_nonzero(&mut entries, "passed", styles::green_bold(), passed);
        }
        entries.push(StatEntry::new("total", styles::bold(), total));

        self.key_value_list(name, &entries)
    }

    /// Snapshot summary. Writes nothing when no snapshots were checked.
    pub fn snapshots(
        &self,
        failed: usize,
        updated: usize,
        added: usize,
        passed: usize,
        total: usize,
    ) -> Result<(), ReporterError> {
        if total == 0 {
            return Ok(());
        }

        let mut entries = Vec::with_capacity(5);
        push_nonzero(&mut entries, "failed", styles::red_bold(), failed);
        push_nonzero(&mut entries, "updated", styles::yellow_bold(), updated);
        push_nonzero(&mut entries, "added", styles::green_bold(), added);
        push_nonzero(&mut entries, "passed", styles::green_bold(), passed);
        entries.push(StatEntry::new("total", styles::bold(), total));

        self.key_value_list("Snapshots", &entries)
    }

    /// Write `<glyph> <n> <title>` with the next sequence number.
    pub fn result(&self, glyph: &str, title: &str) -> Result<(), ReporterError> {
        // Held until the line is written so lines come out in number order.
        let mut counter = self.lock_counter();
        *counter += 1;
        let number = *counter;
        let line = if title.is_empty() {
            format!("{glyph} {number}")
        } else {
            format!("{glyph} {number} {title}")
        };

        Ok(self.sink.log(&line)?)
    }

    pub fn passed(&self, title: &str) -> Result<(), ReporterError> {
        let title = if title.is_empty() {
            String::new()
        } else {
            format!("{} {}", self.paint(styles::grey(), MDASH), title)
        };

        self.result(&self.paint(styles::green(), OK), &title)
    }

    pub fn failed(&self, title: &str) -> Result<(), ReporterError> {
        let title = self.paint(styles::red_bold(), &format!("{BULLET} {title}"));
        self.result(&self.paint(styles::red(), NOT_OK), &title)
    }

    /// Skipped tests are `ok` with a `# SKIP` directive.
    pub fn pending(&self, title: &str) -> Result<(), ReporterError> {
        let title = format!(
            "{} {} {}",
            self.paint(styles::yellow(), "#"),
            self.paint(styles::yellow_bold(), "SKIP"),
            title
        );
        self.result(&self.paint(styles::yellow(), OK), &title)
    }

    /// Banner for a finished suite. A suite sitting directly in the root gets no directory prefix.
    pub fn suite(&self, is_failing: bool, directory: &Path, base_name: &str) -> Result<(), ReporterError> {
        let label = if is_failing {
            self.paint(styles::fail_label(), " FAIL ")
        } else {
            self.paint(styles::pass_label(), " PASS ")
        };

        let directory = display_relative(&self.root, directory);
        let directory = if directory.is_empty() {
            directory
        } else {
            self.paint(styles::grey(), &format!("{directory}{MAIN_SEPARATOR}"))
        };

        self.comment(&format!("{label} {directory}{}", self.paint(styles::bold(), base_name)))
    }

    pub fn format_failure(&self, message: &str) -> String {
        FailureFormatter::new(&*self.styler, &self.root, &self.internals).format(message)
    }

    /// Format every message and hand them to the error stream in a single write.
    pub fn errors<S: AsRef<str>>(&self, messages: &[S]) -> Result<(), ReporterError> {
        if messages.is_empty() {
            return Ok(());
        }

        let blocks = messages
            .iter()
            .map(|message| self.format_failure(message.as_ref()))
            .collect::<Vec<_>>();

        Ok(self.sink.error(&blocks.join("\n"))?)
    }

    /// Close the stream with `1..N`. `N` defaults to the number of results written.
    pub fn plan(&self, count: Option<usize>) -> Result<(), ReporterError> {
        if self.plan_written.swap(true, Ordering::SeqCst) {
            return Err(ReporterError::PlanAlreadyWritten);
        }

        let counter = self.lock_counter();
        let count = count.unwrap_or(*counter);
        Ok(self.sink.log(&format!("1..{count}"))?)
    }

    pub fn start(&self, suite_count: usize) -> Result<(), ReporterError> {
        self.blank()?;
        self.comment(&self.paint(styles::green(), "Starting..."))?;
        if suite_count > 0 {
            let noun = if suite_count == 1 { "suite" } else { "suites" };
            self.comment_light(&format!("{suite_count} test {noun} found."))?;
        }
        self.blank()
    }

    pub fn aggregated(&self, results: &AggregatedResults, time_taken: Duration) -> Result<(), ReporterError> {
        let snapshot = &results.snapshot;

        self.blank()?;
        self.stats(
            "Test Suites",
            results.num_failed_test_suites,
            results.num_pending_test_suites,
            results.num_passed_test_suites,
            results.num_total_test_suites,
        )?;
        self.stats(
            "Tests",
            results.num_failed_tests,
            results.num_pending_tests,
            results.num_passed_tests,
            results.num_total_tests,
        )?;
        self.snapshots(
            snapshot.unmatched,
            snapshot.updated,
            snapshot.added,
            snapshot.matched,
            snapshot.total,
        )?;
        self.key_value("Time", &format!("{:.3}s", time_taken.as_secs_f64()))?;
        self.blank()?;
        self.plan(None)?;
        self.blank()
    }
}

fn push_nonzero<'a>(entries: &mut Vec<StatEntry<'a>>, label: &'a str, style: Style, count: usize) {
    if count > 0 {
        entries.push(StatEntry::new(label, style, count));
    }
}
