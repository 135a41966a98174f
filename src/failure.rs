use std::path::{Path, MAIN_SEPARATOR};

use crate::paths::display_relative;
use crate::styling::{styles, Styler};
use crate::writer::as_comment;

pub const DEFAULT_INTERNAL_SEGMENTS: [&str; 2] = ["node_modules", "internal"];

const ERROR_PREFIX: &str = "Error: ";
const STACK_TRACE_TITLE: &str = "Stack trace:";
const INDENT: &str = "  ";

/// One parsed stack-trace entry, borrowed from the line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceFrame<'a> {
    pub description: &'a str,
    pub file_path: &'a str,
    pub row: u32,
    pub column: u32,
}

/// Decides which (root relative) frame paths belong to dependencies or the runtime.
///
/// A path is internal when its first segment is one of the configured names and more path
/// follows it, so `node_modules/x.js` matches while `node_modules_extra/x.js` does not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalFrames {
    segments: Vec<String>,
}

impl Default for InternalFrames {
    fn default() -> Self {
        Self::new(DEFAULT_INTERNAL_SEGMENTS)
    }
}

impl InternalFrames {
    pub fn new(segments: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matches(&self, relative_path: &str) -> bool {
        self.segments.iter().any(|segment| {
            relative_path
                .strip_prefix(segment.as_str())
                .and_then(|rest| rest.chars().next())
                .is_some_and(|c| c == '/' || c == MAIN_SEPARATOR)
        })
    }
}

/// Whether the line looks like a stack frame, i.e. `at` is its first word.
pub fn is_trace_line(line: &str) -> bool {
    line.trim_start()
        .strip_prefix("at")
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
}

/// Parse `<description>(<file>:<row>:<column>)`, tolerating leading whitespace.
///
/// The location is taken from the last `(` of the line, which must end with `)`.
pub fn parse_trace_frame(line: &str) -> Option<TraceFrame<'_>> {
    let inner = line.trim_start().strip_suffix(')')?;
    let open = inner.rfind('(')?;
    let (description, location) = (&inner[..open], &inner[open + 1..]);

    let (rest, column) = location.rsplit_once(':')?;
    let (file_path, row) = rest.rsplit_once(':')?;

    if description.is_empty() || file_path.is_empty() {
        return None;
    }

    Some(TraceFrame {
        description,
        file_path,
        row: parse_digits(row)?,
        column: parse_digits(column)?,
    })
}

fn parse_digits(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Turns raw failure messages into indented, comment-escaped blocks.
pub struct FailureFormatter<'a> {
    styler: &'a dyn Styler,
    root: &'a Path,
    internals: &'a InternalFrames,
}

impl<'a> FailureFormatter<'a> {
    pub fn new(styler: &'a dyn Styler, root: &'a Path, internals: &'a InternalFrames) -> Self {
        Self {
            styler,
            root,
            internals,
        }
    }

    pub fn format(&self, message: &str) -> String {
        let mut lines = message.lines();
        let headline = lines.next().unwrap_or_default();
        let headline = headline.strip_prefix(ERROR_PREFIX).unwrap_or(headline);

        let mut output = vec![String::new(), headline.to_string(), String::new()];
        let mut trace_started = false;
        // Once a dependency frame shows up, everything below it is dimmed too.
        let mut internals_started = false;

        for line in lines {
            if !is_trace_line(line) {
                output.push(line.to_string());
                continue;
            }

            if !trace_started {
                if output.last().is_some_and(|last| !last.is_empty()) {
                    output.push(String::new());
                }
                output.push(self.styler.paint(styles::dim_bold(), STACK_TRACE_TITLE));
                output.push(String::new());
                trace_started = true;
            }

            match parse_trace_frame(line) {
                Some(frame) => output.push(self.render_frame(&frame, &mut internals_started)),
                None => output.push(line.to_string()),
            }
        }

        output.push(String::new());

        output
            .iter()
            .map(|line| as_comment(self.styler, &format!("{INDENT}{line}")))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_frame(&self, frame: &TraceFrame<'_>, internals_started: &mut bool) -> String {
        let file = display_relative(self.root, Path::new(frame.file_path));

        if self.internals.matches(&file) {
            *internals_started = true;
        }

        if *internals_started {
            let text = format!("{}({}:{}:{})", frame.description, file, frame.row, frame.column);
            self.styler.paint(styles::dim(), &text)
        } else {
            format!(
                "{}({}:{}:{})",
                frame.description,
                self.styler.paint(styles::cyan(), &file),
                self.styler.paint(styles::bold(), &frame.row.to_string()),
                self.styler.paint(styles::bold(), &frame.column.to_string()),
            )
        }
    }
}
