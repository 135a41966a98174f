//! Renders test-run events as a TAP stream decorated for terminals.
//!
//! A [TapReporter] receives lifecycle events and drives a [LineWriter], which numbers result
//! lines, writes the closing `1..N` plan exactly once and reformats failure messages into
//! comment blocks with dimmed dependency stack frames.

pub mod error;
pub mod failure;
pub mod formatters;
pub mod inputs;
pub mod options;
pub mod paths;
pub mod sink;
pub mod styling;
pub mod writer;

pub use error::ReporterError;
pub use formatters::tap::TapReporter;
pub use formatters::TestResultReporter;
pub use options::TapReporterOptions;
pub use writer::LineWriter;
