//! Status reporting for report generation.

pub mod reporter;

pub use reporter::{RecordingReporter, ReportLevel, Reporter, TracingReporter};
