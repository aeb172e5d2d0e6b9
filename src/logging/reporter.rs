//! The `Reporter` capability through which the pipeline reports progress and failures.

use std::sync::Mutex;

use tracing::{error, info};

/// Sink for user-facing status messages.
///
/// The pipeline never logs user-facing outcomes globally; callers pass a
/// reporter in so a host surface can route messages wherever it wants.
pub trait Reporter: Send + Sync {
    fn info(&self, msg: &str);
    fn error(&self, msg: &str);
}

/// Forwards messages to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn info(&self, msg: &str) {
        info!("{msg}");
    }

    fn error(&self, msg: &str) {
        error!("{msg}");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLevel {
    Info,
    Error,
}

/// Keeps every message in memory, in order. Useful in tests and embedders
/// that present messages after the fact.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    messages: Mutex<Vec<(ReportLevel, String)>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: ReportLevel, msg: &str) {
        // A poisoned lock still holds valid messages.
        let mut messages = self.messages.lock().unwrap_or_else(|e| e.into_inner());
        messages.push((level, msg.to_string()));
    }

    /// Snapshot of all messages recorded so far.
    pub fn messages(&self) -> Vec<(ReportLevel, String)> {
        self.messages.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(level, _)| *level == ReportLevel::Error)
            .map(|(_, msg)| msg)
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn info(&self, msg: &str) {
        self.push(ReportLevel::Info, msg);
    }

    fn error(&self, msg: &str) {
        self.push(ReportLevel::Error, msg);
    }
}
