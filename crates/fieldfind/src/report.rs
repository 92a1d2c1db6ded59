//! Diagnostic sinks
//!
//! The finder layers never print. They hand messages to a [`ResultReporter`]:
//! [`TracingReporter`] turns them into `tracing` events, [`RecordingReporter`]
//! keeps them in memory for inspection.

use parking_lot::Mutex;

use crate::error::FinderError;

/// Sink for timing, success and failure messages
pub trait ResultReporter: Send + Sync {
    /// Informational message (timings, remedy success)
    fn log_info(&self, message: &str);

    /// Non-fatal misuse (e.g., an empty remedy plan)
    fn log_warning(&self, message: &str);

    /// Failure. `always_emit` marks failures that bypass suppression.
    fn log_failure(&self, message: &str, cause: Option<&FinderError>, always_emit: bool);
}

/// Reporter emitting structured `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ResultReporter for TracingReporter {
    fn log_info(&self, message: &str) {
        tracing::info!(target: "fieldfind", "{}", message);
    }

    fn log_warning(&self, message: &str) {
        tracing::warn!(target: "fieldfind", "{}", message);
    }

    fn log_failure(&self, message: &str, cause: Option<&FinderError>, always_emit: bool) {
        match (cause, always_emit) {
            (Some(e), true) => tracing::error!(target: "fieldfind", error = %e, "{}", message),
            (Some(e), false) => tracing::warn!(target: "fieldfind", error = %e, "{}", message),
            (None, true) => tracing::error!(target: "fieldfind", "{}", message),
            (None, false) => tracing::warn!(target: "fieldfind", "{}", message),
        }
    }
}

/// Severity of a recorded report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLevel {
    /// [`ResultReporter::log_info`]
    Info,
    /// [`ResultReporter::log_warning`]
    Warning,
    /// [`ResultReporter::log_failure`]
    Failure,
}

/// One recorded diagnostic
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Severity
    pub level: ReportLevel,
    /// Message text
    pub message: String,
    /// Attached error, for failures
    pub cause: Option<FinderError>,
    /// Whether the failure bypassed suppression
    pub always_emit: bool,
}

/// Reporter that keeps every diagnostic in memory
#[derive(Debug, Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<Report>>,
}

impl RecordingReporter {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every report so far, in emission order
    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().clone()
    }

    /// Reports of a single level
    pub fn at_level(&self, level: ReportLevel) -> Vec<Report> {
        self.reports
            .lock()
            .iter()
            .filter(|r| r.level == level)
            .cloned()
            .collect()
    }

    /// Failure reports only
    pub fn failures(&self) -> Vec<Report> {
        self.at_level(ReportLevel::Failure)
    }

    /// Message texts, in emission order
    pub fn messages(&self) -> Vec<String> {
        self.reports.lock().iter().map(|r| r.message.clone()).collect()
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        self.reports.lock().clear();
    }

    fn push(&self, level: ReportLevel, message: &str, cause: Option<&FinderError>, always_emit: bool) {
        self.reports.lock().push(Report {
            level,
            message: message.to_string(),
            cause: cause.cloned(),
            always_emit,
        });
    }
}

impl ResultReporter for RecordingReporter {
    fn log_info(&self, message: &str) {
        self.push(ReportLevel::Info, message, None, false);
    }

    fn log_warning(&self, message: &str) {
        self.push(ReportLevel::Warning, message, None, false);
    }

    fn log_failure(&self, message: &str, cause: Option<&FinderError>, always_emit: bool) {
        self.push(ReportLevel::Failure, message, cause, always_emit);
    }
}
