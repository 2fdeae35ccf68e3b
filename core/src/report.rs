//! Outcome reporting for probes.
//!
//! The probe engine pushes [`Report`]s through a [`ReportSink`] rather
//! than printing directly, so the terminal frontend and tests can each
//! supply their own destination.

use std::sync::Mutex;

/// One line of output produced by the probe engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// Per-request status line, produced only in verbose runs.
    Diagnostic { url: String, status: u16 },
    /// A hostname confirmed to exhibit the misconfiguration signature.
    Finding { url: String },
}

/// Destination for probe output.
///
/// Workers emit concurrently; implementations must write whole lines
/// (one write per report) so concurrent output never interleaves
/// mid-line. No ordering across workers is guaranteed.
pub trait ReportSink: Send + Sync {
    fn emit(&self, report: Report);
}

/// Sink that collects reports in memory, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    reports: Mutex<Vec<Report>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().expect("sink poisoned").clone()
    }

    /// URLs of confirmed findings, in emission order.
    pub fn findings(&self) -> Vec<String> {
        self.reports()
            .into_iter()
            .filter_map(|report| match report {
                Report::Finding { url } => Some(url),
                Report::Diagnostic { .. } => None,
            })
            .collect()
    }
}

impl ReportSink for MemorySink {
    fn emit(&self, report: Report) {
        self.reports.lock().expect("sink poisoned").push(report);
    }
}
