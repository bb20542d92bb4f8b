//! Progress reporting for long extraction runs.

use std::fmt;

/// Snapshot emitted every `progress_interval` processed logs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressReport {
    /// Logs processed so far, skipped or newly decoded.
    pub processed: u64,
    /// Records in the registry after processing them.
    pub registry_size: usize,
    /// Logs in the current run.
    pub total: usize,
}

impl ProgressReport {
    /// Percentage of `total` processed.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.processed as f64 * 100.0 / self.total as f64
    }
}

impl fmt::Display for ProgressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{} / {} (around {:.1}% done)",
            self.processed,
            self.registry_size,
            self.total,
            self.percent()
        )
    }
}

/// Receives progress reports from the extractor.
pub trait ProgressCallback: Send + Sync {
    fn on_progress(&self, report: &ProgressReport);
}

/// Blanket impl so closures can be used as progress callbacks.
impl<F: Fn(&ProgressReport) + Send + Sync> ProgressCallback for F {
    fn on_progress(&self, report: &ProgressReport) {
        self(report)
    }
}

/// Prints each report as one line on stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutProgress;

impl ProgressCallback for StdoutProgress {
    fn on_progress(&self, report: &ProgressReport) {
        println!("{report}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_line_format() {
        let report = ProgressReport {
            processed: 1000,
            registry_size: 640,
            total: 2500,
        };
        assert_eq!(report.to_string(), "1000,640 / 2500 (around 40.0% done)");
    }

    #[test]
    fn percent_of_empty_run() {
        let report = ProgressReport {
            processed: 0,
            registry_size: 0,
            total: 0,
        };
        assert_eq!(report.percent(), 100.0);
    }
}
