use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{info, warn};

use crate::image_pipeline::common::error::{ConversionError, ErrorKind};

/// A file that could not be converted, and why.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: ConversionError,
}

impl FileFailure {
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Files handed to the workers
    pub discovered: usize,
    /// Files converted and written
    pub processed: usize,
    /// Files that failed at any stage
    pub failed: usize,
    /// Written output paths, sorted
    pub outputs: Vec<PathBuf>,
    /// Failures sorted by input path
    pub failures: Vec<FileFailure>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn no_files_found(&self) -> bool {
        self.discovered == 0
    }

    pub fn all_failed(&self) -> bool {
        self.discovered > 0 && self.processed == 0
    }

    /// Partial success is not a failed run.
    pub fn is_failure(&self) -> bool {
        self.no_files_found() || self.all_failed()
    }

    /// Folds in files rejected before they reached a worker.
    pub fn add_failures(&mut self, failures: Vec<FileFailure>) {
        self.discovered += failures.len();
        self.failed += failures.len();
        self.failures.extend(failures);
        self.failures.sort_by(|a, b| a.path.cmp(&b.path));
    }

    pub fn failures_by_kind(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for failure in &self.failures {
            *counts.entry(failure.kind().to_string()).or_insert(0) += 1;
        }
        counts
    }

    pub fn log_summary(&self) {
        for failure in &self.failures {
            warn!(
                path = %failure.path.display(),
                kind = %failure.kind(),
                "Failed: {}",
                failure.error
            );
        }
        info!(
            processed = self.processed,
            failed = self.failed,
            "Converted {} of {} file(s) in {:.3}s",
            self.processed,
            self.discovered,
            self.elapsed.as_secs_f64()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(name: &str, error: ConversionError) -> FileFailure {
        FileFailure {
            path: PathBuf::from(name),
            error,
        }
    }

    #[test]
    fn test_exit_policy() {
        let empty = BatchReport::default();
        assert!(empty.no_files_found());
        assert!(empty.is_failure());

        let all_failed = BatchReport {
            discovered: 1,
            failed: 1,
            failures: vec![failure("a.raw", ConversionError::InvalidInput("x".into()))],
            ..Default::default()
        };
        assert!(all_failed.all_failed());
        assert!(all_failed.is_failure());

        let partial = BatchReport {
            discovered: 2,
            processed: 1,
            failed: 1,
            ..Default::default()
        };
        assert!(!partial.is_failure());
    }

    #[test]
    fn test_failures_by_kind() {
        let report = BatchReport {
            discovered: 3,
            failed: 3,
            failures: vec![
                failure("a", ConversionError::InputReadError("a".into())),
                failure("b", ConversionError::EncodeError("b".into())),
                failure("c", ConversionError::OutputWriteError("c".into())),
            ],
            ..Default::default()
        };
        let counts = report.failures_by_kind();
        assert_eq!(counts.get("IoError"), Some(&2));
        assert_eq!(counts.get("EncodeError"), Some(&1));
    }
}
