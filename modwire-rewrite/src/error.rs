//! Error types for the rewrite engine.
//!
//! The taxonomy separates conditions that reject a whole run (missing
//! target, failed backup, ambiguous span anchor) from per-operation
//! conditions (missing anchor, payload already present), which are reported
//! as skipped results, never as errors.

use camino::Utf8PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RewriteError {
    /// The aggregator file does not exist.
    #[error("aggregator file not found: {path}")]
    FileNotFound { path: Utf8PathBuf },

    /// The backup could not be persisted. The run aborts before any edit is
    /// evaluated; never edit without a durable backup.
    #[error("failed to persist backup {path}: {source}")]
    BackupFailed {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A `replace-span` start pattern matched more than once. The run is
    /// rejected in full; the target file on disk is unchanged.
    #[error("ambiguous anchor for '{op_id}': pattern {pattern:?} matched {matches} times")]
    AmbiguousAnchor {
        op_id: String,
        pattern: String,
        matches: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RewriteError {
    /// Anchor conflicts are caller-fixable (choose a more specific anchor)
    /// and get a distinct exit code from plain runtime failures.
    pub fn is_anchor_conflict(&self) -> bool {
        matches!(self, RewriteError::AmbiguousAnchor { .. })
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_anchor_conflict() { 2 } else { 1 }
    }
}

pub type RewriteResult<T> = Result<T, RewriteError>;

#[cfg(test)]
mod tests {
    use super::RewriteError;
    use camino::Utf8PathBuf;

    #[test]
    fn ambiguous_anchor_reports_exit_code_2() {
        let err = RewriteError::AmbiguousAnchor {
            op_id: "customer/fields".to_string(),
            pattern: "Customer: {".to_string(),
            matches: 2,
        };
        assert!(err.is_anchor_conflict());
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("matched 2 times"));
    }

    #[test]
    fn missing_file_reports_exit_code_1() {
        let err = RewriteError::FileNotFound {
            path: Utf8PathBuf::from("index.ts"),
        };
        assert!(!err.is_anchor_conflict());
        assert_eq!(err.exit_code(), 1);
    }
}
