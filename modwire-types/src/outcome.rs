use serde::{Deserialize, Serialize};

/// Final status of one rewrite operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpStatus {
    Applied,
    Skipped,
}

/// Per-operation outcome within a rewrite run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpResult {
    pub op_id: String,
    pub status: OpStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl OpResult {
    pub fn applied(op_id: impl Into<String>) -> Self {
        Self {
            op_id: op_id.into(),
            status: OpStatus::Applied,
            message: None,
        }
    }

    pub fn skipped(op_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            op_id: op_id.into(),
            status: OpStatus::Skipped,
            message: Some(message.into()),
        }
    }
}

/// Outcome of one whole-file rewrite run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteOutcome {
    pub target: String,

    /// Absent on dry runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<String>,

    pub sha256_before: String,
    pub sha256_after: String,

    #[serde(default)]
    pub results: Vec<OpResult>,

    pub summary: RewriteSummary,
}

impl RewriteOutcome {
    pub fn changed(&self) -> bool {
        self.sha256_before != self.sha256_after
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RewriteSummary {
    pub applied: u64,
    pub skipped: u64,
}

/// Outcome of migrating one module's legacy service file.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MigrationResult {
    /// False when the module has no legacy source, or the source is missing.
    pub copied: bool,

    /// Number of import-path substitutions performed on the copy.
    pub rewritten_imports: u64,
}
