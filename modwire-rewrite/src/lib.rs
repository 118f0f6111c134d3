//! Anchor-based rewriting of the shared aggregator file.
//!
//! Responsibilities:
//! - Locate literal text anchors in the aggregator and splice generated
//!   payloads next to them, leaving everything else byte-for-byte intact.
//! - Persist a recoverable backup before any mutation (fail closed).
//! - Apply a batch of operations against one in-memory working text and
//!   write the result once, so the real target never sees a partial state.
//!
//! Anchors are plain substrings, not a parse of the target language. The
//! aggregator's coarse structure is assumed stable and small; the caller
//! must choose anchors specific enough to be unique in practice. Span
//! replacement uses an explicit brace-depth scan rather than pattern
//! greediness, so a `replace-span` can only ever consume one balanced block.

mod error;

pub use error::{RewriteError, RewriteResult};

use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use fs_err as fs;
use modwire_types::ops::{Anchor, RewriteOp};
use modwire_types::outcome::{OpResult, RewriteOutcome, RewriteSummary};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

/// Backup naming policy, one backup per run.
///
/// `Fixed` keeps a single sentinel backup per target and intentionally
/// overwrites it on every run; `Timestamped` accumulates one backup per run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupMode {
    #[default]
    Fixed,
    Timestamped,
}

#[derive(Debug, Clone, Default)]
pub struct RewriteOptions {
    /// Evaluate everything and produce the outcome and patch, but write
    /// nothing (no backup either).
    pub dry_run: bool,

    /// Accept partial application: an ambiguous `replace-span` is recorded
    /// as skipped instead of rejecting the whole run. The ambiguous span
    /// itself is still never edited.
    pub allow_partial: bool,

    pub backup: BackupMode,
}

/// Backup file path for a target under the given naming mode.
pub fn backup_path(target: &Utf8Path, mode: BackupMode) -> Utf8PathBuf {
    match mode {
        BackupMode::Fixed => Utf8PathBuf::from(format!("{target}.modwire.bak")),
        BackupMode::Timestamped => {
            Utf8PathBuf::from(format!("{target}.modwire.{}.bak", Utc::now().timestamp()))
        }
    }
}

/// Apply a batch of operations to `target`, in order, against one snapshot
/// of its content. Returns the outcome and a unified diff of the change.
///
/// The target file is written exactly once, after every operation has been
/// evaluated. On any error the target is left untouched; the backup (already
/// persisted on non-dry runs) is the recovery path.
pub fn rewrite(
    target: &Utf8Path,
    ops: &[RewriteOp],
    opts: &RewriteOptions,
) -> RewriteResult<(RewriteOutcome, String)> {
    if !target.exists() {
        return Err(RewriteError::FileNotFound {
            path: target.to_path_buf(),
        });
    }
    let original = fs::read_to_string(target)?;

    let backup = if opts.dry_run {
        None
    } else {
        let path = backup_path(target, opts.backup);
        fs::write(&path, &original).map_err(|source| RewriteError::BackupFailed {
            path: path.clone(),
            source,
        })?;
        debug!(%path, "backup persisted");
        Some(path)
    };

    let mut working = original.clone();
    let mut results = Vec::with_capacity(ops.len());
    let mut summary = RewriteSummary::default();

    for op in ops {
        match apply_op(&working, op) {
            OpOutcome::Applied(next) => {
                working = next;
                summary.applied += 1;
                results.push(OpResult::applied(&op.id));
            }
            OpOutcome::Skipped(reason) => {
                warn!(op = %op.id, %reason, "operation skipped");
                summary.skipped += 1;
                results.push(OpResult::skipped(&op.id, reason));
            }
            OpOutcome::Ambiguous { matches } => {
                if opts.allow_partial {
                    let reason = format!("ambiguous anchor: {matches} matches, not edited");
                    warn!(op = %op.id, %reason, "operation skipped");
                    summary.skipped += 1;
                    results.push(OpResult::skipped(&op.id, reason));
                } else {
                    return Err(RewriteError::AmbiguousAnchor {
                        op_id: op.id.clone(),
                        pattern: op.anchor.pattern().to_string(),
                        matches,
                    });
                }
            }
        }
    }

    let patch = render_patch(target, &original, &working);

    if !opts.dry_run && working != original {
        fs::write(target, &working)?;
        info!(%target, applied = summary.applied, skipped = summary.skipped, "aggregator rewritten");
    }

    let outcome = RewriteOutcome {
        target: target.to_string(),
        backup_path: backup.map(|p| p.to_string()),
        sha256_before: sha256_hex(original.as_bytes()),
        sha256_after: sha256_hex(working.as_bytes()),
        results,
        summary,
    };
    Ok((outcome, patch))
}

/// Evaluate the batch without touching the filesystem and return the patch.
pub fn preview_patch(
    target: &Utf8Path,
    ops: &[RewriteOp],
    opts: &RewriteOptions,
) -> RewriteResult<String> {
    let opts = RewriteOptions {
        dry_run: true,
        ..opts.clone()
    };
    let (_, patch) = rewrite(target, ops, &opts)?;
    Ok(patch)
}

enum OpOutcome {
    Applied(String),
    Skipped(String),
    Ambiguous { matches: usize },
}

fn apply_op(working: &str, op: &RewriteOp) -> OpOutcome {
    match &op.anchor {
        Anchor::InsertAfter { pattern } => insert_op(working, pattern, &op.payload, true),
        Anchor::InsertBefore { pattern } => insert_op(working, pattern, &op.payload, false),
        Anchor::ReplaceSpan { start } => replace_span(working, start, &op.payload),
    }
}

fn insert_op(working: &str, pattern: &str, payload: &str, after: bool) -> OpOutcome {
    // Re-running against already-wired output must never duplicate the
    // insertion; insert anchors survive the edit, so presence of the payload
    // is the idempotency signal.
    if !payload.is_empty() && working.contains(payload) {
        return OpOutcome::Skipped("payload already present".to_string());
    }

    let Some(pos) = working.find(pattern) else {
        return OpOutcome::Skipped(format!("anchor {pattern:?} not found"));
    };

    // Multiple matches splice at the first occurrence; uniqueness is only
    // enforced for span replacement.
    let mut out = String::with_capacity(working.len() + payload.len() + 2);
    if after {
        let at = line_end(working, pos + pattern.len());
        out.push_str(&working[..at]);
        out.push_str("\n\n");
        out.push_str(payload);
        out.push_str(&working[at..]);
    } else {
        let at = line_start(working, pos);
        out.push_str(&working[..at]);
        out.push_str(payload);
        out.push_str("\n\n");
        out.push_str(&working[at..]);
    }
    OpOutcome::Applied(out)
}

fn replace_span(working: &str, start: &str, payload: &str) -> OpOutcome {
    let occurrences: Vec<usize> = working.match_indices(start).map(|(i, _)| i).collect();
    let begin = match occurrences.as_slice() {
        // The replacement removes the start pattern, so a re-run lands here
        // and skips cleanly.
        [] => return OpOutcome::Skipped(format!("span anchor {start:?} not found")),
        [begin] => *begin,
        many => {
            return OpOutcome::Ambiguous {
                matches: many.len(),
            };
        }
    };

    let Some(end) = span_end(working, begin) else {
        return OpOutcome::Skipped(format!("no balanced brace block after {start:?}"));
    };

    let mut out = String::with_capacity(working.len());
    out.push_str(&working[..begin]);
    out.push_str(payload);
    out.push_str(&working[end..]);
    OpOutcome::Applied(out)
}

/// Exclusive end of the brace-delimited span starting at `begin`: the first
/// `{` at or after the anchor through its structurally matching `}`, plus a
/// trailing comma when one immediately follows.
fn span_end(working: &str, begin: usize) -> Option<usize> {
    let open = begin + working[begin..].find('{')?;
    let mut depth = 0usize;
    for (i, c) in working[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let mut end = open + i + 1;
                    if working[end..].starts_with(',') {
                        end += 1;
                    }
                    return Some(end);
                }
            }
            _ => {}
        }
    }
    None
}

fn line_start(text: &str, idx: usize) -> usize {
    text[..idx].rfind('\n').map(|p| p + 1).unwrap_or(0)
}

fn line_end(text: &str, idx: usize) -> usize {
    text[idx..].find('\n').map(|p| idx + p).unwrap_or(text.len())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn render_patch(target: &Utf8Path, before: &str, after: &str) -> String {
    if before == after {
        return String::new();
    }
    let mut out = String::new();
    out.push_str(&format!("diff --git a/{0} b/{0}\n", target));
    out.push_str(&format!("--- a/{0}\n+++ b/{0}\n", target));
    let patch = diffy::create_patch(before, after);
    out.push_str(&diffy::PatchFormatter::new().fmt_patch(&patch).to_string());
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_end_scans_nested_braces() {
        let text = "Customer: {\n  inner: { a: 1 },\n  more: { b: { c: 2 } },\n},\nnext";
        let end = span_end(text, 0).unwrap();
        assert_eq!(&text[end..], "\nnext");
    }

    #[test]
    fn span_end_none_when_unbalanced() {
        assert!(span_end("Customer: { open", 0).is_none());
    }

    #[test]
    fn insert_after_lands_at_end_of_anchor_line() {
        let out = match insert_op("a\n// anchor, trailing\nb\n", "// anchor", "X", true) {
            OpOutcome::Applied(s) => s,
            _ => panic!("expected applied"),
        };
        assert_eq!(out, "a\n// anchor, trailing\n\nX\nb\n");
    }

    #[test]
    fn insert_before_lands_at_start_of_anchor_line() {
        let out = match insert_op("a\n    signup: f,\n", "signup:", "    ...Ops,", false) {
            OpOutcome::Applied(s) => s,
            _ => panic!("expected applied"),
        };
        assert_eq!(out, "a\n    ...Ops,\n\n    signup: f,\n");
    }
}
