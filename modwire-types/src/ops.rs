use serde::{Deserialize, Serialize};

/// Where an edit lands relative to its anchor.
///
/// Anchors are literal substrings of the aggregator file. The file's coarse
/// structure is assumed stable; uniqueness of an anchor is the caller's
/// responsibility, except for `replace_span` where it is enforced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Anchor {
    /// Splice the payload immediately after the matched text, separated by
    /// a single blank line.
    InsertAfter { pattern: String },

    /// Splice the payload immediately before the matched text.
    InsertBefore { pattern: String },

    /// Replace from the start pattern through the close brace that
    /// structurally matches its first open brace (plus a trailing comma,
    /// when present). The start pattern must match exactly once.
    ReplaceSpan { start: String },
}

impl Anchor {
    /// The text the rewriter searches for.
    pub fn pattern(&self) -> &str {
        match self {
            Anchor::InsertAfter { pattern } => pattern,
            Anchor::InsertBefore { pattern } => pattern,
            Anchor::ReplaceSpan { start } => start,
        }
    }
}

/// One requested edit against the aggregator file.
///
/// Operations in a run are applied sequentially: each sees the working text
/// produced by the previous one, not the original file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteOp {
    /// Stable identifier surfaced in results (e.g. `customer/import`).
    pub id: String,

    pub anchor: Anchor,

    /// Literal text to insert or substitute, verbatim.
    pub payload: String,
}
