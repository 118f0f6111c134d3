//! Shared DTOs (schemas-as-code) for the modwire workspace.
//!
//! # Design constraints
//! - Outcome types are intended to be serialized to disk.
//! - Be conservative with breaking changes.
//! - Prefer adding optional fields over changing semantics.

pub mod layout;
pub mod ops;
pub mod outcome;
pub mod spec;

/// Schema identifiers.
pub mod schema {
    pub const MODWIRE_WIRE_SUMMARY_V1: &str = "modwire.wire-summary.v1";
}
