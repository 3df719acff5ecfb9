//! Crate error taxonomy.
//!
//! Configuration errors are recoverable at startup and are returned as
//! `Result`s the caller is expected to propagate with `?` before any worker
//! spawns. Invariant violations are programmer bugs: they are not meant to
//! be recovered from, but are still given a named type (rather than a bare
//! `panic!("...")`) so the diagnostic is structured.

use std::path::PathBuf;

use crate::types::SlotId;

/// Startup/configuration failures: reported before any worker spawns, fatal.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read dictionary file {path:?}: {source}")]
    DictionaryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("dictionary {path:?} contained no usable words (length 2..={max_len})")]
    EmptyDictionary { path: PathBuf, max_len: usize },

    #[error("could not read blocked-cell config {path:?}: {source}")]
    BlockedConfigUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("blocked-cell config {path}:{line}: expected `row col`, got {text:?}")]
    BlockedConfigMalformed {
        path: PathBuf,
        line: usize,
        text: String,
    },

    #[error("blocked cell ({row}, {col}) is out of range for a {dim}x{dim} grid")]
    BlockedCellOutOfRange { row: usize, col: usize, dim: usize },

    #[error("output directory {path:?} is not usable: {source}")]
    OutputDirUnusable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Invariant violations: indicate a programmer bug, not a recoverable
/// runtime condition. These are surfaced as errors only so call sites can
/// attach context before panicking / bringing down the offending worker;
/// they are never meant to be handled as ordinary control flow.
#[derive(Debug, thiserror::Error)]
pub enum GridInvariantError {
    #[error("slot {slot_id} contains a blocked cell at offset {offset}")]
    BlockedInsideSlot { slot_id: SlotId, offset: usize },

    #[error("slot {slot_id} has length {slot_len} but candidate word has length {word_len}")]
    WordLengthMismatch {
        slot_id: SlotId,
        slot_len: usize,
        word_len: usize,
    },

    #[error("query position {pos} is out of range for length {len}")]
    QueryPositionOutOfRange { pos: usize, len: usize },
}
