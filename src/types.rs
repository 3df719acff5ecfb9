//! Small shared type aliases used across the word list, grid, and search
//! modules, kept in one place rather than scattered per-module.

use crate::DIM;

/// Identifies a dictionary word within [`crate::word_list::WordList`].
/// 16-bit at the default grid size, 32-bit once `dim9` pushes the dictionary
/// large enough to need it.
#[cfg(not(feature = "dim9"))]
pub type WordId = u16;
#[cfg(feature = "dim9")]
pub type WordId = u32;

/// Identifies a cell in the grid, row-major (`row * DIM + col`). A single
/// 16-bit index is sufficient for any `DIM` this crate supports.
pub type CellIndex = u16;

/// Identifies a slot (across or down entry), 1-based and stable across runs
/// on the same blocked pattern.
pub type SlotId = u32;

/// A single lowercase ASCII letter, stored as its byte value (`b'a'..=b'z'`).
pub type Glyph = u8;

/// Map a glyph byte to a dense `0..26` index for posting-list/array lookups.
#[must_use]
pub fn glyph_index(g: Glyph) -> usize {
    debug_assert!(g.is_ascii_lowercase(), "glyph must be a-z, got {g:#x}");
    (g - b'a') as usize
}

/// Inverse of [`glyph_index`].
#[must_use]
pub fn index_glyph(i: usize) -> Glyph {
    debug_assert!(i < 26, "glyph index out of range: {i}");
    b'a' + i as u8
}

/// Normalize an input byte to a lowercase glyph, rejecting anything that
/// isn't an ASCII letter.
#[must_use]
pub fn normalize_glyph(c: u8) -> Option<Glyph> {
    if c.is_ascii_alphabetic() {
        Some(c.to_ascii_lowercase())
    } else {
        None
    }
}

/// Direction of a slot within the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Across,
    Down,
}

/// The maximum word/slot length this build supports; always equal to `DIM`,
/// named separately for readability at call sites that talk about word
/// length rather than grid geometry.
pub const MAX_WORD_LENGTH: usize = DIM;
