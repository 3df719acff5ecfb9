//! The playing surface: cell state, slot enumeration, and constraint
//! extraction. Slot ids are assigned densely, skipping cells that never
//! start a real (length >= 2) run — a naive running counter over every
//! visited cell would leave gaps in the final numbering whenever an
//! isolated singleton cell is scanned.

use smallvec::SmallVec;

use crate::error::GridInvariantError;
use crate::types::{CellIndex, Direction, Glyph, SlotId};
use crate::word_list::Query;
use crate::DIM;

/// State of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Blocked,
    Open,
    Letter(Glyph),
}

/// A maximal horizontal or vertical run of non-blocked cells of length >= 2.
#[derive(Debug, Clone)]
pub struct Slot {
    pub id: SlotId,
    pub direction: Direction,
    /// Cell indices in slot order; strictly increasing for across slots,
    /// strictly increasing with stride `DIM` for down slots.
    pub cells: SmallVec<[CellIndex; DIM]>,
}

impl Slot {
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        false // a Slot is never empty by construction (length >= 2)
    }
}

/// The full set of slots for a grid topology, split by direction, plus a
/// combined view ordered by slot id for code that just wants "every slot".
#[derive(Debug, Clone)]
pub struct SlotSet {
    pub across: Vec<Slot>,
    pub down: Vec<Slot>,
}

impl SlotSet {
    /// Every slot, ordered by id (across and down at the same origin are
    /// adjacent, across first, matching scan order).
    #[must_use]
    pub fn all(&self) -> Vec<&Slot> {
        let mut all: Vec<&Slot> = self.across.iter().chain(self.down.iter()).collect();
        all.sort_by_key(|slot| slot.id);
        all
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.across.len() + self.down.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `DIM x DIM` cell state. Cheap to copy (a fixed array of `Cell`), which is
/// the simplest correct state-restoration discipline for the search: clone
/// the whole grid per stack frame rather than save/restore individual slots.
/// [`Self::fill`]/[`Self::unfill`] are still provided for callers (and
/// tests) that prefer explicit per-slot restoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    cells: [Cell; DIM * DIM],
}

impl Default for Grid {
    fn default() -> Self {
        Grid {
            cells: [Cell::Open; DIM * DIM],
        }
    }
}

impl Grid {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn index(row: usize, col: usize) -> CellIndex {
        debug_assert!(row < DIM && col < DIM);
        (row * DIM + col) as CellIndex
    }

    #[must_use]
    pub fn row_col(index: CellIndex) -> (usize, usize) {
        let index = index as usize;
        (index / DIM, index % DIM)
    }

    #[must_use]
    pub fn at(&self, row: usize, col: usize) -> Cell {
        self.cells[Self::index(row, col) as usize]
    }

    #[must_use]
    pub fn at_index(&self, index: CellIndex) -> Cell {
        self.cells[index as usize]
    }

    /// Mark `(row, col)` permanently blocked. Legal only before
    /// [`Self::enumerate_slots`] is called.
    pub fn block(&mut self, row: usize, col: usize) {
        self.cells[Self::index(row, col) as usize] = Cell::Blocked;
    }

    /// Scan the grid row-major and assign stable 1-based slot ids, shared
    /// between an across and a down slot that start at the same cell.
    /// Performed once; the result is immutable for the life of the run.
    #[must_use]
    pub fn enumerate_slots(&self) -> SlotSet {
        let mut across = Vec::new();
        let mut down = Vec::new();
        let mut next_id: SlotId = 1;

        for row in 0..DIM {
            for col in 0..DIM {
                if self.at(row, col) == Cell::Blocked {
                    continue;
                }

                let starts_across = (col == 0 || self.at(row, col - 1) == Cell::Blocked)
                    && col + 1 < DIM
                    && self.at(row, col + 1) != Cell::Blocked;
                let starts_down = (row == 0 || self.at(row - 1, col) == Cell::Blocked)
                    && row + 1 < DIM
                    && self.at(row + 1, col) != Cell::Blocked;

                if !starts_across && !starts_down {
                    continue;
                }

                let id = next_id;
                next_id += 1;

                if starts_across {
                    let mut cells = SmallVec::new();
                    let mut c = col;
                    while c < DIM && self.at(row, c) != Cell::Blocked {
                        cells.push(Self::index(row, c));
                        c += 1;
                    }
                    across.push(Slot {
                        id,
                        direction: Direction::Across,
                        cells,
                    });
                }

                if starts_down {
                    let mut cells = SmallVec::new();
                    let mut r = row;
                    while r < DIM && self.at(r, col) != Cell::Blocked {
                        cells.push(Self::index(r, col));
                        r += 1;
                    }
                    down.push(Slot {
                        id,
                        direction: Direction::Down,
                        cells,
                    });
                }
            }
        }

        SlotSet { across, down }
    }

    /// The fixed-letter constraint query for `slot`'s current state. A
    /// blocked cell interior to a slot is an invariant violation: slot cell
    /// lists are built from `enumerate_slots` and must never cross a blocked
    /// cell.
    pub fn constraints_for(&self, slot: &Slot) -> Result<Query, GridInvariantError> {
        let mut query = Query::new();
        for (i, &cell_index) in slot.cells.iter().enumerate() {
            match self.at_index(cell_index) {
                Cell::Letter(g) => query.push((i as u8, g)),
                Cell::Open => {}
                Cell::Blocked => {
                    return Err(GridInvariantError::BlockedInsideSlot {
                        slot_id: slot.id,
                        offset: i,
                    })
                }
            }
        }
        Ok(query)
    }

    /// Write `word`'s letters into `slot`'s cells. Idempotent when the word
    /// matches already-written letters; overwrites otherwise.
    pub fn fill(&mut self, slot: &Slot, word: &str) -> Result<(), GridInvariantError> {
        if slot.len() != word.len() {
            return Err(GridInvariantError::WordLengthMismatch {
                slot_id: slot.id,
                slot_len: slot.len(),
                word_len: word.len(),
            });
        }
        #[cfg(feature = "check_invariants")]
        for (offset, &cell_index) in slot.cells.iter().enumerate() {
            if self.at_index(cell_index) == Cell::Blocked {
                return Err(GridInvariantError::BlockedInsideSlot {
                    slot_id: slot.id,
                    offset,
                });
            }
        }
        for (&cell_index, b) in slot.cells.iter().zip(word.bytes()) {
            self.cells[cell_index as usize] = Cell::Letter(b);
        }
        Ok(())
    }

    /// The letters currently occupying `slot`'s cells, in slot order, for
    /// use as the `previous_letters` argument to [`Self::unfill`].
    #[must_use]
    pub fn snapshot(&self, slot: &Slot) -> SmallVec<[Cell; DIM]> {
        slot.cells.iter().map(|&i| self.at_index(i)).collect()
    }

    /// Restore `slot`'s cells to `previous`, as captured by [`Self::snapshot`]
    /// before a trial [`Self::fill`].
    pub fn unfill(&mut self, slot: &Slot, previous: &[Cell]) {
        debug_assert_eq!(slot.len(), previous.len());
        for (&cell_index, &prev) in slot.cells.iter().zip(previous) {
            self.cells[cell_index as usize] = prev;
        }
    }

    /// Render `slot`'s current letters as a string (for clue text, solution
    /// output, and progress snapshots). Cells that aren't yet a letter show
    /// as `?`, so this is also safe to call against a partially-filled grid.
    #[must_use]
    pub fn read(&self, slot: &Slot) -> String {
        slot.cells
            .iter()
            .map(|&i| match self.at_index(i) {
                Cell::Letter(g) => g as char,
                _ => '?',
            })
            .collect()
    }
}
