//! Solution output: serialize a completed grid to an IPUZ-like JSON
//! document, and the [`SolutionSink`] abstraction the search pool writes
//! through. `clues.Across` and `clues.Down` both nest under `clues`, as any
//! real IPUZ reader expects.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use serde_json::{json, Value};

use crate::error::ConfigError;
use crate::grid::{Cell, Grid, SlotSet};
use crate::types::CellIndex;
use crate::DIM;

/// Destination for completed fillings. Implementations must be safe to call
/// concurrently from every search worker: solutions stream out as they're
/// found, not batched at the end.
pub trait SolutionSink: Send + Sync {
    fn write(&self, grid: &Grid, slots: &SlotSet, sequence_number: u64) -> io::Result<()>;
}

/// Writes each solution to `{output_dir}/solution_{sequence_number}.ipuz`.
/// The directory is created once at construction time; the internal
/// [`Mutex`] only guards the running count used for the end-of-run summary,
/// since distinct sequence numbers already write to distinct files.
pub struct FileSystemSink {
    output_dir: PathBuf,
    written: Mutex<u64>,
}

impl FileSystemSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir).map_err(|source| ConfigError::OutputDirUnusable {
            path: output_dir.clone(),
            source,
        })?;
        Ok(FileSystemSink {
            output_dir,
            written: Mutex::new(0),
        })
    }

    #[must_use]
    pub fn written_count(&self) -> u64 {
        *self.written.lock().expect("written counter mutex poisoned")
    }
}

impl SolutionSink for FileSystemSink {
    fn write(&self, grid: &Grid, slots: &SlotSet, sequence_number: u64) -> io::Result<()> {
        let value = to_ipuz_value(grid, slots);
        let text = serde_json::to_string_pretty(&value).expect("ipuz value is always serializable");
        let path = self.output_dir.join(format!("solution_{sequence_number}.ipuz"));
        fs::write(&path, text)?;
        *self.written.lock().expect("written counter mutex poisoned") += 1;
        Ok(())
    }
}

/// Build the IPUZ-like JSON value for a completed `grid` over `slots`.
#[must_use]
pub fn to_ipuz_value(grid: &Grid, slots: &SlotSet) -> Value {
    let mut slot_at_origin: HashMap<CellIndex, u32> = HashMap::new();
    for slot in slots.all() {
        slot_at_origin.entry(slot.cells[0]).or_insert(slot.id);
    }

    let mut puzzle_rows = Vec::with_capacity(DIM);
    let mut solution_rows = Vec::with_capacity(DIM);
    for row in 0..DIM {
        let mut puzzle_row = Vec::with_capacity(DIM);
        let mut solution_row = Vec::with_capacity(DIM);
        for col in 0..DIM {
            let cell = grid.at(row, col);
            if cell == Cell::Blocked {
                puzzle_row.push(json!("#"));
                solution_row.push(json!("#"));
                continue;
            }
            let index = Grid::index(row, col);
            let slot_id = slot_at_origin.get(&index).copied().unwrap_or(0);
            puzzle_row.push(json!(slot_id));
            // A cell can be open yet belong to no slot (isolated singleton, no
            // length-2+ run through it) and so is never touched by the search;
            // it still needs a single-letter placeholder here.
            let letter = match cell {
                Cell::Letter(g) => (g as char).to_ascii_uppercase().to_string(),
                _ => "X".to_string(),
            };
            solution_row.push(json!(letter));
        }
        puzzle_rows.push(Value::Array(puzzle_row));
        solution_rows.push(Value::Array(solution_row));
    }

    let across: Vec<Value> = slots
        .across
        .iter()
        .map(|slot| json!([slot.id, format!("Clue for '{}'", grid.read(slot).to_uppercase())]))
        .collect();
    let down: Vec<Value> = slots
        .down
        .iter()
        .map(|slot| json!([slot.id, format!("Clue for '{}'", grid.read(slot).to_uppercase())]))
        .collect();

    json!({
        "version": "http://ipuz.org/v2",
        "kind": "http://ipuz.org/crofileword",
        "dimensions": {"width": DIM, "height": DIM},
        "puzzle": puzzle_rows,
        "solution": solution_rows,
        "clues": {
            "Across": across,
            "Down": down,
        },
    })
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[derive(Default)]
    pub struct CollectingSink {
        pub solutions: Mutex<Vec<Value>>,
    }

    impl SolutionSink for CollectingSink {
        fn write(&self, grid: &Grid, slots: &SlotSet, _sequence_number: u64) -> io::Result<()> {
            self.solutions.lock().expect("collecting sink mutex poisoned").push(to_ipuz_value(grid, slots));
            Ok(())
        }
    }

    #[test]
    fn ipuz_value_has_expected_top_level_shape() {
        let mut grid = Grid::new();
        for row in 0..DIM {
            for col in 0..DIM {
                if row >= 2 || col >= 2 {
                    grid.block(row, col);
                }
            }
        }
        let slots = grid.enumerate_slots();
        grid.fill(&slots.across[0], "at").unwrap();
        grid.fill(&slots.down[0], "an").unwrap();

        let value = to_ipuz_value(&grid, &slots);
        assert_eq!(value["version"], "http://ipuz.org/v2");
        assert_eq!(value["dimensions"]["width"], DIM);
        assert_eq!(value["dimensions"]["height"], DIM);
        assert!(value["puzzle"].is_array());
        assert!(value["solution"].is_array());
        assert!(value["clues"]["Across"].is_array());
        assert!(value["clues"]["Down"].is_array());
    }

    #[test]
    fn blocked_cells_render_as_hash_in_puzzle_and_solution() {
        let mut grid = Grid::new();
        grid.block(0, 0);
        let slots = grid.enumerate_slots();
        let value = to_ipuz_value(&grid, &slots);
        assert_eq!(value["puzzle"][0][0], "#");
        assert_eq!(value["solution"][0][0], "#");
    }

    #[test]
    fn filled_letters_are_uppercased_in_solution() {
        let mut grid = Grid::new();
        for row in 0..DIM {
            for col in 0..DIM {
                if row >= 2 || col >= 2 {
                    grid.block(row, col);
                }
            }
        }
        let slots = grid.enumerate_slots();
        grid.fill(&slots.across[0], "at").unwrap();
        let value = to_ipuz_value(&grid, &slots);
        assert_eq!(value["solution"][0][0], "A");
        assert_eq!(value["solution"][0][1], "T");
    }

    #[test]
    fn filesystem_sink_writes_one_file_per_sequence_number() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSystemSink::new(dir.path()).unwrap();
        let mut grid = Grid::new();
        grid.block(0, 0);
        let slots = grid.enumerate_slots();
        sink.write(&grid, &slots, 0).unwrap();
        sink.write(&grid, &slots, 1).unwrap();
        assert_eq!(sink.written_count(), 2);
        assert!(dir.path().join("solution_0.ipuz").exists());
        assert!(dir.path().join("solution_1.ipuz").exists());
    }
}
