//! Command-line configuration and the blocked-cell config file format: one
//! subcommand-free binary, flags for every input/output path, an optional
//! worker-count override, and a small whitespace-tolerant text format for
//! blocked-cell coordinates.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::error::ConfigError;
use crate::grid::Grid;
use crate::DIM;

/// Parsed command-line arguments for the `crossgen` binary.
#[derive(Debug, Parser)]
#[command(name = "crossgen", about = "Parallel backtracking crossword grid-fill engine")]
pub struct Cli {
    /// Path to a whitespace-tokenized word list.
    #[arg(long)]
    pub dictionary: PathBuf,

    /// Path to a blocked-cell config file (`row col` pairs, one per line).
    /// Omit for an all-open grid.
    #[arg(long)]
    pub blocked_cells: Option<PathBuf>,

    /// Directory solutions are written into, as `solution_<n>.ipuz`.
    #[arg(long, default_value = "solutions")]
    pub output_dir: PathBuf,

    /// Number of worker threads. Defaults to [`crate::DEFAULT_NUM_THREADS`].
    #[arg(long)]
    pub threads: Option<usize>,

    /// Seconds between progress snapshots.
    #[arg(long, default_value_t = 5)]
    pub progress_interval_secs: u64,

    /// Stop after this many total solutions across all workers. Omit to run
    /// until interrupted.
    #[arg(long)]
    pub solution_limit: Option<u64>,

    /// Seed driving every worker's RNG stream (each worker derives its own
    /// seed from this one).
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

/// Read `row col` pairs from `path`. Blank lines and lines starting with `#`
/// are ignored; anything else must be exactly two whitespace-separated
/// integers.
pub fn load_blocked_cells(path: &Path) -> Result<Vec<(usize, usize)>, ConfigError> {
    let file = std::fs::File::open(path).map_err(|source| ConfigError::BlockedConfigUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = std::io::BufReader::new(file);

    let mut cells = Vec::new();
    for (line_number, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| ConfigError::BlockedConfigUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let text = line.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        let malformed = || ConfigError::BlockedConfigMalformed {
            path: path.to_path_buf(),
            line: line_number + 1,
            text: text.to_string(),
        };
        let mut parts = text.split_ascii_whitespace();
        let row: usize = parts.next().ok_or_else(malformed)?.parse().map_err(|_| malformed())?;
        let col: usize = parts.next().ok_or_else(malformed)?.parse().map_err(|_| malformed())?;
        if parts.next().is_some() {
            return Err(malformed());
        }
        cells.push((row, col));
    }
    Ok(cells)
}

/// Build a [`Grid`] with `cells` blocked, validating every coordinate is in
/// range for the compiled-in `DIM`.
pub fn build_grid(cells: &[(usize, usize)]) -> Result<Grid, ConfigError> {
    let mut grid = Grid::new();
    for &(row, col) in cells {
        if row >= DIM || col >= DIM {
            return Err(ConfigError::BlockedCellOutOfRange { row, col, dim: DIM });
        }
        grid.block(row, col);
    }
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file
    }

    #[test]
    fn parses_pairs_ignoring_blank_and_comment_lines() {
        let file = write_temp(indoc::indoc! {"
            # corners
            0 0

            4 4
        "});
        let cells = load_blocked_cells(file.path()).unwrap();
        assert_eq!(cells, vec![(0, 0), (4, 4)]);
    }

    #[test]
    fn malformed_line_is_reported_with_its_line_number() {
        let file = write_temp("0 0\nnot-a-pair\n");
        let err = load_blocked_cells(file.path()).unwrap_err();
        match err {
            ConfigError::BlockedConfigMalformed { line, .. } => assert_eq!(line, 2),
            other => panic!("expected BlockedConfigMalformed, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_cell_is_rejected() {
        let err = build_grid(&[(DIM, 0)]).unwrap_err();
        assert!(matches!(err, ConfigError::BlockedCellOutOfRange { .. }));
    }

    #[test]
    fn in_range_cells_block_the_grid() {
        let grid = build_grid(&[(0, 0)]).unwrap();
        assert_eq!(grid.at(0, 0), crate::grid::Cell::Blocked);
    }
}
