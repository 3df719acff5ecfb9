//! Worker pool: N OS threads, each running an independent [`crate::search`]
//! over the same shared, read-only dictionary and grid topology. Plain
//! `Arc<AtomicBool>`/`Arc<AtomicU64>` flags shared with `thread::spawn`'d
//! workers coordinate cancellation and progress reporting instead of
//! channels; a `Mutex`-guarded sink receives results. No work-stealing or
//! async runtime.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::grid::{Grid, SlotSet};
use crate::ipuz::SolutionSink;
use crate::search::{self, Hooks, Statistics};
use crate::word_list::WordList;

/// Tunables for a pool run.
pub struct PoolConfig {
    pub num_threads: usize,
    pub base_seed: u64,
    /// How often the ticker thread asks the next sampling worker to print a
    /// progress snapshot.
    pub progress_interval: Duration,
    /// Stop every worker once this many solutions have been emitted in
    /// total, across all workers combined. `None` runs until the process is
    /// otherwise interrupted.
    pub solution_limit: Option<u64>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            num_threads: crate::DEFAULT_NUM_THREADS,
            base_seed: 0,
            progress_interval: Duration::from_secs(5),
            solution_limit: None,
        }
    }
}

/// Totals across every worker, printed once the pool has fully stopped.
#[derive(Debug, Default, Clone, Copy)]
pub struct PoolSummary {
    pub states: u64,
    pub backtracks: u64,
    pub solutions: u64,
}

/// Run `config.num_threads` independent search workers against `word_list`
/// and `slots`, writing every completed filling to `sink`, until
/// `config.solution_limit` is reached or the pool is cancelled. Blocks until
/// every worker thread has exited.
pub fn run(
    word_list: &Arc<WordList>,
    slots: &Arc<SlotSet>,
    sink: &Arc<dyn SolutionSink>,
    config: &PoolConfig,
) -> PoolSummary {
    let cancel = Arc::new(AtomicBool::new(false));
    let progress_requested = Arc::new(AtomicBool::new(false));
    let solutions_emitted = Arc::new(AtomicU64::new(0));
    let next_sequence = Arc::new(AtomicU64::new(0));

    // Lightweight ticker: sets the shared flag on a fixed cadence. Any
    // worker's periodic sample may claim it; most ticks are claimed by
    // whichever worker next crosses its sample interval. Sleeps in short
    // slices rather than the whole interval at once so it notices `cancel`
    // promptly instead of making the final `join` wait out a long interval.
    let ticker = {
        let cancel = Arc::clone(&cancel);
        let progress_requested = Arc::clone(&progress_requested);
        let interval = config.progress_interval;
        let slice = Duration::from_millis(100).min(interval.max(Duration::from_millis(1)));
        thread::spawn(move || {
            let mut elapsed = Duration::ZERO;
            while !cancel.load(Ordering::Relaxed) {
                thread::sleep(slice);
                elapsed += slice;
                if elapsed >= interval {
                    progress_requested.store(true, Ordering::Relaxed);
                    elapsed = Duration::ZERO;
                }
            }
        })
    };

    let mut handles = Vec::with_capacity(config.num_threads);
    for worker_id in 0..config.num_threads {
        let word_list = Arc::clone(word_list);
        let slots = Arc::clone(slots);
        let sink = Arc::clone(sink);
        let cancel = Arc::clone(&cancel);
        let progress_requested = Arc::clone(&progress_requested);
        let solutions_emitted = Arc::clone(&solutions_emitted);
        let next_sequence = Arc::clone(&next_sequence);
        let solution_limit = config.solution_limit;
        // Distinct, reproducible per-worker seed from a single base seed.
        let seed = config
            .base_seed
            .wrapping_add(worker_id as u64)
            .wrapping_mul(0x9E37_79B9_7F4A_7C15);

        handles.push(thread::spawn(move || -> Statistics {
            tracing::debug!(worker = worker_id, seed, "worker spawned");
            let mut order_rng = SmallRng::seed_from_u64(seed);
            let order = search::build_slot_order(&slots, &mut order_rng);

            let should_cancel = || cancel.load(Ordering::Relaxed);

            let maybe_report_progress = |grid: &Grid, stats: &Statistics| {
                if progress_requested
                    .compare_exchange(true, false, Ordering::AcqRel, Ordering::Relaxed)
                    .is_ok()
                {
                    report_progress(worker_id, &slots, grid, stats);
                }
            };

            let mut on_solution = |grid: &Grid, _order: &[crate::grid::Slot], _stats: &Statistics| {
                let sequence_number = next_sequence.fetch_add(1, Ordering::Relaxed);
                match sink.write(grid, &slots, sequence_number) {
                    Ok(()) => tracing::info!(worker = worker_id, sequence_number, "solution emitted"),
                    Err(err) => tracing::warn!(worker = worker_id, error = %err, "dropping solution: write failed"),
                }
                let total = solutions_emitted.fetch_add(1, Ordering::Relaxed) + 1;
                if let Some(limit) = solution_limit {
                    if total >= limit {
                        cancel.store(true, Ordering::Relaxed);
                    }
                }
            };

            let mut hooks = Hooks {
                on_solution: &mut on_solution,
                should_cancel: &should_cancel,
                maybe_report_progress: &maybe_report_progress,
            };

            let (stats, reason) = search::run(&word_list, &order, seed, &mut hooks);
            tracing::info!(
                worker = worker_id,
                ?reason,
                states = stats.states,
                solutions = stats.solutions,
                "worker finished"
            );
            stats
        }));
    }

    let mut summary = PoolSummary::default();
    for handle in handles {
        match handle.join() {
            Ok(stats) => {
                summary.states += stats.states;
                summary.backtracks += stats.backtracks;
                summary.solutions += stats.solutions;
            }
            Err(_) => tracing::error!("a worker thread panicked"),
        }
    }

    cancel.store(true, Ordering::Relaxed);
    let _ = ticker.join();
    summary
}

fn report_progress(worker_id: usize, slots: &SlotSet, grid: &Grid, stats: &Statistics) {
    let board: String = slots
        .all()
        .iter()
        .map(|slot| grid.read(slot))
        .collect::<Vec<_>>()
        .join(" ");
    tracing::debug!(
        worker = worker_id,
        states = stats.states,
        backtracks = stats.backtracks,
        solutions = stats.solutions,
        board = %board,
        "progress"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::ipuz::tests::CollectingSink;
    use crate::word_list::tests::word_list_from_words;

    #[test]
    fn pool_emits_at_least_one_solution_and_joins_cleanly() {
        let word_list = Arc::new(word_list_from_words(&[
            "at", "an", "no", "on", "to", "ox", "oz", "ax",
        ]));
        let mut grid = Grid::new();
        for row in 0..crate::DIM {
            for col in 0..crate::DIM {
                if row >= 2 || col >= 2 {
                    grid.block(row, col);
                }
            }
        }
        let slots = Arc::new(grid.enumerate_slots());
        let sink: Arc<dyn SolutionSink> = Arc::new(CollectingSink::default());

        let config = PoolConfig {
            num_threads: 2,
            base_seed: 11,
            progress_interval: Duration::from_secs(3600),
            solution_limit: Some(1),
        };
        let summary = run(&word_list, &slots, &sink, &config);
        assert!(summary.solutions >= 1);
    }
}
