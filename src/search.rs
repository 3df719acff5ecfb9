//! Per-worker depth-first backtracking over the slot list. An explicit
//! stack holds a board snapshot, the remaining slots to visit, and the
//! used-word set, with a randomized starting offset into each slot's
//! candidate list. [`crate::pool`] runs one of these per worker thread,
//! with sampled cancellation and progress-reporting hooks.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::grid::{Grid, Slot, SlotSet};
use crate::types::{Direction, WordId};
use crate::word_list::WordList;

/// How often (in units of DFS steps) a worker samples the shared
/// cancel/progress flags. Frequent enough that cancellation and progress
/// ticks are noticed promptly, infrequent enough that the atomic loads
/// don't show up in profiles.
pub const SAMPLE_INTERVAL: u64 = 100_000;

/// Upper bound (exclusive) on the randomized starting offset into a slot's
/// candidate list. Any bounded range greater than zero works; this just
/// needs to be larger than any realistic candidate list.
pub const START_OFFSET_BOUND: u32 = 1000;

/// Running counters for a single worker's search, used for progress
/// snapshots and diagnostics.
#[derive(Debug, Default, Clone, Copy)]
pub struct Statistics {
    /// Total stack frames popped and examined.
    pub states: u64,
    /// Frames popped with no viable candidate, i.e. ordinary backtracks.
    pub backtracks: u64,
    /// Completed fillings emitted so far.
    pub solutions: u64,
}

/// One level of the explicit DFS stack: a full grid snapshot (cheap: `Grid`
/// is `Copy`), the index of the next slot to fill in this worker's
/// traversal order, and the words already placed by shallower frames.
#[derive(Clone)]
struct Frame {
    grid: Grid,
    next_slot_index: usize,
    used: Vec<WordId>,
}

/// Why the search loop stopped without exhausting the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Cancelled,
    Exhausted,
}

/// Build this worker's traversal order: shuffle across slots and down slots
/// independently with `rng`, then interleave them, alternating direction
/// with a fair-coin choice of which leads. Fixed for the worker's lifetime.
#[must_use]
pub fn build_slot_order(slots: &SlotSet, rng: &mut SmallRng) -> Vec<Slot> {
    let mut across = slots.across.clone();
    let mut down = slots.down.clone();
    across.shuffle(rng);
    down.shuffle(rng);

    let mut order = Vec::with_capacity(across.len() + down.len());
    let mut lead_across = rng.gen_bool(0.5);
    let (mut ai, mut di) = (0, 0);
    while ai < across.len() || di < down.len() {
        if (lead_across && ai < across.len()) || di >= down.len() {
            order.push(across[ai].clone());
            ai += 1;
        } else {
            order.push(down[di].clone());
            di += 1;
        }
        lead_across = !lead_across;
    }
    order
}

/// Hooks the pool provides so a single-threaded search loop can report
/// progress and observe cancellation without depending on [`crate::pool`]
/// directly.
pub struct Hooks<'a> {
    pub on_solution: &'a mut dyn FnMut(&Grid, &[Slot], &Statistics),
    pub should_cancel: &'a dyn Fn() -> bool,
    pub maybe_report_progress: &'a dyn Fn(&Grid, &Statistics),
}

/// Run one worker's search to completion (stack drained) or until
/// cancelled. `order` is this worker's fixed slot traversal order, already
/// built with [`build_slot_order`]. `seed` drives both the offset draws
/// inside the loop and (via the caller, before this is invoked) the slot
/// order shuffle — the same worker seed reproduces the same sequence of
/// solutions.
pub fn run(word_list: &WordList, order: &[Slot], seed: u64, hooks: &mut Hooks) -> (Statistics, StopReason) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut stats = Statistics::default();
    let mut scratch: Vec<WordId> = Vec::new();

    let mut stack: Vec<Frame> = vec![Frame {
        grid: Grid::new(),
        next_slot_index: 0,
        used: Vec::with_capacity(order.len()),
    }];

    while let Some(frame) = stack.pop() {
        stats.states += 1;

        if stats.states % SAMPLE_INTERVAL == 0 {
            if (hooks.should_cancel)() {
                return (stats, StopReason::Cancelled);
            }
            (hooks.maybe_report_progress)(&frame.grid, &stats);
        }

        if frame.next_slot_index == order.len() {
            stats.solutions += 1;
            (hooks.on_solution)(&frame.grid, order, &stats);
            continue;
        }

        let slot = &order[frame.next_slot_index];
        let query = frame
            .grid
            .constraints_for(slot)
            .expect("slot cell lists never cross a blocked cell");
        let candidates = word_list.query_into(slot.len(), &query, &mut scratch);

        if candidates.is_empty() {
            stats.backtracks += 1;
            continue;
        }

        let start = rng.gen_range(0..START_OFFSET_BOUND) as usize;
        let viable: Vec<usize> = (0..candidates.len())
            .map(|i| (start + i) % candidates.len())
            .filter(|&idx| !frame.used.contains(&candidates[idx]))
            .collect();

        if viable.is_empty() {
            stats.backtracks += 1;
            continue;
        }

        let last = viable.len() - 1;
        for &idx in &viable[..last] {
            let word_id = candidates[idx];
            let word = word_list.word(word_id);
            let mut grid = frame.grid;
            grid.fill(slot, word)
                .expect("candidate word length matches slot length by construction");
            let mut used = frame.used.clone();
            used.push(word_id);
            stack.push(Frame {
                grid,
                next_slot_index: frame.next_slot_index + 1,
                used,
            });
        }

        // Tail move: the final candidate reuses `frame` directly instead of
        // cloning, bounding per-step allocation growth.
        let word_id = candidates[viable[last]];
        let word = word_list.word(word_id);
        let mut frame = frame;
        frame
            .grid
            .fill(slot, word)
            .expect("candidate word length matches slot length by construction");
        frame.used.push(word_id);
        frame.next_slot_index += 1;
        stack.push(frame);
    }

    (stats, StopReason::Exhausted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::word_list::tests::word_list_from_words;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn no_cancel() -> AtomicBool {
        AtomicBool::new(false)
    }

    fn run_to_first_solution(word_list: &WordList, order: &[Slot], seed: u64) -> Option<Grid> {
        let cancel = no_cancel();
        let mut found = None;
        let mut on_solution = |grid: &Grid, _order: &[Slot], _stats: &Statistics| {
            if found.is_none() {
                found = Some(*grid);
            }
        };
        let mut hooks = Hooks {
            on_solution: &mut on_solution,
            should_cancel: &|| cancel.load(Ordering::Relaxed),
            maybe_report_progress: &|_grid, _stats| {},
        };
        run(word_list, order, seed, &mut hooks);
        found
    }

    #[test]
    fn emits_distinct_dictionary_words_on_all_crossings() {
        // Blocks down to a 2x2 playable region inside the full DIM grid.
        let word_list = word_list_from_words(&["at", "an", "no", "on", "to", "ox", "oz", "ax"]);
        let mut grid = Grid::new();
        for row in 0..crate::DIM {
            for col in 0..crate::DIM {
                if row >= 2 || col >= 2 {
                    grid.block(row, col);
                }
            }
        }
        let slots = grid.enumerate_slots();
        let mut rng = SmallRng::seed_from_u64(1);
        let order = build_slot_order(&slots, &mut rng);

        let solution = run_to_first_solution(&word_list, &order, 7).expect("must find a solution");
        let mut seen_words = Vec::new();
        for slot in &order {
            let word = solution.read(slot);
            assert!(
                word_list
                    .words_of_length(slot.len())
                    .iter()
                    .any(|&id| word_list.word(id) == word),
                "{word} must be a dictionary word"
            );
            assert!(!seen_words.contains(&word), "no word may repeat: {word}");
            seen_words.push(word);
        }
    }

    #[test]
    fn no_repeat_rule_can_make_a_grid_unsolvable() {
        // Dictionary = {"aa"} only; with the no-repeat rule, a 2x2 (modeled
        // here in the corner of DIM x DIM) cannot be filled twice with the
        // same word, so zero solutions.
        let word_list = word_list_from_words(&["aa"]);
        let mut grid = Grid::new();
        for row in 0..crate::DIM {
            for col in 0..crate::DIM {
                if row >= 2 || col >= 2 {
                    grid.block(row, col);
                }
            }
        }
        let slots = grid.enumerate_slots();
        let mut rng = SmallRng::seed_from_u64(1);
        let order = build_slot_order(&slots, &mut rng);

        assert!(run_to_first_solution(&word_list, &order, 42).is_none());
    }

    #[test]
    fn same_seed_reproduces_the_same_solution_sequence() {
        let word_list = word_list_from_words(&[
            "cat", "car", "can", "cap", "bat", "bar", "ban", "bap", "rat", "ran", "rap", "rag",
        ]);
        let mut grid = Grid::new();
        for row in 0..crate::DIM {
            for col in 0..crate::DIM {
                if row >= 3 || col >= 3 {
                    grid.block(row, col);
                }
            }
        }
        let slots = grid.enumerate_slots();
        let mut rng_a = SmallRng::seed_from_u64(99);
        let order_a = build_slot_order(&slots, &mut rng_a);
        let mut rng_b = SmallRng::seed_from_u64(99);
        let order_b = build_slot_order(&slots, &mut rng_b);

        let sol_a = run_to_first_solution(&word_list, &order_a, 1234);
        let sol_b = run_to_first_solution(&word_list, &order_b, 1234);
        assert_eq!(sol_a, sol_b);
    }

    #[test]
    fn slot_order_interleaves_both_directions_when_both_present() {
        let mut grid = Grid::new();
        for row in 0..crate::DIM {
            for col in 0..crate::DIM {
                if row >= 2 || col >= 2 {
                    grid.block(row, col);
                }
            }
        }
        let slots = grid.enumerate_slots();
        let mut rng = SmallRng::seed_from_u64(5);
        let order = build_slot_order(&slots, &mut rng);
        assert_eq!(order.len(), slots.len());
        let directions: Vec<Direction> = order.iter().map(|s| s.direction).collect();
        assert!(directions.contains(&Direction::Across));
        assert!(directions.contains(&Direction::Down));
    }
}
