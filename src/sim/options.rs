//! Answer option generation
//!
//! The correct count, its neighbours, and random distractors, shuffled.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::consts::OPTION_COUNT;

/// Build the answer buttons for `correct`.
///
/// Always contains `correct` once, `correct - 1` when `correct > 1`, and
/// `correct + 1`. The remaining slots are filled with distinct values drawn
/// uniformly from `1..=correct + 3`. Order is a uniform shuffle.
pub fn generate_options<R: Rng + ?Sized>(correct: u32, rng: &mut R) -> Vec<u32> {
    let correct = correct.max(1);
    let mut options = Vec::with_capacity(OPTION_COUNT);

    options.push(correct);
    if correct > 1 {
        options.push(correct - 1);
    }
    options.push(correct + 1);

    // When correct == 1 there is no lower neighbour, so two extras are needed.
    // 1..=correct+3 always holds at least OPTION_COUNT values, so this terminates.
    let upper = correct + 3;
    while options.len() < OPTION_COUNT {
        let extra = rng.random_range(1..=upper);
        if !options.contains(&extra) {
            options.push(extra);
        }
    }

    options.shuffle(rng);
    options
}
