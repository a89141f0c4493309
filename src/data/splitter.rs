// ============================================================
// Layer 4 — Train/Test Splitter
// ============================================================
// Shuffles the examples with a SEEDED generator and holds out a
// fixed number of them for testing.
//
// Why seeded?
//   `evaluate` runs in a separate process after `train`. It has
//   to rebuild exactly the same held-out set, so the split must
//   be a pure function of (examples, test_size, seed).
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom.
//
// Reference: rand crate documentation

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Shuffle `samples` with `seed` and split off `test_size` of them.
///
/// # Returns
/// A tuple (train_samples, test_samples). If there are fewer than
/// `test_size` samples, everything goes to the test side.
pub fn split_holdout<T>(mut samples: Vec<T>, test_size: usize, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    samples.shuffle(&mut rng);

    let total    = samples.len();
    let split_at = total.saturating_sub(test_size);

    // split_off(n) removes elements [n..] and returns them
    let test = samples.split_off(split_at);

    tracing::debug!("Dataset split: {} training, {} test", samples.len(), test.len());

    (samples, test)
}
