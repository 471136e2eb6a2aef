// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// Shuffles samples with a seeded RNG and splits them into a
// training set and a validation set.
//
// The validation share is rounded UP (5 samples at 0.2 → 1 held
// out), and the same seed always produces the same split so
// re-running training on identical data is reproducible.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Shuffle `samples` with `seed` and split into (train, validation).
///
/// `val_fraction` is clamped to `[0.0, 1.0]`.
pub fn split_train_val<T>(mut samples: Vec<T>, val_fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    samples.shuffle(&mut rng);

    let total    = samples.len();
    let n_val    = ((total as f64) * val_fraction.clamp(0.0, 1.0)).ceil() as usize;
    let split_at = total - n_val.min(total);

    // split_off(n) leaves [0..n) in `samples` and returns [n..total)
    let val = samples.split_off(split_at);

    tracing::debug!(
        "Dataset split (seed={}): {} training, {} validation",
        seed,
        samples.len(),
        val.len(),
    );

    (samples, val)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_five_examples_hold_out_one() {
        let items: Vec<usize> = (0..5).collect();
        let (train, val)      = split_train_val(items, 0.2, 42);
        assert_eq!(train.len(), 4);
        assert_eq!(val.len(),   1);
    }

    #[test]
    fn test_same_seed_same_split() {
        let items: Vec<usize> = (0..50).collect();
        let a = split_train_val(items.clone(), 0.2, 42);
        let b = split_train_val(items, 0.2, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn test_all_items_preserved() {
        let items: Vec<usize> = (0..50).collect();
        let (train, val)      = split_train_val(items, 0.3, 7);
        let mut all: Vec<usize> = train.into_iter().chain(val).collect();
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_dataset() {
        let items: Vec<usize> = Vec::new();
        let (train, val)      = split_train_val(items, 0.2, 42);
        assert!(train.is_empty());
        assert!(val.is_empty());
    }

    #[test]
    fn test_zero_fraction_keeps_everything_for_training() {
        let items: Vec<usize> = (0..10).collect();
        let (train, val)      = split_train_val(items, 0.0, 42);
        assert_eq!(train.len(), 10);
        assert!(val.is_empty());
    }
}
