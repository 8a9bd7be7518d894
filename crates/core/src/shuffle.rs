//! Reproducible question ordering.
//!
//! A quiz session draws its order from a seed so that a restored session puts
//! every stored answer back next to the question it belongs to.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic generator: the same seed yields the same sequence.
#[derive(Debug, Clone)]
pub struct SeededRng {
    inner: ChaCha8Rng,
}

impl SeededRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.inner.random::<f64>()
    }
}

/// Fisher–Yates shuffle into a new vector; `items` is left untouched.
///
/// Walks from the last index down to 1 and swaps each position with
/// `floor(next_f64() * (i + 1))`.
#[must_use]
pub fn shuffle<T: Clone>(items: &[T], rng: &mut SeededRng) -> Vec<T> {
    let mut out = items.to_vec();
    for i in (1..out.len()).rev() {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let j = ((rng.next_f64() * (i + 1) as f64).floor() as usize).min(i);
        out.swap(i, j);
    }
    out
}

/// Permutation of `0..len` for the given seed.
#[must_use]
pub fn shuffled_indices(len: usize, seed: u64) -> Vec<usize> {
    let indices: Vec<usize> = (0..len).collect();
    shuffle(&indices, &mut SeededRng::new(seed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SeededRng::new(42);
        let mut b = SeededRng::new(42);
        for _ in 0..16 {
            assert_eq!(a.next_f64().to_bits(), b.next_f64().to_bits());
        }
    }

    #[test]
    fn values_stay_in_unit_interval() {
        let mut rng = SeededRng::new(7);
        for _ in 0..1000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn shuffle_is_reproducible() {
        let input: Vec<u32> = (0..20).collect();
        let first = shuffle(&input, &mut SeededRng::new(42));
        let second = shuffle(&input, &mut SeededRng::new(42));
        assert_eq!(first, second);
    }

    #[test]
    fn shuffle_is_a_permutation_and_leaves_input_alone() {
        let input = vec!["a", "b", "c", "d", "e", "b"];
        let shuffled = shuffle(&input, &mut SeededRng::new(9));
        assert_eq!(input, vec!["a", "b", "c", "d", "e", "b"]);

        let mut sorted_in = input.clone();
        let mut sorted_out = shuffled;
        sorted_in.sort_unstable();
        sorted_out.sort_unstable();
        assert_eq!(sorted_in, sorted_out);
    }

    #[test]
    fn different_seeds_diverge() {
        let input: Vec<u32> = (0..20).collect();
        let orders: std::collections::HashSet<Vec<u32>> = (0..8)
            .map(|seed| shuffle(&input, &mut SeededRng::new(seed)))
            .collect();
        assert!(orders.len() > 1);
    }

    #[test]
    fn tiny_inputs_are_untouched() {
        let empty: Vec<u8> = Vec::new();
        assert!(shuffle(&empty, &mut SeededRng::new(1)).is_empty());
        assert_eq!(shuffle(&[5], &mut SeededRng::new(1)), vec![5]);
    }

    #[test]
    fn indices_cover_range() {
        let mut order = shuffled_indices(10, 1234);
        order.sort_unstable();
        assert_eq!(order, (0..10).collect::<Vec<_>>());
    }
}
