//! Randomized deck ordering for a single quiz session.

use rand::Rng;

/// Returns a uniformly shuffled copy of `deck` using the thread-local RNG.
///
/// The caller's slice is left untouched.
#[must_use]
pub fn shuffle<T: Clone>(deck: &[T]) -> Vec<T> {
    shuffle_with(deck, &mut rand::rng())
}

/// Fisher–Yates shuffle driven by a caller-supplied random source.
///
/// Walks from the last index down to 1, swapping each slot with a uniformly
/// chosen index in `0..=i`. Seeding `rng` makes the ordering reproducible.
#[must_use]
pub fn shuffle_with<T: Clone, R: Rng + ?Sized>(deck: &[T], rng: &mut R) -> Vec<T> {
    let mut shuffled = deck.to_vec();
    for i in (1..shuffled.len()).rev() {
        let j = rng.random_range(0..=i);
        shuffled.swap(i, j);
    }
    shuffled
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn sorted(mut v: Vec<u32>) -> Vec<u32> {
        v.sort_unstable();
        v
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let deck: Vec<u32> = (1..=20).collect();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let out = shuffle_with(&deck, &mut rng);
            assert_eq!(out.len(), deck.len());
            assert_eq!(sorted(out), deck);
        }
    }

    #[test]
    fn shuffle_leaves_input_untouched() {
        let deck = vec![1, 2, 3, 4];
        let _ = shuffle(&deck);
        assert_eq!(deck, vec![1, 2, 3, 4]);
    }

    #[test]
    fn same_seed_same_order() {
        let deck: Vec<u32> = (0..10).collect();
        let a = shuffle_with(&deck, &mut StdRng::seed_from_u64(42));
        let b = shuffle_with(&deck, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn empty_and_single_decks() {
        let empty: Vec<u32> = Vec::new();
        assert!(shuffle(&empty).is_empty());
        assert_eq!(shuffle(&[9_u32]), vec![9]);
    }

    #[test]
    fn first_slot_is_roughly_uniform() {
        let deck = [0_usize, 1, 2];
        let mut counts = [0_u32; 3];
        let mut rng = StdRng::seed_from_u64(1234);
        for _ in 0..6000 {
            counts[shuffle_with(&deck, &mut rng)[0]] += 1;
        }
        for count in counts {
            assert!((1700..=2300).contains(&count), "skewed counts: {counts:?}");
        }
    }
}
