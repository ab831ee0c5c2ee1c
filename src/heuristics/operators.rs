//! Permutation operators used by the genetic algorithm.
//!
//! Every stochastic operator takes the random source explicitly, so a run
//! seeded once is fully reproducible.
//!
//! - [`initialize_population`]: independent uniform shuffles of the identity tour
//! - [`tournament_select`]: best of `k` uniform draws with replacement
//! - [`order_crossover`] (OX): keeps a segment of one parent, fills the rest in
//!   the other parent's relative order
//! - [`swap_mutation`]: exchanges two random positions with a given probability

use crate::instance::{tour_distance, City};
use crate::solution::Tour;
use rand::seq::SliceRandom;
use rand::Rng;

/// Candidate tours of one generation
pub type Population = Vec<Tour>;

/// Number of draws per tournament
pub const DEFAULT_TOURNAMENT_SIZE: usize = 5;

/// Probability that a child is mutated
pub const DEFAULT_MUTATION_RATE: f64 = 0.1;

/// Marker for child positions not yet filled by crossover
const EMPTY: usize = usize::MAX;

/// Build `size` tours, each an independent random shuffle of `0..num_cities`.
pub fn initialize_population<R: Rng + ?Sized>(
    size: usize,
    num_cities: usize,
    rng: &mut R,
) -> Population {
    let identity: Tour = (0..num_cities).collect();

    (0..size)
        .map(|_| {
            let mut tour = identity.clone();
            tour.shuffle(rng);
            tour
        })
        .collect()
}

/// Tournament selection.
///
/// Draws `tournament_size` tours uniformly with replacement and returns a copy
/// of the shortest one. Ties keep the first tour drawn.
///
/// # Panics
/// Panics if the population is empty or `tournament_size` is zero.
pub fn tournament_select<R: Rng + ?Sized>(
    population: &[Tour],
    cities: &[City],
    tournament_size: usize,
    rng: &mut R,
) -> Tour {
    assert!(!population.is_empty(), "population must not be empty");
    assert!(tournament_size > 0, "tournament size must be positive");

    let mut best_idx = rng.gen_range(0..population.len());
    let mut best_distance = tour_distance(&population[best_idx], cities);

    for _ in 1..tournament_size {
        let idx = rng.gen_range(0..population.len());
        let candidate_distance = tour_distance(&population[idx], cities);
        if candidate_distance < best_distance {
            best_idx = idx;
            best_distance = candidate_distance;
        }
    }

    population[best_idx].clone()
}

/// Order Crossover (OX) with a random segment.
///
/// Picks `start` and `end` uniformly in `0..n` (swapped so that
/// `start <= end`) and delegates to [`order_crossover_segment`].
///
/// # Panics
/// Panics if the parents are empty or have different lengths.
pub fn order_crossover<R: Rng + ?Sized>(parent1: &[usize], parent2: &[usize], rng: &mut R) -> Tour {
    assert_eq!(parent1.len(), parent2.len(), "parents must have equal length");
    assert!(!parent1.is_empty(), "parents must not be empty");

    let n = parent1.len();
    let mut start = rng.gen_range(0..n);
    let mut end = rng.gen_range(0..n);
    if start > end {
        std::mem::swap(&mut start, &mut end);
    }

    order_crossover_segment(parent1, parent2, start, end)
}

/// Order Crossover (OX) over the inclusive segment `[start, end]`.
///
/// 1. Copy `parent1[start..=end]` to the same positions of the child
/// 2. Walk `parent2` left to right; every city not yet in the child goes to
///    the next empty slot. The slot pointer starts at 0 and only moves forward.
///
/// Membership is tracked with a presence table indexed by city, so the
/// whole operator is O(n).
///
/// # Panics
/// Panics if the parents differ in length or the segment is out of bounds.
pub fn order_crossover_segment(
    parent1: &[usize],
    parent2: &[usize],
    start: usize,
    end: usize,
) -> Tour {
    let n = parent1.len();
    assert_eq!(n, parent2.len(), "parents must have equal length");
    assert!(
        start <= end && end < n,
        "segment [{}, {}] out of bounds for {} cities",
        start,
        end,
        n
    );

    let mut child = vec![EMPTY; n];
    let mut present = vec![false; n];

    for i in start..=end {
        child[i] = parent1[i];
        present[parent1[i]] = true;
    }

    let mut slot = 0;
    for &city in parent2 {
        if present[city] {
            continue;
        }
        while child[slot] != EMPTY {
            slot += 1;
        }
        child[slot] = city;
        present[city] = true;
    }

    child
}

/// Swap mutation.
///
/// With probability `rate`, swaps the cities at two positions drawn
/// independently (they may coincide). Returns whether the mutation fired.
pub fn swap_mutation<R: Rng + ?Sized>(tour: &mut [usize], rate: f64, rng: &mut R) -> bool {
    if tour.is_empty() || !rng.gen_bool(rate) {
        return false;
    }

    let i = rng.gen_range(0..tour.len());
    let j = rng.gen_range(0..tour.len());
    tour.swap(i, j);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::is_permutation;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn line_cities(n: usize) -> Vec<City> {
        (0..n).map(|i| City::new(i as f64, 0.0)).collect()
    }

    fn parents(max_cities: usize) -> impl Strategy<Value = (Vec<usize>, Vec<usize>)> {
        (1..max_cities).prop_flat_map(|n| {
            let identity: Vec<usize> = (0..n).collect();
            (
                Just(identity.clone()).prop_shuffle(),
                Just(identity).prop_shuffle(),
            )
        })
    }

    #[test]
    fn test_single_tour_population() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let population = initialize_population(1, 5, &mut rng);

        assert_eq!(population.len(), 1);
        assert!(is_permutation(&population[0], 5));
    }

    #[test]
    fn test_population_is_reproducible() {
        let a = initialize_population(20, 8, &mut ChaCha8Rng::seed_from_u64(3));
        let b = initialize_population(20, 8, &mut ChaCha8Rng::seed_from_u64(3));

        assert_eq!(a, b);
        assert!(a.iter().all(|tour| is_permutation(tour, 8)));
    }

    #[test]
    fn test_tournament_prefers_shorter_tour() {
        let cities = line_cities(6);
        let best = vec![0, 1, 2, 3, 4, 5];
        let worst = vec![0, 5, 1, 4, 2, 3];
        let population = vec![worst, best.clone()];
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let winner = tournament_select(&population, &cities, 64, &mut rng);
        assert_eq!(winner, best);
    }

    #[test]
    fn test_tournament_of_one_returns_a_member() {
        let cities = line_cities(4);
        let population = initialize_population(10, 4, &mut ChaCha8Rng::seed_from_u64(5));
        let mut rng = ChaCha8Rng::seed_from_u64(6);

        let winner = tournament_select(&population, &cities, 1, &mut rng);
        assert!(population.contains(&winner));
    }

    #[test]
    #[should_panic(expected = "population must not be empty")]
    fn test_tournament_rejects_empty_population() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        tournament_select(&[], &line_cities(3), 5, &mut rng);
    }

    #[test]
    fn test_crossover_single_position_segment() {
        let p1 = vec![0, 1, 2, 3, 4];
        let p2 = vec![4, 3, 2, 1, 0];

        let child = order_crossover_segment(&p1, &p2, 2, 2);

        assert_eq!(child[2], 2);
        assert!(is_permutation(&child, 5));
        assert_eq!(child, vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn test_crossover_fills_in_donor_order() {
        let p1 = vec![0, 1, 2, 3, 4, 5, 6, 7];
        let p2 = vec![7, 6, 5, 4, 3, 2, 1, 0];

        let child = order_crossover_segment(&p1, &p2, 2, 4);
        assert_eq!(child, vec![7, 6, 2, 3, 4, 5, 1, 0]);
    }

    #[test]
    fn test_crossover_full_segment_copies_first_parent() {
        let p1 = vec![3, 1, 0, 2];
        let p2 = vec![0, 1, 2, 3];

        assert_eq!(order_crossover_segment(&p1, &p2, 0, 3), p1);
    }

    #[test]
    fn test_crossover_single_city() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        assert_eq!(order_crossover(&[0], &[0], &mut rng), vec![0]);
    }

    #[test]
    #[should_panic(expected = "equal length")]
    fn test_crossover_rejects_mismatched_parents() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        order_crossover(&[0, 1], &[0, 1, 2], &mut rng);
    }

    #[test]
    fn test_mutation_rate_zero_is_noop() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut tour = vec![4, 2, 0, 3, 1];

        for _ in 0..100 {
            assert!(!swap_mutation(&mut tour, 0.0, &mut rng));
        }
        assert_eq!(tour, vec![4, 2, 0, 3, 1]);
    }

    #[test]
    fn test_untriggered_mutation_leaves_tour_unchanged() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let mut tour: Vec<usize> = (0..12).collect();
        let mut untriggered = 0;

        for _ in 0..1_000 {
            let before = tour.clone();
            if swap_mutation(&mut tour, DEFAULT_MUTATION_RATE, &mut rng) {
                assert!(is_permutation(&tour, 12));
            } else {
                assert_eq!(tour, before);
                untriggered += 1;
            }
        }
        assert!(untriggered > 0);
    }

    #[test]
    fn test_mutation_rate_is_roughly_respected() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut tour: Vec<usize> = (0..10).collect();

        let fired = (0..10_000)
            .filter(|_| swap_mutation(&mut tour, DEFAULT_MUTATION_RATE, &mut rng))
            .count();
        assert!((800..1200).contains(&fired), "fired {} times", fired);
    }

    proptest! {
        #[test]
        fn crossover_yields_permutation((p1, p2) in parents(16), seed in any::<u64>()) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let child = order_crossover(&p1, &p2, &mut rng);
            prop_assert!(is_permutation(&child, p1.len()));
        }

        #[test]
        fn crossover_keeps_segment((p1, p2) in parents(16), a in any::<usize>(), b in any::<usize>()) {
            let n = p1.len();
            let (start, end) = if a % n <= b % n { (a % n, b % n) } else { (b % n, a % n) };
            let child = order_crossover_segment(&p1, &p2, start, end);
            prop_assert_eq!(&child[start..=end], &p1[start..=end]);
            prop_assert!(is_permutation(&child, n));
        }

        #[test]
        fn mutation_changes_at_most_two_positions((tour, _) in parents(16), seed in any::<u64>()) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut mutated = tour.clone();
            let fired = swap_mutation(&mut mutated, 1.0, &mut rng);

            prop_assert!(fired);
            prop_assert!(is_permutation(&mutated, tour.len()));
            let changed = tour.iter().zip(&mutated).filter(|(a, b)| a != b).count();
            prop_assert!(changed == 0 || changed == 2);
        }
    }
}
