//! Genome-level building blocks shared by every search: the seeded random
//! source, the operator trait and scored individuals.

use std::cmp::Ordering;

use rand::prelude::*;

/// Random number generator wrapper for genome operations.
///
/// Every operator that needs randomness takes one of these explicitly, so a
/// run is reproducible from a single seed.
#[derive(Debug, Clone)]
pub struct GenomeRng {
    rng: StdRng,
}

impl GenomeRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create with random seed.
    pub fn random() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Create from an optional seed, falling back to entropy.
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::new(seed),
            None => Self::random(),
        }
    }

    /// Generate next u64 for seeding child RNGs.
    pub fn next_seed(&mut self) -> u64 {
        self.rng.r#gen()
    }
}

impl RngCore for GenomeRng {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

/// An individual paired with its cost. Lower cost is better.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredIndividual<T> {
    pub score: f64,
    pub individual: T,
}

impl<T> ScoredIndividual<T> {
    pub fn new(score: f64, individual: T) -> Self {
        Self { score, individual }
    }

    /// Ascending cost order; NaN sorts last.
    pub fn cmp_by_score(&self, other: &Self) -> Ordering {
        self.score.total_cmp(&other.score)
    }
}

/// Sort a population by ascending cost, best first.
pub fn sort_by_score<T>(population: &mut [ScoredIndividual<T>]) {
    population.sort_by(ScoredIndividual::cmp_by_score);
}

/// The strategies a [`GeneticAlgorithm`](super::GeneticAlgorithm) is built from.
///
/// Implementations must not fail and must not mutate anything reachable
/// from the population passed to `select`; `cross` has to return a freshly
/// owned individual.
pub trait GeneticOperators<T>: Sync {
    /// Pick a parent from a population sorted by ascending cost.
    fn select<'a>(&self, population: &'a [ScoredIndividual<T>], rng: &mut GenomeRng) -> &'a T;

    /// Produce a child from two parents.
    fn cross(&self, parents: (&T, &T), rng: &mut GenomeRng) -> T;

    /// Mutate an owned child.
    fn mutate(&self, individual: T, rng: &mut GenomeRng) -> T;

    /// Compute the cost of an individual.
    fn score(&self, individual: T) -> ScoredIndividual<T>;

    /// Deep copy that shares no mutable state with the original.
    fn clone_individual(&self, individual: &T) -> T;
}
