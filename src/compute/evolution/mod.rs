//! Generic evolutionary search.
//!
//! This module knows nothing about collages. It evolves any genome type
//! through the strategies supplied by a [`GeneticOperators`] implementation.
//!
//! # Overview
//!
//! - **Genome** (`genome`): seeded random source, scored individuals and the
//!   operator trait
//! - **Selection** (`selection`): parent selection strategies
//! - **Search** (`search`): the generation loop, progress reporting and
//!   termination
//!
//! # Example
//!
//! ```rust
//! use collage_layout::compute::evolution::{
//!     GeneticAlgorithm, GeneticOperators, GenomeRng, RunSettings, ScoredIndividual,
//!     from_fittest_part_selection,
//! };
//! use rand::Rng;
//!
//! struct Minimize;
//!
//! impl GeneticOperators<i64> for Minimize {
//!     fn select<'a>(&self, population: &'a [ScoredIndividual<i64>], rng: &mut GenomeRng) -> &'a i64 {
//!         from_fittest_part_selection(population, 0.5, rng)
//!     }
//!     fn cross(&self, parents: (&i64, &i64), _rng: &mut GenomeRng) -> i64 {
//!         (parents.0 + parents.1) / 2
//!     }
//!     fn mutate(&self, individual: i64, rng: &mut GenomeRng) -> i64 {
//!         individual + rng.gen_range(-3..=3)
//!     }
//!     fn score(&self, individual: i64) -> ScoredIndividual<i64> {
//!         ScoredIndividual::new(individual.abs() as f64, individual)
//!     }
//!     fn clone_individual(&self, individual: &i64) -> i64 {
//!         *individual
//!     }
//! }
//!
//! let mut engine = GeneticAlgorithm::new(vec![40, -25, 17, 90], Minimize, Some(1)).unwrap();
//! let outcome = engine
//!     .run(&RunSettings { num_generations: 50, mutation_probability: 0.5, ..Default::default() })
//!     .unwrap();
//! assert!(outcome.best.score <= 17.0);
//! ```

mod genome;
mod search;
mod selection;

pub use genome::{GeneticOperators, GenomeRng, ScoredIndividual, sort_by_score};
pub use search::{
    EvolutionError, EvolutionPhase, GenerationProgress, GeneticAlgorithm, RunSettings,
    SearchOutcome, StopReason,
};
pub use selection::{fittest_part_len, from_fittest_part_selection};
