//! Generic genetic algorithm driving any genome type through
//! select / cross / mutate / score generations.

use std::time::Instant;

use rand::Rng;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::genome::{GeneticOperators, GenomeRng, ScoredIndividual, sort_by_score};

/// Errors raised when a search cannot be started.
#[derive(Debug, Error)]
pub enum EvolutionError {
    #[error("Initial population must not be empty")]
    EmptyPopulation,
    #[error("Mutation probability must be within [0, 1], got {0}")]
    InvalidMutationProbability(f64),
    #[error("Failed to build worker pool: {0}")]
    WorkerPool(#[from] ThreadPoolBuildError),
}

/// Parameters of a single [`GeneticAlgorithm::run`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSettings {
    pub num_generations: usize,
    pub mutation_probability: f64,
    /// Stop as soon as the best-ever cost is at or below this value.
    pub cost_threshold: f64,
    /// Breed the slots of a generation concurrently.
    pub parallel: bool,
    /// Size of a dedicated worker pool; 0 uses the global rayon pool.
    pub parallel_workers: usize,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            num_generations: 1000,
            mutation_probability: 0.1,
            cost_threshold: 0.0,
            parallel: true,
            parallel_workers: 0,
        }
    }
}

/// Current state of the run loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvolutionPhase {
    /// Initial population scored, no generation bred yet.
    Initializing,
    Evolving,
    Terminated,
}

/// Reason the run loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// All requested generations were bred.
    MaxGenerations,
    /// Best-ever cost reached the cost threshold.
    CostThresholdReached,
}

/// Snapshot reported to the progress callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationProgress {
    pub generation: usize,
    pub total_generations: usize,
    /// Best-ever cost so far.
    pub best_score: f64,
    /// Best cost within the current population.
    pub generation_best: f64,
    pub improvements: usize,
    pub phase: EvolutionPhase,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct SearchOutcome<T> {
    pub best: ScoredIndividual<T>,
    pub generations: usize,
    pub improvements: usize,
    pub stop_reason: StopReason,
}

/// Genetic algorithm over genomes of type `T`, parameterized by the
/// injected [`GeneticOperators`].
///
/// Each call to [`run`](Self::run) starts from clones of the initial
/// population, so the same engine can be run repeatedly.
pub struct GeneticAlgorithm<T, O> {
    initial_population: Vec<T>,
    operators: O,
    rng: GenomeRng,
}

impl<T, O> GeneticAlgorithm<T, O>
where
    T: Send + Sync,
    O: GeneticOperators<T>,
{
    /// Create an engine. Without a seed the master RNG is seeded from entropy.
    pub fn new(
        initial_population: Vec<T>,
        operators: O,
        seed: Option<u64>,
    ) -> Result<Self, EvolutionError> {
        if initial_population.is_empty() {
            return Err(EvolutionError::EmptyPopulation);
        }
        Ok(Self {
            initial_population,
            operators,
            rng: GenomeRng::from_seed_option(seed),
        })
    }

    pub fn operators(&self) -> &O {
        &self.operators
    }

    pub fn population_size(&self) -> usize {
        self.initial_population.len()
    }

    /// Run evolution (blocking).
    pub fn run(&mut self, settings: &RunSettings) -> Result<SearchOutcome<T>, EvolutionError> {
        self.run_with_callback(settings, |_| {})
    }

    /// Run evolution with progress callback.
    ///
    /// The callback fires once after the initial population is scored and
    /// once after every bred generation.
    pub fn run_with_callback<F>(
        &mut self,
        settings: &RunSettings,
        mut callback: F,
    ) -> Result<SearchOutcome<T>, EvolutionError>
    where
        F: FnMut(&GenerationProgress),
    {
        if !(0.0..=1.0).contains(&settings.mutation_probability) {
            return Err(EvolutionError::InvalidMutationProbability(
                settings.mutation_probability,
            ));
        }
        let pool = if settings.parallel && settings.parallel_workers > 0 {
            Some(
                ThreadPoolBuilder::new()
                    .num_threads(settings.parallel_workers)
                    .build()?,
            )
        } else {
            None
        };

        let start_time = Instant::now();
        let operators = &self.operators;

        let mut population: Vec<ScoredIndividual<T>> = self
            .initial_population
            .iter()
            .map(|individual| operators.score(operators.clone_individual(individual)))
            .collect();
        sort_by_score(&mut population);

        let mut best = ScoredIndividual::new(
            population[0].score,
            operators.clone_individual(&population[0].individual),
        );
        let mut improvements = 0;

        log::info!(
            "Starting search: population {}, {} generations, initial best {:.6}",
            population.len(),
            settings.num_generations,
            best.score
        );
        callback(&GenerationProgress {
            generation: 0,
            total_generations: settings.num_generations,
            best_score: best.score,
            generation_best: best.score,
            improvements,
            phase: EvolutionPhase::Initializing,
        });

        let mut stop_reason = StopReason::MaxGenerations;
        let mut generations = 0;

        for generation in 1..=settings.num_generations {
            let seeds: Vec<u64> = (0..population.len())
                .map(|_| self.rng.next_seed())
                .collect();
            population = breed_generation(
                operators,
                &population,
                &seeds,
                settings.mutation_probability,
                settings.parallel,
                pool.as_ref(),
            );
            sort_by_score(&mut population);
            generations = generation;

            let generation_best = population[0].score;
            if generation_best < best.score {
                best = ScoredIndividual::new(
                    generation_best,
                    operators.clone_individual(&population[0].individual),
                );
                improvements += 1;
            }
            log::debug!(
                "Generation {generation}: best {:.6}, generation best {:.6}",
                best.score,
                generation_best
            );

            let reached_threshold = best.score <= settings.cost_threshold;
            let last = reached_threshold || generation == settings.num_generations;
            callback(&GenerationProgress {
                generation,
                total_generations: settings.num_generations,
                best_score: best.score,
                generation_best,
                improvements,
                phase: if last {
                    EvolutionPhase::Terminated
                } else {
                    EvolutionPhase::Evolving
                },
            });

            if reached_threshold {
                stop_reason = StopReason::CostThresholdReached;
                break;
            }
        }

        log::info!(
            "Search finished after {generations} generations in {:.3}s: best {:.6}, {improvements} improvements, {stop_reason:?}",
            start_time.elapsed().as_secs_f64(),
            best.score
        );

        Ok(SearchOutcome {
            best,
            generations,
            improvements,
            stop_reason,
        })
    }
}

/// Build a full new generation, one child per seed.
fn breed_generation<T, O>(
    operators: &O,
    population: &[ScoredIndividual<T>],
    seeds: &[u64],
    mutation_probability: f64,
    parallel: bool,
    pool: Option<&ThreadPool>,
) -> Vec<ScoredIndividual<T>>
where
    T: Send + Sync,
    O: GeneticOperators<T>,
{
    let breed = |seed: &u64| breed_child(operators, population, *seed, mutation_probability);

    if !parallel {
        return seeds.iter().map(&breed).collect();
    }
    match pool {
        Some(pool) => pool.install(|| seeds.par_iter().map(&breed).collect()),
        None => seeds.par_iter().map(&breed).collect(),
    }
}

fn breed_child<T, O>(
    operators: &O,
    population: &[ScoredIndividual<T>],
    seed: u64,
    mutation_probability: f64,
) -> ScoredIndividual<T>
where
    O: GeneticOperators<T>,
{
    let mut rng = GenomeRng::new(seed);
    let mother = operators.select(population, &mut rng);
    let father = operators.select(population, &mut rng);
    let child = operators.cross((mother, father), &mut rng);
    let child = if rng.gen_bool(mutation_probability) {
        operators.mutate(child, &mut rng)
    } else {
        child
    };
    operators.score(child)
}
