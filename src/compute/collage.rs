//! Collage search entry point: precondition checks, initial population and
//! the tree operators plugged into the generic engine.

use std::sync::Arc;
use std::time::Instant;

use rand::Rng;
use thiserror::Error;

use crate::schema::{CollageConfig, ConfigError, SourceImage};

use super::evolution::{
    EvolutionError, GenerationProgress, GeneticAlgorithm, GeneticOperators, GenomeRng,
    RunSettings, ScoredIndividual, SearchOutcome, from_fittest_part_selection,
};
use super::layout::{LayoutError, LayoutSolution, cross_breed};

/// Errors that reject a collage run before any search happens.
#[derive(Debug, Error)]
pub enum CollageError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Failed to build layout: {0}")]
    Layout(#[from] LayoutError),
    #[error("Search failed: {0}")]
    Evolution(#[from] EvolutionError),
    #[error("Must have at least 2 images to create a collage, got {0}")]
    TooFewImages(usize),
    #[error("Image '{name}' has invalid dimension {width}x{height}")]
    InvalidImageDimension { name: String, width: f64, height: f64 },
    #[error("Image '{0}' must have a positive desired relative weight")]
    InvalidImageWeight(String),
    #[error("Sum of desired relative weights must be positive")]
    ZeroWeightSum,
}

/// Slicing tree strategies for the genetic algorithm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOperators {
    /// Parents are drawn from this leading fraction of the sorted population.
    pub selection_fraction: f64,
}

impl GeneticOperators<LayoutSolution> for LayoutOperators {
    fn select<'a>(
        &self,
        population: &'a [ScoredIndividual<LayoutSolution>],
        rng: &mut GenomeRng,
    ) -> &'a LayoutSolution {
        from_fittest_part_selection(population, self.selection_fraction, rng)
    }

    fn cross(&self, parents: (&LayoutSolution, &LayoutSolution), rng: &mut GenomeRng) -> LayoutSolution {
        cross_breed(parents, rng)
    }

    fn mutate(&self, mut individual: LayoutSolution, rng: &mut GenomeRng) -> LayoutSolution {
        individual.mutate(rng);
        individual
    }

    fn score(&self, mut individual: LayoutSolution) -> ScoredIndividual<LayoutSolution> {
        let score = individual.score();
        ScoredIndividual::new(score, individual)
    }

    fn clone_individual(&self, individual: &LayoutSolution) -> LayoutSolution {
        individual.clone()
    }
}

/// Engine settings taken from a collage configuration.
pub fn run_settings(config: &CollageConfig) -> RunSettings {
    RunSettings {
        num_generations: config.num_generations,
        mutation_probability: config.mutation_probability,
        cost_threshold: config.cost_threshold,
        parallel: config.parallel,
        parallel_workers: config.parallel_workers,
    }
}

/// Runs the layout search for one set of images.
pub struct CollageRunner;

impl CollageRunner {
    /// Find a layout for `images` on the configured canvas.
    pub fn run(
        config: &CollageConfig,
        images: &[SourceImage],
    ) -> Result<SearchOutcome<LayoutSolution>, CollageError> {
        Self::run_with_callback(config, images, |_| {})
    }

    /// Find a layout, reporting progress after every generation.
    pub fn run_with_callback<F>(
        config: &CollageConfig,
        images: &[SourceImage],
        callback: F,
    ) -> Result<SearchOutcome<LayoutSolution>, CollageError>
    where
        F: FnMut(&GenerationProgress),
    {
        config.validate()?;
        validate_images(config, images)?;

        let start_time = Instant::now();
        log::info!(
            "Start running {} images on a {}x{} canvas: population {}, {} generations",
            images.len(),
            config.target_width,
            config.target_height,
            config.population_size,
            config.num_generations
        );

        let config = Arc::new(config.clone());
        let images: Vec<Arc<SourceImage>> = images.iter().cloned().map(Arc::new).collect();

        let mut rng = GenomeRng::from_seed_option(config.random_seed);
        let population = initial_population(&images, &config, &mut rng)?;

        let operators = LayoutOperators {
            selection_fraction: config.selection_fraction,
        };
        let mut algorithm = GeneticAlgorithm::new(population, operators, Some(rng.next_seed()))?;
        let outcome = algorithm.run_with_callback(&run_settings(&config), callback)?;

        log::info!(
            "Best collage for {} images after {} generations and {:.3}s has cost {:.6}",
            images.len(),
            outcome.generations,
            start_time.elapsed().as_secs_f64(),
            outcome.best.score
        );
        Ok(outcome)
    }
}

/// Reject inputs the search cannot handle.
pub fn validate_images(config: &CollageConfig, images: &[SourceImage]) -> Result<(), CollageError> {
    if images.len() < 2 {
        return Err(CollageError::TooFewImages(images.len()));
    }
    for image in images {
        let dimension = image.dimension;
        if !(dimension.width > 0.0 && dimension.height > 0.0) {
            return Err(CollageError::InvalidImageDimension {
                name: image.file_name.display().to_string(),
                width: dimension.width,
                height: dimension.height,
            });
        }
        if image.desired_relative_weight == 0 {
            return Err(CollageError::InvalidImageWeight(
                image.file_name.display().to_string(),
            ));
        }
    }
    if config.desired_relative_weight_sum == 0 {
        return Err(CollageError::ZeroWeightSum);
    }
    Ok(())
}

/// One random, unscored layout per population slot.
pub fn initial_population<R: Rng + ?Sized>(
    images: &[Arc<SourceImage>],
    config: &Arc<CollageConfig>,
    rng: &mut R,
) -> Result<Vec<LayoutSolution>, LayoutError> {
    (0..config.population_size)
        .map(|_| LayoutSolution::generate(images, Arc::clone(config), &mut *rng))
        .collect()
}
