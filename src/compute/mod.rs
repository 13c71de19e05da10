//! Compute module - Layout geometry, scoring and evolutionary search.

mod collage;

pub mod evolution;
pub mod layout;

pub use collage::*;
pub use evolution::{
    EvolutionError, EvolutionPhase, GenerationProgress, GeneticAlgorithm, GeneticOperators,
    GenomeRng, RunSettings, ScoredIndividual, SearchOutcome, StopReason,
};
pub use layout::{
    LayoutError, LayoutSolution, Placement, RenderPlan, SlicingDirection, SlicingTree,
};
