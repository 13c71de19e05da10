//! Collage layout - Arrange images on a canvas with binary slicing trees.
//!
//! This crate searches for a gapless collage layout that keeps every
//! image's aspect ratio, emphasizes feature images and never upscales an
//! image beyond a configured factor. Candidate layouts are binary slicing
//! trees evolved by a genetic algorithm.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Configuration and source image types
//! - `compute`: Slicing tree geometry, scoring, tree operators and the
//!   generic genetic algorithm
//!
//! # Example
//!
//! ```rust,no_run
//! use collage_layout::{
//!     compute::CollageRunner,
//!     schema::{CollageConfig, Dimension, SourceImage},
//! };
//!
//! let images = vec![
//!     SourceImage::new("a.jpg", Dimension::new(4000.0, 3000.0), 1),
//!     SourceImage::new("b.jpg", Dimension::new(3000.0, 4000.0), 1),
//!     SourceImage::new("c.jpg", Dimension::new(1080.0, 1080.0), 2),
//! ];
//! let config = CollageConfig::default().with_weight_sum(&images);
//!
//! let outcome = CollageRunner::run(&config, &images).unwrap();
//! println!("Best cost: {:.6}", outcome.best.score);
//! for placement in outcome.best.individual.placements() {
//!     println!("{:?} at ({}, {})", placement.file_name, placement.x, placement.y);
//! }
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::{CollageError, CollageRunner, LayoutSolution};
pub use schema::{CollageConfig, SourceImage};
