//! Binary slicing tree layouts.
//!
//! A layout is a binary tree whose leaves hold images and whose internal
//! nodes split their rectangle either side by side ([`SlicingDirection::Vertical`])
//! or stacked ([`SlicingDirection::Horizontal`]). Aspect ratios propagate
//! bottom-up, dimensions top-down.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use collage_layout::compute::layout::{SlicingDirection, SlicingTree};
//! use collage_layout::schema::{CollageConfig, Dimension, SourceImage};
//!
//! let mut tree = SlicingTree::join(
//!     SlicingDirection::Horizontal,
//!     SlicingTree::leaf(SourceImage::new("a.jpg", Dimension::new(300.0, 200.0), 1)),
//!     SlicingTree::leaf(SourceImage::new("b.jpg", Dimension::new(400.0, 400.0), 1)),
//! );
//! let aspect_ratio = tree.compute_aspect_ratio();
//! assert!((aspect_ratio - 0.6).abs() < 1e-9);
//!
//! tree.compute_dimensions(Dimension::new(200.0, 200.0), &CollageConfig::default(), 0.0, 0.0);
//! assert_eq!(tree.node(tree.root()).dimension().to_string(), "120x200");
//! ```

mod builder;
mod crossover;
mod fitness;
mod node;
mod placement;
mod solution;
mod tree;

pub use builder::{LayoutError, PartialLayoutTree, generate_tree};
pub use crossover::{CROSSOVER_MIN_IMAGE_NODES, cross_breed};
pub use fitness::{CostBreakdown, evaluate, relative_size_mismatch_cost};
pub use node::{ImageNode, LayoutNode, Node, NodeId, SlicingDirection};
pub use placement::{Placement, RenderPlan};
pub use solution::LayoutSolution;
pub use tree::SlicingTree;
