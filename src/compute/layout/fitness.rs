//! Layout cost function.
//!
//! The cost is a weighted sum of three terms, lower is better:
//!
//! - the fraction of the canvas left uncovered,
//! - the per-image mismatch between desired and realized share of the canvas,
//! - the summed off-center distance of feature images.

use serde::{Deserialize, Serialize};

use crate::schema::CollageConfig;

use super::node::NodeId;
use super::tree::SlicingTree;

/// Individual terms of a layout's cost, before and after weighting.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// `1 - covered / canvas area`.
    pub uncovered_fraction: f64,
    /// Sum of per-image size mismatch costs.
    pub size_mismatch: f64,
    /// Sum of feature image off-center distances.
    pub off_center: f64,
    /// Weighted total.
    pub total: f64,
}

/// Penalty for an image that realizes `fulfillment` times its desired
/// share of the canvas.
///
/// Undersized images are punished harder than oversized ones, and feature
/// images harder than ordinary ones. The curve is strictly decreasing below
/// 1 and strictly increasing above it.
pub fn relative_size_mismatch_cost(fulfillment: f64, is_feature: bool) -> f64 {
    match (is_feature, fulfillment < 1.0) {
        (true, true) => 2.5 * (1.0 / fulfillment).powf(2.2),
        (true, false) => 0.8 * fulfillment.powf(1.6),
        (false, true) => 0.4 * (1.0 / fulfillment).powf(1.8),
        (false, false) => 0.2 * fulfillment.powf(1.5),
    }
}

/// Propagate geometry through `tree` for the configured canvas and compute
/// its cost. `image_nodes` lists the leaves to account for.
///
/// Deterministic: the same tree and config always give the same cost.
pub fn evaluate(tree: &mut SlicingTree, image_nodes: &[NodeId], config: &CollageConfig) -> CostBreakdown {
    tree.compute_aspect_ratio();
    tree.compute_dimensions(config.canvas_dimension(), config, 0.0, 0.0);

    let canvas_area = config.canvas_area();
    let weight_sum = f64::from(config.desired_relative_weight_sum);

    let mut covered_area = 0.0;
    let mut size_mismatch = 0.0;
    let mut off_center = 0.0;

    for image in image_nodes.iter().filter_map(|&id| tree.image(id)) {
        let area = image.dimension.area();
        covered_area += area;

        let desired_share = f64::from(image.source.desired_relative_weight) / weight_sum;
        let actual_share = area / canvas_area;
        size_mismatch +=
            relative_size_mismatch_cost(actual_share / desired_share, image.source.is_feature());

        off_center += image.off_center_distance;
    }

    let uncovered_fraction = 1.0 - covered_area / canvas_area;
    let factors = &config.scoring_factors;
    CostBreakdown {
        uncovered_fraction,
        size_mismatch,
        off_center,
        total: factors.canvas_coverage * uncovered_fraction
            + factors.relative_image_size * size_mismatch
            + factors.centered_feature * off_center,
    }
}
