//! A scored slicing tree: the genome of the collage search.

use std::fmt;
use std::sync::{Arc, OnceLock};

use rand::Rng;
use rand::seq::SliceRandom;

use crate::schema::{CollageConfig, SourceImage};

use super::builder::{LayoutError, generate_tree};
use super::fitness::{CostBreakdown, evaluate};
use super::node::NodeId;
use super::tree::SlicingTree;

/// Flat pre-order lists of a tree's node ids.
#[derive(Debug, Clone)]
struct NodeLists {
    layout: Vec<NodeId>,
    image: Vec<NodeId>,
}

/// Layout candidate: a slicing tree, the configuration it is scored against
/// and its last computed cost (0.0 until scored).
#[derive(Debug, Clone)]
pub struct LayoutSolution {
    tree: SlicingTree,
    config: Arc<CollageConfig>,
    score: f64,
    // Valid for the lifetime of `tree`: its shape never changes.
    node_lists: OnceLock<NodeLists>,
}

impl LayoutSolution {
    pub fn new(tree: SlicingTree, config: Arc<CollageConfig>) -> Self {
        Self {
            tree,
            config,
            score: 0.0,
            node_lists: OnceLock::new(),
        }
    }

    /// Random, unscored layout with one leaf per image.
    pub fn generate<R: Rng + ?Sized>(
        images: &[Arc<SourceImage>],
        config: Arc<CollageConfig>,
        rng: &mut R,
    ) -> Result<Self, LayoutError> {
        Ok(Self::new(generate_tree(images, rng)?, config))
    }

    pub fn tree(&self) -> &SlicingTree {
        &self.tree
    }

    /// Mutable tree access for operators that swap node fields.
    pub(crate) fn tree_mut(&mut self) -> &mut SlicingTree {
        &mut self.tree
    }

    pub fn config(&self) -> &CollageConfig {
        &self.config
    }

    /// Cost from the most recent [`score`](Self::score) call.
    pub fn last_score(&self) -> f64 {
        self.score
    }

    #[cfg(test)]
    pub(crate) fn set_score(&mut self, score: f64) {
        self.score = score;
    }

    fn node_lists(&self) -> &NodeLists {
        cached_node_lists(&self.node_lists, &self.tree)
    }

    /// Layout node ids in pre-order.
    pub fn layout_nodes(&self) -> &[NodeId] {
        &self.node_lists().layout
    }

    /// Image node ids in pre-order.
    pub fn image_nodes(&self) -> &[NodeId] {
        &self.node_lists().image
    }

    /// Recompute geometry and cost, returning the individual terms.
    pub fn score_breakdown(&mut self) -> CostBreakdown {
        let lists = cached_node_lists(&self.node_lists, &self.tree);
        let breakdown = evaluate(&mut self.tree, &lists.image, &self.config);
        self.score = breakdown.total;
        breakdown
    }

    /// Recompute geometry and cost.
    pub fn score(&mut self) -> f64 {
        self.score_breakdown().total
    }

    /// Swap the directions of two random layout nodes or, with equal
    /// probability, the images of two random leaves. Picking the same node
    /// twice is a no-op.
    pub fn mutate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let ids = if rng.gen_bool(0.5) {
            self.layout_nodes()
        } else {
            self.image_nodes()
        };
        let (Some(&a), Some(&b)) = (ids.choose(rng), ids.choose(rng)) else {
            return;
        };

        if self.tree.node(a).is_image() {
            self.tree.swap_source_images(a, b);
        } else {
            self.tree.swap_slicing_directions(a, b);
        }
    }
}

fn cached_node_lists<'a>(cell: &'a OnceLock<NodeLists>, tree: &SlicingTree) -> &'a NodeLists {
    cell.get_or_init(|| NodeLists {
        layout: tree.layout_node_ids(),
        image: tree.image_node_ids(),
    })
}

impl fmt::Display for LayoutSolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::evolution::GenomeRng;
    use crate::compute::layout::SlicingDirection;
    use crate::schema::Dimension;
    use proptest::prelude::*;

    fn images(n: usize) -> Vec<Arc<SourceImage>> {
        (0..n)
            .map(|i| {
                let width = 120.0 + 45.0 * (i % 4) as f64;
                let height = 90.0 + 30.0 * (i % 3) as f64;
                Arc::new(SourceImage::new(format!("{i}.jpg"), Dimension::new(width, height), 1))
            })
            .collect()
    }

    fn config(n: u32) -> Arc<CollageConfig> {
        Arc::new(CollageConfig {
            target_width: 400,
            target_height: 400,
            desired_relative_weight_sum: n,
            ..Default::default()
        })
    }

    #[test]
    fn test_generated_solution_is_unscored() {
        let images = vec![
            Arc::new(SourceImage::new("1.jpg", Dimension::new(100.0, 100.0), 1)),
            Arc::new(SourceImage::new("2.jpg", Dimension::new(200.0, 300.0), 1)),
            Arc::new(SourceImage::new("3.jpg", Dimension::new(300.0, 100.0), 1)),
        ];
        let solution = LayoutSolution::generate(&images, config(3), &mut GenomeRng::new(3)).unwrap();

        assert_eq!(solution.layout_nodes().len(), 2);
        assert_eq!(solution.image_nodes().len(), 3);
        assert_eq!(solution.last_score(), 0.0);
    }

    #[test]
    fn test_score_is_pure() {
        let mut solution = LayoutSolution::generate(&images(6), config(6), &mut GenomeRng::new(8)).unwrap();
        let first = solution.score();
        let second = solution.score();

        assert!(first > 0.0);
        assert_eq!(first, second);
        assert_eq!(solution.last_score(), first);
    }

    #[test]
    fn test_score_two_image_layout() {
        let tree = SlicingTree::join(
            SlicingDirection::Horizontal,
            SlicingTree::leaf(SourceImage::new("a.jpg", Dimension::new(300.0, 200.0), 1)),
            SlicingTree::leaf(SourceImage::new("b.jpg", Dimension::new(400.0, 400.0), 1)),
        );
        let mut solution = LayoutSolution::new(tree, config(2));
        let breakdown = solution.score_breakdown();

        // 240x160 and 240x240 inside a 400x400 canvas
        assert!((breakdown.uncovered_fraction - 0.4).abs() < 1e-9);
        assert!((breakdown.total - 2.6216226).abs() < 1e-6);
        assert_eq!(breakdown.off_center, 0.0);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut original = LayoutSolution::generate(&images(8), config(8), &mut GenomeRng::new(21)).unwrap();
        original.score();
        let before = original.to_string();

        let mut copy = original.clone();
        let mut rng = GenomeRng::new(0);
        for _ in 0..50 {
            copy.mutate(&mut rng);
        }
        copy.score();

        assert_eq!(original.to_string(), before);
    }

    #[test]
    fn test_mutation_changes_something_eventually() {
        let mut solution = LayoutSolution::generate(&images(8), config(8), &mut GenomeRng::new(13)).unwrap();
        solution.score();
        let before = solution.to_string();

        let mut rng = GenomeRng::new(99);
        let mut changed = false;
        for _ in 0..50 {
            solution.mutate(&mut rng);
            solution.score();
            if solution.to_string() != before {
                changed = true;
                break;
            }
        }
        assert!(changed);
    }

    proptest! {
        #[test]
        fn mutation_preserves_shape_and_images(n in 2usize..20, seed in any::<u64>()) {
            let images = images(n);
            let mut solution = LayoutSolution::generate(&images, config(n as u32), &mut GenomeRng::new(seed)).unwrap();
            let mut before: Vec<String> = solution.tree().source_images().map(|s| s.base_name()).collect();
            let layout_before = solution.layout_nodes().to_vec();

            let mut rng = GenomeRng::new(seed.wrapping_add(1));
            for _ in 0..10 {
                solution.mutate(&mut rng);
            }

            let mut after: Vec<String> = solution.tree().source_images().map(|s| s.base_name()).collect();
            before.sort();
            after.sort();
            prop_assert_eq!(before, after);
            prop_assert_eq!(solution.tree().layout_node_ids(), layout_before);
        }
    }
}
