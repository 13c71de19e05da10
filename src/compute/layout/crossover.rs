//! Subtree direction exchange between two layouts.

use rand::Rng;
use rand::seq::IteratorRandom;

use super::node::{NodeId, SlicingDirection};
use super::solution::LayoutSolution;

/// Subtrees with at most this many leaves never take part in crossover.
pub const CROSSOVER_MIN_IMAGE_NODES: usize = 3;

/// Cross two scored layouts.
///
/// Picks a random layout node of the mother with more than
/// [`CROSSOVER_MIN_IMAGE_NODES`] leaves and a random layout node of the
/// father with the same leaf count. The child is a clone of the parent with
/// the lower score (the father on ties) whose matched subtree takes over the
/// other parent's slicing directions, node by node in pre-order. Image
/// placement is always inherited from the fitter parent. Neither parent is
/// modified. When both parents are the same layout, the two matched subtrees
/// of the child swap their directions.
pub fn cross_breed<R: Rng + ?Sized>(
    parents: (&LayoutSolution, &LayoutSolution),
    rng: &mut R,
) -> LayoutSolution {
    let (mother, father) = parents;
    let mother_is_fitter = mother.last_score() < father.last_score();
    let mut child = if mother_is_fitter {
        mother.clone()
    } else {
        father.clone()
    };

    let Some((mother_node, father_node)) = matching_subtrees(mother, father, rng) else {
        return child;
    };
    let (donor, donor_node, target_node) = if mother_is_fitter {
        (father, father_node, mother_node)
    } else {
        (mother, mother_node, father_node)
    };

    let donor_ids = donor.tree().subtree_layout_node_ids(donor_node);
    let target_ids = child.tree().subtree_layout_node_ids(target_node);
    let donor_directions = subtree_directions(donor, &donor_ids);
    let target_directions = subtree_directions(&child, &target_ids);

    let tree = child.tree_mut();
    for (&id, &direction) in target_ids.iter().zip(&donor_directions) {
        tree.set_slicing_direction(id, direction);
    }
    // A parent crossed with itself exchanges directions between two of its
    // own subtrees, both of which live in the child.
    if std::ptr::eq(mother, father) {
        for (&id, &direction) in donor_ids.iter().zip(&target_directions) {
            tree.set_slicing_direction(id, direction);
        }
    }
    child
}

fn matching_subtrees<R: Rng + ?Sized>(
    mother: &LayoutSolution,
    father: &LayoutSolution,
    rng: &mut R,
) -> Option<(NodeId, NodeId)> {
    let mother_node = mother
        .layout_nodes()
        .iter()
        .copied()
        .filter(|&id| image_node_count(mother, id) > CROSSOVER_MIN_IMAGE_NODES)
        .choose(rng)?;
    let count = image_node_count(mother, mother_node);

    let father_node = father
        .layout_nodes()
        .iter()
        .copied()
        .filter(|&id| image_node_count(father, id) == count)
        .choose(rng)?;
    Some((mother_node, father_node))
}

fn subtree_directions(solution: &LayoutSolution, ids: &[NodeId]) -> Vec<SlicingDirection> {
    ids.iter()
        .filter_map(|&id| solution.tree().slicing_direction(id))
        .collect()
}

#[inline]
fn image_node_count(solution: &LayoutSolution, id: NodeId) -> usize {
    solution.tree().node(id).image_node_count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::evolution::GenomeRng;
    use crate::compute::layout::SlicingTree;
    use crate::schema::{CollageConfig, Dimension, SourceImage};
    use proptest::prelude::*;
    use std::sync::Arc;

    fn leaf(name: &str) -> SlicingTree {
        SlicingTree::leaf(SourceImage::new(name, Dimension::new(100.0, 80.0), 1))
    }

    /// d(d(d(a, b), c), e) with all layout nodes set to `direction`.
    fn chain(direction: SlicingDirection, names: [&str; 4], score: f64) -> LayoutSolution {
        let tree = SlicingTree::join(
            direction,
            SlicingTree::join(
                direction,
                SlicingTree::join(direction, leaf(names[0]), leaf(names[1])),
                leaf(names[2]),
            ),
            leaf(names[3]),
        );
        let mut solution = LayoutSolution::new(tree, Arc::new(CollageConfig::default()));
        solution.set_score(score);
        solution
    }

    fn directions(solution: &LayoutSolution) -> Vec<SlicingDirection> {
        solution
            .layout_nodes()
            .iter()
            .filter_map(|&id| solution.tree().slicing_direction(id))
            .collect()
    }

    fn names(solution: &LayoutSolution) -> Vec<String> {
        solution.tree().source_images().map(|s| s.base_name()).collect()
    }

    #[test]
    fn test_fitter_mother_takes_father_directions() {
        let mother = chain(SlicingDirection::Vertical, ["a", "b", "c", "d"], 1.0);
        let father = chain(SlicingDirection::Horizontal, ["d", "c", "b", "a"], 2.0);

        let child = cross_breed((&mother, &father), &mut GenomeRng::new(0));

        assert_eq!(names(&child), names(&mother));
        assert_eq!(directions(&child), vec![SlicingDirection::Horizontal; 3]);
        // parents untouched
        assert_eq!(directions(&mother), vec![SlicingDirection::Vertical; 3]);
        assert_eq!(directions(&father), vec![SlicingDirection::Horizontal; 3]);
    }

    #[test]
    fn test_father_wins_ties() {
        let mother = chain(SlicingDirection::Vertical, ["a", "b", "c", "d"], 1.0);
        let father = chain(SlicingDirection::Horizontal, ["d", "c", "b", "a"], 1.0);

        let child = cross_breed((&mother, &father), &mut GenomeRng::new(0));

        assert_eq!(names(&child), names(&father));
        assert_eq!(directions(&child), vec![SlicingDirection::Vertical; 3]);
    }

    #[test]
    fn test_small_trees_are_cloned_unchanged() {
        let config = Arc::new(CollageConfig::default());
        let small = |direction, score| {
            let tree = SlicingTree::join(
                direction,
                SlicingTree::join(direction, leaf("a"), leaf("b")),
                leaf("c"),
            );
            let mut solution = LayoutSolution::new(tree, Arc::clone(&config));
            solution.set_score(score);
            solution
        };
        let mother = small(SlicingDirection::Vertical, 3.0);
        let father = small(SlicingDirection::Horizontal, 5.0);

        let child = cross_breed((&mother, &father), &mut GenomeRng::new(1));
        assert_eq!(directions(&child), vec![SlicingDirection::Vertical; 2]);
    }

    #[test]
    fn test_self_cross_swaps_subtree_directions() {
        let tree = SlicingTree::join(
            SlicingDirection::Vertical,
            chain(SlicingDirection::Horizontal, ["a", "b", "c", "d"], 0.0).tree().clone(),
            chain(SlicingDirection::Vertical, ["e", "f", "g", "h"], 0.0).tree().clone(),
        );
        let mut parent = LayoutSolution::new(tree, Arc::new(CollageConfig::default()));
        parent.set_score(1.0);

        let unchanged = directions(&parent);
        let mut swapped = vec![SlicingDirection::Vertical; 4];
        swapped.extend([SlicingDirection::Horizontal; 3]);

        let mut swaps = 0;
        for seed in 0..64 {
            let child = cross_breed((&parent, &parent), &mut GenomeRng::new(seed));
            let child_directions = directions(&child);
            assert!(
                child_directions == unchanged || child_directions == swapped,
                "seed {seed}: {child_directions:?}"
            );
            if child_directions == swapped {
                swaps += 1;
            }
            assert_eq!(names(&child), names(&parent));
        }
        assert!(swaps > 0);
        assert_eq!(directions(&parent), unchanged);
    }

    proptest! {
        #[test]
        fn child_keeps_fitter_parents_images(n in 2usize..24, seed in any::<u64>()) {
            let images: Vec<Arc<SourceImage>> = (0..n)
                .map(|i| Arc::new(SourceImage::new(format!("{i}.jpg"), Dimension::new(50.0 + i as f64, 70.0), 1)))
                .collect();
            let config = Arc::new(CollageConfig {
                desired_relative_weight_sum: n as u32,
                ..Default::default()
            });
            let mut rng = GenomeRng::new(seed);
            let mut mother = LayoutSolution::generate(&images, Arc::clone(&config), &mut rng).unwrap();
            let mut father = LayoutSolution::generate(&images, Arc::clone(&config), &mut rng).unwrap();
            mother.score();
            father.score();
            let mother_dump = mother.to_string();
            let father_dump = father.to_string();

            let child = cross_breed((&mother, &father), &mut rng);
            let fitter = if mother.last_score() < father.last_score() { &mother } else { &father };

            prop_assert_eq!(names(&child), names(fitter));
            prop_assert_eq!(child.layout_nodes().len(), n - 1);
            prop_assert_eq!(mother.to_string(), mother_dump);
            prop_assert_eq!(father.to_string(), father_dump);
        }
    }
}
