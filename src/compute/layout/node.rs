//! Slicing tree node types.

use std::fmt;
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::schema::{Dimension, SourceImage};

/// Index of a node inside its [`SlicingTree`](super::SlicingTree) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// How a layout node splits its rectangle between its two children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlicingDirection {
    /// Side by side, both children share the full height.
    #[serde(rename = "V")]
    Vertical,
    /// Stacked, both children share the full width.
    #[serde(rename = "H")]
    Horizontal,
}

impl SlicingDirection {
    /// Uniformly random direction.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            SlicingDirection::Horizontal
        } else {
            SlicingDirection::Vertical
        }
    }

    /// Aspect ratio of a node whose children have aspect ratios `left` and `right`.
    #[inline]
    pub fn combine_aspect_ratios(self, left: f64, right: f64) -> f64 {
        match self {
            SlicingDirection::Vertical => left + right,
            SlicingDirection::Horizontal => left * right / (left + right),
        }
    }
}

impl fmt::Display for SlicingDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlicingDirection::Vertical => f.write_str("V"),
            SlicingDirection::Horizontal => f.write_str("H"),
        }
    }
}

/// Leaf holding exactly one source image.
#[derive(Debug, Clone)]
pub struct ImageNode {
    pub source: Arc<SourceImage>,
    /// Placed size, set by dimension propagation.
    pub dimension: Dimension,
    pub aspect_ratio: f64,
    /// Normalized distance from the canvas center; non-zero only for feature images.
    pub off_center_distance: f64,
}

impl ImageNode {
    pub fn new(source: Arc<SourceImage>) -> Self {
        let aspect_ratio = source.aspect_ratio();
        Self {
            source,
            dimension: Dimension::ZERO,
            aspect_ratio,
            off_center_distance: 0.0,
        }
    }
}

/// Internal node splitting its rectangle between `left` and `right`.
#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub slicing_direction: SlicingDirection,
    pub left: NodeId,
    pub right: NodeId,
    /// Number of leaves below this node.
    pub image_node_count: usize,
    pub dimension: Dimension,
    pub aspect_ratio: f64,
}

impl LayoutNode {
    pub fn new(slicing_direction: SlicingDirection, left: NodeId, right: NodeId) -> Self {
        Self {
            slicing_direction,
            left,
            right,
            image_node_count: 0,
            dimension: Dimension::ZERO,
            aspect_ratio: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Node {
    Image(ImageNode),
    Layout(LayoutNode),
}

impl Node {
    #[inline]
    pub fn dimension(&self) -> Dimension {
        match self {
            Node::Image(image) => image.dimension,
            Node::Layout(layout) => layout.dimension,
        }
    }

    #[inline]
    pub fn aspect_ratio(&self) -> f64 {
        match self {
            Node::Image(image) => image.aspect_ratio,
            Node::Layout(layout) => layout.aspect_ratio,
        }
    }

    /// Leaves in this node's subtree.
    #[inline]
    pub fn image_node_count(&self) -> usize {
        match self {
            Node::Image(_) => 1,
            Node::Layout(layout) => layout.image_node_count,
        }
    }

    #[inline]
    pub fn is_image(&self) -> bool {
        matches!(self, Node::Image(_))
    }

    pub fn as_image(&self) -> Option<&ImageNode> {
        match self {
            Node::Image(image) => Some(image),
            Node::Layout(_) => None,
        }
    }

    pub fn as_layout(&self) -> Option<&LayoutNode> {
        match self {
            Node::Layout(layout) => Some(layout),
            Node::Image(_) => None,
        }
    }
}
