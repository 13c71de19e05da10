//! Random slicing tree generation.
//!
//! Trees are grown as [`PartialLayoutTree`]s whose layout nodes may still
//! miss children, then finalized into a [`SlicingTree`].

use std::sync::Arc;

use rand::Rng;
use thiserror::Error;

use crate::schema::SourceImage;

use super::node::{ImageNode, LayoutNode, Node, NodeId, SlicingDirection};
use super::tree::SlicingTree;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("A layout needs at least 2 images, got {0}")]
    TooFewImages(usize),
    #[error("Layout node {node} is missing a child")]
    MalformedTree { node: usize },
    #[error("No open layout node left to attach a child to")]
    NoOpenSlot,
}

#[derive(Debug, Clone)]
enum PartialChild {
    Layout(usize),
    Image(Arc<SourceImage>),
}

#[derive(Debug, Clone)]
struct PartialLayoutNode {
    direction: SlicingDirection,
    left: Option<PartialChild>,
    right: Option<PartialChild>,
}

/// Slicing tree under construction.
///
/// Keeps a pool of layout nodes with a free child slot. Children are
/// attached to a random pooled node, left slot first; a node leaves the
/// pool once its right slot is filled.
#[derive(Debug, Clone)]
pub struct PartialLayoutTree {
    nodes: Vec<PartialLayoutNode>,
    open: Vec<usize>,
}

impl PartialLayoutTree {
    pub fn new(root_direction: SlicingDirection) -> Self {
        Self {
            nodes: vec![PartialLayoutNode {
                direction: root_direction,
                left: None,
                right: None,
            }],
            open: vec![0],
        }
    }

    /// Attach a new layout node to a random open node.
    pub fn add_layout_node<R: Rng + ?Sized>(
        &mut self,
        direction: SlicingDirection,
        rng: &mut R,
    ) -> Result<(), LayoutError> {
        let index = self.nodes.len();
        self.attach(PartialChild::Layout(index), rng)?;
        self.nodes.push(PartialLayoutNode {
            direction,
            left: None,
            right: None,
        });
        self.open.push(index);
        Ok(())
    }

    /// Attach an image leaf to a random open node.
    pub fn add_image<R: Rng + ?Sized>(
        &mut self,
        image: Arc<SourceImage>,
        rng: &mut R,
    ) -> Result<(), LayoutError> {
        self.attach(PartialChild::Image(image), rng)
    }

    fn attach<R: Rng + ?Sized>(&mut self, child: PartialChild, rng: &mut R) -> Result<(), LayoutError> {
        if self.open.is_empty() {
            return Err(LayoutError::NoOpenSlot);
        }
        let slot = rng.gen_range(0..self.open.len());
        let parent = &mut self.nodes[self.open[slot]];
        if parent.left.is_none() {
            parent.left = Some(child);
        } else {
            parent.right = Some(child);
            self.open.swap_remove(slot);
        }
        Ok(())
    }

    /// Convert into a [`SlicingTree`]. Fails if any layout node lacks a child.
    pub fn finalize(self) -> Result<SlicingTree, LayoutError> {
        let mut out = Vec::with_capacity(2 * self.nodes.len() + 1);
        self.emit_layout(0, &mut out)?;
        Ok(SlicingTree::from_pre_order(out))
    }

    fn emit_layout(&self, index: usize, out: &mut Vec<Node>) -> Result<NodeId, LayoutError> {
        let partial = &self.nodes[index];
        let (Some(left), Some(right)) = (&partial.left, &partial.right) else {
            return Err(LayoutError::MalformedTree { node: index });
        };

        let id = NodeId(out.len());
        out.push(Node::Layout(LayoutNode::new(partial.direction, id, id)));
        let left = self.emit_child(left, out)?;
        let right = self.emit_child(right, out)?;
        let count = out[left.0].image_node_count() + out[right.0].image_node_count();

        if let Node::Layout(layout) = &mut out[id.0] {
            layout.left = left;
            layout.right = right;
            layout.image_node_count = count;
        }
        Ok(id)
    }

    fn emit_child(&self, child: &PartialChild, out: &mut Vec<Node>) -> Result<NodeId, LayoutError> {
        match child {
            PartialChild::Layout(index) => self.emit_layout(*index, out),
            PartialChild::Image(image) => {
                let id = NodeId(out.len());
                out.push(Node::Image(ImageNode::new(Arc::clone(image))));
                Ok(id)
            }
        }
    }
}

/// Grow a random slicing tree with one leaf per image and
/// `images.len() - 1` layout nodes.
pub fn generate_tree<R: Rng + ?Sized>(
    images: &[Arc<SourceImage>],
    rng: &mut R,
) -> Result<SlicingTree, LayoutError> {
    if images.len() < 2 {
        return Err(LayoutError::TooFewImages(images.len()));
    }

    let mut partial = PartialLayoutTree::new(SlicingDirection::random(rng));
    for _ in 1..images.len() - 1 {
        let direction = SlicingDirection::random(rng);
        partial.add_layout_node(direction, rng)?;
    }
    for image in images {
        partial.add_image(Arc::clone(image), rng)?;
    }
    partial.finalize()
}
