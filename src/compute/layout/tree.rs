//! Arena-backed binary slicing tree and its geometry.

use std::fmt;
use std::sync::Arc;

use crate::schema::{CollageConfig, Dimension, SourceImage};

use super::node::{ImageNode, LayoutNode, Node, NodeId, SlicingDirection};

/// A binary slicing tree.
///
/// Nodes live in a single arena in pre-order, so the root is always the
/// first node and every subtree occupies a contiguous block. Mutation only
/// ever swaps field values between existing nodes; the shape is fixed from
/// construction on.
#[derive(Debug, Clone)]
pub struct SlicingTree {
    nodes: Vec<Node>,
}

impl SlicingTree {
    /// Tree consisting of a single image.
    pub fn leaf(source: impl Into<Arc<SourceImage>>) -> Self {
        Self {
            nodes: vec![Node::Image(ImageNode::new(source.into()))],
        }
    }

    /// Combine two trees under a new layout node.
    pub fn join(direction: SlicingDirection, left: SlicingTree, right: SlicingTree) -> Self {
        let right_offset = 1 + left.nodes.len();
        let mut layout = LayoutNode::new(direction, NodeId(1), NodeId(right_offset));
        layout.image_node_count = left.image_node_count() + right.image_node_count();

        let mut nodes = Vec::with_capacity(right_offset + right.nodes.len());
        nodes.push(Node::Layout(layout));
        nodes.extend(left.nodes.into_iter().map(|node| shifted(node, 1)));
        nodes.extend(right.nodes.into_iter().map(|node| shifted(node, right_offset)));
        Self { nodes }
    }

    /// Wrap nodes that are already laid out in pre-order with the root first.
    pub(crate) fn from_pre_order(nodes: Vec<Node>) -> Self {
        debug_assert!(!nodes.is_empty());
        Self { nodes }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Total number of nodes (leaves and layout nodes).
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of leaves.
    #[inline]
    pub fn image_node_count(&self) -> usize {
        self.nodes[0].image_node_count()
    }

    /// All nodes in pre-order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }

    pub fn image(&self, id: NodeId) -> Option<&ImageNode> {
        self.nodes.get(id.0).and_then(Node::as_image)
    }

    pub fn layout(&self, id: NodeId) -> Option<&LayoutNode> {
        self.nodes.get(id.0).and_then(Node::as_layout)
    }

    /// Layout nodes in pre-order.
    pub fn layout_node_ids(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, node)| !node.is_image())
            .map(|(id, _)| id)
            .collect()
    }

    /// Image nodes in pre-order, which is also left-to-right placement order.
    pub fn image_node_ids(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, node)| node.is_image())
            .map(|(id, _)| id)
            .collect()
    }

    /// Node ids of the subtree rooted at `id`, in pre-order.
    pub fn subtree_ids(&self, id: NodeId) -> Vec<NodeId> {
        let mut ids = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            ids.push(current);
            if let Node::Layout(layout) = &self.nodes[current.0] {
                stack.push(layout.right);
                stack.push(layout.left);
            }
        }
        ids
    }

    /// Layout node ids of the subtree rooted at `id`, in pre-order.
    pub fn subtree_layout_node_ids(&self, id: NodeId) -> Vec<NodeId> {
        self.subtree_ids(id)
            .into_iter()
            .filter(|id| !self.nodes[id.0].is_image())
            .collect()
    }

    /// Source images in placement order.
    pub fn source_images(&self) -> impl Iterator<Item = &Arc<SourceImage>> {
        self.nodes.iter().filter_map(|node| node.as_image().map(|image| &image.source))
    }

    pub fn slicing_direction(&self, id: NodeId) -> Option<SlicingDirection> {
        self.layout(id).map(|layout| layout.slicing_direction)
    }

    /// Set the direction of a layout node; image nodes are left untouched.
    pub fn set_slicing_direction(&mut self, id: NodeId, direction: SlicingDirection) {
        if let Some(Node::Layout(layout)) = self.nodes.get_mut(id.0) {
            layout.slicing_direction = direction;
        }
    }

    /// Swap the slicing directions of two layout nodes.
    pub fn swap_slicing_directions(&mut self, a: NodeId, b: NodeId) {
        if let (Some(da), Some(db)) = (self.slicing_direction(a), self.slicing_direction(b)) {
            self.set_slicing_direction(a, db);
            self.set_slicing_direction(b, da);
        }
    }

    /// Swap the source images of two image nodes.
    pub fn swap_source_images(&mut self, a: NodeId, b: NodeId) {
        let (Some(sa), Some(sb)) = (
            self.image(a).map(|image| Arc::clone(&image.source)),
            self.image(b).map(|image| Arc::clone(&image.source)),
        ) else {
            return;
        };
        self.set_source(a, sb);
        self.set_source(b, sa);
    }

    fn set_source(&mut self, id: NodeId, source: Arc<SourceImage>) {
        if let Node::Image(image) = &mut self.nodes[id.0] {
            image.aspect_ratio = source.aspect_ratio();
            image.source = source;
        }
    }

    /// Bottom-up aspect ratio propagation. Returns the root's aspect ratio.
    pub fn compute_aspect_ratio(&mut self) -> f64 {
        self.aspect_ratio_of(self.root())
    }

    fn aspect_ratio_of(&mut self, id: NodeId) -> f64 {
        let (direction, left, right) = match &mut self.nodes[id.0] {
            Node::Image(image) => {
                image.aspect_ratio = image.source.aspect_ratio();
                return image.aspect_ratio;
            }
            Node::Layout(layout) => (layout.slicing_direction, layout.left, layout.right),
        };

        let aspect_ratio =
            direction.combine_aspect_ratios(self.aspect_ratio_of(left), self.aspect_ratio_of(right));
        if let Node::Layout(layout) = &mut self.nodes[id.0] {
            layout.aspect_ratio = aspect_ratio;
        }
        aspect_ratio
    }

    /// Top-down dimension propagation from the root, placed at
    /// (`x_offset`, `y_offset`) inside `parent`.
    ///
    /// Requires [`compute_aspect_ratio`](Self::compute_aspect_ratio) to have
    /// run on the current shape. Returns the number of leaves.
    pub fn compute_dimensions(
        &mut self,
        parent: Dimension,
        config: &CollageConfig,
        x_offset: f64,
        y_offset: f64,
    ) -> usize {
        self.dimensions_of(self.root(), parent, config, x_offset, y_offset)
    }

    fn dimensions_of(
        &mut self,
        id: NodeId,
        parent: Dimension,
        config: &CollageConfig,
        x: f64,
        y: f64,
    ) -> usize {
        let dimension = fit_within(self.nodes[id.0].aspect_ratio(), parent);

        let (direction, left, right) = match &mut self.nodes[id.0] {
            Node::Image(image) => {
                let original = image.source.dimension;
                image.dimension = if dimension.width / original.width > config.max_scale_factor {
                    original.scaled(config.max_scale_factor)
                } else {
                    dimension
                };
                image.off_center_distance = if image.source.is_feature() {
                    off_center_distance(config.canvas_dimension(), x, y, image.dimension)
                } else {
                    0.0
                };
                return 1;
            }
            Node::Layout(layout) => {
                layout.dimension = dimension;
                (layout.slicing_direction, layout.left, layout.right)
            }
        };

        let left_count = self.dimensions_of(left, dimension, config, x, y);
        let left_dimension = self.nodes[left.0].dimension();
        let (right_x, right_y) = match direction {
            SlicingDirection::Vertical => (x + left_dimension.width, y),
            SlicingDirection::Horizontal => (x, y + left_dimension.height),
        };
        let right_count = self.dimensions_of(right, dimension, config, right_x, right_y);

        let count = left_count + right_count;
        if let Node::Layout(layout) = &mut self.nodes[id.0] {
            layout.image_node_count = count;
        }
        count
    }

    fn fmt_node(
        &self,
        f: &mut fmt::Formatter<'_>,
        id: NodeId,
        padding: &str,
        pointer: &str,
        has_right_sibling: bool,
    ) -> fmt::Result {
        write!(f, "{padding}{pointer}")?;
        match &self.nodes[id.0] {
            Node::Image(image) => writeln!(
                f,
                "{} {}",
                image.source.file_name.display(),
                image.dimension
            ),
            Node::Layout(layout) => {
                writeln!(f, "{}: {}", layout.slicing_direction, layout.dimension)?;
                let child_padding = if pointer.is_empty() {
                    String::new()
                } else if has_right_sibling {
                    format!("{padding}│  ")
                } else {
                    format!("{padding}   ")
                };
                self.fmt_node(f, layout.left, &child_padding, "├──", true)?;
                self.fmt_node(f, layout.right, &child_padding, "└──", false)
            }
        }
    }
}

/// Pre-order dump: direction and size for layout nodes, file and size for leaves.
impl fmt::Display for SlicingTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(f, self.root(), "", "", false)
    }
}

fn shifted(node: Node, offset: usize) -> Node {
    match node {
        Node::Layout(mut layout) => {
            layout.left.0 += offset;
            layout.right.0 += offset;
            Node::Layout(layout)
        }
        image => image,
    }
}

/// Largest rectangle of the given aspect ratio that fits `parent`, pinned to
/// the parent's height unless that would overflow its width.
#[inline]
fn fit_within(aspect_ratio: f64, parent: Dimension) -> Dimension {
    let width = (aspect_ratio * parent.height).min(parent.width);
    Dimension::new(width, width / aspect_ratio)
}

/// Distance between the image center and the canvas center, normalized by
/// twice the larger canvas side.
fn off_center_distance(canvas: Dimension, x: f64, y: f64, dimension: Dimension) -> f64 {
    let dx = canvas.width / 2.0 - (x + dimension.width / 2.0);
    let dy = canvas.height / 2.0 - (y + dimension.height / 2.0);
    dx.hypot(dy) / (2.0 * canvas.width.max(canvas.height))
}
