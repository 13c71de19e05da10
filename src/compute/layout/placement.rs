//! Absolute image placements for renderers.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::schema::{BorderColor, Dimension, Rotation};

use super::node::{Node, NodeId, SlicingDirection};
use super::solution::LayoutSolution;

/// Where and how large one image is drawn on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub file_name: PathBuf,
    pub rotation: Rotation,
    /// Left edge, rounded to the nearest pixel.
    pub x: i64,
    /// Top edge, rounded to the nearest pixel.
    pub y: i64,
    pub dimension: Dimension,
}

/// Everything a renderer needs to composite a layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderPlan {
    pub width: u32,
    pub height: u32,
    pub border_width: u32,
    pub border_color: BorderColor,
    pub score: f64,
    pub placements: Vec<Placement>,
}

impl LayoutSolution {
    /// Placements in traversal order, reflecting the geometry of the last
    /// [`score`](LayoutSolution::score) call.
    pub fn placements(&self) -> Vec<Placement> {
        let mut placements = Vec::with_capacity(self.image_nodes().len());
        self.collect_placements(self.tree().root(), 0.0, 0.0, &mut placements);
        placements
    }

    fn collect_placements(&self, id: NodeId, x: f64, y: f64, out: &mut Vec<Placement>) {
        match self.tree().node(id) {
            Node::Image(image) => out.push(Placement {
                file_name: image.source.file_name.clone(),
                rotation: image.source.rotation,
                x: x.round() as i64,
                y: y.round() as i64,
                dimension: image.dimension,
            }),
            Node::Layout(layout) => {
                self.collect_placements(layout.left, x, y, out);
                let left = self.tree().node(layout.left).dimension();
                match layout.slicing_direction {
                    SlicingDirection::Vertical => {
                        self.collect_placements(layout.right, x + left.width, y, out)
                    }
                    SlicingDirection::Horizontal => {
                        self.collect_placements(layout.right, x, y + left.height, out)
                    }
                }
            }
        }
    }

    /// Canvas, border settings and placements in one serializable value.
    pub fn render_plan(&self) -> RenderPlan {
        let config = self.config();
        RenderPlan {
            width: config.target_width,
            height: config.target_height,
            border_width: config.border_width,
            border_color: config.border_color,
            score: self.last_score(),
            placements: self.placements(),
        }
    }
}
