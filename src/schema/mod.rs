//! Schema module - Configuration and source image types for collage layouts.

mod config;
mod image;

pub use config::*;
pub use image::*;
