//! Source image descriptions consumed by the layout search.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Weight given to images that are not listed as feature images.
pub const DEFAULT_IMAGE_RELATIVE_WEIGHT: u32 = 1;

fn default_relative_weight() -> u32 {
    DEFAULT_IMAGE_RELATIVE_WEIGHT
}

/// Width and height in (fractional) pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimension {
    pub width: f64,
    pub height: f64,
}

impl Dimension {
    pub const ZERO: Dimension = Dimension {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Width rounded to the nearest pixel.
    #[inline]
    pub fn width_as_int(&self) -> i64 {
        self.width.round() as i64
    }

    /// Height rounded to the nearest pixel.
    #[inline]
    pub fn height_as_int(&self) -> i64 {
        self.height.round() as i64
    }

    /// Scale both sides by `factor`.
    #[inline]
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.width * factor, self.height * factor)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width_as_int(), self.height_as_int())
    }
}

/// Orientation of the stored pixels, as recorded by the EXIF orientation tag.
///
/// Renderers rotate/mirror the decoded bitmap by this amount before drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    Rot0,
    RotCw90,
    Rot180,
    RotCw270,
    MirrorHorizontal,
    MirrorVertical,
    MirrorHorizontalRotCw270,
    MirrorHorizontalRotCw90,
}

impl Rotation {
    /// Map an EXIF orientation value (1..=8) to a rotation.
    ///
    /// Unknown values are treated as "no rotation".
    pub fn from_exif_orientation(orientation: u16) -> Self {
        match orientation {
            2 => Rotation::MirrorHorizontal,
            3 => Rotation::Rot180,
            4 => Rotation::MirrorVertical,
            5 => Rotation::MirrorHorizontalRotCw270,
            6 => Rotation::RotCw90,
            7 => Rotation::MirrorHorizontalRotCw90,
            8 => Rotation::RotCw270,
            _ => Rotation::Rot0,
        }
    }

    /// Clockwise rotation in degrees.
    pub fn degrees(&self) -> u32 {
        match self {
            Rotation::Rot0 | Rotation::MirrorHorizontal => 0,
            Rotation::RotCw90 | Rotation::MirrorHorizontalRotCw90 => 90,
            Rotation::Rot180 | Rotation::MirrorVertical => 180,
            Rotation::RotCw270 | Rotation::MirrorHorizontalRotCw270 => 270,
        }
    }

    pub fn is_mirrored(&self) -> bool {
        matches!(
            self,
            Rotation::MirrorHorizontal
                | Rotation::MirrorVertical
                | Rotation::MirrorHorizontalRotCw270
                | Rotation::MirrorHorizontalRotCw90
        )
    }

    /// True when the displayed image has width and height swapped
    /// relative to the stored pixels.
    pub fn swaps_dimensions(&self) -> bool {
        self.degrees() % 180 == 90
    }
}

/// An input image: where it lives, how big it is and how much space it wants.
///
/// `dimension` is the displayed size, i.e. already swapped for 90/270 degree
/// rotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceImage {
    pub file_name: PathBuf,
    pub dimension: Dimension,
    /// Relative weight; anything above 1 marks a feature image.
    #[serde(default = "default_relative_weight")]
    pub desired_relative_weight: u32,
    #[serde(default)]
    pub rotation: Rotation,
}

impl SourceImage {
    pub fn new(file_name: impl Into<PathBuf>, dimension: Dimension, desired_relative_weight: u32) -> Self {
        Self {
            file_name: file_name.into(),
            dimension,
            desired_relative_weight,
            rotation: Rotation::Rot0,
        }
    }

    /// Builder-style rotation setter.
    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    #[inline]
    pub fn aspect_ratio(&self) -> f64 {
        self.dimension.width / self.dimension.height
    }

    #[inline]
    pub fn is_feature(&self) -> bool {
        self.desired_relative_weight > DEFAULT_IMAGE_RELATIVE_WEIGHT
    }

    /// File name without directories, used to match feature image names.
    pub fn base_name(&self) -> String {
        self.file_name
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_rounding_and_area() {
        let d = Dimension::new(133.333, 80.5);
        assert_eq!(d.width_as_int(), 133);
        assert_eq!(d.height_as_int(), 81);
        assert!((d.area() - 133.333 * 80.5).abs() < 1e-9);
        assert_eq!(d.to_string(), "133x81");
    }

    #[test]
    fn test_exif_orientation_mapping() {
        let expected = [
            (1, Rotation::Rot0),
            (2, Rotation::MirrorHorizontal),
            (3, Rotation::Rot180),
            (4, Rotation::MirrorVertical),
            (5, Rotation::MirrorHorizontalRotCw270),
            (6, Rotation::RotCw90),
            (7, Rotation::MirrorHorizontalRotCw90),
            (8, Rotation::RotCw270),
        ];
        for (orientation, rotation) in expected {
            assert_eq!(Rotation::from_exif_orientation(orientation), rotation);
        }
        assert_eq!(Rotation::from_exif_orientation(0), Rotation::Rot0);
        assert_eq!(Rotation::from_exif_orientation(42), Rotation::Rot0);
    }

    #[test]
    fn test_rotation_swaps_dimensions() {
        assert!(Rotation::RotCw90.swaps_dimensions());
        assert!(Rotation::MirrorHorizontalRotCw270.swaps_dimensions());
        assert!(!Rotation::Rot180.swaps_dimensions());
        assert!(!Rotation::MirrorVertical.swaps_dimensions());
        assert!(Rotation::MirrorVertical.is_mirrored());
        assert!(!Rotation::RotCw270.is_mirrored());
    }

    #[test]
    fn test_source_image_defaults_from_json() {
        let json = r#"{"file_name": "photos/a.jpg", "dimension": {"width": 300.0, "height": 200.0}}"#;
        let image: SourceImage = serde_json::from_str(json).unwrap();

        assert_eq!(image.desired_relative_weight, DEFAULT_IMAGE_RELATIVE_WEIGHT);
        assert_eq!(image.rotation, Rotation::Rot0);
        assert!(!image.is_feature());
        assert!((image.aspect_ratio() - 1.5).abs() < 1e-12);
        assert_eq!(image.base_name(), "a.jpg");
    }
}
