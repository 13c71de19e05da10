//! Configuration types for collage layout search.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{DEFAULT_IMAGE_RELATIVE_WEIGHT, Dimension, SourceImage};

/// Top-level collage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollageConfig {
    /// Canvas width in pixels.
    #[serde(default = "default_target_width")]
    pub target_width: u32,
    /// Canvas height in pixels.
    #[serde(default = "default_target_height")]
    pub target_height: u32,
    /// Width of the frame drawn around each image (0 = no border).
    #[serde(default = "default_border_width")]
    pub border_width: u32,
    /// Colour of the frame drawn around each image.
    #[serde(default)]
    pub border_color: BorderColor,
    /// Images that should be emphasised, matched by file name.
    #[serde(default)]
    pub feature_images: Vec<FeatureImage>,
    /// Images are never scaled beyond this multiple of their original size.
    #[serde(default = "default_max_scale_factor")]
    pub max_scale_factor: f64,
    /// Sum of the desired relative weights of all source images.
    /// Computed by the caller, see [`CollageConfig::with_weight_sum`].
    #[serde(default)]
    pub desired_relative_weight_sum: u32,
    /// Probability that a child is mutated (0.0-1.0).
    #[serde(default = "default_mutation_probability")]
    pub mutation_probability: f64,
    /// Maximum number of generations.
    #[serde(default = "default_num_generations")]
    pub num_generations: usize,
    /// Number of individuals in the population.
    #[serde(default = "default_population_size")]
    pub population_size: usize,
    /// Weights of the three cost terms.
    #[serde(default)]
    pub scoring_factors: ScoringFactors,
    /// Parents are drawn from this leading fraction of the sorted population.
    #[serde(default = "default_selection_fraction")]
    pub selection_fraction: f64,
    /// Stop early once the best cost is at or below this value.
    #[serde(default = "default_cost_threshold")]
    pub cost_threshold: f64,
    /// Random seed for reproducible runs.
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Evaluate each generation in parallel.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    /// Size of the worker pool (0 = rayon default).
    #[serde(default)]
    pub parallel_workers: usize,
}

impl Default for CollageConfig {
    fn default() -> Self {
        Self {
            target_width: default_target_width(),
            target_height: default_target_height(),
            border_width: default_border_width(),
            border_color: BorderColor::default(),
            feature_images: Vec::new(),
            max_scale_factor: default_max_scale_factor(),
            desired_relative_weight_sum: 0,
            mutation_probability: default_mutation_probability(),
            num_generations: default_num_generations(),
            population_size: default_population_size(),
            scoring_factors: ScoringFactors::default(),
            selection_fraction: default_selection_fraction(),
            cost_threshold: default_cost_threshold(),
            random_seed: None,
            parallel: default_parallel(),
            parallel_workers: 0,
        }
    }
}

fn default_target_width() -> u32 {
    1920
}
fn default_target_height() -> u32 {
    1080
}
fn default_border_width() -> u32 {
    2
}
fn default_max_scale_factor() -> f64 {
    1.0
}
fn default_mutation_probability() -> f64 {
    0.25
}
fn default_num_generations() -> usize {
    500
}
fn default_population_size() -> usize {
    1000
}
fn default_selection_fraction() -> f64 {
    0.25
}
fn default_cost_threshold() -> f64 {
    1e-8
}
fn default_parallel() -> bool {
    true
}

/// Weights of the cost terms summed by the fitness function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringFactors {
    /// How important it is that the canvas is fully covered.
    pub canvas_coverage: f64,
    /// How important it is that each image gets its desired share of the canvas.
    pub relative_image_size: f64,
    /// How important it is that feature images sit close to the canvas center.
    pub centered_feature: f64,
}

impl ScoringFactors {
    pub fn new(canvas_coverage: f64, relative_image_size: f64, centered_feature: f64) -> Self {
        Self {
            canvas_coverage,
            relative_image_size,
            centered_feature,
        }
    }
}

impl Default for ScoringFactors {
    fn default() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

/// A named image with a desired relative weight, e.g. `sunny_day.jpg:5`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureImage {
    pub name: String,
    pub relative_weight: u32,
}

impl FeatureImage {
    pub fn new(name: impl Into<String>, relative_weight: u32) -> Result<Self, ConfigError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ConfigError::EmptyFeatureImageName);
        }
        if relative_weight == 0 {
            return Err(ConfigError::InvalidFeatureImageWeight(name));
        }
        Ok(Self {
            name,
            relative_weight,
        })
    }
}

impl FromStr for FeatureImage {
    type Err = ConfigError;

    /// Parse `<name>:<weight>`; the name may itself contain colons.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let bad_input = || ConfigError::BadFeatureImage(input.to_string());
        let (name, weight) = input.rsplit_once(':').ok_or_else(bad_input)?;
        if name.is_empty() || weight.is_empty() || !weight.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad_input());
        }
        let weight: u32 = weight.parse().map_err(|_| bad_input())?;
        FeatureImage::new(name, weight)
    }
}

/// RGB border colour, written as a six digit hex string (`"ffffff"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl BorderColor {
    pub const WHITE: BorderColor = BorderColor {
        r: 255,
        g: 255,
        b: 255,
    };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Default for BorderColor {
    fn default() -> Self {
        Self::WHITE
    }
}

impl FromStr for BorderColor {
    type Err = ConfigError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let hex = input.strip_prefix('#').unwrap_or(input);
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ConfigError::InvalidColor(input.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| ConfigError::InvalidColor(input.to_string()))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for BorderColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for BorderColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BorderColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

impl CollageConfig {
    /// Canvas size as a dimension.
    #[inline]
    pub fn canvas_dimension(&self) -> Dimension {
        Dimension::new(self.target_width as f64, self.target_height as f64)
    }

    /// Canvas area in square pixels.
    #[inline]
    pub fn canvas_area(&self) -> f64 {
        self.target_width as f64 * self.target_height as f64
    }

    /// Load and validate a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: CollageConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Desired relative weight for an image with the given file name.
    pub fn weight_for(&self, file_name: &str) -> u32 {
        self.feature_images
            .iter()
            .find(|feature| feature.name == file_name)
            .map(|feature| feature.relative_weight)
            .unwrap_or(DEFAULT_IMAGE_RELATIVE_WEIGHT)
    }

    /// Assign feature weights to images by file name; all others get the default weight.
    pub fn apply_feature_weights(&self, images: &mut [SourceImage]) {
        for image in images.iter_mut() {
            image.desired_relative_weight = self.weight_for(&image.base_name());
        }

        for feature in &self.feature_images {
            if !images.iter().any(|image| image.base_name() == feature.name) {
                log::warn!(
                    "Feature image '{}' does not match any source image",
                    feature.name
                );
            }
        }
    }

    /// Return a copy with `desired_relative_weight_sum` computed from `images`.
    pub fn with_weight_sum(mut self, images: &[SourceImage]) -> Self {
        self.desired_relative_weight_sum = images
            .iter()
            .map(|image| image.desired_relative_weight)
            .sum();
        self
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_width == 0 || self.target_height == 0 {
            return Err(ConfigError::InvalidCanvas);
        }
        if !(self.max_scale_factor > 0.0) {
            return Err(ConfigError::InvalidMaxScaleFactor(self.max_scale_factor));
        }
        if !(0.0..=1.0).contains(&self.mutation_probability) {
            return Err(ConfigError::InvalidMutationProbability(
                self.mutation_probability,
            ));
        }
        if self.population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.num_generations == 0 {
            return Err(ConfigError::NoGenerations);
        }
        if !(self.selection_fraction > 0.0 && self.selection_fraction <= 1.0) {
            return Err(ConfigError::InvalidSelectionFraction(
                self.selection_fraction,
            ));
        }
        let factors = self.scoring_factors;
        for (name, value) in [
            ("canvas_coverage", factors.canvas_coverage),
            ("relative_image_size", factors.relative_image_size),
            ("centered_feature", factors.centered_feature),
        ] {
            if !(value >= 0.0) {
                return Err(ConfigError::InvalidScoringFactor { name, value });
            }
        }
        for feature in &self.feature_images {
            if feature.name.is_empty() {
                return Err(ConfigError::EmptyFeatureImageName);
            }
            if feature.relative_weight == 0 {
                return Err(ConfigError::InvalidFeatureImageWeight(
                    feature.name.clone(),
                ));
            }
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Canvas width and height must be non-zero")]
    InvalidCanvas,
    #[error("Max scale factor must be positive, got {0}")]
    InvalidMaxScaleFactor(f64),
    #[error("Mutation probability must be within 0.0..=1.0, got {0}")]
    InvalidMutationProbability(f64),
    #[error("Population size must be non-zero")]
    EmptyPopulation,
    #[error("Generation count must be non-zero")]
    NoGenerations,
    #[error("Selection fraction must be within (0.0, 1.0], got {0}")]
    InvalidSelectionFraction(f64),
    #[error("Scoring factor {name} must be non-negative, got {value}")]
    InvalidScoringFactor { name: &'static str, value: f64 },
    #[error("Bad feature image input '{0}'")]
    BadFeatureImage(String),
    #[error("Image name must not be empty")]
    EmptyFeatureImageName,
    #[error("Relative weight of feature image '{0}' must be greater than 0")]
    InvalidFeatureImageWeight(String),
    #[error("Invalid color value {0}")]
    InvalidColor(String),
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_valid() {
        let config = CollageConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.canvas_dimension(), Dimension::new(1920.0, 1080.0));
    }

    #[test]
    fn test_parse_feature_image() {
        let cases = [
            ("image-1.png:3", FeatureImage::new("image-1.png", 3).unwrap()),
            ("1:341", FeatureImage::new("1", 341).unwrap()),
            (
                "_-img.special.åäö-2(2).png1.png:12",
                FeatureImage::new("_-img.special.åäö-2(2).png1.png", 12).unwrap(),
            ),
            ("c:\\dir:with:colons.png:7", FeatureImage::new("c:\\dir:with:colons.png", 7).unwrap()),
        ];
        for (input, expected) in cases {
            assert_eq!(input.parse::<FeatureImage>().unwrap(), expected);
        }
    }

    #[test]
    fn test_parse_feature_image_rejects_bad_input() {
        let err = "Image-1.png-3".parse::<FeatureImage>().unwrap_err();
        assert_eq!(err.to_string(), "Bad feature image input 'Image-1.png-3'");

        assert!("name:".parse::<FeatureImage>().is_err());
        assert!(":4".parse::<FeatureImage>().is_err());
        assert!("name:-4".parse::<FeatureImage>().is_err());
        assert!(matches!(
            "name:0".parse::<FeatureImage>(),
            Err(ConfigError::InvalidFeatureImageWeight(_))
        ));
    }

    #[test]
    fn test_parse_border_color() {
        assert_eq!("000000".parse::<BorderColor>().unwrap(), BorderColor::new(0, 0, 0));
        assert_eq!("FF0000".parse::<BorderColor>().unwrap(), BorderColor::new(255, 0, 0));
        assert_eq!("ffff00".parse::<BorderColor>().unwrap(), BorderColor::new(255, 255, 0));
        assert_eq!("#ffffff".parse::<BorderColor>().unwrap(), BorderColor::WHITE);
        assert!("".parse::<BorderColor>().is_err());
        assert!("12345".parse::<BorderColor>().is_err());
        assert!("gg0000".parse::<BorderColor>().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad_probability = CollageConfig {
            mutation_probability: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            bad_probability.validate(),
            Err(ConfigError::InvalidMutationProbability(_))
        ));

        let bad_canvas = CollageConfig {
            target_width: 0,
            ..Default::default()
        };
        assert!(matches!(bad_canvas.validate(), Err(ConfigError::InvalidCanvas)));

        let bad_fraction = CollageConfig {
            selection_fraction: 0.0,
            ..Default::default()
        };
        assert!(bad_fraction.validate().is_err());

        let bad_factor = CollageConfig {
            scoring_factors: ScoringFactors::new(1.0, -1.0, 1.0),
            ..Default::default()
        };
        assert!(matches!(
            bad_factor.validate(),
            Err(ConfigError::InvalidScoringFactor {
                name: "relative_image_size",
                ..
            })
        ));
    }

    #[test]
    fn test_feature_weights_and_weight_sum() {
        let config = CollageConfig {
            feature_images: vec![FeatureImage::new("b.jpg", 4).unwrap()],
            ..Default::default()
        };
        let mut images = vec![
            SourceImage::new("dir/a.jpg", Dimension::new(10.0, 10.0), 1),
            SourceImage::new("dir/b.jpg", Dimension::new(10.0, 10.0), 1),
            SourceImage::new("dir/c.jpg", Dimension::new(10.0, 10.0), 9),
        ];

        config.apply_feature_weights(&mut images);
        let weights: Vec<u32> = images.iter().map(|i| i.desired_relative_weight).collect();
        assert_eq!(weights, vec![1, 4, 1]);

        let config = config.with_weight_sum(&images);
        assert_eq!(config.desired_relative_weight_sum, 6);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let config = CollageConfig {
            border_color: BorderColor::new(0x12, 0xab, 0x00),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"12ab00\""));

        let parsed: CollageConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.border_color, config.border_color);
        assert_eq!(parsed.population_size, config.population_size);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let parsed: CollageConfig =
            serde_json::from_str(r#"{"target_width": 800, "target_height": 600}"#).unwrap();
        assert_eq!(parsed.target_width, 800);
        assert_eq!(parsed.num_generations, 500);
        assert_eq!(parsed.scoring_factors, ScoringFactors::default());
        assert_eq!(parsed.border_color, BorderColor::WHITE);
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("collage.json");
        let mut file = fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{"target_width": 640, "target_height": 480, "border_color": "000000", "feature_images": [{{"name": "x.png", "relative_weight": 3}}]}}"#
        )
        .unwrap();

        let config = CollageConfig::from_json_file(&path).unwrap();
        assert_eq!(config.target_width, 640);
        assert_eq!(config.border_color, BorderColor::new(0, 0, 0));
        assert_eq!(config.weight_for("x.png"), 3);
        assert_eq!(config.weight_for("y.png"), 1);

        let missing = CollageConfig::from_json_file(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
