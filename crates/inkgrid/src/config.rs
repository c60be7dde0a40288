//! Pad configuration: raster sizes, pen parameters, and normalization knobs.
//!
//! The defaults reproduce the reference sizing: a 280×280 drawing surface,
//! a 28×28 classifier grid, a 20 px pen, and a 5-unit padding margin around
//! every ink cell of the scanned raster.

use std::path::Path;

/// Reference working-raster side the pen width is calibrated against.
pub(crate) const REFERENCE_WORKING_SIZE: u32 = 280;
/// Pen width at [`REFERENCE_WORKING_SIZE`].
pub(crate) const REFERENCE_STROKE_WIDTH: f32 = 20.0;

/// Errors produced while loading or validating a [`PadConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// Reading the config file failed.
    Io(std::io::Error),
    /// The config file is not valid JSON for [`PadConfig`].
    Parse(serde_json::Error),
    /// A field holds a value the pipeline cannot work with.
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config: {}", e),
            Self::Parse(e) => write!(f, "failed to parse config: {}", e),
            Self::Invalid(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

/// Interpolation kernel used by the resampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResampleFilter {
    /// Box average over each target cell's source footprint.
    #[default]
    Area,
    /// Bilinear interpolation at each target cell center.
    Bilinear,
}

/// Which raster the bounding-box extractor scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoxScan {
    /// Scan the working raster downscaled to target size; padding is in
    /// target-grid units and the box is mapped back to working coordinates.
    #[default]
    Probe,
    /// Scan the working raster directly; padding is multiplied by the
    /// working/target ratio so the effective margin matches `Probe`.
    Working,
}

/// Top-level pad configuration.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PadConfig {
    /// Side of the square working raster (pixels).
    pub working_size: u32,
    /// Side of the square target raster handed to the encoder.
    pub target_size: u32,
    /// Pen width in working pixels.
    pub stroke_width: f32,
    /// Padding added around every ink cell of the scanned raster.
    pub padding: i32,
    /// Background intensity.
    pub background: u8,
    /// Ink intensity.
    pub ink: u8,
    /// A cell counts as ink iff its intensity is strictly below this value.
    pub background_threshold: u8,
    /// Resampling kernel.
    pub filter: ResampleFilter,
    /// Box scan resolution.
    pub box_scan: BoxScan,
}

impl Default for PadConfig {
    fn default() -> Self {
        Self {
            working_size: REFERENCE_WORKING_SIZE,
            target_size: 28,
            stroke_width: REFERENCE_STROKE_WIDTH,
            padding: 5,
            background: 255,
            ink: 0,
            background_threshold: 255,
            filter: ResampleFilter::Area,
            box_scan: BoxScan::Probe,
        }
    }
}

impl PadConfig {
    /// Default configuration for a different working raster size.
    ///
    /// The pen width is rescaled to keep the 280:20 reference ratio.
    pub fn for_working_size(working_size: u32) -> Self {
        let scale = working_size as f32 / REFERENCE_WORKING_SIZE as f32;
        Self {
            working_size,
            stroke_width: REFERENCE_STROKE_WIDTH * scale,
            ..Self::default()
        }
    }

    /// Number of values in the encoded tensor.
    pub fn tensor_len(&self) -> usize {
        (self.target_size as usize) * (self.target_size as usize)
    }

    /// Working pixels per target cell.
    pub fn working_per_target(&self) -> f64 {
        self.working_size as f64 / self.target_size as f64
    }

    /// Check that the configuration can drive the pipeline.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.working_size == 0 {
            return Err(ConfigError::Invalid("working_size must be >= 1".to_string()));
        }
        if self.target_size == 0 {
            return Err(ConfigError::Invalid("target_size must be >= 1".to_string()));
        }
        if self.target_size > self.working_size {
            return Err(ConfigError::Invalid(format!(
                "target_size ({}) must not exceed working_size ({})",
                self.target_size, self.working_size
            )));
        }
        if !self.stroke_width.is_finite() || self.stroke_width <= 0.0 {
            return Err(ConfigError::Invalid(
                "stroke_width must be finite and > 0".to_string(),
            ));
        }
        if self.padding < 0 {
            return Err(ConfigError::Invalid("padding must be >= 0".to_string()));
        }
        if self.ink >= self.background_threshold {
            return Err(ConfigError::Invalid(format!(
                "ink ({}) must be below background_threshold ({})",
                self.ink, self.background_threshold
            )));
        }
        if self.background < self.background_threshold {
            return Err(ConfigError::Invalid(format!(
                "background ({}) must not be below background_threshold ({})",
                self.background, self.background_threshold
            )));
        }
        Ok(())
    }

    /// Load and validate a configuration from a JSON file.
    ///
    /// Missing fields take their default values.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// Parse and validate a configuration from a JSON string.
    pub fn from_json_str(data: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }
}
