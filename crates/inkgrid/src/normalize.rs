//! Working raster → target raster → input tensor.
//!
//! One pass locates the ink, copies the padded box onto the target grid,
//! and encodes the result. An empty raster short-circuits to a background
//! target and an all-zero tensor.

use image::GrayImage;

use crate::bbox::{extract_bounding_box, BoundingBox};
use crate::config::{BoxScan, PadConfig};
use crate::encode::{encode_pixels, InputTensor};
use crate::resample::{resample, SourceRegion};

/// Output of one normalization pass.
#[derive(Debug, Clone)]
pub struct Normalized {
    /// Ink box in scan-raster coordinates (`None` for an empty raster).
    pub bbox: Option<BoundingBox>,
    /// Box mapped into working-raster coordinates.
    pub region: Option<SourceRegion>,
    /// `target_size × target_size` raster.
    pub target: GrayImage,
    /// Encoded classifier input.
    pub tensor: InputTensor,
}

/// Stateless normalization pass driven by a [`PadConfig`].
#[derive(Debug, Clone)]
pub struct Normalizer {
    config: PadConfig,
}

impl Normalizer {
    pub fn new(config: PadConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PadConfig {
        &self.config
    }

    /// Find the ink box and its working-raster region.
    pub fn locate(&self, working: &GrayImage) -> Option<(BoundingBox, SourceRegion)> {
        let cfg = &self.config;
        let (w, h) = working.dimensions();
        let scale_x = w as f64 / cfg.target_size as f64;
        let scale_y = h as f64 / cfg.target_size as f64;

        match cfg.box_scan {
            BoxScan::Probe => {
                let probe = resample(
                    working,
                    SourceRegion::full(w, h),
                    cfg.target_size,
                    cfg.filter,
                    cfg.background,
                );
                let bbox = extract_bounding_box(&probe, cfg.padding, cfg.background_threshold)?;
                Some((bbox, bbox.to_region(scale_x, scale_y)))
            }
            BoxScan::Working => {
                let padding = (cfg.padding as f64 * scale_x.max(scale_y)).round() as i32;
                let bbox = extract_bounding_box(working, padding, cfg.background_threshold)?;
                Some((bbox, bbox.to_region(1.0, 1.0)))
            }
        }
    }

    /// Run the full pass on `working`.
    pub fn normalize(&self, working: &GrayImage) -> Normalized {
        let cfg = &self.config;
        let Some((bbox, region)) = self.locate(working) else {
            return Normalized {
                bbox: None,
                region: None,
                target: GrayImage::from_pixel(
                    cfg.target_size,
                    cfg.target_size,
                    image::Luma([cfg.background]),
                ),
                tensor: InputTensor::zeros(cfg.tensor_len()),
            };
        };

        let target = resample(working, region, cfg.target_size, cfg.filter, cfg.background);
        let tensor = encode_pixels(&target);
        Normalized {
            bbox: Some(bbox),
            region: Some(region),
            target,
            tensor,
        }
    }
}
