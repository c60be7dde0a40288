//! inkgrid — stroke capture to classifier input for hand-drawn digits.
//!
//! Freeform ink drawn on a working raster is cropped, rescaled, and encoded
//! into the fixed 28×28 grid a digit classifier was trained on. The stages
//! are:
//!
//! 1. **Surface** – pen strokes rasterized onto a persistent working raster.
//! 2. **BBox** – union of per-ink-cell padded boxes on a probe (or working) raster.
//! 3. **Resample** – the box is stretched per axis onto the target grid.
//! 4. **Encode** – row-major `1 - v/255` tensor (ink → 1.0, background → 0.0).
//! 5. **Pipeline** – pen state machine running 2→4 on every move, then the
//!    classifier, then the renderer.
//!
//! # Public API
//! - [`Session`] gates drawing on classifier readiness; [`ClassificationPipeline`]
//!   is the ready pipeline it wraps.
//! - [`Normalizer`] runs the normalization pass on any working raster.
//! - [`Classifier`] and [`Renderer`] are the collaborator seams;
//!   [`MlpClassifier`] is a bundled dense-network classifier.
//! - [`PadConfig`] holds every tunable.

mod bbox;
mod classifier;
mod config;
mod encode;
mod mlp;
mod normalize;
mod pipeline;
mod resample;
mod session;
mod surface;

#[cfg(test)]
mod test_utils;

pub use bbox::{extract_bounding_box, BoundingBox};
pub use classifier::{Classifier, ProbabilityVector, Renderer, NUM_CLASSES};
pub use config::{BoxScan, ConfigError, PadConfig, ResampleFilter};
pub use encode::{encode_tensor, encode_value, EncodeError, InputTensor};
pub use mlp::{MlpClassifier, WeightsError};
pub use normalize::{Normalized, Normalizer};
pub use pipeline::{client_to_surface, ClassificationPipeline, PenState, PipelineError};
pub use resample::{resample, SourceRegion};
pub use session::{PadEvent, Readiness, Session, SessionError};
pub use surface::{PenStyle, StrokeSurface, SurfaceError};

/// Serializable summary of one normalization + classification pass.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PassReport {
    /// Working raster dimensions [width, height].
    pub working_size: [u32; 2],
    /// Ink box in scan-raster coordinates, if any ink was found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
    /// Box mapped into working-raster coordinates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<SourceRegion>,
    /// Encoded classifier input.
    pub tensor: InputTensor,
    /// Classifier scores, when a classifier was run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<ProbabilityVector>,
    /// Index of the top score.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted: Option<usize>,
}

impl PassReport {
    /// Build a report from a normalization result and optional scores.
    pub fn new(
        working_size: [u32; 2],
        normalized: &Normalized,
        scores: Option<ProbabilityVector>,
    ) -> Self {
        Self {
            working_size,
            bbox: normalized.bbox,
            region: normalized.region,
            tensor: normalized.tensor.clone(),
            scores,
            predicted: scores.map(|s| s.argmax().0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{blank_raster, one_hot};

    #[test]
    fn empty_report_omits_box() {
        let n = Normalizer::new(PadConfig::default()).normalize(&blank_raster(280, 255));
        let report = PassReport::new([280, 280], &n, None);
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("bbox").is_none());
        assert!(json.get("scores").is_none());
        assert_eq!(json["tensor"].as_array().unwrap().len(), 784);
    }

    #[test]
    fn report_carries_prediction() {
        let n = Normalizer::new(PadConfig::default()).normalize(&blank_raster(280, 255));
        let report = PassReport::new([280, 280], &n, Some(one_hot(6)));
        assert_eq!(report.predicted, Some(6));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["scores"].as_array().unwrap().len(), 10);
    }
}
