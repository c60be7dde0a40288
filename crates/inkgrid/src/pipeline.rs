//! Classification pipeline: pen state machine driving surface → normalizer
//! → classifier → renderer.
//!
//! Every accepted pointer move runs one full pass synchronously before
//! returning, so passes never overlap and the newest ink is always the one
//! classified.

use crate::classifier::{Classifier, ProbabilityVector, Renderer};
use crate::config::{ConfigError, PadConfig};
use crate::normalize::{Normalized, Normalizer};
use crate::surface::{StrokeSurface, SurfaceError};

/// Errors raised when assembling a pipeline.
#[derive(Debug)]
pub enum PipelineError {
    /// The configuration failed validation.
    Config(ConfigError),
    /// The classifier expects a different tensor length than the config produces.
    InputLenMismatch {
        /// Length produced by the encoder (`target_size²`).
        tensor: usize,
        /// Length the classifier accepts.
        classifier: usize,
    },
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(e) => write!(f, "{}", e),
            Self::InputLenMismatch { tensor, classifier } => write!(
                f,
                "classifier expects {} inputs but the pad encodes {}",
                classifier, tensor
            ),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::InputLenMismatch { .. } => None,
        }
    }
}

impl From<ConfigError> for PipelineError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Pen state of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenState {
    /// No pointer down.
    Idle,
    /// Pointer down; moves extend the stroke and trigger a pass.
    Drawing,
}

/// Map a client-space pointer position onto the surface.
///
/// `origin` is the client-space position of the surface's top-left corner.
pub fn client_to_surface(client: [f32; 2], origin: [f32; 2]) -> [f32; 2] {
    [client[0] - origin[0], client[1] - origin[1]]
}

/// Ready-to-draw pipeline owning the surface and both collaborators.
pub struct ClassificationPipeline<C, R> {
    normalizer: Normalizer,
    surface: StrokeSurface,
    classifier: C,
    renderer: R,
    scores: ProbabilityVector,
}

impl<C: Classifier, R: Renderer> ClassificationPipeline<C, R> {
    /// Validate `config` against `classifier` and build an idle pipeline
    /// with a blank surface.
    pub fn new(config: PadConfig, classifier: C, renderer: R) -> Result<Self, PipelineError> {
        Self::check_compatible(&config, &classifier)?;
        Ok(Self::assemble(config, classifier, renderer))
    }

    pub(crate) fn check_compatible(
        config: &PadConfig,
        classifier: &C,
    ) -> Result<(), PipelineError> {
        config.validate()?;
        if classifier.input_len() != config.tensor_len() {
            return Err(PipelineError::InputLenMismatch {
                tensor: config.tensor_len(),
                classifier: classifier.input_len(),
            });
        }
        Ok(())
    }

    pub(crate) fn assemble(config: PadConfig, classifier: C, renderer: R) -> Self {
        Self {
            surface: StrokeSurface::new(&config),
            normalizer: Normalizer::new(config),
            classifier,
            renderer,
            scores: ProbabilityVector::zeros(),
        }
    }

    pub fn pen_state(&self) -> PenState {
        if self.surface.is_drawing() {
            PenState::Drawing
        } else {
            PenState::Idle
        }
    }

    /// Idle → Drawing. Pressing again while drawing starts a fresh stroke.
    pub fn pointer_down(&mut self) {
        self.surface.begin_stroke();
    }

    /// Extend the stroke and classify. Returns `Ok(None)` while idle.
    pub fn pointer_move(
        &mut self,
        point: [f32; 2],
    ) -> Result<Option<ProbabilityVector>, SurfaceError> {
        if self.pen_state() == PenState::Idle {
            tracing::trace!("pointer move at ({}, {}) while idle", point[0], point[1]);
            return Ok(None);
        }
        self.surface.extend_stroke(point)?;
        Ok(Some(self.classify()))
    }

    /// Drawing → Idle.
    pub fn pointer_up(&mut self) {
        self.surface.end_stroke();
    }

    /// Clear the surface and show all-zero scores. Valid in either state.
    pub fn reset(&mut self) {
        self.surface.reset();
        self.scores = ProbabilityVector::zeros();
        self.renderer.render(&self.scores);
        tracing::debug!("pad reset ({:?})", self.pen_state());
    }

    /// Run one pass over the current raster and forward the scores.
    pub fn classify(&mut self) -> ProbabilityVector {
        let normalized = self.normalizer.normalize(self.surface.raster());
        tracing::debug!(
            "pass: bbox={:?} region={:?}",
            normalized.bbox,
            normalized.region
        );
        self.scores = self.classifier.predict(&normalized.tensor);
        self.renderer.render(&self.scores);
        self.scores
    }

    /// Normalize the current raster without classifying.
    pub fn inspect(&self) -> Normalized {
        self.normalizer.normalize(self.surface.raster())
    }

    /// Scores most recently forwarded to the renderer.
    pub fn scores(&self) -> ProbabilityVector {
        self.scores
    }

    pub fn surface(&self) -> &StrokeSurface {
        &self.surface
    }

    pub fn config(&self) -> &PadConfig {
        self.normalizer.config()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}
