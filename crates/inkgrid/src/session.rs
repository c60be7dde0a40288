//! Readiness gate in front of the classification pipeline.
//!
//! A session starts `Loading` with no classifier. Drawing is refused until
//! [`Session::finish_loading`] installs one; a load failure is terminal and
//! keeps the pad disabled with the failure message available for display.

use crate::classifier::{Classifier, ProbabilityVector, Renderer};
use crate::config::{ConfigError, PadConfig};
use crate::pipeline::ClassificationPipeline;
use crate::surface::SurfaceError;

/// Input events accepted by a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PadEvent {
    /// Pointer or touch pressed.
    Down,
    /// Pointer moved to a surface position.
    Move([f32; 2]),
    /// Pointer or touch released.
    Up,
    /// Clear button.
    Reset,
}

/// Coarse session state for UI gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Loading,
    Ready,
    Failed,
}

/// Errors returned by [`Session`] event handling.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// The classifier has not been installed yet.
    NotReady,
    /// Loading failed; the pad stays disabled.
    Failed(String),
    /// The surface rejected a stroke point.
    Surface(SurfaceError),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotReady => write!(f, "classifier is still loading"),
            Self::Failed(msg) => write!(f, "classifier failed to load: {}", msg),
            Self::Surface(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<SurfaceError> for SessionError {
    fn from(e: SurfaceError) -> Self {
        Self::Surface(e)
    }
}

enum State<C, R> {
    Loading { config: PadConfig, renderer: R },
    Ready(ClassificationPipeline<C, R>),
    Failed { reason: String, renderer: R },
}

/// Gated pad session.
pub struct Session<C, R> {
    state: State<C, R>,
}

impl<C: Classifier, R: Renderer> Session<C, R> {
    /// Start a session in the `Loading` state.
    pub fn new(config: PadConfig, renderer: R) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            state: State::Loading { config, renderer },
        })
    }

    /// Install the classifier (or record why it could not be loaded).
    ///
    /// Only the first call while `Loading` has an effect.
    pub fn finish_loading<E: std::fmt::Display>(self, loaded: Result<C, E>) -> Self {
        let state = match self.state {
            State::Loading { config, renderer } => match loaded {
                Ok(classifier) => {
                    match ClassificationPipeline::<C, R>::check_compatible(&config, &classifier) {
                        Ok(()) => {
                            let mut pipeline =
                                ClassificationPipeline::assemble(config, classifier, renderer);
                            pipeline.reset();
                            tracing::info!("classifier ready; pad enabled");
                            State::Ready(pipeline)
                        }
                        Err(e) => {
                            tracing::warn!("classifier rejected: {}", e);
                            State::Failed {
                                reason: e.to_string(),
                                renderer,
                            }
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("classifier failed to load: {}", e);
                    State::Failed {
                        reason: e.to_string(),
                        renderer,
                    }
                }
            },
            other => {
                tracing::warn!("finish_loading called on a session that is not loading");
                other
            }
        };
        Self { state }
    }

    pub fn readiness(&self) -> Readiness {
        match self.state {
            State::Loading { .. } => Readiness::Loading,
            State::Ready(_) => Readiness::Ready,
            State::Failed { .. } => Readiness::Failed,
        }
    }

    /// Load failure message, if any.
    pub fn failure(&self) -> Option<&str> {
        match &self.state {
            State::Failed { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// The running pipeline, once ready.
    pub fn pipeline(&self) -> Option<&ClassificationPipeline<C, R>> {
        match &self.state {
            State::Ready(p) => Some(p),
            _ => None,
        }
    }

    /// Renderer, in any state.
    pub fn renderer(&self) -> &R {
        match &self.state {
            State::Loading { renderer, .. } | State::Failed { renderer, .. } => renderer,
            State::Ready(p) => p.renderer(),
        }
    }

    fn pipeline_mut(&mut self) -> Result<&mut ClassificationPipeline<C, R>, SessionError> {
        match &mut self.state {
            State::Ready(p) => Ok(p),
            State::Loading { .. } => Err(SessionError::NotReady),
            State::Failed { reason, .. } => Err(SessionError::Failed(reason.clone())),
        }
    }

    /// Dispatch one input event.
    ///
    /// Returns the scores of the pass the event triggered, if any.
    pub fn handle(&mut self, event: PadEvent) -> Result<Option<ProbabilityVector>, SessionError> {
        let pipeline = self.pipeline_mut()?;
        match event {
            PadEvent::Down => pipeline.pointer_down(),
            PadEvent::Move(point) => return Ok(pipeline.pointer_move(point)?),
            PadEvent::Up => pipeline.pointer_up(),
            PadEvent::Reset => {
                pipeline.reset();
                return Ok(Some(pipeline.scores()));
            }
        }
        Ok(None)
    }
}
