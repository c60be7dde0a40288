//! Seams to the external classifier and score renderer.

use crate::encode::InputTensor;

/// Number of output classes (digits 0–9).
pub const NUM_CLASSES: usize = 10;

/// Per-class scores produced by a [`Classifier`].
///
/// Treated as opaque display values; they need not sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ProbabilityVector(pub [f32; NUM_CLASSES]);

impl ProbabilityVector {
    /// All-zero scores, shown when the pad is cleared.
    pub fn zeros() -> Self {
        Self([0.0; NUM_CLASSES])
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Index and value of the highest score. Ties resolve to the lowest index.
    pub fn argmax(&self) -> (usize, f32) {
        self.0
            .iter()
            .copied()
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |best, (i, v)| {
                if v > best.1 {
                    (i, v)
                } else {
                    best
                }
            })
    }

    /// Build from a slice; `None` unless it holds exactly [`NUM_CLASSES`] values.
    pub fn from_slice(values: &[f32]) -> Option<Self> {
        <[f32; NUM_CLASSES]>::try_from(values).ok().map(Self)
    }
}

/// Black-box digit classifier.
///
/// Callers always pass a tensor of the length the classifier was built for.
pub trait Classifier {
    /// Expected tensor length.
    fn input_len(&self) -> usize;
    /// Score one tensor.
    fn predict(&self, tensor: &InputTensor) -> ProbabilityVector;
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn input_len(&self) -> usize {
        (**self).input_len()
    }

    fn predict(&self, tensor: &InputTensor) -> ProbabilityVector {
        (**self).predict(tensor)
    }
}

/// Display sink for scores. Must return promptly.
pub trait Renderer {
    fn render(&mut self, scores: &ProbabilityVector);
}

impl<F: FnMut(&ProbabilityVector)> Renderer for F {
    fn render(&mut self, scores: &ProbabilityVector) {
        self(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_prefers_first_of_ties() {
        let mut v = ProbabilityVector::zeros();
        v.0[3] = 0.4;
        v.0[7] = 0.4;
        assert_eq!(v.argmax(), (3, 0.4));
    }

    #[test]
    fn from_slice_checks_length() {
        assert!(ProbabilityVector::from_slice(&[0.0; 9]).is_none());
        let v = ProbabilityVector::from_slice(&[0.1; 10]).unwrap();
        assert_eq!(v.as_slice().len(), NUM_CLASSES);
    }

    #[test]
    fn closures_render() {
        let mut seen = Vec::new();
        {
            let mut sink = |s: &ProbabilityVector| seen.push(*s);
            sink.render(&ProbabilityVector::zeros());
        }
        assert_eq!(seen, vec![ProbabilityVector::zeros()]);
    }
}
