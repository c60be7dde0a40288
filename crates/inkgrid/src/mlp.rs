//! Dense ReLU network loaded from a little-endian weights blob.
//!
//! Blob layout (all values little-endian, 4 bytes each):
//!
//! ```text
//! i32 num_layers
//! repeat num_layers:
//!     i32 rows, i32 cols
//!     f32 × rows*cols        weights, row-major (rows = layer inputs)
//!     i32 bias_len
//!     f32 × bias_len         biases (bias_len = cols)
//! ```
//!
//! Forward pass: `x ← relu(x · W + b)` for every layer (the last one too),
//! followed by a softmax over the final activations.

use std::path::Path;

use nalgebra::{DMatrix, RowDVector};

use crate::classifier::{Classifier, ProbabilityVector, NUM_CLASSES};
use crate::encode::InputTensor;

/// Errors produced while parsing a weights blob.
#[derive(Debug)]
pub enum WeightsError {
    /// Reading the weights file failed.
    Io(std::io::Error),
    /// The blob ended before a field could be read.
    Truncated {
        /// Byte offset of the field.
        offset: usize,
        /// Bytes required for the field.
        needed: usize,
    },
    /// A header value or layer chain is inconsistent.
    InvalidShape(String),
}

impl std::fmt::Display for WeightsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read weights: {}", e),
            Self::Truncated { offset, needed } => write!(
                f,
                "weights truncated: need {} bytes at offset {}",
                needed, offset
            ),
            Self::InvalidShape(msg) => write!(f, "invalid weights shape: {}", msg),
        }
    }
}

impl std::error::Error for WeightsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for WeightsError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

struct BlobReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> BlobReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn take4(&mut self) -> Result<[u8; 4], WeightsError> {
        let end = self.offset + 4;
        let bytes = self
            .data
            .get(self.offset..end)
            .ok_or(WeightsError::Truncated {
                offset: self.offset,
                needed: 4,
            })?;
        self.offset = end;
        let mut out = [0u8; 4];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    fn i32(&mut self) -> Result<i32, WeightsError> {
        self.take4().map(i32::from_le_bytes)
    }

    fn f32(&mut self) -> Result<f32, WeightsError> {
        self.take4().map(f32::from_le_bytes)
    }

    fn dim(&mut self, what: &str) -> Result<usize, WeightsError> {
        let v = self.i32()?;
        if v <= 0 {
            return Err(WeightsError::InvalidShape(format!(
                "{} must be > 0, got {}",
                what, v
            )));
        }
        Ok(v as usize)
    }

    /// Fail early when `count` f32 values cannot fit in the remaining bytes.
    fn ensure_f32s(&self, count: usize) -> Result<(), WeightsError> {
        let needed = count.saturating_mul(4);
        if self.data.len().saturating_sub(self.offset) < needed {
            return Err(WeightsError::Truncated {
                offset: self.offset,
                needed,
            });
        }
        Ok(())
    }
}

/// One dense layer: `x · weights + bias`.
#[derive(Debug, Clone)]
struct DenseLayer {
    weights: DMatrix<f32>,
    bias: RowDVector<f32>,
}

/// Multi-layer perceptron classifier.
#[derive(Debug, Clone)]
pub struct MlpClassifier {
    layers: Vec<DenseLayer>,
}

impl MlpClassifier {
    /// Parse a weights blob.
    pub fn from_bytes(data: &[u8]) -> Result<Self, WeightsError> {
        let mut r = BlobReader::new(data);
        let num_layers = r.dim("num_layers")?;

        let mut layers: Vec<DenseLayer> = Vec::with_capacity(num_layers.min(64));
        for li in 0..num_layers {
            let rows = r.dim("rows")?;
            let cols = r.dim("cols")?;
            if let Some(prev) = layers.last() {
                if prev.weights.ncols() != rows {
                    return Err(WeightsError::InvalidShape(format!(
                        "layer {} expects {} inputs but layer {} has {} outputs",
                        li,
                        rows,
                        li - 1,
                        prev.weights.ncols()
                    )));
                }
            }

            r.ensure_f32s(rows.saturating_mul(cols))?;
            let mut values = Vec::with_capacity(rows * cols);
            for _ in 0..rows * cols {
                values.push(r.f32()?);
            }
            let weights = DMatrix::from_row_slice(rows, cols, &values);

            let bias_len = r.dim("bias_len")?;
            if bias_len != cols {
                return Err(WeightsError::InvalidShape(format!(
                    "layer {} bias has {} values, expected {}",
                    li, bias_len, cols
                )));
            }
            r.ensure_f32s(bias_len)?;
            let mut bias = Vec::with_capacity(bias_len);
            for _ in 0..bias_len {
                bias.push(r.f32()?);
            }

            layers.push(DenseLayer {
                weights,
                bias: RowDVector::from_vec(bias),
            });
        }

        let out_width = layers.last().map(|l| l.weights.ncols()).unwrap_or(0);
        if out_width != NUM_CLASSES {
            return Err(WeightsError::InvalidShape(format!(
                "final layer has {} outputs, expected {}",
                out_width, NUM_CLASSES
            )));
        }
        if r.offset != data.len() {
            tracing::warn!(
                "ignoring {} trailing bytes after weights",
                data.len() - r.offset
            );
        }

        tracing::debug!(
            "loaded MLP: {} layers, {} inputs",
            layers.len(),
            layers[0].weights.nrows()
        );
        Ok(Self { layers })
    }

    /// Read and parse a weights file.
    pub fn from_file(path: &Path) -> Result<Self, WeightsError> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Number of dense layers.
    pub fn n_layers(&self) -> usize {
        self.layers.len()
    }
}

impl Classifier for MlpClassifier {
    fn input_len(&self) -> usize {
        self.layers[0].weights.nrows()
    }

    fn predict(&self, tensor: &InputTensor) -> ProbabilityVector {
        if tensor.len() != self.input_len() {
            tracing::warn!(
                "tensor has {} values, classifier expects {}; scoring as zeros",
                tensor.len(),
                self.input_len()
            );
            return ProbabilityVector::zeros();
        }

        let mut x = RowDVector::from_vec(tensor.as_slice().to_vec());
        for layer in &self.layers {
            x = &x * &layer.weights + &layer.bias;
            x.apply(|v| *v = v.max(0.0));
        }
        softmax(x.as_slice())
    }
}

fn softmax(logits: &[f32]) -> ProbabilityVector {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut out = [0.0f32; NUM_CLASSES];
    for (o, &l) in out.iter_mut().zip(logits) {
        *o = (l - max).exp();
    }
    let sum: f32 = out.iter().sum();
    for o in &mut out {
        *o /= sum;
    }
    ProbabilityVector(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::weights_blob;
    use approx::assert_relative_eq;

    #[test]
    fn bias_only_network_is_softmax_of_bias() {
        let bias: Vec<f32> = (0..10).map(|i| i as f32 * 0.5).collect();
        let blob = weights_blob(&[(784, 10, vec![0.0; 7840], bias.clone())]);
        let mlp = MlpClassifier::from_bytes(&blob).unwrap();
        assert_eq!(mlp.input_len(), 784);
        assert_eq!(mlp.n_layers(), 1);

        let p = mlp.predict(&InputTensor::zeros(784));
        let denom: f32 = bias.iter().map(|b| b.exp()).sum();
        for (i, b) in bias.iter().enumerate() {
            assert_relative_eq!(p.0[i], b.exp() / denom, epsilon = 1e-6);
        }
        assert_relative_eq!(p.0.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
        assert_eq!(p.argmax().0, 9);
    }

    #[test]
    fn two_layers_route_ink_to_class() {
        // Hidden unit h = sum of inputs; output k=4 reads h, others stay 0.
        let hidden = 2;
        let w1: Vec<f32> = (0..784 * hidden)
            .map(|i| if i % hidden == 0 { 1.0 } else { 0.0 })
            .collect();
        let mut w2 = vec![0.0; hidden * 10];
        w2[4] = 1.0;
        let blob = weights_blob(&[
            (784, hidden, w1, vec![0.0; hidden]),
            (hidden, 10, w2, vec![0.0; 10]),
        ]);
        let mlp = MlpClassifier::from_bytes(&blob).unwrap();

        let mut values = vec![0.0; 784];
        values[100] = 1.0;
        values[200] = 1.0;
        assert_eq!(mlp.predict(&InputTensor::from(values)).argmax().0, 4);
    }

    #[test]
    fn relu_clamps_final_layer() {
        let mut bias = vec![0.0; 10];
        bias[2] = -5.0;
        let blob = weights_blob(&[(784, 10, vec![0.0; 7840], bias)]);
        let p = MlpClassifier::from_bytes(&blob)
            .unwrap()
            .predict(&InputTensor::zeros(784));
        // Negative logit is clamped to zero, so every class ties at 1/10.
        for v in p.0 {
            assert_relative_eq!(v, 0.1, epsilon = 1e-6);
        }
    }

    #[test]
    fn truncated_blob_is_rejected() {
        let blob = weights_blob(&[(784, 10, vec![0.0; 7840], vec![0.0; 10])]);
        let err = MlpClassifier::from_bytes(&blob[..blob.len() - 3]).unwrap_err();
        assert!(matches!(err, WeightsError::Truncated { .. }), "{}", err);
        assert!(matches!(
            MlpClassifier::from_bytes(&[]),
            Err(WeightsError::Truncated { offset: 0, needed: 4 })
        ));
    }

    #[test]
    fn shape_errors_are_reported() {
        let wrong_out = weights_blob(&[(784, 3, vec![0.0; 784 * 3], vec![0.0; 3])]);
        assert!(matches!(
            MlpClassifier::from_bytes(&wrong_out),
            Err(WeightsError::InvalidShape(_))
        ));

        let broken_chain = weights_blob(&[
            (784, 4, vec![0.0; 784 * 4], vec![0.0; 4]),
            (5, 10, vec![0.0; 50], vec![0.0; 10]),
        ]);
        let err = MlpClassifier::from_bytes(&broken_chain).unwrap_err();
        assert!(err.to_string().contains("layer 1"), "{}", err);

        let mut bad_bias = weights_blob(&[(784, 10, vec![0.0; 7840], vec![0.0; 10])]);
        // Patch bias_len (right after header + dims + weights) to 9.
        let at = 4 + 8 + 7840 * 4;
        bad_bias[at..at + 4].copy_from_slice(&9i32.to_le_bytes());
        assert!(matches!(
            MlpClassifier::from_bytes(&bad_bias),
            Err(WeightsError::InvalidShape(_))
        ));
    }

    #[test]
    fn zero_layers_is_rejected() {
        let blob = 0i32.to_le_bytes();
        assert!(matches!(
            MlpClassifier::from_bytes(&blob),
            Err(WeightsError::InvalidShape(_))
        ));
    }
}
