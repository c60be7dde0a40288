//! Target raster → classifier input tensor.
//!
//! Values are row-major, normalized to [0, 1] and polarity-inverted:
//! `tensor[i] = 1 - raw[i] / 255`, so ink (0) maps to 1.0 and background
//! (255) maps to 0.0. Only the first channel of each pixel is read.

use image::{ImageBuffer, Pixel};

/// Encoding precondition violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// The raster is not the expected `size × size`.
    SizeMismatch {
        /// Expected `[width, height]`.
        expected: [u32; 2],
        /// Provided `[width, height]`.
        got: [u32; 2],
    },
}

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SizeMismatch { expected, got } => write!(
                f,
                "raster size mismatch: expected {}x{}, got {}x{}",
                expected[0], expected[1], got[0], got[1]
            ),
        }
    }
}

impl std::error::Error for EncodeError {}

/// Flat row-major classifier input.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct InputTensor(Vec<f32>);

impl InputTensor {
    /// All-zero tensor (no ink anywhere).
    pub fn zeros(len: usize) -> Self {
        Self(vec![0.0; len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.0
    }

    /// True when every value is exactly zero.
    pub fn is_blank(&self) -> bool {
        self.0.iter().all(|&v| v == 0.0)
    }
}

impl From<Vec<f32>> for InputTensor {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

/// Encode a single raw channel value.
#[inline]
pub fn encode_value(raw: u8) -> f32 {
    1.0 - raw as f32 / 255.0
}

/// Encode a `size × size` raster with 8-bit channels (Luma, Rgba, ...).
pub fn encode_tensor<P>(
    target: &ImageBuffer<P, Vec<u8>>,
    size: u32,
) -> Result<InputTensor, EncodeError>
where
    P: Pixel<Subpixel = u8>,
{
    let got = [target.width(), target.height()];
    if got != [size, size] {
        return Err(EncodeError::SizeMismatch {
            expected: [size, size],
            got,
        });
    }
    Ok(encode_pixels(target))
}

/// Encode every pixel in row-major order, whatever the raster size.
pub(crate) fn encode_pixels<P>(raster: &ImageBuffer<P, Vec<u8>>) -> InputTensor
where
    P: Pixel<Subpixel = u8>,
{
    InputTensor(
        raster
            .pixels()
            .map(|p| encode_value(p.channels()[0]))
            .collect(),
    )
}
