//! Shared test utilities: synthetic rasters and stub collaborators.

use std::cell::RefCell;
use std::rc::Rc;

use image::{GrayImage, Luma};

use crate::classifier::{Classifier, ProbabilityVector, Renderer};
use crate::encode::InputTensor;

/// Square raster filled with one intensity.
pub(crate) fn blank_raster(size: u32, value: u8) -> GrayImage {
    GrayImage::from_pixel(size, size, Luma([value]))
}

/// Fill a `w × h` rectangle whose top-left corner is `(x, y)`.
pub(crate) fn fill_rect(img: &mut GrayImage, x: u32, y: u32, w: u32, h: u32, value: u8) {
    for yy in y..(y + h).min(img.height()) {
        for xx in x..(x + w).min(img.width()) {
            img.put_pixel(xx, yy, Luma([value]));
        }
    }
}

/// Number of cells strictly below `threshold`.
pub(crate) fn ink_count(img: &GrayImage, threshold: u8) -> usize {
    img.pixels().filter(|p| p[0] < threshold).count()
}

/// Points on a closed circle, first point repeated at the end.
pub(crate) fn loop_points(center: [f32; 2], radius: f32, n: usize) -> Vec<[f32; 2]> {
    (0..=n)
        .map(|i| {
            let t = i as f32 / n as f32 * std::f32::consts::TAU;
            [center[0] + radius * t.cos(), center[1] + radius * t.sin()]
        })
        .collect()
}

/// Serialize layers `(rows, cols, weights_row_major, bias)` into a weights blob.
pub(crate) fn weights_blob(layers: &[(usize, usize, Vec<f32>, Vec<f32>)]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(layers.len() as i32).to_le_bytes());
    for (rows, cols, weights, bias) in layers {
        out.extend_from_slice(&(*rows as i32).to_le_bytes());
        out.extend_from_slice(&(*cols as i32).to_le_bytes());
        for w in weights {
            out.extend_from_slice(&w.to_le_bytes());
        }
        out.extend_from_slice(&(bias.len() as i32).to_le_bytes());
        for b in bias {
            out.extend_from_slice(&b.to_le_bytes());
        }
    }
    out
}

/// Classifier that returns a fixed vector and records every tensor it sees.
#[derive(Clone)]
pub(crate) struct FixedClassifier {
    pub scores: ProbabilityVector,
    pub input_len: usize,
    pub seen: Rc<RefCell<Vec<InputTensor>>>,
}

impl FixedClassifier {
    pub fn new(scores: ProbabilityVector) -> Self {
        Self {
            scores,
            input_len: 784,
            seen: Rc::default(),
        }
    }
}

impl Classifier for FixedClassifier {
    fn input_len(&self) -> usize {
        self.input_len
    }

    fn predict(&self, tensor: &InputTensor) -> ProbabilityVector {
        self.seen.borrow_mut().push(tensor.clone());
        self.scores
    }
}

/// Renderer that records every vector it is handed.
#[derive(Clone, Default)]
pub(crate) struct RecordingRenderer {
    pub frames: Rc<RefCell<Vec<ProbabilityVector>>>,
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, scores: &ProbabilityVector) {
        self.frames.borrow_mut().push(*scores);
    }
}

/// Scores with a single non-zero entry.
pub(crate) fn one_hot(class: usize) -> ProbabilityVector {
    let mut v = ProbabilityVector::zeros();
    v.0[class] = 1.0;
    v
}
