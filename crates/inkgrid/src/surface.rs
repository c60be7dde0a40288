//! Stroke surface: accumulates pen strokes into the working raster.
//!
//! Strokes are not retained. Each `extend_stroke` call rasterizes one
//! segment (round caps and joins) directly into the raster; only the last
//! point of the active stroke is remembered so the next segment can connect.

use image::{GrayImage, Luma};
use imageproc::drawing::{draw_filled_circle_mut, draw_polygon_mut};
use imageproc::point::Point;

use crate::config::PadConfig;

/// Precondition violations reported by [`StrokeSurface`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceError {
    /// `extend_stroke` was called outside `begin_stroke`/`end_stroke`.
    NoActiveStroke,
    /// A stroke point has a NaN or infinite coordinate.
    NonFinitePoint([f32; 2]),
    /// A stroke point lies more than one raster size outside the raster.
    OutOfRange([f32; 2]),
}

impl std::fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoActiveStroke => write!(f, "no active stroke; call begin_stroke first"),
            Self::NonFinitePoint(p) => write!(f, "non-finite stroke point ({}, {})", p[0], p[1]),
            Self::OutOfRange(p) => write!(f, "stroke point ({}, {}) is out of range", p[0], p[1]),
        }
    }
}

impl std::error::Error for SurfaceError {}

/// Pen parameters applied at `begin_stroke`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenStyle {
    /// Line width in working pixels.
    pub width: f32,
    /// Ink intensity.
    pub ink: u8,
}

#[derive(Debug, Clone, Copy)]
struct ActiveStroke {
    pen: PenStyle,
    last: Option<[f32; 2]>,
}

/// Persistent drawing surface owning the working raster.
#[derive(Debug, Clone)]
pub struct StrokeSurface {
    raster: GrayImage,
    pen: PenStyle,
    background: u8,
    active: Option<ActiveStroke>,
}

impl StrokeSurface {
    /// Create a surface filled with background.
    pub fn new(config: &PadConfig) -> Self {
        let raster = GrayImage::from_pixel(
            config.working_size,
            config.working_size,
            Luma([config.background]),
        );
        Self {
            raster,
            pen: PenStyle {
                width: config.stroke_width,
                ink: config.ink,
            },
            background: config.background,
            active: None,
        }
    }

    /// Mark pen-down and start a new stroke segment.
    ///
    /// A stroke already in progress is abandoned; its ink stays on the raster.
    pub fn begin_stroke(&mut self) {
        self.active = Some(ActiveStroke {
            pen: self.pen,
            last: None,
        });
    }

    /// Append `point` to the active stroke and rasterize the new segment.
    ///
    /// The first point of a stroke stamps a single round dot. Points may
    /// fall off the raster, but only within one raster size of its edges.
    pub fn extend_stroke(&mut self, point: [f32; 2]) -> Result<(), SurfaceError> {
        if !point[0].is_finite() || !point[1].is_finite() {
            return Err(SurfaceError::NonFinitePoint(point));
        }
        if !self.in_range(point) {
            return Err(SurfaceError::OutOfRange(point));
        }
        let stroke = self.active.as_mut().ok_or(SurfaceError::NoActiveStroke)?;
        let from = stroke.last.unwrap_or(point);
        stroke.last = Some(point);
        let pen = stroke.pen;
        rasterize_segment(&mut self.raster, pen, from, point);
        Ok(())
    }

    /// Mark pen-up. Segments are committed as they are drawn, so nothing
    /// is pending here; calling this with no active stroke is a no-op.
    pub fn end_stroke(&mut self) {
        self.active = None;
    }

    /// Fill the raster with background. The pen state is untouched, so a
    /// stroke in progress keeps drawing onto the cleared raster.
    pub fn reset(&mut self) {
        let bg = Luma([self.background]);
        for p in self.raster.pixels_mut() {
            *p = bg;
        }
    }

    /// Whether a stroke is active (pen down).
    pub fn is_drawing(&self) -> bool {
        self.active.is_some()
    }

    /// Read-only view of the working raster.
    pub fn raster(&self) -> &GrayImage {
        &self.raster
    }

    /// Pen parameters used by the next stroke.
    pub fn pen(&self) -> PenStyle {
        self.pen
    }

    fn in_range(&self, point: [f32; 2]) -> bool {
        let (w, h) = self.raster.dimensions();
        let (w, h) = (w as f32, h as f32);
        (-w..=2.0 * w).contains(&point[0]) && (-h..=2.0 * h).contains(&point[1])
    }
}

fn rasterize_segment(raster: &mut GrayImage, pen: PenStyle, from: [f32; 2], to: [f32; 2]) {
    let half = 0.5 * pen.width;
    let color = Luma([pen.ink]);
    stamp_disc(raster, to, half, color);

    let dx = to[0] - from[0];
    let dy = to[1] - from[1];
    let len = (dx * dx + dy * dy).sqrt();
    if len < 1e-3 {
        return;
    }
    stamp_disc(raster, from, half, color);

    // Body of the segment: a quad offset by the half-width along the normal.
    let nx = -dy / len * half;
    let ny = dx / len * half;
    let quad = [
        to_point(from[0] + nx, from[1] + ny),
        to_point(to[0] + nx, to[1] + ny),
        to_point(to[0] - nx, to[1] - ny),
        to_point(from[0] - nx, from[1] - ny),
    ];
    if quad[0] != quad[3] {
        draw_polygon_mut(raster, &quad, color);
    }
}

fn stamp_disc(raster: &mut GrayImage, center: [f32; 2], radius: f32, color: Luma<u8>) {
    let c = to_point(center[0], center[1]);
    draw_filled_circle_mut(raster, (c.x, c.y), radius.round() as i32, color);
}

#[inline]
fn to_point(x: f32, y: f32) -> Point<i32> {
    Point::new(x.round() as i32, y.round() as i32)
}
