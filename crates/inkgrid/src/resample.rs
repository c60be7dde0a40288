//! Scaled copy of a raster region onto a fixed square grid.
//!
//! The region is stretched independently along each axis to fill the whole
//! target, so a non-square region is distorted rather than letterboxed.
//! Reads outside the source raster return background.

use image::{GrayImage, Luma};

use crate::config::ResampleFilter;

/// Axis-aligned region of a source raster in (sub-)pixel units.
///
/// Pixel `(i, j)` covers `[i, i+1) × [j, j+1)`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SourceRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SourceRegion {
    /// Region covering an entire `width × height` raster.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f64,
            height: height as f64,
        }
    }

    fn is_degenerate(&self) -> bool {
        !(self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0)
    }
}

/// Copy `region` of `src` onto a new `size × size` raster.
///
/// The target starts filled with `background`; a degenerate region leaves it
/// untouched.
pub fn resample(
    src: &GrayImage,
    region: SourceRegion,
    size: u32,
    filter: ResampleFilter,
    background: u8,
) -> GrayImage {
    let mut out = GrayImage::from_pixel(size, size, Luma([background]));
    if size == 0 || region.is_degenerate() {
        return out;
    }
    match filter {
        ResampleFilter::Area => resample_area(src, region, &mut out, background),
        ResampleFilter::Bilinear => resample_bilinear(src, region, &mut out, background),
    }
    out
}

#[inline]
fn pixel_or_background(src: &GrayImage, x: i64, y: i64, background: u8) -> f64 {
    let (w, h) = src.dimensions();
    if x < 0 || y < 0 || x >= w as i64 || y >= h as i64 {
        background as f64
    } else {
        src.as_raw()[y as usize * w as usize + x as usize] as f64
    }
}

/// Source pixels overlapped by `[lo, hi)` with their overlap lengths.
fn axis_footprint(lo: f64, hi: f64) -> Vec<(i64, f64)> {
    let first = lo.floor() as i64;
    let last = hi.ceil() as i64;
    (first..last)
        .filter_map(|i| {
            let overlap = hi.min((i + 1) as f64) - lo.max(i as f64);
            (overlap > 0.0).then_some((i, overlap))
        })
        .collect()
}

fn axis_footprints(origin: f64, extent: f64, size: u32) -> Vec<Vec<(i64, f64)>> {
    let step = extent / size as f64;
    (0..size)
        .map(|t| {
            let lo = origin + t as f64 * step;
            axis_footprint(lo, lo + step)
        })
        .collect()
}

fn resample_area(src: &GrayImage, region: SourceRegion, out: &mut GrayImage, background: u8) {
    let size = out.width();
    let cols = axis_footprints(region.x, region.width, size);
    let rows = axis_footprints(region.y, region.height, size);

    for (ty, row) in rows.iter().enumerate() {
        for (tx, col) in cols.iter().enumerate() {
            let mut acc = 0.0;
            let mut weight = 0.0;
            for &(sy, wy) in row {
                for &(sx, wx) in col {
                    let w = wx * wy;
                    acc += w * pixel_or_background(src, sx, sy, background);
                    weight += w;
                }
            }
            if weight > 0.0 {
                out.put_pixel(tx as u32, ty as u32, Luma([to_u8(acc / weight)]));
            }
        }
    }
}

/// Bilinear sample at a sub-pixel position; pixel centers sit at integer
/// coordinates and neighbors outside the raster read as background.
#[inline]
fn bilinear_sample_or_background(src: &GrayImage, x: f64, y: f64, background: u8) -> f64 {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let p00 = pixel_or_background(src, x0, y0, background);
    let p10 = pixel_or_background(src, x0 + 1, y0, background);
    let p01 = pixel_or_background(src, x0, y0 + 1, background);
    let p11 = pixel_or_background(src, x0 + 1, y0 + 1, background);

    let top = p00 + fx * (p10 - p00);
    let bottom = p01 + fx * (p11 - p01);
    top + fy * (bottom - top)
}

fn resample_bilinear(src: &GrayImage, region: SourceRegion, out: &mut GrayImage, background: u8) {
    let size = out.width();
    let sx = region.width / size as f64;
    let sy = region.height / size as f64;
    for ty in 0..size {
        let v = region.y + (ty as f64 + 0.5) * sy - 0.5;
        for tx in 0..size {
            let u = region.x + (tx as f64 + 0.5) * sx - 0.5;
            let value = bilinear_sample_or_background(src, u, v, background);
            out.put_pixel(tx, ty, Luma([to_u8(value)]));
        }
    }
}

#[inline]
fn to_u8(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{blank_raster, fill_rect};

    #[test]
    fn degenerate_region_gives_background() {
        let src = blank_raster(280, 0);
        let region = SourceRegion {
            x: 10.0,
            y: 10.0,
            width: 0.0,
            height: 50.0,
        };
        for filter in [ResampleFilter::Area, ResampleFilter::Bilinear] {
            let out = resample(&src, region, 28, filter, 255);
            assert!(out.pixels().all(|p| p[0] == 255));
        }
    }

    #[test]
    fn area_downscale_averages_blocks() {
        let mut src = blank_raster(280, 255);
        fill_rect(&mut src, 0, 0, 10, 10, 0);
        fill_rect(&mut src, 10, 0, 5, 10, 0);
        let out = resample(&src, SourceRegion::full(280, 280), 28, ResampleFilter::Area, 255);
        assert_eq!(out.get_pixel(0, 0)[0], 0);
        assert_eq!(out.get_pixel(1, 0)[0], 128);
        assert_eq!(out.get_pixel(2, 0)[0], 255);
        assert_eq!(out.get_pixel(0, 1)[0], 255);
    }

    #[test]
    fn out_of_bounds_reads_background() {
        let src = blank_raster(280, 0);
        // Left half of the region lies before x = 0.
        let region = SourceRegion {
            x: -140.0,
            y: 0.0,
            width: 280.0,
            height: 280.0,
        };
        for filter in [ResampleFilter::Area, ResampleFilter::Bilinear] {
            let out = resample(&src, region, 28, filter, 255);
            assert_eq!(out.get_pixel(3, 14)[0], 255, "{:?}", filter);
            assert_eq!(out.get_pixel(24, 14)[0], 0, "{:?}", filter);
        }
    }

    #[test]
    fn wide_region_is_stretched_not_letterboxed() {
        // A 2 px tall horizontal bar inside a 200×20 region.
        let mut src = blank_raster(280, 255);
        fill_rect(&mut src, 40, 109, 200, 2, 0);
        let region = SourceRegion {
            x: 40.0,
            y: 100.0,
            width: 200.0,
            height: 20.0,
        };
        let out = resample(&src, region, 28, ResampleFilter::Area, 255);

        // Every column is inked: the bar spans the full target width.
        for x in 0..28 {
            let column_min = (0..28).map(|y| out.get_pixel(x, y)[0]).min().unwrap();
            assert!(column_min < 128, "column {} has no ink", x);
        }
        // Y is magnified 20/28 → 1.4 cells per source row: the 2 px bar
        // becomes roughly 3 target rows thick instead of a thin line.
        let inked_rows = (0..28).filter(|&y| out.get_pixel(14, y)[0] < 200).count();
        assert!((2..=4).contains(&inked_rows), "inked rows = {}", inked_rows);
        assert_eq!(out.get_pixel(14, 0)[0], 255);
        assert_eq!(out.get_pixel(14, 27)[0], 255);
    }

    #[test]
    fn bilinear_identity_scale_copies_pixels() {
        let mut src = blank_raster(28, 255);
        fill_rect(&mut src, 5, 7, 3, 2, 40);
        let out = resample(&src, SourceRegion::full(28, 28), 28, ResampleFilter::Bilinear, 255);
        assert_eq!(out, src);
    }
}
