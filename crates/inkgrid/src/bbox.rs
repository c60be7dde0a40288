//! Bounding box of the ink on a raster.
//!
//! Every ink cell contributes its own box padded by `padding` in all four
//! directions, and the result is the union of those boxes. Coordinates are
//! not clamped to the raster, so a box may extend past any edge.

use image::GrayImage;

use crate::resample::SourceRegion;

/// Inclusive integer box in the coordinates of the scanned raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BoundingBox {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl BoundingBox {
    /// Horizontal extent `max_x - min_x`.
    pub fn width(&self) -> i32 {
        self.max_x - self.min_x
    }

    /// Vertical extent `max_y - min_y`.
    pub fn height(&self) -> i32 {
        self.max_y - self.min_y
    }

    /// Map the box into another raster's coordinates by per-axis scale factors.
    ///
    /// The region starts at `min * scale` and spans `(max - min) * scale`.
    pub fn to_region(&self, scale_x: f64, scale_y: f64) -> SourceRegion {
        SourceRegion {
            x: self.min_x as f64 * scale_x,
            y: self.min_y as f64 * scale_y,
            width: self.width() as f64 * scale_x,
            height: self.height() as f64 * scale_y,
        }
    }
}

/// Scan `raster` for cells with intensity strictly below `background_threshold`.
///
/// Returns `None` when no such cell exists.
pub fn extract_bounding_box(
    raster: &GrayImage,
    padding: i32,
    background_threshold: u8,
) -> Option<BoundingBox> {
    let mut bbox: Option<BoundingBox> = None;
    for (x, y, p) in raster.enumerate_pixels() {
        if p[0] >= background_threshold {
            continue;
        }
        let (x, y) = (x as i32, y as i32);
        let b = bbox.get_or_insert(BoundingBox {
            min_x: x - padding,
            min_y: y - padding,
            max_x: x + padding,
            max_y: y + padding,
        });
        b.min_x = b.min_x.min(x - padding);
        b.max_x = b.max_x.max(x + padding);
        b.min_y = b.min_y.min(y - padding);
        b.max_y = b.max_y.max(y + padding);
    }
    bbox
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::blank_raster;
    use image::Luma;

    #[test]
    fn empty_raster_has_no_box() {
        let img = blank_raster(28, 255);
        assert_eq!(extract_bounding_box(&img, 5, 255), None);
    }

    #[test]
    fn single_pixel_box_is_padded_per_side() {
        let mut img = blank_raster(280, 255);
        img.put_pixel(100, 140, Luma([0]));
        let b = extract_bounding_box(&img, 5, 255).unwrap();
        assert_eq!(
            b,
            BoundingBox {
                min_x: 95,
                min_y: 135,
                max_x: 105,
                max_y: 145,
            }
        );
        assert_eq!((b.width(), b.height()), (10, 10));
    }

    #[test]
    fn faint_ink_counts_below_threshold() {
        let mut img = blank_raster(28, 255);
        img.put_pixel(10, 12, Luma([254]));
        assert!(extract_bounding_box(&img, 5, 255).is_some());
        assert!(extract_bounding_box(&img, 5, 254).is_none());
    }

    #[test]
    fn box_is_not_clamped_at_edges() {
        let mut img = blank_raster(28, 255);
        img.put_pixel(0, 27, Luma([0]));
        let b = extract_bounding_box(&img, 5, 255).unwrap();
        assert_eq!(
            b,
            BoundingBox {
                min_x: -5,
                min_y: 22,
                max_x: 5,
                max_y: 32,
            }
        );
    }

    #[test]
    fn disjoint_ink_yields_union_of_padded_boxes() {
        let mut img = blank_raster(28, 255);
        img.put_pixel(3, 4, Luma([0]));
        img.put_pixel(20, 15, Luma([100]));
        let b = extract_bounding_box(&img, 5, 255).unwrap();
        assert_eq!(
            b,
            BoundingBox {
                min_x: -2,
                min_y: -1,
                max_x: 25,
                max_y: 20,
            }
        );
    }

    #[test]
    fn region_scales_each_axis() {
        let b = BoundingBox {
            min_x: 4,
            min_y: 10,
            max_x: 24,
            max_y: 20,
        };
        let r = b.to_region(10.0, 10.0);
        assert_eq!(r, SourceRegion { x: 40.0, y: 100.0, width: 200.0, height: 100.0 });
    }
}
