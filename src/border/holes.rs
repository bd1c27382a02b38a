// src/border/holes.rs

//! Hole discovery for a single connected component.
//!
//! A hole is a maximal 4-connected set of background pixels strictly
//! enclosed by the component.  Each hole is reported with the bounding box
//! of its *border* (the hole's own bbox widened by one pixel on each side,
//! which is where the surrounding foreground border pixels live) and with
//! the seed pixel the tracer starts from.

use log::warn;

use crate::cc::{self, Connectivity};
use crate::image::bitmap::Bitmap;
use crate::image::fill::holes_mask;
use crate::image::geom::{Point, Rect};
use crate::utils::error::Result;

/// One hole of a component, in the component's local coordinates.
#[derive(Clone, Debug)]
pub struct Hole {
    /// Bounding box of the hole border: the hole bbox widened by 1.
    pub bbox: Rect,
    /// First border pixel: the first foreground pixel right of the hole
    /// on the hole's top row.
    pub seed: Point,
}

/// Finds all holes of the component in `pix`, in discovery order
/// (raster order of the 4-connected background fill).
///
/// The seed scan starts from the hole's own component bitmap, not from the
/// parent bbox, so a hole nested inside the bounding box of a larger hole
/// cannot hijack the scan.
pub fn find_holes(pix: &Bitmap) -> Result<Vec<Hole>> {
    let mask = holes_mask(pix)?;
    if mask.is_blank() {
        return Ok(Vec::new());
    }

    let width = pix.width();
    let mut holes = Vec::new();
    for hole_cc in cc::segment(&mask, Connectivity::Four)? {
        // First hole pixel on the top row, in component coordinates.
        let Some((hx, _)) = hole_cc.bitmap.next_foreground(0, 0) else {
            warn!("no hole pixel found on top row of hole component");
            continue;
        };
        let ys = hole_cc.bbox.y;
        let mut seed = None;
        for x in (hole_cc.bbox.x + hx as i32) as u32..width {
            if pix.get(x, ys as u32) {
                seed = Some(Point::new(x as i32, ys));
                break;
            }
        }
        let Some(seed) = seed else {
            warn!("no border pixel found right of hole at row {}", ys);
            continue;
        };
        holes.push(Hole {
            bbox: hole_cc.bbox.widened(1),
            seed,
        });
    }
    Ok(holes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annulus_5x5() -> Bitmap {
        let mut bm = Bitmap::new(5, 5).unwrap();
        for i in 0..5 {
            bm.set(i, 0, true);
            bm.set(i, 4, true);
            bm.set(0, i, true);
            bm.set(4, i, true);
        }
        bm
    }

    #[test]
    fn solid_component_has_no_holes() {
        let mut bm = Bitmap::new(3, 3).unwrap();
        for y in 0..3 {
            for x in 0..3 {
                bm.set(x, y, true);
            }
        }
        assert!(find_holes(&bm).unwrap().is_empty());
    }

    #[test]
    fn annulus_has_one_widened_hole() {
        let holes = find_holes(&annulus_5x5()).unwrap();
        assert_eq!(holes.len(), 1);
        assert_eq!(holes[0].bbox, Rect::new(0, 0, 5, 5));
        assert_eq!(holes[0].seed, Point::new(4, 1));
    }

    #[test]
    fn two_holes_come_in_raster_order() {
        // 9x5 block with two 1x1 holes at (2,2) and (6,2)
        let mut bm = Bitmap::new(9, 5).unwrap();
        for y in 0..5 {
            for x in 0..9 {
                bm.set(x, y, true);
            }
        }
        bm.set(2, 2, false);
        bm.set(6, 2, false);
        let holes = find_holes(&bm).unwrap();
        assert_eq!(holes.len(), 2);
        assert_eq!(holes[0].bbox, Rect::new(1, 1, 3, 3));
        assert_eq!(holes[1].bbox, Rect::new(5, 1, 3, 3));
        assert_eq!(holes[0].seed, Point::new(3, 2));
        assert_eq!(holes[1].seed, Point::new(7, 2));
    }

    #[test]
    fn background_touching_the_frame_is_not_a_hole() {
        // a U shape: the notch opens to the frame
        let mut bm = Bitmap::new(5, 4).unwrap();
        for y in 0..4 {
            bm.set(0, y, true);
            bm.set(4, y, true);
        }
        for x in 0..5 {
            bm.set(x, 3, true);
        }
        assert!(find_holes(&bm).unwrap().is_empty());
    }
}
