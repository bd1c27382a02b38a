// src/border/render.rs

//! Raster reconstruction from borders.
//!
//! Two independent procedures rebuild the filled image from border pixel
//! lists alone, serving as correctness oracles for the tracer:
//!
//! * the **topological** method fills the exterior border from outside
//!   and each hole from an inside seed, XORing the pieces together;
//! * the **unified** method treats every border identically: one outside
//!   seed per border, a joint 4-fill clipped by the union of borders,
//!   then an inversion.
//!
//! Both must produce identical rasters for any traced component.

use crate::border::record::{BorderSet, CcBorder, TraceOptions};
use crate::border::tracer::outside_seed_pixel;
use crate::image::bitmap::Bitmap;
use crate::image::fill::{fill_closed_borders, seedfill_binary_4};
use crate::image::geom::Point;
use crate::utils::error::Result;

/// Renders every border pixel of every component, in global coordinates.
pub fn render_outlines(set: &BorderSet) -> Result<Bitmap> {
    let mut canvas = Bitmap::new(set.width(), set.height())?;
    for ccb in set {
        for border in ccb.global() {
            for p in border {
                plot(&mut canvas, *p);
            }
        }
    }
    Ok(canvas)
}

/// Renders the stitched single path of every component.
pub fn render_single_paths(set: &BorderSet, opts: &TraceOptions) -> Result<Bitmap> {
    let mut canvas = Bitmap::new(set.width(), set.height())?;
    for ccb in set {
        for p in ccb.single_path_global(opts)? {
            plot(&mut canvas, *p);
        }
    }
    Ok(canvas)
}

/// Reconstructs the filled image with the topological method.
pub fn render_filled_topological(set: &BorderSet) -> Result<Bitmap> {
    let mut canvas = Bitmap::new(set.width(), set.height())?;
    for ccb in set {
        let filled = fill_component_topological(ccb)?;
        canvas.xor_blit(&filled, ccb.bbox().x, ccb.bbox().y);
    }
    Ok(canvas)
}

/// Reconstructs the filled image with the unified-seed method.
pub fn render_filled_unified(set: &BorderSet) -> Result<Bitmap> {
    let mut canvas = Bitmap::new(set.width(), set.height())?;
    for ccb in set {
        let filled = fill_component_unified(ccb)?;
        canvas.xor_blit(&filled, ccb.bbox().x, ccb.bbox().y);
    }
    Ok(canvas)
}

/// Topological reconstruction of one component, in local coordinates.
///
/// The exterior border is filled from the outside inward, which also
/// fills the holes; each hole is then refilled from a seed strictly
/// inside it and XORed back out.  Filling holes from outside instead
/// would miss pixels behind diagonal pinches of the hole border, which is
/// why the inside seed exists at all.
pub(crate) fn fill_component_topological(ccb: &CcBorder) -> Result<Bitmap> {
    let bbox = ccb.bbox();
    let mut canvas = Bitmap::new(bbox.width, bbox.height)?;

    for (j, border) in ccb.locals().iter().enumerate() {
        // Hole borders are rendered relative to their own widened box.
        let (off_x, off_y, bw, bh) = if j == 0 {
            (0, 0, bbox.width, bbox.height)
        } else {
            let b = ccb.boxes()[j];
            (b.x, b.y, b.width, b.height)
        };

        let mut pixt = Bitmap::new(bw, bh)?;
        for p in border {
            plot(&mut pixt, p.translated(-off_x, -off_y));
        }

        let piece = if j == 0 {
            fill_closed_borders(&pixt)?
        } else {
            let first = border[0].translated(-off_x, -off_y);
            let second = border[1].translated(-off_x, -off_y);
            let seed_px = outside_seed_pixel(first, second);
            let mut seed = Bitmap::new(bw, bh)?;
            plot(&mut seed, seed_px);
            let mut mask = pixt;
            mask.invert();
            seedfill_binary_4(&mut seed, &mask);
            seed
        };
        canvas.xor_blit(&piece, off_x, off_y);
    }
    Ok(canvas)
}

/// Unified-seed reconstruction of one component, in local coordinates.
///
/// Works in a scratch bitmap with a one-pixel boundary so that every
/// outside seed has somewhere to live, even for borders hugging the box
/// edge.  A single-point border has no second pixel to derive a seed
/// from; the scratch corner is outside any border, so it serves.
pub(crate) fn fill_component_unified(ccb: &CcBorder) -> Result<Bitmap> {
    let bbox = ccb.bbox();
    let mut pixc = Bitmap::new(bbox.width + 2, bbox.height + 2)?;
    let mut pixs = Bitmap::new(bbox.width + 2, bbox.height + 2)?;

    for border in ccb.locals() {
        for p in border {
            plot(&mut pixc, p.translated(1, 1));
        }
        let seed_px = if border.len() > 1 {
            outside_seed_pixel(border[0].translated(1, 1), border[1].translated(1, 1))
        } else {
            Point::new(0, 0)
        };
        plot(&mut pixs, seed_px);
    }

    pixc.invert(); // clipping mask -> filling mask
    seedfill_binary_4(&mut pixs, &pixc);
    pixs.invert();
    pixs.crop(1, 1, bbox.width, bbox.height)
}

/// Sets a pixel from signed coordinates, ignoring out-of-range points.
fn plot(bm: &mut Bitmap, p: Point) {
    if p.x >= 0 && p.y >= 0 {
        bm.set(p.x as u32, p.y as u32, true);
    }
}
