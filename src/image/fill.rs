// src/image/fill.rs

//! Binary seed-fill primitives.
//!
//! These are the raster collaborators of the hole finder and the two
//! border-reconstruction procedures: a 4-connected seed fill constrained by
//! a mask, filling of regions delimited by closed borders, and extraction
//! of the hole pixels of a single component.

use crate::image::bitmap::Bitmap;
use crate::utils::error::Result;

/// Grows the foreground of `seed` by 4-connected flood, constrained to the
/// foreground of `mask`.  Seed pixels outside the mask are discarded.
///
/// `seed` and `mask` must have identical dimensions.
pub fn seedfill_binary_4(seed: &mut Bitmap, mask: &Bitmap) {
    debug_assert_eq!(seed.dimensions(), mask.dimensions());
    let (w, h) = seed.dimensions();

    let mut stack: Vec<(u32, u32)> = Vec::new();
    let mut filled = match Bitmap::new(w, h) {
        Ok(bm) => bm,
        Err(_) => return,
    };
    for y in 0..h {
        for x in 0..w {
            if seed.get(x, y) && mask.get(x, y) {
                filled.set(x, y, true);
                stack.push((x, y));
            }
        }
    }

    while let Some((x, y)) = stack.pop() {
        let neighbors = [
            (x.wrapping_sub(1), y),
            (x + 1, y),
            (x, y.wrapping_sub(1)),
            (x, y + 1),
        ];
        for (nx, ny) in neighbors {
            if nx < w && ny < h && mask.get(nx, ny) && !filled.get(nx, ny) {
                filled.set(nx, ny, true);
                stack.push((nx, ny));
            }
        }
    }

    *seed = filled;
}

/// Fills the regions within and including closed borders.
///
/// The input contains only border pixels.  The complement is flooded
/// 4-connected from the image frame; whatever the flood cannot reach is
/// inside some border, so inverting the flood yields the borders with
/// their interiors (holes included) filled.
pub fn fill_closed_borders(borders: &Bitmap) -> Result<Bitmap> {
    let (w, h) = borders.dimensions();
    let mut mask = borders.clone();
    mask.invert();

    let mut seed = Bitmap::new(w, h)?;
    frame_seed(&mut seed, &mask);
    seedfill_binary_4(&mut seed, &mask);
    seed.invert();
    Ok(seed)
}

/// Returns the union of the hole pixels of a single component: background
/// pixels that are not 4-connected to the image frame.
pub fn holes_mask(cc: &Bitmap) -> Result<Bitmap> {
    let (w, h) = cc.dimensions();
    let mut mask = cc.clone();
    mask.invert();

    let mut seed = Bitmap::new(w, h)?;
    frame_seed(&mut seed, &mask);
    seedfill_binary_4(&mut seed, &mask);

    // holes = background minus frame-connected background
    let mut holes = mask;
    holes.xor_blit(&seed, 0, 0);
    Ok(holes)
}

/// Sets every frame pixel of `seed` that is foreground in `mask`.
fn frame_seed(seed: &mut Bitmap, mask: &Bitmap) {
    let (w, h) = mask.dimensions();
    for x in 0..w {
        if mask.get(x, 0) {
            seed.set(x, 0, true);
        }
        if mask.get(x, h - 1) {
            seed.set(x, h - 1, true);
        }
    }
    for y in 0..h {
        if mask.get(0, y) {
            seed.set(0, y, true);
        }
        if mask.get(w - 1, y) {
            seed.set(w - 1, y, true);
        }
    }
}
