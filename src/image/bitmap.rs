// src/image/bitmap.rs

//! The canonical 1 bit-per-pixel raster type.
//!
//! `Bitmap` stores pixels in row-major order inside a packed
//! `BitVec<u8, Msb0>`.  Pixel value `true` (1) is foreground.  All border
//! tracing, hole finding and reconstruction operate on this type; image
//! decoding is a host concern.

use bitvec::order::Msb0;
use bitvec::prelude::*;

use crate::utils::error::{CcbError, Result};

/// A bilevel image using MSB-first bit ordering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    width: usize,
    height: usize,
    bits: BitVec<u8, Msb0>,
}

impl Bitmap {
    /// Creates a new all-background bitmap.
    ///
    /// Zero dimensions and sizes that cannot be addressed are rejected.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CcbError::InvalidArg(format!(
                "bitmap dimensions must be nonzero, got {}x{}",
                width, height
            )));
        }
        let width_us = width as usize;
        let height_us = height as usize;
        let total_bits = match width_us.checked_mul(height_us) {
            Some(bits) if bits < (isize::MAX as usize) => bits,
            _ => {
                return Err(CcbError::InvalidArg(format!(
                    "bitmap dimensions {}x{} are too large",
                    width, height
                )));
            }
        };

        let mut bits = BitVec::with_capacity(total_bits);
        bits.resize(total_bits, false);
        Ok(Self {
            width: width_us,
            height: height_us,
            bits,
        })
    }

    pub fn width(&self) -> u32 {
        self.width as u32
    }

    pub fn height(&self) -> u32 {
        self.height as u32
    }

    /// Returns the dimensions as a tuple (width, height).
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width as u32, self.height as u32)
    }

    /// Gets the value of a pixel.  Panics when `(x, y)` is out of bounds;
    /// callers that cannot guarantee bounds use [`Bitmap::get_clipped`].
    #[inline(always)]
    pub fn get(&self, x: u32, y: u32) -> bool {
        assert!((x as usize) < self.width && (y as usize) < self.height);
        self.bits[y as usize * self.width + x as usize]
    }

    /// Gets a pixel, treating every out-of-range coordinate as background.
    ///
    /// This is what lets the tracer walk components that touch the physical
    /// image edge without ever allocating a padded copy.
    #[inline(always)]
    pub fn get_clipped(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return false;
        }
        self.bits[y as usize * self.width + x as usize]
    }

    /// Sets a pixel.  Out-of-range coordinates are ignored.
    pub fn set(&mut self, x: u32, y: u32, val: bool) {
        if (x as usize) < self.width && (y as usize) < self.height {
            let idx = y as usize * self.width + x as usize;
            self.bits.set(idx, val);
        }
    }

    /// True when no pixel is foreground.
    pub fn is_blank(&self) -> bool {
        self.bits.not_any()
    }

    /// Number of foreground pixels.
    pub fn count_foreground(&self) -> usize {
        self.bits.count_ones()
    }

    /// Scans left-to-right, top-to-bottom from `(x0, y0)` for the next
    /// foreground pixel.
    pub fn next_foreground(&self, x0: u32, y0: u32) -> Option<(u32, u32)> {
        let start = (y0 as usize).checked_mul(self.width)?.checked_add(x0 as usize)?;
        if start >= self.bits.len() {
            return None;
        }
        self.bits[start..].first_one().map(|off| {
            let idx = start + off;
            ((idx % self.width) as u32, (idx / self.width) as u32)
        })
    }

    /// Returns a copy padded with `n` background pixels on every side.
    pub fn with_border(&self, n: u32) -> Result<Self> {
        let mut out = Bitmap::new(self.width as u32 + 2 * n, self.height as u32 + 2 * n)?;
        for y in 0..self.height {
            for x in 0..self.width {
                if self.bits[y * self.width + x] {
                    out.set(x as u32 + n, y as u32 + n, true);
                }
            }
        }
        Ok(out)
    }

    /// Inverts every pixel in place.
    pub fn invert(&mut self) {
        for mut bit in self.bits.iter_mut() {
            *bit = !*bit;
        }
    }

    /// XORs `src` into `self` with its top-left corner at `(x, y)`,
    /// clipping to the destination.
    pub fn xor_blit(&mut self, src: &Bitmap, x: i32, y: i32) {
        for sy in 0..src.height {
            let dy = y + sy as i32;
            if dy < 0 || dy as usize >= self.height {
                continue;
            }
            for sx in 0..src.width {
                let dx = x + sx as i32;
                if dx < 0 || dx as usize >= self.width {
                    continue;
                }
                if src.bits[sy * src.width + sx] {
                    let idx = dy as usize * self.width + dx as usize;
                    let cur = self.bits[idx];
                    self.bits.set(idx, !cur);
                }
            }
        }
    }

    /// Copies the `rect`-sized region of `self` starting at `(x0, y0)` into
    /// a new bitmap.
    pub fn crop(&self, x0: u32, y0: u32, width: u32, height: u32) -> Result<Self> {
        if (x0 + width) as usize > self.width || (y0 + height) as usize > self.height {
            return Err(CcbError::InvalidArg(format!(
                "crop ({},{}) {}x{} exceeds bitmap {}x{}",
                x0, y0, width, height, self.width, self.height
            )));
        }
        let mut out = Bitmap::new(width, height)?;
        for y in 0..height {
            for x in 0..width {
                if self.get(x0 + x, y0 + y) {
                    out.set(x, y, true);
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_rejects_zero_dimension() {
        assert!(Bitmap::new(0, 10).is_err());
        assert!(Bitmap::new(10, 0).is_err());
        let bm = Bitmap::new(10, 5).unwrap();
        assert_eq!(bm.dimensions(), (10, 5));
        assert!(bm.is_blank());
    }

    #[test]
    fn get_set_and_clipped_reads() {
        let mut bm = Bitmap::new(4, 3).unwrap();
        bm.set(2, 1, true);
        assert!(bm.get(2, 1));
        assert!(!bm.get(0, 0));
        assert!(bm.get_clipped(2, 1));
        assert!(!bm.get_clipped(-1, 0));
        assert!(!bm.get_clipped(4, 0));
        assert!(!bm.get_clipped(0, 3));
    }

    #[test]
    fn raster_scan_finds_next_foreground() {
        let mut bm = Bitmap::new(5, 5).unwrap();
        bm.set(3, 1, true);
        bm.set(0, 4, true);
        assert_eq!(bm.next_foreground(0, 0), Some((3, 1)));
        assert_eq!(bm.next_foreground(4, 1), Some((0, 4)));
        assert_eq!(bm.next_foreground(1, 4), None);
    }

    #[test]
    fn border_padding_offsets_pixels() {
        let mut bm = Bitmap::new(2, 2).unwrap();
        bm.set(0, 0, true);
        let padded = bm.with_border(1).unwrap();
        assert_eq!(padded.dimensions(), (4, 4));
        assert!(padded.get(1, 1));
        assert_eq!(padded.count_foreground(), 1);
    }

    #[test]
    fn xor_blit_clips_and_toggles() {
        let mut dst = Bitmap::new(3, 3).unwrap();
        let mut src = Bitmap::new(2, 2).unwrap();
        src.set(0, 0, true);
        src.set(1, 1, true);
        dst.set(2, 2, true);
        dst.xor_blit(&src, 1, 1);
        assert!(dst.get(1, 1));
        assert!(!dst.get(2, 2)); // toggled off
        dst.xor_blit(&src, 2, 2); // (1,1) of src falls outside
        assert!(dst.get(2, 2));
    }

    #[test]
    fn crop_extracts_subregion() {
        let mut bm = Bitmap::new(5, 4).unwrap();
        bm.set(2, 1, true);
        bm.set(3, 2, true);
        let sub = bm.crop(2, 1, 2, 2).unwrap();
        assert!(sub.get(0, 0));
        assert!(sub.get(1, 1));
        assert_eq!(sub.count_foreground(), 2);
        assert!(bm.crop(4, 0, 2, 2).is_err());
    }
}
