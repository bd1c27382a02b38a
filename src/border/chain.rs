// src/border/chain.rs

//! Step chain codec.
//!
//! A border of n pixels is equivalent to its starting pixel plus n - 1
//! step directions in `{0..7}`.  For the byte form, two steps pack into
//! one byte (first step in the high nibble) and a nibble value of `8`
//! terminates the border: an odd step count puts the final step in the
//! high nibble of the terminator byte, an even count appends the fixed
//! terminator `0x88`.

use crate::border::tracer::step_offset;
use crate::image::geom::Point;
use crate::utils::error::{CcbError, Result};

/// Nibble value that ends a border in the packed byte form.
pub const STEP_TERMINATOR: u8 = 0x8;

// Step direction for a move (dx, dy), indexed as [dy + 1][dx + 1].
// -1 marks the impossible zero move.
const DIR_TABLE: [[i8; 3]; 3] = [[1, 2, 3], [0, -1, 4], [7, 6, 5]];

/// Converts an ordered pixel list into its step directions.
///
/// A single-pixel border yields the empty step list.  Non-adjacent
/// consecutive pixels are rejected.
pub fn steps_from_points(points: &[Point]) -> Result<Vec<u8>> {
    let mut steps = Vec::with_capacity(points.len().saturating_sub(1));
    for pair in points.windows(2) {
        let dx = pair[1].x - pair[0].x;
        let dy = pair[1].y - pair[0].y;
        if !(-1..=1).contains(&dx) || !(-1..=1).contains(&dy) {
            return Err(CcbError::InvalidArg(format!(
                "border pixels ({},{}) and ({},{}) are not 8-adjacent",
                pair[0].x, pair[0].y, pair[1].x, pair[1].y
            )));
        }
        let dir = DIR_TABLE[(dy + 1) as usize][(dx + 1) as usize];
        if dir < 0 {
            return Err(CcbError::InvalidArg(format!(
                "border repeats pixel ({},{})",
                pair[0].x, pair[0].y
            )));
        }
        steps.push(dir as u8);
    }
    Ok(steps)
}

/// Replays a step chain from `start`, returning the full pixel list
/// (`steps.len() + 1` points).  `offset` shifts the whole border, which is
/// how the same chain serves local and global coordinates.
pub fn points_from_steps(start: Point, steps: &[u8], offset: Point) -> Vec<Point> {
    let mut points = Vec::with_capacity(steps.len() + 1);
    let mut p = start.translated(offset.x, offset.y);
    points.push(p);
    for &dir in steps {
        let (dx, dy) = step_offset(dir);
        p = p.translated(dx, dy);
        points.push(p);
    }
    points
}

/// Packs a step list into bytes, two steps per byte, ending with the `8`
/// terminator nibble.
pub fn pack_steps(steps: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(steps.len() / 2 + 1);
    let mut chunks = steps.chunks_exact(2);
    for pair in &mut chunks {
        bytes.push((pair[0] << 4) | pair[1]);
    }
    match chunks.remainder() {
        &[last] => bytes.push((last << 4) | STEP_TERMINATOR),
        _ => bytes.push((STEP_TERMINATOR << 4) | STEP_TERMINATOR),
    }
    bytes
}

/// Unpacks one border's steps from `bytes` starting at `*pos`, consuming
/// nibbles high-then-low until the terminator nibble.  On return `*pos`
/// sits just past the terminator byte.
pub fn unpack_steps(bytes: &[u8], pos: &mut usize) -> Result<Vec<u8>> {
    let mut steps = Vec::new();
    loop {
        let Some(&byte) = bytes.get(*pos) else {
            return Err(CcbError::Truncated);
        };
        *pos += 1;
        for nibble in [byte >> 4, byte & 0xf] {
            if nibble == STEP_TERMINATOR {
                return Ok(steps);
            }
            if nibble > STEP_TERMINATOR {
                return Err(CcbError::InvalidArg(format!(
                    "invalid step nibble {:#x}",
                    nibble
                )));
            }
            steps.push(nibble);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(i32, i32)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn square_border_step_directions() {
        let border = pts(&[
            (0, 0),
            (1, 0),
            (2, 0),
            (2, 1),
            (2, 2),
            (1, 2),
            (0, 2),
            (0, 1),
            (0, 0),
        ]);
        assert_eq!(
            steps_from_points(&border).unwrap(),
            vec![4, 4, 6, 6, 0, 0, 2, 2]
        );
    }

    #[test]
    fn single_pixel_has_no_steps() {
        assert!(steps_from_points(&pts(&[(3, 3)])).unwrap().is_empty());
    }

    #[test]
    fn non_adjacent_pixels_are_rejected() {
        assert!(steps_from_points(&pts(&[(0, 0), (2, 0)])).is_err());
        assert!(steps_from_points(&pts(&[(0, 0), (0, 0)])).is_err());
    }

    #[test]
    fn steps_replay_to_the_same_border() {
        let border = pts(&[(2, 2), (3, 1), (4, 2), (3, 3), (2, 2)]);
        let steps = steps_from_points(&border).unwrap();
        let replayed = points_from_steps(border[0], &steps, Point::new(0, 0));
        assert_eq!(replayed, border);
        let shifted = points_from_steps(border[0], &steps, Point::new(10, 20));
        assert_eq!(shifted[0], Point::new(12, 22));
        assert_eq!(*shifted.last().unwrap(), Point::new(12, 22));
    }

    #[test]
    fn odd_step_count_shares_the_terminator_byte() {
        // 7 steps pack into 4 bytes: d1d2 d3d4 d5d6 d7|8
        let steps = [1u8, 2, 3, 4, 5, 6, 7];
        let bytes = pack_steps(&steps);
        assert_eq!(bytes, vec![0x12, 0x34, 0x56, 0x78]);
        let mut pos = 0;
        assert_eq!(unpack_steps(&bytes, &mut pos).unwrap(), steps);
        assert_eq!(pos, 4);
    }

    #[test]
    fn even_step_count_appends_fixed_terminator() {
        // 8 steps pack into 5 bytes: four step bytes plus 0x88
        let steps = [4u8, 4, 6, 6, 0, 0, 2, 2];
        let bytes = pack_steps(&steps);
        assert_eq!(bytes, vec![0x44, 0x66, 0x00, 0x22, 0x88]);
        let mut pos = 0;
        assert_eq!(unpack_steps(&bytes, &mut pos).unwrap(), steps);
        assert_eq!(pos, 5);
    }

    #[test]
    fn empty_step_list_is_the_lone_terminator() {
        assert_eq!(pack_steps(&[]), vec![0x88]);
        let mut pos = 0;
        assert!(unpack_steps(&[0x88], &mut pos).unwrap().is_empty());
        assert_eq!(pos, 1);
    }

    #[test]
    fn truncated_chain_is_detected() {
        let mut pos = 0;
        assert!(matches!(
            unpack_steps(&[0x12, 0x34], &mut pos),
            Err(CcbError::Truncated)
        ));
    }
}
