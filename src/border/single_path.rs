// src/border/single_path.rs

//! Stitching of a component's borders into one closed polyline.
//!
//! Each hole border is joined to the exterior by a short cut path through
//! foreground.  Walking the exterior once and inlining, at every cut
//! landing point, the round trip "cut in, hole border once around, cut
//! back out" produces a single path that fills correctly under an even-odd
//! rule: hole-border pixels appear once, cut pixels twice (forward and
//! reversed), so the cuts cancel out of the fill.

use std::collections::HashSet;

use log::warn;

use crate::border::record::{CcBorder, TraceOptions};
use crate::image::bitmap::Bitmap;
use crate::image::geom::{Point, Rect};
use crate::utils::error::Result;

/// Per-image stitching diagnostics.
#[derive(Debug, Default, Clone)]
pub struct StitchReport {
    /// Total holes whose cut path could not be found; those holes are
    /// missing from the stitched paths and render filled.
    pub lost_holes: usize,
    /// `(component index, hole index)` of every lost hole.
    pub skipped: Vec<(usize, usize)>,
    /// Components whose hole count exceeded the cap; only their exterior
    /// was emitted.
    pub capped: Vec<usize>,
}

/// Per-component stitching outcome.
#[derive(Debug, Default)]
pub(crate) struct ComponentStitch {
    /// Hole indices that could not be joined.
    pub lost: Vec<usize>,
    /// True when the hole cap suppressed stitching entirely.
    pub capped: bool,
}

/// Builds the single path for one component, in local coordinates.
pub(crate) fn stitch_component(
    cc: &CcBorder,
    opts: &TraceOptions,
) -> Result<(Vec<Point>, ComponentStitch)> {
    let locals = cc.locals();
    let outer = &locals[0];
    let nb = locals.len();
    let mut stats = ComponentStitch::default();

    // No holes: the single path is the exterior border.  Pathologically
    // holey components skip stitching and lose all their holes.
    if nb == 1 || nb - 1 > opts.max_holes {
        stats.capped = nb - 1 > opts.max_holes;
        if stats.capped {
            warn!(
                "component has {} holes (cap {}); emitting exterior only",
                nb - 1,
                opts.max_holes
            );
        }
        return Ok((outer.clone(), stats));
    }

    let pix = cc.component_raster()?;
    let outer_set: HashSet<Point> = outer.iter().copied().collect();

    // One cut path per hole: from the hole border out to the exterior
    // border, staying in foreground.  `None` marks a lost hole.
    let mut cuts: Vec<Option<Vec<Point>>> = Vec::with_capacity(nb - 1);
    for j in 1..nb {
        let cut = cut_path_for_hole(&pix, &outer_set, cc.boxes()[j]);
        // The cut must start on this hole's border for the cyclic
        // permutation below to work.
        let anchored = cut.filter(|c| locals[j].contains(&c[0]));
        if anchored.is_none() {
            warn!("no cut path found for hole {}", j - 1);
            stats.lost.push(j - 1);
        }
        cuts.push(anchored);
    }

    // Walk the exterior once, splicing in each hole at its cut's landing
    // pixel.  The first exterior pixel never matches a cut; a cut ending
    // there is picked up at the closing repeat of the walk.
    let mut path: Vec<Point> = Vec::with_capacity(outer.len());
    for (k, &p) in outer.iter().enumerate() {
        if k == 0 {
            path.push(p);
            continue;
        }
        let hit = cuts
            .iter()
            .enumerate()
            .find(|(_, cut)| cut.as_ref().is_some_and(|c| c.last() == Some(&p)));
        match hit {
            Some((ci, Some(cut))) => {
                // exterior -> hole along the reversed cut
                path.extend(cut.iter().rev());
                // once around the hole, starting just past the cut anchor
                let rotated = cyclic_perm(&locals[ci + 1], cut[0]);
                path.extend(rotated.into_iter().skip(1));
                // hole -> exterior along the forward cut
                path.extend(cut.iter());
            }
            _ => path.push(p),
        }
    }

    Ok((path, stats))
}

/// Probes the four axis-aligned rays from the midpoint of the hole's
/// widened box, in order up, down, left, right.  Each ray skips background
/// until it enters foreground, then collects the foreground span; the cut
/// succeeds when the span's last pixel lies on the exterior border.
fn cut_path_for_hole(
    pix: &Bitmap,
    outer: &HashSet<Point>,
    inner: Rect,
) -> Option<Vec<Point>> {
    let xmid = inner.x + inner.width as i32 / 2;
    let ymid = inner.y + inner.height as i32 / 2;

    for (dx, dy) in [(0, -1), (0, 1), (-1, 0), (1, 0)] {
        let path = axial_probe(pix, xmid, ymid, dx, dy);
        if let Some(last) = path.last() {
            if outer.contains(last) {
                return Some(path);
            }
        }
    }
    None
}

/// Walks a ray from `(x0, y0)`: background pixels are skipped, then the
/// contiguous foreground span is collected.  Empty when the ray leaves the
/// bitmap before reaching foreground.
fn axial_probe(pix: &Bitmap, x0: i32, y0: i32, dx: i32, dy: i32) -> Vec<Point> {
    let (w, h) = pix.dimensions();
    let (mut x, mut y) = (x0, y0);
    loop {
        if x < 0 || y < 0 || x >= w as i32 || y >= h as i32 {
            return Vec::new();
        }
        if pix.get(x as u32, y as u32) {
            break;
        }
        x += dx;
        y += dy;
    }

    let mut path = Vec::new();
    while pix.get_clipped(x, y) {
        path.push(Point::new(x, y));
        x += dx;
        y += dy;
    }
    path
}

/// Rotates a closed border (first pixel repeated at the end) so that it
/// begins at `start` and ends at the pixel preceding `start`.  The closing
/// repeat is dropped.
fn cyclic_perm(border: &[Point], start: Point) -> Vec<Point> {
    let distinct = &border[..border.len() - 1];
    let Some(idx) = distinct.iter().position(|&p| p == start) else {
        return border.to_vec();
    };
    let mut out = Vec::with_capacity(distinct.len());
    out.extend_from_slice(&distinct[idx..]);
    out.extend_from_slice(&distinct[..idx]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::border::record::trace_all;
    use crate::utils::error::Result as CcbResult;

    /// 7x7 component at (1,1) with a 3x3 hole: the ring is two pixels
    /// thick, so exterior and hole borders share no pixels.
    fn thick_annulus() -> Bitmap {
        let mut bm = Bitmap::new(9, 9).unwrap();
        for y in 1..8 {
            for x in 1..8 {
                bm.set(x, y, true);
            }
        }
        for y in 3..6 {
            for x in 3..6 {
                bm.set(x, y, false);
            }
        }
        bm
    }

    fn solid_square() -> Bitmap {
        let mut bm = Bitmap::new(5, 5).unwrap();
        for y in 1..4 {
            for x in 1..4 {
                bm.set(x, y, true);
            }
        }
        bm
    }

    #[test]
    fn no_holes_single_path_is_the_exterior() -> CcbResult<()> {
        let set = trace_all(&solid_square())?;
        let ccb = set.get(0).unwrap();
        let sp = ccb.single_path_local(&TraceOptions::default())?;
        assert_eq!(sp, ccb.locals()[0].as_slice());
        Ok(())
    }

    #[test]
    fn annulus_path_visits_hole_border_once_and_cut_twice() -> CcbResult<()> {
        let set = trace_all(&thick_annulus())?;
        let ccb = set.get(0).unwrap();
        let sp = ccb.single_path_local(&TraceOptions::default())?;

        // exterior walk of 24 distinct pixels plus closure, with a
        // 2-pixel cut in, 11 more hole pixels, and the cut back out
        assert_eq!(sp.len(), 39);

        // every consecutive pair stays 8-adjacent
        for pair in sp.windows(2) {
            let dx = (pair[1].x - pair[0].x).abs();
            let dy = (pair[1].y - pair[0].y).abs();
            assert!(dx <= 1 && dy <= 1);
            assert!((dx, dy) != (0, 0));
        }

        let count = |x, y| sp.iter().filter(|q| **q == Point::new(x, y)).count();
        // exterior pixels away from the cut appear exactly once
        assert_eq!(count(0, 2), 1);
        // hole-collar pixels appear exactly once
        assert_eq!(count(1, 2), 1);
        // the cut runs down the top of the ring at x = 3 and is
        // traversed twice, once in each direction
        assert_eq!(count(3, 0), 2);
        assert_eq!(count(3, 1), 2);
        Ok(())
    }

    #[test]
    fn hole_cap_drops_all_holes() -> CcbResult<()> {
        let set = trace_all(&thick_annulus())?;
        let report = set.generate_single_paths(&TraceOptions { max_holes: 0 })?;
        assert_eq!(report.capped, vec![0]);
        assert_eq!(report.lost_holes, 0);
        let ccb = set.get(0).unwrap();
        let sp = ccb.single_path_local(&TraceOptions { max_holes: 0 })?;
        assert_eq!(sp, ccb.locals()[0].as_slice());
        Ok(())
    }

    #[test]
    fn lost_hole_is_reported_and_skipped() -> CcbResult<()> {
        // Plus-shaped arms of background around the hole defeat all four
        // axial probes: each ray leaves the hole, crosses one pixel of
        // foreground, then hits background again before the exterior.
        //
        //   row 0..8 of a 9x9 component with a 1-pixel hole at (4,4),
        //   and background notches at distance 2 in all four directions.
        let mut bm = Bitmap::new(9, 9).unwrap();
        for y in 0..9 {
            for x in 0..9 {
                bm.set(x, y, true);
            }
        }
        bm.set(4, 4, false); // the hole
        // notches: background pockets on each axial ray, kept away from
        // the frame so they are themselves holes, not exterior background
        for &(x, y) in &[(4, 2), (4, 6), (2, 4), (6, 4)] {
            bm.set(x, y, false);
        }
        let set = trace_all(&bm)?;
        let report = set.generate_single_paths(&TraceOptions::default())?;
        assert!(report.lost_holes >= 1);
        assert!(report.skipped.iter().any(|&(cc, _)| cc == 0));
        Ok(())
    }

    #[test]
    fn cyclic_perm_rotates_and_drops_the_closing_repeat() {
        let border = vec![
            Point::new(0, 0),
            Point::new(1, 0),
            Point::new(1, 1),
            Point::new(0, 1),
            Point::new(0, 0),
        ];
        let rotated = cyclic_perm(&border, Point::new(1, 1));
        assert_eq!(
            rotated,
            vec![
                Point::new(1, 1),
                Point::new(0, 1),
                Point::new(0, 0),
                Point::new(1, 0),
            ]
        );
    }
}
