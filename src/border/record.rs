// src/border/record.rs

//! Border records and the top-level tracing entry points.
//!
//! A [`CcBorder`] holds everything known about one component's borders:
//! the global bounding box, the widened hole boxes, per-border start
//! pixels, and the canonical pixel paths in local coordinates.  Derived
//! views (global coordinates, step chains, the stitched single path) are
//! computed lazily and cached; records are immutable after construction,
//! so the caches never need invalidation.

use std::sync::OnceLock;

use log::warn;

use crate::border::chain;
use crate::border::holes::find_holes;
use crate::border::render::fill_component_unified;
use crate::border::single_path::{self, StitchReport};
use crate::border::tracer::{trace_hole_border, trace_outer_border};
use crate::cc::{self, Connectivity};
use crate::image::bitmap::Bitmap;
use crate::image::geom::{Point, Rect};
use crate::utils::error::{CcbError, Result};

/// Components with more holes than this keep only their exterior border
/// when stitched into a single path.
pub const DEFAULT_MAX_HOLES: usize = 150;

/// Tunables for border post-processing.
#[derive(Debug, Clone)]
pub struct TraceOptions {
    /// Hole cap for single-path stitching.  A component with more holes
    /// than this is emitted as its exterior border alone.
    pub max_holes: usize,
}

impl Default for TraceOptions {
    fn default() -> Self {
        TraceOptions {
            max_holes: DEFAULT_MAX_HOLES,
        }
    }
}

/// The borders of one connected component.
#[derive(Debug, Default)]
pub struct CcBorder {
    /// Bounding boxes: index 0 is the component's box in image-global
    /// coordinates; the rest are widened hole-border boxes in local
    /// coordinates.
    boxes: Vec<Rect>,
    /// Per-border start pixels, local coordinates, exterior first.
    starts: Vec<Point>,
    /// Canonical border paths in local coordinates, exterior first.
    /// Closed borders repeat their first pixel at the end.
    locals: Vec<Vec<Point>>,
    /// The component's local bitmap, when traced from a raster.  Absent
    /// after container deserialization; it is then reconstructed from the
    /// borders on demand.
    pix: Option<Bitmap>,

    global: OnceLock<Vec<Vec<Point>>>,
    steps: OnceLock<Vec<Vec<u8>>>,
    sp_local: OnceLock<Vec<Point>>,
    sp_global: OnceLock<Vec<Point>>,
}

/// `OnceLock::get_or_init` for fallible initializers.  On a race the
/// first stored value wins and the freshly computed one is dropped.
fn get_or_try_init<'a, T>(
    cell: &'a OnceLock<T>,
    init: impl FnOnce() -> Result<T>,
) -> Result<&'a T> {
    if let Some(v) = cell.get() {
        return Ok(v);
    }
    let v = init()?;
    Ok(cell.get_or_init(|| v))
}

impl CcBorder {
    pub(crate) fn from_parts(
        boxes: Vec<Rect>,
        starts: Vec<Point>,
        locals: Vec<Vec<Point>>,
        steps: Option<Vec<Vec<u8>>>,
        pix: Option<Bitmap>,
    ) -> Self {
        let record = CcBorder {
            boxes,
            starts,
            locals,
            pix,
            ..Default::default()
        };
        if let Some(steps) = steps {
            let _ = record.steps.set(steps);
        }
        record
    }

    /// The component's bounding box in image-global coordinates.
    pub fn bbox(&self) -> Rect {
        self.boxes[0]
    }

    /// All boxes: the global component box followed by the widened hole
    /// boxes in local coordinates.
    pub fn boxes(&self) -> &[Rect] {
        &self.boxes
    }

    /// Number of borders (1 + number of holes).
    pub fn border_count(&self) -> usize {
        self.locals.len()
    }

    pub fn hole_count(&self) -> usize {
        self.locals.len() - 1
    }

    /// Per-border start pixels in local coordinates, exterior first.
    pub fn starts(&self) -> &[Point] {
        &self.starts
    }

    /// Border paths in local coordinates, exterior first.
    pub fn locals(&self) -> &[Vec<Point>] {
        &self.locals
    }

    /// The component's local bitmap, when it is still attached.
    pub fn bitmap(&self) -> Option<&Bitmap> {
        self.pix.as_ref()
    }

    /// Border paths in image-global coordinates.
    pub fn global(&self) -> &[Vec<Point>] {
        self.global.get_or_init(|| {
            let Rect { x, y, .. } = self.bbox();
            self.locals
                .iter()
                .map(|border| border.iter().map(|p| p.translated(x, y)).collect())
                .collect()
        })
    }

    /// Step chains for every border, derived from the local paths.
    pub fn steps(&self) -> Result<&[Vec<u8>]> {
        get_or_try_init(&self.steps, || {
            self.locals
                .iter()
                .map(|border| chain::steps_from_points(border))
                .collect()
        })
        .map(Vec::as_slice)
    }

    /// The stitched single path in local coordinates.
    ///
    /// Computed once; the options of the first call stick.
    pub fn single_path_local(&self, opts: &TraceOptions) -> Result<&[Point]> {
        get_or_try_init(&self.sp_local, || {
            single_path::stitch_component(self, opts).map(|(path, _)| path)
        })
        .map(Vec::as_slice)
    }

    /// The stitched single path in image-global coordinates.
    pub fn single_path_global(&self, opts: &TraceOptions) -> Result<&[Point]> {
        let Rect { x, y, .. } = self.bbox();
        let local = self.single_path_local(opts)?;
        get_or_try_init(&self.sp_global, || {
            Ok(local.iter().map(|p| p.translated(x, y)).collect())
        })
        .map(Vec::as_slice)
    }

    /// The component's foreground raster in local coordinates: the
    /// attached bitmap when present, otherwise reconstructed from the
    /// borders.
    pub(crate) fn component_raster(&self) -> Result<Bitmap> {
        match &self.pix {
            Some(pix) => Ok(pix.clone()),
            None => fill_component_unified(self),
        }
    }
}

/// The borders of every component of one image.
#[derive(Debug, Default)]
pub struct BorderSet {
    width: u32,
    height: u32,
    ccs: Vec<CcBorder>,
}

impl BorderSet {
    pub(crate) fn from_parts(width: u32, height: u32, ccs: Vec<CcBorder>) -> Self {
        BorderSet { width, height, ccs }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn len(&self) -> usize {
        self.ccs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ccs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CcBorder> {
        self.ccs.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CcBorder> {
        self.ccs.iter()
    }

    /// Stitches the single path of every component that does not have one
    /// yet, returning the per-image diagnostics.
    pub fn generate_single_paths(&self, opts: &TraceOptions) -> Result<StitchReport> {
        let mut report = StitchReport::default();
        for (i, cc) in self.ccs.iter().enumerate() {
            if cc.sp_local.get().is_some() {
                continue;
            }
            let (path, stats) = single_path::stitch_component(cc, opts)?;
            let _ = cc.sp_local.set(path);
            for hole in stats.lost {
                report.lost_holes += 1;
                report.skipped.push((i, hole));
            }
            if stats.capped {
                report.capped.push(i);
            }
        }
        if report.lost_holes > 0 {
            warn!(
                "{} holes could not be joined to their exterior borders",
                report.lost_holes
            );
        }
        Ok(report)
    }
}

impl<'a> IntoIterator for &'a BorderSet {
    type Item = &'a CcBorder;
    type IntoIter = std::slice::Iter<'a, CcBorder>;

    fn into_iter(self) -> Self::IntoIter {
        self.ccs.iter()
    }
}

/// Traces the exterior and hole borders of a single connected component.
///
/// `pix` must contain exactly one 8-connected component; `bbox` gives its
/// location in image-global coordinates.
pub fn trace_cc(pix: &Bitmap, bbox: Rect) -> Result<CcBorder> {
    if pix.is_blank() {
        return Err(CcbError::EmptyImage);
    }

    let outer = trace_outer_border(pix)?;
    let mut boxes = vec![bbox];
    let mut starts = vec![outer[0]];
    let mut locals = vec![outer];

    for (j, hole) in find_holes(pix)?.into_iter().enumerate() {
        let border = trace_hole_border(pix, hole.seed, j)?;
        boxes.push(hole.bbox);
        starts.push(hole.seed);
        locals.push(border);
    }

    Ok(CcBorder::from_parts(boxes, starts, locals, None, Some(pix.clone())))
}

/// Traces the borders of every 8-connected component of `pix`.
///
/// Components are emitted in raster order of their first foreground pixel.
/// A component whose hole tracing fails is skipped with a warning; the
/// rest of the image still goes through.
pub fn trace_all(pix: &Bitmap) -> Result<BorderSet> {
    let components = cc::segment(pix, Connectivity::Eight)?;

    #[cfg(feature = "rayon")]
    let traced: Vec<Result<CcBorder>> = {
        use rayon::prelude::*;
        components
            .par_iter()
            .map(|comp| trace_cc(&comp.bitmap, comp.bbox))
            .collect()
    };
    #[cfg(not(feature = "rayon"))]
    let traced: Vec<Result<CcBorder>> = components
        .iter()
        .map(|comp| trace_cc(&comp.bitmap, comp.bbox))
        .collect();

    let mut ccs = Vec::with_capacity(traced.len());
    for (i, outcome) in traced.into_iter().enumerate() {
        match outcome {
            Ok(ccb) => ccs.push(ccb),
            Err(err @ CcbError::IsolatedHoleBorder { .. }) => {
                warn!("component {}: {}; component skipped", i, err);
            }
            Err(err) => return Err(err),
        }
    }

    let (width, height) = pix.dimensions();
    Ok(BorderSet::from_parts(width, height, ccs))
}

/// Traces only the exterior border of the single component in `pix`.
///
/// With `bbox` given, the returned points are in image-global
/// coordinates; otherwise they stay local to `pix`.
pub fn outer_border_points(pix: &Bitmap, bbox: Option<Rect>) -> Result<Vec<Point>> {
    let border = trace_outer_border(pix)?;
    match bbox {
        Some(Rect { x, y, .. }) => Ok(border.iter().map(|p| p.translated(x, y)).collect()),
        None => Ok(border),
    }
}

/// Exterior borders of every component of `pix`, in global coordinates.
pub fn outer_borders(pix: &Bitmap) -> Result<Vec<Vec<Point>>> {
    cc::segment(pix, Connectivity::Eight)?
        .into_iter()
        .map(|comp| outer_border_points(&comp.bitmap, Some(comp.bbox)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annulus_7x7() -> Bitmap {
        // outer 5x5 square at (1,1)..(5,5), inner 3x3 hole at (2,2)..(4,4)
        let mut bm = Bitmap::new(7, 7).unwrap();
        for y in 1..6 {
            for x in 1..6 {
                bm.set(x, y, true);
            }
        }
        for y in 2..5 {
            for x in 2..5 {
                bm.set(x, y, false);
            }
        }
        bm
    }

    #[test]
    fn single_pixel_component_record() {
        let mut bm = Bitmap::new(5, 5).unwrap();
        bm.set(2, 2, true);
        let set = trace_all(&bm).unwrap();
        assert_eq!(set.len(), 1);
        let ccb = set.get(0).unwrap();
        assert_eq!(ccb.bbox(), Rect::new(2, 2, 1, 1));
        assert_eq!(ccb.locals(), &[vec![Point::new(0, 0)]]);
        assert_eq!(ccb.global(), &[vec![Point::new(2, 2)]]);
        assert!(ccb.steps().unwrap()[0].is_empty());
    }

    #[test]
    fn annulus_has_exterior_and_one_hole() {
        let set = trace_all(&annulus_7x7()).unwrap();
        assert_eq!(set.len(), 1);
        let ccb = set.get(0).unwrap();
        assert_eq!(ccb.border_count(), 2);
        assert_eq!(ccb.hole_count(), 1);
        // 16 distinct exterior pixels plus the closing repeat
        assert_eq!(ccb.locals()[0].len(), 17);
        // 12 distinct hole-collar pixels plus the closing repeat
        assert_eq!(ccb.locals()[1].len(), 13);
        // hole box is widened and local
        assert_eq!(ccb.boxes()[1], Rect::new(0, 0, 5, 5));
    }

    #[test]
    fn global_view_is_a_pure_translation() {
        let set = trace_all(&annulus_7x7()).unwrap();
        let ccb = set.get(0).unwrap();
        let Rect { x, y, .. } = ccb.bbox();
        for (local, global) in ccb.locals().iter().zip(ccb.global()) {
            assert_eq!(local.len(), global.len());
            for (l, g) in local.iter().zip(global) {
                assert_eq!(*g, l.translated(x, y));
            }
        }
    }

    #[test]
    fn components_come_in_raster_order() {
        let mut bm = Bitmap::new(10, 10).unwrap();
        for y in 1..4 {
            for x in 1..4 {
                bm.set(x, y, true);
            }
        }
        for i in 0..3 {
            bm.set(6 + i, 6 + i, true);
        }
        let set = trace_all(&bm).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(0).unwrap().bbox(), Rect::new(1, 1, 3, 3));
        assert_eq!(set.get(1).unwrap().bbox(), Rect::new(6, 6, 3, 3));
    }

    #[test]
    fn empty_image_refuses_to_trace() {
        let bm = Bitmap::new(4, 4).unwrap();
        assert!(matches!(trace_all(&bm), Err(CcbError::EmptyImage)));
    }

    #[test]
    fn outer_border_points_translates_when_boxed() {
        let mut bm = Bitmap::new(3, 3).unwrap();
        for y in 0..3 {
            for x in 0..3 {
                bm.set(x, y, true);
            }
        }
        let local = outer_border_points(&bm, None).unwrap();
        assert_eq!(local[0], Point::new(0, 0));
        let global = outer_border_points(&bm, Some(Rect::new(4, 5, 3, 3))).unwrap();
        assert_eq!(global[0], Point::new(4, 5));
        assert_eq!(global.len(), local.len());
    }
}
