//! Border tracing and everything derived from it.
//!
//! ## Module Map
//!
//! - `tracer` - the neighborhood walk that follows a border
//! - `holes` - discovery of enclosed background regions
//! - `record` - per-component and per-image border records, lazy views
//! - `chain` - step chain codec (directions and packed bytes)
//! - `single_path` - stitching exterior and hole borders into one path
//! - `render` - raster reconstruction from borders

pub mod chain;
pub mod holes;
pub mod record;
pub mod render;
pub mod single_path;
pub mod tracer;

pub use record::{
    outer_border_points, outer_borders, trace_all, trace_cc, BorderSet, CcBorder, TraceOptions,
    DEFAULT_MAX_HOLES,
};
pub use render::{
    render_filled_topological, render_filled_unified, render_outlines, render_single_paths,
};
pub use single_path::StitchReport;
