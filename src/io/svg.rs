// src/io/svg.rs

//! SVG output: one `<polygon>` per component, built from its stitched
//! single path in image-global coordinates.
//!
//! Coordinates are integer pixels with the origin at top-left.  The
//! polygons carry a 1-pixel stroke and no fill; a viewer applying
//! even-odd fill recovers each component with its holes empty.

use std::fmt::Write as _;
use std::io::Write;

use crate::border::record::{BorderSet, TraceOptions};
use crate::utils::error::Result;

const XML_PROLOG: &str = r#"<?xml version="1.0" encoding="iso-8859-1"?>"#;
const DOCTYPE: &str = r#"<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 20000303 Stylable//EN" "http://www.w3.org/TR/2000/03/WD-SVG-20000303/DTD/svg-20000303-stylable.dtd">"#;
const POLYGON_OPEN: &str = r#"<polygon style="stroke-width:1;stroke:black;" points=""#;
const POLYGON_CLOSE: &str = r#"" />"#;

/// Renders the whole border set as an SVG document string.
pub fn svg_string(set: &BorderSet, opts: &TraceOptions) -> Result<String> {
    let mut out = String::new();
    out.push_str(XML_PROLOG);
    out.push('\n');
    out.push_str(DOCTYPE);
    out.push('\n');
    out.push_str("<svg>\n");
    for ccb in set {
        out.push_str(POLYGON_OPEN);
        out.push('\n');
        for p in ccb.single_path_global(opts)? {
            let _ = writeln!(out, "{},{}", p.x, p.y);
        }
        out.push_str(POLYGON_CLOSE);
        out.push('\n');
    }
    out.push_str("</svg>\n");
    Ok(out)
}

/// Writes the SVG document to `writer`.
pub fn write_svg<W: Write>(mut writer: W, set: &BorderSet, opts: &TraceOptions) -> Result<()> {
    let doc = svg_string(set, opts)?;
    writer.write_all(doc.as_bytes())?;
    Ok(())
}
