//! Serialization front-end: the `ccba` byte container and SVG output.

pub mod container;
pub mod svg;

pub use container::{from_bytes, read, read_file, to_bytes, write, write_file};
pub use svg::{svg_string, write_svg};
