// src/io/container.rs

//! The `ccba` container: a compact byte-stream serialization of every
//! border of an image.
//!
//! Layout (all multi-byte integers little-endian):
//!
//! ```text
//!     "ccba: %7d cc\n"  18B  (ASCII, NUL-terminated; %7d = c.c. count)
//!     image width        4B
//!     image height       4B
//!     [for each c.c.]
//!         ulx            4B   global upper-left of the c.c. box
//!         uly            4B
//!         w              4B   informational; not needed to reconstruct
//!         h              4B
//!         border count   4B   1 + number of holes
//!         [for each border]
//!             start x    4B   global for the exterior, local for holes
//!             start y    4B
//!             step pairs nB   two 4-bit steps per byte
//!             terminator 1B   low nibble 8 (0x88 when the count is even)
//! ```
//!
//! [`write`]/[`read`] wrap the raw stream in a zlib deflate layer;
//! [`to_bytes`]/[`from_bytes`] expose the raw form.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use log::debug;

use crate::border::chain;
use crate::border::record::{BorderSet, CcBorder};
use crate::image::geom::{Point, Rect};
use crate::utils::error::{CcbError, Result};

const MAGIC: &[u8; 5] = b"ccba:";
const HEADER_LEN: usize = 18;

/// Serializes a border set to the raw (uncompressed) container bytes.
pub fn to_bytes(set: &BorderSet) -> Result<Vec<u8>> {
    let mut out: Vec<u8> = Vec::new();

    let header = format!("ccba: {:7} cc\n", set.len());
    out.extend_from_slice(header.as_bytes());
    out.push(0);
    debug_assert_eq!(out.len(), HEADER_LEN);

    out.write_u32::<LittleEndian>(set.width())?;
    out.write_u32::<LittleEndian>(set.height())?;

    for ccb in set {
        let bbox = ccb.bbox();
        out.write_i32::<LittleEndian>(bbox.x)?;
        out.write_i32::<LittleEndian>(bbox.y)?;
        out.write_u32::<LittleEndian>(bbox.width)?;
        out.write_u32::<LittleEndian>(bbox.height)?;

        let steps = ccb.steps()?;
        out.write_u32::<LittleEndian>(steps.len() as u32)?;
        for (j, border_steps) in steps.iter().enumerate() {
            // Exterior starts are written in image-global coordinates,
            // hole starts stay local to the component.
            let mut start = ccb.starts()[j];
            if j == 0 {
                start = start.translated(bbox.x, bbox.y);
            }
            out.write_i32::<LittleEndian>(start.x)?;
            out.write_i32::<LittleEndian>(start.y)?;
            out.extend_from_slice(&chain::pack_steps(border_steps));
        }
    }

    debug!("serialized {} components into {} bytes", set.len(), out.len());
    Ok(out)
}

/// Deserializes a border set from raw container bytes.
///
/// Local border paths are replayed from the step chains; the widened hole
/// boxes (which the container does not carry) are recovered as the
/// bounding boxes of the decoded hole borders.
pub fn from_bytes(data: &[u8]) -> Result<BorderSet> {
    if data.len() < HEADER_LEN {
        return Err(CcbError::Truncated);
    }
    if &data[..MAGIC.len()] != MAGIC {
        return Err(CcbError::BadMagic);
    }
    let count_field = std::str::from_utf8(&data[MAGIC.len()..13]).map_err(|_| CcbError::BadMagic)?;
    let ncc: i64 = count_field
        .trim()
        .parse()
        .map_err(|_| CcbError::BadMagic)?;
    if ncc < 0 {
        return Err(CcbError::InvalidArg(format!(
            "negative component count {} in ccba header",
            ncc
        )));
    }

    let mut pos = HEADER_LEN;
    let width = read_u32(data, &mut pos)?;
    let height = read_u32(data, &mut pos)?;

    let mut ccs = Vec::new();
    for _ in 0..ncc {
        let bx = read_i32(data, &mut pos)?;
        let by = read_i32(data, &mut pos)?;
        let bw = read_u32(data, &mut pos)?;
        let bh = read_u32(data, &mut pos)?;
        let nb = read_u32(data, &mut pos)? as usize;
        // every border takes at least 9 bytes
        if nb.saturating_mul(9) > data.len().saturating_sub(pos) {
            return Err(CcbError::Truncated);
        }

        let mut boxes = vec![Rect::new(bx, by, bw, bh)];
        let mut starts = Vec::with_capacity(nb);
        let mut locals = Vec::with_capacity(nb);
        let mut steps = Vec::with_capacity(nb);
        for j in 0..nb {
            let sx = read_i32(data, &mut pos)?;
            let sy = read_i32(data, &mut pos)?;
            let mut start = Point::new(sx, sy);
            if j == 0 {
                start = start.translated(-bx, -by);
            }
            let border_steps = chain::unpack_steps(data, &mut pos)?;
            let border = chain::points_from_steps(start, &border_steps, Point::new(0, 0));
            if j > 0 {
                // widened hole box == bbox of the hole's border pixels
                if let Some(bbox) = Rect::bounding(&border) {
                    boxes.push(bbox);
                }
            }
            starts.push(start);
            locals.push(border);
            steps.push(border_steps);
        }
        ccs.push(CcBorder::from_parts(boxes, starts, locals, Some(steps), None));
    }

    Ok(BorderSet::from_parts(width, height, ccs))
}

/// Writes the deflate-compressed container to `writer`.
pub fn write<W: Write>(writer: W, set: &BorderSet) -> Result<()> {
    let raw = to_bytes(set)?;
    let mut encoder = ZlibEncoder::new(writer, Compression::default());
    encoder.write_all(&raw)?;
    encoder.finish()?;
    Ok(())
}

/// Reads a deflate-compressed container from `reader`.
pub fn read<R: Read>(reader: R) -> Result<BorderSet> {
    let mut decoder = ZlibDecoder::new(reader);
    let mut raw = Vec::new();
    decoder
        .read_to_end(&mut raw)
        .map_err(|e| CcbError::Decompression(e.to_string()))?;
    from_bytes(&raw)
}

/// Writes the compressed container to a file.
pub fn write_file<P: AsRef<Path>>(path: P, set: &BorderSet) -> Result<()> {
    write(BufWriter::new(File::create(path)?), set)
}

/// Reads a compressed container from a file.
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<BorderSet> {
    read(BufReader::new(File::open(path)?))
}

fn read_u32(data: &[u8], pos: &mut usize) -> Result<u32> {
    let mut slice = data
        .get(*pos..*pos + 4)
        .ok_or(CcbError::Truncated)?;
    let v = slice.read_u32::<LittleEndian>()?;
    *pos += 4;
    Ok(v)
}

fn read_i32(data: &[u8], pos: &mut usize) -> Result<i32> {
    let mut slice = data
        .get(*pos..*pos + 4)
        .ok_or(CcbError::Truncated)?;
    let v = slice.read_i32::<LittleEndian>()?;
    *pos += 4;
    Ok(v)
}
