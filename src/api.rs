//! The public entry points (spec §6/EXPANSION-6): a thin shell over
//! [`crate::compressor::Compressor`]/[`crate::decompressor::Decompressor`]
//! exercising the exit-condition contract -- `OutputBufferFull` surfaces
//! as a return value, never a panic, per the propagation policy in
//! `errors.rs`.

use crate::compressor::{CompressParams, Compressor};
use crate::decompressor::Decompressor;
use crate::errors::JscResult;
use crate::image::{ColorSpace, ImageInfo};

/// Outcome of [`jsc_compress`]: mirrors [`crate::progress::Progress`]'s
/// two-valued shape rather than a bare exit code, so `OutputBufferFull`
/// can't be silently ignored by a caller that forgets to check an `i32`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CompressStatus {
    /// The whole JPEG stream fit in `output`.
    Complete,
    /// `output`'s capacity was reached before the stream finished;
    /// `output` holds exactly the bytes that fit, truncated at a byte
    /// boundary -- re-running with a larger buffer reproduces the same
    /// prefix, since compression here is otherwise deterministic.
    OutputBufferFull,
}

/// Compress `pixels` (interleaved, `width * height * color_space.num_components()`
/// bytes) into `output`, appending up to `output.capacity() - output.len()`
/// bytes.
pub fn jsc_compress(
    width: usize,
    height: usize,
    color_space: ColorSpace,
    pixels: &[u8],
    params: &CompressParams,
    output: &mut Vec<u8>,
) -> JscResult<CompressStatus> {
    let mut compressor = Compressor::new(width, height, color_space, params)?;
    let bpp = color_space.num_components();
    let stride = width * bpp;
    let rows: Vec<&[u8]> = pixels.chunks(stride).collect();
    compressor.write_scanlines(&rows)?;
    let bytes = compressor.finish()?;

    let avail = output.capacity().saturating_sub(output.len());
    if bytes.len() > avail {
        output.extend_from_slice(&bytes[..avail]);
        Ok(CompressStatus::OutputBufferFull)
    } else {
        output.extend_from_slice(&bytes);
        Ok(CompressStatus::Complete)
    }
}

/// Decompress a complete JPEG byte stream into `output` as interleaved
/// RGB (or single-channel grayscale) rows, returning the image's
/// dimensions and color space as recovered from its headers.
pub fn jsc_decompress(data: &[u8], output: &mut Vec<u8>) -> JscResult<ImageInfo> {
    let mut decompressor = Decompressor::new(data)?;
    while decompressor.rows_remaining() > 0 {
        let remaining = decompressor.rows_remaining();
        decompressor.read_scanlines(output, remaining)?;
    }
    Ok(decompressor.image().clone())
}
