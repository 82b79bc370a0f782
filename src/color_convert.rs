#![allow(clippy::many_single_char_names, clippy::similar_names)]
//! Color conversion kernels -- spec §1 names this an external collaborator,
//! specified only by the `color_convert` call contract in spec §6.
//!
//! Conversion coefficients follow the standard libjpeg `jccolor.c` Q16
//! fixed-point formula (the teacher's own `color_convert/scalar.rs` uses
//! coarser Q5/Q6 constants for the same BT.601 matrix):
//! ```text
//! R = Y + 1.40200 * Cr
//! G = Y - 0.34414 * Cb - 0.71414 * Cr
//! B = Y + 1.77200 * Cb
//! ```
use std::cmp::{max, min};

use crate::image::ColorSpace;

#[inline]
fn clamp_u8(v: i32) -> u8 {
    min(max(v, 0), 255) as u8
}

/// `color_convert(input_rows, output_buffer, output_row_index, num_rows)`
/// from spec §6: converts `num_rows` of interleaved source pixels starting
/// at `input_rows` into planar per-component rows placed at
/// `output_rows[c][output_row_index + r]`.
pub fn color_convert(
    color_space: ColorSpace,
    input_rows: &[&[u8]],
    output_rows: &mut [Vec<Vec<u8>>],
    output_row_index: usize,
    num_rows: usize,
) {
    match color_space {
        ColorSpace::Grayscale => {
            for r in 0..num_rows {
                let src = input_rows[r];
                output_rows[0][output_row_index + r][..src.len()].copy_from_slice(src);
            }
        }
        ColorSpace::YCbCr => {
            for r in 0..num_rows {
                let src = input_rows[r];
                let width = src.len() / 3;
                for x in 0..width {
                    let i = x * 3;
                    output_rows[0][output_row_index + r][x] = src[i];
                    output_rows[1][output_row_index + r][x] = src[i + 1];
                    output_rows[2][output_row_index + r][x] = src[i + 2];
                }
            }
        }
        ColorSpace::Rgb => {
            for r in 0..num_rows {
                let src = input_rows[r];
                let width = src.len() / 3;
                for x in 0..width {
                    let i = x * 3;
                    let (red, green, blue) = (
                        i32::from(src[i]),
                        i32::from(src[i + 1]),
                        i32::from(src[i + 2]),
                    );
                    let (y, cb, cr) = rgb_to_ycbcr(red, green, blue);
                    output_rows[0][output_row_index + r][x] = y;
                    output_rows[1][output_row_index + r][x] = cb;
                    output_rows[2][output_row_index + r][x] = cr;
                }
            }
        }
    }
}

#[inline]
fn rgb_to_ycbcr(r: i32, g: i32, b: i32) -> (u8, u8, u8) {
    // BT.601 full-range integer coefficients, Q16 fixed point.
    let y = (19595 * r + 38470 * g + 7471 * b + 32768) >> 16;
    let cb = ((-11059 * r - 21709 * g + 32768 * b + 8421375) >> 16) + 0;
    let cr = ((32768 * r - 27439 * g - 5329 * b + 8421375) >> 16) + 0;
    (clamp_u8(y), clamp_u8(cb), clamp_u8(cr))
}

/// The inverse conversion used on the decode side by `DPOST`'s downstream
/// consumer after upsampling.
pub fn ycbcr_to_rgb(y: u8, cb: u8, cr: u8) -> (u8, u8, u8) {
    let y = i32::from(y);
    let cb = i32::from(cb) - 128;
    let cr = i32::from(cr) - 128;

    let r = y + ((91881 * cr) >> 16);
    let g = y - ((22554 * cb + 46802 * cr) >> 16);
    let b = y + ((116130 * cb) >> 16);

    (clamp_u8(r), clamp_u8(g), clamp_u8(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_ycbcr_round_trip_is_within_rounding_error() {
        for &(r, g, b) in &[(0, 0, 0), (255, 255, 255), (128, 64, 200), (10, 250, 30)] {
            let (y, cb, cr) = rgb_to_ycbcr(r, g, b);
            let (r2, g2, b2) = ycbcr_to_rgb(y, cb, cr);
            assert!((i32::from(r2) - r).abs() <= 2);
            assert!((i32::from(g2) - g).abs() <= 2);
            assert!((i32::from(b2) - b).abs() <= 2);
        }
    }

    #[test]
    fn gray_128_stays_achromatic() {
        let (y, cb, cr) = rgb_to_ycbcr(128, 128, 128);
        assert_eq!(y, 128);
        assert_eq!(cb, 128);
        assert_eq!(cr, 128);
    }
}
