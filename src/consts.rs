//! Shared constants: the AA&N scale vector, zig-zag tables and marker codes.
//!
//! Carried over from the teacher's `misc.rs`, trimmed to the baseline
//! sequential subset this profile supports (progressive/lossless/arithmetic
//! SOF markers are parsed only far enough to be rejected, per spec §7).
#![allow(dead_code)]

/// JPEG block is always 8x8 in this profile; no DCT scaling is supported.
pub const DCTSIZE: usize = 8;
pub const DCTSIZE2: usize = 64;

/// Maximum blocks per MCU this profile accepts (`C_MAX_BLOCKS_IN_MCU`).
pub const MAX_BLOCKS_IN_MCU: usize = 10;

/// Maximum number of image components (`Nc`) this profile accepts.
pub const MAX_COMPONENTS: usize = 10;

pub const NUM_QUANT_TBLS: usize = 4;
pub const NUM_HUFF_TBLS: usize = 4;

/// AA&N (Arai, Agui, Nakajima) scale factors, absorbed into the
/// divisor/multiplier tables so the inner DCT/IDCT loops stay
/// multiplication-only.
pub const AAN_SCALE_FACTORS: [f32; 8] = [
    1.0,
    1.387_039_845,
    1.306_562_965,
    1.175_875_602,
    1.0,
    0.785_694_958,
    0.541_196_100,
    0.275_899_379,
];

/// Undo run-length/zig-zag ordering: `UN_ZIGZAG[k]` is the natural-order
/// index of the `k`-th zig-zag coefficient.
#[rustfmt::skip]
pub const UN_ZIGZAG: [usize; 64] = [
    0,  1,  8,  16, 9,  2,  3, 10,
    17, 24, 32, 25, 18, 11, 4,  5,
    12, 19, 26, 33, 40, 48, 41, 34,
    27, 20, 13, 6,  7,  14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36,
    29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46,
    53, 60, 61, 54, 47, 55, 62, 63,
];

/// Apply run-length/zig-zag ordering: `ZIGZAG[k]` is the zig-zag position of
/// the `k`-th natural-order coefficient. The inverse permutation of
/// `UN_ZIGZAG`, computed once at compile time.
pub const ZIGZAG: [usize; 64] = invert(UN_ZIGZAG);

const fn invert(table: [usize; 64]) -> [usize; 64] {
    let mut out = [0usize; 64];
    let mut i = 0;
    while i < 64 {
        out[table[i]] = i;
        i += 1;
    }
    out
}

// Marker codes (second byte; all markers are prefixed with 0xFF).
pub const MARKER_SOI: u8 = 0xD8;
pub const MARKER_EOI: u8 = 0xD9;
pub const MARKER_SOS: u8 = 0xDA;
pub const MARKER_DQT: u8 = 0xDB;
pub const MARKER_DHT: u8 = 0xC4;
pub const MARKER_DRI: u8 = 0xDD;
pub const MARKER_APP0: u8 = 0xE0;
pub const MARKER_COM: u8 = 0xFE;
pub const MARKER_RST0: u8 = 0xD0;
pub const MARKER_RST7: u8 = 0xD7;

/// Start of baseline DCT Huffman coding -- the only frame type this profile
/// writes or accepts.
pub const SOF_BASELINE: u8 = 0xC0;
pub const SOF_EXTENDED_SEQUENTIAL: u8 = 0xC1;
pub const SOF_PROGRESSIVE: u8 = 0xC2;
pub const SOF_LOSSLESS: u8 = 0xC3;

/// The literal marker payload spec §6 requires immediately after
/// `jpeg_start_compress`.
pub const JSC_COM_PAYLOAD: [u8; 4] = *b"JSC\0";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zigzag_is_the_inverse_of_un_zigzag() {
        for (natural, &zz) in UN_ZIGZAG.iter().enumerate() {
            assert_eq!(ZIGZAG[zz], natural);
        }
    }

    #[test]
    fn un_zigzag_is_a_permutation() {
        let mut seen = [false; 64];
        for &idx in &UN_ZIGZAG {
            assert!(!seen[idx], "duplicate index {idx}");
            seen[idx] = true;
        }
    }
}
