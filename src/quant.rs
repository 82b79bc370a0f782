//! Quality -> quantization-table derivation.
//!
//! Spec §1 names this out of the core's scope ("quality->quantization
//! table derivation: standard AA&N tables"); it's implemented here only
//! because `api::jsc_compress` needs a real table to hand the forward DCT
//! manager. Grounded on the Annex K base tables and the standard
//! `libjpeg`-family quality scale-factor formula reproduced in
//! `examples/other_examples/…vstroebel-jpeg-encoder__src-quantization.rs`.
#![allow(clippy::unreadable_literal)]

/// Annex K, Table K.1 -- baseline luminance quantization table, natural
/// (row-major) order.
#[rustfmt::skip]
pub const BASE_LUMA: [u16; 64] = [
    16, 11, 10, 16, 24, 40, 51, 61,
    12, 12, 14, 19, 26, 58, 60, 55,
    14, 13, 16, 24, 40, 57, 69, 56,
    14, 17, 22, 29, 51, 87, 80, 62,
    18, 22, 37, 56, 68, 109, 103, 77,
    24, 35, 55, 64, 81, 104, 113, 92,
    49, 64, 78, 87, 103, 121, 120, 101,
    72, 92, 95, 98, 112, 100, 103, 99,
];

/// Annex K, Table K.2 -- baseline chrominance quantization table, natural
/// order.
#[rustfmt::skip]
pub const BASE_CHROMA: [u16; 64] = [
    17, 18, 24, 47, 99, 99, 99, 99,
    18, 21, 26, 66, 99, 99, 99, 99,
    24, 26, 56, 99, 99, 99, 99, 99,
    47, 66, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
];

/// Scale a base Annex K table by `quality` (1..=100) the way
/// `jpeg_quality_scaling`/`jpeg_add_quant_table` do it in the libjpeg
/// family: `scale = 5000/quality` below 50, `200 - 2*quality` at or above.
#[must_use]
pub fn scale_table(base: &[u16; 64], quality: u8) -> [u16; 64] {
    let quality = quality.clamp(1, 100) as u32;
    let scale = if quality < 50 {
        5000 / quality
    } else {
        200 - quality * 2
    };

    let mut out = [0u16; 64];
    for (o, &b) in out.iter_mut().zip(base.iter()) {
        let v = (u32::from(b) * scale + 50) / 100;
        *o = v.clamp(1, 255) as u16;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_100_is_all_ones() {
        let t = scale_table(&BASE_LUMA, 100);
        assert!(t.iter().all(|&v| v == 1));
    }

    #[test]
    fn values_stay_in_8_bit_range() {
        for q in 1..=100u8 {
            for &v in &scale_table(&BASE_LUMA, q) {
                assert!((1..=255).contains(&v));
            }
        }
    }
}
