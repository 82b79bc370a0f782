//! The float AA&N forward DCT kernel (spec §4.1, "pure math" leaf) and the
//! forward DCT manager (FDCTM) that drives it.
//!
//! The kernel itself has no notion of components, quantization or
//! rounding -- it only knows how to level-shift and transform one 8x8
//! block, mirroring the teacher's `idct_fl` in `idct.rs` (same AA&N
//! factoring family, opposite direction) in spirit: row pass, then column
//! pass, scalar float arithmetic, no SIMD variant (this profile has
//! exactly one float DCT implementation per spec §1).
#![allow(clippy::excessive_precision, clippy::many_single_char_names)]

use crate::consts::{AAN_SCALE_FACTORS, DCTSIZE, DCTSIZE2};
use crate::errors::{JscError, JscResult};
use crate::image::ComponentSpec;

const SQRT1_2: f32 = std::f32::consts::FRAC_1_SQRT_2;
const C2: f32 = 0.541_196_100;
const C4: f32 = 0.707_106_781; // == SQRT1_2, spelled out to match jfdctflt's literal
const C6: f32 = 1.306_562_965;
const C_Z5: f32 = 0.382_683_433;

/// Level-shift an 8-bit sample block to be centered on zero and run the
/// forward AA&N DCT in place.
///
/// `samples` holds 64 values in `[0, 255]`, row-major; `out` receives 64
/// DCT coefficients, still scaled up (the scaling is absorbed into the
/// divisor table by [`FdctManager`], never removed here).
pub fn forward_dct_block(samples: &[u8; DCTSIZE2], out: &mut [f32; DCTSIZE2]) {
    for (o, &s) in out.iter_mut().zip(samples.iter()) {
        *o = f32::from(s) - 128.0;
    }

    // Pass 1: rows.
    for row in 0..DCTSIZE {
        dct_1d(&mut out[row * DCTSIZE..row * DCTSIZE + DCTSIZE]);
    }

    // Pass 2: columns. Gather into a scratch column, transform, scatter
    // back -- the kernel has no SIMD variant to justify a transposed
    // layout, so plain indexing keeps it obviously correct.
    for col in 0..DCTSIZE {
        let mut column = [0.0f32; DCTSIZE];
        for row in 0..DCTSIZE {
            column[row] = out[row * DCTSIZE + col];
        }
        dct_1d(&mut column);
        for row in 0..DCTSIZE {
            out[row * DCTSIZE + col] = column[row];
        }
    }
}

/// One 1-D, 8-point AA&N forward DCT pass (the IJG `jfdctflt` factoring:
/// 5 multiplies and 29 adds instead of the naive 64).
#[inline]
fn dct_1d(d: &mut [f32]) {
    let tmp0 = d[0] + d[7];
    let tmp7 = d[0] - d[7];
    let tmp1 = d[1] + d[6];
    let tmp6 = d[1] - d[6];
    let tmp2 = d[2] + d[5];
    let tmp5 = d[2] - d[5];
    let tmp3 = d[3] + d[4];
    let tmp4 = d[3] - d[4];

    let tmp10 = tmp0 + tmp3;
    let tmp13 = tmp0 - tmp3;
    let tmp11 = tmp1 + tmp2;
    let tmp12 = tmp1 - tmp2;

    d[0] = tmp10 + tmp11;
    d[4] = tmp10 - tmp11;

    let z1 = (tmp12 + tmp13) * C4;
    d[2] = tmp13 + z1;
    d[6] = tmp13 - z1;

    let tmp10 = tmp4 + tmp5;
    let tmp11 = tmp5 + tmp6;
    let tmp12 = tmp6 + tmp7;

    let z5 = (tmp10 - tmp12) * C_Z5;
    let z2 = C2 * tmp10 + z5;
    let z4 = C6 * tmp12 + z5;
    let z3 = tmp11 * SQRT1_2;

    let z11 = tmp7 + z3;
    let z13 = tmp7 - z3;

    d[5] = z13 + z2;
    d[3] = z13 - z2;
    d[1] = z11 + z4;
    d[7] = z11 - z4;
}

/// Per-component divisor table: `divisor[k] = 1 / (qtbl[k] * aan[row] *
/// aan[col] * S)`, `S = 16` when `component_needed` else `8` (spec §3).
pub fn build_divisor_table(qtbl: &[u16; DCTSIZE2], component_needed: bool) -> [f32; DCTSIZE2] {
    let s = if component_needed { 16.0 } else { 8.0 };
    let mut table = [0.0f32; DCTSIZE2];
    for row in 0..DCTSIZE {
        for col in 0..DCTSIZE {
            let k = row * DCTSIZE + col;
            let scale = f64::from(qtbl[k])
                * f64::from(AAN_SCALE_FACTORS[row])
                * f64::from(AAN_SCALE_FACTORS[col])
                * f64::from(s);
            table[k] = (1.0 / scale) as f32;
        }
    }
    table
}

/// The forward DCT manager (FDCTM): owns one divisor table per component
/// and quantizes/rounds the kernel's float output into 16-bit coefficients.
pub struct FdctManager {
    divisors: Vec<[f32; DCTSIZE2]>,
}

impl FdctManager {
    /// Start-of-pass setup (spec §4.1): validate each component's
    /// quantization table slot and build its divisor table.
    pub fn start_pass(
        components: &[ComponentSpec],
        quant_tables: &[Option<[u16; DCTSIZE2]>],
    ) -> JscResult<Self> {
        let mut divisors = Vec::with_capacity(components.len());
        for c in components {
            let slot = usize::from(c.quant_table_no);
            let qtbl = quant_tables
                .get(slot)
                .and_then(|t| t.as_ref())
                .ok_or_else(|| {
                    JscError::invariant(format!(
                        "component {} references quant table slot {} which is not present",
                        c.index, slot
                    ))
                })?;
            divisors.push(build_divisor_table(qtbl, c.component_needed));
        }
        Ok(Self { divisors })
    }

    /// `forward_DCT` (spec §4.1): runs the kernel over `num_blocks`
    /// horizontal 8x8 blocks of `sample_data` starting at
    /// `(start_row, start_col)`, quantizes, and writes natural-order
    /// 16-bit coefficients into `coef_blocks`.
    ///
    /// `sample_data` is addressed as `sample_data[row][col]`; rows beyond
    /// the component's real data are expected to already carry replicated
    /// edge samples (PREP's responsibility, not this manager's).
    pub fn forward_dct(
        &self,
        component_index: usize,
        sample_data: &[&[u8]],
        coef_blocks: &mut [[i16; DCTSIZE2]],
        start_row: usize,
        mut start_col: usize,
        num_blocks: usize,
    ) {
        let divisor = &self.divisors[component_index];
        for block in coef_blocks.iter_mut().take(num_blocks) {
            let mut samples = [0u8; DCTSIZE2];
            for r in 0..DCTSIZE {
                let row = &sample_data[start_row + r];
                samples[r * DCTSIZE..r * DCTSIZE + DCTSIZE]
                    .copy_from_slice(&row[start_col..start_col + DCTSIZE]);
            }

            let mut coeffs = [0.0f32; DCTSIZE2];
            forward_dct_block(&samples, &mut coeffs);

            for k in 0..DCTSIZE2 {
                block[k] = quantize_and_round(coeffs[k] * divisor[k]);
            }

            start_col += DCTSIZE;
        }
    }
}

/// Round `temp` to the nearest integer via the source's biased-truncation
/// idiom: `trunc(temp + 16384.5) - 16384`. Spec §4.1's rationale: the
/// maximum `|coefficient|` for 8-bit data stays far below 16384, so adding
/// then subtracting that constant is exact, and truncation toward zero on
/// the shifted value behaves as round-half-up symmetrically for both
/// signs across the whole representable coefficient range.
#[inline]
#[allow(clippy::cast_possible_truncation)]
fn quantize_and_round(temp: f32) -> i16 {
    ((temp + 16384.5) as i64 - 16384) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divisor_correctness() {
        let qtbl = [2u16; DCTSIZE2];
        for &needed in &[true, false] {
            let table = build_divisor_table(&qtbl, needed);
            let s = if needed { 16.0f64 } else { 8.0 };
            for row in 0..DCTSIZE {
                for col in 0..DCTSIZE {
                    let k = row * DCTSIZE + col;
                    let scale = f64::from(qtbl[k])
                        * f64::from(AAN_SCALE_FACTORS[row])
                        * f64::from(AAN_SCALE_FACTORS[col])
                        * s;
                    let product = f64::from(table[k]) * scale;
                    assert!((product - 1.0).abs() < 1e-5, "product={product}");
                }
            }
        }
    }

    #[test]
    fn flat_input_has_zero_ac_and_level_shifted_dc() {
        let samples = [128u8; DCTSIZE2];
        let mut out = [0.0f32; DCTSIZE2];
        forward_dct_block(&samples, &mut out);
        assert!(out[0].abs() < 1e-3, "dc={}", out[0]);
        for &v in &out[1..] {
            assert!(v.abs() < 1e-3);
        }
    }

    #[test]
    fn quantize_and_round_rounds_half_up() {
        assert_eq!(quantize_and_round(2.5), 3);
        assert_eq!(quantize_and_round(-2.5), -2);
        assert_eq!(quantize_and_round(0.49), 0);
        assert_eq!(quantize_and_round(-0.49), 0);
    }
}
