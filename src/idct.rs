//! The float AA&N inverse DCT kernel (spec §4.5, the mirror of
//! `fdct.rs`'s forward kernel) and the IDCT manager that drives it.
#![allow(clippy::excessive_precision, clippy::many_single_char_names)]

use crate::consts::{AAN_SCALE_FACTORS, DCTSIZE, DCTSIZE2};
use crate::image::ComponentSpec;

const SQRT2: f32 = std::f32::consts::SQRT_2;
const C1: f32 = 1.847_759_065;
const C2: f32 = 1.082_392_200;
const C3: f32 = 2.613_125_930;

/// Dequantize and run the inverse AA&N DCT on one block, level-shift back
/// to `[0, 255]` and clamp. `coeffs` are natural-order; `out` receives 64
/// 8-bit samples, row-major.
pub fn inverse_dct_block(coeffs: &[i16; DCTSIZE2], multiplier: &[f32; DCTSIZE2], out: &mut [u8; DCTSIZE2]) {
    let mut work = [0.0f32; DCTSIZE2];
    for k in 0..DCTSIZE2 {
        work[k] = f32::from(coeffs[k]) * multiplier[k];
    }

    // Pass 1: columns.
    for col in 0..DCTSIZE {
        let mut column = [0.0f32; DCTSIZE];
        for row in 0..DCTSIZE {
            column[row] = work[row * DCTSIZE + col];
        }
        idct_1d(&mut column);
        for row in 0..DCTSIZE {
            work[row * DCTSIZE + col] = column[row];
        }
    }

    // Pass 2: rows. Descale by 8 (two 1-D passes each carry a sqrt(8)
    // scale baked into the AA&N factoring) and level-shift.
    for row in 0..DCTSIZE {
        let slice = &mut work[row * DCTSIZE..row * DCTSIZE + DCTSIZE];
        idct_1d(slice);
        for (o, &v) in out[row * DCTSIZE..row * DCTSIZE + DCTSIZE]
            .iter_mut()
            .zip(slice.iter())
        {
            *o = clamp_sample(v / 8.0 + 128.0);
        }
    }
}

#[inline]
fn clamp_sample(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// One 1-D, 8-point AA&N inverse DCT pass (the IJG `jidctflt` factoring).
#[inline]
fn idct_1d(d: &mut [f32]) {
    let tmp0 = d[0];
    let tmp1 = d[2];
    let tmp2 = d[4];
    let tmp3 = d[6];

    let tmp10 = tmp0 + tmp2;
    let tmp11 = tmp0 - tmp2;

    let tmp13 = tmp1 + tmp3;
    let tmp12 = (tmp1 - tmp3) * SQRT2 - tmp13;

    let e0 = tmp10 + tmp13;
    let e3 = tmp10 - tmp13;
    let e1 = tmp11 + tmp12;
    let e2 = tmp11 - tmp12;

    let tmp4 = d[1];
    let tmp5 = d[3];
    let tmp6 = d[5];
    let tmp7 = d[7];

    let z13 = tmp6 + tmp5;
    let z10 = tmp6 - tmp5;
    let z11 = tmp4 + tmp7;
    let z12 = tmp4 - tmp7;

    let o7 = z11 + z13;
    let t11 = (z11 - z13) * SQRT2;

    let z5 = (z10 + z12) * C1;
    let t10 = C2 * z12 - z5;
    let t12 = -C3 * z10 + z5;

    let o6 = t12 - o7;
    let o5 = t11 - o6;
    let o4 = t10 + o5;

    d[0] = e0 + o7;
    d[7] = e0 - o7;
    d[1] = e1 + o6;
    d[6] = e1 - o6;
    d[2] = e2 + o5;
    d[5] = e2 - o5;
    d[4] = e3 + o4;
    d[3] = e3 - o4;
}

/// Build one component's multiplier table: `mult[k] = qtbl[k] * aan[row] *
/// aan[col] * 0.125` (spec §3). A component with no quantization table
/// saved yet keeps an all-zero table, decoding as neutral gray per §4.5.
#[must_use]
pub fn build_multiplier_table(qtbl: Option<&[u16; DCTSIZE2]>) -> [f32; DCTSIZE2] {
    let mut table = [0.0f32; DCTSIZE2];
    let Some(qtbl) = qtbl else { return table };
    for row in 0..DCTSIZE {
        for col in 0..DCTSIZE {
            let k = row * DCTSIZE + col;
            table[k] =
                f32::from(qtbl[k]) * AAN_SCALE_FACTORS[row] * AAN_SCALE_FACTORS[col] * 0.125;
        }
    }
    table
}

/// The inverse DCT manager: owns one multiplier table per component.
pub struct IdctManager {
    multipliers: Vec<[f32; DCTSIZE2]>,
}

impl IdctManager {
    /// Start-of-pass setup (spec §4.5).
    #[must_use]
    pub fn start_pass(
        components: &[ComponentSpec],
        quant_tables: &[Option<[u16; DCTSIZE2]>],
    ) -> Self {
        let multipliers = components
            .iter()
            .map(|c| {
                let slot = usize::from(c.quant_table_no);
                let qtbl = quant_tables.get(slot).and_then(|t| t.as_ref());
                if c.component_needed {
                    build_multiplier_table(qtbl)
                } else {
                    [0.0f32; DCTSIZE2]
                }
            })
            .collect();
        Self { multipliers }
    }

    /// Dispatch the fixed float IDCT variant for one block of `component_index`.
    pub fn inverse_dct(
        &self,
        component_index: usize,
        coeffs: &[i16; DCTSIZE2],
        out: &mut [u8; DCTSIZE2],
    ) {
        inverse_dct_block(coeffs, &self.multipliers[component_index], out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fdct::forward_dct_block;

    #[test]
    fn dc_only_round_trips_to_flat_block() {
        let multiplier = build_multiplier_table(Some(&[1u16; DCTSIZE2])).map(|v| v * 8.0);
        let mut coeffs = [0i16; DCTSIZE2];
        // A flat output of 0 needs a level-shifted value of -128; this
        // kernel's unscaled DC gain is 64x (two AA&N passes, 8x each), so
        // the DC coefficient that reconstructs to black is 64 * -128.
        coeffs[0] = 64 * -128;
        let mut out = [0u8; DCTSIZE2];
        inverse_dct_block(&coeffs, &multiplier, &mut out);
        for &v in &out {
            assert_eq!(v, 0, "flat DC-only block should reconstruct to a flat value");
        }
    }

    #[test]
    fn forward_then_inverse_recovers_flat_input_exactly() {
        let samples = [200u8; DCTSIZE2];
        let mut freq = [0.0f32; DCTSIZE2];
        forward_dct_block(&samples, &mut freq);

        // multiplier of 1/8 inverts the unscaled forward kernel's implicit
        // factor-of-8 gain with no quantization in between.
        let multiplier = [0.125f32; DCTSIZE2];
        let mut coeffs = [0i16; DCTSIZE2];
        for (c, &f) in coeffs.iter_mut().zip(freq.iter()) {
            *c = f.round() as i16;
        }

        let mut out = [0u8; DCTSIZE2];
        inverse_dct_block(&coeffs, &multiplier, &mut out);
        for &v in &out {
            assert!((i32::from(v) - 200).abs() <= 1, "got {v}");
        }
    }
}
