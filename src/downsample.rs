//! The downsampler (spec §4.2): per-component chroma subsampling kernels
//! plus horizontal edge expansion.
//!
//! Design Note "function-pointer vtables -> sum types": the source
//! dispatches through a per-component method pointer chosen at
//! start-of-pass; here that's [`Method`], an exhaustive enum picked once
//! and stored per component.

use crate::errors::{JscError, JscResult};
use crate::image::ComponentSpec;

/// The four downsample kernels spec §4.2 names, keyed by the per-component
/// ratio `(max_h/hi, max_v/vi)`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Method {
    Fullsize,
    H2V1,
    H2V2,
    Integral { hx: usize, vx: usize },
}

impl Method {
    /// Select a method for one component's sampling factors against the
    /// image's maximum, validating divisibility (spec §4.2).
    pub fn select(max_h: usize, max_v: usize, component: &ComponentSpec) -> JscResult<Self> {
        let hi = usize::from(component.h_samp);
        let vi = usize::from(component.v_samp);
        if max_h % hi != 0 || max_v % vi != 0 {
            return Err(JscError::invariant(format!(
                "component {} sampling factors ({hi}, {vi}) do not divide max ({max_h}, {max_v})",
                component.index
            )));
        }
        let hx = max_h / hi;
        let vx = max_v / vi;
        Ok(match (hx, vx) {
            (1, 1) => Self::Fullsize,
            (2, 1) => Self::H2V1,
            (2, 2) => Self::H2V2,
            _ => Self::Integral { hx, vx },
        })
    }
}

/// Replicate the last real sample in each row rightward so the row spans
/// `width_in_blocks * 8 * hx` samples, before any averaging kernel runs.
pub fn edge_expand(row: &mut Vec<u8>, expanded_width: usize) {
    if row.is_empty() {
        row.resize(expanded_width, 0);
        return;
    }
    let last = *row.last().unwrap();
    row.resize(expanded_width, last);
}

/// Run one component's selected downsample method over one row group.
///
/// `input_rows` holds `max_v` edge-expanded source rows (already widened
/// by [`edge_expand`]); `output_rows` receives `vi` rows, each
/// `output_width` samples wide. `bias` is the per-row dither state
/// (Design Note: must be reset at the start of each *output* row, never
/// shared across components).
pub fn downsample(
    method: Method,
    input_rows: &[Vec<u8>],
    output_rows: &mut [Vec<u8>],
    output_width: usize,
) {
    match method {
        Method::Fullsize => {
            for (out, src) in output_rows.iter_mut().zip(input_rows.iter()) {
                out.clear();
                out.extend_from_slice(&src[..output_width]);
            }
        }
        Method::H2V1 => {
            for (out, src) in output_rows.iter_mut().zip(input_rows.iter()) {
                out.clear();
                let mut bias: u32 = 0;
                for x in 0..output_width {
                    let a = u32::from(src[2 * x]);
                    let b = u32::from(src[2 * x + 1]);
                    out.push(((a + b + bias) >> 1) as u8);
                    bias ^= 1;
                }
            }
        }
        Method::H2V2 => {
            for (row_idx, out) in output_rows.iter_mut().enumerate() {
                out.clear();
                let top = &input_rows[row_idx * 2];
                let bottom = &input_rows[row_idx * 2 + 1];
                let mut bias: u32 = 1;
                for x in 0..output_width {
                    let sum = u32::from(top[2 * x])
                        + u32::from(top[2 * x + 1])
                        + u32::from(bottom[2 * x])
                        + u32::from(bottom[2 * x + 1]);
                    out.push(((sum + bias) >> 2) as u8);
                    bias ^= 3;
                }
            }
        }
        Method::Integral { hx, vx } => {
            let denom = (hx * vx) as u32;
            for (row_idx, out) in output_rows.iter_mut().enumerate() {
                out.clear();
                for x in 0..output_width {
                    let mut sum: u32 = 0;
                    for v in 0..vx {
                        let src = &input_rows[row_idx * vx + v];
                        for h in 0..hx {
                            sum += u32::from(src[x * hx + h]);
                        }
                    }
                    out.push(((sum + denom / 2) / denom) as u8);
                }
            }
        }
    }
}
