//! The decode-side upsampler, symmetric to [`crate::downsample`].
//!
//! Spec §6 names its call contract: `upsample(input_buffer, &in_group_ctr,
//! in_groups_avail, output_buf, &out_row_ctr, out_rows_avail)` with
//! `need_context_rows == FALSE` enforced -- this profile never implements
//! the context-row path (spec §9, "explicitly unsupported").

use crate::downsample::Method;
use crate::errors::{JscError, JscResult};

/// Expand one component's row group back up to full resolution.
///
/// `input_rows` holds `vi` downsampled rows; `output_rows` receives
/// `max_v` rows of `output_width` samples, produced by simple pixel
/// replication (the inverse of the averaging kernels -- this profile
/// never attempts to undo the dither, matching the source's own
/// fancy-upsampling-disabled baseline path).
pub fn upsample(
    method: Method,
    input_rows: &[Vec<u8>],
    output_rows: &mut [Vec<u8>],
    output_width: usize,
) -> JscResult<()> {
    match method {
        Method::Fullsize => {
            for (out, src) in output_rows.iter_mut().zip(input_rows.iter()) {
                out.clear();
                out.extend_from_slice(&src[..output_width]);
            }
        }
        Method::H2V1 => {
            let src = &input_rows[0];
            for out in output_rows.iter_mut() {
                out.clear();
                replicate_h(src, out, output_width);
            }
        }
        Method::H2V2 => {
            for (row_idx, out) in output_rows.iter_mut().enumerate() {
                out.clear();
                replicate_h(&input_rows[row_idx / 2], out, output_width);
            }
        }
        Method::Integral { hx, vx } => {
            for row_idx in 0..output_rows.len() {
                let src_row = row_idx / vx;
                if src_row >= input_rows.len() {
                    return Err(JscError::invariant(
                        "integral upsample requested more output rows than input groups provide",
                    ));
                }
                let src = &input_rows[src_row];
                let out = &mut output_rows[row_idx];
                out.clear();
                for x in 0..output_width {
                    out.push(src[x / hx]);
                }
            }
        }
    }
    Ok(())
}

fn replicate_h(src: &[u8], out: &mut Vec<u8>, output_width: usize) {
    for x in 0..output_width {
        out.push(src[x / 2]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fullsize_passes_through() {
        let input = vec![vec![9u8, 8, 7]];
        let mut output = vec![vec![0u8; 3]];
        upsample(Method::Fullsize, &input, &mut output, 3).unwrap();
        assert_eq!(output[0], vec![9, 8, 7]);
    }

    #[test]
    fn h2v1_doubles_each_sample_horizontally() {
        let input = vec![vec![10u8, 20]];
        let mut output = vec![vec![0u8; 4]];
        upsample(Method::H2V1, &input, &mut output, 4).unwrap();
        assert_eq!(output[0], vec![10, 10, 20, 20]);
    }

    #[test]
    fn h2v2_replicates_both_axes() {
        let input = vec![vec![5u8, 6]];
        let mut output = vec![vec![0u8; 4]; 2];
        upsample(Method::H2V2, &input, &mut output, 4).unwrap();
        assert_eq!(output[0], vec![5, 5, 6, 6]);
        assert_eq!(output[1], vec![5, 5, 6, 6]);
    }
}
