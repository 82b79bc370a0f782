//! Decompression post controller (DPOST, spec §4.7): a thin pass-through to
//! the upsampler, quantization stripped since this profile never needs it.

use crate::downsample::Method;
use crate::errors::JscResult;
use crate::upsample::upsample;

/// `post_process_data` (spec §4.7): doles whole row groups from
/// `input_buf[ci]` to `output_buf[ci]`, upsampling each component's group
/// on the way, stopping once `out_rows_avail` output rows have been
/// produced or `rowgroups_avail` groups have been consumed.
///
/// `output_buf[ci]` must already hold at least `out_rows_avail` rows --
/// callers preallocate the whole pass's output once through
/// [`crate::arena::Arena::alloc_rows`] -- since rows are written in place
/// at `out_row_ctr`'s index rather than pushed.
pub fn post_process_data(
    methods: &[Method],
    input_buf: &[Vec<Vec<u8>>],
    rowgroup_ctr: &mut usize,
    rowgroups_avail: usize,
    output_buf: &mut [Vec<Vec<u8>>],
    out_row_ctr: &mut usize,
    out_rows_avail: usize,
    max_v: usize,
    output_width: usize,
) -> JscResult<()> {
    while *rowgroup_ctr < rowgroups_avail && *out_row_ctr + max_v <= out_rows_avail {
        for (ci, &method) in methods.iter().enumerate() {
            let vi = component_group_size(method, max_v);
            let start = *rowgroup_ctr * vi;
            let input_rows = &input_buf[ci][start..start + vi];
            let mut out_rows = vec![vec![0u8; output_width]; max_v];
            upsample(method, input_rows, &mut out_rows, output_width)?;
            for (offset, row) in out_rows.into_iter().enumerate() {
                output_buf[ci][*out_row_ctr + offset] = row;
            }
        }
        *rowgroup_ctr += 1;
        *out_row_ctr += max_v;
    }
    Ok(())
}

fn component_group_size(method: Method, max_v: usize) -> usize {
    match method {
        Method::Fullsize | Method::H2V1 => max_v,
        Method::H2V2 => max_v / 2,
        Method::Integral { vx, .. } => max_v / vx,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;

    #[test]
    fn fullsize_component_passes_one_row_group_per_group() {
        let methods = vec![Method::Fullsize];
        let input_buf = vec![vec![vec![1u8, 2, 3, 4]; 8]];
        let mut output_buf = vec![Arena::alloc_rows(4, 8)];
        let mut rowgroup_ctr = 0;
        let mut out_row_ctr = 0;

        post_process_data(
            &methods,
            &input_buf,
            &mut rowgroup_ctr,
            8,
            &mut output_buf,
            &mut out_row_ctr,
            8,
            1,
            4,
        )
        .unwrap();

        assert_eq!(rowgroup_ctr, 8);
        assert_eq!(out_row_ctr, 8);
        assert_eq!(output_buf[0].len(), 8);
    }

    #[test]
    fn h2v2_component_halves_the_row_group_size() {
        let methods = vec![Method::H2V2];
        let input_buf = vec![vec![vec![9u8, 9]; 4]];
        let mut output_buf = vec![Arena::alloc_rows(4, 8)];
        let mut rowgroup_ctr = 0;
        let mut out_row_ctr = 0;

        post_process_data(
            &methods,
            &input_buf,
            &mut rowgroup_ctr,
            4,
            &mut output_buf,
            &mut out_row_ctr,
            8,
            2,
            4,
        )
        .unwrap();

        assert_eq!(rowgroup_ctr, 4);
        assert_eq!(out_row_ctr, 8);
        assert_eq!(output_buf[0].len(), 8);
        assert!(output_buf[0].iter().all(|r| r == &vec![9u8, 9, 9, 9]));
    }

    #[test]
    fn stops_early_when_output_capacity_runs_out() {
        let methods = vec![Method::Fullsize];
        let input_buf = vec![vec![vec![0u8; 2]; 8]];
        let mut output_buf = vec![Arena::alloc_rows(2, 3)];
        let mut rowgroup_ctr = 0;
        let mut out_row_ctr = 0;

        post_process_data(
            &methods,
            &input_buf,
            &mut rowgroup_ctr,
            8,
            &mut output_buf,
            &mut out_row_ctr,
            3,
            1,
            2,
        )
        .unwrap();

        assert_eq!(rowgroup_ctr, 3);
        assert_eq!(out_row_ctr, 3);
    }
}
