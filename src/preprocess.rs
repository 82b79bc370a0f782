//! The preprocessing controller (PREP, spec §4.3): buffers input pixel
//! rows, color-converts them, and invokes the downsampler once per row
//! group, with vertical edge replication at the bottom of the image.
//!
//! A row group is `max_v` source rows (spec §3); one iMCU row is exactly
//! `DCTSIZE` row groups tall regardless of subsampling, since `max_v · 8`
//! source rows divided into groups of `max_v` rows always yields 8 groups.

use crate::arena::Arena;
use crate::consts::DCTSIZE;
use crate::color_convert::color_convert;
use crate::downsample::{downsample, Method};
use crate::errors::JscResult;
use crate::image::{ColorSpace, ComponentSpec, DerivedDimensions, ImageInfo};

struct Scratch {
    rows: Vec<Vec<u8>>,
    real_width: usize,
}

pub struct PrepController {
    max_v: usize,
    methods: Vec<Method>,
    output_width: Vec<usize>,
    scratch: Vec<Scratch>,
    next_buf_row: usize,
    rows_to_go: usize,
    color_space: ColorSpace,
}

/// Row groups per iMCU row (spec §4.3): a constant, independent of
/// subsampling.
pub const ROW_GROUPS_PER_IMCU_ROW: usize = DCTSIZE;

impl PrepController {
    pub fn start_pass(image: &ImageInfo, derived: &DerivedDimensions) -> JscResult<Self> {
        let mut methods = Vec::with_capacity(image.components.len());
        let mut output_width = Vec::with_capacity(image.components.len());
        let mut scratch = Vec::with_capacity(image.components.len());

        for (i, c) in image.components.iter().enumerate() {
            let method = Method::select(derived.max_h, derived.max_v, c)?;
            let hx = derived.max_h / usize::from(c.h_samp);
            let width = derived.width_in_blocks[i] * 8 * hx;
            output_width.push(derived.width_in_blocks[i] * 8);
            methods.push(method);
            scratch.push(Scratch {
                rows: Arena::alloc_rows(width, derived.max_v),
                real_width: image.width,
            });
        }

        Ok(Self {
            max_v: derived.max_v,
            methods,
            output_width,
            scratch,
            next_buf_row: 0,
            rows_to_go: image.height,
            color_space: image.color_space,
        })
    }

    fn vi(&self, component: usize) -> usize {
        match self.methods[component] {
            Method::Fullsize | Method::H2V1 => self.max_v,
            Method::H2V2 => self.max_v / 2,
            Method::Integral { vx, .. } => self.max_v / vx,
        }
    }

    /// Row width and row count one component's `output` relay buffer needs
    /// to hold a full iMCU row's worth of downsampled rows. Callers
    /// preallocate `output[c]` to this shape once, through
    /// [`Arena::alloc_rows`], instead of growing it with `output[c].extend`.
    #[must_use]
    pub fn imcu_row_buffer_shape(&self, component: usize) -> (usize, usize) {
        (self.output_width[component], self.vi(component) * ROW_GROUPS_PER_IMCU_ROW)
    }

    /// `pre_process_data` (spec §4.3). `output[c]` must already be sized to
    /// [`PrepController::imcu_row_buffer_shape`]; rows are written in place
    /// at `out_row_group_ctr`'s index, never pushed. `out_row_group_ctr`
    /// counts row groups produced so far this iMCU row, bounded by
    /// `out_row_groups_avail` (normally [`ROW_GROUPS_PER_IMCU_ROW`]).
    pub fn pre_process_data(
        &mut self,
        input_buf: &[&[u8]],
        in_row_ctr: &mut usize,
        in_rows_avail: usize,
        output: &mut [Vec<Vec<u8>>],
        out_row_group_ctr: &mut usize,
        out_row_groups_avail: usize,
    ) {
        let components = self.methods.len();

        while *out_row_group_ctr < out_row_groups_avail {
            if self.rows_to_go > 0 {
                if *in_row_ctr >= in_rows_avail {
                    break;
                }
                let numrows = (self.max_v - self.next_buf_row)
                    .min(in_rows_avail - *in_row_ctr)
                    .min(self.rows_to_go);
                if numrows > 0 {
                    let rows: Vec<&[u8]> =
                        input_buf[*in_row_ctr..*in_row_ctr + numrows].to_vec();
                    let mut scratch_rows: Vec<Vec<Vec<u8>>> =
                        self.scratch.iter().map(|s| s.rows.clone()).collect();
                    color_convert(
                        self.color_space,
                        &rows,
                        &mut scratch_rows,
                        self.next_buf_row,
                        numrows,
                    );
                    for (dst, src) in self.scratch.iter_mut().zip(scratch_rows.into_iter()) {
                        dst.rows = src;
                    }

                    *in_row_ctr += numrows;
                    self.next_buf_row += numrows;
                    self.rows_to_go -= numrows;
                }
            }

            if self.rows_to_go == 0 && self.next_buf_row > 0 && self.next_buf_row < self.max_v {
                for s in &mut self.scratch {
                    let last = s.rows[self.next_buf_row - 1].clone();
                    for r in self.next_buf_row..self.max_v {
                        s.rows[r] = last.clone();
                    }
                }
                self.next_buf_row = self.max_v;
            }

            if self.next_buf_row == self.max_v {
                for c in 0..components {
                    let s = &mut self.scratch[c];
                    let real = s.real_width;
                    for row in &mut s.rows {
                        if real > 0 && row.len() > real {
                            let fill = row[real - 1];
                            for v in &mut row[real..] {
                                *v = fill;
                            }
                        }
                    }
                }
                for c in 0..components {
                    let method = self.methods[c];
                    let out_w = self.output_width[c];
                    let vi = self.vi(c);
                    let mut group = vec![vec![0u8; out_w]; vi];
                    downsample(method, &self.scratch[c].rows, &mut group, out_w);
                    let base = *out_row_group_ctr * vi;
                    for (offset, row) in group.into_iter().enumerate() {
                        output[c][base + offset] = row;
                    }
                }
                self.next_buf_row = 0;
                *out_row_group_ctr += 1;
                continue;
            }

            if self.rows_to_go == 0 {
                // Buffer is empty (no partial group in progress) and the
                // image is exhausted: pad the remaining output row groups
                // by replicating the last one produced.
                for c in 0..components {
                    let vi = self.vi(c);
                    if *out_row_group_ctr == 0 {
                        break;
                    }
                    let last_base = (*out_row_group_ctr - 1) * vi;
                    let last_group: Vec<Vec<u8>> = output[c][last_base..last_base + vi].to_vec();
                    for g in *out_row_group_ctr..out_row_groups_avail {
                        let base = g * vi;
                        for (offset, row) in last_group.iter().enumerate() {
                            output[c][base + offset] = row.clone();
                        }
                    }
                }
                *out_row_group_ctr = out_row_groups_avail;
            }
            break;
        }
    }
}
