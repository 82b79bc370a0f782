//! Decompression main controller (DMAIN, spec §4.6, no-context variant):
//! pulls one iMCU row of decoded+IDCT'd samples from the coefficient
//! decoder, then doles row groups to DPOST's upsampler -- the decode-side
//! mirror of `preprocess.rs`'s PREP controller.

use crate::arena::Arena;
use crate::consts::DCTSIZE;
use crate::dcoefc::{ComponentSamplesMut, DCoefController};
use crate::downsample::Method;
use crate::dpost;
use crate::entropy::HuffmanDecoder;
use crate::errors::JscResult;
use crate::idct::IdctManager;
use crate::image::{ComponentSpec, DerivedDimensions};
use crate::progress::Progress;

/// Row groups per iMCU row, parametric but always 8 in this profile
/// (mirrors `preprocess::ROW_GROUPS_PER_IMCU_ROW`).
pub const ROW_GROUPS_PER_IMCU_ROW: usize = DCTSIZE;

pub struct DMainController {
    buffer: Vec<Vec<Vec<u8>>>,
    methods: Vec<Method>,
    rowgroup_ctr: usize,
    rowgroups_avail: usize,
}

impl DMainController {
    pub fn start_pass(components: &[ComponentSpec], derived: &DerivedDimensions) -> JscResult<Self> {
        let mut methods = Vec::with_capacity(components.len());
        let mut buffer = Vec::with_capacity(components.len());
        for (i, c) in components.iter().enumerate() {
            let method = Method::select(derived.max_h, derived.max_v, c)?;
            methods.push(method);
            let vi = usize::from(c.v_samp);
            let width = derived.width_in_blocks[i] * DCTSIZE;
            buffer.push(Arena::alloc_rows(width, vi * DCTSIZE));
        }
        Ok(Self {
            buffer,
            methods,
            rowgroup_ctr: ROW_GROUPS_PER_IMCU_ROW,
            rowgroups_avail: ROW_GROUPS_PER_IMCU_ROW,
        })
    }

    /// `process_data_simple_main` (spec §4.6).
    #[allow(clippy::too_many_arguments)]
    pub fn process_data_simple_main(
        &mut self,
        components: &[ComponentSpec],
        derived: &DerivedDimensions,
        dcoefc: &mut DCoefController,
        entropy: &mut HuffmanDecoder<'_>,
        idct: &IdctManager,
        output_buf: &mut [Vec<Vec<u8>>],
        out_row_ctr: &mut usize,
        out_rows_avail: usize,
        max_v: usize,
        output_width: usize,
    ) -> JscResult<Progress> {
        if self.rowgroup_ctr >= self.rowgroups_avail {
            let mut samples: Vec<ComponentSamplesMut<'_>> = self
                .buffer
                .iter_mut()
                .map(|rows| ComponentSamplesMut { rows })
                .collect();
            match dcoefc.decompress_data(components, derived, entropy, idct, &mut samples)? {
                Progress::Suspended => return Ok(Progress::Suspended),
                Progress::Done => {}
            }
            self.rowgroup_ctr = 0;
        }

        dpost::post_process_data(
            &self.methods,
            &self.buffer,
            &mut self.rowgroup_ctr,
            self.rowgroups_avail,
            output_buf,
            out_row_ctr,
            out_rows_avail,
            max_v,
            output_width,
        )?;
        Ok(Progress::Done)
    }
}
