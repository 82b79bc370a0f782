//! The coefficient controller (COEFC, spec §4.4): the compressor's spine.
//! Iterates iMCU rows, assembles MCU block lists (inserting dummy edge
//! blocks where the image doesn't evenly tile), and hands each MCU to the
//! entropy encoder with suspension support.

use crate::consts::{DCTSIZE2, MAX_BLOCKS_IN_MCU};
use crate::fdct::FdctManager;
use crate::image::{ComponentSpec, DerivedDimensions};
use crate::progress::Progress;

/// `encode_mcu(MCU_buffer) -> bool` from spec §6, modeled as
/// [`Progress`] per Design Note "boolean return -> explicit result".
///
/// `block_components[i]` names which scan component owns `mcu_buffer[i]`,
/// letting the encoder pick that component's DC predictor and Huffman
/// table selectors without COEFC needing to know anything about entropy
/// coding.
pub trait EntropyEncoder {
    fn encode_mcu(&mut self, mcu_buffer: &[[i16; DCTSIZE2]], block_components: &[usize]) -> Progress;
}

/// One component's sample data for the current iMCU row: `vi_rows` rows
/// (or `v_samp * 8` for a non-interleaved scan), each wide enough to
/// cover `width_in_blocks[i] * 8` samples.
pub struct ComponentSamples<'a> {
    pub rows: &'a [Vec<u8>],
}

/// Resumable state for one compression pass (spec §3, "Controller state").
pub struct CoefController {
    imcu_row_num: usize,
    mcu_vert_offset: usize,
    mcu_ctr: usize,
    mcu_rows_per_imcu_row: usize,
    comps_in_scan: usize,
}

impl CoefController {
    #[must_use]
    pub fn start_pass(components: &[ComponentSpec], derived: &DerivedDimensions) -> Self {
        let comps_in_scan = components.len();
        let mcu_rows_per_imcu_row = if comps_in_scan > 1 {
            1
        } else {
            rows_per_imcu_row_noninterleaved(components, derived, 0)
        };
        Self {
            imcu_row_num: 0,
            mcu_vert_offset: 0,
            mcu_ctr: 0,
            mcu_rows_per_imcu_row,
            comps_in_scan,
        }
    }

    #[must_use]
    pub fn is_done(&self, derived: &DerivedDimensions) -> bool {
        self.imcu_row_num >= derived.total_imcu_rows
    }

    /// `compress_data` (spec §4.4): processes up to one complete iMCU row.
    /// `samples[ci]` must hold this iMCU row's sample data for component
    /// `ci`, already downsampled and edge-padded.
    pub fn compress_data(
        &mut self,
        components: &[ComponentSpec],
        derived: &DerivedDimensions,
        samples: &[ComponentSamples<'_>],
        fdct: &FdctManager,
        entropy: &mut dyn EntropyEncoder,
    ) -> Progress {
        if self.comps_in_scan > 1 {
            self.compress_interleaved(components, derived, samples, fdct, entropy)
        } else {
            self.compress_noninterleaved(components, derived, samples, fdct, entropy)
        }
    }

    fn compress_interleaved(
        &mut self,
        components: &[ComponentSpec],
        derived: &DerivedDimensions,
        samples: &[ComponentSamples<'_>],
        fdct: &FdctManager,
        entropy: &mut dyn EntropyEncoder,
    ) -> Progress {
        let is_last_imcu_row = self.imcu_row_num + 1 == derived.total_imcu_rows;
        let mut mcu_buffer = [[0i16; DCTSIZE2]; MAX_BLOCKS_IN_MCU];

        while self.mcu_vert_offset < self.mcu_rows_per_imcu_row {
            while self.mcu_ctr < derived.mcus_per_row {
                let mcu_col_num = self.mcu_ctr;
                let mut blkn = 0usize;
                let mut block_components = [0usize; MAX_BLOCKS_IN_MCU];

                for (ci, c) in components.iter().enumerate() {
                    let hi = usize::from(c.h_samp);
                    let vi = usize::from(c.v_samp);
                    let is_last_col = mcu_col_num + 1 == derived.mcus_per_row;
                    let blockcnt = if is_last_col { derived.last_col_width[ci] } else { hi };

                    for yindex in 0..vi {
                        let bottom_dummy = is_last_imcu_row
                            && self.mcu_vert_offset + yindex >= derived.last_row_height[ci];

                        if bottom_dummy {
                            zero_dummy_row(&mut mcu_buffer, blkn, hi);
                        } else {
                            let start_row = (self.mcu_vert_offset + yindex) * 8;
                            let start_col = mcu_col_num * hi * 8;
                            if blockcnt > 0 {
                                fdct.forward_dct(
                                    ci,
                                    samples[ci].rows_as_refs().as_slice(),
                                    &mut mcu_buffer[blkn..blkn + blockcnt],
                                    start_row,
                                    start_col,
                                    blockcnt,
                                );
                            }
                            if blockcnt < hi {
                                copy_dc_into_dummies(&mut mcu_buffer, blkn, blockcnt, hi);
                            }
                        }
                        for slot in &mut block_components[blkn..blkn + hi] {
                            *slot = ci;
                        }
                        blkn += hi;
                    }
                }

                match entropy.encode_mcu(&mcu_buffer[..blkn], &block_components[..blkn]) {
                    Progress::Suspended => return Progress::Suspended,
                    Progress::Done => {}
                }
                self.mcu_ctr += 1;
            }
            self.mcu_ctr = 0;
            self.mcu_vert_offset += 1;
        }

        self.finish_imcu_row(components, derived);
        Progress::Done
    }

    fn compress_noninterleaved(
        &mut self,
        components: &[ComponentSpec],
        derived: &DerivedDimensions,
        samples: &[ComponentSamples<'_>],
        fdct: &FdctManager,
        entropy: &mut dyn EntropyEncoder,
    ) -> Progress {
        let is_last_imcu_row = self.imcu_row_num + 1 == derived.total_imcu_rows;
        let width_in_blocks = derived.width_in_blocks[0];
        let last_row_height = derived.last_row_height[0];
        let mut mcu_buffer = [[0i16; DCTSIZE2]; MAX_BLOCKS_IN_MCU];

        while self.mcu_vert_offset < self.mcu_rows_per_imcu_row {
            while self.mcu_ctr < width_in_blocks {
                let bottom_dummy = is_last_imcu_row && self.mcu_vert_offset >= last_row_height;

                if bottom_dummy {
                    zero_dummy_row(&mut mcu_buffer, 0, 1);
                } else {
                    let start_row = self.mcu_vert_offset * 8;
                    let start_col = self.mcu_ctr * 8;
                    fdct.forward_dct(
                        0,
                        samples[0].rows_as_refs().as_slice(),
                        &mut mcu_buffer[0..1],
                        start_row,
                        start_col,
                        1,
                    );
                }

                match entropy.encode_mcu(&mcu_buffer[..1], &[0]) {
                    Progress::Suspended => return Progress::Suspended,
                    Progress::Done => {}
                }
                self.mcu_ctr += 1;
            }
            self.mcu_ctr = 0;
            self.mcu_vert_offset += 1;
        }

        self.finish_imcu_row(components, derived);
        Progress::Done
    }

    fn finish_imcu_row(&mut self, components: &[ComponentSpec], derived: &DerivedDimensions) {
        self.mcu_vert_offset = 0;
        self.imcu_row_num += 1;
        self.mcu_rows_per_imcu_row = if self.comps_in_scan > 1 {
            1
        } else {
            rows_per_imcu_row_noninterleaved(components, derived, self.imcu_row_num)
        };
    }
}

impl<'a> ComponentSamples<'a> {
    fn rows_as_refs(&self) -> Vec<&[u8]> {
        self.rows.iter().map(Vec::as_slice).collect()
    }
}

fn rows_per_imcu_row_noninterleaved(
    components: &[ComponentSpec],
    derived: &DerivedDimensions,
    imcu_row_num: usize,
) -> usize {
    let is_last = imcu_row_num + 1 == derived.total_imcu_rows;
    if is_last {
        derived.last_row_height[0]
    } else {
        usize::from(components[0].v_samp)
    }
}

/// Zero a row of `count` dummy blocks starting at `blkn`, DC included --
/// the caller fixes the DC afterwards (bottom-edge dummies copy from the
/// block directly above, which the interleaved/non-interleaved callers
/// handle by simply leaving DC at 0 when `blkn == 0`, or copying from
/// `blkn - 1` otherwise, matching spec §4.4's "previous block's DC" rule).
fn zero_dummy_row(mcu_buffer: &mut [[i16; DCTSIZE2]; MAX_BLOCKS_IN_MCU], blkn: usize, count: usize) {
    for block in &mut mcu_buffer[blkn..blkn + count] {
        *block = [0i16; DCTSIZE2];
    }
    if blkn > 0 {
        let dc = mcu_buffer[blkn - 1][0];
        for block in &mut mcu_buffer[blkn..blkn + count] {
            block[0] = dc;
        }
    }
}

/// Right-edge dummy blocks: fill `[real_count, hi)` with zero AC and the
/// preceding real block's DC (spec §4.4).
fn copy_dc_into_dummies(
    mcu_buffer: &mut [[i16; DCTSIZE2]; MAX_BLOCKS_IN_MCU],
    blkn: usize,
    real_count: usize,
    hi: usize,
) {
    let dc = mcu_buffer[blkn + real_count - 1][0];
    for block in &mut mcu_buffer[blkn + real_count..blkn + hi] {
        *block = [0i16; DCTSIZE2];
        block[0] = dc;
    }
}
