//! Decode-side coefficient controller, the mirror of `coef_controller.rs`'s
//! compressor spine: iterates iMCU rows, decodes each MCU's Huffman-coded
//! blocks, and runs the inverse DCT directly into the component's sample
//! buffer for this iMCU row (no coefficient storage between decode and
//! IDCT, matching this profile's single-pass baseline decode -- spec §4.6's
//! "no-context variant").
//!
//! Dummy blocks need no special casing on decode: the encoder wrote them
//! with zero AC and a copied DC, so decoding and IDCT-ing them like any
//! other block produces harmless filler that later gets cropped away by
//! the real image width/height.

use crate::consts::{DCTSIZE, DCTSIZE2, MAX_BLOCKS_IN_MCU};
use crate::entropy::HuffmanDecoder;
use crate::errors::JscResult;
use crate::idct::IdctManager;
use crate::image::{ComponentSpec, DerivedDimensions};
use crate::progress::Progress;

/// One component's sample buffer for the current iMCU row, `vi * 8` rows
/// wide enough to cover `width_in_blocks[i] * 8` samples.
pub struct ComponentSamplesMut<'a> {
    pub rows: &'a mut [Vec<u8>],
}

/// Resumable state for one decompression pass, named identically to
/// `CoefController`'s (spec §3).
pub struct DCoefController {
    imcu_row_num: usize,
    mcu_vert_offset: usize,
    mcu_ctr: usize,
    mcu_rows_per_imcu_row: usize,
    comps_in_scan: usize,
}

impl DCoefController {
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

    /// `decompress_data` (spec §4.6's counterpart): decodes up to one
    /// complete iMCU row into `samples[ci]`.
    pub fn decompress_data(
        &mut self,
        components: &[ComponentSpec],
        derived: &DerivedDimensions,
        entropy: &mut HuffmanDecoder<'_>,
        idct: &IdctManager,
        samples: &mut [ComponentSamplesMut<'_>],
    ) -> JscResult<Progress> {
        if self.comps_in_scan > 1 {
            self.decompress_interleaved(components, derived, entropy, idct, samples)
        } else {
            self.decompress_noninterleaved(components, derived, entropy, idct, samples)
        }
    }

    fn decompress_interleaved(
        &mut self,
        components: &[ComponentSpec],
        derived: &DerivedDimensions,
        entropy: &mut HuffmanDecoder<'_>,
        idct: &IdctManager,
        samples: &mut [ComponentSamplesMut<'_>],
    ) -> JscResult<Progress> {
        let mut mcu_buffer = [[0i16; DCTSIZE2]; MAX_BLOCKS_IN_MCU];

        while self.mcu_vert_offset < self.mcu_rows_per_imcu_row {
            while self.mcu_ctr < derived.mcus_per_row {
                let mcu_col_num = self.mcu_ctr;
                let mut blkn = 0usize;
                let mut block_components = [0usize; MAX_BLOCKS_IN_MCU];
                let mut positions = [(0usize, 0usize, 0usize); MAX_BLOCKS_IN_MCU];

                for (ci, c) in components.iter().enumerate() {
                    let hi = usize::from(c.h_samp);
                    let vi = usize::from(c.v_samp);
                    for yindex in 0..vi {
                        let row = (self.mcu_vert_offset + yindex) * DCTSIZE;
                        for x in 0..hi {
                            let col = (mcu_col_num * hi + x) * DCTSIZE;
                            block_components[blkn] = ci;
                            positions[blkn] = (ci, row, col);
                            blkn += 1;
                        }
                    }
                }

                entropy.decode_mcu(&mut mcu_buffer[..blkn], &block_components[..blkn])?;

                for (b, &(ci, row, col)) in positions[..blkn].iter().enumerate() {
                    let mut out = [0u8; DCTSIZE2];
                    idct.inverse_dct(ci, &mcu_buffer[b], &mut out);
                    write_block(&mut samples[ci], row, col, &out);
                }

                self.mcu_ctr += 1;
            }
            self.mcu_ctr = 0;
            self.mcu_vert_offset += 1;
        }

        self.finish_imcu_row(components, derived);
        Ok(Progress::Done)
    }

    fn decompress_noninterleaved(
        &mut self,
        components: &[ComponentSpec],
        derived: &DerivedDimensions,
        entropy: &mut HuffmanDecoder<'_>,
        idct: &IdctManager,
        samples: &mut [ComponentSamplesMut<'_>],
    ) -> JscResult<Progress> {
        let width_in_blocks = derived.width_in_blocks[0];
        let mut mcu_buffer = [[0i16; DCTSIZE2]; MAX_BLOCKS_IN_MCU];

        while self.mcu_vert_offset < self.mcu_rows_per_imcu_row {
            while self.mcu_ctr < width_in_blocks {
                let row = self.mcu_vert_offset * DCTSIZE;
                let col = self.mcu_ctr * DCTSIZE;

                entropy.decode_mcu(&mut mcu_buffer[..1], &[0])?;

                let mut out = [0u8; DCTSIZE2];
                idct.inverse_dct(0, &mcu_buffer[0], &mut out);
                write_block(&mut samples[0], row, col, &out);

                self.mcu_ctr += 1;
            }
            self.mcu_ctr = 0;
            self.mcu_vert_offset += 1;
        }

        self.finish_imcu_row(components, derived);
        Ok(Progress::Done)
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

fn write_block(samples: &mut ComponentSamplesMut<'_>, row: usize, col: usize, block: &[u8; DCTSIZE2]) {
    for r in 0..DCTSIZE {
        samples.rows[row + r][col..col + DCTSIZE].copy_from_slice(&block[r * DCTSIZE..r * DCTSIZE + DCTSIZE]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coef_controller::{CoefController, ComponentSamples, EntropyEncoder};
    use crate::entropy::{ComponentTables, HuffmanEncoder};
    use crate::fdct::FdctManager;
    use crate::huffman::{
        AC_LUMA_BITS, AC_LUMA_VALUES, DC_LUMA_BITS, DC_LUMA_VALUES,
    };
    use crate::huffman::HuffmanTable;
    use crate::image::{ColorSpace, ImageInfo};

    fn luma_tables() -> (
        [Option<HuffmanTable>; 4],
        [Option<HuffmanTable>; 4],
    ) {
        let dc = HuffmanTable::build(DC_LUMA_BITS, DC_LUMA_VALUES.to_vec()).unwrap();
        let ac = HuffmanTable::build(AC_LUMA_BITS, AC_LUMA_VALUES.to_vec()).unwrap();
        ([Some(dc), None, None, None], [Some(ac), None, None, None])
    }

    #[test]
    fn single_component_block_round_trips_through_full_pipeline() {
        let components = vec![ComponentSpec::new(0, 1, 1, 0)];
        let image = ImageInfo::new(8, 8, ColorSpace::Grayscale, components.clone()).unwrap();
        let derived = image.derive();
        let qtbl = [1u16; DCTSIZE2];

        let fdct = FdctManager::start_pass(&components, &[Some(qtbl)]).unwrap();
        let rows: Vec<Vec<u8>> = vec![vec![130u8; 8]; 8];
        let samples = vec![ComponentSamples { rows: &rows }];
        let mut coefc = CoefController::start_pass(&components, &derived);

        let (dc_tables, ac_tables) = luma_tables();
        let component_tables = vec![ComponentTables { dc_table: 0, ac_table: 0 }];
        let mut encoder = HuffmanEncoder::start_pass(dc_tables, ac_tables, component_tables.clone(), 0);
        encoder.set_capacity(usize::MAX);
        coefc.compress_data(&components, &derived, &samples, &fdct, &mut encoder);
        let bytes = encoder.finish();

        let idct = IdctManager::start_pass(&components, &[Some(qtbl)]);
        let (dc_tables, ac_tables) = luma_tables();
        let mut entropy = HuffmanDecoder::start_pass(&bytes, dc_tables, ac_tables, component_tables, 0);
        let mut dcoefc = DCoefController::start_pass(&components, &derived);
        let mut out_rows = vec![vec![0u8; 8]; 8];
        {
            let mut out_samples = vec![ComponentSamplesMut { rows: &mut out_rows }];
            let progress = dcoefc
                .decompress_data(&components, &derived, &mut entropy, &idct, &mut out_samples)
                .unwrap();
            assert_eq!(progress, Progress::Done);
        }
        for row in &out_rows {
            for &v in row {
                assert!((i32::from(v) - 130).abs() <= 1, "got {v}");
            }
        }
    }
}
