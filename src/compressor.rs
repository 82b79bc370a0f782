//! The compressor front end (spec §6): wires PREP -> DS -> COEFC ->
//! entropy coding into the `write_scanlines`/`finish` call contract and
//! emits the marker segments that bracket the scan.
//!
//! Grounded on the teacher's single public `decode_buffer` entry point in
//! `decoder.rs`, inverted for encode: callers push scanlines in, the
//! controllers pull complete iMCU rows out as soon as enough input has
//! accumulated, and `finish` flushes whatever partial row remains.

use crate::arena::Arena;
use crate::coef_controller::{CoefController, ComponentSamples};
use crate::consts::DCTSIZE2;
use crate::entropy::{ComponentTables, HuffmanEncoder};
use crate::errors::{JscError, JscResult};
use crate::fdct::FdctManager;
use crate::huffman::{
    AC_CHROMA_BITS, AC_CHROMA_VALUES, AC_LUMA_BITS, AC_LUMA_VALUES, DC_CHROMA_BITS,
    DC_CHROMA_VALUES, DC_LUMA_BITS, DC_LUMA_VALUES, HuffmanTable,
};
use crate::image::{ceil_div, ColorSpace, ComponentSpec, DerivedDimensions, ImageInfo};
use crate::markers;
use crate::preprocess::{PrepController, ROW_GROUPS_PER_IMCU_ROW};
use crate::progress::Progress;
use crate::quant::{scale_table, BASE_CHROMA, BASE_LUMA};

/// Chroma subsampling choice for [`CompressParams`] (spec §3's sampling
/// factors, narrowed to the three ratios a caller picks by name rather
/// than raw `(h, v)` pairs).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ChromaSubsampling {
    /// No subsampling: every component sampled at (1, 1).
    Yuv444,
    /// Horizontal-only 2:1 subsampling on chroma.
    Yuv422,
    /// 2:1 subsampling on both axes.
    Yuv420,
}

impl ChromaSubsampling {
    fn luma_factors(self) -> (u8, u8) {
        match self {
            Self::Yuv444 => (1, 1),
            Self::Yuv422 => (2, 1),
            Self::Yuv420 => (2, 2),
        }
    }
}

/// Compressor configuration (spec §6/EXPANSION-1).
#[derive(Debug, Clone)]
pub struct CompressParams {
    pub quality: u8,
    pub chroma_subsampling: ChromaSubsampling,
    /// Override for the number of restart sections per scan. `None`
    /// derives it from image height as `max(1, height / 64)`.
    pub n_restart_sections: Option<usize>,
    /// Preserve (`false`, the default) or fix (`true`) the restart-row
    /// formula's use of image width where image height would be correct
    /// (Open Question, spec §9).
    pub use_corrected_restart_formula: bool,
}

impl Default for CompressParams {
    fn default() -> Self {
        Self {
            quality: 75,
            chroma_subsampling: ChromaSubsampling::Yuv420,
            n_restart_sections: None,
            use_corrected_restart_formula: false,
        }
    }
}

impl CompressParams {
    #[must_use]
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    #[must_use]
    pub fn with_chroma_subsampling(mut self, s: ChromaSubsampling) -> Self {
        self.chroma_subsampling = s;
        self
    }
}

/// Build the grayscale- or YCbCr-tagged [`ComponentSpec`] list a
/// [`CompressParams`] implies, matching image.rs's `1..=4` sampling range.
fn build_components(color_space: ColorSpace, params: &CompressParams) -> Vec<ComponentSpec> {
    match color_space {
        ColorSpace::Grayscale => vec![ComponentSpec::new(0, 1, 1, 0)],
        ColorSpace::YCbCr | ColorSpace::Rgb => {
            let (h, v) = params.chroma_subsampling.luma_factors();
            vec![
                ComponentSpec::new(0, h, v, 0),
                ComponentSpec::new(1, 1, 1, 1),
                ComponentSpec::new(2, 1, 1, 1),
            ]
        }
    }
}

fn restart_in_rows(image: &ImageInfo, derived: &DerivedDimensions, params: &CompressParams) -> usize {
    let n_restart_sections = params
        .n_restart_sections
        .unwrap_or_else(|| (image.height / 64).max(1));

    // Spec §9: `MCU_rows_in_scan` is derived from image *width*, not
    // height, unless the caller explicitly asks for the corrected
    // formula. Preserved by default to match the source this profile is
    // modeled on.
    let mcu_rows_in_scan = if params.use_corrected_restart_formula {
        derived.total_imcu_rows
    } else {
        ceil_div(image.width, derived.max_v * 8)
    };

    ceil_div(mcu_rows_in_scan, n_restart_sections.max(1)).max(1)
}

fn default_tables_for(components: &[ComponentSpec]) -> ([Option<HuffmanTable>; 4], [Option<HuffmanTable>; 4], Vec<ComponentTables>) {
    let dc_luma = HuffmanTable::build(DC_LUMA_BITS, DC_LUMA_VALUES.to_vec()).expect("valid default table");
    let ac_luma = HuffmanTable::build(AC_LUMA_BITS, AC_LUMA_VALUES.to_vec()).expect("valid default table");
    let dc_chroma = HuffmanTable::build(DC_CHROMA_BITS, DC_CHROMA_VALUES.to_vec()).expect("valid default table");
    let ac_chroma = HuffmanTable::build(AC_CHROMA_BITS, AC_CHROMA_VALUES.to_vec()).expect("valid default table");

    let dc_tables = [Some(dc_luma), Some(dc_chroma), None, None];
    let ac_tables = [Some(ac_luma), Some(ac_chroma), None, None];

    let component_tables = components
        .iter()
        .map(|c| {
            if c.index == 0 {
                ComponentTables { dc_table: 0, ac_table: 0 }
            } else {
                ComponentTables { dc_table: 1, ac_table: 1 }
            }
        })
        .collect();

    (dc_tables, ac_tables, component_tables)
}

/// Drives PREP -> DS -> COEFC -> entropy coding across repeated
/// `write_scanlines` calls, mirroring the stateful, resumable controllers
/// spec §3 describes.
pub struct Compressor {
    image: ImageInfo,
    derived: DerivedDimensions,
    prep: PrepController,
    coefc: CoefController,
    fdct: FdctManager,
    entropy: HuffmanEncoder,
    prep_buf: Vec<Vec<Vec<u8>>>,
    out_row_group_ctr: usize,
    out: Vec<u8>,
    rows_written: usize,
    finished: bool,
}

impl Compressor {
    pub fn new(
        width: usize,
        height: usize,
        color_space: ColorSpace,
        params: &CompressParams,
    ) -> JscResult<Self> {
        let components = build_components(color_space, params);
        let image = ImageInfo::new(width, height, color_space, components)?;
        let derived = image.derive();
        info!("Compressing {}x{} image, quality={}", width, height, params.quality.clamp(1, 100));

        let quality = params.quality.clamp(1, 100);
        let luma_q = scale_table(&BASE_LUMA, quality);
        let chroma_q = scale_table(&BASE_CHROMA, quality);
        let quant_tables: Vec<[u16; DCTSIZE2]> = match image.color_space {
            ColorSpace::Grayscale => vec![luma_q],
            ColorSpace::YCbCr | ColorSpace::Rgb => vec![luma_q, chroma_q],
        };
        let quant_slots: Vec<Option<[u16; DCTSIZE2]>> = quant_tables.iter().map(|t| Some(*t)).collect();

        let fdct = FdctManager::start_pass(&image.components, &quant_slots)?;
        let prep = PrepController::start_pass(&image, &derived)?;
        let coefc = CoefController::start_pass(&image.components, &derived);

        let (dc_tables, ac_tables, component_tables) = default_tables_for(&image.components);
        let restart_interval = restart_in_rows(&image, &derived, params) * derived.mcus_per_row;
        let mut entropy = HuffmanEncoder::start_pass(dc_tables, ac_tables, component_tables, restart_interval);
        entropy.set_capacity(usize::MAX);

        let mut out = Vec::new();
        markers::write_soi(&mut out);
        markers::write_com(&mut out);
        markers::write_app0(&mut out);
        for (i, t) in quant_tables.iter().enumerate() {
            markers::write_dqt(&mut out, i as u8, t);
        }
        markers::write_sof0(&mut out, width, height, &image.components);
        markers::write_dht(&mut out, 0, 0, &DC_LUMA_BITS, &DC_LUMA_VALUES);
        markers::write_dht(&mut out, 1, 0, &AC_LUMA_BITS, &AC_LUMA_VALUES);
        if image.components.len() > 1 {
            markers::write_dht(&mut out, 0, 1, &DC_CHROMA_BITS, &DC_CHROMA_VALUES);
            markers::write_dht(&mut out, 1, 1, &AC_CHROMA_BITS, &AC_CHROMA_VALUES);
        }
        if restart_interval > 0 {
            markers::write_dri(&mut out, restart_interval as u16);
        }
        let scan_components: Vec<(u8, u8, u8)> = image
            .components
            .iter()
            .map(|c| {
                let (dc, ac) = if c.index == 0 { (0u8, 0u8) } else { (1u8, 1u8) };
                ((c.index + 1) as u8, dc, ac)
            })
            .collect();
        markers::write_sos(&mut out, &scan_components);

        let prep_buf: Vec<Vec<Vec<u8>>> = (0..image.components.len())
            .map(|i| {
                let (width, rows) = prep.imcu_row_buffer_shape(i);
                Arena::alloc_rows(width, rows)
            })
            .collect();

        Ok(Self {
            image,
            derived,
            prep,
            coefc,
            fdct,
            entropy,
            prep_buf,
            out_row_group_ctr: 0,
            out,
            rows_written: 0,
            finished: false,
        })
    }

    /// `write_scanlines` (spec §6): accepts interleaved scanlines, drives
    /// the pipeline for as many complete iMCU rows as the accumulated
    /// input allows, and returns the number of rows actually consumed.
    pub fn write_scanlines(&mut self, rows: &[&[u8]]) -> JscResult<usize> {
        let mut in_row_ctr = 0usize;
        while in_row_ctr < rows.len() {
            self.prep.pre_process_data(
                rows,
                &mut in_row_ctr,
                rows.len(),
                &mut self.prep_buf,
                &mut self.out_row_group_ctr,
                ROW_GROUPS_PER_IMCU_ROW,
            );

            if self.out_row_group_ctr >= ROW_GROUPS_PER_IMCU_ROW {
                self.drain_imcu_row()?;
            } else {
                break;
            }
        }
        self.rows_written += in_row_ctr;
        Ok(in_row_ctr)
    }

    fn drain_imcu_row(&mut self) -> JscResult<()> {
        let samples: Vec<ComponentSamples<'_>> = self
            .prep_buf
            .iter()
            .map(|rows| ComponentSamples { rows })
            .collect();

        loop {
            let progress = self.coefc.compress_data(
                &self.image.components,
                &self.derived,
                &samples,
                &self.fdct,
                &mut self.entropy,
            );
            self.out.extend(self.entropy.take_ready_bytes());
            match progress {
                Progress::Done => break,
                Progress::Suspended => {
                    // Sink capacity is unbounded (`usize::MAX`) for this
                    // in-memory sink, so suspension never actually
                    // triggers here; guard against an infinite loop
                    // regardless.
                    return Err(JscError::invariant("entropy encoder suspended with unbounded capacity"));
                }
            }
        }

        // prep_buf is sized to exactly one iMCU row's worth of rows
        // (PrepController::imcu_row_buffer_shape); the next iMCU row's
        // pre_process_data call overwrites it in place starting at row 0,
        // so there is nothing to clear.
        self.out_row_group_ctr = 0;
        Ok(())
    }

    /// `finish` (spec §6): flushes any partial iMCU row (PREP pads with
    /// replicated bottom rows once `image.height` scanlines have been
    /// seen), appends EOI, and returns the complete JPEG byte stream.
    pub fn finish(mut self) -> JscResult<Vec<u8>> {
        if !self.finished {
            while !self.coefc.is_done(&self.derived) {
                // Push zero remaining rows; PREP detects `rows_to_go == 0`
                // and pads the rest of the current row group by
                // replication, then COEFC drains the padded iMCU row.
                self.prep.pre_process_data(
                    &[],
                    &mut 0,
                    0,
                    &mut self.prep_buf,
                    &mut self.out_row_group_ctr,
                    ROW_GROUPS_PER_IMCU_ROW,
                );
                if self.out_row_group_ctr < ROW_GROUPS_PER_IMCU_ROW {
                    break;
                }
                self.drain_imcu_row()?;
            }
            self.out.extend(self.entropy.finish());
            markers::write_eoi(&mut self.out);
            debug!("Finished compressing, {} bytes written", self.out.len());
            self.finished = true;
        }
        Ok(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grayscale_8x8_round_trips_through_markers() {
        let params = CompressParams::default().with_quality(90);
        let mut compressor = Compressor::new(8, 8, ColorSpace::Grayscale, &params).unwrap();
        let row = vec![130u8; 8];
        let rows: Vec<&[u8]> = (0..8).map(|_| row.as_slice()).collect();
        let consumed = compressor.write_scanlines(&rows).unwrap();
        assert_eq!(consumed, 8);
        let bytes = compressor.finish().unwrap();

        assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
        assert_eq!(&bytes[bytes.len() - 2..], &[0xFF, 0xD9]);

        let parsed = markers::parse_headers(&bytes).unwrap();
        assert_eq!(parsed.image.width, 8);
        assert_eq!(parsed.image.height, 8);
        assert_eq!(parsed.com_payload.unwrap(), crate::consts::JSC_COM_PAYLOAD.to_vec());
    }

    #[test]
    fn undersized_image_pads_through_finish() {
        // 8x5: shorter than one iMCU row's worth of real scanlines.
        let params = CompressParams::default().with_quality(80);
        let mut compressor = Compressor::new(8, 5, ColorSpace::Grayscale, &params).unwrap();
        let row = vec![64u8; 8];
        let rows: Vec<&[u8]> = (0..5).map(|_| row.as_slice()).collect();
        compressor.write_scanlines(&rows).unwrap();
        let bytes = compressor.finish().unwrap();
        assert_eq!(&bytes[bytes.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn rejects_invalid_sampling_via_build_components_bypass() {
        // Construct an ImageInfo directly with non-dividing factors to
        // confirm the invariant is caught before any pixels are touched.
        let components = vec![ComponentSpec::new(0, 3, 1, 0), ComponentSpec::new(1, 2, 1, 1)];
        let image = ImageInfo::new(8, 8, ColorSpace::YCbCr, components).unwrap();
        let derived = image.derive();
        let err = PrepController::start_pass(&image, &derived);
        assert!(err.is_err());
    }
}
