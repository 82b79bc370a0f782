//! The decompressor front end (spec §6's reverse direction): parses the
//! marker segments once, then drives DMAIN/DPOST/DCOEFC/entropy decoding
//! one `read_scanlines` call at a time, converting back to interleaved
//! RGB (or passthrough grayscale) output on the way out.
//!
//! `Decompressor<'a>` borrows its input byte slice for the lifetime of
//! the pass -- `HuffmanDecoder<'a>` reads directly out of the caller's
//! buffer rather than this struct owning a second copy.

use crate::arena::Arena;
use crate::color_convert::ycbcr_to_rgb;
use crate::dcoefc::DCoefController;
use crate::dmain::DMainController;
use crate::entropy::{ComponentTables, HuffmanDecoder};
use crate::errors::JscResult;
use crate::idct::IdctManager;
use crate::image::{ColorSpace, DerivedDimensions, ImageInfo};
use crate::markers;

pub struct Decompressor<'a> {
    image: ImageInfo,
    derived: DerivedDimensions,
    idct: IdctManager,
    dcoefc: DCoefController,
    dmain: DMainController,
    entropy: HuffmanDecoder<'a>,
    full_width: usize,
    out_buf: Vec<Vec<Vec<u8>>>,
    out_row_ctr: usize,
    rows_emitted: usize,
}

impl<'a> Decompressor<'a> {
    pub fn new(data: &'a [u8]) -> JscResult<Self> {
        let parsed = markers::parse_headers(data)?;
        let derived = parsed.image.derive();

        let idct = IdctManager::start_pass(&parsed.image.components, &parsed.quant_tables);
        let dcoefc = DCoefController::start_pass(&parsed.image.components, &derived);
        let dmain = DMainController::start_pass(&parsed.image.components, &derived)?;

        let mut component_tables = vec![
            ComponentTables { dc_table: 0, ac_table: 0 };
            parsed.image.components.len()
        ];
        for &(id, dc, ac) in &parsed.scan_components {
            let ci = usize::from(id) - 1;
            component_tables[ci] = ComponentTables {
                dc_table: usize::from(dc),
                ac_table: usize::from(ac),
            };
        }

        let scan_data = &data[parsed.scan_data_offset..];
        let entropy = HuffmanDecoder::start_pass(
            scan_data,
            parsed.dc_tables,
            parsed.ac_tables,
            component_tables,
            usize::from(parsed.restart_interval),
        );

        debug!(
            "Decoding {}x{} image, {} component(s), restart_interval={}",
            parsed.image.width,
            parsed.image.height,
            parsed.image.components.len(),
            parsed.restart_interval
        );
        let full_width = derived.mcus_per_row * derived.max_h * 8;
        let total_rows = derived.total_imcu_rows * derived.max_v * 8;
        let out_buf = parsed
            .image
            .components
            .iter()
            .map(|_| Arena::alloc_rows(full_width, total_rows))
            .collect();

        Ok(Self {
            image: parsed.image,
            derived,
            idct,
            dcoefc,
            dmain,
            entropy,
            full_width,
            out_buf,
            out_row_ctr: 0,
            rows_emitted: 0,
        })
    }

    #[must_use]
    pub fn image(&self) -> &ImageInfo {
        &self.image
    }

    #[must_use]
    pub fn rows_remaining(&self) -> usize {
        self.image.height - self.rows_emitted
    }

    /// `read_scanlines` (spec §6's decode-side counterpart): appends up to
    /// `max_rows` interleaved output rows to `out` and returns how many
    /// rows were actually produced (fewer than requested only once the
    /// image is exhausted).
    pub fn read_scanlines(&mut self, out: &mut Vec<u8>, max_rows: usize) -> JscResult<usize> {
        let rows_to_produce = max_rows.min(self.rows_remaining());
        if rows_to_produce == 0 {
            return Ok(0);
        }

        let target = self.rows_emitted + rows_to_produce;
        let huge_budget = self.derived.total_imcu_rows * self.derived.max_v * 8 + self.derived.max_v;

        while self.out_row_ctr < target && !self.dcoefc.is_done(&self.derived) {
            self.dmain.process_data_simple_main(
                &self.image.components,
                &self.derived,
                &mut self.dcoefc,
                &mut self.entropy,
                &self.idct,
                &mut self.out_buf,
                &mut self.out_row_ctr,
                huge_budget,
                self.derived.max_v,
                self.full_width,
            )?;
        }

        for r in self.rows_emitted..target {
            self.emit_row(r, out);
        }
        self.rows_emitted = target;
        Ok(rows_to_produce)
    }

    fn emit_row(&self, row: usize, out: &mut Vec<u8>) {
        let width = self.image.width;
        match self.image.color_space {
            ColorSpace::Grayscale => {
                out.extend_from_slice(&self.out_buf[0][row][..width]);
            }
            ColorSpace::YCbCr | ColorSpace::Rgb => {
                let y_row = &self.out_buf[0][row];
                let cb_row = &self.out_buf[1][row];
                let cr_row = &self.out_buf[2][row];
                for x in 0..width {
                    let (r, g, b) = ycbcr_to_rgb(y_row[x], cb_row[x], cr_row[x]);
                    out.push(r);
                    out.push(g);
                    out.push(b);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compressor::{ChromaSubsampling, CompressParams, Compressor};

    #[test]
    fn grayscale_8x8_decodes_back_within_rounding_error() {
        let params = CompressParams::default().with_quality(95);
        let mut compressor = Compressor::new(8, 8, ColorSpace::Grayscale, &params).unwrap();
        let row = vec![130u8; 8];
        let rows: Vec<&[u8]> = (0..8).map(|_| row.as_slice()).collect();
        compressor.write_scanlines(&rows).unwrap();
        let bytes = compressor.finish().unwrap();

        let mut decompressor = Decompressor::new(&bytes).unwrap();
        assert_eq!(decompressor.image().width, 8);
        assert_eq!(decompressor.image().height, 8);

        let mut out = Vec::new();
        let produced = decompressor.read_scanlines(&mut out, 8).unwrap();
        assert_eq!(produced, 8);
        assert_eq!(out.len(), 64);
        for &v in &out {
            assert!((i32::from(v) - 130).abs() <= 4, "got {v}");
        }
    }

    #[test]
    fn rgb_16x16_round_trips_within_tolerance() {
        let params = CompressParams::default()
            .with_quality(100)
            .with_chroma_subsampling(ChromaSubsampling::Yuv444);
        let mut compressor = Compressor::new(16, 16, ColorSpace::Rgb, &params).unwrap();
        let mut row = Vec::new();
        for x in 0..16u8 {
            row.push(x * 10);
            row.push(200);
            row.push(50);
        }
        let rows: Vec<&[u8]> = (0..16).map(|_| row.as_slice()).collect();
        compressor.write_scanlines(&rows).unwrap();
        let bytes = compressor.finish().unwrap();

        let mut decompressor = Decompressor::new(&bytes).unwrap();
        let mut out = Vec::new();
        let produced = decompressor.read_scanlines(&mut out, 16).unwrap();
        assert_eq!(produced, 16);
        assert_eq!(out.len(), 16 * 16 * 3);

        for y in 0..16usize {
            for x in 0..16usize {
                let i = (y * 16 + x) * 3;
                assert!((i32::from(out[i]) - i32::from(x as u8 * 10)).abs() <= 8);
                assert!((i32::from(out[i + 1]) - 200).abs() <= 8);
                assert!((i32::from(out[i + 2]) - 50).abs() <= 8);
            }
        }
    }

    #[test]
    fn partial_reads_accumulate_to_full_image() {
        let params = CompressParams::default().with_quality(90);
        let mut compressor = Compressor::new(8, 16, ColorSpace::Grayscale, &params).unwrap();
        let row = vec![77u8; 8];
        let rows: Vec<&[u8]> = (0..16).map(|_| row.as_slice()).collect();
        compressor.write_scanlines(&rows).unwrap();
        let bytes = compressor.finish().unwrap();

        let mut decompressor = Decompressor::new(&bytes).unwrap();
        let mut out = Vec::new();
        let first = decompressor.read_scanlines(&mut out, 3).unwrap();
        assert_eq!(first, 3);
        let second = decompressor.read_scanlines(&mut out, 100).unwrap();
        assert_eq!(second, 13);
        assert_eq!(decompressor.read_scanlines(&mut out, 1).unwrap(), 0);
        assert_eq!(out.len(), 16 * 8);
    }
}
