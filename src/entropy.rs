//! The baseline Huffman entropy coder: spec §1/§6 name this collaborator
//! only by its `encode_mcu`/`decompress_data` call contract. This module
//! supplies a concrete implementation so the pipeline is runnable end to
//! end, built the teacher's way: canonical tables from `huffman.rs`, an
//! MSB-first bit accumulator from `bitstream.rs`, zig-zag via `consts.rs`.
//!
//! `encode_mcu` is atomic with respect to both the caller's output sink
//! and this encoder's own bit-accumulator/DC-predictor state: an MCU is
//! encoded into a transient scratch buffer first, and only spliced into
//! `self.out`/committed to `self.acc`/`self.dc_pred` once it is known to
//! fit the remaining sink capacity. A suspended call leaves every piece
//! of persistent state exactly as it was before the call.

use crate::bitstream::{magnitude_category, BitReader, BitWriter};
use crate::coef_controller::EntropyEncoder;
use crate::consts::{DCTSIZE2, MARKER_RST0, NUM_HUFF_TBLS, UN_ZIGZAG};
use crate::errors::{JscError, JscResult};
use crate::huffman::HuffmanTable;
use crate::progress::Progress;

const ZRL: u8 = 0xF0;
const EOB: u8 = 0x00;

/// Which DC/AC table slot each scan component reads from, indexed the
/// same way as `block_components` in [`EntropyEncoder::encode_mcu`].
#[derive(Debug, Clone, Copy)]
pub struct ComponentTables {
    pub dc_table: usize,
    pub ac_table: usize,
}

/// Encodes MCUs into a caller-drained byte sink with JPEG byte-stuffing,
/// restart markers, and per-component DC prediction.
pub struct HuffmanEncoder {
    dc_tables: [Option<HuffmanTable>; NUM_HUFF_TBLS],
    ac_tables: [Option<HuffmanTable>; NUM_HUFF_TBLS],
    component_tables: Vec<ComponentTables>,
    dc_pred: Vec<i32>,
    acc: BitWriter,
    out: Vec<u8>,
    capacity: usize,
    restart_interval: usize,
    mcus_since_restart: usize,
    next_restart_marker: u8,
}

impl HuffmanEncoder {
    #[must_use]
    pub fn start_pass(
        dc_tables: [Option<HuffmanTable>; NUM_HUFF_TBLS],
        ac_tables: [Option<HuffmanTable>; NUM_HUFF_TBLS],
        component_tables: Vec<ComponentTables>,
        restart_interval: usize,
    ) -> Self {
        let dc_pred = vec![0i32; component_tables.len()];
        Self {
            dc_tables,
            ac_tables,
            component_tables,
            dc_pred,
            acc: BitWriter::new(),
            out: Vec::new(),
            capacity: usize::MAX,
            restart_interval,
            mcus_since_restart: 0,
            next_restart_marker: 0,
        }
    }

    /// Grant more room in the sink before the next `encode_mcu` call;
    /// the caller is expected to drain `take_ready_bytes` after each
    /// suspension and before bumping capacity back up.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
    }

    /// Drain bytes committed so far (shrinks `capacity` to match).
    pub fn take_ready_bytes(&mut self) -> Vec<u8> {
        self.capacity = self.capacity.saturating_sub(self.out.len());
        std::mem::take(&mut self.out)
    }

    /// Pad the final byte and drain everything -- call once at end of
    /// scan, after the last `encode_mcu`.
    pub fn finish(&mut self) -> Vec<u8> {
        self.acc.flush(&mut self.out);
        std::mem::take(&mut self.out)
    }

    fn encode_block(
        &self,
        block: &[i16; DCTSIZE2],
        tables: ComponentTables,
        dc_pred: i32,
        acc: &mut BitWriter,
        scratch: &mut Vec<u8>,
    ) -> i32 {
        // Missing tables are an invariant violation caught at start_pass,
        // not a condition `encode_mcu`'s retry-on-suspend contract covers.
        let dc_table = self.dc_tables[tables.dc_table]
            .as_ref()
            .expect("DC huffman table missing for scan component");
        let ac_table = self.ac_tables[tables.ac_table]
            .as_ref()
            .expect("AC huffman table missing for scan component");

        let dc_value = i32::from(block[0]);
        let diff = dc_value - dc_pred;
        let (size, bits) = magnitude_category(diff);
        let (code, len) = dc_table.code_for(size);
        acc.put_bits(scratch, code, len);
        acc.put_bits(scratch, bits, size);

        let mut run = 0u8;
        for k in 1..DCTSIZE2 {
            let value = i32::from(block[UN_ZIGZAG[k]]);
            if value == 0 {
                run += 1;
                continue;
            }
            while run > 15 {
                let (code, len) = ac_table.code_for(ZRL);
                acc.put_bits(scratch, code, len);
                run -= 16;
            }
            let (size, bits) = magnitude_category(value);
            let symbol = (run << 4) | size;
            let (code, len) = ac_table.code_for(symbol);
            acc.put_bits(scratch, code, len);
            acc.put_bits(scratch, bits, size);
            run = 0;
        }
        if run > 0 {
            let (code, len) = ac_table.code_for(EOB);
            acc.put_bits(scratch, code, len);
        }

        dc_value
    }

    fn restart_marker_bytes(&self, acc: &mut BitWriter) -> Vec<u8> {
        let mut bytes = Vec::new();
        acc.flush(&mut bytes);
        bytes.push(0xFF);
        bytes.push(MARKER_RST0 + self.next_restart_marker);
        bytes
    }
}

impl EntropyEncoder for HuffmanEncoder {
    fn encode_mcu(
        &mut self,
        mcu_buffer: &[[i16; DCTSIZE2]],
        block_components: &[usize],
    ) -> Progress {
        let mut scratch = Vec::new();
        let mut acc = self.acc;
        let mut dc_pred = self.dc_pred.clone();

        for (block, &ci) in mcu_buffer.iter().zip(block_components.iter()) {
            let tables = self.component_tables[ci];
            dc_pred[ci] = self.encode_block(block, tables, dc_pred[ci], &mut acc, &mut scratch);
        }

        let restart_due = self.restart_interval > 0
            && self.mcus_since_restart + 1 == self.restart_interval;
        if restart_due {
            scratch.extend(self.restart_marker_bytes(&mut acc));
        }

        if self.out.len() + scratch.len() > self.capacity {
            return Progress::Suspended;
        }

        self.out.extend(scratch);
        self.acc = acc;
        self.dc_pred = dc_pred;
        if restart_due {
            self.mcus_since_restart = 0;
            self.next_restart_marker = (self.next_restart_marker + 1) % 8;
            for p in &mut self.dc_pred {
                *p = 0;
            }
        } else {
            self.mcus_since_restart += 1;
        }
        Progress::Done
    }
}

/// Symmetric decode side: pulls Huffman-coded MCUs back out of a scan's
/// compressed bytes. Unlike the encoder, the whole scan's bytes are
/// assumed available up front once `markers` has extracted the SOS
/// segment, so no suspension contract is needed here.
pub struct HuffmanDecoder<'a> {
    dc_tables: [Option<HuffmanTable>; NUM_HUFF_TBLS],
    ac_tables: [Option<HuffmanTable>; NUM_HUFF_TBLS],
    component_tables: Vec<ComponentTables>,
    dc_pred: Vec<i32>,
    reader: BitReader<'a>,
    restart_interval: usize,
    mcus_since_restart: usize,
}

impl<'a> HuffmanDecoder<'a> {
    #[must_use]
    pub fn start_pass(
        data: &'a [u8],
        dc_tables: [Option<HuffmanTable>; NUM_HUFF_TBLS],
        ac_tables: [Option<HuffmanTable>; NUM_HUFF_TBLS],
        component_tables: Vec<ComponentTables>,
        restart_interval: usize,
    ) -> Self {
        let dc_pred = vec![0i32; component_tables.len()];
        Self {
            dc_tables,
            ac_tables,
            component_tables,
            dc_pred,
            reader: BitReader::new(data),
            restart_interval,
            mcus_since_restart: 0,
        }
    }

    pub fn decode_mcu(
        &mut self,
        mcu_buffer: &mut [[i16; DCTSIZE2]],
        block_components: &[usize],
    ) -> JscResult<()> {
        if self.restart_interval > 0 && self.mcus_since_restart == self.restart_interval {
            self.resync_at_restart()?;
        }

        for (block, &ci) in mcu_buffer.iter_mut().zip(block_components.iter()) {
            *block = [0i16; DCTSIZE2];
            let tables = self.component_tables[ci];
            let dc_table = self.dc_tables[tables.dc_table]
                .as_ref()
                .ok_or_else(|| JscError::invariant("no DC huffman table installed for slot"))?;
            let ac_table = self.ac_tables[tables.ac_table]
                .as_ref()
                .ok_or_else(|| JscError::invariant("no AC huffman table installed for slot"))?;

            let size = self.reader.decode_huffman(dc_table)?;
            let diff = self.reader.receive_extend(size);
            self.dc_pred[ci] += diff;
            block[0] = self.dc_pred[ci] as i16;

            let mut k = 1usize;
            while k < DCTSIZE2 {
                let symbol = self.reader.decode_huffman(ac_table)?;
                let run = symbol >> 4;
                let size = symbol & 0x0F;
                if size == 0 {
                    if run == 15 {
                        k += 16;
                        continue;
                    }
                    break; // EOB
                }
                k += usize::from(run);
                if k >= DCTSIZE2 {
                    return Err(JscError::invariant("AC run overruns block"));
                }
                let value = self.reader.receive_extend(size);
                block[UN_ZIGZAG[k]] = value as i16;
                k += 1;
            }
        }

        self.mcus_since_restart += 1;
        Ok(())
    }

    fn resync_at_restart(&mut self) -> JscResult<()> {
        // Drain bits until the marker the writer emitted is reached, then
        // consume it and reset predictors for the next restart segment.
        while !self.reader.marker_hit {
            self.reader.get_bits(1);
        }
        self.reader.resync_after_marker()?;
        self.mcus_since_restart = 0;
        for p in &mut self.dc_pred {
            *p = 0;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::huffman::{
        AC_LUMA_BITS, AC_LUMA_VALUES, DC_LUMA_BITS, DC_LUMA_VALUES,
    };

    fn luma_tables() -> (
        [Option<HuffmanTable>; NUM_HUFF_TBLS],
        [Option<HuffmanTable>; NUM_HUFF_TBLS],
    ) {
        let dc = HuffmanTable::build(DC_LUMA_BITS, DC_LUMA_VALUES.to_vec()).unwrap();
        let ac = HuffmanTable::build(AC_LUMA_BITS, AC_LUMA_VALUES.to_vec()).unwrap();
        let dc_tables: [Option<HuffmanTable>; NUM_HUFF_TBLS] = [Some(dc), None, None, None];
        let ac_tables: [Option<HuffmanTable>; NUM_HUFF_TBLS] = [Some(ac), None, None, None];
        (dc_tables, ac_tables)
    }

    #[test]
    fn flat_block_round_trips_through_encoder_and_decoder() {
        let (dc_tables, ac_tables) = luma_tables();
        let component_tables = vec![ComponentTables { dc_table: 0, ac_table: 0 }];

        let mut block = [0i16; DCTSIZE2];
        block[0] = 12;
        block[5] = -3;
        block[20] = 7;

        let mut encoder =
            HuffmanEncoder::start_pass(dc_tables, ac_tables, component_tables.clone(), 0);
        encoder.set_capacity(usize::MAX);
        let progress = encoder.encode_mcu(&[block], &[0]);
        assert_eq!(progress, Progress::Done);
        let bytes = encoder.finish();

        let (dc_tables, ac_tables) = luma_tables();
        let mut decoder =
            HuffmanDecoder::start_pass(&bytes, dc_tables, ac_tables, component_tables, 0);
        let mut decoded = [[0i16; DCTSIZE2]; 1];
        decoder.decode_mcu(&mut decoded, &[0]).unwrap();
        assert_eq!(decoded[0], block);
    }

    #[test]
    fn suspension_leaves_state_untouched() {
        let (dc_tables, ac_tables) = luma_tables();
        let component_tables = vec![ComponentTables { dc_table: 0, ac_table: 0 }];
        let mut encoder = HuffmanEncoder::start_pass(dc_tables, ac_tables, component_tables, 0);
        encoder.set_capacity(0);

        let mut block = [0i16; DCTSIZE2];
        block[0] = 50;
        let progress = encoder.encode_mcu(&[block], &[0]);
        assert_eq!(progress, Progress::Suspended);
        assert_eq!(encoder.dc_pred, vec![0]);
        assert!(encoder.out.is_empty());

        encoder.set_capacity(usize::MAX);
        let progress = encoder.encode_mcu(&[block], &[0]);
        assert_eq!(progress, Progress::Done);
        assert_eq!(encoder.dc_pred, vec![50]);
    }

    #[test]
    fn dc_predictor_carries_between_mcus() {
        let (dc_tables, ac_tables) = luma_tables();
        let component_tables = vec![ComponentTables { dc_table: 0, ac_table: 0 }];
        let mut encoder = HuffmanEncoder::start_pass(dc_tables, ac_tables, component_tables, 0);
        encoder.set_capacity(usize::MAX);

        let mut first = [0i16; DCTSIZE2];
        first[0] = 10;
        let mut second = [0i16; DCTSIZE2];
        second[0] = 15;

        encoder.encode_mcu(&[first], &[0]);
        encoder.encode_mcu(&[second], &[0]);
        assert_eq!(encoder.dc_pred, vec![15]);
    }
}
