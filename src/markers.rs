//! JFIF/JPEG marker I/O (spec §1, named out of the core as an external
//! collaborator; spec §6 fixes the byte-level contract this module has to
//! satisfy: SOI, APP0/JFIF, DQT, SOF0, DHT, SOS, the scan itself with
//! restart markers, EOI, plus the literal `JSC\0` `COM` marker).
//!
//! Grounded on the teacher's `headers.rs` for the big-endian,
//! length-prefixed read idiom (`read_u16_be`/`read_byte` over a `Read`
//! cursor, one function per marker type) and on
//! `other_examples/8244f789_UnnamedOrange-Image-Term-Project…` for the
//! struct-per-marker write-side shape.

use std::io::{Cursor, Read};

use crate::consts::{
    DCTSIZE2, JSC_COM_PAYLOAD, MARKER_APP0, MARKER_COM, MARKER_DHT, MARKER_DQT, MARKER_DRI,
    MARKER_EOI, MARKER_SOI, MARKER_SOS, NUM_HUFF_TBLS, NUM_QUANT_TBLS, SOF_BASELINE,
};
use crate::errors::{JscError, JscResult};
use crate::huffman::HuffmanTable;
use crate::image::{ColorSpace, ComponentSpec, ImageInfo};

fn write_u16_be(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn read_u16_be<R: Read>(r: &mut R) -> JscResult<u16> {
    let mut buf = [0u8; 2];
    r.read_exact(&mut buf)
        .map_err(|_| JscError::invariant("truncated marker: expected 2 more bytes"))?;
    Ok(u16::from_be_bytes(buf))
}

fn read_byte<R: Read>(r: &mut R) -> JscResult<u8> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)
        .map_err(|_| JscError::invariant("truncated marker: expected 1 more byte"))?;
    Ok(buf[0])
}

pub fn write_soi(out: &mut Vec<u8>) {
    out.push(0xFF);
    out.push(MARKER_SOI);
}

pub fn write_eoi(out: &mut Vec<u8>) {
    out.push(0xFF);
    out.push(MARKER_EOI);
}

/// JFIF APP0, version 1.1, no thumbnail, density units unspecified.
pub fn write_app0(out: &mut Vec<u8>) {
    out.push(0xFF);
    out.push(MARKER_APP0);
    write_u16_be(out, 16);
    out.extend_from_slice(b"JFIF\0");
    out.push(1);
    out.push(1);
    out.push(0);
    write_u16_be(out, 1);
    write_u16_be(out, 1);
    out.push(0);
    out.push(0);
}

/// The literal 4-byte `"JSC\0"` payload spec §6 requires right after
/// `jpeg_start_compress`.
pub fn write_com(out: &mut Vec<u8>) {
    out.push(0xFF);
    out.push(MARKER_COM);
    write_u16_be(out, 2 + JSC_COM_PAYLOAD.len() as u16);
    out.extend_from_slice(&JSC_COM_PAYLOAD);
}

/// One DQT segment per table, 16-bit precision is never used by this
/// profile (8-bit samples only): one byte precision/id nibble, 64 bytes.
pub fn write_dqt(out: &mut Vec<u8>, table_id: u8, table: &[u16; DCTSIZE2]) {
    out.push(0xFF);
    out.push(MARKER_DQT);
    write_u16_be(out, 2 + 1 + DCTSIZE2 as u16);
    out.push(table_id & 0x0F);
    for &v in table {
        out.push(v as u8);
    }
}

pub fn write_sof0(out: &mut Vec<u8>, width: usize, height: usize, components: &[ComponentSpec]) {
    out.push(0xFF);
    out.push(SOF_BASELINE);
    let len = 2 + 1 + 2 + 2 + 1 + components.len() * 3;
    write_u16_be(out, len as u16);
    out.push(8); // precision
    write_u16_be(out, height as u16);
    write_u16_be(out, width as u16);
    out.push(components.len() as u8);
    for c in components {
        out.push((c.index + 1) as u8);
        out.push((c.h_samp << 4) | c.v_samp);
        out.push(c.quant_table_no);
    }
}

/// One DHT segment, one table (matches this profile's default-tables-only
/// policy: four total segments, DC/AC x luma/chroma).
pub fn write_dht(out: &mut Vec<u8>, class: u8, table_id: u8, bits: &[u8; 16], values: &[u8]) {
    out.push(0xFF);
    out.push(MARKER_DHT);
    let len = 2 + 1 + 16 + values.len();
    write_u16_be(out, len as u16);
    out.push((class << 4) | (table_id & 0x0F));
    out.extend_from_slice(bits);
    out.extend_from_slice(values);
}

pub fn write_dri(out: &mut Vec<u8>, restart_interval: u16) {
    out.push(0xFF);
    out.push(MARKER_DRI);
    write_u16_be(out, 4);
    write_u16_be(out, restart_interval);
}

/// `scan_components[i] = (component_id, dc_table, ac_table)`, in scan
/// order -- baseline fixes `Ss=0, Se=63, Ah=0, Al=0`.
pub fn write_sos(out: &mut Vec<u8>, scan_components: &[(u8, u8, u8)]) {
    out.push(0xFF);
    out.push(MARKER_SOS);
    let len = 2 + 1 + scan_components.len() * 2 + 3;
    write_u16_be(out, len as u16);
    out.push(scan_components.len() as u8);
    for &(id, dc, ac) in scan_components {
        out.push(id);
        out.push((dc << 4) | ac);
    }
    out.push(0); // Ss
    out.push(63); // Se
    out.push(0); // Ah/Al
}

/// Everything `parse_headers` pulls out of the segments before SOS,
/// enough to drive the decompressor's controllers.
pub struct ParsedHeaders {
    pub image: ImageInfo,
    pub quant_tables: [Option<[u16; DCTSIZE2]>; NUM_QUANT_TBLS],
    pub dc_tables: [Option<HuffmanTable>; NUM_HUFF_TBLS],
    pub ac_tables: [Option<HuffmanTable>; NUM_HUFF_TBLS],
    pub restart_interval: u16,
    pub scan_components: Vec<(u8, u8, u8)>,
    pub com_payload: Option<Vec<u8>>,
    /// Byte offset into `data` where entropy-coded scan data begins.
    pub scan_data_offset: usize,
}

/// Parse SOI through SOS (exclusive of the entropy-coded data that
/// follows), stopping right after the SOS segment header.
pub fn parse_headers(data: &[u8]) -> JscResult<ParsedHeaders> {
    let mut cursor = Cursor::new(data);
    let marker = read_byte(&mut cursor)?;
    let soi = read_byte(&mut cursor)?;
    if marker != 0xFF || soi != MARKER_SOI {
        return Err(JscError::invariant("stream does not start with SOI"));
    }

    let mut quant_tables: [Option<[u16; DCTSIZE2]>; NUM_QUANT_TBLS] = [None, None, None, None];
    let mut dc_tables: [Option<HuffmanTable>; NUM_HUFF_TBLS] = [None, None, None, None];
    let mut ac_tables: [Option<HuffmanTable>; NUM_HUFF_TBLS] = [None, None, None, None];
    let mut restart_interval = 0u16;
    let mut com_payload = None;
    let mut width = 0usize;
    let mut height = 0usize;
    let mut components: Vec<ComponentSpec> = Vec::new();
    let mut scan_components = Vec::new();

    loop {
        let tag = read_byte(&mut cursor)?;
        if tag != 0xFF {
            return Err(JscError::invariant("expected marker prefix 0xFF"));
        }
        let kind = read_byte(&mut cursor)?;
        match kind {
            MARKER_APP0 => {
                let len = read_u16_be(&mut cursor)?;
                skip(&mut cursor, usize::from(len) - 2)?;
            }
            MARKER_COM => {
                let len = read_u16_be(&mut cursor)?;
                let mut payload = vec![0u8; usize::from(len) - 2];
                cursor
                    .read_exact(&mut payload)
                    .map_err(|_| JscError::invariant("truncated COM segment"))?;
                com_payload = Some(payload);
            }
            MARKER_DQT => parse_dqt(&mut cursor, &mut quant_tables)?,
            MARKER_DHT => parse_dht(&mut cursor, &mut dc_tables, &mut ac_tables)?,
            MARKER_DRI => {
                let _len = read_u16_be(&mut cursor)?;
                restart_interval = read_u16_be(&mut cursor)?;
            }
            k if k == SOF_BASELINE => {
                let (w, h, comps) = parse_sof0(&mut cursor)?;
                width = w;
                height = h;
                components = comps;
            }
            MARKER_SOS => {
                scan_components = parse_sos(&mut cursor)?;
                let color_space = match components.len() {
                    1 => ColorSpace::Grayscale,
                    _ => ColorSpace::YCbCr,
                };
                let image = ImageInfo::new(width, height, color_space, components)?;
                info!("Image dimensions: {}x{}, {} component(s)", width, height, image.components.len());
                let scan_data_offset = cursor.position() as usize;
                return Ok(ParsedHeaders {
                    image,
                    quant_tables,
                    dc_tables,
                    ac_tables,
                    restart_interval,
                    scan_components,
                    com_payload,
                    scan_data_offset,
                });
            }
            other => {
                warn!("Marker 0xFF{:X} not supported by this profile", other);
                return Err(JscError::Unsupported(unsupported_marker_name(other)));
            }
        }
    }
}

fn skip(cursor: &mut Cursor<&[u8]>, n: usize) -> JscResult<()> {
    let mut buf = vec![0u8; n];
    cursor
        .read_exact(&mut buf)
        .map_err(|_| JscError::invariant("truncated segment"))
}

fn parse_dqt(
    cursor: &mut Cursor<&[u8]>,
    quant_tables: &mut [Option<[u16; DCTSIZE2]>; NUM_QUANT_TBLS],
) -> JscResult<()> {
    let len = read_u16_be(cursor)? - 2;
    let mut remaining = len;
    while remaining > 0 {
        let pq_tq = read_byte(cursor)?;
        let precision_16 = (pq_tq >> 4) != 0;
        let id = usize::from(pq_tq & 0x0F);
        if id >= NUM_QUANT_TBLS {
            return Err(JscError::invariant("quant table id out of range"));
        }
        let mut table = [0u16; DCTSIZE2];
        if precision_16 {
            for v in &mut table {
                *v = read_u16_be(cursor)?;
            }
            remaining -= 1 + (DCTSIZE2 as u16) * 2;
        } else {
            for v in &mut table {
                *v = u16::from(read_byte(cursor)?);
            }
            remaining -= 1 + DCTSIZE2 as u16;
        }
        quant_tables[id] = Some(table);
    }
    Ok(())
}

fn parse_dht(
    cursor: &mut Cursor<&[u8]>,
    dc_tables: &mut [Option<HuffmanTable>; NUM_HUFF_TBLS],
    ac_tables: &mut [Option<HuffmanTable>; NUM_HUFF_TBLS],
) -> JscResult<()> {
    let len = read_u16_be(cursor)? - 2;
    let mut remaining = i32::from(len);
    while remaining > 0 {
        let tc_th = read_byte(cursor)?;
        let class = tc_th >> 4;
        let id = usize::from(tc_th & 0x0F);
        if id >= NUM_HUFF_TBLS {
            return Err(JscError::invariant("huffman table id out of range"));
        }
        let mut bits = [0u8; 16];
        cursor
            .read_exact(&mut bits)
            .map_err(|_| JscError::invariant("truncated DHT bits"))?;
        let total: usize = bits.iter().map(|&b| usize::from(b)).sum();
        let mut values = vec![0u8; total];
        cursor
            .read_exact(&mut values)
            .map_err(|_| JscError::invariant("truncated DHT values"))?;

        let table = HuffmanTable::build(bits, values)?;
        if class == 0 {
            dc_tables[id] = Some(table);
        } else {
            ac_tables[id] = Some(table);
        }
        remaining -= 1 + 16 + total as i32;
    }
    Ok(())
}

fn parse_sof0(cursor: &mut Cursor<&[u8]>) -> JscResult<(usize, usize, Vec<ComponentSpec>)> {
    let _len = read_u16_be(cursor)?;
    let precision = read_byte(cursor)?;
    if precision != 8 {
        return Err(JscError::Unsupported("only 8-bit sample precision is supported"));
    }
    let height = usize::from(read_u16_be(cursor)?);
    let width = usize::from(read_u16_be(cursor)?);
    let nc = read_byte(cursor)?;
    let mut components = Vec::with_capacity(usize::from(nc));
    for i in 0..usize::from(nc) {
        let _id = read_byte(cursor)?;
        let samp = read_byte(cursor)?;
        let tq = read_byte(cursor)?;
        components.push(ComponentSpec::new(i, samp >> 4, samp & 0x0F, tq));
    }
    Ok((width, height, components))
}

fn parse_sos(cursor: &mut Cursor<&[u8]>) -> JscResult<Vec<(u8, u8, u8)>> {
    let _len = read_u16_be(cursor)?;
    let ns = read_byte(cursor)?;
    let mut out = Vec::with_capacity(usize::from(ns));
    for _ in 0..ns {
        let id = read_byte(cursor)?;
        let td_ta = read_byte(cursor)?;
        out.push((id, td_ta >> 4, td_ta & 0x0F));
    }
    let _ss = read_byte(cursor)?;
    let _se = read_byte(cursor)?;
    let _ah_al = read_byte(cursor)?;
    Ok(out)
}

fn unsupported_marker_name(kind: u8) -> &'static str {
    match kind {
        0xC1 => "extended sequential SOF",
        0xC2 => "progressive SOF",
        0xC3 => "lossless SOF",
        0xC9 | 0xCA | 0xCB => "arithmetic-coded SOF",
        _ => "unrecognized or unsupported marker",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::huffman::{DC_LUMA_BITS, DC_LUMA_VALUES};

    #[test]
    fn sof0_round_trips_through_write_and_parse() {
        let components = vec![ComponentSpec::new(0, 2, 2, 0), ComponentSpec::new(1, 1, 1, 1)];
        let mut out = Vec::new();
        write_soi(&mut out);
        write_dqt(&mut out, 0, &[1u16; DCTSIZE2]);
        write_dqt(&mut out, 1, &[2u16; DCTSIZE2]);
        write_sof0(&mut out, 16, 16, &components);
        write_dht(&mut out, 0, 0, &DC_LUMA_BITS, &DC_LUMA_VALUES);
        write_sos(&mut out, &[(1, 0, 0), (2, 0, 0)]);
        out.push(0xAA); // stand-in entropy-coded byte

        let parsed = parse_headers(&out).unwrap();
        assert_eq!(parsed.image.width, 16);
        assert_eq!(parsed.image.height, 16);
        assert_eq!(parsed.image.components.len(), 2);
        assert_eq!(parsed.image.components[0].h_samp, 2);
        assert_eq!(parsed.quant_tables[0], Some([1u16; DCTSIZE2]));
        assert_eq!(parsed.quant_tables[1], Some([2u16; DCTSIZE2]));
        assert!(parsed.dc_tables[0].is_some());
        assert_eq!(parsed.scan_components, vec![(1, 0, 0), (2, 0, 0)]);
        assert_eq!(&out[parsed.scan_data_offset..], &[0xAA]);
    }

    #[test]
    fn com_payload_is_preserved() {
        let components = vec![ComponentSpec::new(0, 1, 1, 0)];
        let mut out = Vec::new();
        write_soi(&mut out);
        write_com(&mut out);
        write_dqt(&mut out, 0, &[1u16; DCTSIZE2]);
        write_sof0(&mut out, 8, 8, &components);
        write_dht(&mut out, 0, 0, &DC_LUMA_BITS, &DC_LUMA_VALUES);
        write_sos(&mut out, &[(1, 0, 0)]);

        let parsed = parse_headers(&out).unwrap();
        assert_eq!(parsed.com_payload.unwrap(), JSC_COM_PAYLOAD.to_vec());
    }

    #[test]
    fn rejects_progressive_sof() {
        let mut out = Vec::new();
        write_soi(&mut out);
        out.push(0xFF);
        out.push(0xC2);
        write_u16_be(&mut out, 6);
        out.extend_from_slice(&[8, 0, 1, 0, 1, 0]);
        assert!(parse_headers(&out).is_err());
    }
}
