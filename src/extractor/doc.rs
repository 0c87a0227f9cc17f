//! Legacy Word 97-2003 (`.doc`) text extraction.
//!
//! The main document text is reassembled from the piece table (CLX) stored in
//! the table stream, as located by the File Information Block at the start of
//! the `WordDocument` stream.

use crate::error::ExtractionError;
use crate::extractor::catch_parser_panic;
use crate::extractor::r#trait::Extractor;
use crate::models::FormatTag;
use encoding_rs::WINDOWS_1252;
use std::io::{Cursor, Read};

const WORD_IDENT: u16 = 0xA5EC;
const FLAG_ENCRYPTED: u16 = 0x0100;
const FLAG_WHICH_TABLE: u16 = 0x0200;
/// Start of `csw` in the FIB
const FIB_RG_W_OFFSET: usize = 32;
/// Index of `ccpText` in FibRgLw97
const CCP_TEXT_INDEX: usize = 3;
/// Index of the fcClx/lcbClx pair in FibRgFcLcb97
const CLX_PAIR_INDEX: usize = 33;
const PIECE_COMPRESSED: u32 = 0x4000_0000;

/// Word binary document extractor
#[derive(Debug, Default)]
pub struct DocExtractor;

impl DocExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for DocExtractor {
    fn format(&self) -> FormatTag {
        FormatTag::Doc
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        catch_parser_panic(FormatTag::Doc, || {
            let (word, table) = read_streams(bytes)?;
            let raw = piece_text(&word, &table)?;
            Ok(clean_control_chars(&raw))
        })
    }
}

fn parse_error(detail: impl std::fmt::Display) -> ExtractionError {
    ExtractionError::ParseFailure(format!("DOC parsing error: {}", detail))
}

/// Location of the text inside the WordDocument stream
#[derive(Debug)]
struct Fib {
    which_table: bool,
    ccp_text: usize,
    fc_clx: usize,
    lcb_clx: usize,
}

impl Fib {
    fn parse(word: &[u8]) -> Result<Self, ExtractionError> {
        if read_u16(word, 0)? != WORD_IDENT {
            return Err(parse_error("not a Word binary document"));
        }
        let flags = read_u16(word, 0x0A)?;
        if flags & FLAG_ENCRYPTED != 0 {
            return Err(parse_error("document is encrypted"));
        }

        let csw = read_u16(word, FIB_RG_W_OFFSET)? as usize;
        let cslw_at = FIB_RG_W_OFFSET + 2 + csw * 2;
        let cslw = read_u16(word, cslw_at)? as usize;
        let rg_lw = cslw_at + 2;
        if cslw <= CCP_TEXT_INDEX {
            return Err(parse_error("FIB too short"));
        }
        let ccp_text = read_u32(word, rg_lw + CCP_TEXT_INDEX * 4)? as usize;

        let cb_at = rg_lw + cslw * 4;
        let cb_rg_fc_lcb = read_u16(word, cb_at)? as usize;
        if cb_rg_fc_lcb <= CLX_PAIR_INDEX {
            return Err(parse_error("FIB has no piece table entry"));
        }
        let clx_at = cb_at + 2 + CLX_PAIR_INDEX * 8;

        Ok(Self {
            which_table: flags & FLAG_WHICH_TABLE != 0,
            ccp_text,
            fc_clx: read_u32(word, clx_at)? as usize,
            lcb_clx: read_u32(word, clx_at + 4)? as usize,
        })
    }
}

fn read_streams(bytes: &[u8]) -> Result<(Vec<u8>, Vec<u8>), ExtractionError> {
    let mut compound = cfb::CompoundFile::open(Cursor::new(bytes)).map_err(parse_error)?;

    let mut word = Vec::new();
    compound
        .open_stream("/WordDocument")
        .and_then(|mut s| s.read_to_end(&mut word))
        .map_err(|e| parse_error(format!("WordDocument stream: {}", e)))?;

    let fib = Fib::parse(&word)?;
    let table_name = if fib.which_table { "/1Table" } else { "/0Table" };
    let mut table = Vec::new();
    compound
        .open_stream(table_name)
        .and_then(|mut s| s.read_to_end(&mut table))
        .map_err(|e| parse_error(format!("{} stream: {}", &table_name[1..], e)))?;

    Ok((word, table))
}

/// Reassemble the main document text from the piece table
fn piece_text(word: &[u8], table: &[u8]) -> Result<String, ExtractionError> {
    let fib = Fib::parse(word)?;
    if fib.lcb_clx == 0 {
        return Err(parse_error("document has no piece table"));
    }
    let clx = table
        .get(fib.fc_clx..fib.fc_clx + fib.lcb_clx)
        .ok_or_else(|| parse_error("piece table points past end of table stream"))?;
    let plc = find_plc_pcd(clx)?;

    if plc.len() < 4 {
        return Err(parse_error("empty piece table"));
    }
    let pieces = (plc.len() - 4) / 12;

    let mut text = String::new();
    let mut remaining = fib.ccp_text;
    for i in 0..pieces {
        if remaining == 0 {
            break;
        }
        let cp_start = read_u32(plc, i * 4)? as usize;
        let cp_end = read_u32(plc, (i + 1) * 4)? as usize;
        let count = cp_end.saturating_sub(cp_start).min(remaining);
        remaining -= count;

        let fc = read_u32(plc, (pieces + 1) * 4 + i * 8 + 2)?;
        if fc & PIECE_COMPRESSED != 0 {
            let start = ((fc & !PIECE_COMPRESSED) / 2) as usize;
            let raw = word
                .get(start..start + count)
                .ok_or_else(|| parse_error("text piece points past end of stream"))?;
            let (decoded, _) = WINDOWS_1252.decode_without_bom_handling(raw);
            text.push_str(&decoded);
        } else {
            let start = fc as usize;
            let raw = word
                .get(start..start + count * 2)
                .ok_or_else(|| parse_error("text piece points past end of stream"))?;
            let units: Vec<u16> = raw
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect();
            text.push_str(&String::from_utf16_lossy(&units));
        }
    }

    Ok(text)
}

/// Skip `Prc` entries and return the `PlcPcd` bytes of the `Pcdt`
fn find_plc_pcd(clx: &[u8]) -> Result<&[u8], ExtractionError> {
    let mut pos = 0;
    while pos < clx.len() {
        match clx[pos] {
            0x01 => {
                let cb = i16::from_le_bytes(read_array(clx, pos + 1)?);
                if cb < 0 {
                    return Err(parse_error("negative Prc size"));
                }
                pos += 3 + cb as usize;
            }
            0x02 => {
                let lcb = read_u32(clx, pos + 1)? as usize;
                return clx
                    .get(pos + 5..pos + 5 + lcb)
                    .ok_or_else(|| parse_error("truncated piece table"));
            }
            other => return Err(parse_error(format!("unexpected CLX entry 0x{:02x}", other))),
        }
    }
    Err(parse_error("document has no piece table"))
}

/// Map Word's in-band markers to plain text
fn clean_control_chars(raw: &str) -> String {
    raw.chars()
        .filter_map(|c| match c {
            '\r' | '\u{0b}' | '\u{0c}' => Some('\n'),
            '\u{07}' => Some('\t'),
            '\t' | '\n' => Some(c),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect()
}

fn read_array<const N: usize>(buf: &[u8], offset: usize) -> Result<[u8; N], ExtractionError> {
    buf.get(offset..offset + N)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| parse_error(format!("unexpected end of data at offset {}", offset)))
}

fn read_u16(buf: &[u8], offset: usize) -> Result<u16, ExtractionError> {
    read_array(buf, offset).map(u16::from_le_bytes)
}

fn read_u32(buf: &[u8], offset: usize) -> Result<u32, ExtractionError> {
    read_array(buf, offset).map(u32::from_le_bytes)
}
