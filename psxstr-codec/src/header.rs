//! Frame header parsing and variant identification.
//!
//! The same demuxed buffer is tried against each candidate variant parser
//! until one accepts it, so every check here is a cheap, allocation-free
//! structural test returning `Option` — a mismatch is routine control
//! flow, not an error.

use serde::{Deserialize, Serialize};

use crate::lookup::VersionLookupTable;
use crate::obfuscate::deobfuscate_frame_header;
use crate::variant::{CodecVariant, Dialect};

/// Fixed marker present in every variant's header.
pub const BITSTREAM_MAGIC: u16 = 0x3800;

/// Valid quantization scale range.
pub const QSCALE_MIN: u16 = 1;
pub const QSCALE_MAX: u16 = 63;

/// Version tags carried by the self-describing variants.
const VERSION_V2_SWAPPED: u16 = 1;
const VERSION_V2: u16 = 2;
const VERSION_V3: u16 = 3;

/// Parsed frame metadata, derived once from the first header bytes and
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitstreamHeader {
    pub variant: CodecVariant,
    /// The header's code-count field: MDEC code words in the frame,
    /// halved and rounded up.
    pub code_count: u32,
    pub qscale: u8,
    /// Present only for self-describing variants (Panekit); other titles
    /// carry dimensions in the sector header instead.
    pub dimensions: Option<(u16, u16)>,
    /// The version field exactly as stored. Random for the lookup-table
    /// titles, so it must be preserved verbatim for re-encoding.
    pub raw_version: u16,
    /// Byte offset where the coded bitstream begins.
    pub data_start: usize,
}

fn read_u16(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

fn qscale_ok(qscale: u16) -> bool {
    (QSCALE_MIN..=QSCALE_MAX).contains(&qscale)
}

fn dimensions_ok(width: u16, height: u16) -> bool {
    (16..=1024).contains(&width) && (16..=1024).contains(&height)
}

/// Check the common 8-byte layout and return (code_count, qscale, version).
fn parse_common(buf: &[u8]) -> Option<(u16, u16, u16)> {
    if buf.len() < 8 {
        return None;
    }
    let code_count = read_u16(buf, 0);
    let magic = read_u16(buf, 2);
    let qscale = read_u16(buf, 4);
    let version = read_u16(buf, 6);
    if magic != BITSTREAM_MAGIC || !qscale_ok(qscale) || code_count == 0 {
        return None;
    }
    Some((code_count, qscale, version))
}

fn common_header(variant: CodecVariant, code_count: u16, qscale: u16, version: u16) -> BitstreamHeader {
    BitstreamHeader {
        variant,
        code_count: code_count as u32,
        qscale: qscale as u8,
        dimensions: None,
        raw_version: version,
        data_start: 8,
    }
}

/// The 32-bit disambiguation key: version tag verbatim in the top half,
/// frame-data bytes 10..12 with the low bit cleared in the bottom half.
pub fn disambiguation_key(buf: &[u8]) -> Option<u32> {
    if buf.len() < 12 {
        return None;
    }
    let version = read_u16(buf, 6) as u32;
    let data = (read_u16(buf, 10) & 0xFFFE) as u32;
    Some((version << 16) | data)
}

impl BitstreamHeader {
    pub fn sniff_v2(buf: &[u8]) -> Option<Self> {
        let (count, qscale, version) = parse_common(buf)?;
        (version == VERSION_V2).then(|| common_header(CodecVariant::V2, count, qscale, version))
    }

    pub fn sniff_v3(buf: &[u8]) -> Option<Self> {
        let (count, qscale, version) = parse_common(buf)?;
        (version == VERSION_V3).then(|| common_header(CodecVariant::V3, count, qscale, version))
    }

    pub fn sniff_v2_swapped(buf: &[u8]) -> Option<Self> {
        let (count, qscale, version) = parse_common(buf)?;
        (version == VERSION_V2_SWAPPED)
            .then(|| common_header(CodecVariant::V2Swapped, count, qscale, version))
    }

    /// Identify a randomized-version-tag frame via the lookup table. The
    /// version field is ignored except as key material; a table miss means
    /// the frame is not from these titles.
    pub fn sniff_star_wars(buf: &[u8], table: &VersionLookupTable) -> Option<Self> {
        let (count, qscale, version) = parse_common(buf)?;
        let key = disambiguation_key(buf)?;
        let dialect = table.dialect_for_key(key)?;
        Some(common_header(
            CodecVariant::StarWars(dialect),
            count,
            qscale,
            version,
        ))
    }

    /// Identify a Panekit frame by deobfuscating a copy of the 32-byte
    /// prefix and validating the plain layout underneath.
    pub fn sniff_panekit(buf: &[u8]) -> Option<Self> {
        if buf.len() < 32 {
            return None;
        }
        let mut head = [0u8; 32];
        head.copy_from_slice(&buf[..32]);
        deobfuscate_frame_header(&mut head);

        let magic = read_u16(&head, 0);
        let qscale = read_u16(&head, 2);
        let width = read_u16(&head, 4);
        let height = read_u16(&head, 6);
        let code_count = u32::from_le_bytes([head[8], head[9], head[10], head[11]]);
        let sub_version = read_u16(&head, 12);

        if magic != BITSTREAM_MAGIC
            || !qscale_ok(qscale)
            || !dimensions_ok(width, height)
            || code_count == 0
            || code_count > 0x7F_FFFF
        {
            return None;
        }

        Some(BitstreamHeader {
            variant: CodecVariant::Panekit,
            code_count,
            qscale: qscale as u8,
            dimensions: Some((width, height)),
            raw_version: sub_version,
            data_start: 32,
        })
    }

    /// Try every variant parser in turn. The lookup-table match is the
    /// most specific test so it runs first; the plain version tags follow;
    /// Panekit last since its check only sees the buffer through the
    /// deobfuscation transform.
    pub fn identify(buf: &[u8], table: Option<&VersionLookupTable>) -> Option<Self> {
        if let Some(table) = table
            && let Some(header) = Self::sniff_star_wars(buf, table)
        {
            return Some(header);
        }
        Self::sniff_v3(buf)
            .or_else(|| Self::sniff_v2(buf))
            .or_else(|| Self::sniff_v2_swapped(buf))
            .or_else(|| Self::sniff_panekit(buf))
    }
}

#[cfg(test)]
#[path = "tests/header_tests.rs"]
mod tests;
