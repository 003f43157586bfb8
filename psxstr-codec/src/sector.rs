//! Typed view over the fixed video sector header.
//!
//! Video sectors carry a 32-byte header inside the 2048-byte user data
//! area, followed by 2016 bytes of frame payload:
//!
//! ```text
//! 0   u32  magic 0x80010160
//! 4   u16  chunk number within the frame
//! 6   u16  chunks in this frame
//! 8   u32  frame number (counting from 1)
//! 12  u32  used demux size of the whole frame
//! 16  u16  frame width
//! 18  u16  frame height
//! 20  ..   codec fields (duplicated from the frame header)
//! 28  [4]  reserved, must be zero
//! ```
//!
//! Classification is a structural test: any mismatch, including a nonzero
//! reserved region, disqualifies the sector rather than erroring, so the
//! caller can route it to another stream.

/// Magic at the start of every video sector's user data.
pub const VIDEO_SECTOR_MAGIC: u32 = 0x8001_0160;

/// User data bytes per Mode 2 Form 1 sector.
pub const SECTOR_USER_DATA_SIZE: usize = 2048;

/// Header bytes preceding the payload.
pub const VIDEO_SECTOR_HEADER_SIZE: usize = 32;

/// Frame payload bytes per video sector.
pub const SECTOR_PAYLOAD_SIZE: usize = SECTOR_USER_DATA_SIZE - VIDEO_SECTOR_HEADER_SIZE;

const MAX_CHUNKS_PER_FRAME: u16 = 64;

/// One sector's contribution to a single compressed frame.
///
/// Borrowed from the sector buffer; the demultiplexer copies the payload
/// when it accepts the chunk.
#[derive(Debug, Clone, Copy)]
pub struct SectorChunk<'a> {
    pub chunk_index: u16,
    pub chunks_in_frame: u16,
    pub frame_number: i32,
    pub sector_number: u32,
    pub width: u16,
    pub height: u16,
    pub payload: &'a [u8],
}

fn read_u16(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

fn read_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

/// Classify a 2048-byte user-data sector as a video chunk, or `None` if
/// any structural check fails.
pub fn classify_video_sector(sector: &[u8], sector_number: u32) -> Option<SectorChunk<'_>> {
    if sector.len() != SECTOR_USER_DATA_SIZE {
        return None;
    }
    if read_u32(sector, 0) != VIDEO_SECTOR_MAGIC {
        return None;
    }

    let chunk_index = read_u16(sector, 4);
    let chunks_in_frame = read_u16(sector, 6);
    let frame_number = read_u32(sector, 8);
    let demux_size = read_u32(sector, 12);
    let width = read_u16(sector, 16);
    let height = read_u16(sector, 18);

    if chunks_in_frame == 0 || chunks_in_frame > MAX_CHUNKS_PER_FRAME {
        return None;
    }
    if chunk_index >= chunks_in_frame {
        return None;
    }
    if frame_number == 0 || frame_number > i32::MAX as u32 {
        return None;
    }
    if demux_size == 0 || demux_size > chunks_in_frame as u32 * SECTOR_PAYLOAD_SIZE as u32 {
        return None;
    }
    if !(16..=1024).contains(&width) || !(16..=1024).contains(&height) {
        return None;
    }
    // Reserved region: a nonzero byte means this is some other sector
    // format that happens to share the magic.
    if sector[28..32].iter().any(|&b| b != 0) {
        return None;
    }

    Some(SectorChunk {
        chunk_index,
        chunks_in_frame,
        frame_number: frame_number as i32,
        sector_number,
        width,
        height,
        payload: &sector[VIDEO_SECTOR_HEADER_SIZE..],
    })
}

#[cfg(test)]
#[path = "tests/sector_tests.rs"]
mod tests;
