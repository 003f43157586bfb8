//! The Panekit frame-header obfuscation.
//!
//! Panekit scrambles the first 32 bytes of every frame: header fields are
//! stored at shuffled offsets, two are bitwise-NOTed, and two carry fixed
//! additive offsets. There is no cryptographic intent; the transform is a
//! fixed, byte-exact bijection on the 32-byte prefix.
//!
//! [`deobfuscate_frame_header`] and [`obfuscate_frame_header`] are written
//! out separately rather than sharing code: NOT is its own inverse but the
//! additive constants are not, so each direction applies its own
//! operations explicitly. Neither has error conditions.

/// Additive offset on the 32-bit code-count field.
const CODE_COUNT_BIAS: u32 = 0x140;
/// Additive offset on the width and height fields.
const DIMENSION_BIAS: u16 = 0x3E8;

fn get16(buf: &[u8; 32], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

fn put16(buf: &mut [u8; 32], at: usize, value: u16) {
    buf[at..at + 2].copy_from_slice(&value.to_le_bytes());
}

fn get32(buf: &[u8; 32], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

fn put32(buf: &mut [u8; 32], at: usize, value: u32) {
    buf[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

/// Undo the on-disc scrambling, leaving the plain header layout:
/// magic at 0, qscale at 2, width at 4, height at 6, 32-bit code count at
/// 8, sub-version tag at 12.
pub fn deobfuscate_frame_header(buf: &mut [u8; 32]) {
    let o = *buf;

    put16(buf, 0, get16(&o, 6)); // magic
    put16(buf, 2, !get16(&o, 4)); // qscale
    put16(buf, 4, get16(&o, 12).wrapping_sub(DIMENSION_BIAS)); // width
    put16(buf, 6, get16(&o, 14).wrapping_sub(DIMENSION_BIAS)); // height
    put32(buf, 8, get32(&o, 0).wrapping_sub(CODE_COUNT_BIAS)); // code count
    put16(buf, 12, get16(&o, 8)); // sub-version tag
    put16(buf, 14, !get16(&o, 10));

    // The back half is stored as four 32-bit words in reverse order.
    put32(buf, 16, get32(&o, 28));
    put32(buf, 20, get32(&o, 24));
    put32(buf, 24, get32(&o, 20));
    put32(buf, 28, get32(&o, 16));
}

/// Re-apply the on-disc scrambling after encoding.
pub fn obfuscate_frame_header(buf: &mut [u8; 32]) {
    let d = *buf;

    put32(buf, 0, get32(&d, 8).wrapping_add(CODE_COUNT_BIAS));
    put16(buf, 4, !get16(&d, 2));
    put16(buf, 6, get16(&d, 0));
    put16(buf, 8, get16(&d, 12));
    put16(buf, 10, !get16(&d, 14));
    put16(buf, 12, get16(&d, 4).wrapping_add(DIMENSION_BIAS));
    put16(buf, 14, get16(&d, 6).wrapping_add(DIMENSION_BIAS));

    put32(buf, 16, get32(&d, 28));
    put32(buf, 20, get32(&d, 24));
    put32(buf, 24, get32(&d, 20));
    put32(buf, 28, get32(&d, 16));
}

#[cfg(test)]
#[path = "tests/obfuscate_tests.rs"]
mod tests;
