//! Fixed variable-length-code tables.
//!
//! The AC table is the MPEG-1 run/level table shared by every variant;
//! each code is followed by one sign bit. DC differentials (predicted-DC
//! variants only) use the MPEG-1 size-category tables: the luminance table
//! tops out at 7 code bits, the chrominance table at 8.

/// One DC size-category entry: `size` is the number of extra bits that
/// follow the prefix.
#[derive(Debug, Clone, Copy)]
pub struct DcEntry {
    pub code: u8,
    pub len: u8,
    pub size: u8,
}

const fn dc(code: u8, len: u8, size: u8) -> DcEntry {
    DcEntry { code, len, size }
}

/// Luminance DC table, longest prefix first. Longest code is 7 bits.
pub const DC_LUMA: &[DcEntry] = &[
    dc(0b1111110, 7, 8),
    dc(0b111110, 6, 7),
    dc(0b11110, 5, 6),
    dc(0b1110, 4, 5),
    dc(0b110, 3, 4),
    dc(0b101, 3, 3),
    dc(0b100, 3, 0),
    dc(0b01, 2, 2),
    dc(0b00, 2, 1),
];

/// Chrominance DC table, longest prefix first. Longest code is 8 bits.
pub const DC_CHROMA: &[DcEntry] = &[
    dc(0b11111110, 8, 8),
    dc(0b1111110, 7, 7),
    dc(0b111110, 6, 6),
    dc(0b11110, 5, 5),
    dc(0b1110, 4, 4),
    dc(0b110, 3, 3),
    dc(0b10, 2, 2),
    dc(0b01, 2, 1),
    dc(0b00, 2, 0),
];

pub const DC_LUMA_MAX_LEN: u8 = 7;
pub const DC_CHROMA_MAX_LEN: u8 = 8;

/// One AC run/level entry; a sign bit follows the code on the wire.
#[derive(Debug, Clone, Copy)]
pub struct AcEntry {
    pub code: u16,
    pub len: u8,
    pub run: u8,
    pub level: u16,
}

const fn ac(code: u16, len: u8, run: u8, level: u16) -> AcEntry {
    AcEntry {
        code,
        len,
        run,
        level,
    }
}

/// End-of-block pattern.
pub const AC_END_OF_BLOCK_CODE: u16 = 0b10;
pub const AC_END_OF_BLOCK_LEN: u8 = 2;

/// Escape pattern, followed by a 6-bit run and a 10-bit signed level.
pub const AC_ESCAPE_CODE: u16 = 0b000001;
pub const AC_ESCAPE_LEN: u8 = 6;

/// Longest AC code, excluding the sign bit.
pub const AC_MAX_LEN: u8 = 14;

/// The shared MPEG-1-style AC table, ordered by increasing code length so
/// encoding picks the shortest representation first.
pub const AC_TABLE: &[AcEntry] = &[
    ac(0b11, 2, 0, 1),
    ac(0b011, 3, 1, 1),
    ac(0b0100, 4, 0, 2),
    ac(0b0101, 4, 2, 1),
    ac(0b00101, 5, 0, 3),
    ac(0b00110, 5, 4, 1),
    ac(0b00111, 5, 3, 1),
    ac(0b000100, 6, 7, 1),
    ac(0b000101, 6, 6, 1),
    ac(0b000110, 6, 1, 2),
    ac(0b000111, 6, 5, 1),
    ac(0b0000100, 7, 2, 2),
    ac(0b0000101, 7, 9, 1),
    ac(0b0000110, 7, 0, 4),
    ac(0b0000111, 7, 8, 1),
    ac(0b00100000, 8, 13, 1),
    ac(0b00100001, 8, 0, 6),
    ac(0b00100010, 8, 12, 1),
    ac(0b00100011, 8, 11, 1),
    ac(0b00100100, 8, 3, 2),
    ac(0b00100101, 8, 1, 3),
    ac(0b00100110, 8, 0, 5),
    ac(0b00100111, 8, 10, 1),
    ac(0b0000001000, 10, 16, 1),
    ac(0b0000001001, 10, 5, 2),
    ac(0b0000001010, 10, 0, 7),
    ac(0b0000001011, 10, 2, 3),
    ac(0b0000001100, 10, 1, 4),
    ac(0b0000001101, 10, 15, 1),
    ac(0b0000001110, 10, 14, 1),
    ac(0b0000001111, 10, 4, 2),
    ac(0b000000010000, 12, 0, 11),
    ac(0b000000010001, 12, 8, 2),
    ac(0b000000010010, 12, 4, 3),
    ac(0b000000010011, 12, 0, 10),
    ac(0b000000010100, 12, 2, 4),
    ac(0b000000010101, 12, 7, 2),
    ac(0b000000010110, 12, 21, 1),
    ac(0b000000010111, 12, 20, 1),
    ac(0b000000011000, 12, 0, 9),
    ac(0b000000011001, 12, 19, 1),
    ac(0b000000011010, 12, 18, 1),
    ac(0b000000011011, 12, 1, 5),
    ac(0b000000011100, 12, 3, 3),
    ac(0b000000011101, 12, 0, 8),
    ac(0b000000011110, 12, 6, 2),
    ac(0b000000011111, 12, 17, 1),
    ac(0b0000000010000, 13, 10, 2),
    ac(0b0000000010001, 13, 9, 2),
    ac(0b0000000010010, 13, 5, 3),
    ac(0b0000000010011, 13, 3, 4),
    ac(0b0000000010100, 13, 2, 5),
    ac(0b0000000010101, 13, 1, 7),
    ac(0b0000000010110, 13, 1, 6),
    ac(0b0000000010111, 13, 0, 15),
    ac(0b0000000011000, 13, 0, 14),
    ac(0b0000000011001, 13, 0, 13),
    ac(0b0000000011010, 13, 0, 12),
    ac(0b0000000011011, 13, 26, 1),
    ac(0b0000000011100, 13, 25, 1),
    ac(0b0000000011101, 13, 24, 1),
    ac(0b0000000011110, 13, 23, 1),
    ac(0b0000000011111, 13, 22, 1),
    ac(0b00000000010000, 14, 0, 31),
    ac(0b00000000010001, 14, 0, 30),
    ac(0b00000000010010, 14, 0, 29),
    ac(0b00000000010011, 14, 0, 28),
    ac(0b00000000010100, 14, 0, 27),
    ac(0b00000000010101, 14, 0, 26),
    ac(0b00000000010110, 14, 0, 25),
    ac(0b00000000010111, 14, 0, 24),
    ac(0b00000000011000, 14, 0, 23),
    ac(0b00000000011001, 14, 0, 22),
    ac(0b00000000011010, 14, 0, 21),
    ac(0b00000000011011, 14, 0, 20),
    ac(0b00000000011100, 14, 0, 19),
    ac(0b00000000011101, 14, 0, 18),
    ac(0b00000000011110, 14, 0, 17),
    ac(0b00000000011111, 14, 0, 16),
];

#[cfg(test)]
#[path = "tests/tables_tests.rs"]
mod tests;
