//! The MDEC run-length code data model.
//!
//! The MDEC hardware consumes a stream of 16-bit words, each packing a
//! 6-bit zero-run count and a signed 10-bit DCT coefficient. The first
//! word of every block instead packs the quantization scale in the top 6
//! bits and the block's absolute DC coefficient in the bottom 10. A
//! reserved word (`0xFE00`) terminates each block.

use serde::{Deserialize, Serialize};

/// The reserved end-of-block / end-of-data wire word.
pub const END_OF_DATA_WORD: u16 = 0xFE00;

/// One MDEC run-length code: skip `run` zero coefficients, then emit
/// `coefficient`.
///
/// `run` occupies 6 bits (0..=63) and `coefficient` 10 bits (-512..=511).
/// For the first code of a block, `run` holds the quantization scale and
/// `coefficient` the absolute DC value instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MdecCode {
    pub run: u8,
    pub coefficient: i16,
}

impl MdecCode {
    /// The distinguished end-of-block sentinel (wire word `0xFE00`).
    pub const END_OF_BLOCK: MdecCode = MdecCode {
        run: 0x3F,
        coefficient: -512,
    };

    pub fn new(run: u8, coefficient: i16) -> Self {
        debug_assert!(run <= 0x3F, "run {run} exceeds 6 bits");
        debug_assert!(
            (-512..=511).contains(&coefficient),
            "coefficient {coefficient} exceeds 10 bits"
        );
        Self { run, coefficient }
    }

    /// Pack a block's first code: quantization scale in the top 6 bits,
    /// absolute DC in the bottom 10.
    pub fn new_dc(qscale: u8, dc: i16) -> Self {
        Self::new(qscale, dc)
    }

    pub fn is_end_of_block(&self) -> bool {
        *self == Self::END_OF_BLOCK
    }

    /// Pack into the 16-bit wire word.
    pub fn to_word(self) -> u16 {
        ((self.run as u16) << 10) | (self.coefficient as u16 & 0x3FF)
    }

    /// Unpack from the 16-bit wire word, sign-extending the coefficient.
    pub fn from_word(word: u16) -> Self {
        let run = (word >> 10) as u8;
        // Shift the 10-bit field to the top and back down to sign-extend.
        let coefficient = ((word << 6) as i16) >> 6;
        Self { run, coefficient }
    }
}

#[cfg(test)]
#[path = "tests/mdec_tests.rs"]
mod tests;
