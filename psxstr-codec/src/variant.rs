//! The per-title codec dialects.
//!
//! Each supported title speaks a slightly different flavor of the same
//! 1990s codec. Rather than a type hierarchy, a [`CodecVariant`] value
//! carries everything that actually differs: how DC coefficients are
//! coded, how the coded words are ordered, and how long the frame header
//! is. The decoder and encoder dispatch on this data.

use psxstr_core::bitio::WordOrder;
use serde::{Deserialize, Serialize};

/// How a variant codes the DC coefficient of each block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DcCoding {
    /// A direct 10-bit two's-complement value per block.
    Direct,
    /// An MPEG-1-style variable-length differential against a running
    /// per-component predictor, scaled by a fixed multiplier of 4.
    Predicted,
}

/// Sub-dialect of the randomized-version-tag titles, recovered from the
/// version lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dialect {
    /// Direct DC coding.
    A,
    /// Predicted DC coding.
    B,
}

/// One of the supported bitstream dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodecVariant {
    /// Version 2: direct DC, straight word order. The most common layout.
    V2,
    /// Version 3: predicted DC with per-component predictors.
    V3,
    /// Version-1 tag: coded like V2 but with the first two coded words
    /// stored transposed.
    V2Swapped,
    /// Deliberately randomized version tag; the sub-dialect comes from the
    /// precomputed lookup table.
    StarWars(Dialect),
    /// Obfuscated 32-byte self-describing header, predicted DC.
    Panekit,
}

impl CodecVariant {
    /// How the coded 16-bit words are laid out after the header.
    pub fn word_order(self) -> WordOrder {
        match self {
            CodecVariant::V2Swapped => WordOrder::SwapLeadPair,
            _ => WordOrder::Straight,
        }
    }

    pub fn dc_coding(self) -> DcCoding {
        match self {
            CodecVariant::V2 | CodecVariant::V2Swapped | CodecVariant::StarWars(Dialect::A) => {
                DcCoding::Direct
            }
            CodecVariant::V3 | CodecVariant::Panekit | CodecVariant::StarWars(Dialect::B) => {
                DcCoding::Predicted
            }
        }
    }

    /// Length in bytes of the frame header preceding the coded data.
    pub fn header_len(self) -> usize {
        match self {
            CodecVariant::Panekit => 32,
            _ => 8,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CodecVariant::V2 => "v2",
            CodecVariant::V3 => "v3",
            CodecVariant::V2Swapped => "v2 (swapped words)",
            CodecVariant::StarWars(Dialect::A) => "randomized tag, dialect A",
            CodecVariant::StarWars(Dialect::B) => "randomized tag, dialect B",
            CodecVariant::Panekit => "panekit",
        }
    }
}
