//! Shared primitives for the PS1 STR frame codec crates.
//!
//! This crate holds the pieces that both the demultiplexer and the
//! per-title bitstream codecs agree on:
//!
//! - typed error enums for each stage (demux, decode, encode, table load)
//! - the [`MdecCode`] data model and its 16-bit wire packing
//! - bit-level I/O over 16-bit little-endian words ([`BitReader`],
//!   [`BitWriter`])

pub mod bitio;
pub mod error;
pub mod mdec;

pub use bitio::{BitReader, BitWriter, WordOrder};
pub use error::{DecodeError, DemuxError, EncodeError, LookupTableError};
pub use mdec::MdecCode;

/// Options that control how tolerant frame decoding is.
///
/// Corrupted streams are common on real discs, so the default is to log
/// recoverable anomalies and keep going. Strict mode is for tooling that
/// would rather fail a frame than emit glitched output.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    /// Treat recoverable bitstream anomalies (block overruns) as errors
    /// instead of logged warnings.
    pub strict: bool,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}
