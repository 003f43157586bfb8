use thiserror::Error;

/// Errors from reassembling a frame out of its sector chunks.
///
/// These abort the frame being assembled, never the surrounding stream.
#[derive(Debug, Error)]
pub enum DemuxError {
    /// Chunk 0 never arrived. The lead chunk carries the frame dimensions,
    /// so nothing useful can be built without it.
    #[error("frame {frame_number}: lead chunk (index 0) missing, cannot recover dimensions")]
    MissingLeadChunk { frame_number: i32 },

    /// `finish()` was called before any chunk was accepted.
    #[error("no chunks were accumulated for this frame")]
    NoChunks,
}

/// Errors from decoding an already-accepted frame bitstream.
///
/// Bit positions are counted from the start of the coded data region so a
/// failing frame can be reproduced from a hex dump.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// No DC table entry matches the upcoming bits.
    #[error("block {block}: no DC code matches {peek_len} bits {peeked:#010b} at bit {bit_pos}")]
    UnknownDcCode {
        block: usize,
        bit_pos: usize,
        peeked: u16,
        peek_len: u8,
    },

    /// No AC table entry (nor the escape or end-of-block pattern) matches.
    #[error("block {block}: no AC code matches bits {peeked:016b} at bit {bit_pos}")]
    UnknownAcCode {
        block: usize,
        bit_pos: usize,
        peeked: u16,
    },

    /// An escape code carried a coefficient of exactly zero, which no
    /// encoder produces; the stream is corrupt.
    #[error("block {block}: escape code with zero coefficient at bit {bit_pos}")]
    EscapeCodeIsZero { block: usize, bit_pos: usize },

    /// The buffer ran out before the last block was terminated.
    #[error("unexpected end of stream at bit {bit_pos} (block {block})")]
    UnexpectedEndOfStream { block: usize, bit_pos: usize },

    /// A run-length pushed past the 64-entry block. Only raised in strict
    /// mode; the tolerant path logs and continues.
    #[error("block {block}: coefficient run overruns the block at bit {bit_pos}")]
    BlockOverrun { block: usize, bit_pos: usize },
}

/// Errors from re-encoding a coefficient stream.
///
/// Unlike decoding there is no best-effort path here: a silently wrong
/// compressed frame corrupts whatever file it is written into.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// No VLC table entry (including the escape code) can represent the
    /// value.
    #[error("cannot encode {what} value {value}")]
    ValueNotEncodable { what: &'static str, value: i32 },

    /// A run-length exceeds the 6-bit field.
    #[error("cannot encode run of {run} zero coefficients")]
    RunNotEncodable { run: u32 },

    /// The code stream itself is inconsistent (a DC quantization scale
    /// differing from the header, or a stream that does not end on a block
    /// boundary).
    #[error("malformed code stream: {reason}")]
    MalformedCodeStream { reason: &'static str },
}

/// Errors from loading the packaged version-disambiguation table.
#[derive(Debug, Error)]
pub enum LookupTableError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The blob is shorter than its declared entry count requires.
    #[error("lookup table truncated: {expected} bytes declared, {actual} present")]
    Truncated { expected: usize, actual: usize },

    /// Bytes remain after the last declared entry.
    #[error("lookup table has {extra} trailing bytes")]
    TrailingData { extra: usize },

    /// Entries must be sorted ascending for binary search.
    #[error("lookup table not sorted at entry {index}")]
    NotSorted { index: usize },
}
