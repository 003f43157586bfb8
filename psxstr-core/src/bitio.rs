//! Bit-level I/O over 16-bit little-endian words.
//!
//! The MDEC bitstreams are not plain byte streams: the data is a sequence
//! of 16-bit little-endian words, and bits are consumed MSB-first *within
//! each word*. One title additionally stores the first two coded words
//! transposed, which the reader undoes via [`WordOrder::SwapLeadPair`].

/// How coded 16-bit words are laid out in the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WordOrder {
    /// Words appear in stream order.
    #[default]
    Straight,
    /// Words 0 and 1 are stored swapped and must be exchanged before
    /// bit-reading. Requires at least two words of data.
    SwapLeadPair,
}

/// A bit reader over a buffer of 16-bit little-endian words.
///
/// A trailing odd byte cannot form a word and is treated as beyond the end
/// of the stream. All read/peek methods return `None` on underflow; the
/// caller maps that to its own end-of-stream error with context.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    order: WordOrder,
    /// Absolute bit position from the start of the buffer.
    pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_order(data, WordOrder::Straight)
    }

    pub fn with_order(data: &'a [u8], order: WordOrder) -> Self {
        Self {
            data,
            order,
            pos: 0,
        }
    }

    /// Total readable bits (whole words only).
    pub fn total_bits(&self) -> usize {
        (self.data.len() / 2) * 16
    }

    /// Current bit position from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.total_bits().saturating_sub(self.pos)
    }

    fn word_at(&self, index: usize) -> Option<u16> {
        let index = match self.order {
            WordOrder::Straight => index,
            WordOrder::SwapLeadPair if index < 2 => index ^ 1,
            WordOrder::SwapLeadPair => index,
        };
        let byte = index * 2;
        if byte + 2 > self.data.len() {
            return None;
        }
        Some(u16::from_le_bytes([self.data[byte], self.data[byte + 1]]))
    }

    /// Peek `n` bits (n <= 32) without consuming them.
    pub fn peek_bits(&self, n: u8) -> Option<u32> {
        debug_assert!(n <= 32);
        if (n as usize) > self.remaining() {
            return None;
        }
        let mut value = 0u32;
        for i in 0..n as usize {
            let p = self.pos + i;
            let word = self.word_at(p / 16)?;
            let bit = (word >> (15 - (p % 16))) & 1;
            value = (value << 1) | bit as u32;
        }
        Some(value)
    }

    /// Read `n` bits (n <= 32).
    pub fn read_bits(&mut self, n: u8) -> Option<u32> {
        let value = self.peek_bits(n)?;
        self.pos += n as usize;
        Some(value)
    }

    /// Consume `n` bits previously inspected with [`peek_bits`].
    ///
    /// [`peek_bits`]: BitReader::peek_bits
    pub fn skip_bits(&mut self, n: u8) -> Option<()> {
        if (n as usize) > self.remaining() {
            return None;
        }
        self.pos += n as usize;
        Some(())
    }

    /// Read a two's-complement signed value of `n` bits (2 <= n <= 16).
    pub fn read_signed(&mut self, n: u8) -> Option<i16> {
        debug_assert!((2..=16).contains(&n));
        let raw = self.read_bits(n)? as u16;
        // Left-align then arithmetic-shift back down to sign-extend.
        Some(((raw << (16 - n)) as i16) >> (16 - n))
    }
}

/// A bit writer that accumulates MSB-first into 16-bit words and emits
/// them as little-endian byte pairs.
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    current: u16,
    filled: u8,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bits written so far, including the partial word.
    pub fn position(&self) -> usize {
        self.bytes.len() * 8 + self.filled as usize
    }

    pub fn write_bit(&mut self, bit: bool) {
        self.current = (self.current << 1) | bit as u16;
        self.filled += 1;
        if self.filled == 16 {
            self.bytes.extend_from_slice(&self.current.to_le_bytes());
            self.current = 0;
            self.filled = 0;
        }
    }

    /// Write the low `n` bits of `value`, most significant first.
    pub fn write_bits(&mut self, value: u32, n: u8) {
        debug_assert!(n <= 32);
        for i in (0..n).rev() {
            self.write_bit((value >> i) & 1 != 0);
        }
    }

    /// Zero-pad so the written length is a multiple of `granularity_bytes`
    /// (must itself be a multiple of the 2-byte word size).
    pub fn pad_to(&mut self, granularity_bytes: usize) {
        debug_assert!(granularity_bytes.is_multiple_of(2));
        while self.filled != 0 {
            self.write_bit(false);
        }
        while !self.bytes.len().is_multiple_of(granularity_bytes) {
            self.bytes.extend_from_slice(&0u16.to_le_bytes());
        }
    }

    /// Finish and take the written bytes, zero-padding any partial word.
    pub fn into_bytes(mut self) -> Vec<u8> {
        while self.filled != 0 {
            self.write_bit(false);
        }
        self.bytes
    }
}

#[cfg(test)]
#[path = "tests/bitio_tests.rs"]
mod tests;
