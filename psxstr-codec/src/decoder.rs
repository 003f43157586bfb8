//! The bitstream decoder: variant VLC data in, MDEC codes out.
//!
//! A [`FrameDecoder`] is a lazy, finite, single-use iterator over the
//! MDEC codes of one frame. Macroblocks are six blocks in Cr, Cb,
//! Y1..Y4 order; each block yields one DC code, zero or more AC codes,
//! and an end-of-block sentinel.
//!
//! Corrupted streams are expected in the wild. Run overruns are logged
//! and decoding continues (glitched output beats no output); unknown
//! prefixes, zero escape coefficients, and truncation end the frame with
//! a typed error — never a panic, and never more than the one frame.

use psxstr_core::{BitReader, DecodeError, DecodeOptions, MdecCode};

use crate::header::BitstreamHeader;
use crate::tables::{
    AC_END_OF_BLOCK_CODE, AC_END_OF_BLOCK_LEN, AC_ESCAPE_CODE, AC_ESCAPE_LEN, AC_TABLE,
    DC_CHROMA, DC_CHROMA_MAX_LEN, DC_LUMA, DC_LUMA_MAX_LEN, DcEntry,
};
use crate::variant::{CodecVariant, DcCoding};

/// Blocks per macroblock: Cr, Cb, Y1..Y4.
pub const BLOCKS_PER_MACROBLOCK: usize = 6;

/// Coefficient positions in an 8x8 block.
const BLOCK_COEFFICIENTS: usize = 64;

pub fn macroblock_count(width: u16, height: u16) -> usize {
    (width as usize).div_ceil(16) * (height as usize).div_ceil(16)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Component {
    Cr,
    Cb,
    Y,
}

pub(crate) fn component_of(block: usize) -> Component {
    match block % BLOCKS_PER_MACROBLOCK {
        0 => Component::Cr,
        1 => Component::Cb,
        _ => Component::Y,
    }
}

/// Running DC predictors, one per component (the four Y blocks share
/// one). Reset at the start of every frame; never shared across frames.
#[derive(Debug, Clone, Default)]
pub struct QuantizationContext {
    prev_cr: i32,
    prev_cb: i32,
    prev_y: i32,
}

impl QuantizationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn accumulate(&mut self, component: Component, diff: i32) -> i32 {
        let slot = match component {
            Component::Cr => &mut self.prev_cr,
            Component::Cb => &mut self.prev_cb,
            Component::Y => &mut self.prev_y,
        };
        *slot += diff;
        *slot
    }

    pub(crate) fn predictor(&self, component: Component) -> i32 {
        match component {
            Component::Cr => self.prev_cr,
            Component::Cb => self.prev_cb,
            Component::Y => self.prev_y,
        }
    }
}

/// Lazy decoder for one demuxed frame. Consumed exactly once.
pub struct FrameDecoder<'a> {
    reader: BitReader<'a>,
    variant: CodecVariant,
    qscale: u8,
    options: DecodeOptions,
    qctx: QuantizationContext,
    total_blocks: usize,
    block: usize,
    /// Coefficient positions filled in the current block (DC counts one).
    filled: usize,
    in_block: bool,
    failed: bool,
}

impl<'a> FrameDecoder<'a> {
    /// `width`/`height` come from the sector header; a self-describing
    /// frame header overrides them.
    pub fn new(
        header: &BitstreamHeader,
        frame_bytes: &'a [u8],
        width: u16,
        height: u16,
        options: DecodeOptions,
    ) -> Self {
        let (width, height) = header.dimensions.unwrap_or((width, height));
        let data = frame_bytes.get(header.data_start..).unwrap_or(&[]);
        Self {
            reader: BitReader::with_order(data, header.variant.word_order()),
            variant: header.variant,
            qscale: header.qscale,
            options,
            qctx: QuantizationContext::new(),
            total_blocks: macroblock_count(width, height) * BLOCKS_PER_MACROBLOCK,
            block: 0,
            filled: 0,
            in_block: false,
            failed: false,
        }
    }

    fn end_of_stream(&self) -> DecodeError {
        DecodeError::UnexpectedEndOfStream {
            block: self.block,
            bit_pos: self.reader.position(),
        }
    }

    /// True when the remaining bits are a strict prefix of `code`, i.e.
    /// more data could still have completed it.
    fn tail_could_complete(&self, code: u32, len: u8, avail: usize) -> bool {
        avail < len as usize
            && self.reader.peek_bits(avail as u8) == Some(code >> (len as usize - avail))
    }

    fn decode_dc(&mut self) -> Result<MdecCode, DecodeError> {
        let dc = match self.variant.dc_coding() {
            DcCoding::Direct => self
                .reader
                .read_signed(10)
                .ok_or_else(|| self.end_of_stream())? as i32,
            DcCoding::Predicted => self.decode_dc_differential()?,
        };
        self.in_block = true;
        self.filled = 1;
        // Corrupt differentials can drift outside the 10-bit field; clamp
        // the emitted code, not the predictor.
        Ok(MdecCode::new_dc(self.qscale, dc.clamp(-512, 511) as i16))
    }

    fn decode_dc_differential(&mut self) -> Result<i32, DecodeError> {
        let component = component_of(self.block);
        let (table, max_len): (&[DcEntry], u8) = match component {
            Component::Y => (DC_LUMA, DC_LUMA_MAX_LEN),
            _ => (DC_CHROMA, DC_CHROMA_MAX_LEN),
        };

        // Longest prefix first; entries too long for the remaining bits
        // simply cannot match.
        let mut hit = None;
        for entry in table {
            if let Some(peek) = self.reader.peek_bits(entry.len)
                && peek == entry.code as u32
            {
                hit = Some(*entry);
                break;
            }
        }
        let entry = match hit {
            Some(entry) => entry,
            None => {
                // A tail that could still grow into a valid code was cut
                // short; anything else is a corrupt prefix.
                let avail = self.reader.remaining();
                if table
                    .iter()
                    .any(|e| self.tail_could_complete(e.code as u32, e.len, avail))
                {
                    return Err(self.end_of_stream());
                }
                let peek_len = avail.min(max_len as usize) as u8;
                return Err(DecodeError::UnknownDcCode {
                    block: self.block,
                    bit_pos: self.reader.position(),
                    peeked: self.reader.peek_bits(peek_len).unwrap_or(0) as u16,
                    peek_len,
                });
            }
        };
        self.reader
            .skip_bits(entry.len)
            .ok_or_else(|| self.end_of_stream())?;

        let diff = if entry.size == 0 {
            0
        } else {
            let bits = self
                .reader
                .read_bits(entry.size)
                .ok_or_else(|| self.end_of_stream())? as i32;
            // A clear top bit marks a negative differential, biased so the
            // whole size category packs into `size` bits.
            if bits & (1 << (entry.size - 1)) == 0 {
                bits - ((1 << entry.size) - 1)
            } else {
                bits
            }
        };

        // The differential is stored divided by 4; nobody knows why, but
        // bit-exact compatibility requires multiplying it back.
        Ok(self.qctx.accumulate(component, diff * 4))
    }

    fn decode_ac(&mut self) -> Result<MdecCode, DecodeError> {
        let bit_pos = self.reader.position();

        if self.reader.peek_bits(AC_END_OF_BLOCK_LEN) == Some(AC_END_OF_BLOCK_CODE as u32) {
            self.reader
                .skip_bits(AC_END_OF_BLOCK_LEN)
                .ok_or_else(|| self.end_of_stream())?;
            self.in_block = false;
            self.filled = 0;
            self.block += 1;
            return Ok(MdecCode::END_OF_BLOCK);
        }

        let (run, level) = if self.reader.peek_bits(AC_ESCAPE_LEN)
            == Some(AC_ESCAPE_CODE as u32)
        {
            self.reader
                .skip_bits(AC_ESCAPE_LEN)
                .ok_or_else(|| self.end_of_stream())?;
            let run = self
                .reader
                .read_bits(6)
                .ok_or_else(|| self.end_of_stream())? as u8;
            let level = self
                .reader
                .read_signed(10)
                .ok_or_else(|| self.end_of_stream())?;
            if level == 0 {
                return Err(DecodeError::EscapeCodeIsZero {
                    block: self.block,
                    bit_pos,
                });
            }
            (run, level)
        } else {
            let mut hit = None;
            for entry in AC_TABLE {
                if let Some(peek) = self.reader.peek_bits(entry.len)
                    && peek == entry.code as u32
                {
                    hit = Some(*entry);
                    break;
                }
            }
            let entry = match hit {
                Some(entry) => entry,
                None => {
                    let avail = self.reader.remaining();
                    let truncated = self.tail_could_complete(
                        AC_END_OF_BLOCK_CODE as u32,
                        AC_END_OF_BLOCK_LEN,
                        avail,
                    ) || self.tail_could_complete(AC_ESCAPE_CODE as u32, AC_ESCAPE_LEN, avail)
                        || AC_TABLE
                            .iter()
                            .any(|e| self.tail_could_complete(e.code as u32, e.len, avail));
                    if truncated {
                        return Err(self.end_of_stream());
                    }
                    return Err(DecodeError::UnknownAcCode {
                        block: self.block,
                        bit_pos,
                        peeked: self.reader.peek_bits(avail.min(16) as u8).unwrap_or(0) as u16,
                    });
                }
            };
            self.reader
                .skip_bits(entry.len)
                .ok_or_else(|| self.end_of_stream())?;
            let sign = self
                .reader
                .read_bits(1)
                .ok_or_else(|| self.end_of_stream())?;
            let level = if sign == 1 {
                -(entry.level as i16)
            } else {
                entry.level as i16
            };
            (entry.run, level)
        };

        self.filled += run as usize + 1;
        if self.filled > BLOCK_COEFFICIENTS {
            if self.options.strict {
                return Err(DecodeError::BlockOverrun {
                    block: self.block,
                    bit_pos,
                });
            }
            log::warn!(
                "block {}: run of {run} overruns the 64-coefficient block at bit {bit_pos}, \
                 continuing best-effort",
                self.block
            );
        }

        Ok(MdecCode::new(run, level))
    }
}

impl Iterator for FrameDecoder<'_> {
    type Item = Result<MdecCode, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.block == self.total_blocks {
            return None;
        }
        let result = if self.in_block {
            self.decode_ac()
        } else {
            self.decode_dc()
        };
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

/// Decode a whole frame eagerly.
pub fn decode_frame(
    header: &BitstreamHeader,
    frame_bytes: &[u8],
    width: u16,
    height: u16,
    options: DecodeOptions,
) -> Result<Vec<MdecCode>, DecodeError> {
    let mut codes = Vec::new();
    for code in FrameDecoder::new(header, frame_bytes, width, height, options) {
        codes.push(code?);
    }
    Ok(codes)
}

#[cfg(test)]
#[path = "tests/decoder_tests.rs"]
mod tests;
