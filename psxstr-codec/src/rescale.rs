//! Requantization of coded blocks without a pixel-domain round trip.
//!
//! Changing a frame's quantization scale only touches the AC
//! coefficients: each level is multiplied by the old scale and divided by
//! the new one, rounding to nearest (half away from zero). The DC value
//! is carried outside the quantizer and never changes. Coefficients that
//! rescale to zero disappear, with their run folding into the next
//! surviving code.

use psxstr_core::MdecCode;

/// One 8x8 block in code form: the quantization scale and DC value from
/// the DC code word, plus the AC codes (end-of-block excluded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodedBlock {
    pub qscale: u8,
    pub dc: i16,
    pub codes: Vec<MdecCode>,
}

impl CodedBlock {
    /// Split one block off the front of a code stream: a DC word, AC
    /// codes, and a terminating end-of-block. Returns the block and the
    /// remainder, or `None` if the stream does not start with a complete
    /// block.
    pub fn from_codes(codes: &[MdecCode]) -> Option<(Self, &[MdecCode])> {
        let (dc_word, rest) = codes.split_first()?;
        let end = rest.iter().position(|c| c.is_end_of_block())?;
        Some((
            Self {
                qscale: dc_word.run,
                dc: dc_word.coefficient,
                codes: rest[..end].to_vec(),
            },
            &rest[end + 1..],
        ))
    }

    /// Rebuild the wire form: DC word, AC codes, end-of-block.
    pub fn to_codes(&self) -> Vec<MdecCode> {
        let mut out = Vec::with_capacity(self.codes.len() + 2);
        out.push(MdecCode::new_dc(self.qscale, self.dc));
        out.extend_from_slice(&self.codes);
        out.push(MdecCode::END_OF_BLOCK);
        out
    }
}

fn rounded_ratio(value: i32, numerator: i32, denominator: i32) -> i32 {
    let scaled = value * numerator;
    if scaled >= 0 {
        (scaled + denominator / 2) / denominator
    } else {
        (scaled - denominator / 2) / denominator
    }
}

/// Requantize one block to `new_qscale`, returning a fresh block.
///
/// Values are exact in the 10-bit coefficient range; a scale-up past it
/// is the caller's problem (the encoder will refuse such a stream).
pub fn rescale_block(block: &CodedBlock, new_qscale: u8) -> CodedBlock {
    let mut codes = Vec::with_capacity(block.codes.len());
    let mut pending_run = 0u32;
    for code in &block.codes {
        let level = rounded_ratio(
            code.coefficient as i32,
            block.qscale as i32,
            new_qscale as i32,
        );
        if level == 0 {
            pending_run += code.run as u32 + 1;
            continue;
        }
        codes.push(MdecCode::new(
            (code.run as u32 + pending_run) as u8,
            level as i16,
        ));
        pending_run = 0;
    }
    CodedBlock {
        qscale: new_qscale,
        dc: block.dc,
        codes,
    }
}

/// Requantize a whole frame's code stream. `None` if the stream is not a
/// sequence of complete blocks.
pub fn rescale_frame(codes: &[MdecCode], new_qscale: u8) -> Option<Vec<MdecCode>> {
    let mut out = Vec::with_capacity(codes.len());
    let mut rest = codes;
    while !rest.is_empty() {
        let (block, tail) = CodedBlock::from_codes(rest)?;
        out.extend(rescale_block(&block, new_qscale).to_codes());
        rest = tail;
    }
    Some(out)
}

#[cfg(test)]
#[path = "tests/rescale_tests.rs"]
mod tests;
