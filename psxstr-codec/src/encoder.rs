//! Re-encoding an MDEC code stream into a variant bitstream.
//!
//! The encoder is the strict half of the codec: decoding tolerates real
//! discs, but a silently wrong re-encoded frame corrupts whatever file it
//! is written back into, so every unrepresentable value is a hard error.
//!
//! Round-trip guarantee: for any stream the decoder produced,
//! `encode_frame` followed by a decode yields the identical code sequence.

use psxstr_core::{BitWriter, EncodeError, MdecCode, WordOrder};

use crate::decoder::{Component, QuantizationContext, component_of};
use crate::header::{BITSTREAM_MAGIC, BitstreamHeader};
use crate::obfuscate::obfuscate_frame_header;
use crate::tables::{
    AC_END_OF_BLOCK_CODE, AC_END_OF_BLOCK_LEN, AC_ESCAPE_CODE, AC_ESCAPE_LEN, AC_TABLE,
    DC_CHROMA, DC_LUMA,
};
use crate::variant::{CodecVariant, DcCoding};

/// Bitstream length granularity in bytes.
const PAD_GRANULARITY: usize = 4;

fn malformed(reason: &'static str) -> EncodeError {
    EncodeError::MalformedCodeStream { reason }
}

fn encode_dc_differential(
    writer: &mut BitWriter,
    qctx: &mut QuantizationContext,
    block: usize,
    dc: i16,
) -> Result<(), EncodeError> {
    let component = component_of(block);
    let diff = dc as i32 - qctx.predictor(component);
    // The wire carries the differential divided by 4; round to nearest,
    // half away from zero.
    let q = if diff >= 0 { (diff + 2) / 4 } else { (diff - 2) / 4 };
    if !(-255..=255).contains(&q) {
        return Err(EncodeError::ValueNotEncodable {
            what: "DC differential",
            value: diff,
        });
    }
    let size = (32 - q.unsigned_abs().leading_zeros()) as u8;
    let table = match component {
        Component::Y => DC_LUMA,
        _ => DC_CHROMA,
    };
    // Both tables cover every size category 0..=8.
    let entry = table
        .iter()
        .find(|e| e.size == size)
        .ok_or(EncodeError::ValueNotEncodable {
            what: "DC differential",
            value: diff,
        })?;
    writer.write_bits(entry.code as u32, entry.len);
    if size > 0 {
        let bits = if q >= 0 { q } else { q + (1 << size) - 1 } as u32;
        writer.write_bits(bits, size);
    }
    qctx.accumulate(component, q * 4);
    Ok(())
}

fn encode_ac(writer: &mut BitWriter, run: u32, coefficient: i16) -> Result<(), EncodeError> {
    let magnitude = coefficient.unsigned_abs();
    if run <= u8::MAX as u32
        && let Some(entry) = AC_TABLE
            .iter()
            .find(|e| e.run as u32 == run && e.level == magnitude)
    {
        writer.write_bits(entry.code as u32, entry.len);
        writer.write_bit(coefficient < 0);
        return Ok(());
    }
    if run > 63 {
        return Err(EncodeError::RunNotEncodable { run });
    }
    if !(-512..=511).contains(&(coefficient as i32)) {
        return Err(EncodeError::ValueNotEncodable {
            what: "AC coefficient",
            value: coefficient as i32,
        });
    }
    writer.write_bits(AC_ESCAPE_CODE as u32, AC_ESCAPE_LEN);
    writer.write_bits(run, 6);
    writer.write_bits((coefficient as u16 & 0x3FF) as u32, 10);
    Ok(())
}

/// Encode a complete frame: header bytes followed by the coded bitstream,
/// zero-padded to a 4-byte boundary.
///
/// The header supplies the variant, quantization scale, version tag, and
/// (for self-describing variants) dimensions; its code-count field is
/// recomputed from `codes` rather than trusted.
pub fn encode_frame(header: &BitstreamHeader, codes: &[MdecCode]) -> Result<Vec<u8>, EncodeError> {
    if codes.is_empty() {
        return Err(malformed("empty code stream"));
    }

    let mut writer = BitWriter::new();
    let mut qctx = QuantizationContext::new();
    let mut block = 0usize;
    let mut at_block_start = true;
    // Zero-valued AC codes carry no information of their own; their run
    // (plus the zero itself) folds into the next real code.
    let mut pending_run = 0u32;
    let mut mdec_words = 0usize;

    for &code in codes {
        if at_block_start {
            // The DC code word carries the quantization scale in its run
            // field; a frame has exactly one scale.
            if code.run != header.qscale {
                return Err(malformed("DC quantization scale differs from the frame header"));
            }
            match header.variant.dc_coding() {
                DcCoding::Direct => {
                    writer.write_bits((code.coefficient as u16 & 0x3FF) as u32, 10);
                }
                DcCoding::Predicted => {
                    encode_dc_differential(&mut writer, &mut qctx, block, code.coefficient)?;
                }
            }
            mdec_words += 1;
            at_block_start = false;
        } else if code.is_end_of_block() {
            writer.write_bits(AC_END_OF_BLOCK_CODE as u32, AC_END_OF_BLOCK_LEN);
            mdec_words += 1;
            pending_run = 0;
            block += 1;
            at_block_start = true;
        } else if code.coefficient == 0 {
            pending_run += code.run as u32 + 1;
        } else {
            encode_ac(&mut writer, code.run as u32 + pending_run, code.coefficient)?;
            mdec_words += 1;
            pending_run = 0;
        }
    }
    if !at_block_start {
        return Err(malformed("stream does not end on a block boundary"));
    }

    writer.pad_to(PAD_GRANULARITY);
    let mut body = writer.into_bytes();
    if header.variant.word_order() == WordOrder::SwapLeadPair && body.len() >= 4 {
        body.swap(0, 2);
        body.swap(1, 3);
    }

    // MDEC code words, halved and rounded up, exactly as the hardware
    // counts them.
    let code_count = mdec_words.div_ceil(2) as u32;

    let mut out = Vec::with_capacity(header.variant.header_len() + body.len());
    match header.variant {
        CodecVariant::Panekit => {
            let (width, height) = header
                .dimensions
                .ok_or_else(|| malformed("self-describing header missing dimensions"))?;
            let mut head = [0u8; 32];
            head[0..2].copy_from_slice(&BITSTREAM_MAGIC.to_le_bytes());
            head[2..4].copy_from_slice(&(header.qscale as u16).to_le_bytes());
            head[4..6].copy_from_slice(&width.to_le_bytes());
            head[6..8].copy_from_slice(&height.to_le_bytes());
            head[8..12].copy_from_slice(&code_count.to_le_bytes());
            head[12..14].copy_from_slice(&header.raw_version.to_le_bytes());
            obfuscate_frame_header(&mut head);
            out.extend_from_slice(&head);
        }
        _ => {
            if code_count > u16::MAX as u32 {
                return Err(EncodeError::ValueNotEncodable {
                    what: "code count",
                    value: code_count as i32,
                });
            }
            out.extend_from_slice(&(code_count as u16).to_le_bytes());
            out.extend_from_slice(&BITSTREAM_MAGIC.to_le_bytes());
            out.extend_from_slice(&(header.qscale as u16).to_le_bytes());
            out.extend_from_slice(&header.raw_version.to_le_bytes());
        }
    }
    out.extend_from_slice(&body);
    Ok(out)
}

#[cfg(test)]
#[path = "tests/encoder_tests.rs"]
mod tests;
