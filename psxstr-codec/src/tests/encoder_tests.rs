use super::*;

use psxstr_core::DecodeOptions;

use crate::decoder::decode_frame;
use crate::demux::FrameDemultiplexer;
use crate::header::disambiguation_key;
use crate::lookup::VersionLookupTable;
use crate::sector::{SECTOR_PAYLOAD_SIZE, SECTOR_USER_DATA_SIZE, VIDEO_SECTOR_MAGIC, classify_video_sector};
use crate::variant::Dialect;

fn header_for(variant: CodecVariant, qscale: u8, raw_version: u16) -> BitstreamHeader {
    BitstreamHeader {
        variant,
        code_count: 0,
        qscale,
        dimensions: (variant == CodecVariant::Panekit).then_some((16, 16)),
        raw_version,
        data_start: 0,
    }
}

/// One 16x16 frame (six blocks) exercising table codes, escapes, and
/// per-component DC prediction. All DC steps are multiples of 4, so both
/// DC codings reproduce them exactly.
fn sample_codes(qscale: u8) -> Vec<MdecCode> {
    let dcs = [-128i16, 40, 0, 8, -4, 104];
    let mut codes = Vec::new();
    for (i, &dc) in dcs.iter().enumerate() {
        codes.push(MdecCode::new_dc(qscale, dc));
        if i == 0 {
            codes.push(MdecCode::new(0, 1));
            codes.push(MdecCode::new(2, -1));
            codes.push(MdecCode::new(20, 300));
            codes.push(MdecCode::new(5, -2));
        }
        if i == 3 {
            codes.push(MdecCode::new(63, 1));
        }
        codes.push(MdecCode::END_OF_BLOCK);
    }
    codes
}

fn assert_round_trips(variant: CodecVariant, raw_version: u16, table: Option<&[u32]>) {
    let codes = sample_codes(9);
    let encoded = encode_frame(&header_for(variant, 9, raw_version), &codes).unwrap();
    assert_eq!(encoded.len() % 4, 0);

    let built;
    let table = match table {
        Some(suffixes) => {
            let key = disambiguation_key(&encoded).unwrap();
            let mut blob = (suffixes.len() as u32).to_le_bytes().to_vec();
            for &bit in suffixes {
                blob.extend_from_slice(&((key & !1) | bit).to_le_bytes());
            }
            built = VersionLookupTable::from_bytes(&blob).unwrap();
            Some(&built)
        }
        None => None,
    };

    let parsed = BitstreamHeader::identify(&encoded, table).unwrap();
    assert_eq!(parsed.variant, variant);
    assert_eq!(parsed.qscale, 9);
    assert_eq!(parsed.raw_version, raw_version);

    let decoded = decode_frame(&parsed, &encoded, 16, 16, DecodeOptions::new()).unwrap();
    assert_eq!(decoded, codes, "{}", variant.name());
}

#[test]
fn test_round_trip_v2() {
    assert_round_trips(CodecVariant::V2, 2, None);
}

#[test]
fn test_round_trip_v3() {
    assert_round_trips(CodecVariant::V3, 3, None);
}

#[test]
fn test_round_trip_v2_swapped() {
    assert_round_trips(CodecVariant::V2Swapped, 1, None);
}

#[test]
fn test_round_trip_star_wars_both_dialects() {
    assert_round_trips(CodecVariant::StarWars(Dialect::A), 0xBEEF, Some(&[0]));
    assert_round_trips(CodecVariant::StarWars(Dialect::B), 0xBEEF, Some(&[1]));
}

#[test]
fn test_round_trip_panekit() {
    assert_round_trips(CodecVariant::Panekit, 4, None);
}

#[test]
fn test_header_fields_backfilled() {
    let codes = sample_codes(9);
    let encoded = encode_frame(&header_for(CodecVariant::V2, 9, 2), &codes).unwrap();

    // 6 DC + 5 AC + 6 end-of-block words, halved and rounded up.
    assert_eq!(u16::from_le_bytes([encoded[0], encoded[1]]), 9);
    assert_eq!(u16::from_le_bytes([encoded[2], encoded[3]]), 0x3800);
    assert_eq!(u16::from_le_bytes([encoded[4], encoded[5]]), 9);
    assert_eq!(u16::from_le_bytes([encoded[6], encoded[7]]), 2);
}

#[test]
fn test_swapped_variant_transposes_lead_words() {
    let codes = sample_codes(9);
    let straight = encode_frame(&header_for(CodecVariant::V2, 9, 2), &codes).unwrap();
    let swapped = encode_frame(&header_for(CodecVariant::V2Swapped, 9, 1), &codes).unwrap();

    assert_eq!(swapped[8..10], straight[10..12]);
    assert_eq!(swapped[10..12], straight[8..10]);
    assert_eq!(swapped[12..], straight[12..]);
}

#[test]
fn test_zero_codes_merge_into_following_run() {
    let mut codes = vec![
        MdecCode::new_dc(9, 0),
        MdecCode::new(1, 0),
        MdecCode::new(2, 5),
        MdecCode::END_OF_BLOCK,
    ];
    for _ in 0..5 {
        codes.push(MdecCode::new_dc(9, 0));
        codes.push(MdecCode::END_OF_BLOCK);
    }

    let encoded = encode_frame(&header_for(CodecVariant::V2, 9, 2), &codes).unwrap();
    let parsed = BitstreamHeader::identify(&encoded, None).unwrap();
    let decoded = decode_frame(&parsed, &encoded, 16, 16, DecodeOptions::new()).unwrap();
    assert_eq!(decoded[1], MdecCode::new(4, 5));
}

#[test]
fn test_merged_run_too_long() {
    let codes = vec![
        MdecCode::new_dc(9, 0),
        MdecCode::new(40, 0),
        MdecCode::new(40, 0),
        MdecCode::new(0, 3),
        MdecCode::END_OF_BLOCK,
    ];
    assert!(matches!(
        encode_frame(&header_for(CodecVariant::V2, 9, 2), &codes),
        Err(EncodeError::RunNotEncodable { run: 82 })
    ));
}

#[test]
fn test_malformed_streams_rejected() {
    assert!(matches!(
        encode_frame(&header_for(CodecVariant::V2, 9, 2), &[]),
        Err(EncodeError::MalformedCodeStream { .. })
    ));

    // Quantization scale in the DC word disagrees with the header.
    let codes = vec![MdecCode::new_dc(3, 0), MdecCode::END_OF_BLOCK];
    assert!(matches!(
        encode_frame(&header_for(CodecVariant::V2, 9, 2), &codes),
        Err(EncodeError::MalformedCodeStream { .. })
    ));

    // Missing the final end-of-block.
    let codes = vec![MdecCode::new_dc(9, 0)];
    assert!(matches!(
        encode_frame(&header_for(CodecVariant::V2, 9, 2), &codes),
        Err(EncodeError::MalformedCodeStream { .. })
    ));

    // Self-describing variant without dimensions.
    let mut h = header_for(CodecVariant::Panekit, 9, 0);
    h.dimensions = None;
    assert!(matches!(
        encode_frame(&h, &sample_codes(9)),
        Err(EncodeError::MalformedCodeStream { .. })
    ));
}

fn frame_sector(chunk_index: u16, chunks_in_frame: u16, payload: &[u8]) -> Vec<u8> {
    assert!(payload.len() <= SECTOR_PAYLOAD_SIZE);
    let mut sector = vec![0u8; SECTOR_USER_DATA_SIZE];
    sector[0..4].copy_from_slice(&VIDEO_SECTOR_MAGIC.to_le_bytes());
    sector[4..6].copy_from_slice(&chunk_index.to_le_bytes());
    sector[6..8].copy_from_slice(&chunks_in_frame.to_le_bytes());
    sector[8..12].copy_from_slice(&1u32.to_le_bytes());
    sector[12..16].copy_from_slice(&(payload.len().max(1) as u32).to_le_bytes());
    sector[16..18].copy_from_slice(&16u16.to_le_bytes());
    sector[18..20].copy_from_slice(&16u16.to_le_bytes());
    sector[32..32 + payload.len()].copy_from_slice(payload);
    sector
}

#[test]
fn test_sector_to_bitstream_pipeline() {
    // Encode a frame, spread it over two sectors arriving out of order,
    // and reassemble it back into the identical code stream.
    let codes = sample_codes(9);
    let encoded = encode_frame(&header_for(CodecVariant::V2, 9, 2), &codes).unwrap();

    let sectors = [
        frame_sector(1, 2, &[]),
        frame_sector(0, 2, &encoded),
    ];

    let mut demux = FrameDemultiplexer::new();
    for (number, sector) in sectors.iter().enumerate() {
        let chunk = classify_video_sector(sector, number as u32).unwrap();
        assert!(demux.add_chunk_if_part_of_frame(&chunk));
    }
    assert!(demux.is_complete());
    let (frame, substituted) = demux.finish().unwrap();
    assert_eq!(substituted, 0);
    assert_eq!(frame.bytes.len(), 2 * SECTOR_PAYLOAD_SIZE);

    let parsed = BitstreamHeader::identify(&frame.bytes, None).unwrap();
    assert_eq!(parsed.variant, CodecVariant::V2);
    let decoded = decode_frame(
        &parsed,
        &frame.bytes,
        frame.width,
        frame.height,
        DecodeOptions::new(),
    )
    .unwrap();
    assert_eq!(decoded, codes);
}
