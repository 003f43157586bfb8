use super::*;

fn chunk(chunk_index: u16, chunks_in_frame: u16, frame_number: i32, payload: &[u8]) -> SectorChunk<'_> {
    SectorChunk {
        chunk_index,
        chunks_in_frame,
        frame_number,
        sector_number: 100 + chunk_index as u32,
        width: 320,
        height: 240,
        payload,
    }
}

#[test]
fn test_chunks_arriving_out_of_order() {
    // Arrival order 2, 0, 1 must still produce payloads in index order.
    let mut demux = FrameDemultiplexer::new();
    assert!(demux.add_chunk_if_part_of_frame(&chunk(2, 3, 9, &[3, 3])));
    assert!(!demux.is_complete());
    assert!(demux.add_chunk_if_part_of_frame(&chunk(0, 3, 9, &[1, 1])));
    assert!(demux.add_chunk_if_part_of_frame(&chunk(1, 3, 9, &[2, 2])));
    assert!(demux.is_complete());
    assert_eq!(demux.frame_number(), Some(9));

    let (frame, substituted) = demux.finish().unwrap();
    assert_eq!(substituted, 0);
    assert_eq!(frame.frame_number, 9);
    assert_eq!(frame.width, 320);
    assert_eq!(frame.height, 240);
    assert_eq!(frame.bytes, vec![1, 1, 2, 2, 3, 3]);
    let indices: Vec<u16> = frame.source_chunks.iter().map(|s| s.chunk_index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
}

#[test]
fn test_every_arrival_order_gives_identical_bytes() {
    let payloads: [&[u8]; 3] = [&[10, 11], &[20, 21], &[30, 31]];
    let orders = [
        [0u16, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ];
    for order in orders {
        let mut demux = FrameDemultiplexer::new();
        for index in order {
            assert!(demux.add_chunk_if_part_of_frame(&chunk(index, 3, 1, payloads[index as usize])));
        }
        let (frame, _) = demux.finish().unwrap();
        assert_eq!(frame.bytes, vec![10, 11, 20, 21, 30, 31], "order {order:?}");
    }
}

#[test]
fn test_foreign_chunks_rejected_without_state_change() {
    let mut demux = FrameDemultiplexer::new();
    assert!(demux.add_chunk_if_part_of_frame(&chunk(0, 2, 5, &[1])));

    // Wrong frame number.
    assert!(!demux.add_chunk_if_part_of_frame(&chunk(1, 2, 6, &[2])));
    // Wrong chunk count.
    assert!(!demux.add_chunk_if_part_of_frame(&chunk(1, 3, 5, &[2])));
    // Wrong dimensions.
    let mut wrong = chunk(1, 2, 5, &[2]);
    wrong.width = 640;
    assert!(!demux.add_chunk_if_part_of_frame(&wrong));
    // Duplicate index.
    assert!(!demux.add_chunk_if_part_of_frame(&chunk(0, 2, 5, &[9])));

    // The frame is still assemblable afterwards.
    assert!(demux.add_chunk_if_part_of_frame(&chunk(1, 2, 5, &[2])));
    let (frame, substituted) = demux.finish().unwrap();
    assert_eq!(substituted, 0);
    assert_eq!(frame.bytes, vec![1, 2]);
}

#[test]
fn test_missing_trailing_chunk_zero_filled() {
    let mut demux = FrameDemultiplexer::new();
    assert!(demux.add_chunk_if_part_of_frame(&chunk(0, 3, 2, &[7, 8, 9])));
    assert!(demux.add_chunk_if_part_of_frame(&chunk(2, 3, 2, &[4, 5, 6])));
    assert!(!demux.is_complete());

    let (frame, substituted) = demux.finish().unwrap();
    assert_eq!(substituted, 1);
    // The filler takes the lead chunk's size.
    assert_eq!(frame.bytes, vec![7, 8, 9, 0, 0, 0, 4, 5, 6]);
    assert_eq!(frame.source_chunks.len(), 2);
}

#[test]
fn test_missing_lead_chunk_is_fatal() {
    let mut demux = FrameDemultiplexer::new();
    assert!(demux.add_chunk_if_part_of_frame(&chunk(1, 2, 3, &[1])));
    assert!(matches!(
        demux.finish(),
        Err(DemuxError::MissingLeadChunk { frame_number: 3 })
    ));
}

#[test]
fn test_finish_without_chunks() {
    assert!(matches!(
        FrameDemultiplexer::new().finish(),
        Err(DemuxError::NoChunks)
    ));
}

#[test]
fn test_first_chunk_with_inconsistent_geometry_rejected() {
    let mut demux = FrameDemultiplexer::new();
    // Index past its own declared count.
    assert!(!demux.add_chunk_if_part_of_frame(&chunk(3, 3, 1, &[1])));
    // Zero chunks declared.
    assert!(!demux.add_chunk_if_part_of_frame(&chunk(0, 0, 1, &[1])));

    // The rejected chunks created no frame state.
    assert_eq!(demux.frame_number(), None);
    assert!(matches!(demux.finish(), Err(DemuxError::NoChunks)));
}

#[test]
fn test_single_chunk_frame() {
    let mut demux = FrameDemultiplexer::new();
    assert!(demux.add_chunk_if_part_of_frame(&chunk(0, 1, 1, &[42])));
    assert!(demux.is_complete());
    let (frame, substituted) = demux.finish().unwrap();
    assert_eq!(substituted, 0);
    assert_eq!(frame.bytes, vec![42]);
}
