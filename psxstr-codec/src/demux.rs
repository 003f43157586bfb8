//! Frame demultiplexing: reassembling one compressed frame from its
//! interleaved sector chunks.
//!
//! Titles interleave video, audio, and data sectors freely and a few
//! deliver chunks out of order, so the accumulator tracks which chunk
//! indices it has seen rather than assuming arrival order. Some titles
//! also legitimately drop a trailing chunk; `finish` substitutes zero
//! filler for anything missing and reports the substitution count instead
//! of failing.

use psxstr_core::DemuxError;

use crate::sector::SectorChunk;

/// Where one accepted chunk came from, kept for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceChunk {
    pub chunk_index: u16,
    pub sector_number: u32,
    pub payload_len: usize,
}

/// One fully reassembled frame. `bytes` is the concatenation of every
/// chunk's payload in chunk-index order; never mutated after creation.
#[derive(Debug, Clone)]
pub struct DemuxedFrame {
    pub frame_number: i32,
    pub width: u16,
    pub height: u16,
    pub bytes: Vec<u8>,
    pub source_chunks: Vec<SourceChunk>,
}

#[derive(Debug)]
struct InProgress {
    frame_number: i32,
    chunks_in_frame: u16,
    width: u16,
    height: u16,
    payloads: Vec<Option<Vec<u8>>>,
    sources: Vec<SourceChunk>,
    received: u16,
}

/// Accumulates the chunks of a single frame.
///
/// The first accepted chunk fixes the frame identity; later chunks must
/// agree with it or they are rejected without mutation so the caller can
/// route them elsewhere. `finish` consumes the accumulator — one frame
/// per instance.
#[derive(Debug, Default)]
pub struct FrameDemultiplexer {
    inner: Option<InProgress>,
}

impl FrameDemultiplexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept the chunk if it belongs to the frame being accumulated
    /// (or begins one). Returns false, with no state change, otherwise.
    pub fn add_chunk_if_part_of_frame(&mut self, chunk: &SectorChunk<'_>) -> bool {
        match &mut self.inner {
            None => {
                // The classifier normally guarantees consistent geometry,
                // but the first chunk fixes the frame identity, so it gets
                // the same scrutiny later chunks do.
                if chunk.chunks_in_frame == 0 || chunk.chunk_index >= chunk.chunks_in_frame {
                    return false;
                }
                let mut payloads: Vec<Option<Vec<u8>>> =
                    vec![None; chunk.chunks_in_frame as usize];
                payloads[chunk.chunk_index as usize] = Some(chunk.payload.to_vec());
                self.inner = Some(InProgress {
                    frame_number: chunk.frame_number,
                    chunks_in_frame: chunk.chunks_in_frame,
                    width: chunk.width,
                    height: chunk.height,
                    payloads,
                    sources: vec![SourceChunk {
                        chunk_index: chunk.chunk_index,
                        sector_number: chunk.sector_number,
                        payload_len: chunk.payload.len(),
                    }],
                    received: 1,
                });
                true
            }
            Some(frame) => {
                if chunk.frame_number != frame.frame_number
                    || chunk.chunks_in_frame != frame.chunks_in_frame
                    || chunk.width != frame.width
                    || chunk.height != frame.height
                    || chunk.chunk_index >= frame.chunks_in_frame
                    || frame.payloads[chunk.chunk_index as usize].is_some()
                {
                    return false;
                }
                frame.payloads[chunk.chunk_index as usize] = Some(chunk.payload.to_vec());
                frame.sources.push(SourceChunk {
                    chunk_index: chunk.chunk_index,
                    sector_number: chunk.sector_number,
                    payload_len: chunk.payload.len(),
                });
                frame.received += 1;
                true
            }
        }
    }

    /// True once every chunk index `0..chunks_in_frame` has arrived,
    /// regardless of arrival order.
    pub fn is_complete(&self) -> bool {
        self.inner
            .as_ref()
            .is_some_and(|f| f.received == f.chunks_in_frame)
    }

    pub fn frame_number(&self) -> Option<i32> {
        self.inner.as_ref().map(|f| f.frame_number)
    }

    /// Concatenate the accumulated payloads in chunk-index order.
    ///
    /// Missing chunks (other than chunk 0) become zero filler sized like
    /// the lead chunk; the number substituted is returned alongside the
    /// frame so the caller can log it. Chunk 0 itself is required — it is
    /// the only way to learn the frame dimensions.
    pub fn finish(self) -> Result<(DemuxedFrame, usize), DemuxError> {
        let frame = self.inner.ok_or(DemuxError::NoChunks)?;

        if frame.payloads[0].is_none() {
            return Err(DemuxError::MissingLeadChunk {
                frame_number: frame.frame_number,
            });
        }
        let placeholder_len = frame.payloads[0].as_ref().map(|p| p.len()).unwrap_or(0);

        let mut bytes = Vec::with_capacity(placeholder_len * frame.chunks_in_frame as usize);
        let mut substituted = 0usize;
        for payload in &frame.payloads {
            match payload {
                Some(p) => bytes.extend_from_slice(p),
                None => {
                    bytes.resize(bytes.len() + placeholder_len, 0);
                    substituted += 1;
                }
            }
        }

        if substituted > 0 {
            log::debug!(
                "frame {}: {substituted} of {} chunks missing, zero-filled",
                frame.frame_number,
                frame.chunks_in_frame
            );
        }

        let mut source_chunks = frame.sources;
        source_chunks.sort_by_key(|s| s.chunk_index);

        Ok((
            DemuxedFrame {
                frame_number: frame.frame_number,
                width: frame.width,
                height: frame.height,
                bytes,
                source_chunks,
            },
            substituted,
        ))
    }
}

#[cfg(test)]
#[path = "tests/demux_tests.rs"]
mod tests;
