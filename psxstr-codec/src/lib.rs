//! Frame demultiplexing and bitstream codecs for PS1 STR-style video.
//!
//! Movie data on a PS1 disc arrives as interleaved CD sectors, each
//! carrying one chunk of a compressed video frame. This crate reassembles
//! those chunks into frame buffers and converts the per-title compressed
//! bitstreams to and from MDEC run-length code streams:
//!
//! - [`sector`] — typed view over the fixed video sector header
//! - [`demux`] — chunk accumulation into one contiguous frame buffer
//! - [`header`] / [`variant`] / [`lookup`] — per-title bitstream
//!   identification, including the randomized-version-tag titles that need
//!   a precomputed lookup table
//! - [`obfuscate`] — the Panekit 32-byte header scrambling
//! - [`decoder`] / [`encoder`] — the variable-length-code engine
//! - [`rescale`] — macroblock requantization without a decode round trip
//! - [`adpcm`] — SPU-style sound-unit decoding with corrupt-parameter
//!   tolerance (the audio half of the same sector family)
//!
//! The inverse-DCT stage that consumes the decoder's MDEC codes lives
//! outside this crate.

pub mod adpcm;
pub mod decoder;
pub mod demux;
pub mod encoder;
pub mod header;
pub mod lookup;
pub mod obfuscate;
pub mod rescale;
pub mod sector;
pub mod tables;
pub mod variant;

pub use decoder::{FrameDecoder, QuantizationContext, decode_frame};
pub use demux::{DemuxedFrame, FrameDemultiplexer};
pub use encoder::encode_frame;
pub use header::BitstreamHeader;
pub use lookup::VersionLookupTable;
pub use sector::{SectorChunk, classify_video_sector};
pub use variant::{CodecVariant, Dialect};
