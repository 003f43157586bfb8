//! SPU-style ADPCM sound-unit decoding.
//!
//! Audio sectors in the same stream family carry 16-byte sound units: a
//! parameter byte (shift in the low nibble, filter index in the high
//! nibble), a flags byte, and 14 data bytes holding 28 4-bit samples,
//! low nibble first. Each sample is the shifted nibble plus a two-tap
//! prediction from the previous two output samples.
//!
//! Corrupt parameter bytes show up on real discs. Out-of-range values are
//! clamped to the nearest valid parameter and reported rather than
//! aborting the unit; the result is audible noise instead of silence,
//! matching what the console itself produces.

use std::fmt;

/// Bytes per sound unit.
pub const SOUND_UNIT_SIZE: usize = 16;

/// PCM samples produced per sound unit.
pub const SOUND_UNIT_SAMPLES: usize = 28;

/// Prediction filter taps, indexed by the filter field.
const FILTER_TABLE: [(i32, i32); 5] = [(0, 0), (60, 0), (115, -52), (98, -55), (122, -60)];

const MAX_FILTER: u8 = 4;
const MAX_SHIFT: u8 = 12;

/// Report of an out-of-range parameter byte and the values actually used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterClamp {
    pub filter: u8,
    pub shift: u8,
    pub effective_filter: u8,
    pub effective_shift: u8,
}

impl fmt::Display for ParameterClamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sound parameters out of range (filter {}, shift {}); clamped to filter {}, shift {}",
            self.filter, self.shift, self.effective_filter, self.effective_shift
        )
    }
}

/// Streaming decoder; the two-sample prediction history carries across
/// consecutive sound units of one channel.
#[derive(Debug, Clone, Default)]
pub struct SpuAdpcmDecoder {
    prev1: i32,
    prev2: i32,
}

impl SpuAdpcmDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the prediction history, e.g. at a channel switch.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Decode one sound unit into 28 PCM samples.
    ///
    /// A clamp report accompanies the samples when the parameter byte was
    /// out of range; it is also logged, so callers that do not inspect it
    /// still leave a trace.
    pub fn decode_sound_unit(
        &mut self,
        unit: &[u8; SOUND_UNIT_SIZE],
    ) -> ([i16; SOUND_UNIT_SAMPLES], Option<ParameterClamp>) {
        let shift = unit[0] & 0x0F;
        let filter = unit[0] >> 4;
        // unit[1] holds loop flags, which only matter for SPU voice
        // control, not for sample reconstruction.

        let effective_filter = filter.min(MAX_FILTER);
        let effective_shift = shift.min(MAX_SHIFT);
        let clamp = (filter > MAX_FILTER || shift > MAX_SHIFT).then(|| {
            let clamp = ParameterClamp {
                filter,
                shift,
                effective_filter,
                effective_shift,
            };
            log::warn!("{clamp}");
            clamp
        });

        let (k0, k1) = FILTER_TABLE[effective_filter as usize];
        let mut samples = [0i16; SOUND_UNIT_SAMPLES];
        for (i, sample) in samples.iter_mut().enumerate() {
            let byte = unit[2 + i / 2];
            let nibble = if i % 2 == 0 { byte & 0x0F } else { byte >> 4 };
            // Sign-extend the nibble to 16 bits, then shift down.
            let raw = (((nibble as i16) << 12) >> effective_shift) as i32;
            let predicted = (k0 * self.prev1 + k1 * self.prev2 + 32) >> 6;
            let value = (raw + predicted).clamp(i16::MIN as i32, i16::MAX as i32);
            *sample = value as i16;
            self.prev2 = self.prev1;
            self.prev1 = value;
        }
        (samples, clamp)
    }
}

#[cfg(test)]
#[path = "tests/adpcm_tests.rs"]
mod tests;
