//! Canonical 44-byte RIFF/WAVE header.
//!
//! ```text
//! offset  size  field
//!  0      4     "RIFF"
//!  4      4     chunk size
//!  8      4     "WAVE"
//! 12      4     "fmt "
//! 16      4     fmt chunk size
//! 20      2     audio format (1 = PCM)
//! 22      2     channel count
//! 24      4     sample rate
//! 28      4     bytes per second
//! 32      2     block align
//! 34      2     bits per sample
//! 36      4     "data"
//! 40      4     data length in bytes
//! ```
//!
//! All multi-byte fields are little-endian. Only 16-bit mono or stereo PCM is
//! accepted.

use crate::constants::WAV_HEADER_LEN;

/// `RIFF` chunk tag.
pub const RIFF_TAG: [u8; 4] = *b"RIFF";
/// `WAVE` form type.
pub const WAVE_TAG: [u8; 4] = *b"WAVE";
/// Uncompressed PCM format tag.
pub const FORMAT_PCM: u16 = 1;

/// Reasons a header is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HeaderError {
    /// Fewer than 44 bytes were available.
    #[error("header truncated: {len} of 44 bytes")]
    Truncated {
        /// Bytes actually available.
        len: usize,
    },
    /// The leading tag is not `RIFF`.
    #[error("missing RIFF tag")]
    BadRiffTag,
    /// The form type is not `WAVE`.
    #[error("missing WAVE tag")]
    BadWaveTag,
    /// The format tag is not uncompressed PCM.
    #[error("format tag {0} is not PCM")]
    NotPcm(u16),
    /// Only 16-bit samples are supported.
    #[error("{0} bits per sample, expected 16")]
    UnsupportedBitDepth(u16),
    /// Only mono and stereo are supported.
    #[error("{0} channels, expected 1 or 2")]
    UnsupportedChannels(u16),
    /// A sample rate of zero cannot clock the timer.
    #[error("sample rate is zero")]
    InvalidSampleRate,
}

/// A validated WAV header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WavHeader {
    /// RIFF chunk size (file length minus 8).
    pub chunk_size: u32,
    /// Format tag, always [`FORMAT_PCM`] after validation.
    pub audio_format: u16,
    /// Channel count, 1 or 2.
    pub channels: u16,
    /// Frames per second.
    pub sample_rate: u32,
    /// Declared byte rate.
    pub bytes_per_sec: u32,
    /// Bytes per frame (2 for mono, 4 for stereo).
    pub block_align: u16,
    /// Always 16 after validation.
    pub bits_per_sample: u16,
    /// Length of the sample data in bytes.
    pub data_len: u32,
}

#[inline]
fn le_u16(bytes: &[u8; WAV_HEADER_LEN], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

#[inline]
fn le_u32(bytes: &[u8; WAV_HEADER_LEN], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

impl WavHeader {
    /// Parse and validate the leading bytes of a WAV file.
    ///
    /// Bytes past the first 44 are ignored.
    ///
    /// # Errors
    ///
    /// Returns the first [`HeaderError`] found, checking fields in file order.
    pub fn parse(bytes: &[u8]) -> Result<Self, HeaderError> {
        let raw: &[u8; WAV_HEADER_LEN] = bytes
            .get(..WAV_HEADER_LEN)
            .and_then(|b| b.try_into().ok())
            .ok_or(HeaderError::Truncated { len: bytes.len() })?;

        if raw[0..4] != RIFF_TAG {
            return Err(HeaderError::BadRiffTag);
        }
        if raw[8..12] != WAVE_TAG {
            return Err(HeaderError::BadWaveTag);
        }

        let header = WavHeader {
            chunk_size: le_u32(raw, 4),
            audio_format: le_u16(raw, 20),
            channels: le_u16(raw, 22),
            sample_rate: le_u32(raw, 24),
            bytes_per_sec: le_u32(raw, 28),
            block_align: le_u16(raw, 32),
            bits_per_sample: le_u16(raw, 34),
            data_len: le_u32(raw, 40),
        };

        if header.audio_format != FORMAT_PCM {
            return Err(HeaderError::NotPcm(header.audio_format));
        }
        if !matches!(header.channels, 1 | 2) {
            return Err(HeaderError::UnsupportedChannels(header.channels));
        }
        if header.sample_rate == 0 {
            return Err(HeaderError::InvalidSampleRate);
        }
        if header.bits_per_sample != 16 {
            return Err(HeaderError::UnsupportedBitDepth(header.bits_per_sample));
        }

        Ok(header)
    }

    /// Whether the file carries interleaved left/right samples.
    pub fn is_stereo(&self) -> bool {
        self.channels == 2
    }

    /// Data-chunk length to play, or `None` when the header leaves it open
    /// (0 or `u32::MAX`, as written by streaming recorders).
    pub fn bounded_data_len(&self) -> Option<u32> {
        match self.data_len {
            0 | u32::MAX => None,
            len => Some(len),
        }
    }

    /// Number of frames in the data chunk, if bounded.
    pub fn frames(&self) -> Option<u32> {
        let frame_bytes = u32::from(self.channels) * 2;
        self.bounded_data_len().map(|len| len / frame_bytes)
    }

    /// Timer interrupt rate: one interrupt per sample per channel.
    pub fn interrupt_rate(&self) -> u32 {
        self.sample_rate.saturating_mul(u32::from(self.channels))
    }

    /// Serialize back into the canonical 44-byte layout.
    pub fn to_bytes(&self) -> [u8; WAV_HEADER_LEN] {
        let mut out = [0u8; WAV_HEADER_LEN];
        out[0..4].copy_from_slice(&RIFF_TAG);
        out[4..8].copy_from_slice(&self.chunk_size.to_le_bytes());
        out[8..12].copy_from_slice(&WAVE_TAG);
        out[12..16].copy_from_slice(b"fmt ");
        out[16..20].copy_from_slice(&16u32.to_le_bytes());
        out[20..22].copy_from_slice(&self.audio_format.to_le_bytes());
        out[22..24].copy_from_slice(&self.channels.to_le_bytes());
        out[24..28].copy_from_slice(&self.sample_rate.to_le_bytes());
        out[28..32].copy_from_slice(&self.bytes_per_sec.to_le_bytes());
        out[32..34].copy_from_slice(&self.block_align.to_le_bytes());
        out[34..36].copy_from_slice(&self.bits_per_sample.to_le_bytes());
        out[36..40].copy_from_slice(b"data");
        out[40..44].copy_from_slice(&self.data_len.to_le_bytes());
        out
    }

    /// A 16-bit PCM header for `channels` at `sample_rate` with `data_len`
    /// bytes of samples.
    pub fn pcm16(channels: u16, sample_rate: u32, data_len: u32) -> Self {
        let block_align = channels.saturating_mul(2);
        WavHeader {
            chunk_size: data_len.saturating_add(36),
            audio_format: FORMAT_PCM,
            channels,
            sample_rate,
            bytes_per_sec: sample_rate.saturating_mul(u32::from(block_align)),
            block_align,
            bits_per_sample: 16,
            data_len,
        }
    }
}
