//! Fixed-size sample block with byte, 16-bit and 32-bit views.
//!
//! The block stores its data as raw little-endian bytes, exactly as they come
//! off the storage device. The 16-bit and 32-bit views decode from those bytes
//! by explicit slicing, so no view depends on memory-layout aliasing.
//!
//! | View | Unit | Count | Used by |
//! |------|------|-------|---------|
//! | [`as_bytes`](SampleBlock::as_bytes) | `u8` | [`BLOCK_SIZE`] | storage reads |
//! | [`sample`](SampleBlock::sample) | `i16` | [`BLOCK_SAMPLES`] | playback, generators |
//! | [`words`](SampleBlock::words) | `u32` | [`BLOCK_WORDS`] | bulk transfer |

pub mod handoff;

pub use handoff::{Handoff, HandoffError};

use crate::constants::{BLOCK_SAMPLES, BLOCK_SIZE, BLOCK_WORDS};

/// One 2048-byte block of signed 16-bit little-endian PCM.
#[derive(Clone, PartialEq, Eq)]
#[repr(C, align(4))]
pub struct SampleBlock {
    bytes: [u8; BLOCK_SIZE],
}

impl SampleBlock {
    /// Create a block of silence.
    pub const fn zeroed() -> Self {
        SampleBlock {
            bytes: [0u8; BLOCK_SIZE],
        }
    }

    /// Byte view.
    pub fn as_bytes(&self) -> &[u8; BLOCK_SIZE] {
        &self.bytes
    }

    /// Mutable byte view, the target of storage reads.
    pub fn as_bytes_mut(&mut self) -> &mut [u8; BLOCK_SIZE] {
        &mut self.bytes
    }

    /// Read sample `index`, or `None` past the end of the block.
    #[inline]
    pub fn sample(&self, index: usize) -> Option<i16> {
        let start = index.checked_mul(2)?;
        let pair = self.bytes.get(start..start.checked_add(2)?)?;
        Some(i16::from_le_bytes([pair[0], pair[1]]))
    }

    /// Overwrite sample `index`. Writes past the end are ignored.
    #[inline]
    pub fn set_sample(&mut self, index: usize, value: i16) {
        if index < BLOCK_SAMPLES {
            let start = index * 2;
            self.bytes[start..start + 2].copy_from_slice(&value.to_le_bytes());
        }
    }

    /// Iterate over the 16-bit samples in order.
    pub fn samples(&self) -> impl Iterator<Item = i16> + '_ {
        self.bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
    }

    /// Rewrite every sample in place through `f`.
    pub fn map_samples(&mut self, mut f: impl FnMut(i16) -> i16) {
        for pair in self.bytes.chunks_exact_mut(2) {
            let value = f(i16::from_le_bytes([pair[0], pair[1]]));
            pair.copy_from_slice(&value.to_le_bytes());
        }
    }

    /// Fill every sample from `f(index)`.
    pub fn fill_with(&mut self, mut f: impl FnMut(usize) -> i16) {
        for (i, pair) in self.bytes.chunks_exact_mut(2).enumerate() {
            pair.copy_from_slice(&f(i).to_le_bytes());
        }
    }

    /// Iterate over the block as little-endian 32-bit words.
    pub fn words(&self) -> impl Iterator<Item = u32> + '_ {
        self.bytes
            .chunks_exact(4)
            .map(|w| u32::from_le_bytes([w[0], w[1], w[2], w[3]]))
    }

    /// Copy 32-bit words into the block, up to [`BLOCK_WORDS`].
    pub fn copy_from_words(&mut self, words: &[u32]) {
        for (dst, word) in self.bytes.chunks_exact_mut(4).zip(words.iter().take(BLOCK_WORDS)) {
            dst.copy_from_slice(&word.to_le_bytes());
        }
    }

    /// Zero bytes from `from` to the end of the block.
    pub fn zero_from(&mut self, from: usize) {
        if let Some(tail) = self.bytes.get_mut(from..) {
            tail.fill(0);
        }
    }

    /// Zero the whole block.
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }
}

impl Default for SampleBlock {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl core::fmt::Debug for SampleBlock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SampleBlock")
            .field("first", &self.sample(0))
            .field("last", &self.sample(BLOCK_SAMPLES - 1))
            .finish()
    }
}
