//! Sawtooth test signal.

use crate::block::SampleBlock;
use crate::constants::RAMP_STEP;

/// Ramp value at running sample `index`.
///
/// Starts at `i16::MIN`, rises by [`RAMP_STEP`] per sample and wraps back to
/// `i16::MIN` after passing `i16::MAX`.
#[inline]
pub fn ramp_sample(index: u32) -> i16 {
    let phase = (index as u16).wrapping_mul(RAMP_STEP);
    (phase ^ 0x8000) as i16
}

/// Fill `block` with the ramp starting at running index `start`.
pub fn fill_ramp(block: &mut SampleBlock, start: u32) {
    block.fill_with(|i| ramp_sample(start.wrapping_add(i as u32)));
}
