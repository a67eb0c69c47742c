//! Sine test tone.
//!
//! The phase is reduced with integer arithmetic before the `sinf` call, so the
//! result stays exact for arbitrarily large sample indices.

use core::f32::consts::TAU;

use crate::block::SampleBlock;
use crate::constants::{SINE_TEST_AMPLITUDE, SINE_TEST_FREQUENCY};

/// Sine value at running sample `index` for `sample_rate`.
///
/// Returns silence for a zero sample rate.
pub fn sine_sample(index: u32, sample_rate: u32) -> i16 {
    if sample_rate == 0 {
        return 0;
    }
    let rate = u64::from(sample_rate);
    let phase = (u64::from(index) * u64::from(SINE_TEST_FREQUENCY)) % rate;
    let angle = TAU * (phase as f32 / rate as f32);
    let value = libm::roundf(libm::sinf(angle) * SINE_TEST_AMPLITUDE * f32::from(i16::MAX));
    value as i16
}

/// Fill `block` with the sine starting at running index `start`.
pub fn fill_sine(block: &mut SampleBlock, start: u32, sample_rate: u32) {
    block.fill_with(|i| sine_sample(start.wrapping_add(i as u32), sample_rate));
}
