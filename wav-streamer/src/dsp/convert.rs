//! Volume scaling and signed-to-DAC sample conversion.
//!
//! The output stage expects unsigned full-scale input centred at 0x8000:
//!
//! ```text
//! dac = clamp(round(sample * volume), -32768, 32767) + 32768
//! ```
//!
//! The producer applies the volume half of the formula to a whole block in
//! [`apply_volume`]; the interrupt applies the offset half per sample in
//! [`to_dac`], which is a single XOR.

use crate::block::SampleBlock;
use crate::constants::MSB_OFFSET;

/// Saturate an `i32` to `i16` range (`-32768..=32767`).
///
/// Maps to ARM `SSAT #16`.
#[inline(always)]
pub fn saturate16(val: i32) -> i16 {
    #[cfg(all(target_arch = "arm", target_feature = "dsp"))]
    {
        let out: i32;
        // SAFETY: `ssat` only reads and writes the named registers.
        unsafe {
            core::arch::asm!(
                "ssat {out}, #16, {val}",
                out = out(reg) out,
                val = in(reg) val,
                options(pure, nomem, nostack),
            );
        }
        out as i16
    }
    #[cfg(not(all(target_arch = "arm", target_feature = "dsp")))]
    {
        val.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
    }
}

/// Coerce a requested volume to a usable multiplier.
///
/// Negative and NaN values become 0.0 (silence). There is no upper bound;
/// values above 1.0 may clip.
#[inline]
pub fn sanitize_volume(volume: f32) -> f32 {
    if volume.is_nan() || volume < 0.0 {
        0.0
    } else {
        volume
    }
}

/// Scale one sample: `clamp(round(sample * volume), -32768, 32767)`.
///
/// The product is formed in `f64`, where a 16-bit by 24-bit multiply is
/// exact, so rounding matches the formula at every half-way point.
#[inline]
pub fn scale_sample(sample: i16, volume: f32) -> i16 {
    // `as i32` saturates for products beyond the i32 range (and infinities).
    saturate16(libm::round(f64::from(sample) * f64::from(volume)) as i32)
}

/// Shift a signed sample to the unsigned DAC range.
#[inline(always)]
pub fn to_dac(sample: i16) -> u16 {
    (sample as u16) ^ MSB_OFFSET
}

/// The full conversion for one sample.
#[inline]
pub fn convert_sample(sample: i16, volume: f32) -> u16 {
    to_dac(scale_sample(sample, volume))
}

/// Apply `volume` to every sample of `block` in place.
///
/// Unity volume leaves the block untouched.
pub fn apply_volume(block: &mut SampleBlock, volume: f32) {
    let volume = sanitize_volume(volume);
    if volume == 1.0 {
        return;
    }
    if volume == 0.0 {
        block.clear();
        return;
    }
    block.map_samples(|s| scale_sample(s, volume));
}
