//! Property tests for volume scaling and DAC conversion.

use wav_streamer::block::SampleBlock;
use wav_streamer::dsp::{apply_volume, convert_sample, scale_sample, to_dac};

proptest::proptest! {
    /// Conversion matches `clamp(round(s * v), -32768, 32767) + 32768` exactly.
    #[test]
    fn conversion_matches_formula(s in i16::MIN..=i16::MAX, v in 0.0f32..4.0) {
        let expected = (f64::from(s) * f64::from(v))
            .round()
            .clamp(-32768.0, 32767.0) as i32
            + 32768;
        assert_eq!(i32::from(convert_sample(s, v)), expected, "s={} v={}", s, v);
    }

    /// Any volume, including NaN and infinities, converts without panicking;
    /// unusable volumes mute.
    #[test]
    fn conversion_never_panics(s in i16::MIN..=i16::MAX, v in proptest::num::f32::ANY) {
        let out = convert_sample(s, v);
        if v.is_nan() || v < 0.0 {
            assert_eq!(out, 0x8000);
        }
    }

    /// Negative volumes mute.
    #[test]
    fn negative_volume_is_silence(s in i16::MIN..=i16::MAX, v in -1000.0f32..-0.0001) {
        assert_eq!(convert_sample(s, v), 0x8000);
    }

    /// Unity volume is a pure offset.
    #[test]
    fn unity_volume_is_offset_only(s in i16::MIN..=i16::MAX) {
        assert_eq!(scale_sample(s, 1.0), s);
        assert_eq!(i32::from(to_dac(s)), i32::from(s) + 32768);
    }

    /// Scaling never increases magnitude at or below unity.
    #[test]
    fn attenuation_never_grows(s in i16::MIN..=i16::MAX, v in 0.0f32..=1.0) {
        let scaled = scale_sample(s, v);
        assert!(i32::from(scaled).abs() <= i32::from(s).abs());
    }

    /// Block scaling agrees with per-sample scaling.
    #[test]
    fn block_volume_matches_per_sample(seed in i16::MIN..=i16::MAX, v in 0.0f32..3.0) {
        let mut block = SampleBlock::zeroed();
        block.fill_with(|i| seed.wrapping_add(i as i16));
        let original = block.clone();
        apply_volume(&mut block, v);
        for (a, b) in original.samples().zip(block.samples()) {
            assert_eq!(scale_sample(a, v), b);
        }
    }
}
