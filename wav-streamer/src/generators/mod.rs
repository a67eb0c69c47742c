//! Synthetic test-signal generators.
//!
//! Each generator is a pure function of the running sample index (and, for the
//! sine, the sample rate), so a block generated twice from the same inputs is
//! bit-identical.
//!
//! | Generator | Shape | Period |
//! |-----------|-------|--------|
//! | [`ramp`] | sawtooth, full signed range | one block (1024 samples) |
//! | [`sine`] | 440 Hz sine at 0.8 full scale | `sample_rate / 440` samples |

pub mod ramp;
pub mod sine;

pub use ramp::{fill_ramp, ramp_sample};
pub use sine::{fill_sine, sine_sample};
