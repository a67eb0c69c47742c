//! Sample arithmetic: volume scaling and DAC format conversion.

pub mod convert;

pub use convert::{apply_volume, convert_sample, sanitize_volume, scale_sample, to_dac};
