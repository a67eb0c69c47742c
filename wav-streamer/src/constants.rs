/// Size of one sample block in bytes (one storage read).
pub const BLOCK_SIZE: usize = 2048;

/// Number of signed 16-bit samples per block.
pub const BLOCK_SAMPLES: usize = BLOCK_SIZE / 2;

/// Number of 32-bit words per block.
pub const BLOCK_WORDS: usize = BLOCK_SIZE / 4;

/// Offset added to a signed sample to centre it on the DAC midpoint.
pub const MSB_OFFSET: u16 = 0xFFFF / 2 + 1;

/// Length of the canonical RIFF/WAVE header.
pub const WAV_HEADER_LEN: usize = 44;

/// Sample rate used by the synthetic test sources.
pub const TEST_SAMPLE_RATE: u32 = 44_100;

/// Per-sample increment of the ramp generator. One period spans one block.
pub const RAMP_STEP: u16 = (65_536 / BLOCK_SAMPLES) as u16;

/// Frequency of the sine test tone in Hz.
pub const SINE_TEST_FREQUENCY: u32 = 440;

/// Amplitude of the sine test tone relative to full scale.
pub const SINE_TEST_AMPLITUDE: f32 = 0.8;
