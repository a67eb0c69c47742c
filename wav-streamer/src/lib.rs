//! # wav-streamer
//!
//! A `no_std`, zero-allocation driver that streams 16-bit PCM audio to a
//! dual-channel serial DAC, one sample per hardware timer interrupt. Samples
//! come from WAV files on block storage or from built-in test generators.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Memory | [`block`] | 2048-byte sample blocks and the two-block lock-free handoff |
//! | Format | [`wav`] | 44-byte RIFF/WAVE header parsing |
//! | DSP | [`dsp`] / [`generators`] | Volume, DAC conversion, ramp and sine test signals |
//! | Sources | [`source`] | File, ramp and sine block producers |
//! | I/O | [`io`] | Storage, timer, DAC and listener traits; SPI DAC driver |
//! | Engine | [`engine`] | State shared by the background loop and the interrupt |
//! | Control | [`streamer`] / [`isr`] | Lifecycle state machine and interrupt entry points |
//!
//! ## Quick start
//!
//! ```ignore
//! use wav_streamer::{InterruptPriority, SourceKind, SpiDac, StreamEngine, StreamIsr, WavStreamer};
//!
//! static ENGINE: StreamEngine = StreamEngine::new();
//!
//! let mut streamer = WavStreamer::new(&ENGINE, sd_card, timer, ());
//! let mut isr = StreamIsr::new(&ENGINE, SpiDac::new(spi, left_cs, right_cs));
//! streamer.set_volume(0.8);
//! streamer.start(InterruptPriority::new(1, 0), SourceKind::Storage, "SONG.WAV")?;
//!
//! // Background loop:
//! loop {
//!     streamer.periodic()?;
//! }
//!
//! // Sample timer interrupt:
//! isr.on_sample().ok();
//!
//! // 1 Hz interrupt:
//! isr.on_second();
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `defmt` | no | Lifecycle and refill logging via `defmt` |
//!
//! ## Stream parameters
//!
//! - **Block size:** 2048 bytes, 1024 samples ([`constants::BLOCK_SAMPLES`])
//! - **Sample format:** `i16` little-endian, mono or interleaved stereo
//! - **Interrupt rate:** sample rate × channels; [`constants::TEST_SAMPLE_RATE`]
//!   for the test generators
//! - **DAC format:** unsigned 16-bit centred at 0x8000

#![cfg_attr(not(test), no_std)]

pub mod constants;
pub mod block;
pub mod wav;
pub mod dsp;
pub mod generators;
pub mod source;
pub mod io;
pub mod engine;
pub mod streamer;
pub mod isr;

pub use block::{Handoff, HandoffError, SampleBlock};
pub use engine::StreamEngine;
pub use io::{
    ChannelSelect, DacError, DacOutput, EventListener, InterruptPriority, SampleTimer, SpiDac,
    Storage,
};
pub use isr::{NoTestPin, StreamIsr};
pub use source::SourceKind;
pub use streamer::{StreamError, StreamState, WavStreamer};
pub use wav::{HeaderError, WavHeader};

#[cfg(test)]
mod testing;
