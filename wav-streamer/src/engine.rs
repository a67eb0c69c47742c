//! Streaming engine: the state shared between the background producer and
//! the sample interrupt.
//!
//! The engine is meant to live in a `static` so both contexts can reach it:
//!
//! ```ignore
//! static ENGINE: StreamEngine = StreamEngine::new();
//!
//! // background
//! let mut streamer = WavStreamer::new(&ENGINE, storage, timer, listener);
//!
//! // sample interrupt
//! let mut isr = StreamIsr::new(&ENGINE, dac);
//! isr.on_sample();
//! ```
//!
//! All fields are atomics. Each is written by exactly one context:
//!
//! | Field | Writer |
//! |-------|--------|
//! | handoff cursor, counters, hand-back | interrupt |
//! | block contents, publication | background |
//! | `claimed`, `streaming`, `stereo`, `volume` | background |
//! | `elapsed` | 1 Hz tick; zeroed by background while disarmed |

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::block::{Handoff, HandoffError};
use crate::constants::MSB_OFFSET;
use crate::dsp::{apply_volume, sanitize_volume, to_dac};
use crate::io::output::{ChannelSelect, DacOutput};
use crate::source::{BlockFill, BlockSource};

/// Bit pattern of `1.0f32`.
const UNITY_VOLUME_BITS: u32 = 0x3F80_0000;

/// Shared streaming state. See the module docs.
pub struct StreamEngine {
    handoff: Handoff,
    /// Held by the one streamer with a session open.
    claimed: AtomicBool,
    streaming: AtomicBool,
    stereo: AtomicBool,
    volume: AtomicU32,
    elapsed: AtomicU32,
}

impl StreamEngine {
    /// Idle engine at unity volume.
    pub const fn new() -> Self {
        StreamEngine {
            handoff: Handoff::new(),
            claimed: AtomicBool::new(false),
            streaming: AtomicBool::new(false),
            stereo: AtomicBool::new(false),
            volume: AtomicU32::new(UNITY_VOLUME_BITS),
            elapsed: AtomicU32::new(0),
        }
    }

    // ── Producer side ──────────────────────────────────────────────────

    /// Fill block `target` from `source`, apply the volume and publish it.
    ///
    /// # Errors
    ///
    /// [`HandoffError`] if `target` is published or out of range. The source
    /// is not advanced in that case.
    pub fn refill(
        &self,
        target: usize,
        source: &mut impl BlockSource,
    ) -> Result<BlockFill, HandoffError> {
        let volume = self.volume();
        self.handoff.fill(target, |block| {
            let fill = source.fill_block(block);
            apply_volume(block, volume);
            fill
        })
    }

    /// The handoff, for the producer's scheduling decisions.
    pub fn handoff(&self) -> &Handoff {
        &self.handoff
    }

    /// Take the engine for a new session. Fails if another session holds it.
    pub(crate) fn claim(&self) -> bool {
        self.claimed
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    pub(crate) fn release(&self) {
        self.claimed.store(false, Ordering::Release);
    }

    pub(crate) fn arm(&self, stereo: bool) {
        self.stereo.store(stereo, Ordering::Relaxed);
        self.elapsed.store(0, Ordering::Relaxed);
        self.streaming.store(true, Ordering::Release);
    }

    /// Stop the consumer. Later interrupts emit nothing.
    pub(crate) fn disarm(&self) {
        self.streaming.store(false, Ordering::Release);
    }

    /// Return both blocks to the producer and zero the cursor and counters.
    pub(crate) fn reset(&self) {
        self.handoff.reset();
        self.stereo.store(false, Ordering::Relaxed);
        self.elapsed.store(0, Ordering::Relaxed);
    }

    /// Set the playback volume. Takes effect from the next refilled block.
    ///
    /// Negative and NaN values mute; values above 1.0 amplify and may clip.
    pub fn set_volume(&self, volume: f32) {
        self.volume
            .store(sanitize_volume(volume).to_bits(), Ordering::Relaxed);
    }

    // ── Consumer side ──────────────────────────────────────────────────

    /// Emit one sample to `dac` (interrupt side).
    ///
    /// Writes the midpoint to both channels when the active block is not
    /// ready. O(1), never blocks.
    #[inline]
    pub fn output_next_sample<D: DacOutput + ?Sized>(&self, dac: &mut D) -> Result<(), D::Error> {
        let stereo = self.stereo.load(Ordering::Relaxed);
        match self.handoff.next_sample() {
            Some(s) => dac.write(ChannelSelect::for_offset(s.offset, stereo), to_dac(s.value)),
            // Silence both channels so neither holds its last sample.
            None => dac.write(ChannelSelect::Both, MSB_OFFSET),
        }
    }

    /// Count one second of playback.
    #[inline]
    pub fn tick_second(&self) {
        if self.is_streaming() {
            self.elapsed.fetch_add(1, Ordering::Relaxed);
        }
    }

    // ── Status ─────────────────────────────────────────────────────────

    /// Whether the interrupt should emit samples.
    #[inline]
    pub fn is_streaming(&self) -> bool {
        self.streaming.load(Ordering::Acquire)
    }

    /// Whether the armed stream is interleaved stereo.
    pub fn is_stereo(&self) -> bool {
        self.stereo.load(Ordering::Relaxed)
    }

    /// Current volume multiplier.
    pub fn volume(&self) -> f32 {
        f32::from_bits(self.volume.load(Ordering::Relaxed))
    }

    /// Samples emitted since the stream started.
    pub fn samples_played(&self) -> u32 {
        self.handoff.total_samples()
    }

    /// Interrupts that found no ready block.
    pub fn underruns(&self) -> u32 {
        self.handoff.underruns()
    }

    /// Seconds counted by [`tick_second`](Self::tick_second) since the
    /// stream started.
    pub fn elapsed_seconds(&self) -> u32 {
        self.elapsed.load(Ordering::Relaxed)
    }
}

impl Default for StreamEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::BLOCK_SAMPLES;
    use crate::source::RampSource;
    use crate::testing::RecordingDac;

    struct Constant(i16);

    impl BlockSource for Constant {
        fn fill_block(&mut self, block: &mut crate::block::SampleBlock) -> BlockFill {
            block.fill_with(|_| self.0);
            BlockFill::Full
        }
    }

    #[test]
    fn starts_idle_at_unity_volume() {
        let engine = StreamEngine::new();
        assert!(!engine.is_streaming());
        assert_eq!(engine.volume(), 1.0);
    }

    #[test]
    fn refill_applies_volume_before_publishing() {
        let engine = StreamEngine::new();
        engine.set_volume(0.5);
        engine.refill(0, &mut Constant(1000)).unwrap();
        engine.arm(false);

        let mut dac = RecordingDac::default();
        engine.output_next_sample(&mut dac).unwrap();
        assert_eq!(dac.writes, [(ChannelSelect::Both, 0x8000 + 500)]);
    }

    #[test]
    fn refill_of_published_block_leaves_source_untouched() {
        let engine = StreamEngine::new();
        let mut ramp = RampSource::new();
        engine.refill(0, &mut ramp).unwrap();
        assert_eq!(engine.refill(0, &mut ramp), Err(HandoffError::BufferBusy));
        // The ramp continues at the second block, not the third.
        engine.refill(1, &mut ramp).unwrap();
        engine.arm(false);
        let mut dac = RecordingDac::default();
        for _ in 0..BLOCK_SAMPLES + 1 {
            engine.output_next_sample(&mut dac).unwrap();
        }
        assert_eq!(dac.writes[BLOCK_SAMPLES].1, 0);
    }

    #[test]
    fn invalid_volumes_mute() {
        let engine = StreamEngine::new();
        engine.set_volume(f32::NAN);
        assert_eq!(engine.volume(), 0.0);
        engine.set_volume(-1.0);
        assert_eq!(engine.volume(), 0.0);
        engine.set_volume(2.5);
        assert_eq!(engine.volume(), 2.5);
    }

    #[test]
    fn stereo_alternates_channels() {
        let engine = StreamEngine::new();
        engine.refill(0, &mut Constant(0)).unwrap();
        engine.arm(true);
        let mut dac = RecordingDac::default();
        for _ in 0..4 {
            engine.output_next_sample(&mut dac).unwrap();
        }
        let channels: Vec<_> = dac.writes.iter().map(|w| w.0).collect();
        assert_eq!(
            channels,
            [
                ChannelSelect::Left,
                ChannelSelect::Right,
                ChannelSelect::Left,
                ChannelSelect::Right
            ]
        );
    }

    #[test]
    fn underrun_writes_midpoint() {
        let engine = StreamEngine::new();
        engine.arm(false);
        let mut dac = RecordingDac::default();
        engine.output_next_sample(&mut dac).unwrap();
        assert_eq!(dac.writes, [(ChannelSelect::Both, 0x8000)]);
        assert_eq!(engine.underruns(), 1);
        assert_eq!(engine.samples_played(), 0);
    }

    #[test]
    fn stereo_underrun_silences_both_channels() {
        let engine = StreamEngine::new();
        engine.arm(true);
        let mut dac = RecordingDac::default();
        engine.output_next_sample(&mut dac).unwrap();
        engine.output_next_sample(&mut dac).unwrap();
        assert_eq!(
            dac.writes,
            [(ChannelSelect::Both, 0x8000), (ChannelSelect::Both, 0x8000)]
        );
    }

    #[test]
    fn seconds_only_count_while_streaming() {
        let engine = StreamEngine::new();
        engine.tick_second();
        assert_eq!(engine.elapsed_seconds(), 0);
        engine.arm(false);
        engine.tick_second();
        engine.tick_second();
        assert_eq!(engine.elapsed_seconds(), 2);
        engine.disarm();
        engine.tick_second();
        assert_eq!(engine.elapsed_seconds(), 2);
        engine.reset();
        assert_eq!(engine.elapsed_seconds(), 0);
    }

    #[test]
    fn only_one_claim_at_a_time() {
        let engine = StreamEngine::new();
        assert!(engine.claim());
        assert!(!engine.claim());
        engine.release();
        assert!(engine.claim());
    }
}
