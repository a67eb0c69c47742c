//! Lock-free depth-2 block handoff between the background producer and the
//! sample interrupt.
//!
//! Two [`SampleBlock`]s alternate between the contexts. Each block carries a
//! `ready` bit that acts as its ownership token:
//!
//! | `ready` | Owner | Allowed access |
//! |---------|-------|----------------|
//! | `false` | producer (background) | write samples, then publish |
//! | `true`  | consumer (interrupt)  | read samples, then hand back |
//!
//! The consumer walks the active block one sample at a time. When it reaches
//! the end it clears the block's `ready` bit, switches to the other block and
//! raises the refill request flag. The producer acknowledges the request,
//! rewrites every block that is not ready and publishes each one with a
//! `Release` store, so all sample writes are visible before the consumer can
//! observe the block as ready.
//!
//! # Safety Contract
//!
//! - Only ONE context may call the producer methods ([`fill()`](Handoff::fill),
//!   [`take_refill_request()`](Handoff::take_refill_request),
//!   [`refill_target()`](Handoff::refill_target)).
//! - Only ONE context may call [`next_sample()`](Handoff::next_sample).
//! - [`reset()`](Handoff::reset) may only run while the consumer is disarmed.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, AtomicUsize, Ordering};

use crate::constants::BLOCK_SAMPLES;

use super::SampleBlock;

/// Errors returned to the producer by [`Handoff::fill`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandoffError {
    /// The block is published and owned by the consumer, or already being
    /// filled.
    #[error("buffer is owned by the consumer or already being filled")]
    BufferBusy,
    /// The block index is not 0 or 1.
    #[error("buffer index out of range")]
    InvalidIndex,
}

/// One sample handed to the interrupt, with its offset inside the block.
///
/// The offset parity selects the channel for interleaved stereo data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextSample {
    /// The signed sample as stored in the block.
    pub value: i16,
    /// Offset of the sample within its block.
    pub offset: usize,
}

/// Shared state of the two-block handoff.
pub struct Handoff {
    blocks: [UnsafeCell<SampleBlock>; 2],
    /// Per-block ownership token (see module docs).
    ready: [AtomicBool; 2],
    /// Set while the producer holds a block inside [`fill`](Self::fill).
    filling: AtomicBool,
    /// Index of the block the consumer reads (consumer-written).
    active: AtomicU8,
    /// Sample offset within the active block (consumer-written).
    offset: AtomicUsize,
    /// Samples played since the last reset (consumer-written).
    total: AtomicU32,
    /// Blocks fully played since the last reset (consumer-written).
    drained: AtomicU32,
    /// Samples replaced by silence because no block was ready (consumer-written).
    underruns: AtomicU32,
    /// Set by the consumer on every block exhaustion, cleared by the producer.
    refill_pending: AtomicBool,
}

// SAFETY: block contents are only touched by the context that holds the
// block's ownership token. The token is transferred with Release stores and
// observed with Acquire loads, so sample writes happen-before the reads that
// follow publication (and vice versa for hand-back).
unsafe impl Sync for Handoff {}

impl Handoff {
    /// Create an empty handoff: both blocks silent and owned by the producer.
    pub const fn new() -> Self {
        Handoff {
            blocks: [
                UnsafeCell::new(SampleBlock::zeroed()),
                UnsafeCell::new(SampleBlock::zeroed()),
            ],
            ready: [AtomicBool::new(false), AtomicBool::new(false)],
            filling: AtomicBool::new(false),
            active: AtomicU8::new(0),
            offset: AtomicUsize::new(0),
            total: AtomicU32::new(0),
            drained: AtomicU32::new(0),
            underruns: AtomicU32::new(0),
            refill_pending: AtomicBool::new(false),
        }
    }

    // ── Consumer side ──────────────────────────────────────────────────

    /// Take the next sample from the active block (consumer side).
    ///
    /// Returns `None` when the active block has not been published yet. The
    /// call is then counted as an underrun and the cursor does not move, so
    /// playback resumes at the start of the block once the producer catches
    /// up. Never blocks.
    #[inline]
    pub fn next_sample(&self) -> Option<NextSample> {
        let index = usize::from(self.active.load(Ordering::Relaxed) & 1);

        if !self.ready[index].load(Ordering::Acquire) {
            self.underruns.fetch_add(1, Ordering::Relaxed);
            return None;
        }

        let offset = self.offset.load(Ordering::Relaxed);
        // SAFETY: `ready[index]` is set, so the producer published this block
        // and will not write it until we clear the bit below.
        let value = unsafe { (*self.blocks[index].get()).sample(offset) }.unwrap_or(0);

        self.total.fetch_add(1, Ordering::Relaxed);

        let next = offset + 1;
        if next >= BLOCK_SAMPLES {
            self.offset.store(0, Ordering::Relaxed);
            self.drained.fetch_add(1, Ordering::Relaxed);
            // Hand the block back only after the read above has completed.
            self.ready[index].store(false, Ordering::Release);
            self.active.store((index ^ 1) as u8, Ordering::Release);
            self.refill_pending.store(true, Ordering::Release);
        } else {
            self.offset.store(next, Ordering::Relaxed);
        }

        Some(NextSample { value, offset })
    }

    // ── Producer side ──────────────────────────────────────────────────

    /// Acknowledge a pending refill request (producer side).
    ///
    /// Returns `true` if the consumer exhausted a block since the last call.
    /// The flag is cleared before the refill runs, so an exhaustion that
    /// happens during the refill raises it again instead of being lost.
    pub fn take_refill_request(&self) -> bool {
        self.refill_pending.swap(false, Ordering::AcqRel)
    }

    /// Whether a refill request is waiting, without acknowledging it.
    pub fn refill_requested(&self) -> bool {
        self.refill_pending.load(Ordering::Acquire)
    }

    /// The next block the producer should fill, if any.
    ///
    /// The active block comes first when it is not ready (the consumer is
    /// stalled on it), then the block the consumer vacated.
    pub fn refill_target(&self) -> Option<usize> {
        let active = usize::from(self.active.load(Ordering::Acquire) & 1);
        [active, active ^ 1]
            .into_iter()
            .find(|&i| !self.ready[i].load(Ordering::Acquire))
    }

    /// Fill block `index` through `f` and publish it to the consumer.
    ///
    /// # Errors
    ///
    /// - [`HandoffError::InvalidIndex`] if `index > 1`.
    /// - [`HandoffError::BufferBusy`] if the block is published (owned by the
    ///   consumer) or a fill is already in progress.
    pub fn fill<R>(
        &self,
        index: usize,
        f: impl FnOnce(&mut SampleBlock) -> R,
    ) -> Result<R, HandoffError> {
        let ready = self.ready.get(index).ok_or(HandoffError::InvalidIndex)?;
        if ready.load(Ordering::Acquire) {
            return Err(HandoffError::BufferBusy);
        }
        if self.filling.swap(true, Ordering::Acquire) {
            return Err(HandoffError::BufferBusy);
        }

        // SAFETY: `ready[index]` is clear, so the consumer will not read this
        // block, and `filling` guarantees this is the only live `&mut`.
        let block = unsafe { &mut *self.blocks[index].get() };
        let result = f(block);

        // Publish: every write to `block` happens-before this store.
        ready.store(true, Ordering::Release);
        self.filling.store(false, Ordering::Release);
        Ok(result)
    }

    // ── Shared ─────────────────────────────────────────────────────────

    /// Return both blocks to the producer and zero the cursor and counters.
    ///
    /// Must only be called while the consumer cannot run (timer disarmed).
    pub fn reset(&self) {
        self.ready[0].store(false, Ordering::Release);
        self.ready[1].store(false, Ordering::Release);
        self.active.store(0, Ordering::Release);
        self.offset.store(0, Ordering::Relaxed);
        self.total.store(0, Ordering::Relaxed);
        self.drained.store(0, Ordering::Relaxed);
        self.underruns.store(0, Ordering::Relaxed);
        self.refill_pending.store(false, Ordering::Release);
    }

    /// Whether block `index` is published to the consumer.
    pub fn is_ready(&self, index: usize) -> bool {
        self.ready
            .get(index)
            .is_some_and(|r| r.load(Ordering::Acquire))
    }

    /// Index of the block the consumer is reading.
    pub fn active(&self) -> usize {
        usize::from(self.active.load(Ordering::Acquire) & 1)
    }

    /// Offset of the next sample within the active block.
    pub fn offset(&self) -> usize {
        self.offset.load(Ordering::Relaxed)
    }

    /// Samples played since the last reset.
    pub fn total_samples(&self) -> u32 {
        self.total.load(Ordering::Relaxed)
    }

    /// Blocks fully played since the last reset.
    pub fn blocks_drained(&self) -> u32 {
        self.drained.load(Ordering::Relaxed)
    }

    /// Samples substituted with silence since the last reset.
    pub fn underruns(&self) -> u32 {
        self.underruns.load(Ordering::Relaxed)
    }
}

impl Default for Handoff {
    fn default() -> Self {
        Self::new()
    }
}
