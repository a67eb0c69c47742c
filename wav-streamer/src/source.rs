//! Block sources: where the producer gets the next 2048 bytes.
//!
//! | Source | Backing | Rate |
//! |--------|---------|------|
//! | [`FileSource`] | [`Storage`] file after its 44-byte header | from the header |
//! | [`RampSource`] | [`fill_ramp`] | [`TEST_SAMPLE_RATE`] |
//! | [`SineSource`] | [`fill_sine`] | [`TEST_SAMPLE_RATE`] |

use crate::block::SampleBlock;
use crate::constants::{BLOCK_SAMPLES, BLOCK_SIZE, TEST_SAMPLE_RATE};
use crate::generators::{fill_ramp, fill_sine};
use crate::io::storage::{read_full, Storage};

/// What a stream plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SourceKind {
    /// A WAV file on storage.
    Storage,
    /// The sawtooth self-test signal.
    RampTest,
    /// The 440 Hz self-test tone.
    SineTest,
}

impl SourceKind {
    /// Whether the source is generated rather than read from storage.
    pub fn is_synthetic(self) -> bool {
        !matches!(self, SourceKind::Storage)
    }
}

/// Outcome of filling one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BlockFill {
    /// The block holds source data throughout; more may follow.
    Full,
    /// The source ended inside (or before) this block. The remainder is
    /// silence and nothing follows.
    Final,
}

/// Producer-side sample supplier.
pub trait BlockSource {
    /// Overwrite all of `block` with the next samples.
    fn fill_block(&mut self, block: &mut SampleBlock) -> BlockFill;
}

/// Running sawtooth. Never ends.
#[derive(Debug, Clone, Default)]
pub struct RampSource {
    next: u32,
}

impl RampSource {
    /// Start at index 0.
    pub const fn new() -> Self {
        RampSource { next: 0 }
    }
}

impl BlockSource for RampSource {
    fn fill_block(&mut self, block: &mut SampleBlock) -> BlockFill {
        fill_ramp(block, self.next);
        self.next = self.next.wrapping_add(BLOCK_SAMPLES as u32);
        BlockFill::Full
    }
}

/// Running sine tone. Never ends.
#[derive(Debug, Clone)]
pub struct SineSource {
    next: u32,
    sample_rate: u32,
}

impl SineSource {
    /// Start at index 0 with the synthetic sample rate.
    pub const fn new() -> Self {
        Self::with_rate(TEST_SAMPLE_RATE)
    }

    /// Start at index 0 with `sample_rate`.
    pub const fn with_rate(sample_rate: u32) -> Self {
        SineSource {
            next: 0,
            sample_rate,
        }
    }
}

impl Default for SineSource {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockSource for SineSource {
    fn fill_block(&mut self, block: &mut SampleBlock) -> BlockFill {
        fill_sine(block, self.next, self.sample_rate);
        self.next = self.next.wrapping_add(BLOCK_SAMPLES as u32);
        BlockFill::Full
    }
}

/// Read position in an open WAV file.
///
/// The storage object stays with the caller; [`reader`](Self::reader) pairs
/// the two for one refill.
#[derive(Debug)]
pub struct FileSource<F> {
    file: F,
    /// Data bytes left to play, `None` when the header leaves it open.
    remaining: Option<u32>,
    finished: bool,
}

impl<F> FileSource<F> {
    /// Wrap a file positioned at the first data byte.
    pub fn new(file: F, data_len: Option<u32>) -> Self {
        FileSource {
            file,
            remaining: data_len,
            finished: false,
        }
    }

    /// Whether the final block has been produced.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Give the file handle back for closing.
    pub fn into_file(self) -> F {
        self.file
    }

    /// Borrow as a [`BlockSource`] reading through `storage`.
    pub fn reader<'a, S>(&'a mut self, storage: &'a mut S) -> FileReader<'a, S>
    where
        S: Storage<File = F>,
    {
        FileReader {
            storage,
            source: self,
        }
    }
}

/// A [`FileSource`] paired with its storage for one refill.
pub struct FileReader<'a, S: Storage> {
    storage: &'a mut S,
    source: &'a mut FileSource<S::File>,
}

impl<S: Storage> BlockSource for FileReader<'_, S> {
    fn fill_block(&mut self, block: &mut SampleBlock) -> BlockFill {
        let source = &mut *self.source;
        if source.finished {
            block.clear();
            return BlockFill::Final;
        }

        let want = match source.remaining {
            Some(left) => BLOCK_SIZE.min(left as usize),
            None => BLOCK_SIZE,
        };
        let got = match read_full(
            &mut *self.storage,
            &mut source.file,
            &mut block.as_bytes_mut()[..want],
        ) {
            Ok(n) => n,
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("read failed, ending stream: {}", defmt::Debug2Format(&_e));
                0
            }
        };

        if let Some(left) = source.remaining.as_mut() {
            *left = left.saturating_sub(got as u32);
        }
        block.zero_from(got);

        let ended = got < BLOCK_SIZE || source.remaining == Some(0);
        if ended {
            source.finished = true;
            BlockFill::Final
        } else {
            BlockFill::Full
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::{ramp_sample, sine_sample};
    use crate::testing::MemStorage;

    #[test]
    fn only_storage_is_not_synthetic() {
        assert!(!SourceKind::Storage.is_synthetic());
        assert!(SourceKind::RampTest.is_synthetic());
        assert!(SourceKind::SineTest.is_synthetic());
    }

    #[test]
    fn synthetic_sources_continue_across_blocks() {
        let mut ramp = RampSource::new();
        let mut block = SampleBlock::zeroed();
        assert_eq!(ramp.fill_block(&mut block), BlockFill::Full);
        assert_eq!(ramp.fill_block(&mut block), BlockFill::Full);
        assert_eq!(block.sample(0), Some(ramp_sample(BLOCK_SAMPLES as u32)));

        let mut sine = SineSource::new();
        sine.fill_block(&mut block);
        sine.fill_block(&mut block);
        assert_eq!(
            block.sample(3),
            Some(sine_sample(BLOCK_SAMPLES as u32 + 3, TEST_SAMPLE_RATE))
        );
    }

    #[test]
    fn file_reader_pads_short_final_block() {
        let data: Vec<u8> = (0..BLOCK_SIZE + 10).map(|i| (i % 251) as u8 + 1).collect();
        let mut storage = MemStorage::new().with_file("a.raw", data.clone());
        let file = storage.open("a.raw").unwrap();
        let mut src = FileSource::new(file, None);
        let mut block = SampleBlock::zeroed();

        assert_eq!(src.reader(&mut storage).fill_block(&mut block), BlockFill::Full);
        assert_eq!(&block.as_bytes()[..], &data[..BLOCK_SIZE]);

        assert_eq!(src.reader(&mut storage).fill_block(&mut block), BlockFill::Final);
        assert_eq!(&block.as_bytes()[..10], &data[BLOCK_SIZE..]);
        assert!(block.as_bytes()[10..].iter().all(|&b| b == 0));
        assert!(src.is_finished());

        // Past the end: silence.
        assert_eq!(src.reader(&mut storage).fill_block(&mut block), BlockFill::Final);
        assert!(block.samples().all(|s| s == 0));
    }

    #[test]
    fn data_length_bounds_reads() {
        let data = vec![0x11u8; 3 * BLOCK_SIZE];
        let mut storage = MemStorage::new().with_file("a.raw", data);
        let file = storage.open("a.raw").unwrap();
        let mut src = FileSource::new(file, Some(100));
        let mut block = SampleBlock::zeroed();

        assert_eq!(src.reader(&mut storage).fill_block(&mut block), BlockFill::Final);
        assert!(block.as_bytes()[..100].iter().all(|&b| b == 0x11));
        assert!(block.as_bytes()[100..].iter().all(|&b| b == 0));
    }

    #[test]
    fn exact_multiple_ends_on_last_full_block_when_bounded() {
        let data = vec![0x22u8; 2 * BLOCK_SIZE];
        let mut storage = MemStorage::new().with_file("a.raw", data);
        let file = storage.open("a.raw").unwrap();
        let mut src = FileSource::new(file, Some(2 * BLOCK_SIZE as u32));
        let mut block = SampleBlock::zeroed();

        assert_eq!(src.reader(&mut storage).fill_block(&mut block), BlockFill::Full);
        assert_eq!(src.reader(&mut storage).fill_block(&mut block), BlockFill::Final);
        assert!(block.as_bytes().iter().all(|&b| b == 0x22));
    }

    #[test]
    fn read_error_ends_the_stream() {
        let mut storage = MemStorage::new()
            .with_file("a.raw", vec![1u8; 4 * BLOCK_SIZE])
            .fail_reads_after(BLOCK_SIZE);
        let file = storage.open("a.raw").unwrap();
        let mut src = FileSource::new(file, None);
        let mut block = SampleBlock::zeroed();

        assert_eq!(src.reader(&mut storage).fill_block(&mut block), BlockFill::Full);
        assert_eq!(src.reader(&mut storage).fill_block(&mut block), BlockFill::Final);
        assert!(block.samples().all(|s| s == 0));
    }
}
