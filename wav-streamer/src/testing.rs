//! In-memory collaborators for unit and integration tests.

use crate::io::listener::EventListener;
use crate::io::output::{ChannelSelect, DacOutput};
use crate::io::storage::Storage;
use crate::io::timer::{InterruptPriority, SampleTimer};
use crate::source::SourceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemError {
    NotFound,
    ReadFailed,
    BadHandle,
}

#[derive(Debug)]
pub struct MemFile {
    index: usize,
    pos: usize,
}

/// Named byte buffers with open/close bookkeeping.
#[derive(Default)]
pub struct MemStorage {
    files: Vec<(String, Vec<u8>)>,
    pub opened: Vec<String>,
    pub open_handles: usize,
    pub closed: usize,
    /// Largest chunk a single read returns.
    max_chunk: Option<usize>,
    /// Reads fail once this many bytes have been delivered.
    fail_after: Option<usize>,
    delivered: usize,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, name: &str, data: Vec<u8>) -> Self {
        self.files.push((name.into(), data));
        self
    }

    pub fn max_chunk(mut self, n: usize) -> Self {
        self.max_chunk = Some(n);
        self
    }

    pub fn fail_reads_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }
}

impl Storage for MemStorage {
    type File = MemFile;
    type Error = MemError;

    fn open(&mut self, name: &str) -> Result<MemFile, MemError> {
        let index = self
            .files
            .iter()
            .position(|(n, _)| n == name)
            .ok_or(MemError::NotFound)?;
        self.opened.push(name.into());
        self.open_handles += 1;
        Ok(MemFile { index, pos: 0 })
    }

    fn read(&mut self, file: &mut MemFile, buf: &mut [u8]) -> Result<usize, MemError> {
        if self.fail_after.is_some_and(|limit| self.delivered >= limit) {
            return Err(MemError::ReadFailed);
        }
        let data = &self.files.get(file.index).ok_or(MemError::BadHandle)?.1;
        let rest = data.get(file.pos..).unwrap_or(&[]);
        let n = rest
            .len()
            .min(buf.len())
            .min(self.max_chunk.unwrap_or(usize::MAX));
        buf[..n].copy_from_slice(&rest[..n]);
        file.pos += n;
        self.delivered += n;
        Ok(n)
    }

    fn close(&mut self, _file: MemFile) -> Result<(), MemError> {
        self.open_handles -= 1;
        self.closed += 1;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerError;

#[derive(Debug, Default)]
pub struct RecordingTimer {
    pub configured: Option<(u32, InterruptPriority)>,
    pub enabled: bool,
    pub enables: usize,
    pub disables: usize,
    pub fail_configure: bool,
}

impl SampleTimer for RecordingTimer {
    type Error = TimerError;

    fn configure(&mut self, rate_hz: u32, priority: InterruptPriority) -> Result<(), TimerError> {
        if self.fail_configure {
            return Err(TimerError);
        }
        self.configured = Some((rate_hz, priority));
        Ok(())
    }

    fn enable(&mut self) -> Result<(), TimerError> {
        self.enabled = true;
        self.enables += 1;
        Ok(())
    }

    fn disable(&mut self) -> Result<(), TimerError> {
        self.enabled = false;
        self.disables += 1;
        Ok(())
    }
}

#[derive(Debug)]
pub struct RecordingListener {
    pub approve: bool,
    pub approvals: Vec<SourceKind>,
    pub finished: usize,
}

impl Default for RecordingListener {
    fn default() -> Self {
        RecordingListener {
            approve: true,
            approvals: Vec::new(),
            finished: 0,
        }
    }
}

impl RecordingListener {
    pub fn vetoing() -> Self {
        RecordingListener {
            approve: false,
            ..Self::default()
        }
    }
}

impl EventListener for RecordingListener {
    fn on_start_approval(&mut self, source: SourceKind) -> bool {
        self.approvals.push(source);
        self.approve
    }

    fn on_finish(&mut self) {
        self.finished += 1;
    }
}

#[derive(Debug, Default)]
pub struct RecordingDac {
    pub writes: Vec<(ChannelSelect, u16)>,
}

impl DacOutput for RecordingDac {
    type Error = core::convert::Infallible;

    fn write(&mut self, channel: ChannelSelect, value: u16) -> Result<(), Self::Error> {
        self.writes.push((channel, value));
        Ok(())
    }
}
