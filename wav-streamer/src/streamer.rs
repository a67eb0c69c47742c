//! Stream lifecycle: the background half of the driver.
//!
//! ```text
//!        start()              primed, timer armed
//! Idle ──────────► Starting ─────────────────────► Streaming
//!  ▲                  │ veto / open / header / timer     │
//!  └──────────────────┘ failure                          │ stop() or
//!  ▲                                                     │ end of stream
//!  └──────────────── Stopping ◄──────────────────────────┘
//! ```
//!
//! [`WavStreamer`] owns the storage, the timer and the listener. The sample
//! interrupt only ever sees the shared [`StreamEngine`].

use crate::constants::{TEST_SAMPLE_RATE, WAV_HEADER_LEN};
use crate::engine::StreamEngine;
use crate::io::listener::EventListener;
use crate::io::storage::{read_full, Storage};
use crate::io::timer::{InterruptPriority, SampleTimer};
use crate::source::{BlockFill, FileSource, RampSource, SineSource, SourceKind};
use crate::wav::{HeaderError, WavHeader};

/// Lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StreamState {
    /// No session.
    Idle,
    /// Acquiring resources and priming buffers.
    Starting,
    /// The timer is armed and the interrupt is consuming samples.
    Streaming,
    /// Releasing resources.
    Stopping,
}

/// Errors from [`WavStreamer::start`] and [`WavStreamer::stop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StreamError {
    /// A session is already open.
    #[error("a stream is already active")]
    Busy,
    /// The listener refused the stream.
    #[error("stream vetoed by listener")]
    Vetoed,
    /// The file could not be opened.
    #[error("failed to open file")]
    Open,
    /// Reading the header failed.
    #[error("failed to read header")]
    HeaderRead,
    /// The header is not 16-bit mono/stereo PCM.
    #[error("invalid header: {0}")]
    Header(#[from] HeaderError),
    /// The sample timer rejected a command.
    #[error("timer error")]
    Timer,
    /// No session is open.
    #[error("no active stream")]
    NotActive,
}

enum Session<F> {
    Ramp(RampSource),
    Sine(SineSource),
    File(FileSource<F>),
}

/// Background driver for one [`StreamEngine`].
pub struct WavStreamer<'e, S: Storage, T, L = ()> {
    engine: &'e StreamEngine,
    storage: S,
    timer: T,
    listener: L,
    state: StreamState,
    session: Option<Session<S::File>>,
    kind: Option<SourceKind>,
    header: Option<WavHeader>,
    /// Blocks produced since start.
    blocks_filled: u32,
    /// Sequence number of the first block that ended the source.
    final_block: Option<u32>,
}

impl<'e, S, T, L> WavStreamer<'e, S, T, L>
where
    S: Storage,
    T: SampleTimer,
    L: EventListener,
{
    /// Create an idle streamer driving `engine`.
    pub fn new(engine: &'e StreamEngine, storage: S, timer: T, listener: L) -> Self {
        WavStreamer {
            engine,
            storage,
            timer,
            listener,
            state: StreamState::Idle,
            session: None,
            kind: None,
            header: None,
            blocks_filled: 0,
            final_block: None,
        }
    }

    /// Open a stream and arm the sample timer.
    ///
    /// `file_name` is only used for [`SourceKind::Storage`]. Synthetic sources
    /// play at [`TEST_SAMPLE_RATE`]; files at sample rate × channels, one
    /// channel per interrupt.
    ///
    /// # Errors
    ///
    /// Any error leaves the streamer [`Idle`](StreamState::Idle) with no file
    /// open and the timer disarmed.
    pub fn start(
        &mut self,
        priority: InterruptPriority,
        kind: SourceKind,
        file_name: &str,
    ) -> Result<(), StreamError> {
        if self.state != StreamState::Idle || !self.engine.claim() {
            return Err(StreamError::Busy);
        }
        if !self.listener.on_start_approval(kind) {
            #[cfg(feature = "defmt")]
            defmt::warn!("{} stream vetoed", kind);
            self.engine.release();
            return Err(StreamError::Vetoed);
        }

        self.state = StreamState::Starting;
        match self.begin(priority, kind, file_name) {
            Ok(()) => {
                self.state = StreamState::Streaming;
                Ok(())
            }
            Err(e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("start failed: {}", e);
                self.abort_start();
                Err(e)
            }
        }
    }

    fn begin(
        &mut self,
        priority: InterruptPriority,
        kind: SourceKind,
        file_name: &str,
    ) -> Result<(), StreamError> {
        let (session, rate, stereo) = match kind {
            SourceKind::Storage => {
                let (file, header) = self.open_wav(file_name)?;
                self.header = Some(header);
                let source = FileSource::new(file, header.bounded_data_len());
                (
                    Session::File(source),
                    header.interrupt_rate(),
                    header.is_stereo(),
                )
            }
            SourceKind::RampTest => (Session::Ramp(RampSource::new()), TEST_SAMPLE_RATE, false),
            SourceKind::SineTest => (
                Session::Sine(SineSource::with_rate(TEST_SAMPLE_RATE)),
                TEST_SAMPLE_RATE,
                false,
            ),
        };
        self.session = Some(session);
        self.kind = Some(kind);

        self.engine.reset();
        self.blocks_filled = 0;
        self.final_block = None;
        self.refill_all();

        self.timer
            .configure(rate, priority)
            .map_err(|_| StreamError::Timer)?;
        self.engine.arm(stereo);
        self.timer.enable().map_err(|_| StreamError::Timer)?;

        #[cfg(feature = "defmt")]
        defmt::info!("streaming {} at {} Hz, stereo={}", kind, rate, stereo);
        Ok(())
    }

    /// Open `name` and validate its header. The file is closed on failure.
    fn open_wav(&mut self, name: &str) -> Result<(S::File, WavHeader), StreamError> {
        let mut file = self.storage.open(name).map_err(|_| StreamError::Open)?;
        let mut raw = [0u8; WAV_HEADER_LEN];
        let parsed = match read_full(&mut self.storage, &mut file, &mut raw) {
            Ok(n) => WavHeader::parse(&raw[..n]).map_err(StreamError::from),
            Err(_) => Err(StreamError::HeaderRead),
        };
        match parsed {
            Ok(header) => Ok((file, header)),
            Err(e) => {
                let _ = self.storage.close(file);
                Err(e)
            }
        }
    }

    /// Undo a partial start.
    fn abort_start(&mut self) {
        // The timer is only touched once a session exists.
        if self.session.is_some() {
            let _ = self.timer.disable();
        }
        self.engine.disarm();
        self.close_session();
        self.engine.reset();
        self.clear_session_state();
        self.engine.release();
        self.state = StreamState::Idle;
    }

    /// Close the stream.
    ///
    /// Disarms the timer, closes the file, notifies the listener, then resets
    /// the buffers and counters.
    ///
    /// # Errors
    ///
    /// [`StreamError::NotActive`] when idle. [`StreamError::Timer`] if the
    /// timer failed to disable; teardown still completes.
    pub fn stop(&mut self) -> Result<(), StreamError> {
        if self.state == StreamState::Idle {
            return Err(StreamError::NotActive);
        }
        self.state = StreamState::Stopping;

        let disabled = self.timer.disable();
        self.engine.disarm();
        self.close_session();
        self.listener.on_finish();
        self.engine.reset();
        self.clear_session_state();
        self.engine.release();
        self.state = StreamState::Idle;

        #[cfg(feature = "defmt")]
        defmt::info!("stream stopped");
        disabled.map_err(|_| StreamError::Timer)
    }

    /// Background tick. Call often enough to refill a block within
    /// `1024 / interrupt rate` seconds of the request.
    ///
    /// Stops the stream once the final file block has played.
    pub fn periodic(&mut self) -> Result<(), StreamError> {
        if self.state != StreamState::Streaming {
            return Ok(());
        }
        if let Some(last) = self.final_block {
            if self.engine.handoff().blocks_drained() > last {
                #[cfg(feature = "defmt")]
                defmt::info!("end of stream after {} samples", self.engine.samples_played());
                return self.stop();
            }
        }
        if self.engine.handoff().take_refill_request() {
            self.refill_all();
        }
        Ok(())
    }

    /// Fill every block the interrupt does not own.
    fn refill_all(&mut self) {
        while let Some(target) = self.engine.handoff().refill_target() {
            let Some(session) = self.session.as_mut() else {
                return;
            };
            let result = match session {
                Session::Ramp(source) => self.engine.refill(target, source),
                Session::Sine(source) => self.engine.refill(target, source),
                Session::File(source) => {
                    self.engine
                        .refill(target, &mut source.reader(&mut self.storage))
                }
            };
            match result {
                Ok(fill) => {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("block {} -> buffer {}: {}", self.blocks_filled, target, fill);
                    if fill == BlockFill::Final && self.final_block.is_none() {
                        self.final_block = Some(self.blocks_filled);
                    }
                    self.blocks_filled = self.blocks_filled.wrapping_add(1);
                }
                Err(_) => return,
            }
        }
    }

    fn close_session(&mut self) {
        if let Some(Session::File(source)) = self.session.take() {
            if let Err(_e) = self.storage.close(source.into_file()) {
                #[cfg(feature = "defmt")]
                defmt::warn!("close failed: {}", defmt::Debug2Format(&_e));
            }
        }
    }

    fn clear_session_state(&mut self) {
        self.session = None;
        self.kind = None;
        self.header = None;
        self.blocks_filled = 0;
        self.final_block = None;
    }

    // ── Status and configuration ───────────────────────────────────────

    /// Current lifecycle state.
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Whether a session is open.
    pub fn is_active(&self) -> bool {
        self.state != StreamState::Idle
    }

    /// Source of the open session.
    pub fn source_kind(&self) -> Option<SourceKind> {
        self.kind
    }

    /// Header of the open file.
    pub fn header(&self) -> Option<&WavHeader> {
        self.header.as_ref()
    }

    /// See [`StreamEngine::set_volume`].
    pub fn set_volume(&self, volume: f32) {
        self.engine.set_volume(volume);
    }

    /// Current volume multiplier.
    pub fn volume(&self) -> f32 {
        self.engine.volume()
    }

    /// Frames in the open file's data chunk, when the header bounds it.
    pub fn samples_in_file(&self) -> Option<u32> {
        self.header.as_ref().and_then(WavHeader::frames)
    }

    /// Samples emitted by the interrupt in this session.
    pub fn samples_played(&self) -> u32 {
        self.engine.samples_played()
    }

    /// Seconds of playback in this session.
    pub fn elapsed_seconds(&self) -> u32 {
        self.engine.elapsed_seconds()
    }

    /// Interrupts in this session that found no ready block.
    pub fn underruns(&self) -> u32 {
        self.engine.underruns()
    }

    /// Borrow the listener.
    pub fn listener(&self) -> &L {
        &self.listener
    }

    /// Borrow the timer.
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Borrow the storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Tear down and hand back the collaborators.
    pub fn release(mut self) -> (S, T, L) {
        if self.is_active() {
            let _ = self.stop();
        }
        (self.storage, self.timer, self.listener)
    }
}
