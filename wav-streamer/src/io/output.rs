//! Analog output stage.
//!
//! A dual-channel serial DAC receives one unsigned 16-bit word per sample.
//! Two chip-select style lines pick which channel latches the word.
//!
//! | Selection | Left line | Right line |
//! |-----------|-----------|------------|
//! | [`ChannelSelect::Left`] | high | low |
//! | [`ChannelSelect::Right`] | low | high |
//! | [`ChannelSelect::Both`] | high | high |

use embedded_hal::digital::{ErrorType as PinErrorType, OutputPin};
use embedded_hal::spi::SpiDevice;

/// Which output channel(s) latch the next word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelSelect {
    /// Left channel only.
    Left,
    /// Right channel only.
    Right,
    /// Both channels (mono playback).
    Both,
}

impl ChannelSelect {
    /// Channel for sample `offset` of a block: interleaved stereo puts left
    /// on even offsets and right on odd ones; mono drives both.
    #[inline]
    pub fn for_offset(offset: usize, stereo: bool) -> Self {
        match (stereo, offset & 1) {
            (false, _) => ChannelSelect::Both,
            (true, 0) => ChannelSelect::Left,
            (true, _) => ChannelSelect::Right,
        }
    }
}

/// Sink for converted samples. Called from the sample interrupt, so
/// implementations must not block for longer than one word transfer.
pub trait DacOutput {
    /// Error type for a failed write.
    type Error: core::fmt::Debug;

    /// Write one DAC word to `channel`.
    fn write(&mut self, channel: ChannelSelect, value: u16) -> Result<(), Self::Error>;
}

impl<D: DacOutput + ?Sized> DacOutput for &mut D {
    type Error = D::Error;

    #[inline]
    fn write(&mut self, channel: ChannelSelect, value: u16) -> Result<(), Self::Error> {
        (**self).write(channel, value)
    }
}

/// Errors from [`SpiDac`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DacError<S, P> {
    /// The SPI transfer failed.
    #[error("SPI write failed")]
    Spi(S),
    /// A channel-select line could not be driven.
    #[error("channel select pin failed")]
    Pin(P),
}

/// [`DacOutput`] over an SPI device and two channel-select lines.
///
/// The select lines are only driven when the selection changes, so mono
/// playback costs one SPI word per sample.
pub struct SpiDac<SPI, L, R> {
    spi: SPI,
    left: L,
    right: R,
    selected: Option<ChannelSelect>,
}

impl<SPI, L, R> SpiDac<SPI, L, R>
where
    SPI: SpiDevice<u16>,
    L: OutputPin,
    R: OutputPin<Error = L::Error>,
{
    /// Wrap the SPI device and select lines. The lines are left untouched
    /// until the first write.
    pub fn new(spi: SPI, left: L, right: R) -> Self {
        SpiDac {
            spi,
            left,
            right,
            selected: None,
        }
    }

    /// Release the underlying peripherals.
    pub fn release(self) -> (SPI, L, R) {
        (self.spi, self.left, self.right)
    }

    fn select(&mut self, channel: ChannelSelect) -> Result<(), L::Error> {
        if self.selected == Some(channel) {
            return Ok(());
        }
        // Drop the outgoing line before raising the incoming one.
        match channel {
            ChannelSelect::Left => {
                self.right.set_low()?;
                self.left.set_high()?;
            }
            ChannelSelect::Right => {
                self.left.set_low()?;
                self.right.set_high()?;
            }
            ChannelSelect::Both => {
                self.left.set_high()?;
                self.right.set_high()?;
            }
        }
        self.selected = Some(channel);
        Ok(())
    }
}

impl<SPI, L, R> DacOutput for SpiDac<SPI, L, R>
where
    SPI: SpiDevice<u16>,
    L: OutputPin,
    R: OutputPin<Error = L::Error>,
{
    type Error = DacError<SPI::Error, <L as PinErrorType>::Error>;

    fn write(&mut self, channel: ChannelSelect, value: u16) -> Result<(), Self::Error> {
        self.select(channel).map_err(|e| {
            // A failed pin leaves the lines in an unknown state.
            self.selected = None;
            DacError::Pin(e)
        })?;
        self.spi.write(&[value]).map_err(DacError::Spi)
    }
}
