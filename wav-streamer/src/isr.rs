//! Interrupt half of the driver.
//!
//! [`StreamIsr`] is owned by the sample interrupt handler. It holds the DAC
//! and an optional oscilloscope pin and reads only the shared engine.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};

use crate::engine::StreamEngine;
use crate::io::output::DacOutput;

/// Placeholder test pin that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTestPin;

impl ErrorType for NoTestPin {
    type Error = Infallible;
}

impl OutputPin for NoTestPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Sample-interrupt handle.
pub struct StreamIsr<'e, D, P = NoTestPin> {
    engine: &'e StreamEngine,
    dac: D,
    test_pin: P,
}

impl<'e, D: DacOutput> StreamIsr<'e, D> {
    /// Handle emitting to `dac`.
    pub fn new(engine: &'e StreamEngine, dac: D) -> Self {
        StreamIsr {
            engine,
            dac,
            test_pin: NoTestPin,
        }
    }
}

impl<'e, D: DacOutput, P: OutputPin> StreamIsr<'e, D, P> {
    /// Drive `pin` high for the duration of every [`on_sample`](Self::on_sample)
    /// that emits a sample.
    pub fn with_test_pin<Q: OutputPin>(self, pin: Q) -> StreamIsr<'e, D, Q> {
        StreamIsr {
            engine: self.engine,
            dac: self.dac,
            test_pin: pin,
        }
    }

    /// Sample timer interrupt entry point.
    ///
    /// Emits nothing while no stream is armed.
    #[inline]
    pub fn on_sample(&mut self) -> Result<(), D::Error> {
        if !self.engine.is_streaming() {
            return Ok(());
        }
        let _ = self.test_pin.set_high();
        let result = self.engine.output_next_sample(&mut self.dac);
        let _ = self.test_pin.set_low();
        result
    }

    /// 1 Hz tick entry point.
    #[inline]
    pub fn on_second(&self) {
        self.engine.tick_second();
    }

    /// Borrow the DAC.
    pub fn dac(&self) -> &D {
        &self.dac
    }

    /// Hand back the DAC and test pin.
    pub fn release(self) -> (D, P) {
        (self.dac, self.test_pin)
    }
}
