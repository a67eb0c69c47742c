//! Sample-clock timer collaborator.

/// NVIC-style interrupt priority: preemption group and sub-priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptPriority {
    /// Preemption priority (lower preempts higher).
    pub preemption: u8,
    /// Sub-priority within the preemption group.
    pub sub: u8,
}

impl InterruptPriority {
    /// Create a priority.
    pub const fn new(preemption: u8, sub: u8) -> Self {
        InterruptPriority { preemption, sub }
    }
}

/// Hardware timer that fires the sample interrupt.
///
/// The implementation routes its update interrupt to
/// [`StreamIsr::on_sample`](crate::isr::StreamIsr::on_sample) and a 1 Hz
/// tick to [`StreamIsr::on_second`](crate::isr::StreamIsr::on_second).
pub trait SampleTimer {
    /// Error type for timer operations.
    type Error: core::fmt::Debug;

    /// Program the interrupt rate and priority. Does not start the timer.
    fn configure(&mut self, rate_hz: u32, priority: InterruptPriority) -> Result<(), Self::Error>;

    /// Start firing interrupts.
    fn enable(&mut self) -> Result<(), Self::Error>;

    /// Stop firing interrupts. No interrupt may run after this returns.
    fn disable(&mut self) -> Result<(), Self::Error>;
}
