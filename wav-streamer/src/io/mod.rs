//! Collaborator interfaces and the SPI DAC driver.
//!
//! ## Components
//!
//! | Trait | Context | Implemented by |
//! |-------|---------|----------------|
//! | [`Storage`] | background | the board's FAT driver |
//! | [`SampleTimer`] | background | the board's timer peripheral |
//! | [`EventListener`] | background | application; `()` approves everything |
//! | [`DacOutput`] | interrupt | [`SpiDac`] |

pub mod listener;
pub mod output;
pub mod storage;
pub mod timer;

pub use listener::EventListener;
pub use output::{ChannelSelect, DacError, DacOutput, SpiDac};
pub use storage::Storage;
pub use timer::{InterruptPriority, SampleTimer};
