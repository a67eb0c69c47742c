//! Stream event listener.

use crate::source::SourceKind;

/// Callbacks the streamer invokes around a stream's lifetime.
///
/// Both run in the background context.
pub trait EventListener {
    /// Veto point before any resource is acquired. Return `false` to refuse
    /// the stream.
    fn on_start_approval(&mut self, source: SourceKind) -> bool;

    /// Called once after a stream is fully torn down.
    fn on_finish(&mut self);
}

/// A listener that approves every stream and ignores completion.
impl EventListener for () {
    fn on_start_approval(&mut self, _source: SourceKind) -> bool {
        true
    }

    fn on_finish(&mut self) {}
}

impl<L: EventListener + ?Sized> EventListener for &mut L {
    fn on_start_approval(&mut self, source: SourceKind) -> bool {
        (**self).on_start_approval(source)
    }

    fn on_finish(&mut self) {
        (**self).on_finish()
    }
}
