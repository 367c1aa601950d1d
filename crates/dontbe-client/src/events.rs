//! Typed events from sync components to the screen that owns them.
//!
//! A screen creates one channel, hands the sink to its sessions and toggles,
//! and drops the receiver when it goes away. Late results for a discarded
//! screen are dropped silently.

use dontbe_core::ErrorKind;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenEvent {
    /// A list's accumulated items changed.
    FeedChanged {
        feed: &'static str,
        len: usize,
        end_of_data: bool,
    },
    /// A fetch failed; the list still shows its previous items.
    FeedFailed { feed: &'static str, kind: ErrorKind },
    /// A toggle settled, either confirmed or rolled back.
    ToggleSettled {
        action: &'static str,
        target: i64,
        active: bool,
    },
    /// A transparency vote was a duplicate.
    AlreadyVoted { target: i64 },
}

/// Sending half handed to sessions and toggles.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<ScreenEvent>,
}

impl EventSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ScreenEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn emit(&self, event: ScreenEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("screen receiver gone; dropping event");
        }
    }

    /// Whether the owning screen is still listening.
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }
}

pub(crate) fn emit(sink: &Option<EventSink>, event: ScreenEvent) {
    if let Some(sink) = sink {
        sink.emit(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivers_in_order() {
        let (sink, mut rx) = EventSink::channel();
        sink.emit(ScreenEvent::AlreadyVoted { target: 1 });
        sink.emit(ScreenEvent::FeedFailed {
            feed: "notifications",
            kind: ErrorKind::Transport,
        });

        assert_eq!(rx.try_recv().unwrap(), ScreenEvent::AlreadyVoted { target: 1 });
        assert!(matches!(rx.try_recv().unwrap(), ScreenEvent::FeedFailed { .. }));
    }

    #[test]
    fn dropped_receiver_is_tolerated() {
        let (sink, rx) = EventSink::channel();
        drop(rx);
        assert!(!sink.is_open());
        sink.emit(ScreenEvent::AlreadyVoted { target: 9 });
    }
}
