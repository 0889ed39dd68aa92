//! # Event bus towards the observer.
//!
//! [`Bus`] is a thin wrapper around a bounded [`tokio::sync::mpsc`] sender that
//! every publisher inside a run clones.
//!
//! ## Architecture
//! ```text
//! Publishers (many):                    Observer (one):
//!   Engine       ──┐
//!   Coordinator  ──┼──────► Bus ───────► mpsc::Receiver<Event>
//!   Reporter     ──┘  (bounded mpsc)      (caller-owned)
//! ```
//!
//! ## Rules
//! - **Lossless**: `publish()` waits for channel space; events are never dropped
//!   while the observer is alive. A slow observer slows the run down.
//! - **Per-publisher FIFO**: events from one publisher arrive in publish order.
//! - **Observer gone**: once the receiver is dropped, events are discarded and the
//!   run continues to completion.
//! - **Close**: the stream closes when the last `Bus` clone is dropped.

use tokio::sync::mpsc;

use super::event::Event;

/// Bounded channel for run events.
///
/// ### Properties
/// - **Backpressure**: `publish()` awaits capacity (`mpsc::Sender::send`).
/// - **Fire-and-forget** towards a dropped observer.
/// - **Cloneable**: cheap to clone (internally an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: mpsc::Sender<Event>,
}

impl Bus {
    /// Creates a bus with its own receiver.
    ///
    /// The minimum capacity is 1 (clamped).
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel::<Event>(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Wraps a sender created by the observer.
    pub fn from_sender(tx: mpsc::Sender<Event>) -> Self {
        Self { tx }
    }

    /// Publishes an event, waiting for channel space.
    ///
    /// If the observer has dropped its receiver the event is discarded.
    pub async fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev).await;
    }

    /// Returns `true` once the observer has dropped its receiver.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn test_publish_preserves_order() {
        let (bus, mut rx) = Bus::new(4);
        bus.publish(Event::turn_complete(1)).await;
        bus.publish(Event::turn_complete(2)).await;
        drop(bus);

        let first = rx.recv().await.map(|e| e.turn);
        let second = rx.recv().await.map(|e| e.turn);
        assert_eq!(first, Some(1));
        assert_eq!(second, Some(2));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_publish_after_observer_dropped_is_noop() {
        let (bus, rx) = Bus::new(1);
        drop(rx);
        assert!(bus.is_closed());
        bus.publish(Event::new(EventKind::TurnComplete, 3)).await;
    }
}
