//! # Event fan-out to multiple subscribers.
//!
//! Provides [`SubscriberSet`], which drains a run's event receiver and delivers
//! every event to each subscriber through its own queue.
//!
//! ## Architecture
//! ```text
//! mpsc::Receiver<Event> ──► forward() ──► Arc<Event>
//!                                │
//!                                ├──► [queue 1] ──► worker 1 ──► subscriber1.on_event()
//!                                ├──► [queue 2] ──► worker 2 ──► subscriber2.on_event()
//!                                └──► [queue N] ──► worker N ──► subscriberN.on_event()
//! ```
//!
//! ## Rules
//! - **Lossless**: `emit()` waits for queue space, so a slow subscriber applies
//!   backpressure all the way to the engine.
//! - **No cross-subscriber ordering**: subscriber A may handle event N while B handles N+5.
//! - **Per-subscriber FIFO**: each subscriber sees events in order.
//! - **Isolation**: a panicking handler is caught with `catch_unwind`; the worker
//!   continues with the next event.
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a subscriber panics while holding a lock.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::Event;
use crate::subscribers::Subscribe;

/// Per-subscriber channel metadata.
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Fan-out coordinator for multiple event subscribers.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
    panics: Arc<AtomicU64>,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker task per subscriber.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());
        let panics = Arc::new(AtomicU64::new(0));

        for sub in subs {
            let cap = sub.queue_capacity().max(1);
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(cap);
            let s = Arc::clone(&sub);
            let panics_for_worker = Arc::clone(&panics);

            let handle = tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = s.on_event(ev.as_ref());

                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        let info = if let Some(msg) = panic_err.downcast_ref::<&'static str>() {
                            (*msg).to_string()
                        } else if let Some(msg) = panic_err.downcast_ref::<String>() {
                            msg.clone()
                        } else {
                            "unknown panic".to_string()
                        };
                        panics_for_worker.fetch_add(1, Ordering::Relaxed);
                        eprintln!(
                            "[subscriber-panicked] subscriber={} seq={} info={info}",
                            s.name(),
                            ev.seq
                        );
                    }
                }
            });
            channels.push(SubscriberChannel { name, sender: tx });
            workers.push(handle);
        }
        Self {
            channels,
            workers,
            panics,
        }
    }

    /// Names of the subscribers, in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.channels.iter().map(|c| c.name).collect()
    }

    /// Number of handler panics caught so far.
    pub fn panics(&self) -> u64 {
        self.panics.load(Ordering::Relaxed)
    }

    /// Delivers `event` to every subscriber, waiting for queue space.
    ///
    /// A subscriber whose worker is gone is skipped.
    pub async fn emit(&self, event: Arc<Event>) {
        for channel in &self.channels {
            let _ = channel.sender.send(Arc::clone(&event)).await;
        }
    }

    /// Drains `events` into the subscribers until the run closes the stream,
    /// then shuts the workers down.
    pub async fn forward(self, mut events: mpsc::Receiver<Event>) {
        while let Some(ev) = events.recv().await {
            self.emit(Arc::new(ev)).await;
        }
        self.shutdown().await;
    }

    /// Gracefully shuts down all subscriber workers.
    ///
    /// 1. Drops all channel senders (workers see channel closed)
    /// 2. Awaits all worker tasks to finish
    pub async fn shutdown(self) {
        drop(self.channels);

        for h in self.workers {
            let _ = h.await;
        }
    }
}
