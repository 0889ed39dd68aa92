//! # Event subscriber trait.
//!
//! Provides [`Subscribe`] an extension point for plugging custom observers into a run.
//!
//! Each subscriber gets:
//! - **Dedicated worker task** (runs independently)
//! - **Per-subscriber bounded queue** (capacity via [`Subscribe::queue_capacity`])
//! - **Panic isolation** (a panicking handler loses only the event it panicked on)
//!
//! ## Architecture
//! ```text
//! SubscriberSet ──► [bounded queue] ──► worker task ──► subscriber.on_event()
//!                                    └─► panic caught, counted, worker continues
//! ```
//!
//! ## Rules
//! - Events are processed sequentially (FIFO) per subscriber.
//! - A full queue makes the forwarder wait; events are never dropped.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use gol_engine::{Event, EventKind, Subscribe};
//!
//! struct TurnCounter(std::sync::atomic::AtomicU32);
//!
//! #[async_trait]
//! impl Subscribe for TurnCounter {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::TurnComplete {
//!             self.0.store(ev.turn, std::sync::atomic::Ordering::Relaxed);
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "turn-counter" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Observer of run events.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
/// - Slow processing eventually slows the run (lossless delivery).
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Called from a dedicated worker task, in FIFO order.
    async fn on_event(&self, event: &Event);

    /// Returns the subscriber name used in panic reports.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns the preferred queue capacity for this subscriber.
    ///
    /// Clamped to a minimum of 1. Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
