//! Run events: types and the observer bus.
//!
//! This module groups the event **data model** and the **bus** the engine uses
//! to stream events to an external observer.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`RunState`] the states reported by `StateChange`
//! - [`Bus`] thin wrapper over `tokio::sync::mpsc`
//!
//! ## Quick reference
//! - **Publishers**: the engine (load, snapshots, final report, state changes),
//!   the turn coordinator (`CellFlipped`, `TurnComplete`) and the reporter
//!   (`AliveCellsCount`).
//! - **Consumer**: whoever owns the receiver; usually a
//!   [`SubscriberSet`](crate::SubscriberSet) fanning out to subscribers.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind, RunState};
