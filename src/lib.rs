//! # gol-engine
//!
//! **gol-engine** runs Conway's Game of Life on a toroidal grid, splitting every
//! turn across a fixed pool of workers and streaming what happens to an observer.
//!
//! It provides the engine, its configuration, its events, the image I/O seam
//! and a subscriber layer for observers.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   commands (mpsc<char>)          image store (PGM dir / memory)
//!          │                                   ▲
//!          ▼                                   │
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Engine (one run)                                                 │
//! │  - ControlLoop (Executing ⇄ Paused, save, quit)                   │
//! │  - IoActor (Input / Output / CheckIdle over channels)             │
//! │  - CounterBroker (turns, alive) as one atomic pair                │
//! │  - Reporter (AliveCellsCount every report_interval)               │
//! └──────┬──────────────────────────────────────────────────┬─────────┘
//!        ▼                                                  │
//! ┌──────────────────────────────┐                          │
//! │ TurnCoordinator              │                          │
//! │  current: Arc<Grid>  back    │                          │
//! │  bands = partition(h, t)     │                          │
//! └──────┬───────────────────────┘                          │
//!        ▼ fan-out / fan-in                                 │
//!     ┌──────────┐ ┌──────────┐ ┌──────────┐                │
//!     │ worker 0 │ │ worker 1 │ │ worker N │  step_band()   │
//!     └──────────┘ └──────────┘ └──────────┘                │
//!                                                           ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                  Bus (bounded mpsc, lossless)                     │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                     observer receiver / SubscriberSet
//!                             ┌─────┴─────┐
//!                             ▼           ▼
//!                         LogWriter     custom
//! ```
//!
//! ### One turn
//! ```text
//! loop {
//!   ├─► poll command (try_recv)
//!   ├─► ControlLoop::next()
//!   │       ├─ Step    ─► coordinator.step()
//!   │       │               ├─ every band to its worker, wait for all
//!   │       │               ├─ copy bands into back buffer, swap
//!   │       │               ├─ broker.set(turn, alive)
//!   │       │               └─ CellFlipped × flips, TurnComplete
//!   │       ├─ Wait    ─► block until next command (paused)
//!   │       ├─ Save    ─► snapshot ─► ImageOutputComplete
//!   │       ├─ Quit    ─► snapshot ─► leave loop
//!   │       └─ Paused / Resumed ─► StateChange
//!   └─ exit: turns reached, quit, cancel, or error
//! }
//! FinalTurnComplete ─► snapshot ─► idle check ─► StateChange{Quitting} ─► stream closed
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                    |
//! |-------------------|----------------------------------------------------------|---------------------------------------|
//! | **Engine**        | One run from input image to final report.                | [`Engine`], [`EngineBuilder`]         |
//! | **Grid**          | Toroidal grid, life rule, band partition.                | [`Grid`], [`Cell`], [`partition`]     |
//! | **Events**        | Everything the observer sees.                            | [`Event`], [`EventKind`], [`RunState`]|
//! | **Subscriber API**| Fan events out to observers.                             | [`Subscribe`], [`SubscriberSet`]      |
//! | **Image I/O**     | Collaborator protocol and persistence seam.              | [`IoActor`], [`ImageStore`]           |
//! | **Errors**        | Typed run errors.                                        | [`EngineError`]                       |
//! | **Configuration** | Centralize run settings.                                 | [`Config`]                            |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] and enables the `gol` binary.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use gol_engine::{Config, Engine, MemoryStore, Subscribe, SubscriberSet};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config { turns: 10, threads: 4, image_width: 16, image_height: 16, ..Config::default() };
//!
//!     // a glider in an otherwise empty 16x16 world
//!     let store = MemoryStore::new();
//!     let mut px = vec![0u8; 16 * 16];
//!     for (x, y) in [(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)] { px[y * 16 + x] = 255; }
//!     store.insert("16x16", px).await;
//!
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(gol_engine::LogWriter::new())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn Subscribe>> = Vec::new();
//!
//!     let (events_tx, events) = cfg.event_channel();
//!     let observer = tokio::spawn(SubscriberSet::new(subs).forward(events));
//!
//!     let engine = Engine::builder(cfg).with_store(Arc::new(store.clone())).build();
//!     let (_keys_tx, keys) = tokio::sync::mpsc::channel::<char>(8);
//!     let counters = engine.run(events_tx, keys).await?;
//!     observer.await?;
//!
//!     assert_eq!(counters.alive, 5);
//!     assert!(store.get("16x16x10").await.is_some());
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod io;
mod subscribers;

// ---- Public re-exports ----

pub use config::Config;
pub use core::{
    ALIVE, Action, Band, BandResult, BrokerHandle, Cell, Command, ControlLoop, ControlState,
    CounterBroker, Counters, DEAD, DEFAULT_IMAGES_DIR, DEFAULT_OUT_DIR, Engine, EngineBuilder,
    Grid, Reporter, TurnCoordinator, WorkerPool, cancel_on_signal, partition, rule, step_band,
    wait_for_shutdown_signal,
};
pub use error::EngineError;
pub use events::{Bus, Event, EventKind, RunState};
pub use io::{ImageStore, IoActor, IoHandle, MemoryStore, PgmStore, parse_pgm};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
