//! Runtime core: grid, workers and orchestration.
//!
//! The only entry point most users need is [`Engine`], built through
//! [`EngineBuilder`]. The building blocks are public for embedding and testing.
//!
//! Internal modules:
//! - `grid`: cells, the toroidal grid and the life rule;
//! - `region`: balanced partition of rows into bands;
//! - `worker` / `pool`: band computation and the fixed worker pool;
//! - `coordinator`: one atomic turn over the double-buffered grid;
//! - `broker`: the (turns, alive) counter pair behind one actor;
//! - `reporter`: periodic alive-cells sampling;
//! - `control`: pause / save / quit state machine;
//! - `engine`: one run from input image to final report;
//! - `shutdown`: cross-platform termination signals.

mod broker;
mod builder;
mod control;
mod coordinator;
mod engine;
mod grid;
mod pool;
mod region;
mod reporter;
mod shutdown;
mod worker;

pub use broker::{BrokerHandle, CounterBroker, Counters};
pub use builder::{DEFAULT_IMAGES_DIR, DEFAULT_OUT_DIR, EngineBuilder};
pub use control::{Action, Command, ControlLoop, ControlState};
pub use coordinator::TurnCoordinator;
pub use engine::Engine;
pub use grid::{ALIVE, Cell, DEAD, Grid, rule};
pub use pool::WorkerPool;
pub use region::{Band, partition};
pub use reporter::Reporter;
pub use shutdown::{cancel_on_signal, wait_for_shutdown_signal};
pub use worker::{BandResult, step_band};
