//! # Turn coordinator: one full, atomic turn.
//!
//! Owns the two grid buffers and the worker pool, and turns generation `N`
//! into generation `N + 1`.
//!
//! ## One turn
//! ```text
//! step()
//!   ├─► pool.step(current, bands)       fan-out / fan-in barrier
//!   │       └─ Err(WorkerLost) ──► return Err, nothing committed
//!   ├─► copy each BandResult into back buffer by its row range
//!   ├─► swap back ⇄ current             (double buffering)
//!   ├─► alive += births - deaths
//!   ├─► broker.set(turn, alive)         one joint update
//!   ├─► publish CellFlipped × flips     (band order, row-major inside a band)
//!   └─► publish TurnComplete{turn}
//! ```
//!
//! ## Rules
//! - Only the coordinator mutates grid buffers; workers see an immutable `Arc`.
//! - Turn `N + 1` is dispatched only after turn `N` is committed.
//! - Counters are published after the swap, as a pair.

use std::sync::Arc;

use super::broker::BrokerHandle;
use super::grid::Grid;
use super::pool::WorkerPool;
use super::region::{Band, partition};
use crate::error::EngineError;
use crate::events::{Bus, Event};

/// Drives turns over a double-buffered grid.
pub struct TurnCoordinator {
    current: Arc<Grid>,
    back: Grid,
    bands: Vec<Band>,
    pool: WorkerPool,
    broker: BrokerHandle,
    bus: Bus,
    turn: u32,
    alive: usize,
}

impl TurnCoordinator {
    /// Creates a coordinator for `grid` with a pool of `workers` workers.
    ///
    /// Bands are computed once: dimensions and worker count never change during a run.
    pub fn new(grid: Grid, workers: usize, broker: BrokerHandle, bus: Bus) -> Self {
        let bands = partition(grid.height(), workers);
        let back = Grid::new(grid.width(), grid.height());
        let alive = grid.alive_count();
        Self {
            current: Arc::new(grid),
            back,
            pool: WorkerPool::new(bands.len()),
            bands,
            broker,
            bus,
            turn: 0,
            alive,
        }
    }

    /// Current (last committed) generation.
    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.current
    }

    /// Number of committed turns.
    #[inline]
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// Alive cells in the current generation.
    #[inline]
    pub fn alive_count(&self) -> usize {
        self.alive
    }

    #[inline]
    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    /// Computes and commits one turn; returns the new turn number.
    pub async fn step(&mut self) -> Result<u32, EngineError> {
        let turn = self.turn + 1;
        let mut results = self.pool.step(&self.current, &self.bands, turn).await?;
        results.sort_unstable_by_key(|r| r.band.index);

        let mut delta: isize = 0;
        for res in &results {
            self.back
                .rows_mut(res.band.start, res.band.end)
                .copy_from_slice(&res.cells);
            delta += res.alive_delta(&self.current);
        }

        let next = Arc::new(std::mem::replace(&mut self.back, Grid::new(0, 0)));
        let prior = std::mem::replace(&mut self.current, next);
        self.back = Arc::try_unwrap(prior).unwrap_or_else(|shared| (*shared).clone());

        self.turn = turn;
        self.alive = self.alive.saturating_add_signed(delta);
        self.broker.set(self.turn, self.alive).await?;

        for res in &results {
            for cell in &res.flips {
                self.bus.publish(Event::cell_flipped(turn, *cell)).await;
            }
        }
        self.bus.publish(Event::turn_complete(turn)).await;
        Ok(turn)
    }

    /// Stops the worker pool.
    pub async fn shutdown(self) {
        self.pool.shutdown().await;
    }
}
