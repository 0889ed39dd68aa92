//! # Fixed-size step worker pool.
//!
//! [`WorkerPool`] owns one long-lived task per worker, created once per run and
//! reused across turns. Each worker has its own bounded job queue; band `i` is
//! always dispatched to worker `i % size`.
//!
//! ## Architecture
//! ```text
//! step(grid, bands)
//!     │ fan-out
//!     ├──► [queue 0] ──► worker 0 ──► step_band(band 0) ──┐
//!     ├──► [queue 1] ──► worker 1 ──► step_band(band 1) ──┤
//!     └──► [queue N] ──► worker N ──► step_band(band N) ──┤
//!                                                         ▼ fan-in
//!                                                 reply channel (per turn)
//!                                                         │
//!                                         Vec<BandResult> (arrival order)
//! ```
//!
//! ## Rules
//! - Workers only read the shared `Arc<Grid>`; each produces its own band buffer.
//! - A worker releases its grid handle before replying, so the coordinator can
//!   reuse the buffer once every result is in.
//! - `step()` returns only after **all** bands replied (barrier), or fails with
//!   [`EngineError::WorkerLost`] if a worker went away (panic, shutdown).
//! - On a multi-threaded runtime workers run in parallel; on a current-thread
//!   runtime they run concurrently.

use std::sync::Arc;

use tokio::{sync::mpsc, task::JoinHandle};

use super::grid::Grid;
use super::region::Band;
use super::worker::{BandResult, step_band};
use crate::error::EngineError;

/// One unit of work: a band of one turn.
struct Job {
    turn: u32,
    grid: Arc<Grid>,
    band: Band,
    reply: mpsc::Sender<BandResult>,
}

/// Pool of step workers with per-worker queues.
pub struct WorkerPool {
    queues: Vec<mpsc::Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `size` workers (at least one).
    #[must_use]
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let mut queues = Vec::with_capacity(size);
        let mut workers = Vec::with_capacity(size);

        for _ in 0..size {
            let (tx, mut rx) = mpsc::channel::<Job>(1);
            let handle = tokio::spawn(async move {
                while let Some(job) = rx.recv().await {
                    let Job {
                        turn,
                        grid,
                        band,
                        reply,
                    } = job;
                    let res = step_band(&grid, band, turn);
                    drop(grid);
                    let _ = reply.send(res).await;
                }
            });
            queues.push(tx);
            workers.push(handle);
        }
        Self { queues, workers }
    }

    /// Number of workers.
    #[inline]
    pub fn size(&self) -> usize {
        self.queues.len()
    }

    /// Computes every band of one turn and waits for all results.
    ///
    /// Results are returned in arrival order; each carries its band.
    pub async fn step(
        &self,
        grid: &Arc<Grid>,
        bands: &[Band],
        turn: u32,
    ) -> Result<Vec<BandResult>, EngineError> {
        let (reply, mut results) = mpsc::channel::<BandResult>(bands.len().max(1));

        for band in bands {
            let job = Job {
                turn,
                grid: Arc::clone(grid),
                band: *band,
                reply: reply.clone(),
            };
            self.queues[band.index % self.size()]
                .send(job)
                .await
                .map_err(|_| EngineError::WorkerLost { band: band.index })?;
        }
        drop(reply);

        let mut received = vec![false; bands.len()];
        let mut out = Vec::with_capacity(bands.len());
        while out.len() < bands.len() {
            match results.recv().await {
                Some(res) => {
                    if let Some(pos) = bands.iter().position(|b| b.index == res.band.index) {
                        received[pos] = true;
                    }
                    out.push(res);
                }
                None => {
                    let missing = received.iter().position(|r| !r).unwrap_or(0);
                    return Err(EngineError::WorkerLost {
                        band: bands[missing].index,
                    });
                }
            }
        }
        Ok(out)
    }

    /// Stops all workers.
    ///
    /// 1. Drops all queue senders (workers see the queue closed)
    /// 2. Awaits every worker task
    pub async fn shutdown(self) {
        drop(self.queues);

        for h in self.workers {
            let _ = h.await;
        }
    }

    /// Aborts worker `index` and waits until its task is gone.
    #[cfg(test)]
    pub(crate) async fn kill_worker(&self, index: usize) {
        self.workers[index].abort();
        while !self.workers[index].is_finished() {
            tokio::task::yield_now().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::Cell;
    use crate::core::region::partition;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_step_returns_every_band() {
        let pool = WorkerPool::new(4);
        let grid = Arc::new(Grid::from_cells(8, 9, &[Cell::new(1, 1), Cell::new(2, 1), Cell::new(3, 1)]));
        let bands = partition(9, 4);

        let mut results = pool.step(&grid, &bands, 1).await.expect("step");
        results.sort_by_key(|r| r.band.index);

        assert_eq!(results.len(), 4);
        for (res, band) in results.iter().zip(&bands) {
            assert_eq!(res.band, *band);
            assert_eq!(res.cells.len(), band.len() * 8);
        }
        pool.shutdown().await;
    }

    #[tokio::test]
    async fn test_more_bands_than_workers_share_queues() {
        let pool = WorkerPool::new(2);
        let grid = Arc::new(Grid::new(3, 5));
        let bands = partition(5, 5);

        let results = pool.step(&grid, &bands, 1).await.expect("step");
        assert_eq!(results.len(), 5);
        pool.shutdown().await;
    }

    #[tokio::test]
    async fn test_grid_handle_released_after_step() {
        let pool = WorkerPool::new(3);
        let grid = Arc::new(Grid::new(4, 4));
        let bands = partition(4, 3);

        pool.step(&grid, &bands, 1).await.expect("step");
        assert_eq!(Arc::strong_count(&grid), 1);
        pool.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_lost_worker_aborts_the_turn() {
        let pool = WorkerPool::new(3);
        let grid = Arc::new(Grid::new(4, 6));
        let bands = partition(6, 3);
        pool.kill_worker(1).await;

        let res = pool.step(&grid, &bands, 1).await;
        assert_eq!(res, Err(EngineError::WorkerLost { band: 1 }));
        pool.shutdown().await;
    }
}
