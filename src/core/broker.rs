//! # Counter broker: serialized access to run counters.
//!
//! Owns the pair *(completed turns, alive cells)* inside a single task. All
//! reads and writes are messages on one queue, so the pair is always read and
//! written as a unit and no lock is shared between tasks.
//!
//! ## Architecture
//! ```text
//! Coordinator ── set(turns, alive) ──┐
//!                                    ├──► [request queue] ──► broker task (owns Counters)
//! Reporter    ── get() ◄── oneshot ──┤
//! Engine      ── get() ◄── oneshot ──┘
//! ```
//!
//! ## Rules
//! - Requests are served in FIFO order.
//! - `stop()` is a request too: everything queued before it is served first.
//! - After stop, `set`/`get` fail with [`EngineError::BrokerClosed`].

use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use crate::error::EngineError;

/// Jointly updated run counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counters {
    /// Completed turns.
    pub turns: u32,
    /// Alive cells after `turns` turns.
    pub alive: usize,
}

enum Request {
    Set(Counters),
    Get(oneshot::Sender<Counters>),
    Stop,
}

/// Handle for talking to the broker task.
#[derive(Clone, Debug)]
pub struct BrokerHandle {
    tx: mpsc::Sender<Request>,
}

impl BrokerHandle {
    /// Replaces both counters in one step.
    pub async fn set(&self, turns: u32, alive: usize) -> Result<(), EngineError> {
        self.tx
            .send(Request::Set(Counters { turns, alive }))
            .await
            .map_err(|_| EngineError::BrokerClosed)
    }

    /// Reads both counters in one step.
    pub async fn get(&self) -> Result<Counters, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request::Get(reply))
            .await
            .map_err(|_| EngineError::BrokerClosed)?;
        rx.await.map_err(|_| EngineError::BrokerClosed)
    }
}

/// Running broker task plus its handle.
pub struct CounterBroker {
    handle: BrokerHandle,
    join: JoinHandle<()>,
}

impl CounterBroker {
    /// Spawns the broker task holding `initial`.
    pub fn spawn(initial: Counters) -> Self {
        let (tx, mut rx) = mpsc::channel::<Request>(64);
        let join = tokio::spawn(async move {
            let mut counters = initial;
            while let Some(req) = rx.recv().await {
                match req {
                    Request::Set(c) => counters = c,
                    Request::Get(reply) => {
                        let _ = reply.send(counters);
                    }
                    Request::Stop => break,
                }
            }
        });
        Self {
            handle: BrokerHandle { tx },
            join,
        }
    }

    /// Returns a handle for `set`/`get` requests.
    pub fn handle(&self) -> BrokerHandle {
        self.handle.clone()
    }

    /// Stops the broker after serving everything queued so far, and waits for it.
    pub async fn stop(self) {
        let _ = self.handle.tx.send(Request::Stop).await;
        let _ = self.join.await;
    }
}
