//! # I/O collaborator actor.
//!
//! Speaks the engine's image protocol over channels and persists through an
//! [`ImageStore`]. Commands are served strictly one at a time, in order.
//!
//! ## Protocol
//! ```text
//! Engine (IoHandle)                         IoActor
//!   Input{name, w, h, rows_tx}  ──────────►  store.load() ─► rows_tx ◄─ h rows of w bytes
//!   Output{name, w, h, rows_rx, done} ────►  collect rows ─► store.save() ─► done
//!   CheckIdle(reply) ─────────────────────►  reply(true)  (all earlier commands finished)
//! ```
//!
//! ## Rules
//! - Bytes travel row-major, one row per message.
//! - A short input stream is a fatal [`EngineError::Io`].
//! - `CheckIdle` is answered only after every earlier command completed.

use std::sync::Arc;

use tokio::{
    select,
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use super::store::ImageStore;
use crate::error::EngineError;

type RowResult = Result<Vec<u8>, EngineError>;

enum IoCommand {
    Input {
        name: String,
        width: usize,
        height: usize,
        rows: mpsc::Sender<RowResult>,
    },
    Output {
        name: String,
        width: usize,
        height: usize,
        rows: mpsc::Receiver<Vec<u8>>,
        done: oneshot::Sender<Result<(), EngineError>>,
    },
    CheckIdle(oneshot::Sender<bool>),
}

/// Engine-side handle of the I/O collaborator.
#[derive(Clone, Debug)]
pub struct IoHandle {
    tx: mpsc::Sender<IoCommand>,
}

impl IoHandle {
    /// Requests `name` and reads exactly `width * height` bytes.
    pub async fn read_image(
        &self,
        name: &str,
        width: usize,
        height: usize,
    ) -> Result<Vec<u8>, EngineError> {
        let (rows_tx, mut rows) = mpsc::channel(height.clamp(1, 64));
        self.send(IoCommand::Input {
            name: name.to_string(),
            width,
            height,
            rows: rows_tx,
        })
        .await?;

        let expected = width * height;
        let mut bytes = Vec::with_capacity(expected);
        while let Some(row) = rows.recv().await {
            bytes.extend_from_slice(&row?);
        }
        if bytes.len() != expected {
            return Err(EngineError::io(format!(
                "truncated input {name:?}: got {} of {expected} bytes",
                bytes.len()
            )));
        }
        Ok(bytes)
    }

    /// Streams `bytes` (row-major, `width * height` long) to be saved as `name`,
    /// and waits until the write has completed.
    pub async fn write_image(
        &self,
        name: &str,
        width: usize,
        height: usize,
        bytes: &[u8],
    ) -> Result<(), EngineError> {
        let (rows_tx, rows) = mpsc::channel(64);
        let (done, done_rx) = oneshot::channel();
        self.send(IoCommand::Output {
            name: name.to_string(),
            width,
            height,
            rows,
            done,
        })
        .await?;

        for row in bytes.chunks(width.max(1)) {
            rows_tx
                .send(row.to_vec())
                .await
                .map_err(|_| EngineError::io("collaborator stopped reading output"))?;
        }
        drop(rows_tx);

        done_rx
            .await
            .map_err(|_| EngineError::io("collaborator dropped output"))?
    }

    /// Returns once the collaborator has finished every earlier command.
    pub async fn check_idle(&self) -> Result<bool, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.send(IoCommand::CheckIdle(reply)).await?;
        rx.await.map_err(|_| EngineError::io("collaborator gone"))
    }

    async fn send(&self, cmd: IoCommand) -> Result<(), EngineError> {
        self.tx
            .send(cmd)
            .await
            .map_err(|_| EngineError::io("collaborator gone"))
    }
}

/// Running I/O collaborator task.
pub struct IoActor {
    handle: IoHandle,
    token: CancellationToken,
    join: JoinHandle<()>,
}

impl IoActor {
    /// Spawns the collaborator backed by `store`.
    pub fn spawn(store: Arc<dyn ImageStore>) -> Self {
        let (tx, mut rx) = mpsc::channel::<IoCommand>(8);
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let join = tokio::spawn(async move {
            loop {
                let cmd = select! {
                    biased;
                    cmd = rx.recv() => match cmd {
                        Some(cmd) => cmd,
                        None => break,
                    },
                    _ = cancelled.cancelled() => break,
                };
                match cmd {
                    IoCommand::Input {
                        name,
                        width,
                        height,
                        rows,
                    } => serve_input(store.as_ref(), &name, width, height, rows).await,
                    IoCommand::Output {
                        name,
                        width,
                        height,
                        rows,
                        done,
                    } => {
                        let res = serve_output(store.as_ref(), &name, width, height, rows).await;
                        let _ = done.send(res);
                    }
                    IoCommand::CheckIdle(reply) => {
                        let _ = reply.send(true);
                    }
                }
            }
        });
        Self {
            handle: IoHandle { tx },
            token,
            join,
        }
    }

    pub fn handle(&self) -> IoHandle {
        self.handle.clone()
    }

    /// Stops the collaborator once queued commands are served, and waits for it.
    ///
    /// Handles still held elsewhere fail with [`EngineError::Io`] afterwards.
    pub async fn stop(self) {
        self.token.cancel();
        let _ = self.join.await;
    }
}

async fn serve_input(
    store: &dyn ImageStore,
    name: &str,
    width: usize,
    height: usize,
    rows: mpsc::Sender<RowResult>,
) {
    let bytes = match store.load(name, width, height).await {
        Ok(bytes) => bytes,
        Err(e) => {
            let _ = rows.send(Err(EngineError::io(format!("load {name:?}: {e}")))).await;
            return;
        }
    };
    for row in bytes.chunks(width.max(1)) {
        if rows.send(Ok(row.to_vec())).await.is_err() {
            return;
        }
    }
}

async fn serve_output(
    store: &dyn ImageStore,
    name: &str,
    width: usize,
    height: usize,
    mut rows: mpsc::Receiver<Vec<u8>>,
) -> Result<(), EngineError> {
    let mut bytes = Vec::with_capacity(width * height);
    while let Some(row) = rows.recv().await {
        bytes.extend_from_slice(&row);
    }
    if bytes.len() != width * height {
        return Err(EngineError::io(format!(
            "output {name:?}: got {} of {} bytes",
            bytes.len(),
            width * height
        )));
    }
    store
        .save(name, width, height, &bytes)
        .await
        .map_err(|e| EngineError::io(format!("save {name:?}: {e}")))
}
