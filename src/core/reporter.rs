//! # Periodic alive-cells reporter.
//!
//! Samples the [`CounterBroker`](super::broker::CounterBroker) on a fixed
//! interval and publishes `AliveCellsCount { turn, count }`, independently of
//! the turn cadence.
//!
//! ## State machine
//! ```text
//!   spawn() ──► Running ──(tick)──► broker.get() ──► publish AliveCellsCount ──┐
//!                  ▲                                                          │
//!                  └──────────────────────────────────────────────────────────┘
//!                  │
//!               stop() / broker closed
//!                  ▼
//!               Stopped
//! ```
//!
//! ## Rules
//! - The first sample is taken one full interval after spawn.
//! - Each sample is one broker read, so `turn` and `count` always belong together.
//! - `stop()` cancels and joins the task: once it returns no further event is published.
//!   A publish blocked on a full event channel is abandoned on stop.

use std::time::Duration;

use tokio::{
    select,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use super::broker::BrokerHandle;
use crate::events::{Bus, Event};

/// Smallest accepted interval; `tokio::time::interval` rejects zero.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Handle to a running reporter task.
pub struct Reporter {
    token: CancellationToken,
    join: JoinHandle<()>,
}

impl Reporter {
    /// Starts sampling `broker` every `period`.
    pub fn spawn(broker: BrokerHandle, bus: Bus, period: Duration) -> Self {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let period = period.max(MIN_INTERVAL);

        let join = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                let Ok(sample) = broker.get().await else {
                    break;
                };
                select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = bus.publish(Event::alive_cells_count(sample.turns, sample.alive)) => {}
                }
            }
        });

        Self { token, join }
    }

    /// Returns `true` while the task has not finished.
    pub fn is_running(&self) -> bool {
        !self.join.is_finished()
    }

    /// Stops the reporter and waits until its task has exited.
    pub async fn stop(self) {
        self.token.cancel();
        let _ = self.join.await;
    }
}
