//! # Engine: owns one run from input image to final report.
//!
//! The [`Engine`] loads the initial generation through the I/O collaborator,
//! spawns the counter broker, the reporter and the worker pool, drives the
//! control loop and tears everything down in a fixed order.
//!
//! ## High-level architecture
//! ```text
//! Inputs to run():
//!   events: mpsc::Sender<Event>   commands: mpsc::Receiver<char>   (cancel token)
//!
//! Preparation:
//!   IoActor::spawn(store) ─► read "{W}x{H}" ─► Grid ─► CellFlipped(turn 0) × alive
//!   CounterBroker::spawn(0, alive)
//!   Reporter::spawn(broker, bus, report_interval)
//!   TurnCoordinator::new(grid, workers)  (spawns WorkerPool)
//!
//! Control loop (until turns reached or quit):
//!   try_recv command ─► ControlLoop::next() ─► Step | Wait | Save | Quit | Paused | Resumed
//!
//! Teardown:
//!   reporter.stop()
//!   └─► FinalTurnComplete{turn, alive}
//!   └─► snapshot "{W}x{H}x{turn}" ─► ImageOutputComplete   (skipped if quit already saved)
//!   └─► io.check_idle()
//!   └─► StateChange{Quitting}
//!   └─► broker.stop(), pool.shutdown(), io.stop()
//!   └─► event stream closes (all Bus clones dropped)
//! ```
//!
//! ## Rules
//! - Any error ends the run: `StateChange{Quitting}` is still published and
//!   every background task is stopped before `run` returns the error.
//! - Cancelling the token behaves like a quit command; a dispatched turn is
//!   always completed first.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use gol_engine::{Config, Engine, EventKind, MemoryStore};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config { turns: 4, threads: 2, image_width: 4, image_height: 4, ..Config::default() };
//!
//!     // a 2x2 block, which never changes
//!     let store = MemoryStore::new();
//!     let mut px = vec![0u8; 16];
//!     for i in [5, 6, 9, 10] { px[i] = 255; }
//!     store.insert("4x4", px).await;
//!
//!     let engine = Engine::builder(cfg.clone()).with_store(Arc::new(store)).build();
//!     let (events_tx, mut events) = cfg.event_channel();
//!     let (_keys_tx, keys) = tokio::sync::mpsc::channel::<char>(8);
//!
//!     let run = tokio::spawn(async move { engine.run(events_tx, keys).await });
//!     while let Some(ev) = events.recv().await {
//!         if ev.kind == EventKind::FinalTurnComplete {
//!             assert_eq!(ev.alive.map(|a| a.len()), Some(4));
//!         }
//!     }
//!     let counters = run.await??;
//!     assert_eq!((counters.turns, counters.alive), (4, 4));
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use tokio::{
    select,
    sync::mpsc::{self, error::TryRecvError},
};
use tokio_util::sync::CancellationToken;

use super::broker::{BrokerHandle, CounterBroker, Counters};
use super::builder::EngineBuilder;
use super::control::{Action, Command, ControlLoop};
use super::coordinator::TurnCoordinator;
use super::grid::Grid;
use super::reporter::Reporter;
use crate::{
    config::Config,
    error::EngineError,
    events::{Bus, Event, RunState},
    io::{ImageStore, IoActor, IoHandle},
};

/// How the control loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ending {
    /// Configured turn count reached.
    Completed,
    /// Quit (command or cancellation); the snapshot for the current turn is already written.
    Quit,
}

/// Runs the Game of Life for one configuration against one image store.
pub struct Engine {
    cfg: Config,
    store: Arc<dyn ImageStore>,
}

impl Engine {
    /// Starts building an engine.
    pub fn builder(cfg: Config) -> EngineBuilder {
        EngineBuilder::new(cfg)
    }

    pub(crate) fn new_internal(cfg: Config, store: Arc<dyn ImageStore>) -> Self {
        Self { cfg, store }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Runs to completion (turn count reached or `'q'`).
    ///
    /// Events go to `events`; the stream closes when the run is over.
    /// Returns the final counters.
    pub async fn run(
        &self,
        events: mpsc::Sender<Event>,
        commands: mpsc::Receiver<char>,
    ) -> Result<Counters, EngineError> {
        self.run_with_cancel(events, commands, CancellationToken::new())
            .await
    }

    /// Like [`Engine::run`], with `token` acting as an external quit.
    pub async fn run_with_cancel(
        &self,
        events: mpsc::Sender<Event>,
        mut commands: mpsc::Receiver<char>,
        token: CancellationToken,
    ) -> Result<Counters, EngineError> {
        let bus = Bus::from_sender(events);
        if let Err(e) = self.cfg.validate() {
            bus.publish(Event::state_change(0, RunState::Quitting)).await;
            return Err(e);
        }

        let io = IoActor::spawn(Arc::clone(&self.store));
        let res = self.drive(&bus, &io.handle(), &mut commands, &token).await;
        io.stop().await;
        res
    }

    /// Everything between loading the input and the `Quitting` state change.
    async fn drive(
        &self,
        bus: &Bus,
        io: &IoHandle,
        commands: &mut mpsc::Receiver<char>,
        token: &CancellationToken,
    ) -> Result<Counters, EngineError> {
        let grid = match self.load(bus, io).await {
            Ok(grid) => grid,
            Err(e) => {
                bus.publish(Event::state_change(0, RunState::Quitting)).await;
                return Err(e);
            }
        };

        let broker = CounterBroker::spawn(Counters {
            turns: 0,
            alive: grid.alive_count(),
        });
        let reporter = Reporter::spawn(broker.handle(), bus.clone(), self.cfg.report_interval);
        let mut coord =
            TurnCoordinator::new(grid, self.cfg.worker_count(), broker.handle(), bus.clone());

        let outcome = self.control_loop(&mut coord, bus, io, commands, token).await;
        reporter.stop().await;

        let res = match outcome {
            Ok(ending) => self.finish(&coord, bus, io, &broker.handle(), ending).await,
            Err(e) => Err(e),
        };

        bus.publish(Event::state_change(coord.turn(), RunState::Quitting)).await;
        broker.stop().await;
        coord.shutdown().await;
        res
    }

    /// Reads the input image and announces every initially alive cell.
    async fn load(&self, bus: &Bus, io: &IoHandle) -> Result<Grid, EngineError> {
        let (w, h) = (self.cfg.image_width, self.cfg.image_height);
        let bytes = io.read_image(&self.cfg.input_filename(), w, h).await?;
        let grid = Grid::from_bytes(w, h, bytes)?;
        for cell in grid.alive_cells() {
            bus.publish(Event::cell_flipped(0, cell)).await;
        }
        Ok(grid)
    }

    /// Executes turns and commands until the turn count is reached or a quit.
    async fn control_loop(
        &self,
        coord: &mut TurnCoordinator,
        bus: &Bus,
        io: &IoHandle,
        commands: &mut mpsc::Receiver<char>,
        token: &CancellationToken,
    ) -> Result<Ending, EngineError> {
        let mut ctl = ControlLoop::new();
        let mut open = true;
        let mut carried: Option<Command> = None;

        while coord.turn() < self.cfg.turns {
            let pending = if token.is_cancelled() {
                Some(Command::Quit)
            } else if carried.is_some() {
                carried.take()
            } else if open {
                match commands.try_recv() {
                    Ok(key) => Some(Command::from_key(key)),
                    Err(TryRecvError::Empty) => None,
                    Err(TryRecvError::Disconnected) => {
                        open = false;
                        if ctl.on_commands_closed() == Action::Resumed {
                            self.publish_state(bus, coord.turn(), RunState::Executing).await;
                        }
                        None
                    }
                }
            } else {
                None
            };

            match ctl.next(pending) {
                Action::Step => {
                    coord.step().await?;
                    tokio::task::yield_now().await;
                }
                Action::Wait => {
                    select! {
                        key = commands.recv() => match key {
                            Some(key) => carried = Some(Command::from_key(key)),
                            None => {
                                open = false;
                                if ctl.on_commands_closed() == Action::Resumed {
                                    self.publish_state(bus, coord.turn(), RunState::Executing).await;
                                }
                            }
                        },
                        _ = token.cancelled() => {}
                    }
                }
                Action::Save => self.snapshot(coord.grid(), coord.turn(), bus, io).await?,
                Action::Quit => {
                    self.snapshot(coord.grid(), coord.turn(), bus, io).await?;
                    return Ok(Ending::Quit);
                }
                Action::Paused => self.publish_state(bus, coord.turn(), RunState::Paused).await,
                Action::Resumed => {
                    self.publish_state(bus, coord.turn(), RunState::Executing).await
                }
                Action::Ignore => {}
            }
        }
        Ok(Ending::Completed)
    }

    /// Final report, final snapshot and idle check.
    async fn finish(
        &self,
        coord: &TurnCoordinator,
        bus: &Bus,
        io: &IoHandle,
        broker: &BrokerHandle,
        ending: Ending,
    ) -> Result<Counters, EngineError> {
        let counters = broker.get().await?;
        bus.publish(Event::final_turn_complete(
            counters.turns,
            coord.grid().alive_cells(),
        ))
        .await;

        if ending == Ending::Completed {
            self.snapshot(coord.grid(), counters.turns, bus, io).await?;
        }
        io.check_idle().await?;
        Ok(counters)
    }

    /// Writes the current generation and reports it.
    async fn snapshot(
        &self,
        grid: &Grid,
        turn: u32,
        bus: &Bus,
        io: &IoHandle,
    ) -> Result<(), EngineError> {
        let name = self.cfg.snapshot_filename(turn);
        io.write_image(&name, grid.width(), grid.height(), grid.as_bytes())
            .await?;
        bus.publish(Event::image_output_complete(turn, name)).await;
        Ok(())
    }

    async fn publish_state(&self, bus: &Bus, turn: u32, state: RunState) {
        bus.publish(Event::state_change(turn, state)).await;
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;
    use crate::core::grid::{ALIVE, Cell};
    use crate::events::EventKind;
    use crate::io::MemoryStore;

    fn config(width: usize, height: usize, turns: u32, threads: usize) -> Config {
        Config {
            turns,
            threads,
            image_width: width,
            image_height: height,
            ..Config::default()
        }
    }

    async fn store_with(cfg: &Config, bytes: Vec<u8>) -> MemoryStore {
        let store = MemoryStore::new();
        store.insert(cfg.input_filename(), bytes).await;
        store
    }

    fn random_bytes(len: usize) -> Vec<u8> {
        let mut rng = rand::rng();
        (0..len)
            .map(|_| if rng.random_bool(0.3) { ALIVE } else { 0 })
            .collect()
    }

    /// Runs `engine` in its own task and collects every event until the stream closes.
    async fn run_collect(
        engine: Engine,
        keys: mpsc::Receiver<char>,
        token: CancellationToken,
    ) -> (Result<Counters, EngineError>, Vec<Event>) {
        let (tx, mut rx) = engine.config().event_channel();
        let run = tokio::spawn(async move { engine.run_with_cancel(tx, keys, token).await });

        let mut events = Vec::new();
        while let Some(ev) = rx.recv().await {
            events.push(ev);
        }
        (run.await.expect("run task"), events)
    }

    fn states(events: &[Event]) -> Vec<(u32, RunState)> {
        events
            .iter()
            .filter_map(|e| e.state.map(|s| (e.turn, s)))
            .collect()
    }

    fn kinds_tail(events: &[Event], n: usize) -> Vec<EventKind> {
        events[events.len().saturating_sub(n)..]
            .iter()
            .map(|e| e.kind)
            .collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_full_run_counters_match_final_image() {
        let cfg = config(32, 24, 25, 5);
        let start = random_bytes(cfg.cell_count());
        let store = store_with(&cfg, start.clone()).await;
        let engine = Engine::builder(cfg.clone())
            .with_store(Arc::new(store.clone()))
            .build();

        let (_keys_tx, keys) = mpsc::channel(1);
        let (res, events) = run_collect(engine, keys, CancellationToken::new()).await;
        let counters = res.expect("run");

        let saved = store.get("32x24x25").await.expect("final snapshot");
        let grid = Grid::from_bytes(32, 24, saved).expect("valid snapshot");
        assert_eq!(counters.turns, 25);
        assert_eq!(counters.alive, grid.alive_count());

        let final_ev = events
            .iter()
            .find(|e| e.kind == EventKind::FinalTurnComplete)
            .expect("final event");
        assert_eq!(final_ev.turn, 25);
        assert_eq!(final_ev.alive.as_deref(), Some(grid.alive_cells().as_slice()));

        assert_eq!(
            kinds_tail(&events, 3),
            vec![
                EventKind::FinalTurnComplete,
                EventKind::ImageOutputComplete,
                EventKind::StateChange
            ]
        );
        assert_eq!(states(&events), vec![(25, RunState::Quitting)]);

        let turns: Vec<u32> = events
            .iter()
            .filter(|e| e.kind == EventKind::TurnComplete)
            .map(|e| e.turn)
            .collect();
        assert_eq!(turns, (1..=25).collect::<Vec<_>>());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_initial_flips_and_replay_reach_final_state() {
        let cfg = config(16, 16, 12, 3);
        let start = random_bytes(cfg.cell_count());
        let store = store_with(&cfg, start.clone()).await;
        let engine = Engine::builder(cfg).with_store(Arc::new(store)).build();

        let (_keys_tx, keys) = mpsc::channel(1);
        let (res, events) = run_collect(engine, keys, CancellationToken::new()).await;
        res.expect("run");

        let initial = Grid::from_bytes(16, 16, start).expect("valid input");
        let turn0: Vec<Cell> = events
            .iter()
            .filter(|e| e.kind == EventKind::CellFlipped && e.turn == 0)
            .filter_map(|e| e.cell)
            .collect();
        assert_eq!(turn0, initial.alive_cells());

        let mut replay = Grid::new(16, 16);
        for cell in events.iter().filter_map(|e| e.cell) {
            let alive = replay.alive(cell.x as isize, cell.y as isize);
            replay.set(cell.x, cell.y, !alive);
        }
        let final_ev = events
            .iter()
            .find(|e| e.kind == EventKind::FinalTurnComplete)
            .expect("final event");
        assert_eq!(final_ev.alive.as_deref(), Some(replay.alive_cells().as_slice()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_zero_turns_reports_input_unchanged() {
        let cfg = config(8, 8, 0, 4);
        let start = random_bytes(cfg.cell_count());
        let store = store_with(&cfg, start.clone()).await;
        let engine = Engine::builder(cfg).with_store(Arc::new(store.clone())).build();

        let (_keys_tx, keys) = mpsc::channel(1);
        let (res, events) = run_collect(engine, keys, CancellationToken::new()).await;

        let counters = res.expect("run");
        assert_eq!(counters.turns, 0);
        assert_eq!(store.get("8x8x0").await, Some(start));
        assert!(!events.iter().any(|e| e.kind == EventKind::TurnComplete));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_quit_writes_one_snapshot_and_stops_early() {
        let cfg = config(8, 8, 1000, 2);
        let store = store_with(&cfg, random_bytes(cfg.cell_count())).await;
        let engine = Engine::builder(cfg).with_store(Arc::new(store.clone())).build();

        let (keys_tx, keys) = mpsc::channel(4);
        keys_tx.send('q').await.expect("key");
        let (res, events) = run_collect(engine, keys, CancellationToken::new()).await;

        assert_eq!(res.expect("run").turns, 0);
        let outputs: Vec<&str> = events
            .iter()
            .filter_map(|e| e.filename.as_deref())
            .collect();
        assert_eq!(outputs, vec!["8x8x0"]);
        assert_eq!(store.names().await, vec!["8x8".to_string(), "8x8x0".to_string()]);
        assert_eq!(states(&events), vec![(0, RunState::Quitting)]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_quit_mid_run_reports_turn_reached() {
        let cfg = config(16, 16, 1_000_000, 4);
        let glider = Grid::from_cells(
            16,
            16,
            &[Cell::new(1, 0), Cell::new(2, 1), Cell::new(0, 2), Cell::new(1, 2), Cell::new(2, 2)],
        );
        let store = store_with(&cfg, glider.as_bytes().to_vec()).await;
        let engine = Engine::builder(cfg.clone()).with_store(Arc::new(store.clone())).build();

        let (keys_tx, keys) = mpsc::channel(4);
        let (tx, mut rx) = cfg.event_channel();
        let run = tokio::spawn(async move {
            engine.run_with_cancel(tx, keys, CancellationToken::new()).await
        });

        let mut events = Vec::new();
        let mut paused_at = None;
        let mut turns_while_paused = 0;
        while let Some(ev) = rx.recv().await {
            match ev.kind {
                EventKind::TurnComplete if paused_at.is_some() => turns_while_paused += 1,
                EventKind::TurnComplete if ev.turn == 7 => {
                    keys_tx.send('p').await.expect("key");
                }
                EventKind::StateChange if ev.state == Some(RunState::Paused) => {
                    paused_at = Some(ev.turn);
                    keys_tx.send('q').await.expect("key");
                }
                _ => {}
            }
            events.push(ev);
        }
        let counters = run.await.expect("run task").expect("run");

        let paused_at = paused_at.expect("paused");
        assert!(paused_at >= 7);
        assert_eq!(turns_while_paused, 0);
        assert_eq!(counters.turns, paused_at);

        let final_ev = events
            .iter()
            .find(|e| e.kind == EventKind::FinalTurnComplete)
            .expect("final event");
        assert_eq!(final_ev.turn, counters.turns);

        let name = cfg.snapshot_filename(counters.turns);
        let saved = store.get(&name).await.expect("quit snapshot");
        let snapshot = Grid::from_bytes(16, 16, saved).expect("valid snapshot");
        assert_eq!(final_ev.alive.as_deref(), Some(snapshot.alive_cells().as_slice()));
        assert_eq!(counters.alive, 5);

        let outputs: Vec<&str> = events.iter().filter_map(|e| e.filename.as_deref()).collect();
        assert_eq!(outputs, vec![name.as_str()]);
        assert_eq!(
            states(&events),
            vec![(paused_at, RunState::Paused), (paused_at, RunState::Quitting)]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_pause_twice_is_a_no_op_on_the_result() {
        let cfg = config(12, 12, 10, 3);
        let start = random_bytes(cfg.cell_count());

        let plain = {
            let store = store_with(&cfg, start.clone()).await;
            let engine = Engine::builder(cfg.clone()).with_store(Arc::new(store.clone())).build();
            let (_keys_tx, keys) = mpsc::channel(1);
            run_collect(engine, keys, CancellationToken::new()).await.0.expect("run");
            store.get("12x12x10").await
        };

        let store = store_with(&cfg, start).await;
        let engine = Engine::builder(cfg).with_store(Arc::new(store.clone())).build();
        let (keys_tx, keys) = mpsc::channel(4);
        keys_tx.send('p').await.expect("key");
        keys_tx.send('p').await.expect("key");
        let (res, events) = run_collect(engine, keys, CancellationToken::new()).await;

        assert_eq!(res.expect("run").turns, 10);
        assert_eq!(
            states(&events),
            vec![
                (0, RunState::Paused),
                (0, RunState::Executing),
                (10, RunState::Quitting)
            ]
        );
        assert_eq!(store.get("12x12x10").await, plain);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_closed_commands_resume_a_paused_run() {
        let cfg = config(6, 6, 3, 2);
        let store = store_with(&cfg, vec![0; 36]).await;
        let engine = Engine::builder(cfg).with_store(Arc::new(store)).build();

        let (keys_tx, keys) = mpsc::channel(4);
        keys_tx.send('p').await.expect("key");
        drop(keys_tx);
        let (res, events) = run_collect(engine, keys, CancellationToken::new()).await;

        assert_eq!(res.expect("run").turns, 3);
        assert_eq!(
            states(&events),
            vec![
                (0, RunState::Paused),
                (0, RunState::Executing),
                (3, RunState::Quitting)
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_save_then_continue() {
        let cfg = config(6, 6, 4, 2);
        let store = store_with(&cfg, vec![0; 36]).await;
        let engine = Engine::builder(cfg).with_store(Arc::new(store.clone())).build();

        let (keys_tx, keys) = mpsc::channel(4);
        keys_tx.send('s').await.expect("key");
        let (res, events) = run_collect(engine, keys, CancellationToken::new()).await;

        assert_eq!(res.expect("run").turns, 4);
        let outputs: Vec<(u32, &str)> = events
            .iter()
            .filter_map(|e| e.filename.as_deref().map(|f| (e.turn, f)))
            .collect();
        assert_eq!(outputs, vec![(0, "6x6x0"), (4, "6x6x4")]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cancel_while_paused_quits() {
        let cfg = config(6, 6, 1_000_000, 2);
        let store = store_with(&cfg, vec![0; 36]).await;
        let engine = Engine::builder(cfg.clone()).with_store(Arc::new(store.clone())).build();

        let (keys_tx, keys) = mpsc::channel(4);
        keys_tx.send('p').await.expect("key");
        let token = CancellationToken::new();
        let (tx, mut rx) = cfg.event_channel();
        let run_token = token.clone();
        let run = tokio::spawn(async move { engine.run_with_cancel(tx, keys, run_token).await });

        while let Some(ev) = rx.recv().await {
            if ev.is_state_change(RunState::Paused) {
                token.cancel();
            }
            if ev.is_state_change(RunState::Quitting) {
                assert_eq!(ev.turn, 0);
            }
        }
        assert_eq!(run.await.expect("run task").expect("run").turns, 0);
        assert!(store.get("6x6x0").await.is_some());
        drop(keys_tx);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_truncated_input_quits_with_error() {
        let cfg = config(8, 8, 10, 2);
        let store = store_with(&cfg, vec![0; 40]).await;
        let engine = Engine::builder(cfg).with_store(Arc::new(store)).build();

        let (_keys_tx, keys) = mpsc::channel(1);
        let (res, events) = run_collect(engine, keys, CancellationToken::new()).await;

        assert!(matches!(res, Err(EngineError::Io { .. })));
        assert_eq!(states(&events), vec![(0, RunState::Quitting)]);
        assert!(!events.iter().any(|e| e.kind == EventKind::FinalTurnComplete));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_invalid_pixel_is_rejected() {
        let cfg = config(2, 2, 1, 1);
        let store = store_with(&cfg, vec![0, 255, 7, 0]).await;
        let engine = Engine::builder(cfg).with_store(Arc::new(store)).build();

        let (_keys_tx, keys) = mpsc::channel(1);
        let (res, events) = run_collect(engine, keys, CancellationToken::new()).await;

        assert_eq!(
            res,
            Err(EngineError::InvalidPixel {
                x: 0,
                y: 1,
                value: 7
            })
        );
        assert_eq!(kinds_tail(&events, 1), vec![EventKind::StateChange]);
    }

    #[tokio::test]
    async fn test_empty_grid_config_rejected() {
        let cfg = config(0, 4, 1, 1);
        let engine = Engine::builder(cfg).with_store(Arc::new(MemoryStore::new())).build();

        let (_keys_tx, keys) = mpsc::channel(1);
        let (res, events) = run_collect(engine, keys, CancellationToken::new()).await;

        assert!(matches!(res, Err(EngineError::InvalidConfig { .. })));
        assert_eq!(states(&events), vec![(0, RunState::Quitting)]);
    }
}
