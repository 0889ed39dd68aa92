//! # Events emitted during a run.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Cell events**: per-cell transitions (`CellFlipped`)
//! - **Progress events**: committed turns and periodic samples
//!   (`TurnComplete`, `AliveCellsCount`, `FinalTurnComplete`)
//! - **Control events**: state changes and snapshot writes
//!   (`StateChange`, `ImageOutputComplete`)
//!
//! The [`Event`] struct carries the turn number plus the payload relevant to its kind.
//!
//! ## Ordering guarantees
//! Events are causally ordered per turn. Each event also has a process-wide
//! sequence number (`seq`) that increases monotonically, which restores the
//! publish order when events from several publishers are interleaved.
//!
//! ## Example
//! ```rust
//! use gol_engine::{Cell, Event, EventKind, RunState};
//!
//! let ev = Event::cell_flipped(7, Cell::new(3, 4));
//! assert_eq!(ev.kind, EventKind::CellFlipped);
//! assert_eq!(ev.turn, 7);
//! assert_eq!(ev.cell, Some(Cell::new(3, 4)));
//!
//! let ev = Event::state_change(7, RunState::Paused);
//! assert_eq!(ev.state, Some(RunState::Paused));
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::core::Cell;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of run events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A cell changed state during `turn`.
    ///
    /// Also emitted once per initially alive cell with `turn = 0` after loading.
    ///
    /// Sets:
    /// - `turn`: turn in which the flip happened
    /// - `cell`: the flipped cell
    CellFlipped,

    /// A turn was fully computed and committed.
    ///
    /// Sets:
    /// - `turn`: number of completed turns
    TurnComplete,

    /// Periodic sample of the counters.
    ///
    /// Sets:
    /// - `turn`: completed turns at sample time
    /// - `count`: alive cells after that turn
    AliveCellsCount,

    /// The run changed state.
    ///
    /// Sets:
    /// - `turn`: completed turns at the time of the change
    /// - `state`: the new state
    StateChange,

    /// A snapshot was written by the I/O collaborator.
    ///
    /// Sets:
    /// - `turn`: the turn the snapshot shows
    /// - `filename`: name the snapshot was written under
    ImageOutputComplete,

    /// The run finished; emitted exactly once.
    ///
    /// Sets:
    /// - `turn`: completed turns
    /// - `alive`: every alive cell, row-major
    FinalTurnComplete,
}

/// Run state reported by [`EventKind::StateChange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Executing,
    Paused,
    Quitting,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Executing => f.write_str("Executing"),
            RunState::Paused => f.write_str("Paused"),
            RunState::Quitting => f.write_str("Quitting"),
        }
    }
}

/// Run event with optional payload.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - `turn`: turn number every event carries
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Turn the event refers to.
    pub turn: u32,

    /// Flipped cell (`CellFlipped`).
    pub cell: Option<Cell>,
    /// Alive cell count (`AliveCellsCount`).
    pub count: Option<usize>,
    /// New run state (`StateChange`).
    pub state: Option<RunState>,
    /// Snapshot name (`ImageOutputComplete`).
    pub filename: Option<Arc<str>>,
    /// Alive cells of the final generation (`FinalTurnComplete`).
    pub alive: Option<Arc<[Cell]>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind, turn: u32) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            turn,
            cell: None,
            count: None,
            state: None,
            filename: None,
            alive: None,
        }
    }

    /// Attaches a cell.
    #[inline]
    pub fn with_cell(mut self, cell: Cell) -> Self {
        self.cell = Some(cell);
        self
    }

    /// Attaches an alive cell count.
    #[inline]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Attaches a run state.
    #[inline]
    pub fn with_state(mut self, state: RunState) -> Self {
        self.state = Some(state);
        self
    }

    /// Attaches a snapshot filename.
    #[inline]
    pub fn with_filename(mut self, filename: impl Into<Arc<str>>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Attaches the list of alive cells.
    #[inline]
    pub fn with_alive(mut self, alive: impl Into<Arc<[Cell]>>) -> Self {
        self.alive = Some(alive.into());
        self
    }

    /// Creates a `CellFlipped` event.
    #[inline]
    pub fn cell_flipped(turn: u32, cell: Cell) -> Self {
        Event::new(EventKind::CellFlipped, turn).with_cell(cell)
    }

    /// Creates a `TurnComplete` event.
    #[inline]
    pub fn turn_complete(turn: u32) -> Self {
        Event::new(EventKind::TurnComplete, turn)
    }

    /// Creates an `AliveCellsCount` event.
    #[inline]
    pub fn alive_cells_count(turn: u32, count: usize) -> Self {
        Event::new(EventKind::AliveCellsCount, turn).with_count(count)
    }

    /// Creates a `StateChange` event.
    #[inline]
    pub fn state_change(turn: u32, state: RunState) -> Self {
        Event::new(EventKind::StateChange, turn).with_state(state)
    }

    /// Creates an `ImageOutputComplete` event.
    #[inline]
    pub fn image_output_complete(turn: u32, filename: impl Into<Arc<str>>) -> Self {
        Event::new(EventKind::ImageOutputComplete, turn).with_filename(filename)
    }

    /// Creates a `FinalTurnComplete` event.
    #[inline]
    pub fn final_turn_complete(turn: u32, alive: Vec<Cell>) -> Self {
        Event::new(EventKind::FinalTurnComplete, turn).with_alive(alive)
    }

    #[inline]
    pub fn is_state_change(&self, state: RunState) -> bool {
        self.kind == EventKind::StateChange && self.state == Some(state)
    }
}
