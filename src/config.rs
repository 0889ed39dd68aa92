//! # Run configuration.
//!
//! Provides [`Config`] centralized settings for one engine run.
//!
//! ## Sentinel values
//! - `threads = 0` → treated as one worker
//! - `event_capacity = 0` → clamped to 1

use std::time::Duration;

use tokio::sync::mpsc;

use crate::error::EngineError;
use crate::events::Event;

/// Configuration for a single run of the engine.
///
/// ## Field semantics
/// - `turns`: number of turns to compute before finishing (`0` = report the input as-is)
/// - `threads`: worker pool size; bands are balanced across workers
/// - `image_width` / `image_height`: grid dimensions, also used to derive filenames
/// - `report_interval`: period of the alive-cells reporter
/// - `event_capacity`: bound of the observer event channel
///
/// ## Notes
/// All fields are public. Prefer the helper accessors to avoid sprinkling
/// sentinel checks across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Number of turns to execute.
    pub turns: u32,

    /// Number of workers computing bands in parallel.
    ///
    /// More workers than rows is legal: surplus workers get empty bands.
    pub threads: usize,

    /// Grid width in cells.
    pub image_width: usize,

    /// Grid height in cells.
    pub image_height: usize,

    /// How often the reporter samples the counters.
    ///
    /// The first sample is taken one full interval after the run starts.
    pub report_interval: Duration,

    /// Capacity of the observer event channel built by [`Config::event_channel`].
    pub event_capacity: usize,
}

impl Config {
    /// Returns the worker count clamped to a minimum of 1.
    #[inline]
    pub fn worker_count(&self) -> usize {
        self.threads.max(1)
    }

    /// Returns the event channel capacity clamped to a minimum of 1.
    #[inline]
    pub fn event_capacity_clamped(&self) -> usize {
        self.event_capacity.max(1)
    }

    /// Number of cells in the grid.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.image_width * self.image_height
    }

    /// Name of the input image: `"{width}x{height}"`.
    pub fn input_filename(&self) -> String {
        format!("{}x{}", self.image_width, self.image_height)
    }

    /// Name of a snapshot taken after `turn`: `"{width}x{height}x{turn}"`.
    pub fn snapshot_filename(&self, turn: u32) -> String {
        format!("{}x{}x{}", self.image_width, self.image_height, turn)
    }

    /// Builds the bounded channel an observer reads events from.
    ///
    /// Pass the sender to [`Engine::run`](crate::Engine::run) and keep the receiver.
    pub fn event_channel(&self) -> (mpsc::Sender<Event>, mpsc::Receiver<Event>) {
        mpsc::channel(self.event_capacity_clamped())
    }

    /// Checks that the configuration describes a non-empty grid.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.image_width == 0 || self.image_height == 0 {
            return Err(EngineError::InvalidConfig {
                reason: format!(
                    "grid must be non-empty, got {}x{}",
                    self.image_width, self.image_height
                ),
            });
        }
        Ok(())
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `turns = 100`
    /// - `threads = 8`
    /// - `512x512` grid
    /// - `report_interval = 2s`
    /// - `event_capacity = 1024`
    fn default() -> Self {
        Self {
            turns: 100,
            threads: 8,
            image_width: 512,
            image_height: 512,
            report_interval: Duration::from_secs(2),
            event_capacity: 1024,
        }
    }
}
