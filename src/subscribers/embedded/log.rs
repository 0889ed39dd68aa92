//! # LogWriter: simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Per-cell flips are skipped unless enabled with [`LogWriter::with_cells`].
//!
//! ## Example output
//! ```text
//! [alive-cells] turn=40 count=2931
//! [turn-complete] turn=41
//! [state-change] turn=57 state=Paused
//! [image-output] turn=57 file="512x512x57"
//! [final-turn] turn=100 alive=2715
//! [state-change] turn=100 state=Quitting
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter {
    cells: bool,
    turns: bool,
}

impl LogWriter {
    /// Construct a new [`LogWriter`] printing everything except cell flips and turn ticks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Also print every `CellFlipped` event.
    #[must_use]
    pub fn with_cells(mut self) -> Self {
        self.cells = true;
        self
    }

    /// Also print every `TurnComplete` event.
    #[must_use]
    pub fn with_turns(mut self) -> Self {
        self.turns = true;
        self
    }

    /// Formats one event, or `None` if this writer skips it.
    pub fn format(&self, e: &Event) -> Option<String> {
        match e.kind {
            EventKind::CellFlipped if self.cells => e
                .cell
                .map(|c| format!("[cell-flipped] turn={} x={} y={}", e.turn, c.x, c.y)),
            EventKind::CellFlipped => None,
            EventKind::TurnComplete if self.turns => {
                Some(format!("[turn-complete] turn={}", e.turn))
            }
            EventKind::TurnComplete => None,
            EventKind::AliveCellsCount => Some(format!(
                "[alive-cells] turn={} count={}",
                e.turn,
                e.count.unwrap_or_default()
            )),
            EventKind::StateChange => Some(format!(
                "[state-change] turn={} state={}",
                e.turn,
                e.state.map_or_else(|| "unknown".to_string(), |s| s.to_string())
            )),
            EventKind::ImageOutputComplete => Some(format!(
                "[image-output] turn={} file={:?}",
                e.turn,
                e.filename.as_deref().unwrap_or("unknown")
            )),
            EventKind::FinalTurnComplete => Some(format!(
                "[final-turn] turn={} alive={}",
                e.turn,
                e.alive.as_ref().map_or(0, |a| a.len())
            )),
        }
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        if let Some(line) = self.format(e) {
            println!("{line}");
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Cell;
    use crate::events::RunState;

    #[test]
    fn test_format_lines() {
        let w = LogWriter::new();
        assert_eq!(
            w.format(&Event::alive_cells_count(40, 2931)).as_deref(),
            Some("[alive-cells] turn=40 count=2931")
        );
        assert_eq!(
            w.format(&Event::state_change(57, RunState::Paused)).as_deref(),
            Some("[state-change] turn=57 state=Paused")
        );
        assert_eq!(
            w.format(&Event::image_output_complete(57, "16x16x57")).as_deref(),
            Some("[image-output] turn=57 file=\"16x16x57\"")
        );
        assert_eq!(
            w.format(&Event::final_turn_complete(100, vec![Cell::new(1, 1)])).as_deref(),
            Some("[final-turn] turn=100 alive=1")
        );
    }

    #[test]
    fn test_noisy_kinds_are_opt_in() {
        let flip = Event::cell_flipped(3, Cell::new(2, 5));
        let tick = Event::turn_complete(3);
        assert_eq!(LogWriter::new().format(&flip), None);
        assert_eq!(LogWriter::new().format(&tick), None);

        let w = LogWriter::new().with_cells().with_turns();
        assert_eq!(w.format(&flip).as_deref(), Some("[cell-flipped] turn=3 x=2 y=5"));
        assert_eq!(w.format(&tick).as_deref(), Some("[turn-complete] turn=3"));
    }
}
