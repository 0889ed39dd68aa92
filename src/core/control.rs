//! # Control loop state machine.
//!
//! Decides, once per engine iteration, what the engine does next given the
//! command that arrived since the last iteration (if any).
//!
//! ## State machine
//! ```text
//!                 'p' / Paused event
//!   ┌───────────┐ ───────────────► ┌────────┐
//!   │ Executing │                  │ Paused │
//!   └───────────┘ ◄─────────────── └────────┘
//!     │ no cmd    'p' or other key     │ no cmd
//!     ▼           / Executing event    ▼
//!    Step                             Wait
//!
//!   's' (any state) ─► Save   (state unchanged)
//!   'q' (any state) ─► Quit   (engine snapshots, then ends the run)
//! ```
//!
//! ## Rules
//! - Pure: no I/O; the engine carries out the returned [`Action`].
//! - An unknown key is a no-op while executing and resumes a paused run.

/// Command token from the input-control collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Save,
    Quit,
    PauseToggle,
    Other(char),
}

impl Command {
    /// Maps a key press: `s` save, `q` quit, `p` pause-toggle, anything else `Other`.
    pub fn from_key(key: char) -> Self {
        match key {
            's' => Command::Save,
            'q' => Command::Quit,
            'p' => Command::PauseToggle,
            other => Command::Other(other),
        }
    }
}

impl From<char> for Command {
    fn from(key: char) -> Self {
        Command::from_key(key)
    }
}

/// State of the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlState {
    #[default]
    Executing,
    Paused,
}

/// What the engine does on this iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Advance exactly one turn.
    Step,
    /// Paused with nothing to do: block until the next command.
    Wait,
    /// Write a snapshot of the current grid.
    Save,
    /// Write a snapshot and end the run.
    Quit,
    /// Just entered `Paused`; report it.
    Paused,
    /// Just left `Paused`; report it.
    Resumed,
    /// Command had no effect.
    Ignore,
}

/// Two-state control loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct ControlLoop {
    state: ControlState,
}

impl ControlLoop {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn state(&self) -> ControlState {
        self.state
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.state == ControlState::Paused
    }

    /// Returns the action for this iteration.
    ///
    /// `pending` is the command polled (non-blockingly) since the last iteration.
    pub fn next(&mut self, pending: Option<Command>) -> Action {
        match pending {
            Some(cmd) => self.on_command(cmd),
            None => match self.state {
                ControlState::Executing => Action::Step,
                ControlState::Paused => Action::Wait,
            },
        }
    }

    /// Applies one command.
    pub fn on_command(&mut self, cmd: Command) -> Action {
        match (self.state, cmd) {
            (_, Command::Save) => Action::Save,
            (_, Command::Quit) => Action::Quit,
            (ControlState::Executing, Command::PauseToggle) => {
                self.state = ControlState::Paused;
                Action::Paused
            }
            (ControlState::Paused, Command::PauseToggle | Command::Other(_)) => {
                self.state = ControlState::Executing;
                Action::Resumed
            }
            (ControlState::Executing, Command::Other(_)) => Action::Ignore,
        }
    }

    /// The command stream ended. A paused loop resumes, since nothing could unpause it.
    pub fn on_commands_closed(&mut self) -> Action {
        match self.state {
            ControlState::Paused => {
                self.state = ControlState::Executing;
                Action::Resumed
            }
            ControlState::Executing => Action::Ignore,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(Command::from_key('s'), Command::Save);
        assert_eq!(Command::from_key('q'), Command::Quit);
        assert_eq!(Command::from_key('p'), Command::PauseToggle);
        assert_eq!(Command::from('k'), Command::Other('k'));
    }

    #[test]
    fn test_executing_without_command_steps() {
        let mut ctl = ControlLoop::new();
        assert_eq!(ctl.next(None), Action::Step);
        assert_eq!(ctl.next(None), Action::Step);
    }

    #[test]
    fn test_pause_toggle_twice_returns_to_executing() {
        let mut ctl = ControlLoop::new();
        assert_eq!(ctl.next(Some(Command::PauseToggle)), Action::Paused);
        assert_eq!(ctl.next(None), Action::Wait);
        assert_eq!(ctl.next(Some(Command::PauseToggle)), Action::Resumed);
        assert_eq!(ctl.state(), ControlState::Executing);
        assert_eq!(ctl.next(None), Action::Step);
    }

    #[test]
    fn test_save_keeps_state() {
        let mut ctl = ControlLoop::new();
        ctl.next(Some(Command::PauseToggle));
        assert_eq!(ctl.next(Some(Command::Save)), Action::Save);
        assert!(ctl.is_paused());
    }

    #[test]
    fn test_quit_from_any_state() {
        let mut ctl = ControlLoop::new();
        assert_eq!(ctl.next(Some(Command::Quit)), Action::Quit);
        ctl.next(Some(Command::PauseToggle));
        assert_eq!(ctl.next(Some(Command::Quit)), Action::Quit);
    }

    #[test]
    fn test_other_key_resumes_only_when_paused() {
        let mut ctl = ControlLoop::new();
        assert_eq!(ctl.next(Some(Command::Other('x'))), Action::Ignore);
        ctl.next(Some(Command::PauseToggle));
        assert_eq!(ctl.next(Some(Command::Other('x'))), Action::Resumed);
        assert!(!ctl.is_paused());
    }

    #[test]
    fn test_closed_commands_unpause() {
        let mut ctl = ControlLoop::new();
        assert_eq!(ctl.on_commands_closed(), Action::Ignore);
        ctl.next(Some(Command::PauseToggle));
        assert_eq!(ctl.on_commands_closed(), Action::Resumed);
    }
}
