//! Session orchestration: the board, score and seed of one game, plus single-level undo.
//!
//! A `Session` is driven one [`Command`] at a time by the surrounding input loop and
//! reports an [`Outcome`] after each. Everything runs synchronously to completion.
use crate::engine::{Board, Direction, Seed};
use log::{debug, info};
use std::time::{SystemTime, UNIX_EPOCH};

/// Options fixed for the lifetime of a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// When set, undo reseeds from the clock instead of restoring the saved seed,
    /// so the undone spawn is rerolled.
    pub seed_hacking: bool,
}

/// Where a session is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Moves are accepted.
    Active,
    /// No move is possible; waiting for the player to undo or accept.
    TerminalPendingConfirmation,
    /// The game is over and every further command is ignored.
    Ended,
}

/// One input from the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Undo,
    Restart,
    /// Ends the game. While a terminal board awaits confirmation this is the "accept".
    Quit,
}

impl Command {
    /// Maps a key to its command.
    ///
    /// Accepts `wasd`, `hjkl`, and the final byte of the arrow-key escape sequences
    /// (`A` up, `B` down, `C` right, `D` left), plus `u`, `r` and `q`.
    ///
    /// # Examples
    /// ```
    /// use game2048::session::Command;
    /// assert_eq!(Command::from_key('h'), Some(Command::MoveLeft));
    /// assert_eq!(Command::from_key('x'), None);
    /// ```
    pub fn from_key(key: char) -> Option<Command> {
        match key {
            'a' | 'h' | 'D' => Some(Command::MoveLeft),
            'd' | 'l' | 'C' => Some(Command::MoveRight),
            'w' | 'k' | 'A' => Some(Command::MoveUp),
            's' | 'j' | 'B' => Some(Command::MoveDown),
            'u' => Some(Command::Undo),
            'r' => Some(Command::Restart),
            'q' => Some(Command::Quit),
            _ => None,
        }
    }

    /// The move direction, for the four move commands.
    pub fn direction(self) -> Option<Direction> {
        match self {
            Command::MoveUp => Some(Direction::Up),
            Command::MoveDown => Some(Direction::Down),
            Command::MoveLeft => Some(Direction::Left),
            Command::MoveRight => Some(Direction::Right),
            Command::Undo | Command::Restart | Command::Quit => None,
        }
    }
}

/// A `(board, score, seed)` triple, used both for undo and for the save file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub board: Board,
    pub score: u32,
    pub seed: Seed,
}

/// What a command did, for the caller to render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Outcome {
    /// The board or score changed.
    pub changed: bool,
    /// The board admits no further move.
    pub terminal: bool,
    pub state: SessionState,
    /// Score of the game this command finished (quit, accept or restart), for the score log.
    pub final_score: Option<u32>,
}

/// Seed derived from the current wall-clock time.
pub fn wall_clock_seed() -> Seed {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    Seed(nanos as i64)
}

/// One game of 2048.
///
/// # Examples
/// ```
/// use game2048::engine::Seed;
/// use game2048::session::{Command, Session, SessionConfig, SessionState};
///
/// let mut session = Session::new(SessionConfig::default(), Seed(42));
/// assert_eq!(session.board().count_empty(), 14);
///
/// let outcome = session.apply(Command::MoveLeft);
/// if outcome.changed {
///     assert!(session.undo());
/// }
/// assert_eq!(session.apply(Command::Quit).state, SessionState::Ended);
/// ```
#[derive(Clone, Debug)]
pub struct Session {
    board: Board,
    score: u32,
    seed: Seed,
    snapshot: Option<Snapshot>,
    state: SessionState,
    config: SessionConfig,
    clock: fn() -> Seed,
}

impl Session {
    /// Starts a fresh game from `seed`: an empty board with two spawned tiles.
    pub fn new(config: SessionConfig, seed: Seed) -> Self {
        let mut session = Session {
            board: Board::new_empty(),
            score: 0,
            seed,
            snapshot: None,
            state: SessionState::Active,
            config,
            clock: wall_clock_seed,
        };
        session.spawn();
        session.spawn();
        session
    }

    /// Continues a previously saved game. A saved board that is already terminal
    /// starts out awaiting confirmation.
    pub fn resume(config: SessionConfig, saved: Snapshot) -> Self {
        let state = if saved.board.is_terminal() {
            SessionState::TerminalPendingConfirmation
        } else {
            SessionState::Active
        };
        info!("resumed session with score {}", saved.score);
        Session {
            board: saved.board,
            score: saved.score,
            seed: saved.seed,
            snapshot: None,
            state,
            config,
            clock: wall_clock_seed,
        }
    }

    /// Replaces the source of fresh seeds used by restart and by seed-hacking undo.
    pub fn with_clock(mut self, clock: fn() -> Seed) -> Self {
        self.clock = clock;
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn seed(&self) -> Seed {
        self.seed
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    /// The state undo would return to, if any.
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// The current state in its persisted form.
    pub fn saved(&self) -> Snapshot {
        Snapshot {
            board: self.board,
            score: self.score,
            seed: self.seed,
        }
    }

    /// `true` while a terminal board awaits undo or accept.
    pub fn is_terminal(&self) -> bool {
        self.state == SessionState::TerminalPendingConfirmation
    }

    fn outcome(&self, changed: bool, final_score: Option<u32>) -> Outcome {
        Outcome {
            changed,
            terminal: self.is_terminal(),
            state: self.state,
            final_score,
        }
    }

    fn spawn(&mut self) {
        self.board.add_random(self.seed);
        self.seed = self.seed.advance();
    }

    /// Applies one command according to the current state.
    ///
    /// - `Active`: moves, undo, restart and quit are all honoured.
    /// - `TerminalPendingConfirmation`: only undo and quit (accept) do anything.
    /// - `Ended`: nothing does anything.
    pub fn apply(&mut self, command: Command) -> Outcome {
        match (self.state, command) {
            (SessionState::Ended, _) => self.outcome(false, None),
            (_, Command::Undo) => {
                let changed = self.undo();
                self.outcome(changed, None)
            }
            (_, Command::Quit) => {
                self.state = SessionState::Ended;
                info!("session ended with score {}", self.score);
                self.outcome(false, Some(self.score))
            }
            (_, Command::Restart) => {
                let final_score = self.restart();
                self.outcome(final_score.is_some(), final_score)
            }
            (_, _) => {
                let changed = match command.direction() {
                    Some(direction) => self.move_in(direction),
                    None => false,
                };
                self.outcome(changed, None)
            }
        }
    }

    /// Applies the command bound to `key`. Unknown keys are a move attempt that changes nothing.
    pub fn apply_key(&mut self, key: char) -> Outcome {
        match Command::from_key(key) {
            Some(command) => self.apply(command),
            None => {
                debug!("ignoring key {:?}", key);
                self.outcome(false, None)
            }
        }
    }

    /// Moves in `direction`; on success records the undo snapshot, spawns a tile and
    /// checks for a terminal board.
    ///
    /// Returns `false`, leaving the session untouched, if the move changed nothing or
    /// the session is not active.
    pub fn move_in(&mut self, direction: Direction) -> bool {
        if self.state != SessionState::Active {
            return false;
        }
        let before = self.saved();
        if !self.board.apply_move(direction, &mut self.score) {
            debug!("move {:?} changed nothing", direction);
            return false;
        }
        self.snapshot = Some(before);
        self.spawn();
        debug!("move {:?}, score now {}", direction, self.score);

        if self.board.is_terminal() {
            self.state = SessionState::TerminalPendingConfirmation;
            info!("no moves left, score {}", self.score);
        }
        true
    }

    /// Restores the single retained snapshot and returns to `Active`.
    ///
    /// With seed hacking enabled the seed comes from the clock instead of the snapshot.
    /// The snapshot is consumed, so a second undo in a row returns `false`. An ended
    /// session cannot be undone.
    pub fn undo(&mut self) -> bool {
        if self.state == SessionState::Ended {
            return false;
        }
        let Some(snapshot) = self.snapshot.take() else {
            return false;
        };
        self.board = snapshot.board;
        self.score = snapshot.score;
        self.seed = if self.config.seed_hacking {
            (self.clock)()
        } else {
            snapshot.seed
        };
        self.state = SessionState::Active;
        debug!("undo to score {}", self.score);
        true
    }

    /// Starts over with a clock seed and a fresh board. Only an `Active` session restarts.
    ///
    /// # Returns
    /// The final score of the abandoned game, for the score log, or `None` if the
    /// session was not active.
    pub fn restart(&mut self) -> Option<u32> {
        if self.state != SessionState::Active {
            return None;
        }
        let final_score = self.score;
        self.board = Board::new_empty();
        self.score = 0;
        self.seed = (self.clock)();
        self.snapshot = None;
        self.state = SessionState::Active;
        self.spawn();
        self.spawn();
        info!("restarted after final score {}", final_score);
        Some(final_score)
    }
}
