//! The timed-match state machine tying positions, clocks and players
//! together.
//!
//! A [`Game`] owns the position history behind an `Arc<Mutex<_>>` shared with
//! a background flagfall thread. Every state transition happens under that
//! single lock; the thread only ever compares the active side's elapsed time
//! against its clock and ends the game when it runs out. Observers consume
//! [`GameEvent`]s through channels handed out by [`Game::subscribe`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::chess::clock::{ClockPair, TimeControl};
use crate::chess::core::{Color, PieceKind, Square};
use crate::chess::error::Error;
use crate::chess::moves::WireMove;
use crate::chess::position::Position;

/// Flagfall detection granularity.
const TICK: Duration = Duration::from_millis(10);

/// Outcome of a game, from the white player's perspective where it matters.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameResult {
    NotStarted,
    InProgress,
    WhiteWin,
    BlackWin,
    Draw,
    /// Aborted by the operator before a natural conclusion.
    Terminated,
}

/// Why a finished game ended the way it did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameResultReason {
    /// The losing side was checkmated.
    Checkmate,
    /// The losing side ran out of time.
    Flagfall,
    /// White offered a draw and Black accepted.
    WhiteDraw,
    /// Black offered a draw and White accepted.
    BlackDraw,
    /// The side to move had no legal move while not in check.
    Stalemate,
    /// Neither side retained enough material to mate.
    InsufficientMaterial,
    /// No sequence of legal moves can lead to mate. Declared for external
    /// adjudication; the engine itself only produces
    /// [`GameResultReason::InsufficientMaterial`].
    DeadPosition,
    /// The same position occurred three times. Declared for external
    /// adjudication; the engine does not detect repetitions itself.
    Repetition,
    /// A side claimed the fifty-move rule.
    FiftyMove,
    /// A side resigned.
    Resignation,
    /// Anything else, including operator termination.
    Other,
}

/// Per-game configuration.
#[derive(Clone, Debug)]
pub struct GameSettings {
    /// Clock configuration. A zero base time disables the clocks.
    pub time: TimeControl,
    /// Whether [`Game::pause`] is available.
    pub can_pause: bool,
    /// Whether [`Game::undo`] and [`Game::redo`] are available.
    pub can_undo: bool,
    /// Whether this process counts down White's clock. Disabled when a remote
    /// peer owns that side's time, as with [`Game::apply_wire_move`].
    pub white_clock_managed: bool,
    /// Same for Black.
    pub black_clock_managed: bool,
    /// FEN to start from instead of the standard starting position.
    pub starting_fen: Option<String>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            time: TimeControl::default(),
            can_pause: true,
            can_undo: true,
            white_clock_managed: true,
            black_clock_managed: true,
            starting_fen: None,
        }
    }
}

/// Notifications fanned out to [`Game::subscribe`] listeners.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    /// The game left the initial state and the clocks are running.
    Started,
    /// A move was applied to the board.
    MoveMade {
        /// Ply number of the move, starting at 1.
        ply: u32,
        /// The side that moved.
        color: Color,
        /// Origin square.
        origin: Square,
        /// Destination square.
        destination: Square,
        /// Final notation. While a promotion is pending this lacks the
        /// promotion suffix; [`GameEvent::PromotionResolved`] carries the
        /// final text.
        notation: String,
        /// FEN of the resulting position.
        fen: String,
    },
    /// A pending promotion received its piece kind.
    PromotionResolved {
        /// Ply number of the promoting move.
        ply: u32,
        /// The chosen replacement kind.
        kind: PieceKind,
        /// Final notation of the promoting move.
        notation: String,
    },
    /// The game reached a result.
    Ended {
        /// Final result.
        result: GameResult,
        /// Why the game ended.
        reason: GameResultReason,
    },
    /// The clocks stopped.
    Paused,
    /// The clocks restarted.
    Resumed,
    /// The given side put a draw offer on the table.
    DrawOffered(Color),
    /// The given side declined the standing draw offer.
    DrawDeclined(Color),
    /// The last move was taken back.
    MoveUndone {
        /// Ply number of the move taken back.
        ply: u32,
    },
    /// A previously undone move was replayed.
    MoveRedone {
        /// Ply number of the replayed move.
        ply: u32,
    },
    /// Free-form chat relayed between the players.
    Message(String),
}

/// State behind the mutex, shared with the flagfall thread.
#[derive(Debug)]
struct Shared {
    positions: Vec<Position>,
    clocks: ClockPair,
    control: TimeControl,
    paused: bool,
    pause_started: Option<Instant>,
    result: GameResult,
    reason: Option<GameResultReason>,
    listeners: Vec<Sender<GameEvent>>,
}

impl Shared {
    fn current(&self) -> &Position {
        self.positions
            .last()
            .expect("position history always holds the initial position")
    }

    fn guard_active(&self) -> Result<(), Error> {
        if self.result != GameResult::InProgress {
            return Err(Error::NotInProgress);
        }
        if self.paused {
            return Err(Error::Paused);
        }
        Ok(())
    }

    fn emit(&mut self, event: GameEvent) {
        self.listeners
            .retain(|listener| listener.send(event.clone()).is_ok());
    }

    /// Ends the game at most once; later calls are no-ops so a flagfall
    /// racing a checkmate cannot overwrite the result.
    ///
    /// The side whose clock was running is charged for its final think time
    /// and no new start stamp is laid down.
    fn finish(&mut self, result: GameResult, reason: GameResultReason) {
        if self.result != GameResult::InProgress {
            return;
        }
        self.result = result;
        self.reason = Some(reason);
        let active = self.current().side_to_move();
        if let Some(position) = self.positions.last_mut() {
            if let Some(started) = position.clock_started.take() {
                self.clocks.charge(active, started.elapsed(), Duration::ZERO);
            }
        }
        self.emit(GameEvent::Ended { result, reason });
    }

    fn push(&mut self, next: Position) {
        if let Some(previous) = self.positions.last_mut() {
            // A new move invalidates any stashed redo line.
            previous.redo = None;
        }
        self.positions.push(next);
        self.after_push();
    }

    /// Clock flip, move event and adjudication for the freshly pushed
    /// position. A pending promotion defers the flip and adjudication until
    /// the promotion is resolved.
    fn after_push(&mut self) {
        let pending = self.current().promotion_pending();
        if !pending {
            self.flip_clock();
        }
        let event = {
            let current = self.current();
            current.last_move().map(|mv| GameEvent::MoveMade {
                ply: current.ply(),
                color: mv.color(),
                origin: mv.origin(),
                destination: mv.destination(),
                notation: mv.to_string(),
                fen: current.to_fen(),
            })
        };
        if let Some(event) = event {
            self.emit(event);
        }
        if !pending {
            self.adjudicate();
        }
    }

    /// Charges the side that just moved for its thinking time, snapshots the
    /// result onto the new position and starts the opponent's clock.
    fn flip_clock(&mut self) {
        if self.control.untimed() {
            return;
        }
        let count = self.positions.len();
        if count < 2 {
            return;
        }
        let (head, tail) = self.positions.split_at_mut(count - 1);
        let Some(previous) = head.last_mut() else {
            return;
        };
        let current = &mut tail[0];
        let Some(mover) = current.last_move().map(|mv| mv.color()) else {
            return;
        };
        let elapsed = previous
            .clock_started
            .take()
            .map_or(Duration::ZERO, |started| started.elapsed());
        let remaining = self.clocks.charge(mover, elapsed, self.control.time_per_move);
        current.timer_end = Some(remaining);
        // finish() clears this again if adjudication ends the game.
        current.clock_started = Some(Instant::now());
    }

    fn adjudicate(&mut self) {
        let (checkmate, stalemate, insufficient, loser) = {
            let current = self.current();
            (
                current.is_checkmate(),
                current.is_stalemate(),
                current.has_insufficient_material(),
                current.side_to_move(),
            )
        };
        if checkmate {
            let result = match loser {
                Color::White => GameResult::BlackWin,
                Color::Black => GameResult::WhiteWin,
            };
            self.finish(result, GameResultReason::Checkmate);
        } else if stalemate {
            self.finish(GameResult::Draw, GameResultReason::Stalemate);
        } else if insufficient {
            self.finish(GameResult::Draw, GameResultReason::InsufficientMaterial);
        }
    }

    /// Rebuilds both clocks from the most recent surviving snapshot of each
    /// side, falling back to the base time when a side has none left.
    fn restore_clocks(&mut self) {
        for color in [Color::White, Color::Black] {
            let restored = self
                .positions
                .iter()
                .rev()
                .filter(|position| {
                    position.last_move().map(|mv| mv.color()) == Some(color)
                })
                .find_map(|position| position.timer_end)
                .unwrap_or(self.control.time_per_side);
            self.clocks.set_remaining(color, restored);
        }
    }
}

#[derive(Debug)]
struct Ticker {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl Ticker {
    fn spawn(shared: Arc<Mutex<Shared>>, white_managed: bool, black_managed: bool) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let handle = thread::spawn(move || loop {
            if thread_stop.load(Ordering::Relaxed) {
                break;
            }
            thread::sleep(TICK);
            let mut state = shared.lock().unwrap_or_else(PoisonError::into_inner);
            if state.result != GameResult::InProgress {
                break;
            }
            if state.paused {
                continue;
            }
            let side = state.current().side_to_move();
            let managed = match side {
                Color::White => white_managed,
                Color::Black => black_managed,
            };
            if !managed {
                continue;
            }
            let Some(started) = state.current().clock_started else {
                continue;
            };
            if started.elapsed() >= state.clocks.remaining(side) {
                state.clocks.set_remaining(side, Duration::ZERO);
                let result = match side {
                    Color::White => GameResult::BlackWin,
                    Color::Black => GameResult::WhiteWin,
                };
                state.finish(result, GameResultReason::Flagfall);
                break;
            }
        });
        Self { stop, handle }
    }
}

/// A two-player timed match.
///
/// ```no_run
/// use zeitnot::chess::core::Square;
/// use zeitnot::chess::game::{Game, GameSettings};
///
/// let mut game = Game::new("alice", "bob", GameSettings::default())?;
/// let events = game.subscribe();
/// game.start()?;
/// game.make_move(Square::try_from("e2")?, Square::try_from("e4")?, None)?;
/// # Ok::<(), zeitnot::chess::error::Error>(())
/// ```
#[derive(Debug)]
pub struct Game {
    shared: Arc<Mutex<Shared>>,
    settings: GameSettings,
    white: String,
    black: String,
    ticker: Option<Ticker>,
}

impl Game {
    /// Creates a game in the [`GameResult::NotStarted`] state.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidFen`] when the settings carry an unusable starting
    /// FEN.
    pub fn new(
        white: impl Into<String>,
        black: impl Into<String>,
        settings: GameSettings,
    ) -> Result<Self, Error> {
        let initial = match &settings.starting_fen {
            Some(fen) => Position::from_fen(fen)?,
            None => Position::starting(),
        };
        let shared = Shared {
            positions: vec![initial],
            clocks: ClockPair::new(settings.time),
            control: settings.time,
            paused: false,
            pause_started: None,
            result: GameResult::NotStarted,
            reason: None,
            listeners: Vec::new(),
        };
        Ok(Self {
            shared: Arc::new(Mutex::new(shared)),
            settings,
            white: white.into(),
            black: black.into(),
            ticker: None,
        })
    }

    fn state(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn start_ticker(&mut self) {
        if self.settings.time.untimed() || self.ticker.is_some() {
            return;
        }
        self.ticker = Some(Ticker::spawn(
            Arc::clone(&self.shared),
            self.settings.white_clock_managed,
            self.settings.black_clock_managed,
        ));
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.stop.store(true, Ordering::Relaxed);
            drop(ticker.handle.join());
        }
    }

    /// Starts the match: White's clock begins to run and flagfall detection
    /// comes alive.
    ///
    /// # Errors
    ///
    /// [`Error::AlreadyStarted`] unless the game is still
    /// [`GameResult::NotStarted`].
    pub fn start(&mut self) -> Result<(), Error> {
        {
            let mut state = self.state();
            if state.result != GameResult::NotStarted {
                return Err(Error::AlreadyStarted);
            }
            state.result = GameResult::InProgress;
            state.clocks = ClockPair::new(self.settings.time);
            if !self.settings.time.untimed() {
                if let Some(position) = state.positions.last_mut() {
                    position.clock_started = Some(Instant::now());
                }
            }
            state.emit(GameEvent::Started);
        }
        self.start_ticker();
        Ok(())
    }

    /// Plays the legal move from `origin` to `destination`.
    ///
    /// `promotion` resolves the promotion immediately when the move is a
    /// promotion; passing `None` for a promoting move leaves it pending,
    /// which blocks further play (and the clock flip) until
    /// [`Game::set_promotion`].
    ///
    /// # Errors
    ///
    /// Lifecycle guards ([`Error::NotInProgress`], [`Error::Paused`],
    /// [`Error::PromotionPending`]) and [`Error::IllegalMove`] when the
    /// square pair matches no legal move.
    pub fn make_move(
        &mut self,
        origin: Square,
        destination: Square,
        promotion: Option<PieceKind>,
    ) -> Result<(), Error> {
        let ended = {
            let mut state = self.state();
            state.guard_active()?;
            if state.current().promotion_pending() {
                return Err(Error::PromotionPending);
            }
            let mv = state
                .current()
                .legal_moves()
                .iter()
                .find(|m| m.origin() == origin && m.destination() == destination)
                .cloned()
                .ok_or(Error::IllegalMove {
                    from: origin,
                    to: destination,
                })?;
            let next = Position::after_move(state.current(), &mv, promotion)?;
            // The legality filter already guarantees both; reject rather than
            // corrupt the history if it ever fails.
            let captures_king = mv
                .capture_piece()
                .is_some_and(|victim| victim.kind == PieceKind::King);
            if next.giving_check() || captures_king {
                return Err(Error::IllegalMove {
                    from: origin,
                    to: destination,
                });
            }
            state.push(next);
            state.result != GameResult::InProgress
        };
        if ended {
            self.stop_ticker();
        }
        Ok(())
    }

    /// Resolves the pending promotion of the last move, after which the clock
    /// flips and the position is adjudicated. The time spent choosing counts
    /// against the promoting side.
    ///
    /// # Errors
    ///
    /// [`Error::NoPromotionPending`] when nothing awaits resolution,
    /// [`Error::InvalidPromotionKind`] for kings and pawns, plus the usual
    /// lifecycle guards.
    pub fn set_promotion(&mut self, kind: PieceKind) -> Result<(), Error> {
        let ended = {
            let mut state = self.state();
            state.guard_active()?;
            if !state.current().promotion_pending() {
                return Err(Error::NoPromotionPending);
            }
            let count = state.positions.len();
            // A pending promotion implies at least one move was made.
            let mv = state.positions[count - 1]
                .last_move()
                .cloned()
                .ok_or(Error::NoPromotionPending)?;
            let resolved = Position::after_move(&state.positions[count - 2], &mv, Some(kind))?;
            state.positions[count - 1] = resolved;
            let event = {
                let current = state.current();
                GameEvent::PromotionResolved {
                    ply: current.ply(),
                    kind,
                    notation: current
                        .last_move()
                        .map(|m| m.notation().to_owned())
                        .unwrap_or_default(),
                }
            };
            state.emit(event);
            state.flip_clock();
            state.adjudicate();
            state.result != GameResult::InProgress
        };
        if ended {
            self.stop_ticker();
        }
        Ok(())
    }

    /// Takes back the last move. Both clocks are restored to what they read
    /// before the move, a finished game comes back to life, and the taken
    /// back line is kept for [`Game::redo`] until a new move replaces it.
    ///
    /// # Errors
    ///
    /// [`Error::UndoDisabled`] per settings, [`Error::NothingToUndo`] at the
    /// initial position, [`Error::Paused`] and [`Error::NotInProgress`] per
    /// lifecycle.
    pub fn undo(&mut self) -> Result<(), Error> {
        if !self.settings.can_undo {
            return Err(Error::UndoDisabled);
        }
        let revived = {
            let mut state = self.state();
            if state.result == GameResult::NotStarted {
                return Err(Error::NotInProgress);
            }
            if state.paused {
                return Err(Error::Paused);
            }
            if state.positions.len() < 2 {
                return Err(Error::NothingToUndo);
            }
            let Some(undone) = state.positions.pop() else {
                return Err(Error::NothingToUndo);
            };
            let ply = undone.ply();
            if let Some(previous) = state.positions.last_mut() {
                previous.redo = Some(Box::new(undone));
                // A stale offer must not resurface on the restored position.
                previous.set_draw_offer(None);
            }
            state.restore_clocks();
            let revived = state.result != GameResult::InProgress;
            state.result = GameResult::InProgress;
            state.reason = None;
            if !self.settings.time.untimed() {
                if let Some(position) = state.positions.last_mut() {
                    position.clock_started = Some(Instant::now());
                }
            }
            state.emit(GameEvent::MoveUndone { ply });
            revived
        };
        if revived {
            // The flagfall thread exits when a game ends; give the revived
            // game a fresh one.
            self.stop_ticker();
            self.start_ticker();
        }
        Ok(())
    }

    /// Replays the move most recently taken back with [`Game::undo`].
    ///
    /// # Errors
    ///
    /// [`Error::NothingToRedo`] when no undone line is stashed, plus the
    /// undo availability and lifecycle guards.
    pub fn redo(&mut self) -> Result<(), Error> {
        if !self.settings.can_undo {
            return Err(Error::UndoDisabled);
        }
        let ended = {
            let mut state = self.state();
            state.guard_active()?;
            let stashed = match state.positions.last_mut() {
                Some(current) => current.redo.take().ok_or(Error::NothingToRedo)?,
                None => return Err(Error::NothingToRedo),
            };
            let mut redone = *stashed;
            let ply = redone.ply();
            if let Some(snapshot) = redone.timer_end {
                if let Some(mover) = redone.last_move().map(|mv| mv.color()) {
                    state.clocks.set_remaining(mover, snapshot);
                }
            }
            if let Some(previous) = state.positions.last_mut() {
                previous.clock_started = None;
            }
            // A replayed pending promotion keeps both clocks parked until the
            // kind arrives, same as when the move was first made.
            redone.clock_started = if self.settings.time.untimed() || redone.promotion_pending() {
                None
            } else {
                Some(Instant::now())
            };
            state.positions.push(redone);
            state.emit(GameEvent::MoveRedone { ply });
            state.adjudicate();
            state.result != GameResult::InProgress
        };
        if ended {
            self.stop_ticker();
        }
        Ok(())
    }

    /// Stops both clocks.
    ///
    /// # Errors
    ///
    /// [`Error::PauseDisabled`] per settings, [`Error::Paused`] when already
    /// paused, [`Error::NotInProgress`] per lifecycle.
    pub fn pause(&mut self) -> Result<(), Error> {
        if !self.settings.can_pause {
            return Err(Error::PauseDisabled);
        }
        let mut state = self.state();
        state.guard_active()?;
        state.paused = true;
        state.pause_started = Some(Instant::now());
        state.emit(GameEvent::Paused);
        Ok(())
    }

    /// Restarts the clocks where they stopped.
    ///
    /// # Errors
    ///
    /// [`Error::NotPaused`] when the game is not paused.
    pub fn resume(&mut self) -> Result<(), Error> {
        let mut state = self.state();
        if !state.paused {
            return Err(Error::NotPaused);
        }
        state.paused = false;
        if let Some(pause_started) = state.pause_started.take() {
            let paused_for = pause_started.elapsed();
            if let Some(position) = state.positions.last_mut() {
                if let Some(started) = position.clock_started {
                    position.clock_started = Some(started + paused_for);
                }
            }
        }
        state.emit(GameEvent::Resumed);
        Ok(())
    }

    /// Puts a draw offer on the table. Only the side to move may offer, and
    /// only one offer can be pending at a time. The offer expires when a move
    /// is made.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfTurn`], [`Error::DrawOfferPending`] and the lifecycle
    /// guards.
    pub fn offer_draw(&mut self, color: Color) -> Result<(), Error> {
        let mut state = self.state();
        state.guard_active()?;
        if state.current().draw_offer().is_some() {
            return Err(Error::DrawOfferPending);
        }
        if state.current().side_to_move() != color {
            return Err(Error::OutOfTurn(color));
        }
        if let Some(position) = state.positions.last_mut() {
            position.set_draw_offer(Some(color));
        }
        state.emit(GameEvent::DrawOffered(color));
        Ok(())
    }

    /// Accepts the standing draw offer, ending the game in a draw credited
    /// to the offering side.
    ///
    /// # Errors
    ///
    /// [`Error::NoDrawOffer`] with no offer pending, [`Error::OutOfTurn`]
    /// when the offering side tries to accept its own offer.
    pub fn accept_draw(&mut self, color: Color) -> Result<(), Error> {
        {
            let mut state = self.state();
            state.guard_active()?;
            let offer = state.current().draw_offer().ok_or(Error::NoDrawOffer)?;
            if offer == color {
                return Err(Error::OutOfTurn(color));
            }
            let reason = match offer {
                Color::White => GameResultReason::WhiteDraw,
                Color::Black => GameResultReason::BlackDraw,
            };
            state.finish(GameResult::Draw, reason);
        }
        self.stop_ticker();
        Ok(())
    }

    /// Declines the standing draw offer; the game continues.
    ///
    /// # Errors
    ///
    /// Mirror image of [`Game::accept_draw`].
    pub fn decline_draw(&mut self, color: Color) -> Result<(), Error> {
        let mut state = self.state();
        state.guard_active()?;
        let offer = state.current().draw_offer().ok_or(Error::NoDrawOffer)?;
        if offer == color {
            return Err(Error::OutOfTurn(color));
        }
        if let Some(position) = state.positions.last_mut() {
            position.set_draw_offer(None);
        }
        state.emit(GameEvent::DrawDeclined(color));
        Ok(())
    }

    /// Resigns on behalf of the given side; the opponent wins.
    ///
    /// # Errors
    ///
    /// [`Error::NotInProgress`] unless the game is running.
    pub fn resign(&mut self, color: Color) -> Result<(), Error> {
        {
            let mut state = self.state();
            if state.result != GameResult::InProgress {
                return Err(Error::NotInProgress);
            }
            let result = match color {
                Color::White => GameResult::BlackWin,
                Color::Black => GameResult::WhiteWin,
            };
            state.finish(result, GameResultReason::Resignation);
        }
        self.stop_ticker();
        Ok(())
    }

    /// Claims a draw under the fifty-move rule.
    ///
    /// # Errors
    ///
    /// [`Error::FiftyMoveNotReached`] before 100 plies have passed without a
    /// capture or pawn move, plus the lifecycle guards.
    pub fn claim_fifty_move_draw(&mut self) -> Result<(), Error> {
        {
            let mut state = self.state();
            state.guard_active()?;
            if state.current().fifty_move_clock() < 100 {
                return Err(Error::FiftyMoveNotReached);
            }
            state.finish(GameResult::Draw, GameResultReason::FiftyMove);
        }
        self.stop_ticker();
        Ok(())
    }

    /// Aborts the game without a winner.
    ///
    /// # Errors
    ///
    /// [`Error::NotInProgress`] unless the game is running.
    pub fn terminate(&mut self) -> Result<(), Error> {
        {
            let mut state = self.state();
            if state.result != GameResult::InProgress {
                return Err(Error::NotInProgress);
            }
            state.finish(GameResult::Terminated, GameResultReason::Other);
        }
        self.stop_ticker();
        Ok(())
    }

    /// Relays a chat message to all listeners. Never affects game state.
    pub fn send_message(&self, text: impl Into<String>) {
        self.state().emit(GameEvent::Message(text.into()));
    }

    /// Replays a move received from a remote peer and overwrites the mover's
    /// clock with the peer's authoritative snapshot. The mover's side is
    /// normally unmanaged locally so the two clock sources never fight.
    ///
    /// # Errors
    ///
    /// Everything [`Game::make_move`] reports.
    pub fn apply_wire_move(&mut self, wire: &WireMove) -> Result<(), Error> {
        let mover = self.state().current().side_to_move();
        self.make_move(wire.origin, wire.destination, wire.promotion)?;
        let mut state = self.state();
        state.clocks.set_remaining(mover, wire.clock);
        if let Some(position) = state.positions.last_mut() {
            if position.timer_end.is_some() {
                position.timer_end = Some(wire.clock);
            }
        }
        Ok(())
    }

    /// Opens an event channel. Closed receivers are pruned on the next send.
    pub fn subscribe(&self) -> Receiver<GameEvent> {
        let (sender, receiver) = mpsc::channel();
        self.state().listeners.push(sender);
        receiver
    }

    /// Snapshot of the current position.
    #[must_use]
    pub fn position(&self) -> Position {
        self.state().current().clone()
    }

    /// Current result.
    #[must_use]
    pub fn result(&self) -> GameResult {
        self.state().result
    }

    /// Why the game ended, once it has.
    #[must_use]
    pub fn reason(&self) -> Option<GameResultReason> {
        self.state().reason
    }

    /// The given side's remaining time, counting down live for the side to
    /// move.
    #[must_use]
    pub fn remaining(&self, color: Color) -> Duration {
        let state = self.state();
        let base = state.clocks.remaining(color);
        if state.result == GameResult::InProgress && state.current().side_to_move() == color {
            if let Some(started) = state.current().clock_started {
                // While paused the reading freezes at the pause instant
                // instead of jumping back up to the raw clock value.
                let elapsed = match (state.paused, state.pause_started) {
                    (true, Some(pause_started)) => pause_started.saturating_duration_since(started),
                    (true, None) => Duration::ZERO,
                    (false, _) => started.elapsed(),
                };
                return base.saturating_sub(elapsed);
            }
        }
        base
    }

    /// True while the clocks are stopped by [`Game::pause`].
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.state().paused
    }

    /// White player's name.
    #[must_use]
    pub fn white(&self) -> &str {
        &self.white
    }

    /// Black player's name.
    #[must_use]
    pub fn black(&self) -> &str {
        &self.black
    }

    /// The game's settings.
    #[must_use]
    pub const fn settings(&self) -> &GameSettings {
        &self.settings
    }

    /// Notation of every move played so far, in order.
    #[must_use]
    pub fn moves(&self) -> Vec<String> {
        self.state()
            .positions
            .iter()
            .filter_map(|position| position.last_move())
            .map(ToString::to_string)
            .collect()
    }
}

impl Drop for Game {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}
