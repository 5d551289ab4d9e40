//! Zeitnot is a chess rules engine and timed-match state machine: legal move
//! generation by simulation, algebraic notation, FEN, concurrent countdown
//! clocks with flagfall, undo/redo and draw negotiation, plus an event stream
//! for observers.
//!
//! The crate makes no move choices of its own; it validates, applies and
//! times the moves two players (local or remote) feed it.
//!
//! ```
//! use zeitnot::chess::moves::Move;
//! use zeitnot::chess::position::Position;
//!
//! let position = Position::starting();
//! let opening = Move::from_san("e4", &position)?;
//! let position = Position::after_move(&position, &opening, None)?;
//! assert_eq!(
//!     position.to_fen(),
//!     "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
//! );
//! # Ok::<(), zeitnot::chess::error::Error>(())
//! ```

pub mod chess;

pub use chess::error::Error;
pub use chess::game::{Game, GameSettings};
