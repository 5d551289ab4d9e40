//! Error taxonomy for the engine.
//!
//! Everything fallible in the crate reports one of these variants and leaves
//! the state it was called on unchanged. Construction errors come from
//! malformed text (squares, FEN, algebraic notation), illegal-move errors are
//! raised at [`crate::chess::moves::Move`] construction time so an illegal
//! move is never attached to a position, and state errors guard the
//! [`crate::chess::game::Game`] lifecycle.

use crate::chess::core::{Color, PieceKind, Square};

/// Domain errors for the chess engine and match state machine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Square text was not a file letter followed by a rank digit.
    #[error("invalid square notation: {0}")]
    InvalidSquare(String),
    /// FEN input did not describe a usable position.
    #[error("invalid FEN: {0}")]
    InvalidFen(String),
    /// Short algebraic notation could not be parsed at all.
    #[error("invalid move notation: {0}")]
    InvalidNotation(String),
    /// Short algebraic notation matched more than one legal move.
    #[error("ambiguous move: {0}")]
    AmbiguousMove(String),
    /// Short algebraic notation matched no legal move.
    #[error("no matching legal move: {0}")]
    MoveNotFound(String),
    /// Remote wire move could not be decoded.
    #[error("invalid wire move: {0}")]
    InvalidWireMove(String),

    /// The origin square of a proposed move is empty.
    #[error("no piece on {0}")]
    NoPieceAtOrigin(Square),
    /// The destination holds a piece of the mover's own color.
    #[error("cannot capture own piece on {0}")]
    CaptureOwnPiece(Square),
    /// A pawn tried to push onto an occupied square or capture into thin air.
    #[error("illegal pawn capture from {from} to {to}")]
    IllegalPawnCapture {
        /// Origin of the offending pawn move.
        from: Square,
        /// Destination of the offending pawn move.
        to: Square,
    },
    /// A two-file king move that does not land on a castling square.
    #[error("invalid castle destination {0}")]
    InvalidCastleDestination(Square),
    /// Castling with a king that has already moved.
    #[error("cannot castle: king has already moved")]
    KingAlreadyMoved,
    /// Castling with a rook that has already moved (or is missing).
    #[error("cannot castle: rook has already moved")]
    RookAlreadyMoved,
    /// Castling while the king is in check.
    #[error("cannot castle out of check")]
    CastleOutOfCheck,
    /// Promotion to anything other than queen, rook, bishop or knight.
    #[error("cannot promote a pawn to {0:?}")]
    InvalidPromotionKind(PieceKind),
    /// The (origin, destination) pair matches no move in the legal list.
    #[error("no legal move from {from} to {to}")]
    IllegalMove {
        /// Origin of the rejected move.
        from: Square,
        /// Destination of the rejected move.
        to: Square,
    },

    /// Acting on a game that is not running.
    #[error("game is not in progress")]
    NotInProgress,
    /// Starting a game that already left the initial state.
    #[error("game has already started")]
    AlreadyStarted,
    /// Acting on a paused game.
    #[error("game is paused")]
    Paused,
    /// Resuming a game that is not paused.
    #[error("game is not paused")]
    NotPaused,
    /// Pausing a game whose settings forbid it.
    #[error("pausing is disabled for this game")]
    PauseDisabled,
    /// A draw operation attempted by the wrong side.
    #[error("it is not {0}'s turn")]
    OutOfTurn(Color),
    /// Undoing when the settings forbid it.
    #[error("undo is disabled for this game")]
    UndoDisabled,
    /// Undoing past the initial position.
    #[error("no move to undo")]
    NothingToUndo,
    /// Redoing with no stashed position.
    #[error("no move to redo")]
    NothingToRedo,
    /// Playing on while the previous ply awaits its promotion choice.
    #[error("the last move is awaiting a promotion choice")]
    PromotionPending,
    /// Resolving a promotion when none is pending.
    #[error("no promotion is pending")]
    NoPromotionPending,
    /// Accepting or declining a draw that was never offered.
    #[error("no draw offer is pending")]
    NoDrawOffer,
    /// Offering a draw while one is already on the table.
    #[error("a draw offer is already pending")]
    DrawOfferPending,
    /// Claiming the fifty-move rule before the counter expired.
    #[error("the fifty-move counter has not expired")]
    FiftyMoveNotReached,
}
