//! Chess rules and match bookkeeping.
//!
//! [`core`] holds the vocabulary types, [`piece`] and [`moves`] the move
//! generation and notation, [`position`] the board snapshots and legality
//! filter, and [`clock`] plus [`game`] the timed-match state machine built on
//! top of them.

pub mod clock;
pub mod core;
pub mod error;
pub mod game;
pub mod moves;
pub mod piece;
pub mod position;
