//! A [`Move`] describes one ply: origin, destination, the moving piece and
//! the flags derived from the position it was built against.
//!
//! The flags (capture, en passant, castle, promotion) depend on that position
//! and must not be recomputed against a different one. For equality and
//! history/redo matching a move is fully determined by its origin and
//! destination pair.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::chess::core::{Color, PieceKind, Square};
use crate::chess::error::Error;
use crate::chess::piece::Piece;
use crate::chess::position::Position;

/// Promotion lifecycle of a move.
///
/// A pawn reaching the farthest rank is flagged [`PromotionState::Pending`]
/// and transitions to [`PromotionState::Resolved`] exactly once, when the
/// mover picks a piece kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromotionState {
    /// The move is not a promotion.
    NotApplicable,
    /// The pawn reached the farthest rank; the replacement kind has not been
    /// chosen yet.
    Pending,
    /// The promotion kind has been chosen.
    Resolved(PieceKind),
}

/// A single ply, constructed either from two squares plus the position they
/// apply to, or parsed from short algebraic notation.
#[derive(Clone, Debug)]
pub struct Move {
    origin: Square,
    destination: Square,
    piece: Piece,
    capture: Option<Piece>,
    is_en_passant: bool,
    is_castle: bool,
    castle_rook: Option<Square>,
    promotion: PromotionState,
    notation: String,
}

/// Two moves are equal iff origin and destination match; flags are derivable
/// from the position a move was built against and resolved promotions do not
/// change identity.
impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.origin == other.origin && self.destination == other.destination
    }
}

impl Eq for Move {}

impl Move {
    /// Constructs a move from two squares against the given position,
    /// deriving all flags and rejecting shapes that can never be legal.
    ///
    /// # Errors
    ///
    /// [`Error::NoPieceAtOrigin`] for an empty origin,
    /// [`Error::CaptureOwnPiece`] and [`Error::IllegalPawnCapture`] for
    /// malformed captures, and the castle precondition errors
    /// ([`Error::InvalidCastleDestination`], [`Error::KingAlreadyMoved`],
    /// [`Error::RookAlreadyMoved`], [`Error::CastleOutOfCheck`]). Castling
    /// out of check is rejected here, not deferred to legality filtering.
    pub fn new(origin: Square, destination: Square, position: &Position) -> Result<Self, Error> {
        let piece = *position
            .piece_at(origin)
            .ok_or(Error::NoPieceAtOrigin(origin))?;

        // Any king slide of two or more files is a castle attempt; off-target
        // destinations fall out as InvalidCastleDestination.
        if piece.kind == PieceKind::King && (destination.file() - origin.file()).abs() >= 2 {
            return Self::new_castle(piece, destination, position);
        }

        let file_delta = (destination.file() - origin.file()).abs();
        let is_en_passant = piece.kind == PieceKind::Pawn
            && file_delta == 1
            && position.piece_at(destination).is_none()
            && position.en_passant_target() == Some(destination);

        let capture = match position.piece_at(destination) {
            Some(target) if target.color == piece.color => {
                return Err(Error::CaptureOwnPiece(destination));
            },
            Some(target) => {
                if piece.kind == PieceKind::Pawn && file_delta == 0 {
                    // A pawn cannot capture straight ahead.
                    return Err(Error::IllegalPawnCapture {
                        from: origin,
                        to: destination,
                    });
                }
                Some(*target)
            },
            None if is_en_passant => {
                let victim_square = Square::new(destination.file(), origin.rank());
                position.piece_at(victim_square).copied()
            },
            None => {
                if piece.kind == PieceKind::Pawn && file_delta != 0 {
                    // Diagonal pawn move to an empty square outside the
                    // en-passant case.
                    return Err(Error::IllegalPawnCapture {
                        from: origin,
                        to: destination,
                    });
                }
                None
            },
        };

        let promotion = if piece.kind == PieceKind::Pawn
            && destination.rank() == piece.color.promotion_rank()
        {
            PromotionState::Pending
        } else {
            PromotionState::NotApplicable
        };

        let mut mv = Self {
            origin,
            destination,
            piece,
            capture,
            is_en_passant,
            is_castle: false,
            castle_rook: None,
            promotion,
            notation: String::new(),
        };
        mv.notation = mv.san(position);
        Ok(mv)
    }

    fn new_castle(king: Piece, destination: Square, position: &Position) -> Result<Self, Error> {
        let home = king.color.home_rank();
        let valid_target = destination.rank() == home
            && king.square == Square::new(5, home)
            && (destination.file() == 3 || destination.file() == 7);
        if !valid_target {
            return Err(Error::InvalidCastleDestination(destination));
        }
        if king.has_moved {
            return Err(Error::KingAlreadyMoved);
        }
        let rook_file = if destination.file() == 7 { 8 } else { 1 };
        let rook_square = Square::new(rook_file, home);
        match position.piece_at(rook_square) {
            Some(rook)
                if rook.kind == PieceKind::Rook
                    && rook.color == king.color
                    && !rook.has_moved => {},
            _ => return Err(Error::RookAlreadyMoved),
        }
        if position.in_check() {
            return Err(Error::CastleOutOfCheck);
        }
        let mut mv = Self::pseudo_castle(king, destination, rook_square);
        mv.notation = mv.san(position);
        Ok(mv)
    }

    /// Parses short algebraic notation against the given position, using the
    /// position's legal-move list to resolve the destination and any
    /// file/rank disambiguation hints.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidNotation`] for text that is not SAN at all,
    /// [`Error::MoveNotFound`] when nothing legal matches and
    /// [`Error::AmbiguousMove`] when more than one legal move does; the
    /// parser never guesses.
    pub fn from_san(notation: &str, position: &Position) -> Result<Self, Error> {
        let text = notation.trim();
        if text.is_empty() || !text.is_ascii() {
            return Err(Error::InvalidNotation(notation.to_owned()));
        }
        let stripped = text.trim_end_matches(['+', '#']);

        if let Some(target_file) = match stripped {
            "0-0" | "O-O" => Some(7),
            "0-0-0" | "O-O-O" => Some(3),
            _ => None,
        } {
            let mut mv = position
                .legal_moves()
                .iter()
                .find(|m| m.is_castle && m.destination.file() == target_file)
                .cloned()
                .ok_or_else(|| Error::MoveNotFound(text.to_owned()))?;
            let notation = mv.san(position);
            mv.set_notation(notation);
            return Ok(mv);
        }

        let (body, promotion_kind) = match stripped.rsplit_once('=') {
            Some((body, suffix)) => {
                let kind = suffix
                    .chars()
                    .next()
                    .and_then(PieceKind::from_algebraic)
                    .filter(|kind| kind.is_promotion_kind() && suffix.len() == 1)
                    .ok_or_else(|| Error::InvalidNotation(text.to_owned()))?;
                (body, Some(kind))
            },
            None => (stripped, None),
        };
        if body.len() < 2 {
            return Err(Error::InvalidNotation(text.to_owned()));
        }

        let (head, destination_text) = body.split_at(body.len() - 2);
        let destination = Square::try_from(destination_text)
            .map_err(|_| Error::InvalidNotation(text.to_owned()))?;

        let mut head = head;
        let mut kind = PieceKind::Pawn;
        if let Some(first) = head.chars().next() {
            if first.is_ascii_uppercase() {
                kind = PieceKind::from_algebraic(first)
                    .ok_or_else(|| Error::InvalidNotation(text.to_owned()))?;
                head = &head[1..];
            }
        }

        let mut expects_capture = false;
        let mut file_hint = None;
        let mut rank_hint = None;
        for ch in head.chars() {
            match ch {
                'x' => expects_capture = true,
                'a'..='h' => file_hint = Some((ch as u8 - b'a') as i8 + 1),
                '1'..='8' => rank_hint = Some((ch as u8 - b'1') as i8 + 1),
                _ => return Err(Error::InvalidNotation(text.to_owned())),
            }
        }

        let candidates: Vec<&Self> = position
            .legal_moves()
            .iter()
            .filter(|m| {
                m.piece.kind == kind
                    && m.destination == destination
                    && file_hint.map_or(true, |file| m.origin.file() == file)
                    && rank_hint.map_or(true, |rank| m.origin.rank() == rank)
                    && (!expects_capture || m.is_capture())
            })
            .collect();
        let mut mv = match candidates.as_slice() {
            [] => return Err(Error::MoveNotFound(text.to_owned())),
            [only] => (*only).clone(),
            _ => return Err(Error::AmbiguousMove(text.to_owned())),
        };

        if let Some(kind) = promotion_kind {
            if mv.promotion != PromotionState::Pending {
                return Err(Error::InvalidNotation(text.to_owned()));
            }
            mv.resolve_promotion(kind)?;
        }
        mv.notation = mv.san(position);
        Ok(mv)
    }

    pub(crate) fn pseudo(piece: Piece, destination: Square, capture: Option<Piece>) -> Self {
        Self {
            origin: piece.square,
            destination,
            piece,
            capture,
            is_en_passant: false,
            is_castle: false,
            castle_rook: None,
            promotion: PromotionState::NotApplicable,
            notation: String::new(),
        }
    }

    pub(crate) fn pseudo_en_passant(piece: Piece, destination: Square, victim: Piece) -> Self {
        Self {
            is_en_passant: true,
            ..Self::pseudo(piece, destination, Some(victim))
        }
    }

    pub(crate) fn pseudo_castle(king: Piece, destination: Square, rook_square: Square) -> Self {
        Self {
            is_castle: true,
            castle_rook: Some(rook_square),
            ..Self::pseudo(king, destination, None)
        }
    }

    pub(crate) fn with_pending_promotion(mut self) -> Self {
        self.promotion = PromotionState::Pending;
        self
    }

    /// Transitions `Pending` to `Resolved(kind)`. Happens at most once per
    /// move; the caller regenerates the notation afterwards.
    pub(crate) fn resolve_promotion(&mut self, kind: PieceKind) -> Result<(), Error> {
        if !kind.is_promotion_kind() {
            return Err(Error::InvalidPromotionKind(kind));
        }
        if self.promotion != PromotionState::Pending {
            return Err(Error::NoPromotionPending);
        }
        self.promotion = PromotionState::Resolved(kind);
        Ok(())
    }

    pub(crate) fn set_notation(&mut self, notation: String) {
        self.notation = notation;
    }

    /// Renders the move in short algebraic notation against the position it
    /// was built on, without the check/checkmate suffix (the caller appends
    /// it once the resulting position is known).
    pub(crate) fn san(&self, previous: &Position) -> String {
        if self.is_castle {
            return if self.destination.file() == 7 {
                "0-0".to_owned()
            } else {
                "0-0-0".to_owned()
            };
        }
        let mut out = String::new();
        if self.piece.kind == PieceKind::Pawn {
            if self.is_capture() {
                out.push((b'a' + (self.origin.file() - 1) as u8) as char);
                out.push('x');
            }
            out.push_str(&self.destination.to_string());
        } else {
            out.push(self.piece.kind.algebraic());
            let rivals: Vec<Square> = previous
                .legal_moves()
                .iter()
                .filter(|m| {
                    m.piece.kind == self.piece.kind
                        && m.destination == self.destination
                        && m.origin != self.origin
                })
                .map(|m| m.origin)
                .collect();
            if !rivals.is_empty() {
                let file_unique = rivals.iter().all(|sq| sq.file() != self.origin.file());
                let rank_unique = rivals.iter().all(|sq| sq.rank() != self.origin.rank());
                if file_unique {
                    out.push((b'a' + (self.origin.file() - 1) as u8) as char);
                } else if rank_unique {
                    out.push_str(&self.origin.rank().to_string());
                } else {
                    out.push_str(&self.origin.to_string());
                }
            }
            if self.is_capture() {
                out.push('x');
            }
            out.push_str(&self.destination.to_string());
        }
        if let PromotionState::Resolved(kind) = self.promotion {
            out.push('=');
            out.push(kind.algebraic());
        }
        out
    }

    /// The square the move starts from.
    #[must_use]
    pub const fn origin(&self) -> Square {
        self.origin
    }

    /// The square the move ends on.
    #[must_use]
    pub const fn destination(&self) -> Square {
        self.destination
    }

    /// The moving piece, as it was before moving.
    #[must_use]
    pub const fn piece(&self) -> &Piece {
        &self.piece
    }

    /// The captured piece, if any. For en passant this is the pawn beside the
    /// destination, not a piece on the destination itself.
    #[must_use]
    pub const fn capture_piece(&self) -> Option<&Piece> {
        self.capture.as_ref()
    }

    /// Side making the move.
    #[must_use]
    pub const fn color(&self) -> Color {
        self.piece.color
    }

    /// Whether the move captures a piece (including en passant).
    #[must_use]
    pub const fn is_capture(&self) -> bool {
        self.capture.is_some()
    }

    /// Whether the move is an en-passant capture.
    #[must_use]
    pub const fn is_en_passant(&self) -> bool {
        self.is_en_passant
    }

    /// Whether the move is a castle. Castles are encoded as the king's
    /// two-file move, with [`Move::castle_rook`] naming the rook involved.
    #[must_use]
    pub const fn is_castle(&self) -> bool {
        self.is_castle
    }

    /// Origin square of the rook taking part in a castle.
    #[must_use]
    pub const fn castle_rook(&self) -> Option<Square> {
        self.castle_rook
    }

    /// Promotion lifecycle state of the move.
    #[must_use]
    pub const fn promotion(&self) -> PromotionState {
        self.promotion
    }

    /// Short algebraic notation of the move, including the check/checkmate
    /// suffix once the move has been applied to a position.
    #[must_use]
    pub fn notation(&self) -> &str {
        &self.notation
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.notation.is_empty() {
            write!(f, "{}{}", self.origin, self.destination)
        } else {
            f.write_str(&self.notation)
        }
    }
}

/// The remote-move wire format consumed by the networking collaborator:
/// origin, destination, promotion letter (or `0`) and the mover's resulting
/// clock snapshot in milliseconds. Enough to replay the ply on a remote peer
/// without re-deriving clock state.
///
/// ```
/// use zeitnot::chess::moves::WireMove;
///
/// let wire: WireMove = "e7 e8 q 59320".parse().unwrap();
/// assert_eq!(wire.to_string(), "e7 e8 q 59320");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WireMove {
    /// Origin square of the replayed move.
    pub origin: Square,
    /// Destination square of the replayed move.
    pub destination: Square,
    /// Resolved promotion kind, if the move promoted.
    pub promotion: Option<PieceKind>,
    /// The mover's remaining clock after the move, as reported by the peer.
    pub clock: Duration,
}

impl fmt::Display for WireMove {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let promotion = match self.promotion {
            Some(kind) => kind.algebraic().to_ascii_lowercase(),
            None => '0',
        };
        write!(
            f,
            "{} {} {} {}",
            self.origin,
            self.destination,
            promotion,
            self.clock.as_millis()
        )
    }
}

impl FromStr for WireMove {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidWireMove(input.to_owned());
        let mut parts = input.split_whitespace();
        let origin = parts
            .next()
            .and_then(|text| Square::try_from(text).ok())
            .ok_or_else(invalid)?;
        let destination = parts
            .next()
            .and_then(|text| Square::try_from(text).ok())
            .ok_or_else(invalid)?;
        let promotion = match parts.next().ok_or_else(invalid)? {
            "0" => None,
            letter => {
                let kind = letter
                    .chars()
                    .next()
                    .and_then(PieceKind::from_algebraic)
                    .filter(|kind| kind.is_promotion_kind() && letter.len() == 1)
                    .ok_or_else(invalid)?;
                Some(kind)
            },
        };
        let clock = parts
            .next()
            .and_then(|text| text.parse::<u64>().ok())
            .map(Duration::from_millis)
            .ok_or_else(invalid)?;
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self {
            origin,
            destination,
            promotion,
            clock,
        })
    }
}
