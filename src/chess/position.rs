//! Board and position representation, FEN parsing and the legality filter.
//!
//! A [`Position`] is an immutable snapshot of the game after some number of
//! plies: piece placement plus the bookkeeping needed to continue (side to
//! move, en-passant target, counters) and the derived facts computed once at
//! construction (check flags, the full legal-move list, checkmate). Applying
//! a move never mutates a position; it produces the successor.

use std::fmt::{self, Write};
use std::time::{Duration, Instant};

use itertools::Itertools;

use crate::chess::core::{CastleSide, Color, PieceKind, Square, BOARD_WIDTH};
use crate::chess::error::Error;
use crate::chess::moves::{Move, PromotionState};
use crate::chess::piece::Piece;

/// FEN of the starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

type Board = [[Option<Piece>; BOARD_WIDTH as usize]; BOARD_WIDTH as usize];

bitflags::bitflags! {
    /// Castling availability of both sides, in FEN terms.
    ///
    /// Only used at the FEN boundary: inside a position the rights are carried
    /// by the king's and rooks' `has_moved` flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub(crate) struct CastleRights: u8 {
        const WHITE_SHORT = 0b0001;
        const WHITE_LONG = 0b0010;
        const BLACK_SHORT = 0b0100;
        const BLACK_LONG = 0b1000;
    }
}

impl CastleRights {
    fn from_notation(text: &str) -> Result<Self, Error> {
        if text == "-" {
            return Ok(Self::empty());
        }
        let mut rights = Self::empty();
        for symbol in text.chars() {
            let flag = match symbol {
                'K' => Self::WHITE_SHORT,
                'Q' => Self::WHITE_LONG,
                'k' => Self::BLACK_SHORT,
                'q' => Self::BLACK_LONG,
                _ => {
                    return Err(Error::InvalidFen(format!(
                        "unknown castling symbol '{symbol}'"
                    )));
                },
            };
            if rights.contains(flag) {
                return Err(Error::InvalidFen(format!(
                    "duplicate castling symbol '{symbol}'"
                )));
            }
            rights |= flag;
        }
        Ok(rights)
    }
}

impl fmt::Display for CastleRights {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_empty() {
            return f.write_char('-');
        }
        for (flag, symbol) in [
            (Self::WHITE_SHORT, 'K'),
            (Self::WHITE_LONG, 'Q'),
            (Self::BLACK_SHORT, 'k'),
            (Self::BLACK_LONG, 'q'),
        ] {
            if self.contains(flag) {
                f.write_char(symbol)?;
            }
        }
        Ok(())
    }
}

/// State of the chess game after some sequence of plies.
///
/// Each position owns its own copies of the pieces and the legal moves of the
/// side to move; successors are built with the internal appliers and never
/// share mutable state with their predecessor.
#[derive(Clone)]
pub struct Position {
    board: Board,
    white_king: Square,
    black_king: Square,
    side_to_move: Color,
    in_check: bool,
    giving_check: bool,
    checkmate: bool,
    en_passant_target: Option<Square>,
    legal_moves: Vec<Move>,
    last_move: Option<Move>,
    ply: u32,
    fifty_move_clock: u32,
    fullmove_number: u32,
    draw_offer: Option<Color>,
    captured: Vec<Piece>,
    /// The mover's remaining clock, snapshotted when this position was
    /// created by a move.
    pub(crate) timer_end: Option<Duration>,
    /// When the side to move's clock started running in this position.
    pub(crate) clock_started: Option<Instant>,
    /// Successor stashed by an undo, so the move can be replayed.
    pub(crate) redo: Option<Box<Position>>,
}

impl Position {
    /// The starting position of a game of chess.
    #[must_use]
    pub fn starting() -> Self {
        const BACK_RANK: [PieceKind; BOARD_WIDTH as usize] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        let mut board: Board = Default::default();
        for (index, kind) in BACK_RANK.iter().enumerate() {
            let file = index as i8 + 1;
            for color in [Color::White, Color::Black] {
                let home = Square::new(file, color.home_rank());
                board[(home.rank() - 1) as usize][(home.file() - 1) as usize] =
                    Some(Piece::new(*kind, color, home));
                let pawn = Square::new(file, color.pawn_rank());
                board[(pawn.rank() - 1) as usize][(pawn.file() - 1) as usize] =
                    Some(Piece::new(PieceKind::Pawn, color, pawn));
            }
        }
        let mut position = Self::assemble(
            board,
            Square::new(5, 1),
            Square::new(5, 8),
            Color::White,
            None,
            0,
            0,
            1,
        );
        position.finalize(true);
        position
    }

    /// Parses [Forsyth-Edwards Notation].
    ///
    /// The six fields are validated one by one and the first problem is
    /// reported. Positions where the side to move already attacks the enemy
    /// king are rejected: no legal game reaches them and the legality filter
    /// relies on kings never being capturable.
    ///
    /// [Forsyth-Edwards Notation]: https://www.chessprogramming.org/Forsyth-Edwards_Notation
    ///
    /// # Errors
    ///
    /// [`Error::InvalidFen`] describing the offending field.
    pub fn from_fen(input: &str) -> Result<Self, Error> {
        let Some((placement, side, castling, en_passant, halfmove, fullmove)) =
            input.split_whitespace().collect_tuple()
        else {
            return Err(Error::InvalidFen(format!(
                "FEN should have 6 whitespace-separated fields: '{input}'"
            )));
        };

        let mut board: Board = Default::default();
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != BOARD_WIDTH as usize {
            return Err(Error::InvalidFen(format!(
                "piece placement should have 8 ranks: '{placement}'"
            )));
        }
        for (row, rank_text) in ranks.iter().enumerate() {
            let rank = BOARD_WIDTH - row as i8;
            let mut file: i8 = 1;
            for symbol in rank_text.chars() {
                if let Some(skip) = symbol.to_digit(10) {
                    file = file.saturating_add(skip as i8);
                    continue;
                }
                if file > BOARD_WIDTH {
                    return Err(Error::InvalidFen(format!("rank is too long: '{rank_text}'")));
                }
                let square = Square::new(file, rank);
                let piece = Piece::from_fen_symbol(symbol, square).ok_or_else(|| {
                    Error::InvalidFen(format!("unknown piece symbol '{symbol}'"))
                })?;
                board[(rank - 1) as usize][(file - 1) as usize] = Some(piece);
                file += 1;
            }
            if file != BOARD_WIDTH + 1 {
                return Err(Error::InvalidFen(format!(
                    "rank does not cover 8 files: '{rank_text}'"
                )));
            }
        }

        let side_to_move = Color::try_from(side)?;
        let rights = CastleRights::from_notation(castling)?;

        let occupant = |square: Square, kind: PieceKind, color: Color| {
            matches!(
                board[(square.rank() - 1) as usize][(square.file() - 1) as usize],
                Some(piece) if piece.kind == kind && piece.color == color
            )
        };
        for (flag, king, rook) in [
            (CastleRights::WHITE_SHORT, "e1", "h1"),
            (CastleRights::WHITE_LONG, "e1", "a1"),
            (CastleRights::BLACK_SHORT, "e8", "h8"),
            (CastleRights::BLACK_LONG, "e8", "a8"),
        ] {
            if !rights.contains(flag) {
                continue;
            }
            let color = if flag.intersects(CastleRights::WHITE_SHORT | CastleRights::WHITE_LONG) {
                Color::White
            } else {
                Color::Black
            };
            let king = Square::try_from(king)?;
            let rook = Square::try_from(rook)?;
            if !occupant(king, PieceKind::King, color) || !occupant(rook, PieceKind::Rook, color) {
                return Err(Error::InvalidFen(format!(
                    "castling rights '{castling}' do not match piece placement"
                )));
            }
        }

        let mut white_king = None;
        let mut black_king = None;
        for slot in board.iter_mut().flatten() {
            let Some(piece) = slot else { continue };
            piece.has_moved = match piece.kind {
                PieceKind::Pawn => piece.square.rank() != piece.color.pawn_rank(),
                PieceKind::King => {
                    let own = match piece.color {
                        Color::White => CastleRights::WHITE_SHORT | CastleRights::WHITE_LONG,
                        Color::Black => CastleRights::BLACK_SHORT | CastleRights::BLACK_LONG,
                    };
                    !rights.intersects(own)
                },
                PieceKind::Rook => {
                    let flag = match (piece.color, piece.square.file()) {
                        (Color::White, 8) => CastleRights::WHITE_SHORT,
                        (Color::White, 1) => CastleRights::WHITE_LONG,
                        (Color::Black, 8) => CastleRights::BLACK_SHORT,
                        (Color::Black, 1) => CastleRights::BLACK_LONG,
                        _ => CastleRights::empty(),
                    };
                    piece.square.rank() != piece.color.home_rank() || !rights.contains(flag)
                },
                _ => false,
            };
            if piece.kind == PieceKind::King {
                let king = match piece.color {
                    Color::White => &mut white_king,
                    Color::Black => &mut black_king,
                };
                if king.replace(piece.square).is_some() {
                    return Err(Error::InvalidFen(format!(
                        "more than one {} king",
                        piece.color
                    )));
                }
            }
        }
        let (Some(white_king), Some(black_king)) = (white_king, black_king) else {
            return Err(Error::InvalidFen(
                "both sides should have exactly one king".into(),
            ));
        };

        let en_passant_target = match en_passant {
            "-" => None,
            text => {
                let target = Square::try_from(text)
                    .map_err(|_| Error::InvalidFen(format!("invalid en passant target '{text}'")))?;
                let doubled = side_to_move.opposite();
                if target.rank() != doubled.pawn_rank() + doubled.push_direction() {
                    return Err(Error::InvalidFen(format!(
                        "en passant target '{text}' is on the wrong rank"
                    )));
                }
                Some(target)
            },
        };

        let fifty_move_clock: u32 = halfmove
            .parse()
            .map_err(|_| Error::InvalidFen(format!("invalid halfmove clock '{halfmove}'")))?;
        let fullmove_number: u32 = fullmove
            .parse()
            .ok()
            .filter(|number| *number >= 1)
            .ok_or_else(|| Error::InvalidFen(format!("invalid fullmove number '{fullmove}'")))?;

        let ply = (fullmove_number - 1)
            .checked_mul(2)
            .and_then(|ply| ply.checked_add(u32::from(side_to_move == Color::Black)))
            .ok_or_else(|| Error::InvalidFen(format!("invalid fullmove number '{fullmove}'")))?;
        let mut position = Self::assemble(
            board,
            white_king,
            black_king,
            side_to_move,
            en_passant_target,
            ply,
            fifty_move_clock,
            fullmove_number,
        );
        position.finalize(true);
        if position.giving_check {
            return Err(Error::InvalidFen(format!(
                "{} is to move but the {} king is already attacked",
                side_to_move,
                side_to_move.opposite()
            )));
        }
        Ok(position)
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        board: Board,
        white_king: Square,
        black_king: Square,
        side_to_move: Color,
        en_passant_target: Option<Square>,
        ply: u32,
        fifty_move_clock: u32,
        fullmove_number: u32,
    ) -> Self {
        Self {
            board,
            white_king,
            black_king,
            side_to_move,
            in_check: false,
            giving_check: false,
            checkmate: false,
            en_passant_target,
            legal_moves: Vec::new(),
            last_move: None,
            ply,
            fifty_move_clock,
            fullmove_number,
            draw_offer: None,
            captured: Vec::new(),
            timer_end: None,
            clock_started: None,
            redo: None,
        }
    }

    /// Applies a legal move and computes the successor's derived state,
    /// including the move's final notation with its check suffix.
    ///
    /// `promotion` resolves the move's pending promotion if it has one;
    /// passing `None` leaves the promotion pending, which blocks further play
    /// until [`crate::chess::game::Game::set_promotion`] rebuilds the
    /// position.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPromotionKind`] when `promotion` names a kind a pawn
    /// cannot become.
    pub fn after_move(
        previous: &Self,
        mv: &Move,
        promotion: Option<PieceKind>,
    ) -> Result<Self, Error> {
        let mut next = Self::apply(previous, mv, promotion)?;
        next.finalize(true);
        if let Some(last) = &mut next.last_move {
            let mut notation = last.san(previous);
            if next.checkmate {
                notation.push('#');
            } else if next.in_check {
                notation.push('+');
            }
            last.set_notation(notation);
        }
        Ok(next)
    }

    /// Moves the pieces and advances the counters without computing legal
    /// moves or notation. The caller finalizes.
    fn apply(previous: &Self, mv: &Move, promotion: Option<PieceKind>) -> Result<Self, Error> {
        let mut mv = mv.clone();
        if let Some(kind) = promotion {
            if mv.promotion() == PromotionState::Pending {
                mv.resolve_promotion(kind)?;
            }
        }
        let mover = *mv.piece();

        let mut board = previous.board;
        fn slot(board: &mut Board, square: Square) -> &mut Option<Piece> {
            &mut board[(square.rank() - 1) as usize][(square.file() - 1) as usize]
        }

        let mut captured = previous.captured.clone();
        if let Some(victim) = mv.capture_piece() {
            // For en passant the victim square differs from the destination.
            *slot(&mut board, victim.square) = None;
            captured.push(*victim);
        }

        *slot(&mut board, mv.origin()) = None;
        let kind = match mv.promotion() {
            PromotionState::Resolved(kind) => kind,
            _ => mover.kind,
        };
        *slot(&mut board, mv.destination()) = Some(Piece {
            kind,
            color: mover.color,
            square: mv.destination(),
            has_moved: true,
        });

        if mv.is_castle() {
            if let Some(rook_square) = mv.castle_rook() {
                if let Some(rook) = slot(&mut board, rook_square).take() {
                    let side = if mv.destination().file() == 7 {
                        CastleSide::King
                    } else {
                        CastleSide::Queen
                    };
                    let target = Square::new(side.rook_target_file(), mover.color.home_rank());
                    *slot(&mut board, target) = Some(Piece {
                        square: target,
                        has_moved: true,
                        ..rook
                    });
                }
            }
        }

        let (mut white_king, mut black_king) = (previous.white_king, previous.black_king);
        if mover.kind == PieceKind::King {
            match mover.color {
                Color::White => white_king = mv.destination(),
                Color::Black => black_king = mv.destination(),
            }
        }

        let is_double_push = mover.kind == PieceKind::Pawn
            && (mv.destination().rank() - mv.origin().rank()).abs() == 2;
        let en_passant_target = if is_double_push {
            Some(Square::new(
                mv.origin().file(),
                mv.origin().rank() + mover.color.push_direction(),
            ))
        } else {
            None
        };

        let fifty_move_clock = if mv.is_capture() || mover.kind == PieceKind::Pawn {
            0
        } else {
            previous.fifty_move_clock + 1
        };
        let fullmove_number =
            previous.fullmove_number + u32::from(mover.color == Color::Black);

        let mut next = Self::assemble(
            board,
            white_king,
            black_king,
            mover.color.opposite(),
            en_passant_target,
            previous.ply + 1,
            fifty_move_clock,
            fullmove_number,
        );
        next.captured = captured;
        next.last_move = Some(mv);
        Ok(next)
    }

    /// Computes the derived state: check flags and, when `filter` is set, the
    /// legal-move list and checkmate.
    ///
    /// Legality is decided by simulation: a candidate is legal iff the
    /// position after it does not leave the mover's king attacked. The
    /// simulated successors are finalized without filtering, which is what
    /// keeps the recursion depth at one.
    fn finalize(&mut self, filter: bool) {
        let us = self.side_to_move;
        let them = us.opposite();
        self.in_check = self.attacks_square(self.king_square(us), them);
        self.giving_check = self.attacks_square(self.king_square(them), us);
        if !filter {
            return;
        }

        let mut legal = Vec::new();
        for piece in self.pieces(us) {
            for candidate in piece.pseudo_legal_moves(self) {
                if self.simulation_allows(&candidate) {
                    legal.push(candidate);
                }
            }
        }
        // Castling is never an escape from check, and each square the king
        // crosses must be safe on its own.
        if !self.in_check {
            if let Some(king) = self.piece_at(self.king_square(us)).copied() {
                for candidate in king.castle_candidates(self) {
                    if self.castle_allowed(&king, &candidate) {
                        legal.push(candidate);
                    }
                }
            }
        }
        self.checkmate = self.in_check && legal.is_empty();
        self.legal_moves = legal;
    }

    fn simulation_allows(&self, candidate: &Move) -> bool {
        match Self::apply(self, candidate, None) {
            Ok(mut next) => {
                next.finalize(false);
                // The sides flipped: the successor "giving check" means the
                // mover left their own king attacked.
                !next.giving_check
            },
            Err(_) => false,
        }
    }

    fn castle_allowed(&self, king: &Piece, candidate: &Move) -> bool {
        let step = if candidate.destination().file() > king.square.file() {
            1
        } else {
            -1
        };
        let mut file = king.square.file() + step;
        while file != candidate.destination().file() {
            let transit = Move::pseudo(*king, Square::new(file, king.square.rank()), None);
            if !self.simulation_allows(&transit) {
                return false;
            }
            file += step;
        }
        self.simulation_allows(candidate)
    }

    /// The piece on the given square, if any. Off-board squares are empty.
    #[must_use]
    pub fn piece_at(&self, square: Square) -> Option<&Piece> {
        if !square.is_valid() {
            return None;
        }
        self.board[(square.rank() - 1) as usize][(square.file() - 1) as usize].as_ref()
    }

    fn pieces(&self, color: Color) -> Vec<Piece> {
        self.board
            .iter()
            .flatten()
            .flatten()
            .filter(|piece| piece.color == color)
            .copied()
            .collect()
    }

    /// True iff any piece of `by` has a pseudo-legal move onto `target`.
    /// Pinned attackers still count; this is attack, not legality.
    #[must_use]
    pub fn attacks_square(&self, target: Square, by: Color) -> bool {
        self.pieces(by).iter().any(|piece| {
            piece
                .pseudo_legal_moves(self)
                .iter()
                .any(|m| m.destination() == target)
        })
    }

    /// The side whose turn it is.
    #[must_use]
    pub const fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// True iff the side to move's king is attacked.
    #[must_use]
    pub const fn in_check(&self) -> bool {
        self.in_check
    }

    /// True iff the side to move attacks the opponent's king. Never true in a
    /// position reachable by legal play.
    #[must_use]
    pub const fn giving_check(&self) -> bool {
        self.giving_check
    }

    /// True iff the side to move is checkmated.
    #[must_use]
    pub const fn is_checkmate(&self) -> bool {
        self.checkmate
    }

    /// True iff the side to move has no legal move but is not in check.
    #[must_use]
    pub fn is_stalemate(&self) -> bool {
        !self.in_check && self.legal_moves.is_empty()
    }

    /// The square behind the last double pawn push, if the last move was one.
    #[must_use]
    pub const fn en_passant_target(&self) -> Option<Square> {
        self.en_passant_target
    }

    /// All legal moves of the side to move.
    #[must_use]
    pub fn legal_moves(&self) -> &[Move] {
        &self.legal_moves
    }

    /// The move that created this position, if any.
    #[must_use]
    pub const fn last_move(&self) -> Option<&Move> {
        self.last_move.as_ref()
    }

    /// True iff the move that created this position still awaits its
    /// promotion choice.
    #[must_use]
    pub fn promotion_pending(&self) -> bool {
        self.last_move
            .as_ref()
            .is_some_and(|mv| mv.promotion() == PromotionState::Pending)
    }

    /// Number of plies played to reach this position.
    #[must_use]
    pub const fn ply(&self) -> u32 {
        self.ply
    }

    /// Plies since the last capture or pawn move.
    #[must_use]
    pub const fn fifty_move_clock(&self) -> u32 {
        self.fifty_move_clock
    }

    /// The FEN fullmove number, starting at 1 and incremented after Black
    /// moves.
    #[must_use]
    pub const fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// The side with an outstanding draw offer, if any.
    #[must_use]
    pub const fn draw_offer(&self) -> Option<Color> {
        self.draw_offer
    }

    pub(crate) fn set_draw_offer(&mut self, color: Option<Color>) {
        self.draw_offer = color;
    }

    /// All pieces captured on the way to this position, in capture order.
    #[must_use]
    pub fn captured_pieces(&self) -> &[Piece] {
        &self.captured
    }

    /// The given side's king square.
    #[must_use]
    pub const fn king_square(&self, color: Color) -> Square {
        match color {
            Color::White => self.white_king,
            Color::Black => self.black_king,
        }
    }

    /// True iff neither side can possibly deliver checkmate: bare kings, a
    /// single minor piece, or one bishop each on the same square shade.
    #[must_use]
    pub fn has_insufficient_material(&self) -> bool {
        let mut minors: Vec<&Piece> = Vec::new();
        for piece in self.board.iter().flatten().flatten() {
            match piece.kind {
                PieceKind::King => {},
                PieceKind::Bishop | PieceKind::Knight => minors.push(piece),
                _ => return false,
            }
        }
        match minors.as_slice() {
            [] | [_] => true,
            [first, second] => {
                first.kind == PieceKind::Bishop
                    && second.kind == PieceKind::Bishop
                    && first.color != second.color
                    && first.square.is_light() == second.square.is_light()
            },
            _ => false,
        }
    }

    fn castle_rights(&self) -> CastleRights {
        let mut rights = CastleRights::empty();
        for (flag, king, rook) in [
            (CastleRights::WHITE_SHORT, self.white_king, Square::new(8, 1)),
            (CastleRights::WHITE_LONG, self.white_king, Square::new(1, 1)),
            (CastleRights::BLACK_SHORT, self.black_king, Square::new(8, 8)),
            (CastleRights::BLACK_LONG, self.black_king, Square::new(1, 8)),
        ] {
            let king_ready = matches!(
                self.piece_at(king),
                Some(piece) if piece.kind == PieceKind::King && !piece.has_moved
            );
            let rook_ready = matches!(
                self.piece_at(rook),
                Some(piece) if piece.kind == PieceKind::Rook && !piece.has_moved
            );
            if king_ready && rook_ready {
                rights |= flag;
            }
        }
        rights
    }

    /// Serializes the position to FEN. `Display` renders the same text.
    #[must_use]
    pub fn to_fen(&self) -> String {
        let mut out = String::new();
        for rank in (1..=BOARD_WIDTH).rev() {
            let mut empty_run = 0;
            for file in 1..=BOARD_WIDTH {
                match self.piece_at(Square::new(file, rank)) {
                    Some(piece) => {
                        if empty_run > 0 {
                            out.push_str(&empty_run.to_string());
                            empty_run = 0;
                        }
                        out.push(piece.fen_symbol());
                    },
                    None => empty_run += 1,
                }
            }
            if empty_run > 0 {
                out.push_str(&empty_run.to_string());
            }
            if rank > 1 {
                out.push('/');
            }
        }
        let en_passant = match self.en_passant_target {
            Some(target) => target.to_string(),
            None => "-".to_owned(),
        };
        out.push_str(&format!(
            " {} {} {} {} {}",
            self.side_to_move,
            self.castle_rights(),
            en_passant,
            self.fifty_move_clock,
            self.fullmove_number
        ));
        out
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_fen())
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Position({})", self.to_fen())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn square(text: &str) -> Square {
        Square::try_from(text).unwrap()
    }

    fn play(position: &Position, from: &str, to: &str) -> Position {
        let mv = Move::new(square(from), square(to), position).unwrap();
        Position::after_move(position, &mv, None).unwrap()
    }

    #[test]
    fn starting_position_matches_fen() {
        let position = Position::starting();
        assert_eq!(position.to_fen(), STARTING_FEN);
        assert_eq!(position.legal_moves().len(), 20);
        assert!(!position.in_check());
        assert_eq!(position.ply(), 0);
    }

    #[test]
    fn fen_round_trip() {
        for fen in [
            STARTING_FEN,
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2",
            "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
            "4k3/8/8/8/8/8/8/R3K2R w KQ - 12 40",
            "8/8/8/8/8/5k2/8/5K1q w - - 0 1",
        ] {
            let position = Position::from_fen(fen).unwrap();
            assert_eq!(position.to_fen(), fen);
        }
    }

    #[test]
    fn fen_rejects_malformed_input() {
        for fen in [
            "",
            "not fen at all",
            // Missing a field.
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -",
            // 7 ranks.
            "rnbqkbnr/pppppppp/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            // Rank too long.
            "rnbqkbnr/ppppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            // Unknown symbol.
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQXBNR w KQkq - 0 1",
            // No white king.
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQ1BNR w kq - 0 1",
            // Two white kings.
            "rnbqkbnr/pppppppp/8/8/8/4K3/PPPPPPPP/RNBQKBNR w kq - 0 1",
            // Rights claim an absent rook.
            "rnbqkbn1/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            // Bad side to move.
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1",
            // En passant target on a nonsensical rank.
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq e4 0 1",
            // Fullmove number of zero.
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 0",
            // Digit run past the edge of the rank.
            "99999999999999999999/8/8/8/8/8/8/4K2k w - - 0 1",
            // Fullmove number too large for a ply count.
            "4k3/8/8/8/8/8/8/4K3 w - - 0 3000000000",
            // White to move but Black's king is already attacked.
            "4k3/4R3/8/8/8/8/8/4K3 w - - 0 1",
        ] {
            assert!(Position::from_fen(fen).is_err(), "accepted: {fen}");
        }
    }

    #[test]
    fn applying_moves_updates_counters_and_targets() {
        let position = Position::starting();
        let position = play(&position, "e2", "e4");
        assert_eq!(position.side_to_move(), Color::Black);
        assert_eq!(position.en_passant_target(), Some(square("e3")));
        assert_eq!(position.ply(), 1);
        assert_eq!(position.fifty_move_clock(), 0);

        let position = play(&position, "g8", "f6");
        assert_eq!(position.en_passant_target(), None);
        assert_eq!(position.fifty_move_clock(), 1);
        assert_eq!(position.fullmove_number(), 2);
        assert_eq!(position.last_move().unwrap().notation(), "Nf6");
    }

    #[test]
    fn king_must_leave_check() {
        let position = Position::from_fen("4k3/8/8/8/7b/8/5PPP/4K3 b - - 0 1").unwrap();
        let position = play(&position, "h4", "f2");
        assert!(position.in_check());
        assert_eq!(position.last_move().unwrap().notation(), "Bxf2+");
        // A contact check cannot be blocked: every reply is a king move.
        assert!(!position.legal_moves().is_empty());
        for reply in position.legal_moves() {
            assert_eq!(reply.piece().kind, PieceKind::King, "reply: {reply}");
        }
        assert!(position
            .legal_moves()
            .iter()
            .any(|m| m.to_string() == "e1f2"));
    }

    #[test]
    fn pinned_piece_cannot_move() {
        // The d2 knight is pinned against the king by the d8 rook.
        let position = Position::from_fen("3rk3/8/8/8/8/8/3N4/3K4 w - - 0 1").unwrap();
        assert!(!position
            .legal_moves()
            .iter()
            .any(|m| m.origin() == square("d2")));
    }

    #[test]
    fn scholars_mate_is_checkmate() {
        let mut position = Position::starting();
        for (from, to) in [
            ("e2", "e4"),
            ("e7", "e5"),
            ("f1", "c4"),
            ("b8", "c6"),
            ("d1", "h5"),
            ("g8", "f6"),
            ("h5", "f7"),
        ] {
            position = play(&position, from, to);
        }
        assert!(position.is_checkmate());
        assert!(position.legal_moves().is_empty());
        assert_eq!(position.last_move().unwrap().notation(), "Qxf7#");
    }

    #[test]
    fn stalemate_is_detected() {
        let position = Position::from_fen("7k/5Q2/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let position = play(&position, "f7", "g6");
        assert!(position.is_stalemate());
        assert!(!position.is_checkmate());
        assert!(!position.in_check());
    }

    #[test]
    fn en_passant_removes_the_doubled_pawn() {
        let position =
            Position::from_fen("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3")
                .unwrap();
        let position = play(&position, "e5", "d6");
        assert!(position.piece_at(square("d5")).is_none());
        assert_eq!(position.captured_pieces().len(), 1);
        assert_eq!(position.captured_pieces()[0].kind, PieceKind::Pawn);
        assert_eq!(position.last_move().unwrap().notation(), "exd6");
    }

    #[test]
    fn castling_moves_both_pieces_and_drops_rights() {
        let position = Position::from_fen("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let castled = play(&position, "e1", "g1");
        assert_eq!(castled.king_square(Color::White), square("g1"));
        assert_eq!(
            castled.piece_at(square("f1")).map(|piece| piece.kind),
            Some(PieceKind::Rook)
        );
        assert!(castled.piece_at(square("h1")).is_none());
        assert!(castled.to_fen().contains(" - "), "fen: {castled}");
    }

    #[test]
    fn castling_through_an_attacked_square_is_illegal() {
        // The f1 transit square is covered by the a6 bishop.
        let position = Position::from_fen("4k3/8/b7/8/8/8/8/4K2R w K - 0 1").unwrap();
        assert!(!position.legal_moves().iter().any(Move::is_castle));
        // Attacking only the rook's square does not block the castle.
        let position = Position::from_fen("4k3/8/2b5/8/8/8/8/4K2R w K - 0 1").unwrap();
        assert!(position.legal_moves().iter().any(Move::is_castle));
    }

    #[test]
    fn promotion_stays_pending_until_resolved() {
        let position = Position::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let mv = Move::new(square("a7"), square("a8"), &position).unwrap();
        let pending = Position::after_move(&position, &mv, None).unwrap();
        assert!(pending.promotion_pending());
        assert_eq!(
            pending.piece_at(square("a8")).map(|piece| piece.kind),
            Some(PieceKind::Pawn)
        );

        let resolved = Position::after_move(&position, &mv, Some(PieceKind::Queen)).unwrap();
        assert!(!resolved.promotion_pending());
        assert_eq!(
            resolved.piece_at(square("a8")).map(|piece| piece.kind),
            Some(PieceKind::Queen)
        );
        assert_eq!(resolved.last_move().unwrap().notation(), "a8=Q");
        assert_eq!(
            Position::after_move(&position, &mv, Some(PieceKind::King)).err(),
            Some(Error::InvalidPromotionKind(PieceKind::King))
        );
    }

    #[test]
    fn insufficient_material_cases() {
        for (fen, insufficient) in [
            ("8/8/4k3/8/8/4K3/8/8 w - - 0 1", true),
            ("8/8/4k3/8/8/4KB2/8/8 w - - 0 1", true),
            ("8/8/4k3/8/8/4KN2/8/8 w - - 0 1", true),
            // Same-shade bishops: c1 and f4 are both dark.
            ("8/8/4k3/8/5b2/4K3/8/2B5 w - - 0 1", true),
            // Opposite shades can still mate.
            ("8/8/4k3/8/4b3/4K3/8/2B5 w - - 0 1", false),
            ("8/8/4k3/8/8/4KR2/8/8 w - - 0 1", false),
            ("8/8/4k3/4p3/8/4K3/8/8 w - - 0 1", false),
            ("8/8/4k3/8/8/3NKN2/8/8 w - - 0 1", false),
        ] {
            let position = Position::from_fen(fen).unwrap();
            assert_eq!(
                position.has_insufficient_material(),
                insufficient,
                "fen: {fen}"
            );
        }
    }

    #[test]
    fn fifty_move_clock_resets_on_pawn_moves_and_captures() {
        let position = Position::from_fen("4k3/8/8/8/3n4/8/3P4/R3K3 w - - 10 40").unwrap();
        assert_eq!(play(&position, "a1", "a8").fifty_move_clock(), 11);
        assert_eq!(play(&position, "d2", "d3").fifty_move_clock(), 0);
        assert_eq!(play(&position, "a1", "a4").fifty_move_clock(), 11);
    }

    #[test]
    fn draw_offer_is_cleared_by_any_move() {
        let mut position = Position::starting();
        position.set_draw_offer(Some(Color::White));
        assert_eq!(position.draw_offer(), Some(Color::White));
        let next = play(&position, "e2", "e4");
        assert_eq!(next.draw_offer(), None);
    }
}
