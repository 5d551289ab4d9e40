//! A piece on the board and its pseudo-legal move enumeration.
//!
//! "Pseudo-legal" means a move that obeys the piece's movement pattern and
//! board occupancy without regard to whether it leaves its own king attacked;
//! that filter is [`crate::chess::position::Position`]'s job.

use strum::IntoEnumIterator;

use crate::chess::core::{CastleSide, Color, Direction, PieceKind, Square, BOARD_WIDTH};
use crate::chess::moves::Move;
use crate::chess::position::Position;

/// The 8 fixed knight jumps.
const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

/// A specific piece owned by a side, sitting on a square.
///
/// Identity is the full tuple (kind, color, square, has_moved): two pieces are
/// "the same piece" only while all four agree. Pieces are not tracked across
/// positions; each [`Position`] owns its own copies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Piece {
    /// Which of the six piece kinds this is.
    pub kind: PieceKind,
    /// The side that owns the piece.
    pub color: Color,
    /// The square the piece currently sits on.
    pub square: Square,
    /// Whether the piece has moved in this game line. Drives castling rights
    /// and double pawn pushes.
    pub has_moved: bool,
}

impl Piece {
    /// A freshly placed piece that has not moved yet.
    #[must_use]
    pub const fn new(kind: PieceKind, color: Color, square: Square) -> Self {
        Self {
            kind,
            color,
            square,
            has_moved: false,
        }
    }

    /// FEN symbol: uppercase for White, lowercase for Black.
    #[must_use]
    pub fn fen_symbol(&self) -> char {
        match self.color {
            Color::White => self.kind.algebraic(),
            Color::Black => self.kind.algebraic().to_ascii_lowercase(),
        }
    }

    /// Inverse of [`Piece::fen_symbol`].
    #[must_use]
    pub fn from_fen_symbol(symbol: char, square: Square) -> Option<Self> {
        let kind = PieceKind::from_algebraic(symbol)?;
        let color = if symbol.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Self::new(kind, color, square))
    }

    /// Enumerates this piece's pseudo-legal destinations on the given board.
    ///
    /// Castling is deliberately absent here: castle candidates need
    /// transit-square safety checks and are produced separately by
    /// [`Piece::castle_candidates`].
    #[must_use]
    pub fn pseudo_legal_moves(&self, position: &Position) -> Vec<Move> {
        let mut moves = Vec::new();
        match self.kind {
            PieceKind::Pawn => self.pawn_moves(position, &mut moves),
            PieceKind::Knight => self.knight_moves(position, &mut moves),
            PieceKind::Bishop => self.ray_moves(position, &Direction::DIAGONAL, &mut moves),
            PieceKind::Rook => self.ray_moves(position, &Direction::ORTHOGONAL, &mut moves),
            PieceKind::Queen => {
                self.ray_moves(position, &Direction::DIAGONAL, &mut moves);
                self.ray_moves(position, &Direction::ORTHOGONAL, &mut moves);
            },
            PieceKind::King => self.king_moves(position, &mut moves),
        }
        moves
    }

    /// Walks each direction until blocked: a friendly piece blocks without
    /// being added, an enemy piece is added as a capture and blocks further
    /// travel, the board edge stops generation silently.
    fn ray_moves(&self, position: &Position, directions: &[Direction], moves: &mut Vec<Move>) {
        for direction in directions {
            let (df, dr) = direction.delta();
            let mut target = self.square.offset(df, dr);
            while target.is_valid() {
                match position.piece_at(target) {
                    Some(occupant) if occupant.color == self.color => break,
                    Some(occupant) => {
                        moves.push(Move::pseudo(*self, target, Some(*occupant)));
                        break;
                    },
                    None => {
                        moves.push(Move::pseudo(*self, target, None));
                        target = target.offset(df, dr);
                    },
                }
            }
        }
    }

    fn knight_moves(&self, position: &Position, moves: &mut Vec<Move>) {
        for (df, dr) in KNIGHT_JUMPS {
            let target = self.square.offset(df, dr);
            if !target.is_valid() {
                continue;
            }
            match position.piece_at(target) {
                Some(occupant) if occupant.color == self.color => {},
                occupant => moves.push(Move::pseudo(*self, target, occupant.copied())),
            }
        }
    }

    fn king_moves(&self, position: &Position, moves: &mut Vec<Move>) {
        for direction in Direction::iter() {
            let (df, dr) = direction.delta();
            let target = self.square.offset(df, dr);
            if !target.is_valid() {
                continue;
            }
            match position.piece_at(target) {
                Some(occupant) if occupant.color == self.color => {},
                occupant => moves.push(Move::pseudo(*self, target, occupant.copied())),
            }
        }
    }

    fn pawn_moves(&self, position: &Position, moves: &mut Vec<Move>) {
        let ahead = self.color.push_direction();
        let promotion_rank = self.color.promotion_rank();

        let single = self.square.offset(0, ahead);
        if single.is_valid() && position.piece_at(single).is_none() {
            let push = Move::pseudo(*self, single, None);
            moves.push(if single.rank() == promotion_rank {
                push.with_pending_promotion()
            } else {
                push
            });
            let double = self.square.offset(0, 2 * ahead);
            if !self.has_moved && double.is_valid() && position.piece_at(double).is_none() {
                moves.push(Move::pseudo(*self, double, None));
            }
        }

        for df in [-1, 1] {
            let target = self.square.offset(df, ahead);
            if !target.is_valid() {
                continue;
            }
            match position.piece_at(target) {
                Some(occupant) if occupant.color != self.color => {
                    let capture = Move::pseudo(*self, target, Some(*occupant));
                    moves.push(if target.rank() == promotion_rank {
                        capture.with_pending_promotion()
                    } else {
                        capture
                    });
                },
                Some(_) => {},
                None => {
                    if position.en_passant_target() == Some(target) {
                        let victim_square = Square::new(target.file(), self.square.rank());
                        if let Some(victim) = position.piece_at(victim_square) {
                            moves.push(Move::pseudo_en_passant(*self, target, *victim));
                        }
                    }
                },
            }
        }
    }

    /// Produces castle candidate moves: king and rook both unmoved and every
    /// square strictly between them empty. Whether the king's path is safe is
    /// validated later against check by the position's legality filter.
    #[must_use]
    pub fn castle_candidates(&self, position: &Position) -> Vec<Move> {
        let mut moves = Vec::new();
        if self.kind != PieceKind::King || self.has_moved {
            return moves;
        }
        let home = self.color.home_rank();
        // Standard chess only: the king castles from its original square.
        if self.square != Square::new(5, home) {
            return moves;
        }
        for side in [CastleSide::King, CastleSide::Queen] {
            let rook_square = Square::new(side.rook_file(), home);
            let rook = match position.piece_at(rook_square) {
                Some(piece)
                    if piece.kind == PieceKind::Rook
                        && piece.color == self.color
                        && !piece.has_moved =>
                {
                    piece
                },
                _ => continue,
            };
            let (low, high) = if rook_square.file() < self.square.file() {
                (rook_square.file(), self.square.file())
            } else {
                (self.square.file(), rook_square.file())
            };
            let clear = (low + 1..high).all(|file| {
                debug_assert!(file >= 1 && file <= BOARD_WIDTH);
                position.piece_at(Square::new(file, home)).is_none()
            });
            if clear {
                let target = Square::new(side.king_target_file(), home);
                moves.push(Move::pseudo_castle(*self, target, rook.square));
            }
        }
        moves
    }
}

#[cfg(test)]
mod test {
    use itertools::Itertools;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::chess::position::Position;

    fn destinations(position: &Position, from: &str) -> Vec<String> {
        let square = Square::try_from(from).unwrap();
        let piece = position.piece_at(square).copied().unwrap();
        piece
            .pseudo_legal_moves(position)
            .iter()
            .map(|m| m.destination().to_string())
            .sorted()
            .collect()
    }

    #[test]
    fn pawn_start_and_blocked() {
        let position = Position::starting();
        assert_eq!(destinations(&position, "e2"), vec!["e3", "e4"]);
        // A blocked pawn has no pushes at all.
        let position =
            Position::from_fen("rnbqkbnr/pppppppp/8/8/8/4n3/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
                .unwrap();
        assert_eq!(destinations(&position, "e2"), Vec::<String>::new());
        // Diagonal captures appear only when an enemy is there.
        assert_eq!(destinations(&position, "d2"), vec!["d3", "d4", "e3"]);
        assert_eq!(destinations(&position, "f2"), vec!["e3", "f3", "f4"]);
    }

    #[test]
    fn knight_jumps_from_corner_and_center() {
        let position = Position::from_fen("7k/8/8/8/3N4/8/8/N6K w - - 0 1").unwrap();
        assert_eq!(destinations(&position, "a1"), vec!["b3", "c2"]);
        assert_eq!(
            destinations(&position, "d4"),
            vec!["b3", "b5", "c2", "c6", "e2", "e6", "f3", "f5"]
        );
    }

    #[test]
    fn rook_ray_stops_at_friend_and_enemy() {
        let position = Position::from_fen("7k/8/8/3p4/8/3R1P2/8/K7 w - - 0 1").unwrap();
        // Up the d-file until the enemy pawn (captured), right until the
        // friendly pawn (excluded), unbounded left and down.
        assert_eq!(
            destinations(&position, "d3"),
            vec!["a3", "b3", "c3", "d1", "d2", "d4", "d5", "e3"]
        );
    }

    #[test]
    fn bishop_and_queen_share_rays() {
        let position = Position::from_fen("7k/8/8/8/8/8/8/K2B4 w - - 0 1").unwrap();
        assert_eq!(
            destinations(&position, "d1"),
            vec!["a4", "b3", "c2", "e2", "f3", "g4", "h5"]
        );
    }

    #[test]
    fn castle_candidates_require_empty_path() {
        let position = Position::from_fen("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let king = position.piece_at(Square::try_from("e1").unwrap()).copied().unwrap();
        let candidates = king.castle_candidates(&position);
        assert_eq!(candidates.len(), 2);

        let blocked = Position::from_fen("4k3/8/8/8/8/8/8/RN2K2R w KQ - 0 1").unwrap();
        let king = blocked.piece_at(Square::try_from("e1").unwrap()).copied().unwrap();
        let candidates = king.castle_candidates(&blocked);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].destination().to_string(), "g1");
    }

    #[test]
    fn en_passant_capture_is_generated() {
        // Black just played d7d5; the white e5 pawn may capture on d6.
        let position =
            Position::from_fen("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3")
                .unwrap();
        let moves = destinations(&position, "e5");
        assert!(moves.contains(&"d6".to_owned()), "moves: {moves:?}");
        assert!(moves.contains(&"e6".to_owned()));
    }
}
