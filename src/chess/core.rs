//! Chess primitives commonly used within [`crate::chess`].

use std::fmt::{self, Write};

use itertools::Itertools;

use crate::chess::error::Error;

/// Number of files (and ranks) on the board.
pub const BOARD_WIDTH: i8 = 8;

/// An immutable file/rank coordinate.
///
/// Files and ranks are 1-based (`a1` is `(1, 1)`, `h8` is `(8, 8)`).
/// Out-of-range coordinates are representable so that ray casting can walk off
/// the edge of the board without special-casing; [`Square::is_valid`] reports
/// whether a square actually names a board cell, and every consumer checks it
/// before dereferencing the grid.
///
/// ```
/// use zeitnot::chess::core::Square;
///
/// let e4 = Square::new(5, 4);
/// assert!(e4.is_valid());
/// assert_eq!(e4.to_string(), "e4");
/// assert!(!e4.offset(4, 0).is_valid());
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Square {
    file: i8,
    rank: i8,
}

impl Square {
    /// Connects file (column) and rank (row) to form a full square. No bounds
    /// check happens here; see [`Square::is_valid`].
    #[must_use]
    pub const fn new(file: i8, rank: i8) -> Self {
        Self { file, rank }
    }

    /// Returns the 1-based file (column) of the square.
    #[must_use]
    pub const fn file(self) -> i8 {
        self.file
    }

    /// Returns the 1-based rank (row) of the square.
    #[must_use]
    pub const fn rank(self) -> i8 {
        self.rank
    }

    /// True iff both coordinates are within the board.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        1 <= self.file && self.file <= BOARD_WIDTH && 1 <= self.rank && self.rank <= BOARD_WIDTH
    }

    /// True for light squares (`h1` is light, `a1` is dark).
    #[must_use]
    pub const fn is_light(self) -> bool {
        (self.file + self.rank) % 2 != 0
    }

    /// Returns the square shifted by the given file/rank deltas. The result
    /// may be off the board.
    #[must_use]
    pub const fn offset(self, file_delta: i8, rank_delta: i8) -> Self {
        Self {
            file: self.file + file_delta,
            rank: self.rank + rank_delta,
        }
    }
}

impl TryFrom<&str> for Square {
    type Error = Error;

    fn try_from(square: &str) -> Result<Self, Error> {
        let Some((file, rank)) = square.chars().collect_tuple() else {
            return Err(Error::InvalidSquare(square.to_owned()));
        };
        if !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
            return Err(Error::InvalidSquare(square.to_owned()));
        }
        Ok(Self::new(
            (file as u8 - b'a') as i8 + 1,
            (rank as u8 - b'1') as i8 + 1,
        ))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if !self.is_valid() {
            return write!(f, "??");
        }
        write!(f, "{}{}", (b'a' + (self.file - 1) as u8) as char, self.rank)
    }
}

/// The two sides of a game of chess. White has the advantage of the first
/// turn.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// "Flips" the color.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Rank direction in which this side's pawns advance.
    pub(crate) const fn push_direction(self) -> i8 {
        match self {
            Self::White => 1,
            Self::Black => -1,
        }
    }

    /// The rank this side's pieces start on.
    pub(crate) const fn home_rank(self) -> i8 {
        match self {
            Self::White => 1,
            Self::Black => 8,
        }
    }

    /// The rank this side's pawns start on.
    pub(crate) const fn pawn_rank(self) -> i8 {
        match self {
            Self::White => 2,
            Self::Black => 7,
        }
    }

    /// The farthest rank, where this side's pawns promote.
    pub(crate) const fn promotion_rank(self) -> i8 {
        match self {
            Self::White => 8,
            Self::Black => 1,
        }
    }
}

impl TryFrom<&str> for Color {
    type Error = Error;

    fn try_from(color: &str) -> Result<Self, Error> {
        match color {
            "w" => Ok(Self::White),
            "b" => Ok(Self::Black),
            _ => Err(Error::InvalidFen(format!(
                "side to move should be 'w' or 'b', got '{color}'"
            ))),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_char(match self {
            Self::White => 'w',
            Self::Black => 'b',
        })
    }
}

/// Standard [chess pieces].
///
/// [chess pieces]: https://en.wikipedia.org/wiki/Chess_piece
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

impl PieceKind {
    /// Uppercase letter used in algebraic notation. Pawns render as `P` here;
    /// SAN omits the letter one level up.
    #[must_use]
    pub const fn algebraic(self) -> char {
        match self {
            Self::King => 'K',
            Self::Queen => 'Q',
            Self::Rook => 'R',
            Self::Bishop => 'B',
            Self::Knight => 'N',
            Self::Pawn => 'P',
        }
    }

    /// Inverse of [`PieceKind::algebraic`], case-insensitive.
    #[must_use]
    pub fn from_algebraic(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'K' => Some(Self::King),
            'Q' => Some(Self::Queen),
            'R' => Some(Self::Rook),
            'B' => Some(Self::Bishop),
            'N' => Some(Self::Knight),
            'P' => Some(Self::Pawn),
            _ => None,
        }
    }

    /// A pawn can be promoted to a queen, rook, bishop or a knight.
    #[must_use]
    pub const fn is_promotion_kind(self) -> bool {
        matches!(self, Self::Queen | Self::Rook | Self::Bishop | Self::Knight)
    }
}

/// The two wings a king can castle to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CastleSide {
    /// Kingside, short castle or 0-0.
    King,
    /// Queenside, long castle or 0-0-0.
    Queen,
}

impl CastleSide {
    /// File of the rook taking part in the castle.
    pub(crate) const fn rook_file(self) -> i8 {
        match self {
            Self::King => 8,
            Self::Queen => 1,
        }
    }

    /// File the king ends up on.
    pub(crate) const fn king_target_file(self) -> i8 {
        match self {
            Self::King => 7,
            Self::Queen => 3,
        }
    }

    /// File the rook ends up on.
    pub(crate) const fn rook_target_file(self) -> i8 {
        match self {
            Self::King => 6,
            Self::Queen => 4,
        }
    }
}

/// Directions on the board from the perspective of the White player.
#[derive(Copy, Clone, Debug, strum::EnumIter)]
pub enum Direction {
    /// Also known as NorthWest.
    UpLeft,
    /// Also known as North.
    Up,
    /// Also known as NorthEast.
    UpRight,
    /// Also known as East.
    Right,
    /// Also known as West.
    Left,
    /// Also known as SouthWest.
    DownLeft,
    /// Also known as South.
    Down,
    /// Also known as SouthEast.
    DownRight,
}

impl Direction {
    /// Rook directions.
    pub(crate) const ORTHOGONAL: [Self; 4] = [Self::Up, Self::Right, Self::Left, Self::Down];
    /// Bishop directions.
    pub(crate) const DIAGONAL: [Self; 4] = [
        Self::UpLeft,
        Self::UpRight,
        Self::DownLeft,
        Self::DownRight,
    ];

    /// (file, rank) step for one move in this direction.
    pub(crate) const fn delta(self) -> (i8, i8) {
        match self {
            Self::UpLeft => (-1, 1),
            Self::Up => (0, 1),
            Self::UpRight => (1, 1),
            Self::Right => (1, 0),
            Self::Left => (-1, 0),
            Self::DownLeft => (-1, -1),
            Self::Down => (0, -1),
            Self::DownRight => (1, -1),
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn square_text_round_trip() {
        for file in 1..=BOARD_WIDTH {
            for rank in 1..=BOARD_WIDTH {
                let square = Square::new(file, rank);
                assert_eq!(Square::try_from(square.to_string().as_str()), Ok(square));
            }
        }
    }

    #[test]
    fn square_from_incorrect_text() {
        for text in ["", "e", "e44", "i4", "e9", "e0", "4e", "??"] {
            assert_eq!(
                Square::try_from(text),
                Err(Error::InvalidSquare(text.to_owned())),
            );
        }
    }

    #[test]
    fn square_validity() {
        assert!(Square::new(1, 1).is_valid());
        assert!(Square::new(8, 8).is_valid());
        assert!(!Square::new(0, 4).is_valid());
        assert!(!Square::new(4, 0).is_valid());
        assert!(!Square::new(9, 4).is_valid());
        assert!(!Square::new(4, 9).is_valid());
        assert!(!Square::new(5, 5).offset(0, 4).is_valid());
    }

    #[test]
    fn square_shade() {
        // a1 is a dark square, h1 a light one.
        assert!(!Square::new(1, 1).is_light());
        assert!(Square::new(8, 1).is_light());
        assert!(Square::new(1, 8).is_light());
        assert!(!Square::new(8, 8).is_light());
    }

    #[test]
    fn direction_deltas_cover_all_neighbors() {
        let center = Square::new(4, 4);
        let neighbors: Vec<_> = Direction::iter()
            .map(|direction| {
                let (df, dr) = direction.delta();
                center.offset(df, dr)
            })
            .collect();
        assert_eq!(neighbors.len(), 8);
        for neighbor in &neighbors {
            assert!(neighbor.is_valid());
            assert_ne!(*neighbor, center);
        }
    }

    #[test]
    fn piece_kind_letters() {
        for kind in [
            PieceKind::King,
            PieceKind::Queen,
            PieceKind::Rook,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Pawn,
        ] {
            assert_eq!(PieceKind::from_algebraic(kind.algebraic()), Some(kind));
        }
        assert_eq!(PieceKind::from_algebraic('x'), None);
    }
}
