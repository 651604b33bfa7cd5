//! The board: an 8x8 grid of squares, each holding up to two pieces.

use std::fmt;

use crate::color::Color;
use crate::file::File;
use crate::piece::{PawnId, Piece};
use crate::piece_kind::PieceKind;
use crate::rank::Rank;
use crate::square::Square;
use crate::stack::Stack;

/// Piece placement only: 64 squares, each an ordered [`Stack`] of 0..=2
/// pieces. Game state (side to move, castling, en passant, pawn bookkeeping)
/// lives in [`Position`](crate::position::Position).
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    squares: [Stack; Square::COUNT],
}

impl Board {
    /// An empty board.
    pub fn empty() -> Board {
        Board {
            squares: std::array::from_fn(|_| Stack::empty()),
        }
    }

    /// The standard starting placement. Pawn identities are allocated from
    /// the file of origin (a-pawn = 0 .. h-pawn = 7) for both colors.
    pub fn starting() -> Board {
        let mut board = Board::empty();
        const BACK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for (file_idx, kind) in BACK.into_iter().enumerate() {
            let file = File::from_index(file_idx as u8).expect("file index is in range");
            board.put(
                Square::new(Rank::Rank1, file),
                Piece::new(kind, Color::White),
            );
            board.put(
                Square::new(Rank::Rank8, file),
                Piece::new(kind, Color::Black),
            );
            let id = PawnId::new(file_idx as u8).expect("file index is a valid identity");
            board.put(Square::new(Rank::Rank2, file), Piece::pawn(Color::White, id));
            board.put(Square::new(Rank::Rank7, file), Piece::pawn(Color::Black, id));
        }
        board
    }

    /// The contents of a square.
    #[inline]
    pub fn stack(&self, sq: Square) -> &Stack {
        &self.squares[sq.index()]
    }

    /// Mutable access to a square's contents.
    #[inline]
    pub(crate) fn stack_mut(&mut self, sq: Square) -> &mut Stack {
        &mut self.squares[sq.index()]
    }

    /// Place a piece on a square, klikking onto an existing occupant.
    ///
    /// # Panics
    ///
    /// Debug-asserts the stacking invariants (used by setup and parsing,
    /// which validate beforehand).
    pub(crate) fn put(&mut self, sq: Square, piece: Piece) {
        self.stack_mut(sq).push(piece);
    }

    /// Locate the king of the given color.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        Square::all().find(|&sq| {
            let stack = self.stack(sq);
            stack.color() == Some(color) && stack.contains_king()
        })
    }

    /// Return `true` if any occupant of `sq` belongs to `color`.
    #[inline]
    pub fn is_color(&self, sq: Square, color: Color) -> bool {
        self.stack(sq).color() == Some(color)
    }

    /// Iterate the occupied squares of one color.
    pub fn squares_of(&self, color: Color) -> impl Iterator<Item = Square> + '_ {
        Square::all().filter(move |&sq| self.is_color(sq, color))
    }

    /// Count all pieces of one color (stack members count individually).
    pub fn piece_count(&self, color: Color) -> usize {
        self.squares_of(color).map(|sq| self.stack(sq).len()).sum()
    }
}

impl fmt::Display for Board {
    /// Render an 8x8 grid, rank 8 first. Singletons print as their FEN
    /// character, klikked pairs as `(XY)` with the bottom piece first.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank_idx in (0u8..8).rev() {
            write!(f, "{}  ", rank_idx + 1)?;
            for file_idx in 0u8..8 {
                let sq = Square::from_index(rank_idx * 8 + file_idx)
                    .expect("rank and file indices are in range");
                let cell = match self.stack(sq).pieces() {
                    [] => " .  ".to_string(),
                    [p] => format!(" {}  ", p.fen_char()),
                    [bottom, top] => format!("({}{}) ", bottom.fen_char(), top.fen_char()),
                    _ => unreachable!("a square holds at most two pieces"),
                };
                write!(f, "{cell}")?;
            }
            writeln!(f)?;
        }
        write!(f, "    a   b   c   d   e   f   g   h")
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board:")?;
        fmt::Display::fmt(self, f)
    }
}
