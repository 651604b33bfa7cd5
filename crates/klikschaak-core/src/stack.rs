//! Square contents: zero, one, or two friendly pieces.

use std::fmt;

use arrayvec::ArrayVec;

use crate::color::Color;
use crate::piece::{PawnId, Piece};
use crate::piece_kind::PieceKind;

/// The ordered contents of one square.
///
/// A square holds at most two pieces; when it holds two, the pieces are
/// "klikked" together and move as a unit unless one is explicitly unklikked.
/// Order (bottom, then top) is observable in display and notation, but has
/// no effect on legality.
///
/// Invariants, enforced at every construction site:
/// - both pieces of a pair share one color;
/// - a pair never contains a king.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Stack(ArrayVec<Piece, 2>);

impl Stack {
    /// Maximum number of pieces on one square.
    pub const CAPACITY: usize = 2;

    /// An empty square.
    #[inline]
    pub fn empty() -> Stack {
        Stack(ArrayVec::new())
    }

    /// A square holding a single piece.
    #[inline]
    pub fn single(piece: Piece) -> Stack {
        let mut pieces = ArrayVec::new();
        pieces.push(piece);
        Stack(pieces)
    }

    /// A square holding two klikked pieces, bottom first.
    ///
    /// Returns `None` when the pair would violate the stacking invariants
    /// (mixed colors, or a king in the pair).
    pub fn pair(bottom: Piece, top: Piece) -> Option<Stack> {
        if bottom.color() != top.color() || bottom.is_king() || top.is_king() {
            return None;
        }
        let mut pieces = ArrayVec::new();
        pieces.push(bottom);
        pieces.push(top);
        Some(Stack(pieces))
    }

    /// Number of pieces on the square (0..=2).
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return `true` if the square is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Return `true` if the square holds exactly one piece.
    #[inline]
    pub fn is_single(&self) -> bool {
        self.0.len() == 1
    }

    /// Return `true` if the square holds a klikked pair.
    #[inline]
    pub fn is_stacked(&self) -> bool {
        self.0.len() == 2
    }

    /// The pieces on the square, bottom first.
    #[inline]
    pub fn pieces(&self) -> &[Piece] {
        &self.0
    }

    /// The piece at the given position in the stack (0 = bottom).
    #[inline]
    pub fn get(&self, index: usize) -> Option<Piece> {
        self.0.get(index).copied()
    }

    /// The color of the occupants, or `None` for an empty square.
    #[inline]
    pub fn color(&self) -> Option<Color> {
        self.0.first().map(|p| p.color())
    }

    /// Return `true` if any occupant has the given kind.
    #[inline]
    pub fn contains_kind(&self, kind: PieceKind) -> bool {
        self.0.iter().any(|p| p.kind() == kind)
    }

    /// Return `true` if any occupant is a king.
    #[inline]
    pub fn contains_king(&self) -> bool {
        self.contains_kind(PieceKind::King)
    }

    /// Return `true` if any occupant is a pawn.
    #[inline]
    pub fn contains_pawn(&self) -> bool {
        self.contains_kind(PieceKind::Pawn)
    }

    /// Identities of the pawns on this square.
    pub fn pawn_ids(&self) -> impl Iterator<Item = PawnId> + '_ {
        self.0.iter().filter_map(|p| p.pawn_id())
    }

    /// Return `true` if `piece` may klik onto this square: a single occupant
    /// of the same color, no king on either side of the pair.
    #[inline]
    pub fn accepts_klik(&self, piece: Piece) -> bool {
        self.is_single()
            && self.color() == Some(piece.color())
            && !self.contains_king()
            && !piece.is_king()
    }

    /// Append a piece, forming a pair.
    ///
    /// # Panics
    ///
    /// Debug-asserts the stacking invariants and the capacity.
    #[inline]
    pub(crate) fn push(&mut self, piece: Piece) {
        debug_assert!(self.len() < Self::CAPACITY);
        debug_assert!(self.is_empty() || self.accepts_klik(piece));
        self.0.push(piece);
    }

    /// Remove and return the piece at `index` (0 = bottom), shifting the rest.
    ///
    /// # Panics
    ///
    /// Debug-asserts that `index` is occupied.
    #[inline]
    pub(crate) fn take(&mut self, index: usize) -> Piece {
        debug_assert!(index < self.len());
        self.0.remove(index)
    }

    /// Remove every piece from the square.
    #[inline]
    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }

    /// Replace the piece at `index` in place.
    #[inline]
    pub(crate) fn replace(&mut self, index: usize, piece: Piece) {
        debug_assert!(index < self.len());
        self.0[index] = piece;
    }
}

impl fmt::Debug for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pieces() {
            [] => write!(f, "·"),
            [p] => write!(f, "{p:?}"),
            [bottom, top] => write!(f, "({bottom:?}{top:?})"),
            _ => unreachable!("a square holds at most two pieces"),
        }
    }
}
