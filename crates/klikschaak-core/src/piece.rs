//! Colored pieces with pawn identities, bit-packed into a single byte.

use std::fmt;

use crate::color::Color;
use crate::piece_kind::PieceKind;

/// Identity tag of a pawn, allocated at initial setup from its file of origin.
///
/// The tag follows the pawn through kliks, unkliks, and stack transport, and
/// exists solely to record whether this particular pawn has ever moved (which
/// gates its double push). Promotion and capture discard it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PawnId(u8);

impl PawnId {
    /// All eight identities in order.
    pub const ALL: [PawnId; 8] = [
        PawnId(0),
        PawnId(1),
        PawnId(2),
        PawnId(3),
        PawnId(4),
        PawnId(5),
        PawnId(6),
        PawnId(7),
    ];

    /// Create an identity from a raw value, returning `None` outside 0..=7.
    #[inline]
    pub const fn new(raw: u8) -> Option<PawnId> {
        if raw < 8 { Some(PawnId(raw)) } else { None }
    }

    /// Return the raw value (0..=7).
    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

impl fmt::Display for PawnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A colored piece, bit-packed into a single byte.
///
/// Bit layout:
/// - bits 0-2: [`PieceKind`] (values 0-5)
/// - bit 3: [`Color`] (0 = White, 1 = Black)
/// - bits 4-6: [`PawnId`] (0-7, meaningful only when the kind is Pawn)
///
/// Two pawns with different identities compare unequal; this is what lets a
/// position remember which pawn instances have already moved.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece(u8);

impl Piece {
    /// Create a non-pawn piece from a kind and a color.
    ///
    /// # Panics
    ///
    /// Debug-asserts that `kind` is not `Pawn`; pawns carry an identity and
    /// must be built with [`Piece::pawn`].
    #[inline]
    pub const fn new(kind: PieceKind, color: Color) -> Piece {
        debug_assert!(!matches!(kind, PieceKind::Pawn));
        Piece((color as u8) << 3 | (kind as u8))
    }

    /// Create a pawn with the given identity.
    #[inline]
    pub const fn pawn(color: Color, id: PawnId) -> Piece {
        Piece(id.raw() << 4 | (color as u8) << 3 | PieceKind::Pawn as u8)
    }

    /// Return the piece kind (the lower 3 bits).
    #[inline]
    pub const fn kind(self) -> PieceKind {
        match self.0 & 0x07 {
            0 => PieceKind::Pawn,
            1 => PieceKind::Knight,
            2 => PieceKind::Bishop,
            3 => PieceKind::Rook,
            4 => PieceKind::Queen,
            _ => PieceKind::King,
        }
    }

    /// Return the color (bit 3).
    #[inline]
    pub const fn color(self) -> Color {
        match (self.0 >> 3) & 1 {
            0 => Color::White,
            _ => Color::Black,
        }
    }

    /// Return the pawn identity, or `None` for non-pawns.
    #[inline]
    pub const fn pawn_id(self) -> Option<PawnId> {
        match self.kind() {
            PieceKind::Pawn => PawnId::new(self.0 >> 4),
            _ => None,
        }
    }

    /// Return `true` if this piece is a pawn.
    #[inline]
    pub const fn is_pawn(self) -> bool {
        matches!(self.kind(), PieceKind::Pawn)
    }

    /// Return `true` if this piece is a king.
    #[inline]
    pub const fn is_king(self) -> bool {
        matches!(self.kind(), PieceKind::King)
    }

    /// Return the same-colored piece of a different kind.
    ///
    /// Used for promotion: the pawn identity is discarded.
    #[inline]
    pub const fn with_kind(self, kind: PieceKind) -> Piece {
        Piece::new(kind, self.color())
    }

    /// Return the FEN character for this piece.
    ///
    /// Uppercase for White pieces, lowercase for Black pieces.
    #[inline]
    pub fn fen_char(self) -> char {
        let base = self.kind().fen_char();
        match self.color() {
            Color::White => base.to_ascii_uppercase(),
            Color::Black => base,
        }
    }

    /// Parse a FEN character into a piece.
    ///
    /// Pawns parsed this way receive identity 0; the position parser assigns
    /// real identities once the whole board is known.
    #[inline]
    pub fn from_fen_char(c: char) -> Option<Piece> {
        let kind = PieceKind::from_fen_char(c)?;
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(match kind {
            PieceKind::Pawn => Piece::pawn(color, PawnId::new(0).expect("0 is a valid identity")),
            _ => Piece::new(kind, color),
        })
    }

    /// Return a copy of this pawn with a different identity.
    ///
    /// # Panics
    ///
    /// Debug-asserts that the piece is a pawn.
    #[inline]
    pub(crate) const fn with_pawn_id(self, id: PawnId) -> Piece {
        debug_assert!(self.is_pawn());
        Piece(id.raw() << 4 | (self.0 & 0x0F))
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fen_char())
    }
}

impl fmt::Debug for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pawn_id() {
            Some(id) => write!(f, "{}#{id}", self.fen_char()),
            None => write!(f, "{}", self.fen_char()),
        }
    }
}
