//! Castling rights stored as a 4-bit field within a `u8`.

use std::fmt;

use crate::color::Color;

/// Which side of the board to castle toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastleSide {
    KingSide,
    QueenSide,
}

impl CastleSide {
    /// Both sides, king side first.
    pub const ALL: [CastleSide; 2] = [CastleSide::KingSide, CastleSide::QueenSide];
}

/// Castling rights encoded as a 4-bit field: bit 0 = WK, 1 = WQ, 2 = BK, 3 = BQ.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CastleRights(u8);

impl CastleRights {
    /// No castling rights.
    pub const NONE: CastleRights = CastleRights(0);
    /// All castling rights.
    pub const ALL: CastleRights = CastleRights(0b1111);

    const fn flag(color: Color, side: CastleSide) -> u8 {
        let shift = (color as u8) * 2
            + match side {
                CastleSide::KingSide => 0,
                CastleSide::QueenSide => 1,
            };
        1 << shift
    }

    /// Return `true` if no castling rights remain.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Check whether a specific color and side can still castle.
    #[inline]
    pub const fn has(self, color: Color, side: CastleSide) -> bool {
        self.0 & Self::flag(color, side) != 0
    }

    /// Grant the right for a specific color and side.
    #[inline]
    pub(crate) fn grant(&mut self, color: Color, side: CastleSide) {
        self.0 |= Self::flag(color, side);
    }

    /// Revoke the right for a specific color and side.
    #[inline]
    pub(crate) fn revoke(&mut self, color: Color, side: CastleSide) {
        self.0 &= !Self::flag(color, side);
    }

    /// Revoke both rights of one color (the king moved or castled).
    #[inline]
    pub(crate) fn revoke_color(&mut self, color: Color) {
        self.revoke(color, CastleSide::KingSide);
        self.revoke(color, CastleSide::QueenSide);
    }

    /// Parse the FEN castling field (`KQkq` subset in that order, or `-`).
    pub fn from_fen_field(field: &str) -> Option<CastleRights> {
        if field == "-" {
            return Some(CastleRights::NONE);
        }
        if field.is_empty() || field.len() > 4 {
            return None;
        }
        let mut rights = CastleRights::NONE;
        let mut last = 0u8;
        for c in field.chars() {
            let (color, side, order) = match c {
                'K' => (Color::White, CastleSide::KingSide, 1),
                'Q' => (Color::White, CastleSide::QueenSide, 2),
                'k' => (Color::Black, CastleSide::KingSide, 3),
                'q' => (Color::Black, CastleSide::QueenSide, 4),
                _ => return None,
            };
            if order <= last {
                return None;
            }
            last = order;
            rights.grant(color, side);
        }
        Some(rights)
    }
}

impl fmt::Display for CastleRights {
    /// Render the FEN castling field (`KQkq` subset in order, or `-`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }
        for (c, color, side) in [
            ('K', Color::White, CastleSide::KingSide),
            ('Q', Color::White, CastleSide::QueenSide),
            ('k', Color::Black, CastleSide::KingSide),
            ('q', Color::Black, CastleSide::QueenSide),
        ] {
            if self.has(color, side) {
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for CastleRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CastleRights(\"{self}\")")
    }
}
