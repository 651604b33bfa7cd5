//! Error types for position-string parsing and move tokens.

/// Errors that occur when parsing the FEN-like position string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FenError {
    /// The string does not have the expected number of space-separated fields.
    #[error("expected 6 or 8 position fields, found {found}")]
    WrongFieldCount {
        /// Number of fields found.
        found: usize,
    },
    /// The piece placement section does not have exactly 8 ranks.
    #[error("expected 8 ranks in piece placement, found {found}")]
    WrongRankCount {
        /// Number of ranks found.
        found: usize,
    },
    /// A rank in the piece placement describes more or fewer than 8 squares.
    #[error("rank {rank} describes {length} squares, expected 8")]
    BadRankLength {
        /// One-based rank number as printed in FEN (8 = first group).
        rank: usize,
        /// Number of squares described.
        length: usize,
    },
    /// An unrecognized character appeared in the piece placement.
    #[error("invalid piece character: '{character}'")]
    InvalidPieceChar {
        /// The invalid character.
        character: char,
    },
    /// A parenthesized group does not describe a legal klik pair.
    #[error("invalid stacked square: \"{group}\"")]
    InvalidStack {
        /// The group text, parentheses included.
        group: String,
    },
    /// The active color field is not "w" or "b".
    #[error("invalid active color: \"{found}\"")]
    InvalidColor {
        /// The invalid color string.
        found: String,
    },
    /// The castling rights field is malformed.
    #[error("invalid castling rights: \"{found}\"")]
    InvalidCastling {
        /// The invalid castling string.
        found: String,
    },
    /// The en passant field is not "-" or a valid target square.
    #[error("invalid en passant square: \"{found}\"")]
    InvalidEnPassant {
        /// The invalid en passant string.
        found: String,
    },
    /// A move counter is not a valid number.
    #[error("invalid {field}: \"{found}\"")]
    InvalidMoveCounter {
        /// The field name ("halfmove clock" or "fullmove number").
        field: &'static str,
        /// The invalid string.
        found: String,
    },
    /// The pawn-identity extension field is malformed or inconsistent with
    /// the board.
    #[error("invalid pawn identities: \"{found}\"")]
    InvalidPawnIds {
        /// The invalid extension string.
        found: String,
    },
    /// The moved-pawn extension field is malformed.
    #[error("invalid moved-pawn set: \"{found}\"")]
    InvalidMovedPawns {
        /// The invalid extension string.
        found: String,
    },
    /// A side does not have exactly one king.
    #[error("expected 1 king for {color}, found {count}")]
    InvalidKingCount {
        /// Which side has the wrong king count.
        color: &'static str,
        /// Number of kings found.
        count: usize,
    },
    /// More than eight pawns of one color are on the board.
    #[error("more than 8 {color} pawns on the board")]
    TooManyPawns {
        /// Which side has too many pawns.
        color: &'static str,
    },
    /// Pawns occupy a back rank.
    #[error("pawns found on a back rank")]
    PawnsOnBackRank,
    /// A castling right is granted but its corner holds no rook.
    #[error("castling right granted without a rook on its corner")]
    CastlingWithoutRook,
    /// A pawn that is off its origin square is not in the moved-pawn set.
    #[error("pawn off its origin square but not recorded as moved")]
    UnmovedPawnOffOrigin,
    /// The player who is not on move is in check.
    #[error("the player not on move is in check")]
    OpponentInCheck,
}

/// Errors that occur when parsing a move token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The token is shorter than the four square characters.
    #[error("move token too short: \"{token}\"")]
    TooShort {
        /// The offending token.
        token: String,
    },
    /// A square did not parse as algebraic notation.
    #[error("bad square in move token: \"{token}\"")]
    BadSquare {
        /// The offending token.
        token: String,
    },
    /// The selector suffix is not `k`, `u0`, `u1`, `U0`, or `U1`.
    #[error("bad selector in move token: \"{token}\"")]
    BadSelector {
        /// The offending token.
        token: String,
    },
    /// Extra characters after the selector.
    #[error("trailing input in move token: \"{token}\"")]
    TrailingInput {
        /// The offending token.
        token: String,
    },
    /// The `:` tag is not a recognized kind tag.
    #[error("unknown tag in move token: \"{token}\"")]
    UnknownTag {
        /// The offending token.
        token: String,
    },
}

#[cfg(test)]
mod tests {
    use super::{FenError, TokenError};

    #[test]
    fn fen_error_display() {
        let err = FenError::WrongFieldCount { found: 4 };
        assert_eq!(err.to_string(), "expected 6 or 8 position fields, found 4");
        let err = FenError::InvalidStack {
            group: "(Kp)".to_string(),
        };
        assert_eq!(err.to_string(), "invalid stacked square: \"(Kp)\"");
    }

    #[test]
    fn token_error_display() {
        let err = TokenError::TooShort {
            token: "e2".to_string(),
        };
        assert_eq!(err.to_string(), "move token too short: \"e2\"");
    }
}
