//! The closed error taxonomy of the session surface.

/// Everything a session operation can refuse with.
///
/// Nothing is retried internally; every error is surfaced to the caller,
/// who recovers by reselecting, recomputing candidates, or ending the
/// session. User-facing phrasing is the caller's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// A move was submitted by the side not on move.
    #[error("it is not this player's turn")]
    NotYourTurn,
    /// The source square is empty.
    #[error("no piece on the source square")]
    NoPieceOnSource,
    /// The source square holds opposing pieces.
    #[error("the source square holds the opponent's pieces")]
    NotYourPiece,
    /// The unklik index is outside {0, 1} or the square is not a pair.
    #[error("invalid unklik index for the source square")]
    BadUnclickIndex,
    /// The (from, to, kind) triple is not in the legal set; this includes
    /// moves that would leave the mover's king in check, and unresolved
    /// choice kinds.
    #[error("the move is not legal in this position")]
    IllegalMove,
    /// A move was submitted before `start`.
    #[error("the game has not started")]
    GameNotStarted,
    /// A move was submitted after the game reached a terminal state.
    #[error("the game is over")]
    GameOver,
    /// Both player slots are taken.
    #[error("the session is full")]
    SessionFull,
    /// `start` was called before both slots were filled.
    #[error("both players must join before the game can start")]
    NotReady,
    /// `start` or `join` was called on a running game.
    #[error("the game has already started")]
    AlreadyStarted,
    /// The player id has not joined this session.
    #[error("unknown player for this session")]
    UnknownPlayer,
    /// A draw response arrived without a pending offer from the opponent.
    #[error("no pending draw offer to respond to")]
    NoPendingDrawOffer,
}

#[cfg(test)]
mod tests {
    use super::GameError;

    #[test]
    fn display_messages() {
        assert_eq!(
            GameError::NotYourTurn.to_string(),
            "it is not this player's turn"
        );
        assert_eq!(
            GameError::IllegalMove.to_string(),
            "the move is not legal in this position"
        );
    }
}
