//! One game of Klikschaak from setup to a terminal state.
//!
//! A session owns exactly one [`Position`] and mutates it only through
//! verified submissions. Processing is single-threaded and cooperative: a
//! submission runs to completion (including termination detection) before
//! the next one is accepted, and the public API is not re-entrant.
//! Outcomes are returned, never called back.

use tracing::{debug, info};

use klikschaak_core::{Color, Move, Position, PromotionPiece, Square};

use crate::error::GameError;

/// Session configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionConfig {
    /// Promote to a queen without surfacing the decision to the caller.
    pub auto_promote_to_queen: bool,
}

/// An opaque reference to a player; the transport layer decides what the
/// number means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayerId(pub u64);

/// How a finished game ended. Terminal states absorb: no operation can
/// leave them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    /// The side to move has no legal move and stands in check.
    Checkmate {
        /// The delivering side.
        winner: Color,
    },
    /// The side to move has no legal move and does not stand in check.
    Stalemate,
    /// A player resigned voluntarily.
    Resigned {
        /// The remaining side.
        winner: Color,
    },
    /// Both players agreed to a draw.
    DrawAgreed,
    /// The transport declared a timeout or disconnect for one side.
    Abandoned {
        /// The remaining side.
        winner: Color,
    },
}

/// Where the session stands in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Waiting for players; `start` is permitted once both slots are full.
    Setup,
    /// The game is running and accepts submissions.
    Active,
    /// The game ended; see the embedded [`Terminal`].
    Finished(Terminal),
}

/// The result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The move was committed.
    Committed {
        /// Display notation of the committed move.
        notation: String,
        /// The terminal state the commit produced, if the game just ended.
        terminal: Option<Terminal>,
    },
    /// The move reaches a promotion rank and no piece was chosen: nothing
    /// was committed. Resubmit the same move with the promotion attached.
    PromotionNeeded {
        /// The square the pawn would promote on.
        square: Square,
        /// The promoting side.
        color: Color,
    },
}

/// A single game session. Deep-copyable: [`Session::snapshot`] hands an
/// immutable copy to observers without locking the live game.
#[derive(Debug, Clone)]
pub struct Session {
    config: SessionConfig,
    position: Position,
    players: [Option<PlayerId>; 2],
    phase: SessionPhase,
    draw_offer: Option<Color>,
}

impl Session {
    /// Create a session at the standard starting position.
    pub fn new(config: SessionConfig) -> Session {
        Session::with_position(config, Position::starting())
    }

    /// Create a session at an arbitrary position (e.g. parsed from the
    /// position string).
    pub fn with_position(config: SessionConfig, position: Position) -> Session {
        Session {
            config,
            position,
            players: [None, None],
            phase: SessionPhase::Setup,
            draw_offer: None,
        }
    }

    /// The live position.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// The current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// The terminal state, once the game has ended.
    pub fn terminal(&self) -> Option<Terminal> {
        match self.phase {
            SessionPhase::Finished(terminal) => Some(terminal),
            _ => None,
        }
    }

    /// The color a player occupies, if they joined.
    pub fn player_color(&self, player: PlayerId) -> Option<Color> {
        self.players
            .iter()
            .position(|slot| *slot == Some(player))
            .map(|index| Color::ALL[index])
    }

    /// Deep copy for observers and reconnecting clients.
    pub fn snapshot(&self) -> Session {
        self.clone()
    }

    /// The side whose draw offer is awaiting an answer, if any.
    pub fn pending_draw_offer(&self) -> Option<Color> {
        self.draw_offer
    }

    /// All legal moves for the side to move (for transports that surface
    /// candidate lists, including choice candidates to be resolved).
    pub fn legal_moves(&self) -> Vec<Move> {
        self.position.legal_moves()
    }

    /// Take a seat. The first player becomes White, the second Black.
    /// Joining twice returns the already-assigned color.
    pub fn join(&mut self, player: PlayerId) -> Result<Color, GameError> {
        if let Some(color) = self.player_color(player) {
            return Ok(color);
        }
        if self.phase != SessionPhase::Setup {
            return Err(GameError::AlreadyStarted);
        }
        let Some(index) = self.players.iter().position(Option::is_none) else {
            return Err(GameError::SessionFull);
        };
        self.players[index] = Some(player);
        Ok(Color::ALL[index])
    }

    /// Begin play once both seats are taken.
    pub fn start(&mut self) -> Result<(), GameError> {
        match self.phase {
            SessionPhase::Active => return Err(GameError::AlreadyStarted),
            SessionPhase::Finished(_) => return Err(GameError::GameOver),
            SessionPhase::Setup => {}
        }
        if self.players.iter().any(Option::is_none) {
            return Err(GameError::NotReady);
        }
        self.phase = SessionPhase::Active;
        info!("game started");
        Ok(())
    }

    /// Submit a move for a player.
    ///
    /// Validation order: seat, phase, turn, source square, unklik index,
    /// membership in the legal set (choice kinds are questions and are
    /// rejected; their resolutions are accepted). A promoting move without
    /// a chosen piece commits nothing and returns
    /// [`SubmitOutcome::PromotionNeeded`] unless the session auto-promotes.
    pub fn submit(&mut self, player: PlayerId, mv: Move) -> Result<SubmitOutcome, GameError> {
        let color = self.player_color(player).ok_or(GameError::UnknownPlayer)?;
        match self.phase {
            SessionPhase::Setup => return Err(GameError::GameNotStarted),
            SessionPhase::Finished(_) => return Err(GameError::GameOver),
            SessionPhase::Active => {}
        }
        if color != self.position.side_to_move() {
            return Err(GameError::NotYourTurn);
        }

        let source = self.position.board().stack(mv.from);
        if source.is_empty() {
            return Err(GameError::NoPieceOnSource);
        }
        if source.color() != Some(color) {
            return Err(GameError::NotYourPiece);
        }
        if mv.kind.is_unklik() && (!source.is_stacked() || !matches!(mv.unklik, Some(0 | 1))) {
            return Err(GameError::BadUnclickIndex);
        }

        if !self.is_in_legal_set(&mv) {
            debug!(token = %mv.to_token(), "rejected submission");
            return Err(GameError::IllegalMove);
        }

        let mut mv = mv;
        if self.position.requires_promotion(&mv) && mv.promotion.is_none() {
            if self.config.auto_promote_to_queen {
                mv = mv.with_promotion(PromotionPiece::Queen);
            } else {
                return Ok(SubmitOutcome::PromotionNeeded {
                    square: mv.to,
                    color,
                });
            }
        }

        let notation = self.position.apply(mv);
        self.draw_offer = None;
        let terminal = self.detect_termination();
        if let Some(terminal) = terminal {
            self.phase = SessionPhase::Finished(terminal);
            info!(?terminal, "game over");
        }
        Ok(SubmitOutcome::Committed { notation, terminal })
    }

    /// Resign voluntarily; the opponent wins.
    pub fn resign(&mut self, player: PlayerId) -> Result<(), GameError> {
        let color = self.player_color(player).ok_or(GameError::UnknownPlayer)?;
        self.finish_by_forfeit(Terminal::Resigned {
            winner: color.flip(),
        })
    }

    /// Forfeit declared by the transport (timeout or disconnect); treated
    /// exactly like a resignation under a different label.
    pub fn abandon(&mut self, player: PlayerId) -> Result<(), GameError> {
        let color = self.player_color(player).ok_or(GameError::UnknownPlayer)?;
        self.finish_by_forfeit(Terminal::Abandoned {
            winner: color.flip(),
        })
    }

    /// Offer a draw to the opponent. A newer offer replaces an older one.
    pub fn offer_draw(&mut self, player: PlayerId) -> Result<(), GameError> {
        let color = self.player_color(player).ok_or(GameError::UnknownPlayer)?;
        match self.phase {
            SessionPhase::Setup => return Err(GameError::GameNotStarted),
            SessionPhase::Finished(_) => return Err(GameError::GameOver),
            SessionPhase::Active => {}
        }
        self.draw_offer = Some(color);
        Ok(())
    }

    /// Answer the opponent's pending draw offer. Accepting ends the game;
    /// declining clears the offer.
    pub fn respond_draw(&mut self, player: PlayerId, accept: bool) -> Result<(), GameError> {
        let color = self.player_color(player).ok_or(GameError::UnknownPlayer)?;
        match self.phase {
            SessionPhase::Setup => return Err(GameError::GameNotStarted),
            SessionPhase::Finished(_) => return Err(GameError::GameOver),
            SessionPhase::Active => {}
        }
        if self.draw_offer != Some(color.flip()) {
            return Err(GameError::NoPendingDrawOffer);
        }
        self.draw_offer = None;
        if accept {
            self.phase = SessionPhase::Finished(Terminal::DrawAgreed);
            info!("draw agreed");
        }
        Ok(())
    }

    fn finish_by_forfeit(&mut self, terminal: Terminal) -> Result<(), GameError> {
        match self.phase {
            SessionPhase::Setup => Err(GameError::GameNotStarted),
            SessionPhase::Finished(_) => Err(GameError::GameOver),
            SessionPhase::Active => {
                self.phase = SessionPhase::Finished(terminal);
                info!(?terminal, "game over");
                Ok(())
            }
        }
    }

    /// Is the submitted move in the legal set? Exact matches count, and so
    /// do resolutions of a generated choice candidate; raw choice kinds do
    /// not.
    fn is_in_legal_set(&self, mv: &Move) -> bool {
        if mv.kind.is_choice() {
            return false;
        }
        let legal = if mv.kind.is_unklik() {
            self.position
                .legal_unklik_moves(mv.from, mv.unklik.unwrap_or(0))
        } else {
            self.position.legal_moves_from(mv.from)
        };
        legal.iter().any(|m| {
            m.same_action(mv)
                || (m.from == mv.from
                    && m.to == mv.to
                    && m.kind.resolutions().is_some_and(|r| r.contains(&mv.kind)))
        })
    }

    /// After every committed move: no legal move for the side to move
    /// means checkmate when in check, stalemate otherwise. Unklik and
    /// unklik-klik escapes are part of the legal set, so they are honored.
    fn detect_termination(&self) -> Option<Terminal> {
        if self.position.has_legal_move() {
            return None;
        }
        if self.position.in_check() {
            Some(Terminal::Checkmate {
                winner: self.position.side_to_move().flip(),
            })
        } else {
            Some(Terminal::Stalemate)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PlayerId, Session, SessionConfig, SessionPhase, SubmitOutcome, Terminal};
    use crate::error::GameError;
    use klikschaak_core::{Color, Move, MoveToken, Position, PromotionPiece};

    const WHITE: PlayerId = PlayerId(11);
    const BLACK: PlayerId = PlayerId(22);

    fn started(config: SessionConfig) -> Session {
        let mut session = Session::new(config);
        assert_eq!(session.join(WHITE), Ok(Color::White));
        assert_eq!(session.join(BLACK), Ok(Color::Black));
        session.start().unwrap();
        session
    }

    fn started_at(fen: &str) -> Session {
        let position = Position::from_fen(fen).unwrap();
        let mut session = Session::with_position(SessionConfig::default(), position);
        session.join(WHITE).unwrap();
        session.join(BLACK).unwrap();
        session.start().unwrap();
        session
    }

    fn resolve(session: &Session, token: &str) -> Move {
        let token = MoveToken::parse(token).unwrap();
        Move::resolve_token(&token, &session.legal_moves())
            .unwrap_or_else(|| panic!("token does not resolve against the legal set"))
    }

    fn submit(session: &mut Session, player: PlayerId, token: &str) -> SubmitOutcome {
        let mv = resolve(session, token);
        session.submit(player, mv).unwrap()
    }

    #[test]
    fn setup_flow() {
        let mut session = Session::new(SessionConfig::default());
        assert_eq!(session.start(), Err(GameError::NotReady));
        assert_eq!(session.join(WHITE), Ok(Color::White));
        assert_eq!(session.join(WHITE), Ok(Color::White));
        assert_eq!(session.join(BLACK), Ok(Color::Black));
        assert_eq!(session.join(PlayerId(33)), Err(GameError::SessionFull));

        let mv = resolve(&session, "e2e4");
        assert_eq!(session.submit(WHITE, mv), Err(GameError::GameNotStarted));

        session.start().unwrap();
        assert_eq!(session.start(), Err(GameError::AlreadyStarted));
        assert_eq!(session.phase(), SessionPhase::Active);
    }

    #[test]
    fn submissions_are_validated_in_order() {
        let mut session = started(SessionConfig::default());

        let mv = resolve(&session, "e2e4");
        assert_eq!(session.submit(PlayerId(99), mv), Err(GameError::UnknownPlayer));
        assert_eq!(session.submit(BLACK, mv), Err(GameError::NotYourTurn));

        let empty = Move::new(mv.from, mv.to, mv.kind);
        let from_empty = Move::new(
            klikschaak_core::Square::from_algebraic("e4").unwrap(),
            klikschaak_core::Square::from_algebraic("e5").unwrap(),
            klikschaak_core::MoveKind::Normal,
        );
        assert_eq!(session.submit(WHITE, from_empty), Err(GameError::NoPieceOnSource));
        let enemy = Move::new(
            klikschaak_core::Square::from_algebraic("e7").unwrap(),
            klikschaak_core::Square::from_algebraic("e5").unwrap(),
            klikschaak_core::MoveKind::Normal,
        );
        assert_eq!(session.submit(WHITE, enemy), Err(GameError::NotYourPiece));
        let bad_index = Move::unklik(
            klikschaak_core::Square::from_algebraic("e2").unwrap(),
            klikschaak_core::Square::from_algebraic("e3").unwrap(),
            klikschaak_core::MoveKind::Unklik,
            0,
        );
        assert_eq!(session.submit(WHITE, bad_index), Err(GameError::BadUnclickIndex));
        let illegal = Move::new(
            klikschaak_core::Square::from_algebraic("e2").unwrap(),
            klikschaak_core::Square::from_algebraic("e5").unwrap(),
            klikschaak_core::MoveKind::Normal,
        );
        assert_eq!(session.submit(WHITE, illegal), Err(GameError::IllegalMove));

        assert_eq!(session.submit(WHITE, empty), Ok(SubmitOutcome::Committed {
            notation: "Pe2-e4".to_string(),
            terminal: None,
        }));
    }

    #[test]
    fn scholars_mate_is_checkmate() {
        let mut session = started(SessionConfig::default());
        submit(&mut session, WHITE, "e2e4");
        submit(&mut session, BLACK, "e7e5");
        submit(&mut session, WHITE, "d1h5");
        submit(&mut session, BLACK, "b8c6");
        submit(&mut session, WHITE, "f1c4");
        submit(&mut session, BLACK, "g8f6");
        let outcome = submit(&mut session, WHITE, "h5f7");
        assert_eq!(
            session.terminal(),
            Some(Terminal::Checkmate {
                winner: Color::White
            })
        );
        assert!(matches!(
            outcome,
            SubmitOutcome::Committed {
                terminal: Some(Terminal::Checkmate { .. }),
                ..
            }
        ));

        // Any syntactically fine move; the phase check fires first.
        let any = Move::new(
            klikschaak_core::Square::from_algebraic("a7").unwrap(),
            klikschaak_core::Square::from_algebraic("a6").unwrap(),
            klikschaak_core::MoveKind::Normal,
        );
        assert_eq!(session.submit(BLACK, any), Err(GameError::GameOver));
    }

    #[test]
    fn stalemate_is_detected_after_the_queen_slide() {
        let mut session = started_at("8/8/8/8/8/1q6/P1k5/K7 b - - 0 1");
        submit(&mut session, BLACK, "b3a3");
        assert_eq!(session.terminal(), Some(Terminal::Stalemate));
    }

    #[test]
    fn promotion_is_surfaced_and_resubmitted() {
        let mut session = started_at("k7/4(RP)3/8/8/8/8/8/4K3 w - - 0 1");
        let mv = resolve(&session, "e7e8u1");
        let outcome = session.submit(WHITE, mv).unwrap();
        assert!(matches!(outcome, SubmitOutcome::PromotionNeeded { .. }));
        // Nothing was committed.
        assert_eq!(session.position().history().len(), 0);

        let outcome = session
            .submit(WHITE, mv.with_promotion(PromotionPiece::Queen))
            .unwrap();
        assert!(matches!(outcome, SubmitOutcome::Committed { .. }));
        assert_eq!(session.position().history().len(), 1);
    }

    #[test]
    fn auto_promotion_picks_a_queen() {
        let config = SessionConfig {
            auto_promote_to_queen: true,
        };
        let position = Position::from_fen("k7/4(RP)3/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let mut session = Session::with_position(config, position);
        session.join(WHITE).unwrap();
        session.join(BLACK).unwrap();
        session.start().unwrap();

        let outcome = submit(&mut session, WHITE, "e7e8u1");
        match outcome {
            SubmitOutcome::Committed { notation, .. } => {
                assert_eq!(notation, "Pe7-e8=Q (unklik)");
            }
            other => panic!("expected a commit, got {other:?}"),
        }
    }

    #[test]
    fn castle_choice_accepts_resolutions_only() {
        let mut session = started_at("4k3/8/8/8/8/8/8/4K2(RB) w K - 0 1");
        let choice = resolve(&session, "e1g1");
        assert!(choice.kind.is_choice());
        assert_eq!(session.submit(WHITE, choice), Err(GameError::IllegalMove));

        let both = resolve(&session, "e1g1:castle-k-both");
        let outcome = session.submit(WHITE, both).unwrap();
        match outcome {
            SubmitOutcome::Committed { notation, .. } => assert_eq!(notation, "O-O (both)"),
            other => panic!("expected a commit, got {other:?}"),
        }
        let f1 = session
            .position()
            .board()
            .stack(klikschaak_core::Square::F1);
        assert!(f1.is_stacked());
    }

    #[test]
    fn resignation_and_abandonment() {
        let mut session = started(SessionConfig::default());
        session.resign(BLACK).unwrap();
        assert_eq!(
            session.terminal(),
            Some(Terminal::Resigned {
                winner: Color::White
            })
        );
        assert_eq!(session.resign(WHITE), Err(GameError::GameOver));

        let mut session = started(SessionConfig::default());
        session.abandon(WHITE).unwrap();
        assert_eq!(
            session.terminal(),
            Some(Terminal::Abandoned {
                winner: Color::Black
            })
        );
    }

    #[test]
    fn draw_offer_lifecycle() {
        let mut session = started(SessionConfig::default());
        assert_eq!(
            session.respond_draw(BLACK, true),
            Err(GameError::NoPendingDrawOffer)
        );
        session.offer_draw(WHITE).unwrap();
        // The offerer cannot answer their own offer.
        assert_eq!(
            session.respond_draw(WHITE, true),
            Err(GameError::NoPendingDrawOffer)
        );
        session.respond_draw(BLACK, false).unwrap();
        assert_eq!(session.terminal(), None);

        session.offer_draw(BLACK).unwrap();
        // A committed move clears the pending offer.
        submit(&mut session, WHITE, "e2e4");
        assert_eq!(
            session.respond_draw(WHITE, true),
            Err(GameError::NoPendingDrawOffer)
        );

        session.offer_draw(BLACK).unwrap();
        session.respond_draw(WHITE, true).unwrap();
        assert_eq!(session.terminal(), Some(Terminal::DrawAgreed));
    }

    #[test]
    fn snapshots_are_independent() {
        let mut session = started(SessionConfig::default());
        let snapshot = session.snapshot();
        submit(&mut session, WHITE, "e2e4");
        assert_eq!(snapshot.position().history().len(), 0);
        assert_eq!(session.position().history().len(), 1);
        assert_eq!(snapshot.phase(), SessionPhase::Active);
    }
}
