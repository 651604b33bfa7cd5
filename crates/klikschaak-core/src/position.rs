//! The full game position: board plus side to move, castling, en passant,
//! pawn bookkeeping, move counters, and the move history.

use std::fmt;

use crate::attacks::is_in_check;
use crate::board::Board;
use crate::castle_rights::{CastleRights, CastleSide};
use crate::chess_move::{Move, MoveKind};
use crate::color::Color;
use crate::make_move::{self, castle_squares};
use crate::moved_pawns::MovedPawns;
use crate::movegen;
use crate::piece::Piece;
use crate::piece_kind::PieceKind;
use crate::square::Square;

/// A complete position.
///
/// The only mutator is [`Position::apply`]; everything else is read-only.
/// Equality compares the full game state: board (pawn identities included),
/// side to move, castling, en passant, moved-pawn sets, and the move
/// counters. The move history is an audit trail rather than state and is
/// not compared.
#[derive(Clone)]
pub struct Position {
    board: Board,
    side_to_move: Color,
    castling: CastleRights,
    en_passant: Option<Square>,
    moved_pawns: MovedPawns,
    halfmove_clock: u16,
    fullmove_number: u16,
    history: Vec<(Color, String)>,
}

impl Position {
    /// The standard starting position.
    pub fn starting() -> Position {
        Position {
            board: Board::starting(),
            side_to_move: Color::White,
            castling: CastleRights::ALL,
            en_passant: None,
            moved_pawns: MovedPawns::new(),
            halfmove_clock: 0,
            fullmove_number: 1,
            history: Vec::new(),
        }
    }

    pub(crate) fn from_parts(
        board: Board,
        side_to_move: Color,
        castling: CastleRights,
        en_passant: Option<Square>,
        moved_pawns: MovedPawns,
        halfmove_clock: u16,
        fullmove_number: u16,
    ) -> Position {
        Position {
            board,
            side_to_move,
            castling,
            en_passant,
            moved_pawns,
            halfmove_clock,
            fullmove_number,
            history: Vec::new(),
        }
    }

    /// The piece placement.
    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The side to move.
    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// The remaining castling rights.
    #[inline]
    pub fn castle_rights(&self) -> CastleRights {
        self.castling
    }

    /// The en-passant target, if the previous move was a double push.
    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    /// The pawn identities that have moved, per color.
    #[inline]
    pub fn moved_pawns(&self) -> &MovedPawns {
        &self.moved_pawns
    }

    /// Halfmove clock (moves since the last capture or pawn move).
    #[inline]
    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    /// Fullmove number (starts at 1, incremented after Black moves).
    #[inline]
    pub fn fullmove_number(&self) -> u16 {
        self.fullmove_number
    }

    /// The committed moves so far: notation strings tagged with the mover.
    #[inline]
    pub fn history(&self) -> &[(Color, String)] {
        &self.history
    }

    /// Return `true` if the side to move stands in check.
    pub fn in_check(&self) -> bool {
        is_in_check(&self.board, self.side_to_move)
    }

    /// All legal moves for the side to move: every whole-square selection
    /// plus every unklik selection of every klikked pair.
    pub fn legal_moves(&self) -> Vec<Move> {
        let us = self.side_to_move;
        let mut moves = Vec::new();
        for from in self.board.squares_of(us) {
            moves.extend(self.legal_moves_from(from));
            if self.board.stack(from).is_stacked() {
                for index in 0..2 {
                    moves.extend(self.legal_unklik_moves(from, index));
                }
            }
        }
        moves
    }

    /// Legal whole-square moves from one square of the side to move.
    /// Empty when the square is empty or belongs to the opponent.
    pub fn legal_moves_from(&self, from: Square) -> Vec<Move> {
        let us = self.side_to_move;
        if !self.board.is_color(from, us) {
            return Vec::new();
        }
        make_move::keep_legal(self, us, movegen::square_candidates(self, from))
    }

    /// Legal unklik moves of the stack member at `index` (0 = bottom).
    /// Empty when the square is not a klikked pair of the side to move.
    pub fn legal_unklik_moves(&self, from: Square, index: u8) -> Vec<Move> {
        let us = self.side_to_move;
        if !self.board.is_color(from, us) {
            return Vec::new();
        }
        make_move::keep_legal(self, us, movegen::unklik_candidates(self, from, index))
    }

    /// Return `true` if the side to move has at least one legal move.
    ///
    /// Termination detection must be honest: unklik and unklik-klik escapes
    /// count, so klikked pairs are probed per piece as well.
    pub fn has_legal_move(&self) -> bool {
        let us = self.side_to_move;
        for from in self.board.squares_of(us) {
            if !self.legal_moves_from(from).is_empty() {
                return true;
            }
            if self.board.stack(from).is_stacked() {
                for index in 0..2 {
                    if !self.legal_unklik_moves(from, index).is_empty() {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Return `true` if committing `mv` lands a pawn of the moving unit on
    /// its promotion rank, so a promotion piece must be chosen first.
    pub fn requires_promotion(&self, mv: &Move) -> bool {
        let us = self.side_to_move;
        if mv.to.rank_index() != us.promotion_rank() {
            return false;
        }
        match mv.kind {
            MoveKind::Castle { .. } => false,
            // En-passant targets sit on the third and sixth ranks.
            MoveKind::EnPassantChoice => false,
            kind if kind.is_unklik() => self
                .board
                .stack(mv.from)
                .get(mv.unklik.unwrap_or(0) as usize)
                .is_some_and(|p| p.is_pawn()),
            _ => self.board.stack(mv.from).contains_pawn(),
        }
    }

    /// Commit a verified move and return its notation.
    ///
    /// This is the single place where the side to move flips, the en-passant
    /// target is rewritten, castling rights decay, pawn identities are
    /// recorded as moved, and the clocks advance. The move must come from
    /// the legal set (with choices already resolved, and a promotion piece
    /// attached where [`Position::requires_promotion`] says so); under that
    /// contract `apply` is total.
    pub fn apply(&mut self, mv: Move) -> String {
        debug_assert!(!mv.kind.is_choice(), "choices are resolved before application");
        debug_assert!(!self.requires_promotion(&mv) || mv.promotion.is_some());

        let us = self.side_to_move;
        let rendered = make_move::notation(self, &mv);

        let moving_pieces = self.moving_pieces(&mv);
        let destination = self.board.stack(mv.to);
        let was_capture = destination.color() == Some(us.flip());
        let destination_was_empty = destination.is_empty();

        self.board = make_move::apply_to_board(&self.board, &mv, us);

        // En-passant target: set only by a straight double push onto an
        // empty square, cleared by everything else.
        self.en_passant = None;
        let pawn_moved = moving_pieces.iter().any(|p| p.is_pawn());
        let rank_delta = mv.to.rank_index() as i8 - mv.from.rank_index() as i8;
        if pawn_moved
            && destination_was_empty
            && mv.from.file_index() == mv.to.file_index()
            && rank_delta.abs() == 2
        {
            self.en_passant = mv.from.offset(rank_delta / 2, 0);
        }

        // Castling rights: a king move (castling included) forfeits both
        // rights; a right also decays the moment its corner no longer holds
        // a friendly rook through departure or capture. Unklikking the
        // companion off a stacked corner rook keeps the right.
        if moving_pieces.iter().any(|p| p.is_king()) {
            self.castling.revoke_color(us);
        }
        for color in Color::ALL {
            for side in CastleSide::ALL {
                if !self.castling.has(color, side) {
                    continue;
                }
                let (corner, _, _) = castle_squares(color, side);
                let stack = self.board.stack(corner);
                if stack.color() != Some(color) || !stack.contains_kind(PieceKind::Rook) {
                    self.castling.revoke(color, side);
                }
            }
        }

        for piece in &moving_pieces {
            if let Some(id) = piece.pawn_id() {
                self.moved_pawns.insert(us, id);
            }
        }

        let was_en_passant = matches!(mv.kind, MoveKind::EnPassant | MoveKind::EnPassantUnklik);
        if pawn_moved || was_capture || was_en_passant {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if us == Color::Black {
            self.fullmove_number += 1;
        }

        self.history.push((us, rendered.clone()));
        self.side_to_move = us.flip();
        tracing::trace!(mover = %us, notation = %rendered, "move committed");
        rendered
    }

    /// The pieces that travel with `mv`: the whole unit, one named stack
    /// member, or king plus rook side for castles.
    fn moving_pieces(&self, mv: &Move) -> Vec<Piece> {
        let unit = self.board.stack(mv.from);
        match mv.kind {
            kind if kind.is_unklik() => unit
                .get(mv.unklik.unwrap_or(0) as usize)
                .into_iter()
                .collect(),
            MoveKind::Castle { side, variant } => {
                let mut pieces = unit.pieces().to_vec();
                let (corner, _, _) = castle_squares(self.side_to_move, side);
                let corner_stack = self.board.stack(corner);
                match variant {
                    crate::chess_move::CastleVariant::Both => {
                        pieces.extend(corner_stack.pieces().iter().copied());
                    }
                    _ => pieces.extend(
                        corner_stack
                            .pieces()
                            .iter()
                            .copied()
                            .filter(|p| p.kind() == PieceKind::Rook),
                    ),
                }
                pieces
            }
            _ => unit.pieces().to_vec(),
        }
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Position) -> bool {
        self.board == other.board
            && self.side_to_move == other.side_to_move
            && self.castling == other.castling
            && self.en_passant == other.en_passant
            && self.moved_pawns == other.moved_pawns
            && self.halfmove_clock == other.halfmove_clock
            && self.fullmove_number == other.fullmove_number
    }
}

impl Eq for Position {}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Position(\"{}\")", self.to_fen_extended())
    }
}

#[cfg(test)]
mod tests {
    use super::Position;
    use crate::castle_rights::CastleSide;
    use crate::chess_move::{CastleVariant, Move, MoveKind, MoveToken, PromotionPiece};
    use crate::color::Color;
    use crate::piece::PawnId;
    use crate::piece_kind::PieceKind;
    use crate::square::Square;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn play(position: &mut Position, token: &str) -> String {
        let token = MoveToken::parse(token).unwrap();
        let legal = position.legal_moves();
        let mv = Move::resolve_token(&token, &legal)
            .unwrap_or_else(|| panic!("token does not resolve against the legal set"));
        position.apply(mv)
    }

    #[test]
    fn three_normal_moves_from_the_start() {
        let mut position = Position::starting();
        play(&mut position, "e2e4");
        assert_eq!(position.en_passant(), Some(sq("e3")));
        play(&mut position, "e7e5");
        assert_eq!(position.en_passant(), Some(sq("e6")));
        play(&mut position, "g1f3");

        assert_eq!(position.side_to_move(), Color::Black);
        assert_eq!(position.en_passant(), None);
        let f3 = position.board().stack(sq("f3"));
        assert_eq!(f3.get(0).map(|p| p.kind()), Some(PieceKind::Knight));
        assert_eq!(position.history().len(), 3);
        assert_eq!(position.fullmove_number(), 2);
    }

    #[test]
    fn klik_onto_corner_keeps_the_castle_right() {
        let mut position = Position::from_fen("4k3/8/8/8/8/1N6/8/R3K3 w Q - 0 1").unwrap();
        play(&mut position, "b3a1k");

        let a1 = position.board().stack(sq("a1"));
        assert!(a1.is_stacked());
        assert_eq!(a1.get(0).map(|p| p.kind()), Some(PieceKind::Rook));
        assert_eq!(a1.get(1).map(|p| p.kind()), Some(PieceKind::Knight));
        assert!(
            position
                .castle_rights()
                .has(Color::White, CastleSide::QueenSide)
        );

        // The stacked corner rook now castles with a choice.
        play(&mut position, "e8d8");
        let castles: Vec<_> = position
            .legal_moves_from(sq("e1"))
            .into_iter()
            .filter(|m| matches!(m.kind, MoveKind::Castle { .. }))
            .collect();
        assert_eq!(castles.len(), 1);
        assert_eq!(
            castles[0].kind,
            MoveKind::Castle {
                side: CastleSide::QueenSide,
                variant: CastleVariant::Choice
            }
        );
    }

    #[test]
    fn unklik_promotion_leaves_the_rook_behind() {
        let mut position = Position::from_fen("k7/4(RP)3/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        play(&mut position, "e7e8qu1");

        let e7 = position.board().stack(sq("e7"));
        assert!(e7.is_single());
        assert_eq!(e7.get(0).map(|p| p.kind()), Some(PieceKind::Rook));
        let e8 = position.board().stack(sq("e8"));
        assert!(e8.is_single());
        assert_eq!(e8.get(0).map(|p| p.kind()), Some(PieceKind::Queen));
        assert_eq!(position.side_to_move(), Color::Black);
        // The mover did not end in check; Black now faces the new queen.
        assert!(!crate::attacks::is_in_check(position.board(), Color::White));
    }

    #[test]
    fn diagonal_pawn_geometry_never_offers_en_passant() {
        // Black just pushed b7b5; the white pawn stacked on c5 reaches b6
        // only diagonally, which is not an en-passant form.
        let position = Position::from_fen("k7/8/8/1p(QP)5/8/8/8/K7 w - b6 0 1").unwrap();
        let to_b6: Vec<_> = position
            .legal_moves_from(sq("c5"))
            .into_iter()
            .filter(|m| m.to == sq("b6"))
            .collect();
        assert_eq!(to_b6.len(), 1);
        assert_eq!(to_b6[0].kind, MoveKind::Normal);
        assert!(
            !position
                .legal_moves()
                .iter()
                .any(|m| matches!(
                    m.kind,
                    MoveKind::EnPassant | MoveKind::EnPassantChoice | MoveKind::EnPassantUnklik
                ))
        );
    }

    #[test]
    fn straight_push_onto_the_target_offers_the_choice() {
        // Queen and pawn both reach c6; the pawn's straight push onto the
        // target and the queen's normal move collapse into one choice.
        let position = Position::from_fen("k7/8/8/2(QP)5/8/8/8/K7 w - c6 0 1").unwrap();
        let to_c6: Vec<_> = position
            .legal_moves_from(sq("c5"))
            .into_iter()
            .filter(|m| m.to == sq("c6"))
            .collect();
        assert_eq!(to_c6.len(), 1);
        assert_eq!(to_c6[0].kind, MoveKind::EnPassantChoice);

        // A pawn-pawn pair produces a plain en-passant candidate instead:
        // both members describe the same action, so there is no conflict.
        let position = Position::from_fen("k7/8/8/2(PP)5/8/8/8/K7 w - c6 0 1").unwrap();
        let to_c6: Vec<_> = position
            .legal_moves_from(sq("c5"))
            .into_iter()
            .filter(|m| m.to == sq("c6"))
            .collect();
        assert_eq!(to_c6.len(), 1);
        assert_eq!(to_c6[0].kind, MoveKind::EnPassant);
    }

    #[test]
    fn resolving_the_en_passant_choice() {
        let mut position = Position::from_fen("k7/8/8/2(QP)5/8/8/8/K7 w - c6 0 1").unwrap();
        let rendered = play(&mut position, "c5c6:ep");
        assert!(rendered.ends_with(" e.p."));
        assert!(position.board().stack(sq("c6")).is_stacked());
        assert!(position.board().stack(sq("c5")).is_empty());
    }

    #[test]
    fn stalemate_position_has_no_legal_moves() {
        let mut position = Position::from_fen("8/8/8/8/8/1q6/P1k5/K7 b - - 0 1").unwrap();
        play(&mut position, "b3a3");

        assert!(!position.has_legal_move());
        assert!(!position.in_check());
    }

    #[test]
    fn checkmate_position_is_detected() {
        let position = Position::from_fen("k7/1Q6/1K6/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(!position.has_legal_move());
        assert!(position.in_check());
    }

    #[test]
    fn termination_detection_sees_unklik_escapes() {
        // The black king is boxed in, every black pawn is blocked, and the
        // knight pair on b8 has no whole-square move: each knight target
        // holds a friendly singleton, and a pair may not klik. Unklik-klik
        // moves onto those singletons still exist, so this is not stalemate.
        let position =
            Position::from_fen("k(nn)6/2Qp4/p1pN4/N1N5/8/8/8/7K b - - 0 1").unwrap();
        assert!(position.legal_moves_from(sq("a8")).is_empty());
        assert!(position.legal_moves_from(sq("b8")).is_empty());
        let escapes = position.legal_unklik_moves(sq("b8"), 0);
        assert!(!escapes.is_empty());
        assert!(escapes.iter().all(|m| m.kind == MoveKind::UnklikKlik));
        assert!(position.has_legal_move());
    }

    #[test]
    fn transported_pawn_keeps_its_moved_identity() {
        // The e2 square holds a knight-pawn pair whose pawn already moved:
        // no double push, single push only.
        let position =
            Position::from_fen("4k3/8/8/8/8/8/4(NP)3/4K3 w - - 0 1 4 4/-").unwrap();
        assert!(
            position
                .moved_pawns()
                .contains(Color::White, PawnId::new(4).unwrap())
        );
        let pawn_pushes: Vec<_> = position
            .legal_unklik_moves(sq("e2"), 1)
            .into_iter()
            .filter(|m| m.to.file_index() == 4)
            .collect();
        assert_eq!(pawn_pushes.len(), 1);
        assert_eq!(pawn_pushes[0].to, sq("e3"));

        // The same placement with a fresh pawn allows the double push.
        let position =
            Position::from_fen("4k3/8/8/8/8/8/4(NP)3/4K3 w - - 0 1 4 -/-").unwrap();
        let pawn_pushes: Vec<_> = position
            .legal_unklik_moves(sq("e2"), 1)
            .into_iter()
            .filter(|m| m.to.file_index() == 4)
            .collect();
        assert_eq!(pawn_pushes.len(), 2);
    }

    #[test]
    fn rook_departure_and_capture_revoke_rights() {
        // Moving the corner rook away forfeits its right.
        let mut position = Position::from_fen("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        play(&mut position, "a1a4");
        assert!(!position.castle_rights().has(Color::White, CastleSide::QueenSide));
        assert!(position.castle_rights().has(Color::White, CastleSide::KingSide));

        // Capturing the corner rook revokes the opponent's right.
        let mut position = Position::from_fen("4k2r/8/8/8/8/8/8/4K2R b k - 0 1").unwrap();
        play(&mut position, "h8h1");
        assert!(position.castle_rights().is_empty());
    }

    #[test]
    fn applying_the_same_move_is_deterministic() {
        let base = Position::starting();
        let mv = Move::new(sq("e2"), sq("e4"), MoveKind::Normal);
        let mut first = base.clone();
        let mut second = base.clone();
        assert_eq!(first.apply(mv), second.apply(mv));
        assert_eq!(first, second);
    }

    #[test]
    fn klik_push_to_promotion_rank_promotes_the_pawn() {
        // Pawn on e7 kliks onto the knight on e8 and promotes; the knight
        // resident keeps its kind.
        let mut position = Position::from_fen("k3N3/4P3/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let legal = position.legal_moves_from(sq("e7"));
        let klik = legal
            .iter()
            .find(|m| m.kind == MoveKind::Klik)
            .expect("pawn kliks straight onto e8");
        assert!(position.requires_promotion(klik));
        position.apply(klik.with_promotion(PromotionPiece::Rook));
        let e8 = position.board().stack(sq("e8"));
        assert_eq!(e8.get(0).map(|p| p.kind()), Some(PieceKind::Knight));
        assert_eq!(e8.get(1).map(|p| p.kind()), Some(PieceKind::Rook));
    }
}
