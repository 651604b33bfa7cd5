//! Move execution via copy-make, king-safety filtering, and notation.

use crate::attacks::is_in_check;
use crate::board::Board;
use crate::castle_rights::CastleSide;
use crate::chess_move::{CastleVariant, Move, MoveKind};
use crate::color::Color;
use crate::file::File;
use crate::piece::Piece;
use crate::piece_kind::PieceKind;
use crate::position::Position;
use crate::rank::Rank;
use crate::square::Square;
use crate::stack::Stack;

/// The squares involved in a castle: corner, rook landing, king landing.
pub(crate) fn castle_squares(us: Color, side: CastleSide) -> (Square, Square, Square) {
    let back = Rank::from_index(us.back_rank()).expect("back rank index is in range");
    let (corner_file, rook_dest_file, king_dest_file) = match side {
        CastleSide::KingSide => (File::FileH, File::FileF, File::FileG),
        CastleSide::QueenSide => (File::FileA, File::FileD, File::FileC),
    };
    (
        Square::new(back, corner_file),
        Square::new(back, rook_dest_file),
        Square::new(back, king_dest_file),
    )
}

/// Apply `mv` mechanically to a copy of `board`.
///
/// No legality checking and no game-state bookkeeping happens here; this is
/// the shared substrate of the scratch boards used for king-safety tests and
/// of the real commit in [`Position::apply`].
///
/// # Panics
///
/// Choice kinds are questions, not answers: they must be resolved before
/// application.
pub(crate) fn apply_to_board(board: &Board, mv: &Move, us: Color) -> Board {
    let mut next = board.clone();
    match mv.kind {
        MoveKind::Normal | MoveKind::EnPassant => {
            let unit = std::mem::take(next.stack_mut(mv.from));
            *next.stack_mut(mv.to) = unit;
            if mv.kind == MoveKind::EnPassant {
                remove_passed_pawn(&mut next, mv.to, us);
            }
        }
        MoveKind::Klik => {
            let unit = std::mem::take(next.stack_mut(mv.from));
            debug_assert!(unit.is_single(), "klik moves a singleton");
            for &piece in unit.pieces() {
                next.stack_mut(mv.to).push(piece);
            }
        }
        MoveKind::Unklik | MoveKind::EnPassantUnklik => {
            let index = mv.unklik.unwrap_or(0) as usize;
            let piece = next.stack_mut(mv.from).take(index);
            *next.stack_mut(mv.to) = Stack::single(piece);
            if mv.kind == MoveKind::EnPassantUnklik {
                remove_passed_pawn(&mut next, mv.to, us);
            }
        }
        MoveKind::UnklikKlik => {
            let index = mv.unklik.unwrap_or(0) as usize;
            let piece = next.stack_mut(mv.from).take(index);
            next.stack_mut(mv.to).push(piece);
        }
        MoveKind::Castle { side, variant } => apply_castle(&mut next, us, side, variant),
        MoveKind::EnPassantChoice => unreachable!("choices are resolved before application"),
    }
    if let Some(promotion) = mv.promotion {
        promote_pawns_on(&mut next, mv.to, promotion.to_piece_kind());
    }
    next
}

fn apply_castle(board: &mut Board, us: Color, side: CastleSide, variant: CastleVariant) {
    let back = Rank::from_index(us.back_rank()).expect("back rank index is in range");
    let king_from = Square::new(back, File::FileE);
    let (corner, rook_dest, king_dest) = castle_squares(us, side);

    let king = board.stack_mut(king_from).take(0);
    debug_assert!(king.is_king(), "castling moves the king");
    *board.stack_mut(king_dest) = Stack::single(king);

    match variant {
        CastleVariant::Plain => {
            let rook = take_rook(board, corner);
            *board.stack_mut(rook_dest) = Stack::single(rook);
        }
        CastleVariant::Klik | CastleVariant::UnklikKlik => {
            let rook = take_rook(board, corner);
            board.stack_mut(rook_dest).push(rook);
        }
        CastleVariant::Both => {
            let unit = std::mem::take(board.stack_mut(corner));
            *board.stack_mut(rook_dest) = unit;
        }
        CastleVariant::Choice => unreachable!("choices are resolved before application"),
    }
}

fn take_rook(board: &mut Board, corner: Square) -> Piece {
    let index = board
        .stack(corner)
        .pieces()
        .iter()
        .position(|p| p.kind() == PieceKind::Rook)
        .expect("castling requires a rook on the corner");
    board.stack_mut(corner).take(index)
}

/// Promotion: every pawn that just landed on `square` becomes the chosen
/// piece, discarding its identity. A non-pawn companion keeps its kind.
fn promote_pawns_on(board: &mut Board, square: Square, kind: PieceKind) {
    let pieces: Vec<Piece> = board.stack(square).pieces().to_vec();
    for (index, piece) in pieces.into_iter().enumerate() {
        if piece.is_pawn() {
            board.stack_mut(square).replace(index, piece.with_kind(kind));
        }
    }
}

/// En-passant removal: the enemy pawn sits on the square directly behind the
/// destination from the mover's side. A capture destroys the whole stack.
fn remove_passed_pawn(board: &mut Board, dest: Square, us: Color) {
    if let Some(behind) = dest.offset(-us.forward(), 0) {
        let stack = board.stack(behind);
        if stack.color() == Some(us.flip()) && stack.contains_pawn() {
            board.stack_mut(behind).clear();
        }
    }
}

/// Return `true` if applying `mv` leaves the mover's own king unattacked.
pub(crate) fn is_king_safe_after(position: &Position, mv: &Move, us: Color) -> bool {
    let scratch = apply_to_board(position.board(), mv, us);
    !is_in_check(&scratch, us)
}

/// Drop candidates that leave the mover in check. Choice candidates survive
/// when both resolutions are safe, degrade to the single safe resolution, or
/// disappear entirely.
pub(crate) fn keep_legal(position: &Position, us: Color, candidates: Vec<Move>) -> Vec<Move> {
    let mut legal = Vec::with_capacity(candidates.len());
    for mv in candidates {
        match mv.kind.resolutions() {
            Some([first, second]) => {
                let first_safe = is_king_safe_after(position, &Move { kind: first, ..mv }, us);
                let second_safe = is_king_safe_after(position, &Move { kind: second, ..mv }, us);
                match (first_safe, second_safe) {
                    (true, true) => legal.push(mv),
                    (true, false) => legal.push(Move { kind: first, ..mv }),
                    (false, true) => legal.push(Move { kind: second, ..mv }),
                    (false, false) => {}
                }
            }
            None => {
                if is_king_safe_after(position, &mv, us) {
                    legal.push(mv);
                }
            }
        }
    }
    legal
}

/// Render the human-readable notation for `mv` against the pre-move
/// position: unit glyphs + from + `-`/`x` + to, with ` e.p.`, `=<glyph>`,
/// and parenthetical qualifiers for the klik family and castle variants.
///
/// The notation is display-only and is never parsed back, but no two move
/// kinds ever render identically.
pub(crate) fn notation(position: &Position, mv: &Move) -> String {
    if let MoveKind::Castle { side, variant } = mv.kind {
        let base = match side {
            CastleSide::KingSide => "O-O",
            CastleSide::QueenSide => "O-O-O",
        };
        let qualifier = match variant {
            CastleVariant::Plain => "",
            CastleVariant::Klik => " (klik)",
            CastleVariant::UnklikKlik => " (unklik-klik)",
            CastleVariant::Both => " (both)",
            CastleVariant::Choice => unreachable!("choices are resolved before application"),
        };
        return format!("{base}{qualifier}");
    }

    let board = position.board();
    let unit = board.stack(mv.from);
    let glyphs: String = if mv.kind.is_unklik() {
        unit.get(mv.unklik.unwrap_or(0) as usize)
            .map(|p| p.kind().glyph().to_string())
            .unwrap_or_default()
    } else {
        unit.pieces().iter().map(|p| p.kind().glyph()).collect()
    };
    let captures = board.stack(mv.to).color() == Some(position.side_to_move().flip());
    let separator = if captures { 'x' } else { '-' };

    let mut rendered = format!("{glyphs}{}{separator}{}", mv.from, mv.to);
    if let Some(promotion) = mv.promotion {
        rendered.push('=');
        rendered.push(promotion.to_piece_kind().glyph());
    }
    match mv.kind {
        MoveKind::EnPassant => rendered.push_str(" e.p."),
        MoveKind::EnPassantUnklik => rendered.push_str(" e.p. (unklik)"),
        MoveKind::Klik => rendered.push_str(" (klik)"),
        MoveKind::Unklik => rendered.push_str(" (unklik)"),
        MoveKind::UnklikKlik => rendered.push_str(" (unklik-klik)"),
        _ => {}
    }
    rendered
}

#[cfg(test)]
mod tests {
    use crate::chess_move::{Move, MoveKind, MoveToken};
    use crate::position::Position;
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
    fn notation_distinguishes_klik_from_normal() {
        let mut position = Position::from_fen("4k3/8/8/8/8/1N6/8/R3K3 w Q - 0 1").unwrap();
        assert_eq!(play(&mut position, "b3a1k"), "Nb3-a1 (klik)");

        let mut position = Position::from_fen("4k3/8/8/8/8/1N6/8/R3K3 w Q - 0 1").unwrap();
        assert_eq!(play(&mut position, "b3c1"), "Nb3-c1");
    }

    #[test]
    fn notation_for_stack_capture() {
        let mut position = Position::from_fen("3rk3/8/8/3(RB)4/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(play(&mut position, "d5d8"), "RBd5xd8");
    }

    #[test]
    fn notation_for_unklik_promotion() {
        let mut position = Position::from_fen("k7/4(RP)3/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(play(&mut position, "e7e8qu1"), "Pe7-e8=Q (unklik)");
    }

    #[test]
    fn castle_notation() {
        let mut position = Position::from_fen("4k3/8/8/8/8/8/8/4K2(RB) w K - 0 1").unwrap();
        let token = MoveToken::parse("e1g1:castle-k-both").unwrap();
        let legal = position.legal_moves();
        let mv = Move::resolve_token(&token, &legal).unwrap();
        assert_eq!(position.apply(mv), "O-O (both)");
    }

    #[test]
    fn en_passant_application_clears_the_passed_square() {
        use super::apply_to_board;
        use crate::board::Board;
        use crate::color::Color;
        use crate::piece::{PawnId, Piece};
        use crate::piece_kind::PieceKind;
        use crate::stack::Stack;

        // Mechanical semantics only: the enemy occupancy directly behind the
        // destination is destroyed whole when it contains a pawn.
        let mut board = Board::empty();
        board.put(sq("d5"), Piece::pawn(Color::White, PawnId::new(3).unwrap()));
        *board.stack_mut(sq("c5")) = Stack::pair(
            Piece::pawn(Color::Black, PawnId::new(1).unwrap()),
            Piece::new(PieceKind::Knight, Color::Black),
        )
        .unwrap();
        board.put(sq("e1"), Piece::new(PieceKind::King, Color::White));
        board.put(sq("e8"), Piece::new(PieceKind::King, Color::Black));

        let mv = Move::new(sq("d5"), sq("c6"), MoveKind::EnPassant);
        let next = apply_to_board(&board, &mv, Color::White);
        assert!(next.stack(sq("c5")).is_empty());
        assert!(next.stack(sq("d5")).is_empty());
        assert_eq!(next.stack(sq("c6")).len(), 1);
    }

    #[test]
    fn promotion_detection() {
        let position = Position::from_fen("k7/4P3/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(position.requires_promotion(&Move::new(sq("e7"), sq("e8"), MoveKind::Normal)));
        assert!(!position.requires_promotion(&Move::new(sq("e1"), sq("e2"), MoveKind::Normal)));
    }
}
