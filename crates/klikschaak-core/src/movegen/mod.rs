//! Candidate move generation.
//!
//! Two entry points mirror the two ways a player can select pieces:
//!
//! - [`square_candidates`] treats the whole square as the moving unit
//!   (default selection): every occupant contributes its geometry, and the
//!   destination's occupancy classifies the result as a normal move, a klik,
//!   a castle variant, or an en-passant form.
//! - [`unklik_candidates`] names one member of a klikked pair by index; the
//!   other member stays behind.
//!
//! Candidates are pseudo-legal: king safety is filtered afterwards by the
//! executor (see `make_move`).

mod castling;
mod targets;

use crate::chess_move::{Move, MoveKind};
use crate::piece::Piece;
use crate::piece_kind::PieceKind;
use crate::position::Position;
use crate::square::Square;

/// Generate whole-square pseudo-candidates from `from`.
///
/// Returns an empty list when the square is empty. The caller is responsible
/// for only asking about squares of the side to move.
pub(crate) fn square_candidates(position: &Position, from: Square) -> Vec<Move> {
    let board = position.board();
    let unit = board.stack(from);
    let Some(us) = unit.color() else {
        return Vec::new();
    };
    let singleton = unit.is_single();
    let has_pawn = unit.contains_pawn();
    let has_non_pawn = unit.pieces().iter().any(|p| !p.is_pawn());

    // (destination, kind, carried by a pawn's own geometry)
    let mut raw: Vec<(Square, MoveKind, bool)> = Vec::new();

    for &piece in unit.pieces() {
        match piece.kind() {
            PieceKind::Pawn => pawn_square_candidates(position, from, piece, singleton, &mut raw),
            kind => {
                for to in targets::non_pawn_targets(board, from, kind) {
                    let dest = board.stack(to);
                    if dest.is_empty() || dest.color() == Some(us.flip()) {
                        raw.push((to, MoveKind::Normal, false));
                    } else if singleton && dest.accepts_klik(piece) {
                        raw.push((to, MoveKind::Klik, false));
                    }
                }
            }
        }
    }

    // Only a pawn's own geometry may carry a pawn onto the promotion rank,
    // and no move may place a pawn back on its first rank.
    let promotion_rank = us.promotion_rank();
    let first_rank = us.back_rank();
    raw.retain(|&(to, _, pawn_carried)| {
        if has_pawn && to.rank_index() == first_rank {
            return false;
        }
        if has_pawn && has_non_pawn && !pawn_carried && to.rank_index() == promotion_rank {
            return false;
        }
        true
    });

    // A destination reachable both by a pawn onto the en-passant target and
    // by a non-pawn member as a normal move collapses into a single choice.
    let mut moves: Vec<Move> = Vec::new();
    for &(to, kind, _) in &raw {
        let kind = match kind {
            MoveKind::EnPassant | MoveKind::Normal
                if raw.iter().any(|&(t, k, _)| t == to && k == MoveKind::EnPassant)
                    && raw.iter().any(|&(t, k, _)| t == to && k == MoveKind::Normal) =>
            {
                MoveKind::EnPassantChoice
            }
            kind => kind,
        };
        let mv = Move::new(from, to, kind);
        if !moves.iter().any(|m| m.same_action(&mv)) {
            moves.push(mv);
        }
    }

    if unit.contains_king() {
        castling::castle_candidates(position, from, us, &mut moves);
    }

    moves
}

/// Generate per-piece pseudo-candidates: the stack member at `index` moves
/// alone, the other stays. Returns an empty list when the square is not a
/// klikked pair or the index is out of range.
pub(crate) fn unklik_candidates(position: &Position, from: Square, index: u8) -> Vec<Move> {
    let board = position.board();
    let unit = board.stack(from);
    if !unit.is_stacked() {
        return Vec::new();
    }
    let Some(piece) = unit.get(index as usize) else {
        return Vec::new();
    };
    let us = piece.color();

    let mut moves = Vec::new();
    match piece.kind() {
        PieceKind::Pawn => {
            let fwd = us.forward();
            if let Some(one) = from.offset(fwd, 0) {
                let dest = board.stack(one);
                if dest.is_empty() {
                    let kind = if position.en_passant() == Some(one) {
                        MoveKind::EnPassantUnklik
                    } else {
                        MoveKind::Unklik
                    };
                    moves.push(Move::unklik(from, one, kind, index));
                    if double_push_allowed(position, from, piece) {
                        if let Some(two) = one.offset(fwd, 0) {
                            let dest2 = board.stack(two);
                            if dest2.is_empty() {
                                moves.push(Move::unklik(from, two, MoveKind::Unklik, index));
                            } else if dest2.accepts_klik(piece) {
                                moves.push(Move::unklik(from, two, MoveKind::UnklikKlik, index));
                            }
                        }
                    }
                } else if dest.accepts_klik(piece) {
                    moves.push(Move::unklik(from, one, MoveKind::UnklikKlik, index));
                }
            }
            for df in [-1, 1] {
                if let Some(to) = from.offset(fwd, df) {
                    if board.stack(to).color() == Some(us.flip()) {
                        moves.push(Move::unklik(from, to, MoveKind::Unklik, index));
                    }
                }
            }
        }
        kind => {
            for to in targets::non_pawn_targets(board, from, kind) {
                let dest = board.stack(to);
                if dest.is_empty() || dest.color() == Some(us.flip()) {
                    moves.push(Move::unklik(from, to, MoveKind::Unklik, index));
                } else if dest.accepts_klik(piece) {
                    moves.push(Move::unklik(from, to, MoveKind::UnklikKlik, index));
                }
            }
        }
    }
    moves
}

/// Whole-square pawn geometry: pushes (including the double push and klik
/// pushes), diagonal captures, and the straight push onto the en-passant
/// target. Pawns never klik diagonally.
fn pawn_square_candidates(
    position: &Position,
    from: Square,
    piece: Piece,
    singleton: bool,
    raw: &mut Vec<(Square, MoveKind, bool)>,
) {
    let board = position.board();
    let us = piece.color();
    let fwd = us.forward();

    if let Some(one) = from.offset(fwd, 0) {
        let dest = board.stack(one);
        if dest.is_empty() {
            let kind = if position.en_passant() == Some(one) {
                MoveKind::EnPassant
            } else {
                MoveKind::Normal
            };
            raw.push((one, kind, true));
            if double_push_allowed(position, from, piece) {
                if let Some(two) = one.offset(fwd, 0) {
                    let dest2 = board.stack(two);
                    if dest2.is_empty() {
                        raw.push((two, MoveKind::Normal, true));
                    } else if singleton && dest2.accepts_klik(piece) {
                        raw.push((two, MoveKind::Klik, true));
                    }
                }
            }
        } else if singleton && dest.accepts_klik(piece) {
            raw.push((one, MoveKind::Klik, true));
        }
    }

    for df in [-1, 1] {
        if let Some(to) = from.offset(fwd, df) {
            if board.stack(to).color() == Some(us.flip()) {
                raw.push((to, MoveKind::Normal, true));
            }
        }
    }
}

/// A pawn may advance two squares only from its starting rank and only while
/// its own identity has never moved; stack transport back to the starting
/// rank does not restore the right.
fn double_push_allowed(position: &Position, from: Square, piece: Piece) -> bool {
    let us = piece.color();
    from.rank_index() == us.pawn_start_rank()
        && piece
            .pawn_id()
            .is_some_and(|id| !position.moved_pawns().contains(us, id))
}
