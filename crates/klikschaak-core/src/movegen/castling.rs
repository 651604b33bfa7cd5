//! Castling candidate generation, including the stacked-rook variants.

use crate::attacks::is_attacked;
use crate::castle_rights::CastleSide;
use crate::chess_move::{CastleVariant, Move, MoveKind};
use crate::color::Color;
use crate::file::File;
use crate::piece_kind::PieceKind;
use crate::position::Position;
use crate::rank::Rank;
use crate::square::Square;

/// Append castling candidates for the king standing on `from`.
///
/// Preconditions checked here:
/// - the right is still held and the king stands on its home square;
/// - the corner holds exactly one rook of the right color (alone, or
///   stacked with a non-rook companion);
/// - the king's destination is empty, plus B for queen side;
/// - the rook's landing square is empty (Plain/Choice) or holds an own
///   non-king singleton (Klik/UnklikKlik);
/// - the king is not in check, and neither the passed square nor the
///   destination is attacked once the king leaves its home square. Only the
///   king's three squares are safety-tested; the rook's landing square is
///   not further constrained.
pub(super) fn castle_candidates(
    position: &Position,
    from: Square,
    us: Color,
    moves: &mut Vec<Move>,
) {
    let board = position.board();
    let back = Rank::from_index(us.back_rank()).expect("back rank index is in range");
    if from != Square::new(back, File::FileE) {
        return;
    }
    if crate::attacks::is_in_check(board, us) {
        return;
    }

    // Hypothetical walk board: the king has left its home square.
    let mut walk_board = board.clone();
    walk_board.stack_mut(from).clear();

    for side in CastleSide::ALL {
        if !position.castle_rights().has(us, side) {
            continue;
        }
        let (corner_file, rook_dest_file, king_dest_file) = match side {
            CastleSide::KingSide => (File::FileH, File::FileF, File::FileG),
            CastleSide::QueenSide => (File::FileA, File::FileD, File::FileC),
        };
        let corner = Square::new(back, corner_file);
        let rook_dest = Square::new(back, rook_dest_file);
        let king_dest = Square::new(back, king_dest_file);

        let corner_stack = board.stack(corner);
        if corner_stack.color() != Some(us) {
            continue;
        }
        let rook_count = corner_stack
            .pieces()
            .iter()
            .filter(|p| p.kind() == PieceKind::Rook)
            .count();
        if rook_count != 1 {
            continue;
        }
        let rook_stacked = corner_stack.is_stacked();
        let rook = corner_stack
            .pieces()
            .iter()
            .copied()
            .find(|p| p.kind() == PieceKind::Rook)
            .expect("corner holds a rook");

        if !board.stack(king_dest).is_empty() {
            continue;
        }
        if side == CastleSide::QueenSide
            && !board.stack(Square::new(back, File::FileB)).is_empty()
        {
            continue;
        }

        let dest_stack = board.stack(rook_dest);
        let variant = if dest_stack.is_empty() {
            if rook_stacked {
                CastleVariant::Choice
            } else {
                CastleVariant::Plain
            }
        } else if dest_stack.accepts_klik(rook) {
            if rook_stacked {
                CastleVariant::UnklikKlik
            } else {
                CastleVariant::Klik
            }
        } else {
            continue;
        };

        let them = us.flip();
        if is_attacked(&walk_board, rook_dest, them) || is_attacked(&walk_board, king_dest, them) {
            continue;
        }

        moves.push(Move::new(from, king_dest, MoveKind::Castle { side, variant }));
    }
}
