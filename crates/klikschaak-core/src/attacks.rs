//! Attack and check oracle.
//!
//! Answers "can any piece of this color pseudo-capture that square?" by
//! casting reverse geometry from the target: leaper offsets are probed
//! directly, slider rays walk outward until the first occupied square. A
//! klikked pair attacks as if each member radiated its own geometry, which
//! falls out of checking the blocking stack for *any* matching kind. King
//! safety of the attacker is deliberately ignored: pins do not matter here.

use crate::board::Board;
use crate::color::Color;
use crate::piece_kind::PieceKind;
use crate::square::Square;

/// Knight offsets as (rank, file) deltas.
pub(crate) const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

/// King offsets: the 8-neighborhood.
pub(crate) const KING_OFFSETS: [(i8, i8); 8] = [
    (1, -1),
    (1, 0),
    (1, 1),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

/// Orthogonal ray directions (rook and queen).
pub(crate) const ORTHOGONAL_DIRS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Diagonal ray directions (bishop and queen).
pub(crate) const DIAGONAL_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Return `true` if any piece of `by` attacks `target` on `board`.
pub fn is_attacked(board: &Board, target: Square, by: Color) -> bool {
    let holds = |sq: Square, kinds: &[PieceKind]| {
        let stack = board.stack(sq);
        stack.color() == Some(by) && kinds.iter().any(|&k| stack.contains_kind(k))
    };

    for (dr, df) in KNIGHT_OFFSETS {
        if let Some(sq) = target.offset(dr, df) {
            if holds(sq, &[PieceKind::Knight]) {
                return true;
            }
        }
    }

    for (dr, df) in KING_OFFSETS {
        if let Some(sq) = target.offset(dr, df) {
            if holds(sq, &[PieceKind::King]) {
                return true;
            }
        }
    }

    // A pawn of `by` on S attacks S + forward ± 1 file, so probe one rank
    // back from the target on both adjacent files.
    for df in [-1, 1] {
        if let Some(sq) = target.offset(-by.forward(), df) {
            if holds(sq, &[PieceKind::Pawn]) {
                return true;
            }
        }
    }

    for (dirs, kinds) in [
        (ORTHOGONAL_DIRS, [PieceKind::Rook, PieceKind::Queen]),
        (DIAGONAL_DIRS, [PieceKind::Bishop, PieceKind::Queen]),
    ] {
        for (dr, df) in dirs {
            let mut current = target;
            while let Some(sq) = current.offset(dr, df) {
                if !board.stack(sq).is_empty() {
                    if holds(sq, &kinds) {
                        return true;
                    }
                    break;
                }
                current = sq;
            }
        }
    }

    false
}

/// Return `true` if `color`'s king is attacked by the opponent.
///
/// # Panics
///
/// Debug-asserts that the king exists; positions always hold one king per
/// color.
pub fn is_in_check(board: &Board, color: Color) -> bool {
    match board.king_square(color) {
        Some(king_sq) => is_attacked(board, king_sq, color.flip()),
        None => {
            debug_assert!(false, "position without a {color} king");
            false
        }
    }
}
