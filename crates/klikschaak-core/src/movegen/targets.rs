//! Geometric target squares for non-pawn pieces.

use crate::attacks::{DIAGONAL_DIRS, KING_OFFSETS, KNIGHT_OFFSETS, ORTHOGONAL_DIRS};
use crate::board::Board;
use crate::piece_kind::PieceKind;
use crate::square::Square;

/// All squares the given non-pawn kind reaches from `from`: leaper offsets,
/// or ray walks that include the first occupied square and stop there. The
/// caller classifies each destination's occupancy.
///
/// # Panics
///
/// Debug-asserts that `kind` is not `Pawn`; pawn geometry is asymmetric and
/// generated separately.
pub(super) fn non_pawn_targets(board: &Board, from: Square, kind: PieceKind) -> Vec<Square> {
    match kind {
        PieceKind::Knight => leaper_targets(from, &KNIGHT_OFFSETS),
        PieceKind::King => leaper_targets(from, &KING_OFFSETS),
        PieceKind::Rook => ray_targets(board, from, &ORTHOGONAL_DIRS),
        PieceKind::Bishop => ray_targets(board, from, &DIAGONAL_DIRS),
        PieceKind::Queen => {
            let mut targets = ray_targets(board, from, &ORTHOGONAL_DIRS);
            targets.extend(ray_targets(board, from, &DIAGONAL_DIRS));
            targets
        }
        PieceKind::Pawn => {
            debug_assert!(false, "pawn targets are generated separately");
            Vec::new()
        }
    }
}

fn leaper_targets(from: Square, offsets: &[(i8, i8)]) -> Vec<Square> {
    offsets
        .iter()
        .filter_map(|&(dr, df)| from.offset(dr, df))
        .collect()
}

fn ray_targets(board: &Board, from: Square, dirs: &[(i8, i8)]) -> Vec<Square> {
    let mut targets = Vec::new();
    for &(dr, df) in dirs {
        let mut current = from;
        while let Some(sq) = current.offset(dr, df) {
            targets.push(sq);
            if !board.stack(sq).is_empty() {
                break;
            }
            current = sq;
        }
    }
    targets
}

#[cfg(test)]
mod tests {
    use super::non_pawn_targets;
    use crate::board::Board;
    use crate::color::Color;
    use crate::piece::Piece;
    use crate::piece_kind::PieceKind;
    use crate::square::Square;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn knight_in_corner_has_two_targets() {
        let board = Board::empty();
        let targets = non_pawn_targets(&board, sq("a1"), PieceKind::Knight);
        assert_eq!(targets.len(), 2);
        assert!(targets.contains(&sq("b3")));
        assert!(targets.contains(&sq("c2")));
    }

    #[test]
    fn rook_ray_includes_first_blocker_and_stops() {
        let mut board = Board::empty();
        board.put(sq("a4"), Piece::new(PieceKind::Knight, Color::Black));
        let targets = non_pawn_targets(&board, sq("a1"), PieceKind::Rook);
        assert!(targets.contains(&sq("a2")));
        assert!(targets.contains(&sq("a3")));
        assert!(targets.contains(&sq("a4")));
        assert!(!targets.contains(&sq("a5")));
        // The full first rank is open.
        assert!(targets.contains(&sq("h1")));
    }

    #[test]
    fn queen_covers_both_ray_families() {
        let board = Board::empty();
        let targets = non_pawn_targets(&board, sq("d4"), PieceKind::Queen);
        assert!(targets.contains(&sq("d8")));
        assert!(targets.contains(&sq("h8")));
        assert!(targets.contains(&sq("a1")));
        assert_eq!(targets.len(), 27);
    }
}
