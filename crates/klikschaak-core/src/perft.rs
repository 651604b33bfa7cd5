//! Perft (performance test) over the full klik move space.
//!
//! Counts leaf nodes of the legal move tree, with choice candidates expanded
//! into both resolutions and promotions expanded into all four pieces, so
//! every countable line is a concrete committable move.

use crate::chess_move::{Move, PromotionPiece};
use crate::position::Position;

/// Count the number of leaf nodes at the given depth.
///
/// Depth 0 returns 1 (the current position). Depth 1 returns the number of
/// concrete legal moves.
pub fn perft(position: &Position, depth: usize) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = expand(position);
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0u64;
    for mv in moves {
        let mut child = position.clone();
        child.apply(mv);
        nodes += perft(&child, depth - 1);
    }
    nodes
}

/// Run perft with a per-move breakdown (useful for debugging).
///
/// Returns `(token, node_count)` pairs sorted by token.
pub fn divide(position: &Position, depth: usize) -> Vec<(String, u64)> {
    let mut results: Vec<(String, u64)> = expand(position)
        .into_iter()
        .map(|mv| {
            let mut child = position.clone();
            child.apply(mv);
            let count = if depth <= 1 {
                1
            } else {
                perft(&child, depth - 1)
            };
            (mv.to_token(), count)
        })
        .collect();
    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}

fn expand(position: &Position) -> Vec<Move> {
    let mut expanded = Vec::new();
    for mv in position.legal_moves() {
        match mv.kind.resolutions() {
            Some(kinds) => {
                for kind in kinds {
                    push_with_promotions(position, Move { kind, ..mv }, &mut expanded);
                }
            }
            None => push_with_promotions(position, mv, &mut expanded),
        }
    }
    expanded
}

fn push_with_promotions(position: &Position, mv: Move, out: &mut Vec<Move>) {
    if position.requires_promotion(&mv) {
        for promotion in PromotionPiece::ALL {
            out.push(mv.with_promotion(promotion));
        }
    } else {
        out.push(mv);
    }
}

#[cfg(test)]
mod tests {
    use super::{divide, perft};
    use crate::position::Position;

    #[test]
    fn perft_startpos_depth_1() {
        // 20 orthodox moves plus 14 kliks.
        let position = Position::starting();
        assert_eq!(perft(&position, 1), 34);
    }

    #[test]
    fn perft_startpos_depth_2() {
        // No first move of either side interacts with the opponent's
        // replies, so the tree is a clean 34 * 34.
        let position = Position::starting();
        assert_eq!(perft(&position, 2), 1156);
    }

    #[test]
    fn divide_sums_to_perft() {
        let position = Position::starting();
        let total: u64 = divide(&position, 2).into_iter().map(|(_, n)| n).sum();
        assert_eq!(total, perft(&position, 2));
    }

    #[test]
    fn promotions_count_four_ways() {
        let position = Position::from_fen("k7/4P3/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        // The single pawn push expands into four concrete promotions.
        let king_moves = position.legal_moves_from(crate::square::Square::E1).len();
        assert_eq!(perft(&position, 1), 4 + king_moves as u64);
    }

    #[test]
    fn choice_counts_both_resolutions() {
        let position = Position::from_fen("4k3/8/8/8/8/8/8/4K2(RB) w K - 0 1").unwrap();
        let breakdown = divide(&position, 1);
        assert!(breakdown.iter().any(|(token, _)| token == "e1g1:castle-k"));
        assert!(breakdown.iter().any(|(token, _)| token == "e1g1:castle-k-both"));
    }
}
