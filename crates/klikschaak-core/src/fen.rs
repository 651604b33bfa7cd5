//! Parsing and serialization of the FEN-like position string.
//!
//! The six standard fields follow FEN conventions, with one addition to the
//! board field: a square holding a klikked pair is written as a
//! parenthesized group `(XY)` (X the bottom piece, Y the top) which counts
//! as a single file.
//!
//! Two optional extension fields make serialization lossless:
//!
//! - field 7: pawn identities as digits, one per pawn in board-scan order
//!   (rank 8 first, files a to h, bottom of a pair before its top), or `-`
//!   when no pawns are on the board;
//! - field 8: the moved-pawn sets as `<white>/<black>`, each side a
//!   comma-separated identity list or `-`.
//!
//! A six-field string is accepted too: identities are then assigned
//! deterministically (the file of origin for a pawn standing on its origin
//! square, the lowest unused identity otherwise) and the moved set is
//! derived as the identities of all off-origin pawns.

use std::fmt;
use std::str::FromStr;

use crate::attacks::is_in_check;
use crate::board::Board;
use crate::castle_rights::{CastleRights, CastleSide};
use crate::color::Color;
use crate::error::FenError;
use crate::make_move::castle_squares;
use crate::moved_pawns::MovedPawns;
use crate::piece::{PawnId, Piece};
use crate::piece_kind::PieceKind;
use crate::position::Position;
use crate::square::Square;
use crate::stack::Stack;

/// The position string for the standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// One pawn found during parsing, in board-scan order.
struct PawnSlot {
    square: Square,
    stack_index: usize,
    color: Color,
}

impl Position {
    /// Parse a position string (six fields, or eight with the extensions).
    ///
    /// # Errors
    ///
    /// Returns a [`FenError`] for malformed input or for a position that
    /// violates the structural invariants (king counts, pawns on back
    /// ranks, castling rights without rooks, inconsistent pawn identities,
    /// or the resting player standing in check).
    pub fn from_fen(input: &str) -> Result<Position, FenError> {
        let fields: Vec<&str> = input.split_whitespace().collect();
        if fields.len() != 6 && fields.len() != 8 {
            return Err(FenError::WrongFieldCount {
                found: fields.len(),
            });
        }

        let (mut board, pawn_slots) = parse_board(fields[0])?;

        let side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(FenError::InvalidColor {
                    found: other.to_string(),
                });
            }
        };
        let castling =
            CastleRights::from_fen_field(fields[2]).ok_or_else(|| FenError::InvalidCastling {
                found: fields[2].to_string(),
            })?;
        let en_passant = match fields[3] {
            "-" => None,
            other => Some(Square::from_algebraic(other).ok_or_else(|| {
                FenError::InvalidEnPassant {
                    found: other.to_string(),
                }
            })?),
        };
        let halfmove_clock: u16 = fields[4].parse().map_err(|_| FenError::InvalidMoveCounter {
            field: "halfmove clock",
            found: fields[4].to_string(),
        })?;
        let fullmove_number: u16 = match fields[5].parse() {
            Ok(0) | Err(_) => {
                return Err(FenError::InvalidMoveCounter {
                    field: "fullmove number",
                    found: fields[5].to_string(),
                });
            }
            Ok(n) => n,
        };

        let moved_pawns = if fields.len() == 8 {
            assign_explicit_ids(&mut board, &pawn_slots, fields[6])?;
            let moved = parse_moved_sets(fields[7])?;
            check_pawn_consistency(&board, &pawn_slots, &moved)?;
            moved
        } else {
            assign_derived_ids(&mut board, &pawn_slots)?
        };

        let position = Position::from_parts(
            board,
            side_to_move,
            castling,
            en_passant,
            moved_pawns,
            halfmove_clock,
            fullmove_number,
        );
        validate(&position)?;
        Ok(position)
    }

    /// Render the six-field position string.
    pub fn to_fen(&self) -> String {
        format!(
            "{} {} {} {} {} {}",
            board_field(self.board()),
            self.side_to_move(),
            self.castle_rights(),
            match self.en_passant() {
                Some(sq) => sq.to_string(),
                None => "-".to_string(),
            },
            self.halfmove_clock(),
            self.fullmove_number(),
        )
    }

    /// Render the eight-field form including pawn identities and the
    /// moved-pawn sets; `from_fen` restores it exactly.
    pub fn to_fen_extended(&self) -> String {
        let ids: String = scan_pawns(self.board())
            .iter()
            .filter_map(|slot| {
                self.board()
                    .stack(slot.square)
                    .get(slot.stack_index)
                    .and_then(|p| p.pawn_id())
            })
            .map(|id| char::from(b'0' + id.raw()))
            .collect();
        let ids = if ids.is_empty() { "-".to_string() } else { ids };
        let render_side = |color: Color| {
            let list: Vec<String> = self
                .moved_pawns()
                .ids(color)
                .map(|id| id.to_string())
                .collect();
            if list.is_empty() {
                "-".to_string()
            } else {
                list.join(",")
            }
        };
        format!(
            "{} {ids} {}/{}",
            self.to_fen(),
            render_side(Color::White),
            render_side(Color::Black),
        )
    }
}

impl FromStr for Position {
    type Err = FenError;

    fn from_str(input: &str) -> Result<Position, FenError> {
        Position::from_fen(input)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}

fn parse_board(field: &str) -> Result<(Board, Vec<PawnSlot>), FenError> {
    let ranks: Vec<&str> = field.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::WrongRankCount { found: ranks.len() });
    }

    let mut board = Board::empty();
    let mut pawn_slots = Vec::new();

    for (group_index, rank_text) in ranks.iter().enumerate() {
        let rank_index = 7 - group_index as u8;
        let rank_number = rank_index as usize + 1;
        let mut file: u8 = 0;
        let mut chars = rank_text.chars();
        while let Some(c) = chars.next() {
            if file >= 8 {
                return Err(FenError::BadRankLength {
                    rank: rank_number,
                    length: file as usize + 1,
                });
            }
            match c {
                '1'..='8' => {
                    file += c as u8 - b'0';
                    if file > 8 {
                        return Err(FenError::BadRankLength {
                            rank: rank_number,
                            length: file as usize,
                        });
                    }
                }
                '(' => {
                    let bottom = chars.next();
                    let top = chars.next();
                    let close = chars.next();
                    let group = || {
                        format!(
                            "({}{}{}",
                            bottom.unwrap_or(' '),
                            top.unwrap_or(' '),
                            close.map(String::from).unwrap_or_default()
                        )
                    };
                    let (Some(bottom), Some(top), Some(')')) = (bottom, top, close) else {
                        return Err(FenError::InvalidStack { group: group() });
                    };
                    let bottom_piece =
                        Piece::from_fen_char(bottom).ok_or_else(|| FenError::InvalidStack {
                            group: group(),
                        })?;
                    let top_piece =
                        Piece::from_fen_char(top).ok_or_else(|| FenError::InvalidStack {
                            group: group(),
                        })?;
                    let stack = Stack::pair(bottom_piece, top_piece).ok_or_else(|| {
                        FenError::InvalidStack { group: group() }
                    })?;
                    let square = Square::from_index(rank_index * 8 + file)
                        .expect("rank and file indices are in range");
                    for (stack_index, piece) in stack.pieces().iter().enumerate() {
                        if piece.is_pawn() {
                            pawn_slots.push(PawnSlot {
                                square,
                                stack_index,
                                color: piece.color(),
                            });
                        }
                    }
                    *board.stack_mut(square) = stack;
                    file += 1;
                }
                _ => {
                    let piece =
                        Piece::from_fen_char(c).ok_or(FenError::InvalidPieceChar { character: c })?;
                    let square = Square::from_index(rank_index * 8 + file)
                        .expect("rank and file indices are in range");
                    if piece.is_pawn() {
                        pawn_slots.push(PawnSlot {
                            square,
                            stack_index: 0,
                            color: piece.color(),
                        });
                    }
                    *board.stack_mut(square) = Stack::single(piece);
                    file += 1;
                }
            }
        }
        if file != 8 {
            return Err(FenError::BadRankLength {
                rank: rank_number,
                length: file as usize,
            });
        }
    }
    Ok((board, pawn_slots))
}

/// Assign identities from the explicit extension field.
fn assign_explicit_ids(
    board: &mut Board,
    pawn_slots: &[PawnSlot],
    field: &str,
) -> Result<(), FenError> {
    let invalid = || FenError::InvalidPawnIds {
        found: field.to_string(),
    };
    let digits: Vec<char> = if field == "-" {
        Vec::new()
    } else {
        field.chars().collect()
    };
    if digits.len() != pawn_slots.len() {
        return Err(invalid());
    }
    let mut used = [0u8; Color::COUNT];
    for (slot, digit) in pawn_slots.iter().zip(digits) {
        let id = digit
            .to_digit(10)
            .and_then(|d| PawnId::new(d as u8))
            .ok_or_else(invalid)?;
        if used[slot.color.index()] & (1 << id.raw()) != 0 {
            return Err(invalid());
        }
        used[slot.color.index()] |= 1 << id.raw();
        reassign(board, slot, id);
    }
    Ok(())
}

/// Assign identities deterministically and derive the moved set: a pawn on
/// its origin square keeps the file as identity and counts as unmoved;
/// every other pawn receives the lowest unused identity and is recorded as
/// moved.
fn assign_derived_ids(board: &mut Board, pawn_slots: &[PawnSlot]) -> Result<MovedPawns, FenError> {
    let mut used = [0u8; Color::COUNT];
    let mut moved = MovedPawns::new();
    let mut deferred = Vec::new();

    for slot in pawn_slots {
        let file = slot.square.file_index();
        let on_start_rank = slot.square.rank_index() == slot.color.pawn_start_rank();
        if on_start_rank && used[slot.color.index()] & (1 << file) == 0 {
            used[slot.color.index()] |= 1 << file;
            let id = PawnId::new(file).expect("file index is a valid identity");
            reassign(board, slot, id);
        } else {
            deferred.push(slot);
        }
    }
    for slot in deferred {
        let free = (0u8..8).find(|i| used[slot.color.index()] & (1 << i) == 0);
        let Some(raw) = free else {
            return Err(FenError::TooManyPawns {
                color: color_name(slot.color),
            });
        };
        used[slot.color.index()] |= 1 << raw;
        let id = PawnId::new(raw).expect("free index is a valid identity");
        reassign(board, slot, id);
        moved.insert(slot.color, id);
    }
    Ok(moved)
}

fn reassign(board: &mut Board, slot: &PawnSlot, id: PawnId) {
    let piece = board
        .stack(slot.square)
        .get(slot.stack_index)
        .expect("pawn slot points at a parsed pawn");
    board
        .stack_mut(slot.square)
        .replace(slot.stack_index, piece.with_pawn_id(id));
}

fn parse_moved_sets(field: &str) -> Result<MovedPawns, FenError> {
    let invalid = || FenError::InvalidMovedPawns {
        found: field.to_string(),
    };
    let (white, black) = field.split_once('/').ok_or_else(invalid)?;
    let mut moved = MovedPawns::new();
    for (color, text) in [(Color::White, white), (Color::Black, black)] {
        if text == "-" {
            continue;
        }
        for part in text.split(',') {
            let id = part
                .parse::<u8>()
                .ok()
                .and_then(PawnId::new)
                .ok_or_else(invalid)?;
            moved.insert(color, id);
        }
    }
    Ok(moved)
}

/// With explicit identities, every pawn away from its origin square must be
/// recorded as moved.
fn check_pawn_consistency(
    board: &Board,
    pawn_slots: &[PawnSlot],
    moved: &MovedPawns,
) -> Result<(), FenError> {
    for slot in pawn_slots {
        let piece = board
            .stack(slot.square)
            .get(slot.stack_index)
            .expect("pawn slot points at a parsed pawn");
        let id = piece.pawn_id().expect("slot holds a pawn");
        let on_origin = slot.square.rank_index() == slot.color.pawn_start_rank()
            && slot.square.file_index() == id.raw();
        if !on_origin && !moved.contains(slot.color, id) {
            return Err(FenError::UnmovedPawnOffOrigin);
        }
    }
    Ok(())
}

fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "white",
        Color::Black => "black",
    }
}

/// Structural validation run after parsing.
fn validate(position: &Position) -> Result<(), FenError> {
    let board = position.board();

    for color in Color::ALL {
        let kings: usize = board
            .squares_of(color)
            .map(|sq| {
                board
                    .stack(sq)
                    .pieces()
                    .iter()
                    .filter(|p| p.is_king())
                    .count()
            })
            .sum();
        if kings != 1 {
            return Err(FenError::InvalidKingCount {
                color: color_name(color),
                count: kings,
            });
        }
        let pawns: usize = board
            .squares_of(color)
            .map(|sq| {
                board
                    .stack(sq)
                    .pieces()
                    .iter()
                    .filter(|p| p.is_pawn() && p.color() == color)
                    .count()
            })
            .sum();
        if pawns > 8 {
            return Err(FenError::TooManyPawns {
                color: color_name(color),
            });
        }
    }

    for sq in Square::all() {
        let rank = sq.rank_index();
        if (rank == 0 || rank == 7) && board.stack(sq).contains_pawn() {
            return Err(FenError::PawnsOnBackRank);
        }
    }

    for color in Color::ALL {
        for side in CastleSide::ALL {
            if !position.castle_rights().has(color, side) {
                continue;
            }
            let (corner, _, _) = castle_squares(color, side);
            let stack = board.stack(corner);
            if stack.color() != Some(color) || !stack.contains_kind(PieceKind::Rook) {
                return Err(FenError::CastlingWithoutRook);
            }
        }
    }

    if let Some(target) = position.en_passant() {
        let expected_rank = match position.side_to_move() {
            Color::White => 5,
            Color::Black => 2,
        };
        if target.rank_index() != expected_rank || !board.stack(target).is_empty() {
            return Err(FenError::InvalidEnPassant {
                found: target.to_string(),
            });
        }
    }

    if is_in_check(board, position.side_to_move().flip()) {
        return Err(FenError::OpponentInCheck);
    }

    Ok(())
}

fn board_field(board: &Board) -> String {
    let mut out = String::new();
    for rank_index in (0u8..8).rev() {
        if rank_index < 7 {
            out.push('/');
        }
        let mut empty_run = 0;
        for file_index in 0u8..8 {
            let sq = Square::from_index(rank_index * 8 + file_index)
                .expect("rank and file indices are in range");
            match board.stack(sq).pieces() {
                [] => empty_run += 1,
                pieces => {
                    if empty_run > 0 {
                        out.push(char::from(b'0' + empty_run));
                        empty_run = 0;
                    }
                    match pieces {
                        [single] => out.push(single.fen_char()),
                        [bottom, top] => {
                            out.push('(');
                            out.push(bottom.fen_char());
                            out.push(top.fen_char());
                            out.push(')');
                        }
                        _ => unreachable!("a square holds at most two pieces"),
                    }
                }
            }
        }
        if empty_run > 0 {
            out.push(char::from(b'0' + empty_run));
        }
    }
    out
}

/// Pawns in board-scan order: rank 8 first, files a to h, bottom of a pair
/// before its top.
fn scan_pawns(board: &Board) -> Vec<PawnSlot> {
    let mut slots = Vec::new();
    for rank_index in (0u8..8).rev() {
        for file_index in 0u8..8 {
            let sq = Square::from_index(rank_index * 8 + file_index)
                .expect("rank and file indices are in range");
            for (stack_index, piece) in board.stack(sq).pieces().iter().enumerate() {
                if piece.is_pawn() {
                    slots.push(PawnSlot {
                        square: sq,
                        stack_index,
                        color: piece.color(),
                    });
                }
            }
        }
    }
    slots
}
