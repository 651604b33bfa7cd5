//! Move representation: tagged move kinds, promotion pieces, and the compact
//! token grammar used between engine and session.

use std::fmt;

use crate::castle_rights::CastleSide;
use crate::error::TokenError;
use crate::piece_kind::PieceKind;
use crate::square::Square;

/// How the rook side of a castle resolves when stacks are involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastleVariant {
    /// Only the rook crosses; an unstacked rook leaves the corner empty, a
    /// stacked rook leaves its companion behind.
    Plain,
    /// The rook (alone on its corner) kliks onto a friendly singleton waiting
    /// on its landing square.
    Klik,
    /// A stacked rook unklikks off its companion and kliks onto a friendly
    /// singleton on its landing square.
    UnklikKlik,
    /// A stacked rook with an empty landing square: the player must pick
    /// between [`CastleVariant::Plain`] and [`CastleVariant::Both`].
    Choice,
    /// Both corner pieces cross to the rook's landing square as a stack.
    Both,
}

/// The kind of a move. Closed enumeration: every candidate the generator
/// produces carries exactly one of these tags, and the executor implements
/// exactly one semantics per tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// A whole-square move to an empty or enemy square. Captures destroy the
    /// entire enemy stack.
    Normal,
    /// A singleton moves onto a friendly singleton, forming a stack.
    Klik,
    /// One piece of a stack moves away alone; the other stays.
    Unklik,
    /// One piece of a stack moves onto a friendly singleton elsewhere.
    UnklikKlik,
    /// A pawn's straight push onto the en-passant target.
    EnPassant,
    /// An unklikked pawn's straight push onto the en-passant target.
    EnPassantUnklik,
    /// A pawn reaches the en-passant target while a non-pawn stack member
    /// reaches the same square normally; the player must pick the semantics.
    EnPassantChoice,
    /// A castle, king side or queen side, with the rook resolution above.
    Castle {
        /// Which side the king castles toward.
        side: CastleSide,
        /// How the rook's side of the move resolves.
        variant: CastleVariant,
    },
}

impl MoveKind {
    /// Return `true` for the kinds that name one stack member via an index.
    #[inline]
    pub const fn is_unklik(self) -> bool {
        matches!(
            self,
            MoveKind::Unklik | MoveKind::UnklikKlik | MoveKind::EnPassantUnklik
        )
    }

    /// Return `true` for the kinds that pose a question instead of an answer.
    #[inline]
    pub const fn is_choice(self) -> bool {
        matches!(self, MoveKind::EnPassantChoice)
            || matches!(
                self,
                MoveKind::Castle {
                    variant: CastleVariant::Choice,
                    ..
                }
            )
    }

    /// The two concrete kinds a choice resolves into, or `None` for kinds
    /// that are already concrete.
    pub const fn resolutions(self) -> Option<[MoveKind; 2]> {
        match self {
            MoveKind::EnPassantChoice => Some([MoveKind::Normal, MoveKind::EnPassant]),
            MoveKind::Castle {
                side,
                variant: CastleVariant::Choice,
            } => Some([
                MoveKind::Castle {
                    side,
                    variant: CastleVariant::Plain,
                },
                MoveKind::Castle {
                    side,
                    variant: CastleVariant::Both,
                },
            ]),
            _ => None,
        }
    }
}

/// The piece a pawn promotes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromotionPiece {
    Knight,
    Bishop,
    Rook,
    Queen,
}

impl PromotionPiece {
    /// All promotion pieces.
    pub const ALL: [PromotionPiece; 4] = [
        PromotionPiece::Knight,
        PromotionPiece::Bishop,
        PromotionPiece::Rook,
        PromotionPiece::Queen,
    ];

    /// Convert to the corresponding [`PieceKind`].
    pub const fn to_piece_kind(self) -> PieceKind {
        match self {
            PromotionPiece::Knight => PieceKind::Knight,
            PromotionPiece::Bishop => PieceKind::Bishop,
            PromotionPiece::Rook => PieceKind::Rook,
            PromotionPiece::Queen => PieceKind::Queen,
        }
    }

    /// Return the token character for this promotion.
    pub const fn token_char(self) -> char {
        match self {
            PromotionPiece::Knight => 'n',
            PromotionPiece::Bishop => 'b',
            PromotionPiece::Rook => 'r',
            PromotionPiece::Queen => 'q',
        }
    }

    /// Parse a token character into a promotion piece.
    pub const fn from_token_char(c: char) -> Option<PromotionPiece> {
        match c {
            'n' => Some(PromotionPiece::Knight),
            'b' => Some(PromotionPiece::Bishop),
            'r' => Some(PromotionPiece::Rook),
            'q' => Some(PromotionPiece::Queen),
            _ => None,
        }
    }
}

/// A fully tagged move: source, destination, kind, the stack index for
/// unklik kinds, and the promotion choice when a pawn reaches its last rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    /// Source square.
    pub from: Square,
    /// Destination square. For castles this is the king's destination.
    pub to: Square,
    /// The tagged kind.
    pub kind: MoveKind,
    /// Index (0 = bottom, 1 = top) of the moving piece for unklik kinds.
    pub unklik: Option<u8>,
    /// Promotion piece, present once the caller has chosen (or auto-chosen).
    pub promotion: Option<PromotionPiece>,
}

impl Move {
    /// Create a move with no unklik index and no promotion.
    pub const fn new(from: Square, to: Square, kind: MoveKind) -> Move {
        Move {
            from,
            to,
            kind,
            unklik: None,
            promotion: None,
        }
    }

    /// Create an unklik-family move naming a stack member.
    pub const fn unklik(from: Square, to: Square, kind: MoveKind, index: u8) -> Move {
        Move {
            from,
            to,
            kind,
            unklik: Some(index),
            promotion: None,
        }
    }

    /// Return a copy with the promotion choice filled in.
    pub const fn with_promotion(self, promotion: PromotionPiece) -> Move {
        Move {
            promotion: Some(promotion),
            ..self
        }
    }

    /// Return `true` if both moves denote the same action, ignoring the
    /// promotion choice.
    pub fn same_action(&self, other: &Move) -> bool {
        self.from == other.from
            && self.to == other.to
            && self.kind == other.kind
            && self.unklik == other.unklik
    }

    /// Render the compact token form: `<from><to>` plus an optional
    /// promotion character, an optional selector (`k`, `u0`, `u1`, `U0`,
    /// `U1`), and an optional `:` tag for castle variants and choices.
    pub fn to_token(&self) -> String {
        let mut token = format!("{}{}", self.from, self.to);
        if let Some(promo) = self.promotion {
            token.push(promo.token_char());
        }
        match self.kind {
            MoveKind::Klik => token.push('k'),
            MoveKind::Unklik | MoveKind::EnPassantUnklik => {
                token.push('u');
                token.push_str(&self.unklik.unwrap_or(0).to_string());
            }
            MoveKind::UnklikKlik => {
                token.push('U');
                token.push_str(&self.unklik.unwrap_or(0).to_string());
            }
            _ => {}
        }
        if let Some(tag) = kind_tag(self.kind) {
            token.push(':');
            token.push_str(tag);
        }
        token
    }

    /// Pick the legal move this token denotes, if any.
    ///
    /// Selector suffixes pin the kind family and stack index; `:` tags pin
    /// the kind exactly, and are additionally accepted as *resolutions* of a
    /// choice present in the legal set (submitting `e1g1:castle-k` against a
    /// generated `castle-k-choice` yields the rook-only resolution). A bare
    /// four-character token resolves when state leaves exactly one
    /// whole-square candidate.
    pub fn resolve_token(token: &MoveToken, legal: &[Move]) -> Option<Move> {
        let matching: Vec<&Move> =
            legal.iter().filter(|m| m.from == token.from && m.to == token.to).collect();
        let resolved = match token.selector {
            Some(Selector::Klik) => matching
                .iter()
                .find(|m| m.kind == MoveKind::Klik)
                .copied()
                .copied(),
            Some(Selector::Unklik(i)) => matching
                .iter()
                .find(|m| {
                    matches!(m.kind, MoveKind::Unklik | MoveKind::EnPassantUnklik)
                        && m.unklik == Some(i)
                })
                .copied()
                .copied(),
            Some(Selector::UnklikKlik(i)) => matching
                .iter()
                .find(|m| m.kind == MoveKind::UnklikKlik && m.unklik == Some(i))
                .copied()
                .copied(),
            None => match token.kind_hint {
                Some(hint) => match matching.iter().find(|m| m.kind == hint) {
                    Some(m) => Some(**m),
                    None => matching
                        .iter()
                        .find(|m| {
                            m.kind
                                .resolutions()
                                .is_some_and(|r| r.contains(&hint))
                        })
                        .map(|m| Move::new(m.from, m.to, hint)),
                },
                None => {
                    let whole: Vec<&&Move> =
                        matching.iter().filter(|m| !m.kind.is_unklik()).collect();
                    match whole.as_slice() {
                        [only] => Some(***only),
                        _ => None,
                    }
                }
            },
        };
        resolved.map(|m| match token.promotion {
            Some(promo) => m.with_promotion(promo),
            None => m,
        })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_token())
    }
}

fn kind_tag(kind: MoveKind) -> Option<&'static str> {
    match kind {
        MoveKind::EnPassantChoice => Some("ep-choice"),
        MoveKind::Castle { side, variant } => Some(match (side, variant) {
            (CastleSide::KingSide, CastleVariant::Plain) => "castle-k",
            (CastleSide::KingSide, CastleVariant::Klik) => "castle-k-klik",
            (CastleSide::KingSide, CastleVariant::UnklikKlik) => "castle-k-unklik-klik",
            (CastleSide::KingSide, CastleVariant::Choice) => "castle-k-choice",
            (CastleSide::KingSide, CastleVariant::Both) => "castle-k-both",
            (CastleSide::QueenSide, CastleVariant::Plain) => "castle-q",
            (CastleSide::QueenSide, CastleVariant::Klik) => "castle-q-klik",
            (CastleSide::QueenSide, CastleVariant::UnklikKlik) => "castle-q-unklik-klik",
            (CastleSide::QueenSide, CastleVariant::Choice) => "castle-q-choice",
            (CastleSide::QueenSide, CastleVariant::Both) => "castle-q-both",
        }),
        _ => None,
    }
}

fn tag_kind(tag: &str) -> Option<MoveKind> {
    let castle = |side, variant| MoveKind::Castle { side, variant };
    match tag {
        "normal" => Some(MoveKind::Normal),
        "ep" => Some(MoveKind::EnPassant),
        "ep-choice" => Some(MoveKind::EnPassantChoice),
        "castle-k" => Some(castle(CastleSide::KingSide, CastleVariant::Plain)),
        "castle-k-klik" => Some(castle(CastleSide::KingSide, CastleVariant::Klik)),
        "castle-k-unklik-klik" => Some(castle(CastleSide::KingSide, CastleVariant::UnklikKlik)),
        "castle-k-choice" => Some(castle(CastleSide::KingSide, CastleVariant::Choice)),
        "castle-k-both" => Some(castle(CastleSide::KingSide, CastleVariant::Both)),
        "castle-q" => Some(castle(CastleSide::QueenSide, CastleVariant::Plain)),
        "castle-q-klik" => Some(castle(CastleSide::QueenSide, CastleVariant::Klik)),
        "castle-q-unklik-klik" => Some(castle(CastleSide::QueenSide, CastleVariant::UnklikKlik)),
        "castle-q-choice" => Some(castle(CastleSide::QueenSide, CastleVariant::Choice)),
        "castle-q-both" => Some(castle(CastleSide::QueenSide, CastleVariant::Both)),
        _ => None,
    }
}

/// The stack-member selector suffix of a move token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// `k` -- klik with the whole-square singleton.
    Klik,
    /// `u0` / `u1` -- unklik the indexed piece.
    Unklik(u8),
    /// `U0` / `U1` -- unklik the indexed piece and klik at the destination.
    UnklikKlik(u8),
}

/// A parsed move token, not yet checked against the legal set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveToken {
    /// Source square.
    pub from: Square,
    /// Destination square.
    pub to: Square,
    /// Promotion choice, if the token carried one.
    pub promotion: Option<PromotionPiece>,
    /// Stack-member selector, if the token carried one.
    pub selector: Option<Selector>,
    /// Exact kind pinned by a `:` tag, if the token carried one.
    pub kind_hint: Option<MoveKind>,
}

impl MoveToken {
    /// Parse the compact token grammar:
    /// `<from><to>[promotion][selector][:tag]`.
    pub fn parse(input: &str) -> Result<MoveToken, TokenError> {
        let (body, tag) = match input.split_once(':') {
            Some((body, tag)) => (body, Some(tag)),
            None => (input, None),
        };
        if body.len() < 4 {
            return Err(TokenError::TooShort {
                token: input.to_string(),
            });
        }
        let from = Square::from_algebraic(&body[0..2]).ok_or_else(|| TokenError::BadSquare {
            token: input.to_string(),
        })?;
        let to = Square::from_algebraic(&body[2..4]).ok_or_else(|| TokenError::BadSquare {
            token: input.to_string(),
        })?;

        let mut rest = body[4..].chars().peekable();
        let promotion = match rest.peek().copied().and_then(PromotionPiece::from_token_char) {
            Some(promo) => {
                let _ = rest.next();
                Some(promo)
            }
            None => None,
        };
        let selector = match rest.next() {
            None => None,
            Some('k') => Some(Selector::Klik),
            Some(c @ ('u' | 'U')) => {
                let index = match rest.next() {
                    Some('0') => 0,
                    Some('1') => 1,
                    _ => {
                        return Err(TokenError::BadSelector {
                            token: input.to_string(),
                        });
                    }
                };
                Some(if c == 'u' {
                    Selector::Unklik(index)
                } else {
                    Selector::UnklikKlik(index)
                })
            }
            Some(_) => {
                return Err(TokenError::BadSelector {
                    token: input.to_string(),
                });
            }
        };
        if rest.next().is_some() {
            return Err(TokenError::TrailingInput {
                token: input.to_string(),
            });
        }
        let kind_hint = match tag {
            None => None,
            Some(tag) => Some(tag_kind(tag).ok_or_else(|| TokenError::UnknownTag {
                token: input.to_string(),
            })?),
        };
        Ok(MoveToken {
            from,
            to,
            promotion,
            selector,
            kind_hint,
        })
    }
}
