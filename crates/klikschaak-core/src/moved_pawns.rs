//! Per-color record of pawn identities that have moved.

use std::fmt;

use crate::color::Color;
use crate::piece::PawnId;

/// The set of pawn identities, per color, that have made at least one move.
///
/// Membership gates the double push: a pawn whose identity is recorded here
/// may not advance two squares even if stack transport has returned it to its
/// starting rank. Identities of captured or promoted pawns stay in the set;
/// an identity is never reintroduced, so the set only grows.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct MovedPawns {
    masks: [u8; Color::COUNT],
}

impl MovedPawns {
    /// The empty record: no pawn of either color has moved.
    #[inline]
    pub const fn new() -> MovedPawns {
        MovedPawns {
            masks: [0; Color::COUNT],
        }
    }

    /// Return `true` if the identified pawn has moved.
    #[inline]
    pub const fn contains(&self, color: Color, id: PawnId) -> bool {
        self.masks[color as usize] & (1 << id.raw()) != 0
    }

    /// Record that the identified pawn has moved.
    #[inline]
    pub(crate) fn insert(&mut self, color: Color, id: PawnId) {
        self.masks[color.index()] |= 1 << id.raw();
    }

    /// Iterate the recorded identities of one color, in increasing order.
    pub fn ids(&self, color: Color) -> impl Iterator<Item = PawnId> + '_ {
        let mask = self.masks[color.index()];
        PawnId::ALL
            .into_iter()
            .filter(move |id| mask & (1 << id.raw()) != 0)
    }
}

impl fmt::Debug for MovedPawns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MovedPawns(w:{:08b} b:{:08b})",
            self.masks[0], self.masks[1]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::MovedPawns;
    use crate::color::Color;
    use crate::piece::PawnId;

    #[test]
    fn insert_and_query_are_per_color() {
        let mut moved = MovedPawns::new();
        let id = PawnId::new(4).unwrap();
        assert!(!moved.contains(Color::White, id));
        moved.insert(Color::White, id);
        assert!(moved.contains(Color::White, id));
        assert!(!moved.contains(Color::Black, id));
    }

    #[test]
    fn ids_iterate_in_order() {
        let mut moved = MovedPawns::new();
        moved.insert(Color::Black, PawnId::new(6).unwrap());
        moved.insert(Color::Black, PawnId::new(1).unwrap());
        let ids: Vec<u8> = moved.ids(Color::Black).map(|id| id.raw()).collect();
        assert_eq!(ids, vec![1, 6]);
        assert_eq!(moved.ids(Color::White).count(), 0);
    }
}
