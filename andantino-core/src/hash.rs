//! Position hash: one bit per (player, cell)

use std::hash::{Hash, Hasher};

use crate::board::CELL_COUNT;
use crate::game::Player;

/// 64-bit words needed per player
const WORDS_PER_PLAYER: usize = (CELL_COUNT + 63) / 64;

/// Stone placement as a bit set
///
/// Equality compares every word. The [`Hash`] impl only feeds an XOR-fold of
/// the words, so colliding folds are told apart by `Eq` in hashed tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct StateHash {
    words: [u64; 2 * WORDS_PER_PLAYER],
}

impl StateHash {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn locate(player: Player, index: usize) -> (usize, u64) {
        debug_assert!(index < CELL_COUNT);
        let word = player as usize * WORDS_PER_PLAYER + index / 64;
        (word, 1u64 << (index % 64))
    }

    #[inline]
    pub fn set(&mut self, player: Player, index: usize) {
        let (word, bit) = Self::locate(player, index);
        self.words[word] |= bit;
    }

    #[inline]
    pub fn unset(&mut self, player: Player, index: usize) {
        let (word, bit) = Self::locate(player, index);
        self.words[word] &= !bit;
    }

    #[inline]
    pub fn get(&self, player: Player, index: usize) -> bool {
        let (word, bit) = Self::locate(player, index);
        self.words[word] & bit != 0
    }

    /// Cheap bucket key
    #[inline]
    pub fn fold(&self) -> u64 {
        self.words
            .iter()
            .enumerate()
            .fold(0, |acc, (i, &w)| acc ^ w.rotate_left(i as u32 * 7))
    }
}

impl Hash for StateHash {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.fold());
    }
}
