//! Transposition table
//!
//! A direct-mapped cache of search results keyed by the position hash. The
//! entry count is a power of two sized from a byte budget, so indexing is a
//! single mask. Replacement weighs search depth, bound quality and entry
//! age; a generation counter bumped at every top-level search lets stale
//! analysis decay without wiping the table.

use crate::board::Pos;

/// How a stored score relates to the true value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// The search completed inside the window.
    Exact,
    /// Fail-high: true score >= stored score.
    Lower,
    /// Fail-low: true score <= stored score.
    Upper,
}

impl Bound {
    /// Replacement weight: exact entries are worth more than bounds.
    #[inline]
    fn weight(self) -> i32 {
        match self {
            Bound::Exact => 3,
            Bound::Lower | Bound::Upper => 2,
        }
    }
}

/// One table slot. A zero key marks an empty slot.
#[derive(Debug, Clone, Copy)]
pub struct TtEntry {
    pub key: u64,
    pub score: i32,
    pub depth: i8,
    pub best_move: Option<Pos>,
    pub bound: Bound,
    pub generation: u32,
}

impl TtEntry {
    const EMPTY: TtEntry = TtEntry {
        key: 0,
        score: 0,
        depth: 0,
        best_move: None,
        bound: Bound::Exact,
        generation: 0,
    };

    #[inline]
    fn importance(&self) -> i32 {
        i32::from(self.depth) * self.bound.weight()
    }
}

/// Table usage statistics.
#[derive(Debug, Clone, Copy)]
pub struct TtStats {
    pub entries: usize,
    pub used: usize,
    pub fill_rate: f64,
}

/// Direct-mapped transposition table.
pub struct TranspositionTable {
    slots: Vec<TtEntry>,
    mask: usize,
    generation: u32,
}

/// Default byte budget: 64 MiB.
pub const DEFAULT_TT_BYTES: usize = 64 * 1024 * 1024;

impl TranspositionTable {
    /// Build a table from a byte budget, rounded down to a power of two of
    /// entries (at least 1024).
    #[must_use]
    pub fn new(bytes: usize) -> Self {
        let per_entry = std::mem::size_of::<TtEntry>();
        let wanted = (bytes / per_entry).max(1024);
        let entries = if wanted.is_power_of_two() {
            wanted
        } else {
            wanted.next_power_of_two() / 2
        };

        Self {
            slots: vec![TtEntry::EMPTY; entries],
            mask: entries - 1,
            generation: 1,
        }
    }

    /// Start a new top-level search: older entries age by one step.
    pub fn new_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Look up a key. A hit refreshes the slot's generation.
    #[must_use]
    pub fn probe(&mut self, key: u64) -> Option<TtEntry> {
        let slot = &mut self.slots[(key as usize) & self.mask];
        if slot.key != key || slot.key == 0 {
            return None;
        }
        slot.generation = self.generation;
        Some(*slot)
    }

    /// Store a search result.
    ///
    /// - empty slot: always write;
    /// - same position: write iff the new search is at least as deep;
    /// - collision: compare `depth * bound_weight`, aging the incumbent by
    ///   10 per generation; ties go to exact bounds.
    pub fn store(&mut self, key: u64, score: i32, depth: i8, best_move: Option<Pos>, bound: Bound) {
        let generation = self.generation;
        let slot = &mut self.slots[(key as usize) & self.mask];

        let entry = TtEntry {
            key,
            score,
            depth,
            best_move,
            bound,
            generation,
        };

        let replace = if slot.key == 0 {
            true
        } else if slot.key == key {
            depth >= slot.depth
        } else {
            let age = generation.saturating_sub(slot.generation) as i32;
            let incumbent = slot.importance() - 10 * age;
            let challenger = entry.importance();
            challenger > incumbent || (challenger == incumbent && bound == Bound::Exact)
        };

        if replace {
            *slot = entry;
        }
    }

    /// Best move stored for a key, for move ordering. Usable even when the
    /// stored depth is too shallow for a score cutoff.
    #[must_use]
    pub fn best_move(&self, key: u64) -> Option<Pos> {
        let slot = &self.slots[(key as usize) & self.mask];
        if slot.key == key && slot.key != 0 {
            slot.best_move
        } else {
            None
        }
    }

    /// Drop everything and restart the generation clock.
    pub fn clear(&mut self) {
        self.slots.fill(TtEntry::EMPTY);
        self.generation = 1;
    }

    #[must_use]
    pub fn stats(&self) -> TtStats {
        let used = self.slots.iter().filter(|e| e.key != 0).count();
        TtStats {
            entries: self.slots.len(),
            used,
            fill_rate: used as f64 / self.slots.len() as f64,
        }
    }
}
