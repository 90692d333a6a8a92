pub mod repair;
pub mod seeds;

pub use repair::Repairer;
pub use seeds::{load_seed_decks, DeckError};

use crate::card::{CardCatalog, CardCategory, CardId};
use std::collections::BTreeMap;

/// Standard main deck size
pub const DECK_SIZE: usize = 40;

/// Card passcode to copy count.
///
/// A `Deck` may hold an infeasible mapping (raw seed data, operator output
/// before repair); `is_feasible` decides whether it can be scored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deck {
    counts: BTreeMap<CardId, u32>,
}

impl Deck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a raw mapping as-is, zero counts included
    pub fn from_counts(counts: BTreeMap<CardId, u32>) -> Self {
        Deck { counts }
    }

    /// Aggregate one-copy slots back into counts
    pub fn from_slots(slots: &[CardId]) -> Self {
        let mut counts = BTreeMap::new();
        for &id in slots {
            *counts.entry(id).or_insert(0) += 1;
        }
        Deck { counts }
    }

    /// One entry per physical copy, in ascending passcode order
    pub fn slots(&self) -> Vec<CardId> {
        let mut slots = Vec::with_capacity(self.total());
        for (&id, &count) in &self.counts {
            for _ in 0..count {
                slots.push(id);
            }
        }
        slots
    }

    pub fn count(&self, id: CardId) -> u32 {
        self.counts.get(&id).copied().unwrap_or(0)
    }

    pub fn contains(&self, id: CardId) -> bool {
        self.count(id) > 0
    }

    pub fn set(&mut self, id: CardId, count: u32) {
        self.counts.insert(id, count);
    }

    pub fn iter(&self) -> impl Iterator<Item = (CardId, u32)> + '_ {
        self.counts.iter().map(|(&id, &count)| (id, count))
    }

    pub fn ids(&self) -> impl Iterator<Item = CardId> + '_ {
        self.counts.keys().copied()
    }

    /// Total number of copies
    pub fn total(&self) -> usize {
        self.counts.values().map(|&c| c as usize).sum()
    }

    /// Copies of any card in `ids`
    pub fn copies_of<'a>(&self, ids: impl IntoIterator<Item = &'a CardId>) -> u32 {
        ids.into_iter().map(|&id| self.count(id)).sum()
    }

    /// Copies whose catalog category satisfies `pred`; unknown cards never match
    pub fn copies_where(&self, catalog: &CardCatalog, pred: impl Fn(CardCategory) -> bool) -> u32 {
        self.iter()
            .filter(|(id, _)| catalog.category(*id).map(&pred).unwrap_or(false))
            .map(|(_, count)| count)
            .sum()
    }

    /// Size, copy-limit and membership check
    pub fn is_feasible(&self, catalog: &CardCatalog, deck_size: usize) -> bool {
        self.total() == deck_size
            && self.iter().all(|(id, count)| {
                catalog.contains(id) && count >= 1 && count <= catalog.limit(id)
            })
    }
}

impl FromIterator<(CardId, u32)> for Deck {
    fn from_iter<I: IntoIterator<Item = (CardId, u32)>>(iter: I) -> Self {
        Deck {
            counts: iter.into_iter().collect(),
        }
    }
}
