//! Feasibility enforcement shared by every search operator.

use crate::card::{CardCatalog, CardId, CatalogError};
use crate::deck::Deck;
use crate::rng::DeckRng;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Turns arbitrary count mappings into legal decks of a fixed size.
///
/// Construction checks that the catalog can supply a full deck, which makes
/// `repair` total afterwards.
#[derive(Debug, Clone)]
pub struct Repairer {
    catalog: Arc<CardCatalog>,
    deck_size: usize,
}

impl Repairer {
    pub fn new(catalog: Arc<CardCatalog>, deck_size: usize) -> Result<Self, CatalogError> {
        catalog.ensure_capacity(deck_size)?;
        Ok(Repairer { catalog, deck_size })
    }

    pub fn catalog(&self) -> &Arc<CardCatalog> {
        &self.catalog
    }

    pub fn deck_size(&self) -> usize {
        self.deck_size
    }

    /// Uniformly random catalog passcode (banned cards included; repair drops them)
    pub fn random_id(&self, rng: &mut DeckRng) -> CardId {
        let ids = self.catalog.ids();
        ids[rng.random_range(ids.len())]
    }

    /// Restore feasibility:
    /// 1. every copy of an unknown card becomes a random catalog card,
    /// 2. counts are clipped to their copy limits,
    /// 3. surplus copies are dropped by simple random sample, missing copies
    ///    are drawn at random from cards that still have room,
    /// 4. slots are aggregated back into counts.
    pub fn repair(&self, raw: &Deck, rng: &mut DeckRng) -> Deck {
        let mut counts: BTreeMap<CardId, u32> = BTreeMap::new();

        for (id, count) in raw.iter() {
            if self.catalog.contains(id) {
                let limit = self.catalog.limit(id);
                let entry = counts.entry(id).or_insert(0);
                *entry = entry.saturating_add(count).min(limit);
            } else {
                for _ in 0..count {
                    let replacement = self.random_id(rng);
                    let limit = self.catalog.limit(replacement);
                    let entry = counts.entry(replacement).or_insert(0);
                    *entry = (*entry + 1).min(limit);
                }
            }
        }

        let mut slots = Deck::from_counts(counts).slots();
        if slots.len() > self.deck_size {
            slots = rng
                .sample_indices(slots.len(), self.deck_size)
                .into_iter()
                .map(|i| slots[i])
                .collect();
        }
        self.pad(&mut slots, rng);

        Deck::from_slots(&slots)
    }

    /// Aggregate operator output and repair it
    pub fn fit_slots(&self, slots: &[CardId], rng: &mut DeckRng) -> Deck {
        self.repair(&Deck::from_slots(slots), rng)
    }

    /// A deck drawn without replacement from the pool holding every card
    /// `limit` times
    pub fn random_deck(&self, rng: &mut DeckRng) -> Deck {
        let mut pool = Vec::with_capacity(self.catalog.capacity());
        for &id in self.catalog.ids() {
            for _ in 0..self.catalog.limit(id) {
                pool.push(id);
            }
        }

        let chosen: Vec<CardId> = rng
            .sample_indices(pool.len(), self.deck_size)
            .into_iter()
            .map(|i| pool[i])
            .collect();
        Deck::from_slots(&chosen)
    }

    /// Add random legal copies until the deck is full.
    /// Drawing among cards with room left is the same distribution as
    /// rejection sampling over the whole catalog, and always terminates.
    fn pad(&self, slots: &mut Vec<CardId>, rng: &mut DeckRng) {
        let mut counts: BTreeMap<CardId, u32> = BTreeMap::new();
        for &id in slots.iter() {
            *counts.entry(id).or_insert(0) += 1;
        }

        while slots.len() < self.deck_size {
            let open: Vec<CardId> = self
                .catalog
                .ids()
                .iter()
                .copied()
                .filter(|&id| counts.get(&id).copied().unwrap_or(0) < self.catalog.limit(id))
                .collect();

            let Some(&id) = rng.choose(&open) else {
                debug_assert!(false, "capacity was checked at construction");
                break;
            };
            slots.push(id);
            *counts.entry(id).or_insert(0) += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::fixtures::{blue_eyes_catalog, mixed_catalog, uniform_catalog};
    use crate::card::BanlistStatus;

    fn assert_feasible(deck: &Deck, catalog: &CardCatalog) {
        assert_eq!(deck.total(), 40, "Deck should have exactly 40 cards");
        for (id, count) in deck.iter() {
            assert!(catalog.contains(id), "Unknown card {} survived repair", id);
            assert!(count >= 1, "Card {} has a zero entry", id);
            assert!(count <= catalog.limit(id), "Card {} over its limit", id);
        }
    }

    #[test]
    fn test_repair_always_feasible() {
        let catalog = mixed_catalog();
        let repairer = Repairer::new(catalog.clone(), 40).expect("capacity");
        let mut rng = DeckRng::new(Some(2024));

        for _ in 0..300 {
            // Random junk: unknown ids, banned card, counts far over limits
            let mut raw = Deck::new();
            for _ in 0..rng.random_range(12) {
                let id = rng.random_range(60) as CardId;
                raw.set(id, rng.random_range(15) as u32);
            }
            let repaired = repairer.repair(&raw, &mut rng);
            assert_feasible(&repaired, &catalog);
            assert!(repaired.is_feasible(&catalog, 40));
        }
    }

    #[test]
    fn test_repair_keeps_feasible_deck() {
        let catalog = mixed_catalog();
        let repairer = Repairer::new(catalog, 40).expect("capacity");
        let mut rng = DeckRng::new(Some(3));

        let deck: Deck = (1..=13).map(|id| (id, 3)).chain([(21, 1)]).collect();
        assert_eq!(repairer.repair(&deck, &mut rng), deck, "Legal decks pass through untouched");
    }

    #[test]
    fn test_distinct_singletons_use_every_card() {
        let catalog = uniform_catalog(40, BanlistStatus::Limited);
        let repairer = Repairer::new(catalog.clone(), 40).expect("capacity");
        let mut rng = DeckRng::new(Some(11));

        let inputs: Vec<Deck> = vec![
            Deck::new(),
            [(1, 40)].into_iter().collect(),
            [(500, 12), (2, 3)].into_iter().collect(),
            (1..=40).map(|id| (id, 2)).collect(),
        ];
        for raw in inputs {
            let repaired = repairer.repair(&raw, &mut rng);
            assert_eq!(repaired.iter().count(), 40);
            assert!(repaired.iter().all(|(_, count)| count == 1));
            assert!(repaired.is_feasible(&catalog, 40));
        }
    }

    #[test]
    fn test_single_card_at_limit_is_padded() {
        let catalog = mixed_catalog();
        let repairer = Repairer::new(catalog.clone(), 40).expect("capacity");
        let mut rng = DeckRng::new(Some(8));

        let raw: Deck = [(5, 3)].into_iter().collect();
        let repaired = repairer.repair(&raw, &mut rng);
        assert_feasible(&repaired, &catalog);
        assert_eq!(repaired.count(5), 3, "Existing copies are kept");
        assert!(repaired.iter().count() > 1, "Padding uses other cards");
    }

    #[test]
    fn test_oversized_deck_is_sampled_down() {
        let catalog = mixed_catalog();
        let repairer = Repairer::new(catalog.clone(), 40).expect("capacity");
        let mut rng = DeckRng::new(Some(21));

        let raw: Deck = (1..=30).map(|id| (id, 3)).collect();
        let repaired = repairer.repair(&raw, &mut rng);
        assert_feasible(&repaired, &catalog);
        assert!(repaired.ids().all(|id| id <= 30), "Downsampling only removes copies");
    }

    #[test]
    fn test_unknown_cards_are_replaced() {
        let catalog = blue_eyes_catalog();
        let repairer = Repairer::new(catalog.clone(), 40).expect("capacity");
        let mut rng = DeckRng::new(Some(5));

        let raw: Deck = [(1, 20), (2, 20)].into_iter().collect();
        let repaired = repairer.repair(&raw, &mut rng);
        assert_feasible(&repaired, &catalog);
        assert_eq!(repaired.count(23434538), 0, "Forbidden cards never appear");
    }

    #[test]
    fn test_random_deck_feasible() {
        let catalog = blue_eyes_catalog();
        let repairer = Repairer::new(catalog.clone(), 40).expect("capacity");
        let mut rng = DeckRng::new(Some(77));
        for _ in 0..100 {
            assert_feasible(&repairer.random_deck(&mut rng), &catalog);
        }
    }

    #[test]
    fn test_repair_is_reproducible() {
        let repairer = Repairer::new(mixed_catalog(), 40).expect("capacity");
        let raw: Deck = [(1, 9), (999, 7)].into_iter().collect();

        let a = repairer.repair(&raw, &mut DeckRng::new(Some(1234)));
        let b = repairer.repair(&raw, &mut DeckRng::new(Some(1234)));
        assert_eq!(a, b, "Same seed should produce the same repair");
    }

    #[test]
    fn test_small_catalog_rejected() {
        let catalog = uniform_catalog(10, BanlistStatus::Unlimited);
        assert!(matches!(
            Repairer::new(catalog, 40),
            Err(CatalogError::InsufficientCapacity { capacity: 30, deck_size: 40 })
        ));
    }
}
