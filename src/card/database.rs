use crate::card::types::{Card, CardCategory, CardId};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Catalog is empty")]
    Empty,
    #[error("Catalog can supply at most {capacity} legal copies, need {deck_size}")]
    InsufficientCapacity { capacity: usize, deck_size: usize },
}

/// Read-only card catalog keyed by passcode
#[derive(Debug)]
pub struct CardCatalog {
    cards: HashMap<CardId, Card>,
    ids: Vec<CardId>,
}

impl CardCatalog {
    /// Load a cleaned catalog snapshot (JSON array of cards)
    pub fn from_file(path: &str) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        let cards: Vec<Card> = serde_json::from_str(&content)?;
        Self::from_cards(cards)
    }

    /// Build a catalog from already loaded cards. Later duplicates win.
    pub fn from_cards(cards: Vec<Card>) -> Result<Self, CatalogError> {
        let mut by_id = HashMap::new();
        for card in cards {
            by_id.insert(card.id, card);
        }

        let mut ids: Vec<CardId> = by_id.keys().copied().collect();
        ids.sort_unstable();

        let catalog = CardCatalog { cards: by_id, ids };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn lookup(&self, id: CardId) -> Option<&Card> {
        self.cards.get(&id)
    }

    pub fn contains(&self, id: CardId) -> bool {
        self.cards.contains_key(&id)
    }

    /// Copy limit, 0 for unknown cards
    pub fn limit(&self, id: CardId) -> u32 {
        self.lookup(id).map(Card::copy_limit).unwrap_or(0)
    }

    pub fn category(&self, id: CardId) -> Option<CardCategory> {
        self.lookup(id).map(Card::category)
    }

    /// All passcodes in ascending order
    pub fn ids(&self) -> &[CardId] {
        &self.ids
    }

    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    /// Total number of legal copies across the whole pool
    pub fn capacity(&self) -> usize {
        self.cards.values().map(|c| c.copy_limit() as usize).sum()
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.cards.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(())
    }

    /// Check that a legal deck of `deck_size` cards can be built at all
    pub fn ensure_capacity(&self, deck_size: usize) -> Result<(), CatalogError> {
        self.validate()?;
        let capacity = self.capacity();
        if capacity < deck_size {
            return Err(CatalogError::InsufficientCapacity { capacity, deck_size });
        }
        Ok(())
    }
}
