//! Catalogs shared by unit tests

use crate::card::{BanlistStatus, Card, CardCatalog};
use std::sync::Arc;

/// The Blue-Eyes snapshot under `data/`
pub fn blue_eyes_catalog() -> Arc<CardCatalog> {
    Arc::new(CardCatalog::from_file("data/cards.json").expect("Failed to load cards"))
}

/// `count` distinct monsters, ids 1..=count, all with the same banlist status
pub fn uniform_catalog(count: u32, status: BanlistStatus) -> Arc<CardCatalog> {
    let cards = (1..=count)
        .map(|id| Card::new(id, &format!("Card {}", id), "Effect Monster", status))
        .collect();
    Arc::new(CardCatalog::from_cards(cards).expect("non-empty catalog"))
}

/// Mixed pool: ids 1..=20 monsters, 21..=30 spells, 31..=35 traps, 36 forbidden
pub fn mixed_catalog() -> Arc<CardCatalog> {
    let mut cards = Vec::new();
    for id in 1..=20 {
        cards.push(Card::new(id, &format!("Monster {}", id), "Effect Monster", BanlistStatus::Unlimited));
    }
    for id in 21..=30 {
        cards.push(Card::new(id, &format!("Spell {}", id), "Spell Card", BanlistStatus::Unlimited));
    }
    for id in 31..=35 {
        cards.push(Card::new(id, &format!("Trap {}", id), "Trap Card", BanlistStatus::Limited));
    }
    cards.push(Card::new(36, "Banned", "Effect Monster", BanlistStatus::Forbidden));
    Arc::new(CardCatalog::from_cards(cards).expect("non-empty catalog"))
}

