//! Deck scoring.
//!
//! The evaluator runs a validity gate and then two independent halves:
//! [`DeterministicScore`] (threshold rules and exact hypergeometric terms) and
//! [`StochasticScore`] (Monte Carlo hand estimates). Only the second half
//! touches the random source, so tests can pin it down separately.

pub mod deterministic;
pub mod rules;
pub mod stochastic;

pub use deterministic::{binomial, combo_probability, search_probability, DeterministicScore};
pub use rules::FitnessRules;
pub use stochastic::{estimate_hand_rate, StochasticScore};

use crate::card::CardCatalog;
use crate::deck::Deck;
use crate::rng::DeckRng;
use std::sync::Arc;

/// Both halves of a feasible deck's score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    pub deterministic: DeterministicScore,
    pub stochastic: StochasticScore,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.deterministic.total() + self.stochastic.total()
    }
}

/// Scores decks against a rule table. Shared read-only across threads.
#[derive(Debug, Clone)]
pub struct FitnessEvaluator {
    catalog: Arc<CardCatalog>,
    rules: FitnessRules,
    deck_size: usize,
}

impl FitnessEvaluator {
    pub fn new(catalog: Arc<CardCatalog>, rules: FitnessRules, deck_size: usize) -> Self {
        FitnessEvaluator {
            catalog,
            rules,
            deck_size,
        }
    }

    pub fn deck_size(&self) -> usize {
        self.deck_size
    }

    pub fn is_valid(&self, deck: &Deck) -> bool {
        deck.is_feasible(&self.catalog, self.deck_size)
    }

    /// Rule-by-rule score, None for infeasible decks
    pub fn breakdown(&self, deck: &Deck, rng: &mut DeckRng) -> Option<ScoreBreakdown> {
        if !self.is_valid(deck) {
            return None;
        }
        Some(ScoreBreakdown {
            deterministic: self.deterministic(deck),
            stochastic: StochasticScore::compute(deck, &self.rules, rng),
        })
    }

    /// Deterministic half only; callers must have checked validity
    pub fn deterministic(&self, deck: &Deck) -> DeterministicScore {
        DeterministicScore::compute(deck, &self.catalog, &self.rules, self.deck_size)
    }

    /// Fitness scalar; negative infinity for infeasible decks.
    /// Monte Carlo terms make repeated calls on one deck differ slightly.
    pub fn score(&self, deck: &Deck, rng: &mut DeckRng) -> f64 {
        self.breakdown(deck, rng)
            .map(|b| b.total())
            .unwrap_or(f64::NEG_INFINITY)
    }
}
