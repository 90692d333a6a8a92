//! Differential evolution over card-count vectors.
//!
//! Each target deck gets a mutant `a + F * (b - c)` from three other decks,
//! a slot-wise crossover with that mutant, and greedy one-to-one selection.
//! Low-fitness survivors can be rescued with a fresh mutant, and a random
//! deck is injected on a fixed cadence.

use crate::card::CardId;
use crate::config::DifferentialConfig;
use crate::deck::{Deck, Repairer};
use crate::evolution::{
    evaluate_population, pick_others, EvolutionStrategy, Generation, GenerationStats, SearchError,
};
use crate::fitness::FitnessEvaluator;
use crate::rng::DeckRng;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;

pub struct DifferentialEvolution {
    config: DifferentialConfig,
    repairer: Repairer,
    evaluator: Arc<FitnessEvaluator>,
    generation: usize,
}

impl DifferentialEvolution {
    pub fn new(
        config: DifferentialConfig,
        repairer: Repairer,
        evaluator: Arc<FitnessEvaluator>,
    ) -> Result<Self, SearchError> {
        config.validate().map_err(SearchError::InvalidParameter)?;
        if repairer.deck_size() != evaluator.deck_size() {
            return Err(SearchError::InvalidParameter(format!(
                "repairer builds {}-card decks but the evaluator scores {}-card decks",
                repairer.deck_size(),
                evaluator.deck_size()
            )));
        }
        Ok(DifferentialEvolution {
            config,
            repairer,
            evaluator,
            generation: 0,
        })
    }

    /// Repaired `a + F * (b - c)`, rounded and clipped per card, with an
    /// optional single random swap
    pub fn mutate(&self, a: &Deck, b: &Deck, c: &Deck, rng: &mut DeckRng) -> Deck {
        let catalog = self.repairer.catalog();
        let ids: BTreeSet<CardId> = a.ids().chain(b.ids()).chain(c.ids()).collect();

        let mut mutant = Deck::new();
        for id in ids {
            let value = a.count(id) as f64
                + self.config.scale_factor * (b.count(id) as f64 - c.count(id) as f64);
            let upper = if catalog.contains(id) {
                catalog.limit(id)
            } else {
                // Unknown ids are left for repair to replace
                a.count(id).max(b.count(id)).max(c.count(id))
            };
            let count = value.round().clamp(0.0, upper as f64) as u32;
            if count > 0 {
                mutant.set(id, count);
            }
        }

        let deck = self.repairer.repair(&mutant, rng);
        if rng.random_bool(self.config.swap_probability) {
            let mut slots = deck.slots();
            if !slots.is_empty() {
                let index = rng.random_range(slots.len());
                slots[index] = self.repairer.random_id(rng);
                return self.repairer.fit_slots(&slots, rng);
            }
        }
        deck
    }

    /// Slot-wise binomial crossover. One forced position always comes from
    /// the mutant, and one slot may be replaced by a random card afterwards.
    pub fn crossover(&self, target: &Deck, mutant: &Deck, rng: &mut DeckRng) -> Deck {
        let size = self.repairer.deck_size();
        if size == 0 {
            return Deck::new();
        }
        let target_slots = self.fill_slots(target.slots(), rng);
        let mutant_slots = self.fill_slots(mutant.slots(), rng);

        let forced = rng.random_range(size);
        let mut trial: Vec<CardId> = Vec::with_capacity(size);
        for j in 0..size {
            let from_mutant = rng.random() < self.config.crossover_rate || j == forced;
            trial.push(if from_mutant {
                mutant_slots[j]
            } else {
                target_slots[j]
            });
        }

        if rng.random_bool(self.config.exploration_probability) {
            let index = rng.random_range(size);
            trial[index] = self.repairer.random_id(rng);
        }

        self.repairer.fit_slots(&trial, rng)
    }

    /// Bring a slot list to exactly the deck size, padding by resampling its
    /// own cards. An empty list becomes a random deck.
    fn fill_slots(&self, mut slots: Vec<CardId>, rng: &mut DeckRng) -> Vec<CardId> {
        let size = self.repairer.deck_size();
        if slots.is_empty() {
            return self.repairer.random_deck(rng).slots();
        }
        slots.truncate(size);
        let original = slots.len();
        while slots.len() < size {
            let index = rng.random_range(original);
            slots.push(slots[index]);
        }
        slots
    }

    /// Replace every deck scoring below the rescue threshold with a fresh
    /// mutant of three other decks. Donors come from the population as it was
    /// before any replacement. Returns the number of decks replaced.
    pub fn rescue(&self, population: &mut [Deck], scores: &[f64], rng: &mut DeckRng) -> usize {
        let Some(threshold) = self.config.rescue_threshold else {
            return 0;
        };
        let snapshot = population.to_vec();
        let weak: Vec<usize> = (0..population.len()).filter(|&i| scores[i] < threshold).collect();
        let streams = rng.fork_many(weak.len());
        let rescued: Vec<(usize, Deck)> = weak
            .into_par_iter()
            .zip(streams.into_par_iter())
            .map(|(i, mut stream)| (i, self.donor_mutant(&snapshot, i, &mut stream)))
            .collect();
        let count = rescued.len();
        for (i, deck) in rescued {
            population[i] = deck;
        }
        count
    }

    /// On injection generations, overwrite one random deck with a random
    /// legal deck and return its index
    pub fn inject(&self, generation: usize, population: &mut [Deck], rng: &mut DeckRng) -> Option<usize> {
        let interval = self.config.injection_interval?;
        if interval == 0 || generation % interval != 0 || population.is_empty() {
            return None;
        }
        let index = rng.random_range(population.len());
        population[index] = self.repairer.random_deck(rng);
        Some(index)
    }

    fn donor_mutant(&self, population: &[Deck], target: usize, rng: &mut DeckRng) -> Deck {
        let donors = pick_others(population.len(), target, 3, rng);
        self.mutate(
            &population[donors[0]],
            &population[donors[1]],
            &population[donors[2]],
            rng,
        )
    }
}

impl EvolutionStrategy for DifferentialEvolution {
    fn name(&self) -> &'static str {
        "differential evolution"
    }

    fn generation(&self) -> usize {
        self.generation
    }

    fn advance(&mut self, population: Vec<Deck>, rng: &mut DeckRng) -> Result<Generation, SearchError> {
        let n = population.len();
        if n < DifferentialConfig::MIN_POPULATION {
            return Err(SearchError::PopulationTooSmall {
                size: n,
                min: DifferentialConfig::MIN_POPULATION,
            });
        }
        self.generation += 1;
        let generation = self.generation;
        let this = &*self;

        let scores = evaluate_population(&this.evaluator, &population, rng);

        let streams = rng.fork_many(n);
        let selected: Vec<(Deck, f64)> = streams
            .into_par_iter()
            .enumerate()
            .map(|(i, mut stream)| {
                let mutant = this.donor_mutant(&population, i, &mut stream);
                let trial = this.crossover(&population[i], &mutant, &mut stream);
                let trial_score = this.evaluator.score(&trial, &mut stream);
                // Ties keep the incumbent
                if trial_score > scores[i] {
                    (trial, trial_score)
                } else {
                    (population[i].clone(), scores[i])
                }
            })
            .collect();
        let (mut next, selection_scores): (Vec<Deck>, Vec<f64>) = selected.into_iter().unzip();

        let rescued = this.rescue(&mut next, &selection_scores, rng);
        if rescued > 0 {
            log::debug!("generation {}: rescued {} low-fitness decks", generation, rescued);
        }
        if let Some(index) = this.inject(generation, &mut next, rng) {
            log::debug!("generation {}: injected a random deck at {}", generation, index);
        }

        let scores = evaluate_population(&this.evaluator, &next, rng);
        let stats = GenerationStats::from_scores(generation, &scores);
        Ok(Generation {
            population: next,
            scores,
            stats,
        })
    }
}
