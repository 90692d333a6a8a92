//! Elitist genetic algorithm over 40-slot card lists.

use crate::card::CardId;
use crate::config::GeneticConfig;
use crate::deck::{Deck, Repairer};
use crate::evolution::{evaluate_population, EvolutionStrategy, Generation, GenerationStats, SearchError};
use crate::fitness::FitnessEvaluator;
use crate::rng::DeckRng;
use rayon::prelude::*;
use std::sync::Arc;

pub struct GeneticAlgorithm {
    config: GeneticConfig,
    repairer: Repairer,
    evaluator: Arc<FitnessEvaluator>,
    generation: usize,
}

impl GeneticAlgorithm {
    pub fn new(config: GeneticConfig, repairer: Repairer, evaluator: Arc<FitnessEvaluator>) -> Result<Self, SearchError> {
        config.validate().map_err(SearchError::InvalidParameter)?;
        if repairer.deck_size() != evaluator.deck_size() {
            return Err(SearchError::InvalidParameter(format!(
                "repairer builds {}-card decks but the evaluator scores {}-card decks",
                repairer.deck_size(),
                evaluator.deck_size()
            )));
        }
        Ok(GeneticAlgorithm {
            config,
            repairer,
            evaluator,
            generation: 0,
        })
    }

    /// Index of the fittest among `tournament_size` distinct random entrants
    pub fn tournament(&self, scores: &[f64], rng: &mut DeckRng) -> usize {
        rng.sample_indices(scores.len(), self.config.tournament_size)
            .into_iter()
            .max_by(|&a, &b| scores[a].total_cmp(&scores[b]))
            .unwrap_or(0)
    }

    /// Each slot takes the first parent's card on a coin flip and the second
    /// parent's otherwise. Positions the second parent cannot fill draw from
    /// both parents' combined cards.
    pub fn crossover(&self, first: &Deck, second: &Deck, rng: &mut DeckRng) -> Vec<CardId> {
        let a = first.slots();
        let b = second.slots();
        let combined: Vec<CardId> = a.iter().chain(b.iter()).copied().collect();

        (0..self.repairer.deck_size())
            .map(|i| {
                let take_first = rng.random() < 0.5;
                match (a.get(i), b.get(i)) {
                    (Some(&x), _) if take_first => x,
                    (_, Some(&y)) => y,
                    _ => match rng.choose(&combined) {
                        Some(&id) => id,
                        None => self.repairer.random_id(rng),
                    },
                }
            })
            .collect()
    }

    /// Replace each slot with a random catalog card at the mutation rate
    pub fn mutate(&self, slots: &mut [CardId], rng: &mut DeckRng) {
        for slot in slots.iter_mut() {
            if rng.random_bool(self.config.mutation_rate) {
                *slot = self.repairer.random_id(rng);
            }
        }
    }

    fn breed(&self, population: &[Deck], scores: &[f64], rng: &mut DeckRng) -> Deck {
        let first = self.tournament(scores, rng);
        let second = self.tournament(scores, rng);
        let mut child = self.crossover(&population[first], &population[second], rng);
        self.mutate(&mut child, rng);
        self.repairer.fit_slots(&child, rng)
    }
}

impl EvolutionStrategy for GeneticAlgorithm {
    fn name(&self) -> &'static str {
        "genetic algorithm"
    }

    fn generation(&self) -> usize {
        self.generation
    }

    fn advance(&mut self, population: Vec<Deck>, rng: &mut DeckRng) -> Result<Generation, SearchError> {
        let n = population.len();
        if n == 0 {
            return Err(SearchError::PopulationTooSmall { size: 0, min: 1 });
        }
        self.generation += 1;
        let generation = self.generation;
        let this = &*self;

        let scores = evaluate_population(&this.evaluator, &population, rng);

        let mut ranked: Vec<usize> = (0..n).collect();
        ranked.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
        let elite = this.config.elite.min(n);
        let mut next: Vec<Deck> = ranked[..elite].iter().map(|&i| population[i].clone()).collect();

        let streams = rng.fork_many(n - elite);
        let children: Vec<Deck> = streams
            .into_par_iter()
            .map(|mut stream| this.breed(&population, &scores, &mut stream))
            .collect();
        next.extend(children);

        let scores = evaluate_population(&this.evaluator, &next, rng);
        let stats = GenerationStats::from_scores(generation, &scores);
        Ok(Generation {
            population: next,
            scores,
            stats,
        })
    }
}
