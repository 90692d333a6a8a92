//! Runs a search end to end: seeds the initial population, advances a
//! strategy for a number of generations and reports progress.

use crate::config::InitConfig;
use crate::deck::{Deck, Repairer};
use crate::evolution::{evaluate_population, EvolutionStrategy, GenerationStats, SearchError};
use crate::fitness::FitnessEvaluator;
use crate::rng::DeckRng;

/// Receives per-generation statistics as the search advances
pub trait ProgressSink {
    fn record(&mut self, stats: &GenerationStats);
}

/// Per-generation statistics of one run
#[derive(Debug, Clone, Default)]
pub struct RunHistory {
    pub generations: Vec<GenerationStats>,
}

impl RunHistory {
    pub fn best(&self) -> Vec<f64> {
        self.generations.iter().map(|s| s.best).collect()
    }

    pub fn average(&self) -> Vec<f64> {
        self.generations.iter().map(|s| s.average).collect()
    }

    /// Running maximum of the per-generation best
    pub fn best_so_far(&self) -> Vec<f64> {
        let mut running = f64::NEG_INFINITY;
        self.generations
            .iter()
            .map(|s| {
                running = running.max(s.best);
                running
            })
            .collect()
    }
}

impl ProgressSink for RunHistory {
    fn record(&mut self, stats: &GenerationStats) {
        self.generations.push(*stats);
    }
}

/// Final population of a run and its fresh evaluation
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub population: Vec<Deck>,
    pub scores: Vec<f64>,
}

impl RunOutcome {
    /// Decks with their scores, fittest first
    pub fn ranked(&self) -> Vec<(&Deck, f64)> {
        let mut ranked: Vec<(&Deck, f64)> = self.population.iter().zip(self.scores.iter().copied()).collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    pub fn best(&self) -> Option<(&Deck, f64)> {
        self.ranked().into_iter().next()
    }
}

/// Build `size` decks: repaired seed decks first, then random decks.
/// With `init.min_fitness` set, only decks reaching it are admitted, and
/// random generation gives up after `init.max_attempts` candidates.
pub fn initial_population(
    seeds: &[Deck],
    size: usize,
    init: &InitConfig,
    repairer: &Repairer,
    evaluator: &FitnessEvaluator,
    rng: &mut DeckRng,
) -> Result<Vec<Deck>, SearchError> {
    let admits = |score: f64| init.min_fitness.map_or(true, |min| score >= min);
    let mut population = Vec::with_capacity(size);

    for (index, seed) in seeds.iter().enumerate() {
        if population.len() >= size {
            break;
        }
        let deck = repairer.repair(seed, rng);
        let score = evaluator.score(&deck, rng);
        if admits(score) {
            log::debug!("seed deck {} admitted with fitness {:.2}", index, score);
            population.push(deck);
        } else {
            log::warn!("seed deck {} rejected: fitness {:.2} below threshold", index, score);
        }
    }

    let from_seeds = population.len();
    let mut attempts = 0;
    while population.len() < size {
        if attempts >= init.max_attempts {
            return Err(SearchError::InitialPopulation {
                found: population.len(),
                required: size,
                attempts,
                threshold: init.min_fitness.unwrap_or(f64::NEG_INFINITY),
            });
        }
        attempts += 1;
        let deck = repairer.random_deck(rng);
        if admits(evaluator.score(&deck, rng)) {
            population.push(deck);
        }
    }

    log::info!(
        "initial population: {} from seeds, {} random ({} candidates tried)",
        from_seeds,
        population.len() - from_seeds,
        attempts
    );
    Ok(population)
}

/// Advance `strategy` for `generations` generations, reporting each one
pub fn run(
    strategy: &mut dyn EvolutionStrategy,
    evaluator: &FitnessEvaluator,
    population: Vec<Deck>,
    generations: usize,
    sink: &mut dyn ProgressSink,
    rng: &mut DeckRng,
) -> Result<RunOutcome, SearchError> {
    log::info!(
        "running {} for {} generations on {} decks",
        strategy.name(),
        generations,
        population.len()
    );

    let report_every = (generations / 10).max(1);
    let mut population = population;
    for _ in 0..generations {
        let generation = strategy.advance(population, rng)?;
        let stats = generation.stats;
        if stats.generation <= 5 || stats.generation % report_every == 0 {
            log::info!(
                "generation {}: best {:.2}, average {:.2}",
                stats.generation,
                stats.best,
                stats.average
            );
        } else {
            log::debug!(
                "generation {}: best {:.2}, average {:.2}",
                stats.generation,
                stats.best,
                stats.average
            );
        }
        sink.record(&stats);
        population = generation.population;
    }

    let scores = evaluate_population(evaluator, &population, rng);
    Ok(RunOutcome { population, scores })
}

/// The fittest deck of a population under a fresh evaluation
pub fn best_deck(population: &[Deck], evaluator: &FitnessEvaluator, rng: &mut DeckRng) -> Option<(Deck, f64)> {
    let scores = evaluate_population(evaluator, population, rng);
    population
        .iter()
        .zip(scores)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(deck, score)| (deck.clone(), score))
}
