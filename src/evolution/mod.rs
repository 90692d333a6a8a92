//! Population search strategies.
//!
//! Both strategies advance a fully materialized population by one generation.
//! Per-deck work runs on rayon with random streams forked from the caller's
//! generator in index order, so a seeded run does not depend on scheduling.

pub mod differential;
pub mod genetic;

pub use differential::DifferentialEvolution;
pub use genetic::GeneticAlgorithm;

use crate::card::CatalogError;
use crate::config::{SearchConfig, StrategyKind};
use crate::deck::{Deck, Repairer};
use crate::fitness::FitnessEvaluator;
use crate::rng::DeckRng;
use rayon::prelude::*;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("Population of {size} is too small, need at least {min}")]
    PopulationTooSmall { size: usize, min: usize },
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error(
        "Only {found} of {required} initial decks reached fitness {threshold:.2} after {attempts} random candidates"
    )]
    InitialPopulation {
        found: usize,
        required: usize,
        attempts: usize,
        threshold: f64,
    },
}

/// Fitness summary of one generation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationStats {
    pub generation: usize,
    pub best: f64,
    pub average: f64,
}

impl GenerationStats {
    pub fn from_scores(generation: usize, scores: &[f64]) -> Self {
        let best = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let average = if scores.is_empty() {
            f64::NEG_INFINITY
        } else {
            scores.iter().sum::<f64>() / scores.len() as f64
        };
        GenerationStats {
            generation,
            best,
            average,
        }
    }
}

/// Result of advancing one generation
#[derive(Debug, Clone)]
pub struct Generation {
    pub population: Vec<Deck>,
    /// Fresh evaluation of `population`, index-aligned
    pub scores: Vec<f64>,
    pub stats: GenerationStats,
}

pub trait EvolutionStrategy: Send {
    fn name(&self) -> &'static str;

    /// Generations advanced so far
    fn generation(&self) -> usize;

    /// Produce the next population from the current one
    fn advance(&mut self, population: Vec<Deck>, rng: &mut DeckRng) -> Result<Generation, SearchError>;
}

/// Build the strategy selected by `config`
pub fn build_strategy(
    config: &SearchConfig,
    repairer: Repairer,
    evaluator: Arc<FitnessEvaluator>,
) -> Result<Box<dyn EvolutionStrategy>, SearchError> {
    Ok(match config.strategy {
        StrategyKind::Differential => Box::new(DifferentialEvolution::new(
            config.differential.clone(),
            repairer,
            evaluator,
        )?),
        StrategyKind::Genetic => Box::new(GeneticAlgorithm::new(
            config.genetic.clone(),
            repairer,
            evaluator,
        )?),
    })
}

/// Score every deck in parallel, one forked stream per deck
pub fn evaluate_population(evaluator: &FitnessEvaluator, population: &[Deck], rng: &mut DeckRng) -> Vec<f64> {
    let streams = rng.fork_many(population.len());
    population
        .par_iter()
        .zip(streams.into_par_iter())
        .map(|(deck, mut stream)| evaluator.score(deck, &mut stream))
        .collect()
}

/// `count` distinct indices from `0..len`, never `exclude`
pub(crate) fn pick_others(len: usize, exclude: usize, count: usize, rng: &mut DeckRng) -> Vec<usize> {
    rng.sample_indices(len - 1, count)
        .into_iter()
        .map(|j| if j >= exclude { j + 1 } else { j })
        .collect()
}
