use criterion::{black_box, criterion_group, criterion_main, Criterion};
use deck_evolver::card::CardCatalog;
use deck_evolver::config::DifferentialConfig;
use deck_evolver::deck::{load_seed_decks, Repairer};
use deck_evolver::evolution::{DifferentialEvolution, EvolutionStrategy};
use deck_evolver::fitness::{FitnessEvaluator, FitnessRules};
use deck_evolver::rng::DeckRng;
use std::sync::Arc;

fn load() -> (Arc<CardCatalog>, Repairer, Arc<FitnessEvaluator>) {
    let catalog = Arc::new(CardCatalog::from_file("data/cards.json").expect("Failed to load cards"));
    let repairer = Repairer::new(catalog.clone(), 40).expect("capacity");
    let evaluator = Arc::new(FitnessEvaluator::new(catalog.clone(), FitnessRules::default(), 40));
    (catalog, repairer, evaluator)
}

fn benchmark_score(c: &mut Criterion) {
    let (_, _, evaluator) = load();
    let seeds = load_seed_decks("data/seed_decks.json").expect("Failed to load seeds");
    let mut rng = DeckRng::new(Some(12345));

    c.bench_function("score_seed_deck", |b| {
        b.iter(|| evaluator.score(black_box(&seeds[0]), &mut rng))
    });

    c.bench_function("deterministic_half", |b| {
        b.iter(|| evaluator.deterministic(black_box(&seeds[0])))
    });
}

fn benchmark_repair(c: &mut Criterion) {
    let (_, repairer, _) = load();
    let seeds = load_seed_decks("data/seed_decks.json").expect("Failed to load seeds");
    let mut rng = DeckRng::new(Some(12345));

    c.bench_function("repair_invalid_seed", |b| {
        b.iter(|| repairer.repair(black_box(&seeds[1]), &mut rng))
    });

    c.bench_function("random_deck", |b| b.iter(|| repairer.random_deck(&mut rng)));
}

fn benchmark_generation(c: &mut Criterion) {
    let (_, repairer, evaluator) = load();
    let mut rng = DeckRng::new(Some(12345));
    let population: Vec<_> = (0..16).map(|_| repairer.random_deck(&mut rng)).collect();
    let mut engine =
        DifferentialEvolution::new(DifferentialConfig::default(), repairer, evaluator).expect("valid config");

    c.bench_function("differential_generation_16", |b| {
        b.iter(|| engine.advance(black_box(population.clone()), &mut rng))
    });
}

criterion_group!(benches, benchmark_score, benchmark_repair, benchmark_generation);
criterion_main!(benches);
