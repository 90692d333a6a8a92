use clap::{Parser, Subcommand};
use deck_evolver::card::CardCatalog;
use deck_evolver::config::{SearchConfig, StrategyKind};
use deck_evolver::deck::{load_seed_decks, Deck, Repairer};
use deck_evolver::driver::{initial_population, run, ProgressSink, RunHistory};
use deck_evolver::evolution::{build_strategy, GenerationStats};
use deck_evolver::fitness::FitnessEvaluator;
use deck_evolver::report::{format_deck, write_results};
use deck_evolver::rng::DeckRng;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "deck-evolver")]
#[command(about = "Evolutionary Yu-Gi-Oh! main deck optimizer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Card catalog snapshot (JSON)
    #[arg(long, default_value = "data/cards.json", global = true)]
    cards: String,

    /// Seed decks (JSON array of {"<passcode>": count} objects)
    #[arg(long, default_value = "data/seed_decks.json", global = true)]
    seeds: String,

    /// Search configuration file; built-in defaults when omitted
    #[arg(long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Evolve a population of decks
    Evolve {
        /// Search strategy (overrides the configuration)
        #[arg(long, value_enum)]
        strategy: Option<StrategyKind>,

        /// Number of generations (overrides the configuration)
        #[arg(short, long)]
        generations: Option<usize>,

        /// Seed for reproducibility
        #[arg(short, long)]
        seed: Option<u64>,

        /// Results file
        #[arg(short, long)]
        output: Option<String>,

        /// Hide the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Score the seed decks rule by rule
    Score {
        /// Seed for the sampled hand estimates
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Print the default configuration as JSON
    Config,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if let Commands::Config = cli.command {
        match serde_json::to_string_pretty(&SearchConfig::default()) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("✗ Failed to serialize configuration: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let config = load_config(cli.config.as_deref());

    let catalog = match CardCatalog::from_file(&cli.cards) {
        Ok(catalog) => {
            eprintln!("✓ Loaded {} cards from {}", catalog.card_count(), cli.cards);
            Arc::new(catalog)
        }
        Err(e) => {
            eprintln!("✗ Failed to load cards: {}", e);
            std::process::exit(1);
        }
    };

    let seeds = match load_seed_decks(&cli.seeds) {
        Ok(seeds) => {
            eprintln!("✓ Loaded {} seed decks from {}", seeds.len(), cli.seeds);
            seeds
        }
        Err(e) => {
            log::warn!("no seed decks loaded from {}: {}", cli.seeds, e);
            Vec::new()
        }
    };

    match cli.command {
        Commands::Evolve {
            strategy,
            generations,
            seed,
            output,
            no_progress,
        } => {
            let mut config = config;
            if let Some(strategy) = strategy {
                config.strategy = strategy;
            }
            if let Some(generations) = generations {
                config.generations = generations;
            }
            let output = output.unwrap_or_else(|| match config.strategy {
                StrategyKind::Differential => "results_de_evolution.txt".to_string(),
                StrategyKind::Genetic => "results_ga_evolution.txt".to_string(),
            });
            evolve(&config, catalog, &seeds, seed, &output, !no_progress);
        }
        Commands::Score { seed } => score_decks(&config, catalog, &seeds, seed),
        Commands::Config => {}
    }
}

fn load_config(path: Option<&str>) -> SearchConfig {
    let Some(path) = path else {
        return SearchConfig::default();
    };
    match SearchConfig::from_file(path) {
        Ok(config) => {
            eprintln!("✓ Loaded configuration from {}", path);
            config
        }
        Err(e) => {
            eprintln!("✗ Failed to load configuration '{}': {}", path, e);
            std::process::exit(1);
        }
    }
}

/// Progress bar that also keeps the run history
struct BarSink {
    bar: Option<ProgressBar>,
    history: RunHistory,
}

impl BarSink {
    fn new(generations: usize, visible: bool) -> Self {
        let bar = visible.then(|| {
            let bar = ProgressBar::new(generations as u64);
            let style = ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} gens [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            bar.set_style(style);
            bar
        });
        BarSink {
            bar,
            history: RunHistory::default(),
        }
    }

    fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

impl ProgressSink for BarSink {
    fn record(&mut self, stats: &GenerationStats) {
        self.history.record(stats);
        if let Some(bar) = &self.bar {
            bar.set_message(format!("best {:.2}, avg {:.2}", stats.best, stats.average));
            bar.inc(1);
        }
    }
}

fn evolve(config: &SearchConfig, catalog: Arc<CardCatalog>, seeds: &[Deck], seed: Option<u64>, output: &str, progress: bool) {
    let mut rng = DeckRng::new(seed);

    let repairer = match Repairer::new(catalog.clone(), config.deck_size) {
        Ok(repairer) => repairer,
        Err(e) => {
            eprintln!("✗ Cannot build decks from this catalog: {}", e);
            std::process::exit(1);
        }
    };
    let evaluator = Arc::new(FitnessEvaluator::new(
        catalog.clone(),
        config.fitness.clone(),
        config.deck_size,
    ));

    println!("\n=== Deck Evolution ===\n");
    println!("Strategy: {:?}", config.strategy);
    println!("Population: {}", config.population_size());
    println!("Generations: {}", config.generations);
    println!("Seed: {}", rng.seed());
    println!();

    let start = std::time::Instant::now();

    let population = match initial_population(
        seeds,
        config.population_size(),
        &config.init,
        &repairer,
        &evaluator,
        &mut rng,
    ) {
        Ok(population) => population,
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    };

    println!("=== Initial Population ===");
    for (i, deck) in population.iter().enumerate() {
        println!("Deck {:2}: Fitness={:.2}", i + 1, evaluator.score(deck, &mut rng));
    }
    println!();

    let mut strategy = match build_strategy(config, repairer, evaluator.clone()) {
        Ok(strategy) => strategy,
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    };

    let mut sink = BarSink::new(config.generations, progress);
    let outcome = run(
        strategy.as_mut(),
        &evaluator,
        population,
        config.generations,
        &mut sink,
        &mut rng,
    );
    sink.finish();
    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("✗ Search failed: {}", e);
            std::process::exit(1);
        }
    };
    let elapsed = start.elapsed();

    println!("=== Evolution Complete ===");
    println!("Total time: {:.2?}", elapsed);
    if let Some(running) = sink.history.best_so_far().last() {
        println!("Best fitness seen: {:.2}", running);
    }
    if let (Some(first), Some(last)) = (sink.history.generations.first(), sink.history.generations.last()) {
        println!(
            "Average fitness: {:.2} (generation {}) -> {:.2} (generation {})",
            first.average, first.generation, last.average, last.generation
        );
    }

    if let Some((deck, score)) = outcome.best() {
        println!("\n=== BEST DECK (fitness {:.2}) ===", score);
        println!("{}", format_deck(deck, &catalog));
    }

    match write_results(output, strategy.name(), &outcome.population, &outcome.scores, &catalog) {
        Ok(count) => println!("\n✓ Wrote {} decks to {}", count, output),
        Err(e) => eprintln!("\n✗ Failed to write results to {}: {}", output, e),
    }
}

fn score_decks(config: &SearchConfig, catalog: Arc<CardCatalog>, decks: &[Deck], seed: Option<u64>) {
    let evaluator = FitnessEvaluator::new(catalog.clone(), config.fitness.clone(), config.deck_size);
    let mut rng = DeckRng::new(seed);

    println!("\n=== Deck Scores ===\n");
    for (i, deck) in decks.iter().enumerate() {
        let Some(breakdown) = evaluator.breakdown(deck, &mut rng) else {
            println!("✗ Deck {:2}: infeasible ({} cards)\n", i + 1, deck.total());
            continue;
        };
        let d = &breakdown.deterministic;
        let s = &breakdown.stochastic;
        println!("✓ Deck {:2}: Fitness={:.2}", i + 1, breakdown.total());
        println!("  {:24} {:>6.2}", "Monster band", d.monster_band);
        println!("  {:24} {:>6.2}", "Core count", d.core_count);
        println!("  {:24} {:>6.2}", "Size compliance", d.size_compliance);
        println!("  {:24} {:>6.2}  (p={:.3})", "Search consistency", d.search, d.search_probability);
        println!("  {:24} {:>6.2}", "Backrow band", d.backrow_band);
        println!("  {:24} {:>6.2}", "Synergies", d.synergy);
        println!("  {:24} {:>6.2}  (p={:.3})", "Combo", d.combo, d.combo_probability);
        println!("  {:24} {:>6.2}", "Per-copy bonus", d.per_copy);
        println!("  {:24} {:>6.2}", "Presence bonus", d.presence);
        println!("  {:24} {:>6.2}  (rate={:.3})", "Playable hand", s.playable, s.playable_rate);
        println!("  {:24} {:>6.2}  (rate={:.3})", "Joint hand", s.joint, s.joint_rate);
        println!("{}\n", format_deck(deck, &catalog));
    }
}
