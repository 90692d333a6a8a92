//! Search configuration, loadable from JSON. Every field has a default, so a
//! config file only needs the values it changes.

use crate::deck::DECK_SIZE;
use crate::fitness::FitnessRules;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Which evolution strategy drives the search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Differential evolution with rescue and random injection
    Differential,
    /// Elitist genetic algorithm with tournament selection
    Genetic,
}

/// Initial population admission policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InitConfig {
    /// Decks scoring below this are not admitted; None admits everything
    pub min_fitness: Option<f64>,
    /// Random candidates tried before giving up
    pub max_attempts: usize,
}

impl Default for InitConfig {
    fn default() -> Self {
        InitConfig {
            min_fitness: Some(5.0),
            max_attempts: 10_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DifferentialConfig {
    pub population_size: usize,
    /// F in `a + F * (b - c)`
    pub scale_factor: f64,
    /// CR, per-slot chance of taking the mutant's card
    pub crossover_rate: f64,
    /// Chance of one random card swap after mutation
    pub swap_probability: f64,
    /// Chance of one random card after crossover
    pub exploration_probability: f64,
    /// Survivors below this fitness are replaced by a fresh mutant
    pub rescue_threshold: Option<f64>,
    /// Replace one deck with a random one every this many generations
    pub injection_interval: Option<usize>,
}

impl Default for DifferentialConfig {
    fn default() -> Self {
        DifferentialConfig {
            population_size: 16,
            scale_factor: 1.2,
            crossover_rate: 1.0,
            swap_probability: 0.5,
            exploration_probability: 0.2,
            rescue_threshold: Some(10.0),
            injection_interval: Some(5),
        }
    }
}

impl DifferentialConfig {
    /// Smallest population that leaves three distinct donors per target
    pub const MIN_POPULATION: usize = 4;

    pub fn validate(&self) -> Result<(), String> {
        if self.population_size < Self::MIN_POPULATION {
            return Err(format!(
                "differential population_size must be at least {}, got {}",
                Self::MIN_POPULATION,
                self.population_size
            ));
        }
        if !self.scale_factor.is_finite() {
            return Err("scale_factor must be finite".to_string());
        }
        check_probability("crossover_rate", self.crossover_rate)?;
        check_probability("swap_probability", self.swap_probability)?;
        check_probability("exploration_probability", self.exploration_probability)?;
        if self.injection_interval == Some(0) {
            return Err("injection_interval must be positive (omit it to disable)".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticConfig {
    pub population_size: usize,
    /// Top decks copied unchanged into the next generation
    pub elite: usize,
    pub tournament_size: usize,
    /// Per-slot chance of replacement by a random card
    pub mutation_rate: f64,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        GeneticConfig {
            population_size: 14,
            elite: 2,
            tournament_size: 3,
            mutation_rate: 0.1,
        }
    }
}

impl GeneticConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.population_size == 0 {
            return Err("genetic population_size must be positive".to_string());
        }
        if self.elite > self.population_size {
            return Err(format!(
                "elite ({}) cannot exceed population_size ({})",
                self.elite, self.population_size
            ));
        }
        if self.tournament_size == 0 {
            return Err("tournament_size must be positive".to_string());
        }
        check_probability("mutation_rate", self.mutation_rate)
    }
}

fn check_probability(name: &str, value: f64) -> Result<(), String> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{} must be within [0, 1], got {}", name, value))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub deck_size: usize,
    pub strategy: StrategyKind,
    pub generations: usize,
    pub init: InitConfig,
    pub differential: DifferentialConfig,
    pub genetic: GeneticConfig,
    pub fitness: FitnessRules,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            deck_size: DECK_SIZE,
            strategy: StrategyKind::Differential,
            generations: 100,
            init: InitConfig::default(),
            differential: DifferentialConfig::default(),
            genetic: GeneticConfig::default(),
            fitness: FitnessRules::default(),
        }
    }
}

impl SearchConfig {
    /// Load and validate a JSON configuration file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: SearchConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Population size of the selected strategy
    pub fn population_size(&self) -> usize {
        match self.strategy {
            StrategyKind::Differential => self.differential.population_size,
            StrategyKind::Genetic => self.genetic.population_size,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.deck_size == 0 {
            return Err(ConfigError::Invalid("deck_size must be positive".to_string()));
        }
        if self.fitness.hand_size > self.deck_size {
            return Err(ConfigError::Invalid(format!(
                "hand_size ({}) cannot exceed deck_size ({})",
                self.fitness.hand_size, self.deck_size
            )));
        }
        if self.init.max_attempts == 0 {
            return Err(ConfigError::Invalid("init.max_attempts must be positive".to_string()));
        }
        self.differential.validate().map_err(ConfigError::Invalid)?;
        self.genetic.validate().map_err(ConfigError::Invalid)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SearchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.deck_size, 40);
        assert_eq!(config.population_size(), 16);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: SearchConfig = serde_json::from_str(
            r#"{"strategy": "genetic", "genetic": {"elite": 4}, "differential": {"rescue_threshold": null}}"#,
        )
        .expect("valid config");
        assert_eq!(config.strategy, StrategyKind::Genetic);
        assert_eq!(config.genetic.elite, 4);
        assert_eq!(config.genetic.tournament_size, 3);
        assert_eq!(config.differential.rescue_threshold, None);
        assert_eq!(config.differential.injection_interval, Some(5));
        assert_eq!(config.population_size(), 14);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = SearchConfig::default();
        config.differential.population_size = 3;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = SearchConfig::default();
        config.genetic.mutation_rate = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = SearchConfig::default();
        config.genetic.elite = 20;
        assert!(config.validate().is_err());

        let mut config = SearchConfig::default();
        config.deck_size = 4;
        assert!(config.validate().is_err(), "Opening hand larger than the deck");

        let mut config = SearchConfig::default();
        config.differential.injection_interval = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            SearchConfig::from_file("data/no_such_config.json"),
            Err(ConfigError::IoError(_))
        ));
    }
}
