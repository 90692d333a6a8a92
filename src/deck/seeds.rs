use crate::card::CardId;
use crate::deck::Deck;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Invalid card id '{key}' in seed deck {deck}")]
    InvalidIdentifier { deck: usize, key: String },
}

/// Parse seed decks from JSON text: an array of `{"<passcode>": count}` objects.
/// Decks are returned raw; they are admitted to a population only through repair.
pub fn parse_seed_decks(content: &str) -> Result<Vec<Deck>, DeckError> {
    let raw: Vec<BTreeMap<String, u32>> = serde_json::from_str(content)?;

    raw.into_iter()
        .enumerate()
        .map(|(deck, entries)| {
            entries
                .into_iter()
                .map(|(key, count)| {
                    key.trim()
                        .parse::<CardId>()
                        .map(|id| (id, count))
                        .map_err(|_| DeckError::InvalidIdentifier { deck, key })
                })
                .collect::<Result<Deck, DeckError>>()
        })
        .collect()
}

/// Load seed decks from a JSON file
pub fn load_seed_decks(path: &str) -> Result<Vec<Deck>, DeckError> {
    let content = std::fs::read_to_string(path)?;
    parse_seed_decks(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_seed_file() {
        let seeds = load_seed_decks("data/seed_decks.json").expect("Failed to load seeds");
        assert_eq!(seeds.len(), 3);
        assert_eq!(seeds[0].total(), 40, "First fixture deck is a legal 40");
        assert_eq!(seeds[2].count(89631139), 5, "Counts are kept raw");
    }

    #[test]
    fn test_parse_string_keys() {
        let seeds = parse_seed_decks(r#"[{"89631139": 3, " 48800175 ": 2}, {}]"#).expect("valid");
        assert_eq!(seeds[0].count(89631139), 3);
        assert_eq!(seeds[0].count(48800175), 2);
        assert_eq!(seeds[1].total(), 0);
    }

    #[test]
    fn test_invalid_key() {
        let result = parse_seed_decks(r#"[{"1": 1}, {"Blue-Eyes": 3}]"#);
        match result {
            Err(DeckError::InvalidIdentifier { deck, key }) => {
                assert_eq!(deck, 1);
                assert_eq!(key, "Blue-Eyes");
            }
            other => panic!("Expected invalid identifier, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_seed_decks("data/does_not_exist.json"),
            Err(DeckError::IoError(_))
        ));
    }
}
