use serde::{Deserialize, Serialize};

/// Card passcode as printed on the card
pub type CardId = u32;

/// Broad card category used by the fitness rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardCategory {
    Monster,
    Spell,
    Trap,
    Other,
}

impl CardCategory {
    /// Classify a catalog type string such as "Effect Monster" or "Spell Card"
    pub fn from_type_line(type_line: &str) -> Self {
        if type_line.contains("Monster") {
            CardCategory::Monster
        } else if type_line.contains("Spell") {
            CardCategory::Spell
        } else if type_line.contains("Trap") {
            CardCategory::Trap
        } else {
            CardCategory::Other
        }
    }

    /// Spells and traps count as backrow
    pub fn is_backrow(&self) -> bool {
        matches!(self, CardCategory::Spell | CardCategory::Trap)
    }
}

/// Banlist status from the catalog snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BanlistStatus {
    Forbidden,
    Limited,
    #[serde(rename = "Semi-Limited")]
    SemiLimited,
    #[default]
    Unlimited,
}

impl BanlistStatus {
    /// Maximum legal copies in a main deck
    pub fn copy_limit(&self) -> u32 {
        match self {
            BanlistStatus::Forbidden => 0,
            BanlistStatus::Limited => 1,
            BanlistStatus::SemiLimited => 2,
            BanlistStatus::Unlimited => 3,
        }
    }
}

/// A single catalog entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub name: String,
    #[serde(rename = "type")]
    pub type_line: String,
    #[serde(default)]
    pub archetype: Option<String>,
    #[serde(default)]
    pub banlist_status: BanlistStatus,
}

impl Card {
    pub fn new(id: CardId, name: &str, type_line: &str, banlist_status: BanlistStatus) -> Self {
        Card {
            id,
            name: name.to_string(),
            type_line: type_line.to_string(),
            archetype: None,
            banlist_status,
        }
    }

    pub fn category(&self) -> CardCategory {
        CardCategory::from_type_line(&self.type_line)
    }

    pub fn copy_limit(&self) -> u32 {
        self.banlist_status.copy_limit()
    }
}
