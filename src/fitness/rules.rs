//! Declarative rule table for deck scoring.
//!
//! Every identifier set, threshold and weight the evaluator uses lives here so
//! a rule can be tuned (or zeroed out) without touching the scoring code.
//! `Default` is the Blue-Eyes table.

use crate::card::CardId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Flat points when a copy count falls inside `[min, max]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountBand {
    pub min: u32,
    pub max: u32,
    pub points: f64,
}

impl CountBand {
    pub fn award(&self, count: u32) -> f64 {
        if (self.min..=self.max).contains(&count) {
            self.points
        } else {
            0.0
        }
    }
}

/// Flat points when copies drawn from `ids` reach `min`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreCount {
    pub ids: BTreeSet<CardId>,
    pub min: u32,
    pub points: f64,
}

/// Monte Carlo rate of opening hands holding any card from `ids`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayableHand {
    pub ids: BTreeSet<CardId>,
    pub threshold: f64,
    pub points: f64,
    pub trials: usize,
}

/// Monte Carlo rate of opening hands holding both `first` and `second`.
/// Points are awarded when the rate is strictly above `threshold`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JointHand {
    pub first: CardId,
    pub second: CardId,
    pub threshold: f64,
    pub points: f64,
    pub trials: usize,
}

/// Exact chance of opening at least one card from `ids`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConsistency {
    pub ids: BTreeSet<CardId>,
    pub threshold: f64,
    pub points: f64,
}

/// Points when every card of the set is in the deck
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Synergy {
    pub ids: BTreeSet<CardId>,
    pub points: f64,
}

/// Exact two-card opening probability, scaled by `weight`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwoCardCombo {
    pub first: CardId,
    pub second: CardId,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardBonus {
    pub id: CardId,
    pub points: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessRules {
    pub hand_size: usize,
    pub monster_band: CountBand,
    pub core_count: CoreCount,
    pub size_compliance_points: f64,
    pub playable_hand: PlayableHand,
    pub joint_hand: JointHand,
    pub search: SearchConsistency,
    pub backrow_band: CountBand,
    pub synergies: Vec<Synergy>,
    pub combo: TwoCardCombo,
    /// Points for every copy of the card
    pub per_copy: Vec<CardBonus>,
    /// Points once if the card is present at all
    pub presence: Vec<CardBonus>,
}

pub mod ids {
    use crate::card::CardId;

    pub const BLUE_EYES_WHITE_DRAGON: CardId = 89631139;
    pub const BLUE_EYES_ALTERNATIVE: CardId = 38517737;
    pub const BLUE_EYES_JET_DRAGON: CardId = 30576089;
    pub const SAGE_WITH_EYES_OF_BLUE: CardId = 8240199;
    pub const WHITE_STONE_OF_ANCIENTS: CardId = 71039903;
    pub const WHITE_STONE_OF_LEGEND: CardId = 79814787;
    pub const DRAGON_SPIRIT_OF_WHITE: CardId = 45467446;
    pub const MAIDEN_OF_WHITE: CardId = 17947697;
    pub const ETHER_BERYL: CardId = 63198739;
    pub const WISHES_FOR_EYES_OF_BLUE: CardId = 80326401;
    pub const BINGO_MACHINE_GO: CardId = 93437091;
    pub const ROAR_OF_THE_BLUE_EYED_DRAGONS: CardId = 17725109;
    pub const DRILLBEAM: CardId = 29095457;
    pub const LORDLY_LODE: CardId = 56506740;
    pub const MELODY_OF_AWAKENING_DRAGON: CardId = 48800175;
    pub const PIRI_REIS_MAP: CardId = 33907039;
    pub const TRADE_IN: CardId = 38120068;
    pub const CARDS_OF_CONSONANCE: CardId = 39701395;
    pub const TRUE_LIGHT: CardId = 62089826;
}

impl Default for FitnessRules {
    fn default() -> Self {
        use ids::*;

        FitnessRules {
            hand_size: 5,
            monster_band: CountBand { min: 25, max: 30, points: 2.0 },
            core_count: CoreCount {
                ids: BTreeSet::from([
                    BLUE_EYES_WHITE_DRAGON,
                    BLUE_EYES_ALTERNATIVE,
                    BLUE_EYES_JET_DRAGON,
                    SAGE_WITH_EYES_OF_BLUE,
                    WHITE_STONE_OF_ANCIENTS,
                    WHITE_STONE_OF_LEGEND,
                    DRAGON_SPIRIT_OF_WHITE,
                    MAIDEN_OF_WHITE,
                ]),
                min: 8,
                points: 3.0,
            },
            size_compliance_points: 1.0,
            playable_hand: PlayableHand {
                ids: BTreeSet::from([
                    WISHES_FOR_EYES_OF_BLUE,
                    SAGE_WITH_EYES_OF_BLUE,
                    BINGO_MACHINE_GO,
                    ROAR_OF_THE_BLUE_EYED_DRAGONS,
                    MAIDEN_OF_WHITE,
                    ETHER_BERYL,
                    DRILLBEAM,
                    LORDLY_LODE,
                    MELODY_OF_AWAKENING_DRAGON,
                    PIRI_REIS_MAP,
                    TRADE_IN,
                    CARDS_OF_CONSONANCE,
                ]),
                threshold: 0.70,
                points: 7.0,
                trials: 200,
            },
            joint_hand: JointHand {
                first: MAIDEN_OF_WHITE,
                second: WISHES_FOR_EYES_OF_BLUE,
                threshold: 0.0,
                points: 10.0,
                trials: 200,
            },
            search: SearchConsistency {
                ids: BTreeSet::from([TRADE_IN, MELODY_OF_AWAKENING_DRAGON, CARDS_OF_CONSONANCE]),
                threshold: 0.60,
                points: 5.0,
            },
            backrow_band: CountBand { min: 10, max: 15, points: 1.0 },
            synergies: vec![
                Synergy {
                    ids: BTreeSet::from([BLUE_EYES_WHITE_DRAGON, BLUE_EYES_JET_DRAGON]),
                    points: 3.0,
                },
                Synergy {
                    ids: BTreeSet::from([BLUE_EYES_WHITE_DRAGON, MELODY_OF_AWAKENING_DRAGON]),
                    points: 4.0,
                },
                Synergy {
                    ids: BTreeSet::from([BLUE_EYES_JET_DRAGON, WHITE_STONE_OF_ANCIENTS]),
                    points: 2.0,
                },
            ],
            combo: TwoCardCombo {
                first: MELODY_OF_AWAKENING_DRAGON,
                second: BLUE_EYES_WHITE_DRAGON,
                weight: 4.0,
            },
            per_copy: vec![
                CardBonus { id: BLUE_EYES_WHITE_DRAGON, points: 1.0 },
                CardBonus { id: WISHES_FOR_EYES_OF_BLUE, points: 1.0 },
                CardBonus { id: MAIDEN_OF_WHITE, points: 1.0 },
            ],
            presence: vec![
                CardBonus { id: TRADE_IN, points: 2.0 },
                CardBonus { id: TRUE_LIGHT, points: 5.0 },
            ],
        }
    }
}

impl FitnessRules {
    /// The same table with both Monte Carlo rules worth nothing, which makes
    /// the score a pure function of the deck
    pub fn without_sampling(mut self) -> Self {
        self.playable_hand.points = 0.0;
        self.playable_hand.trials = 0;
        self.joint_hand.points = 0.0;
        self.joint_hand.trials = 0;
        self
    }
}
