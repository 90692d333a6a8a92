//! Monte Carlo opening-hand estimates.

use crate::card::CardId;
use crate::deck::Deck;
use crate::fitness::rules::FitnessRules;
use crate::rng::DeckRng;

/// Fraction of `trials` random hands (drawn without replacement from `pool`)
/// for which `hit` holds. Zero trials, or a pool smaller than the hand,
/// estimate 0.
pub fn estimate_hand_rate(
    pool: &[CardId],
    hand_size: usize,
    trials: usize,
    rng: &mut DeckRng,
    hit: impl Fn(&[CardId]) -> bool,
) -> f64 {
    if trials == 0 || hand_size == 0 || pool.len() < hand_size {
        return 0.0;
    }

    let mut hand = Vec::with_capacity(hand_size);
    let mut successes = 0usize;
    for _ in 0..trials {
        hand.clear();
        hand.extend(rng.sample_indices(pool.len(), hand_size).into_iter().map(|i| pool[i]));
        if hit(&hand) {
            successes += 1;
        }
    }
    successes as f64 / trials as f64
}

/// Per-rule points of the sampled half
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StochasticScore {
    pub playable_rate: f64,
    pub playable: f64,
    pub joint_rate: f64,
    pub joint: f64,
}

impl StochasticScore {
    pub fn compute(deck: &Deck, rules: &FitnessRules, rng: &mut DeckRng) -> Self {
        let pool = deck.slots();

        let playable_rule = &rules.playable_hand;
        let playable_rate = estimate_hand_rate(&pool, rules.hand_size, playable_rule.trials, rng, |hand| {
            hand.iter().any(|id| playable_rule.ids.contains(id))
        });
        let playable = if playable_rate >= playable_rule.threshold {
            playable_rule.points
        } else {
            0.0
        };

        let joint_rule = &rules.joint_hand;
        let joint_rate = estimate_hand_rate(&pool, rules.hand_size, joint_rule.trials, rng, |hand| {
            hand.contains(&joint_rule.first) && hand.contains(&joint_rule.second)
        });
        let joint = if joint_rate > joint_rule.threshold {
            joint_rule.points
        } else {
            0.0
        };

        StochasticScore {
            playable_rate,
            playable,
            joint_rate,
            joint,
        }
    }

    pub fn total(&self) -> f64 {
        self.playable + self.joint
    }
}
