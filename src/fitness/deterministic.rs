//! Rule contributions that depend only on the deck: thresholds, bonuses and
//! exact hypergeometric probabilities.

use crate::card::{CardCatalog, CardCategory};
use crate::deck::Deck;
use crate::fitness::rules::{FitnessRules, SearchConsistency, TwoCardCombo};

/// Binomial coefficient C(n, k) in integer arithmetic.
/// `Some(0)` whenever `n < 0`, `k < 0` or `k > n`, and `None` when the
/// coefficient does not fit in a `u128`.
pub fn binomial(n: i64, k: i64) -> Option<u128> {
    if n < 0 || k < 0 || k > n {
        return Some(0);
    }
    let k = k.min(n - k) as u128;
    let n = n as u128;
    let mut result: u128 = 1;
    for i in 0..k {
        // result * (n - i) is divisible by (i + 1); dividing first keeps every
        // intermediate at most C(n, i + 1)
        let g = gcd(result, i + 1);
        let divisor = (i + 1) / g;
        result = (result / g).checked_mul((n - i) / divisor)?;
    }
    Some(result)
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// C(top, k) / C(bottom, k) for `top <= bottom`, exact when both fit in
/// integers and a running product otherwise
fn binomial_ratio(top: usize, bottom: usize, k: usize) -> f64 {
    match (binomial(top as i64, k as i64), binomial(bottom as i64, k as i64)) {
        (Some(_), Some(0)) => 0.0,
        (Some(num), Some(den)) => num as f64 / den as f64,
        _ => falling_ratio(top, bottom, k),
    }
}

/// Product of `(top - i) / (bottom - i)` for `i < k`, zero once `top` runs out
fn falling_ratio(top: usize, bottom: usize, k: usize) -> f64 {
    let mut ratio = 1.0;
    for i in 0..k {
        if i >= top || i >= bottom {
            return 0.0;
        }
        ratio *= (top - i) as f64 / (bottom - i) as f64;
    }
    ratio
}

/// P(at least one success) when drawing `draws` cards without replacement
/// from `population` cards of which `successes` are hits
pub fn at_least_one(population: usize, successes: usize, draws: usize) -> f64 {
    if draws > population || successes == 0 {
        return 0.0;
    }
    let misses = population.saturating_sub(successes);
    1.0 - binomial_ratio(misses, population, draws)
}

/// Chance of opening at least one search card
pub fn search_probability(deck: &Deck, rule: &SearchConsistency, deck_size: usize, hand_size: usize) -> f64 {
    let k = deck.copies_of(&rule.ids) as usize;
    at_least_one(deck_size, k, hand_size)
}

/// Two-card opening probability `a * b * C(N-2, h-2) / C(N, h)`, 0 when
/// either card is missing
pub fn combo_probability(deck: &Deck, rule: &TwoCardCombo, deck_size: usize, hand_size: usize) -> f64 {
    let a = deck.count(rule.first) as u128;
    let b = deck.count(rule.second) as u128;
    if a == 0 || b == 0 || hand_size > deck_size {
        return 0.0;
    }
    let n = deck_size as i64;
    let h = hand_size as i64;
    let exact = binomial(n, h).zip(binomial(n - 2, h - 2)).and_then(|(total, rest)| {
        let favourable = a.checked_mul(b)?.checked_mul(rest)?;
        Some((favourable, total))
    });
    match exact {
        Some((_, 0)) => 0.0,
        Some((favourable, total)) => favourable as f64 / total as f64,
        // C(N-2, h-2) / C(N, h) reduces to h(h-1) / (N(N-1))
        None => {
            let (n, h) = (deck_size as f64, hand_size as f64);
            a as f64 * b as f64 * h * (h - 1.0) / (n * (n - 1.0))
        }
    }
}

/// Per-rule points of the deterministic half
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeterministicScore {
    pub monster_band: f64,
    pub core_count: f64,
    pub size_compliance: f64,
    pub search_probability: f64,
    pub search: f64,
    pub backrow_band: f64,
    pub synergy: f64,
    pub combo_probability: f64,
    pub combo: f64,
    pub per_copy: f64,
    pub presence: f64,
}

impl DeterministicScore {
    /// Score a deck that already passed the validity gate
    pub fn compute(deck: &Deck, catalog: &CardCatalog, rules: &FitnessRules, deck_size: usize) -> Self {
        let monsters = deck.copies_where(catalog, |c| c == CardCategory::Monster);
        let backrow = deck.copies_where(catalog, |c| c.is_backrow());

        let core = deck.copies_of(&rules.core_count.ids);
        let core_count = if core >= rules.core_count.min {
            rules.core_count.points
        } else {
            0.0
        };

        let size_compliance = if deck.total() <= deck_size {
            rules.size_compliance_points
        } else {
            0.0
        };

        let search_probability = search_probability(deck, &rules.search, deck_size, rules.hand_size);
        let search = if search_probability >= rules.search.threshold {
            rules.search.points
        } else {
            0.0
        };

        let synergy = rules
            .synergies
            .iter()
            .filter(|s| s.ids.iter().all(|&id| deck.contains(id)))
            .map(|s| s.points)
            .sum();

        let combo_probability = combo_probability(deck, &rules.combo, deck_size, rules.hand_size);

        let per_copy = rules
            .per_copy
            .iter()
            .map(|b| deck.count(b.id) as f64 * b.points)
            .sum();
        let presence = rules
            .presence
            .iter()
            .filter(|b| deck.contains(b.id))
            .map(|b| b.points)
            .sum();

        DeterministicScore {
            monster_band: rules.monster_band.award(monsters),
            core_count,
            size_compliance,
            search_probability,
            search,
            backrow_band: rules.backrow_band.award(backrow),
            synergy,
            combo_probability,
            combo: combo_probability * rules.combo.weight,
            per_copy,
            presence,
        }
    }

    pub fn total(&self) -> f64 {
        self.monster_band
            + self.core_count
            + self.size_compliance
            + self.search
            + self.backrow_band
            + self.synergy
            + self.combo
            + self.per_copy
            + self.presence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::fixtures::mixed_catalog;
    use crate::fitness::rules::{CardBonus, CountBand, Synergy};
    use std::collections::BTreeSet;

    #[test]
    fn test_binomial_values() {
        assert_eq!(binomial(40, 5), Some(658_008));
        assert_eq!(binomial(38, 3), Some(8_436));
        assert_eq!(binomial(5, 0), Some(1));
        assert_eq!(binomial(5, 5), Some(1));
        assert_eq!(binomial(0, 0), Some(1));
        assert_eq!(binomial(60, 30), Some(118_264_581_564_861_424));
        assert_eq!(binomial(100, 50), Some(100_891_344_545_564_193_334_812_497_256));
    }

    #[test]
    fn test_binomial_out_of_range_is_zero() {
        assert_eq!(binomial(4, 5), Some(0));
        assert_eq!(binomial(-1, 2), Some(0));
        assert_eq!(binomial(5, -1), Some(0));
        assert_eq!(binomial(-3, -3), Some(0));
    }

    #[test]
    fn test_binomial_overflow_is_none() {
        assert_eq!(binomial(200, 100), None);
        assert_eq!(binomial(198, 98), None);
        assert_eq!(binomial(200, 2), Some(19_900), "Small k stays exact");
    }

    #[test]
    fn test_at_least_one() {
        assert_eq!(at_least_one(40, 0, 5), 0.0);
        assert_eq!(at_least_one(40, 36, 5), 1.0, "Only four misses, five draws");
        let p = at_least_one(40, 9, 5);
        let expected = 1.0 - 169_911.0 / 658_008.0;
        assert!((p - expected).abs() < 1e-12);
        assert_eq!(at_least_one(3, 2, 5), 0.0, "Draw larger than pool is guarded");
    }

    #[test]
    fn test_falling_ratio_matches_exact_ratio() {
        let exact = 169_911.0 / 658_008.0;
        assert!((falling_ratio(31, 40, 5) - exact).abs() < 1e-12);
        assert_eq!(falling_ratio(4, 40, 5), 0.0);
    }

    #[test]
    fn test_probabilities_for_large_hands() {
        // 200-card deck drawing 100: C(200, 100) is far beyond u128
        assert_eq!(at_least_one(200, 101, 100), 1.0, "Only 99 misses");
        let p = at_least_one(200, 30, 100);
        assert!(p.is_finite() && p > 0.99 && p < 1.0, "p = {}", p);
        assert!((at_least_one(200, 1, 100) - 0.5).abs() < 1e-12, "One hit in half the deck");

        let deck: Deck = (1..=9).map(|id| (id, 20)).chain([(21, 20)]).collect();
        let p = combo_probability(&deck, &combo_rule(), 200, 100);
        let expected = 20.0 * 20.0 * 100.0 * 99.0 / (200.0 * 199.0);
        assert!((p - expected).abs() < 1e-9, "p = {}", p);
        assert!(p.is_finite());

        let mut rules = FitnessRules::default();
        rules.hand_size = 100;
        rules.search = search_rule();
        rules.combo = combo_rule();
        let score = DeterministicScore::compute(&deck, &mixed_catalog(), &rules, 200);
        assert!(score.total().is_finite());
        assert!((0.0..=1.0).contains(&score.search_probability));
    }

    fn search_rule() -> SearchConsistency {
        SearchConsistency { ids: BTreeSet::from([21, 22, 23]), threshold: 0.6, points: 5.0 }
    }

    fn combo_rule() -> TwoCardCombo {
        TwoCardCombo { first: 21, second: 1, weight: 4.0 }
    }

    fn sample_deck() -> Deck {
        // 27 monsters and 13 spells, nine of them search cards
        (1..=9).map(|id| (id, 3)).chain((21..=24).map(|id| (id, 3))).chain([(25, 1)]).collect()
    }

    #[test]
    fn test_search_probability_exact_and_repeatable() {
        let deck = sample_deck();
        let p1 = search_probability(&deck, &search_rule(), 40, 5);
        let p2 = search_probability(&deck, &search_rule(), 40, 5);
        assert_eq!(p1.to_bits(), p2.to_bits(), "Exact terms must be bit-identical");
        assert!((p1 - at_least_one(40, 9, 5)).abs() < 1e-15);
    }

    #[test]
    fn test_combo_probability() {
        let deck = sample_deck();
        let p = combo_probability(&deck, &combo_rule(), 40, 5);
        let expected = (3.0 * 3.0 * 8_436.0) / 658_008.0;
        assert!((p - expected).abs() < 1e-12);
        assert_eq!(p.to_bits(), combo_probability(&deck, &combo_rule(), 40, 5).to_bits());
    }

    #[test]
    fn test_combo_probability_zero_without_components() {
        let deck: Deck = (2..=14).map(|id| (id, 3)).chain([(25, 1)]).collect();
        assert_eq!(combo_probability(&deck, &combo_rule(), 40, 5), 0.0);

        let only_first: Deck = [(21, 3), (2, 3)].into_iter().collect();
        assert_eq!(combo_probability(&only_first, &combo_rule(), 40, 5), 0.0);
    }

    #[test]
    fn test_each_rule_in_isolation() {
        let catalog = mixed_catalog();
        let deck = sample_deck();
        let zero_band = CountBand { min: 0, max: 0, points: 0.0 };

        let mut rules = FitnessRules::default();
        rules.monster_band = CountBand { min: 25, max: 30, points: 2.0 };
        rules.backrow_band = zero_band;
        rules.core_count.ids = BTreeSet::from([1, 2, 3]);
        rules.core_count.min = 9;
        rules.search = search_rule();
        rules.combo = combo_rule();
        rules.synergies = vec![
            Synergy { ids: BTreeSet::from([1, 21]), points: 3.0 },
            Synergy { ids: BTreeSet::from([1, 30]), points: 4.0 },
        ];
        rules.per_copy = vec![CardBonus { id: 2, points: 1.0 }];
        rules.presence = vec![CardBonus { id: 25, points: 5.0 }, CardBonus { id: 26, points: 2.0 }];

        let score = DeterministicScore::compute(&deck, &catalog, &rules, 40);
        assert_eq!(score.monster_band, 2.0, "27 monsters is inside the band");
        assert_eq!(score.core_count, 3.0, "Nine copies of the core");
        assert_eq!(score.size_compliance, 1.0);
        assert_eq!(score.search, 5.0, "Nine search copies give ~74%");
        assert_eq!(score.backrow_band, 0.0);
        assert_eq!(score.synergy, 3.0, "Card 30 is absent");
        assert_eq!(score.per_copy, 3.0);
        assert_eq!(score.presence, 5.0);
        assert!((score.combo - 4.0 * score.combo_probability).abs() < 1e-15);

        let expected = 2.0 + 3.0 + 1.0 + 5.0 + 3.0 + 3.0 + 5.0 + score.combo;
        assert!((score.total() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_backrow_band_counts_spells_and_traps() {
        let catalog = mixed_catalog();
        // 26 monsters, 9 spells, 5 traps
        let deck: Deck = (1..=8)
            .map(|id| (id, 3))
            .chain([(9, 2)])
            .chain((21..=23).map(|id| (id, 3)))
            .chain((31..=35).map(|id| (id, 1)))
            .collect();
        assert_eq!(deck.total(), 40);

        let rules = FitnessRules::default();
        let score = DeterministicScore::compute(&deck, &catalog, &rules, 40);
        assert_eq!(score.backrow_band, 1.0, "14 spells and traps");
        assert_eq!(score.monster_band, 2.0, "26 monsters");
    }
}
