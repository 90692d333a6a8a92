//! Human-readable deck listings and the results file.

use crate::card::CardCatalog;
use crate::deck::Deck;
use std::fmt::Write as _;
use std::io::Write;

/// Decks written to a results file at most
pub const MAX_REPORTED_DECKS: usize = 100;

/// One "Name (id) xN" line per card, most copies first
pub fn format_deck(deck: &Deck, catalog: &CardCatalog) -> String {
    let mut entries: Vec<(&str, u32, u32)> = deck
        .iter()
        .filter(|&(_, count)| count > 0)
        .map(|(id, count)| {
            let name = catalog.lookup(id).map_or("UNKNOWN", |card| card.name.as_str());
            (name, id, count)
        })
        .collect();
    entries.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(b.0)));

    let mut out = String::new();
    for (i, (name, id, count)) in entries.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = write!(out, "{} ({}) x{}", name, id, count);
    }
    out
}

/// Write up to [`MAX_REPORTED_DECKS`] decks with positive fitness, fittest
/// first, under a timestamped header. Returns the number of decks written.
pub fn write_results(
    path: &str,
    strategy: &str,
    population: &[Deck],
    scores: &[f64],
    catalog: &CardCatalog,
) -> std::io::Result<usize> {
    let mut ranked: Vec<(&Deck, f64)> = population
        .iter()
        .zip(scores.iter().copied())
        .filter(|&(_, score)| score > 0.0)
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(MAX_REPORTED_DECKS);

    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    writeln!(
        file,
        "# {} results, {}",
        strategy,
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    )?;
    writeln!(file)?;
    for (i, (deck, score)) in ranked.iter().enumerate() {
        writeln!(file, "Deck {:2}: Fitness={:.2}", i + 1, score)?;
        writeln!(file, "{}", format_deck(deck, catalog))?;
        writeln!(file)?;
    }
    file.flush()?;
    Ok(ranked.len())
}
