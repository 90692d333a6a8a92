pub mod card;
pub mod config;
pub mod deck;
pub mod driver;
pub mod evolution;
pub mod fitness;
pub mod report;
pub mod rng;
