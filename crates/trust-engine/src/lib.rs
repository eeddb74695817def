//! Trust Engine for the Evolution of Trust
//!
//! Core simulation for the Iterated Prisoner's Dilemma and for populations
//! of strategies evolving under fitness-proportional selection.
//! This crate is compiled to:
//! - Native (for the sandbox driver)
//! - WASM (for the browser front end)
//!
//! Every random draw comes from an explicit `rand::Rng` argument; use
//! [`SeededRng`] for reproducible runs.

mod agent;
mod catalog;
mod error;
mod game;
mod pairing;
mod payoff;
mod population;
mod random;
mod selection;
mod strategy;

#[cfg(feature = "wasm")]
mod wasm;

pub use agent::Agent;
pub use catalog::{catalog, StrategyInfo};
pub use error::{EngineError, Result};
pub use game::{run_match, Match, MatchResult, RoundResult, Scores};
pub use pairing::{draw_opponent, generate_pairings, MATCHES_PER_AGENT};
pub use payoff::{Payoff, PayoffTable};
pub use population::{
    Distribution, GenerationSnapshot, MatchSummary, Population, PopulationConfig, MATCH_LOG_LIMIT,
};
pub use random::{chance, SeededRng};
pub use selection::RouletteWheel;
pub use strategy::{apply_noise, execute_strategy, Move, Strategy};
