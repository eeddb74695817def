//! WASM bindings for the browser front end

#![cfg(feature = "wasm")]

use rand::SeedableRng;
use wasm_bindgen::prelude::*;

use crate::{catalog, run_match, PayoffTable, Population, PopulationConfig, SeededRng, Strategy};

/// Seeded when asked, otherwise from the browser's clock and Math.random
fn make_rng(seed: Option<u64>) -> SeededRng {
    let seed = seed.unwrap_or_else(|| {
        let noise = (js_sys::Math::random() * u32::MAX as f64) as u64;
        (js_sys::Date::now() as u64) ^ (noise << 32)
    });
    SeededRng::seed_from_u64(seed)
}

fn parse_strategy(id: &str) -> Result<Strategy, JsError> {
    id.parse::<Strategy>().map_err(|e| JsError::new(&e.to_string()))
}

/// Replay a standalone match with full round-by-round details
///
/// # Arguments
/// * `strategy_a` - Strategy id for player A (e.g. `"tit-for-tat"`)
/// * `strategy_b` - Strategy id for player B
/// * `rounds` - Number of rounds
/// * `noise_rate` - Per-decision flip probability
/// * `payoffs_json` - Optional JSON PayoffTable; defaults when absent
/// * `seed` - Optional seed; entropy when absent
///
/// # Returns
/// Serialized MatchResult
#[wasm_bindgen]
pub fn replay_match(
    strategy_a: &str,
    strategy_b: &str,
    rounds: u32,
    noise_rate: f64,
    payoffs_json: Option<String>,
    seed: Option<u64>,
) -> Result<JsValue, JsError> {
    let strategy_a = parse_strategy(strategy_a)?;
    let strategy_b = parse_strategy(strategy_b)?;
    let payoffs = match payoffs_json {
        Some(json) => serde_json::from_str::<PayoffTable>(&json)
            .map_err(|e| JsError::new(&format!("Invalid payoff table: {}", e)))?,
        None => PayoffTable::DEFAULT,
    };

    let mut rng = make_rng(seed);
    let result = run_match(strategy_a, strategy_b, rounds, noise_rate, payoffs, &mut rng)
        .map_err(|e| JsError::new(&e.to_string()))?;

    serde_wasm_bindgen::to_value(&result)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// Get display metadata for every strategy
#[wasm_bindgen]
pub fn get_strategy_catalog() -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(catalog())
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// Population handle for the evolution sandbox
#[wasm_bindgen]
pub struct Simulation {
    population: Population,
    rng: SeededRng,
}

#[wasm_bindgen]
impl Simulation {
    /// Build from a (possibly partial) JSON PopulationConfig
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, seed: Option<u64>) -> Result<Simulation, JsError> {
        let config: PopulationConfig = serde_json::from_str(config_json)
            .map_err(|e| JsError::new(&format!("Invalid config: {}", e)))?;
        let population = Population::new(config).map_err(|e| JsError::new(&e.to_string()))?;

        Ok(Simulation {
            population,
            rng: make_rng(seed),
        })
    }

    /// Advance one generation; returns the match log
    pub fn evolve(&mut self, log_matches: bool) -> Result<JsValue, JsError> {
        let log = self.population.evolve(log_matches, &mut self.rng);
        serde_wasm_bindgen::to_value(&log)
            .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
    }

    /// Head count per strategy id
    pub fn distribution(&self) -> Result<JsValue, JsError> {
        let counts: Vec<(&'static str, usize)> = self
            .population
            .distribution()
            .iter()
            .map(|(strategy, count)| (strategy.id(), count))
            .collect();
        serde_wasm_bindgen::to_value(&counts)
            .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
    }

    pub fn history(&self) -> Result<JsValue, JsError> {
        serde_wasm_bindgen::to_value(self.population.history())
            .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
    }

    #[wasm_bindgen(getter)]
    pub fn generation(&self) -> u32 {
        self.population.generation()
    }

    #[wasm_bindgen(getter, js_name = populationSize)]
    pub fn population_size(&self) -> usize {
        self.population.population_size()
    }

    pub fn reset(&mut self) {
        self.population.reset();
    }
}
