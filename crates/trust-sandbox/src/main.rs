//! Trust Sandbox - headless evolution runs
//!
//! Evolves a mixed population of strategies for a number of generations and
//! reports which strategies survived.

mod report;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use tracing::{info, Level};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use trust_engine::{Population, PopulationConfig, SeededRng};

use crate::report::Report;

const DEFAULT_FILTER: &str = "trust_sandbox=info,trust_engine=info";

#[derive(Parser, Debug)]
#[command(name = "trust-sandbox")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Evolve a population of iterated prisoner's dilemma strategies")]
struct Cli {
    /// JSON file with population settings; flags override its fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of agents in the population
    #[arg(short, long)]
    population_size: Option<usize>,

    /// Rounds played in every match
    #[arg(short, long)]
    rounds_per_match: Option<u32>,

    /// Chance an offspring takes a random strategy (0.0 - 1.0)
    #[arg(short, long)]
    mutation_rate: Option<f64>,

    /// Chance a chosen move is flipped (0.0 - 1.0)
    #[arg(short, long)]
    noise_rate: Option<f64>,

    /// Generations to evolve
    #[arg(short, long, default_value_t = 50)]
    generations: u32,

    /// Seed for a reproducible run
    #[arg(short, long)]
    seed: Option<u64>,

    /// Log the first matches of every tournament
    #[arg(long)]
    log_matches: bool,

    /// Print the full report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Settings from `--config` (or defaults), overlaid with explicit flags
    fn population_config(&self) -> Result<PopulationConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => PopulationConfig::default(),
        };

        if let Some(size) = self.population_size {
            config.population_size = size;
        }
        if let Some(rounds) = self.rounds_per_match {
            config.rounds_per_match = rounds;
        }
        if let Some(rate) = self.mutation_rate {
            config.mutation_rate = rate;
        }
        if let Some(rate) = self.noise_rate {
            config.noise_rate = rate;
        }

        Ok(config)
    }
}

fn load_config(path: &Path) -> Result<PopulationConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// Same stream the browser bindings produce for `seed`
fn seeded_rng(seed: u64) -> SeededRng {
    SeededRng::seed_from_u64(seed)
}

fn init_tracing(level: Level) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match level {
        Level::DEBUG => EnvFilter::new("trust_sandbox=debug,trust_engine=debug"),
        _ => EnvFilter::new(DEFAULT_FILTER),
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .ok();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(if cli.verbose { Level::DEBUG } else { Level::INFO });

    let config = cli.population_config()?;
    let mut population = Population::new(config).context("Invalid population settings")?;

    let seed = cli.seed.unwrap_or_else(rand::random);
    let mut rng = seeded_rng(seed);

    info!(
        seed,
        population_size = config.population_size,
        rounds_per_match = config.rounds_per_match,
        mutation_rate = config.mutation_rate,
        noise_rate = config.noise_rate,
        generations = cli.generations,
        "sandbox starting"
    );

    for _ in 0..cli.generations {
        let generation = population.generation() + 1;
        let matches = population.evolve(cli.log_matches, &mut rng);

        if cli.log_matches {
            info!("--- Generation {} ---", generation);
            for summary in &matches {
                info!(
                    "{} {} ({}) vs {} {} ({})",
                    summary.agent_a.info().icon,
                    summary.agent_a.info().name,
                    summary.score_a,
                    summary.agent_b.info().icon,
                    summary.agent_b.info().name,
                    summary.score_b,
                );
            }
        }
    }

    let report = Report::new(seed, &population);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from([
            "trust-sandbox",
            "--population-size",
            "30",
            "--noise-rate",
            "0",
        ]);
        let config = cli.population_config().unwrap();

        assert_eq!(config.population_size, 30);
        assert_eq!(config.noise_rate, 0.0);
        assert_eq!(config.rounds_per_match, 10);
        assert_eq!(config.mutation_rate, 0.05);
        assert_eq!(cli.generations, 50);
    }

    #[test]
    fn test_config_file_overlay() {
        let path = std::env::temp_dir().join(format!("trust-sandbox-{}.json", std::process::id()));
        fs::write(&path, r#"{ "population_size": 12, "rounds_per_match": 4 }"#).unwrap();

        let cli = Cli::parse_from([
            "trust-sandbox",
            "--config",
            path.to_str().unwrap(),
            "--rounds-per-match",
            "7",
        ]);
        let config = cli.population_config().unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(config.population_size, 12);
        assert_eq!(config.rounds_per_match, 7);
        assert_eq!(config.noise_rate, 0.02);
    }

    #[test]
    fn test_seed_matches_seed_from_u64() {
        use rand::RngCore;

        let mut driver = seeded_rng(2024);
        let mut reference = SeededRng::seed_from_u64(2024);
        for _ in 0..16 {
            assert_eq!(driver.next_u64(), reference.next_u64());
        }
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let cli = Cli::parse_from(["trust-sandbox", "--config", "/nonexistent/trust.json"]);
        assert!(cli.population_config().is_err());
    }
}
