//! End-of-run analysis

use std::fmt;

use serde::Serialize;

use trust_engine::{GenerationSnapshot, Population, PopulationConfig, Strategy};

#[derive(Debug, Serialize)]
pub struct StrategyCount {
    pub strategy: Strategy,
    pub count: usize,
    pub share: f64,
}

/// What a finished run looks like
#[derive(Debug, Serialize)]
pub struct Report {
    pub seed: u64,
    pub generations: u32,
    pub config: PopulationConfig,
    pub dominant: StrategyCount,
    pub surviving: Vec<Strategy>,
    pub extinct: Vec<Strategy>,
    pub distribution: Vec<StrategyCount>,
    pub insight: &'static str,
    pub parameter_insight: String,
    pub history: Vec<GenerationSnapshot>,
}

impl Report {
    pub fn new(seed: u64, population: &Population) -> Self {
        let distribution = population.distribution();
        let (dominant, count) = distribution.dominant();
        let config = *population.config();

        Self {
            seed,
            generations: population.generation(),
            config,
            dominant: StrategyCount {
                strategy: dominant,
                count,
                share: distribution.share(dominant),
            },
            surviving: distribution.surviving(),
            extinct: distribution.extinct(),
            distribution: distribution
                .iter()
                .map(|(strategy, count)| StrategyCount {
                    strategy,
                    count,
                    share: distribution.share(strategy),
                })
                .collect(),
            insight: strategy_insight(dominant),
            parameter_insight: parameter_insight(&config),
            history: population.history().to_vec(),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dominant = self.dominant.strategy.info();

        writeln!(f, "=== Results after {} generations ===", self.generations)?;
        writeln!(
            f,
            "Dominant strategy: {} {} ({} agents, {:.1}%)",
            dominant.icon,
            dominant.name,
            self.dominant.count,
            self.dominant.share * 100.0
        )?;
        writeln!(
            f,
            "Surviving strategies: {} out of {}",
            self.surviving.len(),
            Strategy::ALL.len()
        )?;
        if !self.extinct.is_empty() {
            let names: Vec<&str> = self.extinct.iter().map(|s| s.info().name).collect();
            writeln!(f, "Extinct: {}", names.join(", "))?;
        }
        writeln!(f)?;

        for entry in &self.distribution {
            let info = entry.strategy.info();
            writeln!(
                f,
                "  {} {:<12} {:>5}  {:>5.1}%",
                info.icon,
                info.name,
                entry.count,
                entry.share * 100.0
            )?;
        }

        writeln!(f)?;
        writeln!(f, "{}", self.insight)?;
        writeln!(f, "{}", self.parameter_insight)?;
        writeln!(f, "(seed {})", self.seed)
    }
}

fn strategy_insight(dominant: Strategy) -> &'static str {
    match dominant {
        Strategy::Cooperator => {
            "Pure cooperation dominated! This usually happens in low-noise environments where trust can flourish."
        }
        Strategy::Defector => {
            "Defection took over. This often happens when there's too much noise or when cooperative strategies can't establish themselves."
        }
        Strategy::TitForTat => {
            "Tit for Tat succeeded! This reciprocal strategy often wins in repeated games, rewarding cooperation and punishing defection."
        }
        Strategy::Grudger => {
            "Grudger dominated! While unforgiving, this strategy can thrive when betrayal is rare."
        }
        Strategy::Detective => {
            "Detective outsmarted the competition! This adaptive strategy exploits cooperative agents while defending against defectors."
        }
        Strategy::Random => "The population reached an interesting equilibrium.",
    }
}

fn parameter_insight(config: &PopulationConfig) -> String {
    let mut notes = Vec::new();

    if config.mutation_rate > 0.1 {
        notes.push("High mutation rate led to more diversity and unpredictability.");
    } else if config.mutation_rate == 0.0 {
        notes.push("With no mutations, strategies compete purely on merit.");
    }

    if config.noise_rate > 0.05 {
        notes.push("High noise made cooperation more difficult, as mistakes were common.");
    } else if config.noise_rate == 0.0 {
        notes.push("Perfect information allowed strategies to execute flawlessly.");
    }

    if config.rounds_per_match < 5 {
        notes.push("Short matches favored simple strategies.");
    } else if config.rounds_per_match > 12 {
        notes.push("Long matches allowed complex patterns to emerge.");
    }

    if notes.is_empty() {
        return "Try adjusting the parameters to see how they affect which strategies thrive!".to_string();
    }
    notes.join(" ")
}
