//! Population evolution: tournament, selection, mutation, turnover

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span, trace};

use crate::agent::Agent;
use crate::error::{check_probability, EngineError, Result};
use crate::game::Match;
use crate::pairing::{generate_pairings, pair_mut, MATCHES_PER_AGENT};
use crate::payoff::PayoffTable;
use crate::random::chance;
use crate::selection::RouletteWheel;
use crate::strategy::Strategy;

/// Matches kept in a tournament log
pub const MATCH_LOG_LIMIT: usize = 20;

/// Simulation parameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub population_size: usize,
    pub rounds_per_match: u32,
    pub mutation_rate: f64,
    pub noise_rate: f64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            rounds_per_match: 10,
            mutation_rate: 0.05,
            noise_rate: 0.02,
        }
    }
}

impl PopulationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(EngineError::InvalidPopulationSize(self.population_size));
        }
        if self.rounds_per_match == 0 {
            return Err(EngineError::InvalidRoundCount(self.rounds_per_match));
        }
        check_probability("mutation_rate", self.mutation_rate)?;
        check_probability("noise_rate", self.noise_rate)?;
        Ok(())
    }
}

/// Head count per strategy, indexed like `Strategy::ALL`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    counts: [usize; 6],
}

impl Distribution {
    pub fn from_agents<'a>(agents: impl IntoIterator<Item = &'a Agent>) -> Self {
        let mut counts = [0usize; 6];
        for agent in agents {
            counts[agent.strategy().index()] += 1;
        }
        Self { counts }
    }

    pub fn get(&self, strategy: Strategy) -> usize {
        self.counts[strategy.index()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Fraction of the roster following `strategy`
    pub fn share(&self, strategy: Strategy) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.get(strategy) as f64 / total as f64,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Strategy, usize)> + '_ {
        Strategy::ALL.into_iter().zip(self.counts.iter().copied())
    }

    /// Most common strategy; ties go to the earliest in `Strategy::ALL`
    pub fn dominant(&self) -> (Strategy, usize) {
        self.iter()
            .fold((Strategy::ALL[0], self.counts[0]), |best, entry| {
                if entry.1 > best.1 {
                    entry
                } else {
                    best
                }
            })
    }

    pub fn surviving(&self) -> Vec<Strategy> {
        self.iter().filter(|(_, n)| *n > 0).map(|(s, _)| s).collect()
    }

    pub fn extinct(&self) -> Vec<Strategy> {
        self.iter().filter(|(_, n)| *n == 0).map(|(s, _)| s).collect()
    }
}

/// Distribution recorded at the start of a generation's turnover
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationSnapshot {
    pub generation: u32,
    pub distribution: Distribution,
}

/// One logged tournament match
///
/// Scores are each agent's running tournament total after the match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub agent_a: Strategy,
    pub agent_b: Strategy,
    pub score_a: i64,
    pub score_b: i64,
}

/// Fixed-size roster evolving under fitness-proportional selection
#[derive(Clone, Debug)]
pub struct Population {
    config: PopulationConfig,
    agents: Vec<Agent>,
    generation: u32,
    history: Vec<GenerationSnapshot>,
}

impl Population {
    pub fn new(config: PopulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            agents: initial_roster(config.population_size),
            config,
            generation: 0,
            history: Vec::new(),
        })
    }

    pub fn config(&self) -> &PopulationConfig {
        &self.config
    }

    pub fn population_size(&self) -> usize {
        self.config.population_size
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn history(&self) -> &[GenerationSnapshot] {
        &self.history
    }

    pub fn distribution(&self) -> Distribution {
        Distribution::from_agents(&self.agents)
    }

    /// Score every agent against random opponents
    ///
    /// Scores accumulate over all of an agent's matches, whether it
    /// challenged or was challenged. With `log_matches`, the first
    /// `MATCH_LOG_LIMIT` matches are summarised.
    pub fn run_tournament<R: Rng + ?Sized>(
        &mut self,
        log_matches: bool,
        rng: &mut R,
    ) -> Vec<MatchSummary> {
        for agent in &mut self.agents {
            agent.reset();
        }

        let mut log = Vec::new();
        let pairings = generate_pairings(self.agents.len(), MATCHES_PER_AGENT, rng);

        for (challenger, opponent) in pairings {
            let (agent_a, agent_b) = pair_mut(&mut self.agents, challenger, opponent);

            let mut game = Match::assemble(
                agent_a,
                agent_b,
                self.config.rounds_per_match,
                self.config.noise_rate,
                PayoffTable::DEFAULT,
            );
            game.play_all(rng);
            let scores = game.scores();

            trace!(
                challenger,
                opponent,
                score_a = scores.agent_a,
                score_b = scores.agent_b,
                "match played"
            );

            if log_matches && log.len() < MATCH_LOG_LIMIT {
                log.push(MatchSummary {
                    agent_a: self.agents[challenger].strategy(),
                    agent_b: self.agents[opponent].strategy(),
                    score_a: scores.agent_a,
                    score_b: scores.agent_b,
                });
            }
        }

        log
    }

    /// Advance one generation
    ///
    /// Runs the tournament, snapshots the distribution, then breeds a new
    /// roster: each child copies a roulette-selected parent's strategy, or
    /// with probability `mutation_rate` takes a uniformly random one.
    pub fn evolve<R: Rng + ?Sized>(&mut self, log_matches: bool, rng: &mut R) -> Vec<MatchSummary> {
        let span = info_span!("generation", generation = self.generation);
        let _enter = span.enter();

        let log = self.run_tournament(log_matches, rng);

        let distribution = self.distribution();
        self.history.push(GenerationSnapshot {
            generation: self.generation,
            distribution,
        });

        let scores: Vec<i64> = self.agents.iter().map(Agent::score).collect();
        let wheel = RouletteWheel::new(&scores);

        let mut offspring = Vec::with_capacity(self.config.population_size);
        for _ in 0..self.config.population_size {
            let parent = wheel.spin(rng);
            let mut strategy = self.agents[parent].strategy();
            if chance(rng, self.config.mutation_rate) {
                strategy = Strategy::random(rng);
            }
            offspring.push(Agent::new(strategy));
        }

        self.agents = offspring;
        self.generation += 1;

        debug!(
            total_fitness = wheel.total_weight(),
            before = ?distribution,
            after = ?self.distribution(),
            "generation evolved"
        );

        log
    }

    /// Evolve `count` generations, reporting after each
    pub fn run_generations<R, F>(&mut self, count: u32, rng: &mut R, mut on_generation: F)
    where
        R: Rng + ?Sized,
        F: FnMut(u32, &Distribution),
    {
        for _ in 0..count {
            self.evolve(false, rng);
            on_generation(self.generation, &self.distribution());
        }
    }

    /// Back to an even generation-0 roster with no history
    pub fn reset(&mut self) {
        self.agents = initial_roster(self.config.population_size);
        self.generation = 0;
        self.history.clear();
    }
}

/// Even split across strategies; the remainder goes to the first ones
fn initial_roster(size: usize) -> Vec<Agent> {
    let kinds = Strategy::ALL.len();
    let per_strategy = size / kinds;
    let remainder = size % kinds;

    Strategy::ALL
        .iter()
        .enumerate()
        .flat_map(|(i, strategy)| {
            let count = per_strategy + usize::from(i < remainder);
            std::iter::repeat(*strategy).take(count)
        })
        .map(Agent::new)
        .collect()
}
