//! Strategy definitions and execution

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::random::chance;

/// A move in the Prisoner's Dilemma
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Cooperate,
    Defect,
}

impl Move {
    /// The other move
    pub fn flip(self) -> Self {
        match self {
            Move::Cooperate => Move::Defect,
            Move::Defect => Move::Cooperate,
        }
    }
}

/// Decision policy an agent follows
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Always cooperate, never defect.
    Cooperator,
    /// Always defect, never cooperate.
    Defector,
    /// Copy opponent's last move. Start with cooperate.
    TitForTat,
    /// Cooperate until opponent defects once, then always defect.
    Grudger,
    /// Coin flip each round.
    Random,
    /// Probe with C, D, C, C; exploit if never punished, else Tit-for-Tat.
    Detective,
}

/// Detective's fixed opening moves
const DETECTIVE_PROBE: [Move; 4] =
    [Move::Cooperate, Move::Defect, Move::Cooperate, Move::Cooperate];

impl Strategy {
    /// Every strategy, in enumeration order
    pub const ALL: [Strategy; 6] = [
        Strategy::Cooperator,
        Strategy::Defector,
        Strategy::TitForTat,
        Strategy::Grudger,
        Strategy::Random,
        Strategy::Detective,
    ];

    /// Position in `Strategy::ALL`
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stable identifier, as used in serialized form
    pub fn id(self) -> &'static str {
        match self {
            Strategy::Cooperator => "cooperator",
            Strategy::Defector => "defector",
            Strategy::TitForTat => "tit-for-tat",
            Strategy::Grudger => "grudger",
            Strategy::Random => "random",
            Strategy::Detective => "detective",
        }
    }

    /// Pick a strategy uniformly at random
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Strategy {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.id() == s)
            .ok_or_else(|| EngineError::UnknownStrategy(s.to_string()))
    }
}

/// Execute a strategy for one round, before noise
///
/// # Arguments
/// * `strategy` - The strategy to execute
/// * `opponent_history` - Opponent's past moves in the current match
/// * `round` - Current round number (0-indexed)
/// * `rng` - Random source (only Random draws from it)
pub fn execute_strategy<R: Rng + ?Sized>(
    strategy: Strategy,
    opponent_history: &[Move],
    round: u32,
    rng: &mut R,
) -> Move {
    match strategy {
        Strategy::Cooperator => Move::Cooperate,
        Strategy::Defector => Move::Defect,
        Strategy::TitForTat => execute_tit_for_tat(opponent_history),
        Strategy::Grudger => execute_grudger(opponent_history),
        Strategy::Random => execute_random(rng),
        Strategy::Detective => execute_detective(opponent_history, round),
    }
}

/// Flip `decision` with probability `noise_rate`
///
/// Draws only when `noise_rate > 0`, so noiseless play consumes no randomness.
pub fn apply_noise<R: Rng + ?Sized>(decision: Move, noise_rate: f64, rng: &mut R) -> Move {
    if noise_rate > 0.0 && chance(rng, noise_rate) {
        decision.flip()
    } else {
        decision
    }
}

/// Tit-for-Tat: Copy opponent's last move, start with cooperate
fn execute_tit_for_tat(opponent_history: &[Move]) -> Move {
    opponent_history.last().copied().unwrap_or(Move::Cooperate)
}

/// Grudger: Cooperate until opponent defects, then always defect
fn execute_grudger(opponent_history: &[Move]) -> Move {
    if opponent_history.contains(&Move::Defect) {
        Move::Defect
    } else {
        Move::Cooperate
    }
}

/// Random: fair coin
fn execute_random<R: Rng + ?Sized>(rng: &mut R) -> Move {
    if chance(rng, 0.5) {
        Move::Cooperate
    } else {
        Move::Defect
    }
}

/// Detective: C, D, C, C, then adapt
///
/// An opponent that never retaliated during the probe is exploited for the
/// rest of the match; one that did gets Tit-for-Tat.
fn execute_detective(opponent_history: &[Move], round: u32) -> Move {
    if let Some(probe) = DETECTIVE_PROBE.get(round as usize) {
        return *probe;
    }

    let retaliated = opponent_history
        .iter()
        .take(DETECTIVE_PROBE.len())
        .any(|m| *m == Move::Defect);

    if retaliated {
        execute_tit_for_tat(opponent_history)
    } else {
        Move::Defect
    }
}
