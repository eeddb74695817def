//! Simulated player: a fixed strategy plus per-tournament memory and score

use rand::Rng;
use serde::Serialize;

use crate::catalog::StrategyInfo;
use crate::strategy::{apply_noise, execute_strategy, Move, Strategy};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Agent {
    strategy: Strategy,
    memory: Vec<Move>,
    opponent_memory: Vec<Move>,
    score: i64,
    // Set on every opponent defection. No shipped strategy reads it.
    has_been_betrayed: bool,
}

impl Agent {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            memory: Vec::new(),
            opponent_memory: Vec::new(),
            score: 0,
            has_been_betrayed: false,
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Own moves, oldest first
    pub fn memory(&self) -> &[Move] {
        &self.memory
    }

    /// Opponent moves, index-aligned with `memory`
    pub fn opponent_memory(&self) -> &[Move] {
        &self.opponent_memory
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn has_been_betrayed(&self) -> bool {
        self.has_been_betrayed
    }

    /// Choose a move: strategy policy, then noise
    pub fn decide<R: Rng + ?Sized>(
        &self,
        opponent_history: &[Move],
        round: u32,
        noise_rate: f64,
        rng: &mut R,
    ) -> Move {
        let decision = execute_strategy(self.strategy, opponent_history, round, rng);
        apply_noise(decision, noise_rate, rng)
    }

    pub fn record_move(&mut self, own: Move, opponent: Move) {
        self.memory.push(own);
        self.opponent_memory.push(opponent);
        if opponent == Move::Defect {
            self.has_been_betrayed = true;
        }
    }

    /// Unclamped; custom payoffs may drive the score negative
    pub fn add_score(&mut self, points: i32) {
        self.score += i64::from(points);
    }

    /// Clear memories, score and betrayal flag; keep the strategy
    pub fn reset(&mut self) {
        self.memory.clear();
        self.opponent_memory.clear();
        self.score = 0;
        self.has_been_betrayed = false;
    }

    pub fn info(&self) -> &'static StrategyInfo {
        self.strategy.info()
    }
}
