//! Payoff table for the Prisoner's Dilemma
//!
//! The table is directional: an outcome is keyed by (own move, other move)
//! and carries the award for each side.

use serde::{Deserialize, Serialize};
use crate::strategy::Move;

/// Points awarded to both sides for one outcome
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payoff {
    pub player: i32,
    pub opponent: i32,
}

impl Payoff {
    pub const fn new(player: i32, opponent: i32) -> Self {
        Self { player, opponent }
    }
}

/// Four-outcome payoff table
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoffTable {
    pub both_cooperate: Payoff,
    pub player_cooperate_opp_defect: Payoff,
    pub player_defect_opp_cooperate: Payoff,
    pub both_defect: Payoff,
}

impl PayoffTable {
    /// Canonical payoffs: R=3, S=0, T=5, P=1
    pub const DEFAULT: PayoffTable = PayoffTable {
        both_cooperate: Payoff::new(3, 3),
        player_cooperate_opp_defect: Payoff::new(0, 5),
        player_defect_opp_cooperate: Payoff::new(5, 0),
        both_defect: Payoff::new(1, 1),
    };

    /// Build a symmetric table from the four classic parameters
    pub fn symmetric(reward: i32, sucker: i32, temptation: i32, punishment: i32) -> Self {
        Self {
            both_cooperate: Payoff::new(reward, reward),
            player_cooperate_opp_defect: Payoff::new(sucker, temptation),
            player_defect_opp_cooperate: Payoff::new(temptation, sucker),
            both_defect: Payoff::new(punishment, punishment),
        }
    }

    /// Look up the outcome for (side A move, side B move)
    pub fn outcome(&self, a: Move, b: Move) -> Payoff {
        match (a, b) {
            (Move::Cooperate, Move::Cooperate) => self.both_cooperate,
            (Move::Cooperate, Move::Defect) => self.player_cooperate_opp_defect,
            (Move::Defect, Move::Cooperate) => self.player_defect_opp_cooperate,
            (Move::Defect, Move::Defect) => self.both_defect,
        }
    }

    fn reward(&self) -> i32 {
        self.both_cooperate.player
    }

    fn sucker(&self) -> i32 {
        self.player_cooperate_opp_defect.player
    }

    fn temptation(&self) -> i32 {
        self.player_defect_opp_cooperate.player
    }

    fn punishment(&self) -> i32 {
        self.both_defect.player
    }

    /// Defecting on a cooperator pays more than cooperating, and mutual
    /// cooperation beats mutual defection.
    ///
    /// Tables failing this are degenerate: nothing tempts anyone to betray,
    /// or cooperating is not worth sustaining.
    pub fn has_betrayal_incentive(&self) -> bool {
        self.temptation() > self.reward() && self.reward() > self.punishment()
    }

    /// Strict dilemma ordering T > R > P > S
    pub fn is_dilemma(&self) -> bool {
        self.has_betrayal_incentive() && self.punishment() > self.sucker()
    }
}

impl Default for PayoffTable {
    fn default() -> Self {
        Self::DEFAULT
    }
}
