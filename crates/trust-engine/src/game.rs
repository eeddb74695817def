//! Match execution engine

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::agent::Agent;
use crate::error::{check_probability, EngineError, Result};
use crate::payoff::PayoffTable;
use crate::strategy::{Move, Strategy};

/// Upper bound on rounds reserved up front; longer matches grow on demand
const RESERVE_LIMIT: u32 = 1024;

/// Result of a single round
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub round: u32,
    pub move_a: Move,
    pub move_b: Move,
    pub payoff_a: i32,
    pub payoff_b: i32,
}

/// Score snapshot for both sides
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub agent_a: i64,
    pub agent_b: i64,
}

/// Result of a complete standalone match
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchResult {
    pub rounds: Vec<RoundResult>,
    pub total_score_a: i64,
    pub total_score_b: i64,
    pub round_count: u32,
}

/// A fixed-length match between two agents
///
/// In progress while `current_round < rounds`, complete afterwards.
/// Scores and memories accumulate on the borrowed agents, so an agent can
/// carry one running total through several matches.
#[derive(Debug)]
pub struct Match<'a> {
    agent_a: &'a mut Agent,
    agent_b: &'a mut Agent,
    rounds: u32,
    noise_rate: f64,
    payoffs: PayoffTable,
    current_round: u32,
    history: Vec<RoundResult>,
    // Opponent-memory length at kickoff; decisions only see moves past it
    offset_a: usize,
    offset_b: usize,
}

impl<'a> Match<'a> {
    /// Noiseless match on the default payoff table
    pub fn new(agent_a: &'a mut Agent, agent_b: &'a mut Agent, rounds: u32) -> Result<Self> {
        if rounds == 0 {
            return Err(EngineError::InvalidRoundCount(rounds));
        }
        Ok(Self::assemble(agent_a, agent_b, rounds, 0.0, PayoffTable::DEFAULT))
    }

    /// Build from parameters the caller has already validated
    pub(crate) fn assemble(
        agent_a: &'a mut Agent,
        agent_b: &'a mut Agent,
        rounds: u32,
        noise_rate: f64,
        payoffs: PayoffTable,
    ) -> Self {
        let offset_a = agent_a.opponent_memory().len();
        let offset_b = agent_b.opponent_memory().len();

        Self {
            agent_a,
            agent_b,
            rounds,
            noise_rate,
            payoffs,
            current_round: 0,
            history: Vec::with_capacity(rounds.min(RESERVE_LIMIT) as usize),
            offset_a,
            offset_b,
        }
    }

    pub fn with_noise(mut self, noise_rate: f64) -> Result<Self> {
        check_probability("noise_rate", noise_rate)?;
        self.noise_rate = noise_rate;
        Ok(self)
    }

    pub fn with_payoffs(mut self, payoffs: PayoffTable) -> Self {
        if !payoffs.has_betrayal_incentive() {
            warn!(?payoffs, "payoff table has no betrayal incentive; the game is not a dilemma");
        }
        self.payoffs = payoffs;
        self
    }

    pub fn is_over(&self) -> bool {
        self.current_round >= self.rounds
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn noise_rate(&self) -> f64 {
        self.noise_rate
    }

    pub fn payoffs(&self) -> &PayoffTable {
        &self.payoffs
    }

    pub fn history(&self) -> &[RoundResult] {
        &self.history
    }

    /// Current totals; valid mid-match
    pub fn scores(&self) -> Scores {
        Scores {
            agent_a: self.agent_a.score(),
            agent_b: self.agent_b.score(),
        }
    }

    /// Play one round with both sides deciding
    ///
    /// Errors with `MatchComplete` once every round has been played.
    pub fn play_round<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<RoundResult> {
        self.ensure_in_progress()?;
        let move_a = self.decide_a(rng);
        let move_b = self.decide_b(rng);
        Ok(self.resolve(move_a, move_b))
    }

    /// Play one round where side A's move comes from outside (a human)
    ///
    /// Side B still follows its strategy and noise.
    pub fn play_round_with<R: Rng + ?Sized>(
        &mut self,
        move_a: Move,
        rng: &mut R,
    ) -> Result<RoundResult> {
        self.ensure_in_progress()?;
        let move_b = self.decide_b(rng);
        Ok(self.resolve(move_a, move_b))
    }

    /// Play every remaining round
    pub fn play_all<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<RoundResult> {
        let remaining = self.rounds - self.current_round;
        let mut results = Vec::with_capacity(remaining.min(RESERVE_LIMIT) as usize);
        while !self.is_over() {
            let move_a = self.decide_a(rng);
            let move_b = self.decide_b(rng);
            results.push(self.resolve(move_a, move_b));
        }
        results
    }

    fn ensure_in_progress(&self) -> Result<()> {
        if self.is_over() {
            Err(EngineError::MatchComplete { rounds: self.rounds })
        } else {
            Ok(())
        }
    }

    fn decide_a<R: Rng + ?Sized>(&self, rng: &mut R) -> Move {
        let seen = &self.agent_a.opponent_memory()[self.offset_a..];
        self.agent_a.decide(seen, self.current_round, self.noise_rate, rng)
    }

    fn decide_b<R: Rng + ?Sized>(&self, rng: &mut R) -> Move {
        let seen = &self.agent_b.opponent_memory()[self.offset_b..];
        self.agent_b.decide(seen, self.current_round, self.noise_rate, rng)
    }

    fn resolve(&mut self, move_a: Move, move_b: Move) -> RoundResult {
        let payoff = self.payoffs.outcome(move_a, move_b);

        self.agent_a.add_score(payoff.player);
        self.agent_b.add_score(payoff.opponent);

        self.agent_a.record_move(move_a, move_b);
        self.agent_b.record_move(move_b, move_a);

        let result = RoundResult {
            round: self.current_round,
            move_a,
            move_b,
            payoff_a: payoff.player,
            payoff_b: payoff.opponent,
        };
        self.history.push(result);
        self.current_round += 1;

        result
    }
}

/// Run a complete match between two fresh agents
///
/// # Arguments
/// * `strategy_a` - First player's strategy
/// * `strategy_b` - Second player's strategy
/// * `rounds` - Number of rounds
/// * `noise_rate` - Per-decision flip probability
/// * `payoffs` - Payoff table
/// * `rng` - Random source
pub fn run_match<R: Rng + ?Sized>(
    strategy_a: Strategy,
    strategy_b: Strategy,
    rounds: u32,
    noise_rate: f64,
    payoffs: PayoffTable,
    rng: &mut R,
) -> Result<MatchResult> {
    let mut agent_a = Agent::new(strategy_a);
    let mut agent_b = Agent::new(strategy_b);

    let mut game = Match::new(&mut agent_a, &mut agent_b, rounds)?
        .with_noise(noise_rate)?
        .with_payoffs(payoffs);
    let played = game.play_all(rng);
    let scores = game.scores();

    Ok(MatchResult {
        rounds: played,
        total_score_a: scores.agent_a,
        total_score_b: scores.agent_b,
        round_count: rounds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payoff::Payoff;
    use crate::random::SeededRng;
    use rand::SeedableRng;

    fn make_rng() -> SeededRng {
        SeededRng::seed_from_u64(42)
    }

    #[test]
    fn test_cooperator_vs_defector() {
        let mut rng = make_rng();
        for n in [1u32, 5, 10, 37] {
            let result = run_match(
                Strategy::Cooperator,
                Strategy::Defector,
                n,
                0.0,
                PayoffTable::DEFAULT,
                &mut rng,
            )
            .unwrap();
            assert_eq!(result.total_score_a, 0);
            assert_eq!(result.total_score_b, 5 * n as i64);
        }
    }

    #[test]
    fn test_tft_vs_tft() {
        let mut rng = make_rng();
        let result = run_match(
            Strategy::TitForTat,
            Strategy::TitForTat,
            10,
            0.0,
            PayoffTable::DEFAULT,
            &mut rng,
        )
        .unwrap();

        // TFT vs TFT: both start cooperating and continue cooperating
        for round in &result.rounds {
            assert_eq!(round.move_a, Move::Cooperate);
            assert_eq!(round.move_b, Move::Cooperate);
        }
        assert_eq!(result.total_score_a, 30);
        assert_eq!(result.total_score_b, 30);
    }

    #[test]
    fn test_grudger_vs_defector() {
        let mut rng = make_rng();
        let result = run_match(
            Strategy::Grudger,
            Strategy::Defector,
            10,
            0.0,
            PayoffTable::DEFAULT,
            &mut rng,
        )
        .unwrap();

        assert_eq!(result.rounds[0].move_a, Move::Cooperate);
        for round in result.rounds.iter().skip(1) {
            assert_eq!(round.move_a, Move::Defect);
        }
    }

    #[test]
    fn test_detective_vs_cooperator() {
        let mut rng = make_rng();
        let result = run_match(
            Strategy::Detective,
            Strategy::Cooperator,
            10,
            0.0,
            PayoffTable::DEFAULT,
            &mut rng,
        )
        .unwrap();

        let moves: Vec<_> = result.rounds.iter().map(|r| r.move_a).collect();
        assert_eq!(&moves[..4], &[Move::Cooperate, Move::Defect, Move::Cooperate, Move::Cooperate]);
        assert!(moves[4..].iter().all(|m| *m == Move::Defect));
    }

    #[test]
    fn test_detective_vs_tft_settles_into_tit_for_tat() {
        let mut rng = make_rng();
        let result = run_match(
            Strategy::Detective,
            Strategy::TitForTat,
            8,
            0.0,
            PayoffTable::DEFAULT,
            &mut rng,
        )
        .unwrap();

        // TFT answers the round-1 probe defection in round 2
        assert_eq!(result.rounds[2].move_b, Move::Defect);
        // Detective mirrors TFT from round 4 on
        for r in &result.rounds[4..] {
            assert_eq!(r.move_a, result.rounds[r.round as usize - 1].move_b);
        }
    }

    #[test]
    fn test_tft_vs_always_defect() {
        let mut rng = make_rng();
        let result = run_match(
            Strategy::TitForTat,
            Strategy::Defector,
            10,
            0.0,
            PayoffTable::DEFAULT,
            &mut rng,
        )
        .unwrap();

        // Round 0: TFT cooperates, AD defects
        assert_eq!(result.rounds[0].move_a, Move::Cooperate);
        assert_eq!(result.rounds[0].move_b, Move::Defect);

        // Round 1+: TFT retaliates, both defect
        for round in result.rounds.iter().skip(1) {
            assert_eq!(round.move_a, Move::Defect);
            assert_eq!(round.move_b, Move::Defect);
        }
    }

    #[test]
    fn test_custom_payoffs_awarded_per_side() {
        let table = PayoffTable {
            both_cooperate: Payoff::new(4, 2),
            player_cooperate_opp_defect: Payoff::new(-1, 7),
            player_defect_opp_cooperate: Payoff::new(6, -2),
            both_defect: Payoff::new(0, 1),
        };
        let mut rng = make_rng();

        let cases = [
            (Strategy::Cooperator, Strategy::Cooperator, Payoff::new(4, 2)),
            (Strategy::Cooperator, Strategy::Defector, Payoff::new(-1, 7)),
            (Strategy::Defector, Strategy::Cooperator, Payoff::new(6, -2)),
            (Strategy::Defector, Strategy::Defector, Payoff::new(0, 1)),
        ];
        for (a, b, expected) in cases {
            let result = run_match(a, b, 1, 0.0, table, &mut rng).unwrap();
            assert_eq!(result.rounds[0].payoff_a, expected.player);
            assert_eq!(result.rounds[0].payoff_b, expected.opponent);
            assert_eq!(result.total_score_a, expected.player as i64);
            assert_eq!(result.total_score_b, expected.opponent as i64);
        }
    }

    #[test]
    fn test_round_by_round_state_machine() {
        let mut a = Agent::new(Strategy::TitForTat);
        let mut b = Agent::new(Strategy::Defector);
        let mut rng = make_rng();
        let mut game = Match::new(&mut a, &mut b, 3).unwrap();

        assert!(!game.is_over());
        let first = game.play_round(&mut rng).unwrap();
        assert_eq!(first.round, 0);
        assert_eq!(game.current_round(), 1);
        assert_eq!(game.scores(), Scores { agent_a: 0, agent_b: 5 });

        game.play_round(&mut rng).unwrap();
        game.play_round(&mut rng).unwrap();
        assert!(game.is_over());
        assert_eq!(game.history().len(), 3);

        let err = game.play_round(&mut rng).unwrap_err();
        assert_eq!(err, EngineError::MatchComplete { rounds: 3 });
        assert_eq!(game.history().len(), 3);
        assert_eq!(game.scores(), Scores { agent_a: 2, agent_b: 7 });
    }

    #[test]
    fn test_play_all_only_plays_remaining() {
        let mut a = Agent::new(Strategy::Cooperator);
        let mut b = Agent::new(Strategy::Cooperator);
        let mut rng = make_rng();
        let mut game = Match::new(&mut a, &mut b, 5).unwrap();

        game.play_round(&mut rng).unwrap();
        let rest = game.play_all(&mut rng);
        assert_eq!(rest.len(), 4);
        assert_eq!(rest[0].round, 1);
        assert!(game.play_all(&mut rng).is_empty());
    }

    #[test]
    fn test_human_driven_side() {
        let mut human = Agent::new(Strategy::Cooperator);
        let mut bot = Agent::new(Strategy::TitForTat);
        let mut rng = make_rng();
        let mut game = Match::new(&mut human, &mut bot, 3).unwrap();

        let r0 = game.play_round_with(Move::Defect, &mut rng).unwrap();
        assert_eq!((r0.move_a, r0.move_b), (Move::Defect, Move::Cooperate));
        let r1 = game.play_round_with(Move::Cooperate, &mut rng).unwrap();
        assert_eq!((r1.move_a, r1.move_b), (Move::Cooperate, Move::Defect));
        assert_eq!(game.scores(), Scores { agent_a: 5, agent_b: 5 });
    }

    #[test]
    fn test_memories_recorded_from_each_side() {
        let mut a = Agent::new(Strategy::Cooperator);
        let mut b = Agent::new(Strategy::Defector);
        let mut rng = make_rng();
        Match::new(&mut a, &mut b, 2).unwrap().play_all(&mut rng);

        assert_eq!(a.memory(), &[Move::Cooperate, Move::Cooperate]);
        assert_eq!(a.opponent_memory(), &[Move::Defect, Move::Defect]);
        assert_eq!(b.memory(), &[Move::Defect, Move::Defect]);
        assert_eq!(b.opponent_memory(), &[Move::Cooperate, Move::Cooperate]);
        assert!(a.has_been_betrayed());
        assert!(!b.has_been_betrayed());
    }

    #[test]
    fn test_decisions_ignore_previous_matches() {
        let mut tft = Agent::new(Strategy::TitForTat);
        let mut rng = make_rng();

        let mut defector = Agent::new(Strategy::Defector);
        Match::new(&mut tft, &mut defector, 3).unwrap().play_all(&mut rng);

        // Fresh match: TFT opens with cooperation despite the last opponent
        let mut cooperator = Agent::new(Strategy::Cooperator);
        let mut game = Match::new(&mut tft, &mut cooperator, 2).unwrap();
        let first = game.play_round(&mut rng).unwrap();
        assert_eq!(first.move_a, Move::Cooperate);
        drop(game);

        // Score and memory still accumulate across both matches
        assert_eq!(tft.memory().len(), 4);
        assert_eq!(tft.score(), 2 + 3);
    }

    #[test]
    fn test_invalid_construction() {
        let mut a = Agent::new(Strategy::Cooperator);
        let mut b = Agent::new(Strategy::Cooperator);
        assert_eq!(
            Match::new(&mut a, &mut b, 0).unwrap_err(),
            EngineError::InvalidRoundCount(0)
        );

        let err = Match::new(&mut a, &mut b, 5).unwrap().with_noise(1.5).unwrap_err();
        assert!(matches!(err, EngineError::ProbabilityOutOfRange { field: "noise_rate", .. }));
    }

    #[test]
    fn test_huge_round_count_starts_without_reserving_everything() {
        let mut a = Agent::new(Strategy::Cooperator);
        let mut b = Agent::new(Strategy::Defector);
        let mut rng = make_rng();
        let mut game = Match::new(&mut a, &mut b, u32::MAX).unwrap();

        let first = game.play_round(&mut rng).unwrap();
        assert_eq!(first.round, 0);
        assert_eq!(game.rounds(), u32::MAX);
        assert!(!game.is_over());
        assert!(game.history.capacity() <= RESERVE_LIMIT as usize);
    }

    #[test]
    fn test_match_determinism() {
        let r1 = run_match(
            Strategy::Random,
            Strategy::TitForTat,
            20,
            0.1,
            PayoffTable::DEFAULT,
            &mut make_rng(),
        )
        .unwrap();
        let r2 = run_match(
            Strategy::Random,
            Strategy::TitForTat,
            20,
            0.1,
            PayoffTable::DEFAULT,
            &mut make_rng(),
        )
        .unwrap();
        assert_eq!(r1.rounds, r2.rounds);
    }
}
