//! Fitness-proportional (roulette-wheel) parent selection

use rand::Rng;

/// Roulette wheel over a scored roster
///
/// Slots are ranked by score, highest first (ties keep roster order), and
/// each carries weight `max(0, score)`.
#[derive(Clone, Debug)]
pub struct RouletteWheel {
    ranked: Vec<usize>,
    weights: Vec<f64>,
    total: f64,
}

impl RouletteWheel {
    pub fn new(scores: &[i64]) -> Self {
        let mut ranked: Vec<usize> = (0..scores.len()).collect();
        ranked.sort_by(|a, b| scores[*b].cmp(&scores[*a]));

        let weights: Vec<f64> = ranked.iter().map(|i| scores[*i].max(0) as f64).collect();
        let total = weights.iter().sum();

        Self { ranked, weights, total }
    }

    pub fn total_weight(&self) -> f64 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    /// Pick a roster index
    ///
    /// Draws in [0, total) and returns the first slot whose running weight
    /// reaches the draw. A zero total falls back to a uniform pick; a draw
    /// that rounding pushes past the last slot falls back to the top scorer.
    ///
    /// # Panics
    /// If the wheel is empty.
    pub fn spin<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        assert!(!self.is_empty(), "cannot spin an empty wheel");

        if self.total <= 0.0 {
            return self.ranked[rng.gen_range(0..self.ranked.len())];
        }

        let pick = rng.gen::<f64>() * self.total;
        let mut running = 0.0;
        for (slot, weight) in self.ranked.iter().zip(&self.weights) {
            running += weight;
            if running >= pick {
                return *slot;
            }
        }

        self.ranked[0]
    }
}
