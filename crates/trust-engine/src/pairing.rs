//! Opponent pairing for tournament matches
//!
//! Every agent challenges a fixed number of opponents drawn uniformly from
//! the whole roster. A draw that lands on the challenger itself is wasted
//! rather than redrawn, so unlucky agents play fewer matches.

use rand::Rng;

/// Matches each agent initiates per tournament
pub const MATCHES_PER_AGENT: usize = 5;

/// Draw an opponent for `challenger`; `None` when the draw hits itself
pub fn draw_opponent<R: Rng + ?Sized>(
    roster_len: usize,
    challenger: usize,
    rng: &mut R,
) -> Option<usize> {
    if roster_len == 0 {
        return None;
    }
    let opponent = rng.gen_range(0..roster_len);
    (opponent != challenger).then_some(opponent)
}

/// Generate the tournament's ordered pairings
///
/// Challengers go in roster order, each with `matches_per_agent` draws.
/// Self-draws are dropped, so the result holds at most
/// `roster_len * matches_per_agent` pairs.
pub fn generate_pairings<R: Rng + ?Sized>(
    roster_len: usize,
    matches_per_agent: usize,
    rng: &mut R,
) -> Vec<(usize, usize)> {
    let mut pairings = Vec::with_capacity(roster_len * matches_per_agent);
    for challenger in 0..roster_len {
        for _ in 0..matches_per_agent {
            if let Some(opponent) = draw_opponent(roster_len, challenger, rng) {
                pairings.push((challenger, opponent));
            }
        }
    }
    pairings
}

/// Mutably borrow two distinct roster slots at once
///
/// # Panics
/// If `a == b` or either index is out of bounds.
pub fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    assert_ne!(a, b, "cannot pair a slot with itself");
    if a < b {
        let (left, right) = items.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}
