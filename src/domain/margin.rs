//! Same-game-multi pricing for two opposing lines.
//!
//! Backing the away side at a low handicap and the home side at a
//! higher handicap wins only when the final margin lands between the two
//! lines. Both legs come from the same event, so the joint probability
//! is `P(A) + P(B) - 1` (the two losing regions cannot overlap). Each
//! leg's own two-sided market bounds P(A) and P(B), which gives a
//! Fréchet-style interval for the multi plus a margin-normalised point
//! estimate inside it.

use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::odds::{odds_from_probability, validate_odds};

/// Theoretical decimal odds for a two-leg multi.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginQuote {
    /// Shortest fair price (from the upper probability bound).
    pub lower_bound_odds: f64,
    /// Margin-normalised point estimate.
    pub theoretical_odds: f64,
    /// Longest fair price (from the lower probability bound).
    pub upper_bound_odds: f64,
}

impl MarginQuote {
    /// `lower_bound <= theoretical <= upper_bound`.
    ///
    /// Holds for self-consistent markets; a false result flags bad data.
    pub fn is_ordered(&self) -> bool {
        self.lower_bound_odds <= self.theoretical_odds
            && self.theoretical_odds <= self.upper_bound_odds
    }

    /// Expected return of a price against the point estimate.
    pub fn edge(&self, observed_odds: f64) -> f64 {
        observed_odds / self.theoretical_odds - 1.0
    }

    /// Expected return of a price against each end of the interval,
    /// worst case first.
    pub fn edge_bounds(&self, observed_odds: f64) -> (f64, f64) {
        (
            observed_odds / self.upper_bound_odds - 1.0,
            observed_odds / self.lower_bound_odds - 1.0,
        )
    }
}

/// Prices the multi formed by two legs from different handicap levels.
///
/// `leg_a` and `leg_b` are the prices of the two selections actually
/// combined; `opposing_a` and `opposing_b` are the other side of each
/// leg's own market. Which level supplies which leg is fixed by the
/// caller.
pub fn combine(
    leg_a: f64,
    opposing_a: f64,
    leg_b: f64,
    opposing_b: f64,
) -> Result<MarginQuote, DomainError> {
    let (leg_a, opposing_a) = (validate_odds(leg_a)?, validate_odds(opposing_a)?);
    let (leg_b, opposing_b) = (validate_odds(leg_b)?, validate_odds(opposing_b)?);

    let book_a = 1.0 / leg_a + 1.0 / opposing_a;
    let book_b = 1.0 / leg_b + 1.0 / opposing_b;

    let lower_prob = (1.0 - 1.0 / opposing_a) + (1.0 - 1.0 / opposing_b) - 1.0;
    let theoretical_prob = (1.0 / leg_a) / book_a + (1.0 / leg_b) / book_b - 1.0;
    let upper_prob = 1.0 / leg_a + 1.0 / leg_b - 1.0;

    // Smallest probability first so the error names the term that broke.
    let upper_bound_odds = odds_from_probability("lower bound", lower_prob)?;
    let theoretical_odds = odds_from_probability("theoretical", theoretical_prob)?;
    let lower_bound_odds = odds_from_probability("upper bound", upper_prob)?;

    Ok(MarginQuote {
        lower_bound_odds,
        theoretical_odds,
        upper_bound_odds,
    })
}
