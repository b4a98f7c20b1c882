//! Probability bounds from two-sided decimal odds.
//!
//! Each side of a two-outcome market is priced with its own margin, so
//! neither quote alone gives the fair probability. The home quote gives
//! an upper bound on the home probability (`1 / home_odds`) and the
//! away quote, read as "away does not win", gives a lower bound.
//!
//! Bounds are returned as computed. A crossed market (lower > upper) is
//! a data-quality signal for the caller, not an error here.

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Lower and upper bound on the home-side probability at one handicap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityBounds {
    /// Probability implied by the away quote's complement.
    pub lower: f64,
    /// Probability implied directly by the home quote.
    pub upper: f64,
}

impl ProbabilityBounds {
    /// Distance between the bounds; the fitter's per-point sigma.
    pub fn width(&self) -> f64 {
        (self.upper - self.lower).abs()
    }

    /// Plain average of the two bounds.
    pub fn midpoint(&self) -> f64 {
        (self.upper + self.lower) / 2.0
    }

    /// True when the away quote implies more than the home quote allows.
    pub fn is_crossed(&self) -> bool {
        self.lower > self.upper
    }
}

/// Rejects anything that is not a finite decimal odd above 1.
pub fn validate_odds(odds: f64) -> Result<f64, DomainError> {
    if odds.is_finite() && odds > 1.0 {
        Ok(odds)
    } else {
        Err(DomainError::InvalidOdds(odds))
    }
}

/// Converts a probability back into decimal odds.
pub fn odds_from_probability(term: &'static str, prob: f64) -> Result<f64, DomainError> {
    if prob.is_finite() && prob > 0.0 {
        Ok(1.0 / prob)
    } else {
        Err(DomainError::NonPositiveProbability { term, value: prob })
    }
}

/// Decimal odds of the complementary event using only this side's price.
///
/// `1 / (1 - 1/odds)`, so `1/odds + 1/complement_odds(odds) == 1`.
pub fn complement_odds(odds: f64) -> Result<f64, DomainError> {
    let odds = validate_odds(odds)?;
    Ok(1.0 / (1.0 - 1.0 / odds))
}

/// Probability bounds for the home side at a single handicap level.
pub fn bounds(home_odds: f64, away_odds: f64) -> Result<ProbabilityBounds, DomainError> {
    let upper = 1.0 / validate_odds(home_odds)?;
    let lower = 1.0 / complement_odds(away_odds)?;
    Ok(ProbabilityBounds { lower, upper })
}

/// Decimal odds for the calibrated midpoint between the two bounds.
///
/// `tail_penalty` leans the midpoint away from 0.5 in proportion to the
/// market width, correcting for a favourite/longshot bias in how a
/// bookmaker spreads its margin. Zero gives the plain midpoint.
pub fn midpoint(home_odds: f64, away_odds: f64, tail_penalty: f64) -> Result<f64, DomainError> {
    let b = bounds(home_odds, away_odds)?;
    let mid = b.midpoint();
    let lean = (mid - 0.5) * tail_penalty * (b.upper - b.lower) / 2.0;
    odds_from_probability("midpoint", mid + lean)
}
