//! Multi Sweep - Same-Game-Multi Value Search
//!
//! Walks every pair of populated handicap levels at least `min_gap`
//! apart, asks the bookmaker to price "away at the lower line + home at
//! the higher line" as a same-game multi, and sets the quoted price
//! against the theoretical interval from the two legs' own markets.
//!
//! Pricing calls run one at a time. A pair the bookmaker will not price
//! is logged and skipped; the sweep itself never fails. A priced pair is
//! always kept, even when its legs' markets overlap too much to give a
//! theoretical interval.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::line::{LineLadder, LineRecord, PopulatedLevel};
use crate::domain::margin::{self, MarginQuote};
use crate::domain::odds::validate_odds;
use crate::ports::combo_pricer::ComboPricer;

/// Default minimum distance between the two handicaps of a pair.
pub const DEFAULT_MIN_GAP: f64 = 1.0;

/// Two levels whose opposing legs form a candidate multi.
#[derive(Debug, Clone, Copy)]
pub struct CandidatePair<'a> {
  /// Lower handicap level; supplies the away leg.
  pub low: PopulatedLevel<'a>,
  /// Higher handicap level; supplies the home leg.
  pub high: PopulatedLevel<'a>,
}

impl CandidatePair<'_> {
  /// Away quote at the lower level.
  pub fn leg_a(&self) -> &LineRecord {
    self.low.away
  }

  /// Home quote at the higher level.
  pub fn leg_b(&self) -> &LineRecord {
    self.high.home
  }

  /// Theoretical interval for this pair's multi.
  pub fn quote(&self) -> Result<MarginQuote, DomainError> {
    margin::combine(
      self.low.away.price(),
      self.low.home.price(),
      self.high.home.price(),
      self.high.away.price(),
    )
  }
}

/// A priced pair.
#[derive(Debug, Clone, Serialize)]
pub struct SweepResult {
  /// Away leg at the lower handicap.
  pub leg_a: LineRecord,
  /// Home leg at the higher handicap.
  pub leg_b: LineRecord,
  /// Bookmaker's quoted multi price.
  pub observed_odds: f64,
  /// Theoretical interval from the legs' own markets, or why there is
  /// none for this pair.
  pub quote: Result<MarginQuote, DomainError>,
}

impl SweepResult {
  /// Expected return against the theoretical price.
  pub fn edge(&self) -> Option<f64> {
    self.quote.as_ref().ok().map(|q| q.edge(self.observed_odds))
  }

  /// Expected return against each end of the interval, worst first.
  pub fn edge_bounds(&self) -> Option<(f64, f64)> {
    self.quote.as_ref().ok().map(|q| q.edge_bounds(self.observed_odds))
  }

  /// Whether the quoted price beats theory by more than `min_edge`.
  /// `None` when the pair has no theoretical interval.
  pub fn is_value(&self, min_edge: f64) -> Option<bool> {
    self.edge().map(|edge| edge > min_edge)
  }
}

/// Sorts results by edge, best first. Ties keep sweep order; results
/// without a theoretical interval are dropped.
pub fn rank_by_edge(results: Vec<SweepResult>) -> Vec<SweepResult> {
  let mut ranked: Vec<(f64, SweepResult)> = results
    .into_iter()
    .filter_map(|r| r.edge().map(|edge| (edge, r)))
    .collect();
  ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
  ranked.into_iter().map(|(_, r)| r).collect()
}

/// Every candidate pair in ascending `(i, j)` order.
pub fn candidate_pairs(ladder: &LineLadder, min_gap: f64) -> Vec<CandidatePair<'_>> {
  let levels: Vec<_> = ladder.populated().collect();
  let mut pairs = Vec::new();
  for (i, low) in levels.iter().enumerate() {
    for high in &levels[i + 1..] {
      if high.handicap.value() - low.handicap.value() < min_gap {
        continue;
      }
      pairs.push(CandidatePair {
        low: *low,
        high: *high,
      });
    }
  }
  pairs
}

/// Outcome of one sweep run.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
  /// Unique run identifier for log correlation.
  pub run_id: Uuid,
  /// When the sweep finished.
  pub completed_at: DateTime<Utc>,
  /// Pairs that passed the gap rule.
  pub candidates: usize,
  /// Priced pairs in sweep order.
  pub results: Vec<SweepResult>,
}

impl SweepReport {
  /// Results beating theory by more than `min_edge`, best first.
  pub fn value_bets(&self, min_edge: f64) -> Vec<SweepResult> {
    rank_by_edge(
      self
        .results
        .iter()
        .filter(|r| r.is_value(min_edge) == Some(true))
        .cloned()
        .collect(),
    )
  }
}

/// Sequential same-game-multi sweep over one ladder.
pub struct MultiSweep<P: ComboPricer + ?Sized> {
  /// Combination price provider.
  pricer: Arc<P>,
  /// Minimum handicap distance between the two levels.
  min_gap: f64,
}

impl<P: ComboPricer + ?Sized> MultiSweep<P> {
  /// Create a sweep with the default one-point gap.
  pub fn new(pricer: Arc<P>) -> Self {
    Self {
      pricer,
      min_gap: DEFAULT_MIN_GAP,
    }
  }

  /// Override the minimum gap.
  pub fn with_min_gap(mut self, min_gap: f64) -> Self {
    self.min_gap = min_gap;
    self
  }

  /// Price every candidate pair and return the successes in order.
  #[instrument(skip(self, ladder), fields(levels = ladder.populated_count()))]
  pub async fn run(&self, ladder: &LineLadder) -> Vec<SweepResult> {
    let pairs = candidate_pairs(ladder, self.min_gap);
    let mut results = Vec::with_capacity(pairs.len());

    for pair in &pairs {
      if let Some(result) = self.price_pair(pair).await {
        results.push(result);
      }
    }

    info!(
      candidates = pairs.len(),
      priced = results.len(),
      "Multi sweep complete"
    );
    results
  }

  /// Run the sweep and wrap the results with run metadata.
  pub async fn report(&self, ladder: &LineLadder) -> SweepReport {
    let run_id = Uuid::new_v4();
    let candidates = candidate_pairs(ladder, self.min_gap).len();
    let results = self.run(ladder).await;
    SweepReport {
      run_id,
      completed_at: Utc::now(),
      candidates,
      results,
    }
  }

  async fn price_pair(&self, pair: &CandidatePair<'_>) -> Option<SweepResult> {
    let low = pair.low.handicap;
    let high = pair.high.handicap;

    let (Some(id_a), Some(id_b)) = (pair.leg_a().leg_id(), pair.leg_b().leg_id()) else {
      debug!(%low, %high, "Pair has no leg identifiers, skipping");
      return None;
    };

    let observed_odds = match self.pricer.quote_combo(id_a, id_b).await {
      Ok(odds) => match validate_odds(odds) {
        Ok(odds) => odds,
        Err(e) => {
          warn!(%low, %high, error = %e, "Combo quote is not a valid price");
          return None;
        }
      },
      Err(e) => {
        warn!(%low, %high, error = %e, "Combo quote failed, skipping pair");
        return None;
      }
    };

    let quote = pair.quote();
    match &quote {
      Ok(q) => {
        if !q.is_ordered() {
          warn!(%low, %high, quote = ?q, "Theoretical interval out of order, check input lines");
        }
        debug!(
          %low,
          %high,
          observed_odds,
          theoretical = q.theoretical_odds,
          edge = q.edge(observed_odds),
          "Pair priced"
        );
      }
      Err(e) => debug!(%low, %high, observed_odds, error = %e, "Pair priced, no theoretical interval"),
    }

    Some(SweepResult {
      leg_a: pair.leg_a().clone(),
      leg_b: pair.leg_b().clone(),
      observed_odds,
      quote,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::line::{LegId, MarketKind, Side};

  fn level(h: f64, home: f64, away: f64) -> [LineRecord; 2] {
    [
      LineRecord::new(h, Side::Home, home, MarketKind::Custom, Some(LegId::new(format!("H{h}"))))
        .unwrap(),
      LineRecord::new(h, Side::Away, away, MarketKind::Custom, Some(LegId::new(format!("A{h}"))))
        .unwrap(),
    ]
  }

  #[test]
  fn test_gap_rule_excludes_close_levels() {
    let ladder = LineLadder::from_records(
      [level(-6.5, 3.2, 1.3), level(-6.0, 3.1, 1.32), level(4.5, 1.6, 2.3)]
        .into_iter()
        .flatten(),
    );
    let pairs = candidate_pairs(&ladder, DEFAULT_MIN_GAP);
    let spans: Vec<(f64, f64)> = pairs
      .iter()
      .map(|p| (p.low.handicap.value(), p.high.handicap.value()))
      .collect();
    assert_eq!(spans, vec![(-6.5, 4.5), (-6.0, 4.5)]);
  }

  #[test]
  fn test_pair_legs_are_low_away_and_high_home() {
    let ladder = LineLadder::from_records(
      [level(-4.5, 2.5, 1.5), level(4.5, 1.5, 2.5)].into_iter().flatten(),
    );
    let pairs = candidate_pairs(&ladder, DEFAULT_MIN_GAP);
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].leg_a().leg_id().unwrap().as_str(), "A-4.5");
    assert_eq!(pairs[0].leg_b().leg_id().unwrap().as_str(), "H4.5");
  }

  #[test]
  fn test_half_populated_levels_are_not_candidates() {
    let mut records: Vec<LineRecord> = level(-4.5, 2.5, 1.5).into();
    records.push(
      LineRecord::new(9.5, Side::Home, 1.2, MarketKind::Custom, Some(LegId::new("H9.5"))).unwrap(),
    );
    let ladder = LineLadder::from_records(records);
    assert!(candidate_pairs(&ladder, DEFAULT_MIN_GAP).is_empty());
  }

  #[test]
  fn test_rank_by_edge_orders_best_first() {
    let ladder = LineLadder::from_records(
      [level(-4.5, 2.5, 1.5), level(4.5, 1.5, 2.5)].into_iter().flatten(),
    );
    let pair = candidate_pairs(&ladder, DEFAULT_MIN_GAP)[0];
    let quote = pair.quote().unwrap();
    let make = |observed_odds| SweepResult {
      leg_a: pair.leg_a().clone(),
      leg_b: pair.leg_b().clone(),
      observed_odds,
      quote: Ok(quote),
    };
    let unquoted = SweepResult {
      quote: Err(DomainError::NonPositiveProbability {
        term: "lower bound",
        value: -0.1,
      }),
      ..make(9.0)
    };
    let ranked = rank_by_edge(vec![make(3.0), unquoted, make(4.0), make(3.5)]);
    let prices: Vec<f64> = ranked.iter().map(|r| r.observed_odds).collect();
    assert_eq!(prices, vec![4.0, 3.5, 3.0]);
  }

  #[test]
  fn test_result_without_interval_has_no_edge() {
    let ladder = LineLadder::from_records(
      [level(-1.5, 1.95, 1.95), level(0.0, 1.9, 1.95)].into_iter().flatten(),
    );
    let pair = candidate_pairs(&ladder, DEFAULT_MIN_GAP)[0];
    let result = SweepResult {
      leg_a: pair.leg_a().clone(),
      leg_b: pair.leg_b().clone(),
      observed_odds: 4.0,
      quote: pair.quote(),
    };
    assert!(result.quote.is_err());
    assert_eq!(result.edge(), None);
    assert_eq!(result.edge_bounds(), None);
    assert_eq!(result.is_value(0.0), None);
  }
}
