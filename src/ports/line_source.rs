//! Line Source Port - Bookmaker Line Retrieval Interface
//!
//! Each bookmaker exposes its moneyline, spread and alternate lines in
//! its own response shape. Implementors reduce that shape to
//! `LineRecord`s with home-normalized handicaps and valid decimal odds.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::line::LineRecord;

/// Team names as listed by the bookmaker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Teams {
  /// Home team.
  pub home: String,
  /// Away team.
  pub away: String,
}

/// Everything one bookmaker lists for one event.
#[derive(Debug, Clone, Serialize)]
pub struct EventLines {
  /// Home and away team names.
  pub teams: Teams,
  /// Normalized quotes (price > 1, handicap positive favours home).
  pub records: Vec<LineRecord>,
}

/// Trait for bookmaker line providers.
///
/// Transport, parsing and any per-request headers stay inside the
/// implementor; the domain only sees `EventLines`.
#[async_trait]
pub trait LineSource: Send + Sync {
  /// Short bookmaker name used in logs and reports.
  fn bookmaker(&self) -> &str;

  /// Fetch every line quote listed for the event.
  ///
  /// # Errors
  /// Returns error on transport failure or an unrecognised response.
  async fn fetch_lines(&self, event_id: &str) -> anyhow::Result<EventLines>;
}
