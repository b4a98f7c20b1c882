//! PointsBet Adapter - Event Lines
//!
//! Reads moneyline, point-spread and pick-your-own-line markets from a
//! PointsBet event. Outcomes carry an explicit side and the points from
//! that side's view, so the away points are negated onto the home axis.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use super::client::BookmakerClient;
use super::types::PointsBetEventResponse;
use crate::domain::line::{LineRecord, MarketKind, Side};
use crate::ports::line_source::{EventLines, LineSource, Teams};

fn market_kind(event_class: &str) -> Option<MarketKind> {
  match event_class {
    "Moneyline" => Some(MarketKind::Moneyline),
    "Point Spread" => Some(MarketKind::Spread),
    "Pick Your Own Line" => Some(MarketKind::Custom),
    _ => None,
  }
}

/// Convert a PointsBet event response into normalized lines.
pub fn parse_pointsbet_lines(response: &PointsBetEventResponse) -> EventLines {
  let teams = Teams {
    home: response.home_team.clone(),
    away: response.away_team.clone(),
  };

  let mut records = Vec::new();
  for market in &response.fixed_odds_markets {
    let Some(kind) = market_kind(&market.event_class) else {
      continue;
    };

    for outcome in &market.outcomes {
      let side = if outcome.side == "Home" { Side::Home } else { Side::Away };
      let points = match (kind, outcome.points) {
        (MarketKind::Moneyline, _) => 0.0,
        (_, Some(points)) => points,
        (_, None) => {
          warn!(event_class = %market.event_class, "PointsBet outcome has no points, skipping");
          continue;
        }
      };
      let handicap = match side {
        Side::Home => points,
        Side::Away => -points,
      };

      // PointsBet does not price same-game multis through this feed.
      match LineRecord::new(handicap, side, outcome.price, kind, None) {
        Ok(record) => records.push(record),
        Err(e) => warn!(error = %e, "Invalid PointsBet quote, skipping"),
      }
    }
  }

  debug!(records = records.len(), "PointsBet lines parsed");
  EventLines { teams, records }
}

/// PointsBet line source.
pub struct PointsBetLineSource {
  client: Arc<BookmakerClient>,
  base_url: String,
}

impl PointsBetLineSource {
  /// Create a PointsBet line source.
  pub fn new(client: Arc<BookmakerClient>, base_url: impl Into<String>) -> Self {
    Self {
      client,
      base_url: base_url.into(),
    }
  }
}

#[async_trait]
impl LineSource for PointsBetLineSource {
  fn bookmaker(&self) -> &str {
    "pointsbet"
  }

  #[instrument(skip(self), name = "pointsbet_fetch_lines")]
  async fn fetch_lines(&self, event_id: &str) -> Result<EventLines> {
    let url = format!("{}/{}", self.base_url, event_id);
    let response: PointsBetEventResponse = self
      .client
      .get_json(&url, &[])
      .await
      .context("Failed to fetch PointsBet event")?;
    Ok(parse_pointsbet_lines(&response))
  }
}
