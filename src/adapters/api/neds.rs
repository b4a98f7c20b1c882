//! Neds Adapter - Event Card Lines
//!
//! The Neds event card is a normalized document: participants, markets,
//! entrants and prices are separate ID-keyed maps. Lines come from three
//! places:
//! - markets grouped under "Alternate Lines" (entrant names carry the
//!   line, "Team +3.5");
//! - the "Head To Head" market (handicap 0);
//! - the "Line" market, whose `handicap` is quoted from the away side.
//!
//! Prices are fractional and keyed `"{entrant_id}:..."`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use super::client::BookmakerClient;
use super::split_team_line;
use super::types::{NedsEntrant, NedsEventCardResponse};
use crate::domain::line::{LineRecord, MarketKind, Side};
use crate::ports::line_source::{EventLines, LineSource, Teams};

const ALTERNATE_LINES_GROUP: &str = "Alternate Lines";

/// Browser headers the event-card endpoint expects.
const NEDS_HEADERS: [(&str, &str); 3] = [
  ("origin", "https://www.neds.com.au"),
  ("referer", "https://www.neds.com.au/"),
  ("content-type", "application/json"),
];

fn entrant_side(entrant: &NedsEntrant) -> Option<Side> {
  match entrant.home_away.as_deref() {
    Some("HOME") => Some(Side::Home),
    Some("AWAY") => Some(Side::Away),
    _ => None,
  }
}

/// Convert a Neds event card into normalized lines.
///
/// # Errors
/// Returns error unless the card has exactly two participants (one home,
/// one away) and exactly one event.
pub fn parse_neds_lines(response: &NedsEventCardResponse) -> Result<EventLines> {
  anyhow::ensure!(
    response.event_participants.len() == 2,
    "Neds event card lists {} participants, expected 2",
    response.event_participants.len()
  );
  let mut home = None;
  let mut away = None;
  for participant in response.event_participants.values() {
    if participant.home_away == "HOME" {
      home = Some(participant.name.clone());
    } else {
      away = Some(participant.name.clone());
    }
  }
  let teams = Teams {
    home: home.context("Neds event card has no home participant")?,
    away: away.context("Neds event card has no away participant")?,
  };

  anyhow::ensure!(
    response.events.len() == 1,
    "Neds event card lists {} events, expected 1",
    response.events.len()
  );
  let event = response
    .events
    .values()
    .next()
    .context("Neds event card has no event")?;

  let prices: HashMap<&str, f64> = response
    .prices
    .iter()
    .filter_map(|(key, price)| {
      let entrant_id = key.split(':').next()?;
      Some((entrant_id, price.odds.decimal()))
    })
    .collect();

  let alternate_groups: HashSet<&str> = response
    .market_type_groups
    .values()
    .filter(|group| group.name == ALTERNATE_LINES_GROUP)
    .map(|group| group.id.as_str())
    .collect();

  let mut records = Vec::new();
  let mut push = |handicap: f64, side: Side, entrant_id: &str, kind: MarketKind| {
    let Some(&price) = prices.get(entrant_id) else {
      warn!(entrant_id, "Neds entrant has no price, skipping");
      return;
    };
    match LineRecord::new(handicap, side, price, kind, None) {
      Ok(record) => records.push(record),
      Err(e) => warn!(entrant_id, error = %e, "Invalid Neds quote, skipping"),
    }
  };

  // Alternate lines: the line is part of the entrant name.
  let alternate_markets = event
    .market_type_group_markets
    .iter()
    .filter(|group| alternate_groups.contains(group.market_type_group_id.as_str()))
    .flat_map(|group| group.market_ids.iter());
  for market_id in alternate_markets {
    let Some(market) = response.markets.get(market_id) else {
      warn!(%market_id, "Neds alternate market missing from card");
      continue;
    };
    for entrant_id in &market.entrant_ids {
      let Some(entrant) = response.entrants.get(entrant_id) else {
        continue;
      };
      let Some((team, line)) = split_team_line(&entrant.name) else {
        warn!(name = %entrant.name, "Unparseable Neds entrant, skipping");
        continue;
      };
      let (side, handicap) = if team == teams.home {
        (Side::Home, line)
      } else {
        (Side::Away, -line)
      };
      push(handicap, side, entrant_id, MarketKind::Custom);
    }
  }

  // Main markets: side comes from the entrant itself.
  for market in response.markets.values() {
    let (kind, handicap) = match market.name.as_str() {
      "Head To Head" => (MarketKind::Moneyline, 0.0),
      "Line" => match market.handicap {
        Some(h) => (MarketKind::Spread, -h),
        None => {
          warn!("Neds line market has no handicap, skipping");
          continue;
        }
      },
      _ => continue,
    };
    for entrant_id in &market.entrant_ids {
      let Some(side) = response.entrants.get(entrant_id).and_then(entrant_side) else {
        continue;
      };
      push(handicap, side, entrant_id, kind);
    }
  }

  debug!(records = records.len(), home = %teams.home, away = %teams.away, "Neds lines parsed");
  Ok(EventLines { teams, records })
}

/// Neds line source.
pub struct NedsLineSource {
  client: Arc<BookmakerClient>,
  base_url: String,
}

impl NedsLineSource {
  /// Create a Neds line source.
  pub fn new(client: Arc<BookmakerClient>, base_url: impl Into<String>) -> Self {
    Self {
      client,
      base_url: base_url.into(),
    }
  }
}

#[async_trait]
impl LineSource for NedsLineSource {
  fn bookmaker(&self) -> &str {
    "neds"
  }

  #[instrument(skip(self), name = "neds_fetch_lines")]
  async fn fetch_lines(&self, event_id: &str) -> Result<EventLines> {
    let url = format!("{}?id={}", self.base_url, event_id);
    let response: NedsEventCardResponse = self
      .client
      .get_json(&url, &NEDS_HEADERS)
      .await
      .context("Failed to fetch Neds event card")?;
    parse_neds_lines(&response)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::line::LineLadder;

  fn fixture() -> serde_json::Value {
    serde_json::json!({
      "event_participants": {
        "p1": { "name": "Boston", "home_away": "HOME" },
        "p2": { "name": "Atlanta", "home_away": "AWAY" }
      },
      "market_type_groups": {
        "g1": { "id": "g1", "name": "Alternate Lines" },
        "g2": { "id": "g2", "name": "Player Props" }
      },
      "events": {
        "e1": {
          "market_type_group_markets": [
            { "market_type_group_id": "g1", "market_ids": ["m-alt"] },
            { "market_type_group_id": "g2", "market_ids": ["m-prop"] }
          ]
        }
      },
      "markets": {
        "m-alt": { "name": "Alternate Line 9.5", "entrant_ids": ["x1", "x2"] },
        "m-h2h": { "name": "Head To Head", "entrant_ids": ["h1", "h2"] },
        "m-line": { "name": "Line", "entrant_ids": ["l1", "l2"], "handicap": 6.5 },
        "m-prop": { "name": "Points", "entrant_ids": ["z1"] }
      },
      "entrants": {
        "x1": { "name": "Boston -9.5" },
        "x2": { "name": "Atlanta +9.5" },
        "h1": { "name": "Boston", "home_away": "HOME" },
        "h2": { "name": "Atlanta", "home_away": "AWAY" },
        "l1": { "name": "Boston", "home_away": "HOME" },
        "l2": { "name": "Atlanta", "home_away": "AWAY" },
        "z1": { "name": "Over 20.5" }
      },
      "prices": {
        "x1:abc": { "odds": { "numerator": 6, "denominator": 5 } },
        "x2:abc": { "odds": { "numerator": 3, "denominator": 5 } },
        "h1:abc": { "odds": { "numerator": 1, "denominator": 4 } },
        "h2:abc": { "odds": { "numerator": 3, "denominator": 1 } },
        "l1:abc": { "odds": { "numerator": 10, "denominator": 11 } },
        "l2:abc": { "odds": { "numerator": 10, "denominator": 11 } },
        "z1:abc": { "odds": { "numerator": 1, "denominator": 1 } }
      }
    })
  }

  #[test]
  fn test_parse_collects_all_line_markets() {
    let response: NedsEventCardResponse = serde_json::from_value(fixture()).unwrap();
    let lines = parse_neds_lines(&response).unwrap();
    assert_eq!(lines.teams.home, "Boston");
    assert_eq!(lines.teams.away, "Atlanta");
    assert_eq!(lines.records.len(), 6);

    let ladder = LineLadder::from_records(lines.records);
    let handicaps: Vec<f64> = ladder.populated().map(|l| l.handicap.value()).collect();
    assert_eq!(handicaps, vec![-9.5, -6.5, 0.0]);

    let alt = ladder.populated().next().unwrap();
    assert!((alt.home.price() - 2.2).abs() < 1e-12);
    assert!((alt.away.price() - 1.6).abs() < 1e-12);
    assert_eq!(alt.home.market_kind(), MarketKind::Custom);
  }

  #[test]
  fn test_parse_requires_two_participants() {
    let mut value = fixture();
    value["event_participants"]
      .as_object_mut()
      .unwrap()
      .remove("p2");
    let response: NedsEventCardResponse = serde_json::from_value(value).unwrap();
    assert!(parse_neds_lines(&response).is_err());
  }
}
