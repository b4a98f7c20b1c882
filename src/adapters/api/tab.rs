//! TAB Adapter - Lines and Same-Game-Multi Enquiries
//!
//! Reads head-to-head, line and pick-your-own-line markets from the TAB
//! info service, and prices two-proposition same-game multis through
//! the pricing enquiry endpoint.
//!
//! Proposition names carry the line after the team name
//! ("Charlotte Hornets +3.5"); the line is negated for the away team so
//! every record is expressed from the home side.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use super::client::BookmakerClient;
use super::split_team_line;
use super::types::{
  TabClientDetails, TabEnquiryBet, TabEnquiryLeg, TabEnquiryProposition, TabEnquiryRequest,
  TabEnquiryResponse, TabMatchResponse,
};
use crate::config::ApiConfig;
use crate::domain::line::{LegId, LineRecord, MarketKind, Side};
use crate::ports::combo_pricer::ComboPricer;
use crate::ports::line_source::{EventLines, LineSource, Teams};

/// Endpoint settings shared by the TAB line source and combo pricer.
#[derive(Debug, Clone)]
pub struct TabEndpoints {
  /// Info-service base URL.
  pub info_url: String,
  /// Pricing enquiry URL.
  pub pricing_url: String,
  /// Jurisdiction code.
  pub jurisdiction: String,
  /// Sport path segment.
  pub sport: String,
  /// Competition path segment.
  pub competition: String,
}

impl TabEndpoints {
  /// Endpoints from the `[api]` config section.
  pub fn from_config(api: &ApiConfig) -> Self {
    Self {
      info_url: api.tab_url.clone(),
      pricing_url: api.tab_pricing_url.clone(),
      jurisdiction: api.jurisdiction.clone(),
      sport: api.sport.clone(),
      competition: api.competition.clone(),
    }
  }

  /// Match URL for an event path segment.
  pub fn match_url(&self, match_id: &str) -> String {
    format!(
      "{}/sports/{}/competitions/{}/matches/{}?jurisdiction={}",
      self.info_url, self.sport, self.competition, match_id, self.jurisdiction
    )
  }
}

fn market_kind(bet_option: &str) -> Option<MarketKind> {
  match bet_option {
    "Head To Head" => Some(MarketKind::Moneyline),
    "Line" => Some(MarketKind::Spread),
    "Pick Your Own Line" => Some(MarketKind::Custom),
    _ => None,
  }
}

/// Convert a TAB match response into normalized lines.
///
/// # Errors
/// Returns error if the response does not list two competitors.
pub fn parse_tab_lines(response: &TabMatchResponse) -> Result<EventLines> {
  let [home, away] = response.competitors.as_slice() else {
    anyhow::bail!(
      "TAB match lists {} competitors, expected 2",
      response.competitors.len()
    );
  };
  let teams = Teams {
    home: home.name().to_string(),
    away: away.name().to_string(),
  };

  let mut records = Vec::new();
  for market in &response.markets {
    let Some(kind) = market_kind(&market.bet_option) else {
      continue;
    };

    for prop in &market.propositions {
      let (team, line) = if kind == MarketKind::Moneyline {
        (prop.name.as_str(), 0.0)
      } else {
        match split_team_line(&prop.name) {
          Some(parsed) => parsed,
          None => {
            warn!(name = %prop.name, "Unparseable TAB proposition, skipping");
            continue;
          }
        }
      };

      let side = if team == teams.home {
        Side::Home
      } else if team == teams.away {
        Side::Away
      } else {
        warn!(team, "TAB proposition names neither team, skipping");
        continue;
      };
      let handicap = match side {
        Side::Home => line,
        Side::Away => -line,
      };
      let leg_id = prop.id.as_ref().map(|id| LegId::new(id.to_string()));

      match LineRecord::new(handicap, side, prop.return_win, kind, leg_id) {
        Ok(record) => records.push(record),
        Err(e) => warn!(name = %prop.name, error = %e, "Invalid TAB quote, skipping"),
      }
    }
  }

  debug!(records = records.len(), home = %teams.home, away = %teams.away, "TAB lines parsed");
  Ok(EventLines { teams, records })
}

/// Build the enquiry body for a same-game multi of the given propositions.
///
/// # Errors
/// Returns error if a leg ID is not a TAB numeric proposition ID.
pub fn enquiry_request(jurisdiction: &str, legs: &[&LegId]) -> Result<TabEnquiryRequest> {
  let propositions = legs
    .iter()
    .map(|leg| {
      let proposition_id = leg
        .as_str()
        .parse()
        .with_context(|| format!("TAB proposition ID is not numeric: {leg}"))?;
      Ok(TabEnquiryProposition {
        proposition_type: "WIN".to_string(),
        proposition_id,
      })
    })
    .collect::<Result<Vec<_>>>()?;

  Ok(TabEnquiryRequest {
    client_details: TabClientDetails {
      jurisdiction: jurisdiction.to_string(),
      channel: "web".to_string(),
    },
    bets: vec![TabEnquiryBet {
      bet_type: "FIXED_ODDS".to_string(),
      legs: vec![TabEnquiryLeg {
        leg_type: "SAME_GAME_MULTI".to_string(),
        propositions,
      }],
    }],
  })
}

/// Read the multi price out of an enquiry response.
///
/// # Errors
/// Returns error if the response carries no priced leg.
pub fn parse_enquiry_odds(response: &TabEnquiryResponse) -> Result<f64> {
  response
    .bets
    .first()
    .and_then(|bet| bet.legs.first())
    .and_then(|leg| leg.odds.decimal.value())
    .context("TAB enquiry response has no priced leg")
}

/// TAB line source.
pub struct TabLineSource {
  client: Arc<BookmakerClient>,
  endpoints: TabEndpoints,
}

impl TabLineSource {
  /// Create a TAB line source.
  pub fn new(client: Arc<BookmakerClient>, endpoints: TabEndpoints) -> Self {
    Self { client, endpoints }
  }
}

#[async_trait]
impl LineSource for TabLineSource {
  fn bookmaker(&self) -> &str {
    "tab"
  }

  #[instrument(skip(self), name = "tab_fetch_lines")]
  async fn fetch_lines(&self, event_id: &str) -> Result<EventLines> {
    let url = self.endpoints.match_url(event_id);
    let response: TabMatchResponse = self
      .client
      .get_json(&url, &[])
      .await
      .context("Failed to fetch TAB match")?;
    parse_tab_lines(&response)
  }
}

/// TAB same-game-multi pricer.
pub struct TabComboPricer {
  client: Arc<BookmakerClient>,
  endpoints: TabEndpoints,
}

impl TabComboPricer {
  /// Create a TAB combo pricer.
  pub fn new(client: Arc<BookmakerClient>, endpoints: TabEndpoints) -> Self {
    Self { client, endpoints }
  }
}

#[async_trait]
impl ComboPricer for TabComboPricer {
  async fn quote_combo(&self, leg_a: &LegId, leg_b: &LegId) -> Result<f64> {
    let body = enquiry_request(&self.endpoints.jurisdiction, &[leg_a, leg_b])?;
    let response: TabEnquiryResponse = self
      .client
      .post_json(&self.endpoints.pricing_url, &body)
      .await
      .with_context(|| format!("TAB enquiry failed for {leg_a} + {leg_b}"))?;
    parse_enquiry_odds(&response)
  }
}
