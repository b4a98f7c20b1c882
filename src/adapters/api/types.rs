//! Bookmaker API Request/Response Types
//!
//! Serialization types for the TAB, PointsBet and Neds endpoints. Only
//! the fields the line parsers read are modelled; everything else in
//! the responses is ignored.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A number some endpoints send as a JSON string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FlexibleNumber {
  /// Plain JSON number.
  Number(f64),
  /// Number wrapped in a string.
  Text(String),
}

impl FlexibleNumber {
  /// Numeric value, if the text form parses.
  pub fn value(&self) -> Option<f64> {
    match self {
      Self::Number(n) => Some(*n),
      Self::Text(s) => s.trim().parse().ok(),
    }
  }
}

/// An identifier some endpoints send as a number and others as a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FlexibleId {
  /// Numeric identifier.
  Number(u64),
  /// String identifier.
  Text(String),
}

impl std::fmt::Display for FlexibleId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Number(n) => write!(f, "{n}"),
      Self::Text(s) => f.write_str(s),
    }
  }
}

// ── TAB ─────────────────────────────────────────────────────

/// TAB competitor entry: a bare name or an object with a name.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TabCompetitor {
  /// Bare team name.
  Name(String),
  /// Object carrying the team name.
  Detailed {
    /// Team name.
    name: String,
  },
}

impl TabCompetitor {
  /// Team name.
  pub fn name(&self) -> &str {
    match self {
      Self::Name(name) | Self::Detailed { name } => name,
    }
  }
}

/// TAB match response.
#[derive(Debug, Clone, Deserialize)]
pub struct TabMatchResponse {
  /// Home team first, then away.
  pub competitors: Vec<TabCompetitor>,
  /// All markets on the match.
  #[serde(default)]
  pub markets: Vec<TabMarket>,
}

/// TAB market.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabMarket {
  /// Market name, e.g. "Head To Head", "Line".
  pub bet_option: String,
  /// Selections in the market.
  #[serde(default)]
  pub propositions: Vec<TabProposition>,
}

/// TAB selection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabProposition {
  /// Team name, followed by the line for handicap markets.
  pub name: String,
  /// Decimal odds.
  pub return_win: f64,
  /// Proposition ID used for multi enquiries.
  pub id: Option<FlexibleId>,
}

/// TAB pricing enquiry request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabEnquiryRequest {
  /// Client jurisdiction and channel.
  pub client_details: TabClientDetails,
  /// Bets to price.
  pub bets: Vec<TabEnquiryBet>,
}

/// TAB client details block.
#[derive(Debug, Clone, Serialize)]
pub struct TabClientDetails {
  /// Jurisdiction code, e.g. "NSW".
  pub jurisdiction: String,
  /// Always "web".
  pub channel: String,
}

/// One bet in an enquiry.
#[derive(Debug, Clone, Serialize)]
pub struct TabEnquiryBet {
  /// Always "FIXED_ODDS".
  #[serde(rename = "type")]
  pub bet_type: String,
  /// Bet legs.
  pub legs: Vec<TabEnquiryLeg>,
}

/// One leg of an enquiry bet.
#[derive(Debug, Clone, Serialize)]
pub struct TabEnquiryLeg {
  /// Always "SAME_GAME_MULTI".
  #[serde(rename = "type")]
  pub leg_type: String,
  /// Selections combined in the leg.
  pub propositions: Vec<TabEnquiryProposition>,
}

/// One selection in a same-game multi leg.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabEnquiryProposition {
  /// Always "WIN".
  #[serde(rename = "type")]
  pub proposition_type: String,
  /// TAB proposition ID.
  pub proposition_id: u64,
}

/// TAB pricing enquiry response.
#[derive(Debug, Clone, Deserialize)]
pub struct TabEnquiryResponse {
  /// Priced bets, in request order.
  #[serde(default)]
  pub bets: Vec<TabPricedBet>,
}

/// Priced bet.
#[derive(Debug, Clone, Deserialize)]
pub struct TabPricedBet {
  /// Priced legs.
  #[serde(default)]
  pub legs: Vec<TabPricedLeg>,
}

/// Priced leg.
#[derive(Debug, Clone, Deserialize)]
pub struct TabPricedLeg {
  /// Leg odds.
  pub odds: TabOdds,
}

/// Odds block of a priced leg.
#[derive(Debug, Clone, Deserialize)]
pub struct TabOdds {
  /// Decimal odds.
  pub decimal: FlexibleNumber,
}

// ── PointsBet ───────────────────────────────────────────────

/// PointsBet event response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsBetEventResponse {
  /// Home team name.
  pub home_team: String,
  /// Away team name.
  pub away_team: String,
  /// Fixed-odds markets on the event.
  #[serde(default)]
  pub fixed_odds_markets: Vec<PointsBetMarket>,
}

/// PointsBet market.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsBetMarket {
  /// Market class, e.g. "Moneyline", "Point Spread".
  pub event_class: String,
  /// Selections in the market.
  #[serde(default)]
  pub outcomes: Vec<PointsBetOutcome>,
}

/// PointsBet selection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsBetOutcome {
  /// "Home" or "Away".
  pub side: String,
  /// Line from the selected team's point of view.
  pub points: Option<f64>,
  /// Decimal odds.
  pub price: f64,
}

// ── Neds ────────────────────────────────────────────────────

/// Neds event-card response. Every collection is keyed by ID.
#[derive(Debug, Clone, Deserialize)]
pub struct NedsEventCardResponse {
  /// The two teams.
  pub event_participants: HashMap<String, NedsParticipant>,
  /// Market groupings such as "Alternate Lines".
  #[serde(default)]
  pub market_type_groups: HashMap<String, NedsMarketTypeGroup>,
  /// Exactly one event is expected.
  pub events: HashMap<String, NedsEvent>,
  /// All markets on the event.
  #[serde(default)]
  pub markets: HashMap<String, NedsMarket>,
  /// All selections on the event.
  #[serde(default)]
  pub entrants: HashMap<String, NedsEntrant>,
  /// Prices keyed by `"{entrant_id}:..."`.
  #[serde(default)]
  pub prices: HashMap<String, NedsPrice>,
}

/// Neds team.
#[derive(Debug, Clone, Deserialize)]
pub struct NedsParticipant {
  /// Team name.
  pub name: String,
  /// "HOME" or "AWAY".
  pub home_away: String,
}

/// Neds market group.
#[derive(Debug, Clone, Deserialize)]
pub struct NedsMarketTypeGroup {
  /// Group ID.
  pub id: String,
  /// Group name.
  pub name: String,
}

/// Neds event.
#[derive(Debug, Clone, Deserialize)]
pub struct NedsEvent {
  /// Market IDs grouped by market group.
  #[serde(default)]
  pub market_type_group_markets: Vec<NedsGroupMarkets>,
}

/// Market IDs belonging to one group.
#[derive(Debug, Clone, Deserialize)]
pub struct NedsGroupMarkets {
  /// Group ID.
  pub market_type_group_id: String,
  /// Markets in the group.
  #[serde(default)]
  pub market_ids: Vec<String>,
}

/// Neds market.
#[derive(Debug, Clone, Deserialize)]
pub struct NedsMarket {
  /// Market name, e.g. "Head To Head", "Line".
  pub name: String,
  /// Selections in the market.
  #[serde(default)]
  pub entrant_ids: Vec<String>,
  /// Away-side handicap for "Line" markets.
  pub handicap: Option<f64>,
}

/// Neds selection.
#[derive(Debug, Clone, Deserialize)]
pub struct NedsEntrant {
  /// Team name, followed by the line for alternate lines.
  pub name: String,
  /// "HOME" or "AWAY" where the market is team-based.
  pub home_away: Option<String>,
}

/// Neds price entry.
#[derive(Debug, Clone, Deserialize)]
pub struct NedsPrice {
  /// Fractional odds.
  pub odds: NedsFractionalOdds,
}

/// Fractional odds.
#[derive(Debug, Clone, Deserialize)]
pub struct NedsFractionalOdds {
  /// Numerator.
  pub numerator: f64,
  /// Denominator.
  pub denominator: f64,
}

impl NedsFractionalOdds {
  /// Decimal odds `(n + d) / d`.
  pub fn decimal(&self) -> f64 {
    (self.numerator + self.denominator) / self.denominator
  }
}
