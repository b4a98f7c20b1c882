//! Normalized line quotes and the per-handicap ladder.
//!
//! Every bookmaker adapter reduces its own response shape to a flat list
//! of `LineRecord`s with the handicap expressed from the home side
//! (positive favours home). `LineLadder` pairs the opposing quotes that
//! share a handicap so the rest of the crate can treat each level as a
//! two-sided market.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::distribution::transform;
use super::error::DomainError;
use super::odds::{self, ProbabilityBounds};

/// Home-side handicap, ordered with `f64::total_cmp` so it can key a map.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Handicap(f64);

impl Handicap {
    /// Wraps a finite handicap value.
    pub fn new(value: f64) -> Result<Self, DomainError> {
        if value.is_finite() {
            // Fold -0.0 into 0.0 so both land on the same ladder key.
            Ok(Self(value + 0.0))
        } else {
            Err(DomainError::InvalidHandicap(value))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Handicap {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Handicap> for f64 {
    fn from(handicap: Handicap) -> Self {
        handicap.0
    }
}

impl PartialEq for Handicap {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Handicap {}

impl PartialOrd for Handicap {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Handicap {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Handicap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+.1}", self.0)
    }
}

/// Which team a quote backs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Away,
}

/// The market a quote was listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketKind {
    /// Head-to-head; always handicap 0.
    Moneyline,
    /// The bookmaker's main point spread.
    Spread,
    /// Alternate or pick-your-own lines.
    Custom,
}

/// Opaque bookmaker identifier for a single selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LegId(String);

impl LegId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LegId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single normalized quote. Immutable once built; deserializing goes
/// through the same checks as [`LineRecord::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLineRecord")]
pub struct LineRecord {
    handicap: Handicap,
    side: Side,
    price: f64,
    market_kind: MarketKind,
    leg_id: Option<LegId>,
}

impl LineRecord {
    /// Builds a record, rejecting prices that are not valid decimal odds.
    pub fn new(
        handicap: f64,
        side: Side,
        price: f64,
        market_kind: MarketKind,
        leg_id: Option<LegId>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            handicap: Handicap::new(handicap)?,
            side,
            price: odds::validate_odds(price)?,
            market_kind,
            leg_id,
        })
    }

    pub fn handicap(&self) -> Handicap {
        self.handicap
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn is_home_side(&self) -> bool {
        self.side == Side::Home
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn market_kind(&self) -> MarketKind {
        self.market_kind
    }

    pub fn leg_id(&self) -> Option<&LegId> {
        self.leg_id.as_ref()
    }
}

#[derive(Deserialize)]
struct RawLineRecord {
    handicap: f64,
    side: Side,
    price: f64,
    market_kind: MarketKind,
    leg_id: Option<LegId>,
}

impl TryFrom<RawLineRecord> for LineRecord {
    type Error = DomainError;

    fn try_from(raw: RawLineRecord) -> Result<Self, Self::Error> {
        Self::new(raw.handicap, raw.side, raw.price, raw.market_kind, raw.leg_id)
    }
}

/// The opposing quotes at one handicap. Either side may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LadderLevel {
    pub home: Option<LineRecord>,
    pub away: Option<LineRecord>,
}

impl LadderLevel {
    /// Both sides, when the level is fully populated.
    pub fn pair(&self) -> Option<(&LineRecord, &LineRecord)> {
        Some((self.home.as_ref()?, self.away.as_ref()?))
    }
}

/// A fully populated level borrowed from a ladder.
#[derive(Debug, Clone, Copy)]
pub struct PopulatedLevel<'a> {
    pub handicap: Handicap,
    pub home: &'a LineRecord,
    pub away: &'a LineRecord,
}

impl PopulatedLevel<'_> {
    pub fn bounds(&self) -> Result<ProbabilityBounds, DomainError> {
        odds::bounds(self.home.price(), self.away.price())
    }
}

/// One row of the ladder's probability table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelBounds {
    pub handicap: f64,
    /// Position on the fitted axis (half-point convention removed).
    pub axis: f64,
    pub lower: f64,
    pub upper: f64,
    pub midpoint: f64,
}

/// Quotes grouped by handicap, ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LineLadder {
    levels: BTreeMap<Handicap, LadderLevel>,
}

impl LineLadder {
    /// Groups records by handicap and side.
    ///
    /// A later record for the same handicap and side replaces the earlier
    /// one.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = LineRecord>,
    {
        let mut levels: BTreeMap<Handicap, LadderLevel> = BTreeMap::new();
        for record in records {
            let level = levels.entry(record.handicap()).or_default();
            let slot = match record.side() {
                Side::Home => &mut level.home,
                Side::Away => &mut level.away,
            };
            if let Some(previous) = slot.replace(record) {
                debug!(
                    handicap = %previous.handicap(),
                    side = ?previous.side(),
                    replaced_price = previous.price(),
                    "Duplicate quote replaced"
                );
            }
        }
        Self { levels }
    }

    /// Number of distinct handicaps, populated or not.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn get(&self, handicap: Handicap) -> Option<&LadderLevel> {
        self.levels.get(&handicap)
    }

    /// Every level in ascending handicap order.
    pub fn levels(&self) -> impl Iterator<Item = (Handicap, &LadderLevel)> {
        self.levels.iter().map(|(h, level)| (*h, level))
    }

    /// Levels with both sides quoted, ascending.
    pub fn populated(&self) -> impl Iterator<Item = PopulatedLevel<'_>> {
        self.levels.iter().filter_map(|(h, level)| {
            level.pair().map(|(home, away)| PopulatedLevel {
                handicap: *h,
                home,
                away,
            })
        })
    }

    pub fn populated_count(&self) -> usize {
        self.populated().count()
    }

    /// Bounds and midpoint for every populated level.
    pub fn bounds_table(&self) -> Result<Vec<LevelBounds>, DomainError> {
        self.populated()
            .map(|level| {
                let b = level.bounds()?;
                Ok(LevelBounds {
                    handicap: level.handicap.value(),
                    axis: transform(level.handicap.value()),
                    lower: b.lower,
                    upper: b.upper,
                    midpoint: b.midpoint(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(handicap: f64, side: Side, price: f64) -> LineRecord {
        LineRecord::new(handicap, side, price, MarketKind::Custom, None).unwrap()
    }

    #[test]
    fn test_record_rejects_bad_price() {
        let err = LineRecord::new(1.5, Side::Home, 1.0, MarketKind::Spread, None);
        assert_eq!(err, Err(DomainError::InvalidOdds(1.0)));
    }

    #[test]
    fn test_record_rejects_nan_handicap() {
        let err = LineRecord::new(f64::NAN, Side::Home, 1.9, MarketKind::Spread, None);
        assert!(matches!(err, Err(DomainError::InvalidHandicap(_))));
    }

    #[test]
    fn test_deserialize_applies_record_checks() {
        let valid = serde_json::json!({
            "handicap": -3.5,
            "side": "away",
            "price": 1.9,
            "market_kind": "spread",
            "leg_id": "104"
        });
        let record: LineRecord = serde_json::from_value(valid.clone()).unwrap();
        assert_eq!(record.handicap().value(), -3.5);
        assert_eq!(record.leg_id().unwrap().as_str(), "104");
        assert_eq!(serde_json::to_value(&record).unwrap(), valid);

        let mut short = valid.clone();
        short["price"] = serde_json::json!(0.95);
        assert!(serde_json::from_value::<LineRecord>(short).is_err());

        assert!(serde_json::from_value::<Handicap>(serde_json::json!(2.5)).is_ok());
        assert!(serde_json::from_str::<Handicap>("1e400").is_err());
    }

    #[test]
    fn test_negative_zero_shares_the_moneyline_level() {
        let ladder = LineLadder::from_records([
            rec(0.0, Side::Home, 1.8),
            rec(-0.0, Side::Away, 2.0),
        ]);
        assert_eq!(ladder.len(), 1);
        assert_eq!(ladder.populated_count(), 1);
    }

    #[test]
    fn test_half_populated_levels_are_kept_but_not_populated() {
        let ladder = LineLadder::from_records([
            rec(-3.5, Side::Home, 2.3),
            rec(-3.5, Side::Away, 1.6),
            rec(5.5, Side::Home, 1.3),
        ]);
        assert_eq!(ladder.len(), 2);
        assert_eq!(ladder.populated_count(), 1);
        let h = Handicap::new(5.5).unwrap();
        assert!(ladder.get(h).unwrap().pair().is_none());
    }

    #[test]
    fn test_later_duplicate_replaces_earlier() {
        let ladder = LineLadder::from_records([
            rec(1.5, Side::Home, 1.80),
            rec(1.5, Side::Home, 1.85),
        ]);
        let level = ladder.get(Handicap::new(1.5).unwrap()).unwrap();
        assert_eq!(level.home.as_ref().unwrap().price(), 1.85);
    }

    #[test]
    fn test_populated_levels_ascend() {
        let ladder = LineLadder::from_records([
            rec(4.5, Side::Home, 1.5),
            rec(4.5, Side::Away, 2.6),
            rec(-4.5, Side::Home, 2.6),
            rec(-4.5, Side::Away, 1.5),
            rec(0.0, Side::Home, 1.9),
            rec(0.0, Side::Away, 1.9),
        ]);
        let keys: Vec<f64> = ladder.populated().map(|l| l.handicap.value()).collect();
        assert_eq!(keys, vec![-4.5, 0.0, 4.5]);
    }

    #[test]
    fn test_bounds_table_uses_transformed_axis() {
        let ladder = LineLadder::from_records([
            rec(2.5, Side::Home, 1.7),
            rec(2.5, Side::Away, 2.2),
        ]);
        let table = ladder.bounds_table().unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].axis, 2.0);
        assert!((table[0].upper - 1.0 / 1.7).abs() < 1e-12);
        assert!((table[0].lower - (1.0 - 1.0 / 2.2)).abs() < 1e-12);
    }
}
