//! Market Survey - Per-Bookmaker Margin Models
//!
//! Pulls one event's lines from every configured bookmaker, builds a
//! ladder per bookmaker and fits a margin-of-victory model to each, so
//! the models can be compared side by side.
//!
//! A bookmaker whose request fails is left out of the survey. A ladder
//! that cannot be fitted is kept, with the fit error in place of the
//! model.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::domain::distribution::{DistributionFitter, DistributionModel};
use crate::domain::error::FitError;
use crate::domain::line::LineLadder;
use crate::ports::line_source::{LineSource, Teams};

/// One bookmaker's view of the event.
#[derive(Debug, Clone, Serialize)]
pub struct BookmakerSnapshot {
  /// Bookmaker name.
  pub bookmaker: String,
  /// Team names as this bookmaker lists them.
  pub teams: Teams,
  /// Ladder built from this bookmaker's quotes.
  pub ladder: LineLadder,
  /// Fitted model, or why it could not be fitted.
  #[serde(skip)]
  pub model: Result<DistributionModel, FitError>,
}

/// A line source paired with its event identifier.
pub struct SurveyTarget {
  /// Bookmaker adapter.
  pub source: Arc<dyn LineSource>,
  /// Event identifier in the bookmaker's own format.
  pub event_id: String,
}

/// Fetches and models every target in turn.
pub struct MarketSurvey {
  /// Sources to query, in report order.
  targets: Vec<SurveyTarget>,
  /// Shared fitter settings.
  fitter: DistributionFitter,
}

impl MarketSurvey {
  /// Create a survey over the given targets.
  pub fn new(targets: Vec<SurveyTarget>, fitter: DistributionFitter) -> Self {
    Self { targets, fitter }
  }

  /// Fetch, ladder and fit each bookmaker.
  #[instrument(skip(self), fields(targets = self.targets.len()))]
  pub async fn run(&self) -> Vec<BookmakerSnapshot> {
    let mut snapshots = Vec::with_capacity(self.targets.len());

    for target in &self.targets {
      let bookmaker = target.source.bookmaker().to_string();
      let lines = match target.source.fetch_lines(&target.event_id).await {
        Ok(lines) => lines,
        Err(e) => {
          warn!(%bookmaker, event_id = %target.event_id, error = %e, "Line fetch failed");
          continue;
        }
      };

      let ladder = LineLadder::from_records(lines.records);
      let model = self.fitter.fit(&ladder);

      match &model {
        Ok(m) => info!(
          %bookmaker,
          levels = ladder.populated_count(),
          location = m.location,
          scale = m.scale,
          "Margin model fitted"
        ),
        Err(e) => warn!(
          %bookmaker,
          levels = ladder.populated_count(),
          error = %e,
          "Margin model unavailable"
        ),
      }

      snapshots.push(BookmakerSnapshot {
        bookmaker,
        teams: lines.teams,
        ladder,
        model,
      });
    }

    snapshots
  }
}
