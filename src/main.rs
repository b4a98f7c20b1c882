//! SGM Scanner - Entry Point
//!
//! Pulls one event's handicap ladders from the configured bookmakers,
//! fits a margin-of-victory model to each and, when enabled, sweeps
//! TAB's ladder for same-game multis priced above their theoretical
//! interval.
//!
//! Wiring sequence:
//! 1. Load config.toml + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Create the shared BookmakerClient (rate limit + retry)
//! 4. Create a line source per configured event
//! 5. Run the market survey and log each bookmaker's model
//! 6. Optionally run the multi sweep against TAB and log value bets

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use sgm_scanner::adapters::api::client::{BookmakerClient, BookmakerClientConfig};
use sgm_scanner::adapters::api::neds::NedsLineSource;
use sgm_scanner::adapters::api::pointsbet::PointsBetLineSource;
use sgm_scanner::adapters::api::tab::{TabComboPricer, TabEndpoints, TabLineSource};
use sgm_scanner::config::{self, AppConfig};
use sgm_scanner::domain::distribution::DistributionFitter;
use sgm_scanner::domain::odds;
use sgm_scanner::usecases::market_survey::{BookmakerSnapshot, MarketSurvey, SurveyTarget};
use sgm_scanner::usecases::multi_sweep::MultiSweep;

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration from config.toml ──────────────
    let config = config::loader::load_config("config.toml")
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new(&config.scanner.log_level)
                }),
        )
        .json()
        .init();

    info!(
        name = %config.scanner.name,
        version = env!("CARGO_PKG_VERSION"),
        run_sweep = config.scanner.run_sweep,
        "Starting SGM Scanner"
    );

    // ── 3. Create shared bookmaker HTTP client ──────────────
    let client = Arc::new(
        BookmakerClient::new(BookmakerClientConfig::from_app(&config))
            .context("Failed to create bookmaker client")?,
    );
    let tab_endpoints = TabEndpoints::from_config(&config.api);

    // ── 4. One line source per configured event ─────────────
    let targets = survey_targets(&config, &client, &tab_endpoints);
    if targets.is_empty() {
        warn!("No events configured, nothing to do");
        return Ok(());
    }

    // ── 5. Survey every bookmaker ───────────────────────────
    let fitter = DistributionFitter::new(config.model.fitter());
    let survey = MarketSurvey::new(targets, fitter);
    let snapshots = survey.run().await;
    for snapshot in &snapshots {
        log_snapshot(snapshot, config.model.tail_penalty);
    }

    // ── 6. Same-game-multi sweep against TAB ────────────────
    if !config.scanner.run_sweep {
        return Ok(());
    }
    let Some(tab) = snapshots.iter().find(|s| s.bookmaker == "tab") else {
        warn!("Sweep requested but no TAB ladder was fetched");
        return Ok(());
    };

    let pricer = Arc::new(TabComboPricer::new(Arc::clone(&client), tab_endpoints));
    let sweep = MultiSweep::new(pricer).with_min_gap(config.sweep.min_gap);
    let report = sweep.report(&tab.ladder).await;
    let value_bets = report.value_bets(config.sweep.min_edge);

    let no_interval = report.results.iter().filter(|r| r.quote.is_err()).count();

    info!(
        run_id = %report.run_id,
        completed_at = %report.completed_at,
        candidates = report.candidates,
        priced = report.results.len(),
        no_interval,
        value = value_bets.len(),
        "Sweep report"
    );
    for result in &value_bets {
        let (Ok(quote), Some(edge), Some((edge_low, edge_high))) =
            (&result.quote, result.edge(), result.edge_bounds())
        else {
            continue;
        };
        info!(
            run_id = %report.run_id,
            leg_a = %result.leg_a.handicap(),
            leg_b = %result.leg_b.handicap(),
            observed = result.observed_odds,
            theoretical = quote.theoretical_odds,
            edge,
            edge_low,
            edge_high,
            "Value multi"
        );
    }

    Ok(())
}

/// Build survey targets for every bookmaker with an event configured.
fn survey_targets(
    config: &AppConfig,
    client: &Arc<BookmakerClient>,
    tab_endpoints: &TabEndpoints,
) -> Vec<SurveyTarget> {
    let mut targets = Vec::new();

    if let Some(event_id) = &config.event.tab_match {
        targets.push(SurveyTarget {
            source: Arc::new(TabLineSource::new(Arc::clone(client), tab_endpoints.clone())),
            event_id: event_id.clone(),
        });
    }
    if let Some(event_id) = &config.event.pointsbet_event_id {
        targets.push(SurveyTarget {
            source: Arc::new(PointsBetLineSource::new(
                Arc::clone(client),
                config.api.pointsbet_url.clone(),
            )),
            event_id: event_id.clone(),
        });
    }
    if let Some(event_id) = &config.event.neds_event_id {
        targets.push(SurveyTarget {
            source: Arc::new(NedsLineSource::new(
                Arc::clone(client),
                config.api.neds_url.clone(),
            )),
            event_id: event_id.clone(),
        });
    }

    targets
}

/// Log a bookmaker's model and its fair odds at each quoted level.
fn log_snapshot(snapshot: &BookmakerSnapshot, tail_penalty: f64) {
    let model = match &snapshot.model {
        Ok(model) => model,
        Err(e) => {
            warn!(bookmaker = %snapshot.bookmaker, error = %e, "No model for bookmaker");
            return;
        }
    };

    let (location_err, scale_err) = model.parameter_errors();
    info!(
        bookmaker = %snapshot.bookmaker,
        home = %snapshot.teams.home,
        away = %snapshot.teams.away,
        location = model.location,
        scale = model.scale,
        location_err,
        scale_err,
        "Bookmaker model"
    );

    for level in snapshot.ladder.populated() {
        let handicap = level.handicap.value();
        let fair_odds = model.fair_odds_at(handicap).ok();
        let midpoint = odds::midpoint(level.home.price(), level.away.price(), tail_penalty).ok();
        info!(
            bookmaker = %snapshot.bookmaker,
            handicap,
            home_price = level.home.price(),
            away_price = level.away.price(),
            midpoint = ?midpoint,
            fair_odds = ?fair_odds,
            "Level"
        );
    }
}
