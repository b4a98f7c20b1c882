//! Integration Tests - End-to-end Scanner Component Testing
//!
//! Tests the interaction between usecases, ports, and mock adapters.
//! Uses mockall for trait mocking and tokio::test for async tests.

use std::sync::Arc;

use mockall::mock;
use mockall::predicate::*;

use sgm_scanner::domain::distribution::{DistributionFitter, normal_cdf, transform};
use sgm_scanner::domain::error::FitError;
use sgm_scanner::domain::line::{LegId, LineLadder, LineRecord, MarketKind, Side};
use sgm_scanner::ports::combo_pricer::ComboPricer;
use sgm_scanner::ports::line_source::{EventLines, LineSource, Teams};
use sgm_scanner::usecases::market_survey::{MarketSurvey, SurveyTarget};
use sgm_scanner::usecases::multi_sweep::MultiSweep;

// ---- Mock Definitions ----

mock! {
    pub Pricer {}

    #[async_trait::async_trait]
    impl ComboPricer for Pricer {
        async fn quote_combo(&self, leg_a: &LegId, leg_b: &LegId) -> anyhow::Result<f64>;
    }
}

mock! {
    pub Source {}

    #[async_trait::async_trait]
    impl LineSource for Source {
        fn bookmaker(&self) -> &str;
        async fn fetch_lines(&self, event_id: &str) -> anyhow::Result<EventLines>;
    }
}

// ---- Fixtures ----

/// Both sides of each level priced off normal(mu, sigma) plus `vig`.
fn records(mu: f64, sigma: f64, vig: f64, handicaps: &[f64]) -> Vec<LineRecord> {
    handicaps
        .iter()
        .flat_map(|&h| {
            let p = normal_cdf((transform(h) - mu) / sigma);
            [
                LineRecord::new(
                    h,
                    Side::Home,
                    1.0 / (p + vig),
                    MarketKind::Custom,
                    Some(LegId::new(format!("H{h}"))),
                )
                .unwrap(),
                LineRecord::new(
                    h,
                    Side::Away,
                    1.0 / (1.0 - p + vig),
                    MarketKind::Custom,
                    Some(LegId::new(format!("A{h}"))),
                )
                .unwrap(),
            ]
        })
        .collect()
}

fn teams() -> Teams {
    Teams {
        home: "Charlotte".to_string(),
        away: "Toronto".to_string(),
    }
}

// ---- Integration Tests ----

#[tokio::test]
async fn test_sweep_skips_refused_pair_and_keeps_order() {
    let ladder = LineLadder::from_records(records(0.0, 12.0, 0.025, &[-9.5, -4.5, 4.5, 9.5]));

    let mut pricer = MockPricer::new();
    pricer
        .expect_quote_combo()
        .with(eq(LegId::new("A-4.5")), eq(LegId::new("H4.5")))
        .times(1)
        .returning(|_, _| Err(anyhow::anyhow!("legs cannot be combined")));
    pricer
        .expect_quote_combo()
        .times(5)
        .returning(|_, _| Ok(5.0));

    let sweep = MultiSweep::new(Arc::new(pricer));
    let report = sweep.report(&ladder).await;

    assert_eq!(report.candidates, 6);
    let spans: Vec<(String, String)> = report
        .results
        .iter()
        .map(|r| {
            (
                r.leg_a.leg_id().unwrap().to_string(),
                r.leg_b.leg_id().unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(
        spans,
        vec![
            ("A-9.5".to_string(), "H-4.5".to_string()),
            ("A-9.5".to_string(), "H4.5".to_string()),
            ("A-9.5".to_string(), "H9.5".to_string()),
            ("A-4.5".to_string(), "H9.5".to_string()),
            ("A4.5".to_string(), "H9.5".to_string()),
        ]
    );

    for result in &report.results {
        let quote = result.quote.as_ref().unwrap();
        assert!(quote.is_ordered(), "{quote:?}");
        assert_eq!(result.observed_odds, 5.0);
    }

    let value = report.value_bets(0.0);
    assert!(value.windows(2).all(|w| w[0].edge() >= w[1].edge()));
    assert!(value.iter().all(|r| r.edge().unwrap() > 0.0));
}

#[tokio::test]
async fn test_sweep_keeps_priced_pairs_without_interval() {
    // Close levels on a near-even ladder: the two legs overlap by more
    // than the margin allows, so most pairs have no theoretical interval.
    let ladder = LineLadder::from_records(records(0.0, 12.0, 0.025, &[-1.5, 0.0, 1.5, 3.0]));

    let mut pricer = MockPricer::new();
    pricer
        .expect_quote_combo()
        .with(eq(LegId::new("A-1.5")), eq(LegId::new("H3")))
        .times(1)
        .returning(|_, _| Err(anyhow::anyhow!("legs cannot be combined")));
    pricer
        .expect_quote_combo()
        .times(5)
        .returning(|_, _| Ok(4.0));

    let report = MultiSweep::new(Arc::new(pricer)).report(&ladder).await;

    assert_eq!(report.candidates, 6);
    assert_eq!(report.results.len(), 5);
    assert!(report.results.iter().all(|r| r.observed_odds == 4.0));

    let without_interval: Vec<_> = report.results.iter().filter(|r| r.quote.is_err()).collect();
    assert!(!without_interval.is_empty());
    for result in &without_interval {
        assert_eq!(result.edge(), None);
        assert_eq!(result.is_value(-1.0), None);
    }

    let value = report.value_bets(-1.0);
    assert_eq!(value.len(), report.results.len() - without_interval.len());
}

#[tokio::test]
async fn test_sweep_ignores_pairs_without_leg_ids() {
    let unpriceable: Vec<LineRecord> = [-6.5, 6.5]
        .iter()
        .flat_map(|&h| {
            [
                LineRecord::new(h, Side::Home, 1.9, MarketKind::Spread, None).unwrap(),
                LineRecord::new(h, Side::Away, 1.9, MarketKind::Spread, None).unwrap(),
            ]
        })
        .collect();
    let ladder = LineLadder::from_records(unpriceable);

    let mut pricer = MockPricer::new();
    pricer.expect_quote_combo().never();

    let results = MultiSweep::new(Arc::new(pricer)).run(&ladder).await;
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_survey_skips_failing_bookmaker() {
    let mut failing = MockSource::new();
    failing.expect_bookmaker().return_const("neds".to_string());
    failing
        .expect_fetch_lines()
        .with(eq("evt-neds"))
        .returning(|_| Err(anyhow::anyhow!("connection reset")));

    let mut working = MockSource::new();
    working.expect_bookmaker().return_const("tab".to_string());
    working.expect_fetch_lines().with(eq("evt-tab")).returning(|_| {
        Ok(EventLines {
            teams: teams(),
            records: records(1.5, 10.0, 0.02, &[-7.5, -2.5, 0.0, 2.5, 7.5]),
        })
    });

    let survey = MarketSurvey::new(
        vec![
            SurveyTarget {
                source: Arc::new(failing),
                event_id: "evt-neds".to_string(),
            },
            SurveyTarget {
                source: Arc::new(working),
                event_id: "evt-tab".to_string(),
            },
        ],
        DistributionFitter::default(),
    );

    let snapshots = survey.run().await;
    assert_eq!(snapshots.len(), 1);
    let snapshot = &snapshots[0];
    assert_eq!(snapshot.bookmaker, "tab");
    assert_eq!(snapshot.teams, teams());
    assert_eq!(snapshot.ladder.populated_count(), 5);

    let model = snapshot.model.as_ref().unwrap();
    assert!((model.location - 1.5).abs() < 1e-4, "mu={}", model.location);
    assert!((model.scale - 10.0).abs() < 1e-4, "sigma={}", model.scale);
}

#[tokio::test]
async fn test_survey_keeps_fit_error() {
    let mut thin = MockSource::new();
    thin.expect_bookmaker().return_const("pointsbet".to_string());
    thin.expect_fetch_lines().returning(|_| {
        Ok(EventLines {
            teams: teams(),
            records: records(0.0, 12.0, 0.02, &[-3.5]),
        })
    });

    let survey = MarketSurvey::new(
        vec![SurveyTarget {
            source: Arc::new(thin),
            event_id: "123".to_string(),
        }],
        DistributionFitter::default(),
    );

    let snapshots = survey.run().await;
    assert_eq!(snapshots.len(), 1);
    assert_eq!(
        snapshots[0].model,
        Err(FitError::InsufficientLevels {
            required: 2,
            found: 1
        })
    );
}
