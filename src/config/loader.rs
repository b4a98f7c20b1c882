//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    name = %config.scanner.name,
    tab = config.event.tab_match.is_some(),
    pointsbet = config.event.pointsbet_event_id.is_some(),
    neds = config.event.neds_event_id.is_some(),
    sweep = config.scanner.run_sweep,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig =
    toml::from_str(content).with_context(|| "Failed to parse config.toml")?;
  validate_config(&config)?;
  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - At least one bookmaker event configured
/// - Solver settings that can terminate
/// - A usable sweep gap and edge threshold
/// - Non-zero request pacing
fn validate_config(config: &AppConfig) -> Result<()> {
  let event = &config.event;
  anyhow::ensure!(
    event.tab_match.is_some() || event.pointsbet_event_id.is_some() || event.neds_event_id.is_some(),
    "At least one bookmaker event must be configured"
  );
  for (name, id) in [
    ("tab_match", &event.tab_match),
    ("pointsbet_event_id", &event.pointsbet_event_id),
    ("neds_event_id", &event.neds_event_id),
  ] {
    if let Some(id) = id {
      anyhow::ensure!(!id.trim().is_empty(), "event.{name} must not be empty");
    }
  }

  // Model validation
  let model = &config.model;
  anyhow::ensure!(
    model.tail_penalty.is_finite(),
    "model.tail_penalty must be finite, got {}",
    model.tail_penalty
  );
  anyhow::ensure!(model.max_iterations > 0, "model.max_iterations must be positive");
  anyhow::ensure!(
    model.tolerance > 0.0 && model.tolerance < 1.0,
    "model.tolerance must be in (0, 1), got {}",
    model.tolerance
  );
  anyhow::ensure!(
    model.max_scale > 0.0,
    "model.max_scale must be positive, got {}",
    model.max_scale
  );
  anyhow::ensure!(
    model.min_uncertainty > 0.0,
    "model.min_uncertainty must be positive, got {}",
    model.min_uncertainty
  );

  // Sweep validation
  anyhow::ensure!(
    config.sweep.min_gap >= 0.0,
    "sweep.min_gap must be non-negative, got {}",
    config.sweep.min_gap
  );
  anyhow::ensure!(
    config.sweep.min_edge > -1.0,
    "sweep.min_edge must be > -1, got {}",
    config.sweep.min_edge
  );
  anyhow::ensure!(
    !config.scanner.run_sweep || event.tab_match.is_some(),
    "scanner.run_sweep requires event.tab_match"
  );

  // Rate limit validation
  anyhow::ensure!(
    config.rate_limits.max_requests_per_second > 0,
    "rate_limits.max_requests_per_second must be positive"
  );

  // API validation
  anyhow::ensure!(config.api.timeout_seconds > 0, "api.timeout_seconds must be positive");

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_load_nonexistent_file() {
    let result = load_config("nonexistent.toml");
    assert!(result.is_err());
  }

  #[test]
  fn test_minimal_config_uses_defaults() {
    let config = parse_config(
      r#"
        [scanner]
        name = "test"

        [event]
        pointsbet_event_id = "1764151"
      "#,
    )
    .unwrap();
    assert_eq!(config.scanner.log_level, "info");
    assert!(!config.scanner.run_sweep);
    assert_eq!(config.sweep.min_gap, 1.0);
    assert_eq!(config.model.max_iterations, 200);
    assert_eq!(config.api.jurisdiction, "NSW");
    assert_eq!(config.rate_limits.max_requests_per_second, 4);
  }

  #[test]
  fn test_no_events_rejected() {
    let err = parse_config("[scanner]\nname = \"x\"\n").unwrap_err();
    assert!(err.to_string().contains("bookmaker event"));
  }

  #[test]
  fn test_sweep_without_tab_rejected() {
    let result = parse_config(
      r#"
        [scanner]
        name = "x"
        run_sweep = true

        [event]
        neds_event_id = "dc48195f-0064-41de-b872-2a10ae8078b2"
      "#,
    );
    assert!(result.is_err());
  }

  #[test]
  fn test_model_section_maps_to_fitter() {
    let config = parse_config(
      r#"
        [scanner]
        name = "x"

        [event]
        tab_match = "Charlotte%20v%20Toronto"

        [model]
        max_iterations = 50
        max_scale = 80.0
      "#,
    )
    .unwrap();
    let fitter = config.model.fitter();
    assert_eq!(fitter.max_iterations, 50);
    assert_eq!(fitter.max_scale, 80.0);
    assert_eq!(fitter.tolerance, 1e-10);
  }
}
