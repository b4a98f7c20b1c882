//! Configuration Module - TOML-based Scanner Configuration
//!
//! Loads and validates configuration from `config.toml`.
//! Event identifiers, endpoints and model parameters are externalized
//! here - nothing is hardcoded in the domain layer.

pub mod loader;

use serde::Deserialize;

use crate::domain::distribution::FitterConfig;

/// Top-level scanner configuration.
///
/// Loaded from `config.toml` at startup. All fields are validated
/// before any request is made.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Scanner identity and run switches.
  pub scanner: ScannerConfig,
  /// Event identifiers per bookmaker.
  #[serde(default)]
  pub event: EventConfig,
  /// Distribution fit parameters.
  #[serde(default)]
  pub model: ModelConfig,
  /// Multi sweep parameters.
  #[serde(default)]
  pub sweep: SweepConfig,
  /// Bookmaker API endpoints.
  #[serde(default)]
  pub api: ApiConfig,
  /// Request pacing and retries.
  #[serde(default)]
  pub rate_limits: RateLimitConfig,
}

/// Scanner identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ScannerConfig {
  /// Human-readable scanner name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Run the same-game-multi sweep after modelling.
  #[serde(default)]
  pub run_sweep: bool,
}

/// Event identifiers, one per bookmaker. Unset bookmakers are skipped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventConfig {
  /// TAB match path segment, e.g. `Charlotte%20v%20Toronto`.
  pub tab_match: Option<String>,
  /// PointsBet numeric event ID.
  pub pointsbet_event_id: Option<String>,
  /// Neds event UUID.
  pub neds_event_id: Option<String>,
}

/// Distribution fit configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
  /// Favourite/longshot lean applied to reported midpoints.
  #[serde(default)]
  pub tail_penalty: f64,
  /// Solver iteration cap.
  #[serde(default = "default_max_iterations")]
  pub max_iterations: usize,
  /// Relative step tolerance.
  #[serde(default = "default_tolerance")]
  pub tolerance: f64,
  /// Largest scale accepted as a real fit.
  #[serde(default = "default_max_scale")]
  pub max_scale: f64,
  /// Floor for a level's bound width when used as sigma.
  #[serde(default = "default_min_uncertainty")]
  pub min_uncertainty: f64,
}

impl Default for ModelConfig {
  fn default() -> Self {
    Self {
      tail_penalty: 0.0,
      max_iterations: default_max_iterations(),
      tolerance: default_tolerance(),
      max_scale: default_max_scale(),
      min_uncertainty: default_min_uncertainty(),
    }
  }
}

impl ModelConfig {
  /// Solver settings for the domain fitter.
  pub fn fitter(&self) -> FitterConfig {
    FitterConfig {
      max_iterations: self.max_iterations,
      tolerance: self.tolerance,
      max_scale: self.max_scale,
      min_uncertainty: self.min_uncertainty,
    }
  }
}

/// Multi sweep configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SweepConfig {
  /// Minimum handicap distance between paired levels.
  #[serde(default = "default_min_gap")]
  pub min_gap: f64,
  /// Edge over theory at which a result is reported as value.
  #[serde(default)]
  pub min_edge: f64,
}

impl Default for SweepConfig {
  fn default() -> Self {
    Self {
      min_gap: default_min_gap(),
      min_edge: 0.0,
    }
  }
}

/// Bookmaker API endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// TAB info-service base URL.
  #[serde(default = "default_tab_url")]
  pub tab_url: String,
  /// TAB pricing enquiry URL.
  #[serde(default = "default_tab_pricing_url")]
  pub tab_pricing_url: String,
  /// TAB jurisdiction code.
  #[serde(default = "default_jurisdiction")]
  pub jurisdiction: String,
  /// TAB sport path segment.
  #[serde(default = "default_sport")]
  pub sport: String,
  /// TAB competition path segment.
  #[serde(default = "default_competition")]
  pub competition: String,
  /// PointsBet events base URL.
  #[serde(default = "default_pointsbet_url")]
  pub pointsbet_url: String,
  /// Neds event-card base URL.
  #[serde(default = "default_neds_url")]
  pub neds_url: String,
  /// User-Agent header sent with every request.
  #[serde(default = "default_user_agent")]
  pub user_agent: String,
  /// Request timeout in seconds.
  #[serde(default = "default_timeout")]
  pub timeout_seconds: u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      tab_url: default_tab_url(),
      tab_pricing_url: default_tab_pricing_url(),
      jurisdiction: default_jurisdiction(),
      sport: default_sport(),
      competition: default_competition(),
      pointsbet_url: default_pointsbet_url(),
      neds_url: default_neds_url(),
      user_agent: default_user_agent(),
      timeout_seconds: default_timeout(),
    }
  }
}

/// Request pacing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
  /// Maximum requests per second across all bookmakers.
  #[serde(default = "default_max_rps")]
  pub max_requests_per_second: u32,
  /// Maximum retries on transient errors.
  #[serde(default = "default_max_retries")]
  pub max_retries: u32,
  /// Base delay between retries (milliseconds, doubled per attempt).
  #[serde(default = "default_retry_delay")]
  pub retry_base_delay_ms: u64,
}

impl Default for RateLimitConfig {
  fn default() -> Self {
    Self {
      max_requests_per_second: default_max_rps(),
      max_retries: default_max_retries(),
      retry_base_delay_ms: default_retry_delay(),
    }
  }
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

fn default_max_iterations() -> usize {
  200
}

fn default_tolerance() -> f64 {
  1e-10
}

fn default_max_scale() -> f64 {
  1_000.0
}

fn default_min_uncertainty() -> f64 {
  1e-6
}

fn default_min_gap() -> f64 {
  1.0
}

fn default_tab_url() -> String {
  "https://api.beta.tab.com.au/v1/tab-info-service".to_string()
}

fn default_tab_pricing_url() -> String {
  "https://api.beta.tab.com.au/v1/pricing-service/enquiry".to_string()
}

fn default_jurisdiction() -> String {
  "NSW".to_string()
}

fn default_sport() -> String {
  "Basketball".to_string()
}

fn default_competition() -> String {
  "NBA".to_string()
}

fn default_pointsbet_url() -> String {
  "https://api.au.pointsbet.com/api/mes/v3/events".to_string()
}

fn default_neds_url() -> String {
  "https://api.neds.com.au/v2/sport/event-card".to_string()
}

fn default_user_agent() -> String {
  "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36".to_string()
}

fn default_timeout() -> u64 {
  15
}

fn default_max_rps() -> u32 {
  4
}

fn default_max_retries() -> u32 {
  2
}

fn default_retry_delay() -> u64 {
  250
}
