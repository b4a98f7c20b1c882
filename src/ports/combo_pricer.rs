//! Combo Pricer Port - Same-Game-Multi Enquiry Interface
//!
//! Asks a bookmaker what it would pay for two selections combined into
//! one same-game multi. A refusal (legs from the same market group,
//! stale identifiers) surfaces as an error, never as a sentinel price.

use async_trait::async_trait;

use crate::domain::line::LegId;

/// Trait for combination price providers.
///
/// Implementors own their timeout and retry policy; a call must fail
/// rather than hang.
#[async_trait]
pub trait ComboPricer: Send + Sync {
  /// Quoted decimal odds for the two-leg multi.
  ///
  /// # Errors
  /// Returns error if the combination cannot be priced.
  async fn quote_combo(&self, leg_a: &LegId, leg_b: &LegId) -> anyhow::Result<f64>;
}
