//! Domain layer - Core pricing and modelling logic.
//!
//! Pure, synchronous arithmetic over normalized line quotes: probability
//! bounds, the margin-of-victory fit and two-leg multi pricing.
//! No I/O here (hexagonal architecture inner ring).

pub mod distribution;
pub mod error;
pub mod line;
pub mod margin;
pub mod odds;

// Re-export core types for convenience
pub use distribution::{DistributionFitter, DistributionModel, FitterConfig};
pub use error::{DomainError, FitError};
pub use line::{Handicap, LegId, LineLadder, LineRecord, MarketKind, Side};
pub use margin::{MarginQuote, combine};
pub use odds::ProbabilityBounds;
