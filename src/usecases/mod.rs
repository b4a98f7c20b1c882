//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement the
//! scanner's workflows.
//!
//! Use cases:
//! - `MarketSurvey`: Per-bookmaker ladder + margin model
//! - `MultiSweep`: Same-game-multi pricing sweep over one ladder

pub mod market_survey;
pub mod multi_sweep;
