//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer requires
//! from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `LineSource`: One bookmaker's line quotes for an event
//! - `ComboPricer`: A bookmaker's same-game-multi price enquiry

pub mod combo_pricer;
pub mod line_source;
