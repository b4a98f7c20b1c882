//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` against the
//! bookmakers' HTTP endpoints.

pub mod api;
