//! HTTP server for the gated reaction game.
//!
//! Wires the [`reaction_gate`] access validator and session guard into an axum
//! router, together with configuration, logging and metrics.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
