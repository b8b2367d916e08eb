//! HTTP server for the Gazette feed aggregator.
//!
//! Exposes the refresh scheduler, article store and translation resolver
//! from `gazette-core` over a JSON API, plus a Prometheus metrics endpoint.

pub mod api;
pub mod metrics;
pub mod state;
