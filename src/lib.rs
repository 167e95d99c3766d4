//! # Scout Compare
//!
//! Percentile comparison engine for football scouting: position radars,
//! squad-level aggregates and union tables for 2-3 players or teams.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (metric samples, profiles, reports)
//! - **templates**: Static position templates and the all-round axis set
//! - **calculate**: Pure comparison engine (resolver, axes, overlay, squads, union)
//! - **fetch**: HTTP profile source with payload caching
//! - **hydrate**: Bounded-concurrency profile hydration
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod fetch;
pub mod hydrate;
pub mod models;
pub mod templates;

pub use models::*;

use std::time::Duration;

/// Parse a human-friendly duration string (e.g., "6h", "30m", "90s").
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('h') {
        (n, 3600)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        // Default to seconds
        (s, 1)
    };

    let num: u64 = num_str.parse().ok()?;
    Some(Duration::from_secs(num.checked_mul(multiplier)?))
}
