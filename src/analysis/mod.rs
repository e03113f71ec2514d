//! Derivations over fetched SSM data.
//!
//! Pure functions only: no I/O, no clock. The metrics in `crate::metrics`
//! call into these after each successful fetch.

pub mod radiation_stats;
pub mod shade;
pub mod uv_risk;
