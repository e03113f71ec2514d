//! Radiation and UV monitoring against the Swedish Radiation Safety
//! Authority (SSM) public APIs.
//!
//! Three metrics per configured entry: radiation level from a monitoring
//! station, the UV index for a forecast location, and the safe sun time for
//! a skin type at that location.

pub mod analysis;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod scheduler;
pub mod stations;
pub mod timewindow;
pub mod transport;
pub mod verify;
