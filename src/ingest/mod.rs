//! Clients for the Swedish Radiation Safety Authority (SSM) endpoints.
//!
//! Each submodule separates URL/payload construction and response parsing
//! (pure, fixture-testable) from the thin fetch function that performs the
//! request through an `HttpTransport`.

pub mod radiation;
pub mod suntime;
pub mod uvindex;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::model::SsmError;

pub const DEFAULT_RADIATION_BASE: &str = "https://karttjanst.ssm.se";
pub const DEFAULT_AUTHORITY_BASE: &str = "https://www.stralsakerhetsmyndigheten.se";

/// Base URLs of the two SSM hosts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// Host serving `getHistoryForStation`.
    pub radiation_base: String,
    /// Host serving the UV index and sun time APIs.
    pub authority_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            radiation_base: DEFAULT_RADIATION_BASE.to_string(),
            authority_base: DEFAULT_AUTHORITY_BASE.to_string(),
        }
    }
}

impl Endpoints {
    /// Points both hosts at one base URL (used against local fixtures).
    pub fn single(base: &str) -> Endpoints {
        Endpoints {
            radiation_base: base.to_string(),
            authority_base: base.to_string(),
        }
    }

    pub(crate) fn radiation(&self) -> &str {
        self.radiation_base.trim_end_matches('/')
    }

    pub(crate) fn authority(&self) -> &str {
        self.authority_base.trim_end_matches('/')
    }
}

/// Deserializes a response body, keeping the raw body on failure.
pub(crate) fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, SsmError> {
    serde_json::from_str(body).map_err(|e| SsmError::parse(e.to_string(), body))
}
