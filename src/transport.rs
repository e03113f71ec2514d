// Shared HTTP transport for all SSM endpoints.
//
// Every metric talks to the authority through `HttpTransport`, so the
// pooled blocking client is built once and handed out behind an `Arc`.
// Tests substitute a scripted implementation serving fixture bodies.

use std::sync::Arc;
use std::time::Duration;

use crate::model::SsmError;

/// Status and raw body of a completed request. Non-200 is not an error here;
/// callers decide how to treat the status.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Turns a non-200 response into `SsmError::HttpStatus`.
    pub fn require_ok(self, url: &str) -> Result<HttpResponse, SsmError> {
        if self.is_ok() {
            Ok(self)
        } else {
            Err(SsmError::HttpStatus {
                url: url.to_string(),
                status: self.status,
                body: self.body,
            })
        }
    }
}

/// The request surface the metrics need. Implementations must be safe to
/// share between metric worker threads.
pub trait HttpTransport: Send + Sync {
    fn get(&self, url: &str) -> Result<HttpResponse, SsmError>;

    fn post_json(&self, url: &str, payload: &serde_json::Value) -> Result<HttpResponse, SsmError>;
}

/// Shared transport handle, as held by each integration context.
pub type SharedTransport = Arc<dyn HttpTransport>;

/// Settings for building the reqwest client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("ssm_service/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// `HttpTransport` backed by `reqwest::blocking::Client`.
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new(config: &TransportConfig) -> Result<ReqwestTransport, SsmError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| SsmError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(ReqwestTransport { client })
    }

    pub fn shared(config: &TransportConfig) -> Result<SharedTransport, SsmError> {
        Ok(Arc::new(Self::new(config)?))
    }

    fn finish(url: &str, response: reqwest::blocking::Response) -> Result<HttpResponse, SsmError> {
        let status = response.status().as_u16();
        let body = response.text().map_err(|e| transport_error(url, &e))?;
        Ok(HttpResponse { status, body })
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, SsmError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .map_err(|e| transport_error(url, &e))?;
        Self::finish(url, response)
    }

    fn post_json(&self, url: &str, payload: &serde_json::Value) -> Result<HttpResponse, SsmError> {
        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .map_err(|e| transport_error(url, &e))?;
        Self::finish(url, response)
    }
}

fn transport_error(url: &str, err: &reqwest::Error) -> SsmError {
    let message = if err.is_timeout() {
        format!("timeout: {}", err)
    } else {
        err.to_string()
    };
    SsmError::Transport {
        url: url.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_ok_passes_200_through() {
        let response = HttpResponse { status: 200, body: "{}".into() };
        assert_eq!(response.clone().require_ok("u"), Ok(response));
    }

    #[test]
    fn test_require_ok_keeps_status_and_body() {
        let response = HttpResponse { status: 502, body: "bad gateway".into() };
        assert_eq!(
            response.require_ok("https://karttjanst.ssm.se/x"),
            Err(SsmError::HttpStatus {
                url: "https://karttjanst.ssm.se/x".into(),
                status: 502,
                body: "bad gateway".into(),
            })
        );
    }

    #[test]
    fn test_default_config_uses_thirty_second_timeout() {
        let config = TransportConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("ssm_service/"));
    }
}
