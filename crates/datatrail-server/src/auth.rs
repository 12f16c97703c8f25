//! Remote credential check.
//!
//! The server holds no credential state of its own. Each upload triggers
//! one HTTP GET to the configured endpoint with `username` and `password`
//! query parameters; a 2xx response whose body is exactly `"OK"` accepts
//! the upload, anything else rejects it. A connection failure, non-2xx
//! status or timeout also rejects: the check fails closed.

use std::time::Duration;

use tracing::warn;

/// Accept literal expected in the credential response body.
const ACCEPT_BODY: &str = "OK";

pub struct Authenticator {
    base_url: String,
    client: reqwest::Client,
}

impl Authenticator {
    /// Build an authenticator for the given endpoint.
    ///
    /// The timeout bounds the whole round trip; without one, an
    /// unresponsive credential service would hang the upload forever.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    /// Check one credential pair. Returns `false` on reject and on any
    /// transport failure.
    pub async fn check(&self, username: &str, password: &str) -> bool {
        match self.fetch_verdict(username, password).await {
            Ok(body) if body == ACCEPT_BODY => true,
            Ok(body) => {
                warn!(username, body = %body, "credential check rejected upload");
                false
            }
            Err(e) => {
                warn!(username, error = %e, "credential check failed, rejecting upload");
                false
            }
        }
    }

    async fn fetch_verdict(&self, username: &str, password: &str) -> reqwest::Result<String> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("username", username), ("password", password)])
            .send()
            .await?;
        response.error_for_status()?.text().await
    }
}
