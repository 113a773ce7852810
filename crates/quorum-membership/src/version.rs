//! Best-effort member version probing

use crate::error::{MembershipError, Result};
use crate::member::Member;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-request probe timeout. The sweep is opportunistic health reporting,
/// not a correctness-critical call, so it stays short.
const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Version descriptor served by a member at `GET <peer-url>/version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Version of the server binary answering the probe.
    pub server: String,

    /// Cluster-wide version, present once the cluster has converged on one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
}

/// Probes a member's peer endpoints for its running server version.
///
/// The caller supplies the transport configuration as a pre-built
/// [`reqwest::Client`] (TLS, proxying, and connection reuse are opaque to
/// this probe); the probe only adds a short per-request timeout.
#[derive(Debug, Clone)]
pub struct VersionProbe {
    client: reqwest::Client,
    timeout: Duration,
}

impl VersionProbe {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetch the member's server version via its peer URLs.
    ///
    /// Endpoints are tried in stored order, one request at a time, with no
    /// retries or backoff. The first successfully parsed response wins; if
    /// every endpoint fails, the error from the last endpoint tried is
    /// returned.
    pub async fn probe(&self, member: &Member) -> Result<String> {
        let mut last_err: Option<MembershipError> = None;
        for url in member.peer_urls() {
            let endpoint = format!("{}/version", url.trim_end_matches('/'));
            match self.probe_endpoint(&endpoint).await {
                Ok(versions) => return Ok(versions.server),
                Err(err) => {
                    tracing::debug!(
                        member = %member.id,
                        %endpoint,
                        error = %err,
                        "version probe attempt failed"
                    );
                    last_err = Some(err);
                }
            }
        }
        Err(last_err.unwrap_or(MembershipError::NoPeerUrls))
    }

    async fn probe_endpoint(&self, endpoint: &str) -> Result<VersionInfo> {
        let response = self
            .client
            .get(endpoint)
            .timeout(self.timeout)
            .send()
            .await?;
        Ok(response.json::<VersionInfo>().await?)
    }
}
