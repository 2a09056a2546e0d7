//! Forwarding reports to the management server.
//!
//! The upstream contract is small: it accepts a report body plus routing
//! metadata and answers with the id it assigned, or fails. Failures are
//! classified into a tagged enum so the ingestor's spool decision is an
//! exhaustive match rather than a catch-list.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use scap_relay_core::models::ScanReport;
use scap_relay_core::Config;
use thiserror::Error;

/// Receipt for a report the management server accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardReceipt {
    /// Id assigned upstream. Authoritative for the primary storage path.
    pub report_id: String,
}

#[derive(Debug, Error)]
pub enum ForwardError {
    /// The management server could not be reached.
    #[error("Failed to connect to the management server: {0}")]
    Connect(String),

    /// The request did not complete within the configured deadline.
    #[error("Forwarding timed out: {0}")]
    Timeout(String),

    /// The exchange completed but the response was not protocol-shaped.
    #[error("Malformed response from the management server: {0}")]
    Protocol(String),

    /// The server answered and refused the report.
    #[error("Management server rejected the report: status {status}")]
    Rejected { status: u16 },

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl ForwardError {
    /// The recognized transient set: failures where a later delivery
    /// attempt can succeed, so spooling the report is worthwhile.
    pub fn is_transient(&self) -> bool {
        match self {
            ForwardError::Connect(_) | ForwardError::Timeout(_) | ForwardError::Protocol(_) => {
                true
            }
            ForwardError::Rejected { .. } | ForwardError::Unexpected(_) => false,
        }
    }
}

/// The external forwarding collaborator.
#[async_trait]
pub trait Forwarder: Send + Sync {
    async fn forward(&self, report: &ScanReport) -> Result<ForwardReceipt, ForwardError>;
}

/// Forwarder backed by the management server's HTTP API.
#[derive(Clone)]
pub struct UpstreamForwarder {
    client: Client,
    base_url: String,
}

impl UpstreamForwarder {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, anyhow::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(UpstreamForwarder {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build from configuration, presenting the relay's client
    /// certificate when the upstream requires mutual TLS.
    pub fn from_config(config: &Config) -> Result<Self, anyhow::Error> {
        let mut builder = Client::builder().timeout(Duration::from_secs(config.upstream_timeout_secs));

        if let (Some(cert), Some(key)) =
            (&config.upstream_client_cert, &config.upstream_client_key)
        {
            let mut pem = std::fs::read(cert)
                .with_context(|| format!("Failed to read client certificate {}", cert.display()))?;
            pem.extend(
                std::fs::read(key)
                    .with_context(|| format!("Failed to read client key {}", key.display()))?,
            );
            let identity = reqwest::Identity::from_pem(&pem)
                .context("Failed to load client TLS identity")?;
            builder = builder.use_rustls_tls().identity(identity);
        }

        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(UpstreamForwarder {
            client,
            base_url: config.upstream_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Forwarder for UpstreamForwarder {
    async fn forward(&self, report: &ScanReport) -> Result<ForwardReceipt, ForwardError> {
        let url = format!(
            "{}/api/compliance/policies/{}/reports",
            self.base_url, report.policy_id
        );

        tracing::debug!(
            url = %url,
            common_name = %report.common_name,
            size_bytes = report.bytes().len(),
            "Forwarding report upstream"
        );

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/x-bzip2")
            .header("X-Client-CN", &report.common_name)
            .query(&[("date", report.timestamp().to_string())])
            .body(report.bytes().clone())
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ForwardError::Rejected {
                status: status.as_u16(),
            });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ForwardError::Protocol(e.to_string()))?;

        receipt_from_json(&body)
    }
}

fn classify_transport_error(err: reqwest::Error) -> ForwardError {
    if err.is_timeout() {
        ForwardError::Timeout(err.to_string())
    } else if err.is_connect() {
        ForwardError::Connect(err.to_string())
    } else if err.is_decode() || err.is_body() || err.is_request() {
        ForwardError::Protocol(err.to_string())
    } else {
        ForwardError::Unexpected(err.into())
    }
}

/// The upstream answers `{"id": ...}`; some deployments send the id as a
/// JSON number, some as a string. Normalize to a string.
fn receipt_from_json(body: &serde_json::Value) -> Result<ForwardReceipt, ForwardError> {
    match body.get("id") {
        Some(serde_json::Value::Number(n)) => Ok(ForwardReceipt {
            report_id: n.to_string(),
        }),
        Some(serde_json::Value::String(s)) if !s.is_empty() => Ok(ForwardReceipt {
            report_id: s.clone(),
        }),
        _ => Err(ForwardError::Protocol(
            "response is missing the assigned report id".to_string(),
        )),
    }
}
