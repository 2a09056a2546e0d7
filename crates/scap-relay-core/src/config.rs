//! Configuration module
//!
//! This module provides the env-driven configuration for the relay:
//! storage roots, server binding, and the upstream management server
//! endpoint.

use std::env;
use std::path::PathBuf;

// Common constants
const DEFAULT_PORT: u16 = 8443;
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MAX_BODY_MB: usize = 32;

/// Relay configuration, read once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    /// Primary root: reports successfully forwarded upstream.
    pub reports_dir: PathBuf,
    /// Failed root: reports whose primary write failed. Requires manual
    /// remediation (copy back into the primary root).
    pub failed_dir: PathBuf,
    /// Spool root: reports retained for out-of-band delivery after a
    /// transient forwarding failure.
    pub spool_dir: PathBuf,
    /// Base URL of the management server the relay forwards reports to.
    pub upstream_url: String,
    pub upstream_timeout_secs: u64,
    pub max_body_bytes: usize,
    /// PEM client certificate and key presented to the upstream server
    /// when it requires mutual TLS.
    pub upstream_client_cert: Option<PathBuf>,
    pub upstream_client_key: Option<PathBuf>,
    pub environment: String,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            reports_dir: env::var("REPORTS_DIR")
                .unwrap_or_else(|_| "/var/lib/scap-relay/reports".to_string())
                .into(),
            failed_dir: env::var("FAILED_DIR")
                .unwrap_or_else(|_| "/var/lib/scap-relay/failed".to_string())
                .into(),
            spool_dir: env::var("SPOOL_DIR")
                .unwrap_or_else(|_| "/var/spool/scap-relay".to_string())
                .into(),
            upstream_url: env::var("UPSTREAM_URL")
                .map_err(|_| anyhow::anyhow!("UPSTREAM_URL must be set to the management server base URL"))?,
            upstream_timeout_secs: env::var("UPSTREAM_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_UPSTREAM_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            max_body_bytes: env::var("MAX_BODY_MB")
                .unwrap_or_else(|_| DEFAULT_MAX_BODY_MB.to_string())
                .parse::<usize>()
                .unwrap_or(DEFAULT_MAX_BODY_MB)
                * 1024
                * 1024,
            upstream_client_cert: env::var("UPSTREAM_CLIENT_CERT").ok().map(PathBuf::from),
            upstream_client_key: env::var("UPSTREAM_CLIENT_KEY").ok().map(PathBuf::from),
            environment,
        };

        Ok(config)
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }
}
