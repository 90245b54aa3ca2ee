// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! TLS enforcement for outbound HTTP connections.
//!
//! Every vendor REST call and token fetch goes through the client built here.

use std::sync::Arc;
use std::time::Duration;

use dronegate_config::model::SecurityConfig;
use dronegate_core::DroneGateError;
use tracing::error;

use crate::ssrf::SsrfSafeResolver;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build a reqwest::Client with security defaults.
///
/// - Minimum TLS 1.2.
/// - SSRF-safe DNS resolver honouring `allowed_private_ips`.
/// - No automatic redirects: vendor endpoints never redirect, and following
///   one could leave the validated host.
pub fn build_secure_client(config: &SecurityConfig) -> Result<reqwest::Client, DroneGateError> {
    let resolver = SsrfSafeResolver::new(config.allowed_private_ips.clone());

    reqwest::Client::builder()
        .min_tls_version(reqwest::tls::Version::TLS_1_2)
        .dns_resolver(Arc::new(resolver))
        .connect_timeout(CONNECT_TIMEOUT)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| {
            error!("failed to build secure HTTP client: {e}");
            DroneGateError::Security(format!("failed to build secure HTTP client: {e}"))
        })
}

/// Validate a URL against the TLS policy.
///
/// Localhost is exempt. Remote hosts must use HTTPS unless `require_tls`
/// is switched off.
pub fn validate_url(config: &SecurityConfig, url: &str) -> Result<(), DroneGateError> {
    let parsed = url::Url::parse(url)
        .map_err(|e| DroneGateError::Security(format!("invalid URL `{url}`: {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(DroneGateError::Security(format!(
            "unsupported URL scheme `{}`",
            parsed.scheme()
        )));
    }

    let host = parsed.host_str().unwrap_or("");
    if is_localhost(host) || !config.require_tls {
        return Ok(());
    }

    if parsed.scheme() != "https" {
        error!(url = %url, "TLS required for remote connections");
        return Err(DroneGateError::Security(
            "TLS required for remote connections -- use HTTPS".to_string(),
        ));
    }

    Ok(())
}

/// Check if an address refers to localhost.
pub fn is_localhost(addr: &str) -> bool {
    matches!(addr, "127.0.0.1" | "::1" | "localhost" | "[::1]") || addr.starts_with("127.")
}
