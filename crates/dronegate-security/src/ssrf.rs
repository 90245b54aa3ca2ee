// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! DNS resolver that refuses to hand private addresses to the HTTP client.
//!
//! Vendor hosts come from configuration, so a hostname pointing at an internal
//! service (or the cloud metadata endpoint) is blocked unless the operator
//! lists the address in `security.allowed_private_ips`.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use dronegate_core::DroneGateError;
use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use tracing::{debug, warn};

pub struct SsrfSafeResolver {
    allowed_private_ips: Vec<IpAddr>,
}

impl SsrfSafeResolver {
    /// Unparseable entries are ignored; config validation reports them.
    pub fn new(allowed: Vec<String>) -> Self {
        Self {
            allowed_private_ips: allowed.iter().filter_map(|s| s.parse().ok()).collect(),
        }
    }

    /// RFC 1918, loopback, link-local, broadcast, unspecified, the metadata
    /// endpoint, and the IPv6 loopback/unique-local/link-local ranges.
    pub fn is_private(ip: &IpAddr) -> bool {
        match ip {
            IpAddr::V4(v4) => {
                v4.is_private()
                    || v4.is_loopback()
                    || v4.is_link_local()
                    || v4.is_broadcast()
                    || v4.is_unspecified()
                    || *v4 == Ipv4Addr::new(169, 254, 169, 254)
            }
            IpAddr::V6(v6) => {
                v6.is_loopback()
                    || v6.is_unspecified()
                    || (v6.segments()[0] & 0xfe00) == 0xfc00
                    || (v6.segments()[0] & 0xffc0) == 0xfe80
            }
        }
    }

    fn permits(&self, ip: &IpAddr) -> bool {
        !Self::is_private(ip) || self.allowed_private_ips.contains(ip)
    }
}

impl Resolve for SsrfSafeResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let allowed = self.allowed_private_ips.clone();
        let hostname = name.as_str().to_string();

        Box::pin(async move {
            let resolver = SsrfSafeResolver {
                allowed_private_ips: allowed,
            };
            let addrs: Vec<SocketAddr> = tokio::net::lookup_host(format!("{hostname}:0"))
                .await
                .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> { Box::new(e) })?
                .collect();

            let filtered: Vec<SocketAddr> = addrs
                .into_iter()
                .filter(|addr| {
                    let ip = addr.ip();
                    let ok = resolver.permits(&ip);
                    if !ok {
                        warn!(ip = %ip, host = %hostname, "SSRF blocked: resolved to private IP");
                    } else if SsrfSafeResolver::is_private(&ip) {
                        debug!(ip = %ip, host = %hostname, "allowing configured private IP");
                    }
                    ok
                })
                .collect();

            if filtered.is_empty() {
                let err: Box<dyn std::error::Error + Send + Sync> =
                    format!("SSRF blocked: {hostname} resolves only to private IPs").into();
                return Err(err);
            }

            let addrs: Addrs = Box::new(filtered.into_iter());
            Ok(addrs)
        })
    }
}

/// Static check for URLs that name a private IP literal.
///
/// Hostnames pass; they are filtered at resolve time.
pub fn validate_url_host(url: &str, allowed: &[String]) -> Result<(), DroneGateError> {
    let Ok(parsed) = url::Url::parse(url) else {
        return Ok(());
    };
    let ip = match parsed.host() {
        Some(url::Host::Ipv4(v4)) => IpAddr::V4(v4),
        Some(url::Host::Ipv6(v6)) => IpAddr::V6(v6),
        _ => return Ok(()),
    };
    if SsrfSafeResolver::new(allowed.to_vec()).permits(&ip) {
        return Ok(());
    }
    warn!(ip = %ip, url = %url, "SSRF blocked: URL targets private IP");
    Err(DroneGateError::Security(format!(
        "SSRF blocked: URL targets private IP {ip}"
    )))
}
