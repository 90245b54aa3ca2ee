// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-vendor access token ownership with proactive refresh.
//!
//! The exclusive lock is held across the whole check-and-fetch sequence, so
//! concurrent [`CredentialManager::ensure_fresh`] callers never trigger more
//! than one fetch: the first refreshes, the rest observe the fresh expiry.
//! Readers that only need the current token go through an `ArcSwap` and never
//! wait on a refresh in flight.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use dronegate_config::model::CredentialsConfig;
use dronegate_core::{DroneGateError, VendorType};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// A token as issued by a vendor auth endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Lifetime declared by the endpoint, if it declares one.
    pub expires_in: Option<Duration>,
}

impl IssuedToken {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_in: None,
        }
    }
}

/// Fetches new tokens from a vendor.
#[async_trait]
pub trait TokenSource: Send + Sync + 'static {
    async fn fetch(&self) -> Result<IssuedToken, DroneGateError>;
}

/// When and how a manager refreshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialPolicy {
    /// Refresh once the remaining lifetime drops below this.
    pub refresh_threshold: Duration,
    /// Lifetime applied when the source does not declare one.
    pub token_lifetime: Duration,
    pub refresh_enabled: bool,
}

impl Default for CredentialPolicy {
    fn default() -> Self {
        Self {
            refresh_threshold: Duration::from_secs(5 * 60),
            token_lifetime: Duration::from_secs(2 * 60 * 60),
            refresh_enabled: true,
        }
    }
}

impl From<&CredentialsConfig> for CredentialPolicy {
    fn from(config: &CredentialsConfig) -> Self {
        Self {
            refresh_threshold: config.refresh_threshold(),
            token_lifetime: config.token_lifetime(),
            refresh_enabled: true,
        }
    }
}

#[derive(Debug, Default)]
struct CredentialState {
    access_token: String,
    refresh_token: String,
    /// `None` until the first token is set.
    expires_at: Option<Instant>,
}

/// Owns one vendor's token pair and its expiry.
pub struct CredentialManager {
    vendor: VendorType,
    source: Option<Arc<dyn TokenSource>>,
    policy: CredentialPolicy,
    state: RwLock<CredentialState>,
    current: ArcSwap<String>,
}

impl CredentialManager {
    pub fn new(vendor: VendorType, source: Arc<dyn TokenSource>, policy: CredentialPolicy) -> Self {
        Self {
            vendor,
            source: Some(source),
            policy,
            state: RwLock::new(CredentialState::default()),
            current: ArcSwap::from_pointee(String::new()),
        }
    }

    /// A manager holding a fixed token that is never refreshed.
    pub fn with_static_token(vendor: VendorType, token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            vendor,
            source: None,
            policy: CredentialPolicy {
                refresh_enabled: false,
                ..CredentialPolicy::default()
            },
            state: RwLock::new(CredentialState {
                access_token: token.clone(),
                refresh_token: String::new(),
                expires_at: None,
            }),
            current: ArcSwap::from_pointee(token),
        }
    }

    pub fn vendor(&self) -> &VendorType {
        &self.vendor
    }

    pub fn policy(&self) -> &CredentialPolicy {
        &self.policy
    }

    /// Replace the token pair; expiry becomes `now + ttl`.
    pub async fn set_token(&self, access: impl Into<String>, refresh: impl Into<String>, ttl: Duration) {
        let mut state = self.state.write().await;
        self.store(&mut state, access.into(), refresh.into(), ttl);
    }

    /// The current access token, without waiting for any refresh.
    pub fn current_token(&self) -> String {
        self.current.load().as_ref().clone()
    }

    /// Remaining lifetime, or `None` if no expiring token has been set.
    pub async fn time_to_expiry(&self) -> Option<Duration> {
        let state = self.state.read().await;
        state
            .expires_at
            .map(|at| at.saturating_duration_since(Instant::now()))
    }

    /// Refresh the token if it expires within the threshold, then return it.
    ///
    /// On fetch failure the previous token stays in place and the error is
    /// returned.
    pub async fn ensure_fresh(&self) -> Result<String, DroneGateError> {
        let mut state = self.state.write().await;

        let Some(source) = self.source.as_ref().filter(|_| self.policy.refresh_enabled) else {
            return Ok(state.access_token.clone());
        };

        if !self.needs_refresh(&state) {
            return Ok(state.access_token.clone());
        }

        debug!(vendor = %self.vendor, "refreshing access token");
        let issued = match source.fetch().await {
            Ok(issued) => issued,
            Err(e) => {
                warn!(vendor = %self.vendor, error = %e, "token refresh failed, keeping previous token");
                return Err(e);
            }
        };

        if issued.access_token.is_empty() {
            warn!(vendor = %self.vendor, "token endpoint returned an empty access token");
            return Err(DroneGateError::Auth {
                message: format!("{} token endpoint returned an empty access token", self.vendor),
                source: None,
            });
        }

        let ttl = issued.expires_in.unwrap_or(self.policy.token_lifetime);
        let refresh = issued
            .refresh_token
            .unwrap_or_else(|| issued.access_token.clone());
        self.store(&mut state, issued.access_token, refresh, ttl);
        info!(vendor = %self.vendor, ttl_secs = ttl.as_secs(), "access token refreshed");

        Ok(state.access_token.clone())
    }

    fn needs_refresh(&self, state: &CredentialState) -> bool {
        match state.expires_at {
            None => true,
            Some(at) => at.saturating_duration_since(Instant::now()) < self.policy.refresh_threshold,
        }
    }

    fn store(&self, state: &mut CredentialState, access: String, refresh: String, ttl: Duration) {
        state.expires_at = Some(Instant::now() + ttl);
        state.refresh_token = refresh;
        state.access_token = access;
        self.current.store(Arc::new(state.access_token.clone()));
    }
}

impl std::fmt::Debug for CredentialManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialManager")
            .field("vendor", &self.vendor)
            .field("policy", &self.policy)
            .field("has_token", &!self.current.load().is_empty())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Issues `token-N` on the N-th fetch, optionally after a delay.
    struct Counting {
        calls: AtomicUsize,
        delay: Duration,
        lifetime: Option<Duration>,
    }

    impl Counting {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
                lifetime: None,
            }
        }
    }

    #[async_trait]
    impl TokenSource for Counting {
        async fn fetch(&self) -> Result<IssuedToken, DroneGateError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            Ok(IssuedToken {
                access_token: format!("token-{n}"),
                refresh_token: None,
                expires_in: self.lifetime,
            })
        }
    }

    struct Failing;

    #[async_trait]
    impl TokenSource for Failing {
        async fn fetch(&self) -> Result<IssuedToken, DroneGateError> {
            Err(DroneGateError::Auth {
                message: "endpoint unreachable".into(),
                source: None,
            })
        }
    }

    struct Empty;

    #[async_trait]
    impl TokenSource for Empty {
        async fn fetch(&self) -> Result<IssuedToken, DroneGateError> {
            Ok(IssuedToken::new(""))
        }
    }

    fn manager(source: Arc<dyn TokenSource>) -> CredentialManager {
        CredentialManager::new(VendorType::from("dji_dock2"), source, CredentialPolicy::default())
    }

    #[tokio::test(start_paused = true)]
    async fn unprimed_manager_fetches_on_first_call() {
        let source = Arc::new(Counting::new());
        let manager = manager(source.clone());
        assert_eq!(manager.current_token(), "");
        assert_eq!(manager.ensure_fresh().await.unwrap(), "token-1");
        assert_eq!(manager.current_token(), "token-1");
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_token_is_not_refetched() {
        let source = Arc::new(Counting::new());
        let manager = manager(source.clone());
        manager.set_token("T0", "R0", Duration::from_secs(3600)).await;
        assert_eq!(manager.ensure_fresh().await.unwrap(), "T0");
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn short_lived_token_is_refreshed_later() {
        let source = Arc::new(Counting::new());
        let manager = manager(source.clone());
        manager.set_token("T0", "R0", Duration::from_secs(5)).await;
        tokio::time::advance(Duration::from_secs(6)).await;

        assert_eq!(manager.ensure_fresh().await.unwrap(), "token-1");
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        let remaining = manager.time_to_expiry().await.unwrap();
        assert_eq!(remaining, CredentialPolicy::default().token_lifetime);
    }

    #[tokio::test(start_paused = true)]
    async fn declared_lifetime_wins_over_policy() {
        let source = Arc::new(Counting {
            lifetime: Some(Duration::from_secs(900)),
            ..Counting::new()
        });
        let manager = manager(source);
        manager.ensure_fresh().await.unwrap();
        assert_eq!(manager.time_to_expiry().await, Some(Duration::from_secs(900)));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fetch_keeps_previous_token() {
        let manager = manager(Arc::new(Failing));
        manager.set_token("T0", "R0", Duration::from_secs(60)).await;

        let err = manager.ensure_fresh().await.unwrap_err();
        assert!(matches!(err, DroneGateError::Auth { .. }));
        assert_eq!(manager.current_token(), "T0");
        assert_eq!(manager.time_to_expiry().await, Some(Duration::from_secs(60)));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_token_from_source_is_an_auth_error() {
        let manager = manager(Arc::new(Empty));
        let err = manager.ensure_fresh().await.unwrap_err();
        assert!(err.to_string().contains("empty access token"));
        assert_eq!(manager.current_token(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_share_one_fetch() {
        let source = Arc::new(Counting {
            delay: Duration::from_millis(200),
            ..Counting::new()
        });
        let manager = Arc::new(manager(source.clone()));

        let callers: Vec<_> = (0..16)
            .map(|_| {
                let manager = Arc::clone(&manager);
                tokio::spawn(async move { manager.ensure_fresh().await })
            })
            .collect();

        for caller in callers {
            assert_eq!(caller.await.unwrap().unwrap(), "token-1");
        }
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn static_token_is_never_refreshed() {
        let manager = CredentialManager::with_static_token(VendorType::from("fh2"), "org-token");
        assert!(!manager.policy().refresh_enabled);
        assert_eq!(manager.ensure_fresh().await.unwrap(), "org-token");
        assert_eq!(manager.current_token(), "org-token");
        assert_eq!(manager.time_to_expiry().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_refresh_returns_stale_token() {
        let source = Arc::new(Counting::new());
        let manager = CredentialManager::new(
            VendorType::from("dji_dock2"),
            source.clone(),
            CredentialPolicy {
                refresh_enabled: false,
                ..CredentialPolicy::default()
            },
        );
        manager.set_token("T0", "R0", Duration::from_secs(1)).await;
        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(manager.ensure_fresh().await.unwrap(), "T0");
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn policy_from_config() {
        let config = CredentialsConfig {
            refresh_interval_secs: 60,
            refresh_threshold_secs: 120,
            token_expires_in_secs: 3600,
        };
        let policy = CredentialPolicy::from(&config);
        assert_eq!(policy.refresh_threshold, Duration::from_secs(120));
        assert_eq!(policy.token_lifetime, Duration::from_secs(3600));
        assert!(policy.refresh_enabled);
    }
}
