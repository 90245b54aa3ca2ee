// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-call tenant identity and request scoping.
//!
//! Every outbound capability call takes a [`RequestContext`]. It carries the
//! caller's tenant (user token, project scope), the trace request id, and the
//! deadline/cancellation handle that is propagated down to the transport.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::DroneGateError;

/// Default lifetime of a tenant context created with [`TenantContext::new`].
const DEFAULT_TENANT_TTL_HOURS: i64 = 24;

/// Identity and authorization scope of the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantContext {
    pub tenant_id: i64,
    pub user_token: String,
    #[serde(default)]
    pub org_id: String,
    #[serde(default)]
    pub project_uuid: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl TenantContext {
    /// Creates a tenant context that expires in 24 hours.
    pub fn new(tenant_id: i64, user_token: impl Into<String>, project_uuid: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            tenant_id,
            user_token: user_token.into(),
            org_id: String::new(),
            project_uuid: project_uuid.filter(|p| !p.is_empty()),
            permissions: Vec::new(),
            metadata: HashMap::new(),
            created_at: now,
            expires_at: Some(now + chrono::Duration::hours(DEFAULT_TENANT_TTL_HOURS)),
        }
    }

    /// A tenant is usable when it has an id, a user token, and has not expired.
    pub fn is_valid(&self) -> bool {
        if self.tenant_id == 0 || self.user_token.is_empty() {
            return false;
        }
        match self.expires_at {
            Some(expires_at) => Utc::now() <= expires_at,
            None => true,
        }
    }
}

/// Scope of a single outbound call.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    tenant: Option<TenantContext>,
    request_id: Option<String>,
    language: Option<String>,
    deadline: Option<(Instant, Duration)>,
    cancel: CancellationToken,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tenant(mut self, tenant: TenantContext) -> Self {
        self.tenant = Some(tenant);
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Sets an absolute deadline `timeout` from now.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some((Instant::now() + timeout, timeout));
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Returns the tenant, rejecting one that is present but invalid or expired.
    pub fn tenant(&self) -> Result<Option<&TenantContext>, DroneGateError> {
        match &self.tenant {
            Some(tenant) if !tenant.is_valid() => Err(DroneGateError::Validation(
                "tenant context is invalid or expired".to_string(),
            )),
            other => Ok(other.as_ref()),
        }
    }

    /// The caller's request id, or a fresh UUID v4.
    pub fn request_id_or_new(&self) -> String {
        match self.request_id.as_deref() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Drives `fut` under this context's cancellation token and deadline.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, DroneGateError>
    where
        F: Future<Output = Result<T, DroneGateError>>,
    {
        if self.cancel.is_cancelled() {
            return Err(DroneGateError::Cancelled);
        }

        let guarded = async {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => Err(DroneGateError::Cancelled),
                result = fut => result,
            }
        };

        match self.deadline {
            Some((deadline, duration)) => tokio::time::timeout_at(deadline, guarded)
                .await
                .map_err(|_| DroneGateError::Timeout { duration })?,
            None => guarded.await,
        }
    }
}
