// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! REST executor with tenant-aware headers.

use std::sync::Arc;
use std::time::Duration;

use dronegate_auth::CredentialManager;
use dronegate_core::{DroneGateError, RequestContext};
use dronegate_security::validate_header;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use crate::envelope::decode_envelope;

pub const USER_AGENT: &str = concat!("Dronegate/", env!("CARGO_PKG_VERSION"));

const HEADER_REQUEST_ID: &str = "X-Request-Id";
const HEADER_LANGUAGE: &str = "X-Language";
const HEADER_USER_TOKEN: &str = "X-User-Token";
const HEADER_PROJECT_UUID: &str = "X-Project-Uuid";

/// One call: method, path under the base URL, query pairs and optional JSON body.
#[derive(Debug, Clone)]
pub struct RestRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
}

impl RestRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Executes authenticated calls against one vendor host.
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    language: String,
    /// Token used when the call carries no tenant.
    credentials: Option<Arc<CredentialManager>>,
    /// Project scope used when the tenant names none.
    default_project: Option<String>,
    request_timeout: Option<Duration>,
}

impl RestClient {
    /// `http` should come from `dronegate_security::build_secure_client`.
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            language: language.into(),
            credentials: None,
            default_project: None,
            request_timeout: None,
        }
    }

    pub fn with_credentials(mut self, credentials: Arc<CredentialManager>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_default_project(mut self, project_uuid: Option<String>) -> Self {
        self.default_project = project_uuid.filter(|p| !p.is_empty());
        self
    }

    /// Upper bound for a single HTTP exchange, independent of the caller's deadline.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of `request`, query included.
    pub fn url_for(&self, request: &RestRequest) -> Result<url::Url, DroneGateError> {
        let path = request.path.trim_start_matches('/');
        let raw = format!("{}/{}", self.base_url, path);
        let mut url = url::Url::parse(&raw)
            .map_err(|e| DroneGateError::Validation(format!("invalid request URL `{raw}`: {e}")))?;
        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &request.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Headers for a call made under `ctx`, validated for injection.
    pub fn headers_for(&self, ctx: &RequestContext) -> Result<Vec<(&'static str, String)>, DroneGateError> {
        let tenant = ctx.tenant()?;

        let token = match tenant {
            Some(tenant) => tenant.user_token.clone(),
            None => self
                .credentials
                .as_ref()
                .map(|c| c.current_token())
                .unwrap_or_default(),
        };
        if token.is_empty() {
            return Err(DroneGateError::Auth {
                message: "no user token available for request".to_string(),
                source: None,
            });
        }

        let language = ctx.language().unwrap_or(&self.language).to_string();
        let mut headers = vec![
            (HEADER_REQUEST_ID, ctx.request_id_or_new()),
            (HEADER_LANGUAGE, language),
            (HEADER_USER_TOKEN, token),
        ];

        let project = tenant
            .and_then(|t| t.project_uuid.clone())
            .or_else(|| self.default_project.clone());
        if let Some(project) = project {
            headers.push((HEADER_PROJECT_UUID, project));
        }

        for (key, value) in &headers {
            validate_header(key, value)?;
        }
        Ok(headers)
    }

    /// Send `request` and unwrap the response envelope.
    pub async fn execute(&self, ctx: &RequestContext, request: RestRequest) -> Result<Value, DroneGateError> {
        let url = self.url_for(&request)?;
        let headers = self.headers_for(ctx)?;
        let method = request.method.clone();

        debug!(
            method = %method,
            path = %url.path(),
            request_id = %headers[0].1,
            "sending vendor request"
        );

        let mut builder = self
            .http
            .request(method.clone(), url.clone())
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/json");
        for (key, value) in headers {
            builder = builder.header(key, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = self.request_timeout {
            builder = builder.timeout(timeout);
        }
        let request_timeout = self.request_timeout;

        ctx.run(async move {
            let response = match builder.send().await {
                Ok(response) => response,
                Err(e) if e.is_timeout() => {
                    return Err(DroneGateError::Timeout {
                        duration: request_timeout.unwrap_or_default(),
                    });
                }
                Err(e) => {
                    return Err(DroneGateError::transport(
                        format!("{method} {} failed", url.path()),
                        e,
                    ));
                }
            };

            let status = response.status();
            if !status.is_success() {
                return Err(DroneGateError::HttpStatus {
                    method: method.to_string(),
                    url: url.path().to_string(),
                    status: status.as_u16(),
                });
            }

            let body = response
                .bytes()
                .await
                .map_err(|e| DroneGateError::transport("failed to read response body", e))?;
            decode_envelope(&body)
        })
        .await
    }
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url)
            .field("language", &self.language)
            .field("default_project", &self.default_project)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use dronegate_core::{TenantContext, VendorType};

    use super::*;

    fn client() -> RestClient {
        RestClient::new(reqwest::Client::new(), "https://fh.example.com/", "zh")
    }

    #[test]
    fn url_joins_base_path_and_query() {
        let request = RestRequest::get("/openapi/v0.1/project")
            .query("page", "1")
            .query("q", "north field");
        let url = client().url_for(&request).unwrap();
        assert_eq!(
            url.as_str(),
            "https://fh.example.com/openapi/v0.1/project?page=1&q=north+field"
        );
    }

    #[test]
    fn tenant_headers_take_precedence() {
        let credentials = Arc::new(CredentialManager::with_static_token(
            VendorType::from("fh2"),
            "org-token",
        ));
        let client = client()
            .with_credentials(credentials)
            .with_default_project(Some("default-project".into()));
        let tenant = TenantContext::new(7, "tenant-token", Some("tenant-project".into()));
        let ctx = RequestContext::new()
            .with_tenant(tenant)
            .with_request_id("req-1")
            .with_language("en");

        let headers = client.headers_for(&ctx).unwrap();
        assert_eq!(
            headers,
            vec![
                ("X-Request-Id", "req-1".to_string()),
                ("X-Language", "en".to_string()),
                ("X-User-Token", "tenant-token".to_string()),
                ("X-Project-Uuid", "tenant-project".to_string()),
            ]
        );
    }

    #[test]
    fn falls_back_to_credentials_and_default_project() {
        let credentials = Arc::new(CredentialManager::with_static_token(
            VendorType::from("fh2"),
            "org-token",
        ));
        let client = client()
            .with_credentials(credentials)
            .with_default_project(Some("default-project".into()));

        let headers = client.headers_for(&RequestContext::new()).unwrap();
        assert_eq!(headers[1], ("X-Language", "zh".to_string()));
        assert_eq!(headers[2], ("X-User-Token", "org-token".to_string()));
        assert_eq!(headers[3], ("X-Project-Uuid", "default-project".to_string()));
    }

    #[test]
    fn missing_token_is_auth_error() {
        let err = client().headers_for(&RequestContext::new()).unwrap_err();
        assert!(matches!(err, DroneGateError::Auth { .. }));
    }

    #[test]
    fn header_injection_is_rejected() {
        let tenant = TenantContext::new(7, "tok\r\nX-Admin: 1", None);
        let ctx = RequestContext::new().with_tenant(tenant);
        assert!(matches!(
            client().headers_for(&ctx),
            Err(DroneGateError::Security(_))
        ));
    }

    #[test]
    fn user_agent_carries_version() {
        assert!(USER_AGENT.starts_with("Dronegate/"));
    }
}
