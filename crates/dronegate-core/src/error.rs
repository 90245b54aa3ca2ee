// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Dronegate integration layer.
//!
//! Registry lookup misses are not errors: `resolve` reports them as `Ok(None)`.
//! Everything below is a failure the caller has to handle.

use std::time::Duration;

use thiserror::Error;

/// Boxed error source carried by transport, auth and decode failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The primary error type used across all Dronegate crates.
#[derive(Debug, Error)]
pub enum DroneGateError {
    /// Configuration errors (missing vendor settings, invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed identifier or parameter, detected before any network call.
    #[error("validation error: {0}")]
    Validation(String),

    /// Connection, publish, or subscribe failure.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<BoxError>,
    },

    /// A REST call returned a non-2xx HTTP status.
    #[error("{method} {url} returned HTTP {status}")]
    HttpStatus {
        method: String,
        url: String,
        status: u16,
    },

    /// Malformed JSON envelope or telemetry payload.
    #[error("decode error: {message}")]
    Decode {
        message: String,
        source: Option<BoxError>,
    },

    /// Envelope with `code > 0`.
    #[error("API error [{code}]: {message}")]
    Business { code: i64, message: String },

    /// Credential fetch or refresh failure.
    #[error("auth error: {message}")]
    Auth {
        message: String,
        source: Option<BoxError>,
    },

    /// The caller-supplied deadline elapsed.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// The caller's cancellation token fired, or the adapter was torn down.
    #[error("operation cancelled")]
    Cancelled,

    /// Security policy violations (plain HTTP to a remote host, header injection).
    #[error("security error: {0}")]
    Security(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DroneGateError {
    /// Shorthand for a transport error with an underlying cause.
    pub fn transport(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Shorthand for a decode error with an underlying cause.
    pub fn decode(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Decode {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns the business code if this is an envelope-level error.
    pub fn business_code(&self) -> Option<i64> {
        match self {
            Self::Business { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// True for failures detected locally before any network call.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
