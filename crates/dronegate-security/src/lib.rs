// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound security enforcement for the Dronegate integration layer.
//!
//! TLS policy and an SSRF-filtering resolver for the shared HTTP client,
//! header-injection checks, identifier validation run before any vendor call,
//! and secret redaction for log output.

pub mod headers;
pub mod redact;
pub mod ssrf;
pub mod tls;
pub mod validator;

pub use headers::{MAX_HEADER_KEY_LEN, MAX_HEADER_VALUE_LEN, validate_header};
pub use redact::{RedactingWriter, redact};
pub use ssrf::SsrfSafeResolver;
pub use tls::{build_secure_client, is_localhost, validate_url};
pub use validator::InputValidator;
