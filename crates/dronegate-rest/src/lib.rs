// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authenticated REST calls for cloud vendor adapters.
//!
//! [`RestClient`] attaches the tenant headers, applies the caller's deadline
//! and cancellation, and unwraps the `{code, message, data}` response
//! envelope.

pub mod client;
pub mod envelope;

pub use client::{RestClient, RestRequest, USER_AGENT};
pub use envelope::{ApiEnvelope, decode_envelope};
