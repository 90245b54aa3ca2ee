// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Dronegate integration tests.
//!
//! Provides mock collaborators and a registry harness for fast,
//! deterministic tests without a vendor cloud or an MQTT broker.
//!
//! # Components
//!
//! - [`MockTokenSource`] - token endpoint with scripted failures and latency
//! - [`FailingConnector`] - transport connector that refuses every connection
//! - [`TestHarness`] - registry wired to an in-process broker and mock tokens

pub mod harness;
pub mod mock_connector;
pub mod mock_token;

pub use harness::{TEST_DOCK_SN, TEST_GATEWAY_SN, TestHarness, test_config};
pub use mock_connector::FailingConnector;
pub use mock_token::MockTokenSource;
