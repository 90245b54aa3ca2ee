// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vendor credentials for the Dronegate integration layer.
//!
//! A [`CredentialManager`] owns one vendor's token pair and refreshes it
//! through a [`TokenSource`] shortly before expiry. The [`RefreshScheduler`]
//! drives that check periodically for every live adapter instance.

pub mod credential;
pub mod scheduler;
pub mod source;

pub use credential::{CredentialManager, CredentialPolicy, IssuedToken, TokenSource};
pub use scheduler::RefreshScheduler;
pub use source::HttpTokenSource;
