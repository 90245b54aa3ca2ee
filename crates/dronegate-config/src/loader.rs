// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! `./dronegate.toml` > `~/.config/dronegate/dronegate.toml` > `/etc/dronegate/dronegate.toml`,
//! with environment variable overrides via the `DRONEGATE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::DroneGateConfig;

/// Top-level sections, used to turn `DRONEGATE_DJI_GATEWAY_SN` into `dji.gateway_sn`.
const SECTIONS: &[&str] = &[
    "gateway",
    "plugins",
    "credentials",
    "dji",
    "mqtt",
    "fh2",
    "security",
];

pub(crate) const SYSTEM_CONFIG_PATH: &str = "/etc/dronegate/dronegate.toml";
pub(crate) const LOCAL_CONFIG_PATH: &str = "dronegate.toml";

/// Path of the per-user config file, if a config directory exists.
pub(crate) fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("dronegate/dronegate.toml"))
}

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/dronegate/dronegate.toml`
/// 3. `~/.config/dronegate/dronegate.toml`
/// 4. `./dronegate.toml`
/// 5. `DRONEGATE_*` environment variables
pub fn load_config() -> Result<DroneGateConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<DroneGateConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DroneGateConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one explicit file, with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<DroneGateConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DroneGateConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the layered Figment before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(DroneGateConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(env_provider())
}

/// Environment provider with explicit section mapping.
///
/// Splitting on `_` would break keys that contain underscores:
/// `DRONEGATE_DJI_GATEWAY_SN` must become `dji.gateway_sn`, not `dji.gateway.sn`.
fn env_provider() -> Env {
    Env::prefixed("DRONEGATE_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
