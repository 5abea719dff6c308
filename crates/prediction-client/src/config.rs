//! Client configuration.
//!
//! Values are layered: built-in defaults, then an optional config file, then
//! `PREDICTION_*` environment variables.
//!
//! ```text
//! rpc_url               PREDICTION_RPC_URL               default http://localhost:9002
//! program_pubkey        PREDICTION_PROGRAM_PUBKEY        required, 32/33-byte hex
//! wall_account_pubkey   PREDICTION_WALL_ACCOUNT_PUBKEY   required, 32/33-byte hex
//! ```

use std::path::Path;

use ::config::builder::DefaultState;
use ::config::{Config, ConfigBuilder, Environment, File, FileFormat};
use arch_tx::Identity;
use reqwest::Url;
use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_RPC_URL: &str = "http://localhost:9002";

const ENV_PREFIX: &str = "PREDICTION";

/// Validated configuration, fixed for the life of a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub rpc_url: Url,
    pub program_id: Identity,
    pub wall_account: Identity,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    rpc_url: String,
    program_pubkey: Option<String>,
    wall_account_pubkey: Option<String>,
}

impl ClientConfig {
    pub fn new(rpc_url: &str, program_id: Identity, wall_account: Identity) -> Result<Self, ConfigError> {
        Ok(ClientConfig {
            rpc_url: parse_url(rpc_url)?,
            program_id,
            wall_account,
        })
    }

    /// Build from hex identity strings, as they appear in deployment files.
    pub fn from_hex(rpc_url: &str, program_hex: &str, wall_account_hex: &str) -> Result<Self, ConfigError> {
        Self::new(
            rpc_url,
            parse_identity("program_pubkey", program_hex)?,
            parse_identity("wall_account_pubkey", wall_account_hex)?,
        )
    }

    /// Load from an optional file plus the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = defaults()?;
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX));
        Self::from_builder(builder)
    }

    /// Load from TOML text only, without consulting the environment.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Self::from_builder(defaults()?.add_source(File::from_str(text, FileFormat::Toml)))
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let raw: RawConfig = builder.build()?.try_deserialize()?;
        let program = raw
            .program_pubkey
            .ok_or_else(|| ConfigError::Missing("program_pubkey".into()))?;
        let wall = raw
            .wall_account_pubkey
            .ok_or_else(|| ConfigError::Missing("wall_account_pubkey".into()))?;
        Self::from_hex(&raw.rpc_url, &program, &wall)
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(Config::builder().set_default("rpc_url", DEFAULT_RPC_URL)?)
}

fn parse_url(s: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(s.trim()).map_err(|e| ConfigError::InvalidUrl(format!("{s}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidUrl(format!("unsupported scheme {other}"))),
    }
}

fn parse_identity(key: &str, hex: &str) -> Result<Identity, ConfigError> {
    if hex.trim().is_empty() {
        return Err(ConfigError::Missing(key.to_string()));
    }
    Identity::from_hex(hex).map_err(|e| ConfigError::InvalidIdentity {
        key: key.to_string(),
        reason: e.to_string(),
    })
}
