//! Configuration Management
//!
//! Persistent provider settings plus the environment overrides. Secrets
//! are read from the environment only and never written to disk.

use crate::azure::auth::DEFAULT_AUTHORITY;
use crate::azure::{CredentialSource, DEFAULT_ENDPOINT};
use crate::error::ProviderError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const ENV_SUBSCRIPTION_ID: &str = "ARM_SUBSCRIPTION_ID";
pub const ENV_TENANT_ID: &str = "ARM_TENANT_ID";
pub const ENV_CLIENT_ID: &str = "ARM_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "ARM_CLIENT_SECRET";
pub const ENV_ACCESS_TOKEN: &str = "ARM_ACCESS_TOKEN";
pub const ENV_ENDPOINT: &str = "ARM_ENDPOINT";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub subscription_id: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    /// Management endpoint, e.g. for sovereign clouds
    #[serde(default)]
    pub endpoint: Option<String>,
}

/// Environment snapshot, so lookups can be tested without touching the
/// process environment
#[derive(Debug, Clone, Default)]
pub struct Env(HashMap<String, String>);

impl Env {
    pub fn from_process() -> Self {
        Self(std::env::vars().collect())
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).filter(|v| !v.is_empty()).cloned()
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("arm-provider").join("config.json"))
    }

    /// Load configuration from the default location; missing file is empty config
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;

        Ok(())
    }

    /// Get effective subscription (CLI > env > config)
    pub fn effective_subscription(&self, cli: Option<&str>, env: &Env) -> Option<String> {
        cli.map(str::to_string)
            .or_else(|| env.get(ENV_SUBSCRIPTION_ID))
            .or_else(|| self.subscription_id.clone())
    }

    /// Get effective endpoint (CLI > env > config > public cloud)
    pub fn effective_endpoint(&self, cli: Option<&str>, env: &Env) -> String {
        cli.map(str::to_string)
            .or_else(|| env.get(ENV_ENDPOINT))
            .or_else(|| self.endpoint.clone())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    /// Pick the credential source: a static token wins, otherwise a
    /// service principal assembled from env and config
    pub fn credential_source(&self, env: &Env) -> Result<CredentialSource, ProviderError> {
        if let Some(token) = env.get(ENV_ACCESS_TOKEN) {
            return Ok(CredentialSource::AccessToken(token));
        }

        let tenant_id = env.get(ENV_TENANT_ID).or_else(|| self.tenant_id.clone());
        let client_id = env.get(ENV_CLIENT_ID).or_else(|| self.client_id.clone());
        let client_secret = env.get(ENV_CLIENT_SECRET);

        match (tenant_id, client_id, client_secret) {
            (Some(tenant_id), Some(client_id), Some(client_secret)) => {
                Ok(CredentialSource::ClientSecret {
                    authority: DEFAULT_AUTHORITY.to_string(),
                    tenant_id,
                    client_id,
                    client_secret,
                })
            },
            (tenant_id, client_id, client_secret) => {
                let mut missing = Vec::new();
                if tenant_id.is_none() {
                    missing.push(format!("{} is not set", ENV_TENANT_ID));
                }
                if client_id.is_none() {
                    missing.push(format!("{} is not set", ENV_CLIENT_ID));
                }
                if client_secret.is_none() {
                    missing.push(format!("{} is not set", ENV_CLIENT_SECRET));
                }
                missing.push(format!("or set {} to a bearer token", ENV_ACCESS_TOKEN));
                Err(ProviderError::InvalidConfig(missing))
            },
        }
    }
}
