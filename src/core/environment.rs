//! Environment resolution: host identifier -> configuration record.
//!
//! The profile table comes from [`DeployConfig`]; resolution itself is a
//! total, pure function of the host identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::defaults::DeployConfig;
use crate::error::{Error, Result};
use crate::utils::base_path::join_remote_path;

/// Host identifier used when none is supplied.
pub const LOCALHOST: &str = "localhost";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    Staging,
    Local,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Staging => "staging",
            Environment::Local => "local",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the host -> environment table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentProfile {
    pub host: String,
    pub env: Environment,
    pub root: String,
    #[serde(default)]
    pub git_branch: String,
}

/// Configuration record for a single invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvConfig {
    pub root: String,
    pub code_root: String,
    pub domain: String,
    pub git_branch: String,
    pub env: Environment,
}

impl EnvConfig {
    pub fn is_local(&self) -> bool {
        self.env == Environment::Local
    }
}

#[derive(Debug, Clone)]
pub struct Resolver {
    profiles: Vec<EnvironmentProfile>,
    local_root: String,
}

impl Resolver {
    pub fn new(profiles: Vec<EnvironmentProfile>, local_root: impl Into<String>) -> Self {
        Self {
            profiles,
            local_root: local_root.into(),
        }
    }

    /// Build a resolver from loaded settings. The local root is fixed here,
    /// once, so that later resolution never touches the process state.
    pub fn from_config(config: &DeployConfig) -> Result<Self> {
        let local_root = match config.local_root.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(path) => shellexpand::tilde(path).to_string(),
            None => std::env::current_dir()
                .map_err(|e| {
                    Error::internal_io(e.to_string(), Some("resolve working directory".to_string()))
                })?
                .to_string_lossy()
                .to_string(),
        };

        Ok(Self::new(config.environments.clone(), local_root))
    }

    pub fn local_root(&self) -> &str {
        &self.local_root
    }

    /// First profile whose host is exactly `host`.
    pub fn profile(&self, host: &str) -> Option<&EnvironmentProfile> {
        self.profiles.iter().find(|p| p.host == host)
    }

    pub fn is_known_host(&self, host: &str) -> bool {
        self.profile(host).is_some()
    }

    pub fn resolve(&self, host: Option<&str>) -> EnvConfig {
        let domain = host.unwrap_or(LOCALHOST).to_string();

        match self.profile(&domain) {
            Some(profile) if profile.env != Environment::Local => EnvConfig {
                root: profile.root.clone(),
                code_root: join_remote_path(&profile.root, &domain),
                domain,
                git_branch: profile.git_branch.clone(),
                env: profile.env,
            },
            Some(profile) => EnvConfig {
                root: profile.root.clone(),
                code_root: profile.root.clone(),
                domain,
                git_branch: profile.git_branch.clone(),
                env: Environment::Local,
            },
            None => EnvConfig {
                root: self.local_root.clone(),
                code_root: self.local_root.clone(),
                domain,
                git_branch: String::new(),
                env: Environment::Local,
            },
        }
    }
}
