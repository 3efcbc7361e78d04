use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::environment::{Environment, EnvironmentProfile};
use crate::error::{Error, Result};
use crate::paths;

/// Root configuration structure for config.json.
///
/// Every field falls back to the built-in value, so an empty `{}` file is a
/// valid configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployConfig {
    #[serde(default = "default_repository")]
    pub repository: String,

    #[serde(default = "default_settings_module")]
    pub settings_module: String,

    #[serde(default = "default_environments")]
    pub environments: Vec<EnvironmentProfile>,

    /// Install base for the local profile. Defaults to the working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_root: Option<String>,

    /// Reject host identifiers that match no profile instead of running locally.
    #[serde(default)]
    pub strict_hosts: bool,

    #[serde(default)]
    pub ssh: SshConfig,

    #[serde(default)]
    pub services: ServicesConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub task_queue: TaskQueueConfig,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            repository: default_repository(),
            settings_module: default_settings_module(),
            environments: default_environments(),
            local_root: None,
            strict_hosts: false,
            ssh: SshConfig::default(),
            services: ServicesConfig::default(),
            database: DatabaseConfig::default(),
            task_queue: TaskQueueConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SshConfig {
    /// Remote login. Falls back to `$USER` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(default = "default_ssh_port")]
    pub port: u16,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_file: Option<String>,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            user: None,
            port: default_ssh_port(),
            identity_file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicesConfig {
    #[serde(default = "default_proxy_service")]
    pub proxy: String,

    #[serde(default = "default_supervisor_service")]
    pub supervisor: String,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            proxy: default_proxy_service(),
            supervisor: default_supervisor_service(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConfig {
    #[serde(default = "default_database_name")]
    pub name: String,

    #[serde(default = "default_backup_dir")]
    pub backup_dir: String,

    #[serde(default = "default_dump_prefix")]
    pub dump_prefix: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: default_database_name(),
            backup_dir: default_backup_dir(),
            dump_prefix: default_dump_prefix(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskQueueConfig {
    /// Template path, relative to the local project root unless absolute.
    #[serde(default = "default_task_queue_template")]
    pub template: String,

    #[serde(default = "default_task_queue_staging_file")]
    pub staging_file: String,

    #[serde(default = "default_task_queue_conf_dir")]
    pub conf_dir: String,
}

impl Default for TaskQueueConfig {
    fn default() -> Self {
        Self {
            template: default_task_queue_template(),
            staging_file: default_task_queue_staging_file(),
            conf_dir: default_task_queue_conf_dir(),
        }
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_repository() -> String {
    "git@github.com:lutris/website.git".to_string()
}

fn default_settings_module() -> String {
    "lutrisweb.settings.production".to_string()
}

fn default_environments() -> Vec<EnvironmentProfile> {
    vec![
        EnvironmentProfile {
            host: "lutris.net".to_string(),
            env: Environment::Production,
            root: "/srv/lutris".to_string(),
            git_branch: "master".to_string(),
        },
        EnvironmentProfile {
            host: "dev.lutris.net".to_string(),
            env: Environment::Staging,
            root: "/srv/lutris_staging".to_string(),
            git_branch: "py3".to_string(),
        },
    ]
}

fn default_ssh_port() -> u16 {
    22
}

fn default_proxy_service() -> String {
    "nginx".to_string()
}

fn default_supervisor_service() -> String {
    "supervisor".to_string()
}

fn default_database_name() -> String {
    "lutris".to_string()
}

fn default_backup_dir() -> String {
    "/srv/backup/sql/".to_string()
}

fn default_dump_prefix() -> String {
    "lutris".to_string()
}

fn default_task_queue_template() -> String {
    "config/lutrisweb-celery.conf".to_string()
}

fn default_task_queue_staging_file() -> String {
    "/tmp/lutrisweb-celery.conf".to_string()
}

fn default_task_queue_conf_dir() -> String {
    "/etc/supervisor/conf.d".to_string()
}

// =============================================================================
// Loading functions
// =============================================================================

/// Load the configuration.
///
/// An explicit path must exist and parse. Without one, the default
/// config.json is used when present and valid; otherwise built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<DeployConfig> {
    let config = match explicit {
        Some(path) => load_config_from_file(path)?,
        None => match paths::config_json() {
            Ok(path) if path.exists() => load_config_from_file(&path).unwrap_or_else(|err| {
                log_status!(
                    "config",
                    "Ignoring {}: {}; using built-in defaults",
                    path.display(),
                    err
                );
                DeployConfig::default()
            }),
            _ => DeployConfig::default(),
        },
    };

    validate(&config)?;
    Ok(config)
}

fn load_config_from_file(path: &Path) -> Result<DeployConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("read {}", path.display())))
    })?;

    serde_json::from_str(&content)
        .map_err(|e| Error::config_invalid_json(path.display().to_string(), e))
}

fn validate(config: &DeployConfig) -> Result<()> {
    for (idx, profile) in config.environments.iter().enumerate() {
        if profile.host.trim().is_empty() {
            return Err(Error::config_invalid_value(
                format!("environments[{}].host", idx),
                None,
                "Host identifier cannot be empty",
            ));
        }
        if !profile.root.starts_with('/') {
            return Err(Error::config_invalid_value(
                format!("environments[{}].root", idx),
                Some(profile.root.clone()),
                "Remote root must be an absolute path",
            ));
        }
    }

    if config.repository.trim().is_empty() {
        return Err(Error::config_invalid_value(
            "repository",
            None,
            "Repository URL cannot be empty",
        ));
    }

    Ok(())
}

/// Get the path to the default config.json (for display purposes)
pub fn config_path() -> Result<String> {
    Ok(paths::config_json()?.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_object_yields_builtin_defaults() {
        let config: DeployConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.repository, "git@github.com:lutris/website.git");
        assert_eq!(config.settings_module, "lutrisweb.settings.production");
        assert_eq!(config.environments.len(), 2);
        assert_eq!(config.ssh.port, 22);
        assert_eq!(config.database.name, "lutris");
        assert_eq!(config.task_queue.conf_dir, "/etc/supervisor/conf.d");
        assert!(!config.strict_hosts);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let json = r#"{"ssh": {"user": "deploy"}, "database": {"name": "lutris_dev"}}"#;
        let config: DeployConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.ssh.user.as_deref(), Some("deploy"));
        assert_eq!(config.ssh.port, 22);
        assert_eq!(config.database.name, "lutris_dev");
        assert_eq!(config.database.backup_dir, "/srv/backup/sql/");
    }

    #[test]
    fn explicit_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            concat!(
                r#"{{"environments": [{{"host": "beta.lutris.net", "env": "staging", "#,
                r#""root": "/srv/beta", "gitBranch": "next"}}]}}"#
            )
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.environments.len(), 1);
        assert_eq!(config.environments[0].env, Environment::Staging);
        assert_eq!(config.environments[0].git_branch, "next");
    }

    #[test]
    fn explicit_invalid_json_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = load_config(Some(file.path())).unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_json");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("missing.json"))).unwrap_err();
        assert_eq!(err.code.as_str(), "internal.io_error");
    }

    #[test]
    fn relative_profile_root_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            concat!(
                r#"{{"environments": [{{"host": "lutris.net", "env": "production", "#,
                r#""root": "srv/lutris", "gitBranch": "master"}}]}}"#
            )
        )
        .unwrap();

        let err = load_config(Some(file.path())).unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_value");
    }
}
