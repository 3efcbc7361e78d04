use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

use lutris_deploy::defaults::{self, DeployConfig};
use lutris_deploy::environment::{EnvConfig, Resolver, LOCALHOST};
use lutris_deploy::log_status;
use lutris_deploy::session::{CommandRecord, Session};
use lutris_deploy::ssh::{is_local_host, SshClient};
use lutris_deploy::tasks::Task;
use lutris_deploy::transport::{DryRunTransport, SshTransport, Transport};

pub type CmdResult<T> = lutris_deploy::Result<(T, i32)>;

pub(crate) struct GlobalArgs {
    pub host: Option<String>,
    pub config: Option<PathBuf>,
    pub dry_run: bool,
}

impl GlobalArgs {
    fn host(&self) -> Option<&str> {
        non_blank_host(self.host.as_deref())
    }
}

/// Blank host values are treated as absent; anything else is kept verbatim.
fn non_blank_host(host: Option<&str>) -> Option<&str> {
    host.filter(|h| !h.trim().is_empty())
}

// ============================================================================
// Target context (CLI layer)
// ============================================================================

/// Settings, resolver and resolved record for one invocation.
pub(crate) struct Target {
    pub config: DeployConfig,
    pub resolver: Resolver,
    pub record: EnvConfig,
    pub host: String,
}

impl Target {
    pub fn load(global: &GlobalArgs) -> lutris_deploy::Result<Self> {
        let config = defaults::load_config(global.config.as_deref())?;
        let resolver = Resolver::from_config(&config)?;
        let host = global.host();
        Self::check_host(&resolver, &config, host)?;

        let record = resolver.resolve(host);
        Ok(Self {
            config,
            resolver,
            record,
            host: host.unwrap_or(LOCALHOST).to_string(),
        })
    }

    /// Unknown, non-local hosts fall back to the local profile unless
    /// `strictHosts` is set.
    fn check_host(
        resolver: &Resolver,
        config: &DeployConfig,
        host: Option<&str>,
    ) -> lutris_deploy::Result<()> {
        let Some(host) = host else {
            return Ok(());
        };
        if resolver.is_known_host(host) || is_local_host(host) {
            return Ok(());
        }

        if config.strict_hosts {
            let known = config.environments.iter().map(|p| p.host.clone()).collect();
            return Err(lutris_deploy::Error::validation_invalid_argument(
                "host",
                format!("Host '{}' matches no configured environment", host),
                Some(host.to_string()),
                Some(known),
            )
            .with_hint(
                "Set 'strictHosts' to false to deploy unknown hosts with the local profile",
            ));
        }

        log_status!(
            "host",
            "'{}' matches no configured environment; using the local profile",
            host
        );
        Ok(())
    }

    pub fn transport(&self, global: &GlobalArgs) -> lutris_deploy::Result<Box<dyn Transport>> {
        if global.dry_run {
            let user = self
                .config
                .ssh
                .user
                .clone()
                .or_else(|| std::env::var("USER").ok())
                .unwrap_or_else(|| "deploy".to_string());
            log_status!("dry-run", "Commands for {} are printed, not executed", self.host);
            return Ok(Box::new(DryRunTransport::new(self.host.clone(), user)));
        }

        let client = SshClient::new(&self.host, &self.config.ssh)?;
        Ok(Box::new(SshTransport::new(client)))
    }

    pub fn session<'a>(&'a self, transport: &'a dyn Transport) -> Session<'a> {
        Session::new(&self.record, &self.config, transport)
            .with_local_root(self.resolver.local_root())
    }
}

// ============================================================================
// Single-task execution
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskOutput {
    pub task: String,
    pub host: String,
    pub dry_run: bool,
    pub record: EnvConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    pub commands: Vec<CommandRecord>,
}

pub(crate) fn run_task(task: Task, global: &GlobalArgs) -> CmdResult<TaskOutput> {
    let target = Target::load(global)?;
    let transport = target.transport(global)?;
    let mut session = target.session(transport.as_ref());

    let result = task.run(&mut session)?;

    Ok((
        TaskOutput {
            task: task.name().to_string(),
            host: target.host.clone(),
            dry_run: global.dry_run,
            record: target.record.clone(),
            result,
            commands: session.into_records(),
        },
        0,
    ))
}

/// Subcommand arguments that build a validated catalog task.
pub(crate) trait TaskArgs {
    fn into_task(self) -> lutris_deploy::Result<Task>;
}

pub(crate) fn run_task_args(args: impl TaskArgs, global: &GlobalArgs) -> CmdResult<TaskOutput> {
    run_task(args.into_task()?, global)
}

pub mod app;
pub mod config;
pub mod db;
pub mod deploy;
pub mod tasks;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args))
    };
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

/// Run a catalog task, either built directly or from validated arguments.
macro_rules! task {
    (from $args:expr, $global:expr) => {
        crate::output::map_cmd_result_to_json(run_task_args($args, $global))
    };
    ($task:expr, $global:expr) => {
        crate::output::map_cmd_result_to_json(run_task($task, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (lutris_deploy::Result<Value>, i32) {
    use crate::Commands;
    use lutris_deploy::pipeline::Composite;

    crate::tty::status("lutris-deploy is working...");

    match command {
        // Services
        Commands::TouchWsgiReload => task!(Task::TouchWsgiReload, global),
        Commands::ReloadProxy => task!(Task::ReloadProxy, global),
        Commands::RestartProcessSupervisor => task!(Task::RestartProcessSupervisor, global),
        Commands::ProxyConfigtest => task!(Task::ProxyConfigtest, global),

        // Application
        Commands::RunTests => task!(Task::RunTests, global),
        Commands::InitialSetup => task!(Task::InitialSetup, global),
        Commands::ListPackages => task!(Task::ListPackages, global),
        Commands::UpdateTaskQueueConfig => task!(Task::UpdateTaskQueueConfig, global),
        Commands::MigrateDatabase => task!(Task::MigrateDatabase, global),
        Commands::PullLatest => task!(Task::PullLatest, global),
        Commands::InstallNodeDeps => task!(Task::InstallNodeDeps, global),
        Commands::CollectStaticAssets => task!(Task::CollectStaticAssets, global),
        Commands::CleanBytecode => task!(Task::CleanBytecode, global),
        Commands::InstallRequirements(args) => task!(from args, global),
        Commands::FixPermissions(args) => task!(from args, global),
        Commands::Authorize(args) => task!(from args, global),

        // Database
        Commands::SqlDump(args) => task!(from args, global),
        Commands::SqlRestore(args) => task!(from args, global),

        // Composites
        Commands::Deploy => dispatch!(Composite::Deploy, global, deploy),
        Commands::Pythonfix => dispatch!(Composite::PythonFix, global, deploy),

        // Introspection
        Commands::Tasks => dispatch!(global, tasks),
        Commands::Config(args) => dispatch!(args, global, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> Resolver {
        Resolver::new(DeployConfig::default().environments, "/home/dev/website")
    }

    fn strict() -> DeployConfig {
        DeployConfig {
            strict_hosts: true,
            ..DeployConfig::default()
        }
    }

    #[test]
    fn strict_hosts_accepts_configured_host() {
        assert!(Target::check_host(&resolver(), &strict(), Some("lutris.net")).is_ok());
        assert!(Target::check_host(&resolver(), &strict(), Some("dev.lutris.net")).is_ok());
    }

    #[test]
    fn strict_hosts_rejects_unknown_host() {
        let err = Target::check_host(&resolver(), &strict(), Some("foo.example")).unwrap_err();
        assert_eq!(err.code.as_str(), "validation.invalid_argument");
        assert_eq!(err.details["id"], "foo.example");
        assert!(!err.hints.is_empty());
    }

    #[test]
    fn strict_hosts_accepts_local_addresses() {
        assert!(Target::check_host(&resolver(), &strict(), Some("localhost")).is_ok());
        assert!(Target::check_host(&resolver(), &strict(), Some("127.0.0.1")).is_ok());
        assert!(Target::check_host(&resolver(), &strict(), None).is_ok());
    }

    #[test]
    fn unknown_host_falls_back_without_strict_hosts() {
        let config = DeployConfig::default();
        assert!(Target::check_host(&resolver(), &config, Some("foo.example")).is_ok());
    }

    #[test]
    fn blank_host_is_absent() {
        assert_eq!(non_blank_host(None), None);
        assert_eq!(non_blank_host(Some("")), None);
        assert_eq!(non_blank_host(Some("   ")), None);
    }

    #[test]
    fn host_is_not_trimmed() {
        assert_eq!(non_blank_host(Some(" lutris.net")), Some(" lutris.net"));
        assert!(!resolver().is_known_host(" lutris.net"));
    }
}
