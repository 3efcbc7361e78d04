//! Per-invocation execution state: the resolved record, the transport, the
//! directory and activation scopes, and the log of dispatched commands.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::command::{self, Cmd};
use crate::defaults::DeployConfig;
use crate::environment::EnvConfig;
use crate::error::{Error, RemoteCommandFailedDetails, Result, TargetDetails};
use crate::ssh::CommandOutput;
use crate::transport::Transport;
use crate::utils::base_path::join_remote_path;
use crate::utils::shell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Run,
    Sudo,
    Local,
    Put,
    Get,
}

impl StepKind {
    fn label(&self) -> &'static str {
        match self {
            StepKind::Run => "run",
            StepKind::Sudo => "sudo",
            StepKind::Local => "local",
            StepKind::Put => "put",
            StepKind::Get => "get",
        }
    }
}

/// One dispatched command and its outcome.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRecord {
    pub kind: StepKind,
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    pub success: bool,
    pub exit_code: i32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stdout: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stderr: String,
}

pub struct Session<'a> {
    record: &'a EnvConfig,
    config: &'a DeployConfig,
    transport: &'a dyn Transport,
    local_root: PathBuf,
    dirs: Vec<String>,
    activations: Vec<String>,
    log: Vec<CommandRecord>,
}

impl<'a> Session<'a> {
    pub fn new(
        record: &'a EnvConfig,
        config: &'a DeployConfig,
        transport: &'a dyn Transport,
    ) -> Self {
        Self {
            record,
            config,
            transport,
            local_root: PathBuf::from("."),
            dirs: Vec::new(),
            activations: Vec::new(),
            log: Vec::new(),
        }
    }

    /// Project checkout on the invoking machine (templates are read from it).
    pub fn with_local_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.local_root = root.into();
        self
    }

    pub fn local_root(&self) -> &Path {
        &self.local_root
    }

    pub fn record(&self) -> &'a EnvConfig {
        self.record
    }

    pub fn config(&self) -> &'a DeployConfig {
        self.config
    }

    pub fn user(&self) -> &str {
        self.transport.user()
    }

    pub fn records(&self) -> &[CommandRecord] {
        &self.log
    }

    pub fn into_records(self) -> Vec<CommandRecord> {
        self.log
    }

    /// Effective remote working directory of the current scope.
    pub fn cwd(&self) -> Option<String> {
        if self.dirs.is_empty() {
            return None;
        }
        Some(
            self.dirs
                .iter()
                .fold(String::new(), |acc, dir| join_remote_path(&acc, dir)),
        )
    }

    /// Run `f` with every remote command executed relative to `dir`.
    /// The scope is left when `f` returns, whatever the outcome.
    pub fn cd<T>(&mut self, dir: &str, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.dirs.push(dir.to_string());
        let result = f(self);
        self.dirs.pop();
        result
    }

    /// Run `f` inside the activated context (settings module exported,
    /// env-vars and virtualenv sourced from the record's root).
    pub fn activated<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.activations.push(command::activation(
            &self.config.settings_module,
            &self.record.root,
        ));
        let result = f(self);
        self.activations.pop();
        result
    }

    /// Render `cmd` with the current directory and activation scopes applied.
    pub fn scoped(&self, cmd: &Cmd) -> String {
        let mut parts = Vec::with_capacity(self.activations.len() + 2);
        if let Some(dir) = self.cwd() {
            parts.push(command::cd(&dir).render());
        }
        parts.extend(self.activations.iter().cloned());
        parts.push(cmd.render());
        shell::and_then(&parts)
    }

    pub fn run(&mut self, cmd: Cmd) -> Result<CommandOutput> {
        let line = self.scoped(&cmd);
        let output = self.transport.run(&line);
        self.finish(StepKind::Run, line, output)
    }

    pub fn sudo(&mut self, cmd: Cmd) -> Result<CommandOutput> {
        let line = self.scoped(&cmd.elevated());
        let output = self.transport.run(&line);
        self.finish(StepKind::Sudo, line, output)
    }

    /// Run on the invoking machine. Remote scopes do not apply.
    pub fn local(&mut self, cmd: Cmd, dir: Option<&Path>) -> Result<CommandOutput> {
        let line = cmd.render();
        let output = self.transport.run_local(&line, dir);
        self.finish(StepKind::Local, line, output)
    }

    /// Upload a local file. A relative remote path is taken relative to the
    /// current directory scope.
    pub fn put(&mut self, local_path: &Path, remote_path: &str) -> Result<CommandOutput> {
        let remote = self.remote_path(remote_path);
        let output = self.transport.upload(local_path, &remote);
        self.finish(
            StepKind::Put,
            format!("{} -> {}:{}", local_path.display(), self.transport.host(), remote),
            output,
        )
    }

    /// Download a remote file. A relative remote path is taken relative to
    /// the current directory scope.
    pub fn get(&mut self, remote_path: &str, local_path: &Path) -> Result<CommandOutput> {
        let remote = self.remote_path(remote_path);
        let output = self.transport.download(&remote, local_path);
        self.finish(
            StepKind::Get,
            format!("{}:{} -> {}", self.transport.host(), remote, local_path.display()),
            output,
        )
    }

    fn remote_path(&self, path: &str) -> String {
        match self.cwd() {
            Some(dir) => join_remote_path(&dir, path),
            None => path.to_string(),
        }
    }

    fn finish(
        &mut self,
        kind: StepKind,
        line: String,
        output: CommandOutput,
    ) -> Result<CommandOutput> {
        log_status!("exec", "{} {}", kind.label(), line);

        let cwd = match kind {
            StepKind::Local => None,
            _ => self.cwd(),
        };

        self.log.push(CommandRecord {
            kind,
            command: line.clone(),
            cwd: cwd.clone(),
            success: output.success,
            exit_code: output.exit_code,
            stdout: output.stdout.clone(),
            stderr: output.stderr.clone(),
        });

        if output.success {
            return Ok(output);
        }

        let details = RemoteCommandFailedDetails {
            command: line,
            exit_code: output.exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
            target: TargetDetails {
                host: Some(self.transport.host().to_string()),
                env: Some(self.record.env.to_string()),
                cwd,
            },
        };

        Err(match kind {
            StepKind::Run | StepKind::Sudo => Error::remote_command_failed(details),
            StepKind::Local => Error::local_command_failed(details),
            StepKind::Put | StepKind::Get => Error::transfer_failed(details),
        })
    }
}
