//! Execution channels a [`Session`](crate::session::Session) dispatches to.

use std::path::Path;

use crate::ssh::{execute_local_command_in_dir, CommandOutput, SshClient};

/// A remote-execution channel plus the invoking machine.
///
/// Commands arrive fully rendered (scopes and quoting applied).
pub trait Transport {
    fn host(&self) -> &str;

    /// Login used on the target (owner for `initial-setup`).
    fn user(&self) -> &str;

    fn run(&self, command: &str) -> CommandOutput;

    fn run_local(&self, command: &str, dir: Option<&Path>) -> CommandOutput;

    fn upload(&self, local_path: &Path, remote_path: &str) -> CommandOutput;

    fn download(&self, remote_path: &str, local_path: &Path) -> CommandOutput;
}

pub struct SshTransport {
    client: SshClient,
}

impl SshTransport {
    pub fn new(client: SshClient) -> Self {
        Self { client }
    }
}

impl Transport for SshTransport {
    fn host(&self) -> &str {
        &self.client.host
    }

    fn user(&self) -> &str {
        &self.client.user
    }

    fn run(&self, command: &str) -> CommandOutput {
        self.client.execute(command)
    }

    fn run_local(&self, command: &str, dir: Option<&Path>) -> CommandOutput {
        execute_local_command_in_dir(command, dir)
    }

    fn upload(&self, local_path: &Path, remote_path: &str) -> CommandOutput {
        self.client.upload_file(local_path, remote_path)
    }

    fn download(&self, remote_path: &str, local_path: &Path) -> CommandOutput {
        self.client.download_file(remote_path, local_path)
    }
}

/// Accepts every command without executing anything.
pub struct DryRunTransport {
    host: String,
    user: String,
}

impl DryRunTransport {
    pub fn new(host: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
        }
    }
}

impl Transport for DryRunTransport {
    fn host(&self) -> &str {
        &self.host
    }

    fn user(&self) -> &str {
        &self.user
    }

    fn run(&self, _command: &str) -> CommandOutput {
        CommandOutput::ok()
    }

    fn run_local(&self, _command: &str, _dir: Option<&Path>) -> CommandOutput {
        CommandOutput::ok()
    }

    fn upload(&self, _local_path: &Path, _remote_path: &str) -> CommandOutput {
        CommandOutput::ok()
    }

    fn download(&self, _remote_path: &str, _local_path: &Path) -> CommandOutput {
        CommandOutput::ok()
    }
}
