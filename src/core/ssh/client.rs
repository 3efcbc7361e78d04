use crate::defaults::SshConfig;
use crate::error::{Error, Result};
use crate::utils::shell;
use serde::Serialize;
use std::path::Path;
use std::process::{Command, Stdio};

pub struct SshClient {
    pub host: String,
    pub user: String,
    pub port: u16,
    pub identity_file: Option<String>,
    /// When true, all commands run locally instead of over SSH.
    /// Set automatically when the host is localhost/127.0.0.1/::1.
    pub is_local: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            success: false,
            exit_code: -1,
        }
    }

    fn from_output(out: std::process::Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&out.stdout).to_string(),
            stderr: String::from_utf8_lossy(&out.stderr).to_string(),
            success: out.status.success(),
            exit_code: out.status.code().unwrap_or(-1),
        }
    }
}

impl SshClient {
    pub fn new(host: &str, config: &SshConfig) -> Result<Self> {
        let identity_file = match &config.identity_file {
            Some(path) if !path.is_empty() => {
                let expanded = shellexpand::tilde(path).to_string();
                if !Path::new(&expanded).exists() {
                    return Err(Error::ssh_identity_file_not_found(host, expanded));
                }
                Some(expanded)
            }
            _ => None,
        };

        let user = match config.user.as_deref().filter(|u| !u.trim().is_empty()) {
            Some(user) => user.to_string(),
            None => std::env::var("USER").map_err(|_| {
                Error::config_invalid_value(
                    "ssh.user",
                    None,
                    "No SSH user configured and $USER is not set",
                )
            })?,
        };

        let is_local = is_local_host(host);
        if is_local {
            log_status!("ssh", "Host '{}' is local, running commands on this machine", host);
        }

        Ok(Self {
            host: host.to_string(),
            user,
            port: config.port,
            identity_file,
            is_local,
        })
    }

    fn build_ssh_args(&self, command: &str) -> Vec<String> {
        let mut args = Vec::new();

        if let Some(identity_file) = &self.identity_file {
            args.push("-i".to_string());
            args.push(identity_file.clone());
        }

        if self.port != 22 {
            args.push("-p".to_string());
            args.push(self.port.to_string());
        }

        // Fail instead of prompting; keepalives surface dead connections.
        args.extend([
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            "ConnectTimeout=10".to_string(),
            "-o".to_string(),
            "ServerAliveInterval=15".to_string(),
            "-o".to_string(),
            "ServerAliveCountMax=3".to_string(),
        ]);

        args.push(format!("{}@{}", self.user, self.host));
        args.push(command.to_string());

        args
    }

    pub fn execute(&self, command: &str) -> CommandOutput {
        if self.is_local {
            return execute_local_command_in_dir(command, None);
        }

        match Command::new("ssh").args(self.build_ssh_args(command)).output() {
            Ok(out) => CommandOutput::from_output(out),
            Err(e) => CommandOutput::failed(format!("SSH error: {}", e)),
        }
    }

    /// Stream a local file into `remote_path` (`cat > remote_path`).
    pub fn upload_file(&self, local_path: &Path, remote_path: &str) -> CommandOutput {
        if self.is_local {
            let local_cmd = format!(
                "cp {} {}",
                shell::quote_path(&local_path.to_string_lossy()),
                shell::quote_path(remote_path)
            );
            return execute_local_command_in_dir(&local_cmd, None);
        }

        let file = match std::fs::File::open(local_path) {
            Ok(file) => file,
            Err(err) => {
                return CommandOutput::failed(format!(
                    "Failed to open {}: {}",
                    local_path.display(),
                    err
                ))
            }
        };

        let remote_command = format!("cat > {}", shell::quote_path(remote_path));
        match Command::new("ssh")
            .args(self.build_ssh_args(&remote_command))
            .stdin(file)
            .output()
        {
            Ok(out) => CommandOutput::from_output(out),
            Err(e) => CommandOutput::failed(format!("SSH error: {}", e)),
        }
    }

    /// Stream `remote_path` into a local file (`cat remote_path`).
    pub fn download_file(&self, remote_path: &str, local_path: &Path) -> CommandOutput {
        if self.is_local {
            let local_cmd = format!(
                "cp {} {}",
                shell::quote_path(remote_path),
                shell::quote_path(&local_path.to_string_lossy())
            );
            return execute_local_command_in_dir(&local_cmd, None);
        }

        let file = match std::fs::File::create(local_path) {
            Ok(file) => file,
            Err(err) => {
                return CommandOutput::failed(format!(
                    "Failed to create {}: {}",
                    local_path.display(),
                    err
                ))
            }
        };

        let remote_command = format!("cat {}", shell::quote_path(remote_path));
        let output = Command::new("ssh")
            .args(self.build_ssh_args(&remote_command))
            .stdout(Stdio::from(file))
            .stderr(Stdio::piped())
            .output();

        match output {
            Ok(out) => {
                let result = CommandOutput::from_output(out);
                if !result.success {
                    // Do not leave a truncated copy behind.
                    let _ = std::fs::remove_file(local_path);
                }
                result
            }
            Err(e) => CommandOutput::failed(format!("SSH error: {}", e)),
        }
    }
}

pub fn execute_local_command_in_dir(command: &str, current_dir: Option<&Path>) -> CommandOutput {
    #[cfg(windows)]
    let mut cmd = {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", command]);
        cmd
    };

    #[cfg(not(windows))]
    let mut cmd = {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", command]);
        cmd
    };

    if let Some(dir) = current_dir {
        cmd.current_dir(dir);
    }

    match cmd.output() {
        Ok(out) => CommandOutput::from_output(out),
        Err(e) => CommandOutput::failed(format!("Command error: {}", e)),
    }
}

/// Check if a host address refers to the local machine.
pub fn is_local_host(host: &str) -> bool {
    matches!(host, "localhost" | "127.0.0.1" | "::1")
}
