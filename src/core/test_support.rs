//! Scripted transport for unit tests.

use std::cell::RefCell;
use std::path::Path;

use crate::ssh::{execute_local_command_in_dir, CommandOutput};
use crate::transport::Transport;

pub struct RecordingTransport {
    commands: RefCell<Vec<String>>,
    fail_on: Option<String>,
    /// When set, local commands really run, except those starting with one
    /// of these programs, which are only recorded.
    local_stubs: Option<Vec<String>>,
}

impl RecordingTransport {
    pub const FAILURE_EXIT_CODE: i32 = 42;

    pub fn new() -> Self {
        Self {
            commands: RefCell::new(Vec::new()),
            fail_on: None,
            local_stubs: None,
        }
    }

    /// Every command whose rendered line contains `needle` exits non-zero.
    pub fn failing_on(needle: &str) -> Self {
        Self {
            fail_on: Some(needle.to_string()),
            ..Self::new()
        }
    }

    pub fn executing_local_except(stubs: &[&str]) -> Self {
        Self {
            local_stubs: Some(stubs.iter().map(|s| s.to_string()).collect()),
            ..Self::new()
        }
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }

    fn dispatch(&self, line: String) -> CommandOutput {
        let failed = self
            .fail_on
            .as_deref()
            .is_some_and(|needle| line.contains(needle));
        self.commands.borrow_mut().push(line);

        if failed {
            CommandOutput {
                stdout: String::new(),
                stderr: "scripted failure".to_string(),
                success: false,
                exit_code: Self::FAILURE_EXIT_CODE,
            }
        } else {
            CommandOutput::ok()
        }
    }
}

impl Transport for RecordingTransport {
    fn host(&self) -> &str {
        "lutris.net"
    }

    fn user(&self) -> &str {
        "deploy"
    }

    fn run(&self, command: &str) -> CommandOutput {
        self.dispatch(command.to_string())
    }

    fn run_local(&self, command: &str, dir: Option<&Path>) -> CommandOutput {
        let scripted = self.dispatch(format!("local {}", command));
        if !scripted.success {
            return scripted;
        }

        match &self.local_stubs {
            Some(stubs) if !stubs.iter().any(|s| command.starts_with(s.as_str())) => {
                execute_local_command_in_dir(command, dir)
            }
            _ => scripted,
        }
    }

    fn upload(&self, local_path: &Path, remote_path: &str) -> CommandOutput {
        self.dispatch(format!("put {} -> {}", local_path.display(), remote_path))
    }

    fn download(&self, remote_path: &str, local_path: &Path) -> CommandOutput {
        self.dispatch(format!("get {} -> {}", remote_path, local_path.display()))
    }
}
