//! Structured command lines.
//!
//! A [`Cmd`] is a program plus an argument list. Every element is quoted with
//! [`shell::quote_arg`] when rendered, so task arguments can never change the
//! shape of the command line they are placed in.

use serde::Serialize;
use std::fmt;

use crate::utils::shell;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cmd {
    program: String,
    args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stdout_to: Option<String>,
}

impl Cmd {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdout_to: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Redirect standard output to `path` (`> path`).
    pub fn stdout_to(mut self, path: impl Into<String>) -> Self {
        self.stdout_to = Some(path.into());
        self
    }

    /// The same command run through `sudo`.
    pub fn elevated(self) -> Self {
        let mut args = Vec::with_capacity(self.args.len() + 1);
        args.push(self.program);
        args.extend(self.args);
        Self {
            program: "sudo".to_string(),
            args,
            stdout_to: self.stdout_to,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn render(&self) -> String {
        let mut rendered = shell::quote_arg(&self.program);
        if !self.args.is_empty() {
            rendered.push(' ');
            rendered.push_str(&shell::quote_args(&self.args));
        }
        if let Some(path) = &self.stdout_to {
            rendered.push_str(" > ");
            rendered.push_str(&shell::quote_arg(path));
        }
        rendered
    }
}

impl fmt::Display for Cmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// `cd <dir>`
pub fn cd(dir: &str) -> Cmd {
    Cmd::new("cd").arg(dir)
}

/// Activation prefix: export the settings module, then source the env-vars
/// file and the virtualenv activation script found under `root`.
pub fn activation(settings_module: &str, root: &str) -> String {
    let root = root.trim_end_matches('/');
    shell::and_then(&[
        Cmd::new("export")
            .arg(format!("DJANGO_SETTINGS_MODULE={}", settings_module))
            .render(),
        Cmd::new(".").arg(format!("{}/bin/envvars", root)).render(),
        Cmd::new(".").arg(format!("{}/bin/activate", root)).render(),
    ])
}
