use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigInvalidJson,
    ConfigInvalidValue,

    ValidationInvalidArgument,

    SshIdentityFileNotFound,

    RemoteCommandFailed,
    LocalCommandFailed,
    TransferFailed,

    TemplateNotFound,

    InternalIoError,
    InternalJsonError,
    InternalUnexpected,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigInvalidJson => "config.invalid_json",
            ErrorCode::ConfigInvalidValue => "config.invalid_value",

            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",

            ErrorCode::SshIdentityFileNotFound => "ssh.identity_file_not_found",

            ErrorCode::RemoteCommandFailed => "remote.command_failed",
            ErrorCode::LocalCommandFailed => "local.command_failed",
            ErrorCode::TransferFailed => "transfer.failed",

            ErrorCode::TemplateNotFound => "template.not_found",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
            ErrorCode::InternalUnexpected => "internal.unexpected",
        }
    }

    /// Codes raised when a dispatched command or transfer exits non-zero.
    pub fn is_command_failure(&self) -> bool {
        matches!(
            self,
            ErrorCode::RemoteCommandFailed
                | ErrorCode::LocalCommandFailed
                | ErrorCode::TransferFailed
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidJsonDetails {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidValueDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub problem: String,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
    pub retryable: Option<bool>,
}

pub type Result<T> = std::result::Result<T, Error>;

const SSH_CONNECTION_FAILURE: i32 = 255;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tried: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalIoErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalJsonErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCommandFailedDetails {
    pub command: String,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub target: TargetDetails,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SshIdentityFileNotFoundDetails {
    pub host: String,
    pub identity_file: String,
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
            retryable: None,
        }
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
        id: Option<String>,
        tried: Option<Vec<String>>,
    ) -> Self {
        let details = serde_json::to_value(InvalidArgumentDetails {
            field: field.into(),
            problem: problem.into(),
            id,
            tried,
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(
            ErrorCode::ValidationInvalidArgument,
            "Invalid argument",
            details,
        )
    }

    pub fn ssh_identity_file_not_found(
        host: impl Into<String>,
        identity_file: impl Into<String>,
    ) -> Self {
        let details = serde_json::to_value(SshIdentityFileNotFoundDetails {
            host: host.into(),
            identity_file: identity_file.into(),
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(
            ErrorCode::SshIdentityFileNotFound,
            "SSH identity file not found",
            details,
        )
        .with_hint("Check 'ssh.identityFile' in the lutris-deploy config")
    }

    pub fn remote_command_failed(details: RemoteCommandFailedDetails) -> Self {
        Self::command_failed(ErrorCode::RemoteCommandFailed, "Remote command failed", details)
    }

    pub fn local_command_failed(details: RemoteCommandFailedDetails) -> Self {
        Self::command_failed(ErrorCode::LocalCommandFailed, "Local command failed", details)
    }

    pub fn transfer_failed(details: RemoteCommandFailedDetails) -> Self {
        Self::command_failed(ErrorCode::TransferFailed, "File transfer failed", details)
    }

    fn command_failed(code: ErrorCode, message: &str, details: RemoteCommandFailedDetails) -> Self {
        // ssh exits 255 when the connection itself failed.
        let retryable = code != ErrorCode::LocalCommandFailed
            && details.exit_code == SSH_CONNECTION_FAILURE;
        let details =
            serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        let mut err = Self::new(code, message, details);
        err.retryable = Some(retryable);
        err
    }

    pub fn template_not_found(path: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::TemplateNotFound,
            "Template file not found",
            serde_json::json!({ "path": path.into() }),
        )
        .with_hint("Run from the website checkout or set 'taskQueue.template' in the config")
    }

    pub fn config_invalid_json(path: impl Into<String>, err: serde_json::Error) -> Self {
        let details = serde_json::to_value(ConfigInvalidJsonDetails {
            path: path.into(),
            error: err.to_string(),
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(
            ErrorCode::ConfigInvalidJson,
            "Invalid JSON in configuration",
            details,
        )
    }

    pub fn config_invalid_value(
        key: impl Into<String>,
        value: Option<String>,
        problem: impl Into<String>,
    ) -> Self {
        let details = serde_json::to_value(ConfigInvalidValueDetails {
            key: key.into(),
            value,
            problem: problem.into(),
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(
            ErrorCode::ConfigInvalidValue,
            "Invalid configuration value",
            details,
        )
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        let details = serde_json::to_value(InternalIoErrorDetails {
            error: error.into(),
            context,
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(ErrorCode::InternalIoError, "IO error", details)
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        let details = serde_json::to_value(InternalJsonErrorDetails {
            error: error.into(),
            context,
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(ErrorCode::InternalJsonError, "JSON error", details)
    }

    pub fn internal_unexpected(error: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InternalUnexpected,
            "Unexpected error",
            serde_json::json!({ "error": error.into() }),
        )
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }

    /// Exit code recorded in command-failure details, if any.
    pub fn command_exit_code(&self) -> Option<i32> {
        if !self.code.is_command_failure() {
            return None;
        }
        self.details
            .get("exitCode")
            .and_then(Value::as_i64)
            .map(|code| code as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(exit_code: i32) -> RemoteCommandFailedDetails {
        RemoteCommandFailedDetails {
            command: "git pull".to_string(),
            exit_code,
            stdout: String::new(),
            stderr: "fatal: not a git repository".to_string(),
            target: TargetDetails {
                host: Some("lutris.net".to_string()),
                env: Some("production".to_string()),
                cwd: Some("/srv/lutris/lutris.net".to_string()),
            },
        }
    }

    #[test]
    fn command_exit_code_reads_details() {
        let err = Error::remote_command_failed(failure(128));
        assert_eq!(err.command_exit_code(), Some(128));
        assert_eq!(err.code.as_str(), "remote.command_failed");
    }

    #[test]
    fn connection_failures_are_retryable() {
        assert_eq!(Error::remote_command_failed(failure(255)).retryable, Some(true));
        assert_eq!(Error::transfer_failed(failure(255)).retryable, Some(true));
        assert_eq!(Error::remote_command_failed(failure(1)).retryable, Some(false));
        assert_eq!(Error::local_command_failed(failure(255)).retryable, Some(false));
        assert_eq!(
            Error::validation_invalid_argument("ip", "bad", None, None).retryable,
            None
        );
    }

    #[test]
    fn command_exit_code_absent_for_validation_errors() {
        let err = Error::validation_invalid_argument("ip", "bad", None, None);
        assert_eq!(err.command_exit_code(), None);
    }

    #[test]
    fn with_hint_appends() {
        let err = Error::template_not_found("config/lutrisweb-celery.conf").with_hint("extra");
        assert_eq!(err.hints.len(), 2);
        assert_eq!(err.hints[1].message, "extra");
    }
}
