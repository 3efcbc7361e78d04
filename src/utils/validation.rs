//! Input validation primitives.
//!
//! Task arguments end up inside remote command lines and remote paths, so
//! they are checked here before any command is built.

use std::net::IpAddr;

use crate::error::{Error, Result};

/// Require a string to be non-empty after trimming.
///
/// Returns a reference to the trimmed string on success.
pub fn require_non_empty<'a>(value: &'a str, field: &str, message: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(Error::validation_invalid_argument(field, message, None, None))
    } else {
        Ok(trimmed)
    }
}

/// Require a valid IPv4 or IPv6 address.
pub fn require_ip(value: &str, field: &str) -> Result<IpAddr> {
    let trimmed = require_non_empty(value, field, "IP address cannot be empty")?;
    trimmed.parse::<IpAddr>().map_err(|_| {
        Error::validation_invalid_argument(
            field,
            format!("'{}' is not a valid IP address", trimmed),
            Some(trimmed.to_string()),
            None,
        )
    })
}

/// Require a POSIX user or group name (`[a-z_][a-z0-9_-]*`, optional trailing `$`).
pub fn require_account_name<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    let trimmed = require_non_empty(value, field, "Account name cannot be empty")?;
    let body = trimmed.strip_suffix('$').unwrap_or(trimmed);

    let mut chars = body.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_');
    let valid_rest =
        chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');

    if valid_start && valid_rest && body.len() <= 32 {
        Ok(trimmed)
    } else {
        Err(Error::validation_invalid_argument(
            field,
            format!("'{}' is not a valid account name", trimmed),
            Some(trimmed.to_string()),
            None,
        ))
    }
}

/// Require a bare file stem: letters, digits, `_` and `-` only.
pub fn require_file_stem<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    let trimmed = require_non_empty(value, field, "Name cannot be empty")?;
    if trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        Ok(trimmed)
    } else {
        Err(Error::validation_invalid_argument(
            field,
            format!("'{}' may only contain letters, digits, '_' and '-'", trimmed),
            Some(trimmed.to_string()),
            None,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_non_empty_trims_whitespace() {
        let result = require_non_empty("  hello  ", "field", "msg");
        assert_eq!(result.unwrap(), "hello");
    }

    #[test]
    fn require_non_empty_fails_for_whitespace_only() {
        assert!(require_non_empty("   ", "field", "Cannot be empty").is_err());
    }

    #[test]
    fn require_ip_accepts_v4_and_v6() {
        assert!(require_ip("192.168.1.10", "ip").is_ok());
        assert!(require_ip("2001:db8::1", "ip").is_ok());
    }

    #[test]
    fn require_ip_rejects_shell_payload() {
        let err = require_ip("1.2.3.4; reboot", "ip").unwrap_err();
        assert_eq!(err.code.as_str(), "validation.invalid_argument");
    }

    #[test]
    fn require_account_name_accepts_www_data() {
        assert_eq!(require_account_name("www-data", "user").unwrap(), "www-data");
        assert_eq!(require_account_name("_apt", "user").unwrap(), "_apt");
    }

    #[test]
    fn require_account_name_rejects_colon_and_spaces() {
        assert!(require_account_name("www-data:root", "user").is_err());
        assert!(require_account_name("Bad Name", "user").is_err());
        assert!(require_account_name("1user", "user").is_err());
    }

    #[test]
    fn require_file_stem_rejects_traversal() {
        assert!(require_file_stem("production", "environment").is_ok());
        assert!(require_file_stem("dev-py3_x", "environment").is_ok());
        assert!(require_file_stem("../../etc/passwd", "environment").is_err());
    }
}
