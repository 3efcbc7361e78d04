//! Database dump and restore.

use chrono::{DateTime, Local};
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::command::Cmd;
use crate::error::{Error, Result};
use crate::session::Session;

const DUMP_TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DumpResult {
    pub database: String,
    pub remote_path: String,
    pub local_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RestoreStatus {
    Restored,
    NoDumpFound,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreResult {
    pub status: RestoreStatus,
    pub database: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dump: Option<String>,
    pub message: String,
}

/// Uncompressed dump name: `<prefix>-<YYYY-MM-DD-HH-MM>.tar`.
pub fn dump_file_name(prefix: &str, now: DateTime<Local>) -> String {
    format!("{}-{}.tar", prefix, now.format(DUMP_TIMESTAMP_FORMAT))
}

fn dump_pattern(prefix: &str) -> Result<Regex> {
    Regex::new(&format!(r"^{}-.*\.tar\.gz$", regex::escape(prefix)))
        .map_err(|e| Error::internal_unexpected(format!("Invalid dump pattern: {}", e)))
}

/// Find the compressed dump in `dir`. When several match, the newest name wins
/// (the timestamp format sorts chronologically).
pub fn find_dump(dir: &Path, prefix: &str) -> Result<Option<PathBuf>> {
    let pattern = dump_pattern(prefix)?;

    let entries = fs::read_dir(dir).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("list {}", dir.display())))
    })?;

    let mut matches: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| pattern.is_match(name))
        .collect();

    matches.sort();
    Ok(matches.pop().map(|name| dir.join(name)))
}

/// Dump the database on the connected host, compress it and fetch it into
/// `dest_dir` on the invoking machine.
pub fn sql_dump(session: &mut Session, dest_dir: &Path) -> Result<DumpResult> {
    let db = session.config().database.clone();
    let tar_name = dump_file_name(&db.dump_prefix, Local::now());
    let gz_name = format!("{}.gz", tar_name);
    let local_path = dest_dir.join(&gz_name);

    let remote_path = session.cd(&db.backup_dir, |s| {
        s.run(
            Cmd::new("pg_dump")
                .args(["--format=tar", db.name.as_str()])
                .stdout_to(tar_name.as_str()),
        )?;
        s.run(Cmd::new("gzip").arg(tar_name.as_str()))?;
        s.get(&gz_name, &local_path)?;
        Ok(crate::utils::base_path::join_remote_path(&db.backup_dir, &gz_name))
    })?;

    Ok(DumpResult {
        database: db.name,
        remote_path,
        local_path: local_path.display().to_string(),
    })
}

/// Restore the dump found in `dir` into the local database, replacing its
/// contents. Without a dump nothing is run.
pub fn sql_restore(session: &mut Session, dir: &Path) -> Result<RestoreResult> {
    let db = session.config().database.clone();

    let Some(dump) = find_dump(dir, &db.dump_prefix)? else {
        log_status!("sql-restore", "No SQL dump found in {}", dir.display());
        return Ok(RestoreResult {
            status: RestoreStatus::NoDumpFound,
            database: db.name,
            dump: None,
            message: "No SQL dump found".to_string(),
        });
    };

    let gz_name = file_name(&dump)?;
    let tar_name = gz_name.trim_end_matches(".gz").to_string();

    session.local(Cmd::new("gunzip").arg(gz_name.as_str()), Some(dir))?;
    session.local(
        Cmd::new("pg_restore")
            .arg("--clean")
            .arg(format!("--dbname={}", db.name))
            .arg(tar_name.as_str()),
        Some(dir),
    )?;
    session.local(Cmd::new("rm").arg(tar_name.as_str()), Some(dir))?;

    Ok(RestoreResult {
        status: RestoreStatus::Restored,
        database: db.name,
        dump: Some(dump.display().to_string()),
        message: format!("Restored {}", gz_name),
    })
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| Error::internal_unexpected(format!("Invalid dump path {}", path.display())))
}
