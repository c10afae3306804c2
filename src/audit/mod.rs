//audit/mod.rs
//once a provider batch is done: archive the consumed config file and append what was created to the audit log
use crate::error::{ErrorKind, ProvisionError, Warning};
use crate::machines::AuditEntry;
use crate::paths;
use chrono::{DateTime, Local};
use std::env;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Day before month
pub const TIMESTAMP_FORMAT: &str = "%Y-%d-%m:%H:%M:%S";
pub const UNKNOWN_ADMIN: &str = "Unknown";

pub fn timestamp(now: &DateTime<Local>) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}

/// <prefix><timestamp>.conf, next to the original file
pub fn archive_path(config: &Path, prefix: &str, timestamp: &str) -> PathBuf {
    let file_name = format!("{}{}.{}", prefix, timestamp, paths::ARCHIVE_EXT);
    match config.parent() {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// Renames the consumed config file. The file is expected to still be there:
/// if it is gone, someone removed it during the run.
pub fn archive_config(config: &Path, prefix: &str, timestamp: &str) -> Result<PathBuf, ProvisionError> {
    if !config.is_file() {
        return Err(ProvisionError::ArchiveSourceMissing(config.to_path_buf()));
    }
    let target = archive_path(config, prefix, timestamp);
    fs::rename(config, &target).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ProvisionError::ArchiveSourceMissing(config.to_path_buf()),
        _ => ProvisionError::AuditLog { path: target.clone(), source: e },
    })?;
    Ok(target)
}

/// Name of the admin running the provisioning, from the given environment variable
pub fn admin_name(variable: &str) -> (String, Option<Warning>) {
    match env::var(variable) {
        Ok(name) => (name, None),
        Err(_) => {
            let warning = Warning::new(ErrorKind::Environment, format!("couldnt find username - must set {} as env variable", variable));
            (UNKNOWN_ADMIN.to_string(), Some(warning))
        },
    }
}

/// Text appended to the audit log for one run. Every line ends with a newline.
pub fn format_record(timestamp: &str, admin: &str, vms: &[(AuditEntry, String)]) -> String {
    let mut ret = String::with_capacity(64 + vms.len() * 128);
    ret.push_str(&format!("{}\n", timestamp));
    ret.push_str(&format!("System Admin Name: {}\n", admin));
    for (entry, status) in vms {
        ret.push('\n');
        ret.push_str(&format!("name: {}\n", entry.name));
        ret.push_str(&format!("project: {}\n", entry.project));
        ret.push_str(&format!("purpose: {}\n", entry.purpose));
        ret.push_str(&format!("team: {}\n", entry.team));
        ret.push_str(&format!("os: {}\n", entry.os));
        ret.push_str(&format!("status: {}\n", status));
    }
    ret
}

/// Appends to the audit log, creating it if needed. Never truncates.
pub fn append_record(log: &Path, record: &str) -> Result<(), ProvisionError> {
    let io_error = |source| ProvisionError::AuditLog { path: log.to_path_buf(), source };
    let mut file = OpenOptions::new().create(true).append(true).open(log).map_err(io_error)?;
    file.write_all(record.as_bytes()).map_err(io_error)
}
