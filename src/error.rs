// error.rs
//
// Every way a provider batch can stop, and how far the stop reaches.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// How far a failure reaches.
/// `Provisioning` and `Environment` never abort anything, they only show up as warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Stops the whole process (with exit code 0)
    Fatal,
    /// Stops the current provider batch
    Validation,
    /// Stops the current provider batch
    Precondition,
    Provisioning,
    Environment,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::Fatal => write!(f, "fatal"),
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::Precondition => write!(f, "precondition"),
            ErrorKind::Provisioning => write!(f, "provisioning"),
            ErrorKind::Environment => write!(f, "environment"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("{} doesnt exist - you need it to create vms", .0.display())]
    ConfigMissing(PathBuf),

    #[error("could not parse {} (line {line}): {reason}", .path.display())]
    ConfigParse { path: PathBuf, line: usize, reason: String },

    #[error("{} disappeared before it could be archived", .0.display())]
    ArchiveSourceMissing(PathBuf),

    #[error("could not write to {}: {source}", .path.display())]
    AuditLog { path: PathBuf, source: std::io::Error },

    #[error("not enough information in section [{section}], missing: {}", .missing.join(", "))]
    MissingKeys { section: String, missing: Vec<String> },

    #[error("extra or invalid parameters in section [{section}]: {}", .unknown.join(", "))]
    UnknownKeys { section: String, unknown: Vec<String> },

    #[error("parameter '{key}' of section [{section}] is empty")]
    EmptyValue { section: String, key: String },

    #[error("invalid name '{name}' in section [{section}]: names cannot contain uppercase letters")]
    InvalidName { section: String, name: String },

    #[error("failed because of resource group '{group}' in section [{section}]: {reason}")]
    ResourceGroup { section: String, group: String, reason: String },

    #[error("image '{image}' of section [{section}] is not in the image list")]
    UnknownImage { section: String, image: String },

    #[error("cannot use '{binary}': {reason}")]
    CliUnavailable { binary: String, reason: String },
}

impl ProvisionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProvisionError::ConfigMissing(_)
            | ProvisionError::ConfigParse { .. }
            | ProvisionError::ArchiveSourceMissing(_)
            | ProvisionError::AuditLog { .. } => ErrorKind::Fatal,
            ProvisionError::MissingKeys { .. }
            | ProvisionError::UnknownKeys { .. }
            | ProvisionError::EmptyValue { .. } => ErrorKind::Validation,
            ProvisionError::InvalidName { .. }
            | ProvisionError::ResourceGroup { .. }
            | ProvisionError::UnknownImage { .. }
            | ProvisionError::CliUnavailable { .. } => ErrorKind::Precondition,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Fatal
    }
}

/// Non-blocking problem met during a batch
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    pub kind: ErrorKind,
    pub message: String,
}

impl Warning {
    pub fn new(kind: ErrorKind, message: String) -> Self {
        warn_with_time!("{}", message);
        Warning { kind, message }
    }
}
