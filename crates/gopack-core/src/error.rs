//! Error types for module packaging operations.

use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `PackError`.
pub type Result<T> = std::result::Result<T, PackError>;

/// Errors that can occur while packaging a module.
///
/// Every variant is fatal to the packaging operation that produced it. The
/// variants fall into four groups: source access, malformed input, archive
/// I/O, and usage. Use [`PackError::is_usage`] to single out the last group.
#[derive(Error, Debug)]
pub enum PackError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Source directory does not exist.
    #[error("source not found: {path}")]
    SourceNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// Directory is not a git working tree.
    #[error("not a git repository: {path}")]
    RepositoryNotFound {
        /// The directory that lacks a `.git` entry.
        path: PathBuf,
    },

    /// Module declaration file is missing from the source tree.
    #[error("module declaration not found: {path}")]
    DeclarationNotFound {
        /// Where the declaration was expected.
        path: PathBuf,
    },

    /// Module declaration file has no `module` line.
    #[error("malformed module declaration: {path}")]
    MalformedDeclaration {
        /// The offending declaration file.
        path: PathBuf,
    },

    /// Revision or sub-tree could not be resolved.
    #[error("cannot resolve revision '{rev}': {reason}")]
    Revision {
        /// The revision expression as given.
        rev: String,
        /// Output of the failed lookup.
        reason: String,
    },

    /// Running or talking to the `git` executable failed.
    #[error("git {command} failed: {reason}")]
    Git {
        /// The git subcommand that failed.
        command: String,
        /// Failure detail.
        reason: String,
    },

    /// Base version string does not have the `vMAJOR.MINOR.PATCH` shape.
    #[error("invalid package version: {0}")]
    InvalidVersion(String),

    /// Relative entry path would leave the archive root.
    #[error("path escapes archive root: {path}")]
    PathEscape {
        /// The rejected relative path.
        path: String,
    },

    /// Path cannot be represented in the archive.
    #[error("path is not valid UTF-8: {path}")]
    NonUtf8Path {
        /// The offending path.
        path: PathBuf,
    },

    /// Zip writer reported an error.
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Driver name is unknown or missing.
    #[error("unknown driver{}", requested_suffix(.requested))]
    UnknownDriver {
        /// The requested name, if one was given.
        requested: Option<String>,
    },

    /// Driver flags could not be parsed.
    #[error(transparent)]
    DriverArgs(#[from] clap::Error),

    /// Two drivers were registered under the same name.
    #[error("driver registered twice: {name}")]
    DuplicateDriver {
        /// The duplicated name.
        name: String,
    },
}

impl PackError {
    /// Returns `true` if this error means the tool was invoked incorrectly.
    ///
    /// Usage errors are reported with the driver listing or flag help
    /// instead of a plain error message.
    ///
    /// # Examples
    ///
    /// ```
    /// use gopack_core::PackError;
    ///
    /// let err = PackError::UnknownDriver {
    ///     requested: Some("zzz".to_string()),
    /// };
    /// assert!(err.is_usage());
    ///
    /// let err = PackError::InvalidVersion("1.0".to_string());
    /// assert!(!err.is_usage());
    /// ```
    #[must_use]
    pub const fn is_usage(&self) -> bool {
        matches!(self, Self::UnknownDriver { .. } | Self::DriverArgs(_))
    }

    /// Returns `true` if the input was present but unusable.
    #[must_use]
    pub const fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            Self::MalformedDeclaration { .. }
                | Self::Revision { .. }
                | Self::InvalidVersion(_)
                | Self::PathEscape { .. }
                | Self::NonUtf8Path { .. }
        )
    }

    /// Returns the filesystem path this error refers to, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::SourceNotFound { path }
            | Self::RepositoryNotFound { path }
            | Self::DeclarationNotFound { path }
            | Self::MalformedDeclaration { path }
            | Self::NonUtf8Path { path } => Some(path),
            _ => None,
        }
    }

    pub(crate) fn git(command: &str, reason: impl std::fmt::Display) -> Self {
        Self::Git {
            command: command.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[allow(clippy::ref_option)]
fn requested_suffix(requested: &Option<String>) -> String {
    requested
        .as_deref()
        .map_or_else(String::new, |name| format!(": {name}"))
}
