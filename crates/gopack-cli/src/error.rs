//! Error conversion utilities for CLI.
//!
//! Converts gopack-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use gopack_core::PackError;
use std::fmt;

/// Exit status for invalid invocations.
pub const USAGE_EXIT_CODE: u8 = 2;

/// Invocation error that is answered with the driver listing.
#[derive(Debug)]
pub struct UsageError {
    /// The driver name that was asked for, if any.
    pub requested: Option<String>,
    /// Rendered driver listing.
    pub listing: String,
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.requested {
            writeln!(f, "Unknown driver: {name}")?;
        }
        write!(f, "{}", self.listing)
    }
}

impl std::error::Error for UsageError {}

/// Converts `PackError` to user-friendly anyhow error with context
pub fn convert_pack_error(err: PackError) -> anyhow::Error {
    match err {
        PackError::SourceNotFound { path } => anyhow!(
            "Source directory not found: {}\n\
             HINT: Pass the module directory with -d.",
            path.display()
        ),
        PackError::RepositoryNotFound { path } => anyhow!(
            "Not a git repository: {}\n\
             HINT: Point -d at the directory that contains .git, or use the fs driver.",
            path.display()
        ),
        PackError::DeclarationNotFound { path } => anyhow!(
            "Module declaration not found: {}\n\
             HINT: The source tree must contain a go.mod at its root (see -t for git sub-trees).",
            path.display()
        ),
        PackError::MalformedDeclaration { path } => anyhow!(
            "Malformed module declaration: {}\n\
             HINT: go.mod needs a line of the form `module example.com/name`.",
            path.display()
        ),
        PackError::Revision { rev, reason } => anyhow!(
            "Cannot resolve git revision '{rev}': {reason}\n\
             HINT: Use a branch, tag or commit hash that exists in the repository."
        ),
        PackError::InvalidVersion(version) => anyhow!(
            "Invalid package version: {version}\n\
             HINT: Versions look like v1.2.3 or v1.2.3-rc.1."
        ),
        PackError::Git { command, reason } => anyhow!(
            "git {command} failed: {reason}\n\
             HINT: Make sure git is installed and on PATH."
        ),
        PackError::Io(io_err) => anyhow!("I/O error while packaging: {io_err}"),
        other if other.is_malformed_input() => anyhow::Error::from(other).context(
            "Source tree contains an unusable path\n\
             HINT: Rename files whose names are not UTF-8 or escape the module root.",
        ),
        other => anyhow::Error::from(other).context("Packaging failed"),
    }
}

/// Adds context to a core result
pub fn add_pack_context<T>(result: Result<T, PackError>) -> anyhow::Result<T> {
    result.map_err(convert_pack_error)
}
