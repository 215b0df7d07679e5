//! Output formatter trait for CLI results.

use anyhow::Result;
use gopack_core::PackReport;
use serde::Serialize;
use std::path::PathBuf;

/// What happened to the package after it was built.
#[derive(Debug, Default)]
pub struct Disposition {
    /// URL the package was uploaded to.
    pub uploaded_to: Option<String>,
    /// Path the package was stored at.
    pub stored_at: Option<PathBuf>,
    /// Non-fatal upload or store failures.
    pub failures: Vec<String>,
}

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format packaging result
    fn format_package_result(&self, report: &PackReport, disposition: &Disposition)
    -> Result<()>;

    /// Format error message
    fn format_error(&self, error: &anyhow::Error);

    /// Format warning message
    fn format_warning(&self, message: &str);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }
}

impl JsonOutput<()> {
    pub fn error(operation: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Error,
            data: None,
            error: Some(error.into()),
        }
    }
}
