//! JSON output formatter for machine-readable results.
//!
//! Each run writes exactly one document to stdout, either the result or the
//! error. Warnings are written to stderr.

use super::formatter::Disposition;
use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use gopack_core::PackReport;
use serde::Serialize;
use std::io;
use std::io::Write;

pub struct JsonFormatter;

#[derive(Debug, Serialize)]
struct PackageOutput<'a> {
    module: &'a str,
    version: &'a str,
    source: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    revision: Option<&'a str>,
    files_added: usize,
    files_skipped: usize,
    bytes_written: u64,
    bytes_compressed: u64,
    compression_ratio: f64,
    duration_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    uploaded_to: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stored_at: Option<String>,
    warnings: &'a [String],
    disposition_errors: &'a [String],
}

impl<'a> PackageOutput<'a> {
    fn new(report: &'a PackReport, disposition: &'a Disposition) -> Self {
        Self {
            module: &report.module,
            version: &report.version,
            source: &report.source,
            revision: report.revision.as_deref(),
            files_added: report.files_added,
            files_skipped: report.files_skipped,
            bytes_written: report.bytes_written,
            bytes_compressed: report.bytes_compressed,
            compression_ratio: report.compression_ratio(),
            duration_ms: report.duration.as_millis(),
            uploaded_to: disposition.uploaded_to.as_deref(),
            stored_at: disposition
                .stored_at
                .as_ref()
                .map(|p| p.display().to_string()),
            warnings: &report.warnings,
            disposition_errors: &disposition.failures,
        }
    }
}

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }

    fn output_stderr<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        writeln!(io::stderr(), "{json}")?;
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_package_result(&self, report: &PackReport, disposition: &Disposition) -> Result<()> {
        let output = JsonOutput::success("package", PackageOutput::new(report, disposition));
        Self::output(&output)
    }

    fn format_error(&self, error: &anyhow::Error) {
        let output = JsonOutput::error("package", format!("{error:?}"));
        let _ = Self::output(&output);
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData<'a> {
            message: &'a str,
        }

        let output = JsonOutput::success("warning", WarningData { message });
        let _ = Self::output_stderr(&output);
    }
}
