//! Package command implementation.

use crate::cli::Cli;
use crate::error::UsageError;
use crate::error::add_pack_context;
use crate::error::convert_pack_error;
use crate::output::Disposition;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use crate::upload;
use anyhow::Result;
use gopack_core::DriverRegistry;
use gopack_core::NoopProgress;
use gopack_core::PackError;
use gopack_core::PackagedArchive;
use gopack_core::PackagingOptions;
use gopack_core::PathFilter;
use gopack_core::version;
use std::path::Path;
use tracing::debug;
use tracing::info;

pub fn execute(cli: &Cli, formatter: &dyn OutputFormatter) -> Result<()> {
    add_pack_context(version::validate_base(&cli.pkg_version))?;

    let registry = DriverRegistry::builtin();
    let mut options = PackagingOptions::new(cli.args.iter().cloned())
        .with_version(&cli.pkg_version)
        .with_pseudo_version(cli.snapshot)
        .with_filter(PathFilter::include_hidden(cli.all));
    if let Some(level) = cli.compression_level {
        options = options.with_compression_level(level);
    }

    // Progress bar only on an interactive, human-formatted run
    let result = if !cli.quiet && !cli.json && CliProgress::should_show() {
        let mut progress = CliProgress::new("Packaging");
        registry.dispatch(&options, &mut progress)
    } else {
        registry.dispatch(&options, &mut NoopProgress)
    };

    let archive = match result {
        Ok(archive) => archive,
        Err(PackError::UnknownDriver { requested }) => {
            return Err(UsageError {
                requested,
                listing: registry.listing(),
            }
            .into());
        }
        Err(PackError::DriverArgs(err)) => err.exit(),
        Err(err) => return Err(convert_pack_error(err)),
    };

    let report = archive.report().clone();
    let disposition = dispose(
        archive,
        cli.upload.as_deref(),
        cli.output.as_deref(),
        formatter,
    );
    formatter.format_package_result(&report, &disposition)
}

/// Uploads and stores the package as requested.
///
/// Failures are reported as warnings and collected; they never fail the
/// run. The temporary archive is gone when this returns, unless it was
/// moved to `output`.
fn dispose(
    archive: PackagedArchive,
    upload_url: Option<&str>,
    output: Option<&Path>,
    formatter: &dyn OutputFormatter,
) -> Disposition {
    let mut disposition = Disposition::default();

    if let Some(url) = upload_url {
        match upload::upload(url, archive.path()) {
            Ok(()) => {
                info!(%url, "uploaded package");
                disposition.uploaded_to = Some(url.to_string());
            }
            Err(err) => {
                let message = format!("{err:#}");
                debug!(%url, error = %message, "upload failed");
                formatter.format_warning(&message);
                disposition.failures.push(message);
            }
        }
    }

    match output {
        Some(dest) => match archive.persist(dest) {
            Ok(stored) => {
                info!(path = %stored.display(), "stored package");
                disposition.stored_at = Some(stored);
            }
            Err(err) => {
                let message = format!("failed to store package at '{}': {err}", dest.display());
                debug!(error = %message, "store failed");
                formatter.format_warning(&message);
                disposition.failures.push(message);
            }
        },
        None if upload_url.is_none() => {
            formatter.format_warning("no --output or --upload given, package discarded");
        }
        None => {}
    }

    disposition
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use gopack_core::ArchiveBuilder;
    use gopack_core::ArchiveConfig;
    use std::cell::RefCell;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recording {
        warnings: RefCell<Vec<String>>,
    }

    impl OutputFormatter for Recording {
        fn format_package_result(
            &self,
            _report: &gopack_core::PackReport,
            _disposition: &Disposition,
        ) -> Result<()> {
            Ok(())
        }

        fn format_error(&self, _error: &anyhow::Error) {}

        fn format_warning(&self, message: &str) {
            self.warnings.borrow_mut().push(message.to_string());
        }
    }

    fn archive() -> PackagedArchive {
        let mut builder = ArchiveBuilder::new("m", "v0.0.0", ArchiveConfig::default()).unwrap();
        builder
            .add_file("a.go", 0o644, &mut &b"package a\n"[..], &mut NoopProgress)
            .unwrap();
        builder.finish().unwrap()
    }

    #[test]
    fn test_dispose_stores_archive() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("m.zip");
        let formatter = Recording::default();

        let disposition = dispose(archive(), None, Some(&dest), &formatter);

        assert_eq!(disposition.stored_at, Some(dest.clone()));
        assert!(dest.exists());
        assert!(disposition.failures.is_empty());
        assert!(formatter.warnings.borrow().is_empty());
    }

    #[test]
    fn test_dispose_discards_without_targets() {
        let formatter = Recording::default();
        let archive = archive();
        let tmp = archive.path().to_path_buf();

        let disposition = dispose(archive, None, None, &formatter);

        assert!(!tmp.exists());
        assert!(disposition.stored_at.is_none());
        assert_eq!(formatter.warnings.borrow().len(), 1);
    }

    #[test]
    fn test_dispose_store_failure_is_not_fatal() {
        let formatter = Recording::default();
        let archive = archive();
        let tmp = archive.path().to_path_buf();
        let dest = Path::new("/nonexistent/gopack/out.zip");

        let disposition = dispose(archive, None, Some(dest), &formatter);

        assert!(disposition.stored_at.is_none());
        assert_eq!(disposition.failures.len(), 1);
        assert!(disposition.failures[0].contains("failed to store package"));
        assert!(!tmp.exists());
    }

    #[test]
    fn test_dispose_upload_failure_still_stores() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("m.zip");
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let url = format!("http://127.0.0.1:{port}/");
        let formatter = Recording::default();

        let disposition = dispose(archive(), Some(&url), Some(&dest), &formatter);

        assert!(disposition.uploaded_to.is_none());
        assert_eq!(disposition.failures.len(), 1);
        assert_eq!(disposition.stored_at, Some(dest.clone()));
        assert!(dest.exists());
    }
}
