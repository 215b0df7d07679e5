//! Module zip assembly.
//!
//! [`ArchiveBuilder`] writes entries named `module@version/relative/path`
//! into a fresh temporary zip file and hands the finished file to the caller
//! as a [`PackagedArchive`].

use crate::PackError;
use crate::PathFilter;
use crate::ProgressCallback;
use crate::Result;
use crate::config::ArchiveConfig;
use crate::report::PackReport;
use crate::source::FileEntry;
use crate::source::ModuleSource;
use std::fs;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;
use tempfile::NamedTempFile;
use tempfile::TempPath;
use tracing::debug;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Streams files into a temporary module zip.
///
/// The temporary file is removed if the builder is dropped before
/// [`finish`](Self::finish) succeeds, so a failed packaging run leaves no
/// archive behind.
///
/// # Examples
///
/// ```no_run
/// use gopack_core::ArchiveBuilder;
/// use gopack_core::NoopProgress;
/// use gopack_core::config::ArchiveConfig;
///
/// let mut builder = ArchiveBuilder::new("example.com/foo", "v1.0.0", ArchiveConfig::default())?;
/// builder.add_file("main.go", 0o644, &mut &b"package main\n"[..], &mut NoopProgress)?;
/// let archive = builder.finish()?;
/// println!("wrote {}", archive.path().display());
/// # Ok::<(), gopack_core::PackError>(())
/// ```
pub struct ArchiveBuilder {
    zip: ZipWriter<NamedTempFile>,
    path: PathBuf,
    options: SimpleFileOptions,
    preserve_permissions: bool,
    prefix: String,
    report: PackReport,
    buffer: Vec<u8>,
    start: Instant,
}

impl ArchiveBuilder {
    /// Creates a builder backed by a new temporary file.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be created.
    pub fn new(module: &str, version: &str, config: ArchiveConfig) -> Result<Self> {
        let file = tempfile::Builder::new()
            .prefix("gopack-")
            .suffix(".zip")
            .tempfile()?;
        let report = PackReport::new(module, version);
        let path = file.path().to_path_buf();
        debug!(path = %path.display(), "created archive");

        Ok(Self {
            zip: ZipWriter::new(file),
            path,
            options: file_options(config.compression_level),
            preserve_permissions: config.preserve_permissions,
            prefix: report.prefix(),
            report,
            buffer: vec![0u8; COPY_BUFFER_SIZE],
            start: Instant::now(),
        })
    }

    /// Returns the report accumulated so far.
    #[must_use]
    pub fn report(&self) -> &PackReport {
        &self.report
    }

    /// Returns the report for in-place updates.
    pub fn report_mut(&mut self) -> &mut PackReport {
        &mut self.report
    }

    /// Writes every entry of `entries` accepted by `filter`, reading content
    /// from `source`.
    ///
    /// Each reader is dropped as soon as its bytes are copied.
    ///
    /// # Errors
    ///
    /// Fails on the first entry that cannot be opened, read, or written.
    pub fn add_source<S: ModuleSource>(
        &mut self,
        source: &mut S,
        entries: &[FileEntry<S::Handle>],
        filter: &PathFilter,
        progress: &mut dyn ProgressCallback,
    ) -> Result<()> {
        let (accepted, rejected): (Vec<_>, Vec<_>) =
            entries.iter().partition(|entry| filter.accepts(&entry.path));
        for entry in &rejected {
            debug!(path = %entry.path, "filtered out");
        }
        self.report.files_skipped += rejected.len();

        let total = accepted.len();
        for (idx, entry) in accepted.into_iter().enumerate() {
            progress.on_entry_start(&entry.path, total, idx + 1);
            let mut reader = source.open(entry)?;
            self.add_file(&entry.path, entry.mode, &mut reader, progress)?;
            drop(reader);
            progress.on_entry_complete(&entry.path);
        }

        Ok(())
    }

    /// Copies one file into the archive under the `module@version/` prefix.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::PathEscape`] for relative paths that are empty,
    /// absolute, or contain `.`/`..` segments, and I/O or zip errors from
    /// the copy.
    pub fn add_file(
        &mut self,
        relative: &str,
        mode: u32,
        reader: &mut dyn Read,
        progress: &mut dyn ProgressCallback,
    ) -> Result<()> {
        let name = entry_name(&self.prefix, relative)?;
        let options = if self.preserve_permissions {
            self.options.unix_permissions(mode)
        } else {
            self.options
        };

        self.zip.start_file(name.as_str(), options)?;

        let mut bytes_written = 0u64;
        loop {
            let bytes_read = reader.read(&mut self.buffer)?;
            if bytes_read == 0 {
                break;
            }
            self.zip.write_all(&self.buffer[..bytes_read])?;
            bytes_written += bytes_read as u64;
            progress.on_bytes_written(bytes_read as u64);
        }

        debug!(entry = %name, bytes = bytes_written, "archived");
        self.report.files_added += 1;
        self.report.bytes_written += bytes_written;

        Ok(())
    }

    /// Finalizes the central directory and releases the archive to the
    /// caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the zip cannot be finalized.
    pub fn finish(self) -> Result<PackagedArchive> {
        let Self {
            zip,
            path,
            mut report,
            start,
            ..
        } = self;

        let mut file = zip.finish()?;
        file.flush()?;
        report.bytes_compressed = file.as_file().metadata()?.len();
        report.duration = start.elapsed();
        debug!(
            path = %path.display(),
            files = report.files_added,
            bytes = report.bytes_compressed,
            "finalized archive"
        );

        Ok(PackagedArchive {
            path: file.into_temp_path(),
            report,
        })
    }
}

/// A finished module zip living in a temporary file.
///
/// The file is deleted when this value is dropped unless it has been
/// [`persist`](Self::persist)ed or [`keep`](Self::keep)-ed.
#[derive(Debug)]
pub struct PackagedArchive {
    path: TempPath,
    report: PackReport,
}

impl PackagedArchive {
    /// Location of the temporary zip file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Statistics about the packaging run.
    #[must_use]
    pub fn report(&self) -> &PackReport {
        &self.report
    }

    /// Moves the archive to `dest`.
    ///
    /// Falls back to copy-and-delete when a rename is not possible, for
    /// example across filesystems.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive can be neither renamed nor copied.
    pub fn persist(self, dest: impl AsRef<Path>) -> Result<PathBuf> {
        let dest = dest.as_ref();
        match self.path.persist(dest) {
            Ok(()) => Ok(dest.to_path_buf()),
            Err(err) => {
                debug!(error = %err.error, dest = %dest.display(), "rename failed, copying");
                fs::copy(&err.path, dest)?;
                Ok(dest.to_path_buf())
            }
        }
    }

    /// Detaches the temporary file so it outlives this value.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be detached.
    pub fn keep(self) -> Result<PathBuf> {
        self.path.keep().map_err(|e| PackError::Io(e.error))
    }
}

fn file_options(compression_level: Option<u8>) -> SimpleFileOptions {
    if compression_level == Some(0) {
        SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
    } else {
        let level = compression_level.unwrap_or(6);
        SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(i64::from(level)))
    }
}

/// Builds `prefix + relative` after checking that `relative` stays inside
/// the archive root.
fn entry_name(prefix: &str, relative: &str) -> Result<String> {
    let escapes = relative.is_empty()
        || relative.starts_with('/')
        || relative
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");
    if escapes {
        return Err(PackError::PathEscape {
            path: relative.to_string(),
        });
    }
    Ok(format!("{prefix}{relative}"))
}
