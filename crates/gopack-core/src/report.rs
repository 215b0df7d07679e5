//! Packaging operation reporting.

use std::time::Duration;

/// Report of a packaging operation.
///
/// Contains the resolved module identity and statistics about the archive
/// that was written.
///
/// # Examples
///
/// ```
/// use gopack_core::PackReport;
///
/// let mut report = PackReport::default();
/// report.bytes_written = 1000;
/// report.bytes_compressed = 250;
///
/// assert_eq!(report.compression_ratio(), 4.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PackReport {
    /// Module path read from the declaration file.
    pub module: String,

    /// Final version string, including any pseudo-version suffix.
    pub version: String,

    /// Description of the tree the archive was built from.
    pub source: String,

    /// Commit the archive was built from, for git sources.
    pub revision: Option<String>,

    /// Number of files written into the archive.
    pub files_added: usize,

    /// Number of files rejected by the path filter.
    pub files_skipped: usize,

    /// Total bytes copied into the archive (uncompressed).
    pub bytes_written: u64,

    /// Size of the finished archive file.
    pub bytes_compressed: u64,

    /// Duration of the packaging operation.
    pub duration: Duration,

    /// Warnings generated while packaging.
    pub warnings: Vec<String>,
}

impl PackReport {
    /// Creates an empty report for `module@version`.
    #[must_use]
    pub fn new(module: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    /// Returns the `module@version` prefix shared by every archive entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use gopack_core::PackReport;
    ///
    /// let report = PackReport::new("example.com/foo", "v1.2.3");
    /// assert_eq!(report.prefix(), "example.com/foo@v1.2.3/");
    /// ```
    #[must_use]
    pub fn prefix(&self) -> String {
        format!("{}@{}/", self.module, self.version)
    }

    /// Adds a warning message to the report.
    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Returns the compression ratio (uncompressed / compressed).
    ///
    /// Returns 0.0 if either side is 0.
    #[must_use]
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes_compressed == 0 || self.bytes_written == 0 {
            return 0.0;
        }
        self.bytes_written as f64 / self.bytes_compressed as f64
    }
}

/// Callback trait for progress reporting while an archive is written.
///
/// The trait requires `Send` so a callback can be handed across threads by
/// embedding applications.
///
/// # Examples
///
/// ```
/// use gopack_core::ProgressCallback;
///
/// struct SimpleProgress;
///
/// impl ProgressCallback for SimpleProgress {
///     fn on_entry_start(&mut self, path: &str, total: usize, current: usize) {
///         println!("[{current}/{total}] {path}");
///     }
///
///     fn on_bytes_written(&mut self, _bytes: u64) {}
///
///     fn on_entry_complete(&mut self, _path: &str) {}
///
///     fn on_complete(&mut self) {
///         println!("done");
///     }
/// }
/// ```
pub trait ProgressCallback: Send {
    /// Called before an entry is copied into the archive.
    ///
    /// # Arguments
    ///
    /// * `path` - Archive-relative path of the entry
    /// * `total` - Number of candidate entries in the source tree
    /// * `current` - Current entry number (1-indexed)
    fn on_entry_start(&mut self, path: &str, total: usize, current: usize);

    /// Called for each chunk copied into the archive.
    fn on_bytes_written(&mut self, bytes: u64);

    /// Called once an entry has been fully written.
    fn on_entry_complete(&mut self, path: &str);

    /// Called when the archive has been finalized.
    fn on_complete(&mut self);
}

/// No-op implementation of `ProgressCallback`.
#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_entry_start(&mut self, _path: &str, _total: usize, _current: usize) {}

    fn on_bytes_written(&mut self, _bytes: u64) {}

    fn on_entry_complete(&mut self, _path: &str) {}

    fn on_complete(&mut self) {}
}
