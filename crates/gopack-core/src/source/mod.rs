//! Source trees that can be packaged.
//!
//! A [`ModuleSource`] knows how to find the module declaration in its tree,
//! list the regular files, and open each one for reading. [`package`] drives
//! any source through the full pipeline:
//!
//! `open source -> resolve module -> synthesize version -> write archive`.

pub mod fs;
pub mod git;

use crate::PackagingOptions;
use crate::ProgressCallback;
use crate::Result;
use crate::archive::ArchiveBuilder;
use crate::archive::PackagedArchive;
use crate::version;
use chrono::Utc;
use std::io::Read;
use tracing::debug;
use tracing::info;

pub use fs::FsSource;
pub use git::GitSource;

/// A file in a source tree, ready to be archived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry<H> {
    /// Path relative to the tree root, `/`-separated, no leading slash.
    pub path: String,

    /// Unix permission bits recorded in the archive.
    pub mode: u32,

    /// Source-specific locator used to open the file.
    pub handle: H,
}

/// Regular files of a source tree, plus the entries that were passed over.
#[derive(Debug, Clone, Default)]
pub struct Listing<H> {
    /// Regular files, sorted by path.
    pub entries: Vec<FileEntry<H>>,

    /// Relative paths of non-regular entries (symlinks, submodules, ...).
    pub skipped: Vec<String>,
}

impl<H> Listing<H> {
    /// Sorts entries by relative path so archive order is reproducible.
    pub fn sort(&mut self) {
        self.entries.sort_by(|a, b| a.path.cmp(&b.path));
        self.skipped.sort();
    }
}

/// A tree of files that carries a module declaration.
pub trait ModuleSource {
    /// Locator for a single file in this source.
    type Handle;

    /// Human-readable description used in logs and reports.
    fn describe(&self) -> String;

    /// Content-addressed revision of the tree, when the source has one.
    fn revision(&self) -> Option<&str>;

    /// Reads the module path from the tree's declaration file.
    ///
    /// # Errors
    ///
    /// Fails when the declaration is missing, unreadable, or malformed.
    fn module_name(&mut self) -> Result<String>;

    /// Lists the regular files in the tree.
    ///
    /// # Errors
    ///
    /// Fails when the tree cannot be enumerated.
    fn files(&mut self) -> Result<Listing<Self::Handle>>;

    /// Opens one listed file.
    ///
    /// # Errors
    ///
    /// Fails when the file content cannot be read.
    fn open(&mut self, entry: &FileEntry<Self::Handle>) -> Result<Box<dyn Read + '_>>;
}

/// Packages `source` into a module zip.
///
/// # Errors
///
/// Any failure aborts the run. No archive file is left behind on error.
///
/// # Examples
///
/// ```no_run
/// use gopack_core::FsSource;
/// use gopack_core::NoopProgress;
/// use gopack_core::PackagingOptions;
/// use gopack_core::package;
///
/// let mut source = FsSource::open("example")?;
/// let options = PackagingOptions::default().with_version("v1.2.3");
/// let archive = package(&mut source, &options, &mut NoopProgress)?;
/// println!("{}", archive.report().prefix());
/// # Ok::<(), gopack_core::PackError>(())
/// ```
pub fn package<S: ModuleSource>(
    source: &mut S,
    options: &PackagingOptions,
    progress: &mut dyn ProgressCallback,
) -> Result<PackagedArchive> {
    let module = source.module_name()?;
    let version = version::synthesize(
        &options.version,
        options.pseudo_version,
        Utc::now(),
        source.revision(),
    );
    let description = source.describe();
    info!(source = %description, %module, %version, "packaging");

    let listing = source.files()?;
    let mut builder = ArchiveBuilder::new(&module, &version, options.archive)?;
    {
        let report = builder.report_mut();
        report.source = description;
        report.revision = source.revision().map(str::to_string);
        for path in &listing.skipped {
            debug!(%path, "skipped non-regular entry");
            report.add_warning(format!("Skipped non-regular entry: {path}"));
        }
    }

    builder.add_source(source, &listing.entries, &options.filter, progress)?;
    let archive = builder.finish()?;
    progress.on_complete();

    Ok(archive)
}
