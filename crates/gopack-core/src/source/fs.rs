//! Plain directory source.

use super::FileEntry;
use super::Listing;
use super::ModuleSource;
use crate::PackError;
use crate::PackagingOptions;
use crate::ProgressCallback;
use crate::Result;
use crate::archive::PackagedArchive;
use crate::driver::Driver;
use crate::module;
use clap::Parser;
use std::fs::File;
use std::fs::Metadata;
use std::io::Read;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Flags accepted by the `fs` driver.
#[derive(Debug, Parser)]
#[command(name = "fs", bin_name = "gopack fs", about = "package file system")]
pub struct FsArgs {
    /// Module directory
    #[arg(short = 'd', long = "dir", value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,
}

/// Registry entry for the `fs` driver.
#[must_use]
pub fn driver() -> Driver {
    Driver {
        name: "fs",
        description: "package file system",
        entry: run,
    }
}

/// Entry point of the `fs` driver.
///
/// # Errors
///
/// Returns [`PackError::DriverArgs`] for bad flags, and any error from
/// [`FsSource::open`] or [`super::package`].
pub fn run(
    options: PackagingOptions,
    progress: &mut dyn ProgressCallback,
) -> Result<PackagedArchive> {
    let argv = std::iter::once("fs".to_string()).chain(options.args.iter().cloned());
    let args = FsArgs::try_parse_from(argv)?;
    let mut source = FsSource::open(&args.dir)?;
    super::package(&mut source, &options, progress)
}

/// Directory tree on the local filesystem.
///
/// Files are listed in a deterministic order (sorted by file name at each
/// level) and opened one at a time as the archive is written.
///
/// # Examples
///
/// ```no_run
/// use gopack_core::FsSource;
/// use gopack_core::source::ModuleSource;
///
/// let mut source = FsSource::open("example")?;
/// println!("module {}", source.module_name()?);
/// for entry in source.files()?.entries {
///     println!("{}", entry.path);
/// }
/// # Ok::<(), gopack_core::PackError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    /// Opens `dir` as a module source.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::SourceNotFound`] if `dir` is not an existing
    /// directory.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(PackError::SourceNotFound {
                path: dir.to_path_buf(),
            });
        }
        Ok(Self {
            root: dir.canonicalize()?,
        })
    }

    /// Absolute path of the tree root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ModuleSource for FsSource {
    type Handle = PathBuf;

    fn describe(&self) -> String {
        format!("plain directory \"{}\"", self.root.display())
    }

    fn revision(&self) -> Option<&str> {
        None
    }

    fn module_name(&mut self) -> Result<String> {
        module::read_module_name(&self.root)
    }

    fn files(&mut self) -> Result<Listing<PathBuf>> {
        let mut listing = Listing::default();
        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|e| PackError::Io(e.into()))?;
            let file_type = entry.file_type();
            if file_type.is_dir() {
                continue;
            }

            let path = relative_path(&self.root, entry.path())?;
            if !file_type.is_file() {
                listing.skipped.push(path);
                continue;
            }

            let metadata = entry.metadata().map_err(|e| PackError::Io(e.into()))?;
            listing.entries.push(FileEntry {
                path,
                mode: file_mode(&metadata),
                handle: entry.into_path(),
            });
        }

        listing.sort();
        Ok(listing)
    }

    fn open(&mut self, entry: &FileEntry<PathBuf>) -> Result<Box<dyn Read + '_>> {
        Ok(Box::new(File::open(&entry.handle)?))
    }
}

/// Computes the `/`-separated path of `path` below `root`.
fn relative_path(root: &Path, path: &Path) -> Result<String> {
    let rel = path.strip_prefix(root).map_err(|_| PackError::PathEscape {
        path: path.display().to_string(),
    })?;

    let mut segments = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(segment) => {
                let segment = segment.to_str().ok_or_else(|| PackError::NonUtf8Path {
                    path: path.to_path_buf(),
                })?;
                segments.push(segment);
            }
            _ => {
                return Err(PackError::PathEscape {
                    path: rel.display().to_string(),
                });
            }
        }
    }
    Ok(segments.join("/"))
}

#[cfg(unix)]
fn file_mode(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o777
}

#[cfg(not(unix))]
fn file_mode(_metadata: &Metadata) -> u32 {
    0o644
}
