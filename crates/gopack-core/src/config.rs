//! Configuration for packaging operations.

use crate::PathFilter;

/// Default base version when the caller does not supply one.
pub const DEFAULT_VERSION: &str = "v0.0.0";

/// Options for a single packaging operation.
///
/// Built once by the caller and handed by value to the selected driver.
/// `args` holds the positional arguments; the registry strips the driver
/// name before the driver sees them.
///
/// # Examples
///
/// ```
/// use gopack_core::PackagingOptions;
/// use gopack_core::PathFilter;
///
/// let options = PackagingOptions::new(["fs", "-d", "example"])
///     .with_version("v1.2.3")
///     .with_pseudo_version(true)
///     .with_filter(PathFilter::accept_all());
///
/// assert_eq!(options.args[0], "fs");
/// assert!(options.pseudo_version);
/// ```
#[derive(Debug, Clone)]
pub struct PackagingOptions {
    /// Positional arguments: driver name followed by driver flags.
    pub args: Vec<String>,

    /// Base version string, already validated by the caller.
    ///
    /// Default: `v0.0.0`.
    pub version: String,

    /// Append a pseudo-version suffix to `version`.
    ///
    /// Default: `false`.
    pub pseudo_version: bool,

    /// Predicate selecting which relative paths are archived.
    ///
    /// Default: skip hidden paths.
    pub filter: PathFilter,

    /// Archive writer settings.
    pub archive: ArchiveConfig,
}

impl Default for PackagingOptions {
    fn default() -> Self {
        Self {
            args: Vec::new(),
            version: DEFAULT_VERSION.to_string(),
            pseudo_version: false,
            filter: PathFilter::default(),
            archive: ArchiveConfig::default(),
        }
    }
}

impl PackagingOptions {
    /// Creates options with the given positional arguments and defaults
    /// for everything else.
    #[must_use]
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Sets the base version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Sets whether a pseudo-version is generated.
    #[must_use]
    pub fn with_pseudo_version(mut self, pseudo: bool) -> Self {
        self.pseudo_version = pseudo;
        self
    }

    /// Sets the path filter.
    #[must_use]
    pub fn with_filter(mut self, filter: PathFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Sets the compression level (0 = stored, 1-9 = deflate).
    #[must_use]
    pub fn with_compression_level(mut self, level: u8) -> Self {
        self.archive.compression_level = Some(level);
        self
    }

    /// Returns a copy with the first positional argument removed.
    #[must_use]
    pub(crate) fn shifted(&self) -> Self {
        Self {
            args: self.args.iter().skip(1).cloned().collect(),
            ..self.clone()
        }
    }
}

/// Zip writer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveConfig {
    /// Compression level.
    ///
    /// `Some(0)` stores entries uncompressed, `Some(1..=9)` deflates at that
    /// level and `None` uses the default.
    ///
    /// Default: `Some(6)`.
    pub compression_level: Option<u8>,

    /// Record unix permission bits for each entry.
    ///
    /// Default: `true`.
    pub preserve_permissions: bool,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            compression_level: Some(6),
            preserve_permissions: true,
        }
    }
}
