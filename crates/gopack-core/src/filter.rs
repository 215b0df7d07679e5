//! Path filtering for archive entries.
//!
//! A [`PathFilter`] decides which archive-relative paths are written into
//! the module zip. The default policy drops hidden entries, meaning any path
//! with a segment that starts with `.`.

use std::fmt;
use std::sync::Arc;

type Predicate = dyn Fn(&str) -> bool + Send + Sync;

/// Predicate over archive-relative paths (forward slashes, no leading `/`).
///
/// Cloning is cheap; custom predicates are shared behind an `Arc`.
///
/// # Examples
///
/// ```
/// use gopack_core::PathFilter;
///
/// let filter = PathFilter::default();
/// assert!(filter.accepts("main.go"));
/// assert!(!filter.accepts(".git/config"));
///
/// let all = PathFilter::accept_all();
/// assert!(all.accepts(".git/config"));
///
/// let go_only = PathFilter::new(|path| path.ends_with(".go"));
/// assert!(!go_only.accepts("README.md"));
/// ```
#[derive(Clone)]
pub enum PathFilter {
    /// Reject paths with a hidden segment.
    SkipHidden,
    /// Accept every path.
    AcceptAll,
    /// Caller-supplied predicate.
    Custom(Arc<Predicate>),
}

impl PathFilter {
    /// Wraps a caller-supplied predicate.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(predicate))
    }

    /// Filter that accepts every path.
    #[must_use]
    pub const fn accept_all() -> Self {
        Self::AcceptAll
    }

    /// Picks the default policy, or accept-all when hidden files are wanted.
    #[must_use]
    pub const fn include_hidden(include: bool) -> Self {
        if include { Self::AcceptAll } else { Self::SkipHidden }
    }

    /// Returns `true` if `path` belongs in the archive.
    #[must_use]
    pub fn accepts(&self, path: &str) -> bool {
        match self {
            Self::SkipHidden => !is_hidden(path),
            Self::AcceptAll => true,
            Self::Custom(predicate) => predicate(path),
        }
    }
}

impl Default for PathFilter {
    fn default() -> Self {
        Self::SkipHidden
    }
}

impl fmt::Debug for PathFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SkipHidden => f.write_str("SkipHidden"),
            Self::AcceptAll => f.write_str("AcceptAll"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Checks whether any segment of a relative path starts with `.`.
///
/// # Examples
///
/// ```
/// use gopack_core::filter::is_hidden;
///
/// assert!(is_hidden(".env"));
/// assert!(is_hidden("a/.hidden/file"));
/// assert!(!is_hidden("cmd/tool/main.go"));
/// assert!(!is_hidden("docs/v1.2/notes.md"));
/// ```
#[must_use]
pub fn is_hidden(path: &str) -> bool {
    path.split('/').any(|segment| segment.starts_with('.'))
}
