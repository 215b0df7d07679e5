//! Version string synthesis.
//!
//! Release packages carry the caller's version verbatim. Snapshot packages
//! get a pseudo-version: `base-YYYYMMDDhhmmss-<12 hex chars>`.

use crate::PackError;
use crate::Result;
use chrono::DateTime;
use chrono::Utc;
use regex::Regex;
use std::sync::LazyLock;

/// Revision suffix used when the source has no commit identity.
pub const ZERO_REVISION: &str = "000000000000";

/// Number of revision characters kept in a pseudo-version.
pub const REVISION_PREFIX_LEN: usize = 12;

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

static VERSION_RE: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^v(\d+)\.(\d+)\.(\d+)(-\S+)?$"));

/// Builds the final version string.
///
/// When `snapshot` is false `base` is returned unchanged. Otherwise the
/// timestamp and the first 12 characters of `revision` are appended; a
/// missing revision becomes [`ZERO_REVISION`].
///
/// # Examples
///
/// ```
/// use chrono::TimeZone;
/// use chrono::Utc;
/// use gopack_core::version::synthesize;
///
/// let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
///
/// assert_eq!(synthesize("v1.2.3", false, at, None), "v1.2.3");
/// assert_eq!(
///     synthesize("v0.0.0", true, at, None),
///     "v0.0.0-20240102030405-000000000000"
/// );
/// assert_eq!(
///     synthesize("v0.0.0", true, at, Some("0123456789abcdef0123")),
///     "v0.0.0-20240102030405-0123456789ab"
/// );
/// ```
#[must_use]
pub fn synthesize(
    base: &str,
    snapshot: bool,
    timestamp: DateTime<Utc>,
    revision: Option<&str>,
) -> String {
    if !snapshot {
        return base.to_string();
    }
    let suffix = revision.map_or(ZERO_REVISION, |rev| {
        rev.get(..REVISION_PREFIX_LEN).unwrap_or(rev)
    });
    format!("{base}-{}-{suffix}", timestamp.format(TIMESTAMP_FORMAT))
}

/// Checks that `version` has the `vMAJOR.MINOR.PATCH[-PRERELEASE]` shape.
///
/// # Errors
///
/// Returns [`PackError::InvalidVersion`] when the string does not match.
///
/// # Examples
///
/// ```
/// use gopack_core::version::validate_base;
///
/// assert!(validate_base("v1.2.3").is_ok());
/// assert!(validate_base("v1.2.3-rc.1").is_ok());
/// assert!(validate_base("1.2.3").is_err());
/// ```
pub fn validate_base(version: &str) -> Result<()> {
    match &*VERSION_RE {
        Ok(re) if re.is_match(version) => Ok(()),
        _ => Err(PackError::InvalidVersion(version.to_string())),
    }
}
