//! Package upload over HTTP.
//!
//! The archive is streamed as a `multipart/form-data` POST with a single part
//! named `file`. Only a `200 OK` response counts as success.

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;
use ureq::unversioned::multipart::Form;
use ureq::unversioned::multipart::Part;

/// Network timeout for package uploads.
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Form field carrying the archive.
const FILE_FIELD: &str = "file";

/// Uploads the archive at `path` to `url`.
///
/// # Errors
///
/// Fails when the archive cannot be opened, the request cannot be sent, or
/// the server answers with anything but `200`. The response body is part of
/// the error in the last case.
pub fn upload(url: &str, path: &Path) -> Result<()> {
    let part = Part::file(path)
        .with_context(|| format!("failed to read package '{}'", path.display()))?
        .mime_str("application/zip")
        .with_context(|| format!("upload to {url} failed"))?;
    let form = Form::new().part(FILE_FIELD, part);
    debug!(%url, path = %path.display(), "uploading package");

    let mut response = http_agent()
        .post(url)
        .send(form)
        .with_context(|| format!("upload to {url} failed"))?;

    let status = response.status().as_u16();
    if status != 200 {
        let body = response.body_mut().read_to_string().unwrap_or_default();
        let body = body.trim();
        if body.is_empty() {
            bail!("upload to {url} failed: server returned status {status}");
        }
        bail!("upload to {url} failed: server returned status {status}: {body}");
    }
    Ok(())
}

/// Shared `ureq` agent with request timeout configuration.
///
/// Error statuses come back as responses so their body can be reported.
fn http_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(UPLOAD_TIMEOUT))
            .http_status_as_error(false)
            .build();
        ureq::Agent::new_with_config(config)
    })
}
