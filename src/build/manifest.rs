//! Package manifest version lookup.

use std::path::Path;

use serde_json::Value;

use super::constants::DEFAULT_VERSION;

/// Read the `version` field of a JSON package manifest.
///
/// Any problem (missing file, invalid JSON, absent or non-string field, empty
/// string) yields [`DEFAULT_VERSION`].
pub async fn read_manifest_version(path: &Path) -> String {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Manifest unreadable, using default version");
            return DEFAULT_VERSION.to_string();
        }
    };

    match parse_manifest_version(&raw) {
        Some(version) => version,
        None => {
            tracing::warn!(path = %path.display(), "Manifest has no usable version field, using default version");
            DEFAULT_VERSION.to_string()
        }
    }
}

/// Extract a non-empty string `version` from manifest JSON.
pub fn parse_manifest_version(raw: &str) -> Option<String> {
    let manifest: Value = serde_json::from_str(raw).ok()?;
    manifest
        .get("version")?
        .as_str()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
