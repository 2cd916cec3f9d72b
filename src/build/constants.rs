//! Build metadata snapshot.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tokio::process::Command;

use crate::config::BuildConfig;

use super::git::GitMetadata;
use super::manifest::read_manifest_version;

/// Fallback for any metadata that could not be determined
pub const UNKNOWN: &str = "unknown";

/// Fallback version when the manifest has none
pub const DEFAULT_VERSION: &str = "0.0.0";

/// Metadata embedded into the bundle as compile-time defines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConstants {
    /// Manifest version
    pub version: String,

    /// Human-readable build time
    pub build_time: String,

    /// RFC 3339 build timestamp
    pub build_timestamp: String,

    /// Commit hash of HEAD
    pub git_commit: String,

    /// Current branch name
    pub git_branch: String,

    /// Version string reported by the bundler
    pub runtime_version: String,
}

impl BuildConstants {
    /// Assemble the snapshot from already-gathered parts.
    pub fn from_parts(
        version: String,
        built_at: DateTime<Utc>,
        git: GitMetadata,
        runtime_version: String,
    ) -> Self {
        Self {
            version,
            build_time: built_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            build_timestamp: built_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            git_commit: git.commit,
            git_branch: git.branch,
            runtime_version,
        }
    }

    /// Gather all metadata for the configured project.
    ///
    /// Never fails: every source has a sentinel fallback. Git and the
    /// bundler version probe run concurrently.
    pub async fn collect(config: &BuildConfig) -> Self {
        let built_at = Utc::now();

        let (version, git, runtime_version) = tokio::join!(
            read_manifest_version(&config.manifest_path),
            GitMetadata::collect(&config.repo_dir),
            detect_runtime_version(&config.bundler),
        );

        Self::from_parts(version, built_at, git, runtime_version)
    }
}

/// First line of `<program> --version`, or `"unknown"`.
pub async fn detect_runtime_version(program: &str) -> String {
    let output = match Command::new(program).arg("--version").output().await {
        Ok(output) if output.status.success() => output,
        Ok(output) => {
            tracing::warn!(program, status = %output.status, "Version probe failed");
            return UNKNOWN.to_string();
        }
        Err(e) => {
            tracing::warn!(program, error = %e, "Version probe could not run");
            return UNKNOWN.to_string();
        }
    };

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN.to_string())
}
