//! Git commit and branch lookup for build metadata.

use std::path::Path;

use thiserror::Error;
use tokio::process::Command;

use super::constants::UNKNOWN;

#[derive(Debug, Error)]
pub enum GitQueryError {
    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("git exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("git produced no output")]
    Empty,
}

/// Commit hash and branch name of the working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitMetadata {
    pub commit: String,
    pub branch: String,
}

impl GitMetadata {
    pub fn unknown() -> Self {
        Self {
            commit: UNKNOWN.to_string(),
            branch: UNKNOWN.to_string(),
        }
    }

    /// Query commit and branch concurrently.
    ///
    /// Without a `.git` entry in `repo_dir` git is not invoked at all. Each
    /// query falls back to `"unknown"` independently.
    pub async fn collect(repo_dir: &Path) -> Self {
        if !repo_dir.join(".git").exists() {
            tracing::debug!(repo_dir = %repo_dir.display(), "No git metadata found");
            return Self::unknown();
        }

        let (commit, branch) = tokio::join!(
            git_query(repo_dir, &["rev-parse", "HEAD"]),
            git_query(repo_dir, &["rev-parse", "--abbrev-ref", "HEAD"]),
        );

        Self {
            commit: or_unknown(commit, "commit"),
            branch: or_unknown(branch, "branch"),
        }
    }
}

async fn git_query(repo_dir: &Path, args: &[&str]) -> Result<String, GitQueryError> {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_dir)
        .output()
        .await?;

    if !output.status.success() {
        return Err(GitQueryError::Failed {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if value.is_empty() {
        return Err(GitQueryError::Empty);
    }
    Ok(value)
}

fn or_unknown(result: Result<String, GitQueryError>, field: &str) -> String {
    result.unwrap_or_else(|e| {
        tracing::warn!(field, error = %e, "Git query failed");
        UNKNOWN.to_string()
    })
}
