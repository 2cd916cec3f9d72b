//! Build metadata generation and bundler invocation.
//!
//! This module provides:
//! - [`BuildConstants`]: version, timestamps, git commit/branch and bundler version
//! - Conversion of the constants to `--define KEY=JSON` arguments and back
//! - [`BundlerInvocation`]: the external bundler call whose exit status gates the build
//!
//! Metadata collection never fails; missing sources fall back to `"0.0.0"`
//! (version) or `"unknown"`.
//!
//! # Example
//!
//! ```ignore
//! let outcome = run_build(&settings.build).await?;
//! if !outcome.success {
//!     std::process::exit(1);
//! }
//! ```

mod bundler;
mod constants;
mod defines;
mod git;
mod manifest;

pub use bundler::{BundlerInvocation, NODE_ENV_KEY, NODE_ENV_VALUE};
pub use constants::{detect_runtime_version, BuildConstants, DEFAULT_VERSION, UNKNOWN};
pub use defines::{
    json_literal, BUILD_TIMESTAMP_KEY, BUILD_TIME_KEY, DEFINE_FLAG, GIT_BRANCH_KEY,
    GIT_COMMIT_KEY, RUNTIME_VERSION_KEY, VERSION_KEY,
};
pub use git::{GitMetadata, GitQueryError};
pub use manifest::{parse_manifest_version, read_manifest_version};

use thiserror::Error;

use crate::config::BuildConfig;

/// Build-specific error type
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed define argument: {0}")]
    MalformedDefine(String),

    #[error("Define {key} is not a JSON string: {reason}")]
    InvalidDefineValue { key: String, reason: String },

    #[error("Missing define: {0}")]
    MissingDefine(&'static str),
}

/// Result of one build run
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub constants: BuildConstants,
    pub success: bool,
}

/// Collect the build constants and run the bundler with them.
pub async fn run_build(config: &BuildConfig) -> Result<BuildOutcome, BuildError> {
    let constants = BuildConstants::collect(config).await;

    tracing::info!(
        version = %constants.version,
        build_time = %constants.build_time,
        build_timestamp = %constants.build_timestamp,
        git_commit = %constants.git_commit,
        git_branch = %constants.git_branch,
        runtime_version = %constants.runtime_version,
        "Build constants collected"
    );

    let invocation = BundlerInvocation::new(config, &constants);
    let success = invocation.run().await?;

    Ok(BuildOutcome { constants, success })
}
