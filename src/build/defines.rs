//! Conversion between [`BuildConstants`] and bundler `--define` arguments.
//!
//! Values are JSON string literals so they survive shell quoting and are
//! substituted as string expressions by the bundler.

use super::constants::BuildConstants;
use super::BuildError;

pub const DEFINE_FLAG: &str = "--define";

pub const VERSION_KEY: &str = "__APP_VERSION__";
pub const BUILD_TIME_KEY: &str = "__BUILD_TIME__";
pub const BUILD_TIMESTAMP_KEY: &str = "__BUILD_TIMESTAMP__";
pub const GIT_COMMIT_KEY: &str = "__GIT_COMMIT__";
pub const GIT_BRANCH_KEY: &str = "__GIT_BRANCH__";
pub const RUNTIME_VERSION_KEY: &str = "__RUNTIME_VERSION__";

impl BuildConstants {
    /// `(key, json_value)` for every constant, in a fixed order.
    pub fn define_pairs(&self) -> Vec<(&'static str, String)> {
        [
            (VERSION_KEY, &self.version),
            (BUILD_TIME_KEY, &self.build_time),
            (BUILD_TIMESTAMP_KEY, &self.build_timestamp),
            (GIT_COMMIT_KEY, &self.git_commit),
            (GIT_BRANCH_KEY, &self.git_branch),
            (RUNTIME_VERSION_KEY, &self.runtime_version),
        ]
        .into_iter()
        .map(|(key, value)| (key, json_literal(value)))
        .collect()
    }

    /// Flattened `--define KEY=VALUE` arguments.
    pub fn to_define_args(&self) -> Vec<String> {
        self.define_pairs()
            .into_iter()
            .flat_map(|(key, value)| [DEFINE_FLAG.to_string(), format!("{key}={value}")])
            .collect()
    }

    /// Rebuild constants from an argument list.
    ///
    /// Non-define arguments and unrelated defines are skipped.
    pub fn from_define_args<S: AsRef<str>>(args: &[S]) -> Result<Self, BuildError> {
        let mut version = None;
        let mut build_time = None;
        let mut build_timestamp = None;
        let mut git_commit = None;
        let mut git_branch = None;
        let mut runtime_version = None;

        let mut iter = args.iter().map(|s| s.as_ref());
        while let Some(arg) = iter.next() {
            if arg != DEFINE_FLAG {
                continue;
            }
            let Some(define) = iter.next() else {
                return Err(BuildError::MalformedDefine(DEFINE_FLAG.to_string()));
            };
            let Some((key, raw)) = define.split_once('=') else {
                return Err(BuildError::MalformedDefine(define.to_string()));
            };

            let slot = match key {
                VERSION_KEY => &mut version,
                BUILD_TIME_KEY => &mut build_time,
                BUILD_TIMESTAMP_KEY => &mut build_timestamp,
                GIT_COMMIT_KEY => &mut git_commit,
                GIT_BRANCH_KEY => &mut git_branch,
                RUNTIME_VERSION_KEY => &mut runtime_version,
                _ => continue,
            };

            let value: String = serde_json::from_str(raw)
                .map_err(|e| BuildError::InvalidDefineValue {
                    key: key.to_string(),
                    reason: e.to_string(),
                })?;
            *slot = Some(value);
        }

        Ok(Self {
            version: version.ok_or(BuildError::MissingDefine(VERSION_KEY))?,
            build_time: build_time.ok_or(BuildError::MissingDefine(BUILD_TIME_KEY))?,
            build_timestamp: build_timestamp
                .ok_or(BuildError::MissingDefine(BUILD_TIMESTAMP_KEY))?,
            git_commit: git_commit.ok_or(BuildError::MissingDefine(GIT_COMMIT_KEY))?,
            git_branch: git_branch.ok_or(BuildError::MissingDefine(GIT_BRANCH_KEY))?,
            runtime_version: runtime_version
                .ok_or(BuildError::MissingDefine(RUNTIME_VERSION_KEY))?,
        })
    }
}

/// JSON string literal for a define value.
pub fn json_literal(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}
