//! External bundler invocation.

use std::process::Stdio;
use std::time::Instant;

use tokio::process::Command;

use crate::config::BuildConfig;
use crate::metrics::BuildMetrics;

use super::constants::BuildConstants;
use super::defines::{json_literal, DEFINE_FLAG};
use super::BuildError;

/// Environment define baked into every bundle
pub const NODE_ENV_KEY: &str = "process.env.NODE_ENV";
pub const NODE_ENV_VALUE: &str = "production";

/// Program plus the full argument list handed to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundlerInvocation {
    pub program: String,
    pub args: Vec<String>,
}

impl BundlerInvocation {
    /// Fixed flags first, then one `--external` per dependency, then the
    /// build constants.
    pub fn new(config: &BuildConfig, constants: &BuildConstants) -> Self {
        let mut args = vec![
            "build".to_string(),
            config.entry_point.clone(),
            "--outdir".to_string(),
            config.out_dir.clone(),
            "--target".to_string(),
            config.target.clone(),
            "--minify".to_string(),
            "--sourcemap".to_string(),
            DEFINE_FLAG.to_string(),
            format!("{}={}", NODE_ENV_KEY, json_literal(NODE_ENV_VALUE)),
        ];

        for external in &config.externals {
            args.push("--external".to_string());
            args.push(external.clone());
        }

        args.extend(constants.to_define_args());

        Self {
            program: config.bundler.clone(),
            args,
        }
    }

    /// Run the bundler with inherited stdio.
    ///
    /// Returns whether it exited successfully; only a failure to start the
    /// process is an error.
    pub async fn run(&self) -> Result<bool, BuildError> {
        tracing::info!(program = %self.program, args = ?self.args, "Running bundler");

        let started = Instant::now();
        let status = match Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
        {
            Ok(status) => status,
            Err(source) => {
                BuildMetrics::record(false, started.elapsed().as_secs_f64());
                return Err(BuildError::Spawn {
                    program: self.program.clone(),
                    source,
                });
            }
        };
        let elapsed = started.elapsed();

        let success = status.success();
        BuildMetrics::record(success, elapsed.as_secs_f64());

        if success {
            tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "Bundler finished");
        } else {
            tracing::error!(
                status = %status,
                code = ?status.code(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Bundler exited with failure"
            );
        }

        Ok(success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::BUILDS_TOTAL;

    fn constants() -> BuildConstants {
        BuildConstants {
            version: "1.0.0".to_string(),
            build_time: "2026-10-17 08:00:00 UTC".to_string(),
            build_timestamp: "2026-10-17T08:00:00.000Z".to_string(),
            git_commit: "unknown".to_string(),
            git_branch: "unknown".to_string(),
            runtime_version: "unknown".to_string(),
        }
    }

    #[test]
    fn test_invocation_arguments() {
        let config = BuildConfig {
            externals: vec!["pg".to_string(), "@node-rs/argon2".to_string()],
            ..Default::default()
        };
        let invocation = BundlerInvocation::new(&config, &constants());

        assert_eq!(invocation.program, "bun");
        assert_eq!(
            &invocation.args[..10],
            &[
                "build",
                "src/index.ts",
                "--outdir",
                "dist",
                "--target",
                "bun",
                "--minify",
                "--sourcemap",
                "--define",
                r#"process.env.NODE_ENV="production""#,
            ]
        );
        assert_eq!(
            &invocation.args[10..14],
            &["--external", "pg", "--external", "@node-rs/argon2"]
        );
        assert_eq!(&invocation.args[14..], constants().to_define_args().as_slice());
    }

    #[test]
    fn test_invocation_round_trips_constants() {
        let invocation = BundlerInvocation::new(&BuildConfig::default(), &constants());
        let parsed = BuildConstants::from_define_args(&invocation.args).unwrap();
        assert_eq!(parsed, constants());
    }

    #[tokio::test]
    async fn test_missing_bundler_is_spawn_error() {
        let failures = || BUILDS_TOTAL.with_label_values(&["failure"]).get();
        let before = failures();

        let invocation = BundlerInvocation {
            program: "definitely-not-a-real-bundler-binary".to_string(),
            args: vec![],
        };
        assert!(matches!(
            invocation.run().await,
            Err(BuildError::Spawn { .. })
        ));
        assert!(failures() > before);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_status_gates_success() {
        let ok = BundlerInvocation {
            program: "true".to_string(),
            args: vec![],
        };
        assert!(ok.run().await.unwrap());

        let failing = BundlerInvocation {
            program: "false".to_string(),
            args: vec![],
        };
        assert!(!failing.run().await.unwrap());
    }
}
