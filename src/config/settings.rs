use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub templates: TemplateStoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub otel: OtelConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Bundler invocation and build metadata sources.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildConfig {
    /// Package manifest holding the `version` field
    #[serde(default = "default_manifest_path")]
    pub manifest_path: PathBuf,
    /// Repository root queried for git metadata
    #[serde(default = "default_repo_dir")]
    pub repo_dir: PathBuf,
    /// Bundler executable
    #[serde(default = "default_bundler")]
    pub bundler: String,
    /// Bundle entry point
    #[serde(default = "default_entry_point")]
    pub entry_point: String,
    /// Output directory for the bundle
    #[serde(default = "default_out_dir")]
    pub out_dir: String,
    /// Bundler target platform
    #[serde(default = "default_target")]
    pub target: String,
    /// Dependencies left out of the bundle
    #[serde(default)]
    pub externals: Vec<String>,
}

fn default_manifest_path() -> PathBuf {
    PathBuf::from("package.json")
}

fn default_repo_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_bundler() -> String {
    "bun".to_string()
}

fn default_entry_point() -> String {
    "src/index.ts".to_string()
}

fn default_out_dir() -> String {
    "dist".to_string()
}

fn default_target() -> String {
    "bun".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u32,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u32,
}

fn default_database_url() -> String {
    "postgres://localhost:5432/auth".to_string()
}

fn default_pool_size() -> u32 {
    5
}

fn default_connect_timeout() -> u32 {
    10
}

fn default_idle_timeout() -> u32 {
    300 // 5 minutes
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateStoreConfig {
    /// "postgres" or "memory"
    #[serde(default = "default_template_backend")]
    pub backend: String,
}

fn default_template_backend() -> String {
    "postgres".to_string()
}

/// Logger factory settings.
///
/// `production` replaces the implicit environment check: it selects JSON
/// output at `info` level, otherwise compact output at `debug`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub production: bool,
    /// Overrides the level implied by `production`
    pub level: Option<String>,
    /// Overrides the format implied by `production`
    pub json: Option<bool>,
}

impl LoggingConfig {
    pub fn effective_level(&self) -> &str {
        match &self.level {
            Some(level) => level.as_str(),
            None if self.production => "info",
            None => "debug",
        }
    }

    pub fn use_json(&self) -> bool {
        self.json.unwrap_or(self.production)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtelConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_otel_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_sampling_ratio")]
    pub sampling_ratio: f64,
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_service_name() -> String {
    "auth-api-tooling".to_string()
}

fn default_sampling_ratio() -> f64 {
    1.0
}

/// Metrics export at the end of a run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsConfig {
    /// Prometheus text file for the node_exporter textfile collector
    pub textfile_path: Option<PathBuf>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .set_default("logging.production", is_production_mode(&run_mode))?
            .set_default("templates.backend", "postgres")?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // APP_BUILD__ENTRY_POINT, APP_DATABASE__URL, APP_LOGGING__LEVEL, etc.
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("build.externals"),
            );

        builder.build()?.try_deserialize()
    }
}

fn is_production_mode(run_mode: &str) -> bool {
    run_mode == "production" || run_mode == "prod"
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            manifest_path: default_manifest_path(),
            repo_dir: default_repo_dir(),
            bundler: default_bundler(),
            entry_point: default_entry_point(),
            out_dir: default_out_dir(),
            target: default_target(),
            externals: vec![],
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            pool_size: default_pool_size(),
            connect_timeout_seconds: default_connect_timeout(),
            idle_timeout_seconds: default_idle_timeout(),
        }
    }
}

impl Default for TemplateStoreConfig {
    fn default() -> Self {
        Self {
            backend: default_template_backend(),
        }
    }
}

impl Default for OtelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_otel_endpoint(),
            service_name: default_service_name(),
            sampling_ratio: default_sampling_ratio(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_build_values() {
        let build = BuildConfig::default();
        assert_eq!(build.manifest_path, PathBuf::from("package.json"));
        assert_eq!(build.bundler, "bun");
        assert_eq!(build.entry_point, "src/index.ts");
        assert_eq!(build.out_dir, "dist");
        assert!(build.externals.is_empty());
    }

    #[test]
    fn test_default_database_values() {
        let db = DatabaseConfig::default();
        assert_eq!(db.pool_size, 5);
        assert_eq!(db.idle_timeout_seconds, 300);
    }

    #[test]
    fn test_logging_follows_production_flag() {
        let dev = LoggingConfig::default();
        assert_eq!(dev.effective_level(), "debug");
        assert!(!dev.use_json());

        let prod = LoggingConfig {
            production: true,
            ..Default::default()
        };
        assert_eq!(prod.effective_level(), "info");
        assert!(prod.use_json());
    }

    #[test]
    fn test_logging_overrides_win() {
        let config = LoggingConfig {
            production: true,
            level: Some("warn".to_string()),
            json: Some(false),
        };
        assert_eq!(config.effective_level(), "warn");
        assert!(!config.use_json());
    }

    #[test]
    fn test_production_mode_names() {
        assert!(is_production_mode("production"));
        assert!(is_production_mode("prod"));
        assert!(!is_production_mode("development"));
    }

    // The only test in this crate that touches these variables
    #[test]
    fn test_environment_layering() {
        env::set_var("RUN_MODE", "production");
        env::set_var("APP_BUILD__EXTERNALS", "pg,@node-rs/argon2");
        env::set_var("APP_BUILD__ENTRY_POINT", "src/server.ts");
        env::set_var("APP_METRICS__TEXTFILE_PATH", "/var/lib/node_exporter/auth.prom");

        let settings = Settings::new();

        for key in [
            "RUN_MODE",
            "APP_BUILD__EXTERNALS",
            "APP_BUILD__ENTRY_POINT",
            "APP_METRICS__TEXTFILE_PATH",
        ] {
            env::remove_var(key);
        }

        let settings = settings.unwrap();
        assert!(settings.logging.production);
        assert_eq!(settings.build.externals, vec!["pg", "@node-rs/argon2"]);
        assert_eq!(settings.build.entry_point, "src/server.ts");
        assert_eq!(settings.build.bundler, "bun");
        assert_eq!(
            settings.metrics.textfile_path,
            Some(PathBuf::from("/var/lib/node_exporter/auth.prom"))
        );
    }
}
