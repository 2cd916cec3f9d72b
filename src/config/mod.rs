mod settings;

pub use settings::{
    BuildConfig, DatabaseConfig, LoggingConfig, MetricsConfig, OtelConfig, Settings,
    TemplateStoreConfig,
};
