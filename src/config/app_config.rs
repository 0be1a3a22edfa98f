use serde::Deserialize;

use crate::domain::experiment::VariantStage;
use crate::infrastructure::observability::MetricsConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub experiments: ExperimentsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Fallback model configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ModelConfig {
    /// Path to the trained model artifact; predictions are unavailable until
    /// a model or variant exists when this is unset
    #[serde(default)]
    pub path: Option<String>,
}

/// A/B experiment configuration applied at startup
///
/// Mirrors the runtime administrative surface: strategy, compact traffic
/// string, and the initial variant set all go through the same router
/// operations reconfiguration uses.
#[derive(Debug, Clone, Deserialize)]
pub struct ExperimentsConfig {
    /// Whether to enable the experiment after applying configuration
    #[serde(default)]
    pub enabled: bool,
    /// Identifier reported by `status()` while the experiment is enabled
    #[serde(default = "default_experiment_id")]
    pub experiment_id: String,
    /// Routing strategy name; unrecognized values fail open to `random`
    #[serde(default = "default_strategy")]
    pub strategy: String,
    /// Compact traffic override, e.g. `production:90,staging:10`
    #[serde(default)]
    pub traffic: Option<String>,
    /// Initial variant set
    #[serde(default)]
    pub variants: Vec<VariantEntry>,
}

/// A single configured variant
#[derive(Debug, Clone, Deserialize)]
pub struct VariantEntry {
    pub name: String,
    pub traffic_share: f64,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub stage: VariantStage,
    /// Artifact path for this variant; the fallback model serves the variant
    /// when omitted
    #[serde(default)]
    pub model_path: Option<String>,
}

fn default_experiment_id() -> String {
    "default".to_string()
}

fn default_strategy() -> String {
    "random".to_string()
}

fn default_version() -> String {
    "unknown".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for ExperimentsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            experiment_id: default_experiment_id(),
            strategy: default_strategy(),
            traffic: None,
            variants: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
