//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, ExperimentsConfig, LogFormat, LoggingConfig, ModelConfig, ServerConfig,
    VariantEntry,
};
