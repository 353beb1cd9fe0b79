use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::ml::BoosterParams;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub model: BoosterParams,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    /// CSV file with the feature columns plus `price`
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8501
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    /// Page heading
    #[serde(default = "default_title")]
    pub title: String,
    /// Currency label appended to estimates
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_title() -> String {
    "Melbourne Housing Price Predictor".to_string()
}

fn default_currency() -> String {
    "AUD".to_string()
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            currency: default_currency(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info,house_price=debug".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("dataset.path", "Melbourne_full_clean.csv")?
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port() as i64)?
            .set_default("logging.level", default_log_level())?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("HOUSE_PRICE_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (HOUSE_PRICE_SERVER__PORT, etc.)
            .add_source(
                Environment::with_prefix("HOUSE_PRICE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Configuration for a given dataset with every other value at its default
    pub fn default_config(dataset: impl Into<PathBuf>) -> Self {
        Self {
            dataset: DatasetConfig {
                path: dataset.into(),
            },
            model: BoosterParams::default(),
            server: ServerConfig::default(),
            ui: UiConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.dataset.path.as_os_str().is_empty() {
            errors.push("dataset.path must not be empty".to_string());
        }

        if let Err(e) = self.model.validate() {
            errors.push(format!("model: {e}"));
        }

        if self.server.host.trim().is_empty() {
            errors.push("server.host must not be empty".to_string());
        }

        if self.ui.currency.trim().is_empty() {
            errors.push("ui.currency must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_mirrors_reference_model() {
        let cfg = AppConfig::default_config("data/melbourne_sample.csv");
        assert_eq!(cfg.model.n_estimators, 200);
        assert_eq!(cfg.model.learning_rate, 0.05);
        assert_eq!(cfg.model.seed, 42);
        assert_eq!(cfg.server.port, 8501);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_collects_every_problem() {
        let mut cfg = AppConfig::default_config("");
        cfg.model.n_estimators = 0;
        cfg.ui.currency = " ".to_string();
        let errors = cfg.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn loads_overrides_from_toml() {
        let dir = std::env::temp_dir().join(format!("house-price-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("default.toml"),
            "[dataset]\npath = \"homes.csv\"\n\n[model]\nn_estimators = 50\nmax_depth = 6\n\n[server]\nport = 9000\n",
        )
        .unwrap();

        let cfg = AppConfig::load_from(&dir).unwrap();
        assert_eq!(cfg.dataset.path, PathBuf::from("homes.csv"));
        assert_eq!(cfg.model.n_estimators, 50);
        assert_eq!(cfg.model.max_depth, Some(6));
        assert_eq!(cfg.model.learning_rate, 0.05);
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.ui.currency, "AUD");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
