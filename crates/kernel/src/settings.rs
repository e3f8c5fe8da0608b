use std::path::PathBuf;

use anyhow::{anyhow, Context};
use serde::Deserialize;

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "BOOKSTORE_ENV";
const CONFIG_DIR_ENV: &str = "BOOKSTORE_CONFIG_DIR";
const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Deployment environment the application is running in.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Test,
    Staging,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "local" => Ok(Environment::Local),
            "test" => Ok(Environment::Test),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(anyhow!(
                "unsupported environment '{}'; expected local/test/staging/production",
                other
            )),
        }
    }
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, environment overlay,
    /// and `BOOKSTORE__*` variables.
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let environment: Environment = std::env::var(ENV_VAR_NAME)
            .unwrap_or_else(|_| DEFAULT_ENV.to_string())
            .parse()?;

        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            // Default to repo root `config` directory.
            Err(_) => std::env::current_dir()
                .context("unable to resolve current directory")?
                .join("config"),
        };

        let mut settings = Self::from_dir(&config_dir, environment)?;

        if let Ok(url) = std::env::var(DATABASE_URL_ENV) {
            settings.database.url = url;
        }

        Ok(settings)
    }

    /// Build settings from `base.toml` and `<environment>.toml` under `config_dir`.
    pub fn from_dir(config_dir: &std::path::Path, environment: Environment) -> anyhow::Result<Self> {
        let environment_name = match environment {
            Environment::Local => "local",
            Environment::Test => "test",
            Environment::Staging => "staging",
            Environment::Production => "production",
        };

        let builder = config::Config::builder()
            .add_source(config::File::from(config_dir.join("base.toml")).required(false))
            .add_source(
                config::File::from(config_dir.join(format!("{environment_name}.toml")))
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix("BOOKSTORE")
                    .prefix_separator("__")
                    .separator("__"),
            );

        let cfg = builder
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        // The selected environment wins over anything found in files.
        settings.environment = environment;

        Ok(settings)
    }

    /// Database URL for the active environment.
    pub fn database_url(&self) -> String {
        self.database.url_for(self.environment)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
    #[serde(default = "ServerSettings::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ServerSettings {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        3000
    }

    fn default_request_timeout_ms() -> u64 {
        15000
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            request_timeout_ms: Self::default_request_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "DatabaseSettings::default_url")]
    pub url: String,
    #[serde(default = "DatabaseSettings::default_max_connections")]
    pub max_connections: u32,
    /// Appended to `url` when running in the `test` environment.
    #[serde(default = "DatabaseSettings::default_test_suffix")]
    pub test_suffix: String,
}

impl DatabaseSettings {
    fn default_url() -> String {
        "sqlite://bookstore.db".to_string()
    }

    fn default_max_connections() -> u32 {
        5
    }

    fn default_test_suffix() -> String {
        "-test".to_string()
    }

    /// Resolve the connection URL, keeping test and non-test stores apart.
    pub fn url_for(&self, environment: Environment) -> String {
        match environment {
            Environment::Test => format!("{}{}", self.url, self.test_suffix),
            _ => self.url.clone(),
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: Self::default_url(),
            max_connections: Self::default_max_connections(),
            test_suffix: Self::default_test_suffix(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    /// Fallback `EnvFilter` directive when `RUST_LOG` is unset.
    #[serde(default = "TelemetrySettings::default_filter")]
    pub filter: String,
    #[serde(default)]
    pub log_format: LogFormat,
}

impl TelemetrySettings {
    fn default_filter() -> String {
        "info".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            filter: Self::default_filter(),
            log_format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}
