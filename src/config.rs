use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;
use url::Url;

pub const BASE_URL_ENV: &str = "BASE_URL";
pub const API_KEY_ENV: &str = "API_SECRET_KEY";
pub const HOST_ENV: &str = "FXGATE_HOST";
pub const PORT_ENV: &str = "FXGATE_PORT";

pub const DEFAULT_CONFIG: &str = r#"---
# Upstream exchange rate provider. BASE_URL and API_SECRET_KEY
# environment variables take precedence over these values.
upstream:
  base_url: "https://api.currencyapi.com/v3/"
  api_key: ""
  timeout_secs: 30

server:
  host: "127.0.0.1"
  port: 8700
"#;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct UpstreamConfig {
    /// Prefix for every upstream path, expected to end with `/`.
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        UpstreamConfig {
            base_url: String::new(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8700,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl AppConfig {
    /// Loads the default config file if present, then applies the process environment.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        let mut config = if config_path.exists() {
            Self::load_from_path(&config_path)?
        } else {
            debug!("No config file at {}, using defaults", config_path.display());
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Loads an explicit config file, then applies the process environment.
    pub fn load_with_env<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let mut config = Self::load_from_path(path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "fxgate", "fxgate")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Overrides file values with environment variables looked up through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(BASE_URL_ENV) {
            self.upstream.base_url = base_url;
        }
        if let Some(api_key) = lookup(API_KEY_ENV) {
            self.upstream.api_key = api_key;
        }
        if let Some(host) = lookup(HOST_ENV) {
            self.server.host = host;
        }
        if let Some(port) = lookup(PORT_ENV) {
            self.server.port = port
                .parse()
                .with_context(|| format!("Invalid {PORT_ENV} value: {port}"))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.upstream.base_url.is_empty() {
            bail!("Upstream base URL is not configured (set {BASE_URL_ENV})");
        }
        Url::parse(&self.upstream.base_url)
            .with_context(|| format!("Invalid upstream base URL: {}", self.upstream.base_url))?;
        if self.upstream.api_key.is_empty() {
            bail!("Upstream API key is not configured (set {API_KEY_ENV})");
        }
        if self.upstream.timeout_secs == 0 {
            bail!("Upstream timeout must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn valid_config() -> AppConfig {
        AppConfig {
            upstream: UpstreamConfig {
                base_url: "https://rates.example.com/v1/".to_string(),
                api_key: "secret".to_string(),
                timeout_secs: 30,
            },
            server: ServerConfig::default(),
        }
    }

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
upstream:
  base_url: "https://rates.example.com/v1/"
  api_key: "secret"
  timeout_secs: 5
server:
  host: "0.0.0.0"
  port: 9000
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.upstream.base_url, "https://rates.example.com/v1/");
        assert_eq!(config.upstream.api_key, "secret");
        assert_eq!(config.upstream.timeout_secs, 5);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_config_partial_server_section() {
        let yaml_str = r#"
upstream:
  base_url: "https://rates.example.com/v1/"
  api_key: "secret"
server:
  port: 9000
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);

        let host_only: AppConfig =
            serde_yaml::from_str("server:\n  host: \"0.0.0.0\"\n").unwrap();
        assert_eq!(host_only.server.host, "0.0.0.0");
        assert_eq!(host_only.server.port, 8700);
    }

    #[test]
    fn test_config_defaults_for_missing_sections() {
        let yaml_str = r#"
upstream:
  base_url: "https://rates.example.com/v1/"
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        assert_eq!(config.upstream.api_key, "");
        assert_eq!(config.upstream.timeout_secs, 30);
        assert_eq!(config.server, ServerConfig::default());
        assert_eq!(config.server.port, 8700);
    }

    #[test]
    fn test_default_config_template_parses() {
        let config: AppConfig = serde_yaml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.upstream.base_url, "https://api.currencyapi.com/v3/");
        assert!(config.upstream.api_key.is_empty());
        assert_eq!(config.server.port, 8700);
    }

    #[test]
    fn test_env_overrides_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            (BASE_URL_ENV, "http://localhost:9999/"),
            (API_KEY_ENV, "from-env"),
            (PORT_ENV, "8800"),
        ]);

        let mut config = valid_config();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.upstream.base_url, "http://localhost:9999/");
        assert_eq!(config.upstream.api_key, "from-env");
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8800);
    }

    #[test]
    fn test_env_invalid_port() {
        let mut config = valid_config();
        let result = config.apply_env(|key| (key == PORT_ENV).then(|| "http".to_string()));
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Invalid FXGATE_PORT value: http")
        );
    }

    #[test]
    fn test_validate() {
        assert!(valid_config().validate().is_ok());

        let mut missing_key = valid_config();
        missing_key.upstream.api_key.clear();
        assert!(
            missing_key
                .validate()
                .unwrap_err()
                .to_string()
                .contains("API_SECRET_KEY")
        );

        let mut missing_url = valid_config();
        missing_url.upstream.base_url.clear();
        assert!(
            missing_url
                .validate()
                .unwrap_err()
                .to_string()
                .contains("BASE_URL")
        );

        let mut relative_url = valid_config();
        relative_url.upstream.base_url = "rates/v1/".to_string();
        assert!(relative_url.validate().is_err());

        let mut zero_timeout = valid_config();
        zero_timeout.upstream.timeout_secs = 0;
        assert!(zero_timeout.validate().is_err());
    }

    #[test]
    fn test_load_from_path() {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(
            file.path(),
            "upstream:\n  base_url: \"https://rates.example.com/\"\n  api_key: \"k\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.upstream.base_url, "https://rates.example.com/");
        assert_eq!(config.upstream.api_key, "k");
    }

    #[test]
    fn test_load_from_missing_path() {
        let result = AppConfig::load_from_path("/nonexistent/fxgate/config.yaml");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }
}
