// ABOUTME: Configuration file loading, environment overrides and hierarchical merging for restyle
// ABOUTME: Supports TOML config files with XDG Base Directory lookup and resolves concrete settings

use anyhow::{Context, Result, anyhow};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use url::Url;

use crate::constants::{config as defaults, files};

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct Config {
    #[serde(default, deserialize_with = "validate_url")]
    pub api_base: Option<String>,
    #[serde(default)]
    pub model_version: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub upload_dir: Option<PathBuf>,
    #[serde(default, deserialize_with = "validate_url")]
    pub public_url: Option<String>,
}

/// Fully resolved settings handed to the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_base: Option<String>,
    pub model_version: Option<String>,
    pub port: u16,
    pub output_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub public_url: String,
}

impl Config {
    /// Load configuration from standard locations, then apply the environment
    pub fn load() -> Result<Self> {
        let paths = Self::get_config_paths();
        let path_refs: Vec<&str> = paths.iter().map(|p| p.as_str()).collect();
        let config = Self::load_from_paths(&path_refs)?;
        let config = config.with_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from specific file paths, later paths overriding earlier ones
    pub fn load_from_paths(paths: &[&str]) -> Result<Self> {
        let mut config = Config::default();

        for path in paths {
            if !Path::new(path).exists() {
                continue;
            }
            let file_config = Self::load_from_file(path)?;
            log::debug!("Loaded config from {}", path);
            config = config.merge(file_config);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a single file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content).with_context(|| {
            format!(
                "Failed to parse TOML config file: {}",
                path.as_ref().display()
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Standard config file paths, lowest precedence first
    pub fn get_config_paths() -> Vec<String> {
        let mut paths = Vec::new();

        if let Some(home_dir) = dirs::home_dir() {
            let path = home_dir
                .join(".config")
                .join(defaults::APP_DIR)
                .join("config.toml");
            paths.push(path.to_string_lossy().to_string());
        }

        if let Some(config_home) = std::env::var_os("XDG_CONFIG_HOME") {
            let path = PathBuf::from(config_home)
                .join(defaults::APP_DIR)
                .join("config.toml");
            paths.push(path.to_string_lossy().to_string());
        }

        if let Ok(current_dir) = std::env::current_dir() {
            paths.push(
                current_dir
                    .join(defaults::PROJECT_CONFIG_FILE)
                    .to_string_lossy()
                    .to_string(),
            );
        }

        paths.dedup();
        paths
    }

    /// Merge this config with another, giving precedence to the other config
    pub fn merge(self, other: Config) -> Config {
        Config {
            api_base: other.api_base.or(self.api_base),
            model_version: other.model_version.or(self.model_version),
            port: other.port.or(self.port),
            output_dir: other.output_dir.or(self.output_dir),
            upload_dir: other.upload_dir.or(self.upload_dir),
            public_url: other.public_url.or(self.public_url),
        }
    }

    /// Overlay values from the environment. `lookup` is injected so tests
    /// need not touch the process environment.
    pub fn with_env<F>(self, lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match get(defaults::ENV_PORT) {
            Some(raw) => match raw.parse::<u16>() {
                Ok(port) => Some(port),
                Err(_) => {
                    log::warn!("Ignoring invalid {}={}", defaults::ENV_PORT, raw);
                    None
                }
            },
            None => None,
        };

        self.merge(Config {
            api_base: get(defaults::ENV_API_BASE),
            model_version: get(defaults::ENV_MODEL_VERSION),
            port,
            output_dir: get(defaults::ENV_OUTPUT_DIR).map(PathBuf::from),
            upload_dir: get(defaults::ENV_UPLOAD_DIR).map(PathBuf::from),
            public_url: get(defaults::ENV_PUBLIC_URL),
        })
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        if self.port == Some(0) {
            return Err(anyhow!("Invalid port 0"));
        }
        for url in [&self.api_base, &self.public_url].into_iter().flatten() {
            check_url(url).map_err(|e| anyhow!(e))?;
        }
        if let Some(version) = &self.model_version {
            if version.trim().is_empty() {
                return Err(anyhow!("model_version must not be empty"));
            }
        }
        Ok(())
    }

    /// Fill every unset value with its default
    pub fn resolve(self) -> Settings {
        let port = self.port.unwrap_or(defaults::DEFAULT_PORT);
        Settings {
            api_base: self.api_base,
            model_version: self.model_version,
            port,
            output_dir: self
                .output_dir
                .unwrap_or_else(|| PathBuf::from(defaults::DEFAULT_OUTPUT_DIR)),
            upload_dir: self
                .upload_dir
                .unwrap_or_else(|| PathBuf::from(defaults::DEFAULT_UPLOAD_DIR)),
            public_url: self
                .public_url
                .unwrap_or_else(|| format!("http://localhost:{}", port)),
        }
    }
}

impl Settings {
    /// URL under which the serving layer exposes a file from the output directory
    pub fn output_url(&self, file_name: &str) -> String {
        format!(
            "{}{}/{}",
            self.public_url.trim_end_matches('/'),
            files::OUTPUTS_URL_PREFIX,
            file_name
        )
    }
}

/// Provider token from the environment; never read from config files.
pub fn api_token() -> Option<SecretString> {
    std::env::var(defaults::ENV_API_TOKEN)
        .ok()
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .map(|token| SecretString::new(token.into_boxed_str()))
}

fn check_url(raw: &str) -> std::result::Result<(), String> {
    let parsed = Url::parse(raw).map_err(|e| format!("Invalid URL '{}': {}", raw, e))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!(
            "Invalid URL '{}': scheme must be http or https, got {}",
            raw, other
        )),
    }
}

// Custom deserializer for URL validation
fn validate_url<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value: Option<String> = Option::deserialize(deserializer)?;
    if let Some(ref url) = value {
        check_url(url).map_err(D::Error::custom)?;
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_resolves() {
        let settings = Config::default().resolve();
        assert_eq!(settings.port, 5001);
        assert_eq!(settings.output_dir, PathBuf::from("outputs"));
        assert_eq!(settings.upload_dir, PathBuf::from("uploads"));
        assert_eq!(settings.public_url, "http://localhost:5001");
        assert!(settings.api_base.is_none());
    }

    #[test]
    fn test_merge_configs() {
        let base = Config {
            port: Some(8080),
            output_dir: Some(PathBuf::from("/base/out")),
            ..Default::default()
        };

        let override_config = Config {
            port: Some(9090),
            api_base: Some("https://custom.api.com/v1".to_string()),
            ..Default::default()
        };

        let merged = base.merge(override_config);
        assert_eq!(merged.port, Some(9090));
        assert_eq!(merged.output_dir, Some(PathBuf::from("/base/out")));
        assert_eq!(merged.api_base, Some("https://custom.api.com/v1".to_string()));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("PORT", "7000"),
            ("RESTYLE_OUTPUT_DIR", "/srv/outputs"),
            ("RESTYLE_UPLOAD_DIR", "  "),
        ]);
        let file = Config {
            port: Some(8080),
            upload_dir: Some(PathBuf::from("/file/uploads")),
            ..Default::default()
        };

        let config = file.with_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.port, Some(7000));
        assert_eq!(config.output_dir, Some(PathBuf::from("/srv/outputs")));
        assert_eq!(config.upload_dir, Some(PathBuf::from("/file/uploads")));
    }

    #[test]
    fn test_invalid_env_port_ignored() {
        let config = Config {
            port: Some(8080),
            ..Default::default()
        }
        .with_env(|key| (key == "PORT").then(|| "not-a-port".to_string()));
        assert_eq!(config.port, Some(8080));
    }

    #[test]
    fn test_public_url_defaults_to_port() {
        let settings = Config {
            port: Some(6000),
            ..Default::default()
        }
        .resolve();
        assert_eq!(settings.public_url, "http://localhost:6000");
        assert_eq!(
            settings.output_url("abc-resized.png"),
            "http://localhost:6000/outputs/abc-resized.png"
        );
    }

    #[test]
    fn test_output_url_trims_trailing_slash() {
        let settings = Config {
            public_url: Some("https://cdn.example.com/".to_string()),
            ..Default::default()
        }
        .resolve();
        assert_eq!(
            settings.output_url("x.png"),
            "https://cdn.example.com/outputs/x.png"
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(
            Config {
                port: Some(0),
                ..Default::default()
            }
            .validate()
            .is_err()
        );
        assert!(
            Config {
                api_base: Some("ftp://example.com".to_string()),
                ..Default::default()
            }
            .validate()
            .is_err()
        );
        assert!(
            Config {
                model_version: Some(" ".to_string()),
                ..Default::default()
            }
            .validate()
            .is_err()
        );
    }
}
