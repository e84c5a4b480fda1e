// Copyright (C) 2026  winnyboy5
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
use crate::error::{ConfigError, ConfigResult};
use crate::schema::{Config, StdinCapture, DEFAULT_SECRET_FILE};
use crate::validation::Validator;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Prefix of every environment override
pub const ENV_PREFIX: &str = "SHELLGATE_";

/// Configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::InvalidPath(path.to_path_buf())),
        }
    }

    /// Get format name as string
    pub fn name(&self) -> &'static str {
        match self {
            ConfigFormat::Toml => "TOML",
            ConfigFormat::Yaml => "YAML",
            ConfigFormat::Json => "JSON",
        }
    }
}

/// Configuration loader
pub struct ConfigLoader {
    validate: bool,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        ConfigLoader { validate: true }
    }

    /// Create a loader without validation
    pub fn without_validation() -> Self {
        ConfigLoader { validate: false }
    }

    /// Load configuration from a file.
    ///
    /// The shared secret is resolved relative to the file's directory.
    pub async fn load_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<Config> {
        let (config, base_dir) = self.read_file(path.as_ref()).await?;
        self.finish(config, &base_dir).await
    }

    /// Load configuration from a file, then apply `SHELLGATE_*` overrides
    pub async fn load_with_overrides<P: AsRef<Path>>(&self, path: P) -> ConfigResult<Config> {
        let (mut config, base_dir) = self.read_file(path.as_ref()).await?;
        self.apply_env_overrides(&mut config)?;
        self.finish(config, &base_dir).await
    }

    /// Load configuration from a string.
    ///
    /// No secret file lookup happens here; only an inline `secret` is kept.
    pub fn load_from_string(&self, content: &str, format: ConfigFormat) -> ConfigResult<Config> {
        let config = parse(content, format)?;

        debug!("Configuration loaded from {}", format.name());

        if self.validate {
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&self, config: &mut Config) -> ConfigResult<()> {
        self.apply_overrides_from(config, |name| std::env::var(name).ok())
    }

    /// Apply overrides using a custom variable lookup
    pub fn apply_overrides_from<F>(&self, config: &mut Config, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| lookup(&format!("{ENV_PREFIX}{suffix}"));

        if let Some(value) = var("GITLAB_URL") {
            config.gitlab_url = value;
        }
        if let Some(value) = var("SECRET") {
            config.secret = Some(value);
        }
        if let Some(value) = var("LOG_LEVEL") {
            config.log_level = value;
        }
        if let Some(value) = var("LOG_FORMAT") {
            config.log_format = value;
        }
        if let Some(value) = var("LOG_FILE") {
            config.log_file = Some(PathBuf::from(value));
        }
        if let Some(value) = var("HTTP_USER") {
            config.http_settings.user = Some(value);
        }
        if let Some(value) = var("HTTP_PASSWORD") {
            config.http_settings.password = Some(value);
        }
        if let Some(value) = var("HTTP_READ_TIMEOUT") {
            config.http_settings.read_timeout_seconds = value.parse().map_err(|_| {
                ConfigError::env_var_parsing_error(
                    format!("{ENV_PREFIX}HTTP_READ_TIMEOUT"),
                    &value,
                    "expected a number of seconds",
                )
            })?;
        }
        if let Some(value) = var("STDIN_CAPTURE") {
            config.custom_action.stdin_capture = StdinCapture::parse(&value).ok_or_else(|| {
                ConfigError::env_var_parsing_error(
                    format!("{ENV_PREFIX}STDIN_CAPTURE"),
                    &value,
                    "expected 'token' or 'to_end'",
                )
            })?;
        }

        Ok(())
    }

    async fn read_file(&self, path: &Path) -> ConfigResult<(Config, PathBuf)> {
        debug!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let format = ConfigFormat::from_path(path)?;
        let content = fs::read_to_string(path).await?;

        info!(
            "Loaded {} configuration file: {}",
            format.name(),
            path.display()
        );

        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Ok((parse(&content, format)?, base_dir))
    }

    async fn finish(&self, mut config: Config, base_dir: &Path) -> ConfigResult<Config> {
        resolve_secret(&mut config, base_dir).await?;

        if self.validate {
            config.validate()?;
            debug!("Configuration validated successfully");
        }

        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse(content: &str, format: ConfigFormat) -> ConfigResult<Config> {
    let config = match format {
        ConfigFormat::Toml => toml::from_str(content)?,
        ConfigFormat::Yaml => serde_yaml::from_str(content)?,
        ConfigFormat::Json => serde_json::from_str(content)?,
    };
    Ok(config)
}

/// Fill `config.secret` from the secret file when no inline secret is set.
///
/// A missing default secret file is tolerated, an explicitly configured one is not.
async fn resolve_secret(config: &mut Config, base_dir: &Path) -> ConfigResult<()> {
    if config.secret.is_some() {
        return Ok(());
    }

    let explicit = config.secret_file.is_some();
    let file = config
        .secret_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SECRET_FILE));
    let path = if file.is_absolute() {
        file
    } else {
        base_dir.join(file)
    };

    match fs::read_to_string(&path).await {
        Ok(content) => {
            config.secret = Some(content.trim().to_string());
            Ok(())
        }
        Err(e) if !explicit && e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No secret file at {}", path.display());
            Ok(())
        }
        Err(source) => Err(ConfigError::SecretFile { path, source }),
    }
}
