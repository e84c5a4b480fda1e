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
use crate::schema::{Config, HttpSettings};

/// Validation for configuration sections
pub trait Validator {
    fn validate(&self) -> ConfigResult<()>;
}

impl Validator for Config {
    fn validate(&self) -> ConfigResult<()> {
        if self.gitlab_url.is_empty() {
            return Err(ConfigError::MissingRequired("gitlab_url".to_string()));
        }

        let supported = ["http://", "https://", "http+unix://"];
        if !supported.iter().any(|scheme| self.gitlab_url.starts_with(scheme)) {
            return Err(ConfigError::invalid_value(
                "gitlab_url",
                format!(
                    "must start with {}, got {}",
                    supported.join(", "),
                    self.gitlab_url
                ),
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(ConfigError::invalid_value(
                "log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.log_format.as_str()) {
            return Err(ConfigError::invalid_value(
                "log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        self.http_settings.validate()?;

        Ok(())
    }
}

impl Validator for HttpSettings {
    fn validate(&self) -> ConfigResult<()> {
        if self.read_timeout_seconds == 0 {
            return Err(ConfigError::invalid_value(
                "http_settings.read_timeout_seconds",
                "must be greater than 0",
            ));
        }

        if self.password.is_some() && !matches!(self.user.as_deref(), Some(user) if !user.is_empty()) {
            return Err(ConfigError::MissingRequired(
                "http_settings.user".to_string(),
            ));
        }

        Ok(())
    }
}
