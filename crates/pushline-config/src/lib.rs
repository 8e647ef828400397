// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-level settings for the Pushline delivery core.
//!
//! Settings (database location, retry limits, backoff, timeouts, log level)
//! are read from TOML with strict validation (`deny_unknown_fields`), an XDG
//! file hierarchy, and `PUSHLINE_*` environment overrides. Errors render as
//! miette diagnostics with typo suggestions.
//!
//! The persisted configuration entity (API URL, rtoken, provider priority)
//! is not loaded here; it is passed to `Pushline::initialize` and kept in the
//! durable store.
//!
//! # Usage
//!
//! ```no_run
//! use pushline_config::load_and_validate;
//!
//! let settings = load_and_validate().expect("settings errors");
//! println!("database: {}", settings.storage.database_path);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_settings, load_settings_from_path, load_settings_from_str};
pub use model::PushlineSettings;

/// Load settings from the XDG hierarchy and validate them.
pub fn load_and_validate() -> Result<PushlineSettings, Vec<ConfigError>> {
    match loader::load_settings() {
        Ok(settings) => {
            validation::validate_settings(&settings)?;
            Ok(settings)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err)),
    }
}

/// Load settings from a TOML string and validate them.
pub fn load_and_validate_str(toml_content: &str) -> Result<PushlineSettings, Vec<ConfigError>> {
    match loader::load_settings_from_str(toml_content) {
        Ok(settings) => {
            validation::validate_settings(&settings)?;
            Ok(settings)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err)),
    }
}

/// Load settings from an explicit file and validate them.
pub fn load_and_validate_path(
    path: &std::path::Path,
) -> Result<PushlineSettings, Vec<ConfigError>> {
    match loader::load_settings_from_path(path) {
        Ok(settings) => {
            validation::validate_settings(&settings)?;
            Ok(settings)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err)),
    }
}

/// Render settings as TOML, in the shape the loader accepts.
pub fn to_toml(settings: &PushlineSettings) -> Result<String, ConfigError> {
    toml::to_string_pretty(settings).map_err(|e| ConfigError::Other(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_settings_load_back_unchanged() {
        let mut settings = PushlineSettings::default();
        settings.retry.subscribe_max_retries = 4;
        settings.storage.database_path = "/tmp/pushline-test.db".into();

        let rendered = to_toml(&settings).unwrap();
        let loaded = load_and_validate_str(&rendered).unwrap();

        assert_eq!(loaded.retry.subscribe_max_retries, 4);
        assert_eq!(loaded.storage.database_path, "/tmp/pushline-test.db");
        assert_eq!(loaded.network.timeout_secs, settings.network.timeout_secs);
    }
}
