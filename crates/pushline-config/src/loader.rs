// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Settings loader using Figment for layered merging.
//!
//! Merge order (later overrides earlier):
//! 1. Compiled defaults
//! 2. `/etc/pushline/pushline.toml`
//! 3. `~/.config/pushline/pushline.toml`
//! 4. `./pushline.toml`
//! 5. `PUSHLINE_*` environment variables

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::PushlineSettings;

const SYSTEM_SETTINGS_PATH: &str = "/etc/pushline/pushline.toml";
const LOCAL_SETTINGS_FILE: &str = "pushline.toml";

/// Settings files of the hierarchy, lowest priority first.
pub fn settings_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(SYSTEM_SETTINGS_PATH)];
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("pushline").join(LOCAL_SETTINGS_FILE));
    }
    paths.push(
        std::env::current_dir()
            .map(|d| d.join(LOCAL_SETTINGS_FILE))
            .unwrap_or_else(|_| PathBuf::from(LOCAL_SETTINGS_FILE)),
    );
    paths
}

/// Build the layered Figment before extraction.
pub fn build_figment() -> Figment {
    settings_paths()
        .into_iter()
        .fold(
            Figment::new().merge(Serialized::defaults(PushlineSettings::default())),
            |figment, path| {
                if path.exists() {
                    tracing::debug!(path = %path.display(), "merging settings file");
                }
                figment.merge(Toml::file(path))
            },
        )
        .merge(env_provider())
}

/// Load settings from the full hierarchy with env var overrides.
pub fn load_settings() -> Result<PushlineSettings, figment::Error> {
    build_figment().extract()
}

/// Load settings from a TOML string only (no files, no env).
pub fn load_settings_from_str(toml_content: &str) -> Result<PushlineSettings, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PushlineSettings::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load settings from one explicit file with env var overrides.
pub fn load_settings_from_path(path: &Path) -> Result<PushlineSettings, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PushlineSettings::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Environment provider with explicit section mapping.
///
/// `Env::split("_")` would turn `PUSHLINE_STORAGE_DATABASE_PATH` into
/// `storage.database.path`; only the first segment names a section.
pub(crate) fn env_provider() -> Env {
    Env::prefixed("PUSHLINE_").map(|key| {
        let key = key.as_str().to_ascii_lowercase();
        for section in ["storage", "retry", "network", "foreground", "logging"] {
            if let Some(rest) = key
                .strip_prefix(section)
                .and_then(|rest| rest.strip_prefix('_'))
            {
                return format!("{section}.{rest}").into();
            }
        }
        key.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_paths_end_with_local_file() {
        let paths = settings_paths();
        assert_eq!(paths[0], PathBuf::from(SYSTEM_SETTINGS_PATH));
        assert!(paths.last().unwrap().ends_with(LOCAL_SETTINGS_FILE));
    }

    #[test]
    fn env_maps_first_segment_to_section() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("PUSHLINE_STORAGE_DATABASE_PATH", "/tmp/env.db");
            jail.set_env("PUSHLINE_RETRY_BACKOFF_SECS", "7");
            jail.set_env("PUSHLINE_LOGGING_LEVEL", "debug");

            let settings: PushlineSettings = Figment::new()
                .merge(Serialized::defaults(PushlineSettings::default()))
                .merge(env_provider())
                .extract()?;

            assert_eq!(settings.storage.database_path, "/tmp/env.db");
            assert_eq!(settings.retry.backoff_secs, 7);
            assert_eq!(settings.logging.level, "debug");
            Ok(())
        });
    }

    #[test]
    fn env_override_applies_on_top_of_settings_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "[retry]\nbackoff_secs = 45\n")?;
            jail.set_env("PUSHLINE_RETRY_BACKOFF_SECS", "7");

            let settings = load_settings_from_path(Path::new("custom.toml"))?;
            assert_eq!(settings.retry.backoff_secs, 7);
            Ok(())
        });
    }
}
