// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Settings errors as miette diagnostics.
//!
//! Figment records which provider a bad value came from. The diagnostics
//! keep that origin, so an unknown `PUSHLINE_*` variable is reported with
//! the variable name to use instead of a settings-file key.

use figment::error::Kind;
use miette::Diagnostic;
use thiserror::Error;

/// Minimum Jaro-Winkler similarity for a key suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.75;

const ENV_PREFIX: &str = "PUSHLINE_";

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown settings key `{path}` in {origin}")]
    #[diagnostic(
        code(pushline::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), env_hint.as_deref(), valid_keys))
    )]
    UnknownKey {
        /// The unrecognized key, without its section.
        key: String,
        /// Dotted path of the key, section first.
        path: String,
        suggestion: Option<String>,
        /// Environment variable spelling of the suggestion, when the bad key
        /// came from the environment.
        env_hint: Option<String>,
        valid_keys: String,
        origin: String,
    },

    #[error("invalid value for `{key}` in {origin}: {detail}")]
    #[diagnostic(code(pushline::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
        origin: String,
    },

    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(pushline::config::missing_key),
        help("add `{key} = <value>` to pushline.toml")
    )]
    MissingKey { key: String },

    #[error("validation error: {message}")]
    #[diagnostic(code(pushline::config::validation))]
    Validation { message: String },

    #[error("settings error: {0}")]
    #[diagnostic(code(pushline::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, env_hint: Option<&str>, valid_keys: &str) -> String {
    match (suggestion, env_hint) {
        (Some(s), Some(var)) => {
            format!("did you mean `{s}` (set as `{var}`)? Valid keys: {valid_keys}")
        }
        (Some(s), None) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        _ => format!("valid keys: {valid_keys}"),
    }
}

/// Convert a `figment::Error` (possibly holding several errors) into diagnostics.
pub fn figment_to_config_errors(err: figment::Error) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| {
            let origin = Origin::of(&error);
            match &error.kind {
                Kind::UnknownField(field, expected) => {
                    let segments = key_segments(&error, field);
                    let suggestion = suggest_key(field, expected);
                    let env_hint = suggestion
                        .as_deref()
                        .filter(|_| origin.from_env)
                        .map(|s| env_var_name(&segments[..segments.len() - 1], s));
                    ConfigError::UnknownKey {
                        key: field.clone(),
                        path: segments.join("."),
                        suggestion,
                        env_hint,
                        valid_keys: expected.join(", "),
                        origin: origin.name,
                    }
                }
                Kind::MissingField(field) => ConfigError::MissingKey {
                    key: field.to_string(),
                },
                Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
                    key: error.path.join("."),
                    detail: format!("found {actual}, expected {expected}"),
                    expected: expected.to_string(),
                    origin: origin.name,
                },
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

/// Where a figment error's value came from.
struct Origin {
    name: String,
    from_env: bool,
}

impl Origin {
    fn of(error: &figment::Error) -> Self {
        let Some(metadata) = error.metadata.as_ref() else {
            return Self {
                name: "settings".to_string(),
                from_env: false,
            };
        };
        if let Some(figment::Source::File(path)) = &metadata.source {
            return Self {
                name: path.display().to_string(),
                from_env: false,
            };
        }
        Self {
            name: metadata.name.to_string(),
            from_env: metadata.name.contains(ENV_PREFIX),
        }
    }
}

/// Path segments of an unknown key, ending with the key itself.
fn key_segments(error: &figment::Error, field: &str) -> Vec<String> {
    let mut segments = error.path.clone();
    if segments.last().map(String::as_str) != Some(field) {
        segments.push(field.to_string());
    }
    segments
}

/// `["retry"]` + `backoff_secs` becomes `PUSHLINE_RETRY_BACKOFF_SECS`.
pub fn env_var_name(sections: &[String], key: &str) -> String {
    let mut name = ENV_PREFIX.to_string();
    for part in sections.iter().map(String::as_str).chain([key]) {
        name.push_str(&part.to_ascii_uppercase());
        name.push('_');
    }
    name.pop();
    name
}

/// Suggest the closest valid key by Jaro-Winkler similarity.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Render diagnostics to stderr using miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        if handler.render_report(&mut buf, error as &dyn Diagnostic).is_ok() {
            eprint!("{buf}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_backoff_for_typo() {
        let valid = &["backoff_secs", "max_backoff_secs", "periodic_interval_secs"];
        assert_eq!(
            suggest_key("backof_secs", valid),
            Some("backoff_secs".to_string())
        );
    }

    #[test]
    fn no_suggestion_for_distant_key() {
        let valid = &["level"];
        assert_eq!(suggest_key("zzzzzz", valid), None);
    }

    #[test]
    fn env_var_name_joins_section_and_key() {
        assert_eq!(
            env_var_name(&["retry".to_string()], "backoff_secs"),
            "PUSHLINE_RETRY_BACKOFF_SECS"
        );
        assert_eq!(env_var_name(&[], "storage"), "PUSHLINE_STORAGE");
    }

    #[test]
    fn help_names_the_variable_for_env_typos() {
        let help = unknown_key_help(
            Some("backoff_secs"),
            Some("PUSHLINE_RETRY_BACKOFF_SECS"),
            "backoff_secs",
        );
        assert!(help.contains("PUSHLINE_RETRY_BACKOFF_SECS"));
        assert_eq!(unknown_key_help(None, None, "level"), "valid keys: level");
    }
}
