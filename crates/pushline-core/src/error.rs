// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Pushline delivery core.
//!
//! Expected failure modes (validation, missing identity, server rejection,
//! transient network failure) are not errors at this level: they travel as
//! [`RequestOutcome`](crate::events::RequestOutcome) values and SDK events.
//! `PushlineError` is what escapes a component boundary.

use thiserror::Error;

/// The primary error type used across the Pushline workspace.
#[derive(Debug, Error)]
pub enum PushlineError {
    /// Settings or configuration entity errors.
    #[error("configuration error: {0}")]
    Config(String),

    /// Local storage errors (connection, query, row decoding).
    #[error("local storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Network errors that could not be classified into an outcome.
    #[error("network error: {message}")]
    Network {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The user identity could not be resolved.
    #[error("auth error: {0}")]
    Auth(String),

    /// Request validation failed before anything was persisted or sent.
    #[error("validation error: {0}")]
    Validation(String),

    /// An operation ran before `initialize` stored a configuration.
    #[error("sdk is not initialized")]
    NotInitialized,

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PushlineError {
    /// Wraps any error as a local storage error.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        PushlineError::Storage {
            source: Box::new(err),
        }
    }
}
