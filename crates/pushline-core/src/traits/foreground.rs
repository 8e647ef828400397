// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Elevated-priority execution host trait.

use async_trait::async_trait;

use crate::error::PushlineError;

/// Platform facility that keeps the process alive for a bounded window,
/// backed by a visible indicator.
#[async_trait]
pub trait ForegroundHost: Send + Sync + 'static {
    /// Requests a window for `operation_id`, showing `message`.
    async fn start(&self, operation_id: &str, message: &str) -> Result<(), PushlineError>;

    /// Releases the window. Must tolerate repeated or unknown ids.
    fn stop(&self, operation_id: &str);
}
