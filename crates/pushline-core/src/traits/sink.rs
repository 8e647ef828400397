// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event sink trait implemented by the host application.

use crate::events::SdkEvent;

/// Receiver of SDK events. The host application subscribes one sink and
/// renders events into its own UI or log.
pub trait EventSink: Send + Sync + 'static {
    fn on_event(&self, event: &SdkEvent);
}
