// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Host-side collaborators of the demo: an event printer and a token
//! source fed from the command line.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use pushline::{EventKind, EventSink, PushProvider, SdkEvent, TokenProvider};

/// Prints every SDK event as one JSON line on stdout and remembers whether
/// any of them was an error.
#[derive(Debug, Default)]
pub struct StdoutSink {
    failed: AtomicBool,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an `Error` event was printed.
    pub fn failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }
}

impl EventSink for StdoutSink {
    fn on_event(&self, event: &SdkEvent) {
        if event.kind == EventKind::Error {
            self.failed.store(true, Ordering::SeqCst);
        }
        match serde_json::to_string(event) {
            Ok(line) => println!("{line}"),
            Err(_) => println!("{} {:?}: {}", event.function, event.code, event.message),
        }
    }
}

/// Hands out the token given with `--token`.
#[derive(Debug)]
pub struct StaticTokenProvider {
    provider: PushProvider,
    token: Option<String>,
}

impl StaticTokenProvider {
    pub fn new(provider: PushProvider, token: Option<String>) -> Self {
        Self { provider, token }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    fn provider(&self) -> PushProvider {
        self.provider
    }

    async fn token(&self) -> Option<String> {
        self.token.clone()
    }
}
