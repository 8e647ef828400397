// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock JWT and push-token sources.

use std::sync::Mutex;

use async_trait::async_trait;
use pushline_core::{JwtProvider, PushProvider, TokenProvider};

/// Push vendor binding whose token the test controls.
#[derive(Debug)]
pub struct MockTokenProvider {
    provider: PushProvider,
    token: Mutex<Option<String>>,
}

impl MockTokenProvider {
    pub fn new(provider: PushProvider, token: Option<&str>) -> Self {
        Self {
            provider,
            token: Mutex::new(token.map(str::to_string)),
        }
    }

    /// Simulate the vendor rotating (or revoking) the token.
    pub fn set_token(&self, token: Option<&str>) {
        *self.token.lock().unwrap_or_else(|p| p.into_inner()) = token.map(str::to_string);
    }
}

#[async_trait]
impl TokenProvider for MockTokenProvider {
    fn provider(&self) -> PushProvider {
        self.provider
    }

    async fn token(&self) -> Option<String> {
        self.token.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

/// JWT source whose token the test controls.
#[derive(Debug, Default)]
pub struct MockJwtProvider {
    jwt: Mutex<Option<String>>,
}

impl MockJwtProvider {
    pub fn new(jwt: Option<&str>) -> Self {
        Self {
            jwt: Mutex::new(jwt.map(str::to_string)),
        }
    }

    pub fn set_jwt(&self, jwt: Option<&str>) {
        *self.jwt.lock().unwrap_or_else(|p| p.into_inner()) = jwt.map(str::to_string);
    }
}

impl JwtProvider for MockJwtProvider {
    fn jwt(&self) -> Option<String> {
        self.jwt.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}
