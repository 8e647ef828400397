// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity sources injected by the host application.

use async_trait::async_trait;

use crate::types::PushProvider;

/// Supplies the current JWT, if the host application uses claim matching.
pub trait JwtProvider: Send + Sync + 'static {
    fn jwt(&self) -> Option<String>;
}

/// A push vendor binding able to hand out the device token.
#[async_trait]
pub trait TokenProvider: Send + Sync + 'static {
    fn provider(&self) -> PushProvider;

    /// Current token, or `None` when the vendor is unavailable on this device.
    async fn token(&self) -> Option<String>;
}
