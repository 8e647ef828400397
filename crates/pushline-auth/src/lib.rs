// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Auth/matching resolver.
//!
//! Turns the stored configuration and the host's JWT into the
//! `Authorization` header, matching mode and user tag of a request. A static
//! resource token always wins over a JWT. Nothing here verifies signatures;
//! the server does that.

pub mod claims;
pub mod user_tag;

pub use claims::{decode_payload, MatchingClaim};
pub use user_tag::{canonical_json, hash_hex};

use pushline_core::{AuthContext, JwtProvider, MatchingMode, PushConfiguration};
use tracing::debug;

/// Resolves the identity of the current user, or `None` when neither a
/// resource token nor a usable matching claim is available.
pub fn resolve(config: &PushConfiguration, jwt: Option<&dyn JwtProvider>) -> Option<AuthContext> {
    if let Some(r_token) = config.r_token.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        return Some(AuthContext {
            header: format!("Bearer rtoken@{r_token}"),
            matching_mode: MatchingMode::RToken,
            user_tag: hash_hex(r_token.as_bytes()),
        });
    }

    let token = jwt?.jwt()?;
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    let claim = match claims::matching_claim(token) {
        Some(claim) => claim,
        None => {
            debug!("jwt carries no usable matching claim");
            return None;
        }
    };

    Some(AuthContext {
        header: format!("Bearer {token}"),
        matching_mode: MatchingMode::Claim(claim.mode),
        user_tag: hash_hex(canonical_json(&claim.matching).as_bytes()),
    })
}
