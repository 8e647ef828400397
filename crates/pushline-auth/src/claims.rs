// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JWT payload decoding.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde_json::Value;

/// URL-safe alphabet, with or without trailing `=`.
const JWT_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// The `matching` claim of a JWT.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchingClaim {
    /// Value of `matching.mode`. Never empty.
    pub mode: String,
    /// The whole `matching` sub-object.
    pub matching: Value,
}

/// Decode the payload segment of a compact JWT into JSON.
pub fn decode_payload(token: &str) -> Option<Value> {
    let mut parts = token.split('.');
    let (_header, payload) = (parts.next()?, parts.next()?);
    let bytes = JWT_ENGINE.decode(payload).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Extract the matching claim, if the payload carries one with a
/// non-empty mode.
pub(crate) fn matching_claim(token: &str) -> Option<MatchingClaim> {
    let payload = decode_payload(token)?;
    let matching = payload.get("matching")?;
    if !matching.is_object() {
        return None;
    }
    let mode = matching.get("mode")?.as_str()?.trim();
    if mode.is_empty() {
        return None;
    }
    Some(MatchingClaim {
        mode: mode.to_string(),
        matching: matching.clone(),
    })
}

#[cfg(test)]
mod tests {
    use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
    use serde_json::json;

    use super::*;

    #[test]
    fn padded_and_unpadded_payloads_decode() {
        // 7 bytes of JSON force `==` padding in the padded form.
        let body = br#"{"a":1}"#;
        let padded = format!("h.{}.s", URL_SAFE.encode(body));
        let bare = format!("h.{}.s", URL_SAFE_NO_PAD.encode(body));
        assert!(padded.contains('='));
        assert_eq!(decode_payload(&padded), Some(json!({"a": 1})));
        assert_eq!(decode_payload(&bare), Some(json!({"a": 1})));
    }

    #[test]
    fn url_safe_characters_decode() {
        let payload = json!({"matching": {"mode": "email", "email": "??>>"}});
        let token = format!("h.{}.s", URL_SAFE_NO_PAD.encode(payload.to_string()));
        assert_eq!(decode_payload(&token), Some(payload));
    }

    #[test]
    fn malformed_tokens_decode_to_none() {
        assert!(decode_payload("no-dots").is_none());
        assert!(decode_payload("h.!!!.s").is_none());
        let not_json = format!("h.{}.s", URL_SAFE_NO_PAD.encode("plain text"));
        assert!(decode_payload(&not_json).is_none());
    }

    #[test]
    fn non_object_matching_is_rejected() {
        let token = format!(
            "h.{}.s",
            URL_SAFE_NO_PAD.encode(json!({"matching": "email"}).to_string())
        );
        assert!(matching_claim(&token).is_none());
    }
}
