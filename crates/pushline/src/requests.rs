// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Arguments of the public operations and their validation.

use pushline_core::{PushlineError, UtmTags};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Options of a subscribe, suspend or unsubscribe call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscribeOptions {
    /// Standard profile fields (email, phone, name, ...).
    pub profile_fields: Option<Value>,
    pub custom_fields: Option<Value>,
    /// Subscription categories.
    pub cats: Option<Vec<String>>,
    /// Replace the stored profile fields instead of merging.
    pub replace: bool,
    /// Ask the server to answer with the resulting profile.
    pub sync: bool,
    /// Do not fire server-side triggers for this change.
    pub skip_triggers: bool,
}

impl SubscribeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profile_fields(mut self, fields: Value) -> Self {
        self.profile_fields = Some(fields);
        self
    }

    pub fn custom_fields(mut self, fields: Value) -> Self {
        self.custom_fields = Some(fields);
        self
    }

    pub fn cats<I, S>(mut self, cats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cats = Some(cats.into_iter().map(Into::into).collect());
        self
    }

    pub fn replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    pub fn sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    pub fn skip_triggers(mut self, skip: bool) -> Self {
        self.skip_triggers = skip;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), PushlineError> {
        require_object("profile_fields", self.profile_fields.as_ref())?;
        require_object("custom_fields", self.custom_fields.as_ref())?;
        if let Some(cats) = &self.cats {
            if cats.iter().any(|c| c.trim().is_empty()) {
                return Err(PushlineError::Validation(
                    "cats must not contain empty names".into(),
                ));
            }
        }
        Ok(())
    }
}

/// A custom analytics event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MobileEventRequest {
    pub event_name: String,
    /// Stream (pixel) identifier the event is reported to.
    pub sid: String,
    pub payload: Option<Value>,
    /// Extra matching data, merged server-side with the resolved identity.
    pub matching: Option<Value>,
    pub profile_fields: Option<Value>,
    pub alt_id: Option<String>,
    /// Send-message id the event is attributed to.
    pub sm_id: Option<String>,
    pub utm: UtmTags,
    /// Offset from UTC in minutes. Defaults to the local offset.
    pub time_zone: Option<i32>,
}

impl MobileEventRequest {
    pub fn new(event_name: impl Into<String>, sid: impl Into<String>) -> Self {
        Self {
            event_name: event_name.into(),
            sid: sid.into(),
            payload: None,
            matching: None,
            profile_fields: None,
            alt_id: None,
            sm_id: None,
            utm: UtmTags::default(),
            time_zone: None,
        }
    }

    pub fn payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn matching(mut self, matching: Value) -> Self {
        self.matching = Some(matching);
        self
    }

    pub fn profile_fields(mut self, fields: Value) -> Self {
        self.profile_fields = Some(fields);
        self
    }

    pub fn alt_id(mut self, alt_id: impl Into<String>) -> Self {
        self.alt_id = Some(alt_id.into());
        self
    }

    pub fn sm_id(mut self, sm_id: impl Into<String>) -> Self {
        self.sm_id = Some(sm_id.into());
        self
    }

    pub fn utm(mut self, utm: UtmTags) -> Self {
        self.utm = utm;
        self
    }

    pub fn time_zone(mut self, minutes: i32) -> Self {
        self.time_zone = Some(minutes);
        self
    }

    pub(crate) fn validate(&self) -> Result<(), PushlineError> {
        if self.event_name.trim().is_empty() {
            return Err(PushlineError::Validation(
                "event_name must not be empty".into(),
            ));
        }
        if self.sid.trim().is_empty() {
            return Err(PushlineError::Validation("sid must not be empty".into()));
        }
        require_object("matching", self.matching.as_ref())?;
        require_object("profile_fields", self.profile_fields.as_ref())?;
        Ok(())
    }
}

fn require_object(field: &str, value: Option<&Value>) -> Result<(), PushlineError> {
    match value {
        Some(v) if !v.is_object() => Err(PushlineError::Validation(format!(
            "{field} must be a JSON object"
        ))),
        _ => Ok(()),
    }
}

/// Local UTC offset in minutes.
pub(crate) fn local_time_zone() -> i32 {
    chrono::Local::now().offset().local_minus_utc() / 60
}
