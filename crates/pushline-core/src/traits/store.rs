// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable local store trait.

use async_trait::async_trait;

use crate::error::PushlineError;
use crate::types::{
    DeviceToken, MobileEventRow, OperationKind, PushConfiguration, PushEventRow, PushEventType,
    SubscribeRow, TokenUpdateRow,
};

/// Durable store for the configuration entity and every pending-row table.
///
/// Rows are only referenced by primary key outside the store. Callers hold
/// the kind's command-queue mutex while mutating rows of that kind; the
/// store itself does no row-level locking. Every insert is a single-row
/// atomic write.
#[async_trait]
pub trait PushStore: Send + Sync + 'static {
    /// Returns the stored configuration, if `initialize` ran.
    async fn get_config(&self) -> Result<Option<PushConfiguration>, PushlineError>;

    /// Overwrites the configuration wholesale.
    async fn set_config(&self, config: &PushConfiguration) -> Result<(), PushlineError>;

    async fn delete_config(&self) -> Result<(), PushlineError>;

    /// Device token last confirmed by the server.
    async fn saved_token(&self) -> Result<Option<DeviceToken>, PushlineError>;

    async fn set_saved_token(&self, token: &DeviceToken) -> Result<(), PushlineError>;

    /// Inserts a subscribe row and returns its primary key.
    async fn insert_subscribe(&self, row: &SubscribeRow) -> Result<i64, PushlineError>;

    /// Subscribe rows of one user, oldest first.
    async fn subscribes_by_user_tag(
        &self,
        user_tag: &str,
    ) -> Result<Vec<SubscribeRow>, PushlineError>;

    async fn insert_token_update(&self, row: &TokenUpdateRow) -> Result<i64, PushlineError>;

    /// All token-update rows, oldest first.
    async fn token_updates(&self) -> Result<Vec<TokenUpdateRow>, PushlineError>;

    /// Primary key of the most recently queued token update.
    async fn newest_token_update_id(&self) -> Result<Option<i64>, PushlineError>;

    /// Inserts a push-event row. Returns `None` when the same
    /// `(message_uid, event_type)` pair is already pending.
    async fn insert_push_event(&self, row: &PushEventRow) -> Result<Option<i64>, PushlineError>;

    /// All push-event rows, oldest first.
    async fn push_events(&self) -> Result<Vec<PushEventRow>, PushlineError>;

    /// Whether the server already confirmed this pair.
    async fn is_push_event_confirmed(
        &self,
        message_uid: &str,
        event_type: PushEventType,
    ) -> Result<bool, PushlineError>;

    async fn mark_push_event_confirmed(
        &self,
        message_uid: &str,
        event_type: PushEventType,
    ) -> Result<(), PushlineError>;

    /// Forgets confirmations recorded before `cutoff`, an RFC 3339 UTC
    /// timestamp. Returns how many were removed.
    async fn prune_confirmed_push_events(&self, cutoff: &str) -> Result<usize, PushlineError>;

    async fn insert_mobile_event(&self, row: &MobileEventRow) -> Result<i64, PushlineError>;

    /// Mobile-event rows of one user, oldest first.
    async fn mobile_events_by_user_tag(
        &self,
        user_tag: &str,
    ) -> Result<Vec<MobileEventRow>, PushlineError>;

    /// Deletes one pending row by primary key. Deleting a missing row is a no-op.
    async fn delete_row(&self, kind: OperationKind, id: i64) -> Result<(), PushlineError>;

    /// Adds one to the row's `retry_count`.
    async fn increase_retry_count(&self, kind: OperationKind, id: i64)
        -> Result<(), PushlineError>;

    /// Deletes subscribe or mobile-event rows of users other than
    /// `user_tag` created before `cutoff`.
    async fn expire_rows_of_other_users(
        &self,
        kind: OperationKind,
        user_tag: &str,
        cutoff: &str,
    ) -> Result<usize, PushlineError>;

    /// Number of pending rows of a kind, across all users.
    async fn count_all(&self, kind: OperationKind) -> Result<i64, PushlineError>;

    /// Deletes every pending row, the configuration and the saved token in
    /// one transaction.
    async fn clear_all(&self) -> Result<(), PushlineError>;
}
