// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One retry pass over the pending rows of a kind.
//!
//! Callers hold the kind's command-queue lock for the whole pass. A pass
//! with no pending rows emits nothing and mutates nothing.

use futures::future::join_all;
use pushline_core::{
    timestamp_days_ago, AuthContext, DeviceToken, EventCode, MobileEventRow, OperationKind,
    PushConfiguration, PushEventRow, PushlineError, SdkEvent, SubscribeRow, TokenUpdateRow,
};
use serde_json::json;
use tracing::{debug, info};

use crate::context::{DeliveryContext, Settled};

/// Counts for one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub confirmed: usize,
    pub rejected: usize,
    pub kept: usize,
    pub dropped: usize,
    /// Superseded token updates deleted without being sent.
    pub abandoned: usize,
    /// Rows and confirmations removed for being older than the retention.
    pub expired: usize,
    /// Whether rows are left for a later pass.
    pub remaining: bool,
}

impl PassSummary {
    pub fn attempted(&self) -> usize {
        self.confirmed + self.rejected + self.kept + self.dropped
    }

    fn record(&mut self, settled: Settled) {
        match settled {
            Settled::Confirmed => self.confirmed += 1,
            Settled::Rejected => self.rejected += 1,
            Settled::Kept => self.kept += 1,
            Settled::Dropped => self.dropped += 1,
        }
    }
}

/// Drains what can be drained of `kind`.
pub async fn run_pass(
    ctx: &DeliveryContext,
    kind: OperationKind,
) -> Result<PassSummary, PushlineError> {
    let Some(config) = ctx.store().get_config().await? else {
        debug!(%kind, "retry pass skipped, sdk not initialized");
        return Ok(PassSummary::default());
    };

    let expired = expire(ctx, kind, &config).await?;
    let mut summary = match kind {
        OperationKind::Subscribe => subscribe_pass(ctx, &config).await?,
        OperationKind::TokenUpdate => token_update_pass(ctx, &config).await?,
        OperationKind::PushEvent => push_event_pass(ctx, &config).await?,
        OperationKind::MobileEvent => mobile_event_pass(ctx, &config).await?,
    };
    summary.expired = expired;

    if summary.attempted() > 0 || summary.abandoned > 0 || summary.expired > 0 {
        info!(
            %kind,
            confirmed = summary.confirmed,
            rejected = summary.rejected,
            kept = summary.kept,
            dropped = summary.dropped,
            abandoned = summary.abandoned,
            expired = summary.expired,
            remaining = summary.remaining,
            "retry pass finished"
        );
    }
    Ok(summary)
}

/// Drops what outlived `retry.retention_days`: confirmations of push
/// events, and subscribe or mobile-event rows left behind by a previous
/// user. Rows of the current user are never expired here.
async fn expire(
    ctx: &DeliveryContext,
    kind: OperationKind,
    config: &PushConfiguration,
) -> Result<usize, PushlineError> {
    let cutoff = timestamp_days_ago(ctx.retry_settings().retention_days);
    let expired = match kind {
        OperationKind::PushEvent => ctx.store().prune_confirmed_push_events(&cutoff).await?,
        OperationKind::Subscribe | OperationKind::MobileEvent => match ctx.resolve_auth(config) {
            Some(auth) => {
                ctx.store()
                    .expire_rows_of_other_users(kind, &auth.user_tag, &cutoff)
                    .await?
            }
            None => 0,
        },
        OperationKind::TokenUpdate => 0,
    };
    if expired > 0 {
        debug!(%kind, expired, %cutoff, "expired rows past retention");
    }
    Ok(expired)
}

/// Rows of any user exist but none can be sent without an identity.
async fn unresolved(
    ctx: &DeliveryContext,
    kind: OperationKind,
) -> Result<PassSummary, PushlineError> {
    let remaining = ctx.store().count_all(kind).await? > 0;
    if remaining {
        debug!(%kind, "no resolvable identity, pending rows left untouched");
    }
    Ok(PassSummary {
        remaining,
        ..PassSummary::default()
    })
}

/// Oldest first. A retry marker stops the pass so that a later intent of
/// the same user never overtakes an earlier one.
async fn subscribe_pass(
    ctx: &DeliveryContext,
    config: &PushConfiguration,
) -> Result<PassSummary, PushlineError> {
    let kind = OperationKind::Subscribe;
    let Some(auth) = ctx.resolve_auth(config) else {
        return unresolved(ctx, kind).await;
    };

    let rows = ctx.store().subscribes_by_user_tag(&auth.user_tag).await?;
    let mut summary = PassSummary::default();
    if rows.is_empty() {
        return Ok(summary);
    }

    let token = match ctx.current_token(config).await {
        Some(token) => Some(token),
        None => ctx.store().saved_token().await?,
    };

    for row in rows {
        let settled = attempt_subscribe(ctx, config, &auth, &row, token.as_ref()).await?;
        summary.record(settled);
        if settled == Settled::Kept {
            break;
        }
    }

    summary.remaining = !ctx
        .store()
        .subscribes_by_user_tag(&auth.user_tag)
        .await?
        .is_empty();
    Ok(summary)
}

/// Only the newest token update is ever sent; older rows are abandoned
/// first so a stale token can never overwrite a newer one.
async fn token_update_pass(
    ctx: &DeliveryContext,
    config: &PushConfiguration,
) -> Result<PassSummary, PushlineError> {
    let kind = OperationKind::TokenUpdate;
    let rows = ctx.store().token_updates().await?;
    let mut summary = PassSummary::default();
    if rows.is_empty() {
        return Ok(summary);
    }
    let Some(auth) = ctx.resolve_auth(config) else {
        summary.remaining = true;
        debug!(%kind, "no resolvable identity, pending rows left untouched");
        return Ok(summary);
    };
    let newest = ctx.store().newest_token_update_id().await?;

    for row in rows {
        if newest.is_some_and(|newest| row.id < newest) {
            ctx.store().delete_row(kind, row.id).await?;
            ctx.bus().emit(
                SdkEvent::from_code("update_token", EventCode::StaleTokenUpdate)
                    .with_value(json!({ "id": row.id, "uid": row.uid })),
            );
            summary.abandoned += 1;
            continue;
        }

        summary.record(attempt_token_update(ctx, config, &auth, &row).await?);
    }

    summary.remaining = ctx.store().count_all(kind).await? > 0;
    Ok(summary)
}

/// Sends one subscribe row. On confirmation the token it carried becomes
/// the saved token.
pub async fn attempt_subscribe(
    ctx: &DeliveryContext,
    config: &PushConfiguration,
    auth: &AuthContext,
    row: &SubscribeRow,
    token: Option<&DeviceToken>,
) -> Result<Settled, PushlineError> {
    let outcome = ctx.gateway().subscribe(config, auth, row, token).await;
    let settled = ctx
        .settle(
            OperationKind::Subscribe,
            row.id,
            row.retry_count,
            row.max_retry_count,
            outcome,
        )
        .await?;
    if let Some(token) = token.filter(|_| settled == Settled::Confirmed) {
        ctx.store().set_saved_token(token).await?;
    }
    Ok(settled)
}

/// Sends one token-update row. On confirmation its token becomes the saved
/// token.
pub async fn attempt_token_update(
    ctx: &DeliveryContext,
    config: &PushConfiguration,
    auth: &AuthContext,
    row: &TokenUpdateRow,
) -> Result<Settled, PushlineError> {
    let outcome = ctx.gateway().update_token(config, auth, row).await;
    let settled = ctx
        .settle(
            OperationKind::TokenUpdate,
            row.id,
            row.retry_count,
            row.max_retry_count,
            outcome,
        )
        .await?;
    if settled == Settled::Confirmed {
        ctx.store()
            .set_saved_token(&DeviceToken {
                provider: row.new_provider,
                token: row.new_token.clone(),
            })
            .await?;
    }
    Ok(settled)
}

/// Sends one push-event row and records its confirmation.
pub async fn attempt_push_event(
    ctx: &DeliveryContext,
    config: &PushConfiguration,
    auth: Option<&AuthContext>,
    row: &PushEventRow,
) -> Result<Settled, PushlineError> {
    let outcome = ctx.gateway().push_event(config, auth, row).await;
    let settled = ctx
        .settle(
            OperationKind::PushEvent,
            row.id,
            row.retry_count,
            row.max_retry_count,
            outcome,
        )
        .await?;
    if settled == Settled::Confirmed {
        ctx.store()
            .mark_push_event_confirmed(&row.message_uid, row.event_type)
            .await?;
    }
    Ok(settled)
}

/// Rows fan out concurrently. Push events are keyed by message uid, so an
/// identity is attached when available but not required.
async fn push_event_pass(
    ctx: &DeliveryContext,
    config: &PushConfiguration,
) -> Result<PassSummary, PushlineError> {
    let kind = OperationKind::PushEvent;
    let rows = ctx.store().push_events().await?;
    let mut summary = PassSummary::default();
    if rows.is_empty() {
        return Ok(summary);
    }
    let auth = ctx.resolve_auth(config);

    let results = join_all(
        rows.iter()
            .map(|row| attempt_push_event(ctx, config, auth.as_ref(), row)),
    )
    .await;
    for result in results {
        summary.record(result?);
    }

    summary.remaining = ctx.store().count_all(kind).await? > 0;
    Ok(summary)
}

pub async fn attempt_mobile_event(
    ctx: &DeliveryContext,
    config: &PushConfiguration,
    auth: &AuthContext,
    row: &MobileEventRow,
) -> Result<Settled, PushlineError> {
    let outcome = ctx.gateway().mobile_event(config, auth, row).await;
    ctx.settle(
        OperationKind::MobileEvent,
        row.id,
        row.retry_count,
        row.max_retry_count,
        outcome,
    )
    .await
}

/// Rows of the current user fan out concurrently.
async fn mobile_event_pass(
    ctx: &DeliveryContext,
    config: &PushConfiguration,
) -> Result<PassSummary, PushlineError> {
    let kind = OperationKind::MobileEvent;
    let Some(auth) = ctx.resolve_auth(config) else {
        return unresolved(ctx, kind).await;
    };

    let rows = ctx.store().mobile_events_by_user_tag(&auth.user_tag).await?;
    let mut summary = PassSummary::default();
    if rows.is_empty() {
        return Ok(summary);
    }

    let results = join_all(
        rows.iter()
            .map(|row| attempt_mobile_event(ctx, config, &auth, row)),
    )
    .await;
    for result in results {
        summary.record(result?);
    }

    summary.remaining = !ctx
        .store()
        .mobile_events_by_user_tag(&auth.user_tag)
        .await?
        .is_empty();
    Ok(summary)
}
