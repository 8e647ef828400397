// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pending subscribe/suspend/unsubscribe intents.

use pushline_core::{PushlineError, SubscribeRow, SubscriptionStatus};
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::queries::{enum_column, json_column, to_json};

const COLUMNS: &str = "id, uid, user_tag, status, sync, profile_fields, custom_fields, cats, \
                       replace_fields, skip_triggers, retry_count, max_retry_count, created_at";

fn row_to_subscribe(row: &rusqlite::Row<'_>) -> rusqlite::Result<SubscribeRow> {
    Ok(SubscribeRow {
        id: row.get(0)?,
        uid: row.get(1)?,
        user_tag: row.get(2)?,
        status: enum_column::<SubscriptionStatus>(row, 3)?,
        sync: row.get(4)?,
        profile_fields: json_column(row, 5)?,
        custom_fields: json_column(row, 6)?,
        cats: json_column(row, 7)?,
        replace: row.get(8)?,
        skip_triggers: row.get(9)?,
        retry_count: row.get(10)?,
        max_retry_count: row.get(11)?,
        created_at: row.get(12)?,
    })
}

/// Insert a subscribe row. The `id` field of `row` is ignored.
pub async fn insert_subscribe(db: &Database, row: &SubscribeRow) -> Result<i64, PushlineError> {
    let row = row.clone();
    db.connection()
        .call(move |conn| {
            let profile_fields = row.profile_fields.as_ref().map(to_json).transpose()?;
            let custom_fields = row.custom_fields.as_ref().map(to_json).transpose()?;
            let cats = row.cats.as_ref().map(to_json).transpose()?;
            conn.execute(
                "INSERT INTO subscribe_requests (uid, user_tag, status, sync, profile_fields,
                     custom_fields, cats, replace_fields, skip_triggers, retry_count,
                     max_retry_count, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    row.uid,
                    row.user_tag,
                    row.status.to_string(),
                    row.sync,
                    profile_fields,
                    custom_fields,
                    cats,
                    row.replace,
                    row.skip_triggers,
                    row.retry_count,
                    row.max_retry_count,
                    row.created_at,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// Subscribe rows of one user, oldest first.
pub async fn subscribes_by_user_tag(
    db: &Database,
    user_tag: &str,
) -> Result<Vec<SubscribeRow>, PushlineError> {
    let user_tag = user_tag.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM subscribe_requests WHERE user_tag = ?1 ORDER BY id ASC"
            ))?;
            stmt.query_map(params![user_tag], row_to_subscribe)?
                .collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}
