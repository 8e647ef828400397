// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pending custom analytics events.

use pushline_core::{MobileEventRow, PushlineError};
use rusqlite::types::Type;
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::queries::{json_column, to_json};

fn row_to_mobile_event(row: &rusqlite::Row<'_>) -> rusqlite::Result<MobileEventRow> {
    Ok(MobileEventRow {
        id: row.get(0)?,
        uid: row.get(1)?,
        user_tag: row.get(2)?,
        time_zone: row.get(3)?,
        sid: row.get(4)?,
        alt_id: row.get(5)?,
        event_name: row.get(6)?,
        payload: json_column(row, 7)?,
        matching: json_column(row, 8)?,
        profile_fields: json_column(row, 9)?,
        sm_id: row.get(10)?,
        utm: json_column(row, 11)?.ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(11, Type::Null, "utm is null".into())
        })?,
        retry_count: row.get(12)?,
        max_retry_count: row.get(13)?,
        created_at: row.get(14)?,
    })
}

pub async fn insert_mobile_event(
    db: &Database,
    row: &MobileEventRow,
) -> Result<i64, PushlineError> {
    let row = row.clone();
    db.connection()
        .call(move |conn| {
            let payload = row.payload.as_ref().map(to_json).transpose()?;
            let matching = row.matching.as_ref().map(to_json).transpose()?;
            let profile_fields = row.profile_fields.as_ref().map(to_json).transpose()?;
            let utm = to_json(&row.utm)?;
            conn.execute(
                "INSERT INTO mobile_events (uid, user_tag, time_zone, sid, alt_id, event_name,
                     payload, matching, profile_fields, sm_id, utm, retry_count,
                     max_retry_count, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                params![
                    row.uid,
                    row.user_tag,
                    row.time_zone,
                    row.sid,
                    row.alt_id,
                    row.event_name,
                    payload,
                    matching,
                    profile_fields,
                    row.sm_id,
                    utm,
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

/// Mobile-event rows of one user, oldest first.
pub async fn mobile_events_by_user_tag(
    db: &Database,
    user_tag: &str,
) -> Result<Vec<MobileEventRow>, PushlineError> {
    let user_tag = user_tag.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, uid, user_tag, time_zone, sid, alt_id, event_name, payload, matching,
                        profile_fields, sm_id, utm, retry_count, max_retry_count, created_at
                 FROM mobile_events WHERE user_tag = ?1 ORDER BY id ASC",
            )?;
            stmt.query_map(params![user_tag], row_to_mobile_event)?
                .collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}
