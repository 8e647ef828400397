// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pending delivery/open reports and the set of confirmed reports.

use pushline_core::{now_timestamp, PushEventRow, PushEventType, PushlineError};
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::queries::enum_column;

/// Insert a push-event row unless the same pair is already pending.
pub async fn insert_push_event(
    db: &Database,
    row: &PushEventRow,
) -> Result<Option<i64>, PushlineError> {
    let row = row.clone();
    db.connection()
        .call(move |conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO push_events (message_uid, event_type, retry_count,
                     max_retry_count, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    row.message_uid,
                    row.event_type.to_string(),
                    row.retry_count,
                    row.max_retry_count,
                    row.created_at,
                ],
            )?;
            Ok((inserted > 0).then(|| conn.last_insert_rowid()))
        })
        .await
        .map_err(map_tr_err)
}

/// All push-event rows, oldest first.
pub async fn push_events(db: &Database) -> Result<Vec<PushEventRow>, PushlineError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, message_uid, event_type, retry_count, max_retry_count, created_at
                 FROM push_events ORDER BY id ASC",
            )?;
            stmt.query_map([], |row| {
                Ok(PushEventRow {
                    id: row.get(0)?,
                    message_uid: row.get(1)?,
                    event_type: enum_column::<PushEventType>(row, 2)?,
                    retry_count: row.get(3)?,
                    max_retry_count: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn is_push_event_confirmed(
    db: &Database,
    message_uid: &str,
    event_type: PushEventType,
) -> Result<bool, PushlineError> {
    let message_uid = message_uid.to_string();
    let event_type = event_type.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM confirmed_push_events
                               WHERE message_uid = ?1 AND event_type = ?2)",
                params![message_uid, event_type],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}

pub async fn mark_push_event_confirmed(
    db: &Database,
    message_uid: &str,
    event_type: PushEventType,
) -> Result<(), PushlineError> {
    let message_uid = message_uid.to_string();
    let event_type = event_type.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO confirmed_push_events (message_uid, event_type, confirmed_at)
                 VALUES (?1, ?2, ?3)",
                params![message_uid, event_type, now_timestamp()],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Forget confirmations recorded before `cutoff`.
pub async fn prune_confirmed_push_events(
    db: &Database,
    cutoff: &str,
) -> Result<usize, PushlineError> {
    let cutoff = cutoff.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "DELETE FROM confirmed_push_events WHERE confirmed_at < ?1",
                params![cutoff],
            )
        })
        .await
        .map_err(map_tr_err)
}
