// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Kind-generic operations over the pending-row tables.

use pushline_core::{OperationKind, PushlineError};
use rusqlite::params;

use crate::database::{map_tr_err, Database};

/// Table holding the pending rows of `kind`.
pub(crate) fn table_for(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::Subscribe => "subscribe_requests",
        OperationKind::TokenUpdate => "token_updates",
        OperationKind::PushEvent => "push_events",
        OperationKind::MobileEvent => "mobile_events",
    }
}

/// Delete a pending row. Missing rows are a no-op.
pub async fn delete_row(db: &Database, kind: OperationKind, id: i64) -> Result<(), PushlineError> {
    let sql = format!("DELETE FROM {} WHERE id = ?1", table_for(kind));
    db.connection()
        .call(move |conn| {
            conn.execute(&sql, params![id])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn increase_retry_count(
    db: &Database,
    kind: OperationKind,
    id: i64,
) -> Result<(), PushlineError> {
    let sql = format!(
        "UPDATE {} SET retry_count = retry_count + 1 WHERE id = ?1",
        table_for(kind)
    );
    db.connection()
        .call(move |conn| {
            conn.execute(&sql, params![id])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn count_all(db: &Database, kind: OperationKind) -> Result<i64, PushlineError> {
    let sql = format!("SELECT COUNT(*) FROM {}", table_for(kind));
    db.connection()
        .call(move |conn| conn.query_row(&sql, [], |row| row.get(0)))
        .await
        .map_err(map_tr_err)
}

/// Delete rows of `kind` that belong to a user other than `user_tag` and
/// were created before `cutoff`. Only subscribe and mobile-event rows carry
/// a user tag; other kinds are left alone.
pub async fn expire_rows_of_other_users(
    db: &Database,
    kind: OperationKind,
    user_tag: &str,
    cutoff: &str,
) -> Result<usize, PushlineError> {
    if !matches!(kind, OperationKind::Subscribe | OperationKind::MobileEvent) {
        return Ok(0);
    }
    let sql = format!(
        "DELETE FROM {} WHERE user_tag != ?1 AND created_at < ?2",
        table_for(kind)
    );
    let user_tag = user_tag.to_string();
    let cutoff = cutoff.to_string();
    db.connection()
        .call(move |conn| conn.execute(&sql, params![user_tag, cutoff]))
        .await
        .map_err(map_tr_err)
}

/// Wipe every pending row, confirmed push events, the saved token and the
/// configuration in one transaction.
pub async fn clear_all(db: &Database) -> Result<(), PushlineError> {
    db.connection()
        .call(|conn| {
            let tx = conn.transaction()?;
            for kind in OperationKind::ALL {
                tx.execute(&format!("DELETE FROM {}", table_for(kind)), [])?;
            }
            tx.execute("DELETE FROM confirmed_push_events", [])?;
            tx.execute("DELETE FROM device_token", [])?;
            tx.execute("DELETE FROM config", [])?;
            tx.commit()
        })
        .await
        .map_err(map_tr_err)
}
