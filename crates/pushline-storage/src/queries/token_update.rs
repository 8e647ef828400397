// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pending device-token changes.

use pushline_core::{PushProvider, PushlineError, TokenUpdateRow};
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::queries::{enum_column, opt_enum_column};

fn row_to_token_update(row: &rusqlite::Row<'_>) -> rusqlite::Result<TokenUpdateRow> {
    Ok(TokenUpdateRow {
        id: row.get(0)?,
        uid: row.get(1)?,
        old_provider: opt_enum_column::<PushProvider>(row, 2)?,
        old_token: row.get(3)?,
        new_provider: enum_column::<PushProvider>(row, 4)?,
        new_token: row.get(5)?,
        retry_count: row.get(6)?,
        max_retry_count: row.get(7)?,
        created_at: row.get(8)?,
    })
}

pub async fn insert_token_update(
    db: &Database,
    row: &TokenUpdateRow,
) -> Result<i64, PushlineError> {
    let row = row.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO token_updates (uid, old_provider, old_token, new_provider, new_token,
                     retry_count, max_retry_count, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    row.uid,
                    row.old_provider.map(|p| p.to_string()),
                    row.old_token,
                    row.new_provider.to_string(),
                    row.new_token,
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

/// All token updates, oldest first.
pub async fn token_updates(db: &Database) -> Result<Vec<TokenUpdateRow>, PushlineError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, uid, old_provider, old_token, new_provider, new_token,
                        retry_count, max_retry_count, created_at
                 FROM token_updates ORDER BY id ASC",
            )?;
            stmt.query_map([], row_to_token_update)?
                .collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Primary key of the most recently queued token update.
pub async fn newest_token_update_id(db: &Database) -> Result<Option<i64>, PushlineError> {
    db.connection()
        .call(|conn| conn.query_row("SELECT MAX(id) FROM token_updates", [], |row| row.get(0)))
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use pushline_core::now_timestamp;

    use super::*;
    use crate::queries::test_support::{memory_db, uid};

    fn sample(token: &str) -> TokenUpdateRow {
        TokenUpdateRow {
            id: 0,
            uid: uid(),
            old_provider: None,
            old_token: None,
            new_provider: PushProvider::Firebase,
            new_token: token.to_string(),
            retry_count: 0,
            max_retry_count: 5,
            created_at: now_timestamp(),
        }
    }

    #[tokio::test]
    async fn newest_id_tracks_latest_insert() {
        let db = memory_db().await;
        assert_eq!(newest_token_update_id(&db).await.unwrap(), None);

        let first = insert_token_update(&db, &sample("t1")).await.unwrap();
        let mut second_row = sample("t2");
        second_row.old_provider = Some(PushProvider::Firebase);
        second_row.old_token = Some("t1".into());
        let second = insert_token_update(&db, &second_row).await.unwrap();
        assert!(second > first);
        assert_eq!(newest_token_update_id(&db).await.unwrap(), Some(second));

        let rows = token_updates(&db).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].new_token, "t1");
        assert_eq!(rows[1].old_provider, Some(PushProvider::Firebase));
        assert_eq!(rows[1].old_token.as_deref(), Some("t1"));
    }
}
