// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Saved device token (the last one the server confirmed).

use pushline_core::{now_timestamp, DeviceToken, PushProvider, PushlineError};
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database};
use crate::queries::enum_column;

pub async fn saved_token(db: &Database) -> Result<Option<DeviceToken>, PushlineError> {
    db.connection()
        .call(|conn| {
            conn.query_row(
                "SELECT provider, token FROM device_token WHERE id = 1",
                [],
                |row| {
                    Ok(DeviceToken {
                        provider: enum_column::<PushProvider>(row, 0)?,
                        token: row.get(1)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn set_saved_token(db: &Database, token: &DeviceToken) -> Result<(), PushlineError> {
    let provider = token.provider.to_string();
    let value = token.token.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO device_token (id, provider, token, updated_at) VALUES (1, ?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET provider = excluded.provider,
                                               token = excluded.token,
                                               updated_at = excluded.updated_at",
                params![provider, value, now_timestamp()],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
