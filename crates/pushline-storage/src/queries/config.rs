// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration entity storage. One JSON document in a singleton row.

use pushline_core::{now_timestamp, PushConfiguration, PushlineError};
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database};
use crate::queries::to_json;

/// Read the stored configuration.
pub async fn get_config(db: &Database) -> Result<Option<PushConfiguration>, PushlineError> {
    let raw: Option<String> = db
        .connection()
        .call(|conn| {
            conn.query_row("SELECT payload FROM config WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()
        })
        .await
        .map_err(map_tr_err)?;

    raw.map(|raw| serde_json::from_str(&raw).map_err(PushlineError::storage))
        .transpose()
}

/// Overwrite the stored configuration wholesale.
pub async fn set_config(db: &Database, config: &PushConfiguration) -> Result<(), PushlineError> {
    let config = config.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO config (id, payload, updated_at) VALUES (1, ?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET payload = excluded.payload,
                                               updated_at = excluded.updated_at",
                params![to_json(&config)?, now_timestamp()],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Remove the stored configuration.
pub async fn delete_config(db: &Database) -> Result<(), PushlineError> {
    db.connection()
        .call(|conn| {
            conn.execute("DELETE FROM config", [])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
