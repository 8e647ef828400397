// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the PushStore trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use pushline_config::model::StorageSettings;
use pushline_core::{
    DeviceToken, MobileEventRow, OperationKind, PushConfiguration, PushEventRow, PushEventType,
    PushStore, PushlineError, SubscribeRow, TokenUpdateRow,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed durable store.
///
/// Wraps a [`Database`] handle and delegates every operation to the typed
/// query modules. The database is opened by [`SqliteStore::initialize`].
pub struct SqliteStore {
    settings: StorageSettings,
    db: OnceCell<Database>,
}

impl SqliteStore {
    /// Create a store for the given settings without opening the database.
    pub fn new(settings: StorageSettings) -> Self {
        Self {
            settings,
            db: OnceCell::new(),
        }
    }

    /// Create and initialize a store in one step.
    pub async fn open(settings: StorageSettings) -> Result<Self, PushlineError> {
        let store = Self::new(settings);
        store.initialize().await?;
        Ok(store)
    }

    /// A fully migrated private in-memory store.
    pub async fn in_memory() -> Result<Self, PushlineError> {
        let store = Self::new(StorageSettings {
            database_path: ":memory:".to_string(),
            wal_mode: false,
        });
        let db = Database::open_in_memory().await?;
        store
            .db
            .set(db)
            .map_err(|_| PushlineError::Storage {
                source: "store already initialized".into(),
            })?;
        Ok(store)
    }

    /// Open the database at the configured path and run migrations.
    pub async fn initialize(&self) -> Result<(), PushlineError> {
        let path = self.settings.database_path.clone();
        let db = Database::open_with(&path, self.settings.wal_mode).await?;
        self.db
            .set(db)
            .map_err(|_| PushlineError::Storage {
                source: "store already initialized".into(),
            })?;
        debug!(path = %self.settings.database_path, "sqlite store initialized");
        Ok(())
    }

    /// Checkpoint the WAL. The connection stays usable.
    pub async fn close(&self) -> Result<(), PushlineError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    fn db(&self) -> Result<&Database, PushlineError> {
        self.db.get().ok_or_else(|| PushlineError::Storage {
            source: "store not initialized -- call initialize() first".into(),
        })
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("database_path", &self.settings.database_path)
            .field("initialized", &self.db.initialized())
            .finish()
    }
}

#[async_trait]
impl PushStore for SqliteStore {
    // --- Configuration entity ---

    async fn get_config(&self) -> Result<Option<PushConfiguration>, PushlineError> {
        queries::config::get_config(self.db()?).await
    }

    async fn set_config(&self, config: &PushConfiguration) -> Result<(), PushlineError> {
        queries::config::set_config(self.db()?, config).await
    }

    async fn delete_config(&self) -> Result<(), PushlineError> {
        queries::config::delete_config(self.db()?).await
    }

    async fn saved_token(&self) -> Result<Option<DeviceToken>, PushlineError> {
        queries::token::saved_token(self.db()?).await
    }

    async fn set_saved_token(&self, token: &DeviceToken) -> Result<(), PushlineError> {
        queries::token::set_saved_token(self.db()?, token).await
    }

    // --- Pending rows ---

    async fn insert_subscribe(&self, row: &SubscribeRow) -> Result<i64, PushlineError> {
        queries::subscribe::insert_subscribe(self.db()?, row).await
    }

    async fn subscribes_by_user_tag(
        &self,
        user_tag: &str,
    ) -> Result<Vec<SubscribeRow>, PushlineError> {
        queries::subscribe::subscribes_by_user_tag(self.db()?, user_tag).await
    }

    async fn insert_token_update(&self, row: &TokenUpdateRow) -> Result<i64, PushlineError> {
        queries::token_update::insert_token_update(self.db()?, row).await
    }

    async fn token_updates(&self) -> Result<Vec<TokenUpdateRow>, PushlineError> {
        queries::token_update::token_updates(self.db()?).await
    }

    async fn newest_token_update_id(&self) -> Result<Option<i64>, PushlineError> {
        queries::token_update::newest_token_update_id(self.db()?).await
    }

    async fn insert_push_event(&self, row: &PushEventRow) -> Result<Option<i64>, PushlineError> {
        queries::push_event::insert_push_event(self.db()?, row).await
    }

    async fn push_events(&self) -> Result<Vec<PushEventRow>, PushlineError> {
        queries::push_event::push_events(self.db()?).await
    }

    async fn is_push_event_confirmed(
        &self,
        message_uid: &str,
        event_type: PushEventType,
    ) -> Result<bool, PushlineError> {
        queries::push_event::is_push_event_confirmed(self.db()?, message_uid, event_type).await
    }

    async fn mark_push_event_confirmed(
        &self,
        message_uid: &str,
        event_type: PushEventType,
    ) -> Result<(), PushlineError> {
        queries::push_event::mark_push_event_confirmed(self.db()?, message_uid, event_type).await
    }

    async fn prune_confirmed_push_events(&self, cutoff: &str) -> Result<usize, PushlineError> {
        queries::push_event::prune_confirmed_push_events(self.db()?, cutoff).await
    }

    async fn insert_mobile_event(&self, row: &MobileEventRow) -> Result<i64, PushlineError> {
        queries::mobile_event::insert_mobile_event(self.db()?, row).await
    }

    async fn mobile_events_by_user_tag(
        &self,
        user_tag: &str,
    ) -> Result<Vec<MobileEventRow>, PushlineError> {
        queries::mobile_event::mobile_events_by_user_tag(self.db()?, user_tag).await
    }

    async fn delete_row(&self, kind: OperationKind, id: i64) -> Result<(), PushlineError> {
        queries::pending::delete_row(self.db()?, kind, id).await
    }

    async fn increase_retry_count(
        &self,
        kind: OperationKind,
        id: i64,
    ) -> Result<(), PushlineError> {
        queries::pending::increase_retry_count(self.db()?, kind, id).await
    }

    async fn expire_rows_of_other_users(
        &self,
        kind: OperationKind,
        user_tag: &str,
        cutoff: &str,
    ) -> Result<usize, PushlineError> {
        queries::pending::expire_rows_of_other_users(self.db()?, kind, user_tag, cutoff).await
    }

    async fn count_all(&self, kind: OperationKind) -> Result<i64, PushlineError> {
        queries::pending::count_all(self.db()?, kind).await
    }

    async fn clear_all(&self) -> Result<(), PushlineError> {
        queries::pending::clear_all(self.db()?).await
    }
}
