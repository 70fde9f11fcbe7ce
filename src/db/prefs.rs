use async_trait::async_trait;
use sqlx::Row;
use tracing::{instrument, warn};

use super::Pool;
use crate::model::DailySelection;
use crate::prefs::{PreferenceStore, StoreError};

const UPSERT_PREF: &str = "INSERT INTO preferences (key, value) VALUES (?, ?) \
     ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP";

/// Preference store over the `preferences` table.
#[derive(Debug, Clone)]
pub struct SqlitePreferenceStore {
    pool: Pool,
}

impl SqlitePreferenceStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

fn id_key(slot: &str) -> String {
    format!("{slot}.item_id")
}

fn timestamp_key(slot: &str) -> String {
    format!("{slot}.selected_at")
}

#[async_trait]
impl PreferenceStore for SqlitePreferenceStore {
    #[instrument(skip_all, fields(slot = %slot))]
    async fn read_selection(&self, slot: &str) -> Result<DailySelection, StoreError> {
        let id_key = id_key(slot);
        let ts_key = timestamp_key(slot);
        let rows = sqlx::query("SELECT key, value FROM preferences WHERE key IN (?, ?)")
            .bind(&id_key)
            .bind(&ts_key)
            .fetch_all(&self.pool)
            .await?;

        let mut selection = DailySelection::default();
        for row in rows {
            let key: String = row.get("key");
            let value: String = row.get("value");
            if key == id_key {
                selection.item_id = Some(value).filter(|v| !v.trim().is_empty());
            } else if key == ts_key {
                selection.selected_at_millis = value.trim().parse().unwrap_or_else(|_| {
                    warn!(slot, raw = %value, "unreadable selection timestamp");
                    0
                });
            }
        }
        Ok(selection)
    }

    #[instrument(skip_all, fields(slot = %slot, item_id = %item_id))]
    async fn write_selection(
        &self,
        slot: &str,
        item_id: &str,
        selected_at_millis: i64,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(UPSERT_PREF)
            .bind(id_key(slot))
            .bind(item_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(UPSERT_PREF)
            .bind(timestamp_key(slot))
            .bind(selected_at_millis.to_string())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}
