//! Preference store contract for the persisted daily selection.
use async_trait::async_trait;
use thiserror::Error;

use crate::model::DailySelection;

/// Failure of a backing store (content or preferences).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("content parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("store is empty")]
    Empty,
}

#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Reads the selection stored under `slot`. Missing keys yield an empty selection.
    async fn read_selection(&self, slot: &str) -> Result<DailySelection, StoreError>;

    /// Upserts both fields of the selection under `slot` in one write.
    async fn write_selection(
        &self,
        slot: &str,
        item_id: &str,
        selected_at_millis: i64,
    ) -> Result<(), StoreError>;
}
