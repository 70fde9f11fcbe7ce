//! Read-only content corpus loaded from a JSON asset.
use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

use crate::model::DailyItem;
use crate::prefs::StoreError;

#[async_trait]
pub trait ContentStore<T: DailyItem>: Send + Sync {
    /// Returns `None` when no item carries `id`.
    async fn get_item_by_id(&self, id: T::Id) -> Result<Option<T>, StoreError>;

    /// Fails with `StoreError::Empty` when the corpus has no items.
    async fn get_random_item(&self) -> Result<T, StoreError>;
}

/// Corpus backed by a JSON array file, read on first use and kept in memory.
pub struct JsonContentStore<T> {
    path: PathBuf,
    items: OnceCell<Vec<T>>,
}

impl<T> std::fmt::Debug for JsonContentStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonContentStore")
            .field("path", &self.path)
            .field("loaded", &self.items.initialized())
            .finish()
    }
}

impl<T> JsonContentStore<T>
where
    T: DailyItem + DeserializeOwned,
{
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            items: OnceCell::new(),
        }
    }

    /// Builds a store over items already in memory.
    pub fn from_items(items: Vec<T>) -> Self {
        Self {
            path: PathBuf::new(),
            items: OnceCell::new_with(Some(items)),
        }
    }

    /// All items, in file order.
    #[instrument(skip_all, fields(kind = T::KIND))]
    pub async fn all(&self) -> Result<&[T], StoreError> {
        let items = self
            .items
            .get_or_try_init(|| async {
                let raw = tokio::fs::read_to_string(&self.path).await?;
                let items: Vec<T> = serde_json::from_str(&raw)?;
                debug!(count = items.len(), path = %self.path.display(), "loaded content");
                Ok::<_, StoreError>(items)
            })
            .await?;
        Ok(items.as_slice())
    }

    /// Items of one chapter ordered by position.
    pub async fn items_in_chapter(&self, chapter_id: i64) -> Result<Vec<T>, StoreError> {
        let mut items: Vec<T> = self
            .all()
            .await?
            .iter()
            .filter(|item| item.chapter_id() == chapter_id)
            .cloned()
            .collect();
        items.sort_by_key(|item| item.position());
        Ok(items)
    }

    /// Distinct chapter ids in ascending order.
    pub async fn chapters(&self) -> Result<Vec<i64>, StoreError> {
        let chapters: BTreeSet<i64> = self.all().await?.iter().map(|i| i.chapter_id()).collect();
        Ok(chapters.into_iter().collect())
    }
}

#[async_trait]
impl<T> ContentStore<T> for JsonContentStore<T>
where
    T: DailyItem + DeserializeOwned,
{
    async fn get_item_by_id(&self, id: T::Id) -> Result<Option<T>, StoreError> {
        Ok(self.all().await?.iter().find(|item| item.id() == id).cloned())
    }

    async fn get_random_item(&self) -> Result<T, StoreError> {
        let items = self.all().await?;
        items
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or(StoreError::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Verse;
    use std::fs;
    use tempfile::tempdir;

    const VERSES: &str = r#"[
        {"id": 3, "chapter_id": 2, "verse_number": 2, "text": "b"},
        {"id": 1, "chapter_id": 1, "verse_number": 1, "text": "a"},
        {"id": 2, "chapter_id": 2, "verse_number": 1, "text": "c"}
    ]"#;

    #[tokio::test]
    async fn loads_and_filters_by_chapter() {
        let td = tempdir().unwrap();
        let p = td.path().join("verses.json");
        fs::write(&p, VERSES).unwrap();
        let store: JsonContentStore<Verse> = JsonContentStore::new(&p);

        let ch2 = store.items_in_chapter(2).await.unwrap();
        assert_eq!(ch2.iter().map(|v| v.id).collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(store.chapters().await.unwrap(), vec![1, 2]);

        let found = store.get_item_by_id(3).await.unwrap();
        assert_eq!(found.map(|v| v.text), Some("b".to_string()));
        assert!(store.get_item_by_id(99).await.unwrap().is_none());

        let random = store.get_random_item().await.unwrap();
        assert!([1, 2, 3].contains(&random.id));
    }

    #[tokio::test]
    async fn empty_corpus_fails_random() {
        let store: JsonContentStore<Verse> = JsonContentStore::from_items(Vec::new());
        assert!(matches!(
            store.get_random_item().await,
            Err(StoreError::Empty)
        ));
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let td = tempdir().unwrap();
        let store: JsonContentStore<Verse> = JsonContentStore::new(td.path().join("nope.json"));
        assert!(matches!(store.all().await, Err(StoreError::Io(_))));
    }

    #[tokio::test]
    async fn malformed_file_is_parse_error() {
        let td = tempdir().unwrap();
        let p = td.path().join("verses.json");
        fs::write(&p, "{not json").unwrap();
        let store: JsonContentStore<Verse> = JsonContentStore::new(&p);
        assert!(matches!(
            store.get_random_item().await,
            Err(StoreError::Parse(_))
        ));
    }
}
