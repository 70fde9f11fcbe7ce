use anyhow::Result;
use chrono::Utc;
use tracing::instrument;

use super::model::Favorite;
use super::Pool;

/// Bookmarks an item. Returns `false` if it was already a favorite.
#[instrument(skip_all, fields(kind = %kind, item_id = item_id))]
pub async fn add_favorite(pool: &Pool, kind: &str, item_id: i64) -> Result<bool> {
    let res = sqlx::query(
        "INSERT INTO favorites (kind, item_id, created_at_millis) VALUES (?, ?, ?) \
         ON CONFLICT(kind, item_id) DO NOTHING",
    )
    .bind(kind)
    .bind(item_id)
    .bind(Utc::now().timestamp_millis())
    .execute(pool)
    .await?;
    Ok(res.rows_affected() > 0)
}

/// Returns `false` if the item was not a favorite.
#[instrument(skip_all, fields(kind = %kind, item_id = item_id))]
pub async fn remove_favorite(pool: &Pool, kind: &str, item_id: i64) -> Result<bool> {
    let res = sqlx::query("DELETE FROM favorites WHERE kind = ? AND item_id = ?")
        .bind(kind)
        .bind(item_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected() > 0)
}

pub async fn is_favorite(pool: &Pool, kind: &str, item_id: i64) -> Result<bool> {
    let hit: Option<i64> =
        sqlx::query_scalar("SELECT 1 FROM favorites WHERE kind = ? AND item_id = ?")
            .bind(kind)
            .bind(item_id)
            .fetch_optional(pool)
            .await?;
    Ok(hit.is_some())
}

/// Newest first; `kind = None` lists every kind.
#[instrument(skip_all)]
pub async fn list_favorites(pool: &Pool, kind: Option<&str>) -> Result<Vec<Favorite>> {
    let rows = sqlx::query_as::<_, Favorite>(
        "SELECT kind, item_id, created_at_millis FROM favorites \
         WHERE (? IS NULL OR kind = ?) \
         ORDER BY created_at_millis DESC, id DESC",
    )
    .bind(kind)
    .bind(kind)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
