//! Row models returned by repositories.

use serde::{Deserialize, Serialize};

/// Bookmarked item. `kind` matches `DailyItem::KIND`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Favorite {
    pub kind: String,
    pub item_id: i64,
    pub created_at_millis: i64,
}
