use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};
use std::str::FromStr;

/// A unit of content that can be picked as "the item of the day".
pub trait DailyItem: Clone + Debug + Send + Sync + 'static {
    type Id: Copy + Eq + Display + FromStr + Send + Sync + 'static;

    /// Preference slot and favorites kind, e.g. `verse`.
    const KIND: &'static str;
    /// Human label used in notifications, e.g. `Verse`.
    const LABEL: &'static str;

    fn id(&self) -> Self::Id;
    fn chapter_id(&self) -> i64;
    /// Position of the item within its chapter.
    fn position(&self) -> i64;
    fn preview_text(&self) -> &str;
}

/// Translated verse as shipped in `verses.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Verse {
    pub id: i64,
    #[serde(alias = "chapter_number")]
    pub chapter_id: i64,
    pub verse_number: i64,
    pub text: String,
    #[serde(default)]
    pub transliteration: Option<String>,
    #[serde(default)]
    pub word_meanings: Option<String>,
}

impl DailyItem for Verse {
    type Id = i64;
    const KIND: &'static str = "verse";
    const LABEL: &'static str = "Verse";

    fn id(&self) -> i64 {
        self.id
    }

    fn chapter_id(&self) -> i64 {
        self.chapter_id
    }

    fn position(&self) -> i64 {
        self.verse_number
    }

    fn preview_text(&self) -> &str {
        &self.text
    }
}

/// Sanskrit shloka with its meaning, as shipped in `shlokas.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Shloka {
    pub id: i64,
    #[serde(alias = "chapter")]
    pub chapter_id: i64,
    #[serde(alias = "verse")]
    pub shloka_number: i64,
    #[serde(alias = "slok")]
    pub sanskrit: String,
    #[serde(default)]
    pub transliteration: Option<String>,
    #[serde(default)]
    pub meaning: Option<String>,
}

impl DailyItem for Shloka {
    type Id = i64;
    const KIND: &'static str = "shloka";
    const LABEL: &'static str = "Shloka";

    fn id(&self) -> i64 {
        self.id
    }

    fn chapter_id(&self) -> i64 {
        self.chapter_id
    }

    fn position(&self) -> i64 {
        self.shloka_number
    }

    fn preview_text(&self) -> &str {
        self.meaning.as_deref().unwrap_or(&self.sanskrit)
    }
}

/// Persisted "item of the day" pointer for one slot.
///
/// `item_id` is present iff `selected_at_millis` is non-zero; both are written
/// together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySelection {
    pub item_id: Option<String>,
    pub selected_at_millis: i64,
}

impl DailySelection {
    pub fn is_empty(&self) -> bool {
        self.item_id
            .as_deref()
            .map_or(true, |id| id.trim().is_empty())
            || self.selected_at_millis == 0
    }
}
