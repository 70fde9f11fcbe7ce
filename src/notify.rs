//! Local notification for the current item of the day.
use anyhow::Result;
use async_trait::async_trait;
use chrono::TimeZone;
use tracing::{info, instrument, warn};

use crate::daily::DailySelector;
use crate::model::DailyItem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

impl Notification {
    pub fn for_item<T: DailyItem>(item: &T, preview_chars: usize) -> Self {
        Self {
            title: format!("{} of the Day", T::LABEL),
            body: format!(
                "Chapter {}, {} {}: {}",
                item.chapter_id(),
                T::LABEL,
                item.position(),
                truncate_preview(item.preview_text(), preview_chars)
            ),
        }
    }
}

/// Cuts `text` to at most `max_chars` characters, appending `...` when cut.
pub fn truncate_preview(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}...", text[..cut].trim_end()),
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Whether the user allows notifications to be posted.
    fn permitted(&self) -> bool {
        true
    }

    async fn show(&self, notification: &Notification) -> Result<()>;
}

/// Posts notifications to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn show(&self, notification: &Notification) -> Result<()> {
        info!(title = %notification.title, body = %notification.body, "notification");
        Ok(())
    }
}

/// Posts the current item of the day. Returns whether anything was shown;
/// a denied permission or a missing item skips silently.
#[instrument(skip_all, fields(kind = T::KIND))]
pub async fn notify_current<T, Tz>(
    selector: &DailySelector<T, Tz>,
    notifier: &dyn Notifier,
    preview_chars: usize,
) -> bool
where
    T: DailyItem,
    Tz: TimeZone + Send + Sync + 'static,
{
    if !notifier.permitted() {
        info!("notifications not permitted; skipping");
        return false;
    }
    let item = match selector.get_current().await {
        Ok(item) => item,
        Err(err) => {
            warn!(?err, "no item to notify");
            return false;
        }
    };
    let notification = Notification::for_item(&item, preview_chars);
    match notifier.show(&notification).await {
        Ok(()) => true,
        Err(err) => {
            warn!(?err, item_id = %item.id(), "failed to post notification");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Verse;

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_preview("short", 10), "short");
        assert_eq!(truncate_preview("exactly10!", 10), "exactly10!");
        assert_eq!(truncate_preview("abc def ghi", 4), "abc...");
        assert_eq!(truncate_preview("कर्मण्येवाधिकारस्ते", 3), "कर्...");
    }

    #[test]
    fn notification_carries_chapter_and_position() {
        let v = Verse {
            id: 87,
            chapter_id: 2,
            verse_number: 47,
            text: "You have a right to perform your prescribed duties".into(),
            transliteration: None,
            word_meanings: None,
        };
        let n = Notification::for_item(&v, 17);
        assert_eq!(n.title, "Verse of the Day");
        assert_eq!(n.body, "Chapter 2, Verse 47: You have a right...");
    }
}
