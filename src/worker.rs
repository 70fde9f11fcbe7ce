use anyhow::Result;
use async_trait::async_trait;
use chrono::TimeZone;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::daily::{DailyError, DailySelector};
use crate::model::DailyItem;
use crate::notify::{notify_current, Notifier};
use crate::scheduler::DailyJob;

/// Runs one daily cycle: forced refresh, then a notification of the current
/// item. Returns whether a notification was posted.
///
/// A failed refresh ends the cycle without notifying; the next attempt is the
/// next scheduled run.
#[instrument(skip_all, fields(kind = T::KIND))]
pub async fn run_daily_cycle<T, Tz>(
    selector: &DailySelector<T, Tz>,
    notifier: Option<&dyn Notifier>,
    preview_chars: usize,
) -> Result<bool, DailyError>
where
    T: DailyItem,
    Tz: TimeZone + Send + Sync + 'static,
{
    match selector.refresh().await {
        Ok(item) => info!(item_id = %item.id(), "daily refresh done"),
        Err(err) => {
            warn!(?err, "daily refresh failed; skipping this cycle");
            return Err(err);
        }
    }
    Ok(match notifier {
        Some(notifier) => notify_current(selector, notifier, preview_chars).await,
        None => false,
    })
}

/// Scheduler job wrapping `run_daily_cycle` for one item kind.
pub struct DailyRefreshJob<T: DailyItem, Tz: TimeZone> {
    name: String,
    selector: Arc<DailySelector<T, Tz>>,
    notifier: Option<Arc<dyn Notifier>>,
    preview_chars: usize,
}

impl<T, Tz> DailyRefreshJob<T, Tz>
where
    T: DailyItem,
    Tz: TimeZone + Send + Sync + 'static,
{
    pub fn new(
        selector: Arc<DailySelector<T, Tz>>,
        notifier: Option<Arc<dyn Notifier>>,
        preview_chars: usize,
    ) -> Self {
        Self {
            name: format!("{}-of-the-day", T::KIND),
            selector,
            notifier,
            preview_chars,
        }
    }
}

#[async_trait]
impl<T, Tz> DailyJob for DailyRefreshJob<T, Tz>
where
    T: DailyItem,
    Tz: TimeZone + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self) -> Result<()> {
        run_daily_cycle(&*self.selector, self.notifier.as_deref(), self.preview_chars).await?;
        Ok(())
    }
}
