//! Explicit wiring of stores, clock and selectors.
use anyhow::{anyhow, Result};
use chrono::{Local, TimeZone};
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::content::JsonContentStore;
use crate::daily::{DailySelector, DayBoundary};
use crate::db::{Pool, SqlitePreferenceStore};
use crate::model::{Shloka, Verse};
use crate::prefs::PreferenceStore;

/// Everything the binaries need, built once from config.
pub struct DailyServices<Tz: TimeZone = Local> {
    pub pool: Pool,
    pub clock: Arc<dyn Clock>,
    pub boundary: DayBoundary<Tz>,
    pub verse_content: Arc<JsonContentStore<Verse>>,
    pub shloka_content: Arc<JsonContentStore<Shloka>>,
    pub verses: Arc<DailySelector<Verse, Tz>>,
    pub shlokas: Arc<DailySelector<Shloka, Tz>>,
}

impl DailyServices<Local> {
    pub fn from_config(cfg: &Config, pool: Pool) -> Result<Self> {
        Self::build(cfg, pool, Arc::new(SystemClock), Local)
    }
}

impl<Tz> DailyServices<Tz>
where
    Tz: TimeZone + Send + Sync + 'static,
{
    pub fn build(cfg: &Config, pool: Pool, clock: Arc<dyn Clock>, tz: Tz) -> Result<Self> {
        let boundary = DayBoundary::new(tz, cfg.daily.boundary_hour)
            .ok_or_else(|| anyhow!("invalid boundary hour {}", cfg.daily.boundary_hour))?;
        let prefs: Arc<dyn PreferenceStore> = Arc::new(SqlitePreferenceStore::new(pool.clone()));
        let verse_content = Arc::new(JsonContentStore::<Verse>::new(&cfg.content.verses_path));
        let shloka_content = Arc::new(JsonContentStore::<Shloka>::new(&cfg.content.shlokas_path));

        let verses = Arc::new(DailySelector::<Verse, Tz>::new(
            verse_content.clone(),
            prefs.clone(),
            clock.clone(),
            boundary.clone(),
        ));
        let shlokas = Arc::new(DailySelector::<Shloka, Tz>::new(
            shloka_content.clone(),
            prefs,
            clock.clone(),
            boundary.clone(),
        ));

        Ok(Self {
            pool,
            clock,
            boundary,
            verse_content,
            shloka_content,
            verses,
            shlokas,
        })
    }
}
