//! Item-of-the-day selection anchored on a local boundary hour.
//!
//! A logical day starts at `boundary_hour:00` local time rather than midnight,
//! so an instant at 03:00 belongs to the previous calendar date. The selector
//! keeps one persisted pointer per item kind and only redraws once the logical
//! day of "now" differs from the logical day of the stored timestamp.
//!
//! Concurrent `refresh` calls are not serialized; the last write wins.
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::clock::Clock;
use crate::content::ContentStore;
use crate::model::{DailyItem, DailySelection};
use crate::prefs::{PreferenceStore, StoreError};

pub const DEFAULT_BOUNDARY_HOUR: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Content,
    Preference,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Content => f.write_str("content"),
            StoreKind::Preference => f.write_str("preference"),
        }
    }
}

#[derive(Debug, Error)]
pub enum DailyError {
    #[error("{store} store unavailable: {source}")]
    StoreUnavailable {
        store: StoreKind,
        #[source]
        source: StoreError,
    },
    #[error("no item available")]
    NotFound,
}

impl DailyError {
    fn content(err: StoreError) -> Self {
        match err {
            StoreError::Empty => DailyError::NotFound,
            source => DailyError::StoreUnavailable {
                store: StoreKind::Content,
                source,
            },
        }
    }

    fn preference(source: StoreError) -> Self {
        DailyError::StoreUnavailable {
            store: StoreKind::Preference,
            source,
        }
    }
}

/// Maps instants to logical days for a zone and boundary hour.
#[derive(Debug, Clone)]
pub struct DayBoundary<Tz: TimeZone> {
    tz: Tz,
    hour: u32,
    anchor: NaiveTime,
}

impl DayBoundary<Local> {
    pub fn local(hour: u32) -> Option<Self> {
        Self::new(Local, hour)
    }
}

impl<Tz: TimeZone> DayBoundary<Tz> {
    /// Returns `None` if `hour` is not a valid hour of day.
    pub fn new(tz: Tz, hour: u32) -> Option<Self> {
        let anchor = NaiveTime::from_hms_opt(hour, 0, 0)?;
        Some(Self { tz, hour, anchor })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    /// Logical day of `at`: its local date, or the day before when the local
    /// hour is earlier than the boundary hour.
    pub fn day_key(&self, at: DateTime<Utc>) -> NaiveDate {
        let local = at.with_timezone(&self.tz);
        let date = local.date_naive();
        if local.hour() < self.hour {
            date.pred_opt().unwrap_or(date)
        } else {
            date
        }
    }

    pub fn day_key_for_millis(&self, millis: i64) -> Option<NaiveDate> {
        Utc.timestamp_millis_opt(millis)
            .single()
            .map(|at| self.day_key(at))
    }

    /// The instant at which logical day `key` starts.
    ///
    /// A boundary falling in a DST gap moves one hour later; an ambiguous one
    /// takes the earlier instant.
    pub fn start_of(&self, key: NaiveDate) -> DateTime<Utc> {
        let naive = key.and_time(self.anchor);
        self.tz
            .from_local_datetime(&naive)
            .earliest()
            .or_else(|| {
                self.tz
                    .from_local_datetime(&(naive + Duration::hours(1)))
                    .earliest()
            })
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
    }

    /// Normalized timestamp stored with a selection made at `now`.
    pub fn day_key_timestamp(&self, now: DateTime<Utc>) -> i64 {
        self.start_of(self.day_key(now)).timestamp_millis()
    }

    /// Next boundary instant at or after `now`.
    pub fn next_start_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.with_timezone(&self.tz).date_naive();
        let candidate = self.start_of(today);
        if candidate >= now {
            return candidate;
        }
        self.start_of(today.succ_opt().unwrap_or(today))
    }
}

/// Produces "the item of the day" for one item kind.
pub struct DailySelector<T: DailyItem, Tz: TimeZone = Local> {
    content: Arc<dyn ContentStore<T>>,
    prefs: Arc<dyn PreferenceStore>,
    clock: Arc<dyn Clock>,
    boundary: DayBoundary<Tz>,
    _item: PhantomData<fn() -> T>,
}

impl<T, Tz> DailySelector<T, Tz>
where
    T: DailyItem,
    Tz: TimeZone + Send + Sync + 'static,
{
    pub fn new(
        content: Arc<dyn ContentStore<T>>,
        prefs: Arc<dyn PreferenceStore>,
        clock: Arc<dyn Clock>,
        boundary: DayBoundary<Tz>,
    ) -> Self {
        Self {
            content,
            prefs,
            clock,
            boundary,
            _item: PhantomData,
        }
    }

    pub fn boundary(&self) -> &DayBoundary<Tz> {
        &self.boundary
    }

    /// Read-only view of the persisted selection.
    pub async fn selection(&self) -> Result<DailySelection, DailyError> {
        self.prefs
            .read_selection(T::KIND)
            .await
            .map_err(DailyError::preference)
    }

    /// Cached item when still valid for the current logical day, otherwise a
    /// fresh draw.
    #[instrument(skip_all, fields(kind = T::KIND))]
    pub async fn get_current(&self) -> Result<T, DailyError> {
        let now = self.clock.now();
        let today = self.boundary.day_key(now);
        let selection = self.selection().await?;
        match self.cached(&selection, today).await {
            Some(item) => {
                debug!(item_id = %item.id(), day = %today, "serving cached selection");
                Ok(item)
            }
            None => self.refresh_at(now).await,
        }
    }

    /// Draws a new item unconditionally and persists it.
    #[instrument(skip_all, fields(kind = T::KIND))]
    pub async fn refresh(&self) -> Result<T, DailyError> {
        self.refresh_at(self.clock.now()).await
    }

    async fn refresh_at(&self, now: DateTime<Utc>) -> Result<T, DailyError> {
        let item = self
            .content
            .get_random_item()
            .await
            .map_err(DailyError::content)?;
        let stamp = self.boundary.day_key_timestamp(now);
        self.prefs
            .write_selection(T::KIND, &item.id().to_string(), stamp)
            .await
            .map_err(DailyError::preference)?;
        info!(
            item_id = %item.id(),
            day = %self.boundary.day_key(now),
            "selected new item of the day"
        );
        Ok(item)
    }

    /// Resolves the persisted selection if it belongs to `today`. Any corrupt
    /// or dangling state is a miss.
    async fn cached(&self, selection: &DailySelection, today: NaiveDate) -> Option<T> {
        if selection.is_empty() {
            return None;
        }
        let raw_id = selection.item_id.as_deref()?.trim();
        let Some(cached_day) = self.boundary.day_key_for_millis(selection.selected_at_millis)
        else {
            warn!(
                selected_at = selection.selected_at_millis,
                "stored timestamp out of range; redrawing"
            );
            return None;
        };
        if cached_day != today {
            debug!(cached = %cached_day, today = %today, "day boundary crossed");
            return None;
        }
        let Ok(id) = raw_id.parse::<T::Id>() else {
            warn!(raw_id, "stored item id does not parse; redrawing");
            return None;
        };
        match self.content.get_item_by_id(id).await {
            Ok(Some(item)) => Some(item),
            Ok(None) => {
                warn!(item_id = %id, "stored item id no longer resolves; redrawing");
                None
            }
            Err(err) => {
                warn!(?err, item_id = %id, "cached item lookup failed; redrawing");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(5 * 3600 + 1800).unwrap()
    }

    fn at(tz: &FixedOffset, y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        tz.with_ymd_and_hms(y, m, d, h, min, s)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn rejects_invalid_hour() {
        assert!(DayBoundary::new(Utc, 24).is_none());
        assert!(DayBoundary::new(Utc, 0).is_some());
    }

    #[test]
    fn hours_before_boundary_belong_to_previous_day() {
        let tz = ist();
        let b = DayBoundary::new(tz, 6).unwrap();
        assert_eq!(b.day_key(at(&tz, 2024, 3, 2, 3, 0, 0)), date(2024, 3, 1));
        assert_eq!(b.day_key(at(&tz, 2024, 3, 1, 18, 0, 0)), date(2024, 3, 1));
        assert_eq!(b.day_key(at(&tz, 2024, 3, 2, 5, 59, 59)), date(2024, 3, 1));
        assert_eq!(b.day_key(at(&tz, 2024, 3, 2, 6, 0, 0)), date(2024, 3, 2));
    }

    #[test]
    fn month_and_year_edges_roll_back() {
        let tz = ist();
        let b = DayBoundary::new(tz, 6).unwrap();
        assert_eq!(b.day_key(at(&tz, 2024, 3, 1, 1, 0, 0)), date(2024, 2, 29));
        assert_eq!(b.day_key(at(&tz, 2025, 1, 1, 0, 30, 0)), date(2024, 12, 31));
    }

    #[test]
    fn stored_timestamp_is_normalized_to_boundary() {
        let tz = ist();
        let b = DayBoundary::new(tz, 6).unwrap();
        let expected = at(&tz, 2024, 3, 1, 6, 0, 0).timestamp_millis();
        assert_eq!(b.day_key_timestamp(at(&tz, 2024, 3, 1, 6, 0, 1)), expected);
        assert_eq!(b.day_key_timestamp(at(&tz, 2024, 3, 1, 23, 59, 0)), expected);
        assert_eq!(b.day_key_timestamp(at(&tz, 2024, 3, 2, 4, 0, 0)), expected);
        assert_eq!(b.day_key_for_millis(expected), Some(date(2024, 3, 1)));
    }

    #[test]
    fn next_start_is_today_or_tomorrow() {
        let tz = ist();
        let b = DayBoundary::new(tz, 6).unwrap();
        assert_eq!(
            b.next_start_after(at(&tz, 2024, 3, 1, 5, 0, 0)),
            at(&tz, 2024, 3, 1, 6, 0, 0)
        );
        assert_eq!(
            b.next_start_after(at(&tz, 2024, 3, 1, 6, 0, 0)),
            at(&tz, 2024, 3, 1, 6, 0, 0)
        );
        assert_eq!(
            b.next_start_after(at(&tz, 2024, 3, 1, 6, 0, 1)),
            at(&tz, 2024, 3, 2, 6, 0, 0)
        );
    }

    #[test]
    fn midnight_boundary_matches_calendar_date() {
        let b = DayBoundary::new(Utc, 0).unwrap();
        let t = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(b.day_key(t), date(2024, 3, 1));
        assert_eq!(b.day_key_timestamp(t), t.timestamp_millis());
    }

    #[test]
    fn boundary_in_dst_gap_moves_one_hour_later() {
        // Sao Paulo skipped 00:00-01:00 local on 2018-11-04.
        let b = DayBoundary::new(chrono_tz::America::Sao_Paulo, 0).unwrap();
        let start = b.start_of(date(2018, 11, 4));
        assert_eq!(start, Utc.with_ymd_and_hms(2018, 11, 4, 3, 0, 0).unwrap());
        assert_eq!(
            b.day_key_for_millis(start.timestamp_millis()),
            Some(date(2018, 11, 4))
        );

        let evening = Utc.with_ymd_and_hms(2018, 11, 4, 2, 59, 0).unwrap();
        assert_eq!(b.day_key(evening), date(2018, 11, 3));
        assert_eq!(b.next_start_after(evening), start);
    }

    #[test]
    fn ambiguous_boundary_takes_earliest_instant() {
        // 23:00-23:59 local on 2019-02-16 happened twice in Sao Paulo.
        let b = DayBoundary::new(chrono_tz::America::Sao_Paulo, 23).unwrap();
        let start = b.start_of(date(2019, 2, 16));
        assert_eq!(start, Utc.with_ymd_and_hms(2019, 2, 17, 1, 0, 0).unwrap());
        assert_eq!(
            b.day_key_for_millis(start.timestamp_millis()),
            Some(date(2019, 2, 16))
        );

        let repeated = Utc.with_ymd_and_hms(2019, 2, 17, 2, 30, 0).unwrap();
        assert_eq!(b.day_key(repeated), date(2019, 2, 16));
        assert_eq!(b.day_key_timestamp(repeated), start.timestamp_millis());
    }

    #[test]
    fn content_errors_map_to_taxonomy() {
        assert!(matches!(
            DailyError::content(StoreError::Empty),
            DailyError::NotFound
        ));
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        match DailyError::content(StoreError::Io(io)) {
            DailyError::StoreUnavailable { store, .. } => assert_eq!(store, StoreKind::Content),
            other => panic!("unexpected {other:?}"),
        }
    }
}
