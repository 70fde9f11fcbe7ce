use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{FixedOffset, TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::time::{sleep, Duration};

use gita_daily::clock::ManualClock;
use gita_daily::scheduler::{DailyJob, Scheduler, DAY};
use gita_daily::DayBoundary;

struct CountingJob {
    name: &'static str,
    runs: AtomicUsize,
    fail: bool,
}

impl CountingJob {
    fn new(name: &'static str, fail: bool) -> Arc<Self> {
        Arc::new(Self {
            name,
            runs: AtomicUsize::new(0),
            fail,
        })
    }

    fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DailyJob for CountingJob {
    fn name(&self) -> &str {
        self.name
    }

    async fn run(&self) -> Result<()> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow!("content store unavailable"));
        }
        Ok(())
    }
}

/// Wall clock at 05:30 local, half an hour before the boundary.
fn scheduler() -> Scheduler<FixedOffset> {
    let tz = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
    let now = tz
        .with_ymd_and_hms(2024, 3, 1, 5, 30, 0)
        .unwrap()
        .with_timezone(&Utc);
    Scheduler::new(
        Arc::new(ManualClock::new(now)),
        DayBoundary::new(tz, 6).unwrap(),
    )
}

#[tokio::test(start_paused = true)]
async fn first_run_at_boundary_then_daily() {
    let scheduler = scheduler();
    let job = CountingJob::new("verse-of-the-day", false);
    assert!(scheduler.ensure_daily(job.clone()));

    sleep(Duration::from_secs(29 * 60)).await;
    assert_eq!(job.runs(), 0);

    sleep(Duration::from_secs(2 * 60)).await;
    assert_eq!(job.runs(), 1);

    sleep(DAY).await;
    assert_eq!(job.runs(), 2);

    scheduler.shutdown();
}

#[tokio::test(start_paused = true)]
async fn registration_keeps_existing_schedule() {
    let scheduler = scheduler();
    let first = CountingJob::new("verse-of-the-day", false);
    let duplicate = CountingJob::new("verse-of-the-day", false);

    assert!(scheduler.ensure_daily(first.clone()));
    assert!(!scheduler.ensure_daily(duplicate.clone()));
    assert!(scheduler.is_scheduled("verse-of-the-day"));

    sleep(Duration::from_secs(31 * 60)).await;
    assert_eq!(first.runs(), 1);
    assert_eq!(duplicate.runs(), 0);

    scheduler.shutdown();
}

#[tokio::test(start_paused = true)]
async fn failures_wait_for_next_day() {
    let scheduler = scheduler();
    let job = CountingJob::new("shloka-of-the-day", true);
    scheduler.ensure_daily(job.clone());

    sleep(Duration::from_secs(31 * 60)).await;
    assert_eq!(job.runs(), 1);

    sleep(Duration::from_secs(60 * 60)).await;
    assert_eq!(job.runs(), 1);

    sleep(DAY).await;
    assert_eq!(job.runs(), 2);

    scheduler.shutdown();
}

#[tokio::test(start_paused = true)]
async fn cancel_stops_and_allows_reregistration() {
    let scheduler = scheduler();
    let job = CountingJob::new("verse-of-the-day", false);
    scheduler.ensure_daily(job.clone());

    assert!(scheduler.cancel("verse-of-the-day"));
    assert!(!scheduler.cancel("verse-of-the-day"));
    assert!(!scheduler.is_scheduled("verse-of-the-day"));

    sleep(2 * DAY).await;
    assert_eq!(job.runs(), 0);

    assert!(scheduler.ensure_daily(job.clone()));
    scheduler.shutdown();
    assert!(!scheduler.is_scheduled("verse-of-the-day"));
}
