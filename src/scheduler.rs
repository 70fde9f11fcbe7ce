//! Daily recurring jobs anchored on the boundary hour.
//!
//! Each job is registered under a unique name. Registering a name that is
//! already running keeps the existing schedule, so start-up code can call
//! `ensure_daily` unconditionally.
use async_trait::async_trait;
use chrono::TimeZone;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::clock::Clock;
use crate::daily::DayBoundary;

pub const DAY: Duration = Duration::from_secs(24 * 60 * 60);

#[async_trait]
pub trait DailyJob: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self) -> anyhow::Result<()>;
}

pub struct Scheduler<Tz: TimeZone> {
    clock: Arc<dyn Clock>,
    boundary: DayBoundary<Tz>,
    root: CancellationToken,
    jobs: Mutex<HashMap<String, CancellationToken>>,
}

impl<Tz> Scheduler<Tz>
where
    Tz: TimeZone + Send + Sync + 'static,
{
    pub fn new(clock: Arc<dyn Clock>, boundary: DayBoundary<Tz>) -> Self {
        Self {
            clock,
            boundary,
            root: CancellationToken::new(),
            jobs: Mutex::new(HashMap::new()),
        }
    }

    /// Time until the next boundary hour: today's if still ahead, else tomorrow's.
    pub fn initial_delay(&self) -> Duration {
        let now = self.clock.now();
        let next = self.boundary.next_start_after(now);
        (next - now).to_std().unwrap_or(Duration::ZERO)
    }

    /// Starts `job` unless a live schedule with the same name exists.
    /// Returns `true` when a new schedule was started.
    pub fn ensure_daily(&self, job: Arc<dyn DailyJob>) -> bool {
        let name = job.name().to_string();
        let mut jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(token) = jobs.get(&name) {
            if !token.is_cancelled() {
                info!(job = %name, "daily job already scheduled; keeping existing");
                return false;
            }
        }

        let delay = self.initial_delay();
        let token = self.root.child_token();
        info!(job = %name, delay_secs = delay.as_secs(), "scheduling daily job");
        tokio::spawn(run_daily(job, delay, token.clone()));
        jobs.insert(name, token);
        true
    }

    pub fn is_scheduled(&self, name: &str) -> bool {
        let jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());
        jobs.get(name).map_or(false, |t| !t.is_cancelled())
    }

    /// Stops the named job. Returns `false` if it was not scheduled.
    pub fn cancel(&self, name: &str) -> bool {
        let mut jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());
        match jobs.remove(name) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn shutdown(&self) {
        self.root.cancel();
    }
}

async fn run_daily(job: Arc<dyn DailyJob>, delay: Duration, token: CancellationToken) {
    let mut ticker = interval_at(Instant::now() + delay, DAY);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(err) = job.run().await {
                    warn!(?err, job = job.name(), "daily job failed; waiting for next run");
                }
            }
            _ = token.cancelled() => {
                info!(job = job.name(), "daily job stopped");
                break;
            }
        }
    }
}
