use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use gita_daily::config;
use gita_daily::db;
use gita_daily::notify::{LogNotifier, Notifier};
use gita_daily::scheduler::Scheduler;
use gita_daily::services::DailyServices;
use gita_daily::worker::DailyRefreshJob;
use gita_daily::DailyItem;

#[derive(Debug, Parser)]
#[command(author, version, about = "Refresh the verse and shloka of the day every morning")]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = config::load(Some(&args.config))?;
    cfg.ensure_dirs()?;

    let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| cfg.database_url());
    let pool = db::init_pool(&database_url).await?;
    db::run_migrations(&pool).await?;

    let services = DailyServices::from_config(&cfg, pool)?;
    let notifier: Option<Arc<dyn Notifier>> = if cfg.daily.notifications {
        Some(Arc::new(LogNotifier))
    } else {
        None
    };
    let preview = cfg.daily.preview_chars;

    // Serve today's selections once at start-up so a missed trigger is caught up.
    match services.verses.get_current().await {
        Ok(v) => info!(
            item_id = v.id(),
            chapter = v.chapter_id,
            verse = v.verse_number,
            "verse of the day"
        ),
        Err(err) => error!(?err, "verse of the day unavailable"),
    }
    match services.shlokas.get_current().await {
        Ok(s) => info!(
            item_id = s.id(),
            chapter = s.chapter_id,
            shloka = s.shloka_number,
            "shloka of the day"
        ),
        Err(err) => error!(?err, "shloka of the day unavailable"),
    }

    let scheduler = Scheduler::new(services.clock.clone(), services.boundary.clone());
    scheduler.ensure_daily(Arc::new(DailyRefreshJob::new(
        services.verses.clone(),
        notifier.clone(),
        preview,
    )));
    scheduler.ensure_daily(Arc::new(DailyRefreshJob::new(
        services.shlokas.clone(),
        notifier,
        preview,
    )));

    info!(
        boundary_hour = services.boundary.hour(),
        "daily scheduler running; Ctrl-C to stop"
    );
    tokio::signal::ctrl_c().await?;
    scheduler.shutdown();
    info!("shutting down");
    Ok(())
}
