use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use gita_daily::config;
use gita_daily::db;
use gita_daily::notify::Notification;
use gita_daily::services::DailyServices;
use gita_daily::{DailyItem, DailySelector};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kind {
    Verse,
    Shloka,
}

#[derive(Debug, Parser)]
#[command(author, version, about = "Print the item of the day")]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    #[arg(long, value_enum, default_value_t = Kind::Verse)]
    kind: Kind,

    /// Draw a new item even if today's is already chosen
    #[arg(long)]
    refresh: bool,
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
    let preview = cfg.daily.preview_chars;
    match args.kind {
        Kind::Verse => show(&*services.verses, args.refresh, preview).await,
        Kind::Shloka => show(&*services.shlokas, args.refresh, preview).await,
    }
}

async fn show<T: DailyItem>(
    selector: &DailySelector<T>,
    refresh: bool,
    preview_chars: usize,
) -> Result<()> {
    let item = if refresh {
        selector.refresh().await?
    } else {
        selector.get_current().await?
    };
    let n = Notification::for_item(&item, preview_chars);
    println!("{}\n{}", n.title, n.body);
    Ok(())
}
