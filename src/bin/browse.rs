use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use gita_daily::config;
use gita_daily::db;
use gita_daily::notify::truncate_preview;
use gita_daily::services::DailyServices;
use gita_daily::{DailyItem, Shloka, Verse};

#[derive(Debug, Parser)]
#[command(author, version, about = "Browse chapters and manage favorites")]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the verses of a chapter
    Chapter { chapter: i64 },
    /// List chapters present in the corpus
    Chapters,
    /// List favorites, newest first
    Favorites {
        #[arg(long)]
        kind: Option<String>,
    },
    /// Mark an item as favorite
    Favorite { kind: String, id: i64 },
    /// Remove an item from favorites
    Unfavorite { kind: String, id: i64 },
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

    match args.command {
        Command::Chapter { chapter } => {
            let verses = services.verse_content.items_in_chapter(chapter).await?;
            if verses.is_empty() {
                println!("No verses in chapter {chapter}");
            }
            for v in verses {
                let star = if db::is_favorite(&services.pool, Verse::KIND, v.id).await? {
                    "*"
                } else {
                    " "
                };
                println!(
                    "{star} {}.{} [{}] {}",
                    v.chapter_id,
                    v.verse_number,
                    v.id,
                    truncate_preview(&v.text, 80)
                );
            }
        }
        Command::Chapters => {
            for chapter in services.verse_content.chapters().await? {
                let count = services.verse_content.items_in_chapter(chapter).await?.len();
                println!("Chapter {chapter}: {count} verses");
            }
        }
        Command::Favorites { kind } => {
            for fav in db::list_favorites(&services.pool, kind.as_deref()).await? {
                println!("{} {}", fav.kind, fav.item_id);
            }
        }
        Command::Favorite { kind, id } => {
            check_kind(&kind)?;
            if db::add_favorite(&services.pool, &kind, id).await? {
                println!("Added {kind} {id} to favorites");
            } else {
                println!("{kind} {id} is already a favorite");
            }
        }
        Command::Unfavorite { kind, id } => {
            check_kind(&kind)?;
            if db::remove_favorite(&services.pool, &kind, id).await? {
                println!("Removed {kind} {id} from favorites");
            } else {
                println!("{kind} {id} was not a favorite");
            }
        }
    }
    Ok(())
}

fn check_kind(kind: &str) -> Result<()> {
    if kind != Verse::KIND && kind != Shloka::KIND {
        bail!("unknown kind {kind:?}; expected {} or {}", Verse::KIND, Shloka::KIND);
    }
    Ok(())
}
