use clap::Parser;
use higher_lower::config::SourceKind;
use higher_lower::utils::logger;
use higher_lower::utils::validation::Validate;
use higher_lower::{CatalogItemSource, GameConfig, JsonFileScoreRepository, Leaderboard, PackId};

#[derive(Parser)]
#[command(name = "leaderboard")]
#[command(about = "Show pack statistics and the top scores of a pack")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Pack to show (defaults to game.pack_id)
    #[arg(long)]
    pack: Option<PackId>,

    /// Number of entries (defaults to leaderboard.top_limit)
    #[arg(short, long)]
    limit: Option<usize>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => GameConfig::from_file(path)?,
        None => GameConfig::default(),
    };
    logger::init_cli_logger(args.verbose, config.logging.level.as_deref());
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if config.source.r#type == SourceKind::Catalog {
        match CatalogItemSource::from_file(&config.source.catalog_path) {
            Ok(catalog) => {
                println!("Packs:");
                for summary in catalog.pack_summaries() {
                    let legacy = if summary.pack_id == 1 { " (legacy)" } else { "" };
                    println!(
                        "  #{}{}: {} properties",
                        summary.pack_id, legacy, summary.item_count
                    );
                }
                println!();
            }
            Err(e) => tracing::warn!("Could not load catalog for pack stats: {}", e),
        }
    }

    let pack_id = args.pack.unwrap_or(config.game.pack_id);
    let limit = args.limit.unwrap_or(config.leaderboard.top_limit);
    let leaderboard = Leaderboard::new(JsonFileScoreRepository::new(&config.leaderboard.path));
    let page = leaderboard.page(pack_id, limit).await?;

    println!("Top {} leaderboard, pack {}", limit, pack_id);
    if page.entries.is_empty() {
        println!("No scores yet. Be the first to play!");
    }
    for ranked in &page.entries {
        println!(
            "{:>3}. {:<20} {:>4}  {}",
            ranked.rank,
            ranked.entry.player_name,
            ranked.entry.score,
            ranked.entry.created_at.format("%b %-d, %Y")
        );
    }
    if page.has_more {
        println!(
            "... more scores available (try --limit {})",
            Leaderboard::<JsonFileScoreRepository>::next_limit(limit)
        );
    }

    Ok(())
}
