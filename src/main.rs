use clap::Parser;
use higher_lower::utils::error::ErrorCategory;
use higher_lower::utils::logger;
use higher_lower::{
    CliConfig, ConfiguredSource, Direction, GameConfig, GameError, ItemView,
    JsonFileScoreRepository, Leaderboard, Phase, ResultsService, RoundEngine, RoundEvent,
    ScoreEntry,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::broadcast;

type Input = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            logger::init_cli_logger(cli.verbose, None);
            tracing::error!("❌ Configuration validation failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    let level = config.logging.level.as_deref();
    if config.json_logging() {
        logger::init_json_logger(cli.verbose, level);
    } else {
        logger::init_cli_logger(cli.verbose, level);
    }
    tracing::debug!("Resolved config: {:?}", config);

    let source = match ConfiguredSource::from_config(&config) {
        Ok(source) => source,
        Err(e) => {
            tracing::error!("❌ Failed to set up item source: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(exit_code(&e));
        }
    };

    let mut engine = RoundEngine::new(source).with_tie_policy(config.game.tie_policy);
    let mut events = engine.subscribe();
    let repository = JsonFileScoreRepository::new(&config.leaderboard.path);
    let results = ResultsService::new(repository.clone());
    let leaderboard = Leaderboard::new(repository);
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    loop {
        if !start_with_retry(&mut engine, &config, &mut input).await? {
            break;
        }
        drain_events(&mut events, &config).await;

        play_streak(&mut engine, &mut events, &config, &mut input).await?;

        match engine.final_result() {
            Some(result) => {
                println!("\nYour final score: {} ({} guesses)", result.score, result.total_guesses);

                match results.summarize(&result).await {
                    Ok(summary) => println!(
                        "You beat {}% of players in pack {}",
                        summary.percentile, result.pack_id
                    ),
                    Err(e) => tracing::warn!("Could not compute percentile: {}", e),
                }
                match leaderboard.potential_rank(result.pack_id, result.score).await {
                    Ok(rank) => println!("That places you #{} on the leaderboard", rank),
                    Err(e) => tracing::warn!("Could not compute leaderboard rank: {}", e),
                }

                if let Some(player) = &cli.player {
                    let entry = ScoreEntry::from_result(player, &result, None);
                    match results.submit(entry).await {
                        Ok(_) => println!("Score submitted successfully!"),
                        Err(e) => eprintln!("❌ {}", e.user_friendly_message()),
                    }
                }
            }
            None => break,
        }

        if !confirm("Play again? [y/N] ", &mut input).await? {
            break;
        }
    }

    Ok(())
}

async fn start_with_retry(
    engine: &mut RoundEngine<ConfiguredSource>,
    config: &GameConfig,
    input: &mut Input,
) -> anyhow::Result<bool> {
    loop {
        match engine.start(config.game.pack_id).await {
            Ok(()) => return Ok(true),
            Err(e) if e.is_recoverable() => {
                eprintln!("❌ {}", e.user_friendly_message());
                if !confirm("Retry? [y/N] ", input).await? {
                    return Ok(false);
                }
            }
            Err(e) => return Err(e.into()),
        }
    }
}

async fn play_streak(
    engine: &mut RoundEngine<ConfiguredSource>,
    events: &mut broadcast::Receiver<RoundEvent>,
    config: &GameConfig,
    input: &mut Input,
) -> anyhow::Result<()> {
    while engine.phase() == Phase::AwaitingGuess {
        let pair = engine.current_pair();
        println!();
        println!("Score: {}", pair.score);
        if let (Some(current), Some(challenger)) = (&pair.current, &pair.challenger) {
            println!("  {}", describe(current));
            println!("  vs");
            println!("  {}", describe(challenger));
        }

        let Some(line) = prompt("[h]igher, [l]ower or [q]uit: ", input).await? else {
            engine.abandon();
            return Ok(());
        };
        if line.trim().eq_ignore_ascii_case("q") {
            engine.abandon();
            return Ok(());
        }

        let direction: Direction = match line.parse() {
            Ok(direction) => direction,
            Err(e) => {
                println!("{}", e.user_friendly_message());
                continue;
            }
        };

        let mut result = engine.guess(direction).await.map(|_| ());
        drain_events(events, config).await;

        // 補位失敗：分數保留，詢問是否重試
        while let Err(e) = &result {
            if engine.phase() != Phase::Revealing {
                break;
            }
            eprintln!("❌ {}", e.user_friendly_message());
            if !confirm("Retry loading the next property? [y/N] ", input).await? {
                engine.abandon();
                return Ok(());
            }
            result = engine.resume().await;
            drain_events(events, config).await;
        }

        result?;
    }
    Ok(())
}

/// 展示層：依事件輸出並自行決定停留時間，不影響判定結果
async fn drain_events(events: &mut broadcast::Receiver<RoundEvent>, config: &GameConfig) {
    while let Ok(event) = events.try_recv() {
        match event {
            RoundEvent::Started { pack_id } => println!("🏠 New game in pack {}", pack_id),
            RoundEvent::Revealed {
                challenger_price,
                correct,
                ..
            } => {
                let verdict = if correct { "✅ Correct!" } else { "❌ Wrong!" };
                println!("It was {}. {}", format_price(challenger_price), verdict);
                tokio::time::sleep(config.reveal_delay()).await;
            }
            RoundEvent::ReplacementFailed { message } => {
                tracing::debug!("Replacement failed: {}", message)
            }
            RoundEvent::GameOver { .. }
            | RoundEvent::Promoted { .. }
            | RoundEvent::ChallengerReady
            | RoundEvent::Reset => {}
        }
    }
}

async fn prompt(message: &str, input: &mut Input) -> anyhow::Result<Option<String>> {
    use std::io::Write;
    print!("{}", message);
    std::io::stdout().flush()?;
    Ok(input.next_line().await?)
}

async fn confirm(message: &str, input: &mut Input) -> anyhow::Result<bool> {
    Ok(prompt(message, input)
        .await?
        .map(|answer| answer.trim().eq_ignore_ascii_case("y"))
        .unwrap_or(false))
}

fn describe(item: &ItemView) -> String {
    let address = item
        .details
        .get("address")
        .and_then(|v| v.as_str())
        .unwrap_or(item.id.as_str());
    let price = item
        .price
        .map(format_price)
        .unwrap_or_else(|| "???".to_string());
    format!("{} | {}", address, price)
}

fn format_price(price: f64) -> String {
    let digits = format!("{:.0}", price);
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("${}", grouped)
}

fn exit_code(e: &GameError) -> i32 {
    match e.category() {
        ErrorCategory::Configuration | ErrorCategory::Validation => 1,
        ErrorCategory::SourceUnavailable | ErrorCategory::Persistence => 2,
        ErrorCategory::InvalidState | ErrorCategory::System => 3,
    }
}
