//! nlubot CLI: run the Telegram bot, emulate on the console, check cards. Config from env and
//! optional CLI args.

use anyhow::{Context, Result};
use clap::Parser;
use nlu_client::{EnvNluConfig, LuisRecognizer};
use nlubot_cli::{run_emulator, AppConfig, Cli, Commands, ConsoleTransport};
use nlubot_core::{init_file_tracing, init_tracing, RecognitionResult, Recognizer, StaticRecognizer};
use nlubot_telegram::{run_repl, TelegramConfig, TelegramTransport};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::info;
use turn_dispatcher::{ConversationRouter, TurnDispatcher};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { token } => handle_run(token).await,
        Commands::Emulate { offline } => handle_emulate(offline).await,
        Commands::CheckCards { dir } => handle_check_cards(dir),
    }
}

/// Builds the LUIS recognizer from LUIS_* env vars.
fn luis_recognizer() -> Result<Arc<dyn Recognizer>> {
    let nlu = EnvNluConfig::from_env()
        .context("Load NLU config from .env (LUIS_ENDPOINT, LUIS_APP_ID, LUIS_API_KEY)")?;
    let recognizer = LuisRecognizer::from_config(&nlu)?;
    Ok(Arc::new(recognizer))
}

/// Handle the run command: validate cards first, then serve Telegram updates.
async fn handle_run(token: Option<String>) -> Result<()> {
    let config = AppConfig::from_env()?;
    let telegram = TelegramConfig::load(token)?;
    init_tracing(&config.log_file)?;

    let cards = config
        .load_cards()
        .context("Load cards (CARDS_DIR, WELCOME_CARD, FALLBACK_CARD)")?;
    let recognizer = luis_recognizer()?;

    let bot = telegram.build_bot()?;
    let transport = Arc::new(TelegramTransport::new(bot.clone()));
    let dispatcher = TurnDispatcher::new(recognizer, transport, Arc::new(cards))
        .with_config(config.dispatcher.clone());
    let router = Arc::new(ConversationRouter::new(Arc::new(dispatcher)));

    info!(
        cards_dir = %config.cards_dir.display(),
        intent_reply = %config.dispatcher.intent_reply,
        min_score = config.dispatcher.min_score,
        "Bot started successfully"
    );

    run_repl(bot, router).await
}

/// Handle the emulate command. Logs go to the log file only; stdout carries replies.
async fn handle_emulate(offline: bool) -> Result<()> {
    let config = AppConfig::from_env()?;
    init_file_tracing(&config.log_file)?;

    let cards = config
        .load_cards()
        .context("Load cards (CARDS_DIR, WELCOME_CARD, FALLBACK_CARD)")?;
    let recognizer: Arc<dyn Recognizer> = if offline {
        Arc::new(
            StaticRecognizer::new()
                .with_utterance("what time is it", RecognitionResult::with_intent("GetTime", 1.0)),
        )
    } else {
        luis_recognizer()?
    };

    let transport = Arc::new(ConsoleTransport::new(std::io::stdout()));
    let dispatcher = TurnDispatcher::new(recognizer, transport, Arc::new(cards))
        .with_config(config.dispatcher.clone());
    let router = Arc::new(ConversationRouter::new(Arc::new(dispatcher)));

    let stats = run_emulator(BufReader::new(tokio::io::stdin()), router).await?;
    eprintln!(
        "Turns: {}, Failed: {}, Invalid lines: {}",
        stats.turns, stats.failed, stats.invalid_lines
    );
    Ok(())
}

/// Handle the check-cards command.
fn handle_check_cards(dir: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::from_env()?.with_cards_dir(dir);
    let cards = config.load_cards().context("Card validation failed")?;

    for card in [cards.welcome(), cards.fallback()] {
        println!("== {} ({})", card.name, card.content_type);
        println!("{}\n", card.plain_text());
    }
    println!("Cards OK (dir: {})", config.cards_dir.display());
    Ok(())
}
