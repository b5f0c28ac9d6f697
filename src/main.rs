use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use tick_snake::modes::HumanMode;
use tick_snake::settings::Settings;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tick_snake")]
#[command(version, about = "Grid snake game on a fixed-rate simulation engine")]
struct Cli {
    /// Settings file; created with defaults if missing
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Board width in cells (defaults to screen_width / block_size)
    #[arg(long)]
    width: Option<i32>,

    /// Board height in cells (defaults to screen_height / block_size)
    #[arg(long)]
    height: Option<i32>,

    /// Ticks per second
    #[arg(long)]
    frame_rate: Option<u32>,

    /// Number of fruit on the board
    #[arg(long)]
    fruit_count: Option<usize>,

    /// Seed for fruit placement
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs here; the terminal is owned by the game
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_tracing(log_file: Option<&PathBuf>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };

    let file = File::create(path).with_context(|| format!("Failed to create log file {:?}", path))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tick_snake=debug")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_ref())?;

    let mut settings = Settings::load_or_create(&cli.config)?;

    // Command-line overrides
    if let Some(frame_rate) = cli.frame_rate {
        settings.engine.frame_rate = frame_rate;
    }
    if let Some(fruit_count) = cli.fruit_count {
        settings.engine.fruit_count = fruit_count;
    }
    if cli.seed.is_some() {
        settings.engine.seed = cli.seed;
    }

    let width = cli.width.unwrap_or_else(|| settings.board_width());
    let height = cli.height.unwrap_or_else(|| settings.board_height());
    info!(width, height, config = ?cli.config, "starting game");

    let mut human_mode = HumanMode::new(width, height, settings.engine.clone(), &settings.caption)?;
    human_mode.run().await?;

    Ok(())
}
