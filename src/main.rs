use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use grid_snake::game::{FoodPlacement, GameConfig};
use grid_snake::modes::HumanMode;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "grid_snake")]
#[command(version, about = "Single-player Snake on a fixed grid")]
struct Cli {
    /// TOML file with game settings; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Cells per side of the square board
    #[arg(long)]
    board_cells: Option<usize>,

    /// Milliseconds between snake steps
    #[arg(long = "tick-ms")]
    tick_ms: Option<u64>,

    /// Where food may appear
    #[arg(long, value_enum)]
    food: Option<FoodArg>,

    /// Seed for reproducible food placement
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs to this file (filtered by RUST_LOG, default grid_snake=info)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FoodArg {
    /// Only on cells the snake does not occupy
    AvoidSnake,
    /// Anywhere on the board, even under the snake
    Anywhere,
}

impl From<FoodArg> for FoodPlacement {
    fn from(arg: FoodArg) -> Self {
        match arg {
            FoodArg::AvoidSnake => FoodPlacement::AvoidSnake,
            FoodArg::Anywhere => FoodPlacement::Anywhere,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let config = build_config(&cli)?;
    tracing::info!(?config, seed = ?cli.seed, "configuration loaded");

    let mut human_mode = HumanMode::new(config, cli.seed);
    human_mode.run().await?;

    Ok(())
}

fn build_config(cli: &Cli) -> Result<GameConfig> {
    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };

    if let Some(board_cells) = cli.board_cells {
        config.board_cells = board_cells;
    }
    if let Some(tick_ms) = cli.tick_ms {
        config.tick_period_ms = tick_ms;
    }
    if let Some(food) = cli.food {
        config.food_placement = food.into();
    }

    config.validate().context("Invalid command line settings")?;
    Ok(config)
}

// The terminal belongs to the game, so logs only ever go to a file
fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "grid_snake=info".into()))
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["grid_snake"]).unwrap();
        assert_eq!(build_config(&cli).unwrap(), GameConfig::default());
    }

    #[test]
    fn test_flag_overrides() {
        let cli = Cli::try_parse_from([
            "grid_snake",
            "--board-cells",
            "20",
            "--tick-ms",
            "150",
            "--food",
            "anywhere",
        ])
        .unwrap();

        let config = build_config(&cli).unwrap();
        assert_eq!(config.board_cells, 20);
        assert_eq!(config.tick_period_ms, 150);
        assert_eq!(config.food_placement, FoodPlacement::Anywhere);
    }

    #[test]
    fn test_invalid_override_rejected() {
        // (5, 5) does not fit on a 4x4 board
        let cli = Cli::try_parse_from(["grid_snake", "--board-cells", "4"]).unwrap();
        assert!(build_config(&cli).is_err());
    }
}
