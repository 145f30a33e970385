use std::{
    fs::File,
    io::{BufWriter, Write as _},
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;
use blockfall_engine::{BagSupplier, PieceSeed, Scoring};
use clap::builder::RangedU64ValueParser;
use rand::Rng as _;
use serde::Serialize;
use tracing::info;

use self::app::PlayApp;
use crate::tui::Runtime;

mod app;

const DEFAULT_CLEAR_DELAY_MS: u64 = 300;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Seed for the piece sequence (32 hex digits); random if omitted
    #[clap(long)]
    seed: Option<PieceSeed>,
    /// Level the drop speed starts at
    #[clap(long, default_value_t = 1, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    start_level: usize,
    /// Hide the landing preview
    #[clap(long)]
    no_ghost: bool,
    /// Length of the row-clear animation in milliseconds
    #[clap(long, default_value_t = DEFAULT_CLEAR_DELAY_MS)]
    clear_delay_ms: u64,
    /// Write the final score as JSON to this file when the game ends
    #[clap(long)]
    summary: Option<PathBuf>,
}

impl Default for PlayArg {
    fn default() -> Self {
        Self {
            seed: None,
            start_level: 1,
            no_ghost: false,
            clear_delay_ms: DEFAULT_CLEAR_DELAY_MS,
            summary: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct SessionSummary {
    seed: PieceSeed,
    game_over: bool,
    scoring: Scoring,
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        seed,
        start_level,
        no_ghost,
        clear_delay_ms,
        summary,
    } = arg;

    let seed = seed.unwrap_or_else(|| rand::rng().random());
    info!(%seed, start_level, "starting game");

    let mut app = PlayApp::new(
        BagSupplier::with_seed(seed),
        *start_level,
        !no_ghost,
        Duration::from_millis(*clear_delay_ms),
    );
    Runtime::default().run(&mut app)?;

    let engine = app.engine();
    let scoring = *engine.scoring();
    info!(
        points = scoring.points(),
        lines = scoring.lines_cleared(),
        game_over = engine.is_game_over(),
        "session ended"
    );

    if let Some(path) = summary {
        let summary = SessionSummary {
            seed,
            game_over: engine.is_game_over(),
            scoring,
        };
        write_summary(path, &summary)?;
    }
    Ok(())
}

fn write_summary(path: &Path, summary: &SessionSummary) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create summary file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, summary)
        .with_context(|| format!("failed to write summary to {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("failed to write summary to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_format() {
        let seed: PieceSeed = "0123456789abcdef0123456789abcdef".parse().unwrap();
        let summary = SessionSummary {
            seed,
            game_over: true,
            scoring: Scoring::new().plus_removed_lines(2),
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["seed"], "0123456789abcdef0123456789abcdef");
        assert_eq!(json["game_over"], true);
        assert_eq!(json["scoring"]["points"], 100);
        assert_eq!(json["scoring"]["lines_cleared"], 2);
    }

    #[test]
    fn test_default_matches_command_line_defaults() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[clap(flatten)]
            arg: PlayArg,
        }

        let parsed = Wrapper::parse_from(["blockfall"]).arg;
        let default = PlayArg::default();
        assert_eq!(parsed.start_level, default.start_level);
        assert_eq!(parsed.clear_delay_ms, default.clear_delay_ms);
        assert_eq!(parsed.no_ghost, default.no_ghost);
    }

    #[test]
    fn test_start_level_must_be_positive() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[clap(flatten)]
            arg: PlayArg,
        }

        assert!(Wrapper::try_parse_from(["blockfall", "--start-level", "0"]).is_err());
        let parsed = Wrapper::parse_from(["blockfall", "--start-level", "5"]).arg;
        assert_eq!(parsed.start_level, 5);
    }
}
