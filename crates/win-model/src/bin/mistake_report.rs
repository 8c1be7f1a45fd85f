//! Apply the mistake metric engine to an evaluated corpus.
//!
//! Looks up every ply of every game in the built outcome table, computes
//! WCL/LCL deltas and severity histograms, and writes one report row per
//! (game, player) with the accuracy model's score alongside.

use std::path::PathBuf;

use tracing::{info, warn};

use corpus_core::records::read_move_rows;
use corpus_core::{Game, PlayerColor, Scanner};

use win_model::accuracy::game_accuracy;
use win_model::config::ModelConfig;
use win_model::mistakes::{mistake_summary, write_mistake_table, MistakeReportRow};
use win_model::store::read_tables;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();
    let _ = dotenvy::dotenv();

    let config = ModelConfig::load()?;
    let move_bins = config.move_bins()?;
    let mistake_config = config.mistake_config();

    let table = read_tables(&config.tables_dir, move_bins)?;
    info!(tables_dir = %config.tables_dir, "outcome table loaded");

    let files: Vec<PathBuf> = glob::glob(&config.analyzed_glob)?
        .filter_map(Result::ok)
        .collect();
    if files.is_empty() {
        warn!(pattern = %config.analyzed_glob, "no evaluated record files found");
        return Ok(());
    }

    let scanner = Scanner::default().with_eval_scale(config.eval_scale);
    let mut games: Vec<Game> = Vec::new();
    for file in files {
        let rows = read_move_rows(&file)?;
        let (scanned, rejected) = scanner.scan_all_counted(&rows);
        info!(file = %file.display(), games = scanned.len(), rejected, "scanned");
        games.extend(scanned);
    }

    let mut rows: Vec<MistakeReportRow<'_>> = Vec::with_capacity(games.len() * 2);
    let mut skipped = 0usize;
    for game in &games {
        let Some(summary) = mistake_summary(game, &table, &mistake_config, config.eval_scale)
        else {
            skipped += 1;
            continue;
        };
        let accuracy = game
            .evals_as_pawns(config.eval_scale)
            .map(|evals| game_accuracy(&evals));
        for color in [PlayerColor::White, PlayerColor::Black] {
            rows.push(MistakeReportRow {
                game,
                color,
                mistakes: summary.for_color(color).clone(),
                accuracy: accuracy.map(|a| a.for_color(color)),
            });
        }
    }

    write_mistake_table(&config.report_path, &rows, &mistake_config.severity_edges)?;
    info!(
        report = %config.report_path,
        players = rows.len(),
        skipped,
        "mistake report written"
    );
    Ok(())
}
