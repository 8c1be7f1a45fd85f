//! Build the outcome table from an evaluated corpus.
//!
//! Scans every evaluated record file, keeps the deterministic training
//! partition, accumulates the (outcome, evaluation bin, move bin) counts,
//! and writes the smoothed per-move-bin table files.

use std::path::PathBuf;

use tracing::{info, warn};

use corpus_core::records::read_move_rows;
use corpus_core::Scanner;

use win_model::config::ModelConfig;
use win_model::split::partition;
use win_model::store::write_tables;
use win_model::OutcomeCounts;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();
    let _ = dotenvy::dotenv();

    let config = ModelConfig::load()?;
    let eval_bins = config.eval_bins()?;
    let move_bins = config.move_bins()?;
    info!(
        eval_cells = eval_bins.cell_count(),
        move_cells = move_bins.cell_count(),
        train_fraction = config.train_fraction,
        "building outcome table"
    );

    let files: Vec<PathBuf> = glob::glob(&config.analyzed_glob)?
        .filter_map(Result::ok)
        .collect();
    if files.is_empty() {
        warn!(pattern = %config.analyzed_glob, "no evaluated record files found");
        return Ok(());
    }

    let scanner = Scanner::default().with_eval_scale(config.eval_scale);
    let mut counts = OutcomeCounts::new(eval_bins, move_bins);
    let mut train_games = 0usize;
    let mut test_games = 0usize;
    let mut skipped = 0usize;

    for file in files {
        let source = file.display().to_string();
        let rows = read_move_rows(&file)?;
        let (games, rejected) = scanner.scan_all_counted(&rows);
        let (train, test) = partition(&games, &source, config.train_fraction);
        info!(
            file = %source,
            games = games.len(),
            rejected,
            train = train.len(),
            test = test.len(),
            "scanned"
        );
        test_games += test.len();
        for game in train {
            if counts.record_game(game, config.eval_scale) {
                train_games += 1;
            } else {
                // not evaluated yet, so it cannot vote on outcomes
                skipped += 1;
            }
        }
    }

    let table = counts.build(config.min_bin_samples);
    write_tables(&config.tables_dir, &table)?;

    info!(
        tables_dir = %config.tables_dir,
        train_games,
        test_games,
        skipped,
        "outcome table written"
    );
    Ok(())
}
