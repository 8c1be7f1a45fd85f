//! Batch evaluation worker.
//!
//! Drives a pool of Stockfish processes over every game of every input
//! record file and writes one move-wise output file per input. Finished
//! files are recorded in a manifest so an interrupted batch resumes by
//! skipping them.

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use corpus_core::records::{read_move_rows, write_move_wise};
use corpus_core::{Game, Scanner};

use eval_worker::config::WorkerConfig;
use eval_worker::manifest::Manifest;
use eval_worker::pipeline::merge_evaluations;
use eval_worker::pool::analyze_games;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Load .env file for local dev
    let _ = dotenvy::dotenv();

    let config = WorkerConfig::load()?;
    info!(
        engine = %config.stockfish_path,
        depth = config.analysis_depth,
        workers = config.max_workers,
        "worker config loaded"
    );

    std::fs::create_dir_all(&config.output_dir)?;
    let manifest_path = Path::new(&config.output_dir).join("manifest.json");
    let mut manifest = Manifest::load(&manifest_path)?;

    let files: Vec<PathBuf> = glob::glob(&config.input_glob)?
        .filter_map(Result::ok)
        .collect();
    if files.is_empty() {
        warn!(pattern = %config.input_glob, "no input files found");
        return Ok(());
    }
    info!(files = files.len(), resumed = manifest.len(), "starting batch");

    let scanner = Scanner::default().with_eval_scale(config.eval_scale);
    let mut total_succeeded = 0usize;
    let mut total_failed = 0usize;

    for file in files {
        let stem = file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("input")
            .to_string();
        if config.skip_processed && manifest.is_complete(&stem) {
            info!(file = %file.display(), "already processed, skipping");
            continue;
        }

        let rows = match read_move_rows(&file) {
            Ok(rows) => rows,
            Err(e) => {
                error!(file = %file.display(), error = %e, "unreadable input file, skipping");
                continue;
            }
        };
        let (games, rejected) = scanner.scan_all_counted(&rows);
        info!(
            file = %file.display(),
            games = games.len(),
            rejected,
            "scan complete"
        );

        let outcome = analyze_games(&config, games).await?;

        let mut finished: Vec<Game> = Vec::with_capacity(outcome.analyzed.len());
        for mut analyzed in outcome.analyzed {
            merge_evaluations(&mut analyzed.game, &analyzed.evals);
            finished.push(analyzed.game);
        }
        // Pool results arrive in completion order; the record stream is
        // ordered by game id.
        finished.sort_by_key(|g| g.id);

        let out_path = Path::new(&config.output_dir)
            .join(format!("{stem}_{}_analyzed.csv", config.analysis_depth));
        write_move_wise(&out_path, &finished)?;

        info!(
            file = %file.display(),
            succeeded = finished.len(),
            failed = outcome.failed.len(),
            output = %out_path.display(),
            "file complete"
        );
        total_succeeded += finished.len();
        total_failed += outcome.failed.len();

        manifest.mark_complete(&stem);
        manifest.save(&manifest_path)?;
    }

    info!(
        succeeded = total_succeeded,
        failed = total_failed,
        "batch run finished"
    );
    Ok(())
}
