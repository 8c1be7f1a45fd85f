//! Worker Pool Orchestrator.
//!
//! A fixed set of workers, each exclusively owning one long-lived engine
//! process for its whole lifetime, so the engine startup cost is paid once
//! per worker rather than once per game. Workers pull the next unassigned
//! game whenever they go idle; fast games never stall behind slow ones.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use corpus_core::Game;

use crate::config::WorkerConfig;
use crate::error::WorkerError;
use crate::pipeline::{evaluate_game, PlyEval};
use crate::stockfish::Engine;

/// A finished game: the complete evaluation sequence plus its originating
/// game, so results stay traceable in any completion order.
pub struct AnalyzedGame {
    pub game: Game,
    pub evals: Vec<PlyEval>,
}

pub struct FailedGame {
    pub game_id: u64,
    pub error: String,
}

#[derive(Default)]
pub struct BatchOutcome {
    pub analyzed: Vec<AnalyzedGame>,
    pub failed: Vec<FailedGame>,
}

/// Run the pool over a batch of games.
///
/// Engine spawn failures here are fatal (configuration-level); everything
/// that goes wrong after dispatch is contained to the affected game.
pub async fn analyze_games(
    config: &WorkerConfig,
    games: Vec<Game>,
) -> Result<BatchOutcome, WorkerError> {
    if games.is_empty() {
        return Ok(BatchOutcome::default());
    }

    let worker_count = config
        .max_workers
        .min(num_cpus::get())
        .min(games.len())
        .max(1);

    let mut engines = Vec::with_capacity(worker_count);
    for worker_id in 0..worker_count {
        match Engine::spawn(&config.stockfish_path).await {
            Ok(engine) => {
                debug!(worker_id, "engine ready");
                engines.push(engine);
            }
            Err(e) => {
                // Never leave already-spawned engines behind
                for mut engine in engines {
                    engine.quit().await;
                }
                return Err(e);
            }
        }
    }
    info!(worker_count, games = games.len(), "engine pool ready");

    let queue: Arc<Mutex<VecDeque<Game>>> = Arc::new(Mutex::new(games.into_iter().collect()));
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut handles = Vec::with_capacity(worker_count);
    for (worker_id, engine) in engines.into_iter().enumerate() {
        let queue = Arc::clone(&queue);
        let tx = tx.clone();
        let depth = config.analysis_depth;
        let engine_path = config.stockfish_path.clone();
        handles.push(tokio::spawn(worker_loop(
            worker_id,
            engine,
            queue,
            tx,
            depth,
            engine_path,
        )));
    }
    drop(tx);

    let mut outcome = BatchOutcome::default();
    while let Some(result) = rx.recv().await {
        match result {
            Ok(analyzed) => outcome.analyzed.push(analyzed),
            Err(failed) => outcome.failed.push(failed),
        }
    }
    for handle in handles {
        let _ = handle.await;
    }

    // If every worker died, whatever is still queued was never attempted.
    let mut leftovers = queue.lock().unwrap_or_else(|p| p.into_inner());
    for game in leftovers.drain(..) {
        outcome.failed.push(FailedGame {
            game_id: game.id,
            error: "no worker available".into(),
        });
    }

    info!(
        succeeded = outcome.analyzed.len(),
        failed = outcome.failed.len(),
        "batch complete"
    );
    Ok(outcome)
}

type ResultTx = mpsc::UnboundedSender<Result<AnalyzedGame, FailedGame>>;

async fn worker_loop(
    worker_id: usize,
    mut engine: Engine,
    queue: Arc<Mutex<VecDeque<Game>>>,
    tx: ResultTx,
    depth: u32,
    engine_path: String,
) {
    loop {
        let game = queue.lock().unwrap_or_else(|p| p.into_inner()).pop_front();
        let Some(game) = game else { break };
        let game_id = game.id;

        match evaluate_game(&mut engine, &game, depth).await {
            Ok(evals) => {
                debug!(worker_id, game_id, plies = evals.len(), "game evaluated");
                let _ = tx.send(Ok(AnalyzedGame { game, evals }));
            }
            Err(err) => {
                warn!(worker_id, game_id, error = %err, "game analysis failed");
                let engine_died = matches!(err, WorkerError::Engine(_));
                let _ = tx.send(Err(FailedGame {
                    game_id,
                    error: err.to_string(),
                }));
                if engine_died {
                    // The process is suspect; replace it before the next game.
                    engine.quit().await;
                    match Engine::spawn(&engine_path).await {
                        Ok(fresh) => engine = fresh,
                        Err(spawn_err) => {
                            error!(worker_id, error = %spawn_err, "engine respawn failed, worker exiting");
                            return;
                        }
                    }
                }
            }
        }
    }
    engine.quit().await;
}
