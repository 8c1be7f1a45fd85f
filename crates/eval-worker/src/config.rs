//! Worker configuration from environment variables

use std::env;
use std::path::Path;
use std::str::FromStr;

use corpus_core::eval::DEFAULT_EVAL_SCALE;

use crate::error::WorkerError;

#[derive(Clone, Debug)]
pub struct WorkerConfig {
    /// Path to the Stockfish binary
    pub stockfish_path: String,

    /// Search depth per position
    pub analysis_depth: u32,

    /// Upper bound on concurrent workers (one engine process each)
    pub max_workers: usize,

    /// Skip input files already recorded in the manifest
    pub skip_processed: bool,

    /// Glob pattern for input record files
    pub input_glob: String,

    /// Directory for per-file outputs and the manifest
    pub output_dir: String,

    /// Saturation scale for mate evaluations, in pawns
    pub eval_scale: f64,
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_flag(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(v) => !matches!(v.trim(), "0" | "false" | "no" | ""),
        Err(_) => default,
    }
}

impl WorkerConfig {
    /// Load configuration from environment variables.
    ///
    /// A missing or nonexistent engine binary is fatal here, before any work
    /// is dispatched.
    pub fn load() -> Result<Self, WorkerError> {
        let stockfish_path = env::var("STOCKFISH_PATH")
            .map_err(|_| WorkerError::Config("STOCKFISH_PATH not set".into()))?;
        if !Path::new(&stockfish_path).is_file() {
            return Err(WorkerError::Config(format!(
                "engine binary not found at {stockfish_path}"
            )));
        }

        Ok(Self {
            stockfish_path,
            analysis_depth: env_parse("ANALYSIS_DEPTH", 16),
            max_workers: env_parse("MAX_WORKERS", num_cpus::get()),
            skip_processed: env_flag("SKIP_PROCESSED", true),
            input_glob: env::var("INPUT_GLOB").unwrap_or_else(|_| "games/*.csv".to_string()),
            output_dir: env::var("OUTPUT_DIR").unwrap_or_else(|_| "analyzed".to_string()),
            eval_scale: env_parse("EVAL_SCALE", DEFAULT_EVAL_SCALE),
        })
    }
}
