//! Model configuration from environment variables

use std::env;
use std::str::FromStr;

use corpus_core::eval::DEFAULT_EVAL_SCALE;

use crate::bins::{EvalBins, MoveBins};
use crate::error::ModelError;
use crate::mistakes::MistakeConfig;

#[derive(Clone, Debug)]
pub struct ModelConfig {
    /// Glob pattern for evaluated record files
    pub analyzed_glob: String,

    /// Directory holding the per-move-bin table files
    pub tables_dir: String,

    /// Output path of the per-player mistake report
    pub report_path: String,

    /// Evaluation-bin range, in pawns (lower edge inclusive, upper exclusive)
    pub eval_bin_lo: f64,
    pub eval_bin_hi: f64,
    pub eval_bin_step: f64,

    /// Move-bin stride; 0 means a single all-moves bucket
    pub move_bin_size: u32,

    /// Largest move-bin lower edge when striding
    pub move_bin_limit: u32,

    /// Cells at or below this sample count are smoothed over
    pub min_bin_samples: u64,

    /// Severity-bin lower edges for the mistake histograms
    pub mistake_edges: Vec<f64>,

    /// First 0-based ply counted as a potential mistake
    pub mistake_start_ply: usize,

    /// Fraction of games used to build the table
    pub train_fraction: f64,

    /// Saturation scale for mate evaluations, in pawns
    pub eval_scale: f64,
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

impl ModelConfig {
    pub fn load() -> Result<Self, ModelError> {
        let mistake_edges = match env::var("MISTAKE_BINS") {
            Ok(value) => {
                let edges: Result<Vec<f64>, _> =
                    value.split(',').map(|t| t.trim().parse::<f64>()).collect();
                edges.map_err(|_| {
                    ModelError::Config(format!("bad MISTAKE_BINS value {value:?}"))
                })?
            }
            Err(_) => MistakeConfig::default().severity_edges,
        };
        if mistake_edges.len() < 2 {
            return Err(ModelError::Config(
                "MISTAKE_BINS needs at least two edges".into(),
            ));
        }

        let config = Self {
            analyzed_glob: env::var("ANALYZED_GLOB")
                .unwrap_or_else(|_| "analyzed/*_analyzed.csv".to_string()),
            tables_dir: env::var("TABLES_DIR").unwrap_or_else(|_| "tables".to_string()),
            report_path: env::var("REPORT_PATH")
                .unwrap_or_else(|_| "mistakes_by_player.csv".to_string()),
            eval_bin_lo: env_parse("EVAL_BIN_LO", -13.0),
            eval_bin_hi: env_parse("EVAL_BIN_HI", 13.2),
            eval_bin_step: env_parse("EVAL_BIN_STEP", 0.2),
            move_bin_size: env_parse("MOVE_BIN_SIZE", 0),
            move_bin_limit: env_parse("MOVE_BIN_LIMIT", 150),
            min_bin_samples: env_parse("MIN_BIN_SAMPLES", 100),
            mistake_edges,
            mistake_start_ply: env_parse("MISTAKE_START_PLY", 3),
            train_fraction: env_parse("TRAIN_FRACTION", 0.8),
            eval_scale: env_parse("EVAL_SCALE", DEFAULT_EVAL_SCALE),
        };
        if !(0.0..=1.0).contains(&config.train_fraction) {
            return Err(ModelError::Config(format!(
                "TRAIN_FRACTION must be in [0, 1], got {}",
                config.train_fraction
            )));
        }
        Ok(config)
    }

    pub fn eval_bins(&self) -> Result<EvalBins, ModelError> {
        EvalBins::from_range(self.eval_bin_lo, self.eval_bin_hi, self.eval_bin_step)
    }

    pub fn move_bins(&self) -> Result<MoveBins, ModelError> {
        if self.move_bin_size == 0 {
            Ok(MoveBins::All)
        } else {
            MoveBins::stride(self.move_bin_size, self.move_bin_limit)
        }
    }

    pub fn mistake_config(&self) -> MistakeConfig {
        MistakeConfig {
            severity_edges: self.mistake_edges.clone(),
            start_ply: self.mistake_start_ply,
        }
    }
}
