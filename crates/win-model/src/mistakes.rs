//! Mistake Metric Engine: per-ply win/lose-chance losses and the
//! severity-bin histograms built from them.

use std::path::Path;

use corpus_core::{Game, PlayerColor};

use crate::error::ModelError;
use crate::table::WinChanceTable;

#[derive(Debug, Clone)]
pub struct MistakeConfig {
    /// Lower edges of the severity bins, ascending.
    pub severity_edges: Vec<f64>,
    /// First 0-based ply counted into the histogram; early book moves are
    /// noise, not mistakes.
    pub start_ply: usize,
}

impl Default for MistakeConfig {
    fn default() -> Self {
        Self {
            severity_edges: vec![
                5.0, 10.0, 15.0, 20.0, 25.0, 30.0, 35.0, 40.0, 50.0, 60.0, 70.0, 100.0,
            ],
            start_ply: 3,
        }
    }
}

/// One label per histogram bin: `(5,10]`, …, `(70,100]`.
pub fn severity_labels(edges: &[f64]) -> Vec<String> {
    edges
        .windows(2)
        .map(|w| format!("({},{}]", w[0], w[1]))
        .collect()
}

/// Histogram bin of a chance-loss value: the bin whose lower edge is the
/// largest edge not exceeding it. Values below the first edge are not
/// mistakes; values beyond the last edge land in the final bin.
pub fn severity_bin(edges: &[f64], value: f64) -> Option<usize> {
    let below = edges.partition_point(|e| *e <= value);
    if below == 0 {
        return None;
    }
    Some((below - 1).min(edges.len().saturating_sub(2)))
}

/// Win- and lose-chance loss of one ply, attributed to its mover.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlyDelta {
    pub wcl: f64,
    pub lcl: f64,
}

/// Per-ply chance deltas for a fully evaluated game.
///
/// The first ply has no prior position, so its deltas are zero by
/// convention; every later ply gets the absolute move-to-move difference in
/// looked-up win/loss probability.
pub fn chance_deltas(evals: &[f64], table: &WinChanceTable) -> Vec<PlyDelta> {
    let win: Vec<f64> = evals
        .iter()
        .enumerate()
        .map(|(i, &e)| table.win_pct(e, i))
        .collect();
    let loss: Vec<f64> = evals
        .iter()
        .enumerate()
        .map(|(i, &e)| table.loss_pct(e, i))
        .collect();

    let mut deltas = Vec::with_capacity(evals.len());
    for i in 0..evals.len() {
        if i == 0 {
            deltas.push(PlyDelta { wcl: 0.0, lcl: 0.0 });
        } else {
            deltas.push(PlyDelta {
                wcl: (win[i] - win[i - 1]).abs(),
                lcl: (loss[i] - loss[i - 1]).abs(),
            });
        }
    }
    deltas
}

/// One player's mistake profile for one game.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerMistakes {
    pub color: PlayerColor,
    /// Counts per severity bin.
    pub histogram: Vec<u32>,
    /// Mean of max(WCL, LCL) over the player's plies ("average
    /// win-chance-loss").
    pub avg_chance_loss: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameMistakes {
    pub game_id: u64,
    pub white: PlayerMistakes,
    pub black: PlayerMistakes,
}

impl GameMistakes {
    pub fn for_color(&self, color: PlayerColor) -> &PlayerMistakes {
        match color {
            PlayerColor::White => &self.white,
            PlayerColor::Black => &self.black,
        }
    }
}

/// Build both players' mistake profiles for a game, or `None` if any ply is
/// still unevaluated.
pub fn mistake_summary(
    game: &Game,
    table: &WinChanceTable,
    config: &MistakeConfig,
    eval_scale: f64,
) -> Option<GameMistakes> {
    let evals = game.evals_as_pawns(eval_scale)?;
    let deltas = chance_deltas(&evals, table);
    let bin_count = config.severity_edges.len().saturating_sub(1);

    let mut white = PlayerMistakes {
        color: PlayerColor::White,
        histogram: vec![0; bin_count],
        avg_chance_loss: 0.0,
    };
    let mut black = PlayerMistakes {
        color: PlayerColor::Black,
        histogram: vec![0; bin_count],
        avg_chance_loss: 0.0,
    };
    let mut sums = [0.0f64; 2];
    let mut counts = [0u32; 2];

    for (i, delta) in deltas.iter().enumerate() {
        let a = delta.wcl.max(delta.lcl);
        let side = i % 2;
        // the convention-zero first ply would only dilute the mean
        if i >= 1 {
            sums[side] += a;
            counts[side] += 1;
        }
        if i >= config.start_ply {
            if let Some(bin) = severity_bin(&config.severity_edges, a) {
                let histogram = if side == 0 {
                    &mut white.histogram
                } else {
                    &mut black.histogram
                };
                histogram[bin] += 1;
            }
        }
    }

    white.avg_chance_loss = if counts[0] > 0 { sums[0] / counts[0] as f64 } else { 0.0 };
    black.avg_chance_loss = if counts[1] > 0 { sums[1] / counts[1] as f64 } else { 0.0 };

    Some(GameMistakes {
        game_id: game.id,
        white,
        black,
    })
}

/// One output row of the mistake report: a (game, player) pair.
pub struct MistakeReportRow<'a> {
    pub game: &'a Game,
    pub color: PlayerColor,
    pub mistakes: PlayerMistakes,
    pub accuracy: Option<f64>,
}

/// Persist the per-player mistake table: fixed metadata columns, the average
/// chance loss, the accuracy, then one column per severity bin.
pub fn write_mistake_table(
    path: impl AsRef<Path>,
    rows: &[MistakeReportRow<'_>],
    severity_edges: &[f64],
) -> Result<(), ModelError> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;

    let labels = severity_labels(severity_edges);
    let mut header = vec![
        "GameID".to_string(),
        "Player".to_string(),
        "Name".to_string(),
        "Elo".to_string(),
        "FideId".to_string(),
        "Opening".to_string(),
        "Variation".to_string(),
        "Result".to_string(),
        "TotalMoves".to_string(),
        "AvgChanceLoss".to_string(),
        "Accuracy".to_string(),
    ];
    header.extend(labels);
    writer.write_record(&header)?;

    for row in rows {
        let player = row.game.player(row.color);
        let mut record = vec![
            row.game.id.to_string(),
            row.color.as_str().to_string(),
            player.name.clone(),
            player.elo.map(|e| e.to_string()).unwrap_or_default(),
            player.fide_id.to_string(),
            row.game.opening.clone(),
            row.game.variation.clone(),
            row.game.outcome.as_result().to_string(),
            row.game.plies.len().to_string(),
            format!("{:.3}", row.mistakes.avg_chance_loss),
            row.accuracy.map(|a| format!("{a:.2}")).unwrap_or_default(),
        ];
        record.extend(row.mistakes.histogram.iter().map(u32::to_string));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
