//! Lichess-formula accuracy model.
//!
//! An analytic alternative to the empirical outcome table: centipawn scores
//! map to win percentages through a fixed logistic, per-move accuracy decays
//! exponentially with the win-percentage a move gives up, and a player's
//! game accuracy blends a volatility-weighted mean with a harmonic mean so
//! single blunders are not averaged away.

use corpus_core::PlayerColor;

const MIN_VOLATILITY_WEIGHT: f64 = 0.5;
const MAX_VOLATILITY_WEIGHT: f64 = 12.0;

/// Win percentage (0–100) for a centipawn score, White-relative.
pub fn win_percent(cp: f64) -> f64 {
    50.0 + 50.0 * (2.0 / (1.0 + (-0.00368208 * cp).exp()) - 1.0)
}

/// Accuracy (0–100) of a move that cost `delta_win_pct` win percentage from
/// the mover's perspective.
pub fn move_accuracy(delta_win_pct: f64) -> f64 {
    (103.1668 * (-0.04354 * delta_win_pct).exp() - 3.1669).clamp(0.0, 100.0)
}

/// Sliding-window volatility weights over a win-percentage sequence.
///
/// `win_pcts` must include the pre-game entry, so its length is ply count
/// plus one; one weight is produced per ply.
pub fn volatility_weights(win_pcts: &[f64]) -> Vec<f64> {
    let total = win_pcts.len();
    let window = (total / 10).clamp(2, 8);
    let mut weights = Vec::with_capacity(total.saturating_sub(1));
    for i in 1..total {
        let start = i.saturating_sub(window / 2);
        let end = (i + window / 2).min(total);
        let slice = &win_pcts[start..end];
        let mean = slice.iter().sum::<f64>() / slice.len() as f64;
        let variance =
            slice.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / slice.len() as f64;
        weights.push(variance.sqrt().clamp(MIN_VOLATILITY_WEIGHT, MAX_VOLATILITY_WEIGHT));
    }
    weights
}

/// Blend of the weighted mean and the harmonic mean of per-move accuracies.
pub fn total_accuracy(accuracies: &[f64], weights: &[f64]) -> f64 {
    if accuracies.is_empty() {
        return 100.0;
    }
    let weight_sum: f64 = weights.iter().sum();
    let weighted_mean = if weight_sum > 0.0 {
        accuracies
            .iter()
            .zip(weights)
            .map(|(a, w)| a * w)
            .sum::<f64>()
            / weight_sum
    } else {
        accuracies.iter().sum::<f64>() / accuracies.len() as f64
    };
    let harmonic_mean = accuracies.len() as f64
        / accuracies
            .iter()
            .map(|&a| 1.0 / if a == 0.0 { 0.1 } else { a })
            .sum::<f64>();
    (weighted_mean + harmonic_mean) / 2.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameAccuracy {
    pub white: f64,
    pub black: f64,
}

impl GameAccuracy {
    pub fn for_color(&self, color: PlayerColor) -> f64 {
        match color {
            PlayerColor::White => self.white,
            PlayerColor::Black => self.black,
        }
    }
}

/// Per-player accuracy for a fully evaluated game. `evals` are White-relative
/// post-move evaluations in pawns.
pub fn game_accuracy(evals: &[f64]) -> GameAccuracy {
    // win% before each ply; the pre-game entry repeats the first evaluation
    let mut win_pcts = Vec::with_capacity(evals.len() + 1);
    win_pcts.push(win_percent(evals.first().copied().unwrap_or(0.0) * 100.0));
    win_pcts.extend(evals.iter().map(|&e| win_percent(e * 100.0)));

    let weights = volatility_weights(&win_pcts);

    let mut accuracies = [Vec::new(), Vec::new()];
    let mut side_weights = [Vec::new(), Vec::new()];
    for i in 0..evals.len() {
        let before = win_pcts[i];
        let after = win_pcts[i + 1];
        // deltas are from the mover's perspective: a Black move that raises
        // White's win% cost Black exactly that much
        let delta = match PlayerColor::of_ply(i) {
            PlayerColor::White => before - after,
            PlayerColor::Black => after - before,
        };
        accuracies[i % 2].push(move_accuracy(delta));
        side_weights[i % 2].push(weights[i]);
    }

    GameAccuracy {
        white: total_accuracy(&accuracies[0], &side_weights[0]),
        black: total_accuracy(&accuracies[1], &side_weights[1]),
    }
}
