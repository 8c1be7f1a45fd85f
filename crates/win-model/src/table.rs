//! The empirical outcome table: accumulation, normalization, and lookup.

use corpus_core::{Game, Outcome};

use crate::bins::{EvalBins, MoveBins};
use crate::smooth::{smooth_slice, SliceFallback};

/// Raw (outcome, evaluation bin, move bin) counts accumulated over a
/// training corpus.
#[derive(Debug, Clone)]
pub struct OutcomeCounts {
    eval_bins: EvalBins,
    move_bins: MoveBins,
    /// Flattened `[outcome][eval cell][move cell]` tensor.
    counts: Vec<u64>,
}

impl OutcomeCounts {
    pub fn new(eval_bins: EvalBins, move_bins: MoveBins) -> Self {
        let len = 3 * eval_bins.cell_count() * move_bins.cell_count();
        Self {
            eval_bins,
            move_bins,
            counts: vec![0; len],
        }
    }

    fn idx(&self, outcome: usize, eval_cell: usize, move_cell: usize) -> usize {
        (outcome * self.eval_bins.cell_count() + eval_cell) * self.move_bins.cell_count()
            + move_cell
    }

    /// Count one ply of a game with a known outcome.
    pub fn record_ply(&mut self, outcome: Outcome, eval_pawns: f64, ply_index: usize) {
        let e = self.eval_bins.index(eval_pawns);
        let m = self.move_bins.index(ply_index);
        let i = self.idx(outcome.index(), e, m);
        self.counts[i] += 1;
    }

    /// Count every ply of a game. Returns false (and records nothing) if any
    /// ply is still unevaluated.
    pub fn record_game(&mut self, game: &Game, eval_scale: f64) -> bool {
        let Some(evals) = game.evals_as_pawns(eval_scale) else {
            return false;
        };
        for (i, eval) in evals.into_iter().enumerate() {
            self.record_ply(game.outcome, eval, i);
        }
        true
    }

    /// Total samples in one (eval, move) cell across all three outcomes.
    fn cell_samples(&self, eval_cell: usize, move_cell: usize) -> u64 {
        (0..3).map(|o| self.counts[self.idx(o, eval_cell, move_cell)]).sum()
    }

    /// Normalize to percentages and smooth each move-bin slice.
    ///
    /// Never fails: sparse slices degenerate to their defined fallbacks
    /// (uniform thirds for an unbucketed table, a step at evaluation zero
    /// otherwise).
    pub fn build(self, min_samples: u64) -> WinChanceTable {
        let e_cells = self.eval_bins.cell_count();
        let m_cells = self.move_bins.cell_count();
        let xs = self.eval_bins.cell_positions();
        let fallback = match &self.move_bins {
            MoveBins::All => SliceFallback::Uniform,
            MoveBins::Edges(_) => SliceFallback::StepAtZero,
        };

        let mut win = vec![0.0; e_cells * m_cells];
        let mut draw = vec![0.0; e_cells * m_cells];
        let mut loss = vec![0.0; e_cells * m_cells];
        let mut samples = vec![0u64; e_cells * m_cells];

        for m in 0..m_cells {
            let mut slice_win = vec![0.0; e_cells];
            let mut slice_draw = vec![0.0; e_cells];
            let mut slice_loss = vec![0.0; e_cells];
            let mut slice_counts = vec![0u64; e_cells];
            for e in 0..e_cells {
                let total = self.cell_samples(e, m);
                slice_counts[e] = total;
                if total > 0 {
                    let pct = |o: usize| {
                        self.counts[self.idx(o, e, m)] as f64 / total as f64 * 100.0
                    };
                    slice_win[e] = pct(0);
                    slice_draw[e] = pct(1);
                    slice_loss[e] = pct(2);
                }
            }

            smooth_slice(
                &mut slice_win,
                &mut slice_draw,
                &mut slice_loss,
                &slice_counts,
                &xs,
                min_samples,
                fallback,
            );

            for e in 0..e_cells {
                win[e * m_cells + m] = slice_win[e];
                draw[e * m_cells + m] = slice_draw[e];
                loss[e * m_cells + m] = slice_loss[e];
                samples[e * m_cells + m] = slice_counts[e];
            }
        }

        WinChanceTable {
            eval_bins: self.eval_bins,
            move_bins: self.move_bins,
            win,
            draw,
            loss,
            samples,
        }
    }
}

/// The built probability table. Immutable after construction; lookups are
/// pure reads.
#[derive(Debug, Clone)]
pub struct WinChanceTable {
    eval_bins: EvalBins,
    move_bins: MoveBins,
    /// Flattened `[eval cell][move cell]` percentages.
    win: Vec<f64>,
    draw: Vec<f64>,
    loss: Vec<f64>,
    samples: Vec<u64>,
}

impl WinChanceTable {
    pub(crate) fn from_parts(
        eval_bins: EvalBins,
        move_bins: MoveBins,
        win: Vec<f64>,
        draw: Vec<f64>,
        loss: Vec<f64>,
        samples: Vec<u64>,
    ) -> Self {
        Self { eval_bins, move_bins, win, draw, loss, samples }
    }

    pub fn eval_bins(&self) -> &EvalBins {
        &self.eval_bins
    }

    pub fn move_bins(&self) -> &MoveBins {
        &self.move_bins
    }

    fn idx(&self, eval_pawns: f64, ply_index: usize) -> usize {
        let e = self.eval_bins.index(eval_pawns);
        let m = self.move_bins.index(ply_index);
        e * self.move_bins.cell_count() + m
    }

    pub fn win_pct(&self, eval_pawns: f64, ply_index: usize) -> f64 {
        self.win[self.idx(eval_pawns, ply_index)]
    }

    pub fn draw_pct(&self, eval_pawns: f64, ply_index: usize) -> f64 {
        self.draw[self.idx(eval_pawns, ply_index)]
    }

    pub fn loss_pct(&self, eval_pawns: f64, ply_index: usize) -> f64 {
        self.loss[self.idx(eval_pawns, ply_index)]
    }

    /// Per-cell values of one move-bin slice, in evaluation-bin order:
    /// (win, draw, loss, samples).
    pub fn move_slice(&self, move_cell: usize) -> Vec<(f64, f64, f64, u64)> {
        let m_cells = self.move_bins.cell_count();
        (0..self.eval_bins.cell_count())
            .map(|e| {
                let i = e * m_cells + move_cell;
                (self.win[i], self.draw[i], self.loss[i], self.samples[i])
            })
            .collect()
    }
}
