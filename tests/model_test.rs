//! Integration tests: outcome-table construction, smoothing invariants, and
//! the mistake metric engine over a synthetic corpus.

mod common;

use win_model::bins::{EvalBins, MoveBins};
use win_model::mistakes::{chance_deltas, mistake_summary, MistakeConfig};
use win_model::store::{read_tables, write_tables};
use win_model::{OutcomeCounts, WinChanceTable};

fn coarse_bins() -> EvalBins {
    EvalBins::new(vec![-2.0, -1.0, -0.5, 0.0, 0.5, 1.0, 2.0]).unwrap()
}

fn built_table() -> WinChanceTable {
    let games = common::training_corpus(120, 10);
    let mut counts = OutcomeCounts::new(coarse_bins(), MoveBins::All);
    for game in &games {
        assert!(counts.record_game(game, 20.0));
    }
    counts.build(100)
}

#[test]
fn test_probabilities_sum_to_100() {
    let table = built_table();
    for (win, draw, loss, _) in table.move_slice(0) {
        let sum = win + draw + loss;
        assert!((sum - 100.0).abs() < 1e-6, "row sums to {sum}");
    }
}

#[test]
fn test_win_monotone_loss_antitone() {
    let table = built_table();
    let slice = table.move_slice(0);
    for pair in slice.windows(2) {
        assert!(
            pair[1].0 >= pair[0].0 - 1e-9,
            "win% decreased: {} -> {}",
            pair[0].0,
            pair[1].0
        );
        assert!(
            pair[1].2 <= pair[0].2 + 1e-9,
            "loss% increased: {} -> {}",
            pair[0].2,
            pair[1].2
        );
    }
}

#[test]
fn test_store_round_trip_is_lossless() {
    let table = built_table();
    let dir = common::scratch_dir("store");
    write_tables(&dir, &table).unwrap();
    let reloaded = read_tables(&dir, MoveBins::All).unwrap();
    std::fs::remove_dir_all(&dir).unwrap();

    assert_eq!(reloaded.eval_bins(), table.eval_bins());
    for (a, b) in table.move_slice(0).iter().zip(reloaded.move_slice(0)) {
        assert!((a.0 - b.0).abs() < 1e-12);
        assert!((a.2 - b.2).abs() < 1e-12);
        assert_eq!(a.3, b.3);
    }
}

#[test]
fn test_two_move_game_scenario() {
    // "1. e4 e5" with post-move evaluations [+0.3, +0.2], over a table whose
    // bin edges put the two evaluations in different cells
    let bins = EvalBins::new(vec![-0.25, 0.0, 0.25, 0.5]).unwrap();
    let mut counts = OutcomeCounts::new(bins, MoveBins::All);
    for game in common::training_corpus(120, 10) {
        counts.record_game(&game, 20.0);
    }
    let table = counts.build(100);
    let deltas = chance_deltas(&[0.3, 0.2], &table);
    assert_eq!(deltas.len(), 2);

    // White's move 1 is fixed at zero by convention
    assert_eq!(deltas[0].wcl, 0.0);
    assert_eq!(deltas[0].lcl, 0.0);

    // Black's reply is the lookup delta between the two cells
    let expected_wcl = (table.win_pct(0.2, 1) - table.win_pct(0.3, 0)).abs();
    let expected_lcl = (table.loss_pct(0.2, 1) - table.loss_pct(0.3, 0)).abs();
    assert!((deltas[1].wcl - expected_wcl).abs() < 1e-12);
    assert!((deltas[1].lcl - expected_lcl).abs() < 1e-12);
    assert!(deltas[1].wcl > 0.0, "the cells must actually differ");
}

#[test]
fn test_mistake_engine_idempotent() {
    let table = built_table();
    let game = common::make_game(99, "1-0", &[0.3, -0.4, 1.2, -1.5, 2.5, 2.4, 2.6, 2.5]);
    let config = MistakeConfig::default();

    let first = mistake_summary(&game, &table, &config, 20.0).unwrap();
    let second = mistake_summary(&game, &table, &config, 20.0).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_bucketed_table_lookup_uses_move_bin() {
    let games = common::training_corpus(200, 12);
    let move_bins = MoveBins::stride(4, 12).unwrap();
    let mut counts = OutcomeCounts::new(coarse_bins(), move_bins);
    for game in &games {
        counts.record_game(game, 20.0);
    }
    let table = counts.build(100);

    // same evaluation, different game phase: distinct cells may differ, and
    // each slice still satisfies the sum invariant
    for m in 0..3 {
        for (win, draw, loss, _) in table.move_slice(m) {
            assert!((win + draw + loss - 100.0).abs() < 1e-6);
        }
    }
    let early = table.win_pct(0.75, 0);
    let late = table.win_pct(0.75, 11);
    assert!(early.is_finite() && late.is_finite());
}
