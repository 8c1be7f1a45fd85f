//! Integration test: the full scan → split → table → mistake-report chain
//! over a fixture corpus, plus checkpoint-based batch resumption.

mod common;

use corpus_core::records::{read_move_rows, write_move_wise};
use corpus_core::{PlayerColor, Scanner};

use eval_worker::manifest::Manifest;

use win_model::accuracy::game_accuracy;
use win_model::bins::{EvalBins, MoveBins};
use win_model::mistakes::{
    mistake_summary, write_mistake_table, MistakeConfig, MistakeReportRow,
};
use win_model::split::partition;
use win_model::store::{read_tables, write_tables};
use win_model::OutcomeCounts;

#[test]
fn test_corpus_to_report_chain() {
    let dir = common::scratch_dir("chain");
    let corpus_path = dir.join("twic9000_16_analyzed.csv");
    write_move_wise(&corpus_path, &common::training_corpus(120, 10)).unwrap();

    // scan
    let rows = read_move_rows(&corpus_path).unwrap();
    let (games, rejected) = Scanner::default().scan_all_counted(&rows);
    assert_eq!(rejected, 0);
    assert_eq!(games.len(), 360);

    // split deterministically, train on the training partition only
    let (train, test) = partition(&games, "twic9000", 0.8);
    assert_eq!(train.len() + test.len(), games.len());
    assert!(!test.is_empty());

    let bins = EvalBins::new(vec![-2.0, -1.0, -0.5, 0.0, 0.5, 1.0, 2.0]).unwrap();
    let mut counts = OutcomeCounts::new(bins, MoveBins::All);
    for game in &train {
        assert!(counts.record_game(game, 20.0));
    }
    let table = counts.build(100);

    // persist and reload the table before lookups
    let tables_dir = dir.join("tables");
    write_tables(&tables_dir, &table).unwrap();
    let table = read_tables(&tables_dir, MoveBins::All).unwrap();

    // mistake report over the whole corpus
    let config = MistakeConfig::default();
    let mut report_rows = Vec::new();
    for game in &games {
        let summary = mistake_summary(game, &table, &config, 20.0).unwrap();
        let accuracy = game_accuracy(&game.evals_as_pawns(20.0).unwrap());
        for color in [PlayerColor::White, PlayerColor::Black] {
            report_rows.push(MistakeReportRow {
                game,
                color,
                mistakes: summary.for_color(color).clone(),
                accuracy: Some(accuracy.for_color(color)),
            });
        }
    }
    let report_path = dir.join("mistakes_by_player.csv");
    write_mistake_table(&report_path, &report_rows, &config.severity_edges).unwrap();

    let text = std::fs::read_to_string(&report_path).unwrap();
    std::fs::remove_dir_all(&dir).unwrap();

    let lines: Vec<&str> = text.lines().collect();
    // header + two rows per game
    assert_eq!(lines.len(), 1 + games.len() * 2);
    assert!(lines[0].starts_with("GameID,Player,Name"));
    assert!(lines[0].contains("(70,100]"));
    assert!(lines[1].contains(",White,"));
    assert!(lines[2].contains(",Black,"));
}

#[test]
fn test_skip_if_processed_round_trip() {
    let dir = common::scratch_dir("resume");
    let out_path = dir.join("twic9001_16_analyzed.csv");
    let manifest_path = dir.join("manifest.json");

    // first run: write the output, record the unit
    write_move_wise(&out_path, &common::training_corpus(5, 6)).unwrap();
    let mut manifest = Manifest::load(&manifest_path).unwrap();
    assert!(!manifest.is_complete("twic9001"));
    manifest.mark_complete("twic9001");
    manifest.save(&manifest_path).unwrap();
    let first_bytes = std::fs::read(&out_path).unwrap();

    // second run: the manifest says the unit is done, so nothing is
    // rescheduled and the output is untouched
    let manifest = Manifest::load(&manifest_path).unwrap();
    let mut processed = 0usize;
    for unit in ["twic9001"] {
        if manifest.is_complete(unit) {
            continue;
        }
        processed += 1;
    }
    assert_eq!(processed, 0);

    let second_bytes = std::fs::read(&out_path).unwrap();
    std::fs::remove_dir_all(&dir).unwrap();
    assert_eq!(first_bytes, second_bytes, "outputs must be byte-identical");
}

#[test]
fn test_split_partition_is_stable_across_runs() {
    let games = common::training_corpus(20, 6);
    let (train_a, _) = partition(&games, "source.csv", 0.8);
    let (train_b, _) = partition(&games, "source.csv", 0.8);
    let ids_a: Vec<u64> = train_a.iter().map(|g| g.id).collect();
    let ids_b: Vec<u64> = train_b.iter().map(|g| g.id).collect();
    assert_eq!(ids_a, ids_b);
}
