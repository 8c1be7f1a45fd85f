use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use corpus_core::{Eval, Game, Outcome, PlayerInfo, Ply};

/// Generate a unique suffix based on timestamp to avoid collisions.
pub fn unique_suffix() -> String {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}", ts % 1_000_000_000_000)
}

/// Create a fresh scratch directory under the system temp dir.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("wcl_{name}_{}", unique_suffix()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Build a fully evaluated game with the given post-move evaluations.
pub fn make_game(id: u64, result: &str, evals: &[f64]) -> Game {
    Game {
        id,
        white: PlayerInfo {
            name: format!("White{id}"),
            elo: Some(2400),
            fide_id: 1_000_000 + id,
        },
        black: PlayerInfo {
            name: format!("Black{id}"),
            elo: Some(2380),
            fide_id: 2_000_000 + id,
        },
        year: Some(2024),
        opening: "Sicilian".into(),
        variation: "Najdorf".into(),
        outcome: Outcome::from_result(result).expect("fixture results must be decided"),
        plies: evals
            .iter()
            .enumerate()
            .map(|(i, &e)| Ply {
                number: i as u32 + 1,
                san: if i % 2 == 0 { "e4".into() } else { "e5".into() },
                eval: Some(Eval::Pawns(e)),
                cp_loss: Some(0),
            })
            .collect(),
        derived: Vec::new(),
    }
}

/// A small training corpus with clean monotone structure: winners drift up,
/// losers drift down, draws hover near zero. Enough games that the central
/// evaluation cells are well-sampled.
pub fn training_corpus(games_per_class: usize, plies: usize) -> Vec<Game> {
    let mut games = Vec::new();
    let mut id = 1u64;
    for i in 0..games_per_class {
        let spread = 1.0 + (i % 5) as f64 * 0.5;
        let win: Vec<f64> = (0..plies)
            .map(|p| spread * (p + 1) as f64 / plies as f64)
            .collect();
        let loss: Vec<f64> = win.iter().map(|e| -e).collect();
        let draw: Vec<f64> = (0..plies)
            .map(|p| if p % 2 == 0 { 0.1 } else { -0.1 })
            .collect();
        games.push(make_game(id, "1-0", &win));
        games.push(make_game(id + 1, "0-1", &loss));
        games.push(make_game(id + 2, "1/2-1/2", &draw));
        id += 3;
    }
    games
}
