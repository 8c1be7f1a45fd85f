//! Deterministic train/test partitioning of a scanned corpus.
//!
//! Keyed by a stable hash of (source file, game id) so the same corpus
//! always splits the same way, with no RNG state to persist between runs.

use corpus_core::Game;

/// FNV-1a. Small, stable, and good enough to spread game ids uniformly.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

fn split_key(source: &str, game_id: u64) -> u64 {
    let mut bytes = Vec::with_capacity(source.len() + 9);
    bytes.extend_from_slice(source.as_bytes());
    bytes.push(0xff);
    bytes.extend_from_slice(&game_id.to_le_bytes());
    fnv1a(&bytes)
}

/// True when the game belongs to the training partition.
pub fn is_training(source: &str, game_id: u64, train_fraction: f64) -> bool {
    let bucket = split_key(source, game_id) % 10_000;
    (bucket as f64) < train_fraction * 10_000.0
}

/// Split a file's games into (train, test) by the configured fraction.
pub fn partition<'a>(
    games: &'a [Game],
    source: &str,
    train_fraction: f64,
) -> (Vec<&'a Game>, Vec<&'a Game>) {
    let mut train = Vec::new();
    let mut test = Vec::new();
    for game in games {
        if is_training(source, game.id, train_fraction) {
            train.push(game);
        } else {
            test.push(game);
        }
    }
    (train, test)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_is_deterministic() {
        for id in 0..200 {
            assert_eq!(
                is_training("twic1466", id, 0.8),
                is_training("twic1466", id, 0.8)
            );
        }
    }

    #[test]
    fn test_fraction_roughly_honored() {
        let train = (0..10_000)
            .filter(|&id| is_training("corpus.csv", id, 0.8))
            .count();
        assert!((7_500..8_500).contains(&train), "got {train}");
    }

    #[test]
    fn test_extreme_fractions() {
        assert!((0..100).all(|id| is_training("f", id, 1.0)));
        assert!(!(0..100).any(|id| is_training("f", id, 0.0)));
    }
}
