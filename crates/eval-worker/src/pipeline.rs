//! Per-game evaluation pipeline.
//!
//! For every ply: the score of the best available move, the score of the
//! move actually played (search restricted to it), the centipawn loss
//! between the two, and a White-relative post-move evaluation. A game either
//! produces a complete sequence or nothing: any engine failure discards the
//! whole game so no partial sequence is ever published.

use shakmaty::{fen::Fen, san::San, CastlingMode, Chess, Color, EnPassantMode, Position};

use corpus_core::{Eval, Game};

use crate::error::WorkerError;
use crate::stockfish::{Engine, Score};

/// Engine output for one ply.
#[derive(Debug, Clone)]
pub struct PlyEval {
    /// 1-based move number
    pub number: u32,
    pub san: String,
    pub uci: String,
    /// Best-move score at the search depth, from the mover's perspective
    pub best: Score,
    /// Played-move score at the same depth and perspective
    pub played: Score,
    /// Centipawn loss attributed to the mover
    pub cp_loss: i32,
    /// Post-move evaluation, White-relative
    pub eval: Eval,
}

/// Evaluate every ply of a game at the configured depth.
///
/// Move evaluations within a game are strictly sequential: each search runs
/// on the board state produced by all prior moves.
pub async fn evaluate_game(
    engine: &mut Engine,
    game: &Game,
    depth: u32,
) -> Result<Vec<PlyEval>, WorkerError> {
    let mut pos = Chess::default();
    let mut out = Vec::with_capacity(game.plies.len());

    for (i, ply) in game.plies.iter().enumerate() {
        let san: San = ply.san.parse().map_err(|e| WorkerError::InvalidMove {
            san: ply.san.clone(),
            ply: i,
            reason: format!("{e}"),
        })?;
        let mv = san.to_move(&pos).map_err(|e| WorkerError::InvalidMove {
            san: ply.san.clone(),
            ply: i,
            reason: format!("{e}"),
        })?;
        let uci = mv.to_uci(CastlingMode::Standard).to_string();
        let fen = Fen::from_position(&pos, EnPassantMode::Legal).to_string();
        let mover = pos.turn();

        let best = engine.evaluate(&fen, depth).await?;
        let played = engine.evaluate_move(&fen, &uci, depth).await?;

        out.push(PlyEval {
            number: ply.number,
            san: ply.san.clone(),
            uci,
            best: best.score,
            played: played.score,
            cp_loss: centipawn_loss(best.score, played.score),
            eval: white_relative(played.score, mover),
        });

        pos = pos.play(mv).map_err(|_| WorkerError::InvalidMove {
            san: ply.san.clone(),
            ply: i,
            reason: "illegal move".into(),
        })?;
    }

    Ok(out)
}

/// Centipawn loss of the played move, clamped non-negative.
///
/// A raw difference against a mate distance is meaningless, so the loss is
/// zero unless both scores are finite.
pub fn centipawn_loss(best: Score, played: Score) -> i32 {
    match (best, played) {
        (Score::Cp(b), Score::Cp(p)) => (b - p).max(0),
        _ => 0,
    }
}

/// Convert a mover-relative score to a White-relative evaluation.
///
/// Both searches run on the pre-move position, so their scores are from the
/// mover's perspective — once the move is recorded the side to move is
/// already the opponent. Conversion therefore keys on who moved, never on
/// whose turn it is next.
pub fn white_relative(score: Score, mover: Color) -> Eval {
    match (score, mover) {
        (Score::Cp(c), Color::White) => Eval::Pawns(c as f64 / 100.0),
        (Score::Cp(c), Color::Black) => Eval::Pawns(-(c as f64) / 100.0),
        (Score::Mate(n), Color::White) => Eval::MateIn(n),
        (Score::Mate(n), Color::Black) => Eval::MateIn(-n),
    }
}

/// Merge a finished evaluation sequence back into the scanned game.
pub fn merge_evaluations(game: &mut Game, evals: &[PlyEval]) {
    for (ply, e) in game.plies.iter_mut().zip(evals) {
        ply.eval = Some(e.eval);
        ply.cp_loss = Some(e.cp_loss);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centipawn_loss_clamps_negative() {
        assert_eq!(centipawn_loss(Score::Cp(50), Score::Cp(30)), 20);
        // A played move scoring above "best" at equal depth is search noise
        assert_eq!(centipawn_loss(Score::Cp(30), Score::Cp(50)), 0);
        assert_eq!(centipawn_loss(Score::Cp(0), Score::Cp(0)), 0);
    }

    #[test]
    fn test_centipawn_loss_mate_policy() {
        assert_eq!(centipawn_loss(Score::Mate(3), Score::Cp(500)), 0);
        assert_eq!(centipawn_loss(Score::Cp(500), Score::Mate(-2)), 0);
        assert_eq!(centipawn_loss(Score::Mate(2), Score::Mate(5)), 0);
    }

    #[test]
    fn test_white_relative_sidedness() {
        // A +40cp score for Black as mover is -0.4 pawns for White
        assert_eq!(
            white_relative(Score::Cp(40), Color::Black),
            Eval::Pawns(-0.4)
        );
        assert_eq!(
            white_relative(Score::Cp(40), Color::White),
            Eval::Pawns(0.4)
        );
    }

    #[test]
    fn test_white_relative_mate() {
        assert_eq!(
            white_relative(Score::Mate(3), Color::Black),
            Eval::MateIn(-3)
        );
        assert_eq!(
            white_relative(Score::Mate(-2), Color::Black),
            Eval::MateIn(2)
        );
        assert_eq!(
            white_relative(Score::Mate(4), Color::White),
            Eval::MateIn(4)
        );
    }
}
