//! Per-game transform pipeline.
//!
//! Transforms compute derived fields from a scanned game or veto it
//! entirely. They run in registration order; the first rejection aborts the
//! game (not the scan).

use crate::game::{FieldValue, Game, PlayerColor};

/// A transform's veto. Carries the reason for logging only.
#[derive(Debug, Clone)]
pub struct Rejected(pub String);

pub type FieldSet = Vec<(String, FieldValue)>;

pub trait Transform: Send + Sync {
    fn apply(&self, game: &Game) -> Result<FieldSet, Rejected>;
}

#[derive(Default)]
pub struct TransformPipeline {
    steps: Vec<Box<dyn Transform>>,
}

impl TransformPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, transform: impl Transform + 'static) -> Self {
        self.steps.push(Box::new(transform));
        self
    }

    /// Run every transform over `game`, appending derived fields in order.
    pub fn run(&self, game: &mut Game) -> Result<(), Rejected> {
        for step in &self.steps {
            let fields = step.apply(game)?;
            game.derived.extend(fields);
        }
        Ok(())
    }
}

/// Move counts per side and in total.
pub struct MoveTotals;

impl Transform for MoveTotals {
    fn apply(&self, game: &Game) -> Result<FieldSet, Rejected> {
        let white = game.plies.iter().step_by(2).count() as i64;
        let black = game.plies.len() as i64 - white;
        Ok(vec![
            ("MovesWhite".into(), FieldValue::Int(white)),
            ("MovesBlack".into(), FieldValue::Int(black)),
            ("MovesAll".into(), FieldValue::Int(game.plies.len() as i64)),
        ])
    }
}

/// Mean post-move evaluation per side. Sides with no evaluated moves get the
/// -100 marker value so downstream filters can drop them.
pub struct SideAvgEvaluation {
    pub scale: f64,
}

impl SideAvgEvaluation {
    fn side_mean(&self, game: &Game, color: PlayerColor) -> f64 {
        let mut sum = 0.0;
        let mut count = 0u32;
        for (i, ply) in game.plies.iter().enumerate() {
            if PlayerColor::of_ply(i) != color {
                continue;
            }
            if let Some(eval) = ply.eval {
                sum += eval.as_pawns(self.scale);
                count += 1;
            }
        }
        if count == 0 {
            -100.0
        } else {
            sum / count as f64
        }
    }
}

impl Transform for SideAvgEvaluation {
    fn apply(&self, game: &Game) -> Result<FieldSet, Rejected> {
        Ok(vec![
            (
                "WhiteAvgEvaluation".into(),
                FieldValue::Float(self.side_mean(game, PlayerColor::White)),
            ),
            (
                "BlackAvgEvaluation".into(),
                FieldValue::Float(self.side_mean(game, PlayerColor::Black)),
            ),
        ])
    }
}

/// Reject games shorter than a minimum ply count.
pub struct MinPlies(pub usize);

impl Transform for MinPlies {
    fn apply(&self, game: &Game) -> Result<FieldSet, Rejected> {
        if game.plies.len() < self.0 {
            Err(Rejected(format!(
                "only {} plies, need {}",
                game.plies.len(),
                self.0
            )))
        } else {
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::Eval;
    use crate::game::{Outcome, PlayerInfo, Ply};

    fn game_with_evals(evals: &[f64]) -> Game {
        Game {
            id: 7,
            white: PlayerInfo { name: "W".into(), elo: None, fide_id: 10 },
            black: PlayerInfo { name: "B".into(), elo: None, fide_id: 11 },
            year: None,
            opening: String::new(),
            variation: String::new(),
            outcome: Outcome::Win,
            plies: evals
                .iter()
                .enumerate()
                .map(|(i, &e)| Ply {
                    number: i as u32 + 1,
                    san: "e4".into(),
                    eval: Some(Eval::Pawns(e)),
                    cp_loss: None,
                })
                .collect(),
            derived: Vec::new(),
        }
    }

    #[test]
    fn test_move_totals() {
        let mut game = game_with_evals(&[0.1, 0.2, 0.3]);
        TransformPipeline::new().with(MoveTotals).run(&mut game).unwrap();
        assert_eq!(game.derived_field("MovesWhite"), Some(&FieldValue::Int(2)));
        assert_eq!(game.derived_field("MovesBlack"), Some(&FieldValue::Int(1)));
        assert_eq!(game.derived_field("MovesAll"), Some(&FieldValue::Int(3)));
    }

    #[test]
    fn test_side_avg_evaluation() {
        let mut game = game_with_evals(&[1.0, -1.0, 3.0, -3.0]);
        TransformPipeline::new()
            .with(SideAvgEvaluation { scale: 20.0 })
            .run(&mut game)
            .unwrap();
        assert_eq!(
            game.derived_field("WhiteAvgEvaluation"),
            Some(&FieldValue::Float(2.0))
        );
        assert_eq!(
            game.derived_field("BlackAvgEvaluation"),
            Some(&FieldValue::Float(-2.0))
        );
    }

    #[test]
    fn test_min_plies_rejects() {
        let mut game = game_with_evals(&[0.1]);
        let result = TransformPipeline::new().with(MinPlies(2)).run(&mut game);
        assert!(result.is_err());
    }
}
