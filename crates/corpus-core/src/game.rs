//! Canonical in-memory game representation shared by the scanner,
//! the evaluation pipeline, and the win-probability model.

use serde::{Deserialize, Serialize};

use crate::eval::Eval;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerColor {
    White,
    Black,
}

impl PlayerColor {
    /// Color of the player who made the ply at `index` (0-based).
    pub fn of_ply(index: usize) -> Self {
        if index % 2 == 0 {
            PlayerColor::White
        } else {
            PlayerColor::Black
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerColor::White => "White",
            PlayerColor::Black => "Black",
        }
    }
}

/// Declared game outcome, from White's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Draw,
    Loss,
}

impl Outcome {
    /// Parse a declared result string. Anything other than the three decided
    /// forms is undecided and yields `None`.
    pub fn from_result(result: &str) -> Option<Self> {
        match result.trim() {
            "1-0" => Some(Outcome::Win),
            "0-1" => Some(Outcome::Loss),
            "1/2-1/2" => Some(Outcome::Draw),
            _ => None,
        }
    }

    pub fn as_result(&self) -> &'static str {
        match self {
            Outcome::Win => "1-0",
            Outcome::Loss => "0-1",
            Outcome::Draw => "1/2-1/2",
        }
    }

    /// Index into the win/draw/loss axis of the outcome tensor.
    pub fn index(&self) -> usize {
        match self {
            Outcome::Win => 0,
            Outcome::Draw => 1,
            Outcome::Loss => 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub name: String,
    pub elo: Option<u32>,
    /// Federation identifier. Required: games without one are rejected by the
    /// scanner (engine accounts and anonymous players have none).
    pub fide_id: u64,
}

/// One half-move of a game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ply {
    /// 1-based move number; odd numbers are White's moves.
    pub number: u32,
    /// Move notation, opaque to the model.
    pub san: String,
    /// Post-move evaluation, White-relative. `None` until the evaluation
    /// pipeline has run over the game.
    pub eval: Option<Eval>,
    /// Centipawn loss of the move, attributed to the mover.
    pub cp_loss: Option<i32>,
}

/// A derived field produced by a transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    pub fn to_cell(&self) -> String {
        match self {
            FieldValue::Int(v) => v.to_string(),
            FieldValue::Float(v) => format!("{v:.2}"),
            FieldValue::Text(v) => v.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    /// Identifier, unique within a source file.
    pub id: u64,
    pub white: PlayerInfo,
    pub black: PlayerInfo,
    pub year: Option<i32>,
    pub opening: String,
    pub variation: String,
    pub outcome: Outcome,
    pub plies: Vec<Ply>,
    /// Ordered extension map filled by the transform pipeline.
    pub derived: Vec<(String, FieldValue)>,
}

impl Game {
    pub fn player(&self, color: PlayerColor) -> &PlayerInfo {
        match color {
            PlayerColor::White => &self.white,
            PlayerColor::Black => &self.black,
        }
    }

    /// All ply evaluations as saturated pawn values, or `None` if any ply is
    /// still unevaluated.
    pub fn evals_as_pawns(&self, scale: f64) -> Option<Vec<f64>> {
        self.plies
            .iter()
            .map(|p| p.eval.map(|e| e.as_pawns(scale)))
            .collect()
    }

    pub fn derived_field(&self, name: &str) -> Option<&FieldValue> {
        self.derived
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}
