//! Position evaluations and the token format used by per-move record files.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default saturation scale, in pawns, for forced-mate evaluations.
pub const DEFAULT_EVAL_SCALE: f64 = 20.0;

#[derive(Debug, Error)]
#[error("unparseable evaluation token: {0:?}")]
pub struct BadEvalToken(pub String);

/// A post-move position evaluation from White's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Eval {
    /// Finite score in pawns.
    Pawns(f64),
    /// Forced mate in N moves: positive when White mates, negative when Black does.
    MateIn(i32),
}

impl Eval {
    /// Numeric value for downstream arithmetic. Mate distances saturate at
    /// `±scale` so every evaluation is an ordinary float.
    pub fn as_pawns(&self, scale: f64) -> f64 {
        match *self {
            Eval::Pawns(v) => v,
            Eval::MateIn(0) => 0.0,
            Eval::MateIn(n) if n > 0 => scale,
            Eval::MateIn(_) => -scale,
        }
    }

    /// Token form used in record files: a plain number, `M3`, or `-M5`.
    pub fn token(&self) -> String {
        match *self {
            Eval::Pawns(v) => format!("{v:.2}"),
            Eval::MateIn(n) if n < 0 => format!("-M{}", -n),
            Eval::MateIn(n) => format!("M{n}"),
        }
    }

    /// Parse an evaluation token from a record stream.
    ///
    /// An empty token means the move has not been evaluated yet. Tokens that
    /// start with `-` but are not numeric saturate to `-scale`; a mate marker
    /// without a minus sign saturates to `+scale` (record sources write mate
    /// distances as `M<n>` / `-M<n>`). Any other unparseable token is an
    /// error, which invalidates the whole game.
    pub fn parse_token(token: &str, scale: f64) -> Result<Option<Eval>, BadEvalToken> {
        let t = token.trim();
        if t.is_empty() {
            return Ok(None);
        }
        if let Ok(v) = t.parse::<f64>() {
            if v.is_finite() {
                return Ok(Some(Eval::Pawns(v)));
            }
            return Err(BadEvalToken(token.to_string()));
        }
        if matches!(t, "M0" | "+M0" | "-M0") {
            return Ok(Some(Eval::MateIn(0)));
        }
        if t.starts_with('-') {
            if let Some(n) = t.strip_prefix("-M").and_then(|r| r.parse::<u32>().ok()) {
                return Ok(Some(Eval::MateIn(-(n as i32))));
            }
            return Ok(Some(Eval::Pawns(-scale)));
        }
        if let Some(rest) = t.strip_prefix("+M").or_else(|| t.strip_prefix('M')) {
            if let Ok(n) = rest.parse::<u32>() {
                return Ok(Some(Eval::MateIn(n as i32)));
            }
            return Ok(Some(Eval::Pawns(scale)));
        }
        Err(BadEvalToken(token.to_string()))
    }
}
