//! Game Record Scanner: reconstructs per-game structure from a flat,
//! move-ordered record stream.
//!
//! One `Game` is produced per contiguous run of rows sharing a game id. A
//! rejected game drops that run only; the scan always continues with the
//! next run.

use crate::eval::{Eval, DEFAULT_EVAL_SCALE};
use crate::game::{Game, Outcome, PlayerInfo, Ply};
use crate::records::MoveRow;
use crate::transform::TransformPipeline;

/// Why a game was dropped. Surfaced to callers for logging only; a rejection
/// never aborts the scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    BadGameId(String),
    MissingFideId,
    UndecidedResult,
    NoMoves,
    BadEvalToken(String),
    Transform(String),
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::BadGameId(id) => write!(f, "unparseable game id {id:?}"),
            Rejection::MissingFideId => write!(f, "missing federation id"),
            Rejection::UndecidedResult => write!(f, "undecided result"),
            Rejection::NoMoves => write!(f, "no moves"),
            Rejection::BadEvalToken(t) => write!(f, "bad evaluation token {t:?}"),
            Rejection::Transform(reason) => write!(f, "rejected by transform: {reason}"),
        }
    }
}

pub struct Scanner {
    pipeline: TransformPipeline,
    eval_scale: f64,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(TransformPipeline::new())
    }
}

impl Scanner {
    pub fn new(pipeline: TransformPipeline) -> Self {
        Self { pipeline, eval_scale: DEFAULT_EVAL_SCALE }
    }

    pub fn with_eval_scale(mut self, scale: f64) -> Self {
        self.eval_scale = scale;
        self
    }

    /// Read one game starting at `cursor`.
    ///
    /// Returns the cursor advanced past the run and its trailing separator
    /// row, plus the game or the reason it was dropped. The first row of a
    /// run carries the metadata; later rows repeat only the game id.
    pub fn read_game(
        &self,
        rows: &[MoveRow],
        mut cursor: usize,
    ) -> (usize, Result<Game, Rejection>) {
        while cursor < rows.len() && rows[cursor].is_separator() {
            cursor += 1;
        }
        if cursor >= rows.len() {
            return (cursor, Err(Rejection::NoMoves));
        }

        let first = &rows[cursor];
        let run_id = first.game_id.clone();
        let header = self.parse_header(first);

        let mut plies: Vec<Ply> = Vec::new();
        let mut bad_token: Option<String> = None;
        while cursor < rows.len() && !rows[cursor].is_separator() && rows[cursor].game_id == run_id
        {
            let row = &rows[cursor];
            cursor += 1;
            if bad_token.is_some() {
                continue; // drain the rest of the run
            }
            match Eval::parse_token(&row.evaluation, self.eval_scale) {
                Ok(eval) => plies.push(Ply {
                    number: row
                        .move_number
                        .trim()
                        .parse()
                        .unwrap_or(plies.len() as u32 + 1),
                    san: row.san.clone(),
                    eval,
                    cp_loss: row.cp_loss.trim().parse().ok(),
                }),
                Err(e) => bad_token = Some(e.0),
            }
        }
        // consume the single separator row that closes the run
        if cursor < rows.len() && rows[cursor].is_separator() {
            cursor += 1;
        }

        let (id, white, black) = match header {
            Ok(h) => h,
            Err(rejection) => return (cursor, Err(rejection)),
        };
        if let Some(token) = bad_token {
            return (cursor, Err(Rejection::BadEvalToken(token)));
        }
        let outcome = match Outcome::from_result(&first.result) {
            Some(o) => o,
            None => return (cursor, Err(Rejection::UndecidedResult)),
        };
        if plies.is_empty() {
            return (cursor, Err(Rejection::NoMoves));
        }

        let mut game = Game {
            id,
            white,
            black,
            year: first.year.trim().parse().ok(),
            opening: first.opening.clone(),
            variation: first.variation.clone(),
            outcome,
            plies,
            derived: Vec::new(),
        };
        if let Err(rejected) = self.pipeline.run(&mut game) {
            return (cursor, Err(Rejection::Transform(rejected.0)));
        }
        (cursor, Ok(game))
    }

    /// Scan every game in a row stream, silently dropping rejected games.
    pub fn scan_all(&self, rows: &[MoveRow]) -> Vec<Game> {
        let (games, _) = self.scan_all_counted(rows);
        games
    }

    /// Scan every game, also reporting how many runs were dropped.
    pub fn scan_all_counted(&self, rows: &[MoveRow]) -> (Vec<Game>, usize) {
        let mut games = Vec::new();
        let mut rejected = 0usize;
        let mut cursor = 0usize;
        while cursor < rows.len() {
            if rows[cursor].is_separator() {
                cursor += 1;
                continue;
            }
            let (next, game) = self.read_game(rows, cursor);
            match game {
                Ok(game) => games.push(game),
                Err(_) => rejected += 1,
            }
            debug_assert!(next > cursor);
            cursor = next;
        }
        (games, rejected)
    }

    /// Game id plus both player records; any missing identity field rejects
    /// the game.
    fn parse_header(&self, row: &MoveRow) -> Result<(u64, PlayerInfo, PlayerInfo), Rejection> {
        let id: u64 = row
            .game_id
            .trim()
            .parse()
            .map_err(|_| Rejection::BadGameId(row.game_id.clone()))?;
        let white_fide: u64 = row
            .white_fide_id
            .trim()
            .parse()
            .map_err(|_| Rejection::MissingFideId)?;
        let black_fide: u64 = row
            .black_fide_id
            .trim()
            .parse()
            .map_err(|_| Rejection::MissingFideId)?;
        Ok((
            id,
            PlayerInfo {
                name: row.white_name.clone(),
                elo: row.white_elo.trim().parse().ok(),
                fide_id: white_fide,
            },
            PlayerInfo {
                name: row.black_name.clone(),
                elo: row.black_elo.trim().parse().ok(),
                fide_id: black_fide,
            },
        ))
    }
}
