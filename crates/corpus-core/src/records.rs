//! Flat per-move record streams and the two serializer variants.
//!
//! A record file carries one row per move with game metadata replicated on
//! the first row of each game, and one blank separator row after each game.
//! Both output shapes (move-wise and game-wise) serialize the same in-memory
//! `Game`, so consumers never have to re-scan to switch shapes.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::{FieldValue, Game};

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// One raw row of a per-move record file. Every field is a string so blank
/// separator rows and metadata-free continuation rows deserialize cleanly.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MoveRow {
    #[serde(rename = "GameID")]
    pub game_id: String,
    #[serde(rename = "WhiteName")]
    pub white_name: String,
    #[serde(rename = "WhiteElo")]
    pub white_elo: String,
    #[serde(rename = "BlackName")]
    pub black_name: String,
    #[serde(rename = "BlackElo")]
    pub black_elo: String,
    #[serde(rename = "WhiteFideId")]
    pub white_fide_id: String,
    #[serde(rename = "BlackFideId")]
    pub black_fide_id: String,
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "Opening")]
    pub opening: String,
    #[serde(rename = "Variation")]
    pub variation: String,
    #[serde(rename = "Result")]
    pub result: String,
    #[serde(rename = "MoveNumber")]
    pub move_number: String,
    #[serde(rename = "Move")]
    pub san: String,
    #[serde(rename = "Evaluation")]
    pub evaluation: String,
    #[serde(rename = "CPL", default)]
    pub cp_loss: String,
}

impl MoveRow {
    /// Blank rows separate games in the record stream.
    pub fn is_separator(&self) -> bool {
        self.game_id.is_empty() && self.move_number.is_empty() && self.san.is_empty()
    }
}

/// Read every row of a record file.
pub fn read_move_rows(path: impl AsRef<Path>) -> Result<Vec<MoveRow>, RecordError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path.as_ref())?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

fn metadata_cells(game: &Game) -> [String; 11] {
    [
        game.id.to_string(),
        game.white.name.clone(),
        game.white.elo.map(|e| e.to_string()).unwrap_or_default(),
        game.black.name.clone(),
        game.black.elo.map(|e| e.to_string()).unwrap_or_default(),
        game.white.fide_id.to_string(),
        game.black.fide_id.to_string(),
        game.year.map(|y| y.to_string()).unwrap_or_default(),
        game.opening.clone(),
        game.variation.clone(),
        game.outcome.as_result().to_string(),
    ]
}

const MOVE_WISE_HEADER: [&str; 15] = [
    "GameID",
    "WhiteName",
    "WhiteElo",
    "BlackName",
    "BlackElo",
    "WhiteFideId",
    "BlackFideId",
    "Year",
    "Opening",
    "Variation",
    "Result",
    "MoveNumber",
    "Move",
    "Evaluation",
    "CPL",
];

/// Move-wise serializer: one row per ply, metadata on the first row of each
/// game only, blank separator row after each game.
pub fn write_move_wise(path: impl AsRef<Path>, games: &[Game]) -> Result<(), RecordError> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    writer.write_record(MOVE_WISE_HEADER)?;
    for game in games {
        let meta = metadata_cells(game);
        for (i, ply) in game.plies.iter().enumerate() {
            let mut record: Vec<String> = if i == 0 {
                meta.to_vec()
            } else {
                // The game id repeats on every row so the scanner can find
                // run boundaries; the rest of the metadata does not.
                let mut cells = vec![String::new(); 11];
                cells[0] = game.id.to_string();
                cells
            };
            record.push(ply.number.to_string());
            record.push(ply.san.clone());
            record.push(ply.eval.map(|e| e.token()).unwrap_or_default());
            record.push(ply.cp_loss.map(|c| c.to_string()).unwrap_or_default());
            writer.write_record(&record)?;
        }
        writer.write_record(vec![""; MOVE_WISE_HEADER.len()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Game-wise serializer: one row per game with metadata plus every derived
/// field from the transform pipeline. All games in one file must share a
/// pipeline, so the derived columns of the first game define the header.
pub fn write_game_wise(path: impl AsRef<Path>, games: &[Game]) -> Result<(), RecordError> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;

    let derived_names: Vec<&str> = games
        .first()
        .map(|g| g.derived.iter().map(|(n, _)| n.as_str()).collect())
        .unwrap_or_default();
    let mut header: Vec<&str> = MOVE_WISE_HEADER[..11].to_vec();
    header.extend(&derived_names);
    writer.write_record(&header)?;

    for game in games {
        let mut record: Vec<String> = metadata_cells(game).to_vec();
        for name in &derived_names {
            let cell = game
                .derived_field(name)
                .map(FieldValue::to_cell)
                .unwrap_or_default();
            record.push(cell);
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
