//! Table persistence: one CSV per move-bin slice.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bins::{EvalBins, MoveBins};
use crate::error::ModelError;
use crate::table::WinChanceTable;

#[derive(Debug, Serialize, Deserialize)]
struct TableRow {
    #[serde(rename = "Interval")]
    interval: String,
    #[serde(rename = "WinningChance")]
    win: f64,
    #[serde(rename = "DrawingChance")]
    draw: f64,
    #[serde(rename = "LosingChance")]
    loss: f64,
    #[serde(rename = "TotalGames")]
    samples: u64,
}

/// Write every move-bin slice of a built table into `dir`.
pub fn write_tables(dir: impl AsRef<Path>, table: &WinChanceTable) -> Result<(), ModelError> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    let labels = table.eval_bins().labels();

    for (move_cell, name) in table.move_bins().file_names().into_iter().enumerate() {
        let mut writer = csv::Writer::from_path(dir.join(&name))?;
        for (label, (win, draw, loss, samples)) in
            labels.iter().zip(table.move_slice(move_cell))
        {
            writer.serialize(TableRow {
                interval: label.clone(),
                win,
                draw,
                loss,
                samples,
            })?;
        }
        writer.flush()?;
    }
    Ok(())
}

/// Reassemble a lookup table from a directory written by [`write_tables`].
///
/// The evaluation bins are recovered from the interval labels of the first
/// slice file; every slice must agree on them.
pub fn read_tables(dir: impl AsRef<Path>, move_bins: MoveBins) -> Result<WinChanceTable, ModelError> {
    let dir = dir.as_ref();
    let names = move_bins.file_names();
    let m_cells = move_bins.cell_count();
    if names.is_empty() {
        return Err(ModelError::Table {
            file: dir.display().to_string(),
            reason: "move partition has no bins".into(),
        });
    }

    let mut slices: Vec<Vec<TableRow>> = Vec::with_capacity(names.len());
    for name in &names {
        let mut reader = csv::Reader::from_path(dir.join(name)).map_err(|e| ModelError::Table {
            file: name.clone(),
            reason: e.to_string(),
        })?;
        let rows: Vec<TableRow> = reader
            .deserialize()
            .collect::<Result<_, csv::Error>>()
            .map_err(|e| ModelError::Table {
                file: name.clone(),
                reason: e.to_string(),
            })?;
        slices.push(rows);
    }

    // every slice must agree on the evaluation bins of the first one
    let labels: Vec<&str> = slices[0].iter().map(|r| r.interval.as_str()).collect();
    let eval_bins = EvalBins::from_labels(&labels)?;
    let e_cells = eval_bins.cell_count();

    let mut win = vec![0.0; e_cells * m_cells];
    let mut draw = vec![0.0; e_cells * m_cells];
    let mut loss = vec![0.0; e_cells * m_cells];
    let mut samples = vec![0u64; e_cells * m_cells];

    for (move_cell, rows) in slices.into_iter().enumerate() {
        if rows.len() != e_cells {
            return Err(ModelError::Table {
                file: names[move_cell].clone(),
                reason: format!("expected {e_cells} evaluation cells, found {}", rows.len()),
            });
        }
        for (e, row) in rows.into_iter().enumerate() {
            let i = e * m_cells + move_cell;
            win[i] = row.win;
            draw[i] = row.draw;
            loss[i] = row.loss;
            samples[i] = row.samples;
        }
    }

    Ok(WinChanceTable::from_parts(
        eval_bins, move_bins, win, draw, loss, samples,
    ))
}
