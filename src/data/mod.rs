//! Flat-file loaders for the three input tables.
//!
//! Every loader reads a headed CSV file in full, checks that the columns it
//! needs are present, and parses each row. Any problem is a [`LoadError`]:
//! the dashboard cannot be built from partial inputs, so callers abort.

use csv::StringRecord;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

pub mod models;
use models::*;

/// Strings that mark an unplayed puzzle in the `Fails` column.
const NULL_MARKERS: [&str; 4] = ["NA", "NaN", "null", "None"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("{path}: missing column `{column}` (available: {available:?})")]
    MissingColumn {
        path: String,
        column: String,
        available: Vec<String>,
    },

    #[error("{path}:{line}: {message}")]
    Malformed {
        path: String,
        line: u64,
        message: String,
    },

    #[error("{path}: player `{name}` has more prediction rows than known difficulties")]
    ExtraPredictions { path: String, name: String },
}

/// A fully read CSV file with its header index.
struct CsvTable {
    path: String,
    columns: HashMap<String, usize>,
    available: Vec<String>,
    rows: Vec<StringRecord>,
}

impl CsvTable {
    fn read(path: &Path) -> Result<Self, LoadError> {
        let path_str = path.display().to_string();
        let read_err = |source: csv::Error| LoadError::Read {
            path: path_str.clone(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(path)
            .map_err(read_err)?;
        let headers = reader.headers().map_err(read_err)?.clone();
        let rows = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(read_err)?;

        let available: Vec<String> = headers.iter().map(str::to_string).collect();
        let columns = available
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), i))
            .collect();
        debug!("Read {} rows from {}", rows.len(), path_str);

        let table = CsvTable {
            path: path_str,
            columns,
            available,
            rows,
        };
        if let Some(row) = table.rows.iter().find(|r| r.len() != table.available.len()) {
            return Err(table.malformed(
                row,
                format!("expected {} fields, found {}", table.available.len(), row.len()),
            ));
        }
        Ok(table)
    }

    fn require(&self, column: &str) -> Result<usize, LoadError> {
        self.optional(column).ok_or_else(|| LoadError::MissingColumn {
            path: self.path.clone(),
            column: column.to_string(),
            available: self.available.clone(),
        })
    }

    fn optional(&self, column: &str) -> Option<usize> {
        self.columns.get(column).copied()
    }

    fn malformed(&self, row: &StringRecord, message: String) -> LoadError {
        LoadError::Malformed {
            path: self.path.clone(),
            line: row.position().map(|p| p.line()).unwrap_or(0),
            message,
        }
    }

    /// Field `idx` of `row`; every row has one field per header.
    fn field<'r>(row: &'r StringRecord, idx: usize) -> &'r str {
        &row[idx]
    }
}

/// Load outcome records (`Name`, `PuzzleNum`, `Fails`, `Difficulty`).
pub fn load_outcomes(path: &Path) -> Result<Vec<OutcomeRecord>, LoadError> {
    let table = CsvTable::read(path)?;
    let name = table.require("Name")?;
    let puzzle = table.require("PuzzleNum")?;
    let fails_col = table.require("Fails")?;
    let difficulty = table.require("Difficulty")?;

    let mut records = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let puzzle_num = parse_count(CsvTable::field(row, puzzle))
            .map_err(|m| table.malformed(row, format!("PuzzleNum: {m}")))?;
        let fails = parse_fails(CsvTable::field(row, fails_col))
            .map_err(|m| table.malformed(row, format!("Fails: {m}")))?;
        records.push(OutcomeRecord {
            name: CsvTable::field(row, name).to_string(),
            puzzle_num,
            fails,
            difficulty: Difficulty::from(CsvTable::field(row, difficulty)),
        });
    }

    info!("Loaded {} outcome records from {}", records.len(), table.path);
    Ok(records)
}

/// Load point predictions (`Name`, `prediction`, optional `Difficulty`).
///
/// Without a `Difficulty` column each player's rows are taken in file order
/// as Easy then Hard.
pub fn load_predictions(path: &Path) -> Result<Vec<Prediction>, LoadError> {
    let table = CsvTable::read(path)?;
    let name = table.require("Name")?;
    let value = table.require("prediction")?;
    let difficulty = table.optional("Difficulty");

    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut predictions = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let player = CsvTable::field(row, name).to_string();
        let prediction = parse_float(CsvTable::field(row, value))
            .map_err(|m| table.malformed(row, format!("prediction: {m}")))?;

        let difficulty = match difficulty {
            Some(idx) => Difficulty::from(CsvTable::field(row, idx)),
            None => {
                let nth = seen.entry(player.clone()).or_insert(0);
                let d = Difficulty::IMPLICIT_ORDER.get(*nth).cloned().ok_or_else(|| {
                    LoadError::ExtraPredictions {
                        path: table.path.clone(),
                        name: player.clone(),
                    }
                })?;
                *nth += 1;
                d
            }
        };

        predictions.push(Prediction {
            name: player,
            difficulty,
            prediction,
        });
    }

    info!("Loaded {} predictions from {}", predictions.len(), table.path);
    Ok(predictions)
}

/// Load the model's predicted distribution (`Name`, `Difficulty`, `Fails`, `Density`).
pub fn load_model_output(path: &Path) -> Result<Vec<DensityPoint>, LoadError> {
    let table = CsvTable::read(path)?;
    let name = table.require("Name")?;
    let difficulty = table.require("Difficulty")?;
    let fails_col = table.require("Fails")?;
    let density_col = table.require("Density")?;

    let mut points = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let fails = parse_count(CsvTable::field(row, fails_col))
            .map_err(|m| table.malformed(row, format!("Fails: {m}")))?;
        let density = parse_float(CsvTable::field(row, density_col))
            .map_err(|m| table.malformed(row, format!("Density: {m}")))?;
        points.push(DensityPoint {
            name: CsvTable::field(row, name).to_string(),
            difficulty: Difficulty::from(CsvTable::field(row, difficulty)),
            fails,
            density,
        });
    }

    info!("Loaded {} density points from {}", points.len(), table.path);
    Ok(points)
}

// ── Field parsers ─────────────────────────────────────────────────────────────

fn parse_float(raw: &str) -> Result<f64, String> {
    let v: f64 = raw
        .parse()
        .map_err(|_| format!("`{raw}` is not a number"))?;
    if !v.is_finite() {
        return Err(format!("`{raw}` is not finite"));
    }
    Ok(v)
}

/// Non-negative integer, accepting integral floats like `3.0`.
fn parse_count(raw: &str) -> Result<u32, String> {
    let v = parse_float(raw)?;
    if v < 0.0 || v.fract() != 0.0 || v > u32::MAX as f64 {
        return Err(format!("`{raw}` is not a non-negative integer"));
    }
    Ok(v as u32)
}

fn parse_fails(raw: &str) -> Result<Option<u32>, String> {
    if raw.is_empty() || NULL_MARKERS.iter().any(|m| raw.eq_ignore_ascii_case(m)) {
        return Ok(None);
    }
    parse_count(raw).map(Some)
}
