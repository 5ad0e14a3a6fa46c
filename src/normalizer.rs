use chrono::Local;

use crate::models::{Cell, CleanTable, Column, ColumnKind, StatsTable};

/// Fields coerced to floating point during cleaning. Anything else keeps
/// its text form.
pub const NUMERIC_COLUMNS: &[&str] = &["PTS", "AST", "TRB", "FG%", "3P%", "FT%", "AGE"];

pub const LAST_UPDATE_COLUMN: &str = "last_update";
pub const SEASON_COLUMN: &str = "season";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Cleans a scraped table: numeric coercion, canonical column names, and
/// capture metadata stamped onto every row.
pub struct Normalizer {
    season: String,
}

impl Normalizer {
    pub fn new(season: impl Into<String>) -> Self {
        Self {
            season: season.into(),
        }
    }

    pub fn clean(&self, table: StatsTable) -> CleanTable {
        if table.is_empty() {
            return CleanTable::default();
        }

        let numeric: Vec<bool> = table
            .headers
            .iter()
            .map(|h| NUMERIC_COLUMNS.contains(&h.as_str()))
            .collect();

        let mut columns: Vec<Column> = table
            .headers
            .iter()
            .zip(&numeric)
            .map(|(header, &is_numeric)| Column {
                name: canonical_name(header),
                kind: if is_numeric {
                    ColumnKind::Real
                } else {
                    ColumnKind::Text
                },
            })
            .collect();
        columns.push(Column {
            name: LAST_UPDATE_COLUMN.to_string(),
            kind: ColumnKind::Text,
        });
        columns.push(Column {
            name: SEASON_COLUMN.to_string(),
            kind: ColumnKind::Text,
        });

        let stamp = Local::now().format(TIMESTAMP_FORMAT).to_string();

        let rows = table
            .rows
            .into_iter()
            .map(|raw| {
                let mut cells: Vec<Cell> = raw
                    .into_iter()
                    .zip(&numeric)
                    .map(|(value, &is_numeric)| {
                        if is_numeric {
                            coerce_numeric(&value)
                        } else {
                            Cell::Text(value)
                        }
                    })
                    .collect();
                cells.push(Cell::Text(stamp.clone()));
                cells.push(Cell::Text(self.season.clone()));
                cells
            })
            .collect();

        CleanTable { columns, rows }
    }
}

/// Lowercase the column name and map the percent sign to its suffix token.
fn canonical_name(header: &str) -> String {
    header.to_lowercase().replace('%', "_pct")
}

/// Parse a numeric field; anything unparseable (or non-finite) is missing.
fn coerce_numeric(value: &str) -> Cell {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Cell::Number(v),
        _ => Cell::Missing,
    }
}
