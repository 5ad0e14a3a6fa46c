use anyhow::Result;
use csv::Writer;
use tracing::warn;

use crate::models::{Cell, CleanTable};

/// Identifying column emitted in the report.
pub const NAME_COLUMN: &str = "player_name";
pub const REPORT_FILE: &str = "character_issues_report.csv";

/// Names from rows where any field contains a character outside the 7-bit
/// ASCII range. `None` when the dataset has no identifying column.
pub fn flagged_names(table: &CleanTable) -> Option<Vec<String>> {
    let name_index = table.column_index(NAME_COLUMN)?;

    Some(
        table
            .rows
            .iter()
            .filter(|row| row.iter().any(has_non_ascii))
            .map(|row| row[name_index].render())
            .collect(),
    )
}

fn has_non_ascii(cell: &Cell) -> bool {
    cell.as_text().is_some_and(|s| !s.is_ascii())
}

/// Secondary report for manual review of encoding and transliteration
/// issues in player names.
pub fn write_character_report(table: &CleanTable, path: &str) -> Result<()> {
    let Some(names) = flagged_names(table) else {
        warn!(
            "Column '{}' not present; skipping character issues report",
            NAME_COLUMN
        );
        return Ok(());
    };

    let mut writer = Writer::from_path(path)?;
    writer.write_record([NAME_COLUMN])?;
    for name in &names {
        writer.write_record([name.as_str()])?;
    }
    writer.flush()?;

    Ok(())
}
