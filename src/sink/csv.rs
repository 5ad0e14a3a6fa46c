use anyhow::Result;
use chrono::NaiveDate;
use csv::WriterBuilder;
use std::fs::File;

use super::Exporter;
use crate::models::CleanTable;

pub struct CsvExporter {
    delimiter: u8,
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl Exporter for CsvExporter {
    fn export(&self, table: &CleanTable, path: &str) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(file);

        writer.write_record(table.columns.iter().map(|c| c.name.as_str()))?;

        for row in &table.rows {
            writer.write_record(row.iter().map(|cell| cell.render()))?;
        }

        writer.flush()?;
        Ok(())
    }
}

/// Backup file name for a run: one file per calendar day.
pub fn dated_backup_path(prefix: &str, date: NaiveDate) -> String {
    format!("{}_{}.csv", prefix, date.format("%Y%m%d"))
}
