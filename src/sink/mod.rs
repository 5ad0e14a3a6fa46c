pub mod csv;
pub mod postgres;
pub mod report;

use anyhow::Result;

use crate::models::CleanTable;

pub trait Exporter {
    fn export(&self, table: &CleanTable, path: &str) -> Result<()>;
}
