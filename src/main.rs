use anyhow::Result;
use chrono::Local;
use tracing::{debug, error, info};

mod chromedriver_manager;
mod config;
mod models;
mod normalizer;
mod scraper;
mod sink;

use config::{DbConfig, ScrapeConfig};
use normalizer::Normalizer;
use sink::csv::{dated_backup_path, CsvExporter};
use sink::postgres::PostgresSink;
use sink::report;
use sink::Exporter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = ScrapeConfig::default();

    info!("=== SCRAPING PHASE ===");
    let raw = scraper::run_scrape(&config).await?;

    if raw.is_empty() {
        error!("No data was scraped - exiting");
        return Ok(());
    }

    info!("=== DATA CLEANING PHASE ===");
    let cleaned = Normalizer::new(config.season.as_str()).clean(raw);
    info!(
        "Cleaned {} rows across {} columns",
        cleaned.rows.len(),
        cleaned.columns.len()
    );
    for row in cleaned.rows.iter().take(5) {
        debug!(
            "sample: {}",
            row.iter()
                .map(|cell| cell.render())
                .collect::<Vec<_>>()
                .join(" | ")
        );
    }

    info!("=== DATABASE SAVE PHASE ===");
    let sink = PostgresSink::new(DbConfig::from_env(), config.table_name.as_str());
    if let Err(e) = sink.save(&cleaned).await {
        error!("Error saving to database: {:#}", e);
    }

    info!("=== BACKUP PHASE ===");
    let backup_path = dated_backup_path("nba_stats", Local::now().date_naive());
    CsvExporter::new().export(&cleaned, &backup_path)?;
    info!("Data backup saved to {}", backup_path);

    report::write_character_report(&cleaned, report::REPORT_FILE)?;
    info!("Character issues report generated");

    Ok(())
}
