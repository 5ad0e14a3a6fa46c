pub mod browser;
pub mod extractor;
pub mod page;
pub mod paginator;

#[cfg(test)]
pub mod fake;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::chromedriver_manager::ChromeDriverManager;
use crate::config::ScrapeConfig;
use crate::models::StatsTable;
use self::browser::BrowserDriver;
use self::page::PageDriver;
use self::paginator::Paginator;

/// The full extraction flow against an already-connected session: navigate,
/// wait for the table, dismiss the popup, read headers once, then paginate.
///
/// Only driver provisioning is fatal and handled by the caller; everything
/// in here degrades to an empty (or partial) table with a logged reason.
pub async fn extract_stats<P: PageDriver>(driver: &P, config: &ScrapeConfig) -> StatsTable {
    info!("Navigating to: {}", config.url);
    if let Err(e) = driver.navigate(&config.url).await {
        error!("Failed to open stats page: {}", e);
        return StatsTable::empty();
    }

    info!("Waiting for data table to load...");
    if let Err(e) = extractor::wait_for_table(driver, config.table_timeout()).await {
        error!("Data table never appeared: {}", e);
        return StatsTable::empty();
    }

    extractor::dismiss_overlay(driver).await;

    let headers = match extractor::extract_headers(driver).await {
        Ok(headers) => headers,
        Err(e) => {
            error!("Header extraction failed: {}", e);
            return StatsTable::empty();
        }
    };

    let rows = Paginator::new(config.max_pages).collect_rows(driver).await;

    StatsTable::from_scrape(headers, rows, config.column_cap)
}

/// Owns the browser session and the ChromeDriver process behind it.
pub struct ScraperEngine {
    browser: BrowserDriver,
    config: ScrapeConfig,
    driver_manager: ChromeDriverManager,
}

impl ScraperEngine {
    pub async fn new(config: ScrapeConfig) -> Result<Self> {
        let driver_manager = ChromeDriverManager::new();
        driver_manager
            .start_driver(config.driver_port)
            .await
            .context("Failed to start ChromeDriver")?;

        let browser = match BrowserDriver::new(config.driver_port, config.headless).await {
            Ok(browser) => browser,
            Err(e) => {
                driver_manager.stop_driver().await;
                return Err(e);
            }
        };

        Ok(Self {
            browser,
            config,
            driver_manager,
        })
    }

    pub async fn run_extraction(&self) -> StatsTable {
        extract_stats(&self.browser, &self.config).await
    }

    pub async fn close(&self) {
        if let Err(e) = self.browser.quit().await {
            warn!("Failed to quit browser session: {}", e);
        }
        self.driver_manager.stop_driver().await;
    }
}

/// One-shot scrape: acquire the session, extract, and release the browser
/// on every exit path.
pub async fn run_scrape(config: &ScrapeConfig) -> Result<StatsTable> {
    let engine = ScraperEngine::new(config.clone()).await?;
    let table = engine.run_extraction().await;
    engine.close().await;

    info!(
        "Scraping finished: {} rows across {} columns",
        table.len(),
        table.headers.len()
    );
    Ok(table)
}
