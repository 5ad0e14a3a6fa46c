use std::time::Duration;

use tracing::info;

use super::page::{self, PageDriver, PageElement, PageError};
use crate::models::RawRow;

// Structural selectors for the stats leaderboard. Any change to the page
// markup is a hard compatibility break.
pub const TABLE_CONTAINER: &str = ".Crom_table__p1iZz";
pub const HEADER_CELLS: &str = ".Crom_headers__mzI_m th";
pub const BODY_ROWS: &str = ".Crom_body__UYOcU tr";
pub const ROW_CELLS: &str = "td";
pub const NEXT_BUTTON: &str = "button[data-pos=\"next\"]";
pub const OVERLAY_CLOSE: &str = "button[aria-label=\"Close\"]";

/// Synthetic leading column for the row-number cell the site renders
/// without a header of its own.
pub const ROW_NUMBER_COLUMN: &str = "row_number";

/// Rows read from the currently rendered page, plus the first row element
/// kept as the staleness anchor for page transitions.
pub struct PageRows<E> {
    pub rows: Vec<RawRow>,
    pub anchor: Option<E>,
}

/// Poll for the main data table. This is the single hard timeout in the
/// pipeline; if it expires the scrape yields nothing.
pub async fn wait_for_table<P: PageDriver>(
    driver: &P,
    timeout: Duration,
) -> Result<(), PageError> {
    page::wait_for(driver, TABLE_CONTAINER, timeout).await?;
    Ok(())
}

/// Best-effort dismissal of the interstitial popup. The popup appears
/// non-deterministically; absence or a failed click is never an error.
pub async fn dismiss_overlay<P: PageDriver>(driver: &P) {
    match driver.find(OVERLAY_CLOSE).await {
        Ok(button) => match button.click().await {
            Ok(()) => info!("Closed popup dialog"),
            Err(e) => info!("Found popup but could not close it: {}", e),
        },
        Err(_) => info!("No popup found"),
    }
}

/// Read the header row once per session. Each cell prefers the
/// machine-readable `field` attribute, then `title`, then visible text.
pub async fn extract_headers<P: PageDriver>(driver: &P) -> Result<Vec<String>, PageError> {
    let cells = driver.find_all(HEADER_CELLS).await?;

    let mut headers = Vec::with_capacity(cells.len() + 1);
    for cell in &cells {
        let label = match cell.attr("field").await? {
            Some(field) if !field.is_empty() => field,
            _ => match cell.attr("title").await? {
                Some(title) if !title.is_empty() => title,
                _ => cell.text().await?.trim().to_string(),
            },
        };

        if !label.is_empty() {
            headers.push(label);
        }
    }

    headers.insert(0, ROW_NUMBER_COLUMN.to_string());
    Ok(headers)
}

/// Read every row currently rendered in the table body. Rows that yield
/// zero cells are skipped.
pub async fn extract_rows<P: PageDriver>(
    driver: &P,
) -> Result<PageRows<P::Element>, PageError> {
    let row_elements = driver.find_all(BODY_ROWS).await?;
    let anchor = row_elements.first().cloned();

    let mut rows = Vec::with_capacity(row_elements.len());
    for row_element in &row_elements {
        let cells = row_element.find_all(ROW_CELLS).await?;

        let mut row = Vec::with_capacity(cells.len());
        for cell in &cells {
            row.push(cell.text().await?.trim().to_string());
        }

        if !row.is_empty() {
            rows.push(row);
        }
    }

    Ok(PageRows { rows, anchor })
}
