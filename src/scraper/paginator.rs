use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{info, warn};

use super::extractor::{self, PageRows};
use super::page::{PageDriver, PageElement, PageError};
use crate::models::RawRow;

const DEFAULT_SETTLE: Duration = Duration::from_secs(2);
const DEFAULT_POLL: Duration = Duration::from_millis(250);

/// Marker the site puts on the next-page control once the last page is
/// reached.
const DISABLED_MARKER: &str = "disabled";

/// Drives row extraction across the paginated table.
///
/// The loop alternates between two phases: reading the rows of the current
/// page, and advancing by clicking the next-page control and waiting for
/// the old page's first row to detach. Every termination path returns the
/// rows accumulated so far; transient pagination failures end the loop,
/// they do not fail the scrape.
pub struct Paginator {
    max_pages: u32,
    settle: Duration,
    poll: Duration,
}

enum Phase {
    Reading,
    Advancing,
}

enum Advance {
    NextPage,
    LastPage,
}

impl Paginator {
    pub fn new(max_pages: u32) -> Self {
        Self {
            max_pages,
            settle: DEFAULT_SETTLE,
            poll: DEFAULT_POLL,
        }
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn with_poll(mut self, poll: Duration) -> Self {
        self.poll = poll;
        self
    }

    /// Visit pages 1..k strictly in order, collecting rows until a
    /// terminal condition: the page ceiling, a disabled or missing next
    /// control, or any pagination interaction error.
    pub async fn collect_rows<P: PageDriver>(&self, driver: &P) -> Vec<RawRow> {
        let mut all_rows: Vec<RawRow> = Vec::new();
        let mut anchor: Option<P::Element> = None;
        let mut current_page = 1u32;
        let mut phase = Phase::Reading;

        loop {
            match phase {
                Phase::Reading => {
                    let PageRows { rows, anchor: first } =
                        match extractor::extract_rows(driver).await {
                            Ok(extracted) => extracted,
                            Err(e) => {
                                warn!("Row extraction failed on page {}: {}", current_page, e);
                                break;
                            }
                        };

                    anchor = first;
                    all_rows.extend(rows);
                    info!(
                        "Processed page {} - Total rows: {}",
                        current_page,
                        all_rows.len()
                    );

                    if current_page >= self.max_pages {
                        info!("Reached the configured page limit ({})", self.max_pages);
                        break;
                    }
                    phase = Phase::Advancing;
                }
                Phase::Advancing => match self.advance(driver, anchor.as_ref()).await {
                    Ok(Advance::NextPage) => {
                        current_page += 1;
                        phase = Phase::Reading;
                    }
                    Ok(Advance::LastPage) => {
                        info!("Reached the last page of data");
                        break;
                    }
                    Err(e) => {
                        warn!("Pagination error: {}", e);
                        break;
                    }
                },
            }
        }

        all_rows
    }

    /// Click through to the next page. The old page's anchor row detaching
    /// is the signal that the transition happened; the settle deadline is
    /// the fallback when it never does.
    async fn advance<P: PageDriver>(
        &self,
        driver: &P,
        anchor: Option<&P::Element>,
    ) -> Result<Advance, PageError> {
        let next = driver.find(extractor::NEXT_BUTTON).await?;

        let class = next.attr("class").await?.unwrap_or_default();
        if class.contains(DISABLED_MARKER) {
            return Ok(Advance::LastPage);
        }

        next.scroll_into_view().await?;
        next.click().await?;

        match anchor {
            Some(anchor) => self.wait_for_stale(anchor).await,
            None => sleep(self.settle).await,
        }

        Ok(Advance::NextPage)
    }

    async fn wait_for_stale<E: PageElement>(&self, element: &E) {
        let deadline = Instant::now() + self.settle;

        loop {
            // A probe failure means the handle is already gone.
            match element.is_attached().await {
                Ok(false) | Err(_) => return,
                Ok(true) => {}
            }

            if Instant::now() >= deadline {
                return;
            }
            sleep(self.poll).await;
        }
    }
}
