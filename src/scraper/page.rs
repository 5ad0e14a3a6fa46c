use std::time::Duration;

use thiserror::Error;
use tokio::time::{sleep, Instant};

/// Interval between readiness probes when polling for a condition.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum PageError {
    #[error("element not found: {0}")]
    NotFound(String),
    #[error("element not clickable: {0}")]
    NotClickable(String),
    #[error("timed out after {waited:?} waiting for {selector}")]
    Timeout { selector: String, waited: Duration },
    #[error("webdriver error: {0}")]
    Driver(#[from] thirtyfour::error::WebDriverError),
}

/// A handle to a rendered DOM element. Handles go stale once the page
/// re-renders; `is_attached` is the probe for that.
pub trait PageElement: Clone {
    async fn text(&self) -> Result<String, PageError>;
    async fn attr(&self, name: &str) -> Result<Option<String>, PageError>;
    async fn click(&self) -> Result<(), PageError>;
    async fn scroll_into_view(&self) -> Result<(), PageError>;
    async fn find_all(&self, selector: &str) -> Result<Vec<Self>, PageError>;
    async fn is_attached(&self) -> Result<bool, PageError>;
}

/// The browser capability the extraction logic is written against.
/// Production code drives a real WebDriver session; tests drive a
/// scripted fake.
pub trait PageDriver {
    type Element: PageElement;

    async fn navigate(&self, url: &str) -> Result<(), PageError>;
    async fn find(&self, selector: &str) -> Result<Self::Element, PageError>;
    async fn find_all(&self, selector: &str) -> Result<Vec<Self::Element>, PageError>;
    async fn quit(&self) -> Result<(), PageError>;
}

/// Poll for an element until it appears or the deadline passes.
pub async fn wait_for<P: PageDriver>(
    driver: &P,
    selector: &str,
    timeout: Duration,
) -> Result<P::Element, PageError> {
    let deadline = Instant::now() + timeout;

    loop {
        if let Ok(element) = driver.find(selector).await {
            return Ok(element);
        }

        if Instant::now() >= deadline {
            return Err(PageError::Timeout {
                selector: selector.to_string(),
                waited: timeout,
            });
        }

        sleep(POLL_INTERVAL.min(timeout)).await;
    }
}
