use anyhow::{Context, Result};
use thirtyfour::error::WebDriverError;
use thirtyfour::prelude::*;
use tokio::time::{sleep, Duration};
use tracing::debug;

use super::page::{PageDriver, PageElement, PageError};

/// Fixed user agent presented to the stats site.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub struct BrowserDriver {
    driver: WebDriver,
}

impl BrowserDriver {
    pub async fn new(port: u16, headless: bool) -> Result<Self> {
        let mut caps = DesiredCapabilities::chrome();

        let mut chrome_args = vec![
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--disable-gpu".to_string(),
            "--window-size=1920,1080".to_string(),
            format!("user-agent={}", USER_AGENT),
        ];

        if headless {
            chrome_args.push("--headless".to_string());
        }

        for arg in &chrome_args {
            caps.add_arg(arg)?;
        }

        // Connect to ChromeDriver with bounded retry
        let server_url = format!("http://localhost:{}", port);
        let mut last_error = None;
        for attempt in 1..=3 {
            match WebDriver::new(&server_url, caps.clone()).await {
                Ok(driver) => return Ok(Self { driver }),
                Err(e) => {
                    debug!("ChromeDriver connection attempt {}/3 failed: {}", attempt, e);
                    last_error = Some(e);
                    if attempt < 3 {
                        sleep(Duration::from_millis(1000)).await;
                    }
                }
            }
        }

        Err(last_error.unwrap()).with_context(|| {
            format!(
                "Failed to connect to ChromeDriver on port {} after 3 attempts",
                port
            )
        })
    }
}

#[derive(Clone)]
pub struct BrowserElement {
    inner: WebElement,
}

impl From<WebElement> for BrowserElement {
    fn from(inner: WebElement) -> Self {
        Self { inner }
    }
}

impl PageElement for BrowserElement {
    async fn text(&self) -> Result<String, PageError> {
        Ok(self.inner.text().await?)
    }

    async fn attr(&self, name: &str) -> Result<Option<String>, PageError> {
        Ok(self.inner.attr(name).await?)
    }

    async fn click(&self) -> Result<(), PageError> {
        match self.inner.click().await {
            Ok(()) => Ok(()),
            Err(e @ WebDriverError::ElementClickIntercepted(_)) => {
                Err(PageError::NotClickable(e.to_string()))
            }
            Err(e @ WebDriverError::ElementNotInteractable(_)) => {
                Err(PageError::NotClickable(e.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn scroll_into_view(&self) -> Result<(), PageError> {
        self.inner
            .handle
            .execute(
                "arguments[0].scrollIntoView();",
                vec![serde_json::json!(self.inner)],
            )
            .await?;
        Ok(())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Self>, PageError> {
        let elements = self.inner.find_all(By::Css(selector)).await?;
        Ok(elements.into_iter().map(BrowserElement::from).collect())
    }

    async fn is_attached(&self) -> Result<bool, PageError> {
        Ok(self.inner.is_present().await?)
    }
}

impl PageDriver for BrowserDriver {
    type Element = BrowserElement;

    async fn navigate(&self, url: &str) -> Result<(), PageError> {
        Ok(self.driver.goto(url).await?)
    }

    async fn find(&self, selector: &str) -> Result<Self::Element, PageError> {
        match self.driver.find(By::Css(selector)).await {
            Ok(element) => Ok(element.into()),
            Err(WebDriverError::NoSuchElement(_)) => {
                Err(PageError::NotFound(selector.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Self::Element>, PageError> {
        let elements = self.driver.find_all(By::Css(selector)).await?;
        Ok(elements.into_iter().map(BrowserElement::from).collect())
    }

    async fn quit(&self) -> Result<(), PageError> {
        // quit() consumes the driver; clone the handle to move it in
        let driver = self.driver.clone();
        driver.quit().await?;
        Ok(())
    }
}
