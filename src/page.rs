use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::Page as CrPage;
use chromiumoxide::page::ScreenshotParams;

use crate::dom::{Document, DomEvent, NodeState};
use crate::element::Element;
use crate::error::{Error, Result};

/// A Chromium tab, usable as the [`Document`] a form is filled in.
pub struct Page {
    inner: CrPage,
    default_timeout: Duration,
}

impl Page {
    pub(crate) fn new(inner: CrPage, default_timeout: Duration) -> Self {
        Self {
            inner,
            default_timeout,
        }
    }

    /// Load `html` as the page content, replacing the current document.
    pub async fn set_content(&self, html: &str) -> Result<()> {
        self.inner
            .set_content(html)
            .await
            .map_err(|e| Error::NavigationError(e.to_string()))?;
        Ok(())
    }

    /// Wait for an element matching the given CSS selector to appear in the DOM.
    /// Polls every 100ms up to the configured default timeout.
    pub async fn wait_for_selector(&self, selector: &str) -> Result<Element> {
        let timeout = self.default_timeout;
        let interval = Duration::from_millis(100);
        let start = std::time::Instant::now();

        loop {
            if let Some(el) = self.query(selector).await? {
                return Ok(el);
            }
            if start.elapsed() >= timeout {
                return Err(Error::ElementNotFound(format!(
                    "Timed out waiting for selector: {selector}"
                )));
            }
            tokio::time::sleep(interval).await;
        }
    }

    /// Take a screenshot and save it to a file.
    pub async fn screenshot_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        self.inner
            .save_screenshot(params, path)
            .await
            .map_err(|e| Error::JsError(e.to_string()))?;
        Ok(())
    }

    /// Evaluate a JavaScript expression and return the result as a string.
    pub async fn evaluate(&self, expression: &str) -> Result<String> {
        let result = self
            .inner
            .evaluate(expression)
            .await
            .map_err(|e| Error::JsError(e.to_string()))?;
        match result.value() {
            Some(val) => Ok(val.to_string()),
            None => Ok(String::new()),
        }
    }
}

#[async_trait]
impl Document for Page {
    type Node = Element;

    async fn query(&self, selector: &str) -> Result<Option<Element>> {
        Ok(self.query_all(selector).await?.into_iter().next())
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<Element>> {
        let els = self.inner.find_elements(selector).await?;
        Ok(els.into_iter().map(Element::new).collect())
    }

    async fn focused(&self) -> Result<Option<Element>> {
        self.query(":focus").await
    }

    async fn state(&self, node: &Element) -> Result<NodeState> {
        node.state().await
    }

    async fn text(&self, node: &Element) -> Result<String> {
        node.text().await
    }

    async fn attribute(&self, node: &Element, name: &str) -> Result<Option<String>> {
        node.attribute(name).await
    }

    async fn set_value(&self, node: &Element, value: &str) -> Result<()> {
        node.set_value(value).await
    }

    async fn dispatch(&self, node: &Element, event: &DomEvent) -> Result<()> {
        node.dispatch(event).await
    }
}
