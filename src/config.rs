use std::time::Duration;

use crate::browser::FormBrowser;
use crate::error::Result;

/// Default selector for rendered options of a searchable select.
pub const DEFAULT_OPTION_SELECTOR: &str = "[role='option']";

/// Timing and lookup knobs for the fill engine.
#[derive(Debug, Clone)]
pub struct FillConfig {
    /// Pause after the leading `Escape`, before opening a dropdown.
    pub escape_settle: Duration,
    /// Pause between clicking a dropdown open and typing into it.
    pub open_settle: Duration,
    /// Pause between characters.
    pub keystroke_delay: Duration,
    /// Pause after the last character so a debounced search can render.
    pub search_settle: Duration,
    /// How long to poll for options before the `ArrowDown` fallback.
    pub options_timeout: Duration,
    /// How long to poll after the `ArrowDown` fallback.
    pub fallback_timeout: Duration,
    pub poll_interval: Duration,
    /// Extra attempts granted when an element goes stale mid-fill.
    pub stale_retries: u32,
    pub option_selector: String,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            escape_settle: Duration::from_millis(300),
            open_settle: Duration::from_millis(500),
            keystroke_delay: Duration::from_millis(50),
            search_settle: Duration::from_millis(600),
            options_timeout: Duration::from_millis(2000),
            fallback_timeout: Duration::from_millis(1000),
            poll_interval: Duration::from_millis(100),
            stale_retries: 1,
            option_selector: DEFAULT_OPTION_SELECTOR.to_string(),
        }
    }
}

impl FillConfig {
    pub fn builder() -> FillConfigBuilder {
        FillConfigBuilder::new()
    }

    /// No settle delays and single-shot polls, for documents that render
    /// synchronously.
    pub fn instant() -> Self {
        Self {
            escape_settle: Duration::ZERO,
            open_settle: Duration::ZERO,
            keystroke_delay: Duration::ZERO,
            search_settle: Duration::ZERO,
            options_timeout: Duration::ZERO,
            fallback_timeout: Duration::ZERO,
            poll_interval: Duration::ZERO,
            ..Self::default()
        }
    }
}

pub struct FillConfigBuilder {
    config: FillConfig,
}

impl FillConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: FillConfig::default(),
        }
    }

    pub fn escape_settle(mut self, delay: Duration) -> Self {
        self.config.escape_settle = delay;
        self
    }

    pub fn open_settle(mut self, delay: Duration) -> Self {
        self.config.open_settle = delay;
        self
    }

    pub fn keystroke_delay(mut self, delay: Duration) -> Self {
        self.config.keystroke_delay = delay;
        self
    }

    pub fn search_settle(mut self, delay: Duration) -> Self {
        self.config.search_settle = delay;
        self
    }

    /// Poll budgets before and after the `ArrowDown` fallback.
    pub fn options_timeout(mut self, first: Duration, fallback: Duration) -> Self {
        self.config.options_timeout = first;
        self.config.fallback_timeout = fallback;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    pub fn stale_retries(mut self, retries: u32) -> Self {
        self.config.stale_retries = retries;
        self
    }

    pub fn option_selector(mut self, selector: impl Into<String>) -> Self {
        self.config.option_selector = selector.into();
        self
    }

    pub fn build(self) -> FillConfig {
        self.config
    }
}

impl Default for FillConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct BrowserConfig {
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub chrome_path: Option<String>,
    /// Default timeout for page-level waits like `wait_for_selector` (default: 30s).
    pub default_timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1920,
            viewport_height: 1080,
            chrome_path: None,
            default_timeout: Duration::from_secs(30),
        }
    }
}

pub struct BrowserBuilder {
    config: BrowserConfig,
}

impl BrowserBuilder {
    pub fn new() -> Self {
        Self {
            config: BrowserConfig::default(),
        }
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.config.viewport_width = width;
        self.config.viewport_height = height;
        self
    }

    pub fn chrome_path(mut self, path: impl Into<String>) -> Self {
        self.config.chrome_path = Some(path.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.default_timeout = timeout;
        self
    }

    pub fn build_config(self) -> BrowserConfig {
        self.config
    }

    pub async fn build(self) -> Result<FormBrowser> {
        FormBrowser::launch(self.build_config()).await
    }
}

impl Default for BrowserBuilder {
    fn default() -> Self {
        Self::new()
    }
}
