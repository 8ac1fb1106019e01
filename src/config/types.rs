use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the listing base URL
pub const TARGET_URL_ENV: &str = "TARGET_URL";

pub const DEFAULT_LISTING_ITEM_SELECTOR: &str = ".product-list_ProductList__item__LiiNI";
pub const DEFAULT_MEDIA_CONTAINER_SELECTOR: &str = "picture";

/// Main configuration structure for Gallery-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub selectors: SelectorConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

impl Config {
    /// The listing base URL, if one has been configured
    pub fn target_url(&self) -> Option<&str> {
        self.crawler
            .target_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// What to do when a listing page fails to load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageFailurePolicy {
    /// Stop paging and mark the run as failed
    #[default]
    Abort,
    /// Record the failure and continue with the next page number
    SkipPage,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Listing base URL; `page=<n>` is appended to it
    #[serde(rename = "target-url")]
    pub target_url: Option<String>,

    /// Maximum number of listing pages to visit
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// How long to wait for listing items or media containers to render
    #[serde(rename = "render-timeout-seconds")]
    pub render_timeout_seconds: u64,

    /// Interval between render-completion checks (milliseconds)
    #[serde(rename = "poll-interval-ms")]
    pub poll_interval_ms: u64,

    /// Pause between consecutive image downloads (milliseconds)
    #[serde(rename = "download-delay-ms")]
    pub download_delay_ms: u64,

    /// Upper bound for a single HTTP request
    #[serde(rename = "request-timeout-seconds")]
    pub request_timeout_seconds: u64,

    /// Optional wall-clock limit for the whole run
    #[serde(rename = "max-run-seconds")]
    pub max_run_seconds: Option<u64>,

    #[serde(rename = "on-page-failure")]
    pub on_page_failure: PageFailurePolicy,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            target_url: None,
            max_pages: 500,
            render_timeout_seconds: 20,
            poll_interval_ms: 250,
            download_delay_ms: 500,
            request_timeout_seconds: 30,
            max_run_seconds: None,
            on_page_failure: PageFailurePolicy::Abort,
        }
    }
}

impl CrawlerConfig {
    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_seconds)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn download_delay(&self) -> Duration {
        Duration::from_millis(self.download_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn max_run_duration(&self) -> Option<Duration> {
        self.max_run_seconds.map(Duration::from_secs)
    }
}

/// CSS selectors describing the target site's DOM
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// One element per product on a listing page; must contain an `<a href>`
    #[serde(rename = "listing-item")]
    pub listing_item: String,

    /// One element per image on a detail page; must contain an `<img src>`
    #[serde(rename = "media-container")]
    pub media_container: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            listing_item: DEFAULT_LISTING_ITEM_SELECTOR.to_string(),
            media_container: DEFAULT_MEDIA_CONTAINER_SELECTOR.to_string(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "GalleryHarvest".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Format: CrawlerName/Version (+ContactURL)
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving the downloaded images
    #[serde(rename = "output-dir")]
    pub output_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("downloaded_images"),
        }
    }
}
