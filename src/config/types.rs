use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Sumi-Sift
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
}

impl Config {
    /// Default configuration crawling `base_url`
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.crawler.base_url = base_url.into();
        config
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the API binds to
    #[serde(rename = "bind-address")]
    pub bind_address: String,

    /// Port the API listens on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 4567,
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Site every job crawls; also the scope boundary
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Worker pool size of a single job
    #[serde(rename = "max-concurrent-fetches")]
    pub max_concurrent_fetches: u32,

    /// In-flight fetch cap shared by all running jobs
    #[serde(rename = "max-total-fetches")]
    pub max_total_fetches: u32,

    /// Upper bound on a single page fetch (milliseconds)
    #[serde(rename = "fetch-timeout-ms")]
    pub fetch_timeout_ms: u64,

    /// How long an idle worker waits before re-checking the frontier (milliseconds)
    #[serde(rename = "idle-poll-ms")]
    pub idle_poll_ms: u64,
}

impl CrawlerConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            max_concurrent_fetches: 4,
            max_total_fetches: 32,
            fetch_timeout_ms: 10_000,
            idle_poll_ms: 50,
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
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `Name/Version`
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.crawler_name, self.crawler_version)
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SumiSift".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Values that take precedence over the config file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub port: Option<u16>,
}

impl ConfigOverrides {
    /// Fills unset values from the process environment (`BASE_URL`)
    pub fn with_env(mut self) -> Self {
        if self.base_url.is_none() {
            self.base_url = std::env::var("BASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty());
        }
        self
    }

    /// Writes every set value into `config`
    pub fn apply(&self, config: &mut Config) {
        if let Some(base_url) = &self.base_url {
            config.crawler.base_url = base_url.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}
