use std::time::Duration;

/// Hosted chest X-ray classifier used when no override is compiled in.
pub const DEFAULT_API_URL: &str = "https://mokshayani-ai--chestxray-classifier-api.modal.run";

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    pub base_url: String,
    /// Model inference is slow; every predict attempt is bounded by this.
    pub classify_timeout: Duration,
    pub health_timeout: Duration,
    /// Report the API as healthy when neither health probe could complete.
    pub assume_healthy_on_check_failure: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            classify_timeout: Duration::from_secs(60),
            health_timeout: Duration::from_secs(10),
            assume_healthy_on_check_failure: true,
        }
    }
}

impl ClassifierConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Applies a build-time override such as `option_env!("LUNGSCAN_API_URL")`.
    /// Blank overrides are ignored.
    pub fn with_override(base_url: Option<&str>) -> Self {
        match base_url.map(str::trim).filter(|url| !url.is_empty()) {
            Some(url) => Self::with_base_url(url),
            None => Self::default(),
        }
    }

    pub fn predict_url(&self) -> String {
        format!("{}/predict", self.base_url)
    }

    pub fn health_url(&self) -> String {
        format!("{}/health", self.base_url)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub retry_delay: Duration,
    pub auto_analyze: bool,
    pub auto_analyze_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            retry_delay: Duration::from_secs(1),
            auto_analyze: true,
            auto_analyze_delay: Duration::from_millis(500),
        }
    }
}
