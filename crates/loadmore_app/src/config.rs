use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use loadmore_core::DEFAULT_RETRY_BUDGET;
use loadmore_engine::{BinderSettings, FetchSettings, DEFAULT_NEXT_URL_HEADER};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub retry_budget: u32,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_body_bytes: u64,
    pub next_url_header: String,
    pub container_selector: String,
    pub control_selector: String,
    pub results_selector: String,
    pub loading_label_selector: String,
    /// Upper bound on waiting for any single request chain to finish.
    pub settle_timeout_secs: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        let binder = BinderSettings::default();
        Self {
            retry_budget: DEFAULT_RETRY_BUDGET,
            connect_timeout_secs: fetch.connect_timeout.as_secs(),
            request_timeout_secs: fetch.request_timeout.as_secs(),
            max_body_bytes: fetch.max_bytes,
            next_url_header: DEFAULT_NEXT_URL_HEADER.to_string(),
            container_selector: binder.container_selector,
            control_selector: binder.control_selector,
            results_selector: binder.results_selector,
            loading_label_selector: binder.loading_label_selector,
            settle_timeout_secs: 120,
        }
    }
}

impl LoaderConfig {
    pub fn fetch_settings(&self, base_url: Option<Url>) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_bytes: self.max_body_bytes,
            next_url_header: self.next_url_header.clone(),
            base_url,
        }
    }

    pub fn binder_settings(&self) -> BinderSettings {
        BinderSettings {
            container_selector: self.container_selector.clone(),
            control_selector: self.control_selector.clone(),
            results_selector: self.results_selector.clone(),
            loading_label_selector: self.loading_label_selector.clone(),
        }
    }

    pub fn settle_timeout(&self) -> Duration {
        Duration::from_secs(self.settle_timeout_secs)
    }
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<LoaderConfig> {
    let Some(path) = path else {
        return Ok(LoaderConfig::default());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse_config(&content).with_context(|| format!("failed to parse config {}", path.display()))
}

fn parse_config(content: &str) -> Result<LoaderConfig, ron::error::SpannedError> {
    ron::from_str(content)
}
