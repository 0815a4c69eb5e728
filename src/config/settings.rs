//! Settings structures for the storefront search core

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Main settings structure, loaded from `settings.yml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub backend: BackendSettings,
    pub outgoing: OutgoingSettings,
    pub autocomplete: AutocompleteSettings,
    pub session: SessionSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse settings from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(content)?;
        Ok(settings)
    }

    /// Merge with environment variables (NEXUS_* prefix)
    pub fn merge_env(&mut self) {
        self.merge_vars(|key| std::env::var(key).ok());
    }

    fn merge_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("NEXUS_BACKEND_URL") {
            self.backend.base_url = val;
        }
        if let Some(val) = lookup("NEXUS_DEBOUNCE_MS") {
            if let Ok(ms) = val.parse() {
                self.autocomplete.debounce_ms = ms;
            }
        }
        if let Some(val) = lookup("NEXUS_REQUEST_TIMEOUT") {
            match val.parse::<f64>() {
                Ok(secs) if secs.is_finite() && secs > 0.0 => {
                    self.outgoing.request_timeout = secs;
                }
                _ => warn!("Ignoring NEXUS_REQUEST_TIMEOUT={}, expected positive seconds", val),
            }
        }
    }
}

/// Location of the product search backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Base URL of the backend, without a trailing path
    pub base_url: String,
    /// Path of the suggestion endpoint
    pub associate_path: String,
    /// Path of the results endpoint
    pub search_path: String,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5678".to_string(),
            associate_path: "/associate".to_string(),
            search_path: "/search".to_string(),
        }
    }
}

impl BackendSettings {
    pub fn associate_url(&self) -> String {
        join_url(&self.base_url, &self.associate_path)
    }

    pub fn search_url(&self) -> String {
        join_url(&self.base_url, &self.search_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Default request timeout in seconds
    pub request_timeout: f64,
    /// Pool max size
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
    /// Extra headers to send
    pub extra_headers: HashMap<String, String>,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: 5.0,
            pool_maxsize: 8,
            verify_ssl: true,
            proxies: ProxySettings::default(),
            extra_headers: HashMap::new(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}

/// Suggestion controller behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutocompleteSettings {
    /// Disable to never issue suggestion lookups
    pub enabled: bool,
    /// Quiet period after the last keystroke before a lookup is issued
    pub debounce_ms: u64,
    /// Delay between blur and hiding the panel
    pub blur_grace_ms: u64,
    /// Height of one suggestion row, reported to layout
    pub row_height_px: u32,
}

impl Default for AutocompleteSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: 300,
            blur_grace_ms: 150,
            row_height_px: 48,
        }
    }
}

impl AutocompleteSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn blur_grace(&self) -> Duration {
        Duration::from_millis(self.blur_grace_ms)
    }
}

/// Search session behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Reserved query answered from built-in products (None disables it)
    pub fixture_query: Option<String>,
    /// Location the session starts at
    pub start_location: String,
    /// Path of the results view that submissions navigate to
    pub results_path: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            fixture_query: Some("mock".to_string()),
            start_location: "/search".to_string(),
            results_path: "/search".to_string(),
        }
    }
}
