//! Dashboard configuration
//!
//! Supports configuration injection by the serving host.
//! The server can inject config via `<meta>` tags in the HTML, or via
//! `window.__NODEPULSE_CONFIG__`.

use std::time::Duration;

use tracing::Level;

use crate::error::ConfigError;
use crate::summary::LoadThresholds;

/// Default refresh cadence
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Default id of the metrics container element
pub const DEFAULT_METRICS_CONTAINER: &str = "performance-metrics";

/// Default id of the optimize button
pub const DEFAULT_OPTIMIZE_BUTTON: &str = "optimize-network";

/// Default id of the optional summary element
pub const DEFAULT_SUMMARY_CONTAINER: &str = "performance-summary";

/// Setting keys, as used in `<meta name="nodepulse:KEY">` tags
pub const SETTING_KEYS: &[&str] = &[
    "api-url",
    "refresh-secs",
    "log-level",
    "metrics-container",
    "optimize-button",
    "summary-container",
    "high-cpu",
    "low-cpu",
    "version",
];

/// Dashboard configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// API base URL (e.g., "http://localhost:8080"); empty means same origin
    pub api_url: String,
    /// Time between refresh cycles
    pub refresh_interval: Duration,
    /// Maximum log level written to the browser console
    pub log_level: Level,
    /// Id of the element the metrics are rendered into
    pub metrics_container_id: String,
    /// Id of the button that triggers optimization
    pub optimize_button_id: String,
    /// Id of the summary element; rendering is skipped when the element is absent
    pub summary_container_id: String,
    /// CPU thresholds used to classify nodes in the summary
    pub thresholds: LoadThresholds,
    /// Server version (injected by server)
    pub version: Option<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            log_level: Level::INFO,
            metrics_container_id: DEFAULT_METRICS_CONTAINER.to_string(),
            optimize_button_id: DEFAULT_OPTIMIZE_BUTTON.to_string(),
            summary_container_id: DEFAULT_SUMMARY_CONTAINER.to_string(),
            thresholds: LoadThresholds::default(),
            version: None,
        }
    }
}

impl DashboardConfig {
    /// Get the API base URL
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Apply a single injected setting
    ///
    /// Empty values are ignored so a blank `<meta>` tag keeps the default.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(());
        }

        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };

        match key {
            "api-url" => {
                if !value.starts_with('/')
                    && !value.starts_with("http://")
                    && !value.starts_with("https://")
                {
                    return Err(invalid());
                }
                self.api_url = value.trim_end_matches('/').to_string();
            }
            "refresh-secs" => {
                let secs: u64 = value.parse().map_err(|_| invalid())?;
                if secs == 0 {
                    return Err(invalid());
                }
                self.refresh_interval = Duration::from_secs(secs);
            }
            "log-level" => {
                self.log_level = value.parse().map_err(|_| invalid())?;
            }
            "metrics-container" => self.metrics_container_id = value.to_string(),
            "optimize-button" => self.optimize_button_id = value.to_string(),
            "summary-container" => self.summary_container_id = value.to_string(),
            "high-cpu" | "low-cpu" => {
                let pct: f64 = value.parse().map_err(|_| invalid())?;
                if !(0.0..=100.0).contains(&pct) {
                    return Err(invalid());
                }
                let mut thresholds = self.thresholds;
                if key == "high-cpu" {
                    thresholds.high_cpu = pct;
                } else {
                    thresholds.low_cpu = pct;
                }
                if thresholds.low_cpu > thresholds.high_cpu {
                    return Err(invalid());
                }
                self.thresholds = thresholds;
            }
            "version" => self.version = Some(value.to_string()),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }

    /// Apply settings in order, logging and skipping the invalid ones
    pub fn apply_all<'a, I>(&mut self, settings: I)
    where
        I: IntoIterator<Item = (&'a str, String)>,
    {
        for (key, value) in settings {
            if let Err(e) = self.apply(key, &value) {
                tracing::warn!(error = %e, "ignoring dashboard setting");
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod browser {
    use wasm_bindgen::JsCast;

    use super::{DashboardConfig, SETTING_KEYS};

    impl DashboardConfig {
        /// Load configuration from various sources (priority order):
        /// 1. `<meta name="nodepulse:KEY">` tags (server-injected)
        /// 2. `window.__NODEPULSE_CONFIG__` object (JavaScript injection)
        /// 3. Built-in defaults
        pub fn load() -> Self {
            let mut config = Self::default();

            // Lowest priority first so meta tags win
            config.apply_all(
                SETTING_KEYS
                    .iter()
                    .filter_map(|key| get_js_config(key).map(|v| (*key, v))),
            );

            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                config.apply_all(SETTING_KEYS.iter().filter_map(|key| {
                    get_meta_content(&document, &format!("nodepulse:{key}")).map(|v| (*key, v))
                }));
            }

            config
        }
    }

    /// Get content from a <meta name="..."> tag
    fn get_meta_content(document: &web_sys::Document, name: &str) -> Option<String> {
        let selector = format!("meta[name=\"{}\"]", name);
        document
            .query_selector(&selector)
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<web_sys::HtmlMetaElement>().ok())
            .map(|meta| meta.content())
    }

    /// Get a value from window.__NODEPULSE_CONFIG__
    ///
    /// Keys are looked up in snake_case (`api_url`, `refresh_secs`, ...).
    fn get_js_config(key: &str) -> Option<String> {
        let window = web_sys::window()?;
        let config = js_sys::Reflect::get(&window, &"__NODEPULSE_CONFIG__".into()).ok()?;

        if config.is_undefined() || config.is_null() {
            return None;
        }

        let value = js_sys::Reflect::get(&config, &key.replace('-', "_").into()).ok()?;
        value
            .as_string()
            .or_else(|| value.as_f64().map(|n| n.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DashboardConfig::default();
        assert!(config.api_url.is_empty());
        assert!(config.version.is_none());
        assert_eq!(config.refresh_interval, Duration::from_secs(60));
        assert_eq!(config.metrics_container_id, "performance-metrics");
        assert_eq!(config.optimize_button_id, "optimize-network");
        assert_eq!(config.log_level, Level::INFO);
    }

    #[test]
    fn test_apply_settings() {
        let mut config = DashboardConfig::default();
        config.apply("api-url", "http://monitor.local:8080/").unwrap();
        config.apply("refresh-secs", "15").unwrap();
        config.apply("log-level", "debug").unwrap();
        config.apply("version", "1.2.0").unwrap();

        assert_eq!(config.api_url(), "http://monitor.local:8080");
        assert_eq!(config.refresh_interval, Duration::from_secs(15));
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.version.as_deref(), Some("1.2.0"));
    }

    #[test]
    fn test_empty_value_keeps_default() {
        let mut config = DashboardConfig::default();
        config.apply("metrics-container", "  ").unwrap();
        assert_eq!(config.metrics_container_id, DEFAULT_METRICS_CONTAINER);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let mut config = DashboardConfig::default();
        assert!(matches!(
            config.apply("refresh-secs", "0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(config.apply("refresh-secs", "soon").is_err());
        assert!(config.apply("api-url", "ftp://x").is_err());
        assert!(config.apply("log-level", "loud").is_err());
        assert_eq!(
            config.apply("colour", "blue"),
            Err(ConfigError::UnknownKey("colour".into()))
        );
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn test_apply_all_skips_invalid() {
        let mut config = DashboardConfig::default();
        config.apply_all(vec![
            ("refresh-secs", "-1".to_string()),
            ("optimize-button", "rebalance".to_string()),
        ]);
        assert_eq!(config.refresh_interval, DEFAULT_REFRESH_INTERVAL);
        assert_eq!(config.optimize_button_id, "rebalance");
    }

    #[test]
    fn test_thresholds() {
        let mut config = DashboardConfig::default();
        config.apply("high-cpu", "90").unwrap();
        config.apply("low-cpu", "25.5").unwrap();
        assert_eq!(
            config.thresholds,
            LoadThresholds {
                high_cpu: 90.0,
                low_cpu: 25.5
            }
        );

        assert!(config.apply("high-cpu", "120").is_err());
        assert!(config.apply("low-cpu", "95").is_err());
        assert_eq!(config.thresholds.low_cpu, 25.5);
    }

    #[test]
    fn test_every_setting_key_is_known() {
        let mut config = DashboardConfig::default();
        for key in SETTING_KEYS {
            assert!(!matches!(
                config.apply(key, "50"),
                Err(ConfigError::UnknownKey(_))
            ));
        }
    }
}
