//! Settings structures for pdf-search configuration

use crate::query::{is_valid_result_count, DEFAULT_RESULT_COUNT};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;
use url::Url;

/// Longest accepted request timeout, in seconds
pub const MAX_REQUEST_TIMEOUT: f64 = 3600.0;

/// Read a boolean switch the way people write them in env files
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Main settings structure matching settings.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub service: ServiceSettings,
    pub outgoing: OutgoingSettings,
    pub search: SearchSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(settings)
    }

    /// Merge with environment variables (PDFSEARCH_* prefix)
    pub fn merge_env(&mut self) {
        self.merge_vars(|key| std::env::var(key).ok());
    }

    /// Apply `PDFSEARCH_*` overrides from any variable source
    pub fn merge_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("PDFSEARCH_BASE_URL") {
            self.service.base_url = val;
        }
        if let Some(val) = lookup("PDFSEARCH_SEARCH_PATH") {
            self.service.search_path = val;
        }
        if let Some(val) = lookup("PDFSEARCH_TIMEOUT") {
            match val.trim().parse() {
                Ok(timeout) => self.outgoing.request_timeout = timeout,
                Err(_) => warn!("Ignoring PDFSEARCH_TIMEOUT='{}': not a number", val),
            }
        }
        if let Some(val) = lookup("PDFSEARCH_REJECT_INVERTED_RANGE") {
            match parse_flag(&val) {
                Some(flag) => self.search.reject_inverted_page_range = flag,
                None => warn!(
                    "Ignoring PDFSEARCH_REJECT_INVERTED_RANGE='{}': expected true or false",
                    val
                ),
            }
        }
    }

    /// Full URL of the search endpoint: the base URL with `search_path`
    /// appended to whatever path it already has
    pub fn endpoint(&self) -> Result<Url> {
        let mut endpoint = Url::parse(&self.service.base_url)
            .with_context(|| format!("invalid service base_url '{}'", self.service.base_url))?;
        if endpoint.cannot_be_a_base() {
            bail!("service base_url '{}' cannot carry a path", self.service.base_url);
        }

        let path = format!(
            "{}/{}",
            endpoint.path().trim_end_matches('/'),
            self.service.search_path.trim_start_matches('/')
        );
        endpoint.set_path(&path);
        Ok(endpoint)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        self.endpoint()?;
        let timeout = self.outgoing.request_timeout;
        if !timeout.is_finite() || timeout <= 0.0 || timeout > MAX_REQUEST_TIMEOUT {
            bail!(
                "outgoing.request_timeout must be between 0 and {} seconds, got {}",
                MAX_REQUEST_TIMEOUT,
                timeout
            );
        }
        if !is_valid_result_count(self.search.default_result_count) {
            bail!(
                "search.default_result_count must be a multiple of 10 between 10 and 100, got {}",
                self.search.default_result_count
            );
        }
        Ok(())
    }
}

/// Location of the external search service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Scheme, host and port of the service
    pub base_url: String,
    /// Path of the search endpoint, resolved against `base_url`
    pub search_path: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            search_path: "/api/search".to_string(),
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Request timeout in seconds. The service opens every candidate PDF
    /// when filtering by page count, so this is generous.
    pub request_timeout: f64,
    /// Appended to the default user agent
    pub useragent_suffix: Option<String>,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: 120.0,
            useragent_suffix: None,
            verify_ssl: true,
            proxies: ProxySettings::default(),
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

/// Search form behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Result count used when the user does not pick one
    pub default_result_count: u32,
    /// Fail locally when max pages is below min pages instead of asking the service
    pub reject_inverted_page_range: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_result_count: DEFAULT_RESULT_COUNT,
            reject_inverted_page_range: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.search.default_result_count, 10);
        assert!(!settings.search.reject_inverted_page_range);
        assert!(settings.validate().is_ok());
        assert_eq!(
            settings.endpoint().unwrap().as_str(),
            "http://127.0.0.1:8000/api/search"
        );
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "service:\n  base_url: \"https://pdfs.example.org\"\nsearch:\n  reject_inverted_page_range: true\n";
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(settings.service.search_path, "/api/search");
        assert_eq!(settings.outgoing.request_timeout, 120.0);
        assert!(settings.search.reject_inverted_page_range);
        assert_eq!(
            settings.endpoint().unwrap().as_str(),
            "https://pdfs.example.org/api/search"
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut settings = Settings::default();
        settings.search.default_result_count = 15;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.outgoing.request_timeout = 0.0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.service.base_url = "not a url".to_string();
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.outgoing.request_timeout = 1e20;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.outgoing.request_timeout = MAX_REQUEST_TIMEOUT;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let mut settings = Settings::default();
        for base in ["https://host.example/pdf", "https://host.example/pdf/"] {
            settings.service.base_url = base.to_string();
            assert_eq!(
                settings.endpoint().unwrap().as_str(),
                "https://host.example/pdf/api/search"
            );
        }

        settings.service.search_path = "search".to_string();
        assert_eq!(
            settings.endpoint().unwrap().as_str(),
            "https://host.example/pdf/search"
        );

        settings.service.base_url = "mailto:someone@example.org".to_string();
        assert!(settings.endpoint().is_err());
    }

    #[test]
    fn test_merge_vars_applies_overrides() {
        let vars: HashMap<&str, &str> = [
            ("PDFSEARCH_BASE_URL", "https://pdfs.example.org/v2"),
            ("PDFSEARCH_SEARCH_PATH", "/find"),
            ("PDFSEARCH_TIMEOUT", "45.5"),
            ("PDFSEARCH_REJECT_INVERTED_RANGE", "yes"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings.merge_vars(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(settings.outgoing.request_timeout, 45.5);
        assert!(settings.search.reject_inverted_page_range);
        assert_eq!(
            settings.endpoint().unwrap().as_str(),
            "https://pdfs.example.org/v2/find"
        );
    }

    #[test]
    fn test_merge_vars_ignores_unparseable_values() {
        let mut settings = Settings::default();
        settings.search.reject_inverted_page_range = true;
        settings.merge_vars(|key| match key {
            "PDFSEARCH_TIMEOUT" => Some("soon".to_string()),
            "PDFSEARCH_REJECT_INVERTED_RANGE" => Some("maybe".to_string()),
            _ => None,
        });

        assert_eq!(settings.outgoing.request_timeout, 120.0);
        assert!(settings.search.reject_inverted_page_range);
    }

    #[test]
    fn test_parse_flag() {
        for raw in ["1", "true", "TRUE", " yes ", "on"] {
            assert_eq!(parse_flag(raw), Some(true), "{}", raw);
        }
        for raw in ["0", "false", "No", "off", ""] {
            assert_eq!(parse_flag(raw), Some(false), "{}", raw);
        }
        assert_eq!(parse_flag("enabled"), None);
    }

    #[test]
    fn test_merge_env_reads_process_environment() {
        let _guard = crate::config::ENV_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        std::env::set_var("PDFSEARCH_BASE_URL", "http://10.0.0.5:9000");
        std::env::set_var("PDFSEARCH_SEARCH_PATH", "/api/v1/search");
        std::env::set_var("PDFSEARCH_TIMEOUT", "15");
        std::env::set_var("PDFSEARCH_REJECT_INVERTED_RANGE", "1");

        let mut settings = Settings::default();
        settings.merge_env();

        for key in [
            "PDFSEARCH_BASE_URL",
            "PDFSEARCH_SEARCH_PATH",
            "PDFSEARCH_TIMEOUT",
            "PDFSEARCH_REJECT_INVERTED_RANGE",
        ] {
            std::env::remove_var(key);
        }

        assert_eq!(
            settings.endpoint().unwrap().as_str(),
            "http://10.0.0.5:9000/api/v1/search"
        );
        assert_eq!(settings.outgoing.request_timeout, 15.0);
        assert!(settings.search.reject_inverted_page_range);

        let mut untouched = Settings::default();
        untouched.merge_env();
        assert_eq!(untouched.service.base_url, "http://127.0.0.1:8000");
        assert!(!untouched.search.reject_inverted_page_range);
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("pdf-search-settings-{}.yml", std::process::id()));
        std::fs::write(&path, "outgoing:\n  request_timeout: 30.5\n").unwrap();

        let settings = Settings::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(settings.outgoing.request_timeout, 30.5);
        assert_eq!(settings.service.base_url, "http://127.0.0.1:8000");
    }
}
