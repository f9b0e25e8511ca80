//! Configuration module for pdf-search
//!
//! Handles loading and validating settings from YAML files and environment variables.

mod settings;

pub use settings::*;

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable naming an explicit settings file
pub const SETTINGS_PATH_ENV: &str = "PDFSEARCH_SETTINGS_PATH";

/// Serializes tests that touch process-wide environment variables
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Load settings, trying an explicit path first, then the usual locations.
///
/// Environment overrides are applied on top of whatever was found.
pub fn load(explicit: Option<&Path>) -> Result<Settings> {
    let mut settings = match explicit {
        Some(path) => {
            info!("Loading settings from: {}", path.display());
            Settings::from_file(path)?
        }
        None => match find_settings_file() {
            Some(path) => {
                info!("Loading settings from: {}", path.display());
                Settings::from_file(&path)?
            }
            None => {
                info!("No settings file found, using defaults");
                Settings::default()
            }
        },
    };

    settings.merge_env();
    settings.validate()?;
    Ok(settings)
}

fn find_settings_file() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(SETTINGS_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    let mut paths = vec![
        PathBuf::from("settings.yml"),
        PathBuf::from("config/settings.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("pdf-search/settings.yml"));
    }

    paths.into_iter().find(|p| p.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_guard() -> std::sync::MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let result = load(Some(Path::new("/nonexistent/pdf-search/settings.yml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let _guard = env_guard();
        let path = std::env::temp_dir().join(format!("pdf-search-load-{}.yml", std::process::id()));
        std::fs::write(&path, "search:\n  default_result_count: 30\n").unwrap();

        let settings = load(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(settings.search.default_result_count, 30);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let _guard = env_guard();
        let path = std::env::temp_dir().join(format!("pdf-search-invalid-{}.yml", std::process::id()));
        std::fs::write(&path, "search:\n  default_result_count: 7\n").unwrap();

        let result = load(Some(&path));
        std::fs::remove_file(&path).ok();

        assert!(result.is_err());
    }

    #[test]
    fn test_settings_path_variable() {
        let _guard = env_guard();
        let path = std::env::temp_dir().join(format!("pdf-search-env-{}.yml", std::process::id()));
        std::fs::write(&path, "search:\n  default_result_count: 50\n").unwrap();

        std::env::set_var(SETTINGS_PATH_ENV, &path);
        let found = find_settings_file();
        let settings = load(None);
        std::env::remove_var(SETTINGS_PATH_ENV);
        std::fs::remove_file(&path).ok();

        assert_eq!(found, Some(path));
        assert_eq!(settings.unwrap().search.default_result_count, 50);
    }

    #[test]
    fn test_settings_path_variable_ignored_when_missing() {
        let _guard = env_guard();
        let missing = std::env::temp_dir().join("pdf-search-does-not-exist.yml");

        std::env::set_var(SETTINGS_PATH_ENV, &missing);
        let found = find_settings_file();
        std::env::remove_var(SETTINGS_PATH_ENV);

        assert_ne!(found, Some(missing));
    }

    #[test]
    fn test_timeout_override_is_validated() {
        let _guard = env_guard();
        let path = std::env::temp_dir().join(format!("pdf-search-timeout-{}.yml", std::process::id()));
        std::fs::write(&path, "outgoing:\n  request_timeout: 10\n").unwrap();

        std::env::set_var("PDFSEARCH_TIMEOUT", "1e20");
        let result = load(Some(&path));
        std::env::remove_var("PDFSEARCH_TIMEOUT");
        std::fs::remove_file(&path).ok();

        assert!(result.is_err());
    }
}
