//! Recruitment settings and environment variable handling.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Fallback redirect target after a signup changes state.
pub const DEFAULT_SUCCESS_URL: &str = "/recruitment/processes/";

/// Settings for the recruitment subsystem.
///
/// Values come from `repository.toml`'s `[recruitment]` section when present,
/// then environment variables override them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Mount the recruitment routes at all.
    pub instructor_recruitment_enabled: bool,
    /// Hosts accepted in absolute `next` redirect targets.
    pub allowed_hosts: Vec<String>,
    /// Delay before the new-instructor email job runs.
    pub new_instructor_delay_sec: u64,
    /// Where to go when `next` is missing or unsafe.
    pub success_url: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            instructor_recruitment_enabled: true,
            allowed_hosts: vec!["localhost".to_string(), "127.0.0.1".to_string()],
            new_instructor_delay_sec: 3600,
            success_url: DEFAULT_SUCCESS_URL.to_string(),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl AppSettings {
    /// Defaults overridden by environment variables.
    ///
    /// # Environment Variables
    /// - `INSTRUCTOR_RECRUITMENT_ENABLED` (default: true)
    /// - `ALLOWED_HOSTS`: comma separated (default: `localhost,127.0.0.1`)
    /// - `NEW_INSTRUCTOR_DELAY_SEC` (default: 3600)
    /// - `RECRUITMENT_SUCCESS_URL` (default: `/recruitment/processes/`)
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply environment variables on top of `self`. Unparseable values are
    /// ignored with a warning.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(raw) = env::var("INSTRUCTOR_RECRUITMENT_ENABLED") {
            match parse_flag(&raw) {
                Some(flag) => self.instructor_recruitment_enabled = flag,
                None => log::warn!("Ignoring INSTRUCTOR_RECRUITMENT_ENABLED={raw:?}"),
            }
        }

        if let Ok(raw) = env::var("ALLOWED_HOSTS") {
            self.allowed_hosts = raw
                .split(',')
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Ok(raw) = env::var("NEW_INSTRUCTOR_DELAY_SEC") {
            match raw.parse::<u64>() {
                Ok(secs) => self.new_instructor_delay_sec = secs,
                Err(_) => log::warn!("Ignoring NEW_INSTRUCTOR_DELAY_SEC={raw:?}"),
            }
        }

        if let Ok(url) = env::var("RECRUITMENT_SUCCESS_URL") {
            if !url.is_empty() {
                self.success_url = url;
            }
        }

        self
    }

    pub fn new_instructor_delay(&self) -> Duration {
        Duration::from_secs(self.new_instructor_delay_sec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = AppSettings::default();
        assert!(settings.instructor_recruitment_enabled);
        assert_eq!(settings.allowed_hosts, vec!["localhost", "127.0.0.1"]);
        assert_eq!(settings.new_instructor_delay(), Duration::from_secs(3600));
        assert_eq!(settings.success_url, DEFAULT_SUCCESS_URL);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" off "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: AppSettings = toml::from_str("new_instructor_delay_sec = 60").unwrap();
        assert_eq!(settings.new_instructor_delay_sec, 60);
        assert!(settings.instructor_recruitment_enabled);
    }
}
