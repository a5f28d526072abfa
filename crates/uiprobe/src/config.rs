//! Harness configuration.
//!
//! Defaults mirror Playwright's: 5s action and assertion timeouts, 30s
//! navigation timeout. Values load from YAML and can be overridden from the
//! environment:
//!
//! | variable | field |
//! |---|---|
//! | `UIPROBE_BASE_URL` | `base_url` |
//! | `UIPROBE_UPLOAD_DIR` | `upload_dir` |
//! | `UIPROBE_HEADLESS` | `headless` |
//! | `UIPROBE_ACTION_TIMEOUT_MS` | `action_timeout_ms` |

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::driver::Viewport;
use crate::logging::LogFormat;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::WaitOptions;

/// Harness configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Site under test
    pub base_url: String,
    /// Actionability timeout for interactions
    pub action_timeout_ms: u64,
    /// Timeout for expectations and event waits
    pub assertion_timeout_ms: u64,
    /// Poll interval for waits
    pub poll_interval_ms: u64,
    /// Navigation timeout
    pub navigation_timeout_ms: u64,
    /// Base directory for upload files
    pub upload_dir: PathBuf,
    /// Run the browser without a window
    pub headless: bool,
    /// Page viewport
    pub viewport: Viewport,
    /// Browser executable (auto-detected when unset)
    pub chrome_path: Option<PathBuf>,
    /// Default tracing filter
    pub log_filter: String,
    /// Tracing output format
    pub log_format: LogFormat,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: "https://demoqa.com".to_string(),
            action_timeout_ms: 5_000,
            assertion_timeout_ms: 5_000,
            poll_interval_ms: 100,
            navigation_timeout_ms: 30_000,
            upload_dir: PathBuf::from("fixtures"),
            headless: true,
            viewport: Viewport::default(),
            chrome_path: None,
            log_filter: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl HarnessConfig {
    /// Create a config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse YAML; missing keys keep their defaults
    pub fn from_yaml_str(yaml: &str) -> ProbeResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ProbeResult<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|err| ProbeError::Config {
            message: format!("cannot read {}: {err}", path.display()),
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(self) -> ProbeResult<Self> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source
    pub fn apply_env_with<F>(mut self, lookup: F) -> ProbeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("UIPROBE_BASE_URL") {
            self.base_url = url;
        }
        if let Some(dir) = lookup("UIPROBE_UPLOAD_DIR") {
            self.upload_dir = PathBuf::from(dir);
        }
        if let Some(flag) = lookup("UIPROBE_HEADLESS") {
            self.headless = parse_flag("UIPROBE_HEADLESS", &flag)?;
        }
        if let Some(ms) = lookup("UIPROBE_ACTION_TIMEOUT_MS") {
            self.action_timeout_ms = ms.trim().parse().map_err(|_| ProbeError::Config {
                message: format!("UIPROBE_ACTION_TIMEOUT_MS must be milliseconds, got {ms:?}"),
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject configurations no scenario could run under
    pub fn validate(&self) -> ProbeResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ProbeError::Config {
                message: format!("base_url must be an http(s) URL, got {:?}", self.base_url),
            });
        }
        if self.poll_interval_ms == 0 {
            return Err(ProbeError::Config {
                message: "poll_interval_ms must be positive".to_string(),
            });
        }
        if self.action_timeout_ms == 0 || self.assertion_timeout_ms == 0 {
            return Err(ProbeError::Config {
                message: "timeouts must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the upload directory
    #[must_use]
    pub fn with_upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = dir.into();
        self
    }

    /// Set the actionability timeout
    #[must_use]
    pub const fn with_action_timeout(mut self, ms: u64) -> Self {
        self.action_timeout_ms = ms;
        self
    }

    /// Set the assertion timeout
    #[must_use]
    pub const fn with_assertion_timeout(mut self, ms: u64) -> Self {
        self.assertion_timeout_ms = ms;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Absolute URL of a site path
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Wait options for actionability checks
    #[must_use]
    pub const fn action_wait(&self) -> WaitOptions {
        WaitOptions {
            timeout_ms: self.action_timeout_ms,
            poll_interval_ms: self.poll_interval_ms,
        }
    }

    /// Wait options for expectations
    #[must_use]
    pub const fn assertion_wait(&self) -> WaitOptions {
        WaitOptions {
            timeout_ms: self.assertion_timeout_ms,
            poll_interval_ms: self.poll_interval_ms,
        }
    }
}

fn parse_flag(key: &str, value: &str) -> ProbeResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ProbeError::Config {
            message: format!("{key} must be a boolean, got {other:?}"),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    mod default_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let config = HarnessConfig::default();
            assert_eq!(config.base_url, "https://demoqa.com");
            assert_eq!(config.action_timeout_ms, 5_000);
            assert_eq!(config.navigation_timeout_ms, 30_000);
            assert!(config.headless);
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_url_join() {
            let config = HarnessConfig::default().with_base_url("https://demoqa.com/");
            assert_eq!(config.url("/alerts"), "https://demoqa.com/alerts");
            assert_eq!(config.url("text-box"), "https://demoqa.com/text-box");
            assert_eq!(config.url("https://other/x"), "https://other/x");
        }

        #[test]
        fn test_wait_options() {
            let config = HarnessConfig::default().with_assertion_timeout(10_000);
            assert_eq!(config.assertion_wait().timeout_ms, 10_000);
            assert_eq!(config.action_wait().poll_interval_ms, 100);
        }
    }

    mod yaml_tests {
        use super::*;

        #[test]
        fn test_partial_yaml_keeps_defaults() {
            let config = HarnessConfig::from_yaml_str("base_url: http://localhost:3000\nheadless: false\n")
                .unwrap();
            assert_eq!(config.base_url, "http://localhost:3000");
            assert!(!config.headless);
            assert_eq!(config.assertion_timeout_ms, 5_000);
        }

        #[test]
        fn test_yaml_file() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "action_timeout_ms: 750\nupload_dir: /tmp/uploads").unwrap();
            let config = HarnessConfig::from_yaml_file(file.path()).unwrap();
            assert_eq!(config.action_timeout_ms, 750);
            assert_eq!(config.upload_dir, PathBuf::from("/tmp/uploads"));
        }

        #[test]
        fn test_missing_file_is_config_error() {
            let err = HarnessConfig::from_yaml_file("/nonexistent/uiprobe.yaml").unwrap_err();
            assert!(matches!(err, ProbeError::Config { .. }));
        }

        #[test]
        fn test_invalid_yaml() {
            let err = HarnessConfig::from_yaml_str("action_timeout_ms: [").unwrap_err();
            assert!(matches!(err, ProbeError::Yaml(_)));
        }

        #[test]
        fn test_invalid_base_url() {
            let err = HarnessConfig::from_yaml_str("base_url: demoqa.com").unwrap_err();
            assert!(matches!(err, ProbeError::Config { .. }));
        }
    }

    mod env_tests {
        use super::*;

        #[test]
        fn test_overrides() {
            let config = HarnessConfig::default()
                .apply_env_with(env(&[
                    ("UIPROBE_BASE_URL", "http://127.0.0.1:8080"),
                    ("UIPROBE_UPLOAD_DIR", "assets"),
                    ("UIPROBE_HEADLESS", "off"),
                    ("UIPROBE_ACTION_TIMEOUT_MS", "2500"),
                ]))
                .unwrap();
            assert_eq!(config.base_url, "http://127.0.0.1:8080");
            assert_eq!(config.upload_dir, PathBuf::from("assets"));
            assert!(!config.headless);
            assert_eq!(config.action_timeout_ms, 2_500);
        }

        #[test]
        fn test_bad_flag() {
            let err = HarnessConfig::default()
                .apply_env_with(env(&[("UIPROBE_HEADLESS", "maybe")]))
                .unwrap_err();
            assert!(err.to_string().contains("UIPROBE_HEADLESS"));
        }

        #[test]
        fn test_bad_timeout() {
            assert!(HarnessConfig::default()
                .apply_env_with(env(&[("UIPROBE_ACTION_TIMEOUT_MS", "soon")]))
                .is_err());
        }

        #[test]
        fn test_no_overrides() {
            let config = HarnessConfig::default().apply_env_with(env(&[])).unwrap();
            assert_eq!(config, HarnessConfig::default());
        }
    }
}
