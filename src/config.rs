//! Settings loaded from an optional TOML file and `SLAWATCH_*` variables.
//!
//! # Configuration
//!
//! ```toml
//! api_key = "NRAK-..."
//! app_id = "123456"
//! app_title = "Storefront"
//! page_size = 12
//! export_dir = "exports"
//!
//! [[maintenance_windows]]
//! from = "2021-04-24 09:00"
//! to = "2021-04-24 15:00"
//! ```
//!
//! Every key can also be set from the environment, e.g. `SLAWATCH_API_KEY`.
//! Command-line flags are applied on top by the binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use config::{Config, Environment, File};
use serde::Deserialize;

use slawatch_client::batch::MAX_BATCH_REQUESTS;
use slawatch_client::{NewRelicClient, DEFAULT_ENDPOINT};

use crate::data::classify::{Classifier, MaintenanceWindow};
use crate::data::pager::DEFAULT_PAGE_SIZE;
use crate::session::{Session, BUILD_DEFAULT_API_KEY};

const WINDOW_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A maintenance window as written in the settings file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WindowSetting {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_key: Option<String>,
    pub app_id: Option<String>,
    pub app_title: String,
    pub api_url: String,
    pub timeout_secs: u64,
    pub max_batch_requests: u64,
    pub page_size: usize,
    pub export_dir: PathBuf,
    pub maintenance_windows: Vec<WindowSetting>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            app_id: None,
            app_title: String::new(),
            api_url: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 10,
            max_batch_requests: MAX_BATCH_REQUESTS,
            page_size: DEFAULT_PAGE_SIZE,
            export_dir: PathBuf::from("."),
            maintenance_windows: vec![WindowSetting {
                from: "2021-04-24 09:00".to_string(),
                to: "2021-04-24 15:00".to_string(),
            }],
        }
    }
}

impl Settings {
    /// Load settings from `path` (if given) layered under the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(Environment::with_prefix("SLAWATCH").try_parsing(true))
            .build()
            .context("failed to load configuration")?;

        config
            .try_deserialize()
            .context("invalid configuration")
    }

    /// The configured API key, falling back to the build-time default.
    pub fn effective_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.is_empty())
            .or_else(|| BUILD_DEFAULT_API_KEY.map(str::to_string))
    }

    pub fn maintenance_windows(&self) -> Result<Vec<MaintenanceWindow>> {
        self.maintenance_windows
            .iter()
            .map(|w| {
                let from = parse_wall_clock(&w.from)?;
                let to = parse_wall_clock(&w.to)?;
                if from >= to {
                    anyhow::bail!("maintenance window {} .. {} is empty", w.from, w.to);
                }
                Ok(MaintenanceWindow::new(from, to))
            })
            .collect()
    }

    pub fn classifier(&self) -> Result<Classifier> {
        Ok(Classifier::new(self.maintenance_windows()?))
    }

    pub fn client(&self) -> Result<NewRelicClient> {
        NewRelicClient::builder()
            .endpoint(&self.api_url)
            .timeout(Duration::from_secs(self.timeout_secs))
            .max_batch_requests(self.max_batch_requests)
            .build()
            .context("failed to build API client")
    }

    pub fn session(&self) -> Session {
        Session::new(
            self.effective_api_key(),
            self.app_id.clone(),
            self.app_title.clone(),
        )
    }
}

fn parse_wall_clock(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), WINDOW_FORMAT)
        .with_context(|| format!("invalid wall-clock time {:?}, expected YYYY-MM-DD HH:MM", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn settings_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.api_url, DEFAULT_ENDPOINT);
        assert_eq!(settings.page_size, 12);
        assert_eq!(settings.max_batch_requests, 3500);

        let windows = settings.maintenance_windows().unwrap();
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].from.format("%Y-%m-%d %H:%M").to_string(), "2021-04-24 09:00");
    }

    #[test]
    fn test_load_from_file() {
        let file = settings_file(
            r#"
api_key = "secret"
app_id = "42"
app_title = "Storefront"
page_size = 20

[[maintenance_windows]]
from = "2022-01-01 10:00"
to = "2022-01-01 12:30"
"#,
        );

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.api_key.as_deref(), Some("secret"));
        assert_eq!(settings.app_id.as_deref(), Some("42"));
        assert_eq!(settings.page_size, 20);
        // Unset keys keep their defaults
        assert_eq!(settings.timeout_secs, 10);

        let session = settings.session();
        assert_eq!(session.app_title(), "Storefront");
        assert_eq!(session.api_key(), Some("secret"));

        let windows = settings.maintenance_windows().unwrap();
        assert_eq!(windows[0].to.format("%H:%M").to_string(), "12:30");
    }

    #[test]
    fn test_bad_window_is_rejected() {
        let settings = Settings {
            maintenance_windows: vec![WindowSetting {
                from: "yesterday".to_string(),
                to: "2022-01-01 12:30".to_string(),
            }],
            ..Settings::default()
        };
        assert!(settings.classifier().is_err());

        let settings = Settings {
            maintenance_windows: vec![WindowSetting {
                from: "2022-01-01 12:30".to_string(),
                to: "2022-01-01 10:00".to_string(),
            }],
            ..Settings::default()
        };
        assert!(settings.maintenance_windows().is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let path = Path::new("/nonexistent/slawatch.toml");
        assert!(Settings::load(Some(path)).is_err());
    }

    #[test]
    fn test_client_uses_configured_endpoint() {
        let settings = Settings {
            api_url: "http://localhost:9999/v2/".to_string(),
            ..Settings::default()
        };
        let client = settings.client().unwrap();
        assert_eq!(client.endpoint(), "http://localhost:9999/v2");
    }
}
