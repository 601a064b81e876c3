use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use plotmap_engine::{FetchSettings, UploadSettings};
use plotmap_logging::{plot_info, LogDestination};
use serde::{Deserialize, Serialize};

use crate::Cli;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "plotmap.ron";
pub const API_URL_ENV: &str = "PLOTMAP_API_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_overlay_bytes: u64,
    pub upload_chunk_bytes: usize,
    pub output_dir: PathBuf,
    pub log_destination: LogDestination,
}

impl Default for AppConfig {
    fn default() -> Self {
        let upload = UploadSettings::default();
        let fetch = FetchSettings::default();
        Self {
            api_url: upload.api_base,
            connect_timeout_secs: upload.connect_timeout.as_secs(),
            request_timeout_secs: upload.request_timeout.as_secs(),
            max_overlay_bytes: fetch.max_bytes,
            upload_chunk_bytes: upload.chunk_size,
            output_dir: PathBuf::from("."),
            log_destination: LogDestination::default(),
        }
    }
}

impl AppConfig {
    pub fn from_ron(text: &str) -> anyhow::Result<Self> {
        ron::from_str(text).context("invalid configuration")
    }

    /// Reads `path`, or [`DEFAULT_CONFIG_FILE`] if it exists; defaults otherwise.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.is_file() {
                    return Ok(Self::default());
                }
                fallback
            }
        };
        let text = fs::read_to_string(&path)
            .with_context(|| format!("could not read config {}", path.display()))?;
        let config =
            Self::from_ron(&text).with_context(|| format!("in {}", path.display()))?;
        plot_info!("loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Full precedence chain: file, then environment, then flags.
    pub fn resolve(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = Self::load(cli.config.as_deref())?;
        config.apply_env(|key| std::env::var(key).ok());
        config.apply_cli(cli);
        Ok(config)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(API_URL_ENV).filter(|url| !url.trim().is_empty()) {
            self.api_url = url;
        }
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(url) = &cli.api_url {
            self.api_url = url.clone();
        }
        if let Some(dir) = &cli.output_dir {
            self.output_dir = dir.clone();
        }
        if let Some(destination) = cli.log {
            self.log_destination = destination;
        }
    }

    pub fn upload_settings(&self) -> UploadSettings {
        UploadSettings {
            api_base: self.api_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            chunk_size: self.upload_chunk_bytes,
        }
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            max_bytes: self.max_overlay_bytes,
            ..FetchSettings::default()
        }
    }
}
