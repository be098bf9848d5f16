use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::pager::PAGE_SIZE;
use crate::service::{graphql::GraphqlService, mock::MockService, PaymentRequestService, RequestStatus};

const APP_DIR: &str = "declined-payments";
const MOCK_RECORDS: usize = 120;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    Mock,
    Graphql,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub source: DataSource,
    pub endpoint: String,
    pub api_key: String,
    pub currency_symbol: String,
    pub page_size: u32,
    pub status: RequestStatus,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: DataSource::Mock,
            endpoint: String::new(),
            api_key: String::new(),
            currency_symbol: "$".to_string(),
            page_size: PAGE_SIZE,
            status: RequestStatus::Declined,
        }
    }
}

impl AppConfig {
    /// A GraphQL source is usable only once both endpoint and key are known.
    pub fn is_complete(&self) -> bool {
        match self.source {
            DataSource::Mock => true,
            DataSource::Graphql => !self.endpoint.is_empty() && !self.api_key.is_empty(),
        }
    }

    pub fn clamped_page_size(&self) -> u32 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    /// The stored config with only the fields the setup wizard edits taken
    /// from `edited`. Command-line overrides in `edited` are left out.
    pub fn with_setup_from(&self, edited: &AppConfig) -> AppConfig {
        let mut merged = self.clone();
        merged.source = edited.source;
        if edited.source == DataSource::Graphql {
            merged.endpoint = edited.endpoint.clone();
            merged.api_key = edited.api_key.clone();
        }
        merged
    }
}

pub fn build_service(config: &AppConfig) -> Arc<dyn PaymentRequestService> {
    match config.source {
        DataSource::Mock => Arc::new(MockService::new(MOCK_RECORDS)),
        DataSource::Graphql => Arc::new(GraphqlService::new(
            config.endpoint.clone(),
            config.api_key.clone(),
        )),
    }
}

pub fn app_dir() -> PathBuf {
    let dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR);
    std::fs::create_dir_all(&dir).ok();
    dir
}

fn config_path() -> PathBuf {
    app_dir().join("config.json")
}

pub fn log_path() -> PathBuf {
    app_dir().join("declined-payments.log")
}

/// `Ok(None)` when no config has been saved yet.
pub fn load_config() -> Result<Option<AppConfig>> {
    load_config_from(&config_path())
}

pub fn save_config(config: &AppConfig) -> Result<()> {
    save_config_to(&config_path(), config)
}

pub fn load_config_from(path: &Path) -> Result<Option<AppConfig>> {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };
    let config = serde_json::from_str(&data)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(config))
}

pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<()> {
    let data = serde_json::to_string_pretty(config)?;
    std::fs::write(path, data)?;
    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}
