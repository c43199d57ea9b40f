//! Row sources: where the header-plus-rows grid is read from.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use armory_core::schema::Cell;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{
  Error, Result,
  settings::{SheetConfig, SourceConfig},
};

/// A two-dimensional value grid; row 0 is the header.
pub type Grid = Vec<Vec<Cell>>;

/// A configured grid source.
#[derive(Debug, Clone)]
pub enum GridSource {
  File(PathBuf),
  Sheet(SheetSource),
}

impl GridSource {
  /// Build the source. A sheet source without an API key fails here, before
  /// anything is fetched.
  pub fn from_config(config: &SourceConfig) -> Result<Self> {
    match config {
      SourceConfig::File { path } => Ok(Self::File(path.clone())),
      SourceConfig::Sheet(sheet) => Ok(Self::Sheet(SheetSource::new(sheet)?)),
    }
  }

  pub async fn fetch(&self) -> Result<Grid> {
    match self {
      Self::File(path) => read_grid(path).await,
      Self::Sheet(sheet) => sheet.fetch().await,
    }
  }
}

async fn read_grid(path: &Path) -> Result<Grid> {
  let bytes = tokio::fs::read(path).await.map_err(|source| Error::Io {
    path: path.to_path_buf(),
    source,
  })?;
  let grid: Grid = serde_json::from_slice(&bytes).map_err(|source| Error::Grid {
    path: path.to_path_buf(),
    source,
  })?;
  debug!(path = %path.display(), rows = grid.len(), "grid read from file");
  Ok(grid)
}

// ─── Remote sheet ────────────────────────────────────────────────────────────

/// A spreadsheet tab served by a values endpoint:
/// `GET {endpoint}/v4/spreadsheets/{id}/values/{tab}?key={api_key}`.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct SheetSource {
  client:         Client,
  endpoint:       String,
  spreadsheet_id: String,
  tab:            String,
  api_key:        String,
}

#[derive(Deserialize)]
struct ValueRange {
  #[serde(default)]
  values: Grid,
}

impl SheetSource {
  pub fn new(config: &SheetConfig) -> Result<Self> {
    let api_key = config
      .api_key
      .as_deref()
      .map(str::trim)
      .filter(|k| !k.is_empty())
      .ok_or(Error::MissingCredential("source.sheet.api_key"))?;
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self {
      client,
      endpoint: config.endpoint.trim_end_matches('/').to_string(),
      spreadsheet_id: config.spreadsheet_id.clone(),
      tab: config.tab.clone(),
      api_key: api_key.to_string(),
    })
  }

  fn url(&self) -> String {
    format!(
      "{}/v4/spreadsheets/{}/values/{}",
      self.endpoint, self.spreadsheet_id, self.tab
    )
  }

  pub async fn fetch(&self) -> Result<Grid> {
    let url = self.url();
    let range: ValueRange = self
      .client
      .get(&url)
      .query(&[("key", &self.api_key)])
      .send()
      .await?
      .error_for_status()?
      .json()
      .await?;
    info!(%url, rows = range.values.len(), "sheet fetched");
    Ok(range.values)
  }
}
