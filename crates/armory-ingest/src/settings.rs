//! Run configuration.
//!
//! Loaded from an optional TOML file layered under `ARMORY_*` environment
//! variables. Nested keys use `__`, e.g.
//! `ARMORY_SOURCE__SHEET__API_KEY`.

use std::path::{Path, PathBuf};

use armory_core::{
  schema::HeaderSchema,
  store::PersistOptions,
  workaround::{GenreFilter, StrongIdOverride, Workarounds},
};
use armory_store_fs::IconSource;
use serde::Deserialize;

use crate::Result;

/// Top-level configuration for the `armory` binary.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
  /// Directory holding one sub-directory per partition.
  pub store_root:      PathBuf,
  /// Deep-merge into existing documents rather than replacing them.
  #[serde(default = "default_merge")]
  pub merge:           bool,
  #[serde(default)]
  pub source:          Option<SourceConfig>,
  /// Extra header labels accepted for a column.
  #[serde(default)]
  pub header_aliases:  Vec<HeaderAlias>,
  #[serde(default)]
  pub excluded_genres: Vec<String>,
  #[serde(default)]
  pub overrides:       Vec<StrongIdOverride>,
  #[serde(default)]
  pub icons:           Option<IconConfig>,
  #[serde(default)]
  pub server:          ServerConfig,
}

fn default_merge() -> bool { true }

/// Where the row grid comes from.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceConfig {
  /// A JSON file holding the grid as an array of rows.
  File { path: PathBuf },
  /// A remote spreadsheet tab.
  Sheet(SheetConfig),
}

#[derive(Debug, Clone, Deserialize)]
pub struct SheetConfig {
  #[serde(default = "default_endpoint")]
  pub endpoint:       String,
  pub spreadsheet_id: String,
  pub tab:            String,
  #[serde(default)]
  pub api_key:        Option<String>,
}

fn default_endpoint() -> String { "https://sheets.googleapis.com".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct HeaderAlias {
  pub alias: String,
  /// Canonical column key, e.g. `displayName`.
  pub key:   String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IconConfig {
  pub images_dir:   PathBuf,
  #[serde(default = "default_url_template")]
  pub url_template: String,
  pub cdn_host:     String,
}

fn default_url_template() -> String { "{cdn}/images/units/{file}".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host: String,
  #[serde(default = "default_port")]
  pub port: u16,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

impl Default for ServerConfig {
  fn default() -> Self { Self { host: default_host(), port: default_port() } }
}

impl IngestConfig {
  /// Load `path` (if it exists) overlaid with `ARMORY_*` variables.
  pub fn load(path: Option<&Path>) -> Result<Self> {
    let mut builder = ::config::Config::builder();
    if let Some(path) = path {
      builder = builder.add_source(::config::File::from(path).required(false));
    }
    let settings = builder
      .add_source(
        ::config::Environment::with_prefix("ARMORY")
          .prefix_separator("_")
          .separator("__"),
      )
      .build()?;
    Ok(settings.try_deserialize()?)
  }

  pub fn persist_options(&self) -> PersistOptions { PersistOptions { merge: self.merge } }

  /// The header matcher with every configured alias registered.
  pub fn header_schema(&self) -> Result<HeaderSchema> {
    let mut schema = HeaderSchema::default();
    for HeaderAlias { alias, key } in &self.header_aliases {
      schema = schema.with_alias(alias, key)?;
    }
    Ok(schema)
  }

  /// The genre filter followed by every override, in configured order.
  /// Fails on an override whose `strong_id` is not a slug.
  pub fn workarounds(&self) -> Result<Workarounds> {
    let mut patches = Workarounds::new();
    if !self.excluded_genres.is_empty() {
      patches = patches.with(GenreFilter { excluded: self.excluded_genres.clone() });
    }
    for pin in &self.overrides {
      pin.validate()?;
      patches = patches.with(pin.clone());
    }
    Ok(patches)
  }

  pub fn icon_source(&self) -> Option<IconSource> {
    self.icons.as_ref().map(|icons| IconSource {
      images_dir:   icons.images_dir.clone(),
      url_template: icons.url_template.clone(),
      cdn_host:     icons.cdn_host.clone(),
    })
  }
}

#[cfg(test)]
mod tests {
  use ::config::{Config, File, FileFormat};
  use armory_core::civ::Civ;

  use super::*;

  fn parse(toml: &str) -> IngestConfig {
    Config::builder()
      .add_source(File::from_str(toml, FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn minimal_config_uses_defaults() {
    let cfg = parse(r#"store_root = "data/units""#);
    assert_eq!(cfg.store_root, PathBuf::from("data/units"));
    assert!(cfg.merge);
    assert!(cfg.source.is_none());
    assert!(cfg.workarounds().unwrap().is_empty());
    assert_eq!(cfg.server.port, 8080);
  }

  #[test]
  fn full_config_deserializes() {
    let cfg = parse(
      r#"
        store_root = "units"
        merge = false
        excluded_genres = ["Building", "Technology"]

        [source.sheet]
        spreadsheet_id = "abc123"
        tab = "Units"
        api_key = "secret"

        [[header_aliases]]
        alias = "Unit Name"
        key = "displayName"

        [[overrides]]
        display_name = "Villager"
        civ = "en"
        strong_id = "villager-1-english"

        [icons]
        images_dir = "images"
        cdn_host = "https://cdn.example"
      "#,
    );
    assert!(!cfg.persist_options().merge);
    let Some(SourceConfig::Sheet(sheet)) = &cfg.source else {
      panic!("expected a sheet source");
    };
    assert_eq!(sheet.endpoint, "https://sheets.googleapis.com");
    assert_eq!(sheet.api_key.as_deref(), Some("secret"));
    assert_eq!(cfg.overrides[0].civ, Some(Civ::En));
    assert_eq!(cfg.workarounds().unwrap().len(), 2);
    assert_eq!(
      cfg.icon_source().unwrap().url_template,
      "{cdn}/images/units/{file}"
    );
    assert!(cfg.header_schema().unwrap().accepts(
      armory_core::schema::Column::DisplayName,
      "unit name"
    ));
  }

  #[test]
  fn override_with_path_like_strong_id_is_rejected() {
    let cfg = parse(
      r#"
        store_root = "units"
        [[overrides]]
        display_name = "Villager"
        strong_id = "../../Escaped Villager"
      "#,
    );
    assert!(matches!(
      cfg.workarounds(),
      Err(crate::Error::Core(armory_core::Error::InvalidIdentifier(_)))
    ));
  }

  #[test]
  fn unknown_alias_key_is_rejected() {
    let cfg = parse(
      r#"
        store_root = "units"
        [[header_aliases]]
        alias = "Colour"
        key = "color"
      "#,
    );
    assert!(matches!(
      cfg.header_schema(),
      Err(crate::Error::Core(armory_core::Error::UnknownColumnKey(_)))
    ));
  }
}
