//! Icon attachment: match stored records against an image directory and
//! merge an `icon` URL into each match.

use std::path::PathBuf;

use armory_core::{
  normalize::interpolate,
  store::{Partition, UnitStore},
  unit::Unit,
};
use serde_json::json;
use tokio::fs;
use tracing::{debug, info};

use crate::{Error, FsStore, Result};

/// Where icons live locally and how their public URL is built.
#[derive(Debug, Clone)]
pub struct IconSource {
  pub images_dir:   PathBuf,
  /// Placeholders: `{cdn}`, `{file}`, `{id}`, `{baseId}`.
  pub url_template: String,
  pub cdn_host:     String,
}

/// Candidate file names in lookup order: `<id>.png`, `<baseId>.png`, then
/// `<baseId>-1.png` through `<baseId>-4.png`.
pub fn icon_candidates(id: &str, base_id: &str) -> Vec<String> {
  let mut names = vec![format!("{id}.png"), format!("{base_id}.png")];
  names.extend((1..=4).map(|n| format!("{base_id}-{n}.png")));
  names
}

impl IconSource {
  async fn find(&self, unit: &Unit) -> Result<Option<String>> {
    for name in icon_candidates(&unit.id, &unit.base_id) {
      let path = self.images_dir.join(&name);
      if fs::try_exists(&path).await.map_err(Error::io(&path))? {
        return Ok(Some(name));
      }
    }
    Ok(None)
  }

  pub fn url_for(&self, unit: &Unit, file: &str) -> String {
    interpolate(&self.url_template, |key| match key {
      "cdn" => Some(self.cdn_host.trim_end_matches('/').to_string()),
      "file" => Some(file.to_string()),
      "id" => Some(unit.id.clone()),
      "baseId" => Some(unit.base_id.clone()),
      _ => None,
    })
  }
}

/// Attach icons to every stored record that has a matching image. Returns
/// the number of documents updated.
pub async fn attach_icons(store: &FsStore, source: &IconSource) -> Result<usize> {
  let mut attached = 0;
  for partition in Partition::all() {
    for unit in store.list(partition).await? {
      let Some(file) = source.find(&unit).await? else {
        debug!(id = %unit.id, %partition, "no icon found");
        continue;
      };
      let url = source.url_for(&unit, &file);
      store
        .merge_document(partition, &unit.id, json!({ "icon": url }))
        .await?;
      attached += 1;
    }
  }
  info!(attached, "icons attached");
  Ok(attached)
}
