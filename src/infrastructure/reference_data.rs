//! Reference data loader.
//!
//! Reads the bundled rules content: plain JSON arrays for spells, feats,
//! backgrounds and magic items, and newline-delimited JSON for the bestiary.
//! A missing or broken file never stops startup; the affected collection is
//! simply empty.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::fs;

use crate::domain::aggregates::ReferenceCatalog;

pub const SPELLS_FILE: &str = "spells.json";
pub const FEATS_FILE: &str = "feats.json";
pub const BACKGROUNDS_FILE: &str = "backgrounds.json";
pub const MAGIC_ITEMS_FILE: &str = "magic_items.json";
pub const BESTIARY_FILE: &str = "bestiary.ndjson";

/// Errors that can occur while loading a reference file.
#[derive(Debug, Error)]
pub enum ReferenceLoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Data file not found: {0}")]
    DataFileNotFound(PathBuf),
}

/// Loads reference records from an assets directory.
pub struct ReferenceDataLoader {
    assets_dir: PathBuf,
}

impl ReferenceDataLoader {
    pub fn new(assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            assets_dir: assets_dir.into(),
        }
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    /// Load a file holding one JSON array of records.
    pub async fn load_json_array<T: DeserializeOwned>(
        &self,
        filename: &str,
    ) -> Result<Vec<T>, ReferenceLoadError> {
        let path = self.assets_dir.join(filename);
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(ReferenceLoadError::DataFileNotFound(path));
        }
        let content = fs::read_to_string(&path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Load a newline-delimited JSON file. Lines that fail to decode are
    /// skipped with a warning; blank lines are ignored.
    pub async fn load_ndjson<T: DeserializeOwned>(
        &self,
        filename: &str,
    ) -> Result<Vec<T>, ReferenceLoadError> {
        let path = self.assets_dir.join(filename);
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(ReferenceLoadError::DataFileNotFound(path));
        }
        let content = fs::read_to_string(&path).await?;

        let mut records = Vec::new();
        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(
                    file = filename,
                    line = index + 1,
                    error = %e,
                    "Skipping undecodable record"
                ),
            }
        }
        Ok(records)
    }

    /// Load every reference collection concurrently into a catalog.
    pub async fn load_catalog(&self) -> ReferenceCatalog {
        let (spells, feats, backgrounds, monsters, magic_items) = tokio::join!(
            self.load_json_array(SPELLS_FILE),
            self.load_json_array(FEATS_FILE),
            self.load_json_array(BACKGROUNDS_FILE),
            self.load_ndjson(BESTIARY_FILE),
            self.load_json_array(MAGIC_ITEMS_FILE),
        );

        let catalog = ReferenceCatalog::new(
            or_empty(SPELLS_FILE, spells),
            or_empty(FEATS_FILE, feats),
            or_empty(BACKGROUNDS_FILE, backgrounds),
            or_empty(BESTIARY_FILE, monsters),
            or_empty(MAGIC_ITEMS_FILE, magic_items),
        );

        tracing::info!(
            spells = catalog.spells().len(),
            feats = catalog.feats().len(),
            backgrounds = catalog.backgrounds().len(),
            monsters = catalog.monsters().len(),
            magic_items = catalog.magic_items().len(),
            "Reference data loaded"
        );
        catalog
    }
}

fn or_empty<T>(filename: &str, result: Result<Vec<T>, ReferenceLoadError>) -> Vec<T> {
    match result {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(file = filename, error = %e, "Reference data unavailable, using empty collection");
            Vec::new()
        }
    }
}
