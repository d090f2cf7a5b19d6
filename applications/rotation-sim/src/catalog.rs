//! Item catalog stored as a JSON array of rated items

use crate::error::{Result, SimError};
use rotation_selection::{RatedItem, RatingSink, SelectionError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read the catalog file
pub fn load_catalog(path: &Path) -> Result<Vec<RatedItem>> {
    let contents = fs::read_to_string(path).map_err(|e| {
        SimError::Catalog(format!("Failed to read {}: {}", path.display(), e))
    })?;
    let items: Vec<RatedItem> = serde_json::from_str(&contents)?;
    debug!(path = %path.display(), count = items.len(), "Loaded catalog");
    Ok(items)
}

/// Rewrite the catalog file
pub fn save_catalog(path: &Path, items: &[RatedItem]) -> Result<()> {
    let contents = serde_json::to_string_pretty(items)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Writes rating and favorite changes back into the catalog file
#[derive(Debug, Clone)]
pub struct CatalogSink {
    path: PathBuf,
}

impl CatalogSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn modify(&self, id: &str, apply: impl FnOnce(&mut RatedItem)) -> rotation_selection::Result<()> {
        let persistence = |e: SimError| SelectionError::Persistence(e.to_string());

        let mut items = load_catalog(&self.path).map_err(persistence)?;
        let item = items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| SelectionError::UnknownItem(id.to_string()))?;
        apply(item);
        save_catalog(&self.path, &items).map_err(persistence)
    }
}

impl RatingSink for CatalogSink {
    fn persist_rating(&self, item: &RatedItem, rating: u8) -> rotation_selection::Result<()> {
        self.modify(&item.id, |stored| stored.rating = rating)
    }

    fn persist_favorite(&self, item: &RatedItem, is_favorite: bool) -> rotation_selection::Result<()> {
        self.modify(&item.id, |stored| stored.is_favorite = is_favorite)
    }
}
