//! Bookmarked stores and surveys, persisted as JSON id lists.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

/// What a bookmark list holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum BookmarkKind {
    Store,
    Survey,
}

impl BookmarkKind {
    /// Storage key, shared with the browser's local storage layout
    pub fn storage_key(&self) -> &'static str {
        match self {
            BookmarkKind::Store => "store-bookmarks",
            BookmarkKind::Survey => "survey-bookmarks",
        }
    }
}

/// One bookmark list stored at `<data_dir>/<storage-key>.json`.
#[derive(Debug, Clone)]
pub struct BookmarkStore {
    kind: BookmarkKind,
    path: PathBuf,
}

impl BookmarkStore {
    pub fn new(data_dir: &Path, kind: BookmarkKind) -> Self {
        Self {
            kind,
            path: data_dir.join(format!("{}.json", kind.storage_key())),
        }
    }

    pub fn kind(&self) -> BookmarkKind {
        self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bookmarked ids in insertion order. Missing or unreadable storage is empty.
    pub fn list(&self) -> Vec<String> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_str::<Vec<String>>(&contents) {
            Ok(ids) => ids,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring malformed bookmark file");
                Vec::new()
            }
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.list().iter().any(|b| b == id)
    }

    /// Add `id` if absent, remove it if present. Returns whether it is now bookmarked.
    pub fn toggle(&self, id: &str) -> Result<bool> {
        let mut ids = self.list();
        let bookmarked = if let Some(pos) = ids.iter().position(|b| b == id) {
            ids.remove(pos);
            false
        } else {
            ids.push(id.to_string());
            true
        };
        self.write(&ids)?;
        debug!(kind = self.kind.storage_key(), id, bookmarked, "Bookmark toggled");
        Ok(bookmarked)
    }

    pub fn clear(&self) -> Result<()> {
        self.write(&[])
    }

    fn write(&self, ids: &[String]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create bookmark directory")?;
        }
        let contents = serde_json::to_string(ids).context("Failed to serialize bookmarks")?;
        fs::write(&self.path, contents).context("Failed to write bookmarks")?;
        Ok(())
    }
}
