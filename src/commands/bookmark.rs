use anyhow::Result;
use colored::Colorize;

use crate::bookmarks::{BookmarkKind, BookmarkStore};
use crate::config::Settings;

fn open(kind: BookmarkKind) -> Result<BookmarkStore> {
    let settings = Settings::load()?;
    Ok(BookmarkStore::new(&settings.data_dir, kind))
}

pub fn list(kind: BookmarkKind) -> Result<()> {
    let store = open(kind)?;
    let ids = store.list();

    if ids.is_empty() {
        println!("{}", "No bookmarks".yellow());
        return Ok(());
    }
    for id in ids {
        println!("{}", id);
    }
    Ok(())
}

pub fn toggle(kind: BookmarkKind, id: String) -> Result<()> {
    let store = open(kind)?;
    if store.toggle(&id)? {
        println!("{} Bookmarked '{}'", "✓".green(), id.bright_cyan());
    } else {
        println!("{} Removed bookmark '{}'", "→".bright_blue(), id.bright_cyan());
    }
    Ok(())
}

pub fn clear(kind: BookmarkKind) -> Result<()> {
    let store = open(kind)?;
    store.clear()?;
    println!("{} Cleared {}", "✓".green(), store.kind().storage_key());
    Ok(())
}
