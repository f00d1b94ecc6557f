use anyhow::Result;
use colored::Colorize;

use crate::comment_text::{build_comment_preview, build_limited_comment_with, gallery_caption, OverflowPolicy};
use crate::config::Settings;

use super::read_fragments;

/// Print the limited comment (or the gallery caption) for the given fragments.
pub fn run(fragments: Vec<String>, limit: Option<usize>, strict: bool, caption: bool) -> Result<()> {
    let settings = Settings::load()?;
    let fragments = read_fragments(fragments)?;
    let limit = limit.unwrap_or(settings.comment_limit);
    let policy = if strict {
        OverflowPolicy::Truncate
    } else {
        settings.overflow_policy
    };

    let text = if caption {
        gallery_caption(fragments.iter().map(Option::as_deref), limit, policy)
    } else {
        build_limited_comment_with(fragments.iter().map(Option::as_deref), limit, policy)
    };
    println!("{}", text);
    Ok(())
}

/// Print the card preview, with `…` when text was cut.
pub fn preview(fragments: Vec<String>, limit: Option<usize>, always_ellipsis: bool, json: bool) -> Result<()> {
    let settings = Settings::load()?;
    let fragments = read_fragments(fragments)?;
    let preview = build_comment_preview(
        fragments.iter().map(Option::as_deref),
        limit.unwrap_or(settings.preview_limit),
        always_ellipsis,
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&preview)?);
        return Ok(());
    }

    if preview.has_more {
        println!("{}{}", preview.text, "…".bright_black());
    } else {
        println!("{}", preview.text);
    }
    Ok(())
}
