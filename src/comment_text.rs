//! Combining optional free-text comment fields into captions and previews.
//!
//! Survey records carry several independent comment fields. Pages show them
//! joined by newlines, either as a short caption (whole fragments only) or as
//! a preview cut at an exact character budget.

use serde::{Deserialize, Serialize};

/// Default character budget for list previews
pub const DEFAULT_PREVIEW_LIMIT: usize = 120;

/// Character budget for photo-gallery captions
pub const GALLERY_COMMENT_LIMIT: usize = 60;

/// Caption shown when a survey has no usable comment
pub const NO_COMMENT_PLACEHOLDER: &str = "コメントなし";

const SEPARATOR: char = '\n';

/// What to do when the very first fragment alone is longer than the limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Return the fragment whole, even though it exceeds the limit.
    #[default]
    KeepFirst,
    /// Cut the fragment at the limit so the result always fits.
    Truncate,
}

impl OverflowPolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            OverflowPolicy::Truncate
        } else {
            OverflowPolicy::KeepFirst
        }
    }
}

/// A joined preview plus whether the reader should see an ellipsis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPreview {
    pub text: String,
    pub has_more: bool,
}

// ── Helpers ─────────────────────────────────────────────────────────────────

/// Same character set as JavaScript's `String.prototype.trim`.
fn is_trimmed(c: char) -> bool {
    (c.is_whitespace() && c != '\u{85}') || c == '\u{feff}'
}

fn trim_fragment(text: &str) -> &str {
    text.trim_matches(is_trimmed)
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// First `count` characters of `text`, never splitting a code point.
fn take_chars(text: &str, count: usize) -> &str {
    match text.char_indices().nth(count) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Trim every fragment and drop the absent or blank ones, keeping order.
pub fn clean_fragments<I, S>(fragments: I) -> Vec<String>
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    fragments
        .into_iter()
        .flatten()
        .filter_map(|fragment| {
            let trimmed = trim_fragment(fragment.as_ref());
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .collect()
}

// ── Builders ────────────────────────────────────────────────────────────────

/// Join fragments with newlines, keeping only whole fragments that fit in `limit`.
///
/// A first fragment that is already too long is returned whole.
pub fn build_limited_comment<I, S>(fragments: I, limit: usize) -> String
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    build_limited_comment_with(fragments, limit, OverflowPolicy::KeepFirst)
}

/// [`build_limited_comment`] with an explicit policy for an oversized first fragment.
pub fn build_limited_comment_with<I, S>(fragments: I, limit: usize, policy: OverflowPolicy) -> String
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    let mut combined = String::new();
    let mut combined_len = 0;

    for text in clean_fragments(fragments) {
        let separator_len = usize::from(!combined.is_empty());
        let text_len = char_len(&text);

        if combined_len + separator_len + text_len > limit {
            if !combined.is_empty() {
                return combined;
            }
            return match policy {
                OverflowPolicy::KeepFirst => text,
                OverflowPolicy::Truncate => take_chars(&text, limit).to_string(),
            };
        }

        if separator_len > 0 {
            combined.push(SEPARATOR);
        }
        combined.push_str(&text);
        combined_len += separator_len + text_len;
    }

    combined
}

/// Join fragments with newlines and cut the result at exactly `limit` characters.
///
/// `has_more` is set when anything was cut, or when `always_ellipsis` is set
/// and the text is non-empty.
pub fn build_comment_preview<I, S>(fragments: I, limit: usize, always_ellipsis: bool) -> CommentPreview
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    let mut combined = String::new();
    let mut combined_len = 0;
    let mut truncated = false;

    for text in clean_fragments(fragments) {
        let separator_len = usize::from(!combined.is_empty());
        let text_len = char_len(&text);

        if combined_len + separator_len + text_len > limit {
            // remaining = limit - accumulated - separator; nothing is appended unless it is positive
            let remaining = limit.saturating_sub(combined_len + separator_len);
            if remaining > 0 {
                if separator_len > 0 {
                    combined.push(SEPARATOR);
                }
                combined.push_str(take_chars(&text, remaining));
            }
            truncated = true;
            break;
        }

        if separator_len > 0 {
            combined.push(SEPARATOR);
        }
        combined.push_str(&text);
        combined_len += separator_len + text_len;
    }

    let has_more = truncated || (always_ellipsis && !combined.is_empty());
    CommentPreview {
        text: combined,
        has_more,
    }
}

/// Preview with the list defaults (120 characters, ellipsis only when cut).
pub fn build_default_preview<I, S>(fragments: I) -> CommentPreview
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    build_comment_preview(fragments, DEFAULT_PREVIEW_LIMIT, false)
}

/// Caption shown under survey photos, normally with [`GALLERY_COMMENT_LIMIT`].
pub fn gallery_caption<I, S>(fragments: I, limit: usize, policy: OverflowPolicy) -> String
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    let caption = build_limited_comment_with(fragments, limit, policy);
    if caption.is_empty() {
        NO_COMMENT_PLACEHOLDER.to_string()
    } else {
        caption
    }
}
