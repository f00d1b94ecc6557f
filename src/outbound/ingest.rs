//! Server-side handling of outbound-click beacons.
//!
//! Beacon bodies come from browsers and are untrusted: every field is
//! checked for type, trimmed and length-capped before it is recorded.

use std::collections::{BTreeMap, VecDeque};
use std::sync::LazyLock;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::{read_cookie, LinkType, SESSION_COOKIE_NAME};

const STORE_ID_MAX: usize = 120;
const STORE_NAME_MAX: usize = 240;
const LINK_TYPE_MAX: usize = 32;
const TARGET_URL_MAX: usize = 2000;
const SESSION_ID_MAX: usize = 120;
const UTM_SOURCE_MAX: usize = 120;
const UTM_MEDIUM_MAX: usize = 120;
const UTM_CAMPAIGN_MAX: usize = 200;

/// Session id recorded when neither the body nor the cookie carries one
pub const UNKNOWN_SESSION: &str = "unknown";

static BOT_USER_AGENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"bot|crawler|spider|headless|preview|fetch|scrape|monitor|httpclient|wget|curl|postman|axios|python|go-http-client|okhttp|java",
    )
    .unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClickRejection {
    #[error("storeIdが必要です。")]
    MissingStoreId,
    #[error("linkTypeが不正です。")]
    InvalidLinkType,
    #[error("targetUrlが必要です。")]
    MissingTargetUrl,
}

/// Request headers that feed into a recorded click.
#[derive(Debug, Clone, Default)]
pub struct ClickRequest {
    pub cookie: Option<String>,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    pub cf_connecting_ip: Option<String>,
    pub forwarded_for: Option<String>,
}

impl ClickRequest {
    /// Best-effort client IP: the CDN header first, then the first forwarded hop.
    pub fn client_ip(&self) -> Option<String> {
        if let Some(ip) = self.cf_connecting_ip.as_deref() {
            return Some(ip.trim().to_string());
        }
        self.forwarded_for
            .as_deref()
            .and_then(|f| f.split(',').next())
            .map(|ip| ip.trim().to_string())
            .filter(|ip| !ip.is_empty())
    }

    /// `ip|user-agent`, the input to the visitor hash.
    pub fn client_key(&self) -> String {
        format!(
            "{}|{}",
            self.client_ip().unwrap_or_default(),
            self.user_agent.as_deref().unwrap_or("")
        )
    }

    /// Hash identifying one visitor for vote de-duplication.
    pub fn voter_hash(&self) -> String {
        hash_text(self.client_key().trim())
    }
}

/// A validated click, ready to be stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkClick {
    pub id: String,
    pub occurred_at: String,
    pub session_id: String,
    pub visitor_hash: String,
    pub source_path: String,
    pub store_id: String,
    pub store_name: Option<String>,
    pub link_type: LinkType,
    pub target_url: String,
    pub referrer_host: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub is_bot: bool,
}

// ── Sanitising ──────────────────────────────────────────────────────────────

/// Trimmed string value cut to `max_len` characters; non-strings and blanks are `None`.
pub fn sanitize_optional_text(value: Option<&Value>, max_len: usize) -> Option<String> {
    let trimmed = value?.as_str()?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(max_len).collect())
}

fn sanitize_str(value: Option<&str>, max_len: usize) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(max_len).collect())
}

/// Site-relative path, or `None` if the value is not one.
pub fn normalize_path(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    trimmed.starts_with('/').then(|| trimmed.to_string())
}

/// Lowercased host of a referrer URL.
pub fn extract_referrer_host(value: Option<&str>) -> Option<String> {
    let parsed = reqwest::Url::parse(value?).ok()?;
    let host = parsed.host_str()?.trim().to_lowercase();
    if host.is_empty() {
        return None;
    }
    match parsed.port() {
        Some(port) => Some(format!("{host}:{port}")),
        None => Some(host),
    }
}

pub fn is_bot_user_agent(user_agent: Option<&str>) -> bool {
    match user_agent {
        Some(ua) if !ua.is_empty() => BOT_USER_AGENT.is_match(&ua.to_lowercase()),
        _ => false,
    }
}

/// Hex-encoded SHA-256 of `value`.
pub fn hash_text(value: &str) -> String {
    format!("{:x}", Sha256::digest(value.as_bytes()))
}

/// Validate a beacon body and turn it into a click record.
pub fn parse_click(
    body: &Value,
    request: &ClickRequest,
    now: DateTime<Utc>,
) -> Result<LinkClick, ClickRejection> {
    let field = |name: &str| body.as_object().and_then(|o| o.get(name));

    let store_id =
        sanitize_optional_text(field("storeId"), STORE_ID_MAX).ok_or(ClickRejection::MissingStoreId)?;
    let link_type = sanitize_optional_text(field("linkType"), LINK_TYPE_MAX)
        .and_then(|t| t.parse::<LinkType>().ok())
        .ok_or(ClickRejection::InvalidLinkType)?;
    let target_url = sanitize_optional_text(field("targetUrl"), TARGET_URL_MAX)
        .ok_or(ClickRejection::MissingTargetUrl)?;

    let source_path =
        normalize_path(field("path").and_then(Value::as_str)).unwrap_or_else(|| "/".to_string());

    let cookie_session = request
        .cookie
        .as_deref()
        .and_then(|c| read_cookie(c, SESSION_COOKIE_NAME));
    let session_id = sanitize_optional_text(field("sessionId"), SESSION_ID_MAX)
        .or_else(|| sanitize_str(cookie_session.as_deref(), SESSION_ID_MAX))
        .unwrap_or_else(|| UNKNOWN_SESSION.to_string());

    let referrer_host = extract_referrer_host(field("referrer").and_then(Value::as_str))
        .or_else(|| extract_referrer_host(request.referer.as_deref()));

    Ok(LinkClick {
        id: uuid::Uuid::new_v4().to_string(),
        occurred_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        session_id,
        visitor_hash: hash_text(&request.client_key()),
        source_path,
        store_id,
        store_name: sanitize_optional_text(field("storeName"), STORE_NAME_MAX),
        link_type,
        target_url,
        referrer_host,
        utm_source: sanitize_optional_text(field("utmSource"), UTM_SOURCE_MAX),
        utm_medium: sanitize_optional_text(field("utmMedium"), UTM_MEDIUM_MAX),
        utm_campaign: sanitize_optional_text(field("utmCampaign"), UTM_CAMPAIGN_MAX),
        is_bot: is_bot_user_agent(request.user_agent.as_deref()),
    })
}

// ── Storage ─────────────────────────────────────────────────────────────────

/// Per-store click totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreClickSummary {
    pub store_id: String,
    pub store_name: Option<String>,
    pub total: usize,
    pub by_link_type: BTreeMap<LinkType, usize>,
}

/// Clicks kept in memory before the oldest are dropped
pub const MAX_CLICKS: usize = 10_000;

/// In-process record of received clicks, bounded to the most recent ones.
#[derive(Debug)]
pub struct ClickLog {
    clicks: VecDeque<LinkClick>,
    capacity: usize,
}

impl Default for ClickLog {
    fn default() -> Self {
        Self::with_capacity(MAX_CLICKS)
    }
}

impl ClickLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log holding at most `capacity` clicks (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            clicks: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&mut self, click: LinkClick) {
        if self.clicks.len() >= self.capacity {
            self.clicks.pop_front();
        }
        self.clicks.push_back(click);
    }

    pub fn len(&self) -> usize {
        self.clicks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clicks.is_empty()
    }

    /// Retained clicks, oldest first.
    pub fn clicks(&self) -> &VecDeque<LinkClick> {
        &self.clicks
    }

    /// Click counts per store over the retained clicks, ignoring bot traffic,
    /// most clicked first.
    pub fn summary(&self) -> Vec<StoreClickSummary> {
        let mut by_store: BTreeMap<&str, StoreClickSummary> = BTreeMap::new();
        for click in self.clicks.iter().filter(|c| !c.is_bot) {
            let entry = by_store
                .entry(click.store_id.as_str())
                .or_insert_with(|| StoreClickSummary {
                    store_id: click.store_id.clone(),
                    store_name: None,
                    total: 0,
                    by_link_type: BTreeMap::new(),
                });
            if click.store_name.is_some() {
                entry.store_name = click.store_name.clone();
            }
            entry.total += 1;
            *entry.by_link_type.entry(click.link_type).or_insert(0) += 1;
        }

        let mut summary: Vec<StoreClickSummary> = by_store.into_values().collect();
        summary.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.store_id.cmp(&b.store_id)));
        summary
    }
}
