//! Outbound-click analytics: which external store links visitors follow.
//!
//! [`beacon`] builds and sends click events from the page side; [`ingest`]
//! sanitises and records them on the server side.

pub mod beacon;
pub mod ingest;

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub use beacon::{BeaconClient, OutboundClickEvent, OutboundClickPayload, PageContext};
pub use ingest::{ClickLog, ClickRequest, LinkClick};

/// Endpoint the beacon posts to
pub const OUTBOUND_CLICK_PATH: &str = "/api/metrics/v2/outbound-click";

/// Cookie holding the analytics session id
pub const SESSION_COOKIE_NAME: &str = "mc_sid";

/// Kind of external link a visitor clicked on a store page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Recruitment,
    Official,
    Line,
    X,
    Bsky,
    Phone,
    Email,
}

impl LinkType {
    pub const ALL: [LinkType; 7] = [
        LinkType::Recruitment,
        LinkType::Official,
        LinkType::Line,
        LinkType::X,
        LinkType::Bsky,
        LinkType::Phone,
        LinkType::Email,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkType::Recruitment => "recruitment",
            LinkType::Official => "official",
            LinkType::Line => "line",
            LinkType::X => "x",
            LinkType::Bsky => "bsky",
            LinkType::Phone => "phone",
            LinkType::Email => "email",
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LinkType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown link type '{}'", s))
    }
}

// ── Request metadata helpers ────────────────────────────────────────────────

/// Read a cookie value from a `Cookie` header.
///
/// The value is percent-decoded; if decoding fails the raw value is returned.
pub fn read_cookie(cookie_header: &str, name: &str) -> Option<String> {
    let pattern = format!(r"(?:^|;\s*){}=([^;]+)", regex::escape(name));
    let re = Regex::new(&pattern).ok()?;
    let raw = re.captures(cookie_header)?.get(1)?.as_str();
    match urlencoding::decode(raw) {
        Ok(decoded) => Some(decoded.into_owned()),
        Err(_) => Some(raw.to_string()),
    }
}

/// First value of `key` in a URL query string (with or without the leading `?`).
pub fn query_param(query: &str, key: &str) -> Option<String> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .find_map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            let k = decode_component(k);
            (k == key).then(|| decode_component(v))
        })
}

fn decode_component(value: &str) -> String {
    let spaced = value.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

/// Campaign parameters carried over from the landing URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtmParams {
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
}

/// Read `utm_source`, `utm_medium` and `utm_campaign`; blank values are dropped.
pub fn read_utm_params(query: &str) -> UtmParams {
    let read = |key: &str| {
        query_param(query, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };
    UtmParams {
        utm_source: read("utm_source"),
        utm_medium: read("utm_medium"),
        utm_campaign: read("utm_campaign"),
    }
}
