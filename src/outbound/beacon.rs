use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{read_cookie, read_utm_params, LinkType, OUTBOUND_CLICK_PATH, SESSION_COOKIE_NAME};

const BEACON_TIMEOUT: Duration = Duration::from_secs(5);

/// What the store page knows about a clicked link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundClickPayload {
    pub store_id: String,
    pub store_name: String,
    pub link_type: LinkType,
    pub target_url: String,
}

/// The page the click happened on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContext {
    pub path: String,
    pub referrer: Option<String>,
    pub cookie_header: Option<String>,
    pub query: Option<String>,
}

/// Body of the outbound-click beacon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundClickEvent {
    pub store_id: String,
    pub store_name: String,
    pub link_type: LinkType,
    pub target_url: String,
    pub path: String,
    pub referrer: Option<String>,
    pub session_id: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
}

impl OutboundClickEvent {
    pub fn from_context(payload: OutboundClickPayload, page: &PageContext) -> Self {
        let utm = read_utm_params(page.query.as_deref().unwrap_or(""));
        let path = if page.path.is_empty() {
            "/".to_string()
        } else {
            page.path.clone()
        };

        Self {
            store_id: payload.store_id,
            store_name: payload.store_name,
            link_type: payload.link_type,
            target_url: payload.target_url,
            path,
            referrer: page.referrer.clone().filter(|r| !r.is_empty()),
            session_id: page
                .cookie_header
                .as_deref()
                .and_then(|header| read_cookie(header, SESSION_COOKIE_NAME)),
            utm_source: utm.utm_source,
            utm_medium: utm.utm_medium,
            utm_campaign: utm.utm_campaign,
        }
    }
}

/// Posts outbound-click events to the metrics endpoint.
#[derive(Debug, Clone)]
pub struct BeaconClient {
    http: reqwest::Client,
    endpoint: String,
}

impl BeaconClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(BEACON_TIMEOUT)
            .build()
            .context("Building beacon HTTP client")?;
        Ok(Self {
            http,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), OUTBOUND_CLICK_PATH),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one event, failing on transport errors and non-2xx responses.
    pub async fn send(&self, event: &OutboundClickEvent) -> Result<()> {
        let res = self
            .http
            .post(&self.endpoint)
            .json(event)
            .send()
            .await
            .context("Sending outbound click beacon")?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            anyhow::bail!("Outbound click rejected ({status}): {body}");
        }

        debug!(
            store_id = %event.store_id,
            link_type = %event.link_type,
            "Outbound click delivered"
        );
        Ok(())
    }

    /// Fire-and-forget tracking: failures are logged, never returned.
    ///
    /// Returns whether the event was accepted.
    pub async fn track(&self, payload: OutboundClickPayload, page: &PageContext) -> bool {
        let event = OutboundClickEvent::from_context(payload, page);
        match self.send(&event).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, endpoint = %self.endpoint, "Outbound click not recorded");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> OutboundClickPayload {
        OutboundClickPayload {
            store_id: "s1".to_string(),
            store_name: "まこと".to_string(),
            link_type: LinkType::Line,
            target_url: "https://line.me/R/ti/p/@makoto".to_string(),
        }
    }

    #[test]
    fn test_event_from_context() {
        let page = PageContext {
            path: "/stores/s1".to_string(),
            referrer: Some("https://www.google.com/".to_string()),
            cookie_header: Some("mc_sid=sess-1".to_string()),
            query: Some("?utm_source=x".to_string()),
        };
        let event = OutboundClickEvent::from_context(payload(), &page);
        assert_eq!(event.path, "/stores/s1");
        assert_eq!(event.session_id.as_deref(), Some("sess-1"));
        assert_eq!(event.utm_source.as_deref(), Some("x"));
        assert_eq!(event.utm_medium, None);
    }

    #[test]
    fn test_event_defaults_for_empty_page() {
        let event = OutboundClickEvent::from_context(payload(), &PageContext::default());
        assert_eq!(event.path, "/");
        assert_eq!(event.referrer, None);
        assert_eq!(event.session_id, None);
    }

    #[test]
    fn test_event_serializes_nulls() {
        let event = OutboundClickEvent::from_context(payload(), &PageContext::default());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["linkType"], "line");
        assert!(json["referrer"].is_null());
        assert!(json["utmCampaign"].is_null());
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let client = BeaconClient::new("http://localhost:8787/").unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:8787/api/metrics/v2/outbound-click"
        );
    }

    #[tokio::test]
    async fn test_track_unreachable_returns_false() {
        // port 9 (discard) is not listening on test machines
        let client = BeaconClient::new("http://127.0.0.1:9").unwrap();
        assert!(!client.track(payload(), &PageContext::default()).await);
    }
}
