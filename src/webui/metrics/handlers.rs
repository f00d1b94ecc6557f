use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use tracing::info;

use crate::outbound::ingest::{parse_click, StoreClickSummary};
use crate::webui::client_request;
use crate::webui::error::{ApiError, ApiResult, INVALID_JSON_MESSAGE};

use super::SharedClickLog;

/// POST /api/metrics/v2/outbound-click: record one outbound click.
///
/// The body is parsed by hand: beacons may arrive without a JSON content type.
pub async fn record_click(
    State(clicks): State<SharedClickLog>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<serde_json::Value>> {
    let payload: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|_| ApiError::BadRequest(INVALID_JSON_MESSAGE.to_string()))?;

    let click = parse_click(&payload, &client_request(&headers), Utc::now())?;
    info!(
        store_id = %click.store_id,
        link_type = %click.link_type,
        source_path = %click.source_path,
        is_bot = click.is_bot,
        "Outbound click recorded"
    );
    clicks.lock().await.record(click);

    Ok(Json(serde_json::json!({ "ok": true })))
}

/// GET /api/metrics/v2/outbound-click: per-store click totals.
pub async fn click_summary(State(clicks): State<SharedClickLog>) -> Json<Vec<StoreClickSummary>> {
    Json(clicks.lock().await.summary())
}
