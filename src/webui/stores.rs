//! Admin store registration.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::schema::StoreInput;

use super::error::ApiResult;
use super::extractors::ValidJson;
use super::{push_bounded, MAX_STORES};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRecord {
    pub id: String,
    pub display_name: String,
    #[serde(flatten)]
    pub store: StoreInput,
}

pub type SharedStores = Arc<Mutex<VecDeque<StoreRecord>>>;

pub fn routes(stores: SharedStores) -> Router {
    Router::new()
        .route(
            "/api/admin/stores",
            get(list_stores).post(register_store),
        )
        .with_state(stores)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredStore {
    pub id: String,
    pub display_name: String,
}

pub async fn register_store(
    State(stores): State<SharedStores>,
    ValidJson(store): ValidJson<StoreInput>,
) -> ApiResult<Json<RegisteredStore>> {
    let record = StoreRecord {
        id: Uuid::new_v4().to_string(),
        display_name: store.display_name(),
        store,
    };
    info!(id = %record.id, name = %record.display_name, "Store registered");

    let response = RegisteredStore {
        id: record.id.clone(),
        display_name: record.display_name.clone(),
    };
    push_bounded(&mut *stores.lock().await, record, MAX_STORES);
    Ok(Json(response))
}

pub async fn list_stores(State(stores): State<SharedStores>) -> Json<Vec<StoreRecord>> {
    Json(stores.lock().await.iter().cloned().collect())
}
