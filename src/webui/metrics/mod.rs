pub mod handlers;

use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::outbound::{ClickLog, OUTBOUND_CLICK_PATH};

pub type SharedClickLog = Arc<Mutex<ClickLog>>;

pub fn routes(clicks: SharedClickLog) -> Router {
    Router::new()
        .route(
            OUTBOUND_CLICK_PATH,
            get(handlers::click_summary).post(handlers::record_click),
        )
        .with_state(clicks)
}
