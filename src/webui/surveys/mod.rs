pub mod dto;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::Settings;

use dto::SurveyRecord;

/// Submitted surveys plus the text limits used to render them.
pub struct SurveyState {
    pub settings: Arc<Settings>,
    pub surveys: Mutex<VecDeque<SurveyRecord>>,
}

impl SurveyState {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self {
            settings,
            surveys: Mutex::new(VecDeque::new()),
        }
    }
}

pub type SharedSurveys = Arc<SurveyState>;

pub fn routes(state: SharedSurveys) -> Router {
    Router::new()
        .route("/api/comment-preview", post(handlers::comment_preview))
        .route(
            "/api/surveys",
            get(handlers::list_surveys).post(handlers::submit_survey),
        )
        .route("/api/surveys/{id}", get(handlers::get_survey))
        .route("/api/surveys/{id}/helpful", post(handlers::vote_helpful))
        .with_state(state)
}
