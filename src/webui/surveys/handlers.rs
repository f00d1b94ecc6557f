use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::comment_text::{build_comment_preview, gallery_caption, CommentPreview};
use crate::schema::SurveyDraftInput;
use crate::sort::sort_items;
use crate::webui::error::{ApiError, ApiResult};
use crate::webui::extractors::ValidJson;
use crate::webui::{client_request, push_bounded, MAX_SURVEYS};

use super::dto::{
    HelpfulVote, PreviewRequest, SubmittedSurvey, SurveyDetail, SurveyPage, SurveyQuery, SurveyRecord,
    SurveySummary,
};
use super::SharedSurveys;

fn survey_not_found() -> ApiError {
    ApiError::NotFound("アンケートが見つかりません。".to_string())
}

// ── Handlers ────────────────────────────────────────────────────────────────

/// POST /api/comment-preview
pub async fn comment_preview(
    State(state): State<SharedSurveys>,
    ValidJson(body): ValidJson<PreviewRequest>,
) -> Json<CommentPreview> {
    let limit = body.limit.unwrap_or(state.settings.preview_limit);
    Json(build_comment_preview(
        body.fragments.iter().map(Option::as_deref),
        limit,
        body.always_ellipsis,
    ))
}

pub async fn submit_survey(
    State(state): State<SharedSurveys>,
    ValidJson(input): ValidJson<SurveyDraftInput>,
) -> ApiResult<Json<SubmittedSurvey>> {
    let settings = &state.settings;
    let fields = input.comment_fields();
    let response = SubmittedSurvey {
        id: Uuid::new_v4().to_string(),
        caption: gallery_caption(fields, settings.comment_limit, settings.overflow_policy),
        preview: build_comment_preview(fields, settings.preview_limit, false),
    };

    info!(
        id = %response.id,
        store_name = %input.store_name,
        prefecture = %input.prefecture,
        "Survey submitted"
    );

    push_bounded(
        &mut *state.surveys.lock().await,
        SurveyRecord::new(response.id.clone(), Utc::now(), input),
        MAX_SURVEYS,
    );

    Ok(Json(response))
}

pub async fn list_surveys(
    State(state): State<SharedSurveys>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<SurveyPage> {
    let query = SurveyQuery::from_params(&params);
    debug!(?query, "Listing surveys");

    let mut matching: Vec<SurveyRecord> = state
        .surveys
        .lock()
        .await
        .iter()
        .filter(|record| query.matches(record))
        .cloned()
        .collect();
    sort_items(&mut matching, query.sort);

    let total = matching.len();
    let items = matching
        .iter()
        .skip(query.offset())
        .take(query.limit as usize)
        .map(|record| SurveySummary::from_record(record, &state.settings))
        .collect();

    Json(SurveyPage {
        items,
        page: query.page,
        limit: query.limit,
        total,
    })
}

pub async fn get_survey(
    State(state): State<SharedSurveys>,
    Path(id): Path<String>,
) -> ApiResult<Json<SurveyDetail>> {
    let surveys = state.surveys.lock().await;
    let record = surveys
        .iter()
        .find(|record| record.id == id)
        .ok_or_else(survey_not_found)?;

    Ok(Json(SurveyDetail::from_record(record, &state.settings)))
}

/// POST /api/surveys/{id}/helpful: one vote per visitor.
pub async fn vote_helpful(
    State(state): State<SharedSurveys>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<HelpfulVote>> {
    let voter_hash = client_request(&headers).voter_hash();

    let mut surveys = state.surveys.lock().await;
    let record = surveys
        .iter_mut()
        .find(|record| record.id == id)
        .ok_or_else(survey_not_found)?;

    let counted = record.vote_helpful(voter_hash);
    debug!(id = %record.id, counted, "Helpful vote");

    Ok(Json(HelpfulVote {
        count: record.helpful_count(),
        already: !counted,
    }))
}
