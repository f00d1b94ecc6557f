use std::collections::{HashMap, HashSet};

use chrono::{DateTime, SecondsFormat, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::comment_text::{build_comment_preview, gallery_caption, CommentPreview};
use crate::config::Settings;
use crate::format::{format_comment_time, format_decimal1, format_visited_period, format_wait_time};
use crate::query_params::{parse_number_param, parse_positive_int_param};
use crate::schema::{SurveyDraftInput, WorkType};
use crate::sort::{ListSort, SortFields, Sortable};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 50;
const MAX_PAGE: i64 = 10_000;

/// `spec` and `age` filters match within this distance
const NUMERIC_FILTER_RADIUS: f64 = 5.0;

// ── Stored records ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SurveyRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub input: SurveyDraftInput,
    /// Visitor hashes that marked the survey helpful
    pub helpful_voters: HashSet<String>,
}

impl SurveyRecord {
    pub fn new(id: String, created_at: DateTime<Utc>, input: SurveyDraftInput) -> Self {
        Self {
            id,
            created_at,
            input,
            helpful_voters: HashSet::new(),
        }
    }

    /// Count one helpful vote per visitor. Returns whether this vote was new.
    pub fn vote_helpful(&mut self, voter_hash: String) -> bool {
        self.helpful_voters.insert(voter_hash)
    }

    pub fn helpful_count(&self) -> usize {
        self.helpful_voters.len()
    }
}

impl Sortable for SurveyRecord {
    fn sort_fields(&self) -> SortFields<'_> {
        SortFields {
            visited_period: &self.input.visited_period,
            average_earning: Some(self.input.average_earning),
            rating: Some(self.input.rating),
            created_at: self.created_at,
        }
    }
}

// ── Requests ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    #[garde(length(max = 32))]
    pub fragments: Vec<Option<String>>,
    #[serde(default)]
    #[garde(range(max = 10_000))]
    pub limit: Option<usize>,
    #[serde(default)]
    #[garde(skip)]
    pub always_ellipsis: bool,
}

/// Filters and paging for the survey list, read from the query string.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyQuery {
    pub page: i64,
    pub limit: i64,
    pub sort: ListSort,
    pub name: Option<String>,
    pub prefecture: Option<String>,
    pub industry: Option<String>,
    pub spec: Option<f64>,
    pub age: Option<f64>,
}

impl SurveyQuery {
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let text = |key: &str| {
            params
                .get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let raw = |key: &str| params.get(key).map(String::as_str);
        let or_default = |key: &str, default: &'static str| -> String {
            text(key).unwrap_or_else(|| default.to_string())
        };

        Self {
            page: parse_positive_int_param(Some(&or_default("page", "1")), 1, 1, MAX_PAGE),
            limit: parse_positive_int_param(
                Some(&or_default("limit", "10")),
                DEFAULT_PAGE_SIZE,
                1,
                MAX_PAGE_SIZE,
            ),
            sort: ListSort::parse(raw("sort")),
            name: text("name"),
            prefecture: text("prefecture"),
            industry: text("industry"),
            spec: parse_number_param(raw("spec")),
            age: parse_number_param(raw("age")),
        }
    }

    pub fn offset(&self) -> usize {
        ((self.page - 1) * self.limit).max(0) as usize
    }

    pub fn matches(&self, record: &SurveyRecord) -> bool {
        let survey = &record.input;
        if let Some(name) = &self.name {
            let haystacks = [
                Some(survey.store_name.as_str()),
                survey.branch_name.as_deref(),
                Some(survey.industry.as_str()),
                survey.genre.as_deref(),
            ];
            if !haystacks.iter().flatten().any(|h| h.contains(name.as_str())) {
                return false;
            }
        }
        if self.prefecture.as_ref().is_some_and(|p| *p != survey.prefecture) {
            return false;
        }
        if self.industry.as_ref().is_some_and(|i| *i != survey.industry) {
            return false;
        }
        if self.spec.is_some_and(|s| (survey.spec_score - s).abs() > NUMERIC_FILTER_RADIUS) {
            return false;
        }
        if self.age.is_some_and(|a| (survey.age - a).abs() > NUMERIC_FILTER_RADIUS) {
            return false;
        }
        true
    }
}

// ── Responses ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveySummary {
    pub id: String,
    pub store_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,
    pub prefecture: String,
    pub industry: String,
    pub work_type: WorkType,
    pub work_type_label: &'static str,
    pub visited_period: String,
    pub visited_period_label: String,
    pub age: f64,
    pub spec_score: f64,
    pub average_earning: f64,
    pub average_earning_label: String,
    pub wait_time_label: String,
    pub rating: f64,
    pub helpful_count: usize,
    pub caption: String,
    pub preview: CommentPreview,
    pub created_at: String,
}

impl SurveySummary {
    pub fn from_record(record: &SurveyRecord, settings: &Settings) -> Self {
        let survey = &record.input;
        let fields = survey.comment_fields();
        Self {
            id: record.id.clone(),
            store_name: survey.store_name.clone(),
            branch_name: survey.branch_name.clone(),
            prefecture: survey.prefecture.clone(),
            industry: survey.industry.clone(),
            work_type: survey.work_type,
            work_type_label: survey.work_type.label(),
            visited_period: survey.visited_period.clone(),
            visited_period_label: format_visited_period(&survey.visited_period),
            age: survey.age,
            spec_score: survey.spec_score,
            average_earning: survey.average_earning,
            average_earning_label: format!("{}万円", format_decimal1(Some(survey.average_earning))),
            wait_time_label: format_wait_time(Some(survey.wait_time_hours)),
            rating: survey.rating,
            helpful_count: record.helpful_count(),
            caption: gallery_caption(fields, settings.comment_limit, settings.overflow_policy),
            preview: build_comment_preview(fields, settings.preview_limit, false),
            created_at: record.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyDetail {
    #[serde(flatten)]
    pub summary: SurveySummary,
    pub posted_at_label: String,
    pub survey: SurveyDraftInput,
}

impl SurveyDetail {
    pub fn from_record(record: &SurveyRecord, settings: &Settings) -> Self {
        let summary = SurveySummary::from_record(record, settings);
        Self {
            posted_at_label: format_comment_time(&summary.created_at),
            summary,
            survey: record.input.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SurveyPage {
    pub items: Vec<SurveySummary>,
    pub page: i64,
    pub limit: i64,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct HelpfulVote {
    pub count: usize,
    pub already: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedSurvey {
    pub id: String,
    pub caption: String,
    pub preview: CommentPreview,
}
