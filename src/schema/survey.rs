use garde::Validate;
use serde::{Deserialize, Serialize};

/// Employment arrangement reported in a survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkType {
    /// Regular enrolment at the store
    #[serde(rename = "在籍")]
    Resident,
    /// Short-term work away from home
    #[serde(rename = "出稼ぎ")]
    Visiting,
}

impl WorkType {
    pub fn label(&self) -> &'static str {
        match self {
            WorkType::Resident => "在籍",
            WorkType::Visiting => "出稼ぎ",
        }
    }
}

/// A survey as submitted from the public form, before it is linked to a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SurveyDraftInput {
    #[garde(length(min = 1))]
    pub store_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub branch_name: Option<String>,
    #[garde(length(min = 1))]
    pub prefecture: String,
    #[garde(length(min = 1))]
    pub industry: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub genre: Option<String>,
    /// `YYYY-MM`
    #[garde(length(min = 1))]
    pub visited_period: String,
    #[garde(skip)]
    pub work_type: WorkType,
    #[garde(range(min = 18.0, max = 50.0))]
    pub age: f64,
    #[garde(range(min = 60.0, max = 140.0))]
    pub spec_score: f64,
    #[garde(range(min = 0.0, max = 24.0))]
    pub wait_time_hours: f64,
    #[garde(range(min = 0.0, max = 30.0))]
    pub average_earning: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(range(min = 0.0, max = 30000.0))]
    pub cast_back: Option<f64>,
    #[garde(range(min = 0.0, max = 5.0))]
    pub rating: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub customer_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub staff_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub work_environment_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub etc_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(email)]
    pub email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub image_urls: Option<Vec<String>>,
}

impl SurveyDraftInput {
    /// The free-text comment fields in display order.
    pub fn comment_fields(&self) -> [Option<&str>; 4] {
        [
            self.customer_comment.as_deref(),
            self.staff_comment.as_deref(),
            self.work_environment_comment.as_deref(),
            self.etc_comment.as_deref(),
        ]
    }
}

/// A confirmed survey, linked to a registered store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SurveyInput {
    #[garde(length(min = 1))]
    pub store_id: String,
    #[serde(flatten)]
    #[garde(dive)]
    pub survey: SurveyDraftInput,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parse_and_validate;
    use serde_json::json;

    fn draft() -> serde_json::Value {
        json!({
            "storeName": "まこと",
            "prefecture": "大阪府",
            "industry": "ソープ",
            "visitedPeriod": "2024-03",
            "workType": "出稼ぎ",
            "age": 24,
            "specScore": 100,
            "waitTimeHours": 1.5,
            "averageEarning": 8,
            "rating": 4.5,
            "customerComment": "客層が良い",
        })
    }

    #[test]
    fn test_valid_draft() {
        let survey: SurveyDraftInput = parse_and_validate(&draft().to_string()).unwrap();
        assert_eq!(survey.work_type, WorkType::Visiting);
        assert_eq!(survey.comment_fields(), [Some("客層が良い"), None, None, None]);
    }

    #[test]
    fn test_age_out_of_range() {
        let mut value = draft();
        value["age"] = json!(17);
        assert!(parse_and_validate::<SurveyDraftInput>(&value.to_string()).is_err());
        value["age"] = json!(51);
        assert!(parse_and_validate::<SurveyDraftInput>(&value.to_string()).is_err());
    }

    #[test]
    fn test_spec_score_bounds() {
        let mut value = draft();
        value["specScore"] = json!(59);
        assert!(parse_and_validate::<SurveyDraftInput>(&value.to_string()).is_err());
        value["specScore"] = json!(140);
        assert!(parse_and_validate::<SurveyDraftInput>(&value.to_string()).is_ok());
    }

    #[test]
    fn test_unknown_work_type_rejected() {
        let mut value = draft();
        value["workType"] = json!("その他");
        assert!(parse_and_validate::<SurveyDraftInput>(&value.to_string()).is_err());
    }

    #[test]
    fn test_cast_back_upper_bound() {
        let mut value = draft();
        value["castBack"] = json!(30001);
        assert!(parse_and_validate::<SurveyDraftInput>(&value.to_string()).is_err());
    }

    #[test]
    fn test_email_blank_and_invalid_rejected() {
        let mut value = draft();
        value["emailAddress"] = json!("");
        assert!(parse_and_validate::<SurveyDraftInput>(&value.to_string()).is_err());
        value["emailAddress"] = json!("a@example.com");
        assert!(parse_and_validate::<SurveyDraftInput>(&value.to_string()).is_ok());
        value["emailAddress"] = json!("nope");
        assert!(parse_and_validate::<SurveyDraftInput>(&value.to_string()).is_err());
    }

    #[test]
    fn test_confirmed_survey_requires_store_id() {
        let mut value = draft();
        assert!(parse_and_validate::<SurveyInput>(&value.to_string()).is_err());
        value["storeId"] = json!("");
        assert!(parse_and_validate::<SurveyInput>(&value.to_string()).is_err());
        value["storeId"] = json!("store-1");
        let survey: SurveyInput = parse_and_validate(&value.to_string()).unwrap();
        assert_eq!(survey.store_id, "store-1");
        assert_eq!(survey.survey.store_name, "まこと");
    }
}
