use garde::Validate;
use serde::{Deserialize, Serialize};

use super::{blank_as_none, coerced_number};

/// Opening hours as entered in the admin form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BusinessHours {
    #[garde(length(min = 1))]
    pub open: String,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub close: Option<String>,
}

/// A store registered through the admin screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StoreInput {
    #[garde(length(min = 1))]
    pub store_name: String,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub branch_name: Option<String>,
    #[garde(length(min = 1))]
    pub prefecture: String,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub area: Option<String>,
    #[garde(length(min = 1))]
    pub category: String,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(dive)]
    pub business_hours: Option<BusinessHours>,
    #[serde(default, deserialize_with = "coerced_number", skip_serializing_if = "Option::is_none")]
    #[garde(range(min = 0.0))]
    pub cast_back: Option<f64>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub phone_number: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    #[garde(email)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    #[garde(url, pattern(r"^https://"))]
    pub line_url: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    #[garde(url, pattern(r"^https://"))]
    pub twitter_url: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    #[garde(url, pattern(r"^https://"))]
    pub bsky_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub women_recruitment_page_missing: Option<bool>,
    #[serde(default)]
    #[garde(inner(url, pattern(r"^https://")))]
    pub recruitment_urls: Vec<String>,
}

impl StoreInput {
    /// Store name with the branch appended, as used in page titles.
    pub fn display_name(&self) -> String {
        match &self.branch_name {
            Some(branch) => format!("{} {}", self.store_name, branch),
            None => self.store_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parse_and_validate;
    use serde_json::json;

    fn minimal() -> serde_json::Value {
        json!({
            "storeName": "まこと",
            "prefecture": "東京都",
            "category": "デリヘル",
        })
    }

    fn parse(value: serde_json::Value) -> Result<StoreInput, crate::schema::SchemaError> {
        parse_and_validate(&value.to_string())
    }

    #[test]
    fn test_minimal_store_is_valid() {
        let store = parse(minimal()).unwrap();
        assert_eq!(store.store_name, "まこと");
        assert!(store.recruitment_urls.is_empty());
        assert_eq!(store.display_name(), "まこと");
    }

    #[test]
    fn test_blank_optional_fields_become_none() {
        let mut value = minimal();
        value["branchName"] = json!("  ");
        value["email"] = json!("");
        value["lineUrl"] = json!(" ");
        let store = parse(value).unwrap();
        assert_eq!(store.branch_name, None);
        assert_eq!(store.email, None);
        assert_eq!(store.line_url, None);
    }

    #[test]
    fn test_empty_required_field_rejected() {
        let mut value = minimal();
        value["storeName"] = json!("");
        assert!(parse(value).is_err());
    }

    #[test]
    fn test_http_url_rejected() {
        let mut value = minimal();
        value["twitterUrl"] = json!("http://x.com/makoto");
        assert!(parse(value).is_err());

        let mut value = minimal();
        value["twitterUrl"] = json!("https://x.com/makoto");
        assert!(parse(value).is_ok());
    }

    #[test]
    fn test_recruitment_urls_must_be_https() {
        let mut value = minimal();
        value["recruitmentUrls"] = json!(["https://a.example/jobs", "http://b.example/jobs"]);
        assert!(parse(value).is_err());
    }

    #[test]
    fn test_cast_back_coerced_from_string() {
        let mut value = minimal();
        value["castBack"] = json!("3000");
        let store = parse(value).unwrap();
        assert_eq!(store.cast_back, Some(3000.0));

        let mut value = minimal();
        value["castBack"] = json!(-1);
        assert!(parse(value).is_err());

        let mut value = minimal();
        value["castBack"] = json!("lots");
        assert!(parse(value).is_err());
    }

    #[test]
    fn test_business_hours_open_required() {
        let mut value = minimal();
        value["businessHours"] = json!({ "open": "", "close": "24:00" });
        assert!(parse(value).is_err());

        let mut value = minimal();
        value["businessHours"] = json!({ "open": "10:00", "close": "" });
        let store = parse(value).unwrap();
        assert_eq!(store.business_hours.unwrap().close, None);
    }

    #[test]
    fn test_invalid_email_rejected() {
        let mut value = minimal();
        value["email"] = json!("not-an-email");
        assert!(parse(value).is_err());
    }
}
