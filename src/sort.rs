//! Sort orders offered on the store and survey list pages.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a list page orders its items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListSort {
    #[default]
    Newest,
    Oldest,
    Earning,
    Rating,
}

/// Options shown in the list page sort selector
pub const LIST_SORT_OPTIONS: [ListSort; 3] = [ListSort::Newest, ListSort::Earning, ListSort::Rating];

impl ListSort {
    /// Parse the `sort` query value; unknown or empty values mean newest first.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("oldest") => ListSort::Oldest,
            Some("earning") => ListSort::Earning,
            Some("rating") => ListSort::Rating,
            _ => ListSort::Newest,
        }
    }

    pub fn value(&self) -> &'static str {
        match self {
            ListSort::Newest => "newest",
            ListSort::Oldest => "oldest",
            ListSort::Earning => "earning",
            ListSort::Rating => "rating",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ListSort::Newest => "新着順",
            ListSort::Oldest => "古い順",
            ListSort::Earning => "稼ぎ順",
            ListSort::Rating => "満足度順",
        }
    }

    fn compare(&self, a: &SortFields<'_>, b: &SortFields<'_>) -> Ordering {
        let primary = match self {
            ListSort::Newest => b.visited_period.cmp(a.visited_period),
            ListSort::Oldest => a.visited_period.cmp(b.visited_period),
            ListSort::Earning => desc(a.average_earning, b.average_earning),
            ListSort::Rating => desc(a.rating, b.rating),
        };
        primary.then_with(|| b.created_at.cmp(&a.created_at))
    }
}

impl std::fmt::Display for ListSort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Missing numbers sort as zero, larger first.
fn desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    let a = a.unwrap_or(0.0);
    let b = b.unwrap_or(0.0);
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// The fields a list item exposes for ordering.
#[derive(Debug, Clone, Copy)]
pub struct SortFields<'a> {
    pub visited_period: &'a str,
    pub average_earning: Option<f64>,
    pub rating: Option<f64>,
    pub created_at: DateTime<Utc>,
}

pub trait Sortable {
    fn sort_fields(&self) -> SortFields<'_>;
}

/// Sort `items` in place; the sort is stable.
pub fn sort_items<T: Sortable>(items: &mut [T], sort: ListSort) {
    items.sort_by(|a, b| sort.compare(&a.sort_fields(), &b.sort_fields()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct Item {
        name: &'static str,
        period: &'static str,
        earning: Option<f64>,
        rating: Option<f64>,
        created_min: u32,
    }

    impl Sortable for Item {
        fn sort_fields(&self) -> SortFields<'_> {
            SortFields {
                visited_period: self.period,
                average_earning: self.earning,
                rating: self.rating,
                created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, self.created_min, 0).unwrap(),
            }
        }
    }

    fn items() -> Vec<Item> {
        vec![
            Item { name: "a", period: "2024-01", earning: Some(5.0), rating: None, created_min: 1 },
            Item { name: "b", period: "2024-03", earning: None, rating: Some(4.5), created_min: 2 },
            Item { name: "c", period: "2024-03", earning: Some(12.0), rating: Some(3.0), created_min: 3 },
        ]
    }

    fn names(items: &[Item]) -> Vec<&'static str> {
        items.iter().map(|i| i.name).collect()
    }

    #[test]
    fn test_parse_sort() {
        assert_eq!(ListSort::parse(None), ListSort::Newest);
        assert_eq!(ListSort::parse(Some("")), ListSort::Newest);
        assert_eq!(ListSort::parse(Some("earning")), ListSort::Earning);
        assert_eq!(ListSort::parse(Some("rating")), ListSort::Rating);
        assert_eq!(ListSort::parse(Some("oldest")), ListSort::Oldest);
        assert_eq!(ListSort::parse(Some("bogus")), ListSort::Newest);
    }

    #[test]
    fn test_options_labels() {
        let labels: Vec<&str> = LIST_SORT_OPTIONS.iter().map(|s| s.label()).collect();
        assert_eq!(labels, vec!["新着順", "稼ぎ順", "満足度順"]);
    }

    #[test]
    fn test_sort_newest_breaks_ties_by_creation() {
        let mut list = items();
        sort_items(&mut list, ListSort::Newest);
        assert_eq!(names(&list), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_sort_oldest() {
        let mut list = items();
        sort_items(&mut list, ListSort::Oldest);
        assert_eq!(names(&list), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_sort_earning_missing_is_zero() {
        let mut list = items();
        sort_items(&mut list, ListSort::Earning);
        assert_eq!(names(&list), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_sort_rating() {
        let mut list = items();
        sort_items(&mut list, ListSort::Rating);
        assert_eq!(names(&list), vec!["b", "c", "a"]);
    }
}
