use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer};
use thiserror::Error;

pub const DEFAULT_PAGE_SIZE: u8 = 20;
pub const MAX_PAGE_SIZE: u8 = 100;
pub const ANY_CATEGORY: &str = "Any";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Business,
    Entertainment,
    Health,
    Politics,
    Products,
    ScienceAndTechnology,
    Sports,
    US,
    World,
    WorldAfrica,
    WorldAmericas,
    WorldAsia,
    WorldEurope,
    WorldMiddleEast,
}

impl Category {
    pub const ALL: [Category; 14] = [
        Category::Business,
        Category::Entertainment,
        Category::Health,
        Category::Politics,
        Category::Products,
        Category::ScienceAndTechnology,
        Category::Sports,
        Category::US,
        Category::World,
        Category::WorldAfrica,
        Category::WorldAmericas,
        Category::WorldAsia,
        Category::WorldEurope,
        Category::WorldMiddleEast,
    ];

    /// Spelling used by the upstream API and by clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Business => "Business",
            Category::Entertainment => "Entertainment",
            Category::Health => "Health",
            Category::Politics => "Politics",
            Category::Products => "Products",
            Category::ScienceAndTechnology => "ScienceAndTechnology",
            Category::Sports => "Sports",
            Category::US => "US",
            Category::World => "World",
            Category::WorldAfrica => "World_Africa",
            Category::WorldAmericas => "World_Americas",
            Category::WorldAsia => "World_Asia",
            Category::WorldEurope => "World_Europe",
            Category::WorldMiddleEast => "World_MiddleEast",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == value)
            .ok_or_else(|| ValidationError::InvalidCategory(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid category: {0}")]
    InvalidCategory(String),
}

/// Search parameters as clients send them in `{"params": {...}}`.
///
/// `category` keeps an explicit `null` apart from an absent field: only the
/// latter means "no category".
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawParams {
    pub page_size: Option<f64>,
    #[serde(default, deserialize_with = "present")]
    pub category: Option<Option<String>>,
    pub q: Option<String>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Canonical form of a news request. Category and free-text queries hit
/// different upstream endpoints and are never combined.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryDescriptor {
    Category(Category),
    Search { page_size: u8, text: Option<String> },
}

impl Default for QueryDescriptor {
    fn default() -> Self {
        QueryDescriptor::Search {
            page_size: DEFAULT_PAGE_SIZE,
            text: None,
        }
    }
}

impl QueryDescriptor {
    pub fn normalize(raw: Option<RawParams>) -> Result<Self, ValidationError> {
        let Some(raw) = raw else {
            return Ok(QueryDescriptor::default());
        };

        match raw.category.as_ref() {
            Some(None) => return Err(ValidationError::InvalidCategory("null".to_string())),
            Some(Some(category)) if category != ANY_CATEGORY => {
                return Ok(QueryDescriptor::Category(category.parse()?));
            }
            _ => {}
        }

        // An explicit params object without a page size asks for as much as upstream allows.
        // Fractional sizes are accepted and rounded down after clamping.
        let page_size = raw
            .page_size
            .unwrap_or(MAX_PAGE_SIZE as f64)
            .clamp(1.0, MAX_PAGE_SIZE as f64)
            .floor() as u8;

        Ok(QueryDescriptor::Search {
            page_size,
            text: raw.q,
        })
    }

    /// Deterministic key under which results for this query are cached.
    pub fn cache_key(&self) -> String {
        match self {
            QueryDescriptor::Category(category) => format!("category={category}"),
            QueryDescriptor::Search { page_size, text } => match text {
                Some(text) => format!("search?count={page_size}&q={text}"),
                None => format!("search?count={page_size}"),
            },
        }
    }

    /// Endpoint path (relative to the upstream base url) and query pairs.
    pub fn upstream_request(&self) -> (&'static str, Vec<(&'static str, String)>) {
        match self {
            QueryDescriptor::Category(category) => {
                ("news", vec![("category", category.to_string())])
            }
            QueryDescriptor::Search { page_size, text } => {
                let mut params = vec![("count", page_size.to_string())];
                if let Some(text) = text {
                    params.push(("q", text.clone()));
                }
                ("news/search", params)
            }
        }
    }
}

impl fmt::Display for QueryDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cache_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page_size: Option<i64>, category: Option<&str>, q: Option<&str>) -> Option<RawParams> {
        Some(RawParams {
            page_size: page_size.map(|size| size as f64),
            category: category.map(|c| Some(c.to_string())),
            q: q.map(str::to_string),
        })
    }

    #[test]
    fn missing_params_yield_default_search() {
        let query = QueryDescriptor::normalize(None).unwrap();
        assert_eq!(
            query,
            QueryDescriptor::Search {
                page_size: 20,
                text: None
            }
        );
        assert_eq!(query.cache_key(), "search?count=20");
    }

    #[test]
    fn known_category_selects_category_branch() {
        let query = QueryDescriptor::normalize(params(Some(5), Some("Business"), Some("ignored"))).unwrap();
        assert_eq!(query, QueryDescriptor::Category(Category::Business));
        assert_eq!(query.cache_key(), "category=Business");
    }

    #[test]
    fn underscored_categories_parse() {
        let query = QueryDescriptor::normalize(params(None, Some("World_MiddleEast"), None)).unwrap();
        assert_eq!(query, QueryDescriptor::Category(Category::WorldMiddleEast));
    }

    #[test]
    fn unknown_category_is_rejected() {
        let err = QueryDescriptor::normalize(params(None, Some("NotARealCategory"), None)).unwrap_err();
        assert_eq!(err, ValidationError::InvalidCategory("NotARealCategory".into()));
        assert_eq!(err.to_string(), "Invalid category: NotARealCategory");
    }

    #[test]
    fn category_names_are_case_sensitive() {
        assert!(QueryDescriptor::normalize(params(None, Some("sports"), None)).is_err());
    }

    #[test]
    fn any_category_falls_through_to_search() {
        let query = QueryDescriptor::normalize(params(Some(10), Some("Any"), Some("rust"))).unwrap();
        assert_eq!(
            query,
            QueryDescriptor::Search {
                page_size: 10,
                text: Some("rust".into())
            }
        );
    }

    #[test]
    fn page_size_is_clamped() {
        let high = QueryDescriptor::normalize(params(Some(500), None, None)).unwrap();
        let low = QueryDescriptor::normalize(params(Some(0), None, None)).unwrap();
        let negative = QueryDescriptor::normalize(params(Some(-3), None, None)).unwrap();
        assert_eq!(high, QueryDescriptor::Search { page_size: 100, text: None });
        assert_eq!(low, QueryDescriptor::Search { page_size: 1, text: None });
        assert_eq!(negative, QueryDescriptor::Search { page_size: 1, text: None });
    }

    #[test]
    fn empty_params_request_the_maximum_page() {
        let query = QueryDescriptor::normalize(Some(RawParams::default())).unwrap();
        assert_eq!(query, QueryDescriptor::Search { page_size: 100, text: None });
    }

    #[test]
    fn text_is_passed_through_verbatim() {
        let query = QueryDescriptor::normalize(params(Some(3), None, Some("a&b c"))).unwrap();
        assert_eq!(query.cache_key(), "search?count=3&q=a&b c");
        let (path, pairs) = query.upstream_request();
        assert_eq!(path, "news/search");
        assert_eq!(pairs, vec![("count", "3".to_string()), ("q", "a&b c".to_string())]);
    }

    #[test]
    fn category_request_targets_category_endpoint() {
        let (path, pairs) = QueryDescriptor::Category(Category::WorldAsia).upstream_request();
        assert_eq!(path, "news");
        assert_eq!(pairs, vec![("category", "World_Asia".to_string())]);
    }

    #[test]
    fn raw_params_deserialize_camel_case() {
        let raw: RawParams = serde_json::from_str(r#"{"pageSize": 7, "q": "f1"}"#).unwrap();
        assert_eq!(raw.page_size, Some(7.0));
        assert_eq!(raw.q.as_deref(), Some("f1"));
        assert!(raw.category.is_none());
    }

    #[test]
    fn fractional_page_size_is_clamped_and_floored() {
        let raw: RawParams = serde_json::from_str(r#"{"pageSize": 5.5}"#).unwrap();
        let query = QueryDescriptor::normalize(Some(raw)).unwrap();
        assert_eq!(query, QueryDescriptor::Search { page_size: 5, text: None });

        let raw: RawParams = serde_json::from_str(r#"{"pageSize": 0.25}"#).unwrap();
        let query = QueryDescriptor::normalize(Some(raw)).unwrap();
        assert_eq!(query, QueryDescriptor::Search { page_size: 1, text: None });

        let raw: RawParams = serde_json::from_str(r#"{"pageSize": 1e9}"#).unwrap();
        let query = QueryDescriptor::normalize(Some(raw)).unwrap();
        assert_eq!(query, QueryDescriptor::Search { page_size: 100, text: None });
    }

    #[test]
    fn null_category_is_rejected_but_absent_is_not() {
        let raw: RawParams = serde_json::from_str(r#"{"category": null}"#).unwrap();
        assert_eq!(raw.category, Some(None));
        let err = QueryDescriptor::normalize(Some(raw)).unwrap_err();
        assert_eq!(err.to_string(), "Invalid category: null");

        let raw: RawParams = serde_json::from_str(r#"{"q": "f1"}"#).unwrap();
        assert!(QueryDescriptor::normalize(Some(raw)).is_ok());
    }
}
