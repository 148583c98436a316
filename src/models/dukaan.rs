use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use super::rating::RatingView;

pub const DEFAULT_PAGE_SIZE: i64 = 5;
pub const MAX_PAGE_SIZE: i64 = 50;
pub const LOOKUP_LIMIT: i64 = 10;

/// Business document, collection "dukaans"
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Dukaan {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// Unique key
    pub name: String,
    pub city: String,
    /// References into "categories"
    #[serde(default)]
    pub categories: Vec<ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub created_by: Option<ObjectId>,
    #[serde(default)]
    pub created_at: i64,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateDukaanRequest {
    pub name: String,
    pub city: String,
    /// Category ids
    pub categories: Vec<String>,
    pub address: Option<String>,
    pub description: Option<String>,
}

/// Which businesses a listing query selects.
#[derive(Debug, Clone, PartialEq)]
pub enum DukaanFilter {
    All,
    /// Case-insensitive substring of the city
    CityContains(String),
    /// Case-insensitive substring of the name
    NameContains(String),
}

/// Business as shown in listings: category names resolved, rating derived.
#[derive(Debug, Serialize, Clone)]
pub struct DukaanSummary {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub city: String,
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub avg_rating: f64,
    pub rating_count: u64,
}

/// Business detail view, with every rating and its author.
#[derive(Debug, Serialize, Clone)]
pub struct DukaanDetail {
    #[serde(flatten)]
    pub summary: DukaanSummary,
    pub ratings: Vec<RatingView>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    /// Pages are 1-based; page 0 is read as the first page. Capped at
    /// `i64::MAX`, the largest skip the server accepts.
    pub fn skip(&self) -> u64 {
        let page = self.page.unwrap_or(1).max(1);
        (page - 1).saturating_mul(self.limit() as u64).min(i64::MAX as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults() {
        let q = PageQuery::default();
        assert_eq!(q.limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(q.skip(), 0);
    }

    #[test]
    fn page_bounds() {
        let q = PageQuery { page: Some(3), limit: Some(500) };
        assert_eq!(q.limit(), MAX_PAGE_SIZE);
        assert_eq!(q.skip(), 2 * MAX_PAGE_SIZE as u64);

        let q = PageQuery { page: Some(0), limit: Some(0) };
        assert_eq!(q.limit(), 1);
        assert_eq!(q.skip(), 0);
    }

    #[test]
    fn huge_page_saturates() {
        let q = PageQuery { page: Some(u64::MAX), limit: Some(MAX_PAGE_SIZE) };
        assert_eq!(q.skip(), i64::MAX as u64);
    }
}
