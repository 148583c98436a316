use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 5.0;

/// Documento da collection "ratings". Unique per (user, business).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Rating {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user: ObjectId,
    pub business: ObjectId,
    pub rating: f64,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

/// A validated rating submission, ready for the store.
#[derive(Debug, Clone)]
pub struct RatingUpsert {
    pub user: ObjectId,
    pub business: ObjectId,
    pub rating: f64,
    pub comment: Option<String>,
    pub now: i64,
}

#[derive(Debug, Clone)]
pub struct UpsertOutcome {
    pub rating: Rating,
    /// false when an existing rating was overwritten
    pub created: bool,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RatingRequest {
    /// Business id
    pub business: String,
    pub rating: f64,
    pub comment: Option<String>,
    /// Optional; must match the authenticated user when present
    pub user: Option<String>,
}

/// Rating inside a business detail, annotated with its author's name.
#[derive(Debug, Serialize, Clone)]
pub struct RatingView {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user: ObjectId,
    pub user_name: Option<String>,
    pub rating: f64,
    pub comment: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Serialize, Clone)]
pub struct RatingOverview {
    pub business: ObjectId,
    pub avg_rating: f64,
    pub rating_count: u64,
}

/// Running count and sum of the ratings of one business.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RatingSummary {
    pub count: u64,
    pub sum: f64,
}

impl RatingSummary {
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Self {
        values.into_iter().fold(Self::default(), |mut acc, value| {
            acc.add(value);
            acc
        })
    }

    pub fn add(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
    }

    /// Mean rounded to one decimal place, 0.0 without ratings.
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        round_one_decimal(self.sum / self.count as f64)
    }
}

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
