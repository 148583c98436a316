//! Storage for users, businesses, catalog entries and ratings.
//!
//! Handlers and services only see the [`DukaanStore`] trait. The store owns
//! uniqueness: a conflicting insert fails with [`AppError::Duplicate`] and the
//! rating upsert is a single atomic write.

pub mod memory;
pub mod mongo;

use crate::models::{
    Category, City, Dukaan, DukaanFilter, Rating, RatingSummary, RatingUpsert, UpsertOutcome,
    User,
};
use crate::utils::error::AppResult;
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::collections::HashMap;

pub use memory::MemoryStore;
pub use mongo::MongoDB;

pub const USERS: &str = "users";
pub const DUKAANS: &str = "dukaans";
pub const CATEGORIES: &str = "categories";
pub const CITIES: &str = "cities";
pub const RATINGS: &str = "ratings";

#[async_trait]
pub trait DukaanStore: Send + Sync {
    /// Round trip to the backend, used by the health check.
    async fn ping(&self) -> AppResult<()>;

    async fn insert_user(&self, user: &User) -> AppResult<()>;
    async fn find_user(&self, id: &ObjectId) -> AppResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;
    /// Batched lookup; unknown ids are skipped.
    async fn find_users(&self, ids: &[ObjectId]) -> AppResult<Vec<User>>;

    async fn insert_dukaan(&self, dukaan: &Dukaan) -> AppResult<()>;
    async fn find_dukaan(&self, id: &ObjectId) -> AppResult<Option<Dukaan>>;
    /// Matching businesses in insertion order.
    async fn list_dukaans(
        &self,
        filter: &DukaanFilter,
        skip: u64,
        limit: i64,
    ) -> AppResult<Vec<Dukaan>>;

    async fn insert_category(&self, category: &Category) -> AppResult<()>;
    async fn list_categories(&self) -> AppResult<Vec<Category>>;
    async fn find_categories(&self, ids: &[ObjectId]) -> AppResult<Vec<Category>>;

    async fn insert_city(&self, city: &City) -> AppResult<()>;
    async fn list_cities(&self) -> AppResult<Vec<City>>;

    /// Inserts the rating or overwrites the existing one for (user, business).
    async fn upsert_rating(&self, rating: &RatingUpsert) -> AppResult<UpsertOutcome>;
    async fn ratings_for_business(&self, business: &ObjectId) -> AppResult<Vec<Rating>>;
    /// Count and sum per business, for every given business that has ratings.
    async fn rating_summaries(
        &self,
        businesses: &[ObjectId],
    ) -> AppResult<HashMap<ObjectId, RatingSummary>>;
}
