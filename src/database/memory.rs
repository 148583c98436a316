//! In-process store with the same uniqueness rules as the MongoDB indexes.
//! Backs the test suite and `DATABASE_BACKEND=memory` for local runs.

use super::DukaanStore;
use crate::models::{
    Category, City, Dukaan, DukaanFilter, Rating, RatingSummary, RatingUpsert, UpsertOutcome,
    User,
};
use crate::utils::error::{AppError, AppResult};
use crate::utils::validation::contains_ignore_case;
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Collections {
    users: Vec<User>,
    dukaans: Vec<Dukaan>,
    categories: Vec<Category>,
    cities: Vec<City>,
    ratings: Vec<Rating>,
}

#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored ratings, across all businesses.
    pub fn rating_count(&self) -> usize {
        self.data.read().map(|d| d.ratings.len()).unwrap_or(0)
    }

    pub fn user_count(&self) -> usize {
        self.data.read().map(|d| d.users.len()).unwrap_or(0)
    }

    fn read(&self) -> AppResult<RwLockReadGuard<'_, Collections>> {
        self.data
            .read()
            .map_err(|_| AppError::Internal("Memory store lock poisoned".to_string()))
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, Collections>> {
        self.data
            .write()
            .map_err(|_| AppError::Internal("Memory store lock poisoned".to_string()))
    }
}

fn duplicate(collection: &str, key: &str, value: &str) -> AppError {
    AppError::Duplicate(format!("duplicate key in {}: {} = {:?}", collection, key, value))
}

fn selects(filter: &DukaanFilter, dukaan: &Dukaan) -> bool {
    match filter {
        DukaanFilter::All => true,
        DukaanFilter::CityContains(city) => contains_ignore_case(&dukaan.city, city),
        DukaanFilter::NameContains(name) => contains_ignore_case(&dukaan.name, name),
    }
}

#[async_trait]
impl DukaanStore for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        self.read().map(|_| ())
    }

    async fn insert_user(&self, user: &User) -> AppResult<()> {
        let mut data = self.write()?;
        if data.users.iter().any(|u| u.email == user.email) {
            return Err(duplicate("users", "email", &user.email));
        }
        data.users.push(user.clone());
        Ok(())
    }

    async fn find_user(&self, id: &ObjectId) -> AppResult<Option<User>> {
        Ok(self.read()?.users.iter().find(|u| u.id == *id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.read()?.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_users(&self, ids: &[ObjectId]) -> AppResult<Vec<User>> {
        Ok(self
            .read()?
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn insert_dukaan(&self, dukaan: &Dukaan) -> AppResult<()> {
        let mut data = self.write()?;
        if data.dukaans.iter().any(|d| d.name == dukaan.name) {
            return Err(duplicate("dukaans", "name", &dukaan.name));
        }
        data.dukaans.push(dukaan.clone());
        Ok(())
    }

    async fn find_dukaan(&self, id: &ObjectId) -> AppResult<Option<Dukaan>> {
        Ok(self.read()?.dukaans.iter().find(|d| d.id == *id).cloned())
    }

    async fn list_dukaans(
        &self,
        filter: &DukaanFilter,
        skip: u64,
        limit: i64,
    ) -> AppResult<Vec<Dukaan>> {
        let take = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        Ok(self
            .read()?
            .dukaans
            .iter()
            .filter(|d| selects(filter, d))
            .skip(skip)
            .take(take)
            .cloned()
            .collect())
    }

    async fn insert_category(&self, category: &Category) -> AppResult<()> {
        let mut data = self.write()?;
        if data.categories.iter().any(|c| c.name == category.name) {
            return Err(duplicate("categories", "name", &category.name));
        }
        data.categories.push(category.clone());
        Ok(())
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        Ok(self.read()?.categories.clone())
    }

    async fn find_categories(&self, ids: &[ObjectId]) -> AppResult<Vec<Category>> {
        Ok(self
            .read()?
            .categories
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn insert_city(&self, city: &City) -> AppResult<()> {
        let mut data = self.write()?;
        if data.cities.iter().any(|c| c.name == city.name) {
            return Err(duplicate("cities", "name", &city.name));
        }
        data.cities.push(city.clone());
        Ok(())
    }

    async fn list_cities(&self) -> AppResult<Vec<City>> {
        Ok(self.read()?.cities.clone())
    }

    async fn upsert_rating(&self, rating: &RatingUpsert) -> AppResult<UpsertOutcome> {
        let mut data = self.write()?;

        if let Some(existing) = data
            .ratings
            .iter_mut()
            .find(|r| r.user == rating.user && r.business == rating.business)
        {
            existing.rating = rating.rating;
            existing.comment = rating.comment.clone();
            existing.updated_at = rating.now;
            return Ok(UpsertOutcome { rating: existing.clone(), created: false });
        }

        let stored = Rating {
            id: ObjectId::new(),
            user: rating.user,
            business: rating.business,
            rating: rating.rating,
            comment: rating.comment.clone(),
            created_at: rating.now,
            updated_at: rating.now,
        };
        data.ratings.push(stored.clone());

        Ok(UpsertOutcome { rating: stored, created: true })
    }

    async fn ratings_for_business(&self, business: &ObjectId) -> AppResult<Vec<Rating>> {
        Ok(self
            .read()?
            .ratings
            .iter()
            .filter(|r| r.business == *business)
            .cloned()
            .collect())
    }

    async fn rating_summaries(
        &self,
        businesses: &[ObjectId],
    ) -> AppResult<HashMap<ObjectId, RatingSummary>> {
        let mut summaries: HashMap<ObjectId, RatingSummary> = HashMap::new();
        for rating in self.read()?.ratings.iter() {
            if businesses.contains(&rating.business) {
                summaries.entry(rating.business).or_default().add(rating.rating);
            }
        }
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upsert(user: ObjectId, business: ObjectId, value: f64) -> RatingUpsert {
        RatingUpsert { user, business, rating: value, comment: None, now: 1 }
    }

    #[tokio::test]
    async fn rerating_updates_in_place() {
        let store = MemoryStore::new();
        let (user, business) = (ObjectId::new(), ObjectId::new());

        let first = store.upsert_rating(&upsert(user, business, 2.0)).await.unwrap();
        let second = store.upsert_rating(&upsert(user, business, 5.0)).await.unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.rating.id, second.rating.id);
        assert_eq!(store.rating_count(), 1);
        assert_eq!(store.ratings_for_business(&business).await.unwrap()[0].rating, 5.0);
    }

    #[tokio::test]
    async fn summaries_only_cover_requested_businesses() {
        let store = MemoryStore::new();
        let (a, b, c) = (ObjectId::new(), ObjectId::new(), ObjectId::new());
        store.upsert_rating(&upsert(ObjectId::new(), a, 4.0)).await.unwrap();
        store.upsert_rating(&upsert(ObjectId::new(), a, 5.0)).await.unwrap();
        store.upsert_rating(&upsert(ObjectId::new(), b, 1.0)).await.unwrap();

        let summaries = store.rating_summaries(&[a, c]).await.unwrap();

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[&a], RatingSummary { count: 2, sum: 9.0 });
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        let user = User {
            id: ObjectId::new(),
            email: "asha@example.com".into(),
            password: "hash".into(),
            name: "Asha".into(),
            created_at: 0,
        };
        store.insert_user(&user).await.unwrap();

        let again = User { id: ObjectId::new(), ..user };
        let err = store.insert_user(&again).await.unwrap_err();

        assert!(matches!(err, AppError::Duplicate(_)));
        assert_eq!(store.user_count(), 1);
    }
}
