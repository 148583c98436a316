use super::{DukaanStore, CATEGORIES, CITIES, DUKAANS, RATINGS, USERS};
use crate::models::{
    Category, City, Dukaan, DukaanFilter, Rating, RatingSummary, RatingUpsert, UpsertOutcome,
    User,
};
use crate::utils::error::{AppError, AppResult};
use crate::utils::validation::escape_regex;
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use std::collections::HashMap;
use std::error::Error;

const DUPLICATE_KEY: i32 = 11000;

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str, db_name: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;
        let db = client.database(db_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Unique indexes carry the uniqueness rules; the rest serve lookups.
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        log::info!("🔧 Creating database indexes...");

        self.create_index(USERS, doc! { "email": 1 }, true).await?;
        self.create_index(DUKAANS, doc! { "name": 1 }, true).await?;
        self.create_index(DUKAANS, doc! { "city": 1 }, false).await?;
        self.create_index(CATEGORIES, doc! { "name": 1 }, true).await?;
        self.create_index(CITIES, doc! { "name": 1 }, true).await?;
        self.create_index(RATINGS, doc! { "user": 1, "business": 1 }, true).await?;
        self.create_index(RATINGS, doc! { "business": 1 }, false).await?;

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    async fn create_index(
        &self,
        collection: &str,
        keys: Document,
        unique: bool,
    ) -> Result<(), Box<dyn Error>> {
        let fields: Vec<String> = keys.keys().cloned().collect();
        let description = format!("{}({})", collection, fields.join(", "));
        let model = IndexModel::builder()
            .keys(keys)
            .options(IndexOptions::builder().unique(unique).build())
            .build();

        self.collection::<Document>(collection)
            .create_index(model)
            .await
            .map_err(|e| format!("Failed to create index {}: {}", description, e))?;

        log::info!("   ✅ Index ready: {}{}", description, if unique { " [unique]" } else { "" });
        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}

fn insert_error(err: mongodb::error::Error) -> AppError {
    if is_duplicate_key(&err) {
        AppError::Duplicate(err.to_string())
    } else {
        AppError::from(err)
    }
}

fn dukaan_filter(filter: &DukaanFilter) -> Document {
    match filter {
        DukaanFilter::All => doc! {},
        DukaanFilter::CityContains(city) => {
            doc! { "city": { "$regex": escape_regex(city), "$options": "i" } }
        }
        DukaanFilter::NameContains(name) => {
            doc! { "name": { "$regex": escape_regex(name), "$options": "i" } }
        }
    }
}

fn as_f64(value: Option<&Bson>) -> f64 {
    match value {
        Some(Bson::Double(f)) => *f,
        Some(Bson::Int32(n)) => f64::from(*n),
        Some(Bson::Int64(n)) => *n as f64,
        _ => 0.0,
    }
}

#[async_trait]
impl DukaanStore for MongoDB {
    async fn ping(&self) -> AppResult<()> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn insert_user(&self, user: &User) -> AppResult<()> {
        self.collection::<User>(USERS)
            .insert_one(user)
            .await
            .map_err(insert_error)?;
        Ok(())
    }

    async fn find_user(&self, id: &ObjectId) -> AppResult<Option<User>> {
        Ok(self.collection::<User>(USERS).find_one(doc! { "_id": *id }).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.collection::<User>(USERS).find_one(doc! { "email": email }).await?)
    }

    async fn find_users(&self, ids: &[ObjectId]) -> AppResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self
            .collection::<User>(USERS)
            .find(doc! { "_id": { "$in": ids.to_vec() } })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn insert_dukaan(&self, dukaan: &Dukaan) -> AppResult<()> {
        self.collection::<Dukaan>(DUKAANS)
            .insert_one(dukaan)
            .await
            .map_err(insert_error)?;
        Ok(())
    }

    async fn find_dukaan(&self, id: &ObjectId) -> AppResult<Option<Dukaan>> {
        Ok(self.collection::<Dukaan>(DUKAANS).find_one(doc! { "_id": *id }).await?)
    }

    async fn list_dukaans(
        &self,
        filter: &DukaanFilter,
        skip: u64,
        limit: i64,
    ) -> AppResult<Vec<Dukaan>> {
        let cursor = self
            .collection::<Dukaan>(DUKAANS)
            .find(dukaan_filter(filter))
            .sort(doc! { "_id": 1 })
            .skip(skip)
            .limit(limit)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn insert_category(&self, category: &Category) -> AppResult<()> {
        self.collection::<Category>(CATEGORIES)
            .insert_one(category)
            .await
            .map_err(insert_error)?;
        Ok(())
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let cursor = self
            .collection::<Category>(CATEGORIES)
            .find(doc! {})
            .sort(doc! { "_id": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_categories(&self, ids: &[ObjectId]) -> AppResult<Vec<Category>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self
            .collection::<Category>(CATEGORIES)
            .find(doc! { "_id": { "$in": ids.to_vec() } })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn insert_city(&self, city: &City) -> AppResult<()> {
        self.collection::<City>(CITIES)
            .insert_one(city)
            .await
            .map_err(insert_error)?;
        Ok(())
    }

    async fn list_cities(&self) -> AppResult<Vec<City>> {
        let cursor = self
            .collection::<City>(CITIES)
            .find(doc! {})
            .sort(doc! { "_id": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn upsert_rating(&self, rating: &RatingUpsert) -> AppResult<UpsertOutcome> {
        let ratings = self.collection::<Rating>(RATINGS);
        let filter = doc! { "user": rating.user, "business": rating.business };
        let set = doc! {
            "rating": rating.rating,
            "comment": rating.comment.clone(),
            "updated_at": rating.now,
        };
        let update = doc! {
            "$set": set.clone(),
            "$setOnInsert": { "_id": ObjectId::new(), "created_at": rating.now },
        };

        let created = match ratings.update_one(filter.clone(), update).upsert(true).await {
            Ok(result) => result.upserted_id.is_some(),
            // Two first submissions raced; the unique index let one insert win
            Err(e) if is_duplicate_key(&e) => {
                log::debug!("Rating upsert lost insert race, retrying as update");
                ratings.update_one(filter.clone(), doc! { "$set": set }).await?;
                false
            }
            Err(e) => return Err(e.into()),
        };

        let stored = ratings.find_one(filter).await?.ok_or_else(|| {
            AppError::DatabaseError("Rating vanished right after upsert".to_string())
        })?;

        Ok(UpsertOutcome { rating: stored, created })
    }

    async fn ratings_for_business(&self, business: &ObjectId) -> AppResult<Vec<Rating>> {
        let cursor = self
            .collection::<Rating>(RATINGS)
            .find(doc! { "business": *business })
            .sort(doc! { "created_at": 1, "_id": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn rating_summaries(
        &self,
        businesses: &[ObjectId],
    ) -> AppResult<HashMap<ObjectId, RatingSummary>> {
        if businesses.is_empty() {
            return Ok(HashMap::new());
        }

        let pipeline = vec![
            doc! { "$match": { "business": { "$in": businesses.to_vec() } } },
            doc! { "$group": {
                "_id": "$business",
                "sum": { "$sum": "$rating" },
                "count": { "$sum": 1 },
            } },
        ];

        let mut cursor = self
            .collection::<Document>(RATINGS)
            .aggregate(pipeline)
            .await?;

        let mut summaries = HashMap::new();
        while let Some(group) = cursor.try_next().await? {
            let Ok(business) = group.get_object_id("_id") else {
                continue;
            };
            summaries.insert(
                business,
                RatingSummary {
                    count: as_f64(group.get("count")) as u64,
                    sum: as_f64(group.get("sum")),
                },
            );
        }

        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_filters_escape_user_input() {
        let filter = dukaan_filter(&DukaanFilter::NameContains("a.b".into()));
        let regex = filter.get_document("name").unwrap();
        assert_eq!(regex.get_str("$regex").unwrap(), "a\\.b");
        assert_eq!(regex.get_str("$options").unwrap(), "i");
    }

    #[test]
    fn numeric_group_fields() {
        assert_eq!(as_f64(Some(&Bson::Int32(3))), 3.0);
        assert_eq!(as_f64(Some(&Bson::Int64(4))), 4.0);
        assert_eq!(as_f64(Some(&Bson::Double(4.5))), 4.5);
        assert_eq!(as_f64(None), 0.0);
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongodb_connection() {
        dotenv::dotenv().ok();

        let uri = std::env::var("MONGO_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let db = MongoDB::new(&uri, "dukaan_test").await;
        assert!(db.is_ok());
        assert!(db.unwrap().ping().await.is_ok());
    }
}
