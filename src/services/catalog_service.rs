use crate::database::DukaanStore;
use crate::models::{Category, City, CreateCityRequest};
use crate::utils::error::AppResult;
use crate::utils::validation::{non_blank, parse_payload, CITY_SCHEMA};
use mongodb::bson::oid::ObjectId;
use serde_json::Value;

pub async fn create_category(store: &dyn DukaanStore, name: &str) -> AppResult<Category> {
    let category = Category {
        id: ObjectId::new(),
        name: non_blank(name, "name")?,
    };

    store.insert_category(&category).await.map_err(|e| {
        e.on_duplicate(|| format!("Category {} already exists.", category.name))
    })?;

    Ok(category)
}

pub async fn list_categories(store: &dyn DukaanStore) -> AppResult<Vec<Category>> {
    store.list_categories().await
}

pub async fn create_city(store: &dyn DukaanStore, payload: Value) -> AppResult<City> {
    let request: CreateCityRequest = parse_payload(payload, CITY_SCHEMA)?;
    let city = City {
        id: ObjectId::new(),
        name: non_blank(&request.name, "name")?,
    };

    store
        .insert_city(&city)
        .await
        .map_err(|e| e.on_duplicate(|| format!("City {} already exists.", city.name)))?;

    Ok(city)
}

pub async fn list_cities(store: &dyn DukaanStore) -> AppResult<Vec<City>> {
    store.list_cities().await
}
