use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Collection "categories"
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
}

/// Collection "cities"
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct City {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateCityRequest {
    pub name: String,
}
