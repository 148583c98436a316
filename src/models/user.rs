use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Documento da collection "users"
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// Unique key, stored lowercased
    pub email: String,
    /// bcrypt hash, never plaintext
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub created_at: i64,
}

/// What the API returns for a user: everything except the password hash.
#[derive(Debug, Serialize, Clone)]
pub struct PublicUser {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub email: String,
    pub name: String,
    pub created_at: i64,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}
