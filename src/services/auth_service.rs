use crate::config::AppConfig;
use crate::database::DukaanStore;
use crate::models::User;
use crate::utils::error::{AppError, AppResult};
use crate::utils::validation::{parse_object_id, require_fields};
use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,           // user id (ObjectId hex)
    pub email: String,
    pub iat: usize,            // issued at
    pub exp: usize,            // expiration
    pub jti: String,           // JWT ID
    pub aud: String,           // audience
    pub iss: String,           // issuer
}

impl Claims {
    pub fn user_id(&self) -> AppResult<ObjectId> {
        parse_object_id(&self.sub, "user")
            .map_err(|_| AppError::Unauthorized("Invalid token subject".to_string()))
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub access_token: String,
    pub user_id: String,
}

/// Issues and checks bearer tokens, hashes and verifies passwords.
/// Built once from the config and shared by every worker.
#[derive(Clone)]
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    ttl: Duration,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(
        secret: &str,
        issuer: &str,
        audience: &str,
        ttl_hours: i64,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.to_string(),
            audience: audience.to_string(),
            ttl: Duration::hours(ttl_hours),
            bcrypt_cost,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.jwt_secret,
            &config.jwt_issuer,
            &config.jwt_audience,
            config.jwt_ttl_hours,
            config.bcrypt_cost,
        )
    }

    pub fn generate_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_hex(),
            email: user.email.clone(),
            iat: now.timestamp() as usize,
            exp: (now + self.ttl).timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
            aud: self.audience.clone(),
            iss: self.issuer.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
    }

    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.audience.as_str()]);
        validation.set_issuer(&[self.issuer.as_str()]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
    }

    pub async fn hash_password(&self, password: &str) -> AppResult<String> {
        let password = password.to_string();
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || hash(password, cost))
            .await
            .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))?
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    pub async fn verify_password(&self, password: &str, stored_hash: &str) -> AppResult<bool> {
        let password = password.to_string();
        let stored_hash = stored_hash.to_string();
        tokio::task::spawn_blocking(move || verify(password, &stored_hash))
            .await
            .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))?
            .map_err(|e| AppError::Internal(format!("Password verification error: {}", e)))
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// User login
pub async fn login(
    store: &dyn DukaanStore,
    auth: &AuthService,
    payload: Value,
) -> AppResult<LoginResponse> {
    require_fields(&payload, &["email", "password"])?;
    let request: LoginRequest = serde_json::from_value(payload)
        .map_err(|e| AppError::InvalidRequest(format!("Invalid request body: {}", e)))?;

    let user = store
        .find_user_by_email(&normalize_email(&request.email))
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if !auth.verify_password(&request.password, &user.password).await? {
        return Err(AppError::Unauthorized("Invalid email or password".to_string()));
    }

    Ok(LoginResponse {
        success: true,
        access_token: auth.generate_token(&user)?,
        user_id: user.id.to_hex(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new("test-secret", "achi-dukaan", "achi-dukaan-api", 1, 4)
    }

    fn user() -> User {
        User {
            id: ObjectId::new(),
            email: "ravi@example.com".into(),
            password: String::new(),
            name: "Ravi".into(),
            created_at: 0,
        }
    }

    #[test]
    fn token_round_trip_keeps_subject() {
        let auth = service();
        let user = user();

        let token = auth.generate_token(&user).unwrap();
        let claims = auth.verify_token(&token).unwrap();

        assert_eq!(claims.sub, user.id.to_hex());
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.user_id().unwrap(), user.id);
    }

    #[test]
    fn rejects_foreign_tokens() {
        let token = service().generate_token(&user()).unwrap();

        let other_secret = AuthService::new("other", "achi-dukaan", "achi-dukaan-api", 1, 4);
        assert!(matches!(other_secret.verify_token(&token), Err(AppError::Unauthorized(_))));

        let other_audience = AuthService::new("test-secret", "achi-dukaan", "someone-else", 1, 4);
        assert!(other_audience.verify_token(&token).is_err());

        assert!(service().verify_token("not.a.token").is_err());
    }

    #[tokio::test]
    async fn hashes_are_not_plaintext_and_verify() {
        let auth = service();
        let hashed = auth.hash_password("chai-garam").await.unwrap();

        assert_ne!(hashed, "chai-garam");
        assert!(auth.verify_password("chai-garam", &hashed).await.unwrap());
        assert!(!auth.verify_password("chai-thanda", &hashed).await.unwrap());
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  Ravi@Example.COM "), "ravi@example.com");
    }
}
