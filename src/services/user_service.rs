use crate::database::DukaanStore;
use crate::models::{CreateUserRequest, User};
use crate::services::auth_service::{normalize_email, AuthService};
use crate::utils::error::{AppError, AppResult};
use crate::utils::validation::{non_blank, parse_object_id, parse_payload, USER_SCHEMA};
use mongodb::bson::oid::ObjectId;
use serde_json::Value;

/// Registers a user. The unique index on `email` decides duplicates.
pub async fn create_user(
    store: &dyn DukaanStore,
    auth: &AuthService,
    payload: Value,
) -> AppResult<User> {
    let request: CreateUserRequest = parse_payload(payload, USER_SCHEMA)?;

    let email = normalize_email(&request.email);
    if !is_plausible_email(&email) {
        return Err(AppError::InvalidRequest(format!("Invalid email: {}", request.email)));
    }
    let name = non_blank(&request.name, "name")?;

    let user = User {
        id: ObjectId::new(),
        email,
        password: auth.hash_password(&request.password).await?,
        name,
        created_at: chrono::Utc::now().timestamp(),
    };

    store.insert_user(&user).await.map_err(|e| {
        e.on_duplicate(|| {
            format!("Duplicate email detected. User {} already exists.", user.email)
        })
    })?;

    log::info!("✅ User registered: {}", user.email);
    Ok(user)
}

pub async fn get_user(store: &dyn DukaanStore, user_id: &str) -> AppResult<User> {
    let id = parse_object_id(user_id, "user")?;
    store
        .find_user(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found.".to_string()))
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@') && !email.contains(' ')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use serde_json::json;

    fn auth() -> AuthService {
        AuthService::new("secret", "iss", "aud", 1, 4)
    }

    #[tokio::test]
    async fn stores_a_hash_not_the_password() {
        let store = MemoryStore::new();
        let user = create_user(
            &store,
            &auth(),
            json!({ "email": "Meera@Example.com", "password": "pa55", "name": "Meera" }),
        )
        .await
        .unwrap();

        assert_eq!(user.email, "meera@example.com");
        assert_ne!(user.password, "pa55");
        assert!(bcrypt::verify("pa55", &user.password).unwrap());
    }

    #[tokio::test]
    async fn duplicate_email_writes_nothing() {
        let store = MemoryStore::new();
        let body = json!({ "email": "meera@example.com", "password": "pa55", "name": "Meera" });
        create_user(&store, &auth(), body.clone()).await.unwrap();

        let err = create_user(&store, &auth(), body).await.unwrap_err();

        assert_eq!(
            err,
            AppError::Duplicate(
                "Duplicate email detected. User meera@example.com already exists.".into()
            )
        );
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn missing_user_is_not_found() {
        let store = MemoryStore::new();
        let err = get_user(&store, &ObjectId::new().to_hex()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = get_user(&store, "zzz").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[test]
    fn email_shape() {
        assert!(is_plausible_email("a@b.in"));
        assert!(!is_plausible_email("ab.in"));
        assert!(!is_plausible_email("@b.in"));
        assert!(!is_plausible_email("a@b@c"));
    }
}
