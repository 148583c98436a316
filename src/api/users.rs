use crate::database::DukaanStore;
use crate::models::{CreateUserRequest, PublicUser};
use crate::services::{user_service, AuthService};
use crate::utils::error::AppError;
use crate::utils::sanitize::to_json;
use actix_web::{web, HttpResponse};
use serde_json::Value;

#[utoipa::path(
    get,
    path = "/user/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User found"),
        (status = 400, description = "Malformed id"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    store: web::Data<dyn DukaanStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    log::info!("👤 GET /user/{}", user_id);

    let user = user_service::get_user(store.get_ref(), &user_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "user": to_json(&PublicUser::from(&user))?
    })))
}

#[utoipa::path(
    post,
    path = "/user",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created"),
        (status = 400, description = "Missing field or duplicate email")
    )
)]
pub async fn create_user(
    store: web::Data<dyn DukaanStore>,
    auth: web::Data<AuthService>,
    payload: web::Json<Value>,
) -> Result<HttpResponse, AppError> {
    log::info!("📝 POST /user");

    let user = user_service::create_user(store.get_ref(), &auth, payload.into_inner())
        .await
        .inspect_err(|e| log::warn!("❌ User creation failed: {}", e))?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "user": to_json(&PublicUser::from(&user))?
    })))
}
