use crate::database::DukaanStore;
use crate::services::auth_service::{self, AuthService, LoginRequest, LoginResponse};
use crate::utils::error::AppError;
use actix_web::{web, HttpResponse};
use serde_json::Value;

#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing email or password"),
        (status = 401, description = "Wrong password"),
        (status = 404, description = "No user with that email")
    )
)]
pub async fn login(
    store: web::Data<dyn DukaanStore>,
    auth: web::Data<AuthService>,
    payload: web::Json<Value>,
) -> Result<HttpResponse, AppError> {
    let email = payload.get("email").and_then(Value::as_str).unwrap_or("N/A").to_string();
    log::info!("🔐 POST /login - email: {}", email);

    match auth_service::login(store.get_ref(), &auth, payload.into_inner()).await {
        Ok(response) => {
            log::info!("✅ Login successful: {}", email);
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => {
            log::warn!("❌ Login failed: {} - {}", email, e);
            Err(e)
        }
    }
}
