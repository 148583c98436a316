use crate::database::DukaanStore;
use crate::models::{CreateDukaanRequest, PageQuery};
use crate::services::{dukaan_service, Claims};
use crate::utils::error::AppError;
use crate::utils::sanitize::{to_json, to_json_list};
use actix_web::{web, HttpResponse};
use serde_json::Value;

#[utoipa::path(
    get,
    path = "/dukaan",
    tag = "Dukaans",
    params(
        ("page" = Option<u64>, Query, description = "1-based page number"),
        ("limit" = Option<i64>, Query, description = "Page size, 1..=50, default 5")
    ),
    responses(
        (status = 200, description = "Businesses with category names and average rating")
    )
)]
pub async fn list_dukaans(
    store: web::Data<dyn DukaanStore>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    log::info!("🏪 GET /dukaan - page: {:?}, limit: {}", query.page, query.limit());

    let dukaans = dukaan_service::list_dukaans(store.get_ref(), &query).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "dukaans": to_json_list(&dukaans)?
    })))
}

#[utoipa::path(
    post,
    path = "/dukaan",
    tag = "Dukaans",
    request_body = CreateDukaanRequest,
    responses(
        (status = 201, description = "Business created"),
        (status = 400, description = "Missing field, unknown category or duplicate name"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_dukaan(
    user: web::ReqData<Claims>,
    store: web::Data<dyn DukaanStore>,
    payload: web::Json<Value>,
) -> Result<HttpResponse, AppError> {
    log::info!("🏪 POST /dukaan - user: {}", user.sub);

    let created_by = user.user_id()?;
    let dukaan = dukaan_service::create_dukaan(store.get_ref(), created_by, payload.into_inner())
        .await
        .inspect_err(|e| log::warn!("❌ Dukaan creation failed: {}", e))?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "dukaan": to_json(&dukaan)?
    })))
}

#[utoipa::path(
    get,
    path = "/business/{id}",
    tag = "Dukaans",
    params(("id" = String, Path, description = "Business id")),
    responses(
        (status = 200, description = "Business detail with every rating and its author"),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Business not found")
    )
)]
pub async fn get_business(
    store: web::Data<dyn DukaanStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let business_id = path.into_inner();
    log::info!("🏪 GET /business/{}", business_id);

    let detail = dukaan_service::get_detail(store.get_ref(), &business_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "business": to_json(&detail)?
    })))
}

#[utoipa::path(
    get,
    path = "/get-business-by-city/{city}",
    tag = "Dukaans",
    params(("city" = String, Path, description = "Case-insensitive part of the city name")),
    responses(
        (status = 200, description = "Up to 10 matching businesses")
    )
)]
pub async fn get_business_by_city(
    store: web::Data<dyn DukaanStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let city = path.into_inner();
    log::info!("🏙️ GET /get-business-by-city/{}", city);

    let businesses = dukaan_service::find_by_city(store.get_ref(), &city).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "businesses": to_json_list(&businesses)?
    })))
}

#[utoipa::path(
    get,
    path = "/search/{query}",
    tag = "Dukaans",
    params(("query" = String, Path, description = "Case-insensitive part of the business name")),
    responses(
        (status = 200, description = "Up to 10 matching businesses")
    )
)]
pub async fn search(
    store: web::Data<dyn DukaanStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let query = path.into_inner();
    log::info!("🔍 GET /search/{}", query);

    let businesses = dukaan_service::search(store.get_ref(), &query).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "businesses": to_json_list(&businesses)?
    })))
}
