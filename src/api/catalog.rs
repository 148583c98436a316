use crate::database::DukaanStore;
use crate::models::CreateCityRequest;
use crate::services::catalog_service;
use crate::utils::error::AppError;
use crate::utils::sanitize::{to_json, to_json_list};
use actix_web::{web, HttpResponse};
use serde_json::Value;

#[utoipa::path(
    get,
    path = "/category/{name}",
    tag = "Catalog",
    params(("name" = String, Path, description = "Category name")),
    responses(
        (status = 201, description = "Category created"),
        (status = 400, description = "Duplicate category"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_category(
    store: web::Data<dyn DukaanStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let name = path.into_inner();
    log::info!("🏷️ GET /category/{}", name);

    let category = catalog_service::create_category(store.get_ref(), &name).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "message": format!("{} added successfully.", category.name),
        "category": to_json(&category)?
    })))
}

#[utoipa::path(
    get,
    path = "/categories",
    tag = "Catalog",
    responses((status = 200, description = "All categories"))
)]
pub async fn list_categories(store: web::Data<dyn DukaanStore>) -> Result<HttpResponse, AppError> {
    let categories = catalog_service::list_categories(store.get_ref()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "categories": to_json_list(&categories)?
    })))
}

#[utoipa::path(
    get,
    path = "/city",
    tag = "Catalog",
    responses((status = 200, description = "All cities"))
)]
pub async fn list_cities(store: web::Data<dyn DukaanStore>) -> Result<HttpResponse, AppError> {
    let cities = catalog_service::list_cities(store.get_ref()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "cities": to_json_list(&cities)?
    })))
}

#[utoipa::path(
    post,
    path = "/city",
    tag = "Catalog",
    request_body = CreateCityRequest,
    responses(
        (status = 201, description = "City created"),
        (status = 400, description = "Missing name or duplicate city"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_city(
    store: web::Data<dyn DukaanStore>,
    payload: web::Json<Value>,
) -> Result<HttpResponse, AppError> {
    log::info!("🏙️ POST /city");

    let city = catalog_service::create_city(store.get_ref(), payload.into_inner()).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "city": to_json(&city)?
    })))
}
