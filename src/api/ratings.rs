use crate::database::DukaanStore;
use crate::models::RatingRequest;
use crate::services::{rating_service, Claims};
use crate::utils::error::AppError;
use crate::utils::sanitize::to_json;
use actix_web::{web, HttpResponse};
use serde_json::Value;

#[utoipa::path(
    post,
    path = "/rating",
    tag = "Ratings",
    request_body = RatingRequest,
    responses(
        (status = 201, description = "Rating created, returns the business detail"),
        (status = 200, description = "Existing rating updated, returns the business detail"),
        (status = 400, description = "Missing field or rating out of range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Rating on behalf of another user"),
        (status = 404, description = "Business not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn submit_rating(
    user: web::ReqData<Claims>,
    store: web::Data<dyn DukaanStore>,
    payload: web::Json<Value>,
) -> Result<HttpResponse, AppError> {
    log::info!("⭐ POST /rating - user: {}", user.sub);

    let submitted = rating_service::submit_rating(store.get_ref(), &user, payload.into_inner())
        .await
        .inspect_err(|e| log::warn!("❌ Rating failed for {}: {}", user.sub, e))?;

    let body = serde_json::json!({
        "success": true,
        "business": to_json(&submitted.detail)?
    });

    Ok(if submitted.created {
        HttpResponse::Created().json(body)
    } else {
        HttpResponse::Ok().json(body)
    })
}

#[utoipa::path(
    get,
    path = "/rating/{business_id}",
    tag = "Ratings",
    params(("business_id" = String, Path, description = "Business id")),
    responses(
        (status = 200, description = "Average rating and count for the business"),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Business not found")
    )
)]
pub async fn get_rating(
    store: web::Data<dyn DukaanStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let business_id = path.into_inner();
    log::info!("⭐ GET /rating/{}", business_id);

    let overview = rating_service::business_rating(store.get_ref(), &business_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "rating": to_json(&overview)?
    })))
}
