use crate::database::DukaanStore;
use crate::models::{
    DukaanDetail, RatingOverview, RatingRequest, RatingUpsert, MAX_RATING, MIN_RATING,
};
use crate::services::auth_service::Claims;
use crate::services::dukaan_service;
use crate::utils::error::{AppError, AppResult};
use crate::utils::validation::{parse_object_id, parse_payload, RATING_SCHEMA};
use serde_json::Value;

#[derive(Debug)]
pub struct SubmittedRating {
    pub detail: DukaanDetail,
    pub created: bool,
}

/// Rates a business as the authenticated user. A second submission for the
/// same business overwrites the first.
pub async fn submit_rating(
    store: &dyn DukaanStore,
    claims: &Claims,
    payload: Value,
) -> AppResult<SubmittedRating> {
    let request: RatingRequest = parse_payload(payload, RATING_SCHEMA)?;

    let user = claims.user_id()?;
    if let Some(claimed) = request.user.as_deref() {
        if parse_object_id(claimed, "user")? != user {
            return Err(AppError::Forbidden(
                "Ratings can only be submitted for the authenticated user".to_string(),
            ));
        }
    }

    if !request.rating.is_finite() || !(MIN_RATING..=MAX_RATING).contains(&request.rating) {
        return Err(AppError::InvalidRequest(format!(
            "rating must be between {} and {}",
            MIN_RATING, MAX_RATING
        )));
    }

    let dukaan = dukaan_service::find_dukaan(store, &request.business).await?;

    let comment = request
        .comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    let outcome = store
        .upsert_rating(&RatingUpsert {
            user,
            business: dukaan.id,
            rating: request.rating,
            comment,
            now: chrono::Utc::now().timestamp(),
        })
        .await?;

    log::info!(
        "⭐ Rating {} for {} by {}: {}",
        if outcome.created { "created" } else { "updated" },
        dukaan.id,
        user,
        outcome.rating.rating
    );

    Ok(SubmittedRating {
        detail: dukaan_service::detail(store, dukaan).await?,
        created: outcome.created,
    })
}

/// Average and count for a single business.
pub async fn business_rating(
    store: &dyn DukaanStore,
    business_id: &str,
) -> AppResult<RatingOverview> {
    let dukaan = dukaan_service::find_dukaan(store, business_id).await?;
    let summary = store
        .rating_summaries(&[dukaan.id])
        .await?
        .remove(&dukaan.id)
        .unwrap_or_default();

    Ok(RatingOverview {
        business: dukaan.id,
        avg_rating: summary.average(),
        rating_count: summary.count,
    })
}
