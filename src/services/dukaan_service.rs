use crate::database::DukaanStore;
use crate::models::{
    CreateDukaanRequest, Dukaan, DukaanDetail, DukaanFilter, DukaanSummary, PageQuery,
    RatingSummary, RatingView, LOOKUP_LIMIT,
};
use crate::utils::error::{AppError, AppResult};
use crate::utils::validation::{non_blank, parse_object_id, parse_payload, DUKAAN_SCHEMA};
use mongodb::bson::oid::ObjectId;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

pub async fn create_dukaan(
    store: &dyn DukaanStore,
    created_by: ObjectId,
    payload: Value,
) -> AppResult<Dukaan> {
    let request: CreateDukaanRequest = parse_payload(payload, DUKAAN_SCHEMA)?;

    let name = non_blank(&request.name, "name")?;
    let city = non_blank(&request.city, "city")?;

    let mut seen = HashSet::new();
    let mut categories: Vec<ObjectId> = Vec::with_capacity(request.categories.len());
    for raw in &request.categories {
        let id = parse_object_id(raw, "category")?;
        if seen.insert(id) {
            categories.push(id);
        }
    }

    let known: HashSet<ObjectId> = store
        .find_categories(&categories)
        .await?
        .into_iter()
        .map(|c| c.id)
        .collect();
    let unknown: Vec<String> = categories
        .iter()
        .filter(|id| !known.contains(id))
        .map(|id| id.to_hex())
        .collect();
    if !unknown.is_empty() {
        return Err(AppError::InvalidRequest(format!(
            "Unknown category id(s): {}",
            unknown.join(", ")
        )));
    }

    let dukaan = Dukaan {
        id: ObjectId::new(),
        name,
        city,
        categories,
        address: request.address.map(|a| a.trim().to_string()).filter(|a| !a.is_empty()),
        description: request.description.map(|d| d.trim().to_string()).filter(|d| !d.is_empty()),
        created_by: Some(created_by),
        created_at: chrono::Utc::now().timestamp(),
    };

    store.insert_dukaan(&dukaan).await.map_err(|e| {
        e.on_duplicate(|| {
            "Business name already exists, Please choose another name.".to_string()
        })
    })?;

    log::info!("✅ Dukaan created: {} ({})", dukaan.name, dukaan.city);
    Ok(dukaan)
}

pub async fn list_dukaans(
    store: &dyn DukaanStore,
    page: &PageQuery,
) -> AppResult<Vec<DukaanSummary>> {
    let dukaans = store
        .list_dukaans(&DukaanFilter::All, page.skip(), page.limit())
        .await?;
    summarize(store, dukaans).await
}

pub async fn find_by_city(store: &dyn DukaanStore, city: &str) -> AppResult<Vec<DukaanSummary>> {
    let city = city.trim();
    if city.is_empty() {
        return Ok(Vec::new());
    }
    let dukaans = store
        .list_dukaans(&DukaanFilter::CityContains(city.to_string()), 0, LOOKUP_LIMIT)
        .await?;
    summarize(store, dukaans).await
}

pub async fn search(store: &dyn DukaanStore, query: &str) -> AppResult<Vec<DukaanSummary>> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }
    let dukaans = store
        .list_dukaans(&DukaanFilter::NameContains(query.to_string()), 0, LOOKUP_LIMIT)
        .await?;
    summarize(store, dukaans).await
}

pub async fn find_dukaan(store: &dyn DukaanStore, dukaan_id: &str) -> AppResult<Dukaan> {
    let id = parse_object_id(dukaan_id, "business")?;
    store
        .find_dukaan(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Business not found.".to_string()))
}

pub async fn get_detail(store: &dyn DukaanStore, dukaan_id: &str) -> AppResult<DukaanDetail> {
    let dukaan = find_dukaan(store, dukaan_id).await?;
    detail(store, dukaan).await
}

/// Resolves category names and rating summaries for a page of businesses,
/// with one category lookup and one aggregation for the whole page.
pub async fn summarize(
    store: &dyn DukaanStore,
    dukaans: Vec<Dukaan>,
) -> AppResult<Vec<DukaanSummary>> {
    if dukaans.is_empty() {
        return Ok(Vec::new());
    }

    let category_names = category_names(store, &dukaans).await?;
    let ids: Vec<ObjectId> = dukaans.iter().map(|d| d.id).collect();
    let ratings = store.rating_summaries(&ids).await?;

    Ok(dukaans
        .into_iter()
        .map(|dukaan| {
            let rating = ratings.get(&dukaan.id).copied().unwrap_or_default();
            to_summary(dukaan, &category_names, rating)
        })
        .collect())
}

/// Full business view: every rating with its author's name.
pub async fn detail(store: &dyn DukaanStore, dukaan: Dukaan) -> AppResult<DukaanDetail> {
    let category_names = category_names(store, std::slice::from_ref(&dukaan)).await?;
    let ratings = store.ratings_for_business(&dukaan.id).await?;

    let author_ids: Vec<ObjectId> = ratings
        .iter()
        .map(|r| r.user)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let authors: HashMap<ObjectId, String> = store
        .find_users(&author_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u.name))
        .collect();

    let summary = RatingSummary::from_values(ratings.iter().map(|r| r.rating));
    let views = ratings
        .into_iter()
        .map(|r| RatingView {
            id: r.id,
            user: r.user,
            user_name: authors.get(&r.user).cloned(),
            rating: r.rating,
            comment: r.comment,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
        .collect();

    Ok(DukaanDetail {
        summary: to_summary(dukaan, &category_names, summary),
        ratings: views,
    })
}

async fn category_names(
    store: &dyn DukaanStore,
    dukaans: &[Dukaan],
) -> AppResult<HashMap<ObjectId, String>> {
    let ids: Vec<ObjectId> = dukaans
        .iter()
        .flat_map(|d| d.categories.iter().copied())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    Ok(store
        .find_categories(&ids)
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect())
}

fn to_summary(
    dukaan: Dukaan,
    category_names: &HashMap<ObjectId, String>,
    rating: RatingSummary,
) -> DukaanSummary {
    // Categories deleted since the business was created are dropped
    let categories = dukaan
        .categories
        .iter()
        .filter_map(|id| category_names.get(id).cloned())
        .collect();

    DukaanSummary {
        id: dukaan.id,
        name: dukaan.name,
        city: dukaan.city,
        categories,
        address: dukaan.address,
        description: dukaan.description,
        avg_rating: rating.average(),
        rating_count: rating.count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::models::{Category, RatingUpsert};
    use serde_json::json;

    async fn seed_category(store: &MemoryStore, name: &str) -> ObjectId {
        let category = Category { id: ObjectId::new(), name: name.into() };
        store.insert_category(&category).await.unwrap();
        category.id
    }

    #[tokio::test]
    async fn rejects_unknown_categories() {
        let store = MemoryStore::new();
        let err = create_dukaan(
            &store,
            ObjectId::new(),
            json!({
                "name": "Sharma Sweets",
                "city": "Delhi",
                "categories": [ObjectId::new().to_hex()]
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidRequest(msg) if msg.starts_with("Unknown category")
        ));
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected() {
        let store = MemoryStore::new();
        let body = json!({ "name": "Sharma Sweets", "city": "Delhi", "categories": [] });
        create_dukaan(&store, ObjectId::new(), body.clone()).await.unwrap();

        let err = create_dukaan(&store, ObjectId::new(), body).await.unwrap_err();
        assert_eq!(
            err,
            AppError::Duplicate("Business name already exists, Please choose another name.".into())
        );
    }

    #[tokio::test]
    async fn summaries_resolve_names_and_average() {
        let store = MemoryStore::new();
        let sweets = seed_category(&store, "Sweets").await;
        let snacks = seed_category(&store, "Snacks").await;
        let dukaan = create_dukaan(
            &store,
            ObjectId::new(),
            json!({
                "name": "Haldiram",
                "city": "Nagpur",
                "categories": [snacks.to_hex(), sweets.to_hex()]
            }),
        )
        .await
        .unwrap();

        for value in [4.0, 5.0, 5.0] {
            store
                .upsert_rating(&RatingUpsert {
                    user: ObjectId::new(),
                    business: dukaan.id,
                    rating: value,
                    comment: None,
                    now: 0,
                })
                .await
                .unwrap();
        }

        let listed = list_dukaans(&store, &PageQuery::default()).await.unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].categories, vec!["Snacks".to_string(), "Sweets".to_string()]);
        assert_eq!(listed[0].avg_rating, 4.7);
        assert_eq!(listed[0].rating_count, 3);
    }

    #[tokio::test]
    async fn city_lookup_ignores_case() {
        let store = MemoryStore::new();
        create_dukaan(
            &store,
            ObjectId::new(),
            json!({ "name": "Bombay Canteen", "city": "Mumbai", "categories": [] }),
        )
        .await
        .unwrap();

        assert_eq!(find_by_city(&store, "mumbai").await.unwrap().len(), 1);
        assert_eq!(find_by_city(&store, "MUM").await.unwrap().len(), 1);
        assert!(find_by_city(&store, "pune").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn detail_without_ratings_averages_zero() {
        let store = MemoryStore::new();
        let dukaan = create_dukaan(
            &store,
            ObjectId::new(),
            json!({ "name": "Empty Shop", "city": "Pune", "categories": [] }),
        )
        .await
        .unwrap();

        let detail = get_detail(&store, &dukaan.id.to_hex()).await.unwrap();

        assert_eq!(detail.summary.avg_rating, 0.0);
        assert_eq!(detail.summary.rating_count, 0);
        assert!(detail.ratings.is_empty());
    }
}
