use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Achi Dukaan API",
        version = "1.0.0",
        description = "Businesses (dukaans), their categories and cities, and user ratings.\n\n**Authentication:** write endpoints and user lookup require a JWT bearer token obtained from `POST /login`."
    ),
    paths(
        crate::api::health::welcome,
        crate::api::health::health_check,
        crate::api::auth::login,
        crate::api::users::get_user,
        crate::api::users::create_user,
        crate::api::dukaans::list_dukaans,
        crate::api::dukaans::create_dukaan,
        crate::api::dukaans::get_business,
        crate::api::dukaans::get_business_by_city,
        crate::api::dukaans::search,
        crate::api::catalog::create_category,
        crate::api::catalog::list_categories,
        crate::api::catalog::list_cities,
        crate::api::catalog::create_city,
        crate::api::ratings::submit_rating,
        crate::api::ratings::get_rating,
    ),
    components(
        schemas(
            crate::api::health::HealthResponse,
            crate::services::auth_service::LoginRequest,
            crate::services::auth_service::LoginResponse,
            crate::models::CreateUserRequest,
            crate::models::CreateDukaanRequest,
            crate::models::CreateCityRequest,
            crate::models::RatingRequest,
        )
    ),
    tags(
        (name = "Health", description = "Welcome and health check."),
        (name = "Auth", description = "Email/password login issuing bearer tokens."),
        (name = "Users", description = "User registration and lookup."),
        (name = "Dukaans", description = "Businesses, listing, lookup by city and search, each enriched with category names and average rating."),
        (name = "Catalog", description = "Categories and cities."),
        (name = "Ratings", description = "One rating per user and business; resubmitting updates it."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token from POST /login"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/",
            "/health",
            "/login",
            "/user",
            "/user/{id}",
            "/dukaan",
            "/business/{id}",
            "/get-business-by-city/{city}",
            "/search/{query}",
            "/category/{name}",
            "/categories",
            "/city",
            "/rating",
            "/rating/{business_id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
