pub mod api;
pub mod config;
pub mod database;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use actix_web::{guard, web};
use middleware::AuthMiddleware;
use utils::error::AppError;

/// Registers every route. Expects `web::Data<dyn DukaanStore>` and
/// `web::Data<AuthService>` in the app data. Extractor failures are answered
/// with the same JSON error body as handler errors.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        AppError::InvalidRequest(format!("Missing JSON in request: {}", err)).into()
    });

    let query_config = web::QueryConfig::default().error_handler(|err, _req| {
        AppError::InvalidRequest(format!("Invalid query string: {}", err)).into()
    });
    let path_config = web::PathConfig::default().error_handler(|err, _req| {
        AppError::InvalidRequest(format!("Invalid path parameter: {}", err)).into()
    });

    cfg.app_data(json_config)
        .app_data(query_config)
        .app_data(path_config)
        .route("/", web::get().to(api::health::welcome))
        .route("/health", web::get().to(api::health::health_check))
        // Auth
        .route("/login", web::post().to(api::auth::login))
        // Users
        .service(web::resource("/user").route(web::post().to(api::users::create_user)))
        .service(
            web::resource("/user/{id}")
                .wrap(AuthMiddleware)
                .route(web::get().to(api::users::get_user)),
        )
        // Dukaans: listing is public, creation requires a token
        .service(
            web::resource("/dukaan")
                .guard(guard::Get())
                .route(web::get().to(api::dukaans::list_dukaans)),
        )
        .service(
            web::resource("/dukaan")
                .guard(guard::Post())
                .wrap(AuthMiddleware)
                .route(web::post().to(api::dukaans::create_dukaan)),
        )
        .route("/business/{id}", web::get().to(api::dukaans::get_business))
        .route(
            "/get-business-by-city/{city}",
            web::get().to(api::dukaans::get_business_by_city),
        )
        .route("/search/{query}", web::get().to(api::dukaans::search))
        // Catalog
        .service(
            web::resource("/category/{name}")
                .wrap(AuthMiddleware)
                .route(web::get().to(api::catalog::create_category)),
        )
        .route("/categories", web::get().to(api::catalog::list_categories))
        .service(
            web::resource("/city")
                .guard(guard::Get())
                .route(web::get().to(api::catalog::list_cities)),
        )
        .service(
            web::resource("/city")
                .guard(guard::Post())
                .wrap(AuthMiddleware)
                .route(web::post().to(api::catalog::create_city)),
        )
        // Ratings
        .service(
            web::resource("/rating")
                .wrap(AuthMiddleware)
                .route(web::post().to(api::ratings::submit_rating)),
        )
        .route("/rating/{business_id}", web::get().to(api::ratings::get_rating));
}
