use achi_dukaan::{
    api,
    config::{AppConfig, DatabaseBackend},
    database::{DukaanStore, MemoryStore, MongoDB},
    middleware::SecurityHeaders,
    services::AuthService,
};
use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("❌ Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    log::info!("🚀 Starting Achi Dukaan API...");

    let store: Arc<dyn DukaanStore> = match &config.backend {
        DatabaseBackend::MongoDB { uri, database } => {
            log::info!("📊 Database: MongoDB ({})", database);
            let db = MongoDB::new(uri, database).await.map_err(|e| {
                log::error!("❌ Failed to connect to MongoDB: {}", e);
                std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
            })?;
            log::info!("✅ MongoDB connected successfully");
            Arc::new(db)
        }
        DatabaseBackend::Memory => {
            log::warn!("⚠️  Using the in-memory store, data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let store_data: web::Data<dyn DukaanStore> = web::Data::from(store);
    let auth_data = web::Data::new(AuthService::from_config(&config));
    let allowed_origins = config.allowed_origins.clone();

    let host = config.host.clone();
    let port = config.port;

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);
    log::info!("📄 OpenAPI spec at: http://{}:{}/api-docs/openapi.json", host, port);

    HttpServer::new(move || {
        let cors = allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .expose_headers(vec![actix_web::http::header::CONTENT_TYPE])
            .max_age(3600);

        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(store_data.clone())
            .app_data(auth_data.clone())
            .wrap(cors)
            .wrap(SecurityHeaders)
            .wrap(Logger::default())
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi))
            .configure(achi_dukaan::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
