mod api;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod store;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use config::AppConfig;
use database::{ConnectionManager, ConnectionPolicy, MongoConnector};
use dotenv::dotenv;
use services::{SessionManager, TokenService};
use std::sync::Arc;
use store::{MongoProfileStore, ProfileStore};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Missing secrets or database URI are fatal
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ Invalid configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e));
        }
    };
    let tokens = TokenService::new(&config.jwt_secret)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    log::info!("🚀 Starting Campus Connect API...");
    log::info!(
        "📊 Database: {} ({:?} mode)",
        config.mongodb_db,
        config.mode
    );

    let connections = Arc::new(ConnectionManager::new(
        MongoConnector::new(&config.mongodb_uri, &config.mongodb_db, config.mode),
        ConnectionPolicy::default(),
    ));

    // The server still starts without a database; handlers answer 503 until it is reachable
    let mongo_store = MongoProfileStore::new(connections);
    match mongo_store.ping().await {
        Ok(()) => log::info!("✅ Profile store ready"),
        Err(e) => log::warn!("⚠️  MongoDB not reachable at startup: {}", e),
    }

    let store: Arc<dyn ProfileStore> = Arc::new(mongo_store);
    let store_data = web::Data::from(store);
    let session_data = web::Data::new(SessionManager::new(tokens, config.mode));

    let host = config.host.clone();
    let port = config.port;
    let frontend_url = config.frontend_url.clone();

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);

    // Start HTTP server
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&frontend_url)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .supports_credentials()
            .max_age(3600);

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(store_data.clone())
            .app_data(session_data.clone())
            .wrap(cors)
            .wrap(middleware::SecurityHeaders)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi),
            )
            .configure(api::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
