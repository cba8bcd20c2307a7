mod api;
mod config;
mod database;
mod middleware;
mod models;
mod utils;

use actix_cors::Cors;
use actix_web::{
    middleware::{Compress, Logger},
    web, App, HttpServer,
};
use std::io;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use config::Config;
use database::{StoreStatus, UserStore};

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load environment variables
    Config::load_env_files();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

    log::info!("🚀 Starting User Service...");

    // The store is built up front but only contacted once the listener is bound.
    let store = database::open_store(&config);
    let status = StoreStatus::default();

    let store_data: web::Data<dyn UserStore> = web::Data::from(store.clone());
    let status_data = web::Data::new(status.clone());
    let cors_origins = config.cors_allowed_origins.clone();

    let server = HttpServer::new(move || {
        let cors = cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(store_data.clone())
            .app_data(status_data.clone())
            .wrap(cors)
            .wrap(Compress::default())
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi),
            )
            .configure(api::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run();

    log::info!("🌐 Listening on: {}:{}", config.host, config.port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", config.host, config.port);

    database::spawn_connect(store.clone(), status);

    server.await?;

    store.shutdown().await;
    log::info!("👋 Server stopped");

    Ok(())
}
