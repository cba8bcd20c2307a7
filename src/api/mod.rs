pub mod health;
pub mod swagger;
pub mod users;

use actix_web::{error, web};

use crate::utils::AppError;

/// Largest JSON body accepted on `/user`.
const JSON_LIMIT: usize = 100 * 1024;

/// JSON extractor settings: malformed bodies are answered with `{"err": ...}`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT)
        .error_handler(|err, _req| {
            log::debug!("Rejected request body: {}", err);
            error::Error::from(AppError::BadRequest(err.to_string()))
        })
}

/// Registers every route of the service.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route("/", web::get().to(health::hello))
        .route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/user")
                .service(
                    web::resource(["", "/"])
                        .route(web::get().to(users::list_users))
                        .route(web::post().to(users::create_user))
                        .route(web::patch().to(users::update_user)),
                )
                .service(
                    web::resource("/{id}")
                        .route(web::get().to(users::get_user))
                        .route(web::delete().to(users::delete_user)),
                ),
        );
}
