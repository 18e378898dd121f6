pub mod auth;
pub mod health;
pub mod profiles;
pub mod swagger;

use crate::middleware::AuthMiddleware;
use actix_web::web;

/// Registers every route except the Swagger UI.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        // Auth endpoints
        .service(
            web::scope("/api/auth")
                .route("/login", web::post().to(auth::login))
                .route("/logout", web::post().to(auth::logout))
                .route("/register/{user_type}", web::post().to(auth::register))
                .service(
                    web::resource("/me")
                        .wrap(AuthMiddleware)
                        .route(web::get().to(auth::get_me)),
                )
                .service(
                    web::resource("/account")
                        .wrap(AuthMiddleware)
                        .route(web::delete().to(auth::delete_account)),
                ),
        )
        // Profiles: public reads are filtered by session state, edits need a session
        .service(
            web::scope("/api")
                .route("/profile/{id}", web::get().to(profiles::get_profile))
                .route("/profile/{id}", web::put().to(profiles::update_profile))
                .route("/profiles/{user_type}", web::get().to(profiles::list_profiles)),
        );
}
