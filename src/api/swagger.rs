use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Campus Connect API",
        version = "1.0.0",
        description = "Backend for the students / startups / clubs network.\n\n**Authentication:** login sets an httpOnly `token` cookie. API clients may send the same JWT as `Authorization: Bearer <token>`.\n\n**Profiles:** anonymous callers receive a per-type public projection; signed-in callers see full profiles (credentials are never returned)."
    ),
    paths(
        // Auth endpoints
        crate::api::auth::login,
        crate::api::auth::register,
        crate::api::auth::logout,
        crate::api::auth::get_me,
        crate::api::auth::delete_account,

        // Profiles
        crate::api::profiles::get_profile,
        crate::api::profiles::update_profile,
        crate::api::profiles::list_profiles,

        // Health
        crate::api::health::health_check,
    ),
    components(
        schemas(
            crate::models::LoginRequest,
            crate::models::RegisterRequest,
            crate::models::AuthResponse,
            crate::models::ProfileResponse,
            crate::models::ProfileListResponse,
            crate::models::MessageResponse,
            crate::models::UserType,
            crate::api::health::HealthResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Registration, login/logout and account management for students, startups and clubs."),
        (name = "Profiles", description = "Profile lookup, listing and editing. Output depends on whether the caller is signed in."),
        (name = "Health", description = "Health check endpoint for monitoring service status."),
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
                        .description(Some("Session JWT sent as a bearer token"))
                        .build(),
                ),
            );
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("token"))),
            );
        }
    }
}
