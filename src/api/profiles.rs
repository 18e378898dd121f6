use crate::models::{ProfileListResponse, ProfileResponse};
use crate::services::{profile_service, SessionManager};
use crate::store::ProfileStore;
use crate::utils::ApiError;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProfileQuery {
    /// Restrict the lookup to one collection (student, startup, club).
    #[serde(rename = "type")]
    pub user_type: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/profile/{id}",
    tag = "Profiles",
    params(("id" = String, Path, description = "Profile ObjectId"), ProfileQuery),
    responses(
        (status = 200, description = "Profile, filtered by session state", body = ProfileResponse),
        (status = 400, description = "Invalid id or type"),
        (status = 404, description = "Profile not found"),
        (status = 503, description = "Database unavailable")
    )
)]
pub async fn get_profile(
    req: HttpRequest,
    store: web::Data<dyn ProfileStore>,
    session: web::Data<SessionManager>,
    path: web::Path<String>,
    query: web::Query<ProfileQuery>,
) -> HttpResponse {
    let viewer = session.identify(&req);
    log::info!(
        "🔎 GET /api/profile/{} (authenticated: {})",
        path,
        viewer.is_some()
    );

    match profile_service::get_profile(
        store.get_ref(),
        &path,
        query.user_type.as_deref(),
        viewer.as_ref(),
    )
    .await
    {
        Ok(profile) => HttpResponse::Ok().json(ProfileResponse {
            success: true,
            profile,
        }),
        Err(e) => {
            log::warn!("❌ Profile lookup failed for {}: {}", path, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    put,
    path = "/api/profile/{id}",
    tag = "Profiles",
    params(("id" = String, Path, description = "Profile ObjectId")),
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Invalid id or no editable fields"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the profile owner"),
        (status = 404, description = "Profile not found")
    ),
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn update_profile(
    req: HttpRequest,
    store: web::Data<dyn ProfileStore>,
    session: web::Data<SessionManager>,
    path: web::Path<String>,
    changes: web::Json<Map<String, Value>>,
) -> HttpResponse {
    log::info!("✏️  PUT /api/profile/{}", path);

    let Some(owner) = session.identify(&req) else {
        return ApiError::Unauthorized.error_response();
    };

    match profile_service::update_profile(store.get_ref(), &owner, &path, &changes).await {
        Ok(profile) => HttpResponse::Ok().json(ProfileResponse {
            success: true,
            profile,
        }),
        Err(e) => {
            log::warn!("❌ Profile update failed for {}: {}", path, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/profiles/{user_type}",
    tag = "Profiles",
    params(("user_type" = String, Path, description = "student, startup or club")),
    responses(
        (status = 200, description = "All profiles of one type", body = ProfileListResponse),
        (status = 400, description = "Unknown type"),
        (status = 503, description = "Database unavailable")
    )
)]
pub async fn list_profiles(
    req: HttpRequest,
    store: web::Data<dyn ProfileStore>,
    session: web::Data<SessionManager>,
    path: web::Path<String>,
) -> HttpResponse {
    let viewer = session.identify(&req);
    log::info!("📋 GET /api/profiles/{}", path);

    match profile_service::list_profiles(store.get_ref(), &path, viewer.as_ref()).await {
        Ok(profiles) => HttpResponse::Ok().json(ProfileListResponse {
            success: true,
            count: profiles.len(),
            profiles,
        }),
        Err(e) => {
            log::warn!("❌ Profile listing failed for {}: {}", path, e);
            e.error_response()
        }
    }
}
