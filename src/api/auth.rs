use crate::models::{AuthResponse, LoginRequest, MessageResponse, ProfileResponse, RegisterRequest, UserType};
use crate::services::{auth_service, Claims, SessionManager};
use crate::store::ProfileStore;
use crate::utils::ApiError;
use actix_web::{web, HttpResponse, ResponseError};

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, session cookie set", body = AuthResponse),
        (status = 400, description = "Missing email or password"),
        (status = 401, description = "Invalid credentials"),
        (status = 503, description = "Database unavailable")
    )
)]
pub async fn login(
    store: web::Data<dyn ProfileStore>,
    session: web::Data<SessionManager>,
    request: web::Json<LoginRequest>,
) -> HttpResponse {
    log::info!("🔐 POST /api/auth/login - email: {}", request.email);

    match auth_service::login(store.get_ref(), &session, &request).await {
        Ok(outcome) => {
            log::info!("✅ Login successful: {}", request.email);
            session
                .attach_token(&mut HttpResponse::Ok(), &outcome.token)
                .json(AuthResponse {
                    success: true,
                    user: outcome.user,
                })
        }
        Err(e) => {
            log::warn!("❌ Login failed: {} - {}", request.email, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/register/{user_type}",
    tag = "Auth",
    params(("user_type" = String, Path, description = "student, startup or club")),
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created, session cookie set", body = AuthResponse),
        (status = 400, description = "Invalid request or email already registered"),
        (status = 503, description = "Database unavailable")
    )
)]
pub async fn register(
    store: web::Data<dyn ProfileStore>,
    session: web::Data<SessionManager>,
    path: web::Path<String>,
    request: web::Json<RegisterRequest>,
) -> HttpResponse {
    log::info!("📝 POST /api/auth/register/{} - email: {}", path, request.email);

    let Some(user_type) = UserType::parse(&path) else {
        return ApiError::InvalidRequest(format!("Unknown account type: {}", path)).error_response();
    };

    match auth_service::register(store.get_ref(), &session, user_type, &request).await {
        Ok(outcome) => {
            log::info!("✅ Registration successful: {}", request.email);
            session
                .attach_token(&mut HttpResponse::Created(), &outcome.token)
                .json(AuthResponse {
                    success: true,
                    user: outcome.user,
                })
        }
        Err(e) => {
            log::warn!("❌ Registration failed: {} - {}", request.email, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses((status = 200, description = "Session cookie cleared", body = MessageResponse))
)]
pub async fn logout(session: web::Data<SessionManager>) -> HttpResponse {
    log::info!("👋 POST /api/auth/logout");

    session.clear_token(&mut HttpResponse::Ok()).json(MessageResponse {
        success: true,
        message: "Logged out".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Own profile", body = ProfileResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Account no longer exists")
    ),
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn get_me(
    store: web::Data<dyn ProfileStore>,
    claims: web::ReqData<Claims>,
) -> HttpResponse {
    log::info!("👤 GET /api/auth/me - user: {}", claims.user_id);

    match auth_service::get_current_user(store.get_ref(), &claims).await {
        Ok(profile) => HttpResponse::Ok().json(ProfileResponse {
            success: true,
            profile,
        }),
        Err(e) => {
            log::warn!("❌ Failed to get user {}: {}", claims.user_id, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/auth/account",
    tag = "Auth",
    responses(
        (status = 200, description = "Account deleted and session cleared", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Account not found")
    ),
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn delete_account(
    store: web::Data<dyn ProfileStore>,
    session: web::Data<SessionManager>,
    claims: web::ReqData<Claims>,
) -> HttpResponse {
    log::info!("🗑️ DELETE /api/auth/account - user: {}", claims.user_id);

    match auth_service::delete_user_account(store.get_ref(), &claims).await {
        Ok(()) => {
            log::info!("✅ Account deleted successfully: {}", claims.user_id);
            session.clear_token(&mut HttpResponse::Ok()).json(MessageResponse {
                success: true,
                message: "Account deleted successfully".to_string(),
            })
        }
        Err(e) => {
            log::error!("❌ Failed to delete account {}: {}", claims.user_id, e);
            e.error_response()
        }
    }
}
