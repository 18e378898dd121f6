use crate::config::DeploymentMode;
use crate::models::UserType;
use crate::services::token_service::{Claims, TokenError, TokenService};
use actix_web::cookie::{time, Cookie};
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponseBuilder};

pub const SESSION_COOKIE_NAME: &str = "token";

/// Ties token issuance to the cookie/header transport used by the browser client.
#[derive(Clone)]
pub struct SessionManager {
    tokens: TokenService,
    mode: DeploymentMode,
}

impl SessionManager {
    pub fn new(tokens: TokenService, mode: DeploymentMode) -> Self {
        Self { tokens, mode }
    }

    pub fn issue_token(
        &self,
        user_id: &str,
        user_type: UserType,
        email: &str,
    ) -> Result<String, TokenError> {
        self.tokens.issue_token(user_id, user_type, email)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.tokens.verify_token(token)
    }

    /// Cookie first, then `Authorization: Bearer`. Absence is not an error.
    pub fn extract_token_from_request(&self, req: &HttpRequest) -> Option<String> {
        if let Some(cookie) = req.cookie(SESSION_COOKIE_NAME) {
            let value = cookie.value().trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }

        let auth_value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
        let token = auth_value.strip_prefix("Bearer ")?.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }

    /// Resolves the caller's identity; bad or missing tokens mean anonymous.
    pub fn identify(&self, req: &HttpRequest) -> Option<Claims> {
        let token = self.extract_token_from_request(req)?;
        match self.verify_token(&token) {
            Ok(claims) => Some(claims),
            Err(e) => {
                log::debug!("🔓 Ignoring session token: {}", e);
                None
            }
        }
    }

    pub fn session_cookie(&self, token: &str) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE_NAME, token.to_string())
            .http_only(true)
            .secure(self.mode.cookie_secure())
            .same_site(self.mode.cookie_same_site())
            .path("/")
            .max_age(time::Duration::seconds(self.tokens.ttl().num_seconds()))
            .finish()
    }

    pub fn attach_token<'a>(
        &self,
        response: &'a mut HttpResponseBuilder,
        token: &str,
    ) -> &'a mut HttpResponseBuilder {
        response.cookie(self.session_cookie(token))
    }

    pub fn clear_token<'a>(
        &self,
        response: &'a mut HttpResponseBuilder,
    ) -> &'a mut HttpResponseBuilder {
        let mut cookie = self.session_cookie("");
        cookie.make_removal();
        response.cookie(cookie)
    }
}
