use actix_web::cookie::SameSite;
use std::env;

/// Deployment flavour, resolved once from `NODE_ENV` at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentMode {
    Development,
    Production,
}

impl DeploymentMode {
    pub fn from_node_env(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("production") => DeploymentMode::Production,
            _ => DeploymentMode::Development,
        }
    }

    pub fn is_production(self) -> bool {
        self == DeploymentMode::Production
    }

    /// Cross-site requests only carry the cookie in production.
    pub fn cookie_secure(self) -> bool {
        self.is_production()
    }

    pub fn cookie_same_site(self) -> SameSite {
        match self {
            DeploymentMode::Production => SameSite::None,
            DeploymentMode::Development => SameSite::Lax,
        }
    }

    /// Local clusters often run with self-signed certificates.
    pub fn allow_invalid_certificates(self) -> bool {
        !self.is_production()
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET (or SESSION_SECRET) must be set")]
    MissingSecret,
    #[error("MONGODB_URI must be set")]
    MissingDatabaseUri,
    #[error("invalid PORT value: {0}")]
    InvalidPort(String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub mode: DeploymentMode,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = non_empty("JWT_SECRET")
            .or_else(|| non_empty("SESSION_SECRET"))
            .ok_or(ConfigError::MissingSecret)?;
        let mongodb_uri = non_empty("MONGODB_URI").ok_or(ConfigError::MissingDatabaseUri)?;
        let mongodb_db = non_empty("MONGODB_DB").unwrap_or_else(|| "users".to_string());
        let mode = DeploymentMode::from_node_env(lookup("NODE_ENV").as_deref());
        let host = non_empty("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match non_empty("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            None => 3001,
        };
        let frontend_url =
            non_empty("FRONTEND_URL").unwrap_or_else(|| "http://localhost:3000".to_string());

        Ok(Self {
            jwt_secret,
            mongodb_uri,
            mongodb_db,
            mode,
            host,
            port,
            frontend_url,
        })
    }
}
