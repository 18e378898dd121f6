use crate::models::{
    is_reserved_field, normalize_email, LoginRequest, RegisterRequest, UserType,
    MIN_PASSWORD_LENGTH,
};
use crate::services::profile_filter::{filter_profile, profile_to_json};
use crate::services::session_service::SessionManager;
use crate::services::token_service::Claims;
use crate::store::ProfileStore;
use crate::utils::ApiError;
use bcrypt::{hash, verify, DEFAULT_COST};
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use serde_json::{Map, Value};

/// Result of a successful login or registration: the token to attach and the caller's own view.
#[derive(Debug)]
pub struct AuthOutcome {
    pub token: String,
    pub user: Value,
}

/// Searches the requested collection, or every collection, for a matching email.
async fn find_by_email(
    store: &dyn ProfileStore,
    email: &str,
    only: Option<UserType>,
) -> Result<Option<(UserType, Document)>, ApiError> {
    let candidates: Vec<UserType> = match only {
        Some(user_type) => vec![user_type],
        None => UserType::ALL.to_vec(),
    };

    for user_type in candidates {
        if let Some(doc) = store.find_one(user_type, doc! { "email": email }).await? {
            return Ok(Some((user_type, doc)));
        }
    }
    Ok(None)
}

fn object_id_of(doc: &Document) -> Result<ObjectId, ApiError> {
    doc.get_object_id("_id")
        .map_err(|_| ApiError::Internal("stored profile has no ObjectId".to_string()))
}

// bcrypt is CPU-bound at DEFAULT_COST; run it on the blocking pool
async fn hash_password(password: &str) -> Result<String, ApiError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hash(password, DEFAULT_COST))
        .await
        .map_err(|e| ApiError::Internal(format!("Password hashing task failed: {}", e)))?
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {}", e)))
}

/// Unreadable stored hashes count as a mismatch.
async fn verify_password(password: &str, stored_hash: &str) -> Result<bool, ApiError> {
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();
    let result = tokio::task::spawn_blocking(move || verify(password, &stored_hash))
        .await
        .map_err(|e| ApiError::Internal(format!("Password check task failed: {}", e)))?;

    Ok(result.unwrap_or_else(|e| {
        log::warn!("⚠️  Unreadable password hash: {}", e);
        false
    }))
}

/// Client-supplied attributes converted to BSON, with reserved keys dropped.
pub fn editable_fields(input: &Map<String, Value>) -> Result<Document, ApiError> {
    let mut out = Document::new();
    for (key, value) in input {
        if is_reserved_field(key) {
            log::debug!("Ignoring reserved field '{}'", key);
            continue;
        }
        let bson = mongodb::bson::to_bson(value)
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid value for '{}': {}", key, e)))?;
        out.insert(key.clone(), bson);
    }
    Ok(out)
}

// User login
pub async fn login(
    store: &dyn ProfileStore,
    session: &SessionManager,
    request: &LoginRequest,
) -> Result<AuthOutcome, ApiError> {
    let email = normalize_email(&request.email);
    if email.is_empty() || request.password.is_empty() {
        return Err(ApiError::InvalidRequest(
            "Email and password are required".to_string(),
        ));
    }

    let (user_type, user) = find_by_email(store, &email, request.user_type)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    let stored_password = user
        .get_str("password")
        .map_err(|_| ApiError::InvalidCredentials)?;

    if !verify_password(&request.password, stored_password).await? {
        return Err(ApiError::InvalidCredentials);
    }

    let id = object_id_of(&user)?;
    let token = session.issue_token(&id.to_hex(), user_type, &email)?;

    Ok(AuthOutcome {
        token,
        user: profile_to_json(&filter_profile(&user, Some(user_type), true)),
    })
}

// User registration
pub async fn register(
    store: &dyn ProfileStore,
    session: &SessionManager,
    user_type: UserType,
    request: &RegisterRequest,
) -> Result<AuthOutcome, ApiError> {
    let email = normalize_email(&request.email);
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::InvalidRequest("A valid email is required".to_string()));
    }
    if request.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::InvalidRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    let name_field = user_type.display_name_field();
    let has_name = request
        .profile
        .get(name_field)
        .and_then(Value::as_str)
        .is_some_and(|name| !name.trim().is_empty());
    if !has_name {
        return Err(ApiError::InvalidRequest(format!(
            "'{}' is required for {} accounts",
            name_field, user_type
        )));
    }

    // Emails are unique across all account types, since login searches every collection
    if find_by_email(store, &email, None).await?.is_some() {
        return Err(ApiError::InvalidRequest(
            "An account with this email already exists".to_string(),
        ));
    }

    let hashed_password = hash_password(&request.password).await?;

    let mut profile = editable_fields(&request.profile)?;
    profile.insert("email", email.clone());
    profile.insert("password", hashed_password);
    profile.insert("userType", user_type.as_str());
    profile.insert("createdAt", BsonDateTime::now());
    profile.insert("updatedAt", BsonDateTime::now());

    let id = store.insert_one(user_type, profile.clone()).await?;
    profile.insert("_id", id);

    let token = session.issue_token(&id.to_hex(), user_type, &email)?;

    log::info!("✅ Registered {} account: {}", user_type, email);

    Ok(AuthOutcome {
        token,
        user: profile_to_json(&filter_profile(&profile, Some(user_type), true)),
    })
}

// Get current user
pub async fn get_current_user(store: &dyn ProfileStore, claims: &Claims) -> Result<Value, ApiError> {
    let id = ObjectId::parse_str(&claims.user_id).map_err(|_| ApiError::Unauthorized)?;

    let user = store
        .find_one(claims.user_type, doc! { "_id": id })
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(profile_to_json(&filter_profile(&user, Some(claims.user_type), true)))
}

/// 🗑️ Delete the caller's account document
pub async fn delete_user_account(store: &dyn ProfileStore, claims: &Claims) -> Result<(), ApiError> {
    let id = ObjectId::parse_str(&claims.user_id).map_err(|_| ApiError::Unauthorized)?;

    log::info!("🗑️ Deleting {} account {}", claims.user_type, id);

    if !store.delete_one(claims.user_type, id).await? {
        log::warn!("⚠️ Account {} not found in {}", id, claims.user_type.collection_name());
        return Err(ApiError::NotFound("User not found".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeploymentMode;
    use crate::services::token_service::TokenService;
    use crate::store::memory::MemoryStore;

    fn session() -> SessionManager {
        SessionManager::new(
            TokenService::new("auth-secret").unwrap(),
            DeploymentMode::Development,
        )
    }

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store.seed(
            UserType::Student,
            doc! {
                "email": "a@x.com",
                "password": hash("correct", 4).unwrap(),
                "name": "Ada",
                "userType": "student",
            },
        );
        store
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
            user_type: None,
        }
    }

    #[tokio::test]
    async fn test_login_returns_token_and_user_without_password() {
        let store = seeded();
        let session = session();

        let outcome = login(&store, &session, &login_request("A@x.com ", "correct"))
            .await
            .unwrap();

        assert!(outcome.user.get("password").is_none());
        assert_eq!(outcome.user["email"], "a@x.com");
        assert_eq!(outcome.user["isAuthenticated"], true);

        let claims = session.verify_token(&outcome.token).unwrap();
        assert_eq!(claims.user_type, UserType::Student);
        assert_eq!(claims.user_id, outcome.user["_id"].as_str().unwrap());
    }

    #[tokio::test]
    async fn test_login_rejects_wrong_password_and_unknown_email() {
        let store = seeded();
        let session = session();

        assert!(matches!(
            login(&store, &session, &login_request("a@x.com", "wrong")).await,
            Err(ApiError::InvalidCredentials)
        ));
        assert!(matches!(
            login(&store, &session, &login_request("b@x.com", "correct")).await,
            Err(ApiError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_password_checks_run_on_blocking_pool() {
        let stored = hash("correct", 4).unwrap();

        assert!(verify_password("correct", &stored).await.unwrap());
        assert!(!verify_password("wrong", &stored).await.unwrap());
        assert!(!verify_password("correct", "not-a-bcrypt-hash").await.unwrap());
    }

    #[tokio::test]
    async fn test_login_with_corrupt_stored_hash_is_rejected() {
        let store = MemoryStore::new();
        store.seed(
            UserType::Club,
            doc! { "email": "c@x.com", "password": "plain-text", "clubName": "Chess" },
        );

        assert!(matches!(
            login(&store, &session(), &login_request("c@x.com", "plain-text")).await,
            Err(ApiError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_login_scoped_to_other_type_misses() {
        let store = seeded();
        let mut request = login_request("a@x.com", "correct");
        request.user_type = Some(UserType::Club);

        assert!(matches!(
            login(&store, &session(), &request).await,
            Err(ApiError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_register_rejects_email_taken_by_other_type() {
        let store = seeded();
        let mut profile = Map::new();
        profile.insert("clubName".to_string(), Value::from("Chess"));
        let request = RegisterRequest {
            email: "a@x.com".to_string(),
            password: "longenough".to_string(),
            profile,
        };

        assert!(matches!(
            register(&store, &session(), UserType::Club, &request).await,
            Err(ApiError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_register_requires_display_name() {
        let request = RegisterRequest {
            email: "new@x.com".to_string(),
            password: "longenough".to_string(),
            profile: Map::new(),
        };

        assert!(matches!(
            register(&MemoryStore::new(), &session(), UserType::Startup, &request).await,
            Err(ApiError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_unavailable_store_is_reported_not_empty() {
        let store = seeded();
        store.set_unavailable(true);

        assert!(matches!(
            login(&store, &session(), &login_request("a@x.com", "correct")).await,
            Err(ApiError::Unavailable)
        ));
    }

    #[test]
    fn test_editable_fields_drop_reserved_keys() {
        let input: Map<String, Value> = serde_json::from_str(
            r#"{"bio":"hi","password":"x","_id":"y","userType":"club","resetToken":"z"}"#,
        )
        .unwrap();

        let out = editable_fields(&input).unwrap();
        assert_eq!(out.keys().collect::<Vec<_>>(), vec!["bio"]);
    }
}
