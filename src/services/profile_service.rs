use crate::models::UserType;
use crate::services::auth_service::editable_fields;
use crate::services::profile_filter::{filter_profile, profile_to_json};
use crate::services::token_service::Claims;
use crate::store::ProfileStore;
use crate::utils::ApiError;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime};
use serde_json::{Map, Value};

fn parse_profile_id(raw: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(raw.trim())
        .map_err(|_| ApiError::InvalidRequest(format!("Invalid profile id: {}", raw)))
}

fn parse_user_type(raw: &str) -> Result<UserType, ApiError> {
    UserType::parse(raw)
        .ok_or_else(|| ApiError::InvalidRequest(format!("Unknown profile type: {}", raw)))
}

/// Fetches one profile, shaped for the caller's session state.
pub async fn get_profile(
    store: &dyn ProfileStore,
    raw_id: &str,
    type_hint: Option<&str>,
    viewer: Option<&Claims>,
) -> Result<Value, ApiError> {
    let id = parse_profile_id(raw_id)?;
    let candidates = match type_hint {
        Some(raw) => vec![parse_user_type(raw)?],
        None => UserType::ALL.to_vec(),
    };

    for user_type in candidates {
        if let Some(profile) = store.find_one(user_type, doc! { "_id": id }).await? {
            let shaped = filter_profile(&profile, Some(user_type), viewer.is_some());
            return Ok(profile_to_json(&shaped));
        }
    }

    Err(ApiError::NotFound("Profile not found".to_string()))
}

/// Feed of every profile of one type.
pub async fn list_profiles(
    store: &dyn ProfileStore,
    raw_type: &str,
    viewer: Option<&Claims>,
) -> Result<Vec<Value>, ApiError> {
    let user_type = parse_user_type(raw_type)?;
    let profiles = store.find_many(user_type, doc! {}).await?;

    Ok(profiles
        .iter()
        .map(|p| profile_to_json(&filter_profile(p, Some(user_type), viewer.is_some())))
        .collect())
}

/// Owner-only edit; reserved keys in `changes` are ignored.
pub async fn update_profile(
    store: &dyn ProfileStore,
    owner: &Claims,
    raw_id: &str,
    changes: &Map<String, Value>,
) -> Result<Value, ApiError> {
    let id = parse_profile_id(raw_id)?;
    let owner_id = ObjectId::parse_str(&owner.user_id).map_err(|_| ApiError::Unauthorized)?;
    if owner_id != id {
        return Err(ApiError::Forbidden(
            "You can only edit your own profile".to_string(),
        ));
    }

    let mut set = editable_fields(changes)?;
    if set.is_empty() {
        return Err(ApiError::InvalidRequest(
            "No editable fields supplied".to_string(),
        ));
    }
    set.insert("updatedAt", BsonDateTime::now());

    if !store.update_one(owner.user_type, id, set).await? {
        return Err(ApiError::NotFound("Profile not found".to_string()));
    }

    let updated = store
        .find_one(owner.user_type, doc! { "_id": id })
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;

    log::info!("✏️  Updated {} profile {}", owner.user_type, id);
    Ok(profile_to_json(&filter_profile(&updated, Some(owner.user_type), true)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    fn claims_for(id: ObjectId, user_type: UserType) -> Claims {
        Claims {
            user_id: id.to_hex(),
            user_type,
            email: "owner@x.com".to_string(),
            iat: 0,
            exp: i64::MAX,
        }
    }

    fn store_with_club() -> (MemoryStore, ObjectId) {
        let store = MemoryStore::new();
        let id = store.seed(
            UserType::Club,
            doc! {
                "email": "club@x.com",
                "password": "hash",
                "clubName": "Robotics",
                "presidentPhone": "555-0101",
            },
        );
        (store, id)
    }

    #[tokio::test]
    async fn test_anonymous_fetch_returns_public_projection() {
        let (store, id) = store_with_club();

        let profile = get_profile(&store, &id.to_hex(), None, None).await.unwrap();

        assert_eq!(profile["clubName"], "Robotics");
        assert_eq!(profile["isAuthenticated"], false);
        assert!(profile.get("presidentPhone").is_none());
        assert!(profile.get("email").is_none());
    }

    #[tokio::test]
    async fn test_authenticated_fetch_returns_full_document() {
        let (store, id) = store_with_club();
        let viewer = claims_for(ObjectId::new(), UserType::Student);

        let profile = get_profile(&store, &id.to_hex(), Some("club"), Some(&viewer))
            .await
            .unwrap();

        assert_eq!(profile["presidentPhone"], "555-0101");
        assert_eq!(profile["isAuthenticated"], true);
        assert!(profile.get("password").is_none());
    }

    #[tokio::test]
    async fn test_bad_id_and_missing_profile() {
        let (store, _) = store_with_club();

        assert!(matches!(
            get_profile(&store, "not-an-id", None, None).await,
            Err(ApiError::InvalidRequest(_))
        ));
        assert!(matches!(
            get_profile(&store, &ObjectId::new().to_hex(), None, None).await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            get_profile(&store, &ObjectId::new().to_hex(), Some("faculty"), None).await,
            Err(ApiError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_list_distinguishes_empty_from_unavailable() {
        let store = MemoryStore::new();
        assert!(list_profiles(&store, "startups", None).await.unwrap().is_empty());

        store.set_unavailable(true);
        assert!(matches!(
            list_profiles(&store, "startups", None).await,
            Err(ApiError::Unavailable)
        ));
    }

    #[tokio::test]
    async fn test_update_only_by_owner() {
        let (store, id) = store_with_club();
        let mut changes = Map::new();
        changes.insert("description".to_string(), Value::from("We build robots"));
        changes.insert("email".to_string(), Value::from("hijack@x.com"));

        let stranger = claims_for(ObjectId::new(), UserType::Club);
        assert!(matches!(
            update_profile(&store, &stranger, &id.to_hex(), &changes).await,
            Err(ApiError::Forbidden(_))
        ));

        let owner = claims_for(id, UserType::Club);
        let updated = update_profile(&store, &owner, &id.to_hex(), &changes)
            .await
            .unwrap();
        assert_eq!(updated["description"], "We build robots");
        assert_eq!(updated["email"], "club@x.com");
        assert!(updated.get("updatedAt").is_some());
    }
}
