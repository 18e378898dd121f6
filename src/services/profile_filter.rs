//! Shapes stored profile documents according to who is asking.
//!
//! Credential fields never leave the server. Anonymous callers get a fixed,
//! per-type projection; authenticated callers get everything else.

use crate::models::UserType;
use mongodb::bson::{Bson, Document};
use serde_json::{Map, Value};

pub const CREDENTIAL_FIELDS: &[&str] = &["password", "token", "resetToken", "resetTokenExpiry"];

pub const AUTH_FLAG: &str = "isAuthenticated";

const STUDENT_PUBLIC_FIELDS: &[&str] = &[
    "_id",
    "userType",
    "name",
    "university",
    "major",
    "graduationYear",
    "bio",
    "profileImageUrl",
];

const STARTUP_PUBLIC_FIELDS: &[&str] = &[
    "_id",
    "userType",
    "startupName",
    "industry",
    "stage",
    "description",
    "website",
    "profileImageUrl",
];

const CLUB_PUBLIC_FIELDS: &[&str] = &[
    "_id",
    "userType",
    "clubName",
    "university",
    "category",
    "focusAreas",
    "description",
    "profileImageUrl",
];

pub fn public_fields(user_type: UserType) -> &'static [&'static str] {
    match user_type {
        UserType::Student => STUDENT_PUBLIC_FIELDS,
        UserType::Startup => STARTUP_PUBLIC_FIELDS,
        UserType::Club => CLUB_PUBLIC_FIELDS,
    }
}

/// `user_type = None` means the type could not be resolved; nothing but the flag is returned.
pub fn filter_profile(
    doc: &Document,
    user_type: Option<UserType>,
    is_authenticated: bool,
) -> Document {
    let Some(user_type) = user_type else {
        let mut closed = Document::new();
        closed.insert(AUTH_FLAG, false);
        return closed;
    };

    let mut filtered = if is_authenticated {
        let mut full = doc.clone();
        for field in CREDENTIAL_FIELDS {
            full.remove(*field);
        }
        full
    } else {
        // missing allow-listed fields become null so the key set is fixed per type
        public_fields(user_type)
            .iter()
            .map(|field| {
                let value = doc.get(*field).cloned().unwrap_or(Bson::Null);
                (field.to_string(), value)
            })
            .collect()
    };

    filtered.insert(AUTH_FLAG, is_authenticated);
    filtered
}

/// JSON for HTTP responses: ObjectIds as hex strings, datetimes as RFC 3339.
pub fn profile_to_json(doc: &Document) -> Value {
    let map: Map<String, Value> = doc
        .iter()
        .map(|(key, value)| (key.clone(), bson_to_json(value)))
        .collect();
    Value::Object(map)
}

fn bson_to_json(value: &Bson) -> Value {
    match value {
        Bson::ObjectId(id) => Value::String(id.to_hex()),
        Bson::DateTime(dt) => dt
            .try_to_rfc3339_string()
            .map(Value::String)
            .unwrap_or_else(|_| Value::from(dt.timestamp_millis())),
        Bson::Document(inner) => profile_to_json(inner),
        Bson::Array(items) => Value::Array(items.iter().map(bson_to_json).collect()),
        other => other.clone().into_relaxed_extjson(),
    }
}
