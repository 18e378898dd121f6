use serde::{Deserialize, Serialize};
use std::fmt;

/// The three kinds of accounts on the platform. Each lives in its own collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Student,
    Startup,
    Club,
}

impl UserType {
    pub const ALL: [UserType; 3] = [UserType::Student, UserType::Startup, UserType::Club];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "student" | "students" => Some(UserType::Student),
            "startup" | "startups" => Some(UserType::Startup),
            "club" | "clubs" => Some(UserType::Club),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UserType::Student => "student",
            UserType::Startup => "startup",
            UserType::Club => "club",
        }
    }

    pub fn collection_name(self) -> &'static str {
        match self {
            UserType::Student => "students",
            UserType::Startup => "startups",
            UserType::Club => "clubs",
        }
    }

    /// Field holding the name shown on cards and profile headers.
    pub fn display_name_field(self) -> &'static str {
        match self {
            UserType::Student => "name",
            UserType::Startup => "startupName",
            UserType::Club => "clubName",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_singular_and_collection_names() {
        assert_eq!(UserType::parse("Student"), Some(UserType::Student));
        assert_eq!(UserType::parse("startups"), Some(UserType::Startup));
        assert_eq!(UserType::parse(" club "), Some(UserType::Club));
        assert_eq!(UserType::parse("admin"), None);
    }

    #[test]
    fn test_serde_uses_lowercase_tags() {
        let json = serde_json::to_string(&UserType::Startup).unwrap();
        assert_eq!(json, "\"startup\"");
        assert!(serde_json::from_str::<UserType>("\"faculty\"").is_err());
    }
}
