//! Classification enums shared by the store, cache and API

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Role of a learner account
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    /// Parse from string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Entity kinds that have an analytics series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Users,
    Courses,
    Orders,
}

impl EntityKind {
    pub fn all() -> &'static [EntityKind] {
        &[Self::Users, Self::Courses, Self::Orders]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Courses => "courses",
            Self::Orders => "orders",
        }
    }

    /// Backing table; every table has a `created_at` column
    pub fn table(&self) -> &'static str {
        // Table names match the plural kind names
        self.as_str()
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_parse() {
        assert_eq!(UserRole::parse("user"), Some(UserRole::User));
        assert_eq!(UserRole::parse("ADMIN"), Some(UserRole::Admin));
        assert_eq!(UserRole::parse("owner"), None);
        assert_eq!(UserRole::parse(""), None);
    }

    #[test]
    fn test_user_role_default_and_display() {
        assert_eq!(UserRole::default(), UserRole::User);
        assert_eq!(UserRole::Admin.to_string(), "admin");
        assert_eq!(
            serde_json::to_string(&UserRole::Admin).unwrap(),
            "\"admin\""
        );
    }

    #[test]
    fn test_entity_kind_names() {
        let names: Vec<&str> = EntityKind::all().iter().map(EntityKind::as_str).collect();
        assert_eq!(names, ["users", "courses", "orders"]);
        assert_eq!(EntityKind::Orders.table(), "orders");
        assert_eq!(EntityKind::Courses.to_string(), "courses");
    }
}
