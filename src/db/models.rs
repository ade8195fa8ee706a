use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl User {
    pub fn new(email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            created_at: now,
            updated_at: now,
            last_login: None,
            is_active: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl UserSession {
    pub fn new(user_id: Uuid, token: String, expires_in_hours: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            token,
            expires_at: now + chrono::Duration::hours(expires_in_hours),
            created_at: now,
            last_activity: now,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// Flat developer row. Avatar and languages are joined separately
/// into a `DeveloperProfile` before serialization.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Developer {
    pub id: i64,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub cohort: Option<i32>,
    pub avatar_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Developer {
    /// Partial update: each field overwrites only when present in the payload.
    pub fn apply_update(&mut self, updates: &DeveloperUpdate) {
        if let Some(name) = &updates.name {
            self.name = name.clone();
        }
        if let Some(email) = &updates.email {
            self.email = email.clone();
        }
        if let Some(cohort) = updates.cohort {
            self.cohort = Some(cohort);
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeveloperUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub cohort: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDeveloper {
    pub name: String,
    pub email: String,
    pub cohort: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Avatar {
    pub id: i64,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Language {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "relationship_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RelationshipStatus {
    Pending,
    Accepted,
    Blocked,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Relationship {
    pub id: i64,
    pub originator_id: i64,
    pub recipient_id: i64,
    pub status: RelationshipStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Geekout {
    pub id: i64,
    pub developer_id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Developer with its avatar and language tags resolved.
#[derive(Debug, Clone, Serialize)]
pub struct DeveloperProfile {
    pub id: i64,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub cohort: Option<i32>,
    pub avatar: Option<Avatar>,
    pub languages: Vec<Language>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DeveloperProfile {
    pub fn assemble(developer: Developer, avatar: Option<Avatar>, languages: Vec<Language>) -> Self {
        Self {
            id: developer.id,
            user_id: developer.user_id,
            name: developer.name,
            email: developer.email,
            cohort: developer.cohort,
            avatar,
            languages,
            created_at: developer.created_at,
            updated_at: developer.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn developer() -> Developer {
        let now = Utc::now();
        Developer {
            id: 1,
            user_id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            cohort: Some(7),
            avatar_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_apply_update_overwrites_only_present_fields() {
        let mut dev = developer();
        dev.apply_update(&DeveloperUpdate {
            name: Some("Grace".to_string()),
            email: None,
            cohort: None,
        });

        assert_eq!(dev.name, "Grace");
        assert_eq!(dev.email, "ada@example.com");
        assert_eq!(dev.cohort, Some(7));
    }

    #[test]
    fn test_apply_update_all_fields() {
        let mut dev = developer();
        dev.apply_update(&DeveloperUpdate {
            name: Some("Grace".to_string()),
            email: Some("grace@example.com".to_string()),
            cohort: Some(9),
        });

        assert_eq!(dev.name, "Grace");
        assert_eq!(dev.email, "grace@example.com");
        assert_eq!(dev.cohort, Some(9));
    }

    #[test]
    fn test_apply_update_empty_payload_is_noop() {
        let mut dev = developer();
        let before = dev.clone();
        dev.apply_update(&DeveloperUpdate::default());

        assert_eq!(dev.name, before.name);
        assert_eq!(dev.email, before.email);
        assert_eq!(dev.cohort, before.cohort);
    }

    #[test]
    fn test_session_expiry() {
        let session = UserSession::new(Uuid::new_v4(), "token".to_string(), 1);
        assert!(!session.is_expired());

        let mut expired = UserSession::new(Uuid::new_v4(), "token".to_string(), 1);
        expired.expires_at = Utc::now() - chrono::Duration::hours(1);
        assert!(expired.is_expired());
    }

    #[test]
    fn test_user_serialization_hides_password_hash() {
        let user = User::new("ada@example.com".to_string(), "hash".to_string());
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "ada@example.com");
    }
}
