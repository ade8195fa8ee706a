use serde::Serialize;

use crate::db::models::{Avatar, DeveloperProfile, Language};

/// Full profile, shown to the developer's friends.
#[derive(Debug, Serialize)]
pub struct FriendDeveloper {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub cohort: Option<i32>,
    pub avatar: Option<Avatar>,
    pub languages: Vec<Language>,
}

impl FriendDeveloper {
    pub fn build(profile: DeveloperProfile) -> Self {
        Self {
            id: profile.id,
            name: profile.name,
            email: profile.email,
            cohort: profile.cohort,
            avatar: profile.avatar,
            languages: profile.languages,
        }
    }
}

/// Reduced profile, shown to everyone else. No email, no cohort.
#[derive(Debug, Serialize)]
pub struct PublicDeveloper {
    pub id: i64,
    pub name: String,
    pub avatar: Option<Avatar>,
    pub languages: Vec<Language>,
}

impl PublicDeveloper {
    pub fn build(profile: DeveloperProfile) -> Self {
        Self {
            id: profile.id,
            name: profile.name,
            avatar: profile.avatar,
            languages: profile.languages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn profile() -> DeveloperProfile {
        let now = Utc::now();
        DeveloperProfile {
            id: 42,
            user_id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            cohort: Some(3),
            avatar: Some(Avatar {
                id: 1,
                url: "https://cdn.example.com/ada.png".to_string(),
            }),
            languages: vec![Language {
                id: 1,
                name: "Rust".to_string(),
            }],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_friend_view_exposes_full_profile() {
        let view = FriendDeveloper::build(profile());
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["id"], 42);
        assert_eq!(json["email"], "ada@example.com");
        assert_eq!(json["cohort"], 3);
        assert_eq!(json["avatar"]["url"], "https://cdn.example.com/ada.png");
        assert_eq!(json["languages"][0]["name"], "Rust");
    }

    #[test]
    fn test_public_view_hides_email_and_cohort() {
        let view = PublicDeveloper::build(profile());
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["id"], 42);
        assert_eq!(json["name"], "Ada");
        assert!(json.get("email").is_none());
        assert!(json.get("cohort").is_none());
        assert_eq!(json["languages"][0]["name"], "Rust");
    }
}
