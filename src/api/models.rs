use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::session::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
}

impl UserStatus {
    pub fn toggled(self) -> Self {
        match self {
            UserStatus::Active => UserStatus::Inactive,
            UserStatus::Inactive => UserStatus::Active,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UserStatus::Active => "ACTIVE",
            UserStatus::Inactive => "INACTIVE",
        }
    }

    /// What toggling this status does, for buttons and prompts
    pub fn action_label(&self) -> &'static str {
        match self {
            UserStatus::Active => "Deactivate",
            UserStatus::Inactive => "Activate",
        }
    }
}

/// Server-side account record visible to admins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagedUser {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
    #[serde(default)]
    pub last_login: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

/// Returned by both login and signup
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: ManagedUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserPage {
    pub users: Vec<ManagedUser>,
    #[serde(default)]
    pub total: u64,
    pub pages: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate {
    pub status: UserStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileUpdate {
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub user: ManagedUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_is_two_valued() {
        assert_eq!(UserStatus::Active.toggled(), UserStatus::Inactive);
        assert_eq!(UserStatus::Inactive.toggled(), UserStatus::Active);
        assert_eq!(UserStatus::Active.toggled().toggled(), UserStatus::Active);
    }

    #[test]
    fn test_parse_user_page() {
        let body = r#"{
            "users": [
                {"id": 1, "full_name": "Ada", "email": "ada@example.com", "role": "admin",
                 "status": "active", "last_login": "2024-03-01T09:15:00.123456"},
                {"id": 2, "full_name": "Bob", "email": "bob@example.com", "role": "user",
                 "status": "inactive", "last_login": null}
            ],
            "total": 2,
            "pages": 1
        }"#;

        let page: UserPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.users.len(), 2);
        assert_eq!(page.pages, 1);
        assert_eq!(page.users[0].role, Role::Admin);
        assert!(page.users[0].last_login.is_some());
        assert_eq!(page.users[1].status, UserStatus::Inactive);
        assert!(page.users[1].last_login.is_none());
    }

    #[test]
    fn test_profile_update_omits_empty_password() {
        let update = ProfileUpdate {
            full_name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: None,
        };
        let json = serde_json::to_value(&update).unwrap();
        assert!(json.get("password").is_none());
    }

    #[test]
    fn test_status_update_wire_format() {
        let json = serde_json::to_string(&StatusUpdate { status: UserStatus::Inactive }).unwrap();
        assert_eq!(json, r#"{"status":"inactive"}"#);
    }
}
