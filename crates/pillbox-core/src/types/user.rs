//! The signed-in user's profile.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Profile of the signed-in user, as returned by login, registration and `/auth/me`.
///
/// Fields the client does not know about are kept in `extra` so the record
/// can be stored and re-read without loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub user_type: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// Returns "first last", falling back to the email when both are empty.
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keeps_unknown_fields() {
        let user: UserProfile = serde_json::from_value(json!({
            "id": "u-1",
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "ada@example.com",
            "user_type": "patient",
            "is_verified": true
        }))
        .unwrap();

        assert_eq!(user.display_name(), "Ada Lovelace");
        assert_eq!(user.extra.get("is_verified"), Some(&json!(true)));

        let back = serde_json::to_value(&user).unwrap();
        assert_eq!(back["is_verified"], json!(true));
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let user: UserProfile =
            serde_json::from_value(json!({"id": "u-2", "email": "bob@example.com"})).unwrap();
        assert_eq!(user.display_name(), "bob@example.com");
    }
}
