//! Session-related types.
//!
//! The logged-in user record and the storage keys the storefront persists.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use pos_storefront_core::UserId;

/// The logged-in user, as returned by the login endpoint.
///
/// Only the fields the storefront reads are typed. Everything else the server
/// sends is kept in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSession {
    /// User's document id; used as the sale's customer.
    #[serde(rename = "_id")]
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserSession {
    /// Create a session record with no extra server fields.
    #[must_use]
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: None,
            phone: None,
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Storage keys for persisted storefront state.
pub mod keys {
    /// Key for the serialized cart.
    pub const CART: &str = "cart";

    /// Key for the logged-in user record.
    pub const USER: &str = "userData";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let raw = json!({
            "_id": "U1",
            "name": "Ayesha",
            "email": "ayesha@example.com",
            "role": "customer",
            "address": {"city": "Lahore"}
        });

        let user: UserSession = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(user.id.as_str(), "U1");
        assert_eq!(user.extra.get("role"), Some(&json!("customer")));

        assert_eq!(serde_json::to_value(&user).unwrap(), raw);
    }

    #[test]
    fn test_builder() {
        let user = UserSession::new(UserId::new("U2"), "Bilal").with_email("b@example.com");
        assert_eq!(user.email.as_deref(), Some("b@example.com"));
        assert!(user.phone.is_none());
    }
}
