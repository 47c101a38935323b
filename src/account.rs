//! Merchant account records and their lifecycle flags.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role attached to an account and carried in session claims.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Administrator,
    Merchant,
}

/// Approval axis of the account lifecycle. One-way: `Pending` to `Approved`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Approved,
}

/// Merchant profile fields captured at signup and editable afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub merchant_name: String,
    pub person_in_charge: String,
    pub phone_number: String,
    pub website: String,
    pub address: String,
    pub terms_and_conditions: bool,
}

/// A registered merchant or administrator identity.
///
/// The password hash and any outstanding verification token never serialize
/// outward; response layers can render the record as-is.
#[derive(Clone, Debug, Serialize)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub status: Status,
    pub email_verified: bool,
    #[serde(skip_serializing)]
    pub verification_token: Option<String>,
    #[serde(flatten)]
    pub profile: Profile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Administrator
    }
}

/// Basic email format check. Comparison elsewhere is case-sensitive, exactly
/// as stored; no normalization happens here.
pub(crate) fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        let now = Utc::now();
        Account {
            id: Uuid::new_v4(),
            email: "shop@example.com".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            role: Role::Merchant,
            status: Status::Pending,
            email_verified: false,
            verification_token: Some("token".to_string()),
            profile: Profile {
                merchant_name: "Shop".to_string(),
                ..Profile::default()
            },
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn valid_email_accepts_basic_format() {
        assert!(valid_email("a@example.com"));
        assert!(valid_email("name.surname@example.co"));
    }

    #[test]
    fn valid_email_rejects_missing_parts() {
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("missing-at.example.com"));
        assert!(!valid_email("missing-domain@"));
        assert!(!valid_email(""));
    }

    #[test]
    fn secrets_never_serialize() {
        let value = serde_json::to_value(account()).unwrap();
        assert!(value.get("password_hash").is_none());
        assert!(value.get("verification_token").is_none());
        assert_eq!(
            value.get("email").and_then(|v| v.as_str()),
            Some("shop@example.com")
        );
        assert_eq!(
            value.get("merchant_name").and_then(|v| v.as_str()),
            Some("Shop")
        );
    }

    #[test]
    fn roles_and_statuses_serialize_lowercase() {
        assert_eq!(
            serde_json::to_value(Role::Administrator).unwrap(),
            "administrator"
        );
        assert_eq!(serde_json::to_value(Role::Merchant).unwrap(), "merchant");
        assert_eq!(serde_json::to_value(Status::Pending).unwrap(), "pending");
        assert_eq!(serde_json::to_value(Status::Approved).unwrap(), "approved");
    }
}
