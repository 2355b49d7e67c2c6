//! Customer account.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orchard_core::{Meta, UserRole, UserStatus};

use crate::store::Entity;

/// A customer account.
///
/// The email is stored lower-cased; the create path normalizes it through
/// [`Email::parse`](orchard_core::Email::parse) and enforces uniqueness with
/// a case-folded scan. Save defaults (roles, status, verification flags) are
/// applied by [`apply_defaults`](Self::apply_defaults) on every persist.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(flatten)]
    pub meta: Meta,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub roles: BTreeSet<UserRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_shipping_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_billing_address: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub preferences: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Fill the defaults every saved user carries: at least the CUSTOMER
    /// role, an ACTIVE status, and explicit (false) verification flags.
    pub fn apply_defaults(&mut self) {
        if self.roles.is_empty() {
            self.roles.insert(UserRole::Customer);
        }
        if self.status.is_none() {
            self.status = Some(UserStatus::Active);
        }
        if self.email_verified.is_none() {
            self.email_verified = Some(false);
        }
        if self.phone_verified.is_none() {
            self.phone_verified = Some(false);
        }
    }

    /// Display name, skipping missing parts.
    #[must_use]
    pub fn full_name(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or("");
        let last = self.last_name.as_deref().unwrap_or("");
        format!("{first} {last}").trim().to_owned()
    }
}

impl Entity for User {
    const TABLE: &'static str = "users";
    const KIND: &'static str = "USER";

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_empty_fields() {
        let mut user = User::default();
        user.apply_defaults();

        assert!(user.roles.contains(&UserRole::Customer));
        assert_eq!(user.status, Some(UserStatus::Active));
        assert_eq!(user.email_verified, Some(false));
        assert_eq!(user.phone_verified, Some(false));
    }

    #[test]
    fn test_defaults_keep_existing_values() {
        let mut user = User {
            status: Some(UserStatus::Suspended),
            email_verified: Some(true),
            ..User::default()
        };
        user.roles.insert(UserRole::Admin);
        user.apply_defaults();

        assert_eq!(user.status, Some(UserStatus::Suspended));
        assert_eq!(user.email_verified, Some(true));
        // Roles are non-empty, so CUSTOMER is not forced in.
        assert_eq!(user.roles.len(), 1);
    }

    #[test]
    fn test_full_name_trims_missing_parts() {
        let user = User {
            first_name: Some("Ada".into()),
            ..User::default()
        };
        assert_eq!(user.full_name(), "Ada");
    }
}
