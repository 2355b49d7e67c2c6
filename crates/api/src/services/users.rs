//! Customer account operations.

use chrono::Utc;

use orchard_core::{Email, UserStatus};

use crate::error::{ApiError, Result};
use crate::models::User;
use crate::store::{KeyValueStore, Repository, scan_first};

pub struct UserService<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> UserService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    const fn repo(&self) -> Repository<'a, User> {
        Repository::new(self.store)
    }

    /// Create a user. The email is normalized to lower case and must be
    /// unique across the table.
    ///
    /// # Errors
    ///
    /// Validation failure listing every violated rule, including a duplicate
    /// email.
    pub async fn create(&self, mut user: User, actor: &str) -> Result<User> {
        let mut errors = Vec::new();
        let email = match user.email.as_deref() {
            None | Some("") => {
                errors.push("Email is required");
                None
            }
            Some(raw) => match Email::parse(raw) {
                Ok(email) => Some(email),
                Err(_) => {
                    errors.push("Invalid email format");
                    None
                }
            },
        };
        if user.first_name.as_deref().is_none_or(|n| n.trim().is_empty()) {
            errors.push("First name is required");
        }
        if user.last_name.as_deref().is_none_or(|n| n.trim().is_empty()) {
            errors.push("Last name is required");
        }
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors.join(", ")));
        }

        // Validated above, so the email is always present here.
        if let Some(email) = email {
            if self.find_by_email(email.as_str()).await?.is_some() {
                return Err(ApiError::Validation("Email already registered".to_owned()));
            }
            user.email = Some(email.as_str().to_owned());
        }

        user.apply_defaults();
        self.repo().save(&mut user, actor).await?;
        Ok(user)
    }

    /// Fetch a user by id.
    ///
    /// # Errors
    ///
    /// `NotFound` when the user does not exist.
    pub async fn get(&self, id: &str) -> Result<User> {
        self.repo()
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("User not found: {id}")))
    }

    /// Fetch a user by email, case-insensitively.
    ///
    /// # Errors
    ///
    /// Validation failure for a malformed email, `NotFound` when no user
    /// carries it.
    pub async fn get_by_email(&self, email: &str) -> Result<User> {
        let email = Email::parse(email)
            .map_err(|_| ApiError::Validation("Invalid email format".to_owned()))?;
        self.find_by_email(email.as_str())
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("User not found with email: {email}")))
    }

    /// Partial update. A changed phone number resets its verification flag;
    /// a changed email is re-validated and re-checked for uniqueness.
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing user, validation failure for a bad or
    /// duplicate email.
    pub async fn update(&self, id: &str, patch: User, actor: &str) -> Result<User> {
        let mut user = self.get(id).await?;

        if let Some(raw) = patch.email.as_deref() {
            let email = Email::parse(raw)
                .map_err(|_| ApiError::Validation("Invalid email format".to_owned()))?;
            if user.email.as_deref() != Some(email.as_str()) {
                if self.find_by_email(email.as_str()).await?.is_some() {
                    return Err(ApiError::Validation("Email already registered".to_owned()));
                }
                user.email = Some(email.as_str().to_owned());
                user.email_verified = Some(false);
            }
        }
        if patch.first_name.is_some() {
            user.first_name = patch.first_name;
        }
        if patch.last_name.is_some() {
            user.last_name = patch.last_name;
        }
        if let Some(phone) = patch.phone_number {
            if user.phone_number.as_deref() != Some(phone.as_str()) {
                user.phone_number = Some(phone);
                user.phone_verified = Some(false);
            }
        }
        if patch.default_shipping_address.is_some() {
            user.default_shipping_address = patch.default_shipping_address;
        }
        if patch.default_billing_address.is_some() {
            user.default_billing_address = patch.default_billing_address;
        }
        if !patch.preferences.is_empty() {
            user.preferences = patch.preferences;
        }

        self.repo().save(&mut user, actor).await?;
        Ok(user)
    }

    /// Move a user to a new status.
    ///
    /// # Errors
    ///
    /// `NotFound` when the user does not exist.
    pub async fn update_status(&self, id: &str, status: UserStatus, actor: &str) -> Result<User> {
        let mut user = self.get(id).await?;
        user.status = Some(status);
        self.repo().save(&mut user, actor).await?;
        Ok(user)
    }

    /// Mark the user's email address as verified.
    ///
    /// # Errors
    ///
    /// `NotFound` when the user does not exist.
    pub async fn verify_email(&self, id: &str, actor: &str) -> Result<User> {
        let mut user = self.get(id).await?;
        user.email_verified = Some(true);
        self.repo().save(&mut user, actor).await?;
        Ok(user)
    }

    /// Mark the user's phone number as verified.
    ///
    /// # Errors
    ///
    /// `NotFound` when the user does not exist.
    pub async fn verify_phone(&self, id: &str, actor: &str) -> Result<User> {
        let mut user = self.get(id).await?;
        user.phone_verified = Some(true);
        self.repo().save(&mut user, actor).await?;
        Ok(user)
    }

    /// Record a successful login.
    ///
    /// # Errors
    ///
    /// `NotFound` when the user does not exist.
    pub async fn record_login(&self, id: &str, actor: &str) -> Result<User> {
        let mut user = self.get(id).await?;
        user.last_login_at = Some(Utc::now());
        self.repo().save(&mut user, actor).await?;
        Ok(user)
    }

    async fn find_by_email(&self, normalized: &str) -> Result<Option<User>> {
        let repo = self.repo();
        let hit = scan_first(&repo, |u: &User| u.email.as_deref() == Some(normalized)).await?;
        Ok(hit)
    }
}
