//! User administration endpoints

use crate::client::{validated, ApiClient, MessageResponse};
use flowdash_core::types::{PasswordChange, User, UserCreate, UserUpdate};
use flowdash_core::Result;

impl ApiClient {
    /// List user accounts (admin only)
    ///
    /// # Errors
    ///
    /// Returns [`flowdash_core::Error::Authentication`] for non-admin
    /// callers, or an error if the request fails.
    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.get_json("/users/", &[]).await
    }

    /// Fetch one user account
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the user does not exist.
    pub async fn get_user(&self, user_id: i64) -> Result<User> {
        self.get_json(&format!("/users/{user_id}"), &[]).await
    }

    /// Create a user account (admin only)
    ///
    /// # Errors
    ///
    /// Returns [`flowdash_core::Error::Validation`] if the payload fails
    /// local validation, before any request is made.
    pub async fn create_user(&self, payload: &UserCreate) -> Result<User> {
        validated(payload)?;
        self.post_json("/users/", payload).await
    }

    /// Update a user's email, role, or active flag (admin only)
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the request fails.
    pub async fn update_user(&self, user_id: i64, payload: &UserUpdate) -> Result<User> {
        validated(payload)?;
        self.put_json(&format!("/users/{user_id}"), payload).await
    }

    /// Delete a user account (admin only; the backend replies 204)
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete_user(&self, user_id: i64) -> Result<()> {
        self.delete_empty(&format!("/users/{user_id}")).await
    }

    /// Change a user's own password, verifying the current one
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the current password is
    /// rejected.
    pub async fn change_password(
        &self,
        user_id: i64,
        payload: &PasswordChange,
    ) -> Result<MessageResponse> {
        validated(payload)?;
        self.post_json(&format!("/users/{user_id}/change-password"), payload)
            .await
    }

    /// Administratively reset a user's password (admin only)
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn reset_password(
        &self,
        user_id: i64,
        new_password: &str,
    ) -> Result<MessageResponse> {
        self.post_empty(&format!(
            "/users/{user_id}/reset-password?new_password={}",
            urlencoding::encode(new_password)
        ))
        .await
    }
}
