//! Login and token acquisition

use crate::client::{parse_json, ApiClient};
use flowdash_core::types::UserRole;
use flowdash_core::Result;
use serde::{Deserialize, Serialize};

/// Identity snapshot embedded in a login response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Backend identifier
    pub id: i64,

    /// Login name
    pub username: String,

    /// Contact email
    pub email: String,

    /// Assigned role
    pub role: UserRole,
}

/// Bearer token issued by the login endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    /// The token itself
    pub access_token: String,

    /// Always `bearer`
    pub token_type: String,

    /// Identity of the logged-in user
    pub user: AuthenticatedUser,
}

impl ApiClient {
    /// Log in with username and password; the issued token is attached to
    /// this client for all subsequent requests.
    ///
    /// # Errors
    ///
    /// Returns [`flowdash_core::Error::Authentication`] on bad credentials,
    /// or an HTTP error if the request fails.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<Token> {
        let request = self
            .client
            .post(self.url("/auth/login"))
            .form(&[("username", username), ("password", password)]);

        let response = self.send(request).await?;
        let token: Token = parse_json(response).await?;

        tracing::info!(username = %token.user.username, role = %token.user.role, "logged in");
        self.set_token(token.access_token.clone());
        Ok(token)
    }

    /// Identity of the user the attached token belongs to.
    ///
    /// Mainly useful with a pre-issued token, where no login response
    /// carried the identity.
    ///
    /// # Errors
    ///
    /// Returns [`flowdash_core::Error::Authentication`] when no valid token
    /// is attached, or an HTTP error if the request fails.
    pub async fn me(&self) -> Result<AuthenticatedUser> {
        self.get_json("/auth/me", &[]).await
    }
}
